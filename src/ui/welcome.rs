use std::cell::RefCell;
use std::rc::Rc;

use gtk4 as gtk;
use gtk4::prelude::*;
use libadwaita as adw;
use libadwaita::prelude::*;

use super::canvas::build_canvas;
use super::state::AppState;
use crate::anim::surface::{DrawingSurface, Rgba, SceneStore};

const BALLOON_CANVAS_WIDTH: f64 = 120.0;
const BALLOON_CANVAS_HEIGHT: f64 = 500.0;

const LEFT_BALLOONS: [Rgba; 6] = [
    Rgba::rgb(0xff, 0x00, 0x00), // red
    Rgba::rgb(0x00, 0x00, 0xff), // blue
    Rgba::rgb(0x00, 0x80, 0x00), // green
    Rgba::rgb(0xff, 0xff, 0x00), // yellow
    Rgba::rgb(0xff, 0xc0, 0xcb), // pink
    Rgba::rgb(0x80, 0x00, 0x80), // purple
];

const RIGHT_BALLOONS: [Rgba; 6] = [
    Rgba::rgb(0xff, 0xa5, 0x00), // orange
    Rgba::rgb(0xee, 0x82, 0xee), // violet
    Rgba::rgb(0x87, 0xce, 0xeb), // sky blue
    Rgba::rgb(0x00, 0xff, 0x00), // lime
    Rgba::rgb(0xff, 0xd7, 0x00), // gold
    Rgba::rgb(0xff, 0x00, 0xff), // magenta
];

pub(super) fn build_welcome_page(state: &Rc<RefCell<AppState>>) -> gtk::Widget {
    let row = gtk::Box::new(gtk::Orientation::Horizontal, 0);

    let left = balloon_canvas(state, &LEFT_BALLOONS, |st| &st.balloons_left);
    row.append(&left);

    let center = gtk::Box::new(gtk::Orientation::Vertical, 16);
    center.set_valign(gtk::Align::Center);
    center.set_halign(gtk::Align::Center);
    center.set_hexpand(true);

    let title = gtk::Label::new(Some("A little surprise awaits... 🎁"));
    title.add_css_class("title-1");
    center.append(&title);

    let prompt = gtk::Label::new(Some("First, tell me your name:"));
    prompt.add_css_class("title-4");
    center.append(&prompt);

    let entry = gtk::Entry::builder()
        .placeholder_text("Your name")
        .max_width_chars(24)
        .halign(gtk::Align::Center)
        .build();
    center.append(&entry);

    let start = gtk::Button::with_label("Open your surprise 🎀");
    start.add_css_class("pill");
    start.add_css_class("suggested-action");
    start.set_halign(gtk::Align::Center);

    let state_start = state.clone();
    let entry_start = entry.clone();
    start.connect_clicked(move |_| {
        begin(&state_start, entry_start.text().trim());
    });
    let state_enter = state.clone();
    entry.connect_activate(move |entry| {
        begin(&state_enter, entry.text().trim());
    });
    center.append(&start);

    row.append(&center);

    let right = balloon_canvas(state, &RIGHT_BALLOONS, |st| &st.balloons_right);
    row.append(&right);

    row.upcast()
}

fn balloon_canvas(
    state: &Rc<RefCell<AppState>>,
    colors: &[Rgba],
    pick: impl Fn(&AppState) -> &crate::anim::balloons::BalloonDrift,
) -> gtk::DrawingArea {
    let store = Rc::new(SceneStore::new(BALLOON_CANVAS_WIDTH, BALLOON_CANVAS_HEIGHT));
    let canvas = build_canvas(store.clone());
    canvas.set_content_width(BALLOON_CANVAS_WIDTH as i32);
    canvas.set_hexpand(false);

    let st = state.borrow();
    pick(&st).activate(store as Rc<dyn DrawingSurface>, colors);
    drop(st);

    state.borrow_mut().canvases.push(canvas.clone());
    canvas
}

fn begin(state: &Rc<RefCell<AppState>>, name: &str) {
    if name.is_empty() {
        let dialog = adw::AlertDialog::new(
            Some("Hold on!"),
            Some("I need a name before the surprise can start."),
        );
        dialog.add_response("ok", "Okay");
        dialog.set_default_response(Some("ok"));
        dialog.set_close_response("ok");
        let st = state.borrow();
        dialog.present(st.view_stack.as_ref());
        return;
    }

    let st = state.borrow();
    if let Some(label) = &st.greeting_label {
        label.set_text(&format!("Hellooo, {name}! 💛"));
    }
    if let Some(stack) = &st.view_stack {
        stack.set_visible_child_name("main");
    }
    st.music.play_loop();
}
