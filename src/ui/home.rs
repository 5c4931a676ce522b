use std::cell::RefCell;
use std::rc::Rc;

use gtk4 as gtk;
use gtk4::prelude::*;

use super::canvas::build_canvas;
use super::dates::toggle_dates_section;
use super::state::{AppState, FALLBACK_CANVAS_HEIGHT, FALLBACK_CANVAS_WIDTH};
use crate::anim::surface::{DrawingSurface, SceneStore};

const CONFETTI_COUNT: usize = 160;

pub(super) fn build_home_page(state: &Rc<RefCell<AppState>>) -> gtk::Widget {
    let column = gtk::Box::new(gtk::Orientation::Vertical, 12);
    column.set_margin_top(12);
    column.set_margin_bottom(12);
    column.set_margin_start(12);
    column.set_margin_end(12);

    let message = gtk::Label::new(Some("Happy Birthday, my love! 🎉"));
    message.add_css_class("title-1");
    message.set_wrap(true);
    message.set_justify(gtk::Justification::Center);
    column.append(&message);

    let store = Rc::new(SceneStore::new(
        FALLBACK_CANVAS_WIDTH,
        FALLBACK_CANVAS_HEIGHT,
    ));
    let canvas = build_canvas(store.clone());
    column.append(&canvas);

    let buttons = gtk::Box::new(gtk::Orientation::Horizontal, 8);
    buttons.set_halign(gtk::Align::Center);

    let confetti_button = gtk::Button::with_label("Confetti! 🎊");
    confetti_button.add_css_class("pill");
    confetti_button.add_css_class("suggested-action");
    let state_confetti = state.clone();
    confetti_button.connect_clicked(move |_| {
        let st = state_confetti.borrow();
        let Some(store) = st.home_store.clone() else {
            return;
        };
        if st.confetti.is_active() {
            st.confetti.deactivate();
        } else {
            st.confetti
                .activate(store as Rc<dyn DrawingSurface>, CONFETTI_COUNT);
        }
    });
    buttons.append(&confetti_button);

    let heart_button = gtk::Button::with_label("Heart 💗");
    heart_button.add_css_class("pill");
    let state_heart = state.clone();
    heart_button.connect_clicked(move |_| {
        let st = state_heart.borrow();
        let Some(store) = st.home_store.clone() else {
            return;
        };
        if st.heart.is_active() {
            st.heart.deactivate();
        } else {
            st.heart.activate(store as Rc<dyn DrawingSurface>);
        }
    });
    buttons.append(&heart_button);

    let dates_button = gtk::Button::with_label("Our dates 📅");
    dates_button.add_css_class("pill");
    let state_dates = state.clone();
    dates_button.connect_clicked(move |_| {
        toggle_dates_section(&state_dates);
    });
    buttons.append(&dates_button);

    let music_button = gtk::Button::with_label("Music 🎵");
    music_button.add_css_class("pill");
    let state_music = state.clone();
    music_button.connect_clicked(move |_| {
        let st = state_music.borrow();
        if st.music.is_playing() {
            st.music.stop();
        } else {
            st.music.play_loop();
        }
    });
    buttons.append(&music_button);

    column.append(&buttons);

    {
        let mut st = state.borrow_mut();
        st.home_store = Some(store);
        st.home_column = Some(column.clone());
        st.canvases.push(canvas);
    }

    column.upcast()
}
