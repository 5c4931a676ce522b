use std::cell::RefCell;
use std::rc::Rc;

use gtk4 as gtk;
use gtk4::pango;
use gtk4::prelude::*;

use super::state::AppState;
use crate::game::{CardState, GameEvent};

/// Pet names hidden behind the cards, one pair each.
pub const GAME_WORDS: [&str; 6] = [
    "sunshine",
    "cupcake",
    "peanut",
    "bubbles",
    "honeybee",
    "starlight",
];

const GRID_COLS: i32 = 4;
const GRID_ROWS: i32 = 3;
const TILE_GAP: i32 = 6;

pub(super) fn build_quiz_page(state: &Rc<RefCell<AppState>>) -> gtk::Widget {
    let column = gtk::Box::new(gtk::Orientation::Vertical, 12);
    column.set_margin_top(12);
    column.set_margin_bottom(12);
    column.set_margin_start(12);
    column.set_margin_end(12);

    let status = gtk::Label::new(Some("Match the pet names! 💞"));
    status.add_css_class("title-3");
    column.append(&status);

    column.append(&build_card_grid(state));

    let restart = gtk::Button::with_label("Start over");
    restart.add_css_class("pill");
    restart.set_halign(gtk::Align::Center);
    let state_restart = state.clone();
    restart.connect_clicked(move |_| {
        let st = state_restart.borrow();
        st.game.reset(&GAME_WORDS);
        if let Some(label) = &st.quiz_status {
            label.set_text("Match the pet names! 💞");
        }
        refresh_board(&st);
    });
    column.append(&restart);

    state.borrow_mut().quiz_status = Some(status);
    wire_game_events(state);
    column.upcast()
}

fn build_card_grid(state: &Rc<RefCell<AppState>>) -> gtk::Grid {
    let grid = gtk::Grid::new();
    grid.add_css_class("surprise-board");
    grid.set_row_spacing(TILE_GAP as u32);
    grid.set_column_spacing(TILE_GAP as u32);
    grid.set_halign(gtk::Align::Fill);
    grid.set_valign(gtk::Align::Fill);
    grid.set_hexpand(true);
    grid.set_vexpand(true);

    let mut buttons = Vec::new();

    for i in 0..(GRID_ROWS * GRID_COLS) {
        let index = i as usize;
        let aspect_frame = gtk::AspectFrame::builder()
            .ratio(1.25)
            .obey_child(false)
            .halign(gtk::Align::Fill)
            .valign(gtk::Align::Fill)
            .hexpand(true)
            .vexpand(true)
            .build();

        let button = gtk::Button::builder()
            .css_classes(vec!["surprise-card"])
            .build();
        button.set_hexpand(true);
        button.set_vexpand(true);

        let drawing_area = gtk::DrawingArea::builder()
            .hexpand(true)
            .vexpand(true)
            .build();

        let state_draw = state.clone();
        drawing_area.set_draw_func(move |area, cr, width, height| {
            let card = {
                let st = state_draw.borrow();
                st.game.card(index)
            };
            let Some(card) = card else {
                return;
            };
            let is_hidden = card.state == CardState::Hidden;
            let text = if is_hidden { "❓" } else { card.value.as_str() };

            let min_dim = width.min(height) as f64;
            let font_size = if is_hidden { min_dim * 0.34 } else { min_dim * 0.20 };

            cr.set_antialias(gtk::cairo::Antialias::Best);

            let layout = pangocairo::functions::create_layout(cr);
            let mut font_desc = pango::FontDescription::new();
            if is_hidden {
                font_desc.set_family("Noto Color Emoji, Apple Color Emoji, Segoe UI Emoji, sans");
            } else {
                font_desc.set_family("Cantarell, Noto Sans, sans");
                font_desc.set_weight(pango::Weight::Bold);
            }
            font_desc.set_size((font_size * pango::SCALE as f64) as i32);
            layout.set_font_description(Some(&font_desc));
            layout.set_text(text);

            let fg = area.style_context().color();
            cr.set_source_rgba(
                fg.red() as f64,
                fg.green() as f64,
                fg.blue() as f64,
                fg.alpha() as f64,
            );

            let (text_width, text_height) = layout.pixel_size();
            cr.move_to(
                (width as f64 - text_width as f64) / 2.0,
                (height as f64 - text_height as f64) / 2.0,
            );

            pangocairo::functions::show_layout(cr, &layout);
        });

        button.set_child(Some(&drawing_area));

        let state_clone = state.clone();
        button.connect_clicked(move |_| {
            handle_card_click(&state_clone, index);
        });

        aspect_frame.set_child(Some(&button));
        grid.attach(&aspect_frame, i % GRID_COLS, i / GRID_COLS, 1, 1);
        buttons.push(button);
    }

    state.borrow_mut().quiz_buttons = buttons;

    grid
}

fn handle_card_click(state: &Rc<RefCell<AppState>>, index: usize) {
    // The borrow must end before reveal(); the observer re-enters state.
    let game = state.borrow().game.clone();
    game.reveal(index);
}

fn wire_game_events(state: &Rc<RefCell<AppState>>) {
    let weak = Rc::downgrade(state);
    let game = state.borrow().game.clone();
    game.set_observer(move |event| {
        let Some(state) = weak.upgrade() else {
            return;
        };
        let st = state.borrow();
        match event {
            GameEvent::Revealed(index) => refresh_card(&st, index),
            GameEvent::PairMatched(first, second) | GameEvent::PairHidden(first, second) => {
                refresh_card(&st, first);
                refresh_card(&st, second);
            }
            GameEvent::Won => {
                if let Some(label) = &st.quiz_status {
                    label.set_text("You matched them all! You know us so well 🥰");
                }
            }
        }
    });
}

fn refresh_card(st: &AppState, index: usize) {
    let Some(button) = st.quiz_buttons.get(index) else {
        return;
    };
    let Some(card) = st.game.card(index) else {
        return;
    };
    button.remove_css_class("active");
    button.remove_css_class("matched");
    match card.state {
        CardState::Flipped => button.add_css_class("active"),
        CardState::Matched => button.add_css_class("matched"),
        CardState::Hidden => (),
    }
    button.queue_draw();
}

fn refresh_board(st: &AppState) {
    for index in 0..st.quiz_buttons.len() {
        refresh_card(st, index);
    }
}
