use gtk4 as gtk;
use gtk4::prelude::*;
use rand::seq::IndexedRandom;

const COMPLIMENTS: [&str; 8] = [
    "You make every room brighter just by walking in 🌟",
    "Your laugh is my favorite sound in the world 💕",
    "You are braver than you ever give yourself credit for 🦁",
    "Somehow you get more wonderful every single day ✨",
    "The world is softer and kinder because you are in it 🌸",
    "You have the best ideas at the strangest hours 🌙",
    "Being around you feels like home 🏡",
    "You are, quite simply, my favorite person 💖",
];

pub(super) fn build_compliments_page() -> gtk::Widget {
    let column = gtk::Box::new(gtk::Orientation::Vertical, 16);
    column.set_valign(gtk::Align::Center);
    column.set_halign(gtk::Align::Center);
    column.set_margin_start(24);
    column.set_margin_end(24);

    let label = gtk::Label::new(Some("Press the button for a little reminder 💌"));
    label.add_css_class("title-2");
    label.set_wrap(true);
    label.set_justify(gtk::Justification::Center);
    label.set_max_width_chars(40);
    column.append(&label);

    let button = gtk::Button::with_label("Tell me something nice");
    button.add_css_class("pill");
    button.add_css_class("suggested-action");
    button.set_halign(gtk::Align::Center);
    button.connect_clicked(move |_| {
        let mut rng = rand::rng();
        if let Some(line) = COMPLIMENTS.choose(&mut rng) {
            label.set_text(line);
        }
    });
    column.append(&button);

    column.upcast()
}
