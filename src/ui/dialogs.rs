use libadwaita as adw;

use adw::prelude::*;

pub fn show_instructions_dialog(app: &adw::Application) -> adw::AlertDialog {
    let dialog = adw::AlertDialog::new(
        Some("How it works"),
        Some(
            "Type your name to open the surprise.\n\
Fire confetti, pulse the heart, and check the countdowns on the home tab.\n\
Browse our photos, match the pet names, and collect compliments.",
        ),
    );
    dialog.add_response("ok", "Got it");
    dialog.set_default_response(Some("ok"));
    dialog.set_close_response("ok");
    dialog.present(app.active_window().as_ref());
    dialog
}

pub fn show_about_dialog(app: &adw::Application) -> adw::AboutDialog {
    let dialog = adw::AboutDialog::builder()
        .application_name("Surprise")
        .application_icon("io.github.surprise.Surprise")
        .developer_name("Made with love")
        .version("1.0.0")
        .comments("A birthday surprise, wrapped in an app.")
        .build();
    dialog.present(app.active_window().as_ref());
    dialog
}
