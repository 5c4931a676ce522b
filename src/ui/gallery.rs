use std::cell::RefCell;
use std::rc::Rc;

use gtk4 as gtk;
use gtk4::gdk;
use gtk4::prelude::*;
use rand::seq::SliceRandom;

use super::state::AppState;
use crate::media::images_dir;

pub(super) fn build_gallery_page(state: &Rc<RefCell<AppState>>) -> gtk::Widget {
    let column = gtk::Box::new(gtk::Orientation::Vertical, 12);
    column.set_margin_top(12);
    column.set_margin_bottom(12);
    column.set_margin_start(12);
    column.set_margin_end(12);

    let picture = gtk::Picture::new();
    picture.set_hexpand(true);
    picture.set_vexpand(true);
    picture.set_content_fit(gtk::ContentFit::Contain);
    column.append(&picture);

    let status = gtk::Label::new(None);
    status.add_css_class("dim-label");
    column.append(&status);

    let controls = gtk::Box::new(gtk::Orientation::Horizontal, 8);
    controls.set_halign(gtk::Align::Center);
    for (title, step) in [("⬅ Previous", Step::Back), ("Shuffle 🔀", Step::Shuffle), ("Next ➡", Step::Forward)] {
        let button = gtk::Button::with_label(title);
        button.add_css_class("pill");
        let state_clone = state.clone();
        button.connect_clicked(move |_| {
            navigate(&state_clone, step);
        });
        controls.append(&button);
    }
    column.append(&controls);

    {
        let mut st = state.borrow_mut();
        st.gallery_files = st.images.list_images(&images_dir());
        st.gallery_index = 0;
        st.gallery_picture = Some(picture);
        st.gallery_status = Some(status);
    }
    show_current(&state.borrow());

    column.upcast()
}

#[derive(Clone, Copy)]
enum Step {
    Back,
    Forward,
    Shuffle,
}

fn navigate(state: &Rc<RefCell<AppState>>, step: Step) {
    {
        let mut st = state.borrow_mut();
        let len = st.gallery_files.len();
        if len == 0 {
            return;
        }
        match step {
            Step::Forward => st.gallery_index = (st.gallery_index + 1) % len,
            Step::Back => st.gallery_index = (st.gallery_index + len - 1) % len,
            Step::Shuffle => {
                let mut rng = rand::rng();
                st.gallery_files.shuffle(&mut rng);
                st.gallery_index = 0;
            }
        }
    }
    show_current(&state.borrow());
}

fn show_current(st: &AppState) {
    let (Some(picture), Some(status)) = (&st.gallery_picture, &st.gallery_status) else {
        return;
    };

    let Some(path) = st.gallery_files.get(st.gallery_index) else {
        picture.set_paintable(None::<&gdk::Paintable>);
        status.set_text("Drop some photos into assets/images to fill this album 📷");
        return;
    };

    match st.images.load(path) {
        Ok(entry) => {
            let texture = gdk::Texture::for_pixbuf(&entry.pixbuf);
            picture.set_paintable(Some(&texture));
            status.set_text(&format!(
                "{} ({} of {})",
                path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default(),
                st.gallery_index + 1,
                st.gallery_files.len()
            ));
        }
        Err(_) => {
            picture.set_paintable(None::<&gdk::Paintable>);
            status.set_text("That photo would not open, try the next one 🙈");
        }
    }
}
