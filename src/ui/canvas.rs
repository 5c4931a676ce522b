use std::f64::consts::PI;
use std::rc::Rc;

use gtk4 as gtk;
use gtk4::cairo;
use gtk4::prelude::*;

use crate::anim::surface::{SceneStore, Shape, Style};

/// Builds a drawing area that renders a [`SceneStore`] display list and
/// keeps the store's size in sync with the widget.
pub(super) fn build_canvas(store: Rc<SceneStore>) -> gtk::DrawingArea {
    let area = gtk::DrawingArea::builder()
        .hexpand(true)
        .vexpand(true)
        .build();

    let store_resize = store.clone();
    area.connect_resize(move |_, width, height| {
        if width > 0 && height > 0 {
            store_resize.set_size(width as f64, height as f64);
        }
    });

    area.set_draw_func(move |_, cr, _, _| {
        render(&store, cr);
    });

    area
}

fn render(store: &SceneStore, cr: &cairo::Context) {
    cr.set_antialias(cairo::Antialias::Best);
    for (shape, style) in store.snapshot() {
        cr.set_source_rgba(
            style.color.red,
            style.color.green,
            style.color.blue,
            style.color.alpha,
        );
        match shape {
            Shape::Disc { cx, cy, radius } => {
                cr.arc(cx, cy, radius, 0.0, 2.0 * PI);
            }
            Shape::Ellipse { cx, cy, rx, ry } => {
                let _ = cr.save();
                cr.translate(cx, cy);
                cr.scale(rx, ry);
                cr.arc(0.0, 0.0, 1.0, 0.0, 2.0 * PI);
                let _ = cr.restore();
            }
            Shape::Line { x1, y1, x2, y2 } => {
                cr.move_to(x1, y1);
                cr.line_to(x2, y2);
            }
            Shape::Polyline { points, closed } => {
                let mut iter = points.iter();
                if let Some(&(x, y)) = iter.next() {
                    cr.move_to(x, y);
                    for &(x, y) in iter {
                        cr.line_to(x, y);
                    }
                    if closed {
                        cr.close_path();
                    }
                }
            }
        }
        paint(cr, &style);
    }
}

fn paint(cr: &cairo::Context, style: &Style) {
    if style.filled {
        let _ = cr.fill();
    } else {
        cr.set_line_width(style.stroke_width);
        let _ = cr.stroke();
    }
}
