use std::cell::{Cell, RefCell};

/// Opaque handle to one drawn primitive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PrimitiveId(u64);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Rgba {
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Rgba {
            red: red as f64 / 255.0,
            green: green as f64 / 255.0,
            blue: blue as f64 / 255.0,
            alpha: 1.0,
        }
    }

    /// Parses a `#rrggbb` colour string.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if digits.len() != 6 {
            return None;
        }
        let red = u8::from_str_radix(&digits[0..2], 16).ok()?;
        let green = u8::from_str_radix(&digits[2..4], 16).ok()?;
        let blue = u8::from_str_radix(&digits[4..6], 16).ok()?;
        Some(Rgba::rgb(red, green, blue))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Disc { cx: f64, cy: f64, radius: f64 },
    Ellipse { cx: f64, cy: f64, rx: f64, ry: f64 },
    Line { x1: f64, y1: f64, x2: f64, y2: f64 },
    Polyline { points: Vec<(f64, f64)>, closed: bool },
}

impl Shape {
    pub fn translate(&mut self, dx: f64, dy: f64) {
        match self {
            Shape::Disc { cx, cy, .. } | Shape::Ellipse { cx, cy, .. } => {
                *cx += dx;
                *cy += dy;
            }
            Shape::Line { x1, y1, x2, y2 } => {
                *x1 += dx;
                *y1 += dy;
                *x2 += dx;
                *y2 += dy;
            }
            Shape::Polyline { points, .. } => {
                for (x, y) in points.iter_mut() {
                    *x += dx;
                    *y += dy;
                }
            }
        }
    }

    pub fn bounds(&self) -> Bounds {
        match self {
            Shape::Disc { cx, cy, radius } => Bounds {
                left: cx - radius,
                top: cy - radius,
                right: cx + radius,
                bottom: cy + radius,
            },
            Shape::Ellipse { cx, cy, rx, ry } => Bounds {
                left: cx - rx,
                top: cy - ry,
                right: cx + rx,
                bottom: cy + ry,
            },
            Shape::Line { x1, y1, x2, y2 } => Bounds {
                left: x1.min(*x2),
                top: y1.min(*y2),
                right: x1.max(*x2),
                bottom: y1.max(*y2),
            },
            Shape::Polyline { points, .. } => {
                let mut bounds = Bounds {
                    left: f64::INFINITY,
                    top: f64::INFINITY,
                    right: f64::NEG_INFINITY,
                    bottom: f64::NEG_INFINITY,
                };
                for &(x, y) in points {
                    bounds.left = bounds.left.min(x);
                    bounds.top = bounds.top.min(y);
                    bounds.right = bounds.right.max(x);
                    bounds.bottom = bounds.bottom.max(y);
                }
                bounds
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Style {
    pub color: Rgba,
    pub filled: bool,
    pub stroke_width: f64,
}

impl Style {
    pub fn fill(color: Rgba) -> Self {
        Style {
            color,
            filled: true,
            stroke_width: 0.0,
        }
    }

    pub fn stroke(color: Rgba, width: f64) -> Self {
        Style {
            color,
            filled: false,
            stroke_width: width,
        }
    }
}

/// Narrow 2D canvas capability consumed by the animated effects. The
/// effects never assume a concrete graphics API beyond these operations.
pub trait DrawingSurface {
    fn create(&self, shape: Shape, style: Style, tag: &'static str) -> PrimitiveId;
    fn translate(&self, id: PrimitiveId, dx: f64, dy: f64);
    fn bounds(&self, id: PrimitiveId) -> Option<Bounds>;
    fn clear_tag(&self, tag: &str);
    fn width(&self) -> f64;
    fn height(&self) -> f64;
}

#[derive(Clone, Debug)]
struct Record {
    id: PrimitiveId,
    tag: &'static str,
    shape: Shape,
    style: Style,
}

/// Retained display list backing one effects canvas. Primitives keep
/// insertion order when rendered, so later effects paint over earlier
/// ones.
#[derive(Default)]
pub struct SceneStore {
    records: RefCell<Vec<Record>>,
    next_id: Cell<u64>,
    width: Cell<f64>,
    height: Cell<f64>,
}

impl SceneStore {
    pub fn new(width: f64, height: f64) -> Self {
        let store = SceneStore::default();
        store.set_size(width, height);
        store
    }

    pub fn set_size(&self, width: f64, height: f64) {
        self.width.set(width);
        self.height.set(height);
    }

    /// Copies out the current primitives for rendering.
    pub fn snapshot(&self) -> Vec<(Shape, Style)> {
        self.records
            .borrow()
            .iter()
            .map(|record| (record.shape.clone(), record.style.clone()))
            .collect()
    }

    pub fn tag_count(&self, tag: &str) -> usize {
        self.records
            .borrow()
            .iter()
            .filter(|record| record.tag == tag)
            .count()
    }
}

impl DrawingSurface for SceneStore {
    fn create(&self, shape: Shape, style: Style, tag: &'static str) -> PrimitiveId {
        let id = PrimitiveId(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        self.records.borrow_mut().push(Record {
            id,
            tag,
            shape,
            style,
        });
        id
    }

    fn translate(&self, id: PrimitiveId, dx: f64, dy: f64) {
        let mut records = self.records.borrow_mut();
        if let Some(record) = records.iter_mut().find(|record| record.id == id) {
            record.shape.translate(dx, dy);
        }
    }

    fn bounds(&self, id: PrimitiveId) -> Option<Bounds> {
        self.records
            .borrow()
            .iter()
            .find(|record| record.id == id)
            .map(|record| record.shape.bounds())
    }

    fn clear_tag(&self, tag: &str) {
        self.records.borrow_mut().retain(|record| record.tag != tag);
    }

    fn width(&self) -> f64 {
        self.width.get()
    }

    fn height(&self) -> f64 {
        self.height.get()
    }
}
