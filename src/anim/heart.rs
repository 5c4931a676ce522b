use std::cell::RefCell;
use std::f64::consts::PI;
use std::rc::Rc;

use super::scheduler::{Scheduler, TimerToken};
use super::surface::{DrawingSurface, Rgba, Shape, Style};

pub const HEART_TAG: &str = "heart";
pub const HEART_STEPS: usize = 160;

const HEART_COLOR: Rgba = Rgba::rgb(0xff, 0x4d, 0x6d);
const OUTLINE_WIDTH: f64 = 3.0;
const SCALE_MIN: f64 = 0.92;
const SCALE_MAX: f64 = 1.08;
const SCALE_STEP: f64 = 0.02;

/// Samples the classic parametric heart curve as a closed outline
/// centred on (cx, cy). `size` is the nominal half-width in pixels.
pub fn heart_points(cx: f64, cy: f64, size: f64, steps: usize) -> Vec<(f64, f64)> {
    let mut points = Vec::with_capacity(steps);
    for i in 0..steps {
        let t = i as f64 * (2.0 * PI / steps as f64);
        let x = 16.0 * t.sin().powi(3);
        let y = 13.0 * t.cos() - 5.0 * (2.0 * t).cos() - 2.0 * (3.0 * t).cos() - (4.0 * t).cos();
        points.push((cx + x * size / 32.0, cy - y * size / 32.0));
    }
    points
}

struct HeartState {
    surface: Option<Rc<dyn DrawingSurface>>,
    center: (f64, f64),
    base_size: f64,
    scale: f64,
    growing: bool,
    token: Option<TimerToken>,
}

/// Pulsing heart outline: redrawn every tick with a scale factor that
/// oscillates between [`SCALE_MIN`] and [`SCALE_MAX`].
#[derive(Clone)]
pub struct HeartPulse {
    scheduler: Scheduler,
    state: Rc<RefCell<HeartState>>,
}

impl HeartPulse {
    pub fn new(scheduler: Scheduler) -> Self {
        HeartPulse {
            scheduler,
            state: Rc::new(RefCell::new(HeartState {
                surface: None,
                center: (0.0, 0.0),
                base_size: 0.0,
                scale: 1.0,
                growing: true,
                token: None,
            })),
        }
    }

    pub fn is_active(&self) -> bool {
        self.state.borrow().token.is_some()
    }

    pub fn activate(&self, surface: Rc<dyn DrawingSurface>) {
        self.deactivate();

        let width = surface.width();
        let height = surface.height();
        {
            let mut state = self.state.borrow_mut();
            state.surface = Some(surface);
            state.center = (width / 2.0, height / 2.0);
            state.base_size = width.min(height) * 0.35;
            state.scale = 1.0;
            state.growing = true;
        }

        let state = self.state.clone();
        let token = self.scheduler.every_tick(move || {
            state.borrow_mut().beat();
        });
        self.state.borrow_mut().token = Some(token);
    }

    /// Cancels the beat registration and removes the outline. Idempotent.
    pub fn deactivate(&self) {
        let mut state = self.state.borrow_mut();
        if let Some(token) = state.token.take() {
            self.scheduler.cancel(token);
        }
        if let Some(surface) = state.surface.take() {
            surface.clear_tag(HEART_TAG);
        }
    }

    #[cfg(test)]
    fn scale(&self) -> (f64, bool) {
        let state = self.state.borrow();
        (state.scale, state.growing)
    }
}

impl HeartState {
    fn beat(&mut self) {
        let Some(surface) = self.surface.clone() else {
            return;
        };
        // Only this component's primitives are replaced; confetti and
        // anything else on the surface stay untouched.
        surface.clear_tag(HEART_TAG);

        let (cx, cy) = self.center;
        let points = heart_points(cx, cy, self.base_size * self.scale, HEART_STEPS);
        surface.create(
            Shape::Polyline {
                points,
                closed: true,
            },
            Style::stroke(HEART_COLOR, OUTLINE_WIDTH),
            HEART_TAG,
        );

        self.scale += if self.growing { SCALE_STEP } else { -SCALE_STEP };
        if self.scale >= SCALE_MAX {
            self.scale = SCALE_MAX;
            self.growing = false;
        } else if self.scale <= SCALE_MIN {
            self.scale = SCALE_MIN;
            self.growing = true;
        }
    }
}
