use std::cell::RefCell;
use std::rc::Rc;

use super::scheduler::{Scheduler, TimerToken};
use super::surface::{DrawingSurface, PrimitiveId, Rgba, Shape, Style};

pub const BALLOON_TAG: &str = "balloon";

const BODY_WIDTH: f64 = 40.0;
const BODY_HEIGHT: f64 = 50.0;
const TETHER_LENGTH: f64 = 20.0;
const COLUMN_NEAR: f64 = 30.0;
const COLUMN_FAR: f64 = 70.0;
const STAGGER: f64 = 60.0;
const RISE_PER_TICK: f64 = 1.0;

struct Balloon {
    body: PrimitiveId,
    tether: PrimitiveId,
}

struct DriftState {
    surface: Option<Rc<dyn DrawingSurface>>,
    balloons: Vec<Balloon>,
    height: f64,
    token: Option<TimerToken>,
}

/// Balloons drifting continuously upward with a seamless wrap back to
/// the bottom. Body and tether move as one unit.
#[derive(Clone)]
pub struct BalloonDrift {
    scheduler: Scheduler,
    state: Rc<RefCell<DriftState>>,
}

impl BalloonDrift {
    pub fn new(scheduler: Scheduler) -> Self {
        BalloonDrift {
            scheduler,
            state: Rc::new(RefCell::new(DriftState {
                surface: None,
                balloons: Vec::new(),
                height: 0.0,
                token: None,
            })),
        }
    }

    /// Creates one balloon per colour on a fixed vertical stagger and
    /// registers the per-tick float step.
    pub fn activate(&self, surface: Rc<dyn DrawingSurface>, colors: &[Rgba]) {
        self.deactivate();

        let height = surface.height();
        let mut balloons = Vec::with_capacity(colors.len());
        for (i, &color) in colors.iter().enumerate() {
            let x = if i % 2 == 0 { COLUMN_NEAR } else { COLUMN_FAR };
            let y = height - BODY_HEIGHT + i as f64 * STAGGER;
            let body = surface.create(
                Shape::Ellipse {
                    cx: x + BODY_WIDTH / 2.0,
                    cy: y + BODY_HEIGHT / 2.0,
                    rx: BODY_WIDTH / 2.0,
                    ry: BODY_HEIGHT / 2.0,
                },
                Style::fill(color),
                BALLOON_TAG,
            );
            let tether_x = x + BODY_WIDTH / 2.0;
            let tether = surface.create(
                Shape::Line {
                    x1: tether_x,
                    y1: y + BODY_HEIGHT,
                    x2: tether_x,
                    y2: y + BODY_HEIGHT + TETHER_LENGTH,
                },
                Style::stroke(Rgba::rgb(0, 0, 0), 1.0),
                BALLOON_TAG,
            );
            balloons.push(Balloon { body, tether });
        }

        {
            let mut state = self.state.borrow_mut();
            state.surface = Some(surface);
            state.balloons = balloons;
            state.height = height;
        }

        let state = self.state.clone();
        let token = self.scheduler.every_tick(move || {
            state.borrow_mut().step();
        });
        self.state.borrow_mut().token = Some(token);
    }

    /// Only needed at screen teardown; the drift otherwise runs for the
    /// surface's entire lifetime.
    pub fn deactivate(&self) {
        let mut state = self.state.borrow_mut();
        if let Some(token) = state.token.take() {
            self.scheduler.cancel(token);
        }
        if let Some(surface) = state.surface.take() {
            surface.clear_tag(BALLOON_TAG);
        }
        state.balloons.clear();
    }
}

impl DriftState {
    fn step(&mut self) {
        let Some(surface) = self.surface.clone() else {
            return;
        };
        for balloon in &self.balloons {
            surface.translate(balloon.body, 0.0, -RISE_PER_TICK);
            surface.translate(balloon.tether, 0.0, -RISE_PER_TICK);
            let Some(bounds) = surface.bounds(balloon.body) else {
                continue;
            };
            if bounds.top < 0.0 {
                // Seamless wrap: exactly one surface height downward.
                surface.translate(balloon.body, 0.0, self.height);
                surface.translate(balloon.tether, 0.0, self.height);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anim::scheduler::TICK_PERIOD;
    use crate::anim::surface::SceneStore;

    const HEIGHT: f64 = 500.0;

    fn colors() -> Vec<Rgba> {
        vec![
            Rgba::rgb(255, 0, 0),
            Rgba::rgb(0, 0, 255),
            Rgba::rgb(0, 255, 0),
        ]
    }

    fn activated_drift() -> (Scheduler, BalloonDrift, Rc<SceneStore>) {
        let scheduler = Scheduler::new(TICK_PERIOD);
        let surface = Rc::new(SceneStore::new(120.0, HEIGHT));
        let drift = BalloonDrift::new(scheduler.clone());
        drift.activate(surface.clone(), &colors());
        (scheduler, drift, surface)
    }

    #[test]
    fn one_body_and_tether_per_color() {
        let (_scheduler, _drift, surface) = activated_drift();
        assert_eq!(surface.tag_count(BALLOON_TAG), colors().len() * 2);
    }

    #[test]
    fn bodies_rise_one_unit_per_tick_and_wrap_by_surface_height() {
        let (scheduler, drift, _surface) = activated_drift();
        let state = drift.state.borrow();
        let surface = state.surface.clone().unwrap();
        let bodies: Vec<_> = state.balloons.iter().map(|b| b.body).collect();
        drop(state);

        // Long enough for every balloon to cross the top at least once.
        for _ in 0..(HEIGHT as usize * 2) {
            let before: Vec<f64> = bodies
                .iter()
                .map(|&id| surface.bounds(id).unwrap().top)
                .collect();
            scheduler.tick();
            for (&id, top_before) in bodies.iter().zip(before) {
                let top_after = surface.bounds(id).unwrap().top;
                if top_before - RISE_PER_TICK >= 0.0 {
                    assert!((top_after - (top_before - RISE_PER_TICK)).abs() < 1e-9);
                } else {
                    // Wrapped: exactly one surface height below the
                    // pre-wrap position.
                    assert!(
                        (top_after - (top_before - RISE_PER_TICK + HEIGHT)).abs() < 1e-9
                    );
                }
            }
        }
    }

    #[test]
    fn tether_follows_its_body() {
        let (scheduler, drift, _surface) = activated_drift();
        let state = drift.state.borrow();
        let surface = state.surface.clone().unwrap();
        let balloon = &state.balloons[0];
        let gap_before =
            surface.bounds(balloon.tether).unwrap().top - surface.bounds(balloon.body).unwrap().top;
        let (body, tether) = (balloon.body, balloon.tether);
        drop(state);

        for _ in 0..1200 {
            scheduler.tick();
        }
        let gap_after = surface.bounds(tether).unwrap().top - surface.bounds(body).unwrap().top;
        assert!((gap_after - gap_before).abs() < 1e-9);
    }
}
