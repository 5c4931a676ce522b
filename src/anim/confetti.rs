use std::cell::RefCell;
use std::rc::Rc;

use rand::Rng;

use super::scheduler::{Scheduler, TimerToken};
use super::surface::{DrawingSurface, PrimitiveId, Rgba, Shape, Style};

pub const CONFETTI_TAG: &str = "confetti";

pub const PALETTE: [Rgba; 10] = [
    Rgba::rgb(0xff, 0x4d, 0x6d),
    Rgba::rgb(0xfc, 0xa3, 0x11),
    Rgba::rgb(0x48, 0xbf, 0xe3),
    Rgba::rgb(0x64, 0xdf, 0xdf),
    Rgba::rgb(0x80, 0xed, 0x99),
    Rgba::rgb(0xb5, 0x17, 0x9e),
    Rgba::rgb(0xff, 0xd1, 0x66),
    Rgba::rgb(0x06, 0xd6, 0xa0),
    Rgba::rgb(0xef, 0x47, 0x6f),
    Rgba::rgb(0x11, 0x8a, 0xb2),
];

struct Particle {
    id: PrimitiveId,
    x: f64,
    y: f64,
    radius: f64,
    speed: f64,
    drift: f64,
}

struct ConfettiState {
    surface: Option<Rc<dyn DrawingSurface>>,
    particles: Vec<Particle>,
    width: f64,
    height: f64,
    token: Option<TimerToken>,
}

/// Falling confetti on a drawing surface. Particles are respawned at the
/// top when they leave the visible area, keeping their speed, drift and
/// colour.
#[derive(Clone)]
pub struct ConfettiSystem {
    scheduler: Scheduler,
    state: Rc<RefCell<ConfettiState>>,
}

impl ConfettiSystem {
    pub fn new(scheduler: Scheduler) -> Self {
        ConfettiSystem {
            scheduler,
            state: Rc::new(RefCell::new(ConfettiState {
                surface: None,
                particles: Vec::new(),
                width: 0.0,
                height: 0.0,
                token: None,
            })),
        }
    }

    pub fn is_active(&self) -> bool {
        self.state.borrow().token.is_some()
    }

    /// Spawns `count` particles and registers the per-tick step. Any
    /// previous activation is torn down first, so toggling can never
    /// leave duplicate registrations or orphaned primitives.
    pub fn activate(&self, surface: Rc<dyn DrawingSurface>, count: usize) {
        self.deactivate();

        let width = surface.width();
        let height = surface.height();
        let mut rng = rand::rng();
        let mut particles = Vec::with_capacity(count);
        for _ in 0..count {
            let x = rng.random_range(0.0..=width);
            let y = rng.random_range(-height..0.0);
            let radius = rng.random_range(3.0..=7.0);
            let speed = rng.random_range(1.5..=4.0);
            let drift = rng.random_range(-1.0..=1.0);
            let color = PALETTE[rng.random_range(0..PALETTE.len())];
            let id = surface.create(
                Shape::Disc { cx: x, cy: y, radius },
                Style::fill(color),
                CONFETTI_TAG,
            );
            particles.push(Particle {
                id,
                x,
                y,
                radius,
                speed,
                drift,
            });
        }

        {
            let mut state = self.state.borrow_mut();
            state.surface = Some(surface);
            state.particles = particles;
            state.width = width;
            state.height = height;
        }

        let state = self.state.clone();
        let token = self.scheduler.every_tick(move || {
            state.borrow_mut().step();
        });
        self.state.borrow_mut().token = Some(token);
    }

    /// Cancels the step registration and removes all drawn particles.
    /// Safe to call repeatedly.
    pub fn deactivate(&self) {
        let mut state = self.state.borrow_mut();
        if let Some(token) = state.token.take() {
            self.scheduler.cancel(token);
        }
        if let Some(surface) = state.surface.take() {
            surface.clear_tag(CONFETTI_TAG);
        }
        state.particles.clear();
    }

    #[cfg(test)]
    fn positions(&self) -> Vec<(f64, f64, f64, f64, f64)> {
        self.state
            .borrow()
            .particles
            .iter()
            .map(|p| (p.x, p.y, p.radius, p.speed, p.drift))
            .collect()
    }
}

impl ConfettiState {
    fn step(&mut self) {
        let Some(surface) = self.surface.clone() else {
            return;
        };
        let mut rng = rand::rng();
        for particle in self.particles.iter_mut() {
            if particle.y + particle.radius > self.height {
                // Fell past the bottom: respawn just above the top.
                // Speed, drift and colour stay with the particle.
                let new_x = rng.random_range(0.0..=self.width);
                let new_y = -2.0 * particle.radius;
                surface.translate(particle.id, new_x - particle.x, new_y - particle.y);
                particle.x = new_x;
                particle.y = new_y;
            } else {
                particle.x += particle.drift;
                particle.y += particle.speed;
                surface.translate(particle.id, particle.drift, particle.speed);
            }
        }
    }
}
