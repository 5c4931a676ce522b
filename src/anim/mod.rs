//! Animation core: a cooperative tick scheduler plus the effects that
//! share one drawing surface without touching each other's primitives.

pub mod balloons;
pub mod confetti;
pub mod heart;
pub mod scheduler;
pub mod surface;
