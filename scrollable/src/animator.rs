//! The animation primitive the engine orchestrates.
//!
//! The engine never computes easing or timing curves itself: it asks an [`Animator`] for a
//! [`Motion`] and samples it once per frame.

use crate::Coordinates;

/// Parameters for one scroll animation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionRequest {
    /// Start values for the axes in `to` (other axes are `None`).
    pub from: Coordinates,
    /// Target values; `None` axes are not animated.
    pub to: Coordinates,
    pub start_ms: u64,
    pub duration_ms: u64,
}

/// One sampled frame of a motion.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionFrame {
    /// Animated values for the axes of the request.
    pub values: Coordinates,
    /// Progress in `[0, 1]`.
    pub progress: f64,
    pub finished: bool,
}

/// A running tween.
pub trait Motion {
    fn sample(&mut self, now_ms: u64) -> MotionFrame;

    /// The values the motion ends on.
    fn target(&self) -> Coordinates;

    /// Heads for `to` from `now_ms` on, keeping the time the motion ends at. Axes the motion
    /// did not animate so far start at their value in `from`.
    fn retarget(&mut self, now_ms: u64, from: Coordinates, to: Coordinates);
}

/// Creates motions. Implemented by the host's tween engine.
pub trait Animator {
    fn animate(&mut self, request: MotionRequest) -> Box<dyn Motion>;
}

impl<A: Animator + ?Sized> Animator for &mut A {
    fn animate(&mut self, request: MotionRequest) -> Box<dyn Motion> {
        (**self).animate(request)
    }
}
