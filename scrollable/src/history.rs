use std::collections::VecDeque;

use crate::{Axis, Coordinates, ScrollState};

/// Recent real vs. expected positions of a scroll animation, one entry per frame.
///
/// Both buffers keep at most `capacity` entries; the oldest frame is dropped first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepHistory {
    real: VecDeque<Coordinates>,
    expected: VecDeque<Coordinates>,
    capacity: usize,
}

impl StepHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            real: VecDeque::with_capacity(capacity),
            expected: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.real.is_empty() && self.expected.is_empty()
    }

    pub fn len(&self) -> usize {
        self.real.len().max(self.expected.len())
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn record(&mut self, real: Coordinates, expected: Coordinates) {
        if self.capacity == 0 {
            return;
        }
        push_bounded(&mut self.real, real, self.capacity);
        push_bounded(&mut self.expected, expected, self.capacity);
    }

    pub fn real(&self) -> impl Iterator<Item = &Coordinates> {
        self.real.iter()
    }

    pub fn expected(&self) -> impl Iterator<Item = &Coordinates> {
        self.expected.iter()
    }

    pub fn last_real(&self) -> Option<&Coordinates> {
        self.real.back()
    }

    pub fn last_expected(&self) -> Option<&Coordinates> {
        self.expected.back()
    }

    /// `true` if `value` was recorded on `axis` as either a real or an expected position.
    pub fn contains(&self, axis: Axis, value: f64) -> bool {
        self.real
            .iter()
            .chain(self.expected.iter())
            .any(|c| c.get(axis) == Some(value))
    }

    /// Re-bounds an inherited history to the current capacity.
    pub(crate) fn resized(mut self, capacity: usize) -> Self {
        while self.real.len() > capacity {
            self.real.pop_front();
        }
        while self.expected.len() > capacity {
            self.expected.pop_front();
        }
        self.capacity = capacity;
        self
    }
}

fn push_bounded(buf: &mut VecDeque<Coordinates>, value: Coordinates, capacity: usize) {
    if buf.len() == capacity {
        buf.pop_front();
    }
    buf.push_back(value);
}

/// Detection state of a single animation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetectorState {
    Disabled,
    Armed,
    Triggered,
}

/// Accumulates user-caused deviations from the positions the engine set.
#[derive(Clone, Debug)]
pub(crate) struct UserScrollDetector {
    state: DetectorState,
    threshold: f64,
    noise: f64,
    lag_compensation: bool,
    cumulative: ScrollState,
}

impl UserScrollDetector {
    pub(crate) fn new(enabled: bool, threshold: f64, noise: f64, lag_compensation: bool) -> Self {
        Self {
            state: if enabled {
                DetectorState::Armed
            } else {
                DetectorState::Disabled
            },
            threshold,
            noise,
            lag_compensation,
            cumulative: ScrollState::default(),
        }
    }

    pub(crate) fn state(&self) -> DetectorState {
        self.state
    }

    pub(crate) fn cumulative(&self) -> ScrollState {
        self.cumulative
    }

    /// Feeds the floored real position read before this frame's movement.
    ///
    /// Returns `true` once the cumulative deviation on either axis exceeds the threshold.
    pub(crate) fn observe(&mut self, real: ScrollState, history: &StepHistory) -> bool {
        if self.state != DetectorState::Armed {
            return false;
        }
        let Some(expected) = history.last_expected() else {
            return false;
        };

        for axis in Axis::BOTH {
            let Some(expected) = expected.get(axis) else {
                continue;
            };
            let actual = real.get(axis);
            let delta = actual - expected;
            if delta.abs() <= self.noise {
                continue;
            }
            if self.lag_compensation && history.contains(axis, actual) {
                strace!(%axis, actual, "discarding stale scroll read");
                continue;
            }
            let total = self.cumulative.get(axis) + delta;
            self.cumulative.set(axis, total);
            strace!(%axis, delta, total, "user scroll deviation");
        }

        let tripped = Axis::BOTH
            .into_iter()
            .any(|axis| self.cumulative.get(axis).abs() > self.threshold);
        if tripped {
            self.state = DetectorState::Triggered;
        }
        tripped
    }
}
