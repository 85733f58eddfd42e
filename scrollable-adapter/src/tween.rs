use scrollable::{Animator, Axis, Coordinates, Motion, MotionFrame, MotionRequest};

/// A single-axis tween over scroll offsets.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tween {
    pub from: f64,
    pub to: f64,
    pub start_ms: u64,
    pub duration_ms: u64,
    pub easing: Easing,
}

impl Tween {
    pub fn new(from: f64, to: f64, start_ms: u64, duration_ms: u64, easing: Easing) -> Self {
        Self {
            from,
            to,
            start_ms,
            duration_ms,
            easing,
        }
    }

    /// Linear time progress in `[0, 1]`. Zero-length tweens are done immediately.
    pub fn progress(&self, now_ms: u64) -> f64 {
        if self.duration_ms == 0 {
            return 1.0;
        }
        let elapsed = now_ms.saturating_sub(self.start_ms);
        (elapsed as f64 / self.duration_ms as f64).clamp(0.0, 1.0)
    }

    pub fn is_done(&self, now_ms: u64) -> bool {
        self.progress(now_ms) >= 1.0
    }

    pub fn sample(&self, now_ms: u64) -> f64 {
        let t = self.progress(now_ms);
        if t >= 1.0 {
            return self.to;
        }
        let eased = self.easing.sample(t);
        self.from + (self.to - self.from) * eased
    }

    pub fn retarget(&mut self, now_ms: u64, new_to: f64, duration_ms: u64) {
        let cur = self.sample(now_ms);
        *self = Self::new(cur, new_to, now_ms, duration_ms, self.easing);
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Easing {
    Linear,
    /// jQuery's default `swing` curve.
    #[default]
    Swing,
    SmoothStep,
    EaseInOutCubic,
}

impl Easing {
    pub fn sample(self, t: f64) -> f64 {
        match self {
            Self::Linear => t,
            Self::Swing => 0.5 - (t * core::f64::consts::PI).cos() / 2.0,
            Self::SmoothStep => t * t * (3.0 - 2.0 * t),
            Self::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let u = -2.0 * t + 2.0;
                    1.0 - (u * u * u) / 2.0
                }
            }
        }
    }
}

/// Two independent axis tweens sharing one clock.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TweenMotion {
    pub horizontal: Option<Tween>,
    pub vertical: Option<Tween>,
    start_ms: u64,
    duration_ms: u64,
    easing: Easing,
}

impl TweenMotion {
    pub fn new(request: MotionRequest, easing: Easing) -> Self {
        let tween = |axis: Axis| {
            let to = request.to.get(axis)?;
            let from = request.from.get(axis).unwrap_or(to);
            Some(Tween::new(
                from,
                to,
                request.start_ms,
                request.duration_ms,
                easing,
            ))
        };
        Self {
            horizontal: tween(Axis::Horizontal),
            vertical: tween(Axis::Vertical),
            start_ms: request.start_ms,
            duration_ms: request.duration_ms,
            easing,
        }
    }

    fn end_ms(&self) -> u64 {
        self.start_ms.saturating_add(self.duration_ms)
    }

    fn tween(&self, axis: Axis) -> Option<&Tween> {
        match axis {
            Axis::Horizontal => self.horizontal.as_ref(),
            Axis::Vertical => self.vertical.as_ref(),
        }
    }

    fn slot(&mut self, axis: Axis) -> &mut Option<Tween> {
        match axis {
            Axis::Horizontal => &mut self.horizontal,
            Axis::Vertical => &mut self.vertical,
        }
    }
}

impl Motion for TweenMotion {
    fn sample(&mut self, now_ms: u64) -> MotionFrame {
        let mut values = Coordinates::IGNORED;
        for axis in Axis::BOTH {
            values.set(axis, self.tween(axis).map(|t| t.sample(now_ms)));
        }
        let clock = Tween::new(0.0, 1.0, self.start_ms, self.duration_ms, Easing::Linear);
        MotionFrame {
            values,
            progress: clock.progress(now_ms),
            finished: clock.is_done(now_ms),
        }
    }

    fn target(&self) -> Coordinates {
        Coordinates::new(
            self.horizontal.map(|t| t.to),
            self.vertical.map(|t| t.to),
        )
    }

    fn retarget(&mut self, now_ms: u64, from: Coordinates, to: Coordinates) {
        let remaining_ms = self.end_ms().saturating_sub(now_ms);
        let easing = self.easing;
        for axis in to.axes() {
            let Some(new_to) = to.get(axis) else {
                continue;
            };
            let slot = self.slot(axis);
            if let Some(tween) = slot.as_mut() {
                tween.retarget(now_ms, new_to, remaining_ms);
            } else {
                let start = from.get(axis).unwrap_or(new_to);
                *slot = Some(Tween::new(start, new_to, now_ms, remaining_ms, easing));
            }
        }
    }
}

/// An [`Animator`] producing [`TweenMotion`]s with a fixed easing curve.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TweenAnimator {
    pub easing: Easing,
}

impl TweenAnimator {
    pub fn new(easing: Easing) -> Self {
        Self { easing }
    }
}

impl Animator for TweenAnimator {
    fn animate(&mut self, request: MotionRequest) -> Box<dyn Motion> {
        Box::new(TweenMotion::new(request, self.easing))
    }
}
