use crate::{Result, ScrollError};

/// Platform hint supplied by the host's capability detection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Platform {
    #[default]
    Desktop,
    /// Touch/mobile browsers. Some of them report stale scroll offsets for a few frames, so
    /// history-based lag compensation is enabled by default here.
    Mobile,
}

/// Engine-wide configuration for [`crate::Scroller`].
///
/// Values act as defaults for every call; most of them can be overridden per call through
/// [`crate::ScrollOptions`]. The config is validated when a scroll starts, not when it is set.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollConfig {
    /// Default animation duration.
    pub duration_ms: u64,
    /// Cumulative user deviation (px) that aborts a scroll. Must not be below
    /// `frame_noise_threshold`.
    pub user_scroll_threshold: f64,
    /// Travel distance (px) below which short hops are sped up. `0` disables.
    pub lock_speed_below: f64,
    /// Per-frame deviation (px) that is still considered measurement noise.
    pub frame_noise_threshold: f64,
    /// Number of frames kept in each step history.
    pub history_length: usize,
    pub detect_user_scroll: bool,
    pub detect_user_click: bool,
    /// Discard deviations that exactly match a recently recorded position (stale reads).
    pub lag_compensation: bool,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            duration_ms: 400,
            user_scroll_threshold: 10.0,
            lock_speed_below: 0.0,
            frame_noise_threshold: 1.0,
            history_length: 6,
            detect_user_scroll: true,
            detect_user_click: true,
            lag_compensation: false,
        }
    }
}

impl ScrollConfig {
    pub fn for_platform(platform: Platform) -> Self {
        Self {
            lag_compensation: platform == Platform::Mobile,
            ..Self::default()
        }
    }

    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn with_user_scroll_threshold(mut self, threshold: f64) -> Self {
        self.user_scroll_threshold = threshold;
        self
    }

    pub fn with_lock_speed_below(mut self, lock_speed_below: f64) -> Self {
        self.lock_speed_below = lock_speed_below;
        self
    }

    pub fn with_frame_noise_threshold(mut self, threshold: f64) -> Self {
        self.frame_noise_threshold = threshold;
        self
    }

    pub fn with_history_length(mut self, history_length: usize) -> Self {
        self.history_length = history_length;
        self
    }

    pub fn with_detect_user_scroll(mut self, enabled: bool) -> Self {
        self.detect_user_scroll = enabled;
        self
    }

    pub fn with_detect_user_click(mut self, enabled: bool) -> Self {
        self.detect_user_click = enabled;
        self
    }

    pub fn with_lag_compensation(mut self, enabled: bool) -> Self {
        self.lag_compensation = enabled;
        self
    }

    /// Checks an effective user-scroll threshold against the noise floor.
    pub(crate) fn check_user_scroll_threshold(&self, threshold: f64) -> Result<()> {
        if threshold.is_nan() || threshold < self.frame_noise_threshold {
            return Err(ScrollError::InvalidConfig(format!(
                "userScrollThreshold {threshold} is below the minimum detectable value {}",
                self.frame_noise_threshold
            )));
        }
        Ok(())
    }
}
