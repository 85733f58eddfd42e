use core::str::FromStr;

use serde_json::Value;

use crate::message::expect_object;
use crate::{
    AxisSelection, IgnoreUser, Message, Position, QueueName, Result, ScrollConfig, ScrollError,
    ScrollMode,
};

/// Canonicalizes an axis alias.
///
/// Recognized (case-insensitive): `vertical/v/y/top`, `horizontal/h/x/left`,
/// `both/vh/hv/xy/yx/all`.
pub fn normalize_axis_name(name: &str) -> Result<AxisSelection> {
    match name.trim().to_ascii_lowercase().as_str() {
        "vertical" | "v" | "y" | "top" => Ok(AxisSelection::Vertical),
        "horizontal" | "h" | "x" | "left" => Ok(AxisSelection::Horizontal),
        "both" | "vh" | "hv" | "xy" | "yx" | "all" => Ok(AxisSelection::Both),
        _ => Err(ScrollError::InvalidAxisName(name.to_owned())),
    }
}

/// Where a scroll runs: in a queue, or immediately alongside anything else (`queue: false`).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum QueueSelection {
    Queued(QueueName),
    Unqueued,
}

impl Default for QueueSelection {
    fn default() -> Self {
        Self::Queued(QueueName::Internal)
    }
}

impl From<QueueName> for QueueSelection {
    fn from(name: QueueName) -> Self {
        Self::Queued(name)
    }
}

/// Where a new entry lands in its queue.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Placement {
    /// At the tail, behind everything already queued.
    #[default]
    Back,
    /// In the slot right after the entry in progress (e.g. when a placeholder reserved it).
    Next,
}

/// The `lockSpeedBelow` option before coercion.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LockSpeed {
    Off,
    Below(f64),
}

impl LockSpeed {
    /// Coerces to pixels; anything unusable disables the lock.
    pub fn px(self) -> f64 {
        match self {
            Self::Off => 0.0,
            Self::Below(px) if px.is_finite() && px > 0.0 => px,
            Self::Below(_) => 0.0,
        }
    }
}

impl From<f64> for LockSpeed {
    fn from(px: f64) -> Self {
        Self::Below(px)
    }
}

impl From<bool> for LockSpeed {
    fn from(_: bool) -> Self {
        // Only numbers carry a threshold; `false` (and a stray `true`) switch the lock off.
        Self::Off
    }
}

impl FromStr for LockSpeed {
    type Err = core::convert::Infallible;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        let s = s.trim();
        let s = s.strip_suffix("px").unwrap_or(s);
        Ok(s.parse::<f64>().map_or(Self::Off, Self::Below))
    }
}

/// Caller-facing options for [`crate::Scroller::scroll_to`].
///
/// Every field is optional; unset fields fall back to [`ScrollConfig`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScrollOptions {
    /// Axis name or alias (see [`normalize_axis_name`]). Inferred from the position when unset.
    pub axis: Option<String>,
    pub queue: Option<QueueSelection>,
    pub duration_ms: Option<u64>,
    pub ignore_user: Option<IgnoreUser>,
    pub user_scroll_threshold: Option<f64>,
    pub lock_speed_below: Option<LockSpeed>,
    pub append: bool,
    pub merge: bool,
    /// Payload merged into the exit messages of the scrolls this call cancels. Must be an object.
    pub notify_cancelled: Option<Value>,
    pub placement: Placement,
}

impl ScrollOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_axis(mut self, axis: impl Into<String>) -> Self {
        self.axis = Some(axis.into());
        self
    }

    pub fn with_queue(mut self, queue: impl Into<QueueSelection>) -> Self {
        self.queue = Some(queue.into());
        self
    }

    pub fn unqueued(mut self) -> Self {
        self.queue = Some(QueueSelection::Unqueued);
        self
    }

    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn with_ignore_user(mut self, ignore_user: impl Into<IgnoreUser>) -> Self {
        self.ignore_user = Some(ignore_user.into());
        self
    }

    pub fn with_user_scroll_threshold(mut self, threshold: f64) -> Self {
        self.user_scroll_threshold = Some(threshold);
        self
    }

    pub fn with_lock_speed_below(mut self, lock: impl Into<LockSpeed>) -> Self {
        self.lock_speed_below = Some(lock.into());
        self
    }

    pub fn append(mut self) -> Self {
        self.append = true;
        self
    }

    pub fn merge(mut self) -> Self {
        self.merge = true;
        self
    }

    pub fn with_notify_cancelled(mut self, payload: Value) -> Self {
        self.notify_cancelled = Some(payload);
        self
    }

    pub fn run_next(mut self) -> Self {
        self.placement = Placement::Next;
        self
    }
}

/// Options for [`crate::Scroller::stop_scroll`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StopOptions {
    pub jump_to_target_position: bool,
    pub notify_cancelled: Option<Value>,
    pub queue: Option<QueueSelection>,
}

impl StopOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn jump_to_target_position(mut self) -> Self {
        self.jump_to_target_position = true;
        self
    }

    pub fn with_notify_cancelled(mut self, payload: Value) -> Self {
        self.notify_cancelled = Some(payload);
        self
    }

    pub fn with_queue(mut self, queue: impl Into<QueueSelection>) -> Self {
        self.queue = Some(queue.into());
        self
    }
}

/// A fully defaulted options record.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedOptions {
    pub axis: AxisSelection,
    pub queue: QueueSelection,
    pub duration_ms: u64,
    pub ignore_user: IgnoreUser,
    pub user_scroll_threshold: f64,
    pub lock_speed_below: f64,
    pub mode: ScrollMode,
    pub notify_cancelled: Option<Message>,
    pub placement: Placement,
}

impl NormalizedOptions {
    /// Returns a copy narrowed to one axis, used to resolve each entry of a hash position.
    pub(crate) fn for_axis(&self, axis: AxisSelection) -> Self {
        Self {
            axis,
            ..self.clone()
        }
    }
}

/// Fills in defaults and validates `options`. The input is left untouched.
///
/// `position` drives the default axis; pass `None` for calls without a position (e.g. stop).
pub fn normalize_options(
    options: &ScrollOptions,
    position: Option<&Position>,
    config: &ScrollConfig,
) -> Result<NormalizedOptions> {
    let axis = match &options.axis {
        Some(name) => normalize_axis_name(name)?,
        None => position.map_or(AxisSelection::Vertical, Position::default_axis),
    };

    let notify_cancelled = options
        .notify_cancelled
        .clone()
        .map(|v| {
            expect_object(v, |kind| ScrollError::InvalidOption {
                option: "notifyCancelled",
                reason: format!("expected an object, got {kind}"),
            })
        })
        .transpose()?;

    let lock_speed_below = options
        .lock_speed_below
        .map_or_else(|| LockSpeed::Below(config.lock_speed_below).px(), LockSpeed::px);

    Ok(NormalizedOptions {
        axis,
        queue: options.queue.clone().unwrap_or_default(),
        duration_ms: options.duration_ms.unwrap_or(config.duration_ms),
        ignore_user: options.ignore_user.unwrap_or_default(),
        user_scroll_threshold: options
            .user_scroll_threshold
            .unwrap_or(config.user_scroll_threshold),
        lock_speed_below,
        mode: ScrollMode::from_flags(options.append, options.merge),
        notify_cancelled,
        placement: options.placement,
    })
}
