use core::fmt;
use core::str::FromStr;

use crate::{Result, ScrollError};

/// Legacy numeric sentinel for "do not move this axis".
///
/// Inside the engine an ignored axis is `None`; see [`Coordinates::from_raw`].
pub const IGNORE_AXIS: f64 = -999.0;

/// Opaque handle to a node owned by the host document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub u64);

/// Identifies one queued entry (scroll animation or effect) for its whole lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnimationId(pub u64);

/// A single scroll axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    pub const BOTH: [Axis; 2] = [Axis::Horizontal, Axis::Vertical];

    pub fn other(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The canonical axis option: one axis or both.
///
/// `Both` is valid for queries and for hash positions, never for resolving a primitive position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AxisSelection {
    Vertical,
    Horizontal,
    Both,
}

impl AxisSelection {
    pub fn includes(self, axis: Axis) -> bool {
        match self {
            Self::Both => true,
            Self::Vertical => axis == Axis::Vertical,
            Self::Horizontal => axis == Axis::Horizontal,
        }
    }

    /// Narrows the selection to a single axis, failing with `AmbiguousAxis` for `Both`.
    pub fn single(self) -> Result<Axis> {
        match self {
            Self::Vertical => Ok(Axis::Vertical),
            Self::Horizontal => Ok(Axis::Horizontal),
            Self::Both => Err(ScrollError::AmbiguousAxis),
        }
    }
}

impl From<Axis> for AxisSelection {
    fn from(axis: Axis) -> Self {
        match axis {
            Axis::Horizontal => Self::Horizontal,
            Axis::Vertical => Self::Vertical,
        }
    }
}

impl FromStr for AxisSelection {
    type Err = ScrollError;

    fn from_str(s: &str) -> Result<Self> {
        crate::normalize_axis_name(s)
    }
}

/// A per-axis target. `None` means the axis is not part of the requested move.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coordinates {
    pub horizontal: Option<f64>,
    pub vertical: Option<f64>,
}

impl Coordinates {
    pub const IGNORED: Self = Self {
        horizontal: None,
        vertical: None,
    };

    pub fn new(horizontal: Option<f64>, vertical: Option<f64>) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    /// Converts values using the numeric [`IGNORE_AXIS`] sentinel.
    pub fn from_raw(horizontal: f64, vertical: f64) -> Self {
        let lift = |v: f64| (v != IGNORE_AXIS).then_some(v);
        Self::new(lift(horizontal), lift(vertical))
    }

    pub fn get(&self, axis: Axis) -> Option<f64> {
        match axis {
            Axis::Horizontal => self.horizontal,
            Axis::Vertical => self.vertical,
        }
    }

    pub fn set(&mut self, axis: Axis, value: Option<f64>) {
        match axis {
            Axis::Horizontal => self.horizontal = value,
            Axis::Vertical => self.vertical = value,
        }
    }

    pub fn with(mut self, axis: Axis, value: Option<f64>) -> Self {
        self.set(axis, value);
        self
    }

    pub fn is_ignored(&self) -> bool {
        self.horizontal.is_none() && self.vertical.is_none()
    }

    /// Axes that carry a value, horizontal first.
    pub fn axes(&self) -> impl Iterator<Item = Axis> + '_ {
        Axis::BOTH.into_iter().filter(|&a| self.get(a).is_some())
    }
}

/// An actual scroll position snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollState {
    pub horizontal: f64,
    pub vertical: f64,
}

impl ScrollState {
    pub fn new(horizontal: f64, vertical: f64) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    pub fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.horizontal,
            Axis::Vertical => self.vertical,
        }
    }

    pub fn set(&mut self, axis: Axis, value: f64) {
        match axis {
            Axis::Horizontal => self.horizontal = value,
            Axis::Vertical => self.vertical = value,
        }
    }

    pub fn floor(self) -> Self {
        Self::new(self.horizontal.floor(), self.vertical.floor())
    }

    pub fn to_coordinates(self) -> Coordinates {
        Coordinates::new(Some(self.horizontal), Some(self.vertical))
    }
}

/// How a new `scroll_to` call chains onto scrolls that are already running or queued.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollMode {
    /// Stop everything in the queue and scroll to the new target.
    #[default]
    Replace,
    /// Run after everything already in the queue.
    Append,
    /// Stop everything, but keep pending targets on axes the new call leaves out.
    Merge,
}

impl ScrollMode {
    /// `append` wins when both flags are set.
    pub fn from_flags(append: bool, merge: bool) -> Self {
        if append {
            Self::Append
        } else if merge {
            Self::Merge
        } else {
            Self::Replace
        }
    }

    pub fn chains(self) -> bool {
        matches!(self, Self::Append | Self::Merge)
    }
}

/// Why a scroll animation was aborted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CancelReason {
    Replace,
    Merge,
    Scroll,
    Click,
}

impl CancelReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Replace => "replace",
            Self::Merge => "merge",
            Self::Scroll => "scroll",
            Self::Click => "click",
        }
    }
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four exit callbacks that carry a message bag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ExitCallback {
    Complete,
    Done,
    Fail,
    Always,
}

impl ExitCallback {
    pub const ALL: [ExitCallback; 4] = [Self::Complete, Self::Done, Self::Fail, Self::Always];
}

impl FromStr for ExitCallback {
    type Err = ScrollError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "complete" => Ok(Self::Complete),
            "done" => Ok(Self::Done),
            "fail" => Ok(Self::Fail),
            "always" => Ok(Self::Always),
            other => Err(ScrollError::InvalidOption {
                option: "callbacks",
                reason: format!("unknown exit callback {other:?}"),
            }),
        }
    }
}

/// Which kinds of user interaction are allowed to abort a scroll.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IgnoreUser {
    /// React to both user scrolling and clicks/taps.
    #[default]
    Never,
    /// Ignore the user entirely.
    Always,
    /// Ignore user scrolling, still react to clicks/taps.
    Scroll,
    /// Ignore clicks/taps, still react to user scrolling.
    Click,
}

impl IgnoreUser {
    pub fn watches_scroll(self) -> bool {
        matches!(self, Self::Never | Self::Click)
    }

    pub fn watches_click(self) -> bool {
        matches!(self, Self::Never | Self::Scroll)
    }
}

impl From<bool> for IgnoreUser {
    fn from(ignore: bool) -> Self {
        if ignore { Self::Always } else { Self::Never }
    }
}

impl FromStr for IgnoreUser {
    type Err = ScrollError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "true" => Ok(Self::Always),
            "false" => Ok(Self::Never),
            "scroll" => Ok(Self::Scroll),
            "click" => Ok(Self::Click),
            other => Err(ScrollError::InvalidOption {
                option: "ignoreUser",
                reason: format!("expected true, \"scroll\" or \"click\", got {other:?}"),
            }),
        }
    }
}
