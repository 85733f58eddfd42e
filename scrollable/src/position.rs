//! Position parsing and normalization.
//!
//! A caller-facing position is a number, a string (`"120"`, `"120px"`, `"50%"`, `"+=30px"`,
//! `"-=10%"`, `"top"`, `"bottom"`, `"left"`, `"right"`), or a per-axis hash of those. It is
//! normalized into absolute, rounded, range-clamped [`Coordinates`].

use crate::{
    Axis, AxisSelection, Coordinates, NormalizedOptions, Result, ScrollError, ScrollMode,
    ScrollState, normalize_axis_name,
};

/// A single-axis position value.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PositionValue {
    /// `null`, `false`, `""`: no move requested on this axis.
    Empty,
    Number(f64),
    Text(String),
}

impl PositionValue {
    fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::Number(_) => false,
        }
    }

    fn keyword_axis(&self) -> Option<Axis> {
        let Self::Text(s) = self else {
            return None;
        };
        match s.trim().to_ascii_lowercase().as_str() {
            "top" | "bottom" => Some(Axis::Vertical),
            "left" | "right" => Some(Axis::Horizontal),
            _ => None,
        }
    }
}

impl From<f64> for PositionValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<i32> for PositionValue {
    fn from(v: i32) -> Self {
        Self::Number(v as f64)
    }
}

impl From<&str> for PositionValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for PositionValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// A per-axis position hash. A missing axis is not part of the move.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AxisPositions {
    pub horizontal: Option<PositionValue>,
    pub vertical: Option<PositionValue>,
}

impl AxisPositions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn horizontal(mut self, value: impl Into<PositionValue>) -> Self {
        self.horizontal = Some(value.into());
        self
    }

    pub fn vertical(mut self, value: impl Into<PositionValue>) -> Self {
        self.vertical = Some(value.into());
        self
    }

    /// Builds a hash from alias-keyed entries (`x`, `top`, `vh`, ...).
    ///
    /// A key naming both axes sets both.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Result<Self>
    where
        K: AsRef<str>,
        V: Into<PositionValue>,
    {
        let mut out = Self::default();
        for (key, value) in pairs {
            let value = value.into();
            match normalize_axis_name(key.as_ref())? {
                AxisSelection::Horizontal => out.horizontal = Some(value),
                AxisSelection::Vertical => out.vertical = Some(value),
                AxisSelection::Both => {
                    out.horizontal = Some(value.clone());
                    out.vertical = Some(value);
                }
            }
        }
        Ok(out)
    }

    pub fn get(&self, axis: Axis) -> Option<&PositionValue> {
        match axis {
            Axis::Horizontal => self.horizontal.as_ref(),
            Axis::Vertical => self.vertical.as_ref(),
        }
    }

    fn is_requested(&self, axis: Axis) -> bool {
        self.get(axis).is_some_and(|v| !v.is_empty())
    }
}

/// A caller-facing scroll position.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Position {
    Value(PositionValue),
    Axes(AxisPositions),
}

impl Position {
    /// The axis implied by the shape of the position, used when the caller sets none.
    pub fn default_axis(&self) -> AxisSelection {
        match self {
            Self::Value(v) => v.keyword_axis().map_or(AxisSelection::Vertical, Into::into),
            Self::Axes(axes) => {
                match (
                    axes.is_requested(Axis::Horizontal),
                    axes.is_requested(Axis::Vertical),
                ) {
                    (true, true) => AxisSelection::Both,
                    (true, false) => AxisSelection::Horizontal,
                    _ => AxisSelection::Vertical,
                }
            }
        }
    }
}

impl From<PositionValue> for Position {
    fn from(v: PositionValue) -> Self {
        Self::Value(v)
    }
}

impl From<f64> for Position {
    fn from(v: f64) -> Self {
        Self::Value(v.into())
    }
}

impl From<i32> for Position {
    fn from(v: i32) -> Self {
        Self::Value(v.into())
    }
}

impl From<&str> for Position {
    fn from(s: &str) -> Self {
        Self::Value(s.into())
    }
}

impl From<String> for Position {
    fn from(s: String) -> Self {
        Self::Value(s.into())
    }
}

impl From<AxisPositions> for Position {
    fn from(axes: AxisPositions) -> Self {
        Self::Axes(axes)
    }
}

/// What position normalization needs to know about the scrollable target.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PositionContext {
    /// Current scroll position.
    pub current: ScrollState,
    /// Scroll maximum per axis.
    pub maximum: ScrollState,
    /// Endpoint of every scroll still running or queued, per axis.
    pub pending: Coordinates,
}

impl PositionContext {
    /// The position a new scroll on `axis` effectively starts from.
    ///
    /// Appended and merged scrolls build on the pending endpoint; replacing ones on the
    /// current position.
    pub fn start_position(&self, axis: Axis, mode: ScrollMode) -> f64 {
        if mode.chains() {
            if let Some(pending) = self.pending.get(axis) {
                return pending;
            }
        }
        self.current.get(axis)
    }

    fn inherited(&self, axis: Axis, mode: ScrollMode) -> Option<f64> {
        if mode == ScrollMode::Merge {
            self.pending.get(axis)
        } else {
            None
        }
    }
}

/// Normalizes `position` into absolute, clamped coordinates.
pub fn normalize_position(
    position: &Position,
    ctx: &PositionContext,
    options: &NormalizedOptions,
) -> Result<Coordinates> {
    match position {
        Position::Axes(axes) => {
            let mut out = Coordinates::IGNORED;
            for axis in Axis::BOTH {
                let value = match axes.get(axis) {
                    Some(value) if options.axis.includes(axis) => {
                        let single = options.for_axis(axis.into());
                        normalize_value(value, ctx, &single)?.get(axis)
                    }
                    _ => ctx.inherited(axis, options.mode),
                };
                out.set(axis, value);
            }
            Ok(out)
        }
        Position::Value(value) => normalize_value(value, ctx, options),
    }
}

fn normalize_value(
    value: &PositionValue,
    ctx: &PositionContext,
    options: &NormalizedOptions,
) -> Result<Coordinates> {
    let axis = options.axis.single()?;
    let resolved = match value {
        PositionValue::Empty => ctx.inherited(axis, options.mode),
        PositionValue::Text(raw) if raw.trim().is_empty() => ctx.inherited(axis, options.mode),
        PositionValue::Number(n) => {
            if !n.is_finite() {
                return Err(ScrollError::InvalidPosition(n.to_string()));
            }
            Some(clamp(*n, ctx.maximum.get(axis)))
        }
        PositionValue::Text(raw) => Some(parse_text(raw, axis, ctx, options.mode)?),
    };
    Ok(Coordinates::IGNORED.with(axis, resolved))
}

fn parse_text(raw: &str, axis: Axis, ctx: &PositionContext, mode: ScrollMode) -> Result<f64> {
    let invalid = || ScrollError::InvalidPosition(raw.to_owned());
    let max = ctx.maximum.get(axis);
    let text = raw.trim().to_ascii_lowercase();

    let (sign, rest) = if let Some(rest) = text.strip_prefix("+=") {
        (Some(1.0), rest.trim_start())
    } else if let Some(rest) = text.strip_prefix("-=") {
        (Some(-1.0), rest.trim_start())
    } else {
        (None, text.as_str())
    };

    let amount = if let Some(px) = rest.strip_suffix("px") {
        parse_number(px).ok_or_else(invalid)?
    } else if let Some(percent) = rest.strip_suffix('%') {
        parse_number(percent).ok_or_else(invalid)? / 100.0 * max
    } else if let Some(keyword) = keyword(rest) {
        if sign.is_some() {
            return Err(invalid());
        }
        let (kw_axis, at_end) = keyword;
        if kw_axis != axis {
            return Err(ScrollError::InconsistentPosition {
                position: raw.to_owned(),
                axis: axis.name(),
            });
        }
        if at_end { max } else { 0.0 }
    } else {
        parse_number(rest).ok_or_else(invalid)?
    };

    let absolute = match sign {
        Some(sign) => ctx.start_position(axis, mode) + sign * amount,
        None => amount,
    };
    Ok(clamp(absolute, max))
}

fn keyword(s: &str) -> Option<(Axis, bool)> {
    match s {
        "top" => Some((Axis::Vertical, false)),
        "bottom" => Some((Axis::Vertical, true)),
        "left" => Some((Axis::Horizontal, false)),
        "right" => Some((Axis::Horizontal, true)),
        _ => None,
    }
}

fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim();
    // Rust also accepts "inf"/"nan"; positions must be finite decimal numbers.
    s.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Native scroll offsets truncate fractional pixels, so targets are rounded.
fn clamp(value: f64, max: f64) -> f64 {
    value.round().clamp(0.0, max.max(0.0))
}
