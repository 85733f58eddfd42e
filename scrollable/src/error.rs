//! Error types for the scroll engine.

use thiserror::Error;

/// Errors raised synchronously by the call that introduced the invalid input.
///
/// Cancellation (user scroll, click, stop, replace) is never an error: it is reported through
/// [`crate::ScrollEventKind::Fail`] events.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScrollError {
    /// An axis name that is not one of the recognized aliases.
    #[error("invalid axis name: {0:?}")]
    InvalidAxisName(String),

    /// The axis resolved to `both` where a single axis was required.
    #[error("ambiguous axis: a single axis (horizontal or vertical) is required here")]
    AmbiguousAxis,

    /// A keyword position that belongs to the other axis (e.g. `"top"` on the horizontal axis).
    #[error("position {position:?} is inconsistent with the {axis} axis")]
    InconsistentPosition { position: String, axis: &'static str },

    /// A position value that no recognized form can parse.
    #[error("invalid position: {0:?}")]
    InvalidPosition(String),

    /// An option with an unsupported value.
    #[error("invalid option `{option}`: {reason}")]
    InvalidOption { option: &'static str, reason: String },

    /// A configuration value the engine cannot work with.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A custom queue name was forced onto an effect that only runs on the default queue.
    #[error("effect `{effect}` only supports the default queue, got {queue}")]
    UnsupportedQueueForEffect { effect: String, queue: String },

    /// The message passed to `notify_scroll_callbacks` is not a plain object.
    #[error("invalid message: expected a JSON object, got {0}")]
    InvalidMessage(String),
}

/// Result type for scroll engine operations.
pub type Result<T> = core::result::Result<T, ScrollError>;
