//! A headless engine for smooth, queueable scroll animations.
//!
//! For adapter-level utilities (a tween animator, an in-memory document, loose JSON input),
//! see the `scrollable-adapter` crate.
//!
//! The engine owns the hard parts of animated scrolling:
//! - normalizing containers (window vs. element, `html` vs. `body`) and positions
//!   (numbers, `"+=100"`, `"50%"`, `"top"`, per-axis maps)
//! - per-element animation queues with replace, append and merge semantics
//! - telling user scrolling and clicks apart from its own movement, and aborting on them
//! - delivering lifecycle events (start, step, done/fail/always) with custom messages
//!
//! It is UI-agnostic. The host is expected to provide:
//! - a [`Dom`] implementation (measurements, scroll offsets, containment)
//! - an [`Animator`] that turns a [`MotionRequest`] into a sampled [`Motion`]
//! - a clock: call [`Scroller::tick`] once per frame and forward clicks to
//!   [`Scroller::pointer_down`]
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

mod animator;
mod config;
mod dom;
mod error;
mod event;
mod history;
mod message;
mod options;
mod position;
mod queue;
mod resolve;
mod scroller;
mod types;

#[cfg(test)]
mod tests;

pub use animator::{Animator, Motion, MotionFrame, MotionRequest};
pub use config::{Platform, ScrollConfig};
pub use dom::{Dom, NodeKind, ScrollingRoot, Size};
pub use error::{Result, ScrollError};
pub use event::{ScrollEvent, ScrollEventKind};
pub use history::{DetectorState, StepHistory};
pub use message::{CANCELLED_KEY, Message, OuterMessages};
pub use options::{
    LockSpeed, NormalizedOptions, Placement, QueueSelection, ScrollOptions, StopOptions,
    normalize_axis_name, normalize_options,
};
pub use position::{
    AxisPositions, Position, PositionContext, PositionValue, normalize_position,
};
pub use queue::{AnimationInfo, Effect, QueueName, QueueView};
pub use resolve::{Container, normalize_container, scroll_maximum, scroll_range};
pub use scroller::Scroller;
pub use types::{
    AnimationId, Axis, AxisSelection, CancelReason, Coordinates, ExitCallback, IGNORE_AXIS,
    IgnoreUser, NodeId, ScrollMode, ScrollState,
};
