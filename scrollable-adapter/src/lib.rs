//! Adapter utilities for the `scrollable` crate.
//!
//! The `scrollable` crate is UI-agnostic and only talks to its host through the `Dom` and
//! `Animator` traits. This crate provides small, framework-neutral pieces commonly needed
//! around it:
//!
//! - Tween-based animation (`TweenAnimator`, easing curves)
//! - An in-memory document (`MemoryDom`) for headless hosts, demos and tests
//! - Translation of loose JSON arguments (`json`) into typed positions and options
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

pub mod json;
mod memory;
mod tween;


pub use memory::{MemoryDom, WindowNodes};
pub use tween::{Easing, Tween, TweenAnimator, TweenMotion};
