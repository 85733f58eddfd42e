use crate::{AnimationId, Axis, CancelReason, Message, NodeId, ScrollState};

/// One lifecycle event of a queued animation.
///
/// `container` is the node the caller scrolled: for windows this is the window itself, never
/// the `html`/`body` element that actually moves.
#[derive(Clone, Debug, PartialEq)]
pub struct ScrollEvent {
    pub animation: AnimationId,
    pub container: NodeId,
    pub kind: ScrollEventKind,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ScrollEventKind {
    /// The animation left the queue and began moving.
    Start,
    /// One axis was moved to `value` during a frame.
    Step { axis: Axis, value: f64 },
    /// Emitted once per frame after the steps.
    Progress { progress: f64, remaining_ms: u64 },
    /// The animation reached its target (possibly by jumping there on stop).
    Done {
        state: ScrollState,
        jumped_to_end: bool,
        message: Message,
    },
    Complete { message: Message },
    /// The animation was aborted. `cancelled` is set when the engine knows why.
    Fail {
        state: ScrollState,
        cancelled: Option<CancelReason>,
        message: Message,
    },
    /// Always the last event of a scroll animation, whichever way it ended.
    Always {
        state: ScrollState,
        succeeded: bool,
        message: Message,
    },
    /// A placeholder reached the head of its queue and holds it until `dequeue`.
    Reserved { label: String },
}

impl ScrollEventKind {
    pub fn is_exit(&self) -> bool {
        matches!(
            self,
            Self::Done { .. } | Self::Complete { .. } | Self::Fail { .. } | Self::Always { .. }
        )
    }

    pub fn message(&self) -> Option<&Message> {
        match self {
            Self::Done { message, .. }
            | Self::Complete { message }
            | Self::Fail { message, .. }
            | Self::Always { message, .. } => Some(message),
            _ => None,
        }
    }
}
