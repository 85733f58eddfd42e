//! Per-(element, queue name) animation queues.
//!
//! Each queue is an explicit deque owned by the engine: at most one entry is in progress
//! (`current`), the rest wait in `pending` in FIFO order. Metadata of scroll entries can be
//! enumerated directly, so no marker entries are needed to introspect a queue.

use core::fmt;
use std::collections::{BTreeMap, VecDeque};

use crate::scroller::ActiveScroll;
use crate::{
    AnimationId, Container, Coordinates, NodeId, NormalizedOptions, OuterMessages, Placement,
    StepHistory,
};

/// Identifies a queue on an element.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum QueueName {
    /// The engine's own scroll queue. Started automatically whenever it is idle.
    Internal,
    /// The host's standard effects queue. Also started automatically.
    Default,
    /// A caller-managed queue: entries wait until [`crate::Scroller::dequeue`] kicks it off.
    Named(String),
}

impl QueueName {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    pub fn auto_starts(&self) -> bool {
        matches!(self, Self::Internal | Self::Default)
    }
}

impl fmt::Display for QueueName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Internal => f.write_str("internal"),
            Self::Default => f.write_str("fx"),
            Self::Named(name) => write!(f, "{name:?}"),
        }
    }
}

/// A non-scroll entry a caller can put into a queue.
///
/// Scroll animations are queued by [`crate::Scroller::scroll_to`] itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// A generic external animation. Its queue name travels in its options.
    Animate { duration_ms: u64 },
    /// A pause. Its queue name is a positional argument.
    Delay { duration_ms: u64 },
    /// A shorthand effect (fade, slide, ...). These only run on the default queue.
    Shorthand { name: String, duration_ms: u64 },
    /// Reserves a slot: holds the queue until dequeued, so a later call can fill the slot
    /// with [`Placement::Next`].
    Placeholder { label: String },
}

impl Effect {
    pub fn name(&self) -> &str {
        match self {
            Self::Animate { .. } => "animate",
            Self::Delay { .. } => "delay",
            Self::Shorthand { name, .. } => name,
            Self::Placeholder { .. } => "placeholder",
        }
    }

    /// Whether the effect can run on `queue`.
    pub fn accepts(&self, queue: &QueueName) -> bool {
        match self {
            Self::Animate { .. } | Self::Delay { .. } | Self::Placeholder { .. } => true,
            Self::Shorthand { .. } => *queue == QueueName::Default,
        }
    }

    pub(crate) fn hold_ms(&self) -> Option<u64> {
        match self {
            Self::Animate { duration_ms }
            | Self::Delay { duration_ms }
            | Self::Shorthand { duration_ms, .. } => Some(*duration_ms),
            Self::Placeholder { .. } => None,
        }
    }
}

/// Metadata of a scroll entry resident in a queue.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationInfo {
    pub id: AnimationId,
    /// The normalized target.
    pub position: Coordinates,
    /// Frames recorded so far (empty until the animation starts).
    pub history: StepHistory,
    pub callback_messages: OuterMessages,
    pub running: bool,
}

/// Where a new scroll animation takes its initial step history from.
#[derive(Clone, Debug)]
pub(crate) enum HistorySeed {
    Fresh,
    Inherited(StepHistory),
    /// The history of the given scroll, if it is the entry that ran right before this one.
    Predecessor(AnimationId),
}

#[derive(Clone, Debug)]
pub(crate) struct ScrollJob {
    pub container: Container,
    pub scrollable: NodeId,
    pub target: Coordinates,
    pub options: NormalizedOptions,
    pub messages: OuterMessages,
    pub history: HistorySeed,
}

#[derive(Clone, Debug)]
pub(crate) enum Payload {
    Scroll(Box<ScrollJob>),
    Effect(Effect),
}

#[derive(Clone, Debug)]
pub(crate) struct QueueEntry {
    pub id: AnimationId,
    /// The caller-facing container, used to tag events.
    pub container: NodeId,
    pub payload: Payload,
}

impl QueueEntry {
    fn info(&self) -> Option<AnimationInfo> {
        let Payload::Scroll(job) = &self.payload else {
            return None;
        };
        let history = match &job.history {
            HistorySeed::Inherited(h) => h.clone(),
            HistorySeed::Fresh | HistorySeed::Predecessor(_) => StepHistory::default(),
        };
        Some(AnimationInfo {
            id: self.id,
            position: job.target,
            history,
            callback_messages: job.messages.clone(),
            running: false,
        })
    }
}

/// The entry a queue is executing.
pub(crate) enum Current {
    Scroll(Box<ActiveScroll>),
    Hold { id: AnimationId, until_ms: u64 },
    Placeholder { id: AnimationId },
}

impl fmt::Debug for Current {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scroll(active) => f.debug_tuple("Scroll").field(active).finish(),
            Self::Hold { id, until_ms } => f
                .debug_struct("Hold")
                .field("id", id)
                .field("until_ms", until_ms)
                .finish(),
            Self::Placeholder { id } => f.debug_struct("Placeholder").field("id", id).finish(),
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct Queue {
    pub current: Option<Current>,
    pending: VecDeque<QueueEntry>,
    /// History left by the scroll that just completed, cleared as soon as anything else starts.
    pub last_history: Option<(AnimationId, StepHistory)>,
}

impl Queue {
    pub(crate) fn is_idle(&self) -> bool {
        self.current.is_none()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.current.is_none() && self.pending.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.pending.len() + usize::from(self.current.is_some())
    }

    pub(crate) fn push(&mut self, entry: QueueEntry, placement: Placement) {
        match placement {
            Placement::Back => self.pending.push_back(entry),
            // The entry in progress is held in `current`, so "right after it" is the head.
            Placement::Next => self.insert_at(0, entry),
        }
    }

    pub(crate) fn insert_at(&mut self, index: usize, entry: QueueEntry) {
        let index = index.min(self.pending.len());
        self.pending.insert(index, entry);
    }

    pub(crate) fn peek(&self) -> Option<&QueueEntry> {
        self.pending.front()
    }

    pub(crate) fn pop_front(&mut self) -> Option<QueueEntry> {
        self.pending.pop_front()
    }

    /// Drops every waiting entry.
    pub(crate) fn remove_all(&mut self) {
        self.pending.clear();
    }

    /// Scroll metadata, oldest first (the running scroll, then the waiting ones).
    pub(crate) fn infos(&self) -> Vec<AnimationInfo> {
        let running = match &self.current {
            Some(Current::Scroll(active)) => Some(active.info()),
            _ => None,
        };
        running
            .into_iter()
            .chain(self.pending.iter().filter_map(QueueEntry::info))
            .collect()
    }

    /// The per-axis endpoint all running and waiting scrolls converge on.
    pub(crate) fn pending_target(&self) -> Coordinates {
        let mut out = Coordinates::IGNORED;
        for info in self.infos() {
            for axis in info.position.axes() {
                out.set(axis, info.position.get(axis));
            }
        }
        out
    }

    /// Message bags of the running and waiting scrolls.
    pub(crate) fn messages_mut(&mut self) -> impl Iterator<Item = &mut OuterMessages> {
        let running = match &mut self.current {
            Some(Current::Scroll(active)) => Some(&mut active.messages),
            _ => None,
        };
        let waiting = self.pending.iter_mut().filter_map(|e| match &mut e.payload {
            Payload::Scroll(job) => Some(&mut job.messages),
            Payload::Effect(_) => None,
        });
        running.into_iter().chain(waiting)
    }
}

/// Key of one queue.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct QueueKey {
    pub element: NodeId,
    pub name: QueueName,
}

impl QueueKey {
    pub(crate) fn new(element: NodeId, name: QueueName) -> Self {
        Self { element, name }
    }
}

/// Owns every queue of the engine.
#[derive(Debug, Default)]
pub(crate) struct QueueAdapter {
    queues: BTreeMap<QueueKey, Queue>,
}

impl QueueAdapter {
    pub(crate) fn get_mut(&mut self, key: &QueueKey) -> Option<&mut Queue> {
        self.queues.get_mut(key)
    }

    pub(crate) fn queue_mut(&mut self, key: &QueueKey) -> &mut Queue {
        self.queues.entry(key.clone()).or_default()
    }

    /// Appends `entry` to the queue. Returns `true` if the queue was stalled and must be
    /// started now (only auto-starting queues are ever started here).
    pub(crate) fn add_to_queue(
        &mut self,
        key: &QueueKey,
        entry: QueueEntry,
        placement: Placement,
    ) -> bool {
        strace!(
            element = key.element.0,
            queue = %key.name,
            id = entry.id.0,
            ?placement,
            "add_to_queue"
        );
        let queue = self.queue_mut(key);
        queue.push(entry, placement);
        queue.is_idle() && key.name.auto_starts()
    }

    pub(crate) fn view(&self, key: &QueueKey) -> QueueView<'_> {
        QueueView {
            queue: self.queues.get(key),
        }
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&QueueKey, &Queue)> {
        self.queues.iter()
    }

    /// The scrolls currently in progress, one per queue at most.
    pub(crate) fn running_mut(&mut self) -> impl Iterator<Item = &mut ActiveScroll> {
        self.queues.values_mut().filter_map(|q| match &mut q.current {
            Some(Current::Scroll(active)) => Some(&mut **active),
            _ => None,
        })
    }

    pub(crate) fn keys(&self) -> Vec<QueueKey> {
        self.queues.keys().cloned().collect()
    }

    /// Forgets queues with nothing running or waiting.
    pub(crate) fn prune(&mut self, key: &QueueKey) {
        if self.queues.get(key).is_some_and(Queue::is_empty) {
            self.queues.remove(key);
        }
    }
}

/// A read-only view over one queue's scroll metadata.
#[derive(Clone, Copy)]
pub struct QueueView<'a> {
    queue: Option<&'a Queue>,
}

impl<'a> QueueView<'a> {
    /// Scroll metadata, oldest first.
    pub fn infos(&self) -> Vec<AnimationInfo> {
        self.queue.map(Queue::infos).unwrap_or_default()
    }

    pub fn first_info(&self) -> Option<AnimationInfo> {
        self.infos().into_iter().next()
    }

    pub fn last_info(&self) -> Option<AnimationInfo> {
        self.infos().pop()
    }

    /// Entries in the queue, scroll or not, including the one in progress.
    pub fn len(&self) -> usize {
        self.queue.map_or(0, Queue::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn pending_target(&self) -> Coordinates {
        self.queue.map_or(Coordinates::IGNORED, Queue::pending_target)
    }
}

impl fmt::Debug for QueueView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueView")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}
