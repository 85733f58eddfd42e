use core::fmt;
use std::collections::VecDeque;

use serde_json::Value;

use crate::history::UserScrollDetector;
use crate::message::{cancellation_message, expect_object};
use crate::queue::{Current, HistorySeed, Payload, QueueAdapter, QueueEntry, QueueKey, ScrollJob};
use crate::resolve::{RootDetector, scroll_position, scrollable_element};
use crate::{
    AnimationId, AnimationInfo, Animator, Axis, CancelReason, Container, Coordinates, Dom,
    Effect, ExitCallback, Message, Motion, MotionRequest, NodeId, NodeKind, OuterMessages,
    Placement, Position, PositionContext, QueueName, QueueSelection, QueueView, Result,
    ScrollConfig, ScrollError, ScrollEvent, ScrollEventKind, ScrollMode, ScrollOptions,
    ScrollState, ScrollingRoot, StepHistory, StopOptions, normalize_container, normalize_options,
    normalize_position, scroll_maximum, scroll_range,
};

/// A scroll animation that has left its queue and is moving.
pub(crate) struct ActiveScroll {
    pub id: AnimationId,
    pub container: Container,
    pub scrollable: NodeId,
    pub target: Coordinates,
    pub messages: OuterMessages,
    pub history: StepHistory,
    duration_ms: u64,
    detector: UserScrollDetector,
    motion: Box<dyn Motion>,
    click_target: Option<NodeId>,
}

impl ActiveScroll {
    pub(crate) fn info(&self) -> AnimationInfo {
        AnimationInfo {
            id: self.id,
            position: self.target,
            history: self.history.clone(),
            callback_messages: self.messages.clone(),
            running: true,
        }
    }

    fn event(&self, kind: ScrollEventKind) -> ScrollEvent {
        ScrollEvent {
            animation: self.id,
            container: self.container.node(),
            kind,
        }
    }
}

impl fmt::Debug for ActiveScroll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveScroll")
            .field("id", &self.id)
            .field("container", &self.container)
            .field("scrollable", &self.scrollable)
            .field("target", &self.target)
            .field("duration_ms", &self.duration_ms)
            .field("detector", &self.detector.state())
            .field("click_target", &self.click_target)
            .finish_non_exhaustive()
    }
}

enum FrameOutcome {
    Running,
    Finished,
    UserScrolled,
}

enum Ending {
    Completed { jumped_to_end: bool },
    Cancelled(Option<CancelReason>),
}

/// The scroll orchestration engine.
///
/// `Scroller` owns the host document (`D`), the animation primitive (`A`) and every scroll
/// queue. It holds no timers: the host drives it by calling
/// - [`Scroller::scroll_to`] / [`Scroller::stop_scroll`] in response to app logic,
/// - [`Scroller::pointer_down`] when the user clicks or taps,
/// - [`Scroller::tick`] once per animation frame,
///
/// and consumes lifecycle events with [`Scroller::drain_events`].
pub struct Scroller<D, A> {
    dom: D,
    animator: A,
    config: ScrollConfig,
    queues: QueueAdapter,
    unqueued: Vec<ActiveScroll>,
    roots: RootDetector,
    events: VecDeque<ScrollEvent>,
    next_id: u64,
}

impl<D: Dom, A: Animator> Scroller<D, A> {
    pub fn new(dom: D, animator: A, config: ScrollConfig) -> Self {
        sdebug!(
            duration_ms = config.duration_ms,
            user_scroll_threshold = config.user_scroll_threshold,
            lag_compensation = config.lag_compensation,
            "Scroller::new"
        );
        Self {
            dom,
            animator,
            config,
            queues: QueueAdapter::default(),
            unqueued: Vec::new(),
            roots: RootDetector::default(),
            events: VecDeque::new(),
            next_id: 0,
        }
    }

    pub fn config(&self) -> &ScrollConfig {
        &self.config
    }

    /// Replaces the configuration. Running animations keep the settings they started with.
    pub fn set_config(&mut self, config: ScrollConfig) {
        self.config = config;
    }

    pub fn update_config(&mut self, f: impl FnOnce(&mut ScrollConfig)) {
        f(&mut self.config);
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn dom_mut(&mut self) -> &mut D {
        &mut self.dom
    }

    pub fn animator_mut(&mut self) -> &mut A {
        &mut self.animator
    }

    /// Gives back the document and the animator.
    ///
    /// Scrolls still in progress are abandoned without exit events; their click listeners are
    /// released first.
    pub fn into_parts(mut self) -> (D, A) {
        let dom = &mut self.dom;
        for active in self.queues.running_mut().chain(self.unqueued.iter_mut()) {
            if let Some(node) = active.click_target.take() {
                dom.set_pointer_listener(node, false);
            }
        }
        (self.dom, self.animator)
    }

    /// Detects (once) which element standards-mode windows scroll.
    ///
    /// Detection otherwise happens lazily on first use; hosts can call this at startup so the
    /// probe does not run in the middle of later DOM work.
    pub fn prime(&mut self, window: NodeId) -> ScrollingRoot {
        self.roots.root_for(&mut self.dom, window)
    }

    /// The cached detection result, if detection already ran.
    pub fn scrolling_root(&self) -> Option<ScrollingRoot> {
        self.roots.cached()
    }

    /// The element whose scroll offsets actually move for `node`.
    pub fn scrollable(&mut self, node: impl Into<Option<NodeId>>) -> Option<NodeId> {
        let container = normalize_container(&self.dom, node.into())?;
        Some(scrollable_element(&mut self.dom, &mut self.roots, container))
    }

    pub fn scroll_maximum(&self, node: impl Into<Option<NodeId>>, axis: Axis) -> f64 {
        normalize_container(&self.dom, node.into())
            .map_or(0.0, |c| scroll_maximum(&self.dom, c, axis))
    }

    pub fn scroll_range(&self, node: impl Into<Option<NodeId>>) -> ScrollState {
        normalize_container(&self.dom, node.into())
            .map_or_else(ScrollState::default, |c| scroll_range(&self.dom, c))
    }

    /// Starts (or queues) a smooth scroll of `node` to `position`.
    ///
    /// Returns `None` when the call is a no-op: the container is empty, or every requested axis
    /// already is (or is about to be) at its target. No-ops queue nothing and emit no events.
    pub fn scroll_to(
        &mut self,
        node: impl Into<Option<NodeId>>,
        position: impl Into<Position>,
        options: &ScrollOptions,
        now_ms: u64,
    ) -> Result<Option<AnimationId>> {
        let position = position.into();
        let opts = normalize_options(options, Some(&position), &self.config)?;
        let Some(container) = normalize_container(&self.dom, node.into()) else {
            return Ok(None);
        };
        let scrollable = scrollable_element(&mut self.dom, &mut self.roots, container);

        if self.config.detect_user_scroll && opts.ignore_user.watches_scroll() {
            self.config
                .check_user_scroll_threshold(opts.user_scroll_threshold)?;
        }

        let key = match &opts.queue {
            QueueSelection::Queued(name) => Some(QueueKey::new(scrollable, name.clone())),
            QueueSelection::Unqueued => None,
        };
        let ctx = PositionContext {
            current: scroll_position(&self.dom, scrollable),
            maximum: scroll_range(&self.dom, container),
            pending: key
                .as_ref()
                .map_or(Coordinates::IGNORED, |k| self.queues.view(k).pending_target()),
        };
        let target = normalize_position(&position, &ctx, &opts)?;

        let redundant = Axis::BOTH.into_iter().all(|axis| {
            target
                .get(axis)
                .is_none_or(|v| v == ctx.start_position(axis, opts.mode))
        });
        if redundant {
            sdebug!(node = container.node().0, ?target, "scroll_to: no-op");
            return Ok(None);
        }

        let history = match opts.mode {
            ScrollMode::Append => key
                .as_ref()
                .and_then(|k| self.queues.view(k).last_info())
                .map_or(HistorySeed::Fresh, |last| HistorySeed::Predecessor(last.id)),
            ScrollMode::Replace | ScrollMode::Merge => {
                let reason = if opts.mode == ScrollMode::Merge {
                    CancelReason::Merge
                } else {
                    CancelReason::Replace
                };
                let message = cancellation_message(opts.notify_cancelled.as_ref(), reason);
                if opts.mode == ScrollMode::Merge {
                    if let Some(id) =
                        self.merge_into_running(scrollable, &opts.queue, target, &message, now_ms)
                    {
                        return Ok(Some(id));
                    }
                }
                self.stop_target(scrollable, &opts.queue, Some(&message), false, Some(reason))
                    .map_or(HistorySeed::Fresh, HistorySeed::Inherited)
            }
        };

        let id = self.next_id();
        sdebug!(
            id = id.0,
            node = container.node().0,
            ?target,
            mode = ?opts.mode,
            "scroll_to"
        );
        let placement = opts.placement;
        let job = ScrollJob {
            container,
            scrollable,
            target,
            options: opts,
            messages: OuterMessages::default(),
            history,
        };

        match key {
            Some(key) => {
                let entry = QueueEntry {
                    id,
                    container: container.node(),
                    payload: Payload::Scroll(Box::new(job)),
                };
                if self.queues.add_to_queue(&key, entry, placement) {
                    self.advance(&key, now_ms);
                }
            }
            None => {
                let seed = match job.history {
                    HistorySeed::Inherited(ref h) => Some(h.clone()),
                    HistorySeed::Fresh | HistorySeed::Predecessor(_) => None,
                };
                let active = self.start_scroll(id, job, seed, now_ms);
                self.unqueued.push(active);
            }
        }
        Ok(Some(id))
    }

    /// Stops the scrolls of `node`'s queue: queued entries are dropped silently, the running
    /// one fails (or completes, with `jump_to_target_position`).
    ///
    /// Returns the step history of the stopped animation; `None` if nothing was running or for
    /// unqueued scrolls, where every immediate scroll on the element is stopped.
    pub fn stop_scroll(
        &mut self,
        node: impl Into<Option<NodeId>>,
        options: &StopOptions,
    ) -> Result<Option<StepHistory>> {
        let message = options
            .notify_cancelled
            .clone()
            .map(|v| {
                expect_object(v, |kind| ScrollError::InvalidOption {
                    option: "notifyCancelled",
                    reason: format!("expected an object, got {kind}"),
                })
            })
            .transpose()?;
        let Some(scrollable) = self.scrollable(node) else {
            return Ok(None);
        };
        let queue = options.queue.clone().unwrap_or_default();
        Ok(self.stop_target(
            scrollable,
            &queue,
            message.as_ref(),
            options.jump_to_target_position,
            None,
        ))
    }

    /// Merges `message` into the exit messages of every running and queued scroll of the queue.
    ///
    /// `callbacks` defaults to all four exit callbacks.
    pub fn notify_scroll_callbacks(
        &mut self,
        node: impl Into<Option<NodeId>>,
        message: Value,
        callbacks: Option<&[ExitCallback]>,
        queue: Option<QueueSelection>,
    ) -> Result<()> {
        let message = expect_object(message, ScrollError::InvalidMessage)?;
        let Some(scrollable) = self.scrollable(node) else {
            return Ok(());
        };
        let callbacks = callbacks.unwrap_or(&ExitCallback::ALL);
        match queue.unwrap_or_default() {
            QueueSelection::Queued(name) => {
                if let Some(q) = self.queues.get_mut(&QueueKey::new(scrollable, name)) {
                    for bag in q.messages_mut() {
                        bag.merge(&message, callbacks);
                    }
                }
            }
            QueueSelection::Unqueued => {
                for active in self.unqueued.iter_mut().filter(|a| a.scrollable == scrollable) {
                    active.messages.merge(&message, callbacks);
                }
            }
        }
        Ok(())
    }

    /// Puts a non-scroll effect into a queue of `node`.
    pub fn queue_effect(
        &mut self,
        node: impl Into<Option<NodeId>>,
        queue: QueueName,
        effect: Effect,
        now_ms: u64,
    ) -> Result<Option<AnimationId>> {
        if !effect.accepts(&queue) {
            return Err(ScrollError::UnsupportedQueueForEffect {
                effect: effect.name().to_owned(),
                queue: queue.to_string(),
            });
        }
        let Some(container) = normalize_container(&self.dom, node.into()) else {
            return Ok(None);
        };
        let scrollable = scrollable_element(&mut self.dom, &mut self.roots, container);
        let key = QueueKey::new(scrollable, queue);
        let id = self.next_id();
        let entry = QueueEntry {
            id,
            container: container.node(),
            payload: Payload::Effect(effect),
        };
        if self.queues.add_to_queue(&key, entry, Placement::Back) {
            self.advance(&key, now_ms);
        }
        Ok(Some(id))
    }

    /// Runs the next entry of a queue.
    ///
    /// Kicks off caller-managed queues and releases a placeholder holding a queue. Does nothing
    /// while any other entry is in progress.
    pub fn dequeue(&mut self, node: impl Into<Option<NodeId>>, queue: &QueueName, now_ms: u64) {
        let Some(scrollable) = self.scrollable(node) else {
            return;
        };
        let key = QueueKey::new(scrollable, queue.clone());
        let Some(q) = self.queues.get_mut(&key) else {
            return;
        };
        match &q.current {
            Some(Current::Placeholder { .. }) => {
                strace!(element = key.element.0, queue = %key.name, "releasing placeholder");
                q.current = None;
            }
            Some(_) => return,
            None => {}
        }
        if q.peek().is_none() {
            self.queues.prune(&key);
            return;
        }
        self.advance(&key, now_ms);
    }

    /// Scroll metadata of a queue, oldest first.
    pub fn queued_scrolls(
        &mut self,
        node: impl Into<Option<NodeId>>,
        queue: &QueueName,
    ) -> Vec<AnimationInfo> {
        self.queue_view(node, queue)
            .map(|view| view.infos())
            .unwrap_or_default()
    }

    pub fn queue_view(
        &mut self,
        node: impl Into<Option<NodeId>>,
        queue: &QueueName,
    ) -> Option<QueueView<'_>> {
        let scrollable = self.scrollable(node)?;
        Some(self.queues.view(&QueueKey::new(scrollable, queue.clone())))
    }

    /// `true` while any queue or immediate scroll of `node` has something in progress.
    pub fn is_animating(&mut self, node: impl Into<Option<NodeId>>) -> bool {
        let Some(scrollable) = self.scrollable(node) else {
            return false;
        };
        self.queues
            .iter()
            .any(|(k, q)| k.element == scrollable && !q.is_idle())
            || self.unqueued.iter().any(|a| a.scrollable == scrollable)
    }

    /// Reports a pointer/touch/mousedown on `node`.
    ///
    /// Every scroll listening for clicks on `node` or one of its ancestors is stopped with
    /// reason `click`.
    pub fn pointer_down(&mut self, node: NodeId) {
        let hits: Vec<QueueKey> = self
            .queues
            .iter()
            .filter(|(_, q)| match &q.current {
                Some(Current::Scroll(active)) => active
                    .click_target
                    .is_some_and(|t| self.dom.contains(t, node)),
                _ => false,
            })
            .map(|(k, _)| k.clone())
            .collect();

        let message = cancellation_message(None, CancelReason::Click);
        for key in hits {
            sdebug!(element = key.element.0, queue = %key.name, "user click");
            self.stop_queue(&key, Some(&message), false, Some(CancelReason::Click));
        }

        let dom = &self.dom;
        let clicked: Vec<AnimationId> = self
            .unqueued
            .iter()
            .filter(|a| a.click_target.is_some_and(|t| dom.contains(t, node)))
            .map(|a| a.id)
            .collect();
        if !clicked.is_empty() {
            self.stop_unqueued_where(
                |a| clicked.contains(&a.id),
                Some(&message),
                false,
                Some(CancelReason::Click),
            );
        }
    }

    /// Advances every running animation to `now_ms`.
    pub fn tick(&mut self, now_ms: u64) {
        for key in self.queues.keys() {
            self.tick_queue(&key, now_ms);
        }
        self.tick_unqueued(now_ms);
    }

    /// Takes every event emitted since the last call, oldest first.
    pub fn drain_events(&mut self) -> Vec<ScrollEvent> {
        self.events.drain(..).collect()
    }

    pub fn poll_event(&mut self) -> Option<ScrollEvent> {
        self.events.pop_front()
    }

    fn next_id(&mut self) -> AnimationId {
        self.next_id += 1;
        AnimationId(self.next_id)
    }

    fn tick_queue(&mut self, key: &QueueKey, now_ms: u64) {
        let Some(queue) = self.queues.get_mut(key) else {
            return;
        };
        let outcome = match &mut queue.current {
            Some(Current::Scroll(active)) => {
                step_frame(active, &mut self.dom, &mut self.events, now_ms)
            }
            Some(Current::Hold { until_ms, .. }) if now_ms >= *until_ms => FrameOutcome::Finished,
            _ => FrameOutcome::Running,
        };

        match outcome {
            FrameOutcome::Running => {}
            FrameOutcome::Finished => {
                let finished = queue.current.take();
                if let Some(Current::Scroll(active)) = finished {
                    let id = active.id;
                    let history = self.conclude(
                        *active,
                        Ending::Completed {
                            jumped_to_end: false,
                        },
                    );
                    if let Some(queue) = self.queues.get_mut(key) {
                        queue.last_history = Some((id, history));
                    }
                }
                self.advance(key, now_ms);
            }
            FrameOutcome::UserScrolled => {
                sdebug!(element = key.element.0, queue = %key.name, "user scroll");
                let message = cancellation_message(None, CancelReason::Scroll);
                self.stop_queue(key, Some(&message), false, Some(CancelReason::Scroll));
            }
        }
    }

    fn tick_unqueued(&mut self, now_ms: u64) {
        let running = core::mem::take(&mut self.unqueued);
        let mut keep = Vec::with_capacity(running.len());
        for mut active in running {
            match step_frame(&mut active, &mut self.dom, &mut self.events, now_ms) {
                FrameOutcome::Running => keep.push(active),
                FrameOutcome::Finished => {
                    self.conclude(
                        active,
                        Ending::Completed {
                            jumped_to_end: false,
                        },
                    );
                }
                FrameOutcome::UserScrolled => {
                    let message = cancellation_message(None, CancelReason::Scroll);
                    active.messages.merge(&message, &ExitCallback::ALL);
                    self.conclude(active, Ending::Cancelled(Some(CancelReason::Scroll)));
                }
            }
        }
        self.unqueued.extend(keep);
    }

    /// Starts entries of an idle queue until one of them keeps it busy.
    fn advance(&mut self, key: &QueueKey, now_ms: u64) {
        loop {
            let Some(queue) = self.queues.get_mut(key) else {
                return;
            };
            if !queue.is_idle() {
                return;
            }
            let Some(entry) = queue.pop_front() else {
                self.queues.prune(key);
                return;
            };
            let last = queue.last_history.take();

            let current = match entry.payload {
                Payload::Scroll(mut job) => {
                    let seed = match core::mem::replace(&mut job.history, HistorySeed::Fresh) {
                        HistorySeed::Fresh => None,
                        HistorySeed::Inherited(h) => Some(h),
                        HistorySeed::Predecessor(prev) => {
                            last.filter(|(id, _)| *id == prev).map(|(_, h)| h)
                        }
                    };
                    Current::Scroll(Box::new(self.start_scroll(entry.id, *job, seed, now_ms)))
                }
                Payload::Effect(effect) => match effect.hold_ms() {
                    Some(ms) => {
                        strace!(id = entry.id.0, effect = effect.name(), ms, "effect start");
                        Current::Hold {
                            id: entry.id,
                            until_ms: now_ms.saturating_add(ms),
                        }
                    }
                    None => {
                        let Effect::Placeholder { label } = effect else {
                            continue;
                        };
                        self.events.push_back(ScrollEvent {
                            animation: entry.id,
                            container: entry.container,
                            kind: ScrollEventKind::Reserved { label },
                        });
                        Current::Placeholder { id: entry.id }
                    }
                },
            };
            self.queues.queue_mut(key).current = Some(current);
        }
    }

    fn start_scroll(
        &mut self,
        id: AnimationId,
        job: ScrollJob,
        seed: Option<StepHistory>,
        now_ms: u64,
    ) -> ActiveScroll {
        let ScrollJob {
            container,
            scrollable,
            target,
            options,
            messages,
            ..
        } = job;

        let start = scroll_position(&self.dom, scrollable);
        let mut from = Coordinates::IGNORED;
        let mut distance: f64 = 0.0;
        for axis in target.axes() {
            let v = start.get(axis);
            from.set(axis, Some(v));
            distance = distance.max((target.get(axis).unwrap_or(v) - v).abs());
        }
        let duration_ms = locked_duration(options.duration_ms, distance, options.lock_speed_below);

        let motion = self.animator.animate(MotionRequest {
            from,
            to: target,
            start_ms: now_ms,
            duration_ms,
        });

        let capacity = self.config.history_length;
        let history = seed.map_or_else(
            || StepHistory::with_capacity(capacity),
            |h| h.resized(capacity),
        );
        let detector = UserScrollDetector::new(
            self.config.detect_user_scroll && options.ignore_user.watches_scroll(),
            options.user_scroll_threshold,
            self.config.frame_noise_threshold,
            self.config.lag_compensation,
        );

        let click_target = (self.config.detect_user_click && options.ignore_user.watches_click())
            .then(|| self.click_listener_node(container, scrollable));
        if let Some(node) = click_target {
            self.dom.set_pointer_listener(node, true);
        }

        sdebug!(
            id = id.0,
            ?from,
            ?target,
            duration_ms,
            inherited_frames = history.len(),
            "scroll start"
        );
        let active = ActiveScroll {
            id,
            container,
            scrollable,
            target,
            messages,
            history,
            duration_ms,
            detector,
            motion,
            click_target,
        };
        self.events.push_back(active.event(ScrollEventKind::Start));
        active
    }

    /// Clicks on the page land on `body`, so windows scrolling `html` listen there.
    fn click_listener_node(&self, container: Container, scrollable: NodeId) -> NodeId {
        match (container, self.dom.node_kind(scrollable)) {
            (Container::Window(window), Some(NodeKind::DocumentElement { .. })) => {
                self.dom.body(window).unwrap_or(scrollable)
            }
            _ => scrollable,
        }
    }

    /// Moves the scroll running on `scrollable` onto `target` instead of starting a new one.
    ///
    /// Entries waiting behind it are dropped. Returns `None` when nothing is running there.
    fn merge_into_running(
        &mut self,
        scrollable: NodeId,
        queue: &QueueSelection,
        target: Coordinates,
        message: &Message,
        now_ms: u64,
    ) -> Option<AnimationId> {
        let state = scroll_position(&self.dom, scrollable);
        match queue {
            QueueSelection::Queued(name) => {
                let queue = self.queues.get_mut(&QueueKey::new(scrollable, name.clone()))?;
                let Some(Current::Scroll(active)) = queue.current.as_mut() else {
                    return None;
                };
                retarget_scroll(active, &mut self.events, state, target, message, now_ms);
                let id = active.id;
                queue.remove_all();
                Some(id)
            }
            QueueSelection::Unqueued => {
                let keep = self
                    .unqueued
                    .iter()
                    .filter(|a| a.scrollable == scrollable)
                    .map(|a| a.id)
                    .max()?;
                self.stop_unqueued_where(
                    |a| a.scrollable == scrollable && a.id != keep,
                    Some(message),
                    false,
                    Some(CancelReason::Merge),
                );
                let active = self.unqueued.iter_mut().find(|a| a.id == keep)?;
                retarget_scroll(active, &mut self.events, state, target, message, now_ms);
                Some(keep)
            }
        }
    }

    fn stop_target(
        &mut self,
        scrollable: NodeId,
        queue: &QueueSelection,
        message: Option<&Message>,
        jump: bool,
        reason: Option<CancelReason>,
    ) -> Option<StepHistory> {
        match queue {
            QueueSelection::Queued(name) => {
                self.stop_queue(&QueueKey::new(scrollable, name.clone()), message, jump, reason)
            }
            QueueSelection::Unqueued => {
                self.stop_unqueued_where(|a| a.scrollable == scrollable, message, jump, reason);
                None
            }
        }
    }

    fn stop_queue(
        &mut self,
        key: &QueueKey,
        message: Option<&Message>,
        jump: bool,
        reason: Option<CancelReason>,
    ) -> Option<StepHistory> {
        let queue = self.queues.get_mut(key)?;
        if let Some(message) = message {
            for bag in queue.messages_mut() {
                bag.merge(message, &ExitCallback::ALL);
            }
        }
        sdebug!(
            element = key.element.0,
            queue = %key.name,
            entries = queue.len(),
            ?reason,
            jump,
            "stop queue"
        );
        queue.remove_all();
        let current = queue.current.take();
        queue.last_history = None;
        self.queues.prune(key);

        match current {
            Some(Current::Scroll(active)) => {
                let ending = if jump {
                    Ending::Completed {
                        jumped_to_end: true,
                    }
                } else {
                    Ending::Cancelled(reason)
                };
                Some(self.conclude(*active, ending))
            }
            _ => None,
        }
    }

    fn stop_unqueued_where(
        &mut self,
        pred: impl Fn(&ActiveScroll) -> bool,
        message: Option<&Message>,
        jump: bool,
        reason: Option<CancelReason>,
    ) {
        let (stopped, kept): (Vec<_>, Vec<_>) =
            core::mem::take(&mut self.unqueued).into_iter().partition(|a| pred(a));
        self.unqueued = kept;
        for mut active in stopped {
            if let Some(message) = message {
                active.messages.merge(message, &ExitCallback::ALL);
            }
            let ending = if jump {
                Ending::Completed {
                    jumped_to_end: true,
                }
            } else {
                Ending::Cancelled(reason)
            };
            self.conclude(active, ending);
        }
    }

    /// Emits the exit events of an animation and releases what it holds.
    fn conclude(&mut self, mut active: ActiveScroll, ending: Ending) -> StepHistory {
        if let Ending::Completed {
            jumped_to_end: true,
        } = ending
        {
            for axis in active.target.axes() {
                if let Some(v) = active.target.get(axis) {
                    self.dom.set_scroll_offset(active.scrollable, axis, v);
                }
            }
        }
        if let Some(node) = active.click_target.take() {
            self.dom.set_pointer_listener(node, false);
        }

        let state = scroll_position(&self.dom, active.scrollable);
        match ending {
            Ending::Completed { jumped_to_end } => {
                strace!(id = active.id.0, jumped_to_end, "scroll done");
                let done = active.messages.take(ExitCallback::Done);
                let complete = active.messages.take(ExitCallback::Complete);
                let always = active.messages.take(ExitCallback::Always);
                self.events.extend([
                    active.event(ScrollEventKind::Done {
                        state,
                        jumped_to_end,
                        message: done,
                    }),
                    active.event(ScrollEventKind::Complete { message: complete }),
                    active.event(ScrollEventKind::Always {
                        state,
                        succeeded: true,
                        message: always,
                    }),
                ]);
            }
            Ending::Cancelled(cancelled) => {
                strace!(
                    id = active.id.0,
                    ?cancelled,
                    deviation = ?active.detector.cumulative(),
                    "scroll cancelled"
                );
                emit_failure(&mut active, &mut self.events, state, cancelled);
            }
        }
        active.history
    }
}

impl<D, A> fmt::Debug for Scroller<D, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scroller")
            .field("config", &self.config)
            .field("queues", &self.queues)
            .field("unqueued", &self.unqueued)
            .field("pending_events", &self.events.len())
            .finish_non_exhaustive()
    }
}

/// Runs one frame: user-scroll detection first, then the animation's own movement.
fn step_frame<D: Dom>(
    active: &mut ActiveScroll,
    dom: &mut D,
    events: &mut VecDeque<ScrollEvent>,
    now_ms: u64,
) -> FrameOutcome {
    let real = scroll_position(dom, active.scrollable).floor();
    if active.detector.observe(real, &active.history) {
        // The frame is not applied, so the position stays where the user put it.
        return FrameOutcome::UserScrolled;
    }

    let frame = active.motion.sample(now_ms);
    let mut expected = real.to_coordinates();
    for axis in active.target.axes() {
        let Some(value) = frame.values.get(axis) else {
            continue;
        };
        dom.set_scroll_offset(active.scrollable, axis, value);
        expected.set(axis, Some(value.floor()));
        events.push_back(active.event(ScrollEventKind::Step { axis, value }));
    }
    active.history.record(real.to_coordinates(), expected);

    let progress = frame.progress.clamp(0.0, 1.0);
    let remaining_ms = ((1.0 - progress) * active.duration_ms as f64).round() as u64;
    events.push_back(active.event(ScrollEventKind::Progress {
        progress,
        remaining_ms,
    }));

    if frame.finished {
        FrameOutcome::Finished
    } else {
        FrameOutcome::Running
    }
}

fn emit_failure(
    active: &mut ActiveScroll,
    events: &mut VecDeque<ScrollEvent>,
    state: ScrollState,
    cancelled: Option<CancelReason>,
) {
    let fail = active.messages.take(ExitCallback::Fail);
    let always = active.messages.take(ExitCallback::Always);
    events.extend([
        active.event(ScrollEventKind::Fail {
            state,
            cancelled,
            message: fail,
        }),
        active.event(ScrollEventKind::Always {
            state,
            succeeded: false,
            message: always,
        }),
    ]);
}

/// Fails the callbacks `active` carries so far with `message`, then points its motion at
/// `target`; axes missing from `target` keep their old endpoint.
///
/// The animation keeps its id, end time, step history and detector, and collects fresh exit
/// messages from here on.
fn retarget_scroll(
    active: &mut ActiveScroll,
    events: &mut VecDeque<ScrollEvent>,
    state: ScrollState,
    target: Coordinates,
    message: &Message,
    now_ms: u64,
) {
    active.messages.merge(message, &ExitCallback::ALL);
    emit_failure(active, events, state, Some(CancelReason::Merge));
    active.messages = OuterMessages::default();
    let mut to = active.target;
    for axis in target.axes() {
        to.set(axis, target.get(axis));
    }
    active.motion.retarget(now_ms, state.to_coordinates(), to);
    active.target = active.motion.target();
    sdebug!(id = active.id.0, target = ?active.target, "merged into running scroll");
}

/// Shortens the duration of hops shorter than `lock_speed_below` so they keep the speed of a
/// `lock_speed_below`-long scroll.
fn locked_duration(duration_ms: u64, distance: f64, lock_speed_below: f64) -> u64 {
    if lock_speed_below > 0.0 && distance < lock_speed_below {
        (duration_ms as f64 * distance / lock_speed_below).round() as u64
    } else {
        duration_ms
    }
}
