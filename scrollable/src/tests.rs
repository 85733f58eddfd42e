use crate::*;

use std::collections::BTreeMap;

use serde_json::json;

const WINDOW: NodeId = NodeId(1);
const DOCUMENT: NodeId = NodeId(2);
const HTML: NodeId = NodeId(3);
const BODY: NodeId = NodeId(4);
const PANEL: NodeId = NodeId(10);
const BUTTON: NodeId = NodeId(11);
const FRAME: NodeId = NodeId(20);
const FRAME_WINDOW: NodeId = NodeId(21);

/// A window (2000x5000 document in a 1000x800 viewport) with one scrollable panel
/// (500x1000 content in 200x200) inside its body.
#[derive(Default)]
struct FakeDom {
    kinds: BTreeMap<NodeId, NodeKind>,
    parents: BTreeMap<NodeId, NodeId>,
    content: BTreeMap<NodeId, Size>,
    viewport: BTreeMap<NodeId, Size>,
    offsets: BTreeMap<NodeId, ScrollState>,
    quirks: bool,
    scrolling_element: Option<NodeId>,
    probe: Option<ScrollingRoot>,
    probes: usize,
    listeners: BTreeMap<NodeId, i32>,
}

impl FakeDom {
    fn page() -> Self {
        let mut dom = Self::default();
        dom.kinds.insert(WINDOW, NodeKind::Window);
        dom.kinds.insert(DOCUMENT, NodeKind::Document { window: WINDOW });
        dom.kinds
            .insert(HTML, NodeKind::DocumentElement { window: WINDOW });
        dom.kinds.insert(BODY, NodeKind::Body { window: WINDOW });
        dom.kinds.insert(PANEL, NodeKind::Element);
        dom.kinds.insert(BUTTON, NodeKind::Element);
        dom.kinds.insert(
            FRAME,
            NodeKind::Frame {
                content_window: Some(FRAME_WINDOW),
            },
        );
        dom.kinds.insert(FRAME_WINDOW, NodeKind::Window);

        dom.parents.insert(BODY, HTML);
        dom.parents.insert(PANEL, BODY);
        dom.parents.insert(BUTTON, PANEL);
        dom.parents.insert(FRAME, BODY);

        dom.content.insert(WINDOW, Size::new(2000.0, 5000.0));
        dom.viewport.insert(WINDOW, Size::new(1000.0, 800.0));
        dom.content.insert(PANEL, Size::new(500.0, 1000.0));
        dom.viewport.insert(PANEL, Size::new(200.0, 200.0));
        dom.scrolling_element = Some(HTML);
        dom
    }

    fn offset(&self, node: NodeId) -> ScrollState {
        self.offsets.get(&node).copied().unwrap_or_default()
    }

    fn listeners(&self, node: NodeId) -> i32 {
        self.listeners.get(&node).copied().unwrap_or(0)
    }
}

impl Dom for FakeDom {
    fn node_kind(&self, node: NodeId) -> Option<NodeKind> {
        self.kinds.get(&node).copied()
    }

    fn document_element(&self, window: NodeId) -> Option<NodeId> {
        (window == WINDOW).then_some(HTML)
    }

    fn body(&self, window: NodeId) -> Option<NodeId> {
        (window == WINDOW).then_some(BODY)
    }

    fn scrolling_element(&self, _window: NodeId) -> Option<NodeId> {
        self.scrolling_element
    }

    fn is_quirks_mode(&self, _window: NodeId) -> bool {
        self.quirks
    }

    fn probe_scrolling_root(&mut self) -> Option<ScrollingRoot> {
        self.probes += 1;
        self.probe
    }

    fn content_size(&self, container: NodeId) -> Size {
        self.content.get(&container).copied().unwrap_or_default()
    }

    fn viewport_size(&self, container: NodeId) -> Size {
        self.viewport.get(&container).copied().unwrap_or_default()
    }

    fn scroll_offset(&self, node: NodeId, axis: Axis) -> f64 {
        self.offset(node).get(axis)
    }

    fn set_scroll_offset(&mut self, node: NodeId, axis: Axis, value: f64) {
        self.offsets.entry(node).or_default().set(axis, value);
    }

    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cur = node;
        loop {
            if cur == ancestor {
                return true;
            }
            match self.parents.get(&cur) {
                Some(&parent) => cur = parent,
                None => return false,
            }
        }
    }

    fn set_pointer_listener(&mut self, node: NodeId, active: bool) {
        *self.listeners.entry(node).or_default() += if active { 1 } else { -1 };
    }
}

#[derive(Default)]
struct Linear {
    requests: Vec<MotionRequest>,
}

struct LinearMotion(MotionRequest);

impl Motion for LinearMotion {
    fn sample(&mut self, now_ms: u64) -> MotionFrame {
        let req = &self.0;
        let elapsed = now_ms.saturating_sub(req.start_ms);
        let t = if req.duration_ms == 0 {
            1.0
        } else {
            (elapsed as f64 / req.duration_ms as f64).min(1.0)
        };
        let mut values = Coordinates::IGNORED;
        for axis in req.to.axes() {
            let from = req.from.get(axis).unwrap_or(0.0);
            let to = req.to.get(axis).unwrap_or(from);
            values.set(axis, Some(from + (to - from) * t));
        }
        MotionFrame {
            values,
            progress: t,
            finished: t >= 1.0,
        }
    }

    fn target(&self) -> Coordinates {
        self.0.to
    }

    fn retarget(&mut self, now_ms: u64, from: Coordinates, to: Coordinates) {
        let end_ms = self.0.start_ms + self.0.duration_ms;
        let current = self.sample(now_ms).values;
        let mut start = from;
        for axis in current.axes() {
            start.set(axis, current.get(axis));
        }
        self.0 = MotionRequest {
            from: start,
            to,
            start_ms: now_ms,
            duration_ms: end_ms.saturating_sub(now_ms),
        };
    }
}

impl Animator for Linear {
    fn animate(&mut self, request: MotionRequest) -> Box<dyn Motion> {
        self.requests.push(request);
        Box::new(LinearMotion(request))
    }
}

fn scroller() -> Scroller<FakeDom, Linear> {
    scroller_with(ScrollConfig::default())
}

fn scroller_with(config: ScrollConfig) -> Scroller<FakeDom, Linear> {
    Scroller::new(FakeDom::page(), Linear::default(), config)
}

fn run(s: &mut Scroller<FakeDom, Linear>, times: impl IntoIterator<Item = u64>) {
    for now_ms in times {
        s.tick(now_ms);
    }
}

fn exits(events: &[ScrollEvent]) -> Vec<&'static str> {
    events
        .iter()
        .filter_map(|e| match &e.kind {
            ScrollEventKind::Start => Some("start"),
            ScrollEventKind::Done { .. } => Some("done"),
            ScrollEventKind::Complete { .. } => Some("complete"),
            ScrollEventKind::Fail { .. } => Some("fail"),
            ScrollEventKind::Always { .. } => Some("always"),
            ScrollEventKind::Reserved { .. } => Some("reserved"),
            ScrollEventKind::Step { .. } | ScrollEventKind::Progress { .. } => None,
        })
        .collect()
}

fn object(value: serde_json::Value) -> Message {
    value.as_object().cloned().unwrap()
}

fn fail_of(events: &[ScrollEvent]) -> (ScrollState, Option<CancelReason>, Message) {
    events
        .iter()
        .find_map(|e| match &e.kind {
            ScrollEventKind::Fail {
                state,
                cancelled,
                message,
            } => Some((*state, *cancelled, message.clone())),
            _ => None,
        })
        .unwrap()
}

#[test]
fn axis_aliases_normalize() {
    for name in ["v", "Y", " top ", "vertical"] {
        assert_eq!(normalize_axis_name(name).unwrap(), AxisSelection::Vertical);
    }
    for name in ["h", "x", "LEFT", "horizontal"] {
        assert_eq!(normalize_axis_name(name).unwrap(), AxisSelection::Horizontal);
    }
    for name in ["both", "vh", "hv", "xy", "yx", "all"] {
        assert_eq!(normalize_axis_name(name).unwrap(), AxisSelection::Both);
    }
    assert_eq!(
        normalize_axis_name("diagonal"),
        Err(ScrollError::InvalidAxisName("diagonal".into()))
    );
    assert_eq!(AxisSelection::Both.single(), Err(ScrollError::AmbiguousAxis));
}

#[test]
fn position_hash_accepts_alias_keys() {
    let axes = AxisPositions::from_pairs([("x", 10), ("top", 20)]).unwrap();
    assert_eq!(axes.horizontal, Some(PositionValue::Number(10.0)));
    assert_eq!(axes.vertical, Some(PositionValue::Number(20.0)));

    let both = AxisPositions::from_pairs([("xy", "50%")]).unwrap();
    assert_eq!(both.horizontal, both.vertical);
    assert_eq!(Position::from(both).default_axis(), AxisSelection::Both);

    assert!(AxisPositions::from_pairs([("z", 1)]).is_err());
}

#[test]
fn default_axis_follows_position_shape() {
    assert_eq!(Position::from(100).default_axis(), AxisSelection::Vertical);
    assert_eq!(Position::from("right").default_axis(), AxisSelection::Horizontal);
    assert_eq!(
        Position::from(AxisPositions::new().horizontal(5)).default_axis(),
        AxisSelection::Horizontal
    );
    assert_eq!(
        Position::from(AxisPositions::new().horizontal("").vertical(5)).default_axis(),
        AxisSelection::Vertical
    );
}

#[test]
fn positions_resolve_and_clamp() {
    let config = ScrollConfig::default();
    let ctx = PositionContext {
        current: ScrollState::new(100.0, 300.0),
        maximum: ScrollState::new(1000.0, 4200.0),
        pending: Coordinates::IGNORED,
    };
    let vertical = normalize_options(&ScrollOptions::new(), None, &config).unwrap();
    let horizontal =
        normalize_options(&ScrollOptions::new().with_axis("x"), None, &config).unwrap();

    let resolve = |pos: Position, opts: &NormalizedOptions| {
        normalize_position(&pos, &ctx, opts).unwrap()
    };

    assert_eq!(resolve(120.6.into(), &vertical).vertical, Some(121.0));
    assert_eq!(resolve("120px".into(), &vertical).vertical, Some(120.0));
    assert_eq!(resolve("50%".into(), &vertical).vertical, Some(2100.0));
    assert_eq!(resolve("+=30px".into(), &vertical).vertical, Some(330.0));
    assert_eq!(resolve("-= 10%".into(), &horizontal).horizontal, Some(0.0));
    assert_eq!(resolve("bottom".into(), &vertical).vertical, Some(4200.0));
    assert_eq!(resolve("right".into(), &horizontal).horizontal, Some(1000.0));
    assert_eq!(resolve((-50).into(), &vertical).vertical, Some(0.0));
    assert_eq!(resolve(1e9.into(), &vertical).vertical, Some(4200.0));

    let only_vertical = resolve("77".into(), &vertical);
    assert_eq!(only_vertical.horizontal, None);

    assert!(resolve(PositionValue::Empty.into(), &vertical).is_ignored());
    assert!(resolve("  ".into(), &vertical).is_ignored());
}

#[test]
fn invalid_positions_are_rejected() {
    let config = ScrollConfig::default();
    let ctx = PositionContext::default();
    let vertical = normalize_options(&ScrollOptions::new(), None, &config).unwrap();
    let horizontal =
        normalize_options(&ScrollOptions::new().with_axis("h"), None, &config).unwrap();
    let both = normalize_options(&ScrollOptions::new().with_axis("both"), None, &config).unwrap();

    assert_eq!(
        normalize_position(&"abc".into(), &ctx, &vertical),
        Err(ScrollError::InvalidPosition("abc".into()))
    );
    assert_eq!(
        normalize_position(&"+=bottom".into(), &ctx, &vertical),
        Err(ScrollError::InvalidPosition("+=bottom".into()))
    );
    assert_eq!(
        normalize_position(&"inf".into(), &ctx, &vertical),
        Err(ScrollError::InvalidPosition("inf".into()))
    );
    assert_eq!(
        normalize_position(&"top".into(), &ctx, &horizontal),
        Err(ScrollError::InconsistentPosition {
            position: "top".into(),
            axis: "horizontal",
        })
    );
    assert_eq!(
        normalize_position(&100.into(), &ctx, &both),
        Err(ScrollError::AmbiguousAxis)
    );
}

#[test]
fn hash_positions_respect_the_axis_option() {
    let config = ScrollConfig::default();
    let ctx = PositionContext {
        maximum: ScrollState::new(1000.0, 1000.0),
        ..PositionContext::default()
    };
    let position = Position::from(AxisPositions::new().horizontal(10).vertical(20));

    let vertical_only = normalize_options(
        &ScrollOptions::new().with_axis("vertical"),
        Some(&position),
        &config,
    )
    .unwrap();
    let out = normalize_position(&position, &ctx, &vertical_only).unwrap();
    assert_eq!(out, Coordinates::new(None, Some(20.0)));

    let inferred = normalize_options(&ScrollOptions::new(), Some(&position), &config).unwrap();
    let out = normalize_position(&position, &ctx, &inferred).unwrap();
    assert_eq!(out, Coordinates::new(Some(10.0), Some(20.0)));
}

#[test]
fn options_fill_defaults_from_config() {
    let config = ScrollConfig::default()
        .with_duration_ms(250)
        .with_lock_speed_below(80.0);
    let opts = normalize_options(&ScrollOptions::new(), None, &config).unwrap();
    assert_eq!(opts.duration_ms, 250);
    assert_eq!(opts.lock_speed_below, 80.0);
    assert_eq!(opts.queue, QueueSelection::Queued(QueueName::Internal));
    assert_eq!(opts.mode, ScrollMode::Replace);
    assert_eq!(opts.ignore_user, IgnoreUser::Never);

    let opts = normalize_options(
        &ScrollOptions::new()
            .append()
            .merge()
            .with_lock_speed_below(false),
        None,
        &config,
    )
    .unwrap();
    assert_eq!(opts.mode, ScrollMode::Append);
    assert_eq!(opts.lock_speed_below, 0.0);

    assert_eq!("120px".parse::<LockSpeed>(), Ok(LockSpeed::Below(120.0)));
    assert_eq!("fast".parse::<LockSpeed>(), Ok(LockSpeed::Off));
    assert_eq!(LockSpeed::Below(-5.0).px(), 0.0);

    assert_eq!("click".parse::<IgnoreUser>(), Ok(IgnoreUser::Click));
    assert!("sometimes".parse::<IgnoreUser>().is_err());
    assert_eq!("fail".parse::<ExitCallback>(), Ok(ExitCallback::Fail));

    let err = normalize_options(
        &ScrollOptions::new().with_notify_cancelled(json!(5)),
        None,
        &config,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        ScrollError::InvalidOption {
            option: "notifyCancelled",
            ..
        }
    ));
}

#[test]
fn ignore_axis_sentinel_maps_to_none() {
    let c = Coordinates::from_raw(IGNORE_AXIS, 12.0);
    assert_eq!(c, Coordinates::new(None, Some(12.0)));
    assert_eq!(c.axes().collect::<Vec<_>>(), vec![Axis::Vertical]);
    assert!(Coordinates::from_raw(IGNORE_AXIS, IGNORE_AXIS).is_ignored());
}

#[test]
fn containers_normalize_to_windows() {
    let dom = FakeDom::page();
    assert_eq!(normalize_container(&dom, None), None);
    for node in [WINDOW, DOCUMENT, HTML, BODY] {
        assert_eq!(
            normalize_container(&dom, Some(node)),
            Some(Container::Window(WINDOW))
        );
    }
    assert_eq!(
        normalize_container(&dom, Some(FRAME)),
        Some(Container::Window(FRAME_WINDOW))
    );
    assert_eq!(
        normalize_container(&dom, Some(PANEL)),
        Some(Container::Element(PANEL))
    );
    assert_eq!(
        normalize_container(&dom, Some(NodeId(999))),
        Some(Container::Element(NodeId(999)))
    );
}

#[test]
fn scrolling_root_detection_order() {
    let mut s = scroller();
    assert_eq!(s.scrollable(BODY), Some(HTML));
    assert_eq!(s.scrolling_root(), Some(ScrollingRoot::DocumentElement));
    assert_eq!(s.dom().probes, 0);

    let mut dom = FakeDom::page();
    dom.scrolling_element = Some(BODY);
    let mut s = Scroller::new(dom, Linear::default(), ScrollConfig::default());
    assert_eq!(s.scrollable(WINDOW), Some(BODY));

    let mut dom = FakeDom::page();
    dom.scrolling_element = None;
    dom.probe = Some(ScrollingRoot::Body);
    let mut s = Scroller::new(dom, Linear::default(), ScrollConfig::default());
    assert_eq!(s.prime(WINDOW), ScrollingRoot::Body);
    assert_eq!(s.scrollable(WINDOW), Some(BODY));
    assert_eq!(s.scrollable(DOCUMENT), Some(BODY));
    assert_eq!(s.dom().probes, 1);

    let mut dom = FakeDom::page();
    dom.scrolling_element = None;
    let mut s = Scroller::new(dom, Linear::default(), ScrollConfig::default());
    assert_eq!(s.scrollable(WINDOW), Some(HTML));

    let mut dom = FakeDom::page();
    dom.quirks = true;
    let mut s = Scroller::new(dom, Linear::default(), ScrollConfig::default());
    assert_eq!(s.scrollable(WINDOW), Some(BODY));
    assert_eq!(s.scrolling_root(), None);

    let mut s = scroller();
    assert_eq!(s.scrollable(PANEL), Some(PANEL));
    assert_eq!(s.scrollable(FRAME), Some(FRAME_WINDOW));
    assert_eq!(s.scrollable(None::<NodeId>), None);
}

#[test]
fn scroll_maximum_uses_viewport() {
    let s = scroller();
    assert_eq!(s.scroll_maximum(WINDOW, Axis::Vertical), 4200.0);
    assert_eq!(s.scroll_maximum(BODY, Axis::Horizontal), 1000.0);
    assert_eq!(s.scroll_range(PANEL), ScrollState::new(300.0, 800.0));
    assert_eq!(s.scroll_range(None::<NodeId>), ScrollState::default());

    let mut dom = FakeDom::page();
    dom.content.insert(PANEL, Size::new(100.0, 100.0));
    let s = Scroller::new(dom, Linear::default(), ScrollConfig::default());
    assert_eq!(s.scroll_range(PANEL), ScrollState::default());
}

#[test]
fn scroll_runs_to_completion() {
    let mut s = scroller();
    let id = s
        .scroll_to(WINDOW, 100, &ScrollOptions::new(), 0)
        .unwrap()
        .unwrap();
    assert!(s.is_animating(WINDOW));
    assert_eq!(s.dom().listeners(BODY), 1);

    run(&mut s, [100, 200, 300, 400]);
    assert!(!s.is_animating(WINDOW));
    assert_eq!(s.dom().offset(HTML).vertical, 100.0);
    assert_eq!(s.dom().listeners(BODY), 0);

    let events = s.drain_events();
    assert_eq!(exits(&events), ["start", "done", "complete", "always"]);
    assert!(events.iter().all(|e| e.animation == id && e.container == WINDOW));

    let steps: Vec<f64> = events
        .iter()
        .filter_map(|e| match e.kind {
            ScrollEventKind::Step {
                axis: Axis::Vertical,
                value,
            } => Some(value),
            _ => None,
        })
        .collect();
    assert_eq!(steps, [25.0, 50.0, 75.0, 100.0]);

    let done = events
        .iter()
        .find_map(|e| match &e.kind {
            ScrollEventKind::Done {
                state,
                jumped_to_end,
                ..
            } => Some((*state, *jumped_to_end)),
            _ => None,
        })
        .unwrap();
    assert_eq!(done, (ScrollState::new(0.0, 100.0), false));

    let progress: Vec<(f64, u64)> = events
        .iter()
        .filter_map(|e| match e.kind {
            ScrollEventKind::Progress {
                progress,
                remaining_ms,
            } => Some((progress, remaining_ms)),
            _ => None,
        })
        .collect();
    assert_eq!(progress.last(), Some(&(1.0, 0)));
    assert_eq!(s.poll_event(), None);
}

#[test]
fn redundant_scroll_is_a_noop() {
    let mut s = scroller();
    assert_eq!(s.scroll_to(WINDOW, 0, &ScrollOptions::new(), 0), Ok(None));
    assert_eq!(s.scroll_to(WINDOW, "top", &ScrollOptions::new(), 0), Ok(None));
    assert_eq!(s.scroll_to(None::<NodeId>, 100, &ScrollOptions::new(), 0), Ok(None));
    assert_eq!(
        s.scroll_to(WINDOW, PositionValue::Empty, &ScrollOptions::new(), 0),
        Ok(None)
    );
    assert!(s.drain_events().is_empty());
    assert!(!s.is_animating(WINDOW));
}

#[test]
fn merging_the_pending_target_again_is_a_noop() {
    let mut s = scroller();
    let first = AxisPositions::new().horizontal(50);
    assert!(
        s.scroll_to(WINDOW, first.clone(), &ScrollOptions::new(), 0)
            .unwrap()
            .is_some()
    );
    assert_eq!(
        s.scroll_to(WINDOW, first, &ScrollOptions::new().merge(), 0),
        Ok(None)
    );
    assert_eq!(exits(&s.drain_events()), ["start"]);
    assert_eq!(s.queued_scrolls(WINDOW, &QueueName::Internal).len(), 1);
}

#[test]
fn append_chains_from_the_pending_target() {
    let mut s = scroller();
    s.scroll_to(WINDOW, "bottom", &ScrollOptions::new(), 0)
        .unwrap();
    s.scroll_to(WINDOW, "-=30px", &ScrollOptions::new().append(), 0)
        .unwrap();

    let infos = s.queued_scrolls(WINDOW, &QueueName::Internal);
    assert_eq!(infos.len(), 2);
    assert!(infos[0].running);
    assert!(!infos[1].running);
    assert_eq!(infos[1].position.vertical, Some(4170.0));

    run(&mut s, [100, 200, 300, 400, 500, 600, 700, 800]);
    let max = s.scroll_maximum(WINDOW, Axis::Vertical);
    assert_eq!(s.dom().offset(HTML).vertical, max - 30.0);
    assert_eq!(
        exits(&s.drain_events()),
        ["start", "done", "complete", "always", "start", "done", "complete", "always"]
    );
}

#[test]
fn appended_scroll_inherits_the_predecessor_history() {
    let mut s = scroller();
    s.scroll_to(WINDOW, 400, &ScrollOptions::new(), 0).unwrap();
    s.scroll_to(WINDOW, 800, &ScrollOptions::new().append(), 0)
        .unwrap();
    run(&mut s, [100, 200, 300, 400]);

    let infos = s.queued_scrolls(WINDOW, &QueueName::Internal);
    assert_eq!(infos.len(), 1);
    assert_eq!(infos[0].history.len(), 4);
    assert_eq!(infos[0].history.last_expected().unwrap().vertical, Some(400.0));
}

#[test]
fn replace_cancels_with_reason_and_payload() {
    let mut s = scroller();
    let first = s
        .scroll_to(WINDOW, 1000, &ScrollOptions::new(), 0)
        .unwrap()
        .unwrap();
    s.tick(100);
    s.drain_events();

    let opts = ScrollOptions::new()
        .with_notify_cancelled(json!({ "by": "second", "cancelled": "custom" }));
    let second = s.scroll_to(WINDOW, 2000, &opts, 100).unwrap().unwrap();

    let events = s.drain_events();
    assert_eq!(exits(&events), ["fail", "always", "start"]);
    assert_eq!(events[0].animation, first);
    assert_eq!(events[2].animation, second);

    let (state, cancelled, message) = fail_of(&events);
    assert_eq!(state.vertical, 250.0);
    assert_eq!(cancelled, Some(CancelReason::Replace));
    assert_eq!(message, object(json!({ "by": "second", "cancelled": "replace" })));
    assert_eq!(events[1].kind.message(), Some(&message));

    // The stopped animation's frames carry over.
    let infos = s.queued_scrolls(WINDOW, &QueueName::Internal);
    assert_eq!(infos[0].history.len(), 1);

    run(&mut s, [200, 300, 400, 500]);
    assert_eq!(s.dom().offset(HTML).vertical, 2000.0);
    assert_eq!(exits(&s.drain_events()), ["done", "complete", "always"]);
}

#[test]
fn merge_keeps_pending_axes() {
    let mut s = scroller();
    s.scroll_to(WINDOW, AxisPositions::new().vertical(300), &ScrollOptions::new(), 0)
        .unwrap();
    s.scroll_to(
        WINDOW,
        AxisPositions::new().horizontal(200),
        &ScrollOptions::new().merge(),
        0,
    )
    .unwrap();

    let events = s.drain_events();
    assert_eq!(fail_of(&events).1, Some(CancelReason::Merge));

    let infos = s.queued_scrolls(WINDOW, &QueueName::Internal);
    assert_eq!(infos.len(), 1);
    assert_eq!(infos[0].position, Coordinates::new(Some(200.0), Some(300.0)));

    run(&mut s, [100, 200, 300, 400]);
    assert_eq!(s.dom().offset(HTML), ScrollState::new(200.0, 300.0));
}

#[test]
fn merge_retargets_the_running_scroll() {
    let mut s = scroller();
    let first = s
        .scroll_to(WINDOW, 300, &ScrollOptions::new(), 0)
        .unwrap()
        .unwrap();
    s.tick(100);

    let opts = ScrollOptions::new()
        .merge()
        .with_notify_cancelled(json!({ "by": "merge", "cancelled": "custom" }));
    assert_eq!(s.scroll_to(WINDOW, 500, &opts, 100), Ok(Some(first)));

    let events = s.drain_events();
    assert_eq!(exits(&events), ["start", "fail", "always"]);
    assert!(events.iter().all(|e| e.animation == first));
    let (state, cancelled, message) = fail_of(&events);
    assert_eq!(state.vertical, 75.0);
    assert_eq!(cancelled, Some(CancelReason::Merge));
    assert_eq!(message, object(json!({ "by": "merge", "cancelled": "merge" })));

    // Same animation, new endpoint, same end time.
    assert_eq!(s.animator_mut().requests.len(), 1);
    let infos = s.queued_scrolls(WINDOW, &QueueName::Internal);
    assert_eq!(infos.len(), 1);
    assert_eq!(infos[0].id, first);
    assert_eq!(infos[0].position.vertical, Some(500.0));
    assert!(infos[0].callback_messages.fail.is_empty());

    run(&mut s, [200, 300, 400]);
    assert_eq!(s.dom().offset(HTML).vertical, 500.0);
    assert!(!s.is_animating(WINDOW));
    let events = s.drain_events();
    assert_eq!(exits(&events), ["done", "complete", "always"]);
    assert!(events.iter().all(|e| e.animation == first));
}

#[test]
fn merge_drops_waiting_entries() {
    let mut s = scroller();
    let first = s
        .scroll_to(WINDOW, 400, &ScrollOptions::new(), 0)
        .unwrap()
        .unwrap();
    s.scroll_to(WINDOW, 800, &ScrollOptions::new().append(), 0)
        .unwrap();
    s.scroll_to(
        WINDOW,
        AxisPositions::new().horizontal(100),
        &ScrollOptions::new().merge(),
        0,
    )
    .unwrap();

    // The appended endpoint is folded into the running scroll.
    let infos = s.queued_scrolls(WINDOW, &QueueName::Internal);
    assert_eq!(infos.len(), 1);
    assert_eq!(infos[0].id, first);
    assert_eq!(infos[0].position, Coordinates::new(Some(100.0), Some(800.0)));

    run(&mut s, [100, 200, 300, 400, 500]);
    assert_eq!(s.dom().offset(HTML), ScrollState::new(100.0, 800.0));
    assert_eq!(
        exits(&s.drain_events()),
        ["start", "fail", "always", "done", "complete", "always"]
    );
}

#[test]
fn unqueued_merge_keeps_untouched_axes() {
    let mut s = scroller();
    let opts = ScrollOptions::new().unqueued();
    let first = s.scroll_to(PANEL, 400, &opts, 0).unwrap().unwrap();
    let merged = s
        .scroll_to(
            PANEL,
            AxisPositions::new().horizontal(300),
            &opts.clone().merge(),
            0,
        )
        .unwrap();
    assert_eq!(merged, Some(first));

    run(&mut s, [100, 200, 300, 400]);
    assert_eq!(s.dom().offset(PANEL), ScrollState::new(300.0, 400.0));
    let events = s.drain_events();
    assert_eq!(
        exits(&events),
        ["start", "fail", "always", "done", "complete", "always"]
    );
    assert!(events.iter().all(|e| e.animation == first));
}

#[test]
fn into_parts_releases_click_listeners() {
    let mut s = scroller();
    s.scroll_to(WINDOW, 300, &ScrollOptions::new(), 0).unwrap();
    s.scroll_to(PANEL, 300, &ScrollOptions::new().unqueued(), 0)
        .unwrap();
    assert_eq!(s.dom().listeners(BODY), 1);
    assert_eq!(s.dom().listeners(PANEL), 1);

    let (dom, _) = s.into_parts();
    assert_eq!(dom.listeners(BODY), 0);
    assert_eq!(dom.listeners(PANEL), 0);
}

#[test]
fn user_scroll_threshold_is_exclusive() {
    let mut s = scroller();
    s.scroll_to(WINDOW, 400, &ScrollOptions::new(), 0).unwrap();
    s.tick(100);
    s.dom_mut().set_scroll_offset(HTML, Axis::Vertical, 110.0);
    run(&mut s, [200, 300, 400]);
    assert_eq!(s.dom().offset(HTML).vertical, 400.0);
    assert_eq!(
        exits(&s.drain_events()),
        ["start", "done", "complete", "always"]
    );

    let mut s = scroller();
    s.scroll_to(WINDOW, 400, &ScrollOptions::new(), 0).unwrap();
    s.tick(100);
    s.dom_mut().set_scroll_offset(HTML, Axis::Vertical, 111.0);
    s.tick(200);
    assert!(!s.is_animating(WINDOW));
    assert_eq!(s.dom().offset(HTML).vertical, 111.0);
    assert_eq!(s.dom().listeners(BODY), 0);

    let events = s.drain_events();
    assert_eq!(exits(&events), ["start", "fail", "always"]);
    let (state, cancelled, message) = fail_of(&events);
    assert_eq!(state.vertical, 111.0);
    assert_eq!(cancelled, Some(CancelReason::Scroll));
    assert_eq!(message.get(CANCELLED_KEY), Some(&json!("scroll")));
}

#[test]
fn small_nudges_accumulate() {
    let mut s = scroller();
    s.scroll_to(WINDOW, 400, &ScrollOptions::new(), 0).unwrap();
    s.tick(100);
    s.dom_mut().set_scroll_offset(HTML, Axis::Vertical, 106.0);
    s.tick(200);
    assert!(s.is_animating(WINDOW));
    s.dom_mut().set_scroll_offset(HTML, Axis::Vertical, 206.0);
    s.tick(300);
    assert!(!s.is_animating(WINDOW));
    assert_eq!(fail_of(&s.drain_events()).1, Some(CancelReason::Scroll));
}

#[test]
fn deviations_within_noise_are_ignored() {
    let mut s = scroller();
    s.scroll_to(WINDOW, 400, &ScrollOptions::new(), 0).unwrap();
    for (now_ms, nudge) in [(100, 101.0), (200, 201.0), (300, 301.0)] {
        s.tick(now_ms);
        s.dom_mut().set_scroll_offset(HTML, Axis::Vertical, nudge);
    }
    s.tick(400);
    assert_eq!(s.dom().offset(HTML).vertical, 400.0);
    assert!(exits(&s.drain_events()).contains(&"done"));
}

#[test]
fn fractional_offsets_are_floored_before_comparing() {
    let mut s = scroller();
    s.scroll_to(WINDOW, 399, &ScrollOptions::new(), 0).unwrap();
    run(&mut s, [100, 200, 300, 400]);
    assert!(exits(&s.drain_events()).contains(&"done"));
}

#[test]
fn lag_compensation_discards_stale_reads() {
    let stale_read = |lag_compensation: bool| {
        let mut s = scroller_with(ScrollConfig::default().with_lag_compensation(lag_compensation));
        s.scroll_to(WINDOW, 400, &ScrollOptions::new(), 0).unwrap();
        run(&mut s, [100, 200]);
        s.dom_mut().set_scroll_offset(HTML, Axis::Vertical, 100.0);
        run(&mut s, [300, 400]);
        s.drain_events()
    };

    assert_eq!(
        exits(&stale_read(false)),
        ["start", "fail", "always"]
    );
    assert_eq!(
        exits(&stale_read(true)),
        ["start", "done", "complete", "always"]
    );
    assert!(ScrollConfig::for_platform(Platform::Mobile).lag_compensation);
    assert!(!ScrollConfig::for_platform(Platform::Desktop).lag_compensation);
}

#[test]
fn ignore_user_and_config_switches_disable_detection() {
    let nudged = |mut s: Scroller<FakeDom, Linear>, opts: ScrollOptions| {
        s.scroll_to(WINDOW, 400, &opts, 0).unwrap();
        s.tick(100);
        s.dom_mut().set_scroll_offset(HTML, Axis::Vertical, 150.0);
        run(&mut s, [200, 300, 400]);
        exits(&s.drain_events())
    };

    let completed = ["start", "done", "complete", "always"];
    assert_eq!(
        nudged(scroller(), ScrollOptions::new().with_ignore_user(true)),
        completed
    );
    assert_eq!(
        nudged(scroller(), ScrollOptions::new().with_ignore_user(IgnoreUser::Scroll)),
        completed
    );
    assert_eq!(
        nudged(
            scroller_with(ScrollConfig::default().with_detect_user_scroll(false)),
            ScrollOptions::new()
        ),
        completed
    );
    assert_eq!(
        nudged(scroller(), ScrollOptions::new().with_ignore_user(IgnoreUser::Click)),
        ["start", "fail", "always"]
    );
}

#[test]
fn click_inside_the_container_stops_the_scroll() {
    let mut s = scroller();
    s.scroll_to(WINDOW, 400, &ScrollOptions::new(), 0).unwrap();
    s.tick(100);
    s.pointer_down(BUTTON);

    assert!(!s.is_animating(WINDOW));
    assert_eq!(s.dom().listeners(BODY), 0);
    let events = s.drain_events();
    assert_eq!(exits(&events), ["start", "fail", "always"]);
    let (_, cancelled, message) = fail_of(&events);
    assert_eq!(cancelled, Some(CancelReason::Click));
    assert_eq!(message, object(json!({ "cancelled": "click" })));
}

#[test]
fn clicks_are_ignored_when_asked() {
    let mut s = scroller();
    s.scroll_to(
        WINDOW,
        400,
        &ScrollOptions::new().with_ignore_user(IgnoreUser::Click),
        0,
    )
    .unwrap();
    assert_eq!(s.dom().listeners(BODY), 0);
    s.pointer_down(BUTTON);
    assert!(s.is_animating(WINDOW));

    // Clicks outside an element container do not count either.
    let mut s = scroller();
    s.scroll_to(PANEL, 400, &ScrollOptions::new(), 0).unwrap();
    assert_eq!(s.dom().listeners(PANEL), 1);
    s.pointer_down(BODY);
    assert!(s.is_animating(PANEL));
    s.pointer_down(BUTTON);
    assert!(!s.is_animating(PANEL));
}

#[test]
fn stop_drops_queued_entries_silently() {
    let mut s = scroller();
    s.scroll_to(WINDOW, 400, &ScrollOptions::new(), 0).unwrap();
    s.scroll_to(WINDOW, 800, &ScrollOptions::new().append(), 0)
        .unwrap();
    s.tick(100);
    s.drain_events();

    let history = s
        .stop_scroll(
            WINDOW,
            &StopOptions::new().with_notify_cancelled(json!({ "why": "route change" })),
        )
        .unwrap();
    assert_eq!(history.map(|h| h.len()), Some(1));

    let events = s.drain_events();
    assert_eq!(exits(&events), ["fail", "always"]);
    let (state, cancelled, message) = fail_of(&events);
    assert_eq!(state.vertical, 100.0);
    assert_eq!(cancelled, None);
    assert_eq!(message, object(json!({ "why": "route change" })));

    assert!(s.queued_scrolls(WINDOW, &QueueName::Internal).is_empty());
    run(&mut s, [200, 900]);
    assert!(s.drain_events().is_empty());
    assert_eq!(s.dom().offset(HTML).vertical, 100.0);

    assert_eq!(s.stop_scroll(WINDOW, &StopOptions::new()), Ok(None));
}

#[test]
fn stop_can_jump_to_the_target() {
    let mut s = scroller();
    s.scroll_to(WINDOW, 1000, &ScrollOptions::new(), 0).unwrap();
    s.tick(100);
    s.drain_events();

    s.stop_scroll(WINDOW, &StopOptions::new().jump_to_target_position())
        .unwrap();
    assert_eq!(s.dom().offset(HTML).vertical, 1000.0);

    let events = s.drain_events();
    assert_eq!(exits(&events), ["done", "complete", "always"]);
    assert!(matches!(
        events[0].kind,
        ScrollEventKind::Done {
            jumped_to_end: true,
            ..
        }
    ));
    assert!(matches!(
        events[2].kind,
        ScrollEventKind::Always {
            succeeded: true,
            ..
        }
    ));
}

#[test]
fn unqueued_scrolls_run_alongside_the_queue() {
    // Both move the same element, so each would read the other's movement as user scrolling.
    let calm = ScrollOptions::new().with_ignore_user(true);
    let mut s = scroller();
    s.scroll_to(PANEL, AxisPositions::new().horizontal(300), &calm, 0)
        .unwrap();
    s.scroll_to(PANEL, 800, &calm.clone().unqueued(), 0).unwrap();
    run(&mut s, [100, 200]);
    assert_eq!(s.dom().offset(PANEL), ScrollState::new(150.0, 400.0));

    let stopped = s
        .stop_scroll(PANEL, &StopOptions::new().with_queue(QueueSelection::Unqueued))
        .unwrap();
    assert_eq!(stopped, None);
    assert!(s.is_animating(PANEL));

    run(&mut s, [300, 400]);
    assert_eq!(s.dom().offset(PANEL), ScrollState::new(300.0, 400.0));
    assert_eq!(
        exits(&s.drain_events()),
        ["start", "start", "fail", "always", "done", "complete", "always"]
    );
}

#[test]
fn notify_merges_into_pending_messages() {
    let mut s = scroller();
    s.scroll_to(WINDOW, 400, &ScrollOptions::new(), 0).unwrap();
    s.scroll_to(WINDOW, 800, &ScrollOptions::new().append(), 0)
        .unwrap();
    s.notify_scroll_callbacks(WINDOW, json!({ "step": 1 }), None, None)
        .unwrap();
    s.notify_scroll_callbacks(
        WINDOW,
        json!({ "step": 2, "extra": true }),
        Some(&[ExitCallback::Done]),
        None,
    )
    .unwrap();

    let infos = s.queued_scrolls(WINDOW, &QueueName::Internal);
    for info in &infos {
        assert_eq!(
            info.callback_messages.get(ExitCallback::Done),
            &object(json!({ "step": 2, "extra": true }))
        );
        assert_eq!(
            info.callback_messages.get(ExitCallback::Complete),
            &object(json!({ "step": 1 }))
        );
    }

    run(&mut s, [400]);
    let events = s.drain_events();
    let complete = events
        .iter()
        .find(|e| matches!(e.kind, ScrollEventKind::Complete { .. }))
        .unwrap();
    assert_eq!(complete.kind.message(), Some(&object(json!({ "step": 1 }))));

    assert_eq!(
        s.notify_scroll_callbacks(WINDOW, json!("nope"), None, None),
        Err(ScrollError::InvalidMessage("a string".into()))
    );
}

#[test]
fn speed_lock_shortens_short_hops() {
    let mut s = scroller();
    let opts = ScrollOptions::new().with_lock_speed_below(200.0);
    s.scroll_to(WINDOW, 50, &opts, 0).unwrap();
    s.scroll_to(WINDOW, 1000, &opts.clone().append(), 0).unwrap();
    run(&mut s, [100, 200, 1200]);

    let durations: Vec<u64> = s
        .animator_mut()
        .requests
        .iter()
        .map(|r| r.duration_ms)
        .collect();
    assert_eq!(durations, [100, 400]);
    assert_eq!(s.dom().offset(HTML).vertical, 1000.0);
}

#[test]
fn sped_up_hops_keep_the_same_detection_threshold() {
    let mut s = scroller();
    s.scroll_to(WINDOW, 20, &ScrollOptions::new().with_lock_speed_below(200.0), 0)
        .unwrap();
    s.tick(20);
    assert_eq!(s.dom().offset(HTML).vertical, 10.0);
    s.dom_mut().set_scroll_offset(HTML, Axis::Vertical, 21.0);
    s.tick(30);
    assert_eq!(fail_of(&s.drain_events()).1, Some(CancelReason::Scroll));
}

#[test]
fn threshold_below_noise_is_rejected_only_when_detecting() {
    let mut s = scroller();
    let low = ScrollOptions::new().with_user_scroll_threshold(0.5);
    assert!(matches!(
        s.scroll_to(WINDOW, 100, &low, 0),
        Err(ScrollError::InvalidConfig(_))
    ));
    assert!(
        s.scroll_to(WINDOW, 100, &low.with_ignore_user(true), 0)
            .unwrap()
            .is_some()
    );

    let mut s = scroller_with(ScrollConfig::default().with_user_scroll_threshold(f64::NAN));
    assert!(s.scroll_to(WINDOW, 100, &ScrollOptions::new(), 0).is_err());
}

#[test]
fn invalid_input_surfaces_before_anything_changes() {
    let mut s = scroller();
    s.scroll_to(WINDOW, 400, &ScrollOptions::new(), 0).unwrap();
    s.drain_events();

    assert_eq!(
        s.scroll_to(WINDOW, 100, &ScrollOptions::new().with_axis("z"), 0),
        Err(ScrollError::InvalidAxisName("z".into()))
    );
    assert!(s.scroll_to(WINDOW, "top", &ScrollOptions::new().with_axis("x"), 0).is_err());
    assert!(s.scroll_to(WINDOW, "soon", &ScrollOptions::new(), 0).is_err());
    assert!(
        s.stop_scroll(WINDOW, &StopOptions::new().with_notify_cancelled(json!([1])))
            .is_err()
    );

    assert!(s.drain_events().is_empty());
    assert!(s.is_animating(WINDOW));
}

#[test]
fn delay_holds_the_queue() {
    let mut s = scroller();
    s.queue_effect(WINDOW, QueueName::Internal, Effect::Delay { duration_ms: 100 }, 0)
        .unwrap();
    s.scroll_to(WINDOW, 300, &ScrollOptions::new().append(), 0)
        .unwrap();
    assert!(s.drain_events().is_empty());
    assert_eq!(s.queue_view(WINDOW, &QueueName::Internal).unwrap().len(), 2);

    s.tick(50);
    assert!(s.drain_events().is_empty());
    s.tick(100);
    assert_eq!(exits(&s.drain_events()), ["start"]);
    run(&mut s, [200, 300, 400, 500]);
    assert_eq!(s.dom().offset(HTML).vertical, 300.0);
}

#[test]
fn shorthand_effects_only_run_on_the_default_queue() {
    let mut s = scroller();
    let fade = Effect::Shorthand {
        name: "fadeIn".into(),
        duration_ms: 50,
    };
    assert_eq!(
        s.queue_effect(WINDOW, QueueName::Internal, fade.clone(), 0),
        Err(ScrollError::UnsupportedQueueForEffect {
            effect: "fadeIn".into(),
            queue: "internal".into(),
        })
    );
    assert!(
        s.queue_effect(WINDOW, QueueName::named("intro"), fade.clone(), 0)
            .is_err()
    );
    assert!(
        s.queue_effect(WINDOW, QueueName::Default, fade, 0)
            .unwrap()
            .is_some()
    );
    assert!(s.is_animating(WINDOW));
    s.tick(50);
    assert!(!s.is_animating(WINDOW));
}

#[test]
fn named_queues_wait_for_dequeue() {
    let mut s = scroller();
    let queue = QueueName::named("tour");
    let opts = ScrollOptions::new().with_queue(queue.clone());
    s.scroll_to(PANEL, 400, &opts, 0).unwrap();
    s.scroll_to(PANEL, 800, &opts.clone().append(), 0).unwrap();
    assert!(s.drain_events().is_empty());
    assert!(!s.is_animating(PANEL));
    assert_eq!(s.queued_scrolls(PANEL, &queue).len(), 2);

    // The internal queue is independent.
    assert!(s.queued_scrolls(PANEL, &QueueName::Internal).is_empty());

    s.dequeue(PANEL, &queue, 0);
    run(&mut s, [100, 200, 300, 400, 500, 600, 700, 800]);
    assert_eq!(s.dom().offset(PANEL).vertical, 800.0);
    assert_eq!(
        exits(&s.drain_events()),
        ["start", "done", "complete", "always", "start", "done", "complete", "always"]
    );
}

#[test]
fn placeholder_reserves_the_next_slot() {
    let mut s = scroller();
    s.queue_effect(
        WINDOW,
        QueueName::Internal,
        Effect::Placeholder {
            label: "slot".into(),
        },
        0,
    )
    .unwrap();
    s.scroll_to(WINDOW, 100, &ScrollOptions::new().append(), 0)
        .unwrap();
    s.scroll_to(WINDOW, 200, &ScrollOptions::new().append().run_next(), 0)
        .unwrap();

    let events = s.drain_events();
    assert_eq!(exits(&events), ["reserved"]);
    assert!(matches!(
        &events[0].kind,
        ScrollEventKind::Reserved { label } if label == "slot"
    ));

    s.tick(500);
    assert!(s.drain_events().is_empty());

    s.dequeue(WINDOW, &QueueName::Internal, 500);
    let positions: Vec<Option<f64>> = s
        .queued_scrolls(WINDOW, &QueueName::Internal)
        .iter()
        .map(|info| info.position.vertical)
        .collect();
    assert_eq!(positions, [Some(200.0), Some(100.0)]);
}

#[test]
fn queue_view_reports_first_and_last() {
    let mut s = scroller();
    assert!(s.queue_view(WINDOW, &QueueName::Internal).unwrap().is_empty());
    let a = s.scroll_to(WINDOW, 100, &ScrollOptions::new(), 0).unwrap();
    let b = s
        .scroll_to(WINDOW, 200, &ScrollOptions::new().append(), 0)
        .unwrap();

    let view = s.queue_view(WINDOW, &QueueName::Internal).unwrap();
    assert_eq!(view.first_info().map(|i| i.id), a);
    assert_eq!(view.last_info().map(|i| i.id), b);
    assert_eq!(view.pending_target(), Coordinates::new(None, Some(200.0)));
}

#[test]
fn step_history_is_bounded() {
    let mut h = StepHistory::with_capacity(2);
    for v in [1.0, 2.0, 3.0] {
        h.record(
            Coordinates::new(Some(0.0), Some(v)),
            Coordinates::new(Some(0.0), Some(v + 10.0)),
        );
    }
    assert_eq!(h.len(), 2);
    assert!(h.contains(Axis::Vertical, 3.0));
    assert!(h.contains(Axis::Vertical, 12.0));
    assert!(!h.contains(Axis::Vertical, 1.0));

    let mut none = StepHistory::with_capacity(0);
    none.record(Coordinates::IGNORED, Coordinates::IGNORED);
    assert!(none.is_empty());
}

#[test]
fn zero_history_length_disables_comparison() {
    let mut s = scroller_with(ScrollConfig::default().with_history_length(0));
    s.scroll_to(WINDOW, 400, &ScrollOptions::new(), 0).unwrap();
    s.tick(100);
    s.dom_mut().set_scroll_offset(HTML, Axis::Vertical, 300.0);
    run(&mut s, [200, 300, 400]);
    // Without recorded frames there is no expected position to compare against.
    assert!(exits(&s.drain_events()).contains(&"done"));
}

#[test]
fn detector_reports_state() {
    use crate::history::UserScrollDetector;

    let mut history = StepHistory::with_capacity(6);
    history.record(
        Coordinates::new(Some(0.0), Some(0.0)),
        Coordinates::new(Some(0.0), Some(50.0)),
    );

    let mut off = UserScrollDetector::new(false, 10.0, 1.0, false);
    assert_eq!(off.state(), DetectorState::Disabled);
    assert!(!off.observe(ScrollState::new(0.0, 500.0), &history));

    let mut on = UserScrollDetector::new(true, 10.0, 1.0, false);
    assert!(!on.observe(ScrollState::new(0.0, 45.0), &history));
    assert_eq!(on.cumulative(), ScrollState::new(0.0, -5.0));
    assert_eq!(on.state(), DetectorState::Armed);
    assert!(on.observe(ScrollState::new(6.0, 44.0), &history));
    assert_eq!(on.state(), DetectorState::Triggered);
}

#[test]
fn set_config_applies_to_new_scrolls() {
    let mut s = scroller();
    s.set_config(ScrollConfig::default().with_duration_ms(200));
    s.update_config(|c| c.history_length = 3);
    assert_eq!(s.config().history_length, 3);
    s.scroll_to(WINDOW, 100, &ScrollOptions::new(), 0).unwrap();
    assert_eq!(s.animator_mut().requests[0].duration_ms, 200);
    run(&mut s, [200]);
    assert!(!s.is_animating(WINDOW));
}
