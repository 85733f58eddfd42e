use std::collections::BTreeMap;

use scrollable::{Axis, Dom, NodeId, NodeKind, ScrollState, ScrollingRoot, Size};

/// Node ids of a window created with [`MemoryDom::add_window`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowNodes {
    pub window: NodeId,
    pub document: NodeId,
    pub html: NodeId,
    pub body: NodeId,
}

#[derive(Clone, Debug)]
struct MemoryNode {
    kind: NodeKind,
    parent: Option<NodeId>,
    /// Viewport size for windows, client size for elements.
    viewport: Size,
    /// Document size for windows, scroll size for elements.
    content: Size,
    offset: ScrollState,
}

#[derive(Clone, Copy, Debug)]
struct WindowState {
    nodes: WindowNodes,
    quirks: bool,
}

/// An in-memory document for headless hosts, demos and tests.
///
/// Scroll offsets behave like a browser's: they are truncated to whole pixels and clamped to
/// the scrollable range, and in each window only the scrolling root (`html`, or `body` in
/// quirks mode or when configured) actually moves.
#[derive(Clone, Debug)]
pub struct MemoryDom {
    nodes: BTreeMap<NodeId, MemoryNode>,
    windows: BTreeMap<NodeId, WindowState>,
    next_id: u64,
    root: ScrollingRoot,
    reports_scrolling_element: bool,
    probe_supported: bool,
    probes: usize,
    listeners: BTreeMap<NodeId, usize>,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self {
            nodes: BTreeMap::new(),
            windows: BTreeMap::new(),
            next_id: 0,
            root: ScrollingRoot::DocumentElement,
            reports_scrolling_element: true,
            probe_supported: true,
            probes: 0,
            listeners: BTreeMap::new(),
        }
    }
}

impl MemoryDom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Which element standards-mode windows scroll.
    pub fn with_scrolling_root(mut self, root: ScrollingRoot) -> Self {
        self.root = root;
        self
    }

    /// Whether windows answer `document.scrollingElement`. Off forces the probe.
    pub fn with_scrolling_element(mut self, reported: bool) -> Self {
        self.reports_scrolling_element = reported;
        self
    }

    pub fn with_probe(mut self, supported: bool) -> Self {
        self.probe_supported = supported;
        self
    }

    fn alloc(&mut self, kind: NodeKind, parent: Option<NodeId>, viewport: Size, content: Size) -> NodeId {
        self.next_id += 1;
        let id = NodeId(self.next_id);
        self.nodes.insert(
            id,
            MemoryNode {
                kind,
                parent,
                viewport,
                content,
                offset: ScrollState::default(),
            },
        );
        id
    }

    /// Adds a window showing a `document`-sized page through a `viewport`-sized view.
    pub fn add_window(&mut self, viewport: Size, document: Size) -> WindowNodes {
        let window = self.alloc(NodeKind::Window, None, viewport, document);
        let document_node = self.alloc(NodeKind::Document { window }, None, viewport, document);
        let html = self.alloc(
            NodeKind::DocumentElement { window },
            Some(document_node),
            viewport,
            document,
        );
        let body = self.alloc(NodeKind::Body { window }, Some(html), viewport, document);
        let nodes = WindowNodes {
            window,
            document: document_node,
            html,
            body,
        };
        self.windows.insert(
            window,
            WindowState {
                nodes,
                quirks: false,
            },
        );
        nodes
    }

    /// Adds an element with its own scroll area under `parent`.
    pub fn add_element(&mut self, parent: NodeId, viewport: Size, content: Size) -> NodeId {
        self.alloc(NodeKind::Element, Some(parent), viewport, content)
    }

    /// Adds an iframe under `parent`; `content_window` is `None` for an unloaded frame.
    pub fn add_frame(&mut self, parent: NodeId, content_window: Option<NodeId>) -> NodeId {
        self.alloc(
            NodeKind::Frame { content_window },
            Some(parent),
            Size::default(),
            Size::default(),
        )
    }

    pub fn set_quirks_mode(&mut self, window: NodeId, quirks: bool) {
        if let Some(state) = self.windows.get_mut(&window) {
            state.quirks = quirks;
        }
    }

    pub fn resize(&mut self, node: NodeId, viewport: Size, content: Size) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.viewport = viewport;
            n.content = content;
        }
    }

    /// Moves `node` by `delta` on `axis` the way a wheel or a drag would.
    pub fn user_scroll(&mut self, node: NodeId, axis: Axis, delta: f64) {
        let target = self.moving_node(node);
        let current = self.scroll_offset(target, axis);
        self.set_scroll_offset(target, axis, current + delta);
    }

    pub fn offset(&self, node: NodeId) -> ScrollState {
        let node = self.moving_node(node);
        self.nodes
            .get(&node)
            .map_or_else(ScrollState::default, |n| n.offset)
    }

    /// Number of pointer listeners currently attached to `node`.
    pub fn listener_count(&self, node: NodeId) -> usize {
        self.listeners.get(&node).copied().unwrap_or(0)
    }

    pub fn probe_count(&self) -> usize {
        self.probes
    }

    fn window_of(&self, node: NodeId) -> Option<&WindowState> {
        match self.nodes.get(&node)?.kind {
            NodeKind::Window => self.windows.get(&node),
            NodeKind::Document { window }
            | NodeKind::DocumentElement { window }
            | NodeKind::Body { window } => self.windows.get(&window),
            NodeKind::Frame { .. } | NodeKind::Element => None,
        }
    }

    fn active_root(&self, state: &WindowState) -> NodeId {
        match (state.quirks, self.root) {
            (true, _) | (false, ScrollingRoot::Body) => state.nodes.body,
            (false, ScrollingRoot::DocumentElement) => state.nodes.html,
        }
    }

    /// The node whose offsets really change when `node` is scrolled.
    fn moving_node(&self, node: NodeId) -> NodeId {
        self.window_of(node)
            .map_or(node, |state| self.active_root(state))
    }

    fn maximum(&self, node: NodeId, axis: Axis) -> f64 {
        let measured = self
            .window_of(node)
            .map_or(node, |state| state.nodes.window);
        self.nodes.get(&measured).map_or(0.0, |n| {
            (n.content.along(axis) - n.viewport.along(axis)).max(0.0)
        })
    }
}

impl Dom for MemoryDom {
    fn node_kind(&self, node: NodeId) -> Option<NodeKind> {
        self.nodes.get(&node).map(|n| n.kind)
    }

    fn document_element(&self, window: NodeId) -> Option<NodeId> {
        self.windows.get(&window).map(|w| w.nodes.html)
    }

    fn body(&self, window: NodeId) -> Option<NodeId> {
        self.windows.get(&window).map(|w| w.nodes.body)
    }

    fn scrolling_element(&self, window: NodeId) -> Option<NodeId> {
        if !self.reports_scrolling_element {
            return None;
        }
        self.windows.get(&window).map(|w| self.active_root(w))
    }

    fn is_quirks_mode(&self, window: NodeId) -> bool {
        self.windows.get(&window).is_some_and(|w| w.quirks)
    }

    fn probe_scrolling_root(&mut self) -> Option<ScrollingRoot> {
        self.probes += 1;
        self.probe_supported.then_some(self.root)
    }

    fn content_size(&self, container: NodeId) -> Size {
        self.nodes
            .get(&container)
            .map_or_else(Size::default, |n| n.content)
    }

    fn viewport_size(&self, container: NodeId) -> Size {
        self.nodes
            .get(&container)
            .map_or_else(Size::default, |n| n.viewport)
    }

    fn scroll_offset(&self, node: NodeId, axis: Axis) -> f64 {
        self.nodes.get(&node).map_or(0.0, |n| n.offset.get(axis))
    }

    fn set_scroll_offset(&mut self, node: NodeId, axis: Axis, value: f64) {
        let is_root = matches!(
            self.node_kind(node),
            Some(NodeKind::DocumentElement { .. } | NodeKind::Body { .. })
        );
        let inactive_root = is_root
            && self
                .window_of(node)
                .is_some_and(|state| self.active_root(state) != node);
        if inactive_root {
            return;
        }
        let value = value.trunc().clamp(0.0, self.maximum(node, axis));
        if let Some(n) = self.nodes.get_mut(&node) {
            n.offset.set(axis, value);
        }
    }

    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cur = Some(node);
        while let Some(id) = cur {
            if id == ancestor {
                return true;
            }
            cur = self.nodes.get(&id).and_then(|n| n.parent);
        }
        false
    }

    fn set_pointer_listener(&mut self, node: NodeId, active: bool) {
        let count = self.listeners.entry(node).or_default();
        if active {
            *count += 1;
        } else {
            *count = count.saturating_sub(1);
        }
    }
}
