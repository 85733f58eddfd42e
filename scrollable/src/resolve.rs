use crate::{Axis, Dom, NodeId, NodeKind, ScrollState, ScrollingRoot};

/// A container after normalization: either a window or an ordinary scrollable element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Container {
    Window(NodeId),
    Element(NodeId),
}

impl Container {
    pub fn node(self) -> NodeId {
        match self {
            Self::Window(n) | Self::Element(n) => n,
        }
    }

    pub fn is_window(self) -> bool {
        matches!(self, Self::Window(_))
    }
}

/// Maps window-referring nodes to their window and iframes to their content window.
///
/// Unknown nodes are treated as ordinary elements; an empty selection stays empty.
pub fn normalize_container<D: Dom + ?Sized>(dom: &D, node: Option<NodeId>) -> Option<Container> {
    let node = node?;
    let container = match dom.node_kind(node) {
        Some(NodeKind::Window) => Container::Window(node),
        Some(
            NodeKind::Document { window }
            | NodeKind::DocumentElement { window }
            | NodeKind::Body { window },
        ) => Container::Window(window),
        Some(NodeKind::Frame {
            content_window: Some(window),
        }) => Container::Window(window),
        Some(NodeKind::Frame {
            content_window: None,
        })
        | Some(NodeKind::Element)
        | None => Container::Element(node),
    };
    Some(container)
}

/// Lazily detected, cached answer to "does a standards-mode window scroll `html` or `body`".
#[derive(Clone, Debug, Default)]
pub(crate) struct RootDetector {
    cached: Option<ScrollingRoot>,
}

impl RootDetector {
    pub(crate) fn root_for<D: Dom + ?Sized>(&mut self, dom: &mut D, window: NodeId) -> ScrollingRoot {
        if dom.is_quirks_mode(window) {
            return ScrollingRoot::Body;
        }
        if let Some(root) = self.cached {
            return root;
        }
        let root = detect_root(dom, window);
        sdebug!(?root, "detected scrolling root");
        self.cached = Some(root);
        root
    }

    pub(crate) fn cached(&self) -> Option<ScrollingRoot> {
        self.cached
    }
}

fn detect_root<D: Dom + ?Sized>(dom: &mut D, window: NodeId) -> ScrollingRoot {
    if let Some(el) = dom.scrolling_element(window) {
        if Some(el) == dom.document_element(window) {
            return ScrollingRoot::DocumentElement;
        }
        if Some(el) == dom.body(window) {
            return ScrollingRoot::Body;
        }
    }
    dom.probe_scrolling_root().unwrap_or_else(|| {
        swarn!("scrolling root probe inconclusive, assuming documentElement");
        ScrollingRoot::DocumentElement
    })
}

/// Resolves the element whose scroll offsets actually move for `container`.
pub(crate) fn scrollable_element<D: Dom + ?Sized>(
    dom: &mut D,
    roots: &mut RootDetector,
    container: Container,
) -> NodeId {
    match container {
        Container::Element(el) => el,
        Container::Window(window) => {
            let root = match roots.root_for(dom, window) {
                ScrollingRoot::DocumentElement => dom.document_element(window),
                ScrollingRoot::Body => dom.body(window),
            };
            root.unwrap_or(window)
        }
    }
}

/// `max(content − viewport, 0)` along `axis`.
pub fn scroll_maximum<D: Dom + ?Sized>(dom: &D, container: Container, axis: Axis) -> f64 {
    let node = container.node();
    let content = dom.content_size(node).along(axis);
    let viewport = dom.viewport_size(node).along(axis);
    (content - viewport).max(0.0)
}

pub fn scroll_range<D: Dom + ?Sized>(dom: &D, container: Container) -> ScrollState {
    ScrollState::new(
        scroll_maximum(dom, container, Axis::Horizontal),
        scroll_maximum(dom, container, Axis::Vertical),
    )
}

pub(crate) fn scroll_position<D: Dom + ?Sized>(dom: &D, scrollable: NodeId) -> ScrollState {
    ScrollState::new(
        dom.scroll_offset(scrollable, Axis::Horizontal),
        dom.scroll_offset(scrollable, Axis::Vertical),
    )
}
