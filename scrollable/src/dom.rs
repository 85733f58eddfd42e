use crate::{Axis, NodeId};

/// Classification of a host node, as far as scrolling is concerned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeKind {
    Window,
    Document { window: NodeId },
    /// The `html` element.
    DocumentElement { window: NodeId },
    Body { window: NodeId },
    /// An iframe; `content_window` is `None` until its document is available.
    Frame { content_window: Option<NodeId> },
    Element,
}

/// The element a window actually scrolls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollingRoot {
    DocumentElement,
    Body,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn along(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }
}

/// The host document, as seen by the engine.
///
/// Implementations wrap a real DOM (or any retained UI tree). Measurements for windows are
/// expected to be viewport-aware: `viewport_size` of a window should report the visible area
/// in document pixels, accounting for pinch-zoom and mobile browser chrome.
pub trait Dom {
    /// Returns `None` for unknown nodes.
    fn node_kind(&self, node: NodeId) -> Option<NodeKind>;

    fn document_element(&self, window: NodeId) -> Option<NodeId>;

    fn body(&self, window: NodeId) -> Option<NodeId>;

    /// The platform's own answer to "which element scrolls this window", if it has one.
    fn scrolling_element(&self, _window: NodeId) -> Option<NodeId> {
        None
    }

    fn is_quirks_mode(&self, _window: NodeId) -> bool {
        false
    }

    /// Runs the sandboxed probe: scroll a hidden document by 1px and report which of
    /// `html`/`body` moved. `None` if the host cannot run it.
    fn probe_scrolling_root(&mut self) -> Option<ScrollingRoot> {
        None
    }

    /// Content size of a window (its document) or an element (its scroll size).
    fn content_size(&self, container: NodeId) -> Size;

    /// Visible size of a window (its viewport) or an element (its client size).
    fn viewport_size(&self, container: NodeId) -> Size;

    fn scroll_offset(&self, node: NodeId, axis: Axis) -> f64;

    fn set_scroll_offset(&mut self, node: NodeId, axis: Axis, value: f64);

    /// `true` if `node` is `ancestor` or one of its descendants.
    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool;

    /// Attaches (`active = true`) or releases a pointer/touch/mousedown listener on `node`.
    ///
    /// Calls are balanced per animation; hosts that route input through
    /// [`crate::Scroller::pointer_down`] may ignore them.
    fn set_pointer_listener(&mut self, _node: NodeId, _active: bool) {}
}
