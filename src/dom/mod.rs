//! Headless element tree with scroll geometry and synchronous scroll events
//!
//! This is the minimal host environment a scroll-probe resize sensor needs:
//! a mutable tree of styled nodes, offset/scroll geometry derived on the fly,
//! and `scroll` events dispatched when a node's clamped scroll offsets move.
//!
//! Dispatch is single-threaded and cooperative. Mutations enqueue events;
//! the queue drains at the end of the outermost public mutation, and
//! listeners run to completion before the next event is processed.

pub mod geometry;
pub mod style;

use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use log::trace;

use crate::error::{Error, Result};
use crate::Viewport;
use style::{Length, Style};

/// Identity of a node within one `Document`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A scroll listener. Receives the document and the node the event fired on.
pub type ScrollListener = Rc<dyn Fn(&mut Document, NodeId)>;

pub(crate) struct Node {
    pub(crate) tag: String,
    pub(crate) class: String,
    pub(crate) style: Style,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) scroll_left: u32,
    pub(crate) scroll_top: u32,
    pub(crate) scroll_listeners: Vec<ScrollListener>,
}

impl Node {
    fn new(tag: &str) -> Self {
        Node {
            tag: tag.to_string(),
            class: String::new(),
            style: Style::default(),
            parent: None,
            children: Vec::new(),
            scroll_left: 0,
            scroll_top: 0,
            scroll_listeners: Vec::new(),
        }
    }
}

/// An element tree sized by a viewport.
///
/// Node ids are slots in an arena; removing a subtree frees its slots, and
/// later use of a freed id fails with [`Error::NodeNotFound`].
pub struct Document {
    nodes: Vec<Option<Node>>,
    root: NodeId,
    viewport: Viewport,
    pending: VecDeque<NodeId>,
    draining: bool,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.nodes.iter().filter(|n| n.is_some()).count())
            .field("viewport", &self.viewport)
            .finish()
    }
}

impl Document {
    /// Create a document with a root `body` node sized by `viewport`.
    pub fn new(viewport: Viewport) -> Self {
        Document {
            nodes: vec![Some(Node::new("body"))],
            root: NodeId(0),
            viewport,
            pending: VecDeque::new(),
            draining: false,
        }
    }

    /// The root node (always live).
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub(crate) fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes
            .get(id.0)
            .and_then(|slot| slot.as_ref())
            .ok_or(Error::NodeNotFound(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes
            .get_mut(id.0)
            .and_then(|slot| slot.as_mut())
            .ok_or(Error::NodeNotFound(id))
    }

    pub(crate) fn live_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len())
            .map(NodeId)
            .filter(|id| self.nodes[id.0].is_some())
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.nodes.push(Some(Node::new(tag)));
        NodeId(self.nodes.len() - 1)
    }

    pub fn tag(&self, id: NodeId) -> Result<&str> {
        Ok(&self.node(id)?.tag)
    }

    pub fn class(&self, id: NodeId) -> Result<&str> {
        Ok(&self.node(id)?.class)
    }

    pub fn set_class(&mut self, id: NodeId, class: &str) -> Result<()> {
        self.node_mut(id)?.class = class.to_string();
        Ok(())
    }

    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.node(id)?.parent)
    }

    pub fn children(&self, id: NodeId) -> Result<&[NodeId]> {
        Ok(&self.node(id)?.children)
    }

    pub fn style(&self, id: NodeId) -> Result<&Style> {
        Ok(&self.node(id)?.style)
    }

    /// Mutate a node's inline style; geometry is reflowed afterwards and any
    /// resulting scroll events are delivered before this returns.
    pub fn set_style<F>(&mut self, id: NodeId, f: F) -> Result<()>
    where
        F: FnOnce(&mut Style),
    {
        f(&mut self.node_mut(id)?.style);
        self.reflow();
        self.drain();
        Ok(())
    }

    /// Convenience setter for explicit width/height.
    pub fn set_style_size(
        &mut self,
        id: NodeId,
        width: Option<Length>,
        height: Option<Length>,
    ) -> Result<()> {
        self.set_style(id, |s| {
            s.width = width;
            s.height = height;
        })
    }

    /// Append `child` as the last child of `parent`, moving it if it already
    /// has a parent.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.node(child)?;
        // Reject cycles: parent must not be inside child's subtree.
        let mut cursor = Some(parent);
        while let Some(id) = cursor {
            if id == child {
                return Err(Error::Hierarchy(format!(
                    "cannot append {child} into its own subtree"
                )));
            }
            cursor = self.node(id)?.parent;
        }
        if let Some(old) = self.node(child)?.parent {
            let old_node = self.node_mut(old)?;
            old_node.children.retain(|&c| c != child);
        }
        self.node_mut(child)?.parent = Some(parent);
        self.node_mut(parent)?.children.push(child);
        self.reflow();
        self.drain();
        Ok(())
    }

    /// Remove `child` (and its whole subtree) from `parent`. The removed ids
    /// become invalid.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        if self.node(child)?.parent != Some(parent) {
            return Err(Error::NotAChild { parent, child });
        }
        self.node_mut(parent)?.children.retain(|&c| c != child);
        self.drop_subtree(child);
        self.reflow();
        self.drain();
        Ok(())
    }

    fn drop_subtree(&mut self, id: NodeId) {
        if let Some(node) = self.nodes[id.0].take() {
            for c in node.children {
                self.drop_subtree(c);
            }
        }
    }

    pub fn scroll_left(&self, id: NodeId) -> Result<u32> {
        Ok(self.node(id)?.scroll_left)
    }

    pub fn scroll_top(&self, id: NodeId) -> Result<u32> {
        Ok(self.node(id)?.scroll_top)
    }

    /// Set the horizontal scroll offset, clamped to the scrollable range.
    /// A changed offset raises a `scroll` event on the node.
    pub fn set_scroll_left(&mut self, id: NodeId, value: u32) -> Result<()> {
        let max = self.max_scroll(id)?.width;
        let v = value.min(max);
        let node = self.node_mut(id)?;
        if node.scroll_left != v {
            node.scroll_left = v;
            self.pending.push_back(id);
        }
        self.drain();
        Ok(())
    }

    /// Vertical counterpart of [`Document::set_scroll_left`].
    pub fn set_scroll_top(&mut self, id: NodeId, value: u32) -> Result<()> {
        let max = self.max_scroll(id)?.height;
        let v = value.min(max);
        let node = self.node_mut(id)?;
        if node.scroll_top != v {
            node.scroll_top = v;
            self.pending.push_back(id);
        }
        self.drain();
        Ok(())
    }

    pub fn add_scroll_listener(&mut self, id: NodeId, listener: ScrollListener) -> Result<()> {
        self.node_mut(id)?.scroll_listeners.push(listener);
        Ok(())
    }

    /// Unbind every scroll listener on a node.
    pub fn remove_scroll_listeners(&mut self, id: NodeId) -> Result<()> {
        self.node_mut(id)?.scroll_listeners.clear();
        Ok(())
    }

    pub(crate) fn enqueue_scroll(&mut self, id: NodeId) {
        self.pending.push_back(id);
    }

    /// Deliver queued scroll events in FIFO order. Listener mutations enqueue
    /// further events into the same loop; re-entrant calls return immediately.
    pub(crate) fn drain(&mut self) {
        if self.draining {
            return;
        }
        self.draining = true;
        while let Some(target) = self.pending.pop_front() {
            let listeners = match self.node(target) {
                Ok(node) => node.scroll_listeners.clone(),
                // Node was removed after the event was queued.
                Err(_) => continue,
            };
            trace!("scroll event on {target} ({} listener(s))", listeners.len());
            for listener in listeners {
                listener(self, target);
            }
        }
        self.draining = false;
    }
}
