//! Scroll-probe resize detection
//!
//! A sensor subtree is injected as the target's last child: an overlay with
//! an "expand" probe (inner box kept 10px larger than the probe, scrolled to
//! the end) and a "shrink" probe (inner box at 200% of the probe, likewise
//! pinned). Growing the target shrinks the expand probe's scrollable range
//! and clamps its pinned offset; shrinking the target does the same to the
//! shrink probe. Either clamp raises a `scroll` event, the listener compares
//! the target's offset size against the last known size, runs the callback
//! queue on a genuine change, and re-arms both probes.
//!
//! Bookkeeping lives in a side table owned by [`ResizeDetector`], keyed by
//! node identity; nothing is stored on the target node itself.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::dom::geometry::Size;
use crate::dom::style::{Length, Overflow, Position, Style, Visibility};
use crate::dom::{Document, NodeId};
use crate::error::Result;

/// A resize callback registered against one or more elements
pub type SensorCallback = Rc<dyn Fn()>;

/// Attachment target: one element, or a caller-resolved sequence of elements.
#[derive(Debug, Clone)]
pub enum SensorTarget {
    Single(NodeId),
    Sequence(Vec<NodeId>),
}

impl SensorTarget {
    fn into_ids(self) -> Vec<NodeId> {
        match self {
            SensorTarget::Single(id) => vec![id],
            SensorTarget::Sequence(ids) => ids,
        }
    }
}

impl From<NodeId> for SensorTarget {
    fn from(id: NodeId) -> Self {
        SensorTarget::Single(id)
    }
}

impl From<Vec<NodeId>> for SensorTarget {
    fn from(ids: Vec<NodeId>) -> Self {
        SensorTarget::Sequence(ids)
    }
}

impl From<&[NodeId]> for SensorTarget {
    fn from(ids: &[NodeId]) -> Self {
        SensorTarget::Sequence(ids.to_vec())
    }
}

/// Per-element sensor bookkeeping: injected subtree, callback queue, and the
/// last known target size.
struct SensorState {
    subtree: NodeId,
    expand: NodeId,
    expand_child: NodeId,
    shrink: NodeId,
    queue: Vec<SensorCallback>,
    last: Size,
}

type SharedState = Rc<RefCell<SensorState>>;

/// The sensor attachment service.
///
/// Owns the element-to-sensor side table. Attaching to an element that
/// already carries a sensor appends to its callback queue instead of
/// injecting a second subtree; detaching removes the subtree, unbinds the
/// probe listeners and clears the table entry, and is a no-op for elements
/// with no sensor.
#[derive(Default)]
pub struct ResizeDetector {
    table: HashMap<NodeId, SharedState>,
}

impl fmt::Debug for ResizeDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResizeDetector")
            .field("attached", &self.table.len())
            .finish()
    }
}

/// Handle returned by [`ResizeDetector::attach`]; remembers the attached
/// targets so the whole attachment can be detached in one call.
#[derive(Debug, Clone)]
pub struct ResizeSensor {
    targets: Vec<NodeId>,
}

impl ResizeSensor {
    /// The elements this sensor was attached to.
    pub fn targets(&self) -> &[NodeId] {
        &self.targets
    }

    /// Detach the sensors created for the original attachment targets.
    pub fn detach(&self, detector: &mut ResizeDetector, doc: &mut Document) {
        for &target in &self.targets {
            detector.detach_element(doc, target);
        }
    }
}

impl ResizeDetector {
    pub fn new() -> Self {
        ResizeDetector::default()
    }

    /// Attach `callback` to every element of `target`.
    ///
    /// Elements of a sequence are attached independently; within one element,
    /// callbacks fire in attachment order. Invalid node ids surface as DOM
    /// errors from the manipulation calls.
    pub fn attach<F>(
        &mut self,
        doc: &mut Document,
        target: impl Into<SensorTarget>,
        callback: F,
    ) -> Result<ResizeSensor>
    where
        F: Fn() + 'static,
    {
        let callback: SensorCallback = Rc::new(callback);
        let targets = target.into().into_ids();
        for &id in &targets {
            self.attach_element(doc, id, &callback)?;
        }
        debug!("resize sensor attached to {} element(s)", targets.len());
        Ok(ResizeSensor { targets })
    }

    /// Detach every element of `target`; elements with no sensor are skipped.
    pub fn detach(&mut self, doc: &mut Document, target: impl Into<SensorTarget>) {
        for id in target.into().into_ids() {
            self.detach_element(doc, id);
        }
    }

    /// Whether an element currently carries a sensor subtree.
    pub fn is_attached(&self, target: NodeId) -> bool {
        self.table.contains_key(&target)
    }

    /// The cached last-known size of an attached element.
    pub fn last_known_size(&self, target: NodeId) -> Option<Size> {
        self.table.get(&target).map(|state| state.borrow().last)
    }

    fn attach_element(
        &mut self,
        doc: &mut Document,
        target: NodeId,
        callback: &SensorCallback,
    ) -> Result<()> {
        if let Some(state) = self.table.get(&target) {
            state.borrow_mut().queue.push(callback.clone());
            return Ok(());
        }

        let subtree = doc.create_element("div");
        doc.set_class(subtree, "resize-sensor")?;
        doc.set_style(subtree, |s| *s = overlay_style())?;

        let expand = doc.create_element("div");
        doc.set_class(expand, "resize-sensor-expand")?;
        doc.set_style(expand, |s| *s = overlay_style())?;
        let expand_child = doc.create_element("div");
        doc.set_style(expand_child, |s| {
            s.position = Position::Absolute;
            s.left = Some(0);
            s.top = Some(0);
        })?;
        doc.append_child(expand, expand_child)?;

        let shrink = doc.create_element("div");
        doc.set_class(shrink, "resize-sensor-shrink")?;
        doc.set_style(shrink, |s| *s = overlay_style())?;
        let shrink_child = doc.create_element("div");
        doc.set_style(shrink_child, |s| {
            s.position = Position::Absolute;
            s.left = Some(0);
            s.top = Some(0);
            s.width = Some(Length::Percent(200));
            s.height = Some(Length::Percent(200));
        })?;
        doc.append_child(shrink, shrink_child)?;

        doc.append_child(subtree, expand)?;
        doc.append_child(subtree, shrink)?;
        doc.append_child(target, subtree)?;

        // The overlays size themselves against the nearest positioned
        // ancestor, which must be the target itself.
        let position = doc.style(target)?.position;
        if !matches!(position, Position::Fixed | Position::Absolute) {
            doc.set_style(target, |s| s.position = Position::Relative)?;
        }

        let state = Rc::new(RefCell::new(SensorState {
            subtree,
            expand,
            expand_child,
            shrink,
            queue: vec![callback.clone()],
            last: doc.offset_size(target)?,
        }));
        self.table.insert(target, state.clone());

        // Arm the probes before binding listeners so the initial pinning
        // cannot be mistaken for a resize.
        reset(doc, &state, target)?;

        let st = state.clone();
        doc.add_scroll_listener(
            expand,
            Rc::new(move |doc, _| {
                let last = st.borrow().last;
                let Ok(size) = doc.offset_size(target) else {
                    return;
                };
                if size.width > last.width || size.height > last.height {
                    fire(&st);
                }
                let _ = reset(doc, &st, target);
            }),
        )?;
        let st = state;
        doc.add_scroll_listener(
            shrink,
            Rc::new(move |doc, _| {
                let last = st.borrow().last;
                let Ok(size) = doc.offset_size(target) else {
                    return;
                };
                if size.width < last.width || size.height < last.height {
                    fire(&st);
                }
                let _ = reset(doc, &st, target);
            }),
        )?;
        Ok(())
    }

    fn detach_element(&mut self, doc: &mut Document, target: NodeId) {
        let Some(state) = self.table.remove(&target) else {
            return;
        };
        let state = state.borrow();
        let _ = doc.remove_scroll_listeners(state.expand);
        let _ = doc.remove_scroll_listeners(state.shrink);
        let _ = doc.remove_child(target, state.subtree);
        debug!("resize sensor detached from {target}");
    }
}

/// Run the callback queue in attachment order.
fn fire(state: &SharedState) {
    let queue: Vec<SensorCallback> = state.borrow().queue.clone();
    for callback in queue {
        callback();
    }
}

/// Re-arm both probes and refresh the last-known size: grow the expand
/// probe's inner box past the probe, pin both probes to their maximal scroll
/// offsets, and cache the target's current offset size.
fn reset(doc: &mut Document, state: &SharedState, target: NodeId) -> Result<()> {
    let (expand, expand_child, shrink) = {
        let s = state.borrow();
        (s.expand, s.expand_child, s.shrink)
    };
    let probe = doc.offset_size(expand)?;
    doc.set_style_size(
        expand_child,
        Some(Length::Px(probe.width.saturating_add(10))),
        Some(Length::Px(probe.height.saturating_add(10))),
    )?;
    doc.set_scroll_left(expand, doc.scroll_size(expand)?.width)?;
    doc.set_scroll_top(expand, doc.scroll_size(expand)?.height)?;
    doc.set_scroll_left(shrink, doc.scroll_size(shrink)?.width)?;
    doc.set_scroll_top(shrink, doc.scroll_size(shrink)?.height)?;
    state.borrow_mut().last = doc.offset_size(target)?;
    Ok(())
}

fn overlay_style() -> Style {
    Style {
        position: Position::Absolute,
        left: Some(0),
        top: Some(0),
        right: Some(0),
        bottom: Some(0),
        overflow: Overflow::Scroll,
        visibility: Visibility::Hidden,
        z_index: -1,
        ..Style::default()
    }
}
