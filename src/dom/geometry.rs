//! Offset/scroll geometry queries and reflow
//!
//! Geometry is derived on demand from inline styles; the only stored mutable
//! geometry is each node's scroll offsets. `reflow` re-clamps those offsets
//! after a mutation, and every clamp that moves an offset raises a `scroll`
//! event. That clamping is the mechanic scroll-probe sensors rely on: a probe
//! pinned at its maximal scroll position reports an event exactly when its
//! scrollable range shrinks.

use log::trace;
use serde::Serialize;

use super::style::{Length, Overflow, Position};
use super::{Document, NodeId};
use crate::error::Result;

/// A width/height pair in px
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

/// Recursive geometry dump of a subtree, used by golden tests
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeometrySnapshot {
    pub tag: String,
    pub class: String,
    pub offset: Size,
    pub scroll: Size,
    pub scroll_left: u32,
    pub scroll_top: u32,
    pub children: Vec<GeometrySnapshot>,
}

impl Document {
    /// The containing block of `id`: nearest positioned ancestor, the root
    /// for `fixed` nodes, and the root as fallback.
    fn containing_block(&self, id: NodeId) -> Result<NodeId> {
        if self.node(id)?.style.position == Position::Fixed {
            return Ok(self.root);
        }
        let mut cursor = self.node(id)?.parent;
        while let Some(p) = cursor {
            let node = self.node(p)?;
            if node.style.position != Position::Static {
                return Ok(p);
            }
            cursor = node.parent;
        }
        Ok(self.root)
    }

    /// Border-box size of a node.
    ///
    /// Explicit lengths win (`Percent` resolves against the containing
    /// block). Absolutely positioned nodes with both opposing insets stretch
    /// to fill the containing block. Otherwise block behavior: width from the
    /// parent, height zero (no text layout in this model).
    pub fn offset_size(&self, id: NodeId) -> Result<Size> {
        if id == self.root {
            return Ok(Size {
                width: self.viewport.width,
                height: self.viewport.height,
            });
        }
        let style = self.node(id)?.style.clone();
        let positioned = matches!(style.position, Position::Absolute | Position::Fixed);

        let width = match style.width {
            Some(Length::Px(px)) => px,
            Some(Length::Percent(pct)) => {
                let base = self.offset_size(self.containing_block(id)?)?.width;
                percent_of(base, pct)
            }
            None if positioned => match (style.left, style.right) {
                (Some(l), Some(r)) => {
                    let base = self.offset_size(self.containing_block(id)?)?.width as i64;
                    (base - l as i64 - r as i64).max(0) as u32
                }
                _ => 0,
            },
            None => match self.node(id)?.parent {
                Some(p) => self.offset_size(p)?.width,
                None => 0,
            },
        };

        let height = match style.height {
            Some(Length::Px(px)) => px,
            Some(Length::Percent(pct)) => {
                let base = self.offset_size(self.containing_block(id)?)?.height;
                percent_of(base, pct)
            }
            None if positioned => match (style.top, style.bottom) {
                (Some(t), Some(b)) => {
                    let base = self.offset_size(self.containing_block(id)?)?.height as i64;
                    (base - t as i64 - b as i64).max(0) as u32
                }
                _ => 0,
            },
            None => 0,
        };

        Ok(Size { width, height })
    }

    /// Scrollable content size: at least the client size, grown by each
    /// child's inset plus extent.
    pub fn scroll_size(&self, id: NodeId) -> Result<Size> {
        let client = self.offset_size(id)?;
        let mut size = client;
        let children = self.node(id)?.children.clone();
        for child in children {
            let extent = self.offset_size(child)?;
            let style = &self.node(child)?.style;
            let x = style.left.unwrap_or(0).max(0) as u32;
            let y = style.top.unwrap_or(0).max(0) as u32;
            size.width = size.width.max(x.saturating_add(extent.width));
            size.height = size.height.max(y.saturating_add(extent.height));
        }
        Ok(size)
    }

    /// Maximal scroll offsets: content size minus client size.
    pub fn max_scroll(&self, id: NodeId) -> Result<Size> {
        let content = self.scroll_size(id)?;
        let client = self.offset_size(id)?;
        Ok(Size {
            width: content.width.saturating_sub(client.width),
            height: content.height.saturating_sub(client.height),
        })
    }

    /// Re-clamp every `overflow: scroll` node's offsets to its scrollable
    /// range, raising a `scroll` event for each offset that moves. Called
    /// after every tree or style mutation.
    pub(crate) fn reflow(&mut self) {
        let ids: Vec<NodeId> = self.live_ids().collect();
        for id in ids {
            let scrollable = self
                .node(id)
                .map(|n| n.style.overflow == Overflow::Scroll)
                .unwrap_or(false);
            if !scrollable {
                continue;
            }
            let max = match self.max_scroll(id) {
                Ok(m) => m,
                Err(_) => continue,
            };
            let node = match self.node_mut(id) {
                Ok(n) => n,
                Err(_) => continue,
            };
            let left = node.scroll_left.min(max.width);
            let top = node.scroll_top.min(max.height);
            if left != node.scroll_left || top != node.scroll_top {
                node.scroll_left = left;
                node.scroll_top = top;
                trace!("reflow clamped scroll of {id} to {left},{top}");
                self.enqueue_scroll(id);
            }
        }
    }

    /// Snapshot the whole tree's geometry (deterministic, serializable).
    pub fn geometry_snapshot(&self) -> Result<GeometrySnapshot> {
        self.snapshot_node(self.root)
    }

    fn snapshot_node(&self, id: NodeId) -> Result<GeometrySnapshot> {
        let node = self.node(id)?;
        let mut children = Vec::with_capacity(node.children.len());
        for &child in &node.children {
            children.push(self.snapshot_node(child)?);
        }
        Ok(GeometrySnapshot {
            tag: node.tag.clone(),
            class: node.class.clone(),
            offset: self.offset_size(id)?,
            scroll: self.scroll_size(id)?,
            scroll_left: node.scroll_left,
            scroll_top: node.scroll_top,
            children,
        })
    }
}

/// Percentage of a base length, saturating at `u32::MAX`.
fn percent_of(base: u32, pct: u32) -> u32 {
    (base as u64 * pct as u64 / 100).min(u32::MAX as u64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::style::{Style, Visibility};
    use crate::Viewport;

    fn doc() -> Document {
        Document::new(Viewport {
            width: 800,
            height: 600,
        })
    }

    fn abs_inset_zero() -> Style {
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

    #[test]
    fn root_is_viewport_sized() {
        let d = doc();
        let root = d.root();
        assert_eq!(
            d.offset_size(root).unwrap(),
            Size {
                width: 800,
                height: 600
            }
        );
    }

    #[test]
    fn explicit_px_and_block_width() {
        let mut d = doc();
        let root = d.root();
        let a = d.create_element("div");
        d.append_child(root, a).unwrap();
        // Block: width from parent, height 0.
        assert_eq!(
            d.offset_size(a).unwrap(),
            Size {
                width: 800,
                height: 0
            }
        );
        d.set_style_size(a, Some(Length::Px(100)), Some(Length::Px(100)))
            .unwrap();
        assert_eq!(
            d.offset_size(a).unwrap(),
            Size {
                width: 100,
                height: 100
            }
        );
    }

    #[test]
    fn inset_stretch_resolves_against_positioned_ancestor() {
        let mut d = doc();
        let root = d.root();
        let host = d.create_element("div");
        d.append_child(root, host).unwrap();
        d.set_style(host, |s| {
            s.position = Position::Relative;
            s.width = Some(Length::Px(100));
            s.height = Some(Length::Px(100));
        })
        .unwrap();
        let overlay = d.create_element("div");
        d.set_style(overlay, |s| *s = abs_inset_zero()).unwrap();
        d.append_child(host, overlay).unwrap();
        assert_eq!(
            d.offset_size(overlay).unwrap(),
            Size {
                width: 100,
                height: 100
            }
        );
    }

    #[test]
    fn percent_resolves_against_containing_block() {
        let mut d = doc();
        let root = d.root();
        let host = d.create_element("div");
        d.append_child(root, host).unwrap();
        d.set_style(host, |s| {
            s.position = Position::Relative;
            s.width = Some(Length::Px(100));
            s.height = Some(Length::Px(50));
        })
        .unwrap();
        let inner = d.create_element("div");
        d.set_style(inner, |s| {
            s.position = Position::Absolute;
            s.left = Some(0);
            s.top = Some(0);
            s.width = Some(Length::Percent(200));
            s.height = Some(Length::Percent(200));
        })
        .unwrap();
        d.append_child(host, inner).unwrap();
        assert_eq!(
            d.offset_size(inner).unwrap(),
            Size {
                width: 200,
                height: 100
            }
        );
    }

    #[test]
    fn scroll_size_grows_with_children() {
        let mut d = doc();
        let root = d.root();
        let host = d.create_element("div");
        d.append_child(root, host).unwrap();
        d.set_style(host, |s| {
            s.position = Position::Relative;
            s.overflow = Overflow::Scroll;
            s.width = Some(Length::Px(100));
            s.height = Some(Length::Px(100));
        })
        .unwrap();
        let inner = d.create_element("div");
        d.set_style(inner, |s| {
            s.position = Position::Absolute;
            s.left = Some(0);
            s.top = Some(0);
            s.width = Some(Length::Px(110));
            s.height = Some(Length::Px(110));
        })
        .unwrap();
        d.append_child(host, inner).unwrap();
        assert_eq!(
            d.scroll_size(host).unwrap(),
            Size {
                width: 110,
                height: 110
            }
        );
        assert_eq!(
            d.max_scroll(host).unwrap(),
            Size {
                width: 10,
                height: 10
            }
        );
    }

    #[test]
    fn shrinking_clamps_pinned_scroll() {
        let mut d = doc();
        let root = d.root();
        let host = d.create_element("div");
        d.append_child(root, host).unwrap();
        d.set_style(host, |s| {
            s.position = Position::Relative;
            s.overflow = Overflow::Scroll;
            s.width = Some(Length::Px(100));
            s.height = Some(Length::Px(100));
        })
        .unwrap();
        let inner = d.create_element("div");
        d.set_style(inner, |s| {
            s.position = Position::Absolute;
            s.left = Some(0);
            s.top = Some(0);
            s.width = Some(Length::Percent(200));
            s.height = Some(Length::Percent(200));
        })
        .unwrap();
        d.append_child(host, inner).unwrap();
        // Pin to max.
        d.set_scroll_left(host, u32::MAX).unwrap();
        assert_eq!(d.scroll_left(host).unwrap(), 100);
        // Shrink the host: range shrinks from 100 to 80, offset clamps.
        d.set_style_size(host, Some(Length::Px(80)), Some(Length::Px(100)))
            .unwrap();
        assert_eq!(d.scroll_left(host).unwrap(), 80);
    }

    #[test]
    fn pathological_sizes_saturate() {
        let mut d = doc();
        let root = d.root();
        let host = d.create_element("div");
        d.append_child(root, host).unwrap();
        d.set_style(host, |s| {
            s.position = Position::Relative;
            s.overflow = Overflow::Scroll;
            s.width = Some(Length::Px(u32::MAX));
            s.height = Some(Length::Px(u32::MAX));
        })
        .unwrap();
        let inner = d.create_element("div");
        d.set_style(inner, |s| {
            s.position = Position::Absolute;
            s.left = Some(1);
            s.top = Some(1);
            s.width = Some(Length::Percent(200));
            s.height = Some(Length::Percent(200));
        })
        .unwrap();
        d.append_child(host, inner).unwrap();
        assert_eq!(
            d.offset_size(inner).unwrap(),
            Size {
                width: u32::MAX,
                height: u32::MAX
            }
        );
        assert_eq!(
            d.scroll_size(host).unwrap(),
            Size {
                width: u32::MAX,
                height: u32::MAX
            }
        );
        assert_eq!(d.max_scroll(host).unwrap(), Size::default());
    }

    #[test]
    fn snapshot_is_deterministic() {
        let build = || {
            let mut d = doc();
            let root = d.root();
            let a = d.create_element("div");
            d.set_style(a, |s| *s = abs_inset_zero()).unwrap();
            d.append_child(root, a).unwrap();
            d.geometry_snapshot().unwrap()
        };
        assert_eq!(build(), build());
    }
}
