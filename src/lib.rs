//! RFox Resize Sensor
//!
//! Scroll-probe resize detection for headless DOM trees: the crate carries a
//! small deterministic element tree (inline styles, offset/scroll geometry,
//! synchronous `scroll` events) and a sensor service that injects hidden
//! probe overlays into a target element and runs callbacks whenever the
//! target's box size actually changes.
//!
//! # Example
//!
//! ```
//! use rfsensor::{Document, Length, ResizeDetector, Viewport};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! # fn main() -> rfsensor::Result<()> {
//! let mut doc = Document::new(Viewport::default());
//! let panel = doc.create_element("div");
//! let root = doc.root();
//! doc.append_child(root, panel)?;
//! doc.set_style_size(panel, Some(Length::Px(100)), Some(Length::Px(100)))?;
//!
//! let resizes = Rc::new(Cell::new(0));
//! let seen = resizes.clone();
//! let mut detector = ResizeDetector::new();
//! let sensor = detector.attach(&mut doc, panel, move || seen.set(seen.get() + 1))?;
//!
//! doc.set_style_size(panel, Some(Length::Px(150)), Some(Length::Px(100)))?;
//! assert_eq!(resizes.get(), 1);
//!
//! sensor.detach(&mut detector, &mut doc);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub use error::{Error, Result};

pub mod dom;
pub use dom::geometry::{GeometrySnapshot, Size};
pub use dom::style::{Length, Overflow, Position, Style, Visibility};
pub use dom::{Document, NodeId};

pub mod sensor;
pub use sensor::{ResizeDetector, ResizeSensor, SensorTarget};

// HTML loading backend (scraper)
#[cfg(feature = "html")]
pub mod html;

/// Viewport dimensions that size a document's root node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_viewport() {
        let viewport = Viewport::default();
        assert_eq!(viewport.width, 1280);
        assert_eq!(viewport.height, 720);
    }

    #[test]
    fn test_root_tracks_viewport() {
        let doc = Document::new(Viewport {
            width: 1920,
            height: 1080,
        });
        let size = doc.offset_size(doc.root()).unwrap();
        assert_eq!(size.width, 1920);
        assert_eq!(size.height, 1080);
    }
}
