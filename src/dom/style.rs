//! Inline style primitives and a small declaration-text parser
//!
//! Only the properties the geometry model consumes are represented. Unknown
//! properties in declaration text are ignored, matching how a browser treats
//! unrecognized inline CSS.

use crate::error::{Error, Result};

/// CSS positioning scheme
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Position {
    #[default]
    Static,
    Relative,
    Absolute,
    Fixed,
}

/// Overflow behavior; only `Scroll` nodes participate in scroll clamping
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Overflow {
    #[default]
    Visible,
    Scroll,
    Hidden,
}

/// Visibility; carried for fidelity, geometry ignores it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
}

/// A width/height value: absolute pixels or a percentage of the containing block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Length {
    Px(u32),
    Percent(u32),
}

/// Inline style of a single node
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Style {
    pub position: Position,
    pub width: Option<Length>,
    pub height: Option<Length>,
    /// Inset offsets in px, used by absolutely positioned nodes
    pub left: Option<i32>,
    pub top: Option<i32>,
    pub right: Option<i32>,
    pub bottom: Option<i32>,
    pub overflow: Overflow,
    pub visibility: Visibility,
    pub z_index: i32,
}

/// Parse a `prop: value; prop: value` inline declaration block.
pub fn parse_inline(text: &str) -> Result<Style> {
    let mut style = Style::default();
    for decl in text.split(';') {
        let decl = decl.trim();
        if decl.is_empty() {
            continue;
        }
        let (prop, value) = decl
            .split_once(':')
            .ok_or_else(|| Error::StyleError(format!("missing ':' in '{decl}'")))?;
        let prop = prop.trim().to_ascii_lowercase();
        let value = value.trim().to_ascii_lowercase();
        match prop.as_str() {
            "position" => {
                style.position = match value.as_str() {
                    "static" => Position::Static,
                    "relative" => Position::Relative,
                    "absolute" => Position::Absolute,
                    "fixed" => Position::Fixed,
                    other => return Err(Error::StyleError(format!("position: {other}"))),
                }
            }
            "width" => style.width = Some(parse_length(&value)?),
            "height" => style.height = Some(parse_length(&value)?),
            "left" => style.left = Some(parse_px(&value)?),
            "top" => style.top = Some(parse_px(&value)?),
            "right" => style.right = Some(parse_px(&value)?),
            "bottom" => style.bottom = Some(parse_px(&value)?),
            "overflow" => {
                style.overflow = match value.as_str() {
                    "visible" => Overflow::Visible,
                    "scroll" => Overflow::Scroll,
                    "hidden" => Overflow::Hidden,
                    other => return Err(Error::StyleError(format!("overflow: {other}"))),
                }
            }
            "visibility" => {
                style.visibility = match value.as_str() {
                    "visible" => Visibility::Visible,
                    "hidden" => Visibility::Hidden,
                    other => return Err(Error::StyleError(format!("visibility: {other}"))),
                }
            }
            "z-index" => {
                style.z_index = value
                    .parse()
                    .map_err(|_| Error::StyleError(format!("z-index: {value}")))?
            }
            // Unknown property: ignore
            _ => {}
        }
    }
    Ok(style)
}

fn parse_length(value: &str) -> Result<Length> {
    if let Some(pct) = value.strip_suffix('%') {
        let n = pct
            .trim()
            .parse()
            .map_err(|_| Error::StyleError(format!("length: {value}")))?;
        return Ok(Length::Percent(n));
    }
    let n = value
        .strip_suffix("px")
        .unwrap_or(value)
        .trim()
        .parse()
        .map_err(|_| Error::StyleError(format!("length: {value}")))?;
    Ok(Length::Px(n))
}

fn parse_px(value: &str) -> Result<i32> {
    value
        .strip_suffix("px")
        .unwrap_or(value)
        .trim()
        .parse()
        .map_err(|_| Error::StyleError(format!("px value: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_probe_declaration() {
        let s = parse_inline(
            "position: absolute; left: 0; top: 0; right: 0; bottom: 0; \
             overflow: scroll; z-index: -1; visibility: hidden;",
        )
        .unwrap();
        assert_eq!(s.position, Position::Absolute);
        assert_eq!(s.left, Some(0));
        assert_eq!(s.bottom, Some(0));
        assert_eq!(s.overflow, Overflow::Scroll);
        assert_eq!(s.visibility, Visibility::Hidden);
        assert_eq!(s.z_index, -1);
    }

    #[test]
    fn parses_lengths() {
        let s = parse_inline("width: 200%; height: 150px").unwrap();
        assert_eq!(s.width, Some(Length::Percent(200)));
        assert_eq!(s.height, Some(Length::Px(150)));
    }

    #[test]
    fn ignores_unknown_properties() {
        let s = parse_inline("color: red; width: 10px").unwrap();
        assert_eq!(s.width, Some(Length::Px(10)));
    }

    #[test]
    fn rejects_malformed_declarations() {
        assert!(parse_inline("width").is_err());
        assert!(parse_inline("position: sideways").is_err());
        assert!(parse_inline("z-index: one").is_err());
    }
}
