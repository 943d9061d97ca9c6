//! Shared model for compiling UFO-style font sources to OpenType
//!
//! This crate holds the glyph data model the outline and feature compilers
//! read from, together with the font-wide lookups both need:
//!
//! - [`official_glyph_order`] resolves the final glyph order
//! - [`unicode_to_glyph_map`] builds the character map, rejecting
//!   codepoints claimed by two glyphs
//! - [`check_component_cycles`] rejects cyclic component graphs
//! - [`UnicodeProperties`] supplies script and bidi classification
//!
//! # Example
//!
//! ```
//! use ufo2ot_core::{Font, Glyph, unicode_to_glyph_map};
//!
//! let font = Font::new()
//!     .with_glyph(Glyph::new("a").with_codepoint('a'))
//!     .with_glyph(Glyph::new("b").with_codepoint('b'));
//! let cmap = unicode_to_glyph_map(&font).unwrap();
//! assert_eq!(cmap.len(), 2);
//! ```

mod anchor;
mod cmap;
mod components;
pub mod config;
mod error;
mod font;
mod glyph;
mod glyph_order;
mod pen;
mod types;
pub mod unicode;

pub use anchor::{Anchor, AnchorKind};
pub use cmap::{CharMap, unicode_to_glyph_map};
pub use components::check_component_cycles;
pub use error::{Error, Result};
pub use font::{ExportView, Font, FontSource, GlyphCategory, Groups, Kerning};
pub use glyph::{Component, Contour, ContourPoint, Glyph, PointType};
pub use glyph_order::official_glyph_order;
pub use pen::{DecomposingPen, OutlinePen, PenCommand, RecordingPen, TransformPen};
pub use types::{Codepoint, GlyphName};
pub use unicode::{BuiltinUnicode, Direction, Script, UnicodeProperties};
