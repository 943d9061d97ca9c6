use std::result;

use thiserror::Error;

use crate::{Codepoint, GlyphName};

/// Errors raised while building glyph-level lookup tables from font data
///
/// `DuplicateCodepoint` and `ComponentCycle` make up the invalid-font-data
/// family: they abort the mapping that detected them, but never a single
/// glyph's compilation on their own.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Two glyphs claim the same Unicode value
    #[error("invalid font data: {codepoint} is mapped to both '{first}' and '{second}'")]
    DuplicateCodepoint {
        codepoint: Codepoint,
        first: GlyphName,
        second: GlyphName,
    },

    /// The component graph loops back onto itself
    #[error("invalid font data: glyph '{glyph}' has a cyclic component reference ({})", format_cycle(.cycle))]
    ComponentCycle {
        glyph: GlyphName,
        cycle: Vec<GlyphName>,
    },

    #[error("glyph '{0}' not found")]
    UnknownGlyph(GlyphName),
}

impl Error {
    /// Whether this error belongs to the invalid-font-data family
    pub fn is_invalid_font_data(&self) -> bool {
        matches!(
            self,
            Error::DuplicateCodepoint { .. } | Error::ComponentCycle { .. }
        )
    }
}

fn format_cycle(cycle: &[GlyphName]) -> String {
    cycle
        .iter()
        .map(GlyphName::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

pub type Result<T> = result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message_names_glyph() {
        let err = Error::ComponentCycle {
            glyph: "a".into(),
            cycle: vec!["a".into(), "b".into(), "a".into()],
        };
        let message = err.to_string();
        assert!(message.contains("'a'"));
        assert!(message.contains("a -> b -> a"));
        assert!(err.is_invalid_font_data());
    }

    #[test]
    fn test_duplicate_codepoint_message() {
        let err = Error::DuplicateCodepoint {
            codepoint: Codepoint::new(0x41),
            first: "A".into(),
            second: "A.alt".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid font data: U+0041 is mapped to both 'A' and 'A.alt'"
        );
    }

    #[test]
    fn test_unknown_glyph_is_not_invalid_font_data() {
        assert!(!Error::UnknownGlyph("x".into()).is_invalid_font_data());
    }
}
