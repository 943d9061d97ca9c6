//! Unicode to glyph mapping

use std::collections::BTreeMap;

use crate::{Codepoint, Error, FontSource, GlyphName, Result, official_glyph_order};

/// Character map from Unicode values to glyph names
pub type CharMap = BTreeMap<Codepoint, GlyphName>;

/// Build the character map of a font
///
/// Glyphs are visited in final glyph order. A codepoint claimed by a second
/// glyph is invalid font data naming both glyphs.
pub fn unicode_to_glyph_map<S: FontSource + ?Sized>(source: &S) -> Result<CharMap> {
    let mut cmap = CharMap::new();
    for name in official_glyph_order(source) {
        let Some(glyph) = source.glyph(&name) else {
            continue;
        };
        for &codepoint in &glyph.codepoints {
            if let Some(first) = cmap.get(&codepoint) {
                if *first == name {
                    continue;
                }
                return Err(Error::DuplicateCodepoint {
                    codepoint,
                    first: first.clone(),
                    second: name,
                });
            }
            cmap.insert(codepoint, name.clone());
        }
    }
    Ok(cmap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Font, Glyph};

    #[test]
    fn test_map_codepoints() {
        let font = Font::new()
            .with_glyph(Glyph::new("a").with_codepoint('a'))
            .with_glyph(Glyph::new("A").with_codepoint('A').with_codepoint('\u{0410}'));
        let cmap = unicode_to_glyph_map(&font).unwrap();
        assert_eq!(cmap.len(), 3);
        assert_eq!(cmap[&Codepoint::from('\u{0410}')], "A");
    }

    #[test]
    fn test_duplicate_codepoint_is_invalid_font_data() {
        let font = Font::new()
            .with_glyph(Glyph::new("a").with_codepoint('a'))
            .with_glyph(Glyph::new("a.alt").with_codepoint('a'));
        let err = unicode_to_glyph_map(&font).unwrap_err();
        assert!(err.is_invalid_font_data());
        assert_eq!(
            err,
            Error::DuplicateCodepoint {
                codepoint: Codepoint::from('a'),
                first: "a".into(),
                second: "a.alt".into(),
            }
        );
    }

    #[test]
    fn test_repeated_codepoint_on_same_glyph_is_fine() {
        let font = Font::new().with_glyph(Glyph::new("a").with_codepoint('a').with_codepoint('a'));
        assert_eq!(unicode_to_glyph_map(&font).unwrap().len(), 1);
    }
}
