//! Final glyph order resolution

use std::collections::BTreeSet;

use crate::{FontSource, GlyphName};

/// The order glyphs are compiled in
///
/// `.notdef` comes first when present, followed by the declared glyph order
/// (skipping names the font does not contain), then every remaining glyph
/// sorted by name.
pub fn official_glyph_order<S: FontSource + ?Sized>(source: &S) -> Vec<GlyphName> {
    let mut remaining: BTreeSet<&GlyphName> = source.glyphs().map(|glyph| &glyph.name).collect();
    let mut order = Vec::with_capacity(remaining.len());

    let notdef = GlyphName::new(GlyphName::NOTDEF);
    if remaining.remove(&notdef) {
        order.push(notdef);
    }
    for name in source.glyph_order() {
        if remaining.remove(name) {
            order.push(name.clone());
        }
    }
    order.extend(remaining.into_iter().cloned());
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Font, Glyph};

    fn names(order: &[GlyphName]) -> Vec<&str> {
        order.iter().map(GlyphName::as_str).collect()
    }

    #[test]
    fn test_notdef_first_then_declared_then_sorted() {
        let mut font = Font::new();
        for name in ["z", "b", "a", ".notdef", "c"] {
            font.add_glyph(Glyph::new(name));
        }
        font.set_glyph_order(["c", "missing", "z"]);
        assert_eq!(
            names(&official_glyph_order(&font)),
            vec![".notdef", "c", "z", "a", "b"]
        );
    }

    #[test]
    fn test_no_declared_order_sorts() {
        let font = Font::new()
            .with_glyph(Glyph::new("b"))
            .with_glyph(Glyph::new("a"));
        assert_eq!(names(&official_glyph_order(&font)), vec!["a", "b"]);
    }
}
