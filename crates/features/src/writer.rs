//! The feature writer interface and the per-font context writers share

use std::collections::{BTreeMap, BTreeSet};

use log::info;
use read_fonts::types::Tag;
use ufo2ot_core::{
    CharMap, Codepoint, FontSource, GlyphCategory, GlyphName, UnicodeProperties,
    official_glyph_order, unicode_to_glyph_map,
};

use crate::{
    Result,
    ast::FeatureFile,
    closure::{SubstitutionClosure, classify_glyphs},
    options::WriterMode,
};

pub const GSUB: Tag = Tag::new(b"GSUB");
pub const GPOS: Tag = Tag::new(b"GPOS");
pub const GDEF: Tag = Tag::new(b"GDEF");

/// Generates feature statements from font data
pub trait FeatureWriter: Send + Sync {
    fn name(&self) -> &str;

    /// The table the generated statements end up in; GSUB writers run first
    fn table(&self) -> Tag;

    /// Append generated statements to `fea`; returns whether anything was
    /// written
    fn write(&self, ctx: &WriterContext<'_>, fea: &mut FeatureFile) -> Result<bool>;
}

/// Font data computed once and shared by every writer
pub struct WriterContext<'a> {
    source: &'a dyn FontSource,
    unicode: &'a dyn UnicodeProperties,
    glyph_order: Vec<GlyphName>,
    cmap: CharMap,
}

/// OpenType glyph classes, from the feature file or the font's categories
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GdefClasses {
    pub base: BTreeSet<GlyphName>,
    pub ligature: BTreeSet<GlyphName>,
    pub mark: BTreeSet<GlyphName>,
    pub component: BTreeSet<GlyphName>,
}

impl<'a> WriterContext<'a> {
    /// Fails if two glyphs claim the same codepoint
    pub fn new(source: &'a dyn FontSource, unicode: &'a dyn UnicodeProperties) -> Result<Self> {
        let glyph_order = official_glyph_order(source);
        let cmap = unicode_to_glyph_map(source)?;
        Ok(Self {
            source,
            unicode,
            glyph_order,
            cmap,
        })
    }

    pub fn source(&self) -> &'a dyn FontSource {
        self.source
    }

    pub fn unicode(&self) -> &'a dyn UnicodeProperties {
        self.unicode
    }

    pub fn glyph_order(&self) -> &[GlyphName] {
        &self.glyph_order
    }

    pub fn cmap(&self) -> &CharMap {
        &self.cmap
    }

    pub fn contains(&self, name: &str) -> bool {
        self.source.contains(name)
    }

    /// Glyphs in official order
    pub fn ordered_glyphs(&self) -> impl Iterator<Item = &'a ufo2ot_core::Glyph> + '_ {
        self.glyph_order
            .iter()
            .filter_map(|name| self.source.glyph(name))
    }

    /// Glyph classes declared in the feature file's `table GDEF`, else those
    /// from the font's OpenType categories; `None` when neither exists
    pub fn gdef_classes(&self, fea: &FeatureFile) -> Option<GdefClasses> {
        if let Some(def) = fea.glyph_class_def() {
            return Some(GdefClasses {
                base: def.base.iter().cloned().collect(),
                ligature: def.ligature.iter().cloned().collect(),
                mark: def.mark.iter().cloned().collect(),
                component: def.component.iter().cloned().collect(),
            });
        }
        let categories = self.source.opentype_categories();
        if categories.is_empty() {
            return None;
        }
        let mut classes = GdefClasses::default();
        for (glyph, category) in categories {
            let class = match category {
                GlyphCategory::Base => &mut classes.base,
                GlyphCategory::Ligature => &mut classes.ligature,
                GlyphCategory::Mark => &mut classes.mark,
                GlyphCategory::Component => &mut classes.component,
                GlyphCategory::Unassigned => continue,
            };
            class.insert(glyph.clone());
        }
        Some(classes)
    }

    /// Classify the encoded glyphs by codepoint and close each class over the
    /// feature file's substitutions
    pub fn classify<K, I, F>(&self, fea: &FeatureFile, classifier: F) -> BTreeMap<K, BTreeSet<GlyphName>>
    where
        K: Ord,
        I: IntoIterator<Item = K>,
        F: Fn(Codepoint) -> I,
    {
        let closure = SubstitutionClosure::from_features(fea);
        classify_glyphs(classifier, &self.cmap, &closure)
    }
}

/// The features a writer should generate given what `fea` already has
pub(crate) fn features_to_write(
    writer: &str,
    features: &[&'static str],
    fea: &FeatureFile,
    mode: WriterMode,
) -> Vec<&'static str> {
    match mode {
        WriterMode::Append => features.to_vec(),
        WriterMode::Skip => features
            .iter()
            .copied()
            .filter(|tag| {
                let exists = fea.has_feature(tag);
                if exists {
                    info!("{writer}: feature '{tag}' already exists, skipping");
                }
                !exists
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Block, GlyphClassDef, Statement};
    use ufo2ot_core::{BuiltinUnicode, Font, Glyph};

    fn font() -> Font {
        let mut font = Font::new()
            .with_glyph(Glyph::new("a").with_codepoint('a'))
            .with_glyph(Glyph::new("acutecomb").with_codepoint(0x301u32));
        font.set_category("acutecomb", GlyphCategory::Mark);
        font.set_category("a", GlyphCategory::Base);
        font
    }

    #[test]
    fn test_context_rejects_duplicate_codepoints() {
        let font = Font::new()
            .with_glyph(Glyph::new("a").with_codepoint('a'))
            .with_glyph(Glyph::new("a.alt").with_codepoint('a'));
        let err = WriterContext::new(&font, &BuiltinUnicode).err().map(|e| e.to_string());
        assert!(err.is_some_and(|e| e.contains("invalid font data")));
    }

    #[test]
    fn test_gdef_classes_prefer_feature_file() {
        let font = font();
        let ctx = WriterContext::new(&font, &BuiltinUnicode).unwrap();

        let from_categories = ctx.gdef_classes(&FeatureFile::new()).unwrap();
        assert!(from_categories.mark.contains("acutecomb"));

        let mut table = Block::new("GDEF");
        table.push(Statement::GlyphClassDef(GlyphClassDef {
            base: vec!["acutecomb".into()],
            ..GlyphClassDef::default()
        }));
        let mut fea = FeatureFile::new();
        fea.push(Statement::Table(table));
        let declared = ctx.gdef_classes(&fea).unwrap();
        assert!(declared.mark.is_empty());
        assert!(declared.base.contains("acutecomb"));
    }

    #[test]
    fn test_features_to_write_skips_existing() {
        let mut fea = FeatureFile::new();
        fea.push(Statement::Feature(Block::new("mark")));
        assert_eq!(
            features_to_write("test", &["mark", "mkmk"], &fea, WriterMode::Skip),
            vec!["mkmk"]
        );
        assert_eq!(
            features_to_write("test", &["mark", "mkmk"], &fea, WriterMode::Append),
            vec!["mark", "mkmk"]
        );
    }
}
