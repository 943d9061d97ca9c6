//! Read-only font views consumed by the compilers
//!
//! The compilers never depend on a concrete font type. They read glyphs,
//! kerning, groups and OpenType categories through [`FontSource`], which is
//! implemented by the in-memory [`Font`] and by [`ExportView`], a filtered
//! view hiding glyphs that are not meant to be exported.

use std::{
    collections::BTreeSet,
    fmt::{self, Display, Formatter},
    str::FromStr,
};

use indexmap::IndexMap;
use log::debug;

use crate::{Glyph, GlyphName};

/// Kerning values keyed by (first, second); either side is a glyph name or a
/// `public.kern1.`/`public.kern2.` group name
pub type Kerning = IndexMap<(String, String), f64>;

/// Group name to member glyph names
pub type Groups = IndexMap<String, Vec<GlyphName>>;

/// OpenType glyph class assigned through `public.openTypeCategories`
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum GlyphCategory {
    #[default]
    Unassigned,
    Base,
    Ligature,
    Mark,
    Component,
}

impl FromStr for GlyphCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unassigned" => Ok(GlyphCategory::Unassigned),
            "base" => Ok(GlyphCategory::Base),
            "ligature" => Ok(GlyphCategory::Ligature),
            "mark" => Ok(GlyphCategory::Mark),
            "component" => Ok(GlyphCategory::Component),
            other => Err(format!("unknown OpenType category '{other}'")),
        }
    }
}

impl Display for GlyphCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GlyphCategory::Unassigned => "unassigned",
            GlyphCategory::Base => "base",
            GlyphCategory::Ligature => "ligature",
            GlyphCategory::Mark => "mark",
            GlyphCategory::Component => "component",
        })
    }
}

/// Capability interface over a font's glyph set and layout data
pub trait FontSource: Sync {
    fn glyph(&self, name: &str) -> Option<&Glyph>;

    /// All glyphs, in storage order
    fn glyphs(&self) -> Box<dyn Iterator<Item = &Glyph> + '_>;

    /// The declared glyph order; may be partial or empty
    fn glyph_order(&self) -> &[GlyphName];

    fn kerning(&self) -> &Kerning;

    fn groups(&self) -> &Groups;

    fn opentype_categories(&self) -> &IndexMap<GlyphName, GlyphCategory>;

    /// Lookup used when drawing component references. Views that hide glyphs
    /// still resolve hidden bases here so composites keep their outlines.
    fn component_glyph(&self, name: &str) -> Option<&Glyph> {
        self.glyph(name)
    }

    fn contains(&self, name: &str) -> bool {
        self.glyph(name).is_some()
    }
}

/// In-memory font
#[derive(Debug, Clone, Default)]
pub struct Font {
    glyphs: IndexMap<GlyphName, Glyph>,
    glyph_order: Vec<GlyphName>,
    kerning: Kerning,
    groups: Groups,
    categories: IndexMap<GlyphName, GlyphCategory>,
    skip_export: Vec<GlyphName>,
}

impl Font {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a glyph, replacing any glyph with the same name
    pub fn add_glyph(&mut self, glyph: Glyph) -> &mut Self {
        self.glyphs.insert(glyph.name.clone(), glyph);
        self
    }

    pub fn with_glyph(mut self, glyph: Glyph) -> Self {
        self.add_glyph(glyph);
        self
    }

    pub fn glyph_mut(&mut self, name: &str) -> Option<&mut Glyph> {
        self.glyphs.get_mut(name)
    }

    pub fn set_glyph_order(&mut self, order: impl IntoIterator<Item = impl Into<GlyphName>>) {
        self.glyph_order = order.into_iter().map(Into::into).collect();
    }

    pub fn set_kerning(&mut self, first: impl Into<String>, second: impl Into<String>, value: f64) {
        self.kerning.insert((first.into(), second.into()), value);
    }

    pub fn set_group(
        &mut self,
        name: impl Into<String>,
        members: impl IntoIterator<Item = impl Into<GlyphName>>,
    ) {
        self.groups
            .insert(name.into(), members.into_iter().map(Into::into).collect());
    }

    pub fn set_category(&mut self, glyph: impl Into<GlyphName>, category: GlyphCategory) {
        self.categories.insert(glyph.into(), category);
    }

    /// Mark glyphs as excluded from export (`public.skipExportGlyphs`)
    pub fn set_skip_export(&mut self, names: impl IntoIterator<Item = impl Into<GlyphName>>) {
        self.skip_export = names.into_iter().map(Into::into).collect();
    }

    pub fn skip_export(&self) -> &[GlyphName] {
        &self.skip_export
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// A view hiding the glyphs listed as not exported
    pub fn export_view(&self) -> ExportView<'_> {
        ExportView::new(self)
    }
}

impl FontSource for Font {
    fn glyph(&self, name: &str) -> Option<&Glyph> {
        self.glyphs.get(name)
    }

    fn glyphs(&self) -> Box<dyn Iterator<Item = &Glyph> + '_> {
        Box::new(self.glyphs.values())
    }

    fn glyph_order(&self) -> &[GlyphName] {
        &self.glyph_order
    }

    fn kerning(&self) -> &Kerning {
        &self.kerning
    }

    fn groups(&self) -> &Groups {
        &self.groups
    }

    fn opentype_categories(&self) -> &IndexMap<GlyphName, GlyphCategory> {
        &self.categories
    }
}

/// Font view with the skip-export glyphs removed
///
/// Hidden glyphs vanish from the glyph set, glyph order, groups and
/// categories, and kerning pairs naming them directly are dropped. Composites
/// referencing a hidden glyph still draw it, since decomposition resolves
/// bases through [`FontSource::component_glyph`].
#[derive(Debug, Clone)]
pub struct ExportView<'a> {
    font: &'a Font,
    hidden: BTreeSet<GlyphName>,
    glyph_order: Vec<GlyphName>,
    kerning: Kerning,
    groups: Groups,
    categories: IndexMap<GlyphName, GlyphCategory>,
}

impl<'a> ExportView<'a> {
    pub fn new(font: &'a Font) -> Self {
        let hidden: BTreeSet<GlyphName> = font.skip_export.iter().cloned().collect();
        let visible = |name: &GlyphName| !hidden.contains(name);

        let glyph_order = font.glyph_order.iter().filter(|&n| visible(n)).cloned().collect();
        let groups: Groups = font
            .groups
            .iter()
            .map(|(name, members)| {
                let members = members.iter().filter(|&n| visible(n)).cloned().collect();
                (name.clone(), members)
            })
            .collect();
        let kerning = font
            .kerning
            .iter()
            .filter(|((first, second), _)| {
                !hidden.contains(first.as_str()) && !hidden.contains(second.as_str())
            })
            .map(|(key, value)| (key.clone(), *value))
            .collect();
        let categories = font
            .categories
            .iter()
            .filter(|(name, _)| visible(*name))
            .map(|(name, category)| (name.clone(), *category))
            .collect();

        debug!("export view hides {} glyph(s)", hidden.len());
        Self {
            font,
            hidden,
            glyph_order,
            kerning,
            groups,
            categories,
        }
    }
}

impl FontSource for ExportView<'_> {
    fn glyph(&self, name: &str) -> Option<&Glyph> {
        if self.hidden.contains(name) {
            return None;
        }
        self.font.glyph(name)
    }

    fn glyphs(&self) -> Box<dyn Iterator<Item = &Glyph> + '_> {
        Box::new(
            self.font
                .glyphs
                .values()
                .filter(|glyph| !self.hidden.contains(&glyph.name)),
        )
    }

    fn glyph_order(&self) -> &[GlyphName] {
        &self.glyph_order
    }

    fn kerning(&self) -> &Kerning {
        &self.kerning
    }

    fn groups(&self) -> &Groups {
        &self.groups
    }

    fn opentype_categories(&self) -> &IndexMap<GlyphName, GlyphCategory> {
        &self.categories
    }

    fn component_glyph(&self, name: &str) -> Option<&Glyph> {
        self.font.glyph(name)
    }
}
