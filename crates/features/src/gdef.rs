//! The `table GDEF` block: glyph classes and ligature carets

use std::collections::BTreeSet;

use log::info;
use read_fonts::types::Tag;
use ufo2ot_core::{AnchorKind, GlyphCategory, GlyphName};
use write_fonts::OtRound;

use crate::{
    Result,
    ast::{self, Block, FeatureFile, GlyphClassDef, Statement},
    options::{GdefOptions, WriterMode},
    writer::{FeatureWriter, GDEF, WriterContext},
};

/// Generates `GlyphClassDef` from the font's OpenType categories and
/// `LigatureCaretByPos` from `caret_`/`vcaret_` anchors
#[derive(Debug, Clone, Default)]
pub struct GdefFeatureWriter {
    options: GdefOptions,
}

impl GdefFeatureWriter {
    pub fn new(options: GdefOptions) -> Self {
        Self { options }
    }

    fn glyph_class_def(ctx: &WriterContext<'_>) -> Option<GlyphClassDef> {
        let categories = ctx.source().opentype_categories();
        if categories.is_empty() {
            return None;
        }
        let mut def = GlyphClassDef::default();
        for name in ctx.glyph_order() {
            let class = match categories.get(name) {
                Some(GlyphCategory::Base) => &mut def.base,
                Some(GlyphCategory::Ligature) => &mut def.ligature,
                Some(GlyphCategory::Mark) => &mut def.mark,
                Some(GlyphCategory::Component) => &mut def.component,
                Some(GlyphCategory::Unassigned) | None => continue,
            };
            class.push(name.clone());
        }
        Some(def)
    }

    fn ligature_carets(ctx: &WriterContext<'_>) -> Vec<(GlyphName, Vec<i32>)> {
        ctx.ordered_glyphs()
            .filter_map(|glyph| {
                let carets: BTreeSet<i32> = glyph
                    .anchors
                    .iter()
                    .filter_map(|anchor| match anchor.kind() {
                        Some(AnchorKind::Caret { vertical: false }) => Some(anchor.x),
                        Some(AnchorKind::Caret { vertical: true }) => Some(anchor.y),
                        _ => None,
                    })
                    .map(|pos| OtRound::<f64>::ot_round(pos) as i32)
                    .collect();
                (!carets.is_empty()).then(|| (glyph.name.clone(), carets.into_iter().collect()))
            })
            .collect()
    }
}

impl FeatureWriter for GdefFeatureWriter {
    fn name(&self) -> &str {
        "GdefFeatureWriter"
    }

    fn table(&self) -> Tag {
        GDEF
    }

    fn write(&self, ctx: &WriterContext<'_>, fea: &mut FeatureFile) -> Result<bool> {
        let existing = fea.table(ast::GDEF);
        if existing.is_some() && self.options.mode == WriterMode::Skip {
            info!("{}: table GDEF already exists, skipping", self.name());
            return Ok(false);
        }

        let has_class_def = existing.is_some_and(|table| {
            table
                .statements
                .iter()
                .any(|s| matches!(s, Statement::GlyphClassDef(_)))
        });
        let existing_carets: BTreeSet<GlyphName> = existing
            .map(|table| {
                table
                    .statements
                    .iter()
                    .filter_map(|s| match s {
                        Statement::LigatureCaretByPos { glyph, .. } => Some(glyph.clone()),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default();

        let mut statements = Vec::new();
        if !has_class_def && let Some(def) = Self::glyph_class_def(ctx) {
            statements.push(Statement::GlyphClassDef(def));
        }
        statements.extend(
            Self::ligature_carets(ctx)
                .into_iter()
                .filter(|(glyph, _)| !existing_carets.contains(glyph))
                .map(|(glyph, carets)| Statement::LigatureCaretByPos { glyph, carets }),
        );
        if statements.is_empty() {
            return Ok(false);
        }

        match fea.table_mut(ast::GDEF) {
            Some(table) => table.statements.extend(statements),
            None => fea.push(Statement::Table(Block {
                name: ast::GDEF.to_string(),
                statements,
            })),
        }
        Ok(true)
    }
}
