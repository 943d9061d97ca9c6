//! Cursive attachment from `entry`/`exit` anchors
//!
//! Each anchor pair becomes a `curs` lookup joining one glyph's exit to the
//! next glyph's entry. Fonts mixing left-to-right and right-to-left glyphs
//! get one lookup per direction, since the `RightToLeft` flag applies to a
//! whole lookup.

use std::collections::BTreeSet;

use log::debug;
use read_fonts::types::Tag;
use ufo2ot_core::{AnchorKind, Direction, Glyph, GlyphName, unicode::unicode_script_direction};
use write_fonts::OtRound;

use crate::{
    Result,
    ast::{Anchor, Block, FeatureFile, LookupFlag, Position, Statement, unique_name},
    options::CursiveOptions,
    writer::{FeatureWriter, GPOS, WriterContext, features_to_write},
};

const FEATURES: &[&str] = &["curs"];

/// Generates the `curs` feature
#[derive(Debug, Clone, Default)]
pub struct CursiveFeatureWriter {
    options: CursiveOptions,
}

/// Direction an anchor suffix pins its lookup to, if any
fn pinned_direction(suffix: Option<&str>) -> Option<Direction> {
    let suffix = suffix?;
    if suffix == "LTR" || suffix.ends_with(".LTR") {
        Some(Direction::Ltr)
    } else if suffix == "RTL" || suffix.ends_with(".RTL") {
        Some(Direction::Rtl)
    } else {
        None
    }
}

/// Anchor suffixes that have both an entry and an exit somewhere in the font,
/// unsuffixed first
fn cursive_suffixes<'a>(glyphs: impl IntoIterator<Item = &'a Glyph>) -> Vec<Option<String>> {
    let mut entries = BTreeSet::new();
    let mut exits = BTreeSet::new();
    for glyph in glyphs {
        for anchor in &glyph.anchors {
            match anchor.kind() {
                Some(AnchorKind::Entry { suffix }) => {
                    entries.insert(suffix);
                }
                Some(AnchorKind::Exit { suffix }) => {
                    exits.insert(suffix);
                }
                _ => {}
            }
        }
    }
    entries.intersection(&exits).cloned().collect()
}

fn round_anchor(anchor: &ufo2ot_core::Anchor) -> Anchor {
    Anchor::new(
        OtRound::<f64>::ot_round(anchor.x) as i32,
        OtRound::<f64>::ot_round(anchor.y) as i32,
    )
}

/// The first entry and exit anchors of `glyph` with the given suffix
fn entry_exit(glyph: &Glyph, suffix: Option<&str>) -> (Option<Anchor>, Option<Anchor>) {
    let mut entry = None;
    let mut exit = None;
    for anchor in &glyph.anchors {
        match anchor.kind() {
            Some(AnchorKind::Entry { suffix: s }) if s.as_deref() == suffix && entry.is_none() => {
                entry = Some(round_anchor(anchor));
            }
            Some(AnchorKind::Exit { suffix: s }) if s.as_deref() == suffix && exit.is_none() => {
                exit = Some(round_anchor(anchor));
            }
            _ => {}
        }
    }
    (entry, exit)
}

impl CursiveFeatureWriter {
    pub fn new(options: CursiveOptions) -> Self {
        Self { options }
    }

    /// A lookup over `glyphs`, or `None` when no glyph has either anchor
    fn make_lookup<'a>(
        name: String,
        glyphs: impl IntoIterator<Item = &'a Glyph>,
        suffix: Option<&str>,
        direction: Direction,
    ) -> Option<Block> {
        let rules: Vec<Position> = glyphs
            .into_iter()
            .filter_map(|glyph| match entry_exit(glyph, suffix) {
                (None, None) => None,
                (entry, exit) => Some(Position::Cursive {
                    glyph: glyph.name.clone(),
                    entry,
                    exit,
                }),
            })
            .collect();
        if rules.is_empty() {
            return None;
        }
        let mut lookup = Block::new(name);
        lookup.push(LookupFlag::ignore_marks().with_right_to_left(direction != Direction::Ltr));
        for rule in rules {
            lookup.push(rule);
        }
        Some(lookup)
    }
}

impl FeatureWriter for CursiveFeatureWriter {
    fn name(&self) -> &str {
        "CursFeatureWriter"
    }

    fn table(&self) -> Tag {
        GPOS
    }

    fn write(&self, ctx: &WriterContext<'_>, fea: &mut FeatureFile) -> Result<bool> {
        if features_to_write(self.name(), FEATURES, fea, self.options.mode).is_empty() {
            return Ok(false);
        }

        let glyphs: Vec<&Glyph> = ctx.ordered_glyphs().collect();
        let suffixes = cursive_suffixes(glyphs.iter().copied());
        if suffixes.is_empty() {
            return Ok(false);
        }

        let unicode = ctx.unicode();
        let ltr_glyphs: BTreeSet<GlyphName> = if ctx
            .cmap()
            .keys()
            .any(|cp| unicode_script_direction(unicode, *cp) == Direction::Ltr)
        {
            ctx.classify(fea, |cp| [unicode_script_direction(unicode, cp)])
                .remove(&Direction::Ltr)
                .unwrap_or_default()
        } else {
            BTreeSet::new()
        };
        let should_split = !ltr_glyphs.is_empty();
        debug!("{}: splitting by direction: {should_split}", self.name());

        let mut taken = fea.lookup_names();
        let mut name_lookup = |wanted: String| {
            let name = unique_name(&wanted, &taken);
            taken.insert(name.clone());
            name
        };

        let mut lookups = Vec::new();
        for suffix in &suffixes {
            let suffix = suffix.as_deref();
            let base = suffix.map_or_else(|| "curs".to_string(), |s| format!("curs_{s}"));
            let pinned = pinned_direction(suffix);

            if pinned.is_none() && should_split {
                let ltr = glyphs.iter().copied().filter(|g| ltr_glyphs.contains(&g.name));
                if let Some(lookup) =
                    Self::make_lookup(name_lookup(format!("{base}_ltr")), ltr, suffix, Direction::Ltr)
                {
                    lookups.push(Statement::Lookup(lookup));
                }
                let rtl = glyphs.iter().copied().filter(|g| !ltr_glyphs.contains(&g.name));
                if let Some(lookup) =
                    Self::make_lookup(name_lookup(format!("{base}_rtl")), rtl, suffix, Direction::Rtl)
                {
                    lookups.push(Statement::Lookup(lookup));
                }
            } else {
                let direction = pinned.unwrap_or(Direction::Rtl);
                if let Some(lookup) =
                    Self::make_lookup(name_lookup(base), glyphs.iter().copied(), suffix, direction)
                {
                    lookups.push(Statement::Lookup(lookup));
                }
            }
        }

        if lookups.is_empty() {
            return Ok(false);
        }
        fea.push(Statement::Feature(Block {
            name: "curs".to_string(),
            statements: lookups,
        }));
        Ok(true)
    }
}
