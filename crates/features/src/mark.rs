//! Mark-to-base, mark-to-ligature and mark-to-mark attachment
//!
//! Anchors pair by name: a base anchor `top` attaches marks carrying `_top`.
//! Numbered anchors `top_1`, `top_2`, ... on one glyph place the same marks
//! on successive ligature components.

use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;
use log::warn;
use read_fonts::types::Tag;
use ufo2ot_core::{AnchorKind, GlyphName};

use crate::{
    Result,
    ast::{
        Anchor, Block, FeatureFile, GlyphClassDefinition, LookupFlag, MarkAttachment,
        MarkClassDefinition, Position, Statement, make_class_name, unique_name,
    },
    options::{MarkOptions, check_quantization, quantize_floor},
    writer::{FeatureWriter, GPOS, GdefClasses, WriterContext, features_to_write},
};

const FEATURES: &[&str] = &["mark", "mkmk"];

// ============================================================================
// Anchor pairing
// ============================================================================

/// A base anchor and the mark anchor attaching to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorPair {
    pub base: String,
    pub mark: String,
}

/// Numbered base anchors of a ligature and the mark anchor attaching to them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LigatureAnchorPair {
    pub components: Vec<String>,
    pub mark: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnchorLists {
    pub pairs: Vec<AnchorPair>,
    pub ligatures: Vec<LigatureAnchorPair>,
}

/// Pair every mark anchor `_X` with `X`, and with the chain `X_1`, `X_2`, ...
/// up to the first missing number
///
/// Names must match exactly; results are sorted by mark anchor name.
pub fn anchor_pairs<'a>(names: impl IntoIterator<Item = &'a str>) -> AnchorLists {
    let names: BTreeSet<&str> = names.into_iter().collect();
    let mut lists = AnchorLists::default();
    for mark in &names {
        let Some(base) = mark.strip_prefix('_') else {
            continue;
        };
        if base.is_empty() {
            continue;
        }
        if names.contains(base) {
            lists.pairs.push(AnchorPair {
                base: base.to_string(),
                mark: mark.to_string(),
            });
        }
        let components: Vec<String> = (1..)
            .map(|i| format!("{base}_{i}"))
            .take_while(|name| names.contains(name.as_str()))
            .collect();
        if !components.is_empty() {
            lists.ligatures.push(LigatureAnchorPair {
                components,
                mark: mark.to_string(),
            });
        }
    }
    lists
}

// ============================================================================
// Writer
// ============================================================================

struct GlyphAnchors {
    glyph: GlyphName,
    anchors: BTreeMap<String, Anchor>,
    is_mark: bool,
}

/// Generates the `mark` and `mkmk` features from glyph anchors
#[derive(Debug, Clone, Default)]
pub struct MarkFeatureWriter {
    options: MarkOptions,
}

impl MarkFeatureWriter {
    pub fn new(options: MarkOptions) -> Self {
        Self { options }
    }

    fn collect_anchors(&self, ctx: &WriterContext<'_>, gdef: Option<&GdefClasses>) -> Vec<GlyphAnchors> {
        let step = self.options.quantization;
        let mut out = Vec::new();
        for glyph in ctx.ordered_glyphs() {
            if let Some(classes) = gdef
                && !(classes.base.contains(&glyph.name)
                    || classes.ligature.contains(&glyph.name)
                    || classes.mark.contains(&glyph.name))
            {
                continue;
            }
            if glyph.anchors.iter().any(|a| a.name().is_none()) {
                warn!("glyph '{}' has an anchor without a name, excluding the glyph", glyph.name);
                continue;
            }
            let mut anchors = BTreeMap::new();
            let mut has_mark_anchor = false;
            for anchor in &glyph.anchors {
                let Some(name) = anchor.name() else {
                    continue;
                };
                if anchors.contains_key(name) {
                    warn!("glyph '{}' has more than one '{name}' anchor, keeping the first", glyph.name);
                    continue;
                }
                has_mark_anchor |= matches!(anchor.kind(), Some(AnchorKind::Mark { .. }));
                anchors.insert(
                    name.to_string(),
                    Anchor::new(quantize_floor(anchor.x, step), quantize_floor(anchor.y, step)),
                );
            }
            if anchors.is_empty() {
                continue;
            }
            let is_mark = has_mark_anchor && gdef.is_none_or(|classes| classes.mark.contains(&glyph.name));
            out.push(GlyphAnchors {
                glyph: glyph.name.clone(),
                anchors,
                is_mark,
            });
        }
        out
    }
}

/// Mark classes resolved against those already defined in the feature file
struct MarkClasses {
    existing: IndexMap<String, IndexMap<GlyphName, Anchor>>,
    taken: BTreeSet<String>,
    resolved: IndexMap<String, (String, Vec<MarkClassDefinition>)>,
}

impl MarkClasses {
    fn new(fea: &FeatureFile) -> Self {
        Self {
            existing: fea.mark_classes(),
            taken: fea.class_names(),
            resolved: IndexMap::new(),
        }
    }

    /// Name of the class holding every mark with `mark_anchor`; `None` when
    /// no mark carries it
    fn resolve(&mut self, mark_anchor: &str, glyphs: &[GlyphAnchors]) -> Option<String> {
        if let Some((name, _)) = self.resolved.get(mark_anchor) {
            return Some(name.clone());
        }
        let mut members: Vec<(GlyphName, Anchor)> = glyphs
            .iter()
            .filter(|g| g.is_mark)
            .filter_map(|g| g.anchors.get(mark_anchor).map(|a| (g.glyph.clone(), *a)))
            .collect();
        if members.is_empty() {
            return None;
        }
        members.sort_by(|a, b| a.0.cmp(&b.0));

        let wanted = format!("MC{mark_anchor}");
        let compatible = self.existing.get(&wanted).filter(|existing| {
            members
                .iter()
                .all(|(glyph, anchor)| existing.get(glyph).is_none_or(|a| a == anchor))
        });
        let (name, members) = match compatible {
            Some(existing) => {
                let missing = members
                    .into_iter()
                    .filter(|(glyph, _)| !existing.contains_key(glyph))
                    .collect();
                (wanted, missing)
            }
            None => (make_class_name(&wanted, &self.taken), members),
        };
        self.taken.insert(name.clone());
        let definitions = members
            .into_iter()
            .map(|(glyph, anchor)| MarkClassDefinition {
                glyph,
                anchor,
                class_name: name.clone(),
            })
            .collect();
        self.resolved
            .insert(mark_anchor.to_string(), (name.clone(), definitions));
        Some(name)
    }

    fn into_definitions(self) -> impl Iterator<Item = Statement> {
        self.resolved
            .into_values()
            .flat_map(|(_, definitions)| definitions)
            .map(Statement::MarkClass)
    }
}

struct LookupNamer {
    taken: BTreeSet<String>,
}

impl LookupNamer {
    fn name(&mut self, wanted: &str) -> String {
        let name = unique_name(wanted, &self.taken);
        self.taken.insert(name.clone());
        name
    }
}

impl FeatureWriter for MarkFeatureWriter {
    fn name(&self) -> &str {
        "MarkFeatureWriter"
    }

    fn table(&self) -> Tag {
        GPOS
    }

    fn write(&self, ctx: &WriterContext<'_>, fea: &mut FeatureFile) -> Result<bool> {
        check_quantization(self.options.quantization)?;
        let features = features_to_write(self.name(), FEATURES, fea, self.options.mode);
        if features.is_empty() {
            return Ok(false);
        }

        let gdef = ctx.gdef_classes(fea);
        let glyphs = self.collect_anchors(ctx, gdef.as_ref());
        let lists = anchor_pairs(glyphs.iter().flat_map(|g| g.anchors.keys().map(String::as_str)));

        let mut classes = MarkClasses::new(fea);
        let mut namer = LookupNamer {
            taken: fea.lookup_names(),
        };
        let mut blocks = Vec::new();

        if features.contains(&"mark") {
            let mut lookups = Vec::new();
            for (i, pair) in lists.pairs.iter().enumerate() {
                let rules: Vec<(GlyphName, Anchor)> = glyphs
                    .iter()
                    .filter(|g| !g.is_mark)
                    .filter_map(|g| g.anchors.get(&pair.base).map(|a| (g.glyph.clone(), *a)))
                    .collect();
                if rules.is_empty() {
                    continue;
                }
                let Some(class_name) = classes.resolve(&pair.mark, &glyphs) else {
                    continue;
                };
                let mut lookup = Block::new(namer.name(&format!("mark{}", i + 1)));
                for (base, anchor) in rules {
                    lookup.push(Position::MarkBase {
                        base,
                        marks: vec![MarkAttachment::new(anchor, class_name.clone())],
                    });
                }
                lookups.push(Statement::Lookup(lookup));
            }
            for (i, liga) in lists.ligatures.iter().enumerate() {
                let rules: Vec<(GlyphName, Vec<Anchor>)> = glyphs
                    .iter()
                    .filter(|g| !g.is_mark)
                    .filter_map(|g| {
                        let chain: Vec<Anchor> = liga
                            .components
                            .iter()
                            .map_while(|name| g.anchors.get(name).copied())
                            .collect();
                        (!chain.is_empty()).then(|| (g.glyph.clone(), chain))
                    })
                    .collect();
                if rules.is_empty() {
                    continue;
                }
                let Some(class_name) = classes.resolve(&liga.mark, &glyphs) else {
                    continue;
                };
                let mut lookup = Block::new(namer.name(&format!("mark2liga{}", i + 1)));
                for (ligature, chain) in rules {
                    let components = chain
                        .into_iter()
                        .map(|anchor| vec![MarkAttachment::new(anchor, class_name.clone())])
                        .collect();
                    lookup.push(Position::MarkLigature {
                        ligature,
                        components,
                    });
                }
                lookups.push(Statement::Lookup(lookup));
            }
            if !lookups.is_empty() {
                blocks.push(Statement::Feature(Block {
                    name: "mark".to_string(),
                    statements: lookups,
                }));
            }
        }

        if features.contains(&"mkmk") {
            let mut lookups = Vec::new();
            for (i, pair) in lists.pairs.iter().enumerate() {
                let rules: Vec<(GlyphName, Anchor)> = glyphs
                    .iter()
                    .filter(|g| g.is_mark)
                    .filter_map(|g| g.anchors.get(&pair.base).map(|a| (g.glyph.clone(), *a)))
                    .collect();
                if rules.is_empty() {
                    continue;
                }
                let Some(class_name) = classes.resolve(&pair.mark, &glyphs) else {
                    continue;
                };
                let lookup_name = namer.name(&format!("mkmk{}", i + 1));

                // The filtering set admits the attaching marks and the marks
                // they attach to, so the lookup skips over anything else
                let mut filter: BTreeSet<GlyphName> = glyphs
                    .iter()
                    .filter(|g| g.is_mark && g.anchors.contains_key(&pair.mark))
                    .map(|g| g.glyph.clone())
                    .collect();
                filter.extend(rules.iter().map(|(glyph, _)| glyph.clone()));
                let filter_name = make_class_name(&format!("{lookup_name}MkAttach"), &classes.taken);
                classes.taken.insert(filter_name.clone());

                let mut lookup = Block::new(lookup_name);
                lookup.push(GlyphClassDefinition::new(filter_name.clone(), filter));
                lookup.push(LookupFlag::mark_filtering_set(filter_name));
                for (base, anchor) in rules {
                    lookup.push(Position::MarkMark {
                        base,
                        marks: vec![MarkAttachment::new(anchor, class_name.clone())],
                    });
                }
                lookups.push(Statement::Lookup(lookup));
            }
            if !lookups.is_empty() {
                blocks.push(Statement::Feature(Block {
                    name: "mkmk".to_string(),
                    statements: lookups,
                }));
            }
        }

        if blocks.is_empty() {
            return Ok(false);
        }
        fea.extend(classes.into_definitions());
        fea.extend(blocks);
        Ok(true)
    }
}
