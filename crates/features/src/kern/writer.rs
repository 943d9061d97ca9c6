//! The `kern` and `dist` features
//!
//! Kerning is split by script, each bucket becoming a `kern_<Script>` lookup
//! (plus `kern_<Script>_marks` for pairs involving marks). Common and
//! Inherited lookups are registered under `DFLT` and under every script.

use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;
use log::info;
use read_fonts::types::Tag;
use ufo2ot_core::{
    Direction, GlyphName, Script,
    config::{DFLT_SCRIPTS, DIST_ENABLED_SCRIPTS},
    unicode::unicode_bidi_type,
};

use crate::{
    Result,
    ast::{
        Block, DFLT_LANGUAGE, DFLT_SCRIPT, FeatureFile, GlyphClassDefinition, GlyphSelector,
        LookupFlag, Position, Statement, ValueRecord, make_class_name, unique_name,
    },
    kern::splitter::{
        GlyphScripts, KernSide, KerningGroups, KerningPair, kerning_pairs,
        split_base_and_mark_pairs, split_kerning,
    },
    options::{KernOptions, check_quantization, quantize_round},
    writer::{FeatureWriter, GPOS, WriterContext, features_to_write},
};

const FEATURES: &[&str] = &["kern", "dist"];

/// Generates the `kern` and `dist` features from kerning and groups
#[derive(Debug, Clone, Default)]
pub struct KernFeatureWriter {
    options: KernOptions,
}

/// Names and defines kerning classes, one per side, script and member set
#[derive(Default)]
struct ClassNamer {
    taken: BTreeSet<String>,
    names: BTreeMap<(u8, Script, BTreeSet<GlyphName>), String>,
    definitions: Vec<GlyphClassDefinition>,
}

impl ClassNamer {
    fn selector(&mut self, side: &KernSide, index: u8, script: Script) -> GlyphSelector {
        let (group, members) = match side {
            KernSide::Glyph(glyph) => return GlyphSelector::Glyph(glyph.clone()),
            KernSide::Class { group, members } => (group, members),
        };
        let key = (index, script, members.clone());
        if let Some(name) = self.names.get(&key) {
            return GlyphSelector::ClassName(name.clone());
        }
        let name = make_class_name(&format!("kern{index}.{script}.{group}"), &self.taken);
        self.taken.insert(name.clone());
        self.definitions
            .push(GlyphClassDefinition::new(name.clone(), members.iter().cloned()));
        self.names.insert(key, name.clone());
        GlyphSelector::ClassName(name)
    }
}

impl KernFeatureWriter {
    pub fn new(options: KernOptions) -> Self {
        Self { options }
    }

    fn glyph_scripts(ctx: &WriterContext<'_>, fea: &FeatureFile) -> GlyphScripts {
        let unicode = ctx.unicode();
        let by_script = ctx.classify(fea, |cp| {
            unicode
                .script_extensions(cp)
                .into_iter()
                .map(|script| if script == Script::UNKNOWN { Script::COMMON } else { script })
                .collect::<BTreeSet<_>>()
        });
        let mut out = GlyphScripts::new();
        for (script, glyphs) in by_script {
            for glyph in glyphs {
                out.entry(glyph).or_default().insert(script);
            }
        }
        out
    }

    fn glyph_bidis(ctx: &WriterContext<'_>, fea: &FeatureFile) -> BTreeMap<GlyphName, BTreeSet<Direction>> {
        let unicode = ctx.unicode();
        let mut out: BTreeMap<GlyphName, BTreeSet<Direction>> = BTreeMap::new();
        for (direction, glyphs) in ctx.classify(fea, |cp| unicode_bidi_type(unicode, cp)) {
            for glyph in glyphs {
                out.entry(glyph).or_default().insert(direction);
            }
        }
        out
    }

    #[allow(clippy::too_many_arguments)]
    fn make_lookup(
        &self,
        name: String,
        script: Script,
        pairs: &[KerningPair],
        flag: Option<LookupFlag>,
        filter_class: Option<GlyphClassDefinition>,
        bidis: &BTreeMap<GlyphName, BTreeSet<Direction>>,
        classes: &mut ClassNamer,
    ) -> Option<Block> {
        let mut rules = Vec::new();
        for pair in pairs {
            let directions: BTreeSet<Direction> = pair
                .first
                .glyphs()
                .into_iter()
                .chain(pair.second.glyphs())
                .filter_map(|glyph| bidis.get(glyph))
                .flatten()
                .copied()
                .collect();
            if directions.contains(&Direction::Ltr) && directions.contains(&Direction::Rtl) {
                info!("Skipping kerning pair {pair} with conflicting bidi directions in {name}");
                continue;
            }
            let rtl = match script.direction() {
                Direction::Rtl => !directions.contains(&Direction::Ltr),
                Direction::Neutral => directions.contains(&Direction::Rtl),
                Direction::Ltr => false,
            };
            let value = quantize_round(pair.value, self.options.quantization);
            rules.push(Position::Pair {
                first: classes.selector(&pair.first, 1, script),
                second: classes.selector(&pair.second, 2, script),
                value: if rtl { ValueRecord::rtl(value) } else { ValueRecord::Advance(value) },
                enumerated: pair.first.is_class() != pair.second.is_class(),
            });
        }
        if rules.is_empty() {
            return None;
        }
        let mut lookup = Block::new(name);
        if let Some(class) = filter_class {
            lookup.push(class);
        }
        if let Some(flag) = flag {
            lookup.push(flag);
        }
        for rule in rules {
            lookup.push(rule);
        }
        Some(lookup)
    }
}

/// `script`/`language`/`lookup` statements registering lookups per OpenType
/// script tag
fn register_lookups(
    feature: &mut Block,
    lookups_by_tag: &IndexMap<Tag, Vec<String>>,
    languages: &IndexMap<Tag, Vec<Tag>>,
) {
    for (tag, lookups) in lookups_by_tag {
        feature.push(Statement::Comment(String::new()));
        feature.push(Statement::Script(*tag));
        feature.push(Statement::Language(DFLT_LANGUAGE));
        for lookup in lookups {
            feature.push(Statement::LookupReference(lookup.clone()));
        }
        for language in languages.get(tag).into_iter().flatten() {
            if *language != DFLT_LANGUAGE {
                feature.push(Statement::Language(*language));
            }
        }
    }
}

impl FeatureWriter for KernFeatureWriter {
    fn name(&self) -> &str {
        "KernFeatureWriter"
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

        let source = ctx.source();
        let groups = KerningGroups::from_groups(source.groups(), |g| source.contains(g));
        let pairs = kerning_pairs(source.kerning(), &groups, |g| source.contains(g));
        if pairs.is_empty() {
            return Ok(false);
        }

        let marks: BTreeSet<GlyphName> = if self.options.ignore_marks {
            ctx.gdef_classes(fea).map(|classes| classes.mark).unwrap_or_default()
        } else {
            BTreeSet::new()
        };
        let (base_pairs, mark_pairs) = split_base_and_mark_pairs(&pairs, &marks);

        let glyph_scripts = Self::glyph_scripts(ctx, fea);
        let bidis = Self::glyph_bidis(ctx, fea);
        let base_by_script = split_kerning(&base_pairs, &glyph_scripts);
        let mark_by_script = split_kerning(&mark_pairs, &glyph_scripts);

        let spacing_marks: Vec<GlyphName> = marks
            .iter()
            .filter(|mark| source.glyph(mark).is_some_and(|g| g.width != 0.0))
            .cloned()
            .collect();

        let mut lookup_names = fea.lookup_names();
        let mut classes = ClassNamer {
            taken: fea.class_names(),
            ..ClassNamer::default()
        };
        let scripts: BTreeSet<Script> = base_by_script
            .keys()
            .chain(mark_by_script.keys())
            .copied()
            .collect();

        let mut lookups = Vec::new();
        let mut lookups_by_script: BTreeMap<Script, Vec<String>> = BTreeMap::new();
        for script in &scripts {
            let mut add = |lookup: Option<Block>, names: &mut BTreeSet<String>| {
                if let Some(lookup) = lookup {
                    names.insert(lookup.name.clone());
                    lookups_by_script
                        .entry(*script)
                        .or_default()
                        .push(lookup.name.clone());
                    lookups.push(Statement::Lookup(lookup));
                }
            };

            if let Some(pairs) = base_by_script.get(script) {
                let name = unique_name(&format!("kern_{script}"), &lookup_names);
                let (flag, filter_class) = if !self.options.ignore_marks {
                    (None, None)
                } else if spacing_marks.is_empty() {
                    (Some(LookupFlag::ignore_marks()), None)
                } else {
                    let class_name = make_class_name(&format!("MFS_{name}"), &classes.taken);
                    classes.taken.insert(class_name.clone());
                    (
                        Some(LookupFlag::mark_filtering_set(class_name.clone())),
                        Some(GlyphClassDefinition::new(class_name, spacing_marks.iter().cloned())),
                    )
                };
                let lookup = self.make_lookup(name, *script, pairs, flag, filter_class, &bidis, &mut classes);
                add(lookup, &mut lookup_names);
            }
            if let Some(pairs) = mark_by_script.get(script) {
                let name = unique_name(&format!("kern_{script}_marks"), &lookup_names);
                let lookup = self.make_lookup(name, *script, pairs, None, None, &bidis, &mut classes);
                add(lookup, &mut lookup_names);
            }
        }
        if lookups.is_empty() {
            return Ok(false);
        }

        let default_lookups: Vec<String> = DFLT_SCRIPTS
            .iter()
            .filter_map(|script| lookups_by_script.get(script))
            .flatten()
            .cloned()
            .collect();

        let languages = fea.languages_by_script();
        let mut known_scripts: BTreeSet<Script> = glyph_scripts.values().flatten().copied().collect();
        known_scripts.extend(languages.keys().filter_map(|tag| Script::from_ot_tag(*tag)));
        known_scripts.extend(scripts.iter().copied());
        known_scripts.retain(|script| !script.is_default() && *script != Script::UNKNOWN);

        let mut kern_tags: IndexMap<Tag, Vec<String>> = IndexMap::new();
        let mut dist_tags: IndexMap<Tag, Vec<String>> = IndexMap::new();
        if !default_lookups.is_empty() {
            kern_tags.insert(DFLT_SCRIPT, default_lookups.clone());
        }
        for script in &known_scripts {
            let mut script_lookups = default_lookups.clone();
            script_lookups.extend(lookups_by_script.get(script).into_iter().flatten().cloned());
            if script_lookups.is_empty() {
                continue;
            }
            let target = if DIST_ENABLED_SCRIPTS.contains(script) {
                &mut dist_tags
            } else {
                &mut kern_tags
            };
            for tag in script.ot_tags() {
                let merged = target.entry(tag).or_default();
                for lookup in &script_lookups {
                    if !merged.contains(lookup) {
                        merged.push(lookup.clone());
                    }
                }
            }
        }

        let mut blocks = Vec::new();
        for (feature, tags) in [("kern", &kern_tags), ("dist", &dist_tags)] {
            if !features.contains(&feature) || tags.is_empty() {
                continue;
            }
            let mut block = Block::new(feature);
            register_lookups(&mut block, tags, &languages);
            blocks.push(Statement::Feature(block));
        }
        if blocks.is_empty() {
            return Ok(false);
        }

        let mut definitions = classes.definitions;
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        fea.extend(definitions.into_iter().map(Statement::ClassDefinition));
        fea.push(Statement::Comment(String::new()));
        fea.extend(lookups);
        fea.extend(blocks);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::WriterMode;
    use ufo2ot_core::{BuiltinUnicode, Font, Glyph, GlyphCategory};

    fn font() -> Font {
        let mut font = Font::new()
            .with_glyph(Glyph::new("A").with_codepoint('A').with_width(600.0))
            .with_glyph(Glyph::new("V").with_codepoint('V').with_width(600.0))
            .with_glyph(Glyph::new("alef").with_codepoint(0x627u32))
            .with_glyph(Glyph::new("beh").with_codepoint(0x628u32))
            .with_glyph(Glyph::new("period").with_codepoint('.'))
            .with_glyph(Glyph::new("one").with_codepoint('1'))
            .with_glyph(Glyph::new("one-ar").with_codepoint(0x661u32))
            .with_glyph(Glyph::new("acutecomb").with_codepoint(0x301u32));
        font.set_kerning("A", "V", -40.0);
        font.set_kerning("alef", "beh", 15.0);
        font.set_kerning("period", "period", 5.0);
        font.set_kerning("beh", "one", 8.0);
        font.set_kerning("one-ar", "one-ar", 4.0);
        font.set_kerning("A", "acutecomb", 10.0);
        font.set_category("acutecomb", GlyphCategory::Mark);
        font
    }

    fn write(font: &Font, fea: &mut FeatureFile, options: KernOptions) -> bool {
        let ctx = WriterContext::new(font, &BuiltinUnicode).unwrap();
        KernFeatureWriter::new(options).write(&ctx, fea).unwrap()
    }

    #[test]
    fn test_lookups_per_script() {
        let mut fea = FeatureFile::new();
        assert!(write(&font(), &mut fea, KernOptions::new()));
        let text = fea.to_string();
        assert!(text.contains("lookup kern_Latn {\n    lookupflag IgnoreMarks;\n    pos A V -40;\n} kern_Latn;"));
        assert!(text.contains("lookup kern_Latn_marks {\n    pos A acutecomb 10;\n} kern_Latn_marks;"));
        assert!(text.contains("pos alef beh <15 0 15 0>;"));
        assert!(text.contains("lookup kern_Zyyy {\n    lookupflag IgnoreMarks;\n    pos period period 5;"));
        // digits are laid out left to right even in Arabic runs
        assert!(text.contains("pos one-ar one-ar 4;"));
        assert!(!text.contains("pos beh one"));
    }

    #[test]
    fn test_feature_registration() {
        let mut fea = FeatureFile::new();
        fea.push(Statement::language_system(DFLT_SCRIPT, DFLT_LANGUAGE));
        fea.push(Statement::language_system(Tag::new(b"latn"), DFLT_LANGUAGE));
        fea.push(Statement::language_system(Tag::new(b"latn"), Tag::new(b"TRK ")));
        write(&font(), &mut fea, KernOptions::new());
        let text = fea.to_string();
        assert!(text.contains(
            "    script DFLT;\n    language dflt;\n    lookup kern_Zyyy;\n"
        ));
        assert!(text.contains(
            "    script latn;\n    language dflt;\n    lookup kern_Zyyy;\n    lookup kern_Latn;\n    \
             lookup kern_Latn_marks;\n    language TRK;\n"
        ));
        assert!(text.contains("    script arab;\n    language dflt;\n    lookup kern_Zyyy;\n    lookup kern_Arab;\n"));
        assert!(!fea.has_feature("dist"));
    }

    #[test]
    fn test_dist_scripts() {
        let mut font = Font::new()
            .with_glyph(Glyph::new("ka-deva").with_codepoint(0x915u32))
            .with_glyph(Glyph::new("kha-deva").with_codepoint(0x916u32));
        font.set_kerning("ka-deva", "kha-deva", -12.0);
        let mut fea = FeatureFile::new();
        assert!(write(&font, &mut fea, KernOptions::new()));
        assert!(fea.has_feature("dist"));
        assert!(!fea.has_feature("kern"));
        let text = fea.to_string();
        assert!(text.contains("script dev2;"));
        assert!(text.contains("script deva;"));
    }

    #[test]
    fn test_marks_kept_in_lookup_when_not_ignored() {
        let mut fea = FeatureFile::new();
        write(&font(), &mut fea, KernOptions::new().ignore_marks(false));
        let text = fea.to_string();
        assert!(!text.contains("kern_Latn_marks"));
        assert!(text.contains("lookup kern_Latn {\n    pos A V -40;\n    pos A acutecomb 10;\n} kern_Latn;"));
    }

    #[test]
    fn test_spacing_marks_use_filtering_set() {
        let mut font = font();
        if let Some(glyph) = font.glyph_mut("acutecomb") {
            glyph.width = 200.0;
        }
        let mut fea = FeatureFile::new();
        write(&font, &mut fea, KernOptions::new());
        let text = fea.to_string();
        assert!(text.contains("    @MFS_kern_Latn = [acutecomb];\n    lookupflag UseMarkFilteringSet @MFS_kern_Latn;"));
    }

    #[test]
    fn test_quantization_after_split() {
        let mut fea = FeatureFile::new();
        write(&font(), &mut fea, KernOptions::new().quantization(25));
        assert!(fea.to_string().contains("pos A V -50;"));
    }

    #[test]
    fn test_existing_kern_feature_skipped() {
        let mut fea = FeatureFile::new();
        fea.push(Statement::Feature(Block::new("kern")));
        assert!(!write(&font(), &mut fea, KernOptions::new().mode(WriterMode::Skip)));
        assert_eq!(fea.statements.len(), 1);
    }

    #[test]
    fn test_class_names() {
        let mut font = font();
        font.set_group("public.kern1.A", ["A"]);
        font.set_group("public.kern2.V", ["V"]);
        font.set_kerning("public.kern1.A", "public.kern2.V", -30.0);
        font.set_kerning("public.kern1.A", "V", -35.0);
        let mut fea = FeatureFile::new();
        write(&font, &mut fea, KernOptions::new());
        let text = fea.to_string();
        assert!(text.starts_with("@kern1.Latn.A = [A];\n@kern2.Latn.V = [V];\n\n"));
        assert!(text.contains("    enum pos @kern1.Latn.A V -35;\n    pos @kern1.Latn.A @kern2.Latn.V -30;"));
    }
}
