//! Kerning cleanup and per-script splitting
//!
//! Pairs are resolved against the font's groups, then distributed over
//! script buckets. A group spanning several scripts is cut into one subset
//! per script; subsets with no counterpart in the pair's other side are
//! dropped from that pair.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::{self, Display, Formatter},
};

use indexmap::IndexMap;
use log::{debug, info, warn};
use ufo2ot_core::{
    GlyphName, Groups, Kerning, Script,
    config::{KERN_SIDE1_PREFIX, KERN_SIDE2_PREFIX},
};

/// Scripts each glyph is used with
pub type GlyphScripts = BTreeMap<GlyphName, BTreeSet<Script>>;

/// One side of a kerning pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KernSide {
    Glyph(GlyphName),
    Class {
        /// Group name without its `public.kern1.`/`public.kern2.` prefix
        group: String,
        members: BTreeSet<GlyphName>,
    },
}

impl KernSide {
    pub fn is_class(&self) -> bool {
        matches!(self, KernSide::Class { .. })
    }

    pub fn glyphs(&self) -> Vec<&GlyphName> {
        match self {
            KernSide::Glyph(glyph) => vec![glyph],
            KernSide::Class { members, .. } => members.iter().collect(),
        }
    }

    fn sort_key(&self) -> &str {
        match self {
            KernSide::Glyph(glyph) => glyph.as_str(),
            KernSide::Class { group, .. } => group,
        }
    }

    /// A class with the same group name and only `members`
    fn with_members(&self, members: BTreeSet<GlyphName>) -> KernSide {
        match self {
            KernSide::Glyph(glyph) => KernSide::Glyph(glyph.clone()),
            KernSide::Class { group, .. } => KernSide::Class {
                group: group.clone(),
                members,
            },
        }
    }
}

impl Display for KernSide {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            KernSide::Glyph(glyph) => f.write_str(glyph),
            KernSide::Class { group, .. } => write!(f, "@{group}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KerningPair {
    pub first: KernSide,
    pub second: KernSide,
    pub value: f64,
}

impl KerningPair {
    pub fn new(first: KernSide, second: KernSide, value: f64) -> Self {
        Self {
            first,
            second,
            value,
        }
    }
}

impl Display for KerningPair {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "<{} {} {}>", self.first, self.second, self.value)
    }
}

// ============================================================================
// Cleanup
// ============================================================================

/// Kerning groups restricted to glyphs the font contains, keyed by full
/// group name
#[derive(Debug, Clone, Default)]
pub struct KerningGroups {
    pub side1: IndexMap<String, BTreeSet<GlyphName>>,
    pub side2: IndexMap<String, BTreeSet<GlyphName>>,
}

impl KerningGroups {
    /// Keep `public.kern1.`/`public.kern2.` groups, drop missing members, and
    /// remove glyphs already claimed by an earlier group on the same side
    pub fn from_groups(groups: &Groups, contains: impl Fn(&str) -> bool) -> Self {
        let mut out = Self::default();
        let mut seen1: BTreeMap<GlyphName, String> = BTreeMap::new();
        let mut seen2: BTreeMap<GlyphName, String> = BTreeMap::new();
        for (name, members) in groups {
            let (side, seen) = if name.starts_with(KERN_SIDE1_PREFIX) {
                (&mut out.side1, &mut seen1)
            } else if name.starts_with(KERN_SIDE2_PREFIX) {
                (&mut out.side2, &mut seen2)
            } else {
                continue;
            };
            let mut kept = BTreeSet::new();
            for glyph in members {
                if !contains(glyph) {
                    debug!("kerning group '{name}' references missing glyph '{glyph}'");
                    continue;
                }
                if let Some(other) = seen.get(glyph) {
                    warn!("glyph '{glyph}' is in kerning groups '{other}' and '{name}', removing it from '{name}'");
                    continue;
                }
                seen.insert(glyph.clone(), name.clone());
                kept.insert(glyph.clone());
            }
            if !kept.is_empty() {
                side.insert(name.clone(), kept);
            }
        }
        out
    }
}

fn resolve_side(
    name: &str,
    groups: &KerningGroups,
    first: bool,
    contains: &impl Fn(&str) -> bool,
) -> Option<KernSide> {
    let (prefix, side_groups) = if first {
        (KERN_SIDE1_PREFIX, &groups.side1)
    } else {
        (KERN_SIDE2_PREFIX, &groups.side2)
    };
    if let Some(group) = name.strip_prefix(prefix) {
        let members = side_groups.get(name)?;
        return Some(KernSide::Class {
            group: group.to_string(),
            members: members.clone(),
        });
    }
    contains(name).then(|| KernSide::Glyph(GlyphName::new(name)))
}

/// Resolve raw kerning against cleaned groups
///
/// Pairs naming a missing glyph or group are dropped, as are zero-valued
/// class-to-class pairs, which cannot override anything.
pub fn kerning_pairs(kerning: &Kerning, groups: &KerningGroups, contains: impl Fn(&str) -> bool) -> Vec<KerningPair> {
    let mut pairs = Vec::with_capacity(kerning.len());
    for ((first, second), value) in kerning {
        let (Some(first_side), Some(second_side)) = (
            resolve_side(first, groups, true, &contains),
            resolve_side(second, groups, false, &contains),
        ) else {
            debug!("dropping kerning pair <{first} {second}>: unknown glyph or group");
            continue;
        };
        if *value == 0.0 && first_side.is_class() && second_side.is_class() {
            continue;
        }
        pairs.push(KerningPair::new(first_side, second_side, *value));
    }
    pairs
}

/// Separate pairs between bases from pairs involving marks
///
/// Classes are split into their base and mark members so that related pairs
/// stay in the same list.
pub fn split_base_and_mark_pairs(
    pairs: &[KerningPair],
    marks: &BTreeSet<GlyphName>,
) -> (Vec<KerningPair>, Vec<KerningPair>) {
    if marks.is_empty() {
        return (pairs.to_vec(), Vec::new());
    }
    let partition = |side: &KernSide| -> (Option<KernSide>, Option<KernSide>) {
        match side {
            KernSide::Glyph(glyph) if marks.contains(glyph) => (None, Some(side.clone())),
            KernSide::Glyph(_) => (Some(side.clone()), None),
            KernSide::Class { members, .. } => {
                let (mark_members, base_members): (BTreeSet<_>, BTreeSet<_>) =
                    members.iter().cloned().partition(|g| marks.contains(g));
                (
                    (!base_members.is_empty()).then(|| side.with_members(base_members)),
                    (!mark_members.is_empty()).then(|| side.with_members(mark_members)),
                )
            }
        }
    };

    let mut base_pairs = Vec::new();
    let mut mark_pairs = Vec::new();
    for pair in pairs {
        let (first_bases, first_marks) = partition(&pair.first);
        let (second_bases, second_marks) = partition(&pair.second);
        if let (Some(first), Some(second)) = (&first_bases, &second_bases) {
            base_pairs.push(KerningPair::new(first.clone(), second.clone(), pair.value));
        }
        for (first, second) in [
            (&first_bases, &second_marks),
            (&first_marks, &second_bases),
            (&first_marks, &second_marks),
        ] {
            if let (Some(first), Some(second)) = (first, second) {
                mark_pairs.push(KerningPair::new(first.clone(), second.clone(), pair.value));
            }
        }
    }
    (base_pairs, mark_pairs)
}

// ============================================================================
// Script splitting
// ============================================================================

fn scripts_of(glyph: &GlyphName, glyph_scripts: &GlyphScripts) -> BTreeSet<Script> {
    glyph_scripts
        .get(glyph)
        .filter(|scripts| !scripts.is_empty())
        .cloned()
        .unwrap_or_else(|| BTreeSet::from([Script::COMMON]))
}

/// One side cut into per-script parts
fn side_by_script(side: &KernSide, glyph_scripts: &GlyphScripts) -> BTreeMap<Script, KernSide> {
    match side {
        KernSide::Glyph(glyph) => scripts_of(glyph, glyph_scripts)
            .into_iter()
            .map(|script| (script, side.clone()))
            .collect(),
        KernSide::Class { members, .. } => {
            let mut by_script: BTreeMap<Script, BTreeSet<GlyphName>> = BTreeMap::new();
            for glyph in members {
                for script in scripts_of(glyph, glyph_scripts) {
                    by_script.entry(script).or_default().insert(glyph.clone());
                }
            }
            by_script
                .into_iter()
                .map(|(script, members)| (script, side.with_members(members)))
                .collect()
        }
    }
}

/// Split class-first pairs so first-side classes within a bucket no longer
/// overlap; each glyph goes to the subset of classes it shares with exactly
/// the same other glyphs
fn make_first_classes_disjoint(pairs: Vec<KerningPair>) -> Vec<KerningPair> {
    let classes: BTreeSet<&BTreeSet<GlyphName>> = pairs
        .iter()
        .filter_map(|pair| match &pair.first {
            KernSide::Class { members, .. } => Some(members),
            KernSide::Glyph(_) => None,
        })
        .collect();
    let classes: Vec<&BTreeSet<GlyphName>> = classes.into_iter().collect();

    let mut signatures: BTreeMap<&GlyphName, BTreeSet<usize>> = BTreeMap::new();
    for (index, members) in classes.iter().enumerate() {
        for glyph in members.iter() {
            signatures.entry(glyph).or_default().insert(index);
        }
    }
    if signatures.values().all(|indices| indices.len() == 1) {
        return pairs;
    }
    let mut fragments: BTreeMap<BTreeSet<usize>, BTreeSet<GlyphName>> = BTreeMap::new();
    for (glyph, signature) in &signatures {
        fragments
            .entry(signature.clone())
            .or_default()
            .insert((*glyph).clone());
    }

    let mut out = Vec::with_capacity(pairs.len());
    for pair in &pairs {
        let KernSide::Class { members, .. } = &pair.first else {
            out.push(pair.clone());
            continue;
        };
        let Some(index) = classes.iter().position(|class| *class == members) else {
            continue;
        };
        for (signature, glyphs) in &fragments {
            if signature.contains(&index) {
                out.push(KerningPair::new(
                    pair.first.with_members(glyphs.clone()),
                    pair.second.clone(),
                    pair.value,
                ));
            }
        }
    }
    out
}

fn sort_pairs(pairs: &mut [KerningPair]) {
    pairs.sort_by(|a, b| {
        (a.first.is_class(), a.second.is_class(), a.first.sort_key(), a.second.sort_key())
            .cmp(&(b.first.is_class(), b.second.is_class(), b.first.sort_key(), b.second.sort_key()))
            .then_with(|| a.first.cmp(&b.first))
            .then_with(|| a.second.cmp(&b.second))
            .then_with(|| a.value.total_cmp(&b.value))
    });
}

/// Distribute pairs over script buckets
///
/// A pair part whose sides share a script goes to that script; a part with
/// a Common or Inherited side goes to the other side's script; parts mixing
/// two real scripts are dropped.
pub fn split_kerning(pairs: &[KerningPair], glyph_scripts: &GlyphScripts) -> BTreeMap<Script, Vec<KerningPair>> {
    let mut buckets: BTreeMap<Script, Vec<KerningPair>> = BTreeMap::new();
    for pair in pairs {
        let firsts = side_by_script(&pair.first, glyph_scripts);
        let seconds = side_by_script(&pair.second, glyph_scripts);
        for (first_script, first) in &firsts {
            for (second_script, second) in &seconds {
                let script = if first_script == second_script || second_script.is_default() {
                    *first_script
                } else if first_script.is_default() {
                    *second_script
                } else {
                    info!(
                        "Mixed script kerning pair {} ignored ({first_script}, {second_script})",
                        KerningPair::new(first.clone(), second.clone(), pair.value)
                    );
                    continue;
                };
                let bucket = buckets.entry(script).or_default();
                let localized = KerningPair::new(first.clone(), second.clone(), pair.value);
                if !bucket
                    .iter()
                    .any(|p| p.first == localized.first && p.second == localized.second)
                {
                    bucket.push(localized);
                }
            }
        }
    }
    buckets
        .into_iter()
        .map(|(script, pairs)| {
            let mut pairs = make_first_classes_disjoint(pairs);
            sort_pairs(&mut pairs);
            (script, pairs)
        })
        .collect()
}

/// Clean up kerning and groups, then split the pairs by script
pub fn get_and_split_kerning_data(
    kerning: &Kerning,
    groups: &Groups,
    contains: impl Fn(&str) -> bool,
    glyph_scripts: &GlyphScripts,
) -> BTreeMap<Script, Vec<KerningPair>> {
    let groups = KerningGroups::from_groups(groups, &contains);
    let pairs = kerning_pairs(kerning, &groups, &contains);
    split_kerning(&pairs, glyph_scripts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(group: &str, members: &[&str]) -> KernSide {
        KernSide::Class {
            group: group.to_string(),
            members: members.iter().map(|m| GlyphName::new(*m)).collect(),
        }
    }

    fn glyph(name: &str) -> KernSide {
        KernSide::Glyph(GlyphName::new(name))
    }

    fn scripts(entries: &[(&str, &[Script])]) -> GlyphScripts {
        entries
            .iter()
            .map(|(glyph, scripts)| (GlyphName::new(*glyph), scripts.iter().copied().collect()))
            .collect()
    }

    #[test]
    fn test_groups_cleanup() {
        let mut groups = Groups::new();
        groups.insert("public.kern1.O".into(), vec!["O".into(), "Q".into(), "missing".into()]);
        groups.insert("public.kern1.Q".into(), vec!["Q".into()]);
        groups.insert("public.kern2.O".into(), vec!["O".into()]);
        groups.insert("other".into(), vec!["O".into()]);

        let cleaned = KerningGroups::from_groups(&groups, |g| g != "missing");
        assert_eq!(cleaned.side1.len(), 1);
        assert_eq!(cleaned.side1["public.kern1.O"].len(), 2);
        assert_eq!(cleaned.side2.len(), 1);
    }

    #[test]
    fn test_kerning_pairs_drop_unknown_and_zero_class_pairs() {
        let mut groups = Groups::new();
        groups.insert("public.kern1.A".into(), vec!["A".into()]);
        groups.insert("public.kern2.V".into(), vec!["V".into()]);
        let groups = KerningGroups::from_groups(&groups, |_| true);

        let mut kerning = Kerning::new();
        kerning.insert(("public.kern1.A".into(), "public.kern2.V".into()), 0.0);
        kerning.insert(("public.kern1.A".into(), "V".into()), 0.0);
        kerning.insert(("public.kern1.gone".into(), "V".into()), -10.0);
        kerning.insert(("A".into(), "W".into()), -10.0);

        let pairs = kerning_pairs(&kerning, &groups, |g| g != "W");
        assert_eq!(pairs, vec![KerningPair::new(class("A", &["A"]), glyph("V"), 0.0)]);
    }

    #[test]
    fn test_split_restricts_group_to_shared_script() {
        let glyph_scripts = scripts(&[
            ("V", &[Script::LATIN]),
            ("H.sc", &[Script::LATIN]),
            ("En.sc", &[Script::CYRILLIC]),
            ("Eta.sc", &[Script::GREEK]),
        ]);
        let pairs = [KerningPair::new(
            class("V", &["V"]),
            class("H.sc", &["H.sc", "En.sc", "Eta.sc"]),
            -20.0,
        )];
        let split = split_kerning(&pairs, &glyph_scripts);
        assert_eq!(split.len(), 1);
        assert_eq!(
            split[&Script::LATIN],
            vec![KerningPair::new(class("V", &["V"]), class("H.sc", &["H.sc"]), -20.0)]
        );
    }

    #[test]
    fn test_common_side_takes_other_script() {
        let glyph_scripts = scripts(&[("period", &[Script::COMMON]), ("alef", &[Script::ARABIC])]);
        let pairs = [
            KerningPair::new(glyph("period"), glyph("alef"), 5.0),
            KerningPair::new(glyph("period"), glyph("period"), 7.0),
        ];
        let split = split_kerning(&pairs, &glyph_scripts);
        assert_eq!(split[&Script::ARABIC].len(), 1);
        assert_eq!(split[&Script::COMMON].len(), 1);
    }

    #[test]
    fn test_first_classes_made_disjoint() {
        let glyph_scripts = scripts(&[("A", &[Script::LATIN]), ("B", &[Script::LATIN]), ("C", &[Script::LATIN])]);
        let pairs = [
            KerningPair::new(class("AB", &["A", "B"]), glyph("C"), -10.0),
            KerningPair::new(class("BC", &["B", "C"]), glyph("A"), -20.0),
        ];
        let split = split_kerning(&pairs, &glyph_scripts);
        let latin = &split[&Script::LATIN];
        assert_eq!(latin.len(), 4);
        for pair in latin {
            if let KernSide::Class { members, .. } = &pair.first {
                assert_eq!(members.len(), 1);
            }
        }
    }

    #[test]
    fn test_split_base_and_mark_pairs() {
        let marks: BTreeSet<GlyphName> = [GlyphName::new("acutecomb")].into();
        let pairs = [
            KerningPair::new(class("a", &["a", "acutecomb"]), glyph("b"), -5.0),
            KerningPair::new(glyph("acutecomb"), glyph("acutecomb"), 3.0),
        ];
        let (bases, marks) = split_base_and_mark_pairs(&pairs, &marks);
        assert_eq!(bases, vec![KerningPair::new(class("a", &["a"]), glyph("b"), -5.0)]);
        assert_eq!(marks.len(), 2);
    }

    #[test]
    fn test_pairs_sorted_glyph_pairs_first() {
        let glyph_scripts = scripts(&[("A", &[Script::LATIN]), ("V", &[Script::LATIN])]);
        let pairs = [
            KerningPair::new(class("A", &["A"]), glyph("V"), -30.0),
            KerningPair::new(glyph("V"), glyph("A"), -10.0),
            KerningPair::new(glyph("A"), glyph("V"), -20.0),
        ];
        let split = split_kerning(&pairs, &glyph_scripts);
        let order: Vec<String> = split[&Script::LATIN].iter().map(ToString::to_string).collect();
        assert_eq!(order, vec!["<A V -20>", "<V A -10>", "<@A V -30>"]);
    }
}
