//! Glyph classification propagated through substitutions
//!
//! A glyph reachable only through GSUB (say `a.sc` from `a`) has no
//! codepoint of its own. Classifying by codepoint first and then closing each
//! class over the substitution rules gives it the properties of its source.

use std::collections::{BTreeMap, BTreeSet};

use ufo2ot_core::{CharMap, Codepoint, GlyphName};

use crate::ast::{FeatureFile, Substitution};

/// Substitution rules collected from a feature file
#[derive(Debug, Default)]
pub struct SubstitutionClosure<'a> {
    rules: Vec<&'a Substitution>,
}

impl<'a> SubstitutionClosure<'a> {
    pub fn new(rules: Vec<&'a Substitution>) -> Self {
        Self { rules }
    }

    pub fn from_features(fea: &'a FeatureFile) -> Self {
        Self::new(fea.substitutions())
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Extend `glyphs` with everything the rules can produce from it
    ///
    /// A ligature joins the set only once all of its components are in it.
    pub fn close(&self, glyphs: &mut BTreeSet<GlyphName>) {
        loop {
            let mut added = Vec::new();
            for rule in &self.rules {
                rule_outputs(rule, glyphs, &mut added);
            }
            let before = glyphs.len();
            glyphs.extend(added);
            if glyphs.len() == before {
                break;
            }
        }
    }
}

fn rule_outputs(rule: &Substitution, glyphs: &BTreeSet<GlyphName>, out: &mut Vec<GlyphName>) {
    match rule {
        Substitution::Single {
            target,
            replacement,
        } => {
            if let [single] = replacement.as_slice() {
                if target.iter().any(|t| glyphs.contains(t)) {
                    out.push(single.clone());
                }
            } else {
                out.extend(
                    target
                        .iter()
                        .zip(replacement)
                        .filter(|(t, _)| glyphs.contains(*t))
                        .map(|(_, r)| r.clone()),
                );
            }
        }
        Substitution::Multiple {
            target,
            replacement,
        } => {
            if glyphs.contains(target) {
                out.extend(replacement.iter().cloned());
            }
        }
        Substitution::Alternate { target, alternates } => {
            if glyphs.contains(target) {
                out.extend(alternates.iter().cloned());
            }
        }
        Substitution::Ligature {
            components,
            ligature,
        } => {
            if !components.is_empty() && components.iter().all(|c| glyphs.contains(c)) {
                out.push(ligature.clone());
            }
        }
    }
}

/// Group the encoded glyphs by the keys `classifier` gives their codepoints,
/// then close each group over the substitution rules
///
/// A glyph with several codepoints, or a key set with several members, ends
/// up in several groups.
pub fn classify_glyphs<K, I, F>(
    classifier: F,
    cmap: &CharMap,
    closure: &SubstitutionClosure<'_>,
) -> BTreeMap<K, BTreeSet<GlyphName>>
where
    K: Ord,
    I: IntoIterator<Item = K>,
    F: Fn(Codepoint) -> I,
{
    let mut classes: BTreeMap<K, BTreeSet<GlyphName>> = BTreeMap::new();
    for (codepoint, glyph) in cmap {
        for key in classifier(*codepoint) {
            classes.entry(key).or_default().insert(glyph.clone());
        }
    }
    if !closure.is_empty() {
        for glyphs in classes.values_mut() {
            closure.close(glyphs);
        }
    }
    classes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(names: &[&str]) -> BTreeSet<GlyphName> {
        names.iter().map(|n| GlyphName::new(*n)).collect()
    }

    #[test]
    fn test_close_follows_chains() {
        let rules = [
            Substitution::single("a", "a.sc"),
            Substitution::single("a.sc", "a.sc.alt"),
            Substitution::Alternate {
                target: "b".into(),
                alternates: vec!["b.ss01".into(), "b.ss02".into()],
            },
        ];
        let closure = SubstitutionClosure::new(rules.iter().collect());

        let mut glyphs = set(&["a", "b"]);
        closure.close(&mut glyphs);
        assert_eq!(glyphs, set(&["a", "a.sc", "a.sc.alt", "b", "b.ss01", "b.ss02"]));
    }

    #[test]
    fn test_ligature_needs_all_components() {
        let rules = [Substitution::ligature(["f", "i"], "f_i")];
        let closure = SubstitutionClosure::new(rules.iter().collect());

        let mut partial = set(&["f"]);
        closure.close(&mut partial);
        assert_eq!(partial, set(&["f"]));

        let mut full = set(&["f", "i"]);
        closure.close(&mut full);
        assert!(full.contains("f_i"));
    }

    #[test]
    fn test_classify_glyphs() {
        let cmap: CharMap = [
            (Codepoint(0x41), GlyphName::new("A")),
            (Codepoint(0x5D0), GlyphName::new("alef")),
        ]
        .into();
        let rules = [Substitution::single("A", "A.sc")];
        let closure = SubstitutionClosure::new(rules.iter().collect());

        let classes = classify_glyphs(
            |cp: Codepoint| [if cp.0 < 0x100 { 'L' } else { 'R' }],
            &cmap,
            &closure,
        );
        assert_eq!(classes[&'L'], set(&["A", "A.sc"]));
        assert_eq!(classes[&'R'], set(&["alef"]));
    }
}
