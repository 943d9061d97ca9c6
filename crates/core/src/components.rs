//! Component graph validation

use std::collections::HashMap;

use crate::{Error, FontSource, GlyphName, Result, official_glyph_order};

#[derive(Copy, Clone, PartialEq, Eq)]
enum Visit {
    New,
    Active,
    Done,
}

/// Reject fonts whose component references form a cycle
///
/// Glyphs are indexed by name into an arena and walked depth first with an
/// explicit stack. References to glyphs missing from the font are not part of
/// the graph. The error names the glyph the walk returned to and the path
/// that led back to it.
pub fn check_component_cycles<S: FontSource + ?Sized>(source: &S) -> Result<()> {
    let names = official_glyph_order(source);
    let index: HashMap<&str, usize> = names
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.as_str(), idx))
        .collect();
    let edges: Vec<Vec<usize>> = names
        .iter()
        .map(|name| {
            source
                .glyph(name)
                .map(|glyph| {
                    glyph
                        .components
                        .iter()
                        .filter_map(|component| index.get(component.base.as_str()).copied())
                        .collect()
                })
                .unwrap_or_default()
        })
        .collect();

    let mut state = vec![Visit::New; names.len()];
    for root in 0..names.len() {
        if state[root] != Visit::New {
            continue;
        }
        // (node, next edge to follow)
        let mut stack: Vec<(usize, usize)> = vec![(root, 0)];
        state[root] = Visit::Active;
        while let Some(frame) = stack.last_mut() {
            let node = frame.0;
            let Some(&child) = edges[node].get(frame.1) else {
                state[node] = Visit::Done;
                stack.pop();
                continue;
            };
            frame.1 += 1;
            match state[child] {
                Visit::New => {
                    state[child] = Visit::Active;
                    stack.push((child, 0));
                }
                Visit::Active => {
                    let start = stack
                        .iter()
                        .position(|(n, _)| *n == child)
                        .unwrap_or_default();
                    let mut cycle: Vec<GlyphName> =
                        stack[start..].iter().map(|(n, _)| names[*n].clone()).collect();
                    cycle.push(names[child].clone());
                    return Err(Error::ComponentCycle {
                        glyph: names[child].clone(),
                        cycle,
                    });
                }
                Visit::Done => {}
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Component, Font, Glyph};

    #[test]
    fn test_acyclic_font_passes() {
        let font = Font::new()
            .with_glyph(Glyph::new("A"))
            .with_glyph(Glyph::new("acutecomb"))
            .with_glyph(
                Glyph::new("Aacute")
                    .with_component(Component::offset("A", 0.0, 0.0))
                    .with_component(Component::offset("acutecomb", 0.0, 0.0)),
            )
            .with_glyph(Glyph::new("Aacute.ss01").with_component(Component::offset("Aacute", 0.0, 0.0)));
        assert_eq!(check_component_cycles(&font), Ok(()));
    }

    #[test]
    fn test_missing_base_is_not_a_cycle() {
        let font = Font::new().with_glyph(Glyph::new("a").with_component(Component::offset("ghost", 0.0, 0.0)));
        assert!(check_component_cycles(&font).is_ok());
    }

    #[test]
    fn test_self_reference() {
        let font = Font::new().with_glyph(Glyph::new("a").with_component(Component::offset("a", 0.0, 0.0)));
        let err = check_component_cycles(&font).unwrap_err();
        assert_eq!(
            err,
            Error::ComponentCycle {
                glyph: "a".into(),
                cycle: vec!["a".into(), "a".into()],
            }
        );
    }

    #[test]
    fn test_indirect_cycle_names_glyph() {
        let font = Font::new()
            .with_glyph(Glyph::new("a").with_component(Component::offset("b", 0.0, 0.0)))
            .with_glyph(Glyph::new("b").with_component(Component::offset("c", 0.0, 0.0)))
            .with_glyph(Glyph::new("c").with_component(Component::offset("a", 0.0, 0.0)));
        match check_component_cycles(&font) {
            Err(Error::ComponentCycle { glyph, cycle }) => {
                assert_eq!(glyph, "a");
                assert_eq!(cycle, vec![GlyphName::new("a"), "b".into(), "c".into(), "a".into()]);
            }
            other => panic!("expected a cycle, got {other:?}"),
        }
    }
}
