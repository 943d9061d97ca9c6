//! Anchors and the naming convention that gives them meaning

use kurbo::Point;

use crate::config::{CARET_PREFIX, VCARET_PREFIX};

/// A named attachment point on a glyph
#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    /// Anchors without a name carry no semantics and are ignored by every
    /// feature writer
    pub name: Option<String>,
    pub x: f64,
    pub y: f64,
}

impl Anchor {
    pub fn new(name: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            name: Some(name.into()),
            x,
            y,
        }
    }

    pub fn unnamed(x: f64, y: f64) -> Self {
        Self { name: None, x, y }
    }

    /// The anchor name, treating an empty string like a missing one
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.is_empty())
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn kind(&self) -> Option<AnchorKind> {
        self.name().map(AnchorKind::classify)
    }
}

/// Semantic role of an anchor, derived from its name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnchorKind {
    /// Attachment point on a base glyph, e.g. `top`
    Base,
    /// Attaching point on a mark, e.g. `_top`; holds the base name it pairs with
    Mark { base: String },
    /// Numbered base anchor on a ligature component, e.g. `top_2`
    LigatureComponent { base: String, index: u32 },
    /// Cursive entry point, `entry` or `entry.<suffix>`
    Entry { suffix: Option<String> },
    /// Cursive exit point, `exit` or `exit.<suffix>`
    Exit { suffix: Option<String> },
    /// Ligature caret, positioned by x (or by y when vertical)
    Caret { vertical: bool },
}

impl AnchorKind {
    pub fn classify(name: &str) -> Self {
        if name.starts_with(VCARET_PREFIX) {
            return AnchorKind::Caret { vertical: true };
        }
        if name.starts_with(CARET_PREFIX) {
            return AnchorKind::Caret { vertical: false };
        }
        if let Some(suffix) = cursive_suffix(name, "entry") {
            return AnchorKind::Entry { suffix };
        }
        if let Some(suffix) = cursive_suffix(name, "exit") {
            return AnchorKind::Exit { suffix };
        }
        if let Some(base) = name.strip_prefix('_') {
            return AnchorKind::Mark {
                base: base.to_string(),
            };
        }
        if let Some((base, index)) = name.rsplit_once('_')
            && !base.is_empty()
            && !index.is_empty()
            && index.bytes().all(|b| b.is_ascii_digit())
            && let Ok(index) = index.parse()
        {
            return AnchorKind::LigatureComponent {
                base: base.to_string(),
                index,
            };
        }
        AnchorKind::Base
    }
}

fn cursive_suffix(name: &str, stem: &str) -> Option<Option<String>> {
    let rest = name.strip_prefix(stem)?;
    if rest.is_empty() {
        return Some(None);
    }
    rest.strip_prefix('.')
        .filter(|suffix| !suffix.is_empty())
        .map(|suffix| Some(suffix.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_mark_and_base() {
        assert_eq!(AnchorKind::classify("top"), AnchorKind::Base);
        assert_eq!(
            AnchorKind::classify("_top"),
            AnchorKind::Mark { base: "top".into() }
        );
    }

    #[test]
    fn test_classify_ligature_component() {
        assert_eq!(
            AnchorKind::classify("top_2"),
            AnchorKind::LigatureComponent {
                base: "top".into(),
                index: 2
            }
        );
        // a mark anchor stays a mark even when numbered
        assert_eq!(
            AnchorKind::classify("_top_1"),
            AnchorKind::Mark {
                base: "top_1".into()
            }
        );
        assert_eq!(AnchorKind::classify("top_"), AnchorKind::Base);
    }

    #[test]
    fn test_classify_cursive() {
        assert_eq!(
            AnchorKind::classify("entry"),
            AnchorKind::Entry { suffix: None }
        );
        assert_eq!(
            AnchorKind::classify("exit.RTL"),
            AnchorKind::Exit {
                suffix: Some("RTL".into())
            }
        );
        assert_eq!(AnchorKind::classify("exitfoo"), AnchorKind::Base);
    }

    #[test]
    fn test_classify_carets() {
        assert_eq!(
            AnchorKind::classify("caret_1"),
            AnchorKind::Caret { vertical: false }
        );
        assert_eq!(
            AnchorKind::classify("vcaret_1"),
            AnchorKind::Caret { vertical: true }
        );
    }

    #[test]
    fn test_empty_name_is_unnamed() {
        let anchor = Anchor::new("", 1.0, 2.0);
        assert_eq!(anchor.name(), None);
        assert_eq!(anchor.kind(), None);
        assert_eq!(Anchor::unnamed(0.0, 0.0).kind(), None);
    }
}
