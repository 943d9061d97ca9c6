//! Name and codepoint newtypes
//!
//! `GlyphName` wraps glyph name strings with the trait implementations needed
//! to use it as a key in ordered and hashed collections while still looking
//! up entries by `&str`.

use std::{
    borrow::Borrow,
    fmt::{self, Display, Formatter},
    ops::Deref,
};

/// A glyph name, unique within a font
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GlyphName(String);

impl GlyphName {
    /// The name every font is expected to start its glyph order with
    pub const NOTDEF: &'static str = ".notdef";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Deref for GlyphName {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for GlyphName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for GlyphName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for GlyphName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for GlyphName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl PartialEq<String> for GlyphName {
    fn eq(&self, other: &String) -> bool {
        self.0 == other.as_str()
    }
}

impl Display for GlyphName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GlyphName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for GlyphName {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&GlyphName> for GlyphName {
    fn from(name: &GlyphName) -> Self {
        name.clone()
    }
}

impl From<GlyphName> for String {
    fn from(GlyphName(name): GlyphName) -> Self {
        name
    }
}

/// A Unicode scalar value assigned to a glyph
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Codepoint(pub u32);

impl Codepoint {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn to_u32(self) -> u32 {
        self.0
    }

    pub fn to_char(self) -> Option<char> {
        char::from_u32(self.0)
    }
}

impl From<u32> for Codepoint {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<char> for Codepoint {
    fn from(c: char) -> Self {
        Self(c as u32)
    }
}

impl Display for Codepoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "U+{:04X}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn test_glyph_name_display() {
        let name = GlyphName::new("A");
        assert_eq!(format!("{}", name), "A");
    }

    #[test]
    fn test_glyph_name_deref() {
        let name = GlyphName::new("acutecomb");
        assert!(name.ends_with("comb"));
        assert_eq!(name.len(), 9);
    }

    #[test]
    fn test_glyph_name_equality() {
        let name = GlyphName::new("f_i");
        assert_eq!(name, "f_i");
        assert_eq!(name, String::from("f_i"));
        assert_eq!(name, GlyphName::new("f_i"));
    }

    #[test]
    fn test_glyph_name_lookup_by_str() {
        let mut map = BTreeMap::new();
        map.insert(GlyphName::new("a"), 1);
        map.insert(GlyphName::new("b"), 2);
        assert_eq!(map.get("b"), Some(&2));
    }

    #[test]
    fn test_codepoint_display() {
        assert_eq!(Codepoint::new(0x41).to_string(), "U+0041");
        assert_eq!(Codepoint::new(0x1F600).to_string(), "U+1F600");
        assert_eq!(Codepoint::from('a').to_char(), Some('a'));
    }
}
