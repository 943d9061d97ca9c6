//! Script and bidirectional classification of codepoints
//!
//! Layout decisions only need three answers about a codepoint: which
//! script(s) it belongs to, which way that script runs and which bidi class
//! the character has. [`UnicodeProperties`] is the seam through which those
//! answers are supplied; [`BuiltinUnicode`] answers them from compact static
//! tables covering the scripts fonts most commonly kern and attach marks in.

use std::{
    collections::BTreeSet,
    fmt::{self, Display, Formatter},
    str::FromStr,
};

use read_fonts::types::Tag;

use crate::{
    Codepoint,
    config::{DFLT_SCRIPTS, OT_SCRIPT_TAGS, RTL_SCRIPTS},
};

/// An ISO 15924 script code such as `Latn` or `Zyyy`
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Script(Tag);

impl Script {
    pub const COMMON: Script = Script::new(b"Zyyy");
    pub const INHERITED: Script = Script::new(b"Zinh");
    pub const UNKNOWN: Script = Script::new(b"Zzzz");

    pub const LATIN: Script = Script::new(b"Latn");
    pub const GREEK: Script = Script::new(b"Grek");
    pub const CYRILLIC: Script = Script::new(b"Cyrl");
    pub const HEBREW: Script = Script::new(b"Hebr");
    pub const ARABIC: Script = Script::new(b"Arab");
    pub const DEVANAGARI: Script = Script::new(b"Deva");

    pub const fn new(code: &[u8; 4]) -> Self {
        Self(Tag::new(code))
    }

    pub const fn tag(self) -> Tag {
        self.0
    }

    /// Common and Inherited glyphs take the script of the run they sit in
    pub fn is_default(self) -> bool {
        DFLT_SCRIPTS.contains(&self)
    }

    pub fn direction(self) -> Direction {
        if self.is_default() || self == Script::UNKNOWN {
            Direction::Neutral
        } else if RTL_SCRIPTS.contains(&self) {
            Direction::Rtl
        } else {
            Direction::Ltr
        }
    }

    /// OpenType script tags registered for this script, preferred tag first
    pub fn ot_tags(self) -> Vec<Tag> {
        if let Some((_, tags)) = OT_SCRIPT_TAGS.iter().find(|(script, _)| *script == self) {
            return tags.iter().map(|tag| Tag::new(&pad_tag(tag))).collect();
        }
        let mut bytes = self.0.into_bytes();
        bytes[0] = bytes[0].to_ascii_lowercase();
        vec![Tag::new(&bytes)]
    }

    /// Inverse of [`Script::ot_tags`]
    pub fn from_ot_tag(tag: Tag) -> Option<Script> {
        if tag == Tag::new(b"DFLT") {
            return Some(Script::COMMON);
        }
        if let Some((script, _)) = OT_SCRIPT_TAGS
            .iter()
            .find(|(script, tags)| !script.is_default() && tags.iter().any(|t| pad_tag(t) == tag.into_bytes()))
        {
            return Some(*script);
        }
        let mut bytes = tag.into_bytes();
        if !bytes.iter().all(u8::is_ascii_alphabetic) {
            return None;
        }
        bytes[0] = bytes[0].to_ascii_uppercase();
        Some(Script::new(&bytes))
    }
}

fn pad_tag(tag: &str) -> [u8; 4] {
    let mut out = [b' '; 4];
    for (slot, byte) in out.iter_mut().zip(tag.bytes()) {
        *slot = byte;
    }
    out
}

impl Display for Script {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl FromStr for Script {
    type Err = InvalidScript;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes: [u8; 4] = s
            .as_bytes()
            .try_into()
            .map_err(|_| InvalidScript(s.to_string()))?;
        if !bytes.iter().all(u8::is_ascii_alphabetic) {
            return Err(InvalidScript(s.to_string()));
        }
        Ok(Script::new(&bytes))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a four-letter script code")]
pub struct InvalidScript(pub String);

/// Horizontal run direction
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Neutral,
    Ltr,
    Rtl,
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Neutral => "Neutral",
            Direction::Ltr => "LTR",
            Direction::Rtl => "RTL",
        })
    }
}

/// Unicode bidirectional character types
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BidiClass {
    L,
    R,
    AL,
    EN,
    ES,
    ET,
    AN,
    CS,
    NSM,
    BN,
    B,
    S,
    WS,
    ON,
}

/// Codepoint property lookups used by script-aware feature writers
///
/// Implementations must be immutable once built; one instance is shared by
/// every writer compiling a font.
pub trait UnicodeProperties: Send + Sync {
    fn script(&self, codepoint: Codepoint) -> Script;

    /// The scripts a codepoint is used with; defaults to its single script
    fn script_extensions(&self, codepoint: Codepoint) -> BTreeSet<Script> {
        BTreeSet::from([self.script(codepoint)])
    }

    fn bidi_class(&self, codepoint: Codepoint) -> BidiClass;
}

/// Run direction of the script a codepoint belongs to; Common and Inherited
/// codepoints are neutral
pub fn unicode_script_direction(props: &dyn UnicodeProperties, codepoint: Codepoint) -> Direction {
    props.script(codepoint).direction()
}

/// Strong direction a codepoint imposes on a kerning pair, if any
///
/// Numbers count as left to right: they are laid out LTR even inside RTL runs.
pub fn unicode_bidi_type(props: &dyn UnicodeProperties, codepoint: Codepoint) -> Option<Direction> {
    match props.bidi_class(codepoint) {
        BidiClass::R | BidiClass::AL => Some(Direction::Rtl),
        BidiClass::L | BidiClass::EN | BidiClass::AN => Some(Direction::Ltr),
        _ => None,
    }
}

/// Static-table implementation of [`UnicodeProperties`]
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinUnicode;

impl UnicodeProperties for BuiltinUnicode {
    fn script(&self, codepoint: Codepoint) -> Script {
        lookup_range(SCRIPT_RANGES, codepoint.to_u32())
            .copied()
            .unwrap_or(Script::UNKNOWN)
    }

    fn script_extensions(&self, codepoint: Codepoint) -> BTreeSet<Script> {
        match lookup_range(SCRIPT_EXTENSIONS, codepoint.to_u32()) {
            Some(scripts) => scripts.iter().map(|code| Script::new(code)).collect(),
            None => BTreeSet::from([self.script(codepoint)]),
        }
    }

    fn bidi_class(&self, codepoint: Codepoint) -> BidiClass {
        let cp = codepoint.to_u32();
        if let Some(class) = lookup_range(BIDI_OVERRIDES, cp) {
            return *class;
        }
        let script = self.script(codepoint);
        match script {
            Script::INHERITED => BidiClass::NSM,
            Script::COMMON => common_bidi_class(cp),
            Script::ARABIC => BidiClass::AL,
            other if other == sc(b"Syrc") || other == sc(b"Thaa") => BidiClass::AL,
            other if other.direction() == Direction::Rtl => BidiClass::R,
            _ => BidiClass::L,
        }
    }
}

fn common_bidi_class(cp: u32) -> BidiClass {
    match cp {
        0x30..=0x39 => BidiClass::EN,
        0x09 | 0x0B | 0x1F => BidiClass::S,
        0x0A | 0x0D | 0x1C..=0x1E | 0x85 | 0x2029 => BidiClass::B,
        0x20 | 0x0C | 0x2000..=0x200A | 0x2028 => BidiClass::WS,
        0x2B | 0x2D => BidiClass::ES,
        0x23..=0x25 | 0xA2..=0xA5 | 0xB0 | 0xB1 | 0x20A0..=0x20CF => BidiClass::ET,
        0x2C | 0x2E | 0x2F | 0x3A | 0xA0 => BidiClass::CS,
        0x00..=0x08 | 0x0E..=0x1B | 0x7F..=0x84 | 0x86..=0x9F | 0xAD | 0x200B => BidiClass::BN,
        0x200E => BidiClass::L,
        0x200F => BidiClass::R,
        _ => BidiClass::ON,
    }
}

fn lookup_range<T>(table: &[(u32, u32, T)], cp: u32) -> Option<&T> {
    let idx = table.partition_point(|(_, end, _)| *end < cp);
    table
        .get(idx)
        .filter(|(start, _, _)| *start <= cp)
        .map(|(_, _, value)| value)
}

const fn sc(code: &[u8; 4]) -> Script {
    Script::new(code)
}

// Sorted, non-overlapping (start, end, script) ranges.
static SCRIPT_RANGES: &[(u32, u32, Script)] = &[
    (0x0000, 0x0040, Script::COMMON),
    (0x0041, 0x005A, Script::LATIN),
    (0x005B, 0x0060, Script::COMMON),
    (0x0061, 0x007A, Script::LATIN),
    (0x007B, 0x00A9, Script::COMMON),
    (0x00AA, 0x00AA, Script::LATIN),
    (0x00AB, 0x00B9, Script::COMMON),
    (0x00BA, 0x00BA, Script::LATIN),
    (0x00BB, 0x00BF, Script::COMMON),
    (0x00C0, 0x00D6, Script::LATIN),
    (0x00D7, 0x00D7, Script::COMMON),
    (0x00D8, 0x00F6, Script::LATIN),
    (0x00F7, 0x00F7, Script::COMMON),
    (0x00F8, 0x02B8, Script::LATIN),
    (0x02B9, 0x02FF, Script::COMMON),
    (0x0300, 0x036F, Script::INHERITED),
    (0x0370, 0x03FF, Script::GREEK),
    (0x0400, 0x052F, Script::CYRILLIC),
    (0x0531, 0x058F, sc(b"Armn")),
    (0x0591, 0x05FF, Script::HEBREW),
    (0x0600, 0x060B, Script::ARABIC),
    (0x060C, 0x060C, Script::COMMON),
    (0x060D, 0x061A, Script::ARABIC),
    (0x061B, 0x061B, Script::COMMON),
    (0x061C, 0x061E, Script::ARABIC),
    (0x061F, 0x061F, Script::COMMON),
    (0x0620, 0x063F, Script::ARABIC),
    (0x0640, 0x0640, Script::COMMON),
    (0x0641, 0x064A, Script::ARABIC),
    (0x064B, 0x0655, Script::INHERITED),
    (0x0656, 0x066F, Script::ARABIC),
    (0x0670, 0x0670, Script::INHERITED),
    (0x0671, 0x06DC, Script::ARABIC),
    (0x06DD, 0x06DD, Script::COMMON),
    (0x06DE, 0x06FF, Script::ARABIC),
    (0x0700, 0x074F, sc(b"Syrc")),
    (0x0750, 0x077F, Script::ARABIC),
    (0x0780, 0x07BF, sc(b"Thaa")),
    (0x07C0, 0x07FF, sc(b"Nkoo")),
    (0x0800, 0x083F, sc(b"Samr")),
    (0x08A0, 0x08FF, Script::ARABIC),
    (0x0900, 0x0950, Script::DEVANAGARI),
    (0x0951, 0x0954, Script::INHERITED),
    (0x0955, 0x0963, Script::DEVANAGARI),
    (0x0964, 0x0965, Script::COMMON),
    (0x0966, 0x097F, Script::DEVANAGARI),
    (0x0980, 0x09FF, sc(b"Beng")),
    (0x0A00, 0x0A7F, sc(b"Guru")),
    (0x0A80, 0x0AFF, sc(b"Gujr")),
    (0x0B00, 0x0B7F, sc(b"Orya")),
    (0x0B80, 0x0BFF, sc(b"Taml")),
    (0x0C00, 0x0C7F, sc(b"Telu")),
    (0x0C80, 0x0CFF, sc(b"Knda")),
    (0x0D00, 0x0D7F, sc(b"Mlym")),
    (0x0D80, 0x0DFF, sc(b"Sinh")),
    (0x0E01, 0x0E3A, sc(b"Thai")),
    (0x0E3F, 0x0E3F, Script::COMMON),
    (0x0E40, 0x0E5B, sc(b"Thai")),
    (0x0E80, 0x0EFF, sc(b"Laoo")),
    (0x0F00, 0x0FFF, sc(b"Tibt")),
    (0x1000, 0x109F, sc(b"Mymr")),
    (0x10A0, 0x10FF, sc(b"Geor")),
    (0x1100, 0x11FF, sc(b"Hang")),
    (0x1780, 0x17FF, sc(b"Khmr")),
    (0x1E00, 0x1EFF, Script::LATIN),
    (0x1F00, 0x1FFF, Script::GREEK),
    (0x2000, 0x200B, Script::COMMON),
    (0x200C, 0x200D, Script::INHERITED),
    (0x200E, 0x20CF, Script::COMMON),
    (0x20D0, 0x20F0, Script::INHERITED),
    (0x20F1, 0x2BFF, Script::COMMON),
    (0x2C60, 0x2C7F, Script::LATIN),
    (0x2DE0, 0x2DFF, Script::CYRILLIC),
    (0x3000, 0x3004, Script::COMMON),
    (0x3005, 0x3005, sc(b"Hani")),
    (0x3006, 0x3006, Script::COMMON),
    (0x3007, 0x3007, sc(b"Hani")),
    (0x3008, 0x3020, Script::COMMON),
    (0x3041, 0x3096, sc(b"Hira")),
    (0x30A1, 0x30FA, sc(b"Kana")),
    (0x30FB, 0x30FC, Script::COMMON),
    (0x3131, 0x318E, sc(b"Hang")),
    (0x4E00, 0x9FFF, sc(b"Hani")),
    (0xA640, 0xA69F, Script::CYRILLIC),
    (0xA720, 0xA7FF, Script::LATIN),
    (0xAC00, 0xD7A3, sc(b"Hang")),
    (0xFB00, 0xFB06, Script::LATIN),
    (0xFB1D, 0xFB4F, Script::HEBREW),
    (0xFB50, 0xFDFF, Script::ARABIC),
    (0xFE70, 0xFEFE, Script::ARABIC),
    (0xFF21, 0xFF3A, Script::LATIN),
    (0xFF41, 0xFF5A, Script::LATIN),
];

static SCRIPT_EXTENSIONS: &[(u32, u32, &[&[u8; 4]])] = &[
    (0x060C, 0x060C, &[b"Arab", b"Nkoo", b"Rohg", b"Syrc", b"Thaa", b"Yezi"]),
    (0x061B, 0x061B, &[b"Arab", b"Nkoo", b"Rohg", b"Syrc", b"Thaa", b"Yezi"]),
    (0x061F, 0x061F, &[b"Adlm", b"Arab", b"Nkoo", b"Rohg", b"Syrc", b"Thaa", b"Yezi"]),
    (0x0640, 0x0640, &[b"Adlm", b"Arab", b"Mand", b"Mani", b"Ougr", b"Phlp", b"Rohg", b"Sogd", b"Syrc"]),
    (0x064B, 0x0655, &[b"Arab", b"Syrc"]),
    (0x0660, 0x0669, &[b"Arab", b"Thaa", b"Yezi"]),
    (0x0670, 0x0670, &[b"Arab", b"Syrc"]),
    (0x0951, 0x0952, &[b"Beng", b"Deva", b"Gran", b"Gujr", b"Guru", b"Knda", b"Latn", b"Mlym", b"Orya", b"Shrd", b"Taml", b"Telu", b"Tirh"]),
    (0x0964, 0x0965, &[b"Beng", b"Deva", b"Dogr", b"Gong", b"Gonm", b"Gran", b"Gujr", b"Guru", b"Knda", b"Mahj", b"Mlym", b"Nand", b"Orya", b"Sind", b"Sinh", b"Sylo", b"Takr", b"Taml", b"Telu", b"Tirh"]),
    (0x3001, 0x3003, &[b"Bopo", b"Hang", b"Hani", b"Hira", b"Kana", b"Yiii"]),
    (0x30FB, 0x30FC, &[b"Hira", b"Kana"]),
];

static BIDI_OVERRIDES: &[(u32, u32, BidiClass)] = &[
    (0x0591, 0x05BD, BidiClass::NSM),
    (0x0600, 0x0605, BidiClass::AN),
    (0x0610, 0x061A, BidiClass::NSM),
    (0x064B, 0x065F, BidiClass::NSM),
    (0x0660, 0x0669, BidiClass::AN),
    (0x066B, 0x066C, BidiClass::AN),
    (0x0670, 0x0670, BidiClass::NSM),
    (0x06D6, 0x06DC, BidiClass::NSM),
    (0x06DF, 0x06E4, BidiClass::NSM),
    (0x06E7, 0x06E8, BidiClass::NSM),
    (0x06EA, 0x06ED, BidiClass::NSM),
    (0x06F0, 0x06F9, BidiClass::EN),
];
