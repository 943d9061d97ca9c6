//! Configuration constants shared by the outline and feature compilers.

use crate::unicode::Script;

/// Group name prefix marking a first-side (left in LTR) kerning group.
pub const KERN_SIDE1_PREFIX: &str = "public.kern1.";

/// Group name prefix marking a second-side (right in LTR) kerning group.
pub const KERN_SIDE2_PREFIX: &str = "public.kern2.";

/// Font lib key holding the per-glyph OpenType category map.
pub const OPENTYPE_CATEGORIES_KEY: &str = "public.openTypeCategories";

/// Font lib key listing glyphs excluded from the compiled font.
pub const SKIP_EXPORT_KEY: &str = "public.skipExportGlyphs";

/// Anchor name prefix for horizontal ligature carets.
pub const CARET_PREFIX: &str = "caret_";

/// Anchor name prefix for vertical ligature carets.
pub const VCARET_PREFIX: &str = "vcaret_";

/// Scripts whose glyphs are usable in runs of any other script.
pub const DFLT_SCRIPTS: [Script; 2] = [Script::COMMON, Script::INHERITED];

/// Scripts shaped by the Indic and Universal Shaping Engine families,
/// which apply kerning through the `dist` feature instead of `kern`.
pub const DIST_ENABLED_SCRIPTS: &[Script] = &[
    Script::new(b"Ahom"),
    Script::new(b"Bali"),
    Script::new(b"Batk"),
    Script::new(b"Beng"),
    Script::new(b"Bhks"),
    Script::new(b"Brah"),
    Script::new(b"Bugi"),
    Script::new(b"Buhd"),
    Script::new(b"Cakm"),
    Script::new(b"Cham"),
    Script::new(b"Deva"),
    Script::new(b"Dogr"),
    Script::new(b"Dupl"),
    Script::new(b"Egyp"),
    Script::new(b"Gong"),
    Script::new(b"Gonm"),
    Script::new(b"Gran"),
    Script::new(b"Gujr"),
    Script::new(b"Guru"),
    Script::new(b"Hano"),
    Script::new(b"Hmng"),
    Script::new(b"Java"),
    Script::new(b"Kali"),
    Script::new(b"Khar"),
    Script::new(b"Khmr"),
    Script::new(b"Khoj"),
    Script::new(b"Knda"),
    Script::new(b"Kthi"),
    Script::new(b"Lana"),
    Script::new(b"Lepc"),
    Script::new(b"Limb"),
    Script::new(b"Mahj"),
    Script::new(b"Maka"),
    Script::new(b"Marc"),
    Script::new(b"Mlym"),
    Script::new(b"Modi"),
    Script::new(b"Mtei"),
    Script::new(b"Mult"),
    Script::new(b"Mymr"),
    Script::new(b"Newa"),
    Script::new(b"Orya"),
    Script::new(b"Rjng"),
    Script::new(b"Saur"),
    Script::new(b"Shrd"),
    Script::new(b"Sidd"),
    Script::new(b"Sind"),
    Script::new(b"Sinh"),
    Script::new(b"Soyo"),
    Script::new(b"Sund"),
    Script::new(b"Sylo"),
    Script::new(b"Tagb"),
    Script::new(b"Takr"),
    Script::new(b"Tale"),
    Script::new(b"Tavt"),
    Script::new(b"Telu"),
    Script::new(b"Tfng"),
    Script::new(b"Tglg"),
    Script::new(b"Tirh"),
    Script::new(b"Zanb"),
];

/// Scripts written right to left.
pub const RTL_SCRIPTS: &[Script] = &[
    Script::new(b"Adlm"),
    Script::new(b"Arab"),
    Script::new(b"Armi"),
    Script::new(b"Avst"),
    Script::new(b"Chrs"),
    Script::new(b"Cprt"),
    Script::new(b"Elym"),
    Script::new(b"Hatr"),
    Script::new(b"Hebr"),
    Script::new(b"Hung"),
    Script::new(b"Khar"),
    Script::new(b"Lydi"),
    Script::new(b"Mand"),
    Script::new(b"Mani"),
    Script::new(b"Mend"),
    Script::new(b"Merc"),
    Script::new(b"Mero"),
    Script::new(b"Narb"),
    Script::new(b"Nbat"),
    Script::new(b"Nkoo"),
    Script::new(b"Orkh"),
    Script::new(b"Ougr"),
    Script::new(b"Palm"),
    Script::new(b"Phli"),
    Script::new(b"Phlp"),
    Script::new(b"Phnx"),
    Script::new(b"Prti"),
    Script::new(b"Rohg"),
    Script::new(b"Samr"),
    Script::new(b"Sarb"),
    Script::new(b"Sogd"),
    Script::new(b"Sogo"),
    Script::new(b"Syrc"),
    Script::new(b"Thaa"),
    Script::new(b"Yezi"),
];

/// ISO 15924 script codes whose OpenType tags differ from the lowercased
/// code. Scripts with a second-generation shaping tag list it first.
pub const OT_SCRIPT_TAGS: &[(Script, &[&str])] = &[
    (Script::COMMON, &["DFLT"]),
    (Script::INHERITED, &["DFLT"]),
    (Script::new(b"Beng"), &["bng2", "beng"]),
    (Script::new(b"Deva"), &["dev2", "deva"]),
    (Script::new(b"Gujr"), &["gjr2", "gujr"]),
    (Script::new(b"Guru"), &["gur2", "guru"]),
    (Script::new(b"Hang"), &["hang"]),
    (Script::new(b"Hani"), &["hani"]),
    (Script::new(b"Hira"), &["kana"]),
    (Script::new(b"Kana"), &["kana"]),
    (Script::new(b"Knda"), &["knd2", "knda"]),
    (Script::new(b"Laoo"), &["lao "]),
    (Script::new(b"Mlym"), &["mlm2", "mlym"]),
    (Script::new(b"Mymr"), &["mym2", "mymr"]),
    (Script::new(b"Nkoo"), &["nko "]),
    (Script::new(b"Orya"), &["ory2", "orya"]),
    (Script::new(b"Taml"), &["tml2", "taml"]),
    (Script::new(b"Telu"), &["tel2", "telu"]),
    (Script::new(b"Vaii"), &["vai "]),
    (Script::new(b"Yiii"), &["yi  "]),
];
