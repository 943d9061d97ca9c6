//! In-memory feature file syntax
//!
//! Writers build statements from these types and append them to a
//! [`FeatureFile`]. `Display` renders fea source; the queries on
//! [`FeatureFile`] let writers inspect what the user already wrote without
//! searching text, so a `feature kern` inside a comment never counts.

use std::{
    collections::BTreeSet,
    fmt::{self, Display, Formatter},
};

use indexmap::IndexMap;
use read_fonts::types::Tag;
use ufo2ot_core::GlyphName;

const INDENT: &str = "    ";

pub const DFLT_SCRIPT: Tag = Tag::new(b"DFLT");
pub const DFLT_LANGUAGE: Tag = Tag::new(b"dflt");
pub const GDEF: &str = "GDEF";

// ============================================================================
// Leaf values
// ============================================================================

/// A format A anchor, `<anchor x y>`
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Anchor {
    pub x: i32,
    pub y: i32,
}

impl Anchor {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Display for Anchor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "<anchor {} {}>", self.x, self.y)
    }
}

fn fmt_optional_anchor(anchor: Option<Anchor>) -> String {
    anchor.map_or_else(|| "<anchor NULL>".to_string(), |a| a.to_string())
}

fn fmt_glyph_list(glyphs: &[GlyphName]) -> String {
    let names: Vec<&str> = glyphs.iter().map(GlyphName::as_str).collect();
    format!("[{}]", names.join(" "))
}

fn fmt_tag(tag: Tag) -> String {
    tag.to_string().trim_end().to_string()
}

/// Glyphs on either side of a pair positioning rule
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum GlyphSelector {
    Glyph(GlyphName),
    /// Reference to a named glyph class, without the `@`
    ClassName(String),
    Class(Vec<GlyphName>),
}

impl GlyphSelector {
    pub fn is_class(&self) -> bool {
        !matches!(self, GlyphSelector::Glyph(_))
    }
}

impl Display for GlyphSelector {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            GlyphSelector::Glyph(name) => f.write_str(name),
            GlyphSelector::ClassName(name) => write!(f, "@{name}"),
            GlyphSelector::Class(glyphs) => f.write_str(&fmt_glyph_list(glyphs)),
        }
    }
}

/// Value record of a pair positioning rule
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ValueRecord {
    /// Plain advance adjustment
    Advance(i32),
    Full {
        x_placement: i32,
        y_placement: i32,
        x_advance: i32,
        y_advance: i32,
    },
}

impl ValueRecord {
    /// Record for right-to-left runs, where the first glyph is also moved
    pub fn rtl(value: i32) -> Self {
        ValueRecord::Full {
            x_placement: value,
            y_placement: 0,
            x_advance: value,
            y_advance: 0,
        }
    }
}

impl Display for ValueRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ValueRecord::Advance(value) => write!(f, "{value}"),
            ValueRecord::Full {
                x_placement,
                y_placement,
                x_advance,
                y_advance,
            } => write!(f, "<{x_placement} {y_placement} {x_advance} {y_advance}>"),
        }
    }
}

// ============================================================================
// Definitions
// ============================================================================

/// `@name = [a b c];`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphClassDefinition {
    pub name: String,
    pub glyphs: Vec<GlyphName>,
}

impl GlyphClassDefinition {
    pub fn new(name: impl Into<String>, glyphs: impl IntoIterator<Item = GlyphName>) -> Self {
        Self {
            name: name.into(),
            glyphs: glyphs.into_iter().collect(),
        }
    }
}

impl Display for GlyphClassDefinition {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "@{} = {};", self.name, fmt_glyph_list(&self.glyphs))
    }
}

/// `markClass acute <anchor 100 500> @MC_top;`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarkClassDefinition {
    pub glyph: GlyphName,
    pub anchor: Anchor,
    pub class_name: String,
}

impl Display for MarkClassDefinition {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "markClass {} {} @{};", self.glyph, self.anchor, self.class_name)
    }
}

/// The GDEF `GlyphClassDef` statement; empty classes are left blank
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GlyphClassDef {
    pub base: Vec<GlyphName>,
    pub ligature: Vec<GlyphName>,
    pub mark: Vec<GlyphName>,
    pub component: Vec<GlyphName>,
}

impl Display for GlyphClassDef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = [&self.base, &self.ligature, &self.mark, &self.component]
            .into_iter()
            .map(|glyphs| {
                if glyphs.is_empty() {
                    String::new()
                } else {
                    fmt_glyph_list(glyphs)
                }
            })
            .collect();
        write!(f, "GlyphClassDef {};", parts.join(", "))
    }
}

// ============================================================================
// Rules
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LookupFlag {
    pub right_to_left: bool,
    pub ignore_marks: bool,
    /// Glyph class name for `UseMarkFilteringSet`
    pub mark_filtering_set: Option<String>,
}

impl LookupFlag {
    pub fn ignore_marks() -> Self {
        Self {
            ignore_marks: true,
            ..Self::default()
        }
    }

    pub fn mark_filtering_set(class_name: impl Into<String>) -> Self {
        Self {
            mark_filtering_set: Some(class_name.into()),
            ..Self::default()
        }
    }

    pub fn with_right_to_left(mut self, rtl: bool) -> Self {
        self.right_to_left = rtl;
        self
    }
}

impl Display for LookupFlag {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.right_to_left {
            parts.push("RightToLeft".to_string());
        }
        if self.ignore_marks {
            parts.push("IgnoreMarks".to_string());
        }
        if let Some(class) = &self.mark_filtering_set {
            parts.push(format!("UseMarkFilteringSet @{class}"));
        }
        if parts.is_empty() {
            return f.write_str("lookupflag 0;");
        }
        write!(f, "lookupflag {};", parts.join(" "))
    }
}

/// An anchor together with the mark class attaching to it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarkAttachment {
    pub anchor: Anchor,
    pub class_name: String,
}

impl MarkAttachment {
    pub fn new(anchor: Anchor, class_name: impl Into<String>) -> Self {
        Self {
            anchor,
            class_name: class_name.into(),
        }
    }
}

impl Display for MarkAttachment {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} mark @{}", self.anchor, self.class_name)
    }
}

fn fmt_attachments(marks: &[MarkAttachment]) -> String {
    if marks.is_empty() {
        return "<anchor NULL>".to_string();
    }
    let parts: Vec<String> = marks.iter().map(ToString::to_string).collect();
    parts.join(" ")
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Position {
    Pair {
        first: GlyphSelector,
        second: GlyphSelector,
        value: ValueRecord,
        /// `enum pos`, expanding a class against a single glyph
        enumerated: bool,
    },
    MarkBase {
        base: GlyphName,
        marks: Vec<MarkAttachment>,
    },
    /// One attachment list per ligature component
    MarkLigature {
        ligature: GlyphName,
        components: Vec<Vec<MarkAttachment>>,
    },
    MarkMark {
        base: GlyphName,
        marks: Vec<MarkAttachment>,
    },
    Cursive {
        glyph: GlyphName,
        entry: Option<Anchor>,
        exit: Option<Anchor>,
    },
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Position::Pair {
                first,
                second,
                value,
                enumerated,
            } => {
                let prefix = if *enumerated { "enum " } else { "" };
                write!(f, "{prefix}pos {first} {second} {value};")
            }
            Position::MarkBase { base, marks } => {
                write!(f, "pos base {base} {};", fmt_attachments(marks))
            }
            Position::MarkLigature {
                ligature,
                components,
            } => {
                let parts: Vec<String> = components.iter().map(|c| fmt_attachments(c)).collect();
                write!(f, "pos ligature {ligature} {};", parts.join(" ligComponent "))
            }
            Position::MarkMark { base, marks } => {
                write!(f, "pos mark {base} {};", fmt_attachments(marks))
            }
            Position::Cursive { glyph, entry, exit } => write!(
                f,
                "pos cursive {glyph} {} {};",
                fmt_optional_anchor(*entry),
                fmt_optional_anchor(*exit)
            ),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Substitution {
    /// One glyph for one glyph; a class target with a single replacement maps
    /// every target to it
    Single {
        target: Vec<GlyphName>,
        replacement: Vec<GlyphName>,
    },
    Multiple {
        target: GlyphName,
        replacement: Vec<GlyphName>,
    },
    Alternate {
        target: GlyphName,
        alternates: Vec<GlyphName>,
    },
    Ligature {
        components: Vec<GlyphName>,
        ligature: GlyphName,
    },
}

impl Substitution {
    pub fn single(target: impl Into<GlyphName>, replacement: impl Into<GlyphName>) -> Self {
        Substitution::Single {
            target: vec![target.into()],
            replacement: vec![replacement.into()],
        }
    }

    pub fn ligature(
        components: impl IntoIterator<Item = impl Into<GlyphName>>,
        ligature: impl Into<GlyphName>,
    ) -> Self {
        Substitution::Ligature {
            components: components.into_iter().map(Into::into).collect(),
            ligature: ligature.into(),
        }
    }
}

fn fmt_glyph_or_list(glyphs: &[GlyphName]) -> String {
    match glyphs {
        [single] => single.to_string(),
        _ => fmt_glyph_list(glyphs),
    }
}

fn fmt_sequence(glyphs: &[GlyphName]) -> String {
    let names: Vec<&str> = glyphs.iter().map(GlyphName::as_str).collect();
    names.join(" ")
}

impl Display for Substitution {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Substitution::Single {
                target,
                replacement,
            } => write!(
                f,
                "sub {} by {};",
                fmt_glyph_or_list(target),
                fmt_glyph_or_list(replacement)
            ),
            Substitution::Multiple {
                target,
                replacement,
            } => write!(f, "sub {target} by {};", fmt_sequence(replacement)),
            Substitution::Alternate { target, alternates } => {
                write!(f, "sub {target} from {};", fmt_glyph_list(alternates))
            }
            Substitution::Ligature {
                components,
                ligature,
            } => write!(f, "sub {} by {ligature};", fmt_sequence(components)),
        }
    }
}

// ============================================================================
// Statements and blocks
// ============================================================================

/// A named block: `feature kern { ... } kern;`, a lookup or a table
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Block {
    pub name: String,
    pub statements: Vec<Statement>,
}

impl Block {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            statements: Vec::new(),
        }
    }

    pub fn push(&mut self, statement: impl Into<Statement>) {
        self.statements.push(statement.into());
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Statement {
    /// A `#` comment; an empty comment renders as a blank line
    Comment(String),
    LanguageSystem { script: Tag, language: Tag },
    ClassDefinition(GlyphClassDefinition),
    MarkClass(MarkClassDefinition),
    Feature(Block),
    Lookup(Block),
    Table(Block),
    LookupFlag(LookupFlag),
    LookupReference(String),
    Script(Tag),
    Language(Tag),
    Position(Position),
    Substitution(Substitution),
    GlyphClassDef(GlyphClassDef),
    LigatureCaretByPos { glyph: GlyphName, carets: Vec<i32> },
}

impl From<Position> for Statement {
    fn from(value: Position) -> Self {
        Statement::Position(value)
    }
}

impl From<Substitution> for Statement {
    fn from(value: Substitution) -> Self {
        Statement::Substitution(value)
    }
}

impl From<LookupFlag> for Statement {
    fn from(value: LookupFlag) -> Self {
        Statement::LookupFlag(value)
    }
}

impl From<GlyphClassDefinition> for Statement {
    fn from(value: GlyphClassDefinition) -> Self {
        Statement::ClassDefinition(value)
    }
}

impl From<MarkClassDefinition> for Statement {
    fn from(value: MarkClassDefinition) -> Self {
        Statement::MarkClass(value)
    }
}

impl Statement {
    pub fn language_system(script: Tag, language: Tag) -> Self {
        Statement::LanguageSystem { script, language }
    }

    /// Child statements of a block statement
    pub fn children(&self) -> &[Statement] {
        match self {
            Statement::Feature(block) | Statement::Lookup(block) | Statement::Table(block) => {
                &block.statements
            }
            _ => &[],
        }
    }

    fn render(&self, out: &mut String, depth: usize) {
        let indent = INDENT.repeat(depth);
        let (keyword, block) = match self {
            Statement::Feature(block) => ("feature", block),
            Statement::Lookup(block) => ("lookup", block),
            Statement::Table(block) => ("table", block),
            Statement::Comment(text) if text.is_empty() => {
                out.push('\n');
                return;
            }
            other => {
                out.push_str(&indent);
                out.push_str(&other.line());
                out.push('\n');
                return;
            }
        };
        out.push_str(&format!("{indent}{keyword} {} {{\n", block.name));
        for statement in &block.statements {
            statement.render(out, depth + 1);
        }
        out.push_str(&format!("{indent}}} {};\n", block.name));
    }

    fn line(&self) -> String {
        match self {
            Statement::Comment(text) => format!("# {text}"),
            Statement::LanguageSystem { script, language } => {
                format!("languagesystem {} {};", fmt_tag(*script), fmt_tag(*language))
            }
            Statement::ClassDefinition(def) => def.to_string(),
            Statement::MarkClass(def) => def.to_string(),
            Statement::LookupFlag(flag) => flag.to_string(),
            Statement::LookupReference(name) => format!("lookup {name};"),
            Statement::Script(tag) => format!("script {};", fmt_tag(*tag)),
            Statement::Language(tag) => format!("language {};", fmt_tag(*tag)),
            Statement::Position(rule) => rule.to_string(),
            Statement::Substitution(rule) => rule.to_string(),
            Statement::GlyphClassDef(def) => def.to_string(),
            Statement::LigatureCaretByPos { glyph, carets } => {
                let carets: Vec<String> = carets.iter().map(ToString::to_string).collect();
                format!("LigatureCaretByPos {glyph} {};", carets.join(" "))
            }
            Statement::Feature(_) | Statement::Lookup(_) | Statement::Table(_) => String::new(),
        }
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.render(&mut out, 0);
        f.write_str(out.trim_end_matches('\n'))
    }
}

// ============================================================================
// Feature file
// ============================================================================

/// A feature file: top-level statements in source order
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FeatureFile {
    pub statements: Vec<Statement>,
}

impl FeatureFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, statement: impl Into<Statement>) {
        self.statements.push(statement.into());
    }

    pub fn extend(&mut self, statements: impl IntoIterator<Item = Statement>) {
        self.statements.extend(statements);
    }

    /// Every statement, depth first
    pub fn walk(&self) -> Vec<&Statement> {
        let mut out = Vec::new();
        let mut stack: Vec<&Statement> = self.statements.iter().rev().collect();
        while let Some(statement) = stack.pop() {
            out.push(statement);
            stack.extend(statement.children().iter().rev());
        }
        out
    }

    pub fn has_feature(&self, tag: &str) -> bool {
        self.statements
            .iter()
            .any(|s| matches!(s, Statement::Feature(block) if block.name == tag))
    }

    pub fn has_table(&self, tag: &str) -> bool {
        self.table(tag).is_some()
    }

    pub fn table(&self, tag: &str) -> Option<&Block> {
        self.statements.iter().find_map(|s| match s {
            Statement::Table(block) if block.name == tag => Some(block),
            _ => None,
        })
    }

    pub fn table_mut(&mut self, tag: &str) -> Option<&mut Block> {
        self.statements.iter_mut().find_map(|s| match s {
            Statement::Table(block) if block.name == tag => Some(block),
            _ => None,
        })
    }

    pub fn language_systems(&self) -> Vec<(Tag, Tag)> {
        self.statements
            .iter()
            .filter_map(|s| match s {
                Statement::LanguageSystem { script, language } => Some((*script, *language)),
                _ => None,
            })
            .collect()
    }

    /// Languages declared per OpenType script tag, in declaration order
    pub fn languages_by_script(&self) -> IndexMap<Tag, Vec<Tag>> {
        let mut out: IndexMap<Tag, Vec<Tag>> = IndexMap::new();
        for (script, language) in self.language_systems() {
            let languages = out.entry(script).or_default();
            if !languages.contains(&language) {
                languages.push(language);
            }
        }
        out
    }

    /// Names of all glyph and mark classes defined anywhere in the file
    pub fn class_names(&self) -> BTreeSet<String> {
        self.walk()
            .into_iter()
            .filter_map(|s| match s {
                Statement::ClassDefinition(def) => Some(def.name.clone()),
                Statement::MarkClass(def) => Some(def.class_name.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn lookup_names(&self) -> BTreeSet<String> {
        self.walk()
            .into_iter()
            .filter_map(|s| match s {
                Statement::Lookup(block) => Some(block.name.clone()),
                _ => None,
            })
            .collect()
    }

    /// Mark classes defined in the file: class name to glyph anchors
    pub fn mark_classes(&self) -> IndexMap<String, IndexMap<GlyphName, Anchor>> {
        let mut out: IndexMap<String, IndexMap<GlyphName, Anchor>> = IndexMap::new();
        for statement in self.walk() {
            if let Statement::MarkClass(def) = statement {
                out.entry(def.class_name.clone())
                    .or_default()
                    .insert(def.glyph.clone(), def.anchor);
            }
        }
        out
    }

    /// The `GlyphClassDef` of the `table GDEF` block, if any
    pub fn glyph_class_def(&self) -> Option<&GlyphClassDef> {
        self.table(GDEF)?.statements.iter().find_map(|s| match s {
            Statement::GlyphClassDef(def) => Some(def),
            _ => None,
        })
    }

    /// Substitution rules anywhere in the file
    pub fn substitutions(&self) -> Vec<&Substitution> {
        self.walk()
            .into_iter()
            .filter_map(|s| match s {
                Statement::Substitution(rule) => Some(rule),
                _ => None,
            })
            .collect()
    }
}

impl Display for FeatureFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        for statement in &self.statements {
            statement.render(&mut out, 0);
        }
        f.write_str(&out)
    }
}

/// A valid class name derived from `name`, made unique against `existing`
/// by appending `_1`, `_2`, ...
pub fn make_class_name(name: &str, existing: &BTreeSet<String>) -> String {
    let base: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '.' || *c == '_')
        .collect();
    unique_name(&base, existing)
}

/// `name`, or `name_N` with the smallest N not in `existing`
pub fn unique_name(name: &str, existing: &BTreeSet<String>) -> String {
    if !existing.contains(name) {
        return name.to_string();
    }
    (1..)
        .map(|i| format!("{name}_{i}"))
        .find(|candidate| !existing.contains(candidate))
        .unwrap_or_else(|| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glyphs(names: &[&str]) -> Vec<GlyphName> {
        names.iter().map(|n| GlyphName::new(*n)).collect()
    }

    #[test]
    fn test_render_nested_blocks() {
        let mut lookup = Block::new("kern_Latn");
        lookup.push(LookupFlag::ignore_marks());
        lookup.push(Position::Pair {
            first: GlyphSelector::ClassName("kern1.Latn.V".into()),
            second: GlyphSelector::Glyph("a".into()),
            value: ValueRecord::Advance(-20),
            enumerated: true,
        });
        let mut feature = Block::new("kern");
        feature.push(Statement::Lookup(lookup));

        let mut fea = FeatureFile::new();
        fea.push(Statement::Feature(feature));
        assert_eq!(
            fea.to_string(),
            "feature kern {\n    lookup kern_Latn {\n        lookupflag IgnoreMarks;\n        \
             enum pos @kern1.Latn.V a -20;\n    } kern_Latn;\n} kern;\n"
        );
    }

    #[test]
    fn test_render_rules() {
        let mc = |x, y| MarkAttachment::new(Anchor::new(x, y), "MC_top");
        assert_eq!(
            Position::MarkLigature {
                ligature: "f_i".into(),
                components: vec![vec![mc(100, 500)], vec![mc(300, 500)]],
            }
            .to_string(),
            "pos ligature f_i <anchor 100 500> mark @MC_top ligComponent <anchor 300 500> mark @MC_top;"
        );
        assert_eq!(
            Position::Cursive {
                glyph: "a".into(),
                entry: None,
                exit: Some(Anchor::new(100, 200)),
            }
            .to_string(),
            "pos cursive a <anchor NULL> <anchor 100 200>;"
        );
        assert_eq!(ValueRecord::rtl(-15).to_string(), "<-15 0 -15 0>");
        assert_eq!(
            LookupFlag::ignore_marks().with_right_to_left(true).to_string(),
            "lookupflag RightToLeft IgnoreMarks;"
        );
    }

    #[test]
    fn test_render_gdef() {
        let def = GlyphClassDef {
            base: glyphs(&["a", "b"]),
            mark: glyphs(&["acute"]),
            ..GlyphClassDef::default()
        };
        assert_eq!(def.to_string(), "GlyphClassDef [a b], , [acute], ;");
    }

    #[test]
    fn test_queries_see_nested_statements() {
        let mut lookup = Block::new("sc");
        lookup.push(Substitution::single("a", "a.sc"));
        lookup.push(GlyphClassDefinition::new("inner", glyphs(&["x"])));
        let mut feature = Block::new("smcp");
        feature.push(Statement::Lookup(lookup));

        let mut fea = FeatureFile::new();
        fea.push(Statement::language_system(DFLT_SCRIPT, DFLT_LANGUAGE));
        fea.push(Statement::language_system(Tag::new(b"latn"), Tag::new(b"TRK ")));
        fea.push(Statement::Feature(feature));

        assert!(fea.has_feature("smcp"));
        assert!(!fea.has_feature("kern"));
        assert_eq!(fea.substitutions().len(), 1);
        assert!(fea.class_names().contains("inner"));
        assert!(fea.lookup_names().contains("sc"));
        assert_eq!(
            fea.languages_by_script()[&Tag::new(b"latn")],
            vec![Tag::new(b"TRK ")]
        );
        assert!(fea.to_string().starts_with("languagesystem DFLT dflt;\nlanguagesystem latn TRK;\n"));
    }

    #[test]
    fn test_make_class_name() {
        let existing: BTreeSet<String> = ["MC_top".to_string(), "MC_top_1".to_string()].into();
        assert_eq!(make_class_name("MC_top", &existing), "MC_top_2");
        assert_eq!(make_class_name("kern1.Latn.A-B", &existing), "kern1.Latn.AB");
    }
}
