//! Feature writers for ufo2ot
//!
//! Each writer derives OpenType layout rules from glyph data and appends
//! them to a [`FeatureFile`]:
//!
//! - [`MarkFeatureWriter`] builds `mark` and `mkmk` from anchors
//! - [`CursiveFeatureWriter`] builds `curs` from `entry`/`exit` anchors
//! - [`KernFeatureWriter`] builds `kern` and `dist`, split by script
//! - [`GdefFeatureWriter`] builds `table GDEF` from categories and carets
//!
//! Writers leave features the feature file already defines alone unless
//! configured to append. [`write_features`] runs a writer list in order,
//! GSUB writers first.
//!
//! # Example
//!
//! ```
//! use ufo2ot_core::{Anchor, BuiltinUnicode, Font, Glyph};
//! use ufo2ot_features::{FeatureFile, default_writers, write_features};
//!
//! let font = Font::new()
//!     .with_glyph(Glyph::new("a").with_codepoint('a').with_anchor(Anchor::new("top", 250.0, 500.0)))
//!     .with_glyph(Glyph::new("acutecomb").with_anchor(Anchor::new("_top", 100.0, 450.0)));
//!
//! let mut fea = FeatureFile::new();
//! let outcomes = write_features(&font, &BuiltinUnicode, &mut fea, &default_writers()).unwrap();
//! assert!(outcomes.iter().any(|o| o.name == "MarkFeatureWriter" && o.wrote));
//! assert!(fea.has_feature("mark"));
//! ```

pub mod ast;
mod closure;
mod cursive;
mod error;
mod gdef;
pub mod kern;
mod mark;
mod options;
mod registry;
mod writer;

pub use ast::FeatureFile;
pub use closure::{SubstitutionClosure, classify_glyphs};
pub use cursive::CursiveFeatureWriter;
pub use error::{Error, Result};
pub use gdef::GdefFeatureWriter;
pub use kern::KernFeatureWriter;
pub use mark::{AnchorLists, AnchorPair, LigatureAnchorPair, MarkFeatureWriter, anchor_pairs};
pub use options::{
    CursiveOptions, GdefOptions, KernOptions, MarkOptions, WriterMode, quantize_floor,
    quantize_round,
};
pub use registry::{
    WriterFactory, WriterKind, WriterOutcome, WriterRegistry, default_writers, write_features,
};
pub use writer::{FeatureWriter, GDEF, GPOS, GSUB, GdefClasses, WriterContext};
