//! Kerning: group cleanup, script splitting and the `kern`/`dist` writer

pub mod splitter;
mod writer;

pub use splitter::{
    GlyphScripts, KernSide, KerningGroups, KerningPair, get_and_split_kerning_data, kerning_pairs,
    split_base_and_mark_pairs, split_kerning,
};
pub use writer::KernFeatureWriter;
