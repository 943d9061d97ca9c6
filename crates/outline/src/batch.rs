//! Whole-font charstring compilation

use indexmap::IndexMap;
use log::info;
use rayon::prelude::*;
use ufo2ot_core::{FontSource, GlyphName, check_component_cycles, official_glyph_order};

use crate::{CharstringProgram, CompileOptions, Result, compile_charstring};

/// Compile every glyph of a font, in final glyph order
///
/// The component graph is validated first: a cycle is reported as invalid
/// font data before any glyph is drawn. Glyphs are compiled in parallel.
pub fn compile_charstrings<S: FontSource + ?Sized>(
    source: &S,
    options: &CompileOptions,
) -> Result<IndexMap<GlyphName, CharstringProgram>> {
    check_component_cycles(source)?;

    let order = official_glyph_order(source);
    let programs: Vec<(GlyphName, CharstringProgram)> = order
        .par_iter()
        .filter_map(|name| {
            let glyph = source.glyph(name)?;
            let width = options.width_operand(glyph.width);
            Some((name.clone(), compile_charstring(glyph, source, width, options)))
        })
        .collect();

    info!("compiled {} charstring(s)", programs.len());
    Ok(programs.into_iter().collect())
}
