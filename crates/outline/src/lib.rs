//! Outline compilation for ufo2ot
//!
//! Glyph outlines are turned into relative drawing programs through one
//! shared pen, [`RelativeCoordinatePen`], and two encoders:
//!
//! - [`CharstringCompiler`] emits Type 2 charstring programs for CFF
//! - [`BezEncoder`] emits bez text, and [`draw_bez`] reads it back
//!
//! # Example
//!
//! ```
//! use kurbo::Point;
//! use ufo2ot_core::OutlinePen;
//! use ufo2ot_outline::CharstringCompiler;
//!
//! let mut pen = CharstringCompiler::pen(Some(500.0), true);
//! pen.move_to(Point::new(10.0, 10.0));
//! pen.line_to(Point::new(20.0, 10.0));
//! pen.close_path();
//! let program = pen.into_encoder().finish();
//! assert_eq!(program.to_string(), "500 10 10 rmoveto 10 0 rlineto endchar");
//! ```

mod batch;
mod bez;
mod charstring;
mod error;
mod options;
mod relative;

pub use batch::compile_charstrings;
pub use bez::{BezEncoder, draw_bez, encode_bez, to_bez};
pub use charstring::{CharstringCompiler, CharstringProgram, Command, Operator, compile_charstring};
pub use error::{Error, Result};
pub use options::CompileOptions;
pub use relative::{HeldMove, RelativeCoordinatePen, RelativeEncoder, round_point};
