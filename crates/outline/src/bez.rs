//! The bez outline format
//!
//! Bez is a line-oriented text format of relative drawing instructions, one
//! instruction per line with its operands first:
//!
//! ```text
//! sc
//! 10 20 rmt
//! 100 hdt
//! 0 50 50 50 50 0 rct
//! cp
//! ed
//! ```
//!
//! The encoder picks the shortest spelling for each segment. The decoder
//! replays instructions onto any pen as absolute coordinates and skips hint,
//! subroutine and dot-section instructions it does not interpret.

use kurbo::{Point, Vec2};
use log::debug;
use ufo2ot_core::{DecomposingPen, FontSource, Glyph, OutlinePen};

use crate::{Error, RelativeCoordinatePen, RelativeEncoder, Result};

// ============================================================================
// Encoder
// ============================================================================

/// Relative encoder producing bez instructions
#[derive(Debug, Clone, Default)]
pub struct BezEncoder {
    output: Vec<String>,
    // something was drawn since the last move
    drawn: bool,
}

impl BezEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A pen drawing into a new encoder; points are rounded to integers
    pub fn pen() -> RelativeCoordinatePen<Self> {
        RelativeCoordinatePen::new(Self::new()).rounded(true)
    }

    /// The bez text: `sc` when anything was drawn, the instructions, then `ed`
    pub fn to_bez(&self) -> String {
        let mut lines: Vec<&str> = Vec::with_capacity(self.output.len() + 2);
        if !self.output.is_empty() {
            lines.push("sc");
        }
        lines.extend(self.output.iter().map(String::as_str));
        lines.push("ed\n");
        lines.join("\n")
    }

    fn emit(&mut self, line: String) {
        self.output.push(line);
    }
}

fn int(value: f64) -> i64 {
    value as i64
}

impl RelativeEncoder for BezEncoder {
    fn relative_move_to(&mut self, d: Vec2) {
        self.drawn = false;
        let (x, y) = (int(d.x), int(d.y));
        let line = if x == 0 && y != 0 {
            format!("{y} vmt")
        } else if y == 0 && x != 0 {
            format!("{x} hmt")
        } else {
            format!("{x} {y} rmt")
        };
        self.emit(line);
    }

    fn relative_line_to(&mut self, d: Vec2) {
        self.drawn = true;
        let (x, y) = (int(d.x), int(d.y));
        let line = if x == 0 {
            format!("{y} vdt")
        } else if y == 0 {
            format!("{x} hdt")
        } else {
            format!("{x} {y} rdt")
        };
        self.emit(line);
    }

    fn relative_curve_to(&mut self, d1: Vec2, d2: Vec2, d3: Vec2) {
        self.drawn = true;
        let (x1, y1) = (int(d1.x), int(d1.y));
        let (x2, y2) = (int(d2.x), int(d2.y));
        let (x3, y3) = (int(d3.x), int(d3.y));
        let line = if x1 == 0 && y3 == 0 {
            format!("{y1} {x2} {y2} {x3} vhct")
        } else if y1 == 0 && x3 == 0 {
            format!("{x1} {x2} {y2} {y3} hvct")
        } else {
            format!("{x1} {y1} {x2} {y2} {x3} {y3} rct")
        };
        self.emit(line);
    }

    fn close_path(&mut self) {
        if self.drawn {
            self.emit("cp".to_string());
            self.drawn = false;
        }
    }

    fn end_path(&mut self) {
        self.close_path();
    }
}

/// Encode an outline drawn by `draw` as bez text
pub fn to_bez(draw: impl FnOnce(&mut RelativeCoordinatePen<BezEncoder>)) -> String {
    let mut pen = BezEncoder::pen();
    draw(&mut pen);
    pen.encoder().to_bez()
}

/// Encode a glyph as bez text, decomposing its components through `source`
pub fn encode_bez<S: FontSource + ?Sized>(glyph: &Glyph, source: &S) -> String {
    let mut pen = DecomposingPen::new(source, BezEncoder::pen());
    glyph.draw(&mut pen);
    pen.into_inner().into_encoder().to_bez()
}

// ============================================================================
// Decoder
// ============================================================================

// hint, subroutine and dot-section instructions
const IGNORED_TOKENS: &[&str] = &[
    "sc",
    "ed",
    "rb",
    "ry",
    "rm",
    "rv",
    "sol",
    "eol",
    "beginsubr",
    "endsubr",
    "snc",
    "enc",
    "newcolors",
    "id",
];

#[derive(Copy, Clone, PartialEq, Eq)]
enum LastToken {
    None,
    Move,
    Line,
    Curve,
    Close,
}

struct Decoder<'p, P: ?Sized> {
    pen: &'p mut P,
    last_point: Option<Point>,
    last_token: LastToken,
}

impl<P: OutlinePen + ?Sized> Decoder<'_, P> {
    fn absolute(&mut self, delta: Vec2) -> Point {
        let pt = match self.last_point {
            Some(last) => last + delta,
            None => delta.to_point(),
        };
        self.last_point = Some(pt);
        normalize(pt)
    }

    fn move_to(&mut self, delta: Vec2) {
        if self.last_token == LastToken::Move {
            self.pen.close_path();
        }
        let pt = self.absolute(delta);
        self.pen.move_to(pt);
        self.last_token = LastToken::Move;
    }

    fn line_to(&mut self, delta: Vec2) {
        let pt = self.absolute(delta);
        self.pen.line_to(pt);
        self.last_token = LastToken::Line;
    }

    fn curve_to(&mut self, d1: Vec2, d2: Vec2, d3: Vec2) {
        let p1 = self.absolute(d1);
        let p2 = self.absolute(d2);
        let p3 = self.absolute(d3);
        self.pen.curve_to(p1, p2, p3);
        self.last_token = LastToken::Curve;
    }
}

// Integral coordinates are exact in f64; only the sign of zero is dropped.
fn normalize(pt: Point) -> Point {
    Point::new(pt.x + 0.0, pt.y + 0.0)
}

fn operands(token: &str, fields: &[&str], expected: usize, line: usize) -> Result<Vec<f64>> {
    if fields.len() < expected {
        return Err(Error::MissingOperands {
            token: token.to_string(),
            line,
            expected,
            found: fields.len(),
        });
    }
    fields[..expected]
        .iter()
        .map(|field| {
            field.parse::<f64>().map_err(|_| Error::InvalidNumber {
                value: field.to_string(),
                line,
            })
        })
        .collect()
}

/// Replay bez text onto a pen using absolute coordinates
///
/// Blank lines, log lines starting with `Wrote` and comment lines starting
/// with `%` are skipped. `flex` is drawn as `rct`; `preflx1`/`preflx2` only
/// reset the position tracking. Two moves in a row close the first subpath.
/// An unknown instruction aborts decoding with [`Error::UnknownBezToken`].
pub fn draw_bez<P: OutlinePen + ?Sized>(bez: &str, pen: &mut P) -> Result<()> {
    let mut decoder = Decoder {
        pen,
        last_point: None,
        last_token: LastToken::None,
    };

    for (idx, line) in bez.lines().enumerate() {
        let line_no = idx + 1;
        if line.is_empty() || line.starts_with("Wrote") || line.starts_with('%') {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        let Some((&token, args)) = fields.split_last() else {
            continue;
        };
        if IGNORED_TOKENS.contains(&token) {
            continue;
        }
        let token = if token == "flex" { "rct" } else { token };

        match token {
            "preflx1" | "preflx2" => {
                decoder.last_point = None;
                decoder.last_token = LastToken::None;
            }
            "cp" => {
                decoder.pen.close_path();
                decoder.last_token = LastToken::Close;
            }
            "rmt" => {
                let v = operands(token, args, 2, line_no)?;
                decoder.move_to(Vec2::new(v[0], v[1]));
            }
            "vmt" => {
                let v = operands(token, args, 1, line_no)?;
                decoder.move_to(Vec2::new(0.0, v[0]));
            }
            "hmt" => {
                let v = operands(token, args, 1, line_no)?;
                decoder.move_to(Vec2::new(v[0], 0.0));
            }
            "rdt" => {
                let v = operands(token, args, 2, line_no)?;
                decoder.line_to(Vec2::new(v[0], v[1]));
            }
            "vdt" => {
                let v = operands(token, args, 1, line_no)?;
                decoder.line_to(Vec2::new(0.0, v[0]));
            }
            "hdt" => {
                let v = operands(token, args, 1, line_no)?;
                decoder.line_to(Vec2::new(v[0], 0.0));
            }
            "rct" => {
                let v = operands(token, args, 6, line_no)?;
                decoder.curve_to(
                    Vec2::new(v[0], v[1]),
                    Vec2::new(v[2], v[3]),
                    Vec2::new(v[4], v[5]),
                );
            }
            "vhct" => {
                let v = operands(token, args, 4, line_no)?;
                decoder.curve_to(
                    Vec2::new(0.0, v[0]),
                    Vec2::new(v[1], v[2]),
                    Vec2::new(v[3], 0.0),
                );
            }
            "hvct" => {
                let v = operands(token, args, 4, line_no)?;
                decoder.curve_to(
                    Vec2::new(v[0], 0.0),
                    Vec2::new(v[1], v[2]),
                    Vec2::new(0.0, v[3]),
                );
            }
            other => {
                debug!("bez decoding stopped at line {line_no}: {line}");
                return Err(Error::UnknownBezToken {
                    token: other.to_string(),
                    line: line_no,
                });
            }
        }
    }
    Ok(())
}
