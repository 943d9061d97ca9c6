//! Type 2 charstring programs
//!
//! A program is the optional advance width followed by `rmoveto`, `rlineto`
//! and `rrcurveto` commands and a single terminating `endchar`. No operator
//! compaction (`hlineto`, `vhcurveto`, ...) happens at this level.

use std::fmt::{self, Display, Formatter};

use kurbo::Vec2;
use log::debug;
use ufo2ot_core::{DecomposingPen, FontSource, Glyph};
use write_fonts::OtRound;

use crate::{CompileOptions, RelativeCoordinatePen, RelativeEncoder};

/// Charstring operators emitted by the compiler
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Operator {
    RMoveTo,
    RLineTo,
    RRCurveTo,
    EndChar,
}

impl Operator {
    pub fn opcode(self) -> u8 {
        match self {
            Operator::RMoveTo => 21,
            Operator::RLineTo => 5,
            Operator::RRCurveTo => 8,
            Operator::EndChar => 14,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Operator::RMoveTo => "rmoveto",
            Operator::RLineTo => "rlineto",
            Operator::RRCurveTo => "rrcurveto",
            Operator::EndChar => "endchar",
        }
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Command {
    pub operands: Vec<f64>,
    pub operator: Operator,
}

/// A finished charstring program
#[derive(Clone, Debug, PartialEq)]
pub struct CharstringProgram {
    width: Option<f64>,
    commands: Vec<Command>,
}

impl CharstringProgram {
    pub fn width(&self) -> Option<f64> {
        self.width
    }

    /// Drawing commands, ending with `endchar`
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Encode in the Type 2 binary form
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        if let Some(width) = self.width {
            encode_number(width, &mut out);
        }
        for command in &self.commands {
            for &operand in &command.operands {
                encode_number(operand, &mut out);
            }
            out.push(command.operator.opcode());
        }
        out
    }
}

impl Display for CharstringProgram {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut tokens = Vec::new();
        if let Some(width) = self.width {
            tokens.push(format_number(width));
        }
        for command in &self.commands {
            tokens.extend(command.operands.iter().map(|v| format_number(*v)));
            tokens.push(command.operator.name().to_string());
        }
        f.write_str(&tokens.join(" "))
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

fn encode_number(value: f64, out: &mut Vec<u8>) {
    if value.fract() != 0.0 || !(-32768.0..=32767.0).contains(&value) {
        let fixed = (value * 65536.0).round() as i32;
        out.push(255);
        out.extend_from_slice(&fixed.to_be_bytes());
        return;
    }
    let v = value as i32;
    match v {
        -107..=107 => out.push((v + 139) as u8),
        108..=1131 => {
            let v = v - 108;
            out.push((v / 256 + 247) as u8);
            out.push((v % 256) as u8);
        }
        -1131..=-108 => {
            let v = -v - 108;
            out.push((v / 256 + 251) as u8);
            out.push((v % 256) as u8);
        }
        _ => {
            out.push(28);
            out.extend_from_slice(&(v as i16).to_be_bytes());
        }
    }
}

/// Relative encoder accumulating a charstring program
#[derive(Debug, Clone, Default)]
pub struct CharstringCompiler {
    width: Option<f64>,
    commands: Vec<Command>,
}

impl CharstringCompiler {
    pub fn new(width: Option<f64>) -> Self {
        Self {
            width,
            commands: Vec::new(),
        }
    }

    /// A pen drawing into a new compiler; points are rounded when `round` is set
    pub fn pen(width: Option<f64>, round: bool) -> RelativeCoordinatePen<Self> {
        let width = width.map(|w| if round { OtRound::<f64>::ot_round(w) } else { w });
        RelativeCoordinatePen::new(Self::new(width)).rounded(round)
    }

    fn push(&mut self, operator: Operator, operands: Vec<f64>) {
        self.commands.push(Command { operands, operator });
    }

    /// Seal the program with `endchar`
    pub fn finish(mut self) -> CharstringProgram {
        self.push(Operator::EndChar, Vec::new());
        CharstringProgram {
            width: self.width,
            commands: self.commands,
        }
    }
}

impl RelativeEncoder for CharstringCompiler {
    fn relative_move_to(&mut self, d: Vec2) {
        self.push(Operator::RMoveTo, vec![d.x, d.y]);
    }

    fn relative_line_to(&mut self, d: Vec2) {
        self.push(Operator::RLineTo, vec![d.x, d.y]);
    }

    fn relative_curve_to(&mut self, d1: Vec2, d2: Vec2, d3: Vec2) {
        self.push(
            Operator::RRCurveTo,
            vec![d1.x, d1.y, d2.x, d2.y, d3.x, d3.y],
        );
    }
}

/// Compile one glyph, decomposing its components through `source`
pub fn compile_charstring<S: FontSource + ?Sized>(
    glyph: &Glyph,
    source: &S,
    width: Option<f64>,
    options: &CompileOptions,
) -> CharstringProgram {
    let mut pen = DecomposingPen::new(source, CharstringCompiler::pen(width, options.round));
    glyph.draw(&mut pen);
    let program = pen.into_inner().into_encoder().finish();
    debug!(
        "compiled '{}' into {} charstring command(s)",
        glyph.name,
        program.commands.len()
    );
    program
}
