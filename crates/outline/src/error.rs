use std::result;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A token outside the bez vocabulary; decoding of the glyph stops
    #[error("unknown bez token '{token}' on line {line}")]
    UnknownBezToken { token: String, line: usize },

    #[error("bez token '{token}' on line {line} needs {expected} operand(s), found {found}")]
    MissingOperands {
        token: String,
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("invalid number '{value}' on line {line}")]
    InvalidNumber { value: String, line: usize },

    #[error(transparent)]
    Font(#[from] ufo2ot_core::Error),
}

pub type Result<T> = result::Result<T, Error>;
