use std::result;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Font(#[from] ufo2ot_core::Error),

    #[error("unknown feature writer '{0}'")]
    UnknownWriter(String),

    #[error("quantization step must be a positive integer, got {0}")]
    InvalidQuantization(u32),
}

pub type Result<T> = result::Result<T, Error>;
