//! Options for the feature writers

use write_fonts::OtRound;

use crate::{Error, Result};

/// What a writer does when the feature source already defines its features
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum WriterMode {
    /// Leave existing features alone and generate only the missing ones
    #[default]
    Skip,
    /// Generate everything, adding new blocks after the existing ones
    Append,
}

/// Options for the kerning writer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernOptions {
    pub mode: WriterMode,

    /// Grid kerning values are rounded to after splitting
    pub quantization: u32,

    /// Keep kerning from applying across marks; pairs involving marks go to
    /// separate lookups
    pub ignore_marks: bool,
}

impl Default for KernOptions {
    fn default() -> Self {
        Self {
            mode: WriterMode::Skip,
            quantization: 1,
            ignore_marks: true,
        }
    }
}

impl KernOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(mut self, mode: WriterMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn quantization(mut self, step: u32) -> Self {
        self.quantization = step;
        self
    }

    pub fn ignore_marks(mut self, ignore: bool) -> Self {
        self.ignore_marks = ignore;
        self
    }
}

/// Options for the mark attachment writer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkOptions {
    pub mode: WriterMode,

    /// Grid anchor coordinates are floored to; 1 rounds to integers
    pub quantization: u32,
}

impl Default for MarkOptions {
    fn default() -> Self {
        Self {
            mode: WriterMode::Skip,
            quantization: 1,
        }
    }
}

impl MarkOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(mut self, mode: WriterMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn quantization(mut self, step: u32) -> Self {
        self.quantization = step;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CursiveOptions {
    pub mode: WriterMode,
}

impl CursiveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(mut self, mode: WriterMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Options for the GDEF writer
///
/// In append mode an existing `table GDEF` block is completed with the parts
/// it lacks instead of being left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GdefOptions {
    pub mode: WriterMode,
}

impl GdefOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(mut self, mode: WriterMode) -> Self {
        self.mode = mode;
        self
    }
}

pub(crate) fn check_quantization(step: u32) -> Result<u32> {
    if step == 0 {
        return Err(Error::InvalidQuantization(step));
    }
    Ok(step)
}

/// Round half up to the nearest multiple of `step`
pub fn quantize_round(value: f64, step: u32) -> i32 {
    let step = f64::from(step.max(1));
    (step * OtRound::<f64>::ot_round(value / step)) as i32
}

/// Floor to a multiple of `step`; a step of 1 rounds half up instead
pub fn quantize_floor(value: f64, step: u32) -> i32 {
    if step > 1 {
        let step = f64::from(step);
        (step * (value / step).floor()) as i32
    } else {
        OtRound::<f64>::ot_round(value) as i32
    }
}
