//! Options for charstring compilation

/// Options for charstring compilation
#[derive(Debug, Clone, PartialEq)]
pub struct CompileOptions {
    /// Round coordinates and widths half up to integers
    pub round: bool,

    /// Advance width left out of programs (the private dict's `defaultWidthX`)
    pub default_width: Option<f64>,

    /// Value subtracted from every written width (`nominalWidthX`)
    pub nominal_width: f64,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            round: true,
            default_width: None,
            nominal_width: 0.0,
        }
    }
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn round(mut self, round: bool) -> Self {
        self.round = round;
        self
    }

    pub fn default_width(mut self, width: f64) -> Self {
        self.default_width = Some(width);
        self
    }

    pub fn nominal_width(mut self, width: f64) -> Self {
        self.nominal_width = width;
        self
    }

    /// The width operand written for a glyph advance, if any
    pub fn width_operand(&self, advance: f64) -> Option<f64> {
        if self.default_width == Some(advance) {
            None
        } else {
            Some(advance - self.nominal_width)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_operand() {
        let options = CompileOptions::new().default_width(500.0).nominal_width(600.0);
        assert_eq!(options.width_operand(500.0), None);
        assert_eq!(options.width_operand(650.0), Some(50.0));
        assert_eq!(CompileOptions::new().width_operand(500.0), Some(500.0));
    }
}
