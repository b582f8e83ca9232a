//! # Base Controller Executable Parameters
//!
//! This module provides parameters for the base controller executable.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use crate::input_client::TransformMsg;

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ExecParams {
    /// Rate at which the control tick is run.
    ///
    /// Units: hertz
    pub cycle_frequency_hz: f64,

    /// If true every command is archived in the session directory.
    #[serde(default)]
    pub archive_outputs: bool,

    /// Transforms published into the frame resolver at startup, for example
    /// the mounting of the range sensor on the base.
    #[serde(default)]
    pub static_transforms: Vec<TransformMsg>,

    /// Once the input script has ended, the maximum time to keep running
    /// while the base is still moving towards its target.
    ///
    /// Units: seconds
    #[serde(default = "default_settle_timeout_s")]
    pub settle_timeout_s: f64,
}

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ExecParamsError {
    #[error("cycle_frequency_hz must be positive and finite, found {0}")]
    InvalidCycleFrequency(f64),

    #[error("settle_timeout_s must be non-negative, found {0}")]
    InvalidSettleTimeout(f64),
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl ExecParams {
    pub fn validate(&self) -> Result<(), ExecParamsError> {
        if !(self.cycle_frequency_hz > 0.0 && self.cycle_frequency_hz.is_finite()) {
            return Err(ExecParamsError::InvalidCycleFrequency(
                self.cycle_frequency_hz,
            ));
        }

        if !(self.settle_timeout_s >= 0.0) {
            return Err(ExecParamsError::InvalidSettleTimeout(self.settle_timeout_s));
        }

        Ok(())
    }

    /// Target duration of one cycle.
    ///
    /// Units: seconds
    pub fn cycle_period_s(&self) -> f64 {
        1.0 / self.cycle_frequency_hz
    }
}

fn default_settle_timeout_s() -> f64 {
    10.0
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse() {
        let p: ExecParams = util::params::from_str(
            r#"
            cycle_frequency_hz = 20.0

            [[static_transforms]]
            parent = "base_footprint"
            child = "base_laser"
            translation_m = [0.2, 0.0, 0.1]
            rotation_q = [0.0, 0.0, 0.0, 1.0]
            "#,
        )
        .unwrap();

        assert!(p.validate().is_ok());
        assert!(!p.archive_outputs);
        assert!((p.cycle_period_s() - 0.05).abs() < 1e-12);
        assert_eq!(p.static_transforms.len(), 1);
        assert_eq!(p.static_transforms[0].child, "base_laser");
        assert_eq!(p.settle_timeout_s, 10.0);
    }

    #[test]
    fn test_invalid_frequency() {
        let p: ExecParams = util::params::from_str("cycle_frequency_hz = 0.0").unwrap();
        assert!(matches!(
            p.validate(),
            Err(ExecParamsError::InvalidCycleFrequency(_))
        ));

        let p: ExecParams = util::params::from_str(
            "cycle_frequency_hz = 10.0\nsettle_timeout_s = -1.0",
        )
        .unwrap();
        assert!(matches!(
            p.validate(),
            Err(ExecParamsError::InvalidSettleTimeout(_))
        ));
    }
}
