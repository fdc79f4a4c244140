//! Defines the command line parameters which configure the analysis.
use crate::pulse_analysis::{AnalysisSettings, Real, WindowMargins};
use clap::{Parser, ValueEnum};
use strum::Display;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub(crate) enum ParameterError {
    #[error("Baseline duration must be positive and finite, got {0}")]
    BaselineDuration(Real),
    #[error("{side} margin must be non-negative and finite, got {value}")]
    Margin { side: &'static str, value: Real },
}

/// Selects the integration window margins suited to the radiation source.
#[derive(Default, Debug, Clone, Copy, PartialEq, ValueEnum, Display)]
#[strum(serialize_all = "kebab-case")]
pub(crate) enum MarginPreset {
    /// 1 ns before and 10 ns after the typical pulse arrival time.
    #[default]
    Standard,
    /// 10 ns before and 100 ns after, for the long pulses of a sodium-22 source.
    SodiumSource,
}

impl MarginPreset {
    pub(crate) fn margins(self) -> WindowMargins {
        match self {
            Self::Standard => WindowMargins::STANDARD,
            Self::SodiumSource => WindowMargins::SODIUM_SOURCE,
        }
    }
}

/// Encapsulates the parameters of the waveform analysis.
#[derive(Debug, Clone, Parser)]
pub(crate) struct AnalysisParameters {
    /// Length, in nanoseconds, of the pulse-free start of each waveform used to estimate the noise.
    #[clap(long, env, default_value = "10")]
    pub(crate) baseline_duration: Real,

    /// Integration window margins.
    #[clap(long, value_enum, default_value_t)]
    pub(crate) margins: MarginPreset,

    /// Overrides the preset's margin before the pulse arrival time, in nanoseconds.
    #[clap(long)]
    pub(crate) left_margin: Option<Real>,

    /// Overrides the preset's margin after the pulse arrival time, in nanoseconds.
    #[clap(long)]
    pub(crate) right_margin: Option<Real>,
}

fn validate_margin(side: &'static str, value: Real) -> Result<Real, ParameterError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ParameterError::Margin { side, value })
    }
}

impl AnalysisParameters {
    pub(crate) fn settings(&self) -> Result<AnalysisSettings, ParameterError> {
        if !(self.baseline_duration.is_finite() && self.baseline_duration > 0.0) {
            return Err(ParameterError::BaselineDuration(self.baseline_duration));
        }
        let preset = self.margins.margins();
        Ok(AnalysisSettings {
            baseline_duration: self.baseline_duration,
            margins: WindowMargins {
                left: validate_margin("Left", self.left_margin.unwrap_or(preset.left))?,
                right: validate_margin("Right", self.right_margin.unwrap_or(preset.right))?,
            },
        })
    }
}
