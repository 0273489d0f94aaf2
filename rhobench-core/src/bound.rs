use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CompressionError;

/// How the tolerance of an [`ErrorBoundConfig`] is interpreted.
///
/// - **Relative**: the bound is `tolerance * (max - min)` of the input
/// - **Absolute**: the bound is `tolerance` itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorBoundMode {
    Relative,
    Absolute,
}

impl FromStr for ErrorBoundMode {
    type Err = CompressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rel" | "relative" => Ok(ErrorBoundMode::Relative),
            "abs" | "absolute" => Ok(ErrorBoundMode::Absolute),
            _ => Err(CompressionError::UnsupportedMode(s.to_string())),
        }
    }
}

impl fmt::Display for ErrorBoundMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorBoundMode::Relative => write!(f, "REL"),
            ErrorBoundMode::Absolute => write!(f, "ABS"),
        }
    }
}

/// Prediction scheme used by the codec before quantization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictorKind {
    /// 3-D Lorenzo over already coded neighbours
    #[default]
    Lorenzo,
    /// Temporal extrapolation `2·S_{t-1} - S_{t-2}`
    Linear,
}

impl FromStr for PredictorKind {
    type Err = CompressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lorenzo" => Ok(PredictorKind::Lorenzo),
            "linear" => Ok(PredictorKind::Linear),
            _ => Err(CompressionError::UnsupportedPredictor(s.to_string())),
        }
    }
}

impl fmt::Display for PredictorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredictorKind::Lorenzo => write!(f, "lorenzo"),
            PredictorKind::Linear => write!(f, "linear"),
        }
    }
}

/// Error-bound settings, fixed before compression starts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ErrorBoundConfig {
    pub mode: ErrorBoundMode,
    pub tolerance: f64,
    #[serde(default)]
    pub predictor: PredictorKind,
}

impl ErrorBoundConfig {
    pub fn new(mode: ErrorBoundMode, tolerance: f64) -> Self {
        Self {
            mode,
            tolerance,
            predictor: PredictorKind::default(),
        }
    }

    pub fn relative(tolerance: f64) -> Self {
        Self::new(ErrorBoundMode::Relative, tolerance)
    }

    pub fn absolute(tolerance: f64) -> Self {
        Self::new(ErrorBoundMode::Absolute, tolerance)
    }

    pub fn with_predictor(mut self, predictor: PredictorKind) -> Self {
        self.predictor = predictor;
        self
    }

    pub fn validate(&self) -> Result<(), CompressionError> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(CompressionError::InvalidTolerance(self.tolerance));
        }
        Ok(())
    }

    /// Absolute error allowed per element for data spanning `range`.
    pub fn absolute_bound(&self, range: f64) -> f64 {
        match self.mode {
            ErrorBoundMode::Relative => self.tolerance * range,
            ErrorBoundMode::Absolute => self.tolerance,
        }
    }
}
