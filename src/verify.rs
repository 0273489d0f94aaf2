use std::fmt;

use rhobench_core::{ErrorBoundConfig, ErrorBoundMode, RawArray};
use rhobench_math::{max_abs_diff, relative_error, MathError};
use serde::Serialize;

/// Floating-point slack allowed on top of the tolerance
pub const SLACK: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Success,
    Warning,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Success => write!(f, "SUCCESS: Error bound satisfied."),
            Verdict::Warning => write!(f, "WARNING: Error bound NOT satisfied."),
        }
    }
}

/// Outcome of comparing a reconstruction against its original.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verification {
    pub max_abs_error: f64,
    pub max_rel_error: f64,
    pub verdict: Verdict,
}

/// `size_d / size_g`; infinite when G is empty.
pub fn compression_ratio(size_d: u64, size_g: u64) -> f64 {
    if size_g == 0 {
        return f64::INFINITY;
    }
    size_d as f64 / size_g as f64
}

/// Success when the error the bound constrains stays within tolerance + [`SLACK`].
///
/// Relative mode checks `max_rel_error`, absolute mode checks `max_abs_error`.
pub fn verdict(bound: &ErrorBoundConfig, max_abs_error: f64, max_rel_error: f64) -> Verdict {
    let observed = match bound.mode {
        ErrorBoundMode::Relative => max_rel_error,
        ErrorBoundMode::Absolute => max_abs_error,
    };
    if observed <= bound.tolerance + SLACK {
        Verdict::Success
    } else {
        Verdict::Warning
    }
}

/// Compares `reconstructed` against `original`, whose finite values span `range`.
pub fn verify(
    original: &RawArray,
    reconstructed: &RawArray,
    range: f64,
    bound: &ErrorBoundConfig,
) -> Result<Verification, MathError> {
    let max_abs_error = max_abs_diff(original.data(), reconstructed.data())?;
    let max_rel_error = relative_error(max_abs_error, range);
    Ok(Verification {
        max_abs_error,
        max_rel_error,
        verdict: verdict(bound, max_abs_error, max_rel_error),
    })
}
