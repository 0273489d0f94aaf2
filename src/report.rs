use std::fmt;

use rhobench_core::ErrorBoundMode;
use serde::Serialize;

use crate::Verdict;

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Results of one benchmark run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub min: f32,
    pub max: f32,
    pub range: f64,
    /// Raw bytes over blob bytes, as reported by the compressor
    pub internal_ratio: f64,
    /// Disk usage of container D in bytes
    pub size_d: u64,
    /// Disk usage of container G in bytes
    pub size_g: u64,
    pub rho: f64,
    pub max_abs_error: f64,
    pub max_rel_error: f64,
    pub mode: ErrorBoundMode,
    pub epsilon: f64,
    pub verdict: Verdict,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "-".repeat(30);
        writeln!(
            f,
            "Data Range: {} (Min: {}, Max: {})",
            self.range, self.min, self.max
        )?;
        writeln!(f, "Internal Ratio: {:.2}", self.internal_ratio)?;
        writeln!(f, "{}", rule)?;
        writeln!(f, "Size of Array D (disk): {:.2} GB", self.size_d as f64 / GIB)?;
        writeln!(f, "Size of Array G (disk): {:.2} GB", self.size_g as f64 / GIB)?;
        writeln!(f, "Final Compression Ratio (rho): {:.4}", self.rho)?;
        writeln!(f, "{}", rule)?;
        writeln!(f, "Max Absolute Error: {}", self.max_abs_error)?;
        writeln!(f, "Max Relative Error (calc): {}", self.max_rel_error)?;
        writeln!(f, "Target Epsilon ({}): {}", self.mode, self.epsilon)?;
        write!(f, "{}", self.verdict)
    }
}
