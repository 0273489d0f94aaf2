//! # rhobench-math
//!
//! Deterministic numeric helpers shared by the codec and the verifier.
//!
//! - [`QuantGrid`]: uniform quantization grid mapping `f32` values to `i64` codes
//!   and back, with a worst-case error of half a step.
//! - [`ordered_bits`] / [`from_ordered_bits`]: lossless, order-preserving integer
//!   image of an `f32` bit pattern.
//! - [`ValueRange`], [`max_abs_diff`], [`relative_error`]: the statistics used to
//!   judge whether a reconstruction respects an error bound.
//!
//! **No external dependencies** besides `thiserror` for error types.

pub mod grid;
pub mod metrics;
pub mod stats;

pub use grid::{from_ordered_bits, ordered_bits, ulp, MathError, QuantGrid, MAX_CODE};
pub use metrics::{max_abs_diff, pointwise_diff, relative_error};
pub use stats::ValueRange;
