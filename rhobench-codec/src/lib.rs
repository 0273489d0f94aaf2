//! # rhobench-codec
//!
//! Error-bounded lossy compression of `(time, x, y)` float arrays.
//!
//! Key types:
//! - [`ErrorBoundedCompressor`]: the [`Compressor`](rhobench_core::Compressor) implementation
//!   (grid quantization + prediction + residual coding, SZ style)
//! - [`LorenzoPredictor`]: 3-D Lorenzo prediction over already coded neighbours
//! - [`LinearPredictor`]: temporal extrapolation `2·S_t - S_{t-1}`
//! - [`ResidualWriter`] / [`ResidualReader`]: adaptive block Rice coding of residuals

pub mod error_bounded;
pub mod format;
pub mod predictor;
pub mod residual;

pub use error_bounded::ErrorBoundedCompressor;
pub use format::{BlobHeader, CodingMode};
pub use predictor::{make_predictor, LinearPredictor, LorenzoPredictor, Predictor};
pub use residual::{ResidualReader, ResidualWriter};
