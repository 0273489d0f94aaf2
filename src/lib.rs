//! # rhobench
//!
//! Benchmark for error-bounded compression on top of dense array storage.
//!
//! A run loads a `(time, x, y)` float array, stores it in container **D**,
//! compresses it, stores the compressed bytes in container **G**, reloads and
//! decompresses them, and reports:
//! - `rho = size(D) / size(G)`, the on-disk compression ratio
//! - the maximum absolute and relative reconstruction errors
//! - whether the error bound held
//!
//! The store and the compressor are injected through the
//! [`ArrayStore`](rhobench_core::ArrayStore) and
//! [`Compressor`](rhobench_core::Compressor) traits.

pub mod config;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod report;
pub mod verify;

pub use config::PipelineConfig;
pub use error::PipelineError;
pub use loader::{load_raw, save_raw};
pub use pipeline::Pipeline;
pub use report::Report;
pub use verify::{compression_ratio, verdict, verify, Verdict, Verification, SLACK};
