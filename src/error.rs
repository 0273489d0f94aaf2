use std::path::PathBuf;

use rhobench_core::{ArrayError, CompressionError, DecompressionError, StoreError};
use rhobench_math::MathError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("{} not found", .0.display())]
    DataNotFound(PathBuf),
    #[error("Input is {actual} bytes, shape needs {expected}")]
    InputSize { expected: u64, actual: u64 },
    #[error("Array error: {0}")]
    Array(#[from] ArrayError),
    #[error("Compression error: {0}")]
    Compression(#[from] CompressionError),
    #[error("Decompression error: {0}")]
    Decompression(#[from] DecompressionError),
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
    #[error("Comparison error: {0}")]
    Math(#[from] MathError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
