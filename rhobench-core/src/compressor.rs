use thiserror::Error;

use crate::{DataType, ErrorBoundConfig, RawArray, Shape3};

#[derive(Error, Debug)]
pub enum CompressionError {
    #[error("Unsupported error bound mode '{0}'")]
    UnsupportedMode(String),
    #[error("Unsupported predictor '{0}'")]
    UnsupportedPredictor(String),
    #[error("Invalid error tolerance {0}")]
    InvalidTolerance(f64),
    #[error("Cannot compress an empty array")]
    EmptyArray,
    #[error("Extent {0} does not fit the blob header")]
    ShapeTooLarge(usize),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum DecompressionError {
    #[error("Bad magic bytes, not a compressed blob")]
    BadMagic,
    #[error("Unsupported blob version {0}")]
    UnsupportedVersion(u8),
    #[error("Unknown coding mode {0}")]
    UnknownMode(u8),
    #[error("Unknown predictor {0}")]
    UnknownPredictor(u8),
    #[error("Blob truncated")]
    Truncated,
    #[error("Blob holds shape {header}, caller asked for {requested}")]
    ShapeMismatch { header: Shape3, requested: Shape3 },
    #[error("Unsupported element type {0}")]
    UnsupportedType(DataType),
    #[error("{0} trailing bytes after blob")]
    TrailingBytes(usize),
    #[error("Corrupt residual stream: {0}")]
    CorruptStream(String),
    #[error("Outlier index {0} out of range")]
    OutlierOutOfRange(u64),
}

/// Opaque compressed byte sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedBlob {
    bytes: Vec<u8>,
}

impl CompressedBlob {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Error-bounded lossy compressor.
///
/// Contract: after `decompress(compress(a, cfg))`, every element differs from
/// the original by at most `cfg.absolute_bound(range(a))`.
pub trait Compressor {
    /// Returns the blob together with the compressor's own ratio
    /// (logical size / compressed size), which is informational only.
    fn compress(
        &self,
        array: &RawArray,
        config: &ErrorBoundConfig,
    ) -> Result<(CompressedBlob, f64), CompressionError>;

    fn decompress(
        &self,
        bytes: &[u8],
        dtype: DataType,
        shape: Shape3,
    ) -> Result<RawArray, DecompressionError>;
}
