use std::path::{Path, PathBuf};

use byteorder::{ByteOrder, LittleEndian};
use thiserror::Error;

use crate::{ArraySchema, DataType};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid array schema: {0}")]
    Schema(String),
    #[error("Array already exists at {0}")]
    AlreadyExists(PathBuf),
    #[error("No array at {0}")]
    NotFound(PathBuf),
    #[error("Array at {0} has already been written")]
    AlreadyWritten(PathBuf),
    #[error("Array at {0} holds no data")]
    NotWritten(PathBuf),
    #[error("Attribute type mismatch: schema {expected}, data {actual}")]
    TypeMismatch { expected: DataType, actual: DataType },
    #[error("Cell count mismatch: schema {expected}, data {actual}")]
    CellCountMismatch { expected: u64, actual: u64 },
    #[error("Corrupt array: {0}")]
    Corrupt(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Metadata error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Payload of a single attribute, in row-major cell order.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeData {
    Float32(Vec<f32>),
    UInt8(Vec<u8>),
}

impl AttributeData {
    pub fn dtype(&self) -> DataType {
        match self {
            AttributeData::Float32(_) => DataType::Float32,
            AttributeData::UInt8(_) => DataType::UInt8,
        }
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        match self {
            AttributeData::Float32(v) => v.len(),
            AttributeData::UInt8(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn nbytes(&self) -> usize {
        self.len() * self.dtype().size()
    }

    /// Little-endian byte image of cells `[start, start + count)`.
    pub fn le_bytes(&self, start: usize, count: usize) -> Vec<u8> {
        match self {
            AttributeData::Float32(v) => {
                let mut out = vec![0u8; count * 4];
                LittleEndian::write_f32_into(&v[start..start + count], &mut out);
                out
            }
            AttributeData::UInt8(v) => v[start..start + count].to_vec(),
        }
    }

    pub fn into_f32(self) -> Option<Vec<f32>> {
        match self {
            AttributeData::Float32(v) => Some(v),
            AttributeData::UInt8(_) => None,
        }
    }

    pub fn into_u8(self) -> Option<Vec<u8>> {
        match self {
            AttributeData::UInt8(v) => Some(v),
            AttributeData::Float32(_) => None,
        }
    }
}

/// Dense array container on persistent storage.
///
/// Every call is self-contained: it opens what it needs and releases it before
/// returning, and either completes or leaves the container unchanged.
pub trait ArrayStore {
    /// Allocates an empty container. Fails if the schema is malformed or a
    /// container already exists at `path`.
    fn create(&self, path: &Path, schema: &ArraySchema) -> Result<(), StoreError>;

    /// Removes any container at `path`. Returns whether something was removed.
    fn destroy_if_exists(&self, path: &Path) -> Result<bool, StoreError>;

    /// Writes every cell in one transaction.
    fn write_all(&self, path: &Path, data: &AttributeData) -> Result<(), StoreError>;

    /// Reads every cell back in row-major order.
    fn read_all(&self, path: &Path) -> Result<AttributeData, StoreError>;

    fn schema(&self, path: &Path) -> Result<ArraySchema, StoreError>;

    /// Bytes the container occupies, including metadata and storage overhead.
    fn disk_usage(&self, path: &Path) -> Result<u64, StoreError>;
}

/// Checks a payload against the schema it is about to be written under.
pub fn check_payload(schema: &ArraySchema, data: &AttributeData) -> Result<(), StoreError> {
    if schema.attribute.dtype != data.dtype() {
        return Err(StoreError::TypeMismatch {
            expected: schema.attribute.dtype,
            actual: data.dtype(),
        });
    }
    let expected = schema.cell_count();
    let actual = data.len() as u64;
    if expected != actual {
        return Err(StoreError::CellCountMismatch { expected, actual });
    }
    Ok(())
}
