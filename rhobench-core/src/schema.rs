use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{DataType, Shape3, StoreError};

/// Storage-level transform applied to each tile before it is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileFilter {
    /// Groups the k-th byte of every element together
    ByteShuffle,
    /// Byte-level run-length coding
    Rle,
}

/// One dimension of a dense array: an inclusive integer domain split into
/// tiles of `tile` cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    pub name: String,
    pub domain: (i64, i64),
    pub tile: u64,
}

impl Dimension {
    pub fn new(name: impl Into<String>, domain: (i64, i64), tile: u64) -> Self {
        Self {
            name: name.into(),
            domain,
            tile,
        }
    }

    /// Number of cells along this dimension (0 for an inverted domain)
    pub fn extent(&self) -> u64 {
        let (lo, hi) = self.domain;
        if hi < lo {
            0
        } else {
            (hi as i128 - lo as i128 + 1) as u64
        }
    }

    /// Number of tiles along this dimension, counting a partial edge tile
    pub fn tile_count(&self) -> u64 {
        if self.tile == 0 {
            return 0;
        }
        (self.extent() + self.tile - 1) / self.tile
    }
}

/// The single typed attribute stored in every cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub dtype: DataType,
    #[serde(default)]
    pub filters: Vec<TileFilter>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, dtype: DataType) -> Self {
        Self {
            name: name.into(),
            dtype,
            filters: Vec::new(),
        }
    }

    pub fn with_filters(mut self, filters: Vec<TileFilter>) -> Self {
        self.filters = filters;
        self
    }
}

/// Schema of a dense array container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArraySchema {
    pub dimensions: Vec<Dimension>,
    pub attribute: Attribute,
}

impl ArraySchema {
    pub fn new(dimensions: Vec<Dimension>, attribute: Attribute) -> Self {
        Self {
            dimensions,
            attribute,
        }
    }

    /// `(time, x, y) -> attr: f32`, one time step per tile.
    pub fn grid3(shape: Shape3, attribute: Attribute) -> Self {
        let dim = |name: &str, n: usize, tile: usize| {
            Dimension::new(name, (0, n as i64 - 1), tile as u64)
        };
        Self::new(
            vec![
                dim("time", shape.time, 1),
                dim("x", shape.x, shape.x),
                dim("y", shape.y, shape.y),
            ],
            attribute,
        )
    }

    /// `(index) -> bytes: u8` sized to hold exactly `len` bytes in one tile.
    pub fn bytes(len: usize) -> Self {
        Self::new(
            vec![Dimension::new("index", (0, len as i64 - 1), len as u64)],
            Attribute::new("bytes", DataType::UInt8),
        )
    }

    /// Cell extents per dimension
    pub fn extents(&self) -> Vec<u64> {
        self.dimensions.iter().map(Dimension::extent).collect()
    }

    /// Total number of cells
    pub fn cell_count(&self) -> u64 {
        self.dimensions.iter().map(Dimension::extent).product()
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        if self.dimensions.is_empty() {
            return Err(StoreError::Schema("schema has no dimensions".into()));
        }
        if self.attribute.name.is_empty() {
            return Err(StoreError::Schema("attribute name is empty".into()));
        }

        let mut names = HashSet::new();
        names.insert(self.attribute.name.as_str());
        for dim in &self.dimensions {
            if dim.name.is_empty() {
                return Err(StoreError::Schema("dimension name is empty".into()));
            }
            if !names.insert(dim.name.as_str()) {
                return Err(StoreError::Schema(format!("duplicate name '{}'", dim.name)));
            }
            let (lo, hi) = dim.domain;
            if hi < lo {
                return Err(StoreError::Schema(format!(
                    "dimension '{}' has an empty domain [{}, {}]",
                    dim.name, lo, hi
                )));
            }
            if dim.tile == 0 {
                return Err(StoreError::Schema(format!(
                    "dimension '{}' has a zero tile extent",
                    dim.name
                )));
            }
            if dim.tile > dim.extent() {
                return Err(StoreError::Schema(format!(
                    "dimension '{}' tile {} exceeds its domain extent {}",
                    dim.name,
                    dim.tile,
                    dim.extent()
                )));
            }
        }

        let cells = self
            .dimensions
            .iter()
            .try_fold(1u64, |acc, d| acc.checked_mul(d.extent()));
        if cells.is_none() {
            return Err(StoreError::Schema("cell count overflows u64".into()));
        }
        Ok(())
    }
}
