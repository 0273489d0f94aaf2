use std::fmt;
use std::str::FromStr;

use rhobench_math::ValueRange;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Element type of a stored attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Float32,
    UInt8,
}

impl DataType {
    /// Width of one element in bytes
    pub fn size(&self) -> usize {
        match self {
            DataType::Float32 => 4,
            DataType::UInt8 => 1,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Float32 => write!(f, "float32"),
            DataType::UInt8 => write!(f, "uint8"),
        }
    }
}

/// Extents of a `(time, x, y)` array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shape3 {
    pub time: usize,
    pub x: usize,
    pub y: usize,
}

impl Shape3 {
    pub const fn new(time: usize, x: usize, y: usize) -> Self {
        Self { time, x, y }
    }

    /// Total number of elements
    pub fn len(&self) -> usize {
        self.time * self.x * self.y
    }

    /// Total number of elements, `None` on overflow
    pub fn checked_len(&self) -> Option<usize> {
        self.time.checked_mul(self.x)?.checked_mul(self.y)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of elements in one time slice
    pub fn slice_len(&self) -> usize {
        self.x * self.y
    }

    /// Row-major flat index of `(t, i, j)`
    #[inline]
    pub fn index(&self, t: usize, i: usize, j: usize) -> usize {
        (t * self.x + i) * self.y + j
    }
}

impl fmt::Display for Shape3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.time, self.x, self.y)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("Invalid shape '{0}': expected three extents such as 4000x855x1215")]
pub struct ParseShapeError(pub String);

impl FromStr for Shape3 {
    type Err = ParseShapeError;

    /// Accepts `TxXxY` or `T,X,Y`. Shapes too large to address as `f32`
    /// bytes are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(|c| c == 'x' || c == ',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(ParseShapeError(s.to_string()));
        }
        let mut dims = [0usize; 3];
        for (slot, part) in dims.iter_mut().zip(parts) {
            *slot = part.parse().map_err(|_| ParseShapeError(s.to_string()))?;
        }
        let shape = Shape3::new(dims[0], dims[1], dims[2]);
        shape
            .checked_len()
            .and_then(|n| n.checked_mul(DataType::Float32.size()))
            .ok_or_else(|| ParseShapeError(s.to_string()))?;
        Ok(shape)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArrayError {
    #[error("Shape {shape} needs {expected} elements, got {actual}")]
    LengthMismatch {
        shape: Shape3,
        expected: usize,
        actual: usize,
    },
}

/// Dense row-major `f32` array indexed by `(time, x, y)`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawArray {
    shape: Shape3,
    data: Vec<f32>,
}

impl RawArray {
    pub fn new(shape: Shape3, data: Vec<f32>) -> Result<Self, ArrayError> {
        if data.len() != shape.len() {
            return Err(ArrayError::LengthMismatch {
                shape,
                expected: shape.len(),
                actual: data.len(),
            });
        }
        Ok(Self { shape, data })
    }

    /// Array with every element set to `value`
    pub fn filled(shape: Shape3, value: f32) -> Self {
        Self {
            shape,
            data: vec![value; shape.len()],
        }
    }

    /// Builds an array by evaluating `f(t, i, j)` in row-major order.
    pub fn from_fn(shape: Shape3, mut f: impl FnMut(usize, usize, usize) -> f32) -> Self {
        let mut data = Vec::with_capacity(shape.len());
        for t in 0..shape.time {
            for i in 0..shape.x {
                for j in 0..shape.y {
                    data.push(f(t, i, j));
                }
            }
        }
        Self { shape, data }
    }

    pub fn shape(&self) -> Shape3 {
        self.shape
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn into_data(self) -> Vec<f32> {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Logical size in bytes (`len * 4`)
    pub fn nbytes(&self) -> usize {
        self.data.len() * DataType::Float32.size()
    }

    /// Time slice `t` as a row-major `x * y` slice.
    pub fn slice(&self, t: usize) -> &[f32] {
        let n = self.shape.slice_len();
        &self.data[t * n..(t + 1) * n]
    }

    /// Min/max over finite elements, `None` if there are none.
    pub fn value_range(&self) -> Option<ValueRange> {
        ValueRange::of(&self.data)
    }
}
