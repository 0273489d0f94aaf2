//! # rhobench-core
//!
//! Core types and trait seams for the error-bounded compression benchmark.
//!
//! This crate defines the two collaborator traits:
//! - [`Compressor`]: error-bounded lossy compression of a [`RawArray`] into a
//!   [`CompressedBlob`] and back
//! - [`ArrayStore`]: dense, schema-typed array containers on persistent storage
//!
//! Also provides the data model shared by every stage: [`Shape3`], [`RawArray`],
//! [`ErrorBoundConfig`] and the container [`ArraySchema`].

pub mod array;
pub mod bound;
pub mod compressor;
pub mod schema;
pub mod store;

pub use array::{ArrayError, DataType, ParseShapeError, RawArray, Shape3};
pub use bound::{ErrorBoundConfig, ErrorBoundMode, PredictorKind};
pub use compressor::{CompressedBlob, CompressionError, Compressor, DecompressionError};
pub use schema::{ArraySchema, Attribute, Dimension, TileFilter};
pub use store::{check_payload, ArrayStore, AttributeData, StoreError};
