//! # rhobench-store
//!
//! [`ArrayStore`](rhobench_core::ArrayStore) implementations.
//!
//! - [`TileStore`]: a directory per array holding a JSON schema and one
//!   fragment of filtered tiles
//! - [`MemoryStore`]: in-process containers for tests
//!
//! [`folder_size`] measures what a container occupies on disk.

pub mod filter;
pub mod fs;
pub mod layout;
pub mod memory;
pub mod tile;

pub use filter::{apply_filters, reverse_filters, FilterError};
pub use fs::folder_size;
pub use layout::TileLayout;
pub use memory::MemoryStore;
pub use tile::TileStore;
