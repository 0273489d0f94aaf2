use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian};
use rhobench_core::{check_payload, ArraySchema, ArrayStore, AttributeData, DataType, StoreError};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::filter::{apply_filters, reverse_filters};
use crate::fs::folder_size;
use crate::layout::TileLayout;

const SCHEMA_FILE: &str = "__schema.json";
const FRAGMENTS_DIR: &str = "__fragments";
const FRAGMENT_DIR: &str = "__0";
const PENDING_DIR: &str = ".pending";
const FRAGMENT_FILE: &str = "__fragment.json";
const ATTRIBUTE_EXT: &str = "tdb";

/// Index of the stored tiles of a fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct FragmentMeta {
    cell_count: u64,
    /// Start of each stored tile in the attribute file, followed by the file length
    offsets: Vec<u64>,
}

/// Dense arrays as directories on the local filesystem.
///
/// Layout of a container at `<path>`:
/// ```text
/// <path>/__schema.json
/// <path>/__fragments/__0/__fragment.json
/// <path>/__fragments/__0/<attribute>.tdb
/// ```
/// The attribute file holds every tile, filtered, in tile order. A write
/// builds its fragment under `__fragments/.pending` and renames it into
/// place, so a container either holds all of its cells or none of them.
/// Nothing time-dependent is recorded: writing the same data twice produces
/// byte-identical containers.
#[derive(Debug, Clone, Copy, Default)]
pub struct TileStore;

impl TileStore {
    pub fn new() -> Self {
        Self
    }

    fn attribute_file(schema: &ArraySchema) -> String {
        format!("{}.{}", schema.attribute.name, ATTRIBUTE_EXT)
    }

    fn init(path: &Path, schema: &ArraySchema) -> Result<(), StoreError> {
        fs::create_dir_all(path.join(FRAGMENTS_DIR))?;
        let json = serde_json::to_vec_pretty(schema)?;
        fs::write(path.join(SCHEMA_FILE), json)?;
        Ok(())
    }

    fn write_fragment(
        dir: &Path,
        schema: &ArraySchema,
        data: &AttributeData,
    ) -> Result<FragmentMeta, StoreError> {
        let layout = TileLayout::new(schema);
        let width = schema.attribute.dtype.size();

        let mut file = BufWriter::new(File::create(dir.join(Self::attribute_file(schema)))?);
        let mut offsets = Vec::with_capacity(layout.tile_count() + 1);
        let mut written = 0u64;
        offsets.push(written);

        for t in 0..layout.tile_count() {
            let mut tile = Vec::with_capacity(layout.tile_cells(t) * width);
            layout.for_each_run(t, |start, len| {
                tile.extend_from_slice(&data.le_bytes(start, len));
            });
            let stored = apply_filters(&schema.attribute.filters, width, tile);
            file.write_all(&stored)?;
            written += stored.len() as u64;
            offsets.push(written);
        }
        file.into_inner().map_err(|e| e.into_error())?.sync_all()?;

        let meta = FragmentMeta {
            cell_count: schema.cell_count(),
            offsets,
        };
        fs::write(dir.join(FRAGMENT_FILE), serde_json::to_vec_pretty(&meta)?)?;
        Ok(meta)
    }
}

fn check_attribute_name(name: &str) -> Result<(), StoreError> {
    if name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(StoreError::Schema(format!(
            "attribute name '{}' cannot be used as a file name",
            name
        )));
    }
    Ok(())
}

fn corrupt(msg: impl Into<String>) -> StoreError {
    StoreError::Corrupt(msg.into())
}

/// Copies little-endian cells into `out` starting at cell `start`.
fn scatter(out: &mut AttributeData, start: usize, bytes: &[u8]) {
    match out {
        AttributeData::Float32(v) => {
            LittleEndian::read_f32_into(bytes, &mut v[start..start + bytes.len() / 4])
        }
        AttributeData::UInt8(v) => v[start..start + bytes.len()].copy_from_slice(bytes),
    }
}

fn zeroed(dtype: DataType, cells: usize) -> AttributeData {
    match dtype {
        DataType::Float32 => AttributeData::Float32(vec![0.0; cells]),
        DataType::UInt8 => AttributeData::UInt8(vec![0; cells]),
    }
}

impl ArrayStore for TileStore {
    fn create(&self, path: &Path, schema: &ArraySchema) -> Result<(), StoreError> {
        schema.validate()?;
        check_attribute_name(&schema.attribute.name)?;
        if fs::symlink_metadata(path).is_ok() {
            return Err(StoreError::AlreadyExists(path.to_path_buf()));
        }

        if let Err(e) = Self::init(path, schema) {
            let _ = fs::remove_dir_all(path);
            return Err(e);
        }
        debug!(path = %path.display(), cells = schema.cell_count(), "created array");
        Ok(())
    }

    fn destroy_if_exists(&self, path: &Path) -> Result<bool, StoreError> {
        match fs::symlink_metadata(path) {
            Ok(meta) if meta.is_dir() => fs::remove_dir_all(path)?,
            Ok(_) => fs::remove_file(path)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e.into()),
        }
        debug!(path = %path.display(), "removed array");
        Ok(true)
    }

    fn write_all(&self, path: &Path, data: &AttributeData) -> Result<(), StoreError> {
        let schema = self.schema(path)?;
        check_payload(&schema, data)?;

        let fragments = path.join(FRAGMENTS_DIR);
        let committed = fragments.join(FRAGMENT_DIR);
        if committed.exists() {
            return Err(StoreError::AlreadyWritten(path.to_path_buf()));
        }

        // Left over from an interrupted write
        let pending = fragments.join(PENDING_DIR);
        if pending.exists() {
            fs::remove_dir_all(&pending)?;
        }
        fs::create_dir_all(&pending)?;

        let meta = match Self::write_fragment(&pending, &schema, data) {
            Ok(meta) => meta,
            Err(e) => {
                let _ = fs::remove_dir_all(&pending);
                return Err(e);
            }
        };
        fs::rename(&pending, &committed)?;

        debug!(
            path = %path.display(),
            tiles = meta.offsets.len() - 1,
            bytes = meta.offsets.last().copied().unwrap_or(0),
            "wrote fragment"
        );
        Ok(())
    }

    fn read_all(&self, path: &Path) -> Result<AttributeData, StoreError> {
        let schema = self.schema(path)?;
        let committed = path.join(FRAGMENTS_DIR).join(FRAGMENT_DIR);
        if !committed.is_dir() {
            return Err(StoreError::NotWritten(path.to_path_buf()));
        }

        let meta: FragmentMeta =
            serde_json::from_reader(BufReader::new(File::open(committed.join(FRAGMENT_FILE))?))?;
        let layout = TileLayout::new(&schema);
        if meta.cell_count != schema.cell_count() {
            return Err(corrupt(format!(
                "fragment holds {} cells, schema has {}",
                meta.cell_count,
                schema.cell_count()
            )));
        }
        if meta.offsets.len() != layout.tile_count() + 1 {
            return Err(corrupt(format!(
                "fragment indexes {} tiles, schema has {}",
                meta.offsets.len().saturating_sub(1),
                layout.tile_count()
            )));
        }

        let attr_path = committed.join(Self::attribute_file(&schema));
        let file_len = fs::metadata(&attr_path)?.len();
        if meta.offsets.last() != Some(&file_len) {
            return Err(corrupt(format!(
                "attribute file is {} bytes, fragment expects {:?}",
                file_len,
                meta.offsets.last()
            )));
        }

        let width = schema.attribute.dtype.size();
        let mut out = zeroed(schema.attribute.dtype, schema.cell_count() as usize);
        let mut file = BufReader::new(File::open(&attr_path)?);

        for (t, bounds) in meta.offsets.windows(2).enumerate() {
            let len = bounds[1]
                .checked_sub(bounds[0])
                .ok_or_else(|| corrupt(format!("tile {} has a negative length", t)))?;
            let mut stored = vec![0u8; len as usize];
            file.read_exact(&mut stored)?;

            let tile = reverse_filters(&schema.attribute.filters, width, stored)
                .map_err(|e| corrupt(format!("tile {}: {}", t, e)))?;
            if tile.len() != layout.tile_cells(t) * width {
                return Err(corrupt(format!(
                    "tile {} decodes to {} bytes, expected {}",
                    t,
                    tile.len(),
                    layout.tile_cells(t) * width
                )));
            }

            let mut pos = 0;
            layout.for_each_run(t, |start, len| {
                let end = pos + len * width;
                scatter(&mut out, start, &tile[pos..end]);
                pos = end;
            });
        }

        Ok(out)
    }

    fn schema(&self, path: &Path) -> Result<ArraySchema, StoreError> {
        let file = match File::open(path.join(SCHEMA_FILE)) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(path.to_path_buf()))
            }
            Err(e) => return Err(e.into()),
        };
        let schema: ArraySchema = serde_json::from_reader(BufReader::new(file))?;
        schema
            .validate()
            .map_err(|e| corrupt(format!("stored schema: {}", e)))?;
        Ok(schema)
    }

    fn disk_usage(&self, path: &Path) -> Result<u64, StoreError> {
        match folder_size(path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(path.to_path_buf()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
