use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use rhobench_core::{check_payload, ArraySchema, ArrayStore, AttributeData, StoreError};

#[derive(Debug, Clone)]
struct Entry {
    schema: ArraySchema,
    data: Option<AttributeData>,
}

/// Containers kept in process memory, keyed by path.
///
/// Same contract as [`TileStore`](crate::TileStore). Disk usage is the size of
/// the serialized schema plus the raw payload.
#[derive(Debug, Default)]
pub struct MemoryStore {
    arrays: Mutex<HashMap<PathBuf, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<PathBuf, Entry>>, StoreError> {
        self.arrays
            .lock()
            .map_err(|_| StoreError::Corrupt("memory store lock poisoned".into()))
    }
}

impl ArrayStore for MemoryStore {
    fn create(&self, path: &Path, schema: &ArraySchema) -> Result<(), StoreError> {
        schema.validate()?;
        let mut arrays = self.lock()?;
        if arrays.contains_key(path) {
            return Err(StoreError::AlreadyExists(path.to_path_buf()));
        }
        arrays.insert(
            path.to_path_buf(),
            Entry {
                schema: schema.clone(),
                data: None,
            },
        );
        Ok(())
    }

    fn destroy_if_exists(&self, path: &Path) -> Result<bool, StoreError> {
        Ok(self.lock()?.remove(path).is_some())
    }

    fn write_all(&self, path: &Path, data: &AttributeData) -> Result<(), StoreError> {
        let mut arrays = self.lock()?;
        let entry = arrays
            .get_mut(path)
            .ok_or_else(|| StoreError::NotFound(path.to_path_buf()))?;
        check_payload(&entry.schema, data)?;
        if entry.data.is_some() {
            return Err(StoreError::AlreadyWritten(path.to_path_buf()));
        }
        entry.data = Some(data.clone());
        Ok(())
    }

    fn read_all(&self, path: &Path) -> Result<AttributeData, StoreError> {
        let arrays = self.lock()?;
        let entry = arrays
            .get(path)
            .ok_or_else(|| StoreError::NotFound(path.to_path_buf()))?;
        entry
            .data
            .clone()
            .ok_or_else(|| StoreError::NotWritten(path.to_path_buf()))
    }

    fn schema(&self, path: &Path) -> Result<ArraySchema, StoreError> {
        self.lock()?
            .get(path)
            .map(|e| e.schema.clone())
            .ok_or_else(|| StoreError::NotFound(path.to_path_buf()))
    }

    fn disk_usage(&self, path: &Path) -> Result<u64, StoreError> {
        let arrays = self.lock()?;
        let entry = arrays
            .get(path)
            .ok_or_else(|| StoreError::NotFound(path.to_path_buf()))?;
        let schema_bytes = serde_json::to_vec(&entry.schema)?.len();
        let data_bytes = entry.data.as_ref().map_or(0, AttributeData::nbytes);
        Ok((schema_bytes + data_bytes) as u64)
    }
}
