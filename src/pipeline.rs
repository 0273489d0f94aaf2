use std::path::Path;

use rhobench_core::{
    ArraySchema, ArrayStore, Attribute, AttributeData, CompressedBlob, Compressor, DataType,
    RawArray, StoreError,
};
use tracing::{debug, info};

use crate::verify::{compression_ratio, verify};
use crate::{load_raw, PipelineConfig, PipelineError, Report};

/// The benchmark: load, store D, compress, store G, reload, verify.
///
/// Each stage is public so callers can drive them one at a time.
pub struct Pipeline<S, C> {
    store: S,
    compressor: C,
    config: PipelineConfig,
}

impl<S: ArrayStore, C: Compressor> Pipeline<S, C> {
    pub fn new(store: S, compressor: C, config: PipelineConfig) -> Self {
        Self {
            store,
            compressor,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Runs every stage on the configured input file.
    pub fn run(&self) -> Result<Report, PipelineError> {
        info!("Loading data from {}...", self.config.input.display());
        let array = load_raw(&self.config.input, self.config.shape)?;
        self.run_array(array)
    }

    /// Runs every stage after loading.
    pub fn run_array(&self, array: RawArray) -> Result<Report, PipelineError> {
        let (min, max, range) = match array.value_range() {
            Some(r) => (r.min, r.max, r.span()),
            None => (f32::NAN, f32::NAN, 0.0),
        };
        info!("Data Range: {} (Min: {}, Max: {})", range, min, max);

        let array = self.store_original(array)?;
        let (blob, internal_ratio) = self.compress(&array)?;
        self.store_compressed(blob)?;

        let size_d = self.store.disk_usage(&self.config.path_d)?;
        let size_g = self.store.disk_usage(&self.config.path_g)?;
        let rho = compression_ratio(size_d, size_g);
        debug!(size_d, size_g, rho, "measured containers");

        info!("Verifying Decompression and Error Bounds...");
        let reconstructed = self.reload()?;
        let bound = self.config.error_bound();
        let check = verify(&array, &reconstructed, range, &bound)?;

        Ok(Report {
            min,
            max,
            range,
            internal_ratio,
            size_d,
            size_g,
            rho,
            max_abs_error: check.max_abs_error,
            max_rel_error: check.max_rel_error,
            mode: bound.mode,
            epsilon: bound.tolerance,
            verdict: check.verdict,
        })
    }

    /// Recreates container D and writes `array` into it. Hands the array back.
    pub fn store_original(&self, array: RawArray) -> Result<RawArray, PipelineError> {
        info!("Storing original data D in {}...", self.config.path_d.display());
        let shape = array.shape();
        let attribute = Attribute::new(self.config.attribute.as_str(), DataType::Float32)
            .with_filters(self.config.tile_filters.clone());
        let schema = ArraySchema::grid3(shape, attribute);

        self.recreate(&self.config.path_d, &schema)?;
        let payload = AttributeData::Float32(array.into_data());
        self.store.write_all(&self.config.path_d, &payload)?;

        let data = payload.into_f32().ok_or(StoreError::TypeMismatch {
            expected: DataType::Float32,
            actual: DataType::UInt8,
        })?;
        Ok(RawArray::new(shape, data)?)
    }

    pub fn compress(&self, array: &RawArray) -> Result<(CompressedBlob, f64), PipelineError> {
        let bound = self.config.error_bound();
        info!(
            "Compressing with {} predictor ({} error = {})...",
            bound.predictor, bound.mode, bound.tolerance
        );
        let (blob, ratio) = self.compressor.compress(array, &bound)?;
        info!("Internal Ratio: {:.2}", ratio);
        Ok((blob, ratio))
    }

    /// Recreates container G sized to `blob` and writes the blob into it.
    pub fn store_compressed(&self, blob: CompressedBlob) -> Result<(), PipelineError> {
        info!("Storing compressed data G in {}...", self.config.path_g.display());
        self.recreate(&self.config.path_g, &ArraySchema::bytes(blob.len()))?;
        self.store
            .write_all(&self.config.path_g, &AttributeData::UInt8(blob.into_bytes()))?;
        Ok(())
    }

    /// Reads container G back and decompresses it.
    pub fn reload(&self) -> Result<RawArray, PipelineError> {
        let stored = self.store.read_all(&self.config.path_g)?;
        let dtype = stored.dtype();
        let bytes = stored.into_u8().ok_or(StoreError::TypeMismatch {
            expected: DataType::UInt8,
            actual: dtype,
        })?;
        Ok(self
            .compressor
            .decompress(&bytes, DataType::Float32, self.config.shape)?)
    }

    fn recreate(&self, path: &Path, schema: &ArraySchema) -> Result<(), PipelineError> {
        if self.store.destroy_if_exists(path)? {
            debug!(path = %path.display(), "removed stale container");
        }
        self.store.create(path, schema)?;
        Ok(())
    }
}
