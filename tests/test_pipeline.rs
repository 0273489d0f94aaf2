// End-to-end runs of the benchmark pipeline
// (loader + TileStore/MemoryStore + ErrorBoundedCompressor + verifier)
use std::fs;
use std::path::Path;

use proptest::prelude::*;
use rhobench::{save_raw, Pipeline, PipelineConfig, PipelineError, Verdict};
use rhobench_codec::ErrorBoundedCompressor;
use rhobench_core::{
    CompressedBlob, CompressionError, Compressor, DataType, DecompressionError, ErrorBoundConfig,
    ErrorBoundMode, RawArray, Shape3, TileFilter,
};
use rhobench_store::{folder_size, MemoryStore, TileStore};

fn smooth(shape: Shape3) -> RawArray {
    RawArray::from_fn(shape, |t, i, j| {
        25.0 + (t as f32 * 0.1).sin() + (i as f32 * 0.2).cos() * (j as f32 * 0.15).sin()
    })
}

fn disk_config(dir: &Path, shape: Shape3) -> PipelineConfig {
    PipelineConfig {
        input: dir.join("field.dat"),
        shape,
        path_d: dir.join("arrayD"),
        path_g: dir.join("arrayG"),
        ..PipelineConfig::default()
    }
}

/// Stores raw little-endian floats and returns them unchanged, shifted by `bias`.
struct RawCompressor {
    bias: f32,
}

impl Compressor for RawCompressor {
    fn compress(
        &self,
        array: &RawArray,
        _: &ErrorBoundConfig,
    ) -> Result<(CompressedBlob, f64), CompressionError> {
        let bytes = array
            .data()
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        Ok((CompressedBlob::new(bytes), 1.0))
    }

    fn decompress(
        &self,
        bytes: &[u8],
        _: DataType,
        shape: Shape3,
    ) -> Result<RawArray, DecompressionError> {
        let data = bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]) + self.bias)
            .collect();
        RawArray::new(shape, data).map_err(|_| DecompressionError::Truncated)
    }
}

/// Keeps one value in ten, reconstructs by repetition.
struct DecimatingCompressor;

impl Compressor for DecimatingCompressor {
    fn compress(
        &self,
        array: &RawArray,
        _: &ErrorBoundConfig,
    ) -> Result<(CompressedBlob, f64), CompressionError> {
        let bytes: Vec<u8> = array
            .data()
            .iter()
            .step_by(10)
            .flat_map(|v| v.to_le_bytes())
            .collect();
        let ratio = array.nbytes() as f64 / bytes.len() as f64;
        Ok((CompressedBlob::new(bytes), ratio))
    }

    fn decompress(
        &self,
        bytes: &[u8],
        _: DataType,
        shape: Shape3,
    ) -> Result<RawArray, DecompressionError> {
        let kept: Vec<f32> = bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        let data = (0..shape.len()).map(|i| kept[i / 10]).collect();
        RawArray::new(shape, data).map_err(|_| DecompressionError::Truncated)
    }
}

#[test]
fn test_full_run_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let shape = Shape3::new(8, 24, 24);
    let config = disk_config(dir.path(), shape);
    save_raw(&config.input, &smooth(shape)).unwrap();

    let pipeline = Pipeline::new(TileStore::new(), ErrorBoundedCompressor::new(), config.clone());
    let report = pipeline.run().unwrap();

    assert_eq!(report.verdict, Verdict::Success);
    assert!(report.max_rel_error <= 1e-2 + 1e-9);
    assert!(report.rho > 1.0, "rho {}", report.rho);
    assert_eq!(report.size_d, folder_size(&config.path_d).unwrap());
    assert_eq!(report.size_g, folder_size(&config.path_g).unwrap());
    assert_eq!(report.rho, report.size_d as f64 / report.size_g as f64);
}

#[test]
fn test_missing_input_is_data_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let config = disk_config(dir.path(), Shape3::new(2, 2, 2));
    let pipeline = Pipeline::new(TileStore::new(), ErrorBoundedCompressor::new(), config.clone());

    assert!(matches!(
        pipeline.run(),
        Err(PipelineError::DataNotFound(p)) if p == config.input
    ));
    // Nothing was created
    assert!(!config.path_d.exists());
    assert!(!config.path_g.exists());
}

#[test]
fn test_rerun_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let shape = Shape3::new(4, 10, 12);
    let config = disk_config(dir.path(), shape);
    save_raw(&config.input, &smooth(shape)).unwrap();

    let pipeline = Pipeline::new(TileStore::new(), ErrorBoundedCompressor::new(), config.clone());
    let first = pipeline.run().unwrap();
    let g_first = fs::read(config.path_g.join("__fragments/__0/bytes.tdb")).unwrap();

    let second = pipeline.run().unwrap();
    let g_second = fs::read(config.path_g.join("__fragments/__0/bytes.tdb")).unwrap();

    assert_eq!(first, second);
    assert_eq!(g_first, g_second);
}

#[test]
fn test_constant_array_for_any_epsilon() {
    let shape = Shape3::new(4, 4, 4);
    for eps in [0.0, 1e-6, 1e-2, 0.5] {
        let config = PipelineConfig {
            shape,
            epsilon: eps,
            ..PipelineConfig::default()
        };
        let pipeline = Pipeline::new(MemoryStore::new(), ErrorBoundedCompressor::new(), config);
        let report = pipeline.run_array(RawArray::filled(shape, -3.25)).unwrap();
        assert_eq!(report.max_rel_error, 0.0);
        assert_eq!(report.verdict, Verdict::Success);
    }
}

#[test]
fn test_wrong_reconstruction_warns() {
    let shape = Shape3::new(2, 4, 4);
    let config = PipelineConfig {
        shape,
        ..PipelineConfig::default()
    };
    let pipeline = Pipeline::new(MemoryStore::new(), RawCompressor { bias: 0.5 }, config);
    let report = pipeline.run_array(smooth(shape)).unwrap();

    assert!((report.max_abs_error - 0.5).abs() < 1e-5);
    assert_eq!(report.verdict, Verdict::Warning);
}

#[test]
fn test_lossy_fake_at_zero_epsilon_warns() {
    let shape = Shape3::new(2, 5, 10);
    let config = PipelineConfig {
        shape,
        epsilon: 0.0,
        ..PipelineConfig::default()
    };
    let pipeline = Pipeline::new(MemoryStore::new(), DecimatingCompressor, config);
    let report = pipeline.run_array(smooth(shape)).unwrap();

    assert!(report.max_abs_error > 0.0);
    assert_eq!(report.verdict, Verdict::Warning);
    assert!(report.rho > 1.0);
}

#[test]
fn test_raw_blob_gives_rho_near_one() {
    let shape = Shape3::new(4, 16, 16);
    let config = PipelineConfig {
        shape,
        ..PipelineConfig::default()
    };
    let pipeline = Pipeline::new(MemoryStore::new(), RawCompressor { bias: 0.0 }, config);
    let report = pipeline.run_array(smooth(shape)).unwrap();

    assert_eq!(report.max_abs_error, 0.0);
    assert_eq!(report.verdict, Verdict::Success);
    assert!((report.rho - 1.0).abs() < 0.2, "rho {}", report.rho);
}

#[test]
fn test_random_data_lossless_never_expands() {
    let dir = tempfile::tempdir().unwrap();
    let shape = Shape3::new(8, 64, 64);
    let mut state = 0x2545_F491_4F6C_DD1Du64;
    let noise = RawArray::from_fn(shape, |_, _, _| {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        (state >> 40) as f32 / (1u64 << 24) as f32 * 2000.0 - 1000.0
    });
    let config = PipelineConfig {
        epsilon: 0.0,
        ..disk_config(dir.path(), shape)
    };
    let pipeline = Pipeline::new(TileStore::new(), ErrorBoundedCompressor::new(), config);
    let report = pipeline.run_array(noise).unwrap();

    assert_eq!(report.max_abs_error, 0.0);
    assert_eq!(report.verdict, Verdict::Success);
    assert!(report.rho >= 1.0, "rho {}", report.rho);
    assert!(report.rho < 1.01, "rho {}", report.rho);
}

#[test]
fn test_absolute_mode_and_filters() {
    let dir = tempfile::tempdir().unwrap();
    let shape = Shape3::new(6, 16, 16);
    let config = PipelineConfig {
        mode: ErrorBoundMode::Absolute,
        epsilon: 0.05,
        tile_filters: vec![TileFilter::ByteShuffle, TileFilter::Rle],
        ..disk_config(dir.path(), shape)
    };
    let pipeline = Pipeline::new(TileStore::new(), ErrorBoundedCompressor::new(), config);
    let report = pipeline.run_array(smooth(shape)).unwrap();

    assert!(report.max_abs_error <= 0.05);
    assert_eq!(report.verdict, Verdict::Success);
}

#[test]
fn test_invalid_tolerance_is_fatal() {
    let shape = Shape3::new(1, 2, 2);
    let config = PipelineConfig {
        shape,
        epsilon: -1.0,
        ..PipelineConfig::default()
    };
    let pipeline = Pipeline::new(MemoryStore::new(), ErrorBoundedCompressor::new(), config);
    assert!(matches!(
        pipeline.run_array(RawArray::filled(shape, 1.0)),
        Err(PipelineError::Compression(CompressionError::InvalidTolerance(_)))
    ));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_pipeline_meets_relative_bound(
        (shape, data) in (1usize..4, 1usize..7, 1usize..7).prop_flat_map(|(t, x, y)| {
            let shape = Shape3::new(t, x, y);
            (Just(shape), prop::collection::vec(-100.0f32..100.0, shape.len()))
        }),
        eps in 1e-4f64..0.2
    ) {
        let config = PipelineConfig { shape, epsilon: eps, ..PipelineConfig::default() };
        let pipeline = Pipeline::new(MemoryStore::new(), ErrorBoundedCompressor::new(), config);
        let report = pipeline.run_array(RawArray::new(shape, data).unwrap()).unwrap();
        prop_assert_eq!(report.verdict, Verdict::Success);
        prop_assert!(report.max_rel_error <= eps + 1e-9);
    }
}
