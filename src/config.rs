use std::path::PathBuf;

use rhobench_core::{ErrorBoundConfig, ErrorBoundMode, PredictorKind, Shape3, TileFilter};

pub const DEFAULT_INPUT: &str = "Redsea_t2_4k_gan.dat";
pub const DEFAULT_SHAPE: Shape3 = Shape3::new(4000, 855, 1215);
pub const DEFAULT_PATH_D: &str = "arrayD";
pub const DEFAULT_PATH_G: &str = "arrayG";
pub const DEFAULT_ATTRIBUTE: &str = "temp";
pub const DEFAULT_EPSILON: f64 = 1e-2;

/// Everything a benchmark run needs to know up front.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Flat little-endian `f32` file, row-major `(time, x, y)`
    pub input: PathBuf,
    pub shape: Shape3,
    /// Container for the original array
    pub path_d: PathBuf,
    /// Container for the compressed bytes
    pub path_g: PathBuf,
    /// Attribute name of container D
    pub attribute: String,
    pub epsilon: f64,
    pub mode: ErrorBoundMode,
    pub predictor: PredictorKind,
    /// Storage filters for container D
    pub tile_filters: Vec<TileFilter>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            shape: DEFAULT_SHAPE,
            path_d: PathBuf::from(DEFAULT_PATH_D),
            path_g: PathBuf::from(DEFAULT_PATH_G),
            attribute: DEFAULT_ATTRIBUTE.to_string(),
            epsilon: DEFAULT_EPSILON,
            mode: ErrorBoundMode::Relative,
            predictor: PredictorKind::default(),
            tile_filters: Vec::new(),
        }
    }
}

impl PipelineConfig {
    pub fn error_bound(&self) -> ErrorBoundConfig {
        ErrorBoundConfig::new(self.mode, self.epsilon).with_predictor(self.predictor)
    }
}
