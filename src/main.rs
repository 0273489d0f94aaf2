use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rhobench::{Pipeline, PipelineConfig, PipelineError};
use rhobench_codec::ErrorBoundedCompressor;
use rhobench_core::{ErrorBoundMode, PredictorKind, Shape3, TileFilter};
use rhobench_store::TileStore;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Flat little-endian f32 input file
    #[arg(long, default_value = rhobench::config::DEFAULT_INPUT)]
    input: PathBuf,

    /// Array shape as TIMExXxY
    #[arg(long, default_value = "4000x855x1215")]
    shape: Shape3,

    /// Container for the original array
    #[arg(long, default_value = rhobench::config::DEFAULT_PATH_D)]
    array_d: PathBuf,

    /// Container for the compressed bytes
    #[arg(long, default_value = rhobench::config::DEFAULT_PATH_G)]
    array_g: PathBuf,

    /// Attribute name of the original array
    #[arg(long, default_value = rhobench::config::DEFAULT_ATTRIBUTE)]
    attribute: String,

    /// Error bound tolerance
    #[arg(long, default_value_t = rhobench::config::DEFAULT_EPSILON)]
    epsilon: f64,

    /// Error bound mode: rel or abs
    #[arg(long, default_value = "rel")]
    mode: ErrorBoundMode,

    /// Codec predictor: lorenzo or linear
    #[arg(long, default_value = "lorenzo")]
    predictor: PredictorKind,

    /// Storage filters for the original array, comma separated (shuffle, rle)
    #[arg(long, value_delimiter = ',', value_parser = parse_filter)]
    filters: Vec<TileFilter>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn parse_filter(s: &str) -> Result<TileFilter, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "shuffle" | "byteshuffle" | "byte_shuffle" => Ok(TileFilter::ByteShuffle),
        "rle" => Ok(TileFilter::Rle),
        other => Err(format!("unknown tile filter '{}'", other)),
    }
}

impl From<Args> for PipelineConfig {
    fn from(args: Args) -> Self {
        Self {
            input: args.input,
            shape: args.shape,
            path_d: args.array_d,
            path_g: args.array_g,
            attribute: args.attribute,
            epsilon: args.epsilon,
            mode: args.mode,
            predictor: args.predictor,
            tile_filters: args.filters,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let json = args.json;
    let pipeline = Pipeline::new(TileStore::new(), ErrorBoundedCompressor::new(), args.into());

    let report = match pipeline.run() {
        Ok(report) => report,
        Err(PipelineError::DataNotFound(path)) => {
            println!("Error: {} not found. Please download the dataset.", path.display());
            return Ok(());
        }
        Err(e) => return Err(e).context("benchmark run failed"),
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("serialize report")?
        );
    } else {
        println!("{}", report);
    }
    Ok(())
}
