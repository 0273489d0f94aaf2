use std::io::Write;

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt, WriteBytesExt};
use rhobench_core::{
    CompressedBlob, CompressionError, Compressor, DataType, DecompressionError, ErrorBoundConfig,
    RawArray, Shape3,
};
use rhobench_math::{from_ordered_bits, ordered_bits, ulp, QuantGrid, ValueRange};
use tracing::debug;

use crate::format::{BlobHeader, CodingMode, HEADER_LEN, OUTLIER_LEN};
use crate::predictor::make_predictor;
use crate::residual::{ResidualReader, ResidualWriter};

/// Prediction + quantization compressor (SZ-style).
///
/// 1. Each value is mapped to an integer code: a grid index with spacing
///    `2e` (error ≤ e) or, when no positive bound applies, the lossless
///    order-preserving image of its bit pattern.
/// 2. Codes are predicted from already coded neighbours, and the residuals
///    are Rice coded in adaptive blocks.
/// 3. Values the grid cannot represent within `e` (round-off, NaN, inf) are
///    stored verbatim as outliers.
///
/// When the coded body would not be smaller than the cells themselves, the
/// cells are stored raw instead, so a blob never exceeds the input by more
/// than its header.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorBoundedCompressor;

impl ErrorBoundedCompressor {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, Clone, Copy)]
enum Coding {
    Quantized { grid: QuantGrid, bound: f64 },
    Lossless,
}

impl Coding {
    fn choose(range: Option<ValueRange>, config: &ErrorBoundConfig) -> Self {
        let Some(range) = range else {
            return Coding::Lossless;
        };
        let bound = config.absolute_bound(range.span());
        if !(bound > 0.0) || !bound.is_finite() {
            return Coding::Lossless;
        }
        // Grid no coarser than the f32 spacing of the data: code the bits.
        if 2.0 * bound <= ulp(range.min.abs().max(range.max.abs())) {
            return Coding::Lossless;
        }
        match QuantGrid::for_bound(range.min as f64, bound) {
            Ok(grid) if grid.covers(range.span()) => Coding::Quantized { grid, bound },
            _ => Coding::Lossless,
        }
    }
}

impl Compressor for ErrorBoundedCompressor {
    fn compress(
        &self,
        array: &RawArray,
        config: &ErrorBoundConfig,
    ) -> Result<(CompressedBlob, f64), CompressionError> {
        config.validate()?;
        if array.is_empty() {
            return Err(CompressionError::EmptyArray);
        }

        let shape = array.shape();
        for extent in [shape.time, shape.x, shape.y] {
            if extent > u32::MAX as usize {
                return Err(CompressionError::ShapeTooLarge(extent));
            }
        }

        let coding = Coding::choose(array.value_range(), config);
        debug!(?coding, mode = %config.mode, tolerance = config.tolerance, "Coding plan");

        let mut predictor = make_predictor(config.predictor, shape.x, shape.y);
        let mut writer = ResidualWriter::with_capacity(array.len() / 2);
        let mut outliers: Vec<(u64, f32)> = Vec::new();
        let mut codes = vec![0i64; shape.slice_len()];

        for t in 0..shape.time {
            let slice = array.slice(t);
            let offset = (t * shape.slice_len()) as u64;

            for i in 0..shape.x {
                for j in 0..shape.y {
                    let idx = i * shape.y + j;
                    let value = slice[idx];
                    let pred = predictor.predict(&codes, i, j);

                    let code = match coding {
                        Coding::Lossless => ordered_bits(value),
                        Coding::Quantized { grid, bound } => {
                            let k = grid.code(value);
                            let err = (value as f64 - grid.value(k) as f64).abs();
                            if value.is_finite() && err <= bound {
                                k
                            } else {
                                // Stored verbatim; the code just follows the prediction.
                                outliers.push((offset + idx as u64, value));
                                pred
                            }
                        }
                    };

                    codes[idx] = code;
                    writer.push(code.wrapping_sub(pred));
                }
            }

            predictor.update(&codes);
        }

        let stream = writer.finish();
        let packed = stream.len() + outliers.len() * OUTLIER_LEN;
        let out = if packed >= array.nbytes() {
            debug!(packed, raw = array.nbytes(), "Coded body not smaller than input, storing raw");
            write_raw(array, config)?
        } else {
            let (mode, base, step) = match coding {
                Coding::Quantized { grid, .. } => (CodingMode::Quantized, grid.base(), grid.step()),
                Coding::Lossless => (CodingMode::Lossless, 0.0, 0.0),
            };
            let header = BlobHeader {
                mode,
                predictor: config.predictor,
                shape,
                base,
                step,
                outliers: outliers.len() as u64,
                stream_len: stream.len() as u64,
            };

            let mut out = Vec::with_capacity(HEADER_LEN + packed);
            header.write(&mut out)?;
            out.write_all(&stream)?;
            for (index, value) in &outliers {
                out.write_u64::<LittleEndian>(*index)?;
                out.write_f32::<LittleEndian>(*value)?;
            }
            out
        };

        let ratio = array.nbytes() as f64 / out.len() as f64;
        debug!(
            bytes = out.len(),
            stream = stream.len(),
            outliers = outliers.len(),
            ratio,
            "Compressed"
        );
        Ok((CompressedBlob::new(out), ratio))
    }

    fn decompress(
        &self,
        bytes: &[u8],
        dtype: DataType,
        shape: Shape3,
    ) -> Result<RawArray, DecompressionError> {
        if dtype != DataType::Float32 {
            return Err(DecompressionError::UnsupportedType(dtype));
        }

        let mut cursor = bytes;
        let header = BlobHeader::read(&mut cursor)?;
        if header.shape != shape {
            return Err(DecompressionError::ShapeMismatch {
                header: header.shape,
                requested: shape,
            });
        }

        let body = &bytes[HEADER_LEN..];
        let stream_len =
            usize::try_from(header.stream_len).map_err(|_| DecompressionError::Truncated)?;
        if body.len() < stream_len {
            return Err(DecompressionError::Truncated);
        }
        let (stream, tail) = body.split_at(stream_len);

        let outlier_bytes = usize::try_from(header.outliers)
            .ok()
            .and_then(|n| n.checked_mul(OUTLIER_LEN))
            .ok_or(DecompressionError::Truncated)?;
        if tail.len() < outlier_bytes {
            return Err(DecompressionError::Truncated);
        }
        if tail.len() > outlier_bytes {
            return Err(DecompressionError::TrailingBytes(tail.len() - outlier_bytes));
        }

        let grid = match header.mode {
            CodingMode::Quantized => Some(
                QuantGrid::new(header.base, header.step)
                    .map_err(|e| DecompressionError::CorruptStream(e.to_string()))?,
            ),
            CodingMode::Lossless => None,
            CodingMode::Raw => return read_raw(stream, header.outliers, shape),
        };

        let mut predictor = make_predictor(header.predictor, shape.x, shape.y);
        let mut reader = ResidualReader::new(stream, shape.len());
        let mut codes = vec![0i64; shape.slice_len()];
        let mut out = Vec::with_capacity(shape.len());

        for _ in 0..shape.time {
            for i in 0..shape.x {
                for j in 0..shape.y {
                    let idx = i * shape.y + j;
                    let pred = predictor.predict(&codes, i, j);
                    let code = pred.wrapping_add(reader.next_residual()?);
                    codes[idx] = code;
                    out.push(match grid {
                        Some(grid) => grid.value(code),
                        None => from_ordered_bits(code),
                    });
                }
            }
            predictor.update(&codes);
        }
        reader.finish()?;

        let mut records = tail;
        for _ in 0..header.outliers {
            let index = records
                .read_u64::<LittleEndian>()
                .map_err(|_| DecompressionError::Truncated)?;
            let value = records
                .read_f32::<LittleEndian>()
                .map_err(|_| DecompressionError::Truncated)?;
            let slot = usize::try_from(index)
                .ok()
                .and_then(|i| out.get_mut(i))
                .ok_or(DecompressionError::OutlierOutOfRange(index))?;
            *slot = value;
        }

        RawArray::new(shape, out).map_err(|e| DecompressionError::CorruptStream(e.to_string()))
    }
}

fn write_raw(array: &RawArray, config: &ErrorBoundConfig) -> Result<Vec<u8>, CompressionError> {
    let header = BlobHeader {
        mode: CodingMode::Raw,
        predictor: config.predictor,
        shape: array.shape(),
        base: 0.0,
        step: 0.0,
        outliers: 0,
        stream_len: array.nbytes() as u64,
    };
    let mut out = Vec::with_capacity(HEADER_LEN + array.nbytes());
    header.write(&mut out)?;
    for value in array.data() {
        out.write_f32::<LittleEndian>(*value)?;
    }
    Ok(out)
}

fn read_raw(body: &[u8], outliers: u64, shape: Shape3) -> Result<RawArray, DecompressionError> {
    if outliers != 0 || body.len() != shape.len() * 4 {
        return Err(DecompressionError::CorruptStream(format!(
            "raw body of {} bytes with {} outliers for {} cells",
            body.len(),
            outliers,
            shape.len()
        )));
    }
    let data = body.chunks_exact(4).map(LittleEndian::read_f32).collect();
    RawArray::new(shape, data).map_err(|e| DecompressionError::CorruptStream(e.to_string()))
}
