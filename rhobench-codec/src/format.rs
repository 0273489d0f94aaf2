use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use rhobench_core::{DecompressionError, PredictorKind, Shape3};

pub const MAGIC: &[u8; 4] = b"RBZ1";
pub const VERSION: u8 = 1;

/// Fixed header size in bytes
pub const HEADER_LEN: usize = 4 + 4 + 3 * 4 + 8 + 8 + 8 + 8;

/// Bytes per outlier record: `u64` index + `f32` value
pub const OUTLIER_LEN: usize = 12;

/// How cell values were turned into integer codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodingMode {
    /// Codes on a uniform grid, `base + k * step`
    Quantized = 0,
    /// Codes are order-preserving images of the f32 bit patterns
    Lossless = 1,
    /// No codes: the body is the cells as little-endian `f32`
    Raw = 2,
}

/// Blob header.
///
/// Layout (little-endian):
/// [magic "RBZ1"] [u8 version] [u8 mode] [u8 predictor] [u8 reserved]
/// [u32 time] [u32 x] [u32 y] [f64 base] [f64 step] [u64 n_outliers] [u64 stream_len]
///
/// Followed by `stream_len` residual bytes, then `n_outliers` records of
/// [u64 index] [f32 value], sorted by index. In `Raw` mode the body holds the
/// cells verbatim and there are no outlier records.
#[derive(Debug, Clone, PartialEq)]
pub struct BlobHeader {
    pub mode: CodingMode,
    pub predictor: PredictorKind,
    pub shape: Shape3,
    pub base: f64,
    pub step: f64,
    pub outliers: u64,
    pub stream_len: u64,
}

impl BlobHeader {
    pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(MAGIC)?;
        w.write_u8(VERSION)?;
        w.write_u8(self.mode as u8)?;
        w.write_u8(predictor_id(self.predictor))?;
        w.write_u8(0)?;
        for extent in [self.shape.time, self.shape.x, self.shape.y] {
            w.write_u32::<LittleEndian>(extent as u32)?;
        }
        w.write_f64::<LittleEndian>(self.base)?;
        w.write_f64::<LittleEndian>(self.step)?;
        w.write_u64::<LittleEndian>(self.outliers)?;
        w.write_u64::<LittleEndian>(self.stream_len)?;
        Ok(())
    }

    pub fn read<R: Read>(r: &mut R) -> Result<Self, DecompressionError> {
        let mut magic = [0u8; 4];
        r.read_exact(&mut magic).map_err(truncated)?;
        if &magic != MAGIC {
            return Err(DecompressionError::BadMagic);
        }

        let version = r.read_u8().map_err(truncated)?;
        if version != VERSION {
            return Err(DecompressionError::UnsupportedVersion(version));
        }

        let mode = match r.read_u8().map_err(truncated)? {
            0 => CodingMode::Quantized,
            1 => CodingMode::Lossless,
            2 => CodingMode::Raw,
            other => return Err(DecompressionError::UnknownMode(other)),
        };
        let predictor = match r.read_u8().map_err(truncated)? {
            0 => PredictorKind::Lorenzo,
            1 => PredictorKind::Linear,
            other => return Err(DecompressionError::UnknownPredictor(other)),
        };
        let _reserved = r.read_u8().map_err(truncated)?;

        let time = r.read_u32::<LittleEndian>().map_err(truncated)? as usize;
        let x = r.read_u32::<LittleEndian>().map_err(truncated)? as usize;
        let y = r.read_u32::<LittleEndian>().map_err(truncated)? as usize;

        Ok(Self {
            mode,
            predictor,
            shape: Shape3::new(time, x, y),
            base: r.read_f64::<LittleEndian>().map_err(truncated)?,
            step: r.read_f64::<LittleEndian>().map_err(truncated)?,
            outliers: r.read_u64::<LittleEndian>().map_err(truncated)?,
            stream_len: r.read_u64::<LittleEndian>().map_err(truncated)?,
        })
    }
}

fn predictor_id(kind: PredictorKind) -> u8 {
    match kind {
        PredictorKind::Lorenzo => 0,
        PredictorKind::Linear => 1,
    }
}

fn truncated(_: io::Error) -> DecompressionError {
    DecompressionError::Truncated
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BlobHeader {
        BlobHeader {
            mode: CodingMode::Quantized,
            predictor: PredictorKind::Linear,
            shape: Shape3::new(4000, 855, 1215),
            base: 18.5,
            step: 0.02,
            outliers: 3,
            stream_len: 12345,
        }
    }

    #[test]
    fn test_header_layout() {
        let mut buf = Vec::new();
        sample().write(&mut buf).unwrap();
        assert_eq!(buf.len(), HEADER_LEN);
        assert_eq!(&buf[0..4], b"RBZ1");
        assert_eq!(buf[4], VERSION);
        assert_eq!(buf[6], 1);
        assert_eq!(&buf[8..12], &4000u32.to_le_bytes());

        let back = BlobHeader::read(&mut buf.as_slice()).unwrap();
        assert_eq!(back, sample());
    }

    #[test]
    fn test_raw_mode_byte() {
        let header = BlobHeader {
            mode: CodingMode::Raw,
            outliers: 0,
            ..sample()
        };
        let mut buf = Vec::new();
        header.write(&mut buf).unwrap();
        assert_eq!(buf[5], 2);
        assert_eq!(BlobHeader::read(&mut buf.as_slice()).unwrap().mode, CodingMode::Raw);
    }

    #[test]
    fn test_header_rejects_garbage() {
        let mut buf = Vec::new();
        sample().write(&mut buf).unwrap();

        let mut bad_magic = buf.clone();
        bad_magic[0] = b'X';
        assert!(matches!(
            BlobHeader::read(&mut bad_magic.as_slice()),
            Err(DecompressionError::BadMagic)
        ));

        let mut bad_version = buf.clone();
        bad_version[4] = 9;
        assert!(matches!(
            BlobHeader::read(&mut bad_version.as_slice()),
            Err(DecompressionError::UnsupportedVersion(9))
        ));

        let mut bad_mode = buf.clone();
        bad_mode[5] = 7;
        assert!(matches!(
            BlobHeader::read(&mut bad_mode.as_slice()),
            Err(DecompressionError::UnknownMode(7))
        ));

        assert!(matches!(
            BlobHeader::read(&mut &buf[..20]),
            Err(DecompressionError::Truncated)
        ));
    }
}
