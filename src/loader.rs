use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use rhobench_core::{RawArray, Shape3};

use crate::PipelineError;

/// Reads a flat little-endian `f32` file as a row-major array of `shape`.
///
/// A missing file is [`PipelineError::DataNotFound`]; a file whose size
/// does not match `shape` is [`PipelineError::InputSize`].
pub fn load_raw(path: &Path, shape: Shape3) -> Result<RawArray, PipelineError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(PipelineError::DataNotFound(path.to_path_buf()))
        }
        Err(e) => return Err(e.into()),
    };

    let actual = file.metadata()?.len();
    let expected = shape.len() as u64 * 4;
    if actual != expected {
        return Err(PipelineError::InputSize { expected, actual });
    }

    let mut data = vec![0f32; shape.len()];
    BufReader::new(file).read_f32_into::<LittleEndian>(&mut data)?;
    Ok(RawArray::new(shape, data)?)
}

/// Writes `array` in the format [`load_raw`] reads.
pub fn save_raw(path: &Path, array: &RawArray) -> Result<(), PipelineError> {
    let mut out = BufWriter::new(File::create(path)?);
    for &v in array.data() {
        out.write_f32::<LittleEndian>(v)?;
    }
    out.flush()?;
    Ok(())
}
