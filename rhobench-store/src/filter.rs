use rhobench_core::TileFilter;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FilterError {
    #[error("RLE stream ended inside a run at byte {0}")]
    TruncatedRun(usize),
}

/// Runs `filters` in order over one tile of `width`-byte elements.
pub fn apply_filters(filters: &[TileFilter], width: usize, tile: Vec<u8>) -> Vec<u8> {
    filters.iter().fold(tile, |buf, filter| match filter {
        TileFilter::ByteShuffle => shuffle(&buf, width),
        TileFilter::Rle => rle_encode(&buf),
    })
}

/// Undoes [`apply_filters`].
pub fn reverse_filters(
    filters: &[TileFilter],
    width: usize,
    stored: Vec<u8>,
) -> Result<Vec<u8>, FilterError> {
    filters.iter().rev().try_fold(stored, |buf, filter| match filter {
        TileFilter::ByteShuffle => Ok(unshuffle(&buf, width)),
        TileFilter::Rle => rle_decode(&buf),
    })
}

/// Byte-plane transpose: byte `b` of element `i` moves to `b * n + i`.
/// Bytes past the last whole element are kept at the end.
pub fn shuffle(buf: &[u8], width: usize) -> Vec<u8> {
    if width <= 1 {
        return buf.to_vec();
    }
    let n = buf.len() / width;
    let mut out = vec![0u8; buf.len()];
    for i in 0..n {
        for b in 0..width {
            out[b * n + i] = buf[i * width + b];
        }
    }
    out[n * width..].copy_from_slice(&buf[n * width..]);
    out
}

pub fn unshuffle(buf: &[u8], width: usize) -> Vec<u8> {
    if width <= 1 {
        return buf.to_vec();
    }
    let n = buf.len() / width;
    let mut out = vec![0u8; buf.len()];
    for i in 0..n {
        for b in 0..width {
            out[i * width + b] = buf[b * n + i];
        }
    }
    out[n * width..].copy_from_slice(&buf[n * width..]);
    out
}

/// Longest run either opcode can describe
const MAX_RUN: usize = 128;

/// Byte run-length coding.
/// Format:
/// [Opcode: u8] [Data...]
/// Opcode 0x00..0x7F: Literal run of (N+1) bytes, which follow.
/// Opcode 0x80..0xFF: Repeat run, (N-128+1) copies of the single byte that follows.
pub fn rle_encode(buf: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(buf.len() / 2 + 2);
    let mut literal_start = 0;
    let mut i = 0;

    while i < buf.len() {
        let run = buf[i..]
            .iter()
            .take(MAX_RUN)
            .take_while(|&&b| b == buf[i])
            .count();

        // Runs shorter than 3 cost no more as literals
        if run >= 3 {
            push_literals(&mut out, &buf[literal_start..i]);
            out.push((128 + run - 1) as u8);
            out.push(buf[i]);
            i += run;
            literal_start = i;
        } else {
            i += 1;
        }
    }
    push_literals(&mut out, &buf[literal_start..]);
    out
}

fn push_literals(out: &mut Vec<u8>, literals: &[u8]) {
    for chunk in literals.chunks(MAX_RUN) {
        out.push((chunk.len() - 1) as u8);
        out.extend_from_slice(chunk);
    }
}

pub fn rle_decode(buf: &[u8]) -> Result<Vec<u8>, FilterError> {
    let mut out = Vec::with_capacity(buf.len() * 2);
    let mut ptr = 0;

    while ptr < buf.len() {
        let opcode = buf[ptr];
        ptr += 1;

        if opcode >= 128 {
            let count = (opcode - 128) as usize + 1;
            let byte = *buf.get(ptr).ok_or(FilterError::TruncatedRun(ptr))?;
            ptr += 1;
            out.extend(std::iter::repeat(byte).take(count));
        } else {
            let count = opcode as usize + 1;
            let literals = buf
                .get(ptr..ptr + count)
                .ok_or(FilterError::TruncatedRun(ptr))?;
            out.extend_from_slice(literals);
            ptr += count;
        }
    }
    Ok(out)
}
