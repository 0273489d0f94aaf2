use rhobench_core::DecompressionError;

/// Residuals per Rice block
pub const BLOCK: usize = 64;

/// Parameter value marking a block whose residuals are all zero
const ZERO_BLOCK: u64 = 63;
const PARAM_BITS: u32 = 6;

/// Unary quotients at or above this length are replaced by an escape
const ESCAPE: u64 = 24;

/// Adaptive block Rice coder for prediction residuals.
///
/// Residuals are zigzag-mapped to `u64` and grouped into blocks of [`BLOCK`].
/// Bits are packed LSB first.
/// Format per block:
/// - 6-bit parameter `k`; `63` means every residual in the block is zero
/// - per residual `z`, with `q = z >> k`:
///   `q < 24`: `q` zero bits, a one bit, then the low `k` bits of `z`;
///   otherwise 24 zero bits followed by `z` in 64 bits
pub struct ResidualWriter {
    bits: BitWriter,
    block: Vec<u64>,
}

impl ResidualWriter {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bits: BitWriter::with_capacity(capacity),
            block: Vec::with_capacity(BLOCK),
        }
    }

    #[inline]
    pub fn push(&mut self, residual: i64) {
        self.block.push(zigzag(residual));
        if self.block.len() == BLOCK {
            self.flush_block();
        }
    }

    fn flush_block(&mut self) {
        if self.block.is_empty() {
            return;
        }

        let k = rice_parameter(&self.block);
        self.bits.push(k, PARAM_BITS);
        if k != ZERO_BLOCK {
            for &z in &self.block {
                let q = z >> k;
                if q < ESCAPE {
                    self.bits.push(0, q as u32);
                    self.bits.push(1, 1);
                    self.bits.push(z, k as u32);
                } else {
                    self.bits.push(0, ESCAPE as u32);
                    self.bits.push(z, 64);
                }
            }
        }
        self.block.clear();
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.flush_block();
        self.bits.finish()
    }
}

/// Reads back exactly `count` residuals written by [`ResidualWriter`].
pub struct ResidualReader<'a> {
    bits: BitReader<'a>,
    remaining: usize,
    block: Vec<u64>,
    cursor: usize,
}

impl<'a> ResidualReader<'a> {
    pub fn new(buf: &'a [u8], count: usize) -> Self {
        Self {
            bits: BitReader::new(buf),
            remaining: count,
            block: Vec::with_capacity(BLOCK),
            cursor: 0,
        }
    }

    #[inline]
    pub fn next_residual(&mut self) -> Result<i64, DecompressionError> {
        if self.cursor == self.block.len() {
            self.read_block()?;
        }
        let z = self.block[self.cursor];
        self.cursor += 1;
        Ok(unzigzag(z))
    }

    fn read_block(&mut self) -> Result<(), DecompressionError> {
        if self.remaining == 0 {
            return Err(DecompressionError::CorruptStream(
                "more residuals requested than coded".into(),
            ));
        }
        let n = self.remaining.min(BLOCK);
        self.remaining -= n;
        self.block.clear();
        self.cursor = 0;

        let k = self.bits.read(PARAM_BITS)?;
        if k == ZERO_BLOCK {
            self.block.resize(n, 0);
            return Ok(());
        }

        for _ in 0..n {
            let mut q = 0u64;
            while q < ESCAPE && self.bits.read(1)? == 0 {
                q += 1;
            }
            let z = if q == ESCAPE {
                self.bits.read(64)?
            } else {
                (q << k) | self.bits.read(k as u32)?
            };
            self.block.push(z);
        }
        Ok(())
    }

    /// Fails unless every coded residual was read and no bytes are left over.
    pub fn finish(self) -> Result<(), DecompressionError> {
        let unread = self.remaining + (self.block.len() - self.cursor);
        if unread > 0 {
            return Err(DecompressionError::CorruptStream(format!(
                "{} residuals left unread",
                unread
            )));
        }
        if self.bits.unused_bytes() > 0 {
            return Err(DecompressionError::CorruptStream(format!(
                "{} trailing bytes in residual stream",
                self.bits.unused_bytes()
            )));
        }
        Ok(())
    }
}

/// Cheapest Rice parameter among small values and the few just below
/// `log2(mean)`, or [`ZERO_BLOCK`].
fn rice_parameter(block: &[u64]) -> u64 {
    let sum: u128 = block.iter().map(|&z| z as u128).sum();
    if sum == 0 {
        return ZERO_BLOCK;
    }
    let mean = (sum / block.len() as u128) as u64;
    let k_mean = if mean == 0 {
        0
    } else {
        (63 - mean.leading_zeros() as u64).min(ZERO_BLOCK - 1)
    };

    (0..3u64)
        .chain(k_mean.saturating_sub(3)..=k_mean)
        .min_by_key(|&k| block_cost(block, k))
        .unwrap_or(0)
}

/// Size in bits of `block` coded with parameter `k`
fn block_cost(block: &[u64], k: u64) -> u64 {
    block
        .iter()
        .map(|&z| {
            let q = z >> k;
            if q < ESCAPE {
                q + 1 + k
            } else {
                ESCAPE + 64
            }
        })
        .sum()
}

#[inline]
pub fn zigzag(v: i64) -> u64 {
    ((v << 1) ^ (v >> 63)) as u64
}

#[inline]
pub fn unzigzag(z: u64) -> i64 {
    ((z >> 1) as i64) ^ -((z & 1) as i64)
}

#[inline]
fn mask(n: u32) -> u64 {
    if n >= 64 {
        u64::MAX
    } else {
        (1u64 << n) - 1
    }
}

struct BitWriter {
    out: Vec<u8>,
    acc: u128,
    nbits: u32,
}

impl BitWriter {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            out: Vec::with_capacity(capacity),
            acc: 0,
            nbits: 0,
        }
    }

    #[inline]
    fn push(&mut self, value: u64, n: u32) {
        if n == 0 {
            return;
        }
        self.acc |= ((value & mask(n)) as u128) << self.nbits;
        self.nbits += n;
        while self.nbits >= 8 {
            self.out.push(self.acc as u8);
            self.acc >>= 8;
            self.nbits -= 8;
        }
    }

    fn finish(mut self) -> Vec<u8> {
        if self.nbits > 0 {
            self.out.push(self.acc as u8);
        }
        self.out
    }
}

struct BitReader<'a> {
    buf: &'a [u8],
    pos: usize,
    acc: u128,
    nbits: u32,
}

impl<'a> BitReader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            pos: 0,
            acc: 0,
            nbits: 0,
        }
    }

    #[inline]
    fn read(&mut self, n: u32) -> Result<u64, DecompressionError> {
        if n == 0 {
            return Ok(0);
        }
        while self.nbits < n {
            let byte = *self
                .buf
                .get(self.pos)
                .ok_or_else(|| DecompressionError::CorruptStream("residual stream ended early".into()))?;
            self.acc |= (byte as u128) << self.nbits;
            self.nbits += 8;
            self.pos += 1;
        }
        let value = (self.acc as u64) & mask(n);
        self.acc >>= n;
        self.nbits -= n;
        Ok(value)
    }

    fn unused_bytes(&self) -> usize {
        self.buf.len() - self.pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(vals: &[i64]) -> Vec<u8> {
        let mut writer = ResidualWriter::with_capacity(vals.len());
        for &v in vals {
            writer.push(v);
        }
        writer.finish()
    }

    fn decode_all(bytes: &[u8], n: usize) -> Vec<i64> {
        let mut reader = ResidualReader::new(bytes, n);
        let out: Vec<i64> = (0..n).map(|_| reader.next_residual().unwrap()).collect();
        reader.finish().unwrap();
        out
    }

    #[test]
    fn test_zero_blocks_cost_six_bits() {
        // 1024 zeros = 16 zero blocks = 96 bits
        let bytes = encode(&vec![0i64; 1024]);
        assert_eq!(bytes.len(), 12);
        assert_eq!(decode_all(&bytes, 1024), vec![0i64; 1024]);
    }

    #[test]
    fn test_small_residuals_pack_below_a_byte() {
        let vals: Vec<i64> = (0..4096).map(|i| (i % 5) as i64 - 2).collect();
        let bytes = encode(&vals);
        // zigzag values 0..4 -> k = 1, at most 4 bits each plus block headers
        assert!(bytes.len() < vals.len() / 2 + 64, "{} bytes", bytes.len());
        assert_eq!(decode_all(&bytes, vals.len()), vals);
    }

    #[test]
    fn test_extreme_values_escape() {
        let vals = [i64::MIN, i64::MAX, -1, 1, 63, -64, 64, 1 << 40, 0, 0, 3];
        let bytes = encode(&vals);
        assert_eq!(decode_all(&bytes, vals.len()), vals);
    }

    #[test]
    fn test_partial_last_block() {
        let vals: Vec<i64> = (0..(BLOCK as i64 * 3 + 7)).map(|i| i * 37 % 11 - 5).collect();
        let bytes = encode(&vals);
        assert_eq!(decode_all(&bytes, vals.len()), vals);
    }

    #[test]
    fn test_single_spike_prefers_small_parameter() {
        let mut vals = vec![0i64; BLOCK];
        vals[0] = 3_000_000_000;
        let bytes = encode(&vals);
        // 6-bit header, one 88-bit escape, 63 one-bit zeros
        assert_eq!(bytes.len(), (6 + 88 + 63 + 7) / 8);
        assert_eq!(decode_all(&bytes, BLOCK), vals);
    }

    #[test]
    fn test_zigzag() {
        assert_eq!(zigzag(0), 0);
        assert_eq!(zigzag(-1), 1);
        assert_eq!(zigzag(1), 2);
        assert_eq!(zigzag(i64::MIN), u64::MAX);
        assert_eq!(unzigzag(u64::MAX), i64::MIN);
    }

    #[test]
    fn test_truncated_stream_is_error() {
        let vals: Vec<i64> = (0..200).map(|i| i * 1000).collect();
        let bytes = encode(&vals);
        let mut reader = ResidualReader::new(&bytes[..bytes.len() / 2], vals.len());
        let result: Result<Vec<i64>, _> = (0..vals.len()).map(|_| reader.next_residual()).collect();
        assert!(result.is_err());
    }

    #[test]
    fn test_unread_residuals_are_error() {
        let bytes = encode(&[5, 6]);
        let mut reader = ResidualReader::new(&bytes, 2);
        reader.next_residual().unwrap();
        assert!(reader.finish().is_err());
    }

    #[test]
    fn test_reading_past_count_is_error() {
        let bytes = encode(&[5]);
        let mut reader = ResidualReader::new(&bytes, 1);
        reader.next_residual().unwrap();
        assert!(reader.next_residual().is_err());
    }
}
