use thiserror::Error;

/// Largest code magnitude a grid may produce. Beyond 2^40 steps the product
/// `k * step` starts losing integer precision in the `f64` reconstruction.
pub const MAX_CODE: f64 = (1u64 << 40) as f64;

const SIGN_BIT: u32 = 0x8000_0000;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Shape mismatch: {0} vs {1}")]
    ShapeMismatch(usize, usize),
    #[error("Invalid quantization grid: base {base}, step {step}")]
    InvalidGrid { base: f64, step: f64 },
}

/// Uniform quantization grid anchored at `base`.
///
/// Code:           k = round((x - base) / step)
/// Reconstruction: x_hat = base + k * step
///
/// For `x` inside `[base, base + MAX_CODE * step]` the error is at most
/// `step / 2` before the final cast to `f32`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantGrid {
    base: f64,
    step: f64,
}

impl QuantGrid {
    pub fn new(base: f64, step: f64) -> Result<Self, MathError> {
        if !base.is_finite() || !step.is_finite() || step <= 0.0 {
            return Err(MathError::InvalidGrid { base, step });
        }
        Ok(Self { base, step })
    }

    /// Grid whose half-step equals `bound`, i.e. the coarsest grid that keeps
    /// every in-range value within `bound` of its reconstruction.
    pub fn for_bound(base: f64, bound: f64) -> Result<Self, MathError> {
        Self::new(base, 2.0 * bound)
    }

    pub fn base(&self) -> f64 {
        self.base
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Whether a span of `range` above the base is codable without precision loss.
    pub fn covers(&self, range: f64) -> bool {
        range.is_finite() && range / self.step < MAX_CODE
    }

    #[inline]
    pub fn code(&self, x: f32) -> i64 {
        // `as` saturates, so out-of-range inputs never wrap.
        ((x as f64 - self.base) / self.step).round() as i64
    }

    #[inline]
    pub fn value(&self, code: i64) -> f32 {
        (self.base + code as f64 * self.step) as f32
    }
}

/// Maps an `f32` bit pattern to an integer so that the integer order matches
/// the float order (`-0.0` sorts just below `+0.0`, NaNs at the extremes).
#[inline]
pub fn ordered_bits(x: f32) -> i64 {
    let bits = x.to_bits();
    let ordered = if bits & SIGN_BIT != 0 { !bits } else { bits | SIGN_BIT };
    ordered as i64
}

/// Inverse of [`ordered_bits`]. Only the low 32 bits of `code` are used.
#[inline]
pub fn from_ordered_bits(code: i64) -> f32 {
    let ordered = code as u32;
    let bits = if ordered & SIGN_BIT != 0 { ordered & !SIGN_BIT } else { !ordered };
    f32::from_bits(bits)
}

/// Gap between `|x|` and the next representable `f32` above it (below it
/// for `f32::MAX`). Infinite for non-finite `x`.
pub fn ulp(x: f32) -> f64 {
    let a = x.abs();
    if !a.is_finite() {
        return f64::INFINITY;
    }
    let bits = a.to_bits();
    if a == f32::MAX {
        a as f64 - f32::from_bits(bits - 1) as f64
    } else {
        f32::from_bits(bits + 1) as f64 - a as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_roundtrip_within_half_step() {
        let grid = QuantGrid::for_bound(-1.0, 1e-3).unwrap();
        let input = [-1.0f32, -0.5, 0.0, 0.0004, 0.25, 1.0];

        for &val in &input {
            let back = grid.value(grid.code(val));
            let diff = (val as f64 - back as f64).abs();
            assert!(diff <= 1e-3 + 1e-7, "{} -> {} (diff {})", val, back, diff);
        }
    }

    #[test]
    fn test_invalid_grid() {
        assert!(QuantGrid::new(0.0, 0.0).is_err());
        assert!(QuantGrid::new(0.0, -1.0).is_err());
        assert!(QuantGrid::new(f64::NAN, 1.0).is_err());
        assert!(QuantGrid::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_covers() {
        let grid = QuantGrid::new(0.0, 1.0).unwrap();
        assert!(grid.covers(1e6));
        assert!(!grid.covers(MAX_CODE * 2.0));
        assert!(!grid.covers(f64::INFINITY));
    }

    #[test]
    fn test_ordered_bits_preserves_order() {
        let vals = [f32::NEG_INFINITY, -3.5, -1e-30, -0.0, 0.0, 1e-30, 2.0, f32::INFINITY];
        let codes: Vec<i64> = vals.iter().map(|&v| ordered_bits(v)).collect();
        for pair in codes.windows(2) {
            assert!(pair[0] < pair[1], "{:?}", codes);
        }
    }

    #[test]
    fn test_ordered_bits_is_bit_exact() {
        for &val in &[0.0f32, -0.0, 1.5, -7.25, f32::MIN_POSITIVE, f32::MAX, f32::NAN] {
            let back = from_ordered_bits(ordered_bits(val));
            assert_eq!(back.to_bits(), val.to_bits());
        }
    }

    #[test]
    fn test_ulp() {
        assert_eq!(ulp(1.0), f32::EPSILON as f64);
        assert_eq!(ulp(-2.0), 2.0 * f32::EPSILON as f64);
        assert_eq!(ulp(0.0), f32::from_bits(1) as f64);
        assert_eq!(ulp(f32::MAX), 2f64.powi(104));
        assert_eq!(ulp(f32::NAN), f64::INFINITY);
    }
}
