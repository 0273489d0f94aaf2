use crate::MathError;

/// Absolute difference of one element pair, in `f64`.
///
/// Identical values (including two NaNs or two equal infinities) differ by 0.
/// Any other comparison involving a non-finite value differs by infinity.
#[inline]
pub fn pointwise_diff(a: f32, b: f32) -> f64 {
    if a == b || (a.is_nan() && b.is_nan()) {
        return 0.0;
    }
    let diff = (a as f64 - b as f64).abs();
    if diff.is_nan() {
        f64::INFINITY
    } else {
        diff
    }
}

/// Element-wise `max |a - b|` over two equally long buffers.
pub fn max_abs_diff(a: &[f32], b: &[f32]) -> Result<f64, MathError> {
    if a.len() != b.len() {
        return Err(MathError::ShapeMismatch(a.len(), b.len()));
    }

    Ok(a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| pointwise_diff(x, y))
        .fold(0.0, f64::max))
}

/// `max_abs_diff / range`.
///
/// A zero range (constant input) has no meaningful ratio; it is defined as 0
/// when the reconstruction is exact and infinity otherwise.
pub fn relative_error(max_abs_diff: f64, range: f64) -> f64 {
    if range == 0.0 {
        if max_abs_diff == 0.0 {
            0.0
        } else {
            f64::INFINITY
        }
    } else {
        max_abs_diff / range
    }
}
