/// Minimum and maximum over the finite values of a buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    pub min: f32,
    pub max: f32,
}

impl ValueRange {
    /// Returns `None` when the buffer holds no finite value.
    pub fn of(data: &[f32]) -> Option<Self> {
        let mut iter = data.iter().copied().filter(|v| v.is_finite());
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
        Some(Self { min, max })
    }

    /// `max - min`, computed in `f64` so it cannot overflow.
    pub fn span(&self) -> f64 {
        self.max as f64 - self.min as f64
    }
}
