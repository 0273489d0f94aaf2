use rhobench_core::PredictorKind;

/// Predicts integer codes of a `(time, x, y)` array, one time slice at a time.
///
/// Encoder and decoder drive identical predictors over identical codes, so
/// predictions match bit for bit on both sides.
pub trait Predictor {
    /// Prediction for cell `(i, j)` of the slice being coded. `current` is the
    /// slice's code buffer; only cells before `(i, j)` in row-major order are valid.
    fn predict(&self, current: &[i64], i: usize, j: usize) -> i64;

    /// Push a completed slice into the history
    fn update(&mut self, slice: &[i64]);

    /// Forget all history
    fn reset(&mut self);
}

/// Builds the predictor selected by `kind` for slices of `x * y` cells.
pub fn make_predictor(kind: PredictorKind, x: usize, y: usize) -> Box<dyn Predictor> {
    match kind {
        PredictorKind::Lorenzo => Box::new(LorenzoPredictor::new(x, y)),
        PredictorKind::Linear => Box::new(LinearPredictor::new(x, y)),
    }
}

/// 3-D Lorenzo predictor
///
/// Formula over the unit cube behind `(t, i, j)`, with missing neighbours as 0:
/// `ŝ = a(i-1,j) + a(i,j-1) - a(i-1,j-1) + p(i,j) - p(i-1,j) - p(i,j-1) + p(i-1,j-1)`
/// where `a` is the current slice and `p` the previous one.
pub struct LorenzoPredictor {
    x: usize,
    y: usize,
    prev: Option<Vec<i64>>,
}

impl LorenzoPredictor {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y, prev: None }
    }

    #[inline]
    fn at(buf: &[i64], y: usize, i: usize, j: usize) -> i64 {
        buf[i * y + j]
    }
}

impl Predictor for LorenzoPredictor {
    fn predict(&self, current: &[i64], i: usize, j: usize) -> i64 {
        let y = self.y;
        let mut pred = 0i64;

        if i > 0 {
            pred = pred.wrapping_add(Self::at(current, y, i - 1, j));
        }
        if j > 0 {
            pred = pred.wrapping_add(Self::at(current, y, i, j - 1));
        }
        if i > 0 && j > 0 {
            pred = pred.wrapping_sub(Self::at(current, y, i - 1, j - 1));
        }

        if let Some(prev) = &self.prev {
            pred = pred.wrapping_add(Self::at(prev, y, i, j));
            if i > 0 {
                pred = pred.wrapping_sub(Self::at(prev, y, i - 1, j));
            }
            if j > 0 {
                pred = pred.wrapping_sub(Self::at(prev, y, i, j - 1));
            }
            if i > 0 && j > 0 {
                pred = pred.wrapping_add(Self::at(prev, y, i - 1, j - 1));
            }
        }

        pred
    }

    fn update(&mut self, slice: &[i64]) {
        debug_assert_eq!(slice.len(), self.x * self.y);
        match &mut self.prev {
            Some(prev) => prev.copy_from_slice(slice),
            None => self.prev = Some(slice.to_vec()),
        }
    }

    fn reset(&mut self) {
        self.prev = None;
    }
}

/// Linear temporal extrapolator
///
/// Formula: `ŝ_{t+1} = S_t + (S_t - S_{t-1})`, i.e. `2·S_t - S_{t-1}` per cell.
///
/// With one slice of history it predicts `S_t`; with none it falls back to the
/// left neighbour in the current row.
pub struct LinearPredictor {
    x: usize,
    y: usize,
    s_t: Option<Vec<i64>>,         // Latest slice
    s_t_minus_1: Option<Vec<i64>>, // Slice before that
}

impl LinearPredictor {
    pub fn new(x: usize, y: usize) -> Self {
        Self {
            x,
            y,
            s_t: None,
            s_t_minus_1: None,
        }
    }
}

impl Predictor for LinearPredictor {
    fn predict(&self, current: &[i64], i: usize, j: usize) -> i64 {
        let idx = i * self.y + j;
        match (&self.s_t, &self.s_t_minus_1) {
            (Some(curr), Some(prev)) => {
                let diff = curr[idx].wrapping_sub(prev[idx]);
                curr[idx].wrapping_add(diff)
            }
            (Some(curr), None) => curr[idx],
            _ => {
                if j > 0 {
                    current[idx - 1]
                } else {
                    0
                }
            }
        }
    }

    fn update(&mut self, slice: &[i64]) {
        debug_assert_eq!(slice.len(), self.x * self.y);
        // Shift history, recycling the oldest buffer:
        // s_{t-1} <- s_t
        // s_t <- slice
        let mut recycled = self.s_t_minus_1.take().unwrap_or_default();
        recycled.clear();
        recycled.extend_from_slice(slice);
        self.s_t_minus_1 = self.s_t.take();
        self.s_t = Some(recycled);
    }

    fn reset(&mut self) {
        self.s_t = None;
        self.s_t_minus_1 = None;
    }
}
