//! Exponential and rolling-window smoothing.

use heapless::HistoryBuffer;

use crate::config::SMOOTH_WINDOW;

/// Exponential moving average.  Empty until the first sample, which is
/// taken verbatim.
#[derive(Debug, Clone)]
pub struct Ema {
    alpha: f32,
    value: Option<f32>,
}

impl Ema {
    /// `alpha` is the weight of the newest sample.
    pub const fn new(alpha: f32) -> Self {
        Self { alpha, value: None }
    }

    pub fn update(&mut self, x: f32) -> f32 {
        let next = match self.value {
            None => x,
            Some(prev) => self.alpha * x + (1.0 - self.alpha) * prev,
        };
        self.value = Some(next);
        next
    }

    pub fn value(&self) -> Option<f32> {
        self.value
    }
}

/// Arithmetic mean of the last `N` samples, oldest evicted first.
#[derive(Debug, Clone)]
pub struct RollingAverage<const N: usize> {
    window: HistoryBuffer<f32, N>,
}

impl<const N: usize> RollingAverage<N> {
    pub const fn new() -> Self {
        Self {
            window: HistoryBuffer::new(),
        }
    }

    /// Add a sample and return the new mean.
    pub fn push(&mut self, x: f32) -> f32 {
        self.window.write(x);
        // Non-empty after the write.
        self.mean().unwrap_or(x)
    }

    pub fn mean(&self) -> Option<f32> {
        let n = self.window.len();
        if n == 0 {
            return None;
        }
        let sum: f32 = self.window.as_slice().iter().sum();
        Some(sum / n as f32)
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.len() == 0
    }

    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<const N: usize> Default for RollingAverage<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Both smoothing lines, fed from the same samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Smoothed {
    pub ema: f32,
    pub rolling_avg: f32,
}

#[derive(Debug, Clone)]
pub struct Smoother {
    ema: Ema,
    rolling: RollingAverage<SMOOTH_WINDOW>,
}

impl Smoother {
    pub fn new(alpha: f32) -> Self {
        Self {
            ema: Ema::new(alpha),
            rolling: RollingAverage::new(),
        }
    }

    pub fn update(&mut self, x: f32) -> Smoothed {
        Smoothed {
            ema: self.ema.update(x),
            rolling_avg: self.rolling.push(x),
        }
    }

    pub fn ema(&self) -> Option<f32> {
        self.ema.value()
    }

    pub fn rolling_avg(&self) -> Option<f32> {
        self.rolling.mean()
    }
}
