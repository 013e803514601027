//! Smoothing and classification pipeline.
//!
//! ```text
//!  sample ─▶ Smoother ─┬─ ema ──────────┐
//!                      └─ rolling avg ──┴─▶ selected line ─▶ classify ─▶ BortleRating
//! ```
//!
//! One call per successful sample; the pipeline is never fed an
//! unavailable read.  A sample that has no rating of its own in the
//! configured domain is rejected before it reaches the smoother.

pub mod bortle;
pub mod smoothing;

use crate::config::{ClassificationDomain, MonitorConfig, SmoothedInput};

use bortle::BortleRating;
use smoothing::Smoother;

/// Everything one sample produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineOutput {
    pub sample: f32,
    pub ema: f32,
    pub rolling_avg: f32,
    /// `None` when the smoothed value cannot be classified.
    pub rating: Option<BortleRating>,
}

pub struct Pipeline {
    smoother: Smoother,
    domain: ClassificationDomain,
    input: SmoothedInput,
}

impl Pipeline {
    pub fn new(config: &MonitorConfig) -> Self {
        Self {
            smoother: Smoother::new(config.ema_alpha),
            domain: config.domain,
            input: config.smoothed_input,
        }
    }

    /// Smooth and classify one sample.  Returns `None`, leaving the
    /// smoother untouched, when the sample is non-finite or unratable.
    pub fn process(&mut self, sample: f32) -> Option<PipelineOutput> {
        if !sample.is_finite() || bortle::classify(self.domain, sample).is_none() {
            return None;
        }
        let smoothed = self.smoother.update(sample);
        let value = match self.input {
            SmoothedInput::Ema => smoothed.ema,
            SmoothedInput::RollingAverage => smoothed.rolling_avg,
        };
        Some(PipelineOutput {
            sample,
            ema: smoothed.ema,
            rolling_avg: smoothed.rolling_avg,
            rating: bortle::classify(self.domain, value),
        })
    }

    pub fn domain(&self) -> ClassificationDomain {
        self.domain
    }
}
