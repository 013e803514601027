//! Bortle classification and the photometry that feeds it.
//!
//! Two classification domains exist and they are **not** interchangeable:
//!
//! ```text
//!  Lux  : brighter = larger value  → first t with v <  t, ascending table
//!  SQM  : darker   = larger value  → first t with v >= t, darkest boundary first
//! ```
//!
//! A value past every boundary is rating 9 in both domains.

use core::fmt;

use serde::Serialize;

use crate::config::{ClassificationDomain, SqmCalibration};

/// Floor applied before any logarithm or division result is trusted.
pub const EPSILON: f32 = 1e-6;

/// Ascending lux boundaries.  `v < threshold` selects the rating.
pub const LUX_THRESHOLDS: [(f32, u8); 8] = [
    (0.01, 1),
    (0.08, 2),
    (0.3, 3),
    (1.0, 4),
    (4.0, 5),
    (10.0, 6),
    (30.0, 7),
    (100.0, 8),
];

/// SQM boundaries, darkest first.  `v >= threshold` selects the rating.
pub const SQM_THRESHOLDS: [(f32, u8); 8] = [
    (21.99, 1),
    (21.89, 2),
    (21.69, 3),
    (20.49, 4),
    (19.50, 5),
    (18.94, 6),
    (18.38, 7),
    (17.80, 8),
];

/// A light-pollution rating, always within 1..=9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct BortleRating(u8);

impl BortleRating {
    /// Pristine dark sky.
    pub const DARKEST: Self = Self(1);
    /// Inner-city sky; also the safe-mode alert rating.
    pub const WORST: Self = Self(9);

    pub const fn new(value: u8) -> Option<Self> {
        if value >= 1 && value <= 9 {
            Some(Self(value))
        } else {
            None
        }
    }

    pub const fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for BortleRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Rate a smoothed lux value.  Negative or NaN input has no rating.
pub fn classify_lux(lux: f32) -> Option<BortleRating> {
    if lux.is_nan() || lux < 0.0 {
        return None;
    }
    let rating = LUX_THRESHOLDS
        .iter()
        .find(|(t, _)| lux < *t)
        .map_or(9, |&(_, r)| r);
    Some(BortleRating(rating))
}

/// Rate a smoothed SQM metric.  NaN has no rating.
pub fn classify_sqm(sqm: f32) -> Option<BortleRating> {
    if sqm.is_nan() {
        return None;
    }
    let rating = SQM_THRESHOLDS
        .iter()
        .find(|(t, _)| sqm >= *t)
        .map_or(9, |&(_, r)| r);
    Some(BortleRating(rating))
}

pub fn classify(domain: ClassificationDomain, value: f32) -> Option<BortleRating> {
    match domain {
        ClassificationDomain::Lux => classify_lux(value),
        ClassificationDomain::Sqm => classify_sqm(value),
    }
}

/// IR-corrected illuminance for a full-spectrum / infrared channel pair.
///
/// `cpl = integration_ms * gain / lux_df`, then
/// `lux = (ch0 - ch1) * (1 - ch1 / ch0) / cpl`.  When infrared is at or
/// above full spectrum, or the result is non-positive, it falls back to the
/// uncorrected difference, floored at [`EPSILON`].
pub fn ir_corrected_lux(ch0: u16, ch1: u16, integration_ms: u16, gain: f32, lux_df: f32) -> f32 {
    if ch0 == 0 {
        return EPSILON;
    }
    let cpl = f32::from(integration_ms) * gain / lux_df;
    if cpl.is_nan() || cpl <= 0.0 {
        return EPSILON;
    }
    let full = f32::from(ch0);
    let ir = f32::from(ch1);

    let lux = (full - ir) * (1.0 - ir / full) / cpl;
    if ch1 < ch0 && lux > 0.0 {
        lux
    } else {
        ((full - ir) / cpl).max(EPSILON)
    }
}

/// `a * log10(max(lux, EPSILON)) + b`
pub fn sqm_metric(lux: f32, calibration: &SqmCalibration) -> f32 {
    calibration.a * lux.max(EPSILON).log10() + calibration.b
}
