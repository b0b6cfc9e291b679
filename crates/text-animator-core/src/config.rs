//! Load-time normalization of selector configuration.
//!
//! Out-of-range values are authoring mistakes: each one is reported once as a
//! [`ConfigRangeError`] and replaced by the nearest valid value (or the
//! field's default when it is not a number at all). `offset` has no range;
//! it wraps when the window is placed.

use crate::error::ConfigRangeError;
use crate::selectors::SelectorKind;
use text_animator_data::{RangeSelectorConfig, WigglySelectorConfig};

struct Checker<'a> {
    selector: SelectorKind,
    errors: &'a mut Vec<ConfigRangeError>,
}

impl Checker<'_> {
    fn bounded(&mut self, field: &'static str, value: f32, min: f32, max: f32, fallback: f32) -> f32 {
        if !value.is_finite() {
            self.errors.push(ConfigRangeError::NotFinite {
                selector: self.selector,
                field,
            });
            return fallback;
        }
        if value < min || value > max {
            self.errors.push(ConfigRangeError::OutOfRange {
                selector: self.selector,
                field,
                value,
                min,
                max,
            });
            return value.clamp(min, max);
        }
        value
    }

    fn finite(&mut self, field: &'static str, value: f32, fallback: f32) -> f32 {
        self.bounded(field, value, f32::NEG_INFINITY, f32::INFINITY, fallback)
    }

    fn percent(&mut self, field: &'static str, value: f32, fallback: f32) -> f32 {
        self.bounded(field, value, 0.0, 100.0, fallback)
    }
}

pub fn normalize_range(
    config: &RangeSelectorConfig,
    errors: &mut Vec<ConfigRangeError>,
) -> RangeSelectorConfig {
    let defaults = RangeSelectorConfig::default();
    let mut check = Checker {
        selector: SelectorKind::Range,
        errors,
    };

    let mut out = config.clone();
    out.start = check.percent("start", config.start, defaults.start);
    out.end = check.percent("end", config.end, defaults.end);
    out.offset = check.finite("offset", config.offset, defaults.offset);
    out.smoothness = check.percent("smoothness", config.smoothness, defaults.smoothness);
    out.amount = check.percent("amount", config.amount, defaults.amount);
    out.ease.low = check.percent("ease.low", config.ease.low, 0.0);
    out.ease.high = check.percent("ease.high", config.ease.high, 0.0);

    // A reversed window is legal input, not an error.
    if out.start > out.end {
        std::mem::swap(&mut out.start, &mut out.end);
    }
    out
}

pub fn normalize_wiggly(
    config: &WigglySelectorConfig,
    errors: &mut Vec<ConfigRangeError>,
) -> WigglySelectorConfig {
    let defaults = WigglySelectorConfig::default();
    let mut out = config.clone();
    {
        let mut check = Checker {
            selector: SelectorKind::Wiggly,
            errors: &mut *errors,
        };
        out.max_amount = check.percent("maxAmount", config.max_amount, defaults.max_amount);
        out.min_amount = check.percent("minAmount", config.min_amount, defaults.min_amount);
        out.correlation = check.percent("correlation", config.correlation, defaults.correlation);
    }

    if !(config.wiggles_per_second.is_finite() && config.wiggles_per_second > 0.0) {
        errors.push(ConfigRangeError::NonPositiveFrequency(
            config.wiggles_per_second,
        ));
        out.wiggles_per_second = defaults.wiggles_per_second;
    }

    if out.min_amount > out.max_amount {
        errors.push(ConfigRangeError::InvertedAmountBounds {
            min: out.min_amount,
            max: out.max_amount,
        });
        std::mem::swap(&mut out.min_amount, &mut out.max_amount);
    }
    out
}
