//! Wiggly selector: seeded value noise that drifts over time, blended
//! between a per-unit signal and one shared by the whole layer.

use crate::config::normalize_wiggly;
use crate::context::EvaluationContext;
use crate::error::ConfigRangeError;
use crate::noise::{self, SHARED_STREAM};
use crate::units::TextUnit;
use text_animator_data::{Combine, UnitKind, WigglySelectorConfig};

#[derive(Debug, Clone, PartialEq)]
pub struct WigglySelector {
    config: WigglySelectorConfig,
}

impl WigglySelector {
    pub fn new(config: &WigglySelectorConfig) -> Self {
        let mut errors = Vec::new();
        Self::with_report(config, &mut errors)
    }

    pub fn with_report(config: &WigglySelectorConfig, errors: &mut Vec<ConfigRangeError>) -> Self {
        Self {
            config: normalize_wiggly(config, errors),
        }
    }

    pub fn config(&self) -> &WigglySelectorConfig {
        &self.config
    }

    pub fn mode(&self) -> Combine {
        self.config.mode
    }

    pub fn based_on(&self) -> UnitKind {
        self.config.based_on
    }

    /// Whether vector properties share one noise sample across both axes.
    pub fn locks_dimensions(&self) -> bool {
        self.config.lock_dimensions
    }

    /// Weight in `[minAmount, maxAmount]` (and so in `[0, 100]`).
    pub fn evaluate(&self, unit: TextUnit, ctx: &EvaluationContext) -> f32 {
        self.evaluate_axis(unit, ctx, 0)
    }

    /// Weight from the independent noise stream of `axis`. Axis 0 is the
    /// scalar weight; axis 1 drives the Y component of unlocked vectors.
    pub fn evaluate_axis(&self, unit: TextUnit, ctx: &EvaluationContext, axis: u32) -> f32 {
        if ctx.total_units == 0 {
            return 0.0;
        }
        let cfg = &self.config;
        let seed = cfg.random_seed;
        let t = ctx.time * cfg.wiggles_per_second as f64;

        let correlation = cfg.correlation as f64 / 100.0;
        let shared = noise::value_noise(seed, SHARED_STREAM, axis, t);
        let own = noise::value_noise(seed, unit.index as u64, axis, t);
        let n = correlation * shared + (1.0 - correlation) * own;

        let min = cfg.min_amount as f64;
        let max = cfg.max_amount as f64;
        let w = min + (n + 1.0) * 0.5 * (max - min);
        if !w.is_finite() {
            return min.clamp(0.0, 100.0) as f32;
        }
        w.clamp(0.0, 100.0) as f32
    }
}
