//! Range selector: a percentage window over the unit sequence, shaped and
//! eased into a weight.

use crate::config::normalize_range;
use crate::error::ConfigRangeError;
use crate::noise;
use crate::units::TextUnit;
use text_animator_data::{Combine, Ease, RangeSelectorConfig, Shape, UnitKind};

/// Maps a unit index to its position in the window ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOrder {
    Sequential,
    Shuffled(Vec<usize>),
}

impl UnitOrder {
    pub fn rank(&self, index: usize) -> usize {
        match self {
            UnitOrder::Sequential => index,
            UnitOrder::Shuffled(ranks) => ranks.get(index).copied().unwrap_or(index),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RangeSelector {
    config: RangeSelectorConfig,
    shuffle_seed: u64,
}

impl RangeSelector {
    /// Builds a selector from `config`, normalizing out-of-range values.
    pub fn new(config: &RangeSelectorConfig) -> Self {
        let mut errors = Vec::new();
        Self::with_report(config, &mut errors)
    }

    /// Like [`RangeSelector::new`] but reports what normalization changed.
    pub fn with_report(config: &RangeSelectorConfig, errors: &mut Vec<ConfigRangeError>) -> Self {
        let config = normalize_range(config, errors);
        let shuffle_seed = config.random_seed.map(u64::from).unwrap_or(0);
        Self {
            config,
            shuffle_seed,
        }
    }

    /// Seed for `randomizeOrder` when the configuration carries none.
    pub fn with_fallback_seed(mut self, seed: u64) -> Self {
        if self.config.random_seed.is_none() {
            self.shuffle_seed = seed;
        }
        self
    }

    pub fn config(&self) -> &RangeSelectorConfig {
        &self.config
    }

    pub fn mode(&self) -> Combine {
        self.config.mode
    }

    pub fn based_on(&self) -> UnitKind {
        self.config.based_on
    }

    pub fn order(&self, total_units: usize) -> UnitOrder {
        if self.config.randomize_order && total_units > 1 {
            UnitOrder::Shuffled(noise::shuffled_ranks(self.shuffle_seed, total_units))
        } else {
            UnitOrder::Sequential
        }
    }

    /// Weight in `[0, 100]` for `unit` out of `total_units`.
    ///
    /// Recomputes the shuffle when `randomizeOrder` is set; callers that
    /// evaluate many units should compute [`RangeSelector::order`] once and
    /// use [`RangeSelector::evaluate_ordered`], or [`RangeSelector::evaluate_all`].
    pub fn evaluate(&self, unit: TextUnit, total_units: usize) -> f32 {
        let order = self.order(total_units);
        self.evaluate_ordered(unit, total_units, &order)
    }

    /// Weights of units `0..total_units`, shuffling at most once.
    pub fn evaluate_all(&self, kind: UnitKind, total_units: usize) -> Vec<f32> {
        let order = self.order(total_units);
        (0..total_units)
            .map(|index| self.evaluate_ordered(TextUnit::new(index, kind), total_units, &order))
            .collect()
    }

    pub fn evaluate_ordered(&self, unit: TextUnit, total_units: usize, order: &UnitOrder) -> f32 {
        if total_units == 0 {
            return 0.0;
        }
        let rank = order.rank(unit.index);
        self.evaluate_rank(rank, total_units)
    }

    fn evaluate_rank(&self, rank: usize, total_units: usize) -> f32 {
        let cfg = &self.config;
        let p = (rank as f64 + 0.5) / total_units as f64;

        let lo = cfg.start.min(cfg.end) as f64 / 100.0;
        let hi = cfg.start.max(cfg.end) as f64 / 100.0;
        let offset = (cfg.offset as f64 / 100.0).rem_euclid(1.0);
        let t = window_position(p - offset, lo, hi);

        let smoothness = cfg.smoothness as f64 / 100.0;
        let r = shape_value(cfg.shape, t, lo, hi, smoothness);
        let r = apply_ease(r, cfg.ease);

        (r * cfg.amount as f64).clamp(0.0, 100.0) as f32
    }
}

/// Position of a unit relative to the unshifted window. A window pushed
/// across the end of the sequence continues at its start, so the wrapped
/// copy that lands inside `[lo, hi]` wins; units outside keep their unwrapped
/// position and stay before or after the window.
fn window_position(shifted: f64, lo: f64, hi: f64) -> f64 {
    [shifted, shifted + 1.0, shifted - 1.0]
        .into_iter()
        .find(|t| (lo..=hi).contains(t))
        .unwrap_or(shifted)
}

fn smoothstep(x: f64) -> f64 {
    let x = x.clamp(0.0, 1.0);
    x * x * (3.0 - 2.0 * x)
}

/// Blends a piecewise-linear profile toward its smoothstep counterpart,
/// rounding the corners where the ramp meets the plateau or the peak.
fn feather(v: f64, smoothness: f64) -> f64 {
    v + (smoothstep(v) - v) * smoothness
}

fn shape_value(shape: Shape, t: f64, lo: f64, hi: f64, smoothness: f64) -> f64 {
    let width = hi - lo;
    if width <= f64::EPSILON {
        return match shape {
            Shape::RampUp => (t >= lo) as u8 as f64,
            Shape::RampDown => (t < lo) as u8 as f64,
            _ => 0.0,
        };
    }

    let u = (t - lo) / width;
    let inside = (0.0..=1.0).contains(&u);
    // 0 at the window edges, 1 at its center
    let peak = 1.0 - (2.0 * u - 1.0).abs();

    match shape {
        Shape::Square => {
            if !inside {
                0.0
            } else if smoothness <= 0.0 {
                1.0
            } else {
                // Feather half-width as a fraction of the window; at 100% the
                // two edges meet in the middle and never cross.
                let f = smoothness * 0.5;
                let edge = (u / f).min((1.0 - u) / f).min(1.0);
                smoothstep(edge)
            }
        }
        Shape::RampUp => feather(u.clamp(0.0, 1.0), smoothness),
        Shape::RampDown => feather((1.0 - u).clamp(0.0, 1.0), smoothness),
        Shape::Triangle if inside => feather(peak, smoothness),
        Shape::Round if inside => {
            let v = 2.0 * u - 1.0;
            let circle = (1.0 - v * v).max(0.0).sqrt();
            circle + (smoothstep(peak) - circle) * smoothness
        }
        Shape::Smooth if inside => smoothstep(peak),
        _ => 0.0,
    }
}

/// `high` flattens the curve near full weight (more units end up high),
/// `low` flattens it near zero (more units end up low).
fn apply_ease(r: f64, ease: Ease) -> f64 {
    let mut r = r.clamp(0.0, 1.0);
    if ease.high > 0.0 {
        let k = 1.0 + 2.0 * ease.high as f64 / 100.0;
        r = 1.0 - (1.0 - r).powf(k);
    }
    if ease.low > 0.0 {
        let k = 1.0 + 2.0 * ease.low as f64 / 100.0;
        r = r.powf(k);
    }
    r
}
