//! Folding selector weights into one animator weight.

use text_animator_data::Combine;

fn clamp_weight(w: f32) -> f32 {
    if w.is_nan() {
        0.0
    } else {
        w.clamp(0.0, 100.0)
    }
}

/// Applies `mode` to fold `weight` into `acc`. Both sides and the result are
/// in `[0, 100]`.
pub fn combine(acc: f32, weight: f32, mode: Combine) -> f32 {
    let acc = clamp_weight(acc);
    let w = clamp_weight(weight);
    let out = match mode {
        Combine::Add => acc + w,
        Combine::Subtract => acc - w,
        Combine::Intersect => acc * (w / 100.0),
        Combine::Min => acc.min(w),
        Combine::Max => acc.max(w),
        Combine::Difference => (acc - w).abs(),
    };
    clamp_weight(out)
}

/// Running combination for one unit. The first pushed weight seeds the
/// value as-is; later weights fold in with their own mode.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Composer {
    acc: Option<f32>,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, weight: f32, mode: Combine) {
        self.acc = Some(match self.acc {
            None => clamp_weight(weight),
            Some(acc) => combine(acc, weight, mode),
        });
    }

    /// Current value; `0` before anything was pushed.
    pub fn value(&self) -> f32 {
        self.acc.unwrap_or(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.acc.is_none()
    }
}

/// Composes enabled selectors given in authored order.
pub fn compose<I>(selectors: I) -> f32
where
    I: IntoIterator<Item = (f32, Combine)>,
{
    let mut composer = Composer::new();
    for (weight, mode) in selectors {
        composer.push(weight, mode);
    }
    composer.value()
}
