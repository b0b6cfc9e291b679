//! A text animator prepared for evaluation.
//!
//! Preparing normalizes the selector configuration, compiles the amount
//! expression and resolves the shuffle seed. It happens once per
//! configuration change; evaluation afterwards is a pure function of the
//! unit and the evaluation context.

use crate::combine::Composer;
use crate::context::EvaluationContext;
use crate::error::{ConfigRangeError, ExpressionError};
use crate::expression::{ExpressionLimits, ExpressionSelector};
use crate::noise;
use crate::properties::{self, AxisWeights, PropertyDeltas};
use crate::selectors::{RangeSelector, SelectorKind, UnitOrder, WigglySelector};
use crate::units::TextUnit;
use text_animator_data::{Animator, AnimatorProperties, UnitKind};

/// The unit a selector sees for the glyph being evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitSlot {
    pub unit: TextUnit,
    pub total_units: usize,
}

/// Combined weight of one unit plus the expression failure, if any, that
/// caused the expression selector to be skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitWeight {
    pub weights: AxisWeights,
    pub error: Option<ExpressionError>,
}

impl UnitWeight {
    pub fn scalar(&self) -> f32 {
        self.weights.scalar()
    }
}

#[derive(Debug, Clone)]
pub struct PreparedAnimator {
    id: String,
    name: String,
    enabled: bool,
    range: Option<RangeSelector>,
    wiggly: Option<WigglySelector>,
    expression: Option<ExpressionSelector>,
    properties: AnimatorProperties,
    config_errors: Vec<ConfigRangeError>,
}

impl PreparedAnimator {
    pub fn new(animator: &Animator) -> Self {
        Self::with_limits(animator, &ExpressionLimits::default())
    }

    pub fn with_limits(animator: &Animator, limits: &ExpressionLimits) -> Self {
        let mut config_errors = Vec::new();

        let range = animator.range_selector.enabled.then(|| {
            RangeSelector::with_report(&animator.range_selector, &mut config_errors)
                .with_fallback_seed(noise::seed_from_str(&animator.id))
        });
        let wiggly = animator
            .wiggly_selector
            .as_ref()
            .filter(|w| w.enabled)
            .map(|w| WigglySelector::with_report(w, &mut config_errors));
        let expression = animator
            .expression_selector
            .as_ref()
            .filter(|e| e.enabled)
            .map(|e| ExpressionSelector::with_limits(e, limits));

        for error in &config_errors {
            tracing::warn!(animator = %animator.id, "{error}; value normalized");
        }
        if let Some(error) = expression.as_ref().and_then(ExpressionSelector::parse_error) {
            tracing::warn!(animator = %animator.id, "expression selector disabled: {error}");
        }

        Self {
            id: animator.id.clone(),
            name: animator.name.clone(),
            enabled: animator.enabled,
            range,
            wiggly,
            expression,
            properties: animator.properties.clone(),
            config_errors,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn properties(&self) -> &AnimatorProperties {
        &self.properties
    }

    /// Range problems found while preparing, reported once.
    pub fn config_errors(&self) -> &[ConfigRangeError] {
        &self.config_errors
    }

    pub fn expression_parse_error(&self) -> Option<&ExpressionError> {
        self.expression.as_ref().and_then(ExpressionSelector::parse_error)
    }

    pub fn range_selector(&self) -> Option<&RangeSelector> {
        self.range.as_ref()
    }

    pub fn wiggly_selector(&self) -> Option<&WigglySelector> {
        self.wiggly.as_ref()
    }

    pub fn expression_selector(&self) -> Option<&ExpressionSelector> {
        self.expression.as_ref()
    }

    /// `basedOn` of each enabled selector, in application order.
    pub fn selector_units(&self) -> impl Iterator<Item = (SelectorKind, UnitKind)> + '_ {
        let range = self.range.as_ref().map(|s| (SelectorKind::Range, s.based_on()));
        let wiggly = self.wiggly.as_ref().map(|s| (SelectorKind::Wiggly, s.based_on()));
        let expression = self
            .expression
            .as_ref()
            .map(|s| (SelectorKind::Expression, s.based_on()));
        range.into_iter().chain(wiggly).chain(expression)
    }

    /// Window ordering of the range selector for `total_units` units.
    pub fn unit_order(&self, total_units: usize) -> UnitOrder {
        match &self.range {
            Some(range) => range.order(total_units),
            None => UnitOrder::Sequential,
        }
    }

    fn splits_axes(&self) -> bool {
        self.wiggly.as_ref().is_some_and(|w| !w.locks_dimensions())
    }

    /// Weight of `unit` when every selector works on the same unit kind.
    ///
    /// Builds the unit order on each call; loops over every unit should use
    /// [`PreparedAnimator::evaluate_units`].
    pub fn evaluate(&self, unit: TextUnit, ctx: &EvaluationContext) -> UnitWeight {
        let order = self.unit_order(ctx.total_units);
        self.evaluate_ordered(unit, ctx, &order)
    }

    /// Weights of units `0..ctx.total_units` of `kind`, sharing one unit order.
    pub fn evaluate_units(&self, kind: UnitKind, ctx: &EvaluationContext) -> Vec<UnitWeight> {
        let order = self.unit_order(ctx.total_units);
        (0..ctx.total_units)
            .map(|index| self.evaluate_ordered(TextUnit::new(index, kind), ctx, &order))
            .collect()
    }

    fn evaluate_ordered(&self, unit: TextUnit, ctx: &EvaluationContext, order: &UnitOrder) -> UnitWeight {
        let slot = UnitSlot {
            unit,
            total_units: ctx.total_units,
        };
        self.evaluate_slots(|_| Some(slot), ctx.frame, ctx.time, order)
    }

    /// Weight of one rendered glyph. `locate` maps a selector's `basedOn` to
    /// the unit containing the glyph, or `None` when the glyph belongs to no
    /// unit of that kind. `order` must come from [`PreparedAnimator::unit_order`]
    /// for the range selector's unit count.
    pub fn evaluate_slots<F>(&self, locate: F, frame: i64, time: f64, order: &UnitOrder) -> UnitWeight
    where
        F: Fn(UnitKind) -> Option<UnitSlot>,
    {
        let (x, error) = self.compose_axis(&locate, frame, time, order, 0);
        let y = if self.splits_axes() {
            self.compose_axis(&locate, frame, time, order, 1).0
        } else {
            x
        };
        UnitWeight {
            weights: AxisWeights { x, y },
            error,
        }
    }

    fn compose_axis<F>(
        &self,
        locate: &F,
        frame: i64,
        time: f64,
        order: &UnitOrder,
        axis: u32,
    ) -> (f32, Option<ExpressionError>)
    where
        F: Fn(UnitKind) -> Option<UnitSlot>,
    {
        let ctx_for = |slot: &UnitSlot| EvaluationContext::new(frame, time, slot.total_units);
        let mut composer = Composer::new();
        let mut failure = None;

        if let Some(range) = &self.range {
            let w = locate(range.based_on())
                .map(|s| range.evaluate_ordered(s.unit, s.total_units, order))
                .unwrap_or(0.0);
            composer.push(w, range.mode());
        }

        if let Some(wiggly) = &self.wiggly {
            let w = locate(wiggly.based_on())
                .map(|s| wiggly.evaluate_axis(s.unit, &ctx_for(&s), axis))
                .unwrap_or(0.0);
            composer.push(w, wiggly.mode());
        }

        // A selector that failed to compile was reported once at preparation.
        let compiled = self.expression.as_ref().filter(|e| e.parse_error().is_none());
        if let Some(expression) = compiled {
            match locate(expression.based_on()) {
                Some(s) => match expression.evaluate(s.unit, &ctx_for(&s), composer.value()) {
                    Ok(w) => composer.push(w, expression.mode()),
                    Err(e) => {
                        tracing::trace!(animator = %self.id, unit = s.unit.index, "{e}");
                        failure = Some(e);
                    }
                },
                None => composer.push(0.0, expression.mode()),
            }
        }

        (composer.value(), failure)
    }

    /// Property deltas for a unit with the given weights.
    pub fn deltas(&self, weights: AxisWeights) -> PropertyDeltas {
        properties::apply(weights, &self.properties)
    }
}
