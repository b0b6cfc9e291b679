//! Expression selector.
//!
//! The amount expression is compiled once when the animator is prepared and
//! then evaluated per unit per frame against a fixed set of variables:
//! `textIndex` (0-based), `textTotal`, `selectorValue` (running value of the
//! selectors above), `time` (seconds) and `frame`.

pub mod ast;
pub mod parser;

pub use ast::{Bindings, Expr, Function, Variable};
pub use parser::ExpressionLimits;

use crate::context::EvaluationContext;
use crate::error::{EvalError, ExpressionError};
use crate::units::TextUnit;
use std::str::FromStr;
use text_animator_data::{Combine, ExpressionSelectorConfig, UnitKind};

/// A parsed, immutable amount expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    source: String,
    ast: Expr,
    nodes: usize,
    step_budget: usize,
}

impl Expression {
    pub fn parse(source: &str) -> Result<Self, ExpressionError> {
        Self::parse_with_limits(source, &ExpressionLimits::default())
    }

    pub fn parse_with_limits(source: &str, limits: &ExpressionLimits) -> Result<Self, ExpressionError> {
        let (ast, nodes) = parser::parse(source, limits)?;
        Ok(Self {
            source: source.to_string(),
            ast,
            nodes,
            step_budget: limits.step_budget,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn ast(&self) -> &Expr {
        &self.ast
    }

    pub fn node_count(&self) -> usize {
        self.nodes
    }

    /// Evaluates the expression. Non-finite results are errors.
    pub fn evaluate(&self, bindings: &Bindings) -> Result<f64, ExpressionError> {
        let value = ast::Evaluator::new(bindings, self.step_budget).eval(&self.ast)?;
        if !value.is_finite() {
            return Err(EvalError::NonFinite.into());
        }
        Ok(value)
    }
}

impl FromStr for Expression {
    type Err = ExpressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionSelector {
    mode: Combine,
    based_on: UnitKind,
    compiled: Result<Expression, ExpressionError>,
}

impl ExpressionSelector {
    pub fn new(config: &ExpressionSelectorConfig) -> Self {
        Self::with_limits(config, &ExpressionLimits::default())
    }

    pub fn with_limits(config: &ExpressionSelectorConfig, limits: &ExpressionLimits) -> Self {
        Self {
            mode: config.mode,
            based_on: config.based_on,
            compiled: Expression::parse_with_limits(&config.amount_expression, limits),
        }
    }

    pub fn mode(&self) -> Combine {
        self.mode
    }

    pub fn based_on(&self) -> UnitKind {
        self.based_on
    }

    /// The error from compiling the expression, if it did not parse.
    pub fn parse_error(&self) -> Option<&ExpressionError> {
        self.compiled.as_ref().err()
    }

    /// Weight in `[0, 100]` for `unit`. `selector_value` is the combined
    /// weight of the selectors applied before this one.
    pub fn evaluate(
        &self,
        unit: TextUnit,
        ctx: &EvaluationContext,
        selector_value: f32,
    ) -> Result<f32, ExpressionError> {
        let expression = self.compiled.as_ref().map_err(Clone::clone)?;
        let bindings = Bindings {
            text_index: unit.index as f64,
            text_total: ctx.total_units as f64,
            selector_value: selector_value as f64,
            time: ctx.time,
            frame: ctx.frame as f64,
        };
        let value = expression.evaluate(&bindings)?;
        Ok(value.clamp(0.0, 100.0) as f32)
    }
}
