use crate::selectors::SelectorKind;
use thiserror::Error;

/// Coarse classification surfaced to the editor for inline feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpressionErrorKind {
    ParseError,
    EvalError,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvalError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("modulo by zero")]
    ModuloByZero,
    #[error("result is not a finite number")]
    NonFinite,
    #[error("evaluation exceeded its budget of {budget} steps")]
    BudgetExceeded { budget: usize },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExpressionError {
    #[error("parse error at offset {offset}: {message}")]
    Parse { offset: usize, message: String },
    #[error("evaluation error: {0}")]
    Eval(#[from] EvalError),
}

impl ExpressionError {
    pub(crate) fn parse(offset: usize, message: impl Into<String>) -> Self {
        ExpressionError::Parse {
            offset,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ExpressionErrorKind {
        match self {
            ExpressionError::Parse { .. } => ExpressionErrorKind::ParseError,
            ExpressionError::Eval(_) => ExpressionErrorKind::EvalError,
        }
    }
}

/// Authoring mistakes found while preparing an animator. The offending value
/// is normalized and evaluation proceeds with it.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigRangeError {
    #[error("{selector} selector `{field}` = {value} is outside [{min}, {max}]")]
    OutOfRange {
        selector: SelectorKind,
        field: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },
    #[error("{selector} selector `{field}` is not a finite number")]
    NotFinite {
        selector: SelectorKind,
        field: &'static str,
    },
    #[error("wiggly selector `wigglesPerSecond` must be positive, got {0}")]
    NonPositiveFrequency(f32),
    #[error("wiggly selector `minAmount` ({min}) exceeds `maxAmount` ({max})")]
    InvertedAmountBounds { min: f32, max: f32 },
}
