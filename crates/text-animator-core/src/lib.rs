//! Selector and composition engine for text animators.
//!
//! An animator decides, per text unit and frame, how strongly its properties
//! apply. Up to three selectors produce weights in `[0, 100]`: a range
//! selector shaping a window over the units, a wiggly selector adding
//! seeded noise, and an expression selector evaluating a small formula.
//! Their weights are folded in that order, then the properties are scaled by
//! the result.
//!
//! ```
//! use text_animator_core::{EvaluationContext, PreparedAnimator, TextUnit};
//! use text_animator_data::{Animator, RangeSelectorConfig, Shape, UnitKind};
//!
//! let animator = Animator {
//!     range_selector: RangeSelectorConfig {
//!         shape: Shape::RampUp,
//!         ..Default::default()
//!     },
//!     ..Animator::new("fade", "Fade in")
//! };
//! let prepared = PreparedAnimator::new(&animator);
//! let ctx = EvaluationContext::new(0, 0.0, 4);
//! let w = prepared.evaluate(TextUnit::new(0, UnitKind::Character), &ctx);
//! assert_eq!(w.scalar(), 12.5);
//! ```

pub mod animator;
pub mod combine;
pub mod config;
pub mod context;
pub mod error;
pub mod expression;
pub mod layer;
pub mod noise;
pub mod properties;
pub mod selectors;
pub mod units;

pub use animator::{PreparedAnimator, UnitSlot, UnitWeight};
pub use combine::{combine, compose, Composer};
pub use context::EvaluationContext;
pub use error::{ConfigRangeError, EvalError, ExpressionError, ExpressionErrorKind};
pub use expression::{Expression, ExpressionLimits, ExpressionSelector};
pub use layer::{evaluate_layer, Diagnostic, GlyphState, LayerEvaluation, LayerEvaluator};
pub use properties::{AxisWeights, ColorBlend, PropertyDeltas};
pub use selectors::{RangeSelector, SelectorKind, UnitOrder, WigglySelector};
pub use units::{enumerate, TextLayout, TextUnit, TextUnits};

pub use text_animator_data as data;
