//! Evaluating every animator of a text layer for one frame.
//!
//! Output is per rendered character (grapheme). Each selector locates the
//! character's unit through its own `basedOn`, so word- and line-based
//! selectors move whole words or lines together.

use crate::animator::{PreparedAnimator, UnitSlot};
use crate::error::{ConfigRangeError, ExpressionError};
use crate::expression::ExpressionLimits;
use crate::properties::{AxisWeights, PropertyDeltas};
use crate::selectors::UnitOrder;
use crate::units::{TextLayout, TextUnit};
use glam::{Vec2, Vec4};
use serde::Serialize;
use std::collections::HashSet;
use std::ops::Range;
use text_animator_data::{Animator, TextLayerDocument, UnitKind};

/// Transform and appearance of one character after all animators ran.
///
/// Scale and opacity are percentages (100 is the untouched glyph). Colors are
/// `None` when neither a base color nor any animator set them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlyphState {
    pub index: usize,
    pub byte_range: Range<usize>,
    pub position: Vec2,
    pub scale: Vec2,
    pub rotation: f32,
    pub opacity: f32,
    pub blur: Vec2,
    pub tracking: f32,
    pub fill_color: Option<Vec4>,
    pub stroke_color: Option<Vec4>,
}

impl GlyphState {
    pub fn new(index: usize, byte_range: Range<usize>) -> Self {
        Self {
            index,
            byte_range,
            position: Vec2::ZERO,
            scale: Vec2::splat(100.0),
            rotation: 0.0,
            opacity: 100.0,
            blur: Vec2::ZERO,
            tracking: 0.0,
            fill_color: None,
            stroke_color: None,
        }
    }

    fn with_colors(mut self, fill: Option<Vec4>, stroke: Option<Vec4>) -> Self {
        self.fill_color = fill;
        self.stroke_color = stroke;
        self
    }

    /// Accumulates one animator's deltas. Colors blend from the current value,
    /// which starts at transparent black when no base color was given.
    pub fn apply(&mut self, deltas: &PropertyDeltas) {
        if let Some(p) = deltas.position {
            self.position += p;
        }
        if let Some(s) = deltas.scale {
            self.scale += s;
        }
        if let Some(r) = deltas.rotation {
            self.rotation += r;
        }
        if let Some(o) = deltas.opacity {
            self.opacity = (self.opacity + o).clamp(0.0, 100.0);
        }
        if let Some(b) = deltas.blur {
            self.blur = (self.blur + b).max(Vec2::ZERO);
        }
        if let Some(t) = deltas.tracking {
            self.tracking += t;
        }
        if let Some(blend) = deltas.fill_color {
            self.fill_color = Some(blend.apply(self.fill_color.unwrap_or(Vec4::ZERO)));
        }
        if let Some(blend) = deltas.stroke_color {
            self.stroke_color = Some(blend.apply(self.stroke_color.unwrap_or(Vec4::ZERO)));
        }
    }
}

/// An expression failure on one unit. The failing selector was skipped for
/// that unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub animator_id: String,
    pub unit: TextUnit,
    pub error: ExpressionError,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerEvaluation {
    pub glyphs: Vec<GlyphState>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Per-frame data shared by every glyph: the unit order of each animator.
struct FramePlan {
    orders: Vec<UnitOrder>,
}

pub struct LayerEvaluator {
    layout: TextLayout,
    animators: Vec<PreparedAnimator>,
    frame_rate: f64,
    base_fill: Option<Vec4>,
    base_stroke: Option<Vec4>,
}

impl LayerEvaluator {
    pub fn new(text: &str, animators: &[Animator]) -> Self {
        Self::with_limits(text, animators, &ExpressionLimits::default())
    }

    pub fn with_limits(text: &str, animators: &[Animator], limits: &ExpressionLimits) -> Self {
        let layout = TextLayout::new(text);
        let animators: Vec<_> = animators
            .iter()
            .map(|a| PreparedAnimator::with_limits(a, limits))
            .collect();
        tracing::debug!(
            graphemes = layout.grapheme_count(),
            words = layout.total_units(UnitKind::Word),
            lines = layout.total_units(UnitKind::Line),
            animators = animators.len(),
            "prepared text layer"
        );
        Self {
            layout,
            animators,
            frame_rate: 30.0,
            base_fill: None,
            base_stroke: None,
        }
    }

    pub fn from_document(document: &TextLayerDocument) -> Self {
        Self::new(&document.text, &document.animators)
            .with_frame_rate(document.frame_rate as f64)
            .with_base_colors(
                document.base_fill.map(Vec4::from),
                document.base_stroke.map(Vec4::from),
            )
    }

    pub fn with_frame_rate(mut self, frame_rate: f64) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    pub fn with_base_colors(mut self, fill: Option<Vec4>, stroke: Option<Vec4>) -> Self {
        self.base_fill = fill;
        self.base_stroke = stroke;
        self
    }

    pub fn layout(&self) -> &TextLayout {
        &self.layout
    }

    pub fn animators(&self) -> &[PreparedAnimator] {
        &self.animators
    }

    /// Normalization problems of every animator, paired with its id.
    pub fn config_diagnostics(&self) -> Vec<(&str, &ConfigRangeError)> {
        self.animators
            .iter()
            .flat_map(|a| a.config_errors().iter().map(move |e| (a.id(), e)))
            .collect()
    }

    /// Compile errors of expression selectors, paired with the animator id.
    pub fn expression_errors(&self) -> Vec<(&str, &ExpressionError)> {
        self.animators
            .iter()
            .filter_map(|a| a.expression_parse_error().map(|e| (a.id(), e)))
            .collect()
    }

    /// Evaluates `frame`, deriving time from the layer's frame rate.
    pub fn evaluate_frame(&self, frame: i64) -> LayerEvaluation {
        let time = if self.frame_rate > 0.0 {
            frame as f64 / self.frame_rate
        } else {
            0.0
        };
        self.evaluate(frame, time)
    }

    pub fn evaluate(&self, frame: i64, time: f64) -> LayerEvaluation {
        let plan = self.plan();
        let results = (0..self.layout.grapheme_count())
            .map(|g| self.evaluate_glyph(&plan, g, frame, time))
            .collect();
        self.finish(results)
    }

    /// Same result as [`LayerEvaluator::evaluate`], with glyphs spread over
    /// the rayon pool.
    #[cfg(feature = "parallel")]
    pub fn evaluate_parallel(&self, frame: i64, time: f64) -> LayerEvaluation {
        use rayon::prelude::*;

        let plan = self.plan();
        let results = (0..self.layout.grapheme_count())
            .into_par_iter()
            .map(|g| self.evaluate_glyph(&plan, g, frame, time))
            .collect();
        self.finish(results)
    }

    fn plan(&self) -> FramePlan {
        let orders = self
            .animators
            .iter()
            .map(|a| {
                let total = a
                    .range_selector()
                    .map(|r| self.layout.total_units(r.based_on()))
                    .unwrap_or(0);
                a.unit_order(total)
            })
            .collect();
        FramePlan { orders }
    }

    fn evaluate_glyph(
        &self,
        plan: &FramePlan,
        grapheme: usize,
        frame: i64,
        time: f64,
    ) -> (GlyphState, Vec<(usize, Diagnostic)>) {
        let span = self.layout.grapheme_span(grapheme).unwrap_or_default();
        let mut glyph =
            GlyphState::new(grapheme, span).with_colors(self.base_fill, self.base_stroke);
        let mut failures = Vec::new();

        let locate = |kind: UnitKind| {
            self.layout.locate(grapheme, kind).map(|unit| UnitSlot {
                unit,
                total_units: self.layout.total_units(kind),
            })
        };

        for (i, (animator, order)) in self.animators.iter().zip(&plan.orders).enumerate() {
            if !animator.is_enabled() {
                continue;
            }
            let weight = animator.evaluate_slots(locate, frame, time, order);
            if let Some(error) = weight.error {
                let unit = animator
                    .expression_selector()
                    .and_then(|e| self.layout.locate(grapheme, e.based_on()))
                    .unwrap_or(TextUnit::new(grapheme, UnitKind::Character));
                failures.push((
                    i,
                    Diagnostic {
                        animator_id: animator.id().to_string(),
                        unit,
                        error,
                    },
                ));
            }
            glyph.apply(&animator.deltas(weight.weights));
        }

        (glyph, failures)
    }

    fn finish(&self, results: Vec<(GlyphState, Vec<(usize, Diagnostic)>)>) -> LayerEvaluation {
        let mut seen = HashSet::new();
        let mut evaluation = LayerEvaluation::default();
        for (glyph, failures) in results {
            evaluation.glyphs.push(glyph);
            for (animator, diagnostic) in failures {
                if seen.insert((animator, diagnostic.unit.index)) {
                    evaluation.diagnostics.push(diagnostic);
                }
            }
        }
        if !evaluation.diagnostics.is_empty() {
            tracing::debug!(count = evaluation.diagnostics.len(), "expression failures this frame");
        }
        evaluation
    }

    /// Weights of a single animator for every unit of its range selector's
    /// `basedOn` kind, as a preview curve.
    pub fn unit_weights(&self, animator: usize, frame: i64, time: f64) -> Option<Vec<AxisWeights>> {
        let prepared = self.animators.get(animator)?;
        let kind = prepared
            .range_selector()
            .map(|r| r.based_on())
            .unwrap_or(UnitKind::Character);
        let total = self.layout.total_units(kind);
        let order = prepared.unit_order(total);
        let weights = (0..total)
            .map(|index| {
                let slot = UnitSlot {
                    unit: TextUnit::new(index, kind),
                    total_units: total,
                };
                prepared
                    .evaluate_slots(|_| Some(slot), frame, time, &order)
                    .weights
            })
            .collect();
        Some(weights)
    }
}

/// Evaluates one frame of a document.
pub fn evaluate_layer(document: &TextLayerDocument, frame: i64) -> LayerEvaluation {
    LayerEvaluator::from_document(document).evaluate_frame(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use text_animator_data::{AnimatorProperty, ExpressionSelectorConfig, RangeSelectorConfig, Shape};

    fn animator(id: &str, based_on: UnitKind, props: &[AnimatorProperty]) -> Animator {
        Animator {
            id: id.into(),
            range_selector: RangeSelectorConfig {
                based_on,
                shape: Shape::RampUp,
                ..Default::default()
            },
            properties: props.iter().copied().collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_no_animators_is_identity() {
        let eval = LayerEvaluator::new("ab c", &[]).evaluate(0, 0.0);
        assert_eq!(eval.glyphs.len(), 4);
        assert!(eval.glyphs.iter().all(|g| g.scale == Vec2::splat(100.0) && g.opacity == 100.0));
        assert_eq!(eval.glyphs[3].byte_range, 3..4);
    }

    #[test]
    fn test_character_ramp_offsets_positions() {
        let a = animator("a", UnitKind::Character, &[AnimatorProperty::Position([0.0, 40.0])]);
        let eval = LayerEvaluator::new("abcd", &[a]).evaluate(0, 0.0);
        let ys: Vec<f32> = eval.glyphs.iter().map(|g| g.position.y).collect();
        assert_eq!(ys, vec![5.0, 15.0, 25.0, 35.0]);
    }

    #[test]
    fn test_word_based_moves_words_together() {
        let a = animator("w", UnitKind::Word, &[AnimatorProperty::Rotation(100.0)]);
        let eval = LayerEvaluator::new("ab cd", &[a]).evaluate(0, 0.0);
        let r: Vec<f32> = eval.glyphs.iter().map(|g| g.rotation).collect();
        assert_eq!(r, vec![25.0, 25.0, 0.0, 75.0, 75.0]);
    }

    #[test]
    fn test_line_based() {
        let a = animator("l", UnitKind::Line, &[AnimatorProperty::Tracking(10.0)]);
        let eval = LayerEvaluator::new("a\nb", &[a]).evaluate(0, 0.0);
        let t: Vec<f32> = eval.glyphs.iter().map(|g| g.tracking).collect();
        assert_eq!(t, vec![2.5, 0.0, 7.5]);
    }

    #[test]
    fn test_animators_accumulate_in_order() {
        let mut a = animator("a", UnitKind::Character, &[AnimatorProperty::Opacity(0.0)]);
        a.range_selector.shape = Shape::Square;
        let mut b = a.clone();
        b.id = "b".into();
        b.properties = [AnimatorProperty::FillColor([1.0, 0.0, 0.0, 1.0])]
            .into_iter()
            .collect();
        let evaluator = LayerEvaluator::new("x", &[a, b])
            .with_base_colors(Some(Vec4::new(0.0, 0.0, 1.0, 1.0)), None);
        let glyph = &evaluator.evaluate(0, 0.0).glyphs[0];
        assert_eq!(glyph.opacity, 0.0);
        assert_eq!(glyph.fill_color, Some(Vec4::new(1.0, 0.0, 0.0, 1.0)));
        assert_eq!(glyph.stroke_color, None);
    }

    #[test]
    fn test_disabled_animator_is_skipped() {
        let mut a = animator("a", UnitKind::Character, &[AnimatorProperty::Rotation(90.0)]);
        a.enabled = false;
        let eval = LayerEvaluator::new("abc", &[a]).evaluate(0, 0.0);
        assert!(eval.glyphs.iter().all(|g| g.rotation == 0.0));
    }

    #[test]
    fn test_diagnostics_deduplicated_per_unit() {
        let mut a = animator("bad", UnitKind::Word, &[AnimatorProperty::Rotation(90.0)]);
        a.expression_selector = Some(ExpressionSelectorConfig {
            based_on: UnitKind::Word,
            amount_expression: "1 / (textIndex - 1)".into(),
            ..Default::default()
        });
        let eval = LayerEvaluator::new("aa bb cc", &[a]).evaluate(0, 0.0);
        assert_eq!(eval.diagnostics.len(), 1);
        assert_eq!(eval.diagnostics[0].unit, TextUnit::new(1, UnitKind::Word));
        assert_eq!(eval.diagnostics[0].animator_id, "bad");
    }

    #[test]
    fn test_evaluate_frame_uses_frame_rate() {
        let doc = TextLayerDocument {
            text: "ab".into(),
            frame_rate: 24.0,
            animators: vec![animator("a", UnitKind::Character, &[])],
            ..Default::default()
        };
        let evaluator = LayerEvaluator::from_document(&doc);
        assert_eq!(evaluator.evaluate_frame(48), evaluator.evaluate(48, 2.0));
        assert_eq!(evaluate_layer(&doc, 48), evaluator.evaluate(48, 2.0));
    }

    #[test]
    fn test_unit_weights_preview() {
        let a = animator("a", UnitKind::Word, &[]);
        let evaluator = LayerEvaluator::new("one two", &[a]);
        let w = evaluator.unit_weights(0, 0, 0.0).unwrap();
        assert_eq!(w, vec![AxisWeights::uniform(25.0), AxisWeights::uniform(75.0)]);
        assert!(evaluator.unit_weights(3, 0, 0.0).is_none());
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_sequential() {
        let mut a = animator("p", UnitKind::Character, &[AnimatorProperty::Position([3.0, 9.0])]);
        a.range_selector.randomize_order = true;
        a.wiggly_selector = Some(Default::default());
        a.expression_selector = Some(ExpressionSelectorConfig {
            amount_expression: "textIndex % 7 == 3 ? 1 / 0 : selectorValue".into(),
            ..Default::default()
        });
        let text = "The quick brown fox\njumps over the lazy dog";
        let evaluator = LayerEvaluator::new(text, &[a]);
        for frame in [0, 5, 31] {
            let time = frame as f64 / 30.0;
            assert_eq!(evaluator.evaluate(frame, time), evaluator.evaluate_parallel(frame, time));
        }
    }
}
