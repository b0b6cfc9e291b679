//! Selector behaviour audit
//!
//! End-to-end checks of animators loaded from project JSON: weight bounds,
//! window identities, seeded noise, combinator laws and expression fallback.
//! Run with: cargo test -p text-animator-core --test selector_audit

use serde_json::json;
use text_animator_core::{
    EvaluationContext, ExpressionErrorKind, LayerEvaluator, PreparedAnimator, TextUnit,
};
use text_animator_data::{Animator, TextLayerDocument, UnitKind};

fn animator(value: serde_json::Value) -> Animator {
    serde_json::from_value(value).expect("Failed to parse test animator")
}

fn weights(animator: &Animator, total: usize, frame: i64, time: f64) -> Vec<f32> {
    let prepared = PreparedAnimator::new(animator);
    let ctx = EvaluationContext::new(frame, time, total);
    prepared
        .evaluate_units(UnitKind::Character, &ctx)
        .iter()
        .map(|w| w.scalar())
        .collect()
}

mod bounds {
    use super::*;

    #[test]
    fn test_every_shape_and_mode_stays_in_range() {
        let shapes = ["square", "rampUp", "rampDown", "triangle", "round", "smooth"];
        let modes = ["add", "subtract", "intersect", "min", "max", "difference"];
        for shape in shapes {
            for mode in modes {
                let a = animator(json!({
                    "id": format!("{shape}-{mode}"),
                    "rangeSelector": {
                        "shape": shape,
                        "start": 10, "end": 80, "offset": -35,
                        "ease": { "low": 40, "high": 70 },
                        "smoothness": 60,
                        "amount": 100
                    },
                    "wigglySelector": { "mode": mode, "randomSeed": 9, "correlation": 20 },
                    "expressionSelector": {
                        "mode": mode,
                        "amountExpression": "selectorValue * 3 - textIndex * 40"
                    }
                }));
                for frame in [0, 7, 90] {
                    for w in weights(&a, 23, frame, frame as f64 / 30.0) {
                        assert!((0.0..=100.0).contains(&w), "{shape}/{mode}: {w}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_out_of_range_config_is_normalized() {
        let a = animator(json!({
            "id": "wild",
            "rangeSelector": { "start": -50, "end": 400, "amount": 250 },
            "wigglySelector": { "enabled": false, "minAmount": 90, "maxAmount": 10 }
        }));
        let prepared = PreparedAnimator::new(&a);
        assert_eq!(prepared.config_errors().len(), 3);
        assert!(weights(&a, 8, 0, 0.0).iter().all(|&w| w == 100.0));
    }
}

mod range {
    use super::*;

    #[test]
    fn test_square_window_identity() {
        let a = animator(json!({
            "id": "square",
            "rangeSelector": {
                "shape": "square",
                "ease": { "low": 0, "high": 0 },
                "smoothness": 0, "start": 0, "end": 100, "amount": 100
            }
        }));
        for total in [1, 3, 64, 257] {
            assert!(weights(&a, total, 0, 0.0).iter().all(|&w| w == 100.0));
        }
    }

    #[test]
    fn test_ramp_up_concrete_scenario() {
        let a = animator(json!({
            "id": "ramp",
            "rangeSelector": {
                "shape": "rampUp",
                "ease": { "low": 0, "high": 0 },
                "smoothness": 0, "start": 0, "end": 50, "offset": 0, "amount": 100
            }
        }));
        let w = weights(&a, 10, 0, 0.0);
        assert!((w[0] - 10.0).abs() < 1e-3);
        assert!((w[4] - 90.0).abs() < 1e-3);
        assert_eq!(w[9], 100.0);
        assert!(w[5..].iter().all(|&v| v == 100.0));
    }

    #[test]
    fn test_offset_loops_and_ramps_stay_low_before_window() {
        let ramp = |offset: f32| {
            animator(json!({
                "id": "offset",
                "rangeSelector": { "shape": "rampUp", "end": 50, "offset": offset }
            }))
        };
        let w = weights(&ramp(50.0), 10, 0, 0.0);
        assert!(w[..5].iter().all(|&v| v == 0.0), "{w:?}");
        assert!((w[5] - 10.0).abs() < 1e-3);
        assert!((w[9] - 90.0).abs() < 1e-3);

        let looped = ramp(150.0);
        assert!(PreparedAnimator::new(&looped).config_errors().is_empty());
        assert_eq!(weights(&looped, 10, 0, 0.0), w);
    }

    #[test]
    fn test_randomized_order_is_a_permutation() {
        let sequential = animator(json!({
            "id": "shuffle",
            "rangeSelector": { "shape": "rampUp" }
        }));
        let shuffled = animator(json!({
            "id": "shuffle",
            "rangeSelector": { "shape": "rampUp", "randomizeOrder": true, "randomSeed": 5 }
        }));
        let mut a = weights(&sequential, 20, 0, 0.0);
        let mut b = weights(&shuffled, 20, 0, 0.0);
        assert_ne!(a, b);
        a.sort_by(f32::total_cmp);
        b.sort_by(f32::total_cmp);
        assert_eq!(a, b);
    }
}

mod wiggly {
    use super::*;

    fn wiggle(correlation: f32, seed: u32) -> Animator {
        animator(json!({
            "id": "wiggle",
            "rangeSelector": { "enabled": false },
            "wigglySelector": { "correlation": correlation, "randomSeed": seed }
        }))
    }

    fn variance(values: &[f32]) -> f64 {
        let n = values.len() as f64;
        let mean = values.iter().map(|&v| v as f64).sum::<f64>() / n;
        values.iter().map(|&v| (v as f64 - mean).powi(2)).sum::<f64>() / n
    }

    #[test]
    fn test_deterministic() {
        let a = wiggle(35.0, 77);
        let first = weights(&a, 40, 12, 0.4);
        let second = weights(&a, 40, 12, 0.4);
        let bits = |v: &[f32]| v.iter().map(|w| w.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&first), bits(&second));
    }

    #[test]
    fn test_full_correlation_moves_units_together() {
        for seed in 0..8 {
            let w = weights(&wiggle(100.0, seed), 50, 0, 1.3);
            assert!(w.iter().all(|&v| v == w[0]), "seed {seed}");
        }
    }

    #[test]
    fn test_zero_correlation_spreads_units() {
        let mut wider = 0;
        for seed in 0..16 {
            let independent = variance(&weights(&wiggle(0.0, seed), 200, 0, 0.77));
            let shared = variance(&weights(&wiggle(100.0, seed), 200, 0, 0.77));
            if independent > shared {
                wider += 1;
            }
        }
        assert_eq!(wider, 16);
    }
}

mod combinator {
    use super::*;

    #[test]
    fn test_single_selector_is_raw_weight() {
        let ramp = json!({ "shape": "triangle", "start": 20, "end": 90 });
        let raw = weights(&animator(json!({ "id": "t", "rangeSelector": ramp })), 12, 0, 0.0);
        for mode in ["add", "max", "intersect"] {
            let mut range = ramp.clone();
            range["mode"] = json!(mode);
            let w = weights(&animator(json!({ "id": "t", "rangeSelector": range })), 12, 0, 0.0);
            assert_eq!(w, raw, "{mode}");
        }
    }

    #[test]
    fn test_intersect_against_full_is_identity() {
        let base = animator(json!({
            "id": "i",
            "rangeSelector": { "shape": "round", "end": 70 }
        }));
        let with_full = animator(json!({
            "id": "i",
            "rangeSelector": { "shape": "round", "end": 70 },
            "expressionSelector": { "mode": "intersect", "amountExpression": "100" }
        }));
        assert_eq!(weights(&base, 15, 0, 0.0), weights(&with_full, 15, 0, 0.0));
    }

    #[test]
    fn test_difference_with_self_is_zero() {
        let a = animator(json!({
            "id": "d",
            "rangeSelector": { "shape": "rampDown", "start": 15, "end": 65 },
            "expressionSelector": { "mode": "difference", "amountExpression": "selectorValue" }
        }));
        assert!(weights(&a, 30, 0, 0.0).iter().all(|&w| w == 0.0));
    }
}

mod expression {
    use super::*;

    #[test]
    fn test_division_by_zero_falls_back_to_disabled() {
        let range = json!({ "shape": "smooth", "start": 5, "end": 95 });
        let wiggle = json!({ "randomSeed": 3, "correlation": 60 });
        let without = animator(json!({
            "id": "e", "rangeSelector": range, "wigglySelector": wiggle
        }));
        let prepared_without = PreparedAnimator::new(&without);

        for mode in ["add", "subtract", "intersect", "min", "max", "difference"] {
            let with = animator(json!({
                "id": "e", "rangeSelector": range, "wigglySelector": wiggle,
                "expressionSelector": { "mode": mode, "amountExpression": "1/0" }
            }));
            let prepared_with = PreparedAnimator::new(&with);
            let ctx = EvaluationContext::new(4, 0.2, 9);
            for i in 0..9 {
                let unit = TextUnit::new(i, UnitKind::Character);
                let a = prepared_with.evaluate(unit, &ctx);
                let b = prepared_without.evaluate(unit, &ctx);
                assert_eq!(a.weights, b.weights, "{mode} unit {i}");
                let kind = a.error.as_ref().map(|e| e.kind());
                assert_eq!(kind, Some(ExpressionErrorKind::EvalError));
            }
        }
    }

    #[test]
    fn test_parse_error_disables_selector() {
        let a = animator(json!({
            "id": "p",
            "rangeSelector": { "shape": "rampUp" },
            "expressionSelector": { "mode": "min", "amountExpression": "textIndex * (" }
        }));
        let prepared = PreparedAnimator::new(&a);
        let kind = prepared.expression_parse_error().map(|e| e.kind());
        assert_eq!(kind, Some(ExpressionErrorKind::ParseError));

        let plain = animator(json!({ "id": "p", "rangeSelector": { "shape": "rampUp" } }));
        assert_eq!(weights(&a, 6, 0, 0.0), weights(&plain, 6, 0, 0.0));
    }
}

mod round_trip {
    use super::*;

    #[test]
    fn test_serialized_animator_produces_identical_weights() {
        let original = animator(json!({
            "id": "rt",
            "name": "Round trip",
            "rangeSelector": {
                "basedOn": "character", "shape": "triangle",
                "start": 12.5, "end": 87.5, "offset": 33,
                "ease": { "low": 10, "high": 55 }, "smoothness": 40,
                "randomizeOrder": true, "mode": "add"
            },
            "wigglySelector": {
                "mode": "intersect", "maxAmount": 90, "minAmount": 20,
                "wigglesPerSecond": 3.5, "correlation": 45, "randomSeed": 1234
            },
            "expressionSelector": {
                "mode": "max",
                "amountExpression": "time > 1 ? selectorValue : textIndex / textTotal * 100"
            },
            "properties": [
                { "kind": "position", "value": [0, -30] },
                { "kind": "opacity", "value": 0 }
            ]
        }));

        let text = serde_json::to_string(&original).unwrap();
        let restored: Animator = serde_json::from_str(&text).unwrap();
        assert_eq!(restored, original);

        for (frame, time) in [(0, 0.0), (45, 1.5)] {
            let a = weights(&original, 17, frame, time);
            let b = weights(&restored, 17, frame, time);
            assert_eq!(
                a.iter().map(|w| w.to_bits()).collect::<Vec<_>>(),
                b.iter().map(|w| w.to_bits()).collect::<Vec<_>>()
            );
        }
    }
}

mod layer {
    use super::*;

    fn document(value: serde_json::Value) -> TextLayerDocument {
        serde_json::from_value(value).expect("Failed to parse test document")
    }

    #[test]
    fn test_word_and_line_units() {
        let doc = document(json!({
            "text": "one two\nthree",
            "animators": [
                {
                    "id": "words",
                    "rangeSelector": { "basedOn": "word", "shape": "rampUp" },
                    "properties": [{ "kind": "rotation", "value": 60 }]
                },
                {
                    "id": "lines",
                    "rangeSelector": { "basedOn": "line", "shape": "rampUp" },
                    "properties": [{ "kind": "position", "value": [0, 100] }]
                }
            ]
        }));
        let eval = LayerEvaluator::from_document(&doc).evaluate_frame(0);
        let rotation: Vec<f32> = eval.glyphs.iter().map(|g| g.rotation).collect();
        let y: Vec<f32> = eval.glyphs.iter().map(|g| g.position.y).collect();

        // words: one, two, three at 1/6, 3/6, 5/6 of the ramp
        assert!((rotation[0] - 10.0).abs() < 1e-4);
        assert_eq!(rotation[0], rotation[2]);
        assert_eq!(rotation[3], 0.0);
        assert!((rotation[4] - 30.0).abs() < 1e-4);
        assert!((rotation[8] - 50.0).abs() < 1e-4);

        assert_eq!(y[0], 25.0);
        assert_eq!(y[6], 25.0);
        assert_eq!(y[7], 0.0);
        assert_eq!(y[8], 75.0);
    }

    #[test]
    fn test_expression_failures_reported_once_per_unit() {
        let doc = document(json!({
            "text": "abcdef",
            "animators": [{
                "id": "odd",
                "expressionSelector": { "amountExpression": "textIndex % 2 ? 1 / 0 : 50" }
            }]
        }));
        let evaluator = LayerEvaluator::from_document(&doc);
        let eval = evaluator.evaluate_frame(10);
        let units: Vec<usize> = eval.diagnostics.iter().map(|d| d.unit.index).collect();
        assert_eq!(units, vec![1, 3, 5]);
        assert!(eval.diagnostics.iter().all(|d| d.animator_id == "odd"));
    }
}
