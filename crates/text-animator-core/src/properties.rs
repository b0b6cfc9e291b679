//! Turning a unit weight into property deltas.

use glam::{Vec2, Vec4};
use serde::Serialize;
use text_animator_data::{AnimatorProperties, AnimatorProperty};

/// Weight per axis for vector properties. `x` is also the scalar weight used
/// by scalar and color properties. Both axes are equal unless an unlocked
/// wiggly selector drew an independent sample for `y`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisWeights {
    pub x: f32,
    pub y: f32,
}

impl AxisWeights {
    pub fn uniform(weight: f32) -> Self {
        Self {
            x: weight,
            y: weight,
        }
    }

    pub fn scalar(&self) -> f32 {
        self.x
    }

    fn factors(&self) -> Vec2 {
        Vec2::new(self.x, self.y) / 100.0
    }
}

/// Linear blend from the glyph's current color toward `target`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColorBlend {
    pub target: Vec4,
    pub factor: f32,
}

impl ColorBlend {
    pub fn apply(&self, base: Vec4) -> Vec4 {
        base.lerp(self.target, self.factor)
    }
}

/// Per-unit output of one animator. `None` means the animator does not
/// drive that property.
///
/// Scale and opacity are offsets in percent from the unit's base value
/// (100%); rotation is in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDeltas {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Vec2>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<Vec2>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blur: Option<Vec2>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<ColorBlend>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<ColorBlend>,
}

impl PropertyDeltas {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Scales every property of the animator by the unit's weight.
pub fn apply(weights: AxisWeights, properties: &AnimatorProperties) -> PropertyDeltas {
    let s = weights.scalar() / 100.0;
    let v = weights.factors();
    let mut deltas = PropertyDeltas::default();

    for property in properties.iter() {
        match *property {
            AnimatorProperty::Position(p) => deltas.position = Some(Vec2::from(p) * v),
            AnimatorProperty::Scale(p) => {
                deltas.scale = Some((Vec2::from(p) - Vec2::splat(100.0)) * v)
            }
            AnimatorProperty::Rotation(r) => deltas.rotation = Some(r * s),
            AnimatorProperty::Opacity(o) => deltas.opacity = Some((o - 100.0) * s),
            AnimatorProperty::Blur(p) => deltas.blur = Some(Vec2::from(p) * v),
            AnimatorProperty::Tracking(t) => deltas.tracking = Some(t * s),
            AnimatorProperty::FillColor(c) => {
                deltas.fill_color = Some(ColorBlend {
                    target: Vec4::from(c),
                    factor: s,
                })
            }
            AnimatorProperty::StrokeColor(c) => {
                deltas.stroke_color = Some(ColorBlend {
                    target: Vec4::from(c),
                    factor: s,
                })
            }
        }
    }
    deltas
}
