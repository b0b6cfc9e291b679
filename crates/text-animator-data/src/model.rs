use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// 2D vector payload `[x, y]`.
pub type XyPayload = [f32; 2];
/// Linear RGBA payload, each channel in `[0, 1]`.
pub type RgbaPayload = [f32; 4];

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DocumentError {
    #[error("property `{0}` is driven more than once by the same animator")]
    DuplicateProperty(PropertyKind),
}

/// Granularity a selector assigns weights at.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "camelCase")]
pub enum UnitKind {
    #[default]
    Character,
    Word,
    Line,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum Shape {
    #[default]
    Square,
    RampUp,
    RampDown,
    Triangle,
    Round,
    Smooth,
}

/// How a selector folds its weight into the running value of its animator.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum Combine {
    #[default]
    Add,
    Subtract,
    Intersect,
    Min,
    Max,
    Difference,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(default)]
pub struct Ease {
    pub low: f32,  // percent
    pub high: f32, // percent
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct RangeSelectorConfig {
    pub enabled: bool,
    pub based_on: UnitKind,
    pub start: f32,  // percent
    pub end: f32,    // percent
    pub offset: f32, // percent, wraps
    pub shape: Shape,
    pub ease: Ease,
    pub smoothness: f32, // percent
    pub amount: f32,     // percent
    pub randomize_order: bool,
    /// Shuffle seed for `randomize_order`. Derived from the animator id when absent.
    pub random_seed: Option<u32>,
    pub mode: Combine,
}

impl Default for RangeSelectorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            based_on: UnitKind::Character,
            start: 0.0,
            end: 100.0,
            offset: 0.0,
            shape: Shape::Square,
            ease: Ease::default(),
            smoothness: 0.0,
            amount: 100.0,
            randomize_order: false,
            random_seed: None,
            mode: Combine::Add,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct WigglySelectorConfig {
    pub enabled: bool,
    pub mode: Combine,
    pub max_amount: f32, // percent
    pub min_amount: f32, // percent
    pub wiggles_per_second: f32,
    pub correlation: f32, // percent
    pub lock_dimensions: bool,
    pub based_on: UnitKind,
    pub random_seed: u32,
}

impl Default for WigglySelectorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: Combine::Intersect,
            max_amount: 100.0,
            min_amount: 0.0,
            wiggles_per_second: 2.0,
            correlation: 50.0,
            lock_dimensions: false,
            based_on: UnitKind::Character,
            random_seed: 0,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ExpressionSelectorConfig {
    pub enabled: bool,
    pub mode: Combine,
    pub based_on: UnitKind,
    pub amount_expression: String,
}

impl Default for ExpressionSelectorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: Combine::Add,
            based_on: UnitKind::Character,
            amount_expression: "selectorValue * textIndex / textTotal".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub enum PropertyKind {
    Position,
    Scale,
    Rotation,
    Opacity,
    Blur,
    Tracking,
    FillColor,
    StrokeColor,
}

impl PropertyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyKind::Position => "position",
            PropertyKind::Scale => "scale",
            PropertyKind::Rotation => "rotation",
            PropertyKind::Opacity => "opacity",
            PropertyKind::Blur => "blur",
            PropertyKind::Tracking => "tracking",
            PropertyKind::FillColor => "fillColor",
            PropertyKind::StrokeColor => "strokeColor",
        }
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A property driven by an animator, carrying its value already resolved at
/// the current frame by the host's keyframe engine.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum AnimatorProperty {
    Position(XyPayload),
    Scale(XyPayload), // percent, 100 = unchanged
    Rotation(f32), // degrees
    Opacity(f32), // percent, 100 = unchanged
    Blur(XyPayload),
    Tracking(f32),
    FillColor(RgbaPayload),
    StrokeColor(RgbaPayload),
}

impl AnimatorProperty {
    pub fn kind(&self) -> PropertyKind {
        match self {
            AnimatorProperty::Position(_) => PropertyKind::Position,
            AnimatorProperty::Scale(_) => PropertyKind::Scale,
            AnimatorProperty::Rotation(_) => PropertyKind::Rotation,
            AnimatorProperty::Opacity(_) => PropertyKind::Opacity,
            AnimatorProperty::Blur(_) => PropertyKind::Blur,
            AnimatorProperty::Tracking(_) => PropertyKind::Tracking,
            AnimatorProperty::FillColor(_) => PropertyKind::FillColor,
            AnimatorProperty::StrokeColor(_) => PropertyKind::StrokeColor,
        }
    }
}

/// Properties of one animator, at most one per [`PropertyKind`].
///
/// Serialized as a list of tagged properties; a list naming the same kind
/// twice is rejected when loading.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(try_from = "Vec<AnimatorProperty>", into = "Vec<AnimatorProperty>")]
pub struct AnimatorProperties(BTreeMap<PropertyKind, AnimatorProperty>);

impl AnimatorProperties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the property for its kind, returning the value it replaced.
    pub fn insert(&mut self, property: AnimatorProperty) -> Option<AnimatorProperty> {
        self.0.insert(property.kind(), property)
    }

    pub fn remove(&mut self, kind: PropertyKind) -> Option<AnimatorProperty> {
        self.0.remove(&kind)
    }

    pub fn get(&self, kind: PropertyKind) -> Option<&AnimatorProperty> {
        self.0.get(&kind)
    }

    pub fn contains(&self, kind: PropertyKind) -> bool {
        self.0.contains_key(&kind)
    }

    /// Iterates in [`PropertyKind`] order.
    pub fn iter(&self) -> impl Iterator<Item = &AnimatorProperty> {
        self.0.values()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Vec<AnimatorProperty>> for AnimatorProperties {
    type Error = DocumentError;

    fn try_from(list: Vec<AnimatorProperty>) -> Result<Self, Self::Error> {
        let mut props = AnimatorProperties::new();
        for p in list {
            if props.insert(p).is_some() {
                return Err(DocumentError::DuplicateProperty(p.kind()));
            }
        }
        Ok(props)
    }
}

impl From<AnimatorProperties> for Vec<AnimatorProperty> {
    fn from(props: AnimatorProperties) -> Self {
        props.0.into_values().collect()
    }
}

impl FromIterator<AnimatorProperty> for AnimatorProperties {
    fn from_iter<I: IntoIterator<Item = AnimatorProperty>>(iter: I) -> Self {
        let mut props = AnimatorProperties::new();
        for p in iter {
            props.insert(p);
        }
        props
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Animator {
    pub id: String,
    pub name: String,
    pub enabled: bool,
    pub range_selector: RangeSelectorConfig,
    pub wiggly_selector: Option<WigglySelectorConfig>,
    pub expression_selector: Option<ExpressionSelectorConfig>,
    pub properties: AnimatorProperties,
}

impl Default for Animator {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            enabled: true,
            range_selector: RangeSelectorConfig::default(),
            wiggly_selector: None,
            expression_selector: None,
            properties: AnimatorProperties::default(),
        }
    }
}

impl Animator {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }
}

/// A text layer as the host hands it over: resolved source text, base
/// colors, and the animators applied to it in order.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct TextLayerDocument {
    pub text: String,
    pub frame_rate: f32,
    pub base_fill: Option<RgbaPayload>,
    pub base_stroke: Option<RgbaPayload>,
    pub animators: Vec<Animator>,
}

impl Default for TextLayerDocument {
    fn default() -> Self {
        Self {
            text: String::new(),
            frame_rate: 30.0,
            base_fill: None,
            base_stroke: None,
            animators: Vec::new(),
        }
    }
}
