use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Face location as fractions (0–1) of the image dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BoundingBox {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

/// Pixel-space rectangle, corners inclusive of `left`/`top`.
///
/// Coordinates are signed: nothing clamps a box to the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl PixelRect {
    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }
}

impl BoundingBox {
    /// Denormalize against an image of `image_width` × `image_height` pixels.
    ///
    /// Each component is truncated independently, so the right/bottom edges
    /// are `left + trunc(width * W)` rather than `trunc((left + width) * W)`.
    pub fn to_pixels(&self, image_width: u32, image_height: u32) -> PixelRect {
        let w = image_width as f32;
        let h = image_height as f32;
        let left = (self.left * w) as i32;
        let top = (self.top * h) as i32;
        let box_width = (self.width * w) as i32;
        let box_height = (self.height * h) as i32;
        PixelRect {
            left,
            top,
            right: left.saturating_add(box_width),
            bottom: top.saturating_add(box_height),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Gender {
    pub value: String,
    pub confidence: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AgeRange {
    pub low: i32,
    pub high: i32,
}

/// One emotion label with the service's confidence (0–100).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Emotion {
    #[serde(rename = "Type")]
    pub kind: String,
    pub confidence: f32,
}

/// A boolean facial trait (eyeglasses, smile, ...) with its confidence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FaceAttribute {
    pub value: bool,
    pub confidence: f32,
}

/// Per-face attribute record returned by face detection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FaceDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_range: Option<AgeRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub emotions: Vec<Emotion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smile: Option<FaceAttribute>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eyeglasses: Option<FaceAttribute>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sunglasses: Option<FaceAttribute>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beard: Option<FaceAttribute>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mustache: Option<FaceAttribute>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eyes_open: Option<FaceAttribute>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mouth_open: Option<FaceAttribute>,
    /// Detection confidence that the box contains a face.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

impl FaceDetail {
    /// Boolean traits in display order, skipping the ones the service omitted.
    pub fn attributes(&self) -> Vec<(TraitKind, FaceAttribute)> {
        [
            (TraitKind::Eyeglasses, self.eyeglasses),
            (TraitKind::Sunglasses, self.sunglasses),
            (TraitKind::Beard, self.beard),
            (TraitKind::Mustache, self.mustache),
            (TraitKind::EyesOpen, self.eyes_open),
            (TraitKind::MouthOpen, self.mouth_open),
            (TraitKind::Smile, self.smile),
        ]
        .into_iter()
        .filter_map(|(kind, attr)| attr.map(|a| (kind, a)))
        .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraitKind {
    Eyeglasses,
    Sunglasses,
    Beard,
    Mustache,
    EyesOpen,
    MouthOpen,
    Smile,
}

impl TraitKind {
    pub fn label(&self) -> &'static str {
        match self {
            TraitKind::Eyeglasses => "Wearing eyeglasses",
            TraitKind::Sunglasses => "Wearing sunglasses",
            TraitKind::Beard => "Beard",
            TraitKind::Mustache => "Mustache",
            TraitKind::EyesOpen => "Eyes open",
            TraitKind::MouthOpen => "Mouth open",
            TraitKind::Smile => "Smiling",
        }
    }
}

/// A face in the target image matched against the source face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FaceMatch {
    /// Similarity percentage (0–100).
    pub similarity: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DetectFacesResponse {
    pub face_details: Vec<FaceDetail>,
    /// The service payload as received, with every field it sent.
    #[serde(skip)]
    pub raw: Option<Value>,
}

impl DetectFacesResponse {
    /// Pretty-printed service payload, or this model when no payload was kept.
    pub fn raw_json(&self) -> String {
        pretty_dump(self.raw.as_ref(), self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CompareFacesResponse {
    /// Location of the face used from the source image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_image_face: Option<BoundingBox>,
    /// Matches above the requested threshold, best first.
    pub face_matches: Vec<FaceMatch>,
    pub unmatched_faces: Vec<BoundingBox>,
    #[serde(skip)]
    pub raw: Option<Value>,
}

impl CompareFacesResponse {
    pub fn raw_json(&self) -> String {
        pretty_dump(self.raw.as_ref(), self)
    }
}

fn pretty_dump<T: Serialize>(raw: Option<&Value>, model: &T) -> String {
    let result = match raw {
        Some(value) => serde_json::to_string_pretty(value),
        None => serde_json::to_string_pretty(model),
    };
    result.unwrap_or_else(|e| format!("<unserializable response: {e}>"))
}
