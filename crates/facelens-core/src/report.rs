//! Display-ready summaries built from service responses.
//!
//! Everything here is a pure function of the response; the HTML page and
//! the CLI both format these values.

use crate::types::{
    AgeRange, CompareFacesResponse, DetectFacesResponse, Emotion, FaceDetail, FaceMatch, Gender,
    TraitKind,
};

/// Per-face colours, cycled by face index.
pub const PALETTE: [BoxColor; 5] = [
    BoxColor::Red,
    BoxColor::Blue,
    BoxColor::Green,
    BoxColor::Yellow,
    BoxColor::Purple,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxColor {
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
}

impl BoxColor {
    /// Colour for the face at zero-based `index`.
    pub fn for_index(index: usize) -> Self {
        PALETTE[index % PALETTE.len()]
    }

    pub fn rgb(&self) -> [u8; 3] {
        match self {
            BoxColor::Red => [255, 0, 0],
            BoxColor::Blue => [0, 0, 255],
            BoxColor::Green => [0, 128, 0],
            BoxColor::Yellow => [255, 255, 0],
            BoxColor::Purple => [128, 0, 128],
        }
    }

    /// CSS colour keyword.
    pub fn css(&self) -> &'static str {
        match self {
            BoxColor::Red => "red",
            BoxColor::Blue => "blue",
            BoxColor::Green => "green",
            BoxColor::Yellow => "yellow",
            BoxColor::Purple => "purple",
        }
    }
}

/// Highest-confidence emotion. Ties keep the first one in input order.
pub fn top_emotion(emotions: &[Emotion]) -> Option<&Emotion> {
    let mut best: Option<&Emotion> = None;
    for emotion in emotions {
        match best {
            Some(current) if emotion.confidence <= current.confidence => {}
            _ => best = Some(emotion),
        }
    }
    best
}

/// Emotions ordered by non-increasing confidence; equal scores keep input order.
pub fn sorted_emotions(emotions: &[Emotion]) -> Vec<Emotion> {
    let mut sorted = emotions.to_vec();
    sorted.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    sorted
}

/// Progress-bar fill for a 0–100 score: truncated, then clamped.
pub fn progress_percent(score: f32) -> u8 {
    if score.is_nan() {
        return 0;
    }
    (score as i32).clamp(0, 100) as u8
}

/// Qualitative reading of a similarity score.
///
/// Each band's lower edge is exclusive: exactly 95.0 is `LikelySame`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimilarityBand {
    VeryLikelySame,
    LikelySame,
    PossiblyDifferent,
    LikelyDifferent,
}

/// How a band is presented (maps to alert styling).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

impl SimilarityBand {
    pub fn from_similarity(similarity: f32) -> Self {
        if similarity > 95.0 {
            SimilarityBand::VeryLikelySame
        } else if similarity > 80.0 {
            SimilarityBand::LikelySame
        } else if similarity > 60.0 {
            SimilarityBand::PossiblyDifferent
        } else {
            SimilarityBand::LikelyDifferent
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            SimilarityBand::VeryLikelySame => "Very likely the same person (above 95%)",
            SimilarityBand::LikelySame => "Likely the same person (80%–95%)",
            SimilarityBand::PossiblyDifferent => {
                "Similar, but possibly different people (60%–80%)"
            }
            SimilarityBand::LikelyDifferent => "Likely different people (below 60%)",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            SimilarityBand::VeryLikelySame => Severity::Success,
            SimilarityBand::LikelySame => Severity::Info,
            SimilarityBand::PossiblyDifferent => Severity::Warning,
            SimilarityBand::LikelyDifferent => Severity::Error,
        }
    }
}

/// One row of the additional-attributes list.
#[derive(Debug, Clone, PartialEq)]
pub struct TraitRow {
    pub label: &'static str,
    pub present: bool,
    pub confidence: f32,
}

/// Everything shown for a single detected face.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceSummary {
    /// One-based position in the response.
    pub number: usize,
    pub color: BoxColor,
    pub gender: Option<Gender>,
    pub age_range: Option<AgeRange>,
    pub top_emotion: Option<Emotion>,
    /// All emotions, highest confidence first.
    pub emotions: Vec<Emotion>,
    pub traits: Vec<TraitRow>,
}

impl FaceSummary {
    pub fn from_detail(index: usize, face: &FaceDetail) -> Self {
        Self {
            number: index + 1,
            color: BoxColor::for_index(index),
            gender: face.gender.clone(),
            age_range: face.age_range,
            top_emotion: top_emotion(&face.emotions).cloned(),
            emotions: sorted_emotions(&face.emotions),
            traits: face
                .attributes()
                .into_iter()
                .map(|(kind, attr): (TraitKind, _)| TraitRow {
                    label: kind.label(),
                    present: attr.value,
                    confidence: attr.confidence,
                })
                .collect(),
        }
    }

    /// "Female (99.2%)"
    pub fn gender_text(&self) -> String {
        match &self.gender {
            Some(g) => format!("{} ({:.1}%)", g.value, g.confidence),
            None => "unknown".to_string(),
        }
    }

    /// "23~31"
    pub fn age_text(&self) -> String {
        match self.age_range {
            Some(range) => format!("{}~{}", range.low, range.high),
            None => "unknown".to_string(),
        }
    }

    /// "HAPPY (97.0%)"
    pub fn top_emotion_text(&self) -> String {
        match &self.top_emotion {
            Some(e) => format!("{} ({:.1}%)", e.kind, e.confidence),
            None => "unknown".to_string(),
        }
    }

    /// The four label lines drawn above the face box.
    pub fn label_lines(&self) -> [String; 4] {
        let gender = self
            .gender
            .as_ref()
            .map(|g| g.value.clone())
            .unwrap_or_else(|| "?".to_string());
        let age = self
            .age_range
            .map(|r| format!("{}-{}", r.low, r.high))
            .unwrap_or_else(|| "?".to_string());
        let emotion = self
            .top_emotion
            .as_ref()
            .map(|e| e.kind.clone())
            .unwrap_or_else(|| "?".to_string());
        [
            format!("Face {}", self.number),
            format!("Gender: {gender}"),
            format!("Age: {age}"),
            format!("Emotion: {emotion}"),
        ]
    }
}

/// Outcome of the emotion-analysis view.
#[derive(Debug, Clone, PartialEq)]
pub enum EmotionReport {
    /// The service found no faces; the page shows a warning.
    NoFaces,
    Faces(Vec<FaceSummary>),
}

impl EmotionReport {
    pub fn from_response(response: &DetectFacesResponse) -> Self {
        if response.face_details.is_empty() {
            return EmotionReport::NoFaces;
        }
        EmotionReport::Faces(
            response
                .face_details
                .iter()
                .enumerate()
                .map(|(i, face)| FaceSummary::from_detail(i, face))
                .collect(),
        )
    }
}

/// Similarity readout for the best match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchSummary {
    pub similarity: f32,
    pub progress: u8,
    pub band: SimilarityBand,
}

impl MatchSummary {
    pub fn from_match(face_match: &FaceMatch) -> Self {
        Self {
            similarity: face_match.similarity,
            progress: progress_percent(face_match.similarity),
            band: SimilarityBand::from_similarity(face_match.similarity),
        }
    }

    /// "87.31%"
    pub fn similarity_text(&self) -> String {
        format!("{:.2}%", self.similarity)
    }
}

/// Outcome of the comparison view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ComparisonReport {
    /// No face in the target cleared the threshold; the page shows a warning.
    NoMatch,
    Match(MatchSummary),
}

impl ComparisonReport {
    /// Only the first (best) match is ever inspected.
    pub fn from_response(response: &CompareFacesResponse) -> Self {
        match response.face_matches.first() {
            Some(best) => ComparisonReport::Match(MatchSummary::from_match(best)),
            None => ComparisonReport::NoMatch,
        }
    }
}

pub const NO_FACES_WARNING: &str = "No faces were detected in the image.";
pub const NO_MATCH_WARNING: &str = "The two photos were not recognized as the same person.";
