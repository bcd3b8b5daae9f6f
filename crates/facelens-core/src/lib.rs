//! facelens-core — Face analysis results and how they are shown.
//!
//! Holds the response data model, the [`FaceAnalyzer`] seam a remote
//! backend implements, and the rendering side: summaries, similarity
//! bands and the annotated-image overlay.

pub mod analyzer;
pub mod glyphs;
pub mod overlay;
pub mod report;
pub mod types;

pub use analyzer::{FaceAnalyzer, InferenceError, DEFAULT_SIMILARITY_THRESHOLD};
pub use overlay::{Overlay, OverlayError};
pub use report::{ComparisonReport, EmotionReport, FaceSummary, MatchSummary, SimilarityBand};
pub use types::{
    BoundingBox, CompareFacesResponse, DetectFacesResponse, Emotion, FaceDetail, FaceMatch,
};
