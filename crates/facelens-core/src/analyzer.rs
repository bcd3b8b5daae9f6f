//! Seam between the page flows and the remote face-analysis service.

use crate::types::{CompareFacesResponse, DetectFacesResponse};
use std::future::Future;
use thiserror::Error;

/// Minimum similarity (percent) a match must exceed to be returned.
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 50.0;

/// A failed remote call. The page treats every variant alike.
#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("service rejected the request ({code}): {message}")]
    Service { code: String, message: String },
    #[error("request did not reach the service: {0}")]
    Transport(String),
    #[error("unexpected service response: {0}")]
    MalformedResponse(String),
}

/// A remote face-analysis backend.
///
/// Implementations forward the image bytes unmodified and make exactly one
/// call per operation: no retries, no client-side timeout.
pub trait FaceAnalyzer: Send + Sync {
    /// Detect every face in `image` with the full attribute set.
    fn detect_faces(
        &self,
        image: &[u8],
    ) -> impl Future<Output = Result<DetectFacesResponse, InferenceError>> + Send;

    /// Match the largest face of `source` against the faces in `target`.
    fn compare_faces(
        &self,
        source: &[u8],
        target: &[u8],
        similarity_threshold: f32,
    ) -> impl Future<Output = Result<CompareFacesResponse, InferenceError>> + Send;
}
