//! Page flows: upload → remote analysis → display-ready result.
//!
//! Both flows guard the remote call the same way: a failed call becomes
//! [`Outcome::Failed`] with a message for the page, never an error that
//! escapes the handler.

use crate::intake::Upload;
use facelens_core::{
    ComparisonReport, EmotionReport, FaceAnalyzer, FaceDetail, InferenceError, Overlay,
};
use std::sync::Arc;

/// Which page the user picked in the sidebar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Emotion,
    Compare,
}

impl Mode {
    pub const ALL: [Mode; 2] = [Mode::Emotion, Mode::Compare];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "emotion" => Some(Mode::Emotion),
            "compare" => Some(Mode::Compare),
            _ => None,
        }
    }

    /// Parse a query value, falling back to the default page.
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            None => Mode::default(),
            Some(s) => Self::parse(s).unwrap_or_else(|| {
                tracing::debug!(mode = s, "unknown mode; using default");
                Mode::default()
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Emotion => "emotion",
            Mode::Compare => "compare",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Mode::Emotion => "Face emotion analysis",
            Mode::Compare => "Face comparison",
        }
    }
}

/// Result of running a flow for one submission.
#[derive(Debug)]
pub enum Outcome<T> {
    /// Nothing to analyze: the user has not supplied every required image.
    Idle,
    /// The remote call failed; the message is shown on the page.
    Failed(String),
    Done(T),
}

#[derive(Debug)]
pub struct EmotionView {
    pub image: Upload,
    /// Annotated PNG, when the overlay is enabled and faces were found.
    pub annotated_png: Option<Vec<u8>>,
    pub report: EmotionReport,
    /// Full service payload, pretty-printed.
    pub raw_json: String,
}

#[derive(Debug)]
pub struct ComparisonView {
    pub source: Upload,
    pub target: Upload,
    pub report: ComparisonReport,
    pub raw_json: String,
}

/// The application: an injected analyzer plus presentation options.
pub struct App<A> {
    analyzer: A,
    overlay: Option<Arc<Overlay>>,
    similarity_threshold: f32,
}

impl<A: FaceAnalyzer> App<A> {
    pub fn new(analyzer: A, overlay: Option<Overlay>, similarity_threshold: f32) -> Self {
        Self {
            analyzer,
            overlay: overlay.map(Arc::new),
            similarity_threshold,
        }
    }

    pub fn overlay_enabled(&self) -> bool {
        self.overlay.is_some()
    }

    pub fn similarity_threshold(&self) -> f32 {
        self.similarity_threshold
    }

    /// Emotion flow: detect faces, summarize them, optionally annotate.
    pub async fn analyze_emotions(&self, image: Option<Upload>) -> Outcome<EmotionView> {
        let Some(image) = image else {
            return Outcome::Idle;
        };
        tracing::info!(file = %image.file_name, bytes = image.bytes.len(), "emotion analysis requested");

        let response = match self.analyzer.detect_faces(&image.bytes).await {
            Ok(r) => r,
            Err(e) => return failed(e),
        };

        let report = EmotionReport::from_response(&response);
        let annotated_png = match (&self.overlay, &report) {
            (Some(overlay), EmotionReport::Faces(_)) => {
                annotate_blocking(
                    Arc::clone(overlay),
                    image.bytes.clone(),
                    response.face_details.clone(),
                )
                .await
            }
            _ => None,
        };

        Outcome::Done(EmotionView {
            image,
            annotated_png,
            report,
            raw_json: response.raw_json(),
        })
    }

    /// Comparison flow: needs both images; only the best match is shown.
    pub async fn compare_faces(
        &self,
        source: Option<Upload>,
        target: Option<Upload>,
    ) -> Outcome<ComparisonView> {
        let (Some(source), Some(target)) = (source, target) else {
            return Outcome::Idle;
        };
        tracing::info!(
            source = %source.file_name,
            target = %target.file_name,
            threshold = self.similarity_threshold,
            "face comparison requested"
        );

        let response = match self
            .analyzer
            .compare_faces(&source.bytes, &target.bytes, self.similarity_threshold)
            .await
        {
            Ok(r) => r,
            Err(e) => return failed(e),
        };

        Outcome::Done(ComparisonView {
            source,
            target,
            report: ComparisonReport::from_response(&response),
            raw_json: response.raw_json(),
        })
    }
}

fn failed<T>(err: InferenceError) -> Outcome<T> {
    tracing::warn!(error = %err, "face analysis failed");
    Outcome::Failed(format!("An error occurred: {err}"))
}

/// Decode, draw and re-encode on the blocking pool. Any failure means no overlay.
async fn annotate_blocking(
    overlay: Arc<Overlay>,
    image: Vec<u8>,
    faces: Vec<FaceDetail>,
) -> Option<Vec<u8>> {
    match tokio::task::spawn_blocking(move || overlay.annotate_png(&image, &faces)).await {
        Ok(Ok(png)) => Some(png),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "could not draw overlay; showing results without it");
            None
        }
        Err(e) => {
            tracing::warn!(error = %e, "overlay task did not complete; showing results without it");
            None
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use facelens_core::types::{
        BoundingBox, CompareFacesResponse, DetectFacesResponse, Emotion, FaceDetail, FaceMatch,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Scripted analyzer: returns canned responses or a transport failure.
    pub(crate) struct MockAnalyzer {
        detect: Option<DetectFacesResponse>,
        compare: Option<CompareFacesResponse>,
        pub calls: AtomicUsize,
        pub last_threshold: Mutex<Option<f32>>,
    }

    impl MockAnalyzer {
        pub(crate) fn detecting(response: DetectFacesResponse) -> Self {
            Self { detect: Some(response), ..Self::failing() }
        }

        pub(crate) fn comparing(response: CompareFacesResponse) -> Self {
            Self { compare: Some(response), ..Self::failing() }
        }

        pub(crate) fn failing() -> Self {
            Self {
                detect: None,
                compare: None,
                calls: AtomicUsize::new(0),
                last_threshold: Mutex::new(None),
            }
        }
    }

    impl FaceAnalyzer for MockAnalyzer {
        async fn detect_faces(&self, _image: &[u8]) -> Result<DetectFacesResponse, InferenceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.detect
                .clone()
                .ok_or_else(|| InferenceError::Transport("connection refused".into()))
        }

        async fn compare_faces(
            &self,
            _source: &[u8],
            _target: &[u8],
            similarity_threshold: f32,
        ) -> Result<CompareFacesResponse, InferenceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_threshold.lock().unwrap() = Some(similarity_threshold);
            self.compare.clone().ok_or_else(|| InferenceError::Service {
                code: "InvalidParameterException".into(),
                message: "Request has invalid parameters".into(),
            })
        }
    }

    pub(crate) fn png_upload(name: &str) -> Upload {
        let mut bytes = Vec::new();
        image::RgbImage::new(40, 40)
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        Upload { file_name: name.into(), bytes }
    }

    pub(crate) fn one_face() -> DetectFacesResponse {
        DetectFacesResponse {
            face_details: vec![FaceDetail {
                bounding_box: Some(BoundingBox { left: 0.25, top: 0.5, width: 0.25, height: 0.25 }),
                emotions: vec![
                    Emotion { kind: "CALM".into(), confidence: 30.0 },
                    Emotion { kind: "HAPPY".into(), confidence: 65.0 },
                ],
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    pub(crate) fn one_match(similarity: f32) -> CompareFacesResponse {
        CompareFacesResponse {
            face_matches: vec![FaceMatch { similarity, bounding_box: None, confidence: Some(99.0) }],
            ..Default::default()
        }
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!(Mode::parse("emotion"), Some(Mode::Emotion));
        assert_eq!(Mode::parse("compare"), Some(Mode::Compare));
        assert_eq!(Mode::parse("Compare"), None);
        assert_eq!(Mode::from_query(None), Mode::Emotion);
        assert_eq!(Mode::from_query(Some("bogus")), Mode::Emotion);
        assert_eq!(Mode::from_query(Some("compare")), Mode::Compare);
    }

    #[tokio::test]
    async fn test_emotion_without_upload_is_idle() {
        let app = App::new(MockAnalyzer::detecting(one_face()), None, 50.0);
        assert!(matches!(app.analyze_emotions(None).await, Outcome::Idle));
        assert_eq!(app.analyzer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_emotion_remote_error_is_reported() {
        let app = App::new(MockAnalyzer::failing(), Some(Overlay::bitmap()), 50.0);
        let Outcome::Failed(msg) = app.analyze_emotions(Some(png_upload("a.png"))).await else {
            panic!("expected failure outcome");
        };
        assert!(msg.contains("connection refused"), "{msg}");
    }

    #[tokio::test]
    async fn test_emotion_no_faces_has_no_overlay() {
        let app = App::new(
            MockAnalyzer::detecting(DetectFacesResponse::default()),
            Some(Overlay::bitmap()),
            50.0,
        );
        let Outcome::Done(view) = app.analyze_emotions(Some(png_upload("a.png"))).await else {
            panic!("expected results");
        };
        assert_eq!(view.report, EmotionReport::NoFaces);
        assert!(view.annotated_png.is_none());
    }

    #[tokio::test]
    async fn test_emotion_faces_with_overlay() {
        let app = App::new(MockAnalyzer::detecting(one_face()), Some(Overlay::bitmap()), 50.0);
        let Outcome::Done(view) = app.analyze_emotions(Some(png_upload("a.png"))).await else {
            panic!("expected results");
        };
        assert!(matches!(view.report, EmotionReport::Faces(ref f) if f.len() == 1));
        assert!(view.annotated_png.is_some());
        assert!(view.raw_json.contains("\"FaceDetails\""));
    }

    #[tokio::test]
    async fn test_emotion_overlay_disabled() {
        let app = App::new(MockAnalyzer::detecting(one_face()), None, 50.0);
        let Outcome::Done(view) = app.analyze_emotions(Some(png_upload("a.png"))).await else {
            panic!("expected results");
        };
        assert!(view.annotated_png.is_none());
    }

    #[tokio::test]
    async fn test_emotion_undecodable_image_still_reports() {
        let app = App::new(MockAnalyzer::detecting(one_face()), Some(Overlay::bitmap()), 50.0);
        let upload = Upload { file_name: "a.jpg".into(), bytes: vec![1, 2, 3] };
        let Outcome::Done(view) = app.analyze_emotions(Some(upload)).await else {
            panic!("expected results");
        };
        assert!(view.annotated_png.is_none());
        assert!(matches!(view.report, EmotionReport::Faces(_)));
    }

    #[tokio::test]
    async fn test_compare_requires_both_images() {
        let app = App::new(MockAnalyzer::comparing(one_match(99.0)), None, 50.0);
        assert!(matches!(app.compare_faces(Some(png_upload("a.png")), None).await, Outcome::Idle));
        assert!(matches!(app.compare_faces(None, Some(png_upload("b.png"))).await, Outcome::Idle));
        assert_eq!(app.analyzer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_compare_remote_error_is_reported() {
        let app = App::new(MockAnalyzer::failing(), None, 50.0);
        let outcome = app
            .compare_faces(Some(png_upload("a.png")), Some(png_upload("b.png")))
            .await;
        let Outcome::Failed(msg) = outcome else {
            panic!("expected failure outcome");
        };
        assert!(msg.contains("InvalidParameterException"), "{msg}");
    }

    #[tokio::test]
    async fn test_compare_no_match() {
        let app = App::new(MockAnalyzer::comparing(CompareFacesResponse::default()), None, 50.0);
        let Outcome::Done(view) = app
            .compare_faces(Some(png_upload("a.png")), Some(png_upload("b.png")))
            .await
        else {
            panic!("expected results");
        };
        assert_eq!(view.report, ComparisonReport::NoMatch);
    }

    #[tokio::test]
    async fn test_compare_passes_threshold() {
        let app = App::new(MockAnalyzer::comparing(one_match(88.0)), None, 72.5);
        let Outcome::Done(view) = app
            .compare_faces(Some(png_upload("a.png")), Some(png_upload("b.png")))
            .await
        else {
            panic!("expected results");
        };
        assert!(matches!(view.report, ComparisonReport::Match(m) if m.progress == 88));
        assert_eq!(*app.analyzer.last_threshold.lock().unwrap(), Some(72.5));
    }

    #[tokio::test]
    async fn test_emotion_dump_is_service_payload() {
        let mut response = one_face();
        response.raw = Some(serde_json::json!({
            "FaceDetails": [{ "Landmarks": [{ "Type": "eyeLeft", "X": 0.3, "Y": 0.4 }] }]
        }));
        let app = App::new(MockAnalyzer::detecting(response), None, 50.0);
        let Outcome::Done(view) = app.analyze_emotions(Some(png_upload("a.png"))).await else {
            panic!("expected results");
        };
        assert!(view.raw_json.contains("\"Landmarks\""));
        assert!(view.raw_json.contains("eyeLeft"));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_annotate_blocking_outcomes() {
        let overlay = Arc::new(Overlay::bitmap());
        let faces = one_face().face_details;
        let png = annotate_blocking(overlay.clone(), png_upload("a.png").bytes, faces.clone()).await;
        assert!(png.is_some());
        assert!(annotate_blocking(overlay, vec![1, 2, 3], faces).await.is_none());
    }
}
