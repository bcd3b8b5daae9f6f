//! Rekognition SDK shapes → facelens data model.

use aws_sdk_rekognition::operation::compare_faces::CompareFacesOutput;
use aws_sdk_rekognition::operation::detect_faces::DetectFacesOutput;
use aws_sdk_rekognition::types as sdk;
use facelens_core::types::{
    AgeRange, BoundingBox, CompareFacesResponse, DetectFacesResponse, Emotion, FaceAttribute,
    FaceDetail, FaceMatch, Gender,
};
use facelens_core::InferenceError;
use serde_json::{Map, Value};

pub(crate) fn detect_response(output: &DetectFacesOutput) -> DetectFacesResponse {
    DetectFacesResponse {
        face_details: output.face_details().iter().map(face_detail).collect(),
        raw: Some(raw_detect(output)),
    }
}

pub(crate) fn compare_response(output: &CompareFacesOutput) -> Result<CompareFacesResponse, InferenceError> {
    let face_matches = output
        .face_matches()
        .iter()
        .map(face_match)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CompareFacesResponse {
        source_image_face: output
            .source_image_face()
            .and_then(|f| f.bounding_box())
            .map(bounding_box),
        face_matches,
        unmatched_faces: output
            .unmatched_faces()
            .iter()
            .filter_map(|f| f.bounding_box())
            .map(bounding_box)
            .collect(),
        raw: Some(raw_compare(output)),
    })
}

fn face_match(m: &sdk::CompareFacesMatch) -> Result<FaceMatch, InferenceError> {
    let similarity = m
        .similarity()
        .ok_or_else(|| InferenceError::MalformedResponse("face match without similarity".into()))?;
    Ok(FaceMatch {
        similarity,
        bounding_box: m.face().and_then(|f| f.bounding_box()).map(bounding_box),
        confidence: m.face().and_then(|f| f.confidence()),
    })
}

fn bounding_box(b: &sdk::BoundingBox) -> BoundingBox {
    BoundingBox {
        left: b.left().unwrap_or(0.0),
        top: b.top().unwrap_or(0.0),
        width: b.width().unwrap_or(0.0),
        height: b.height().unwrap_or(0.0),
    }
}

fn face_attribute(value: bool, confidence: Option<f32>) -> FaceAttribute {
    FaceAttribute {
        value,
        confidence: confidence.unwrap_or(0.0),
    }
}

fn face_detail(face: &sdk::FaceDetail) -> FaceDetail {
    FaceDetail {
        bounding_box: face.bounding_box().map(bounding_box),
        age_range: face.age_range().map(|r| AgeRange {
            low: r.low().unwrap_or(0),
            high: r.high().unwrap_or(0),
        }),
        gender: face.gender().and_then(|g| {
            g.value().map(|v| Gender {
                value: v.as_str().to_string(),
                confidence: g.confidence().unwrap_or(0.0),
            })
        }),
        emotions: face
            .emotions()
            .iter()
            .filter_map(|e| {
                e.r#type().map(|t| Emotion {
                    kind: t.as_str().to_string(),
                    confidence: e.confidence().unwrap_or(0.0),
                })
            })
            .collect(),
        smile: face.smile().map(|a| face_attribute(a.value(), a.confidence())),
        eyeglasses: face.eyeglasses().map(|a| face_attribute(a.value(), a.confidence())),
        sunglasses: face.sunglasses().map(|a| face_attribute(a.value(), a.confidence())),
        beard: face.beard().map(|a| face_attribute(a.value(), a.confidence())),
        mustache: face.mustache().map(|a| face_attribute(a.value(), a.confidence())),
        eyes_open: face.eyes_open().map(|a| face_attribute(a.value(), a.confidence())),
        mouth_open: face.mouth_open().map(|a| face_attribute(a.value(), a.confidence())),
        confidence: face.confidence(),
    }
}

/// JSON object builder that leaves out whatever the service did not send.
#[derive(Default)]
struct Fields(Map<String, Value>);

impl Fields {
    fn put(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    fn opt(self, key: &str, value: Option<impl Into<Value>>) -> Self {
        match value {
            Some(v) => self.put(key, v),
            None => self,
        }
    }

    fn list(self, key: &str, items: Vec<Value>) -> Self {
        if items.is_empty() {
            self
        } else {
            self.put(key, items)
        }
    }

    fn done(self) -> Value {
        Value::Object(self.0)
    }
}

fn raw_detect(output: &DetectFacesOutput) -> Value {
    Fields::default()
        .put(
            "FaceDetails",
            output.face_details().iter().map(raw_face_detail).collect::<Vec<_>>(),
        )
        .opt(
            "OrientationCorrection",
            output.orientation_correction().map(|o| o.as_str()),
        )
        .done()
}

fn raw_compare(output: &CompareFacesOutput) -> Value {
    Fields::default()
        .opt(
            "SourceImageFace",
            output.source_image_face().map(|f| {
                Fields::default()
                    .opt("BoundingBox", f.bounding_box().map(raw_box))
                    .opt("Confidence", f.confidence())
                    .done()
            }),
        )
        .put(
            "FaceMatches",
            output
                .face_matches()
                .iter()
                .map(|m| {
                    Fields::default()
                        .opt("Similarity", m.similarity())
                        .opt("Face", m.face().map(raw_compared_face))
                        .done()
                })
                .collect::<Vec<_>>(),
        )
        .put(
            "UnmatchedFaces",
            output.unmatched_faces().iter().map(raw_compared_face).collect::<Vec<_>>(),
        )
        .opt(
            "SourceImageOrientationCorrection",
            output.source_image_orientation_correction().map(|o| o.as_str()),
        )
        .opt(
            "TargetImageOrientationCorrection",
            output.target_image_orientation_correction().map(|o| o.as_str()),
        )
        .done()
}

fn raw_box(b: &sdk::BoundingBox) -> Value {
    Fields::default()
        .opt("Width", b.width())
        .opt("Height", b.height())
        .opt("Left", b.left())
        .opt("Top", b.top())
        .done()
}

fn raw_flag(value: bool, confidence: Option<f32>) -> Value {
    Fields::default()
        .put("Value", value)
        .opt("Confidence", confidence)
        .done()
}

fn raw_emotions(emotions: &[sdk::Emotion]) -> Vec<Value> {
    emotions
        .iter()
        .map(|e| {
            Fields::default()
                .opt("Type", e.r#type().map(|t| t.as_str()))
                .opt("Confidence", e.confidence())
                .done()
        })
        .collect()
}

fn raw_landmarks(landmarks: &[sdk::Landmark]) -> Vec<Value> {
    landmarks
        .iter()
        .map(|l| {
            Fields::default()
                .opt("Type", l.r#type().map(|t| t.as_str()))
                .opt("X", l.x())
                .opt("Y", l.y())
                .done()
        })
        .collect()
}

fn raw_pose(p: &sdk::Pose) -> Value {
    Fields::default()
        .opt("Roll", p.roll())
        .opt("Yaw", p.yaw())
        .opt("Pitch", p.pitch())
        .done()
}

fn raw_quality(q: &sdk::ImageQuality) -> Value {
    Fields::default()
        .opt("Brightness", q.brightness())
        .opt("Sharpness", q.sharpness())
        .done()
}

fn raw_compared_face(face: &sdk::ComparedFace) -> Value {
    Fields::default()
        .opt("BoundingBox", face.bounding_box().map(raw_box))
        .opt("Confidence", face.confidence())
        .list("Landmarks", raw_landmarks(face.landmarks()))
        .opt("Pose", face.pose().map(raw_pose))
        .opt("Quality", face.quality().map(raw_quality))
        .list("Emotions", raw_emotions(face.emotions()))
        .opt("Smile", face.smile().map(|a| raw_flag(a.value(), a.confidence())))
        .done()
}

fn raw_face_detail(face: &sdk::FaceDetail) -> Value {
    Fields::default()
        .opt("BoundingBox", face.bounding_box().map(raw_box))
        .opt(
            "AgeRange",
            face.age_range().map(|r| {
                Fields::default()
                    .opt("Low", r.low())
                    .opt("High", r.high())
                    .done()
            }),
        )
        .opt("Smile", face.smile().map(|a| raw_flag(a.value(), a.confidence())))
        .opt("Eyeglasses", face.eyeglasses().map(|a| raw_flag(a.value(), a.confidence())))
        .opt("Sunglasses", face.sunglasses().map(|a| raw_flag(a.value(), a.confidence())))
        .opt(
            "Gender",
            face.gender().map(|g| {
                Fields::default()
                    .opt("Value", g.value().map(|v| v.as_str()))
                    .opt("Confidence", g.confidence())
                    .done()
            }),
        )
        .opt("Beard", face.beard().map(|a| raw_flag(a.value(), a.confidence())))
        .opt("Mustache", face.mustache().map(|a| raw_flag(a.value(), a.confidence())))
        .opt("EyesOpen", face.eyes_open().map(|a| raw_flag(a.value(), a.confidence())))
        .opt("MouthOpen", face.mouth_open().map(|a| raw_flag(a.value(), a.confidence())))
        .list("Emotions", raw_emotions(face.emotions()))
        .list("Landmarks", raw_landmarks(face.landmarks()))
        .opt("Pose", face.pose().map(raw_pose))
        .opt("Quality", face.quality().map(raw_quality))
        .opt("Confidence", face.confidence())
        .opt(
            "FaceOccluded",
            face.face_occluded().map(|o| raw_flag(o.value(), o.confidence())),
        )
        .opt(
            "EyeDirection",
            face.eye_direction().map(|d| {
                Fields::default()
                    .opt("Yaw", d.yaw())
                    .opt("Pitch", d.pitch())
                    .opt("Confidence", d.confidence())
                    .done()
            }),
        )
        .done()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sdk_box(left: f32, top: f32, width: f32, height: f32) -> sdk::BoundingBox {
        sdk::BoundingBox::builder()
            .left(left)
            .top(top)
            .width(width)
            .height(height)
            .build()
    }

    #[test]
    fn test_face_detail_conversion() {
        let face = sdk::FaceDetail::builder()
            .bounding_box(sdk_box(0.1, 0.2, 0.3, 0.4))
            .gender(
                sdk::Gender::builder()
                    .value(sdk::GenderType::Female)
                    .confidence(99.5)
                    .build(),
            )
            .age_range(sdk::AgeRange::builder().low(20).high(28).build())
            .emotions(
                sdk::Emotion::builder()
                    .r#type(sdk::EmotionName::Happy)
                    .confidence(90.0)
                    .build(),
            )
            .emotions(
                sdk::Emotion::builder()
                    .r#type(sdk::EmotionName::Calm)
                    .confidence(5.0)
                    .build(),
            )
            .smile(sdk::Smile::builder().value(true).confidence(95.0).build())
            .eyes_open(sdk::EyeOpen::builder().value(false).confidence(70.0).build())
            .confidence(99.9)
            .build();
        let output = DetectFacesOutput::builder().face_details(face).build();

        let response = detect_response(&output);
        assert_eq!(response.face_details.len(), 1);
        let detail = &response.face_details[0];
        assert_eq!(
            detail.bounding_box,
            Some(BoundingBox { left: 0.1, top: 0.2, width: 0.3, height: 0.4 })
        );
        assert_eq!(detail.gender.as_ref().unwrap().value, "Female");
        assert_eq!(detail.age_range, Some(AgeRange { low: 20, high: 28 }));
        assert_eq!(detail.emotions.len(), 2);
        assert_eq!(detail.emotions[0].kind, "HAPPY");
        assert_eq!(detail.smile, Some(FaceAttribute { value: true, confidence: 95.0 }));
        assert_eq!(detail.eyes_open, Some(FaceAttribute { value: false, confidence: 70.0 }));
        assert!(detail.beard.is_none());
    }

    #[test]
    fn test_detect_empty() {
        let output = DetectFacesOutput::builder().build();
        assert!(detect_response(&output).face_details.is_empty());
    }

    #[test]
    fn test_compare_conversion() {
        let output = CompareFacesOutput::builder()
            .source_image_face(
                sdk::ComparedSourceImageFace::builder()
                    .bounding_box(sdk_box(0.3, 0.3, 0.2, 0.2))
                    .build(),
            )
            .face_matches(
                sdk::CompareFacesMatch::builder()
                    .similarity(97.25)
                    .face(
                        sdk::ComparedFace::builder()
                            .bounding_box(sdk_box(0.5, 0.1, 0.2, 0.3))
                            .confidence(99.0)
                            .build(),
                    )
                    .build(),
            )
            .unmatched_faces(
                sdk::ComparedFace::builder()
                    .bounding_box(sdk_box(0.0, 0.0, 0.1, 0.1))
                    .build(),
            )
            .build();

        let response = compare_response(&output).unwrap();
        assert_eq!(response.face_matches.len(), 1);
        assert_eq!(response.face_matches[0].similarity, 97.25);
        assert_eq!(response.face_matches[0].confidence, Some(99.0));
        assert!(response.source_image_face.is_some());
        assert_eq!(response.unmatched_faces.len(), 1);
    }

    #[test]
    fn test_match_without_similarity_is_malformed() {
        let output = CompareFacesOutput::builder()
            .face_matches(sdk::CompareFacesMatch::builder().build())
            .build();
        let err = compare_response(&output).unwrap_err();
        assert!(matches!(err, InferenceError::MalformedResponse(_)));
    }

    #[test]
    fn test_detect_dump_keeps_unrendered_fields() {
        let face = sdk::FaceDetail::builder()
            .age_range(sdk::AgeRange::builder().high(30).build())
            .landmarks(
                sdk::Landmark::builder()
                    .r#type(sdk::LandmarkType::EyeLeft)
                    .x(0.31)
                    .y(0.42)
                    .build(),
            )
            .pose(sdk::Pose::builder().roll(2.5).yaw(-10.0).pitch(4.0).build())
            .quality(sdk::ImageQuality::builder().brightness(80.0).sharpness(92.0).build())
            .build();
        let output = DetectFacesOutput::builder().face_details(face).build();

        let dump = detect_response(&output).raw_json();
        let json: Value = serde_json::from_str(&dump).unwrap();
        let detail = &json["FaceDetails"][0];
        assert_eq!(detail["Landmarks"][0]["Type"], "eyeLeft");
        assert_eq!(detail["Pose"]["Roll"], 2.5);
        assert_eq!(detail["Quality"]["Sharpness"], 92.0);
        assert_eq!(detail["AgeRange"]["High"], 30);
        assert!(detail["AgeRange"].get("Low").is_none());
        assert!(detail.get("Gender").is_none());
        assert!(!dump.contains("null"));
    }

    #[test]
    fn test_compare_dump_keeps_unmatched_details() {
        let output = CompareFacesOutput::builder()
            .source_image_face(
                sdk::ComparedSourceImageFace::builder()
                    .bounding_box(sdk_box(0.3, 0.3, 0.2, 0.2))
                    .confidence(99.5)
                    .build(),
            )
            .unmatched_faces(
                sdk::ComparedFace::builder()
                    .confidence(97.0)
                    .pose(sdk::Pose::builder().yaw(12.0).build())
                    .build(),
            )
            .build();

        let response = compare_response(&output).unwrap();
        let json: Value = serde_json::from_str(&response.raw_json()).unwrap();
        assert_eq!(json["SourceImageFace"]["Confidence"], 99.5);
        assert_eq!(json["UnmatchedFaces"][0]["Confidence"], 97.0);
        assert_eq!(json["UnmatchedFaces"][0]["Pose"]["Yaw"], 12.0);
        assert_eq!(json["FaceMatches"].as_array().map(Vec::len), Some(0));
    }
}
