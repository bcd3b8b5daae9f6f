use crate::convert;
use crate::credentials::{ClientSettings, CredentialSource};
use aws_config::BehaviorVersion;
use aws_sdk_rekognition::config::{Credentials, Region};
use aws_sdk_rekognition::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_rekognition::primitives::Blob;
use aws_sdk_rekognition::types::{Attribute, Image};
use aws_sdk_rekognition::Client;
use facelens_core::{CompareFacesResponse, DetectFacesResponse, FaceAnalyzer, InferenceError};

/// Provider name attached to credentials read from the secrets file.
const STATIC_PROVIDER_NAME: &str = "facelens-secrets";

/// [`FaceAnalyzer`] backed by Amazon Rekognition.
#[derive(Clone)]
pub struct RekognitionAnalyzer {
    client: Client,
}

impl RekognitionAnalyzer {
    /// Build the SDK client for `settings`. Credentials are resolved lazily
    /// by the SDK, so bad credentials surface on the first call.
    pub async fn connect(settings: &ClientSettings) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()));

        match &settings.credentials {
            CredentialSource::Ambient => {
                tracing::info!(region = %settings.region, "using ambient AWS credentials");
            }
            CredentialSource::Static {
                access_key_id,
                secret_access_key,
            } => {
                tracing::info!(region = %settings.region, "using static AWS credentials");
                loader = loader.credentials_provider(Credentials::new(
                    access_key_id.clone(),
                    secret_access_key.clone(),
                    None,
                    None,
                    STATIC_PROVIDER_NAME,
                ));
            }
        }

        let config = loader.load().await;
        Self::from_client(Client::new(&config))
    }

    /// Wrap an already-configured SDK client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

fn image_from(bytes: &[u8]) -> Image {
    Image::builder().bytes(Blob::new(bytes.to_vec())).build()
}

/// Collapse an SDK failure into the single "remote call failed" class.
fn remote_error<E, R>(err: SdkError<E, R>) -> InferenceError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let mapped = match err.as_service_error() {
        Some(service) => InferenceError::Service {
            code: service.code().unwrap_or("Unknown").to_string(),
            message: service.message().unwrap_or("no message").to_string(),
        },
        None => InferenceError::Transport(DisplayErrorContext(&err).to_string()),
    };
    tracing::warn!(error = %mapped, "rekognition call failed");
    mapped
}

impl FaceAnalyzer for RekognitionAnalyzer {
    async fn detect_faces(&self, image: &[u8]) -> Result<DetectFacesResponse, InferenceError> {
        tracing::debug!(bytes = image.len(), "DetectFaces request");
        let output = self
            .client
            .detect_faces()
            .image(image_from(image))
            .attributes(Attribute::All)
            .send()
            .await
            .map_err(remote_error)?;

        let response = convert::detect_response(&output);
        tracing::info!(faces = response.face_details.len(), "DetectFaces complete");
        Ok(response)
    }

    async fn compare_faces(
        &self,
        source: &[u8],
        target: &[u8],
        similarity_threshold: f32,
    ) -> Result<CompareFacesResponse, InferenceError> {
        tracing::debug!(
            source_bytes = source.len(),
            target_bytes = target.len(),
            similarity_threshold,
            "CompareFaces request"
        );
        let output = self
            .client
            .compare_faces()
            .source_image(image_from(source))
            .target_image(image_from(target))
            .similarity_threshold(similarity_threshold)
            .send()
            .await
            .map_err(remote_error)?;

        let response = convert::compare_response(&output)?;
        tracing::info!(
            matches = response.face_matches.len(),
            unmatched = response.unmatched_faces.len(),
            "CompareFaces complete"
        );
        Ok(response)
    }
}
