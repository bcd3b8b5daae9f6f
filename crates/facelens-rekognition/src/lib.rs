//! facelens-rekognition — Amazon Rekognition backend.
//!
//! Resolves credentials (ambient provider chain or a TOML secrets file)
//! and implements [`facelens_core::FaceAnalyzer`] on top of the
//! `DetectFaces` and `CompareFaces` APIs.

pub mod client;
mod convert;
pub mod credentials;

pub use client::RekognitionAnalyzer;
pub use credentials::{ClientSettings, CredentialSource, SecretsError, DEFAULT_REGION};
