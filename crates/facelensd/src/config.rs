use std::path::PathBuf;

/// Server configuration, loaded from environment variables.
pub struct Config {
    /// Listen address (default: 127.0.0.1:8501).
    pub bind_addr: String,
    /// AWS region; `None` falls back to the built-in default.
    pub region: Option<String>,
    /// TOML file holding an explicit AWS key pair. Unset = ambient credentials.
    pub secrets_path: Option<PathBuf>,
    /// Whether to draw the annotated-face overlay image.
    pub overlay_enabled: bool,
    /// Optional TrueType font for overlay labels.
    pub font_path: Option<PathBuf>,
    /// Minimum similarity (percent) for the comparison service to report a match.
    pub similarity_threshold: f32,
    /// Request body limit for uploads, in bytes.
    pub max_upload_bytes: usize,
}

impl Config {
    /// Load configuration from `FACELENS_*` environment variables with defaults.
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("FACELENS_BIND")
                .unwrap_or_else(|_| "127.0.0.1:8501".to_string()),
            region: std::env::var("FACELENS_REGION").ok(),
            secrets_path: env_path("FACELENS_SECRETS_PATH"),
            overlay_enabled: std::env::var("FACELENS_OVERLAY_ENABLED")
                .map(|v| v != "0")
                .unwrap_or(true),
            font_path: env_path("FACELENS_FONT_PATH"),
            similarity_threshold: env_f32(
                "FACELENS_SIMILARITY_THRESHOLD",
                facelens_core::DEFAULT_SIMILARITY_THRESHOLD,
            ),
            max_upload_bytes: env_usize("FACELENS_MAX_UPLOAD_BYTES", 20 * 1024 * 1024),
        }
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

fn env_f32(key: &str, default: f32) -> f32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
