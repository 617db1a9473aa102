//! Transform and server configuration.
//!
//! The export-schema literals (excluded media types, the completion status,
//! the legacy model name) live here so a future export format can swap them
//! without touching the resolver or the assembler.

use crate::export::RawMessage;

/// Content types that never reach the output (substring match)
pub const EXCLUDED_CONTENT_TYPES: &[&str] = &["asset_pointer", "audio", "video"];

/// Part content type that carries a spoken message's transcript
pub const AUDIO_TRANSCRIPTION: &str = "audio_transcription";

/// The only status that marks a generation as complete
pub const COMPLETION_STATUS: &str = "finished_successfully";

/// Model reported for non-user messages from exports without model metadata
pub const FALLBACK_MODEL: &str = "gpt-3.5-turbo";

/// Default file name for converted output
pub const DEFAULT_OUTPUT_FILE: &str = "t3chat_conversations.json";

const DEFAULT_PORT: u16 = 4860;
const DEFAULT_BODY_LIMIT_MB: usize = 256;

#[derive(Debug, Clone)]
pub struct TransformConfig {
    pub excluded_content_types: Vec<String>,
    pub completion_status: String,
    pub fallback_model: String,
    /// Stable-sort each thread's messages by `created_at` instead of keeping
    /// the export's node order
    pub chronological: bool,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            excluded_content_types: EXCLUDED_CONTENT_TYPES.iter().map(|s| s.to_string()).collect(),
            completion_status: COMPLETION_STATUS.to_string(),
            fallback_model: FALLBACK_MODEL.to_string(),
            chronological: false,
        }
    }
}

impl TransformConfig {
    /// Substring match against the exclusion list. Transcription parts are
    /// recognized before this check runs.
    pub fn is_excluded_content_type(&self, content_type: &str) -> bool {
        self.excluded_content_types
            .iter()
            .any(|excluded| content_type.contains(excluded.as_str()))
    }

    /// Anything but the literal completion status (including a missing one) is incomplete
    pub fn is_complete(&self, message: &RawMessage) -> bool {
        message.status.as_deref() == Some(self.completion_status.as_str())
    }
}

/// HTTP shell settings, read from the environment
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub body_limit_bytes: usize,
    pub chronological: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            body_limit_bytes: DEFAULT_BODY_LIMIT_MB * 1024 * 1024,
            chronological: false,
        }
    }
}

impl ServerConfig {
    /// `PORT`, `THREADFOLD_BODY_LIMIT_MB`, `THREADFOLD_CHRONOLOGICAL`
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(defaults.port);

        let body_limit_bytes = std::env::var("THREADFOLD_BODY_LIMIT_MB")
            .ok()
            .and_then(|mb| mb.parse::<usize>().ok())
            .map(|mb| mb * 1024 * 1024)
            .unwrap_or(defaults.body_limit_bytes);

        let chronological = std::env::var("THREADFOLD_CHRONOLOGICAL")
            .ok()
            .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
            .unwrap_or(defaults.chronological);

        Self {
            port,
            body_limit_bytes,
            chronological,
        }
    }

    pub fn transform_config(&self, chronological: Option<bool>) -> TransformConfig {
        TransformConfig {
            chronological: chronological.unwrap_or(self.chronological),
            ..TransformConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excluded_content_type_is_substring_match() {
        let config = TransformConfig::default();
        assert!(config.is_excluded_content_type("image_asset_pointer"));
        assert!(config.is_excluded_content_type("real_time_user_audio_video_asset_pointer"));
        assert!(config.is_excluded_content_type("audio_transcription"));
        assert!(!config.is_excluded_content_type("text"));
        assert!(!config.is_excluded_content_type("multimodal_text"));
    }

    #[test]
    fn test_query_flag_overrides_server_default() {
        let server = ServerConfig {
            chronological: true,
            ..ServerConfig::default()
        };
        assert!(server.transform_config(None).chronological);
        assert!(!server.transform_config(Some(false)).chronological);
    }
}
