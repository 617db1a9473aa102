use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Invalid JSON format in conversations export: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Conversation has neither conversation_id nor id (title: {0:?})")]
    MissingConversationId(Option<String>),

    #[error("Timestamp out of range: {0}")]
    InvalidTimestamp(f64),

    #[error("Cyclic node graph in conversation {conversation}: node {node} revisited")]
    CyclicTree { conversation: String, node: String },

    #[error("Failed to serialize output: {0}")]
    Serialize(serde_json::Error),

    #[error("Conversion worker failed: {0}")]
    Worker(String),
}

impl ConvertError {
    /// Whether the failure was caused by the submitted export rather than the converter
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ConvertError::Parse(_)
                | ConvertError::MissingConversationId(_)
                | ConvertError::InvalidTimestamp(_)
                | ConvertError::CyclicTree { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
