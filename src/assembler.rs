//! Raw export message → output `Message`, or a decision to drop it.
//!
//! Dropped:
//! - tool results (`author.role == "tool"`)
//! - browsing commands (assistant messages addressed to `"web"`)
//! - messages whose content type is excluded media
//! - messages that normalize to blank text

use crate::config::TransformConfig;
use crate::content;
use crate::error::Result;
use crate::export::RawMessage;
use crate::records::{Message, MessageStatus};
use crate::timestamp;
use tracing::debug;

const ROLE_TOOL: &str = "tool";
const ROLE_ASSISTANT: &str = "assistant";
const ROLE_USER: &str = "user";
const WEB_RECIPIENT: &str = "web";

/// Why a message produced no output record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    ToolMessage,
    WebCommand,
    ExcludedContentType,
    EmptyContent,
}

/// Structural filters checked before any content is normalized
pub fn drop_reason(message: &RawMessage, config: &TransformConfig) -> Option<DropReason> {
    if message.role() == ROLE_TOOL {
        return Some(DropReason::ToolMessage);
    }
    if message.role() == ROLE_ASSISTANT && message.recipient.as_deref() == Some(WEB_RECIPIENT) {
        return Some(DropReason::WebCommand);
    }
    if message
        .content_type()
        .is_some_and(|ct| config.is_excluded_content_type(ct))
    {
        return Some(DropReason::ExcludedContentType);
    }
    None
}

/// User messages carry no model; others fall back through the metadata slugs
/// to the configured legacy model. Empty slugs count as missing.
pub fn resolve_model(message: &RawMessage, config: &TransformConfig) -> Option<String> {
    if message.role() == ROLE_USER {
        return None;
    }

    let metadata = message.metadata.as_ref();
    let slug = metadata
        .and_then(|m| m.model_slug.as_deref())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            metadata
                .and_then(|m| m.default_model_slug.as_deref())
                .filter(|s| !s.is_empty())
        })
        .unwrap_or(config.fallback_model.as_str());

    Some(slug.to_string())
}

/// Build the output record for `message`, or `None` when it is filtered out
pub fn assemble(message: &RawMessage, thread_id: &str, config: &TransformConfig) -> Result<Option<Message>> {
    if let Some(reason) = drop_reason(message, config) {
        debug!("Dropping message {} ({:?})", message.id, reason);
        return Ok(None);
    }

    let text = content::normalize(message.content.as_ref(), config);
    if text.trim().is_empty() {
        debug!("Dropping message {} ({:?})", message.id, DropReason::EmptyContent);
        return Ok(None);
    }

    Ok(Some(Message {
        thread_id: thread_id.to_string(),
        role: message.role().to_string(),
        content: text,
        status: MessageStatus::Done,
        model: resolve_model(message, config),
        id: message.id.clone(),
        created_at: timestamp::from_export(message.create_time)?,
    }))
}
