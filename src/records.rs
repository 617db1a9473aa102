//! Normalized output records.
//!
//! One `Thread` per conversation and a flat list of `Message`s. Field order
//! matches what downstream importers expect in the JSON document.

use crate::error::{ConvertError, Result};
use crate::timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub title: Option<String>,
    pub id: String,
    #[serde(with = "timestamp::iso")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp::iso")]
    pub updated_at: DateTime<Utc>,
    /// Latest `created_at` among retained messages, `null` for empty threads
    #[serde(with = "timestamp::iso_option")]
    pub last_message_at: Option<DateTime<Utc>>,
}

/// Only finished messages are emitted, so there is a single status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Done,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "threadId")]
    pub thread_id: String,
    pub role: String,  // copied verbatim: "user", "assistant", "system", ...
    pub content: String,
    pub status: MessageStatus,
    /// `None` for user messages
    pub model: Option<String>,
    pub id: String,
    #[serde(with = "timestamp::iso")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformResult {
    pub threads: Vec<Thread>,
    pub messages: Vec<Message>,
}

/// Counts reported after a conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConversionSummary {
    pub threads: usize,
    pub messages: usize,
}

impl TransformResult {
    pub fn summary(&self) -> ConversionSummary {
        ConversionSummary {
            threads: self.threads.len(),
            messages: self.messages.len(),
        }
    }

    /// Two-space indented JSON
    pub fn to_pretty_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(ConvertError::Serialize)
    }

    pub fn write_pretty<W: Write>(&self, mut writer: W) -> Result<()> {
        serde_json::to_writer_pretty(&mut writer, self).map_err(ConvertError::Serialize)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}
