//! Conversation export → `{ threads, messages }`.
//!
//! Conversations are processed one at a time, in input order. Per
//! conversation the thread record and the edit-path resolver are local, so
//! nothing carries over between conversations. Any error aborts the whole
//! transform; there is no partial output.

use crate::assembler;
use crate::config::TransformConfig;
use crate::edit_path::EditPathResolver;
use crate::error::Result;
use crate::export::Conversation;
use crate::records::{Message, Thread, TransformResult};
use crate::threads;
use tracing::debug;

/// Transform with the default export-schema settings
pub fn transform(conversations: &[Conversation]) -> Result<TransformResult> {
    transform_with_config(conversations, &TransformConfig::default())
}

pub fn transform_with_config(conversations: &[Conversation], config: &TransformConfig) -> Result<TransformResult> {
    let mut result = TransformResult {
        threads: Vec::with_capacity(conversations.len()),
        messages: Vec::new(),
    };

    for conversation in conversations {
        let (thread, messages) = process_conversation(conversation, config)?;
        result.threads.push(thread);
        result.messages.extend(messages);
    }

    Ok(result)
}

/// Counters for the per-conversation debug line
#[derive(Debug, Default)]
struct SkipCounts {
    off_path: usize,
    incomplete: usize,
    filtered: usize,
}

fn process_conversation(conversation: &Conversation, config: &TransformConfig) -> Result<(Thread, Vec<Message>)> {
    let mut thread = threads::aggregate(conversation)?;
    let mut resolver = EditPathResolver::new(conversation.thread_id()?, &conversation.mapping, config);
    let mut messages = Vec::new();
    let mut skipped = SkipCounts::default();

    // Node order follows the export document, not the tree
    for node in conversation.mapping.iter() {
        let Some(raw) = node.message.as_ref() else {
            continue;
        };

        if !resolver.is_on_canonical_path(&node.id)? {
            skipped.off_path += 1;
            continue;
        }

        if !config.is_complete(raw) {
            skipped.incomplete += 1;
            continue;
        }

        let Some(message) = assembler::assemble(raw, &thread.id, config)? else {
            skipped.filtered += 1;
            continue;
        };

        threads::extend(&mut thread, &message);
        resolver.confirm(&node.id);
        messages.push(message);
    }

    if config.chronological {
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    }

    debug!(
        "Conversation {}: {} messages kept from {} nodes ({:?})",
        thread.id,
        messages.len(),
        conversation.mapping.len(),
        skipped
    );

    Ok((thread, messages))
}
