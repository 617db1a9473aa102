//! Thread records - one per conversation, tracking the newest retained message.

use crate::error::Result;
use crate::export::Conversation;
use crate::records::{Message, Thread};
use crate::timestamp;

/// Build the thread record for a conversation; `last_message_at` starts unset
pub fn aggregate(conversation: &Conversation) -> Result<Thread> {
    Ok(Thread {
        title: conversation.title.clone(),
        id: conversation.thread_id()?.to_string(),
        created_at: timestamp::from_export(conversation.create_time)?,
        updated_at: timestamp::from_export(conversation.update_time)?,
        last_message_at: None,
    })
}

/// Fold a retained message into the thread. Only moves `last_message_at` forward.
pub fn extend(thread: &mut Thread, message: &Message) {
    if thread.last_message_at.map_or(true, |last| message.created_at > last) {
        thread.last_message_at = Some(message.created_at);
    }
}
