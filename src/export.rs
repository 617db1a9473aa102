//! Input model for chat-history exports (`conversations.json`).
//!
//! An export is a JSON array of conversations. Each conversation stores its
//! messages as a tree in `mapping`: node id → node, where nodes link to their
//! `parent` and list their `children`. Regenerating or editing a message adds
//! a sibling branch, so a node with several children marks an edit point.
//!
//! ```text
//! root ── m1 (user) ── m2 (assistant) ─┬─ e1 (incomplete retry)
//!                                      └─ e2 (latest retry)
//! ```
//!
//! The mapping is kept as an arena in document order: nodes live in a `Vec`
//! and are addressed by id through an index, so traversal never holds
//! references between nodes.

use crate::error::{ConvertError, Result};
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io::Read;
use std::path::Path;

/// One exported chat session
#[derive(Debug, Clone, Deserialize)]
pub struct Conversation {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub create_time: Option<f64>,
    #[serde(default)]
    pub update_time: Option<f64>,
    #[serde(default)]
    pub mapping: Mapping,
}

impl Conversation {
    /// `conversation_id` wins over `id` when both are present
    pub fn thread_id(&self) -> Result<&str> {
        self.conversation_id
            .as_deref()
            .or(self.id.as_deref())
            .ok_or_else(|| ConvertError::MissingConversationId(self.title.clone()))
    }
}

/// A point in a conversation's edit history
#[derive(Debug, Clone)]
pub struct Node {
    pub id: String,
    pub parent: Option<String>,
    pub children: Vec<String>,
    pub message: Option<RawMessage>,
}

impl Node {
    /// More than one child means the user edited or regenerated here
    pub fn is_edit_node(&self) -> bool {
        self.children.len() > 1
    }

    /// Message creation time, 0 when the node has no message or no time
    pub fn create_time(&self) -> f64 {
        self.message
            .as_ref()
            .and_then(|m| m.create_time)
            .unwrap_or(0.0)
    }
}

/// Node as stored in the export; the id comes from the mapping key
#[derive(Debug, Deserialize)]
struct RawNode {
    #[serde(default)]
    parent: Option<String>,
    #[serde(default)]
    children: Option<Vec<String>>,
    #[serde(default)]
    message: Option<RawMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawMessage {
    pub id: String,
    pub author: Author,
    #[serde(default)]
    pub content: Option<Value>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub create_time: Option<f64>,
    #[serde(default)]
    pub metadata: Option<MessageMetadata>,
    #[serde(default)]
    pub recipient: Option<String>,
}

impl RawMessage {
    pub fn role(&self) -> &str {
        &self.author.role
    }

    /// `content.content_type`, when the content is an object that declares one
    pub fn content_type(&self) -> Option<&str> {
        self.content
            .as_ref()
            .and_then(|c| c.get("content_type"))
            .and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Author {
    pub role: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageMetadata {
    #[serde(default)]
    pub model_slug: Option<String>,
    #[serde(default)]
    pub default_model_slug: Option<String>,
}

/// Node arena in document order
#[derive(Debug, Clone, Default)]
pub struct Mapping {
    nodes: Vec<Node>,
    index: HashMap<String, usize>,
}

impl Mapping {
    /// Later duplicates replace the earlier node but keep its position
    pub fn insert(&mut self, node: Node) {
        match self.index.get(&node.id) {
            Some(&idx) => self.nodes[idx] = node,
            None => {
                self.index.insert(node.id.clone(), self.nodes.len());
                self.nodes.push(node);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&idx| &self.nodes[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl<'de> Deserialize<'de> for Mapping {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct MappingVisitor;

        impl<'de> Visitor<'de> for MappingVisitor {
            type Value = Mapping;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of node ids to nodes")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Mapping, A::Error> {
                let mut mapping = Mapping::default();
                while let Some((id, raw)) = access.next_entry::<String, RawNode>()? {
                    mapping.insert(Node {
                        id,
                        parent: raw.parent,
                        children: raw.children.unwrap_or_default(),
                        message: raw.message,
                    });
                }
                Ok(mapping)
            }
        }

        deserializer.deserialize_map(MappingVisitor)
    }
}

/// Parse an export document (a JSON array of conversations)
pub fn parse_conversations(bytes: &[u8]) -> Result<Vec<Conversation>> {
    Ok(serde_json::from_slice(bytes)?)
}

pub fn read_conversations<R: Read>(reader: R) -> Result<Vec<Conversation>> {
    Ok(serde_json::from_reader(reader)?)
}

pub fn load_conversations(path: &Path) -> Result<Vec<Conversation>> {
    let bytes = fs::read(path)?;
    parse_conversations(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mapping_keeps_document_order() {
        let conversation: Conversation = serde_json::from_value(json!({
            "id": "c1",
            "mapping": {
                "zeta": { "parent": null, "children": ["alpha"] },
                "alpha": { "parent": "zeta", "children": ["mid"] },
                "mid": { "parent": "alpha", "children": [] }
            }
        }))
        .unwrap();

        let ids: Vec<&str> = conversation.mapping.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["zeta", "alpha", "mid"]);
        assert_eq!(conversation.mapping.get("alpha").unwrap().parent.as_deref(), Some("zeta"));
    }

    #[test]
    fn test_null_children_become_empty() {
        let conversation: Conversation = serde_json::from_value(json!({
            "id": "c1",
            "mapping": { "root": { "parent": null, "children": null, "message": null } }
        }))
        .unwrap();

        let root = conversation.mapping.get("root").unwrap();
        assert!(root.children.is_empty());
        assert!(root.message.is_none());
        assert_eq!(root.create_time(), 0.0);
    }

    #[test]
    fn test_thread_id_prefers_conversation_id() {
        let conversation: Conversation = serde_json::from_value(json!({
            "id": "export-id",
            "conversation_id": "conv-id",
            "mapping": {}
        }))
        .unwrap();
        assert_eq!(conversation.thread_id().unwrap(), "conv-id");
    }

    #[test]
    fn test_missing_ids_are_rejected() {
        let conversation: Conversation =
            serde_json::from_value(json!({ "title": "orphan", "mapping": {} })).unwrap();
        assert!(matches!(
            conversation.thread_id(),
            Err(ConvertError::MissingConversationId(Some(ref t))) if t == "orphan"
        ));
    }

    #[test]
    fn test_message_without_role_fails_to_parse() {
        let doc = br#"[{"id":"c1","mapping":{"n1":{"message":{"id":"m1","author":{},"status":"finished_successfully"}}}}]"#;
        assert!(matches!(parse_conversations(doc), Err(ConvertError::Parse(_))));
    }

    #[test]
    fn test_content_type_read_from_object_content() {
        let message: RawMessage = serde_json::from_value(json!({
            "id": "m1",
            "author": { "role": "user" },
            "content": { "content_type": "text", "parts": ["hi"] }
        }))
        .unwrap();
        assert_eq!(message.content_type(), Some("text"));
        assert_eq!(message.role(), "user");
    }
}
