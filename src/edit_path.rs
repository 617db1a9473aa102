//! Edit-path resolution - decides which nodes belong to the final version of a conversation.
//!
//! Every edit or regeneration in the chat UI adds a sibling under the same
//! parent, so a node with several children is an *edit node*. Below an edit
//! node only the newest child with a complete message counts, and the same
//! rule repeats all the way down that child's chain:
//!
//! ```text
//!            m2 (edit node, always kept)
//!           /  \
//!   e1 (t=1002, in progress)   e2 (t=2000, done)  ← canonical
//!                                 |
//!                                 f1              ← canonical
//! ```
//!
//! A node is resolved against its *nearest* edit-node ancestor only, so edit
//! points in different subtrees never influence each other. Canonical sets
//! are memoized per edit node for the lifetime of one resolver, which covers
//! a single conversation.

use crate::config::TransformConfig;
use crate::error::{ConvertError, Result};
use crate::export::{Mapping, Node};
use std::collections::{HashMap, HashSet};
use tracing::debug;

pub struct EditPathResolver<'a> {
    conversation_id: &'a str,
    mapping: &'a Mapping,
    config: &'a TransformConfig,
    /// Nodes already emitted as messages
    validated: HashSet<&'a str>,
    /// Edit node id -> ids on its latest complete path
    canonical_paths: HashMap<&'a str, HashSet<&'a str>>,
}

impl<'a> EditPathResolver<'a> {
    pub fn new(conversation_id: &'a str, mapping: &'a Mapping, config: &'a TransformConfig) -> Self {
        Self {
            conversation_id,
            mapping,
            config,
            validated: HashSet::new(),
            canonical_paths: HashMap::new(),
        }
    }

    /// Record a node as confirmed-valid so later lookups short-circuit
    pub fn confirm(&mut self, node_id: &'a str) {
        self.validated.insert(node_id);
    }

    /// Whether `node_id` lies on the conversation's canonical path
    pub fn is_on_canonical_path(&mut self, node_id: &str) -> Result<bool> {
        if self.validated.contains(node_id) {
            return Ok(true);
        }

        let mapping = self.mapping;
        let Some(node) = mapping.get(node_id) else {
            return Ok(false);
        };

        // The pre-edit anchor is kept whichever branch wins
        if node.is_edit_node() {
            return Ok(true);
        }

        let mut visited: HashSet<&str> = HashSet::new();
        let mut current = Some(node);
        while let Some(cur) = current {
            if !visited.insert(cur.id.as_str()) {
                return Err(self.cycle_at(&cur.id));
            }
            if cur.is_edit_node() {
                let on_path = self.canonical_path(cur)?.contains(node_id);
                if !on_path {
                    debug!("Node {} is off the canonical branch of edit node {}", node_id, cur.id);
                }
                return Ok(on_path);
            }
            current = cur.parent.as_deref().and_then(|p| mapping.get(p));
        }

        // No edit point above this node: it sits on the only path
        Ok(true)
    }

    /// Memoized [`latest_complete_path`](Self::latest_complete_path) for an edit node
    fn canonical_path(&mut self, edit_node: &'a Node) -> Result<&HashSet<&'a str>> {
        let key = edit_node.id.as_str();
        if !self.canonical_paths.contains_key(key) {
            let path = self.latest_complete_path(edit_node)?;
            self.canonical_paths.insert(key, path);
        }
        Ok(&self.canonical_paths[key])
    }

    /// Ids below `node` on its latest complete branch, following the newest
    /// complete child at every level. Empty when no child qualifies.
    pub fn latest_complete_path(&self, node: &'a Node) -> Result<HashSet<&'a str>> {
        let mut path = HashSet::new();
        let mut seen: HashSet<&str> = HashSet::from([node.id.as_str()]);
        let mut current = node;

        while let Some(child) = self.latest_complete_child(current) {
            if !seen.insert(child.id.as_str()) {
                return Err(self.cycle_at(&child.id));
            }
            path.insert(child.id.as_str());
            current = child;
        }

        Ok(path)
    }

    /// Newest child by message `create_time` whose message is complete.
    /// Newer complete siblings shadow older ones entirely.
    fn latest_complete_child(&self, node: &'a Node) -> Option<&'a Node> {
        let mapping = self.mapping;
        let mut children: Vec<&'a Node> = node
            .children
            .iter()
            .filter_map(|id| mapping.get(id))
            .collect();

        // Stable: equal times keep the export's child order
        children.sort_by(|a, b| b.create_time().total_cmp(&a.create_time()));

        children.into_iter().find(|child| {
            child
                .message
                .as_ref()
                .is_some_and(|message| self.config.is_complete(message))
        })
    }

    fn cycle_at(&self, node_id: &str) -> ConvertError {
        ConvertError::CyclicTree {
            conversation: self.conversation_id.to_string(),
            node: node_id.to_string(),
        }
    }
}
