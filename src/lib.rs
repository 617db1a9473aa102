//! # threadfold
//!
//! Flattens chat-history exports into thread and message records.
//!
//! An export stores each conversation as a tree of nodes in which every edit
//! or regeneration opens a new branch. This crate picks the final version of
//! each conversation (the newest complete branch at every edit point), drops
//! tool traffic, unfinished generations and media-only content, and emits:
//!
//! ```text
//! conversations.json ──▶ export::Conversation ──▶ transform ──▶ { threads, messages }
//!                               (node arena)        │
//!                                   edit_path ◀──────┤ canonical branch?
//!                                   assembler ◀──────┤ keep / drop, build record
//!                                     content ◀──────┘ plain text
//! ```
//!
//! The core (`transform` and everything it calls) is synchronous and does no
//! I/O. `convert` and `server` are thin file and HTTP front ends.

pub mod assembler;
pub mod config;
pub mod content;
pub mod convert;
pub mod edit_path;
pub mod error;
pub mod export;
pub mod records;
pub mod server;
pub mod threads;
pub mod timestamp;
pub mod transform;

pub use config::{ServerConfig, TransformConfig};
pub use error::{ConvertError, Result};
pub use export::Conversation;
pub use records::{ConversionSummary, Message, MessageStatus, Thread, TransformResult};
pub use transform::{transform, transform_with_config};
