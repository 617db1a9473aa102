//! Message content → plain text.
//!
//! Export content comes in three shapes: a bare string, an object with a
//! `text` field (code, execution output, quotes), or an object with a `parts`
//! list whose entries are strings or typed objects (images, audio,
//! transcriptions, ...). Text is stripped of the private-use sentinel glyphs
//! the exporter embeds for inline citations.

use crate::config::{TransformConfig, AUDIO_TRANSCRIPTION};
use serde_json::Value;
use std::ops::RangeInclusive;

/// Private-use glyphs the exporter uses as citation/entity markers
pub const SENTINEL_RANGE: RangeInclusive<char> = '\u{E200}'..='\u{E2FF}';

pub fn strip_sentinels(text: &str) -> String {
    text.chars().filter(|c| !SENTINEL_RANGE.contains(c)).collect()
}

/// Content shapes found in `message.content`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MessageContent<'a> {
    Empty,
    PlainText(&'a str),
    TextWrapper(&'a str),
    PartList(&'a [Value]),
}

impl<'a> MessageContent<'a> {
    pub fn classify(content: Option<&'a Value>) -> Self {
        let Some(content) = content else {
            return MessageContent::Empty;
        };
        match content {
            Value::String(s) => MessageContent::PlainText(s),
            Value::Object(obj) => {
                // An empty `text` falls through to `parts`
                if let Some(text) = obj.get("text").and_then(Value::as_str).filter(|t| !t.is_empty()) {
                    MessageContent::TextWrapper(text)
                } else if let Some(parts) = obj.get("parts").and_then(Value::as_array) {
                    MessageContent::PartList(parts)
                } else {
                    MessageContent::Empty
                }
            }
            _ => MessageContent::Empty,
        }
    }
}

/// One entry of a `parts` list
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContentPart<'a> {
    Text(&'a str),
    AudioTranscription(Option<&'a str>),
    ExcludedMedia,
    /// Unknown shape, rendered as its JSON text so nothing is silently lost
    Generic(&'a Value),
    Null,
}

impl<'a> ContentPart<'a> {
    pub fn classify(part: &'a Value, config: &TransformConfig) -> Self {
        match part {
            Value::Null => ContentPart::Null,
            Value::String(s) => ContentPart::Text(s),
            Value::Object(obj) => {
                let content_type = obj.get("content_type").and_then(Value::as_str);
                match content_type {
                    Some(AUDIO_TRANSCRIPTION) => {
                        ContentPart::AudioTranscription(obj.get("text").and_then(Value::as_str))
                    }
                    Some(ct) if config.is_excluded_content_type(ct) => ContentPart::ExcludedMedia,
                    _ => ContentPart::Generic(part),
                }
            }
            _ => ContentPart::Generic(part),
        }
    }

    pub fn extract(&self) -> String {
        match *self {
            ContentPart::Text(text) => strip_sentinels(text),
            ContentPart::AudioTranscription(text) => text.map(strip_sentinels).unwrap_or_default(),
            ContentPart::ExcludedMedia | ContentPart::Null => String::new(),
            ContentPart::Generic(value) => strip_sentinels(&value.to_string()),
        }
    }
}

/// Normalize raw `message.content` into plain text
pub fn normalize(content: Option<&Value>, config: &TransformConfig) -> String {
    match MessageContent::classify(content) {
        MessageContent::Empty => String::new(),
        MessageContent::PlainText(text) | MessageContent::TextWrapper(text) => strip_sentinels(text),
        MessageContent::PartList(parts) => parts
            .iter()
            .map(|part| ContentPart::classify(part, config).extract())
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn norm(content: Value) -> String {
        normalize(Some(&content), &TransformConfig::default())
    }

    #[test]
    fn test_strip_sentinels() {
        assert_eq!(strip_sentinels("see\u{E200}cite\u{E202}turn0search1\u{E201} here"), "seeciteturn0search1 here");
        assert_eq!(strip_sentinels("\u{E1FF}\u{E300}"), "\u{E1FF}\u{E300}");
    }

    #[test]
    fn test_absent_content_is_empty() {
        assert_eq!(normalize(None, &TransformConfig::default()), "");
        assert_eq!(norm(Value::Null), "");
        assert_eq!(norm(json!({ "content_type": "user_editable_context", "user_profile": "x" })), "");
    }

    #[test]
    fn test_plain_string_and_text_wrapper() {
        assert_eq!(norm(json!("hi\u{E2FF}")), "hi");
        assert_eq!(norm(json!({ "content_type": "code", "text": "print(1)" })), "print(1)");
    }

    #[test]
    fn test_empty_text_falls_back_to_parts() {
        assert_eq!(norm(json!({ "text": "", "parts": ["from parts"] })), "from parts");
    }

    #[test]
    fn test_parts_join_with_newline_and_skip_empty() {
        let content = json!({ "content_type": "text", "parts": ["first", "", "second"] });
        assert_eq!(norm(content), "first\nsecond");
    }

    #[test]
    fn test_audio_transcription_and_excluded_media() {
        let content = json!({
            "content_type": "multimodal_text",
            "parts": [
                { "content_type": "audio_transcription", "text": "spoken words" },
                { "content_type": "audio_asset_pointer", "asset_pointer": "file-service://1" },
                { "content_type": "image_asset_pointer", "asset_pointer": "file-service://2" },
                { "content_type": "real_time_user_audio_video_asset_pointer" },
                "typed words"
            ]
        });
        assert_eq!(norm(content), "spoken words\ntyped words");
    }

    #[test]
    fn test_unknown_object_part_rendered_as_json() {
        let content = json!({
            "parts": [{ "content_type": "tether_quote", "title": "T\u{E200}" }]
        });
        assert_eq!(norm(content), r#"{"content_type":"tether_quote","title":"T"}"#);
    }

    #[test]
    fn test_classify_shapes() {
        let parts = json!({ "parts": [] });
        assert_eq!(MessageContent::classify(Some(&parts)), MessageContent::PartList(&[]));
        let number = json!(3);
        assert_eq!(MessageContent::classify(Some(&number)), MessageContent::Empty);
        assert_eq!(ContentPart::classify(&number, &TransformConfig::default()).extract(), "3");
    }
}
