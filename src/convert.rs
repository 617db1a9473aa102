//! File/stream front end: read an extracted `conversations.json`, transform,
//! write the pretty-printed result.
//!
//! Archive handling stays outside this crate; callers hand over the JSON
//! document itself.

use crate::config::TransformConfig;
use crate::error::Result;
use crate::export;
use crate::records::ConversionSummary;
use crate::transform::transform_with_config;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::info;

/// Convert from any reader to any writer
pub fn convert_stream<R: Read, W: Write>(reader: R, writer: W, config: &TransformConfig) -> Result<ConversionSummary> {
    let conversations = export::read_conversations(BufReader::new(reader))?;
    info!("Converting {} conversations...", conversations.len());

    let result = transform_with_config(&conversations, config)?;
    let summary = result.summary();
    info!("Processed {} threads, {} messages", summary.threads, summary.messages);

    result.write_pretty(BufWriter::new(writer))?;
    Ok(summary)
}

/// Convert `input` into `output`. The output file is only created once the
/// input has been parsed and transformed.
pub fn convert_file(input: &Path, output: &Path, config: &TransformConfig) -> Result<ConversionSummary> {
    let conversations = export::load_conversations(input)?;
    info!("Converting {} conversations from {}", conversations.len(), input.display());

    let result = transform_with_config(&conversations, config)?;
    let summary = result.summary();

    result.write_pretty(BufWriter::new(File::create(output)?))?;
    info!(
        "Processed {} threads, {} messages -> {}",
        summary.threads,
        summary.messages,
        output.display()
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConvertError;
    use crate::records::TransformResult;
    use std::fs;

    const EXPORT: &str = r#"[
      {
        "id": "c1",
        "title": "hello",
        "create_time": 1000.0,
        "update_time": 1001.0,
        "mapping": {
          "root": { "id": "root", "parent": null, "children": ["m1"], "message": null },
          "m1": {
            "id": "m1",
            "parent": "root",
            "children": [],
            "message": {
              "id": "m1",
              "author": { "role": "user" },
              "content": { "content_type": "text", "parts": ["hi"] },
              "status": "finished_successfully",
              "create_time": 1000.0
            }
          }
        }
      }
    ]"#;

    #[test]
    fn test_convert_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("conversations.json");
        let output = dir.path().join("out.json");
        fs::write(&input, EXPORT).unwrap();

        let summary = convert_file(&input, &output, &TransformConfig::default()).unwrap();
        assert_eq!(summary, ConversionSummary { threads: 1, messages: 1 });

        let written = fs::read_to_string(&output).unwrap();
        let result: TransformResult = serde_json::from_str(&written).unwrap();
        assert_eq!(result.messages[0].content, "hi");
        assert_eq!(result.threads[0].last_message_at, Some(result.messages[0].created_at));
    }

    #[test]
    fn test_invalid_json_leaves_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("conversations.json");
        let output = dir.path().join("out.json");
        fs::write(&input, "{ not json").unwrap();

        let err = convert_file(&input, &output, &TransformConfig::default()).unwrap_err();
        assert!(matches!(err, ConvertError::Parse(_)));
        assert!(!output.exists());
    }

    #[test]
    fn test_convert_stream_writes_pretty_json() {
        let mut out = Vec::new();
        let summary = convert_stream(EXPORT.as_bytes(), &mut out, &TransformConfig::default()).unwrap();
        assert_eq!(summary.messages, 1);

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("{\n  \"threads\": ["));
        assert!(text.ends_with("}\n"));
    }
}
