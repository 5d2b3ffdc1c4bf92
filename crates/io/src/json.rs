// JSON output

use std::path::Path;

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::Value;

use crate::IoError;

/// Serialize `value`. `indent == 0` is compact; otherwise pretty with that many spaces.
pub fn to_string(value: &Value, indent: usize) -> String {
    if indent == 0 {
        return value.to_string();
    }

    let indent_str = vec![b' '; indent];
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(&indent_str);
    let mut ser = Serializer::with_formatter(&mut buf, formatter);
    // Serializing a Value into a Vec cannot fail, and its output is UTF-8
    if value.serialize(&mut ser).is_err() {
        return value.to_string();
    }
    String::from_utf8(buf).unwrap_or_else(|_| value.to_string())
}

/// Write the document followed by a newline.
pub fn write(path: &Path, value: &Value, indent: usize) -> Result<(), IoError> {
    let mut text = to_string(value, indent);
    text.push('\n');
    std::fs::write(path, text).map_err(|source| IoError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_compact() {
        assert_eq!(to_string(&json!({"A": 10, "B": 5}), 0), r#"{"A":10,"B":5}"#);
    }

    #[test]
    fn test_pretty_four_spaces() {
        let text = to_string(&json!({"total_sum": 15}), 4);
        assert_eq!(text, "{\n    \"total_sum\": 15\n}");
    }

    #[test]
    fn test_pretty_two_spaces_error() {
        let text = to_string(&json!({"error": "bad \"quote\""}), 2);
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["error"], "bad \"quote\"");
        assert!(text.starts_with("{\n  \"error\""));
    }

    #[test]
    fn test_write_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.json");
        write(&path, &json!({"A": 1}), 4).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.ends_with("}\n"));
        let parsed: Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed, json!({"A": 1}));
    }

    #[test]
    fn test_write_into_missing_dir() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("out.json");
        let err = write(&path, &json!({}), 4).unwrap_err();
        assert!(matches!(err, IoError::Write { .. }));
    }
}
