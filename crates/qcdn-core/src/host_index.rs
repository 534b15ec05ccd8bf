// Host index helpers.
//
// The host index is opaque JSON. Two documents that differ only in
// formatting or key order are the same configuration, and values read back
// from the service are rendered with tab indentation and a trailing newline.

use serde::Serialize;
use serde_json::Value;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::error::CoreError;

/// Parse a host index document.
pub fn parse(raw: &str) -> Result<Value, CoreError> {
    serde_json::from_str(raw).map_err(|e| CoreError::InvalidInput {
        message: format!("host_index is not valid JSON: {e}"),
    })
}

/// `true` when both documents parse to the same JSON value.
///
/// Unparseable input never compares equal.
pub fn semantically_equal(a: &str, b: &str) -> bool {
    match (serde_json::from_str::<Value>(a), serde_json::from_str::<Value>(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Render with tab indentation and a trailing newline.
pub fn format(value: &Value) -> Result<String, CoreError> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"\t"));
    value
        .serialize(&mut ser)
        .map_err(|e| CoreError::Internal(format!("failed to format host_index: {e}")))?;
    let mut out = String::from_utf8(buf)
        .map_err(|e| CoreError::Internal(format!("host_index is not UTF-8: {e}")))?;
    out.push('\n');
    Ok(out)
}

/// Keep `previous` when it means the same as `fresh`, so formatting-only
/// differences never surface as changes.
pub fn reconcile(previous: Option<&str>, fresh: &Value) -> Result<String, CoreError> {
    let formatted = format(fresh)?;
    match previous {
        Some(prev) if semantically_equal(prev, &formatted) => Ok(prev.to_owned()),
        _ => Ok(formatted),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn key_order_and_whitespace_are_ignored() {
        assert!(semantically_equal(
            r#"{"a": 1, "b": [1, 2]}"#,
            "{\n\t\"b\": [1,2],\n\t\"a\": 1\n}"
        ));
        assert!(!semantically_equal(r#"{"a": 1}"#, r#"{"a": 2}"#));
        assert!(!semantically_equal("not json", "not json"));
    }

    #[test]
    fn formats_with_tabs_and_newline() {
        let out = format(&json!({"hosts": [1]})).unwrap();
        assert_eq!(out, "{\n\t\"hosts\": [\n\t\t1\n\t]\n}\n");
    }

    #[test]
    fn reconcile_keeps_user_formatting() {
        let prev = r#"{"hosts":[1]}"#;
        assert_eq!(reconcile(Some(prev), &json!({"hosts": [1]})).unwrap(), prev);
        assert_eq!(
            reconcile(Some(prev), &json!({"hosts": [2]})).unwrap(),
            "{\n\t\"hosts\": [\n\t\t2\n\t]\n}\n"
        );
    }
}
