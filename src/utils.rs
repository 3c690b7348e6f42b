use serde_json::Value;

/// Render a payload field as a single log-safe line.
///
/// Strings are printed without quotes, other JSON values in compact form,
/// missing fields as `-`. CR and LF are removed so a client cannot forge
/// extra log records.
pub fn sanitize_log_value(value: Option<&Value>) -> String {
    let rendered = match value {
        None => return "-".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };
    strip_line_breaks(&rendered)
}

pub fn strip_line_breaks(text: &str) -> String {
    text.chars().filter(|c| !matches!(c, '\n' | '\r')).collect()
}

/// Split an uploaded NDJSON body into lines.
///
/// Invalid UTF-8 sequences are replaced rather than rejected, so a single
/// corrupt line only fails that line.
pub fn ndjson_lines(data: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(data)
        .lines()
        .map(str::to_string)
        .collect()
}
