//! Output cleanup for text coming back from the Modal CLI
//!
//! The CLI decorates its terminal output with Rich tables and colour codes.
//! None of that survives a text protocol well, so it is stripped here.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

/// Captured output above this many characters is cut in the middle
pub const MAX_CAPTURE_CHARS: usize = 30_000;
pub const TRUNCATE_HEAD_CHARS: usize = 5_000;
pub const TRUNCATE_TAIL_CHARS: usize = 25_000;
pub const TRUNCATION_MARKER: &str = "\n\n... [truncated middle] ...\n\n";

fn ansi_sgr_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\x1b\[[0-9;]*m").expect("ANSI pattern should compile"))
}

fn space_run_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r" {2,}").expect("space run pattern should compile"))
}

fn is_box_drawing(c: char) -> bool {
    ('\u{2500}'..='\u{257f}').contains(&c)
}

/// Strip box-drawing glyphs and ANSI colour codes, collapse runs of spaces,
/// trim every line and drop the empty ones.
pub fn strip_rich(text: &str) -> String {
    let without_boxes: String = text.chars().filter(|c| !is_box_drawing(*c)).collect();
    let without_ansi = ansi_sgr_regex().replace_all(&without_boxes, "");
    let collapsed = space_run_regex().replace_all(&without_ansi, " ");

    collapsed
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Keep the head and tail of oversized text, cutting on character boundaries
pub fn truncate_middle(text: &str) -> String {
    let total = text.chars().count();
    if total <= MAX_CAPTURE_CHARS {
        return text.to_string();
    }

    let head: String = text.chars().take(TRUNCATE_HEAD_CHARS).collect();
    let tail: String = text.chars().skip(total - TRUNCATE_TAIL_CHARS).collect();
    format!("{}{}{}", head, TRUNCATION_MARKER, tail)
}

/// Render `--json` CLI output as readable `key: value` text.
///
/// Text that is not JSON is returned unchanged.
pub fn format_json_listing(text: &str) -> String {
    let data: Value = match serde_json::from_str(text) {
        Ok(data) => data,
        Err(_) => return text.to_string(),
    };

    match data {
        Value::Array(items) if items.is_empty() => "No results.".to_string(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Object(map) => map
                    .iter()
                    .map(|(k, v)| format!("  {}: {}", k, render_value(v)))
                    .collect::<Vec<_>>()
                    .join("\n"),
                other => render_value(other),
            })
            .collect::<Vec<_>>()
            .join("\n\n"),
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| format!("{}: {}", k, render_value(v)))
            .collect::<Vec<_>>()
            .join("\n"),
        other => render_value(&other),
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        other => other.to_string(),
    }
}
