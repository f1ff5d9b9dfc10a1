//! Recovers a JSON object from a model reply
//!
//! Models asked for bare JSON still wrap it in prose or code fences. The reply
//! is tried as a whole, then as its first fenced block, then as its first
//! balanced `{...}` object.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

static FENCED_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:[A-Za-z0-9_-]+)?\s*\n?(.*?)```").unwrap());

pub fn extract_json_object(reply: &str) -> Option<Map<String, Value>> {
    let reply = reply.trim();

    if let Some(object) = parse_object(reply) {
        return Some(object);
    }

    if let Some(object) = FENCED_BLOCK
        .captures(reply)
        .and_then(|cap| cap.get(1))
        .and_then(|block| parse_object(block.as_str().trim()))
    {
        return Some(object);
    }

    first_balanced_object(reply).and_then(parse_object)
}

fn parse_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(object)) => Some(object),
        _ => None,
    }
}

/// Slice of the first `{...}` whose braces balance, ignoring braces inside
/// string literals
fn first_balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    None
}
