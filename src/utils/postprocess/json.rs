use anyhow::Result;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{from_str, Value};
use std::error::Error;
use std::fmt;
use std::fmt::Formatter;

use crate::utils::JsonMap;

lazy_static! {
    static ref FENCED_BLOCK_RE: Regex =
        Regex::new(r"(?s)```(?:json)?\s*(.*?)```").unwrap();
}

/// Pulls a JSON value out of a model reply, tolerating the ways models like to wrap JSON.
///
/// Tried in order:
/// 1. the whole trimmed reply;
/// 2. the contents of the first fenced markdown block (``` or ```json);
/// 3. the outermost `{ ... }` slice.
///
/// Returns a [serde_json::Value] or an [InvalidJson] error if nothing parses.
///
/// # Example
/// ```
/// use duodoc::utils::postprocess::json::extract_json;
/// let fenced = "Here you go:\n```json\n{\"a\":\"alice\"}\n```";
/// let json_value = extract_json(fenced).expect("Expect to be fine but failed");
/// assert_eq!(json_value["a"], "alice");
///
/// let invalid_str = "partially valid: \"a\":\"alice\"}";
/// assert_eq!(extract_json(invalid_str).is_err(), true)
/// ```
pub fn extract_json(reply: impl Into<String>) -> Result<Value> {
    let reply = reply.into();
    if let Ok(value) = from_str(reply.trim()) {
        return Ok(value);
    }
    if let Some(captures) = FENCED_BLOCK_RE.captures(&reply) {
        if let Ok(value) = from_str(captures[1].trim()) {
            return Ok(value);
        }
    }
    filter_to_json(&reply).map_err(|_| InvalidJson { invalid_string: reply }.into())
}

/// Like [extract_json], but insists the extracted value is a JSON object and hands back its map.
pub fn extract_json_object(reply: impl Into<String>) -> Result<JsonMap> {
    let reply = reply.into();
    match extract_json(reply.as_str())? {
        Value::Object(map) => Ok(map),
        _ => Err(InvalidJson { invalid_string: reply }.into()),
    }
}

/// Filters surrounding content and tries to parse the outermost `{ ... }` slice.
fn filter_to_json(string: &str) -> Result<Value> {
    let left_brace_idx = string.find('{');
    let right_brace_idx = string.rfind('}');
    match (left_brace_idx, right_brace_idx) {
        (Some(lbi), Some(rbi)) if lbi < rbi => {
            let valid_json = &string[lbi..rbi + 1];
            let value = from_str(valid_json)?;
            Ok(value)
        }
        _ => Err(InvalidJson { invalid_string: string.to_string() }.into()),
    }
}

/// Error when no JSON value could be extracted from a reply.
#[derive(Debug, Clone)]
pub struct InvalidJson {
    pub invalid_string: String,
}

impl fmt::Display for InvalidJson {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid string to be parsed:\n{}", self.invalid_string)
    }
}

impl Error for InvalidJson {}

#[cfg(test)]
mod test_json {
    use crate::utils::postprocess::json::{extract_json, extract_json_object};

    #[test]
    fn test_plain_json() {
        let value = extract_json("{\"a\":\"alice\"}").expect("Expect to be fine but failed");
        assert_eq!(value["a"], "alice");
    }

    #[test]
    fn test_fenced_json() {
        let reply = "Sure! Here is the comparison:\n```json\n{\"older\": \"alice\"}\n```\nLet me know.";
        let value = extract_json(reply).expect("Expect to be fine but failed");
        assert_eq!(value["older"], "alice");
    }

    #[test]
    fn test_fence_without_language_tag() {
        let reply = "```\n{\"a\": 1}\n```";
        let value = extract_json(reply).expect("Expect to be fine but failed");
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn test_embedded_json() {
        let reply = "Here is the result you ask for: {\"a\":\"alice\"}";
        let value = extract_json(reply).expect("Expect to be fine but failed");
        assert_eq!(value["a"], "alice");
    }

    #[test]
    fn test_invalid_json() {
        let reply = "Here is the result you ask for: {\"a\":\"alice\"";
        extract_json(reply).expect_err("This should give error but not");

        extract_json("{{}}").expect_err("This should give error but not");
    }

    #[test]
    fn test_object_required() {
        let map = extract_json_object("{\"a\": 1}").expect("Expect to be fine but failed");
        assert_eq!(map["a"], 1);
        extract_json_object("[1, 2]").expect_err("This should give error but not");
    }
}
