//! Reading record batches produced by documentation generators.
//!
//! Accepted shapes:
//! - Documenter's `search_index.js`: `var documenterSearchIndex = {"docs": [...]}`,
//!   which in the wild carries trailing commas
//! - a JSON array of records, a single record, or an object with a `docs` array
//! - JSON Lines, one record per line

use crate::record::RawRecord;
use anyhow::{bail, Context, Result};
use serde_json::Value;

/// Parse any supported shape. Records that fail to deserialize are kept as
/// empty raw records so the builder counts them as malformed instead of the
/// whole batch failing.
pub fn parse_records(content: &str) -> Result<Vec<RawRecord>> {
    let body = strip_js_assignment(content.trim_start_matches('\u{feff}').trim());
    if body.is_empty() {
        return Ok(Vec::new());
    }
    let cleaned = strip_trailing_commas(body);
    match serde_json::from_str::<Value>(&cleaned) {
        Ok(value) => from_value(value),
        Err(json_err) => parse_jsonl(body).with_context(|| format!("not JSON ({json_err}) and not JSON Lines")),
    }
}

fn from_value(value: Value) -> Result<Vec<RawRecord>> {
    match value {
        Value::Array(items) => Ok(items.into_iter().map(lenient).collect()),
        Value::Object(mut map) if map.contains_key("docs") => match map.remove("docs") {
            Some(Value::Array(items)) => Ok(items.into_iter().map(lenient).collect()),
            _ => bail!("`docs` is not an array"),
        },
        Value::Object(_) => Ok(vec![lenient(value)]),
        other => bail!("expected an array or object of records, found {other}"),
    }
}

fn lenient(value: Value) -> RawRecord {
    serde_json::from_value(value).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "record does not match the expected shape");
        RawRecord::default()
    })
}

fn parse_jsonl(body: &str) -> Result<Vec<RawRecord>> {
    let mut out = Vec::new();
    for (lineno, line) in body.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(line).with_context(|| format!("line {}", lineno + 1))?;
        out.push(lenient(value));
    }
    Ok(out)
}

/// Drop a leading `var name =` / `const name =` and a trailing `;`.
fn strip_js_assignment(s: &str) -> &str {
    let mut s = s;
    for kw in ["var ", "let ", "const ", "window."] {
        if let Some(rest) = s.strip_prefix(kw) {
            if let Some(eq) = rest.find('=') {
                s = rest[eq + 1..].trim();
            }
            break;
        }
    }
    s.trim_end_matches(';').trim_end()
}

/// Remove commas that directly precede `]` or `}` outside of string literals.
pub fn strip_trailing_commas(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut pending_comma: Option<String> = None;

    for c in s.chars() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        if let Some(mut buf) = pending_comma.take() {
            if c.is_whitespace() {
                buf.push(c);
                pending_comma = Some(buf);
                continue;
            }
            if c == ']' || c == '}' {
                // drop the comma, keep the whitespace
                out.push_str(&buf[1..]);
            } else {
                out.push_str(&buf);
            }
        }
        match c {
            ',' => pending_comma = Some(String::from(",")),
            '"' => {
                in_string = true;
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    if let Some(buf) = pending_comma {
        out.push_str(&buf);
    }
    out
}
