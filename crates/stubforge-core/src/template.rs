//! Prompt template rendering.
//!
//! Templates use a small substitution language:
//! - `{{.title}}` looks `title` up in the input mapping
//! - `{{.plan.steps.0.title}}` walks nested mappings and sequences
//! - `{{.}}` renders the whole input mapping as JSON
//! - `{{- .x -}}` trims whitespace in the neighbouring literal text
//! - `{{/* note */}}` renders nothing
//!
//! Lookups are soft: a missing key or a step through a scalar renders the
//! empty string. Rendering output is only ever used for audit records, so
//! the only failure is a template that cannot be parsed at all.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

/// Named values a template is rendered against.
pub type Inputs = serde_json::Map<String, Value>;

lazy_static! {
    /// `.` or one or more `.segment` parts, where a segment is an
    /// identifier or a sequence index.
    static ref PATH_PATTERN: Regex = Regex::new(
        r"^(?:\.|(?:\.(?:[A-Za-z_][A-Za-z0-9_]*|[0-9]+))+)$"
    ).unwrap();
}

/// A template that could not be parsed.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("invalid template at byte {position}: {reason}")]
pub struct TemplateError {
    /// The full template text that failed
    pub template: String,

    /// Byte offset of the offending action
    pub position: usize,

    pub reason: String,
}

impl TemplateError {
    fn new(template: &str, position: usize, reason: impl Into<String>) -> Self {
        Self {
            template: template.to_string(),
            position,
            reason: reason.into(),
        }
    }
}

/// Render `template` against `inputs`.
///
/// Empty and whitespace-only templates render to an empty string.
pub fn render(template: &str, inputs: &Inputs) -> Result<String, TemplateError> {
    if template.trim().is_empty() {
        return Ok(String::new());
    }

    let mut out = String::with_capacity(template.len());
    let mut pos = 0;
    let mut trim_next_literal = false;

    while let Some(open_offset) = template[pos..].find("{{") {
        let open = pos + open_offset;
        let mut body_start = open + 2;

        // "{{- " trims the literal before the action
        let trim_before = template[body_start..].starts_with("- ")
            || template[body_start..].starts_with("-\t")
            || template[body_start..].starts_with("-\n");
        if trim_before {
            body_start += 1;
        }

        // A comment may contain "}}", so its closing braces follow "*/".
        let search_from = comment_end(template, body_start).unwrap_or(body_start);
        let close_offset = template[search_from..]
            .find("}}")
            .ok_or_else(|| TemplateError::new(template, open, "unclosed action"))?;
        let close = search_from + close_offset;

        let mut body = &template[body_start..close];
        let trim_after = body.len() >= 2
            && body.ends_with('-')
            && body[..body.len() - 1].ends_with(char::is_whitespace);
        if trim_after {
            body = &body[..body.len() - 1];
        }

        let mut literal = &template[pos..open];
        if trim_next_literal {
            literal = literal.trim_start();
        }
        if trim_before {
            literal = literal.trim_end();
        }
        out.push_str(literal);

        render_action(template, open, body.trim(), inputs, &mut out)?;

        trim_next_literal = trim_after;
        pos = close + 2;
    }

    let mut tail = &template[pos..];
    if trim_next_literal {
        tail = tail.trim_start();
    }
    out.push_str(tail);

    Ok(out)
}

/// Byte offset just past the `*/` of a comment action starting at `body_start`.
fn comment_end(template: &str, body_start: usize) -> Option<usize> {
    let rest = &template[body_start..];
    let trimmed = rest.trim_start();
    if !trimmed.starts_with("/*") {
        return None;
    }
    let text_start = body_start + (rest.len() - trimmed.len()) + 2;
    template[text_start..]
        .find("*/")
        .map(|offset| text_start + offset + 2)
}

fn render_action(
    template: &str,
    position: usize,
    action: &str,
    inputs: &Inputs,
    out: &mut String,
) -> Result<(), TemplateError> {
    if action.starts_with("/*") {
        if action.len() < 4 || !action.ends_with("*/") {
            return Err(TemplateError::new(template, position, "unclosed comment"));
        }
        return Ok(());
    }

    if action.is_empty() {
        return Err(TemplateError::new(template, position, "empty action"));
    }

    if !PATH_PATTERN.is_match(action) {
        return Err(TemplateError::new(
            template,
            position,
            format!("unsupported action '{}'", action),
        ));
    }

    if action == "." {
        out.push_str(&Value::Object(inputs.clone()).to_string());
        return Ok(());
    }

    if let Some(value) = lookup(inputs, &action[1..]) {
        write_value(value, out);
    }

    Ok(())
}

/// Resolve a dotted path (without the leading dot) against `inputs`.
///
/// Returns `None` when any segment is missing or steps through a scalar.
pub fn lookup<'a>(inputs: &'a Inputs, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = inputs.get(segments.next()?)?;

    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }

    Some(current)
}

fn write_value(value: &Value, out: &mut String) {
    match value {
        Value::Null => {}
        Value::String(s) => out.push_str(s),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::Array(_) | Value::Object(_) => out.push_str(&value.to_string()),
    }
}
