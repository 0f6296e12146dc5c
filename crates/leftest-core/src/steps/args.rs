//! Argument sources and their resolution.

use serde_json::{Number, Value};

use leftest_protocols::error::StepError;

use super::template::{Placeholder, Segment};

/// Where one step argument comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgSource {
    /// Passed by the caller.
    Explicit(Value),
    /// Written inline in the step text.
    Inline(Value),
    /// Named placeholder resolved against the active example row.
    ExampleRow(String),
}

impl ArgSource {
    /// Sources for a step call.
    ///
    /// Explicit arguments, when any are given, take precedence and inline
    /// parsing is skipped entirely.
    pub fn for_call(segments: &[Segment], explicit: Vec<Value>) -> Result<Vec<Self>, StepError> {
        if !explicit.is_empty() {
            return Ok(explicit.into_iter().map(ArgSource::Explicit).collect());
        }
        segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Text(_) => None,
                Segment::Placeholder(p) => Some(p),
            })
            .map(|placeholder| match placeholder {
                Placeholder::Named(name) => Ok(ArgSource::ExampleRow(name.clone())),
                Placeholder::Str(s) => Ok(ArgSource::Inline(Value::String(s.clone()))),
                Placeholder::Literal(raw) => parse_literal(raw).map(ArgSource::Inline),
            })
            .collect()
    }
}

/// Parse the contents of a `[...]` literal.
pub(crate) fn parse_literal(raw: &str) -> Result<Value, StepError> {
    let trimmed = raw.trim();
    match trimmed {
        "true" => return Ok(Value::Bool(true)),
        "false" => return Ok(Value::Bool(false)),
        "null" | "undefined" => return Ok(Value::Null),
        _ => {}
    }
    if let Ok(int) = trimmed.parse::<i64>() {
        return Ok(Value::Number(int.into()));
    }
    trimmed
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| StepError::InvalidLiteral(raw.to_string()))
}

/// Resolve argument sources to values.
///
/// `row` looks up a named placeholder in the active example row. Every
/// unresolved name is reported at once.
pub fn resolve_args<F>(step: &str, sources: &[ArgSource], row: F) -> Result<Vec<Value>, StepError>
where
    F: Fn(&str) -> Option<Value>,
{
    let mut values = Vec::with_capacity(sources.len());
    let mut missing = Vec::new();

    for source in sources {
        match source {
            ArgSource::Explicit(v) | ArgSource::Inline(v) => values.push(v.clone()),
            ArgSource::ExampleRow(name) => match row(name) {
                Some(v) => values.push(v),
                None => missing.push(name.clone()),
            },
        }
    }

    if !missing.is_empty() {
        return Err(StepError::MissingArguments {
            step: step.to_string(),
            names: missing,
        });
    }
    Ok(values)
}
