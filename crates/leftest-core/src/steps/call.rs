//! A step as written inside a scenario.

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use leftest_protocols::error::StepError;

use super::args::{resolve_args, ArgSource};
use super::registry::{StepDefinition, StepRegistry};
use super::template::{parse, placeholder_count, Segment};

/// Gherkin keyword a step was declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepVerb {
    Given,
    When,
    Then,
    And,
    But,
}

impl StepVerb {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepVerb::Given => "given",
            StepVerb::When => "when",
            StepVerb::Then => "then",
            StepVerb::And => "and",
            StepVerb::But => "but",
        }
    }
}

impl fmt::Display for StepVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A step bound to its definition, with arguments still unresolved.
#[derive(Debug, Clone)]
pub struct StepCall {
    pub verb: StepVerb,
    pub text: String,
    pub definition: Arc<StepDefinition>,
    segments: Vec<Segment>,
    sources: Vec<ArgSource>,
}

/// Arguments and display text of a step about to run.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStep {
    pub text: String,
    pub values: Vec<Value>,
}

impl StepCall {
    /// Bind `text` to its definition.
    ///
    /// Fails when no definition matches, when an inline literal is malformed
    /// or when fewer explicit arguments than placeholders are given.
    pub fn new(
        verb: StepVerb,
        text: impl Into<String>,
        registry: &StepRegistry,
        explicit: Vec<Value>,
    ) -> Result<Self, StepError> {
        let text = text.into();
        let definition = registry.lookup(&text)?;
        let segments = parse(&text);
        let expected = placeholder_count(&segments);

        if !explicit.is_empty() && explicit.len() < expected {
            return Err(StepError::InsufficientArguments {
                step: text,
                expected,
                actual: explicit.len(),
            });
        }
        let sources = ArgSource::for_call(&segments, explicit)?;

        Ok(Self {
            verb,
            text,
            definition,
            segments,
            sources,
        })
    }

    pub fn sources(&self) -> &[ArgSource] {
        &self.sources
    }

    /// Resolve arguments against the active example row and render the text.
    pub fn resolve<F>(&self, row: F) -> Result<ResolvedStep, StepError>
    where
        F: Fn(&str) -> Option<Value>,
    {
        let values = resolve_args(&self.text, &self.sources, row)?;
        let text = render(&self.text, &self.segments, &values)?;
        Ok(ResolvedStep { text, values })
    }
}

/// Substitute each placeholder with its JSON-encoded argument.
pub fn render(step: &str, segments: &[Segment], values: &[Value]) -> Result<String, StepError> {
    let expected = placeholder_count(segments);
    if values.len() < expected {
        return Err(StepError::InsufficientArguments {
            step: step.to_string(),
            expected,
            actual: values.len(),
        });
    }

    let mut values = values.iter();
    let mut rendered = String::with_capacity(step.len());
    for segment in segments {
        match segment {
            Segment::Text(text) => rendered.push_str(text),
            Segment::Placeholder(_) => {
                if let Some(value) = values.next() {
                    rendered.push_str(&value.to_string());
                }
            }
        }
    }
    Ok(rendered)
}
