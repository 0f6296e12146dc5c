//! Ambiguity-checked step definition lookup.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use leftest_protocols::error::StepError;
use leftest_protocols::{Implementation, StepArgs, StepImplementation};

use super::template::{normalize, parse, Segment};

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;

/// One compiled step definition.
#[derive(Debug, Clone)]
pub struct StepDefinition {
    /// Template as written.
    pub name: String,
    /// Template split into text and placeholders.
    pub vars: Vec<Segment>,
    pub implementation: StepImplementation,
}

/// Step definitions keyed by normalized template.
#[derive(Debug, Default)]
pub struct StepRegistry {
    definitions: HashMap<String, Arc<StepDefinition>>,
    order: Vec<String>,
}

impl StepRegistry {
    /// Compile definitions, rejecting templates that normalize identically.
    pub fn new<I, S>(definitions: I) -> Result<Self, StepError>
    where
        I: IntoIterator<Item = (S, StepImplementation)>,
        S: Into<String>,
    {
        let mut registry = Self::default();
        let mut groups: HashMap<String, Vec<String>> = HashMap::new();
        let mut conflicting_keys = Vec::new();

        for (name, implementation) in definitions {
            let name = name.into();
            let key = normalize(&name);
            let group = groups.entry(key.clone()).or_default();
            group.push(name.clone());
            if group.len() == 2 {
                conflicting_keys.push(key.clone());
            }
            if group.len() > 1 {
                continue;
            }

            let definition = StepDefinition {
                vars: parse(&name),
                name,
                implementation,
            };
            registry.order.push(key.clone());
            registry.definitions.insert(key, Arc::new(definition));
        }

        if !conflicting_keys.is_empty() {
            let templates = conflicting_keys
                .iter()
                .filter_map(|key| groups.remove(key))
                .flatten()
                .collect();
            return Err(StepError::Ambiguous(templates));
        }

        tracing::debug!(count = registry.len(), "Step registry compiled");
        Ok(registry)
    }

    /// Definition matching the step text.
    pub fn lookup(&self, text: &str) -> Result<Arc<StepDefinition>, StepError> {
        self.definitions
            .get(&normalize(text))
            .cloned()
            .ok_or_else(|| StepError::NotFound(text.to_string()))
    }

    pub fn contains(&self, text: &str) -> bool {
        self.definitions.contains_key(&normalize(text))
    }

    /// Templates in registration order.
    pub fn templates(&self) -> impl Iterator<Item = &str> {
        self.order
            .iter()
            .filter_map(|key| self.definitions.get(key))
            .map(|d| d.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// Fluent collection of step definitions.
#[derive(Default)]
pub struct StepsBuilder {
    definitions: Vec<(String, StepImplementation)>,
}

impl StepsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a synchronous step.
    pub fn step<F>(self, template: impl Into<String>, f: F) -> Self
    where
        F: Fn(&StepArgs) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.implementation(template, Implementation::sync(f))
    }

    /// Register an asynchronous step.
    pub fn async_step<F, Fut>(self, template: impl Into<String>, f: F) -> Self
    where
        F: Fn(StepArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.implementation(template, Implementation::async_fn(f))
    }

    pub fn implementation(
        mut self,
        template: impl Into<String>,
        implementation: StepImplementation,
    ) -> Self {
        self.definitions.push((template.into(), implementation));
        self
    }

    pub fn build(self) -> Result<StepRegistry, StepError> {
        StepRegistry::new(self.definitions)
    }
}
