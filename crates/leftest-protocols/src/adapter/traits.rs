//! Adapter and scenario handle traits.

use serde_json::Value;

use super::{RunMetadata, Runnable};
use crate::error::LeftestError;
use crate::flag::{Flag, ScenarioKind};

/// Body of a suite, invoked by the adapter to declare nested suites and tests.
pub type SuiteBody = Box<dyn FnOnce() -> Result<(), LeftestError> + Send>;

/// Binding between the execution engine and a host test runner.
///
/// `suite` and `test` are required. The step and hook methods are wrappers:
/// they receive the engine's runnable and return the runnable the engine
/// will actually invoke, which lets a runner report each step or hook as a
/// named unit. The default wrappers return the body unchanged.
pub trait TestSuiteAdapter: Send + Sync {
    /// Whether generated runnables are driven asynchronously.
    fn is_async(&self) -> bool;

    /// Declare a suite. Implementations must invoke `body` to collect the
    /// nested suites and tests.
    fn suite(&self, name: &str, body: SuiteBody, flag: Flag) -> Result<(), LeftestError>;

    /// Declare a test.
    fn test(&self, name: &str, body: Runnable, metadata: RunMetadata) -> Result<(), LeftestError>;

    /// Wrap one step of a running test.
    fn step(&self, verb: &str, text: &str, body: Runnable, metadata: &RunMetadata) -> Runnable {
        let _ = (verb, text, metadata);
        body
    }

    fn before_scenario(&self, body: Runnable, metadata: &RunMetadata) -> Runnable {
        let _ = metadata;
        body
    }

    fn after_scenario(&self, body: Runnable, metadata: &RunMetadata) -> Runnable {
        let _ = metadata;
        body
    }

    fn before_step(&self, body: Runnable, metadata: &RunMetadata) -> Runnable {
        let _ = metadata;
        body
    }

    fn after_step(&self, body: Runnable, metadata: &RunMetadata) -> Runnable {
        let _ = metadata;
        body
    }
}

/// Read-only view of a scenario tree node, handed to hooks.
pub trait ScenarioHandle: Send + Sync {
    /// Unique node id.
    fn id(&self) -> &str;

    fn name(&self) -> &str;

    fn kind(&self) -> ScenarioKind;

    /// Effective tags: feature, parent, own and example-row tags.
    fn tags(&self) -> Vec<String>;

    /// Whether a step of the current run has failed.
    fn has_failed(&self) -> bool;

    /// Example-row value for `key`, if any.
    fn data(&self, key: &str) -> Option<Value>;
}
