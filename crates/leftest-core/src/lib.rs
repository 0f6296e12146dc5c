//! # Leftest Core
//!
//! Behavior-driven authoring engine: tags, step definitions, the scenario
//! tree and the suite that turns authoring calls into adapter suites and
//! tests.
//!
//! ## Components
//!
//! - [`TestSuite`] - Authoring state machine driving a [`TestSuiteAdapter`]
//! - [`StepRegistry`] - Ambiguity-checked step definitions
//! - [`TagRegistry`] / [`TagFilter`] - Tag interning and filter algebra
//! - [`TagSelection`] - Include/exclude selection from `LEFTEST_TAGS`
//! - [`TestContext`] - Key/value store wiped after every scenario run
//!
//! [`TestSuiteAdapter`]: leftest_protocols::TestSuiteAdapter

pub mod hooks;
pub mod scenario;
pub mod selection;
pub mod steps;
pub mod store;
pub mod suite;
pub mod tags;
pub mod testing;

pub use hooks::{EffectiveHooks, Hook, HookKind, Hooks};
pub use scenario::{ExampleRow, ExampleSet, Scenario};
pub use selection::{TagSelection, TAGS_ENV_VAR};
pub use steps::{StepCall, StepDefinition, StepRegistry, StepVerb, StepsBuilder};
pub use store::{ContextEpoch, TestContext};
pub use suite::{AuthoringResult, TestSuite};
pub use tags::{Tag, TagFilter, TagRegistry};
pub use testing::RecordingAdapter;
