//! # Leftest
//!
//! Behavior-driven test authoring on top of any test runner, plus component
//! harnesses for querying UI under test.
//!
//! ## Crates
//!
//! - [`protocols`] - Adapter, element and error contracts
//! - [`core`] - Tags, steps, the scenario tree and [`TestSuite`]
//! - [`harness`] - Selector DSL, harness predicates and locators
//! - [`config`] - `leftest.toml` loading and validation
//!
//! ## Setup
//!
//! ```ignore
//! let leftest = Leftest::load()?;
//! leftest.init_logging();
//! let suite = leftest.suite(steps, adapter);
//! ```

pub mod bootstrap;
pub mod logging;

pub use leftest_config as config;
pub use leftest_core as core;
pub use leftest_harness as harness;
pub use leftest_protocols as protocols;

pub use bootstrap::{BootstrapError, Leftest};
pub use leftest_core::{
    RecordingAdapter, StepRegistry, StepVerb, StepsBuilder, TagFilter, TestContext, TestSuite,
};
pub use leftest_harness::{
    ComponentHarness, HarnessEnvironment, HarnessPredicate, LocatorFactory, Query, QueryResult,
};
pub use leftest_protocols::{Flag, LeftestError, TestSuiteAdapter};
