//! # Leftest Harness
//!
//! Component harnesses and locator resolution over a pluggable element
//! backend.
//!
//! ## Components
//!
//! - [`HarnessPredicate`] - Typed, composable harness queries
//! - [`HarnessEnvironment`] - Resolves queries against an [`EnvironmentBackend`]
//! - [`LocatorFactory`] - Deferred locators and harness loaders
//! - [`selector`] - Selector DSL helpers
//!
//! The `testing` feature enables an in-memory DOM backend for tests.

pub mod environment;
pub mod harness;
pub mod locator;
pub mod predicate;
pub mod query;
pub mod selector;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use environment::{
    EnvironmentBackend, EnvironmentOptions, ExtraOptions, HarnessEnvironment, Wait,
    DEFAULT_WAIT_TIMEOUT,
};
pub use harness::{ComponentHarness, ContentContainerHarness, HarnessBase};
pub use locator::{HarnessLoader, Locator, LocatorFactory, LocatorScope};
pub use predicate::{string_matches, CandidateCache, HarnessPredicate, StringPattern};
pub use query::{ErasedHarness, HarnessMatch, HarnessQuery, Query, QueryResult};
pub use selector::{
    set_component_attribute, set_test_id_attribute, with_component, with_role, with_test_id,
};
