//! # Leftest Protocols
//!
//! Contracts shared by the leftest execution engine, the harness layer and
//! the runner bindings that live outside this workspace.
//! Contains only interface definitions and plain value types.
//!
//! ## Core Traits
//!
//! - [`TestSuiteAdapter`] - Realizes suites, tests and steps in a host test runner
//! - [`ScenarioHandle`] - Read-only view of a scenario node handed to hooks
//! - [`TestElement`] - Element interaction implemented per runner backend

pub mod adapter;
pub mod element;
pub mod error;
pub mod flag;

pub use adapter::{
    downcast_context, HookArgs, HookImplementation, Implementation, RunContext, RunMetadata,
    RunResult, Runnable, ScenarioHandle, StepArgs, StepImplementation, SuiteBody,
    TestSuiteAdapter,
};
pub use element::{
    ClickTarget, ElementDimensions, EventData, KeyInput, ModifierKeys, TestElement, TestKey,
    TextOptions,
};
pub use error::{
    ContextError, ContextStoreError, ElementError, LeftestError, LocatorError, ScenarioError,
    StepError, TagError,
};
pub use flag::{Flag, ScenarioKind};
