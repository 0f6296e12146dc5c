//! Step definitions: template parsing, ambiguity checks and argument
//! resolution.

mod args;
mod call;
mod registry;
mod template;

pub use args::{resolve_args, ArgSource};
pub use call::{render, ResolvedStep, StepCall, StepVerb};
pub use registry::{StepDefinition, StepRegistry, StepsBuilder};
pub use template::{normalize, parse, Placeholder, Segment, WILDCARD};
