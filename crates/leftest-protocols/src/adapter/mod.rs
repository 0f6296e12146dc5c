//! Runner adapter protocol definitions.
//!
//! The execution engine never talks to a test runner directly. It hands
//! suites, tests and wrapped steps to a [`TestSuiteAdapter`] which maps them
//! onto the host runner's native constructs.

mod args;
mod metadata;
mod runnable;
mod traits;

pub use args::*;
pub use metadata::*;
pub use runnable::*;
pub use traits::*;
