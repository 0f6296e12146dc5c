//! Error types for the leftest protocol layer.

mod context;
mod element;
mod leftest;
mod locator;
mod scenario;
mod step;
mod store;
mod tag;

pub use context::*;
pub use element::*;
pub use leftest::*;
pub use locator::*;
pub use scenario::*;
pub use step::*;
pub use store::*;
pub use tag::*;
