//! In-memory DOM backend for exercising harnesses without a browser.
//!
//! ```ignore
//! let dom = MemoryDom::new();
//! dom.append(dom.document(), ElementSpec::new("button").text("Save"));
//! let loader = HarnessEnvironment::new(dom).loader();
//! ```

mod css;
mod dom;
mod element;

#[cfg(test)]
pub(crate) mod fixtures;

pub use dom::{DomEvent, ElementSpec, MemoryDom, NodeId};
pub use element::MemoryElement;
