//! Element interaction protocol.
//!
//! Runner backends (browser DOM, remote-controlled browsers, simulated DOMs)
//! implement [`TestElement`]; harnesses only ever talk to this trait.

mod traits;
mod types;

pub use traits::*;
pub use types::*;
