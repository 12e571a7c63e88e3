//! Error types for the SmartFill protocol layer.

mod channel;
mod precondition;
mod resolver;
mod store;

pub use channel::*;
pub use precondition::*;
pub use resolver::*;
pub use store::*;
