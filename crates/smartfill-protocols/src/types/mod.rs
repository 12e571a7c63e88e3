//! Data model shared across SmartFill crates.

mod field;
mod fill;
mod frame;
mod history;
mod profile;

pub use field::*;
pub use fill::*;
pub use frame::*;
pub use history::*;
pub use profile::*;
