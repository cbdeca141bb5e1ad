//! CLI command implementations

mod health;
mod lookup;

pub use health::health;
pub use lookup::lookup;
