pub mod catalog;
pub mod config;
pub mod error;
pub mod github;
pub mod io;
pub mod paths;
pub mod pin;
pub mod resolver;
pub mod rewrite;
pub mod usage;
pub mod version;
pub mod workflow;

#[cfg(test)]
mod testing;

pub use error::{PinError, Result};
