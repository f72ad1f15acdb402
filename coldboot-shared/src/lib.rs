//! Types shared across coldboot crates.

pub mod errors;

pub use errors::{BootError, BootResult};
