//! Cold-start bootstrap for serverless video-generation workers.
//!
//! On every cold start the worker must find its persistent volume, lay out
//! the model directories on it, point the inference framework at them, let
//! the model manager fetch whatever is missing, and only then hand the
//! instance to the request handler. [`Bootstrapper`] runs that sequence as
//! a fail-fast pipeline; [`inspect::inspect`] reports the same state without
//! changing it.

pub mod bootstrap;
pub mod config;
pub mod constants;
pub mod fs;
pub mod inspect;
pub mod layout;
mod logging;
pub mod pipeline;
pub mod process;

pub use bootstrap::{BootPhase, BootReport, Bootstrapper};
pub use coldboot_shared::errors::{BootError, BootResult};
pub use config::{BootConfig, CommandSpec, HandoffMode, ProvisionFailurePolicy};
pub use logging::init_logging;
