//! Bootstrap configuration.
//!
//! Only the volume path is read from the environment; everything else is a
//! command line flag with an image-specific default.

use crate::constants::{
    DEFAULT_FRAMEWORK_ROOT, DEFAULT_HANDLER, DEFAULT_MODEL_MANAGER, DEFAULT_VOLUME_PATH,
    VOLUME_ENV,
};
use crate::layout::MODELS_DIR;
use clap::{Args, ValueEnum};
use coldboot_shared::errors::{BootError, BootResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// What to do when the model manager reports failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ProvisionFailurePolicy {
    /// Stop the bootstrap; the handler is never launched.
    #[default]
    Abort,
    /// Log a warning and launch the handler anyway.
    Continue,
}

/// How control is handed to the request handler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum HandoffMode {
    /// Replace this process image with the handler.
    #[default]
    Exec,
    /// Run the handler as a child, wait, and exit with its status.
    Child,
}

/// An external program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Split a command line on whitespace. No shell quoting is interpreted.
    pub fn parse(line: &str) -> BootResult<Self> {
        let mut words = line.split_whitespace().map(str::to_string);
        let program = words
            .next()
            .ok_or_else(|| BootError::Config("command must not be empty".into()))?;
        Ok(Self {
            program,
            args: words.collect(),
        })
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Command line arguments of `coldboot run`.
#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Persistent volume mount point
    #[arg(long, env = VOLUME_ENV, default_value = DEFAULT_VOLUME_PATH)]
    pub volume: PathBuf,

    /// Inference framework install root; its `models` dir is linked to the volume
    #[arg(long, default_value = DEFAULT_FRAMEWORK_ROOT)]
    pub framework_root: PathBuf,

    /// Model manager command line (whitespace separated)
    #[arg(long, default_value = DEFAULT_MODEL_MANAGER)]
    pub model_manager: String,

    /// Request handler command line (whitespace separated)
    #[arg(long, default_value = DEFAULT_HANDLER)]
    pub handler: String,

    /// Policy when the model manager fails
    #[arg(long, value_enum, default_value_t = ProvisionFailurePolicy::Abort)]
    pub on_provision_failure: ProvisionFailurePolicy,

    /// How to hand control to the handler
    #[arg(long, value_enum, default_value_t = HandoffMode::Exec)]
    pub handoff: HandoffMode,

    /// Also write logs to `<DIR>/coldboot.log`
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

/// Command line arguments of `coldboot inspect`.
#[derive(Debug, Clone, Args)]
pub struct InspectArgs {
    /// Persistent volume mount point
    #[arg(long, env = VOLUME_ENV, default_value = DEFAULT_VOLUME_PATH)]
    pub volume: PathBuf,

    /// Inference framework install root
    #[arg(long, default_value = DEFAULT_FRAMEWORK_ROOT)]
    pub framework_root: PathBuf,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Validated bootstrap configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootConfig {
    pub volume: PathBuf,
    pub framework_root: PathBuf,
    pub model_manager: CommandSpec,
    pub handler: CommandSpec,
    pub on_provision_failure: ProvisionFailurePolicy,
    pub handoff: HandoffMode,
}

impl BootConfig {
    pub fn from_args(args: &RunArgs) -> BootResult<Self> {
        let config = Self {
            volume: args.volume.clone(),
            framework_root: args.framework_root.clone(),
            model_manager: CommandSpec::parse(&args.model_manager)?,
            handler: CommandSpec::parse(&args.handler)?,
            on_provision_failure: args.on_provision_failure,
            handoff: args.handoff,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that would make the filesystem steps ambiguous.
    pub fn validate(&self) -> BootResult<()> {
        if !self.volume.is_absolute() {
            return Err(BootError::Config(format!(
                "volume path must be absolute, got: {}",
                self.volume.display()
            )));
        }
        if !self.framework_root.is_absolute() {
            return Err(BootError::Config(format!(
                "framework root must be absolute, got: {}",
                self.framework_root.display()
            )));
        }
        if self.framework_root.starts_with(&self.volume) {
            return Err(BootError::Config(format!(
                "framework root {} must not live on the volume {}",
                self.framework_root.display(),
                self.volume.display()
            )));
        }
        let models_link = self.framework_root.join(MODELS_DIR);
        if self.volume.starts_with(&models_link) {
            return Err(BootError::Config(format!(
                "volume {} must not live under the framework models path {}",
                self.volume.display(),
                models_link.display()
            )));
        }
        for (what, cmd) in [("model manager", &self.model_manager), ("handler", &self.handler)] {
            if cmd.program.trim().is_empty() {
                return Err(BootError::Config(format!("{} command must not be empty", what)));
            }
        }
        Ok(())
    }
}
