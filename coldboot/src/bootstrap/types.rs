//! Type definitions for the bootstrap pipeline.

use crate::config::BootConfig;
use crate::fs::{HostFs, LinkState};
use crate::layout::{FrameworkLayout, VolumeLayout};
use crate::process::{HandlerLauncher, Handoff, ModelManager, ProvisionOutcome};
use coldboot_shared::errors::{BootError, BootResult};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Where a cold start currently stands.
///
/// ```text
/// Start → VolumeChecked → LayoutReady → Linked → Provisioned → Serving
///   └──────────────┴─────────────┴──────────┴──────────┴──→ Aborted
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BootPhase {
    Start,
    VolumeChecked,
    LayoutReady,
    Linked,
    Provisioned,
    Serving,
    Aborted,
}

impl BootPhase {
    /// The only phase reachable from `self` on success.
    pub fn successor(self) -> Option<BootPhase> {
        match self {
            BootPhase::Start => Some(BootPhase::VolumeChecked),
            BootPhase::VolumeChecked => Some(BootPhase::LayoutReady),
            BootPhase::LayoutReady => Some(BootPhase::Linked),
            BootPhase::Linked => Some(BootPhase::Provisioned),
            BootPhase::Provisioned => Some(BootPhase::Serving),
            BootPhase::Serving | BootPhase::Aborted => None,
        }
    }

    /// Move to `next`, which must be the immediate successor.
    pub fn advance(&mut self, next: BootPhase) -> BootResult<()> {
        if self.successor() != Some(next) {
            return Err(BootError::InvalidState(format!(
                "cannot move from {} to {}",
                self, next
            )));
        }
        *self = next;
        Ok(())
    }

    /// Any failure lands here.
    pub fn abort(&mut self) {
        *self = BootPhase::Aborted;
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, BootPhase::Serving | BootPhase::Aborted)
    }
}

impl fmt::Display for BootPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BootPhase::Start => "START",
            BootPhase::VolumeChecked => "VOLUME_CHECKED",
            BootPhase::LayoutReady => "LAYOUT_READY",
            BootPhase::Linked => "LINKED",
            BootPhase::Provisioned => "PROVISIONED",
            BootPhase::Serving => "SERVING",
            BootPhase::Aborted => "ABORTED",
        };
        f.write_str(name)
    }
}

/// Shared bootstrap pipeline context.
///
/// Holds the configuration, the collaborator seams and what each task
/// produced. Task outputs end up in the `BootReport`; tasks re-derive
/// everything they act on from the filesystem.
pub struct BootContext {
    pub config: BootConfig,
    pub volume: VolumeLayout,
    pub framework: FrameworkLayout,
    pub fs: Arc<dyn HostFs>,
    pub model_manager: Arc<dyn ModelManager>,
    pub launcher: Arc<dyn HandlerLauncher>,
    pub phase: BootPhase,
    pub layout_output: Option<LayoutOutput>,
    pub link_output: Option<LinkOutput>,
    pub provision_output: Option<ProvisionOutcome>,
    pub handoff: Option<Handoff>,
}

impl BootContext {
    pub fn new(
        config: BootConfig,
        fs: Arc<dyn HostFs>,
        model_manager: Arc<dyn ModelManager>,
        launcher: Arc<dyn HandlerLauncher>,
    ) -> Self {
        let volume = VolumeLayout::new(&config.volume);
        let framework = FrameworkLayout::new(&config.framework_root);
        Self {
            config,
            volume,
            framework,
            fs,
            model_manager,
            launcher,
            phase: BootPhase::Start,
            layout_output: None,
            link_output: None,
            provision_output: None,
            handoff: None,
        }
    }
}

// ============================================================================
// TASK OUTPUT TYPES
// ============================================================================

/// Output from the layout task.
#[derive(Debug, Clone)]
pub struct LayoutOutput {
    /// Category directories that did not exist before this run.
    pub created: Vec<PathBuf>,
}

/// Output from the link task.
#[derive(Debug, Clone)]
pub struct LinkOutput {
    /// What occupied the framework models path before binding.
    pub previous: LinkState,
    /// False when an identical link was already in place.
    pub replaced: bool,
}
