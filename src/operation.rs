//! Single-operation state holder.
//!
//! Setup, upload and download are mutually exclusive. A start request while
//! another operation runs is rejected, never queued.

use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Setup,
    Upload,
    Download,
}

impl OperationKind {
    pub fn label(&self) -> &'static str {
        match self {
            OperationKind::Setup => "setup",
            OperationKind::Upload => "upload",
            OperationKind::Download => "download",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperationState {
    #[default]
    Idle,
    Running(OperationKind),
    Succeeded(OperationKind),
    Failed(OperationKind),
}

/// Why a start request was turned down.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("Another operation ({0}) is in progress")]
    Busy(OperationKind),

    #[error("Working folder {} does not exist", .0.display())]
    MissingWorkingFolder(PathBuf),
}

impl OperationState {
    pub fn is_busy(&self) -> bool {
        matches!(self, OperationState::Running(_))
    }

    pub fn running(&self) -> Option<OperationKind> {
        match self {
            OperationState::Running(kind) => Some(*kind),
            _ => None,
        }
    }

    /// Move to `Running(kind)` unless something is already running.
    pub fn try_begin(&mut self, kind: OperationKind) -> Result<(), Rejection> {
        if let OperationState::Running(current) = self {
            return Err(Rejection::Busy(*current));
        }
        *self = OperationState::Running(kind);
        Ok(())
    }

    /// Record the outcome of `kind`. A stale completion for an operation that
    /// is not the running one is ignored.
    pub fn finish(&mut self, kind: OperationKind, success: bool) {
        if self.running() != Some(kind) {
            tracing::warn!(%kind, state = ?self, "ignoring completion for an operation that is not running");
            return;
        }
        *self = if success {
            OperationState::Succeeded(kind)
        } else {
            OperationState::Failed(kind)
        };
    }
}
