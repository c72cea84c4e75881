//! Control panel state, independent of the widget toolkit.
//!
//! All display state (log, progress, status, notices) lives here and is only
//! mutated on the thread that owns the panel: directly by the request
//! methods, or from worker messages in [`ControlPanel::pump`].

use std::sync::mpsc::{self, Receiver, Sender};

use chrono::Local;

use crate::config::AppConfig;
use crate::credential::Credential;
use crate::gui::credential_dialog::CredentialDialog;
use crate::gui::notifications::{Notification, NotificationManager};
use crate::operation::{OperationKind, OperationState, Rejection};
use crate::rclone::Rclone;
use crate::utils::timestamped;
use crate::worker::{self, JobContext, StatusItem, WorkerMsg};

const MAX_LOG_LINES: usize = 1000;
const LOG_TRIM: usize = 100;

/// Probe results; `None` while a probe is outstanding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToolStatus {
    pub rclone: Option<bool>,
    pub remote: Option<bool>,
    pub working_folder: Option<bool>,
}

impl ToolStatus {
    fn set(&mut self, item: StatusItem, value: bool) {
        match item {
            StatusItem::Rclone => self.rclone = Some(value),
            StatusItem::Remote => self.remote = Some(value),
            StatusItem::WorkingFolder => self.working_folder = Some(value),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.rclone.is_none() || self.remote.is_none() || self.working_folder.is_none()
    }
}

/// Pre-flight dialogs of the setup action.
#[derive(Debug, Clone, Default)]
pub enum SetupFlow {
    #[default]
    None,
    ConfirmReconfigure,
    Credential(CredentialDialog),
}

pub struct ControlPanel {
    config: AppConfig,
    operation: OperationState,
    progress: f32,
    progress_text: String,
    log: Vec<String>,
    status: ToolStatus,
    setup_flow: SetupFlow,
    pub notifications: NotificationManager,
    tx: Sender<WorkerMsg>,
    rx: Receiver<WorkerMsg>,
}

impl ControlPanel {
    pub fn new(config: AppConfig) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            config,
            operation: OperationState::Idle,
            progress: 0.0,
            progress_text: "Waiting...".to_string(),
            log: Vec::new(),
            status: ToolStatus::default(),
            setup_flow: SetupFlow::None,
            notifications: NotificationManager::new(),
            tx,
            rx,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn operation(&self) -> OperationState {
        self.operation
    }

    pub fn is_busy(&self) -> bool {
        self.operation.is_busy()
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn progress_text(&self) -> &str {
        &self.progress_text
    }

    pub fn log_lines(&self) -> &[String] {
        &self.log
    }

    pub fn status(&self) -> ToolStatus {
        self.status
    }

    pub fn setup_flow(&self) -> &SetupFlow {
        &self.setup_flow
    }

    pub fn setup_flow_mut(&mut self) -> &mut SetupFlow {
        &mut self.setup_flow
    }

    pub fn log(&mut self, message: &str) {
        tracing::info!(target: "yuniserver::panel", "{}", message);
        self.log.push(timestamped(Local::now(), message));
        if self.log.len() > MAX_LOG_LINES {
            self.log.drain(0..LOG_TRIM);
        }
    }

    fn job_context(&self) -> JobContext {
        JobContext::from_config(&self.config)
    }

    /// Re-check rclone, remote and working folder in the background.
    pub fn refresh_status(&mut self) {
        self.status = ToolStatus::default();
        worker::spawn_status_probe(self.job_context(), self.tx.clone());
    }

    fn reject(&mut self, rejection: Rejection) -> Result<(), Rejection> {
        tracing::warn!(%rejection, "request rejected");
        let notice = match &rejection {
            Rejection::Busy(_) => Notification::warning("Warning", "Another operation is in progress."),
            Rejection::MissingWorkingFolder(_) => Notification::error("Error", rejection.to_string()),
        };
        self.notifications.push(notice);
        Err(rejection)
    }

    fn ensure_idle(&mut self) -> Result<(), Rejection> {
        match self.operation.running() {
            Some(kind) => self.reject(Rejection::Busy(kind)),
            None => Ok(()),
        }
    }

    /// First step of setup: ask before overwriting an existing remote,
    /// otherwise go straight to the credential form.
    pub fn request_setup(&mut self) -> Result<(), Rejection> {
        self.ensure_idle()?;

        let rclone = Rclone::from_config(&self.config);
        self.setup_flow = if rclone.remote_configured() {
            SetupFlow::ConfirmReconfigure
        } else {
            SetupFlow::Credential(self.credential_dialog())
        };
        Ok(())
    }

    fn credential_dialog(&self) -> CredentialDialog {
        CredentialDialog::new(self.config.temp_credential_path())
    }

    pub fn confirm_reconfigure(&mut self, proceed: bool) {
        if !matches!(self.setup_flow, SetupFlow::ConfirmReconfigure) {
            return;
        }
        if proceed {
            self.setup_flow = SetupFlow::Credential(self.credential_dialog());
        } else {
            self.cancel_setup();
        }
    }

    pub fn cancel_credential(&mut self) {
        self.cancel_setup();
    }

    fn cancel_setup(&mut self) {
        self.setup_flow = SetupFlow::None;
        self.notifications.push(Notification::info("Cancelled", "Setup cancelled."));
    }

    /// Start the setup worker with a validated credential.
    pub fn submit_credential(&mut self, credential: Credential) -> Result<(), Rejection> {
        self.setup_flow = SetupFlow::None;
        self.ensure_idle()?;
        self.operation.try_begin(OperationKind::Setup)?;

        self.log("Starting setup...");
        self.progress_text = "setup in progress...".to_string();
        self.progress = 0.0;
        worker::spawn_setup(self.job_context(), credential, self.tx.clone());
        Ok(())
    }

    pub fn start_upload(&mut self) -> Result<(), Rejection> {
        self.ensure_idle()?;
        let folder = self.config.working_folder_path();
        if !folder.is_dir() {
            return self.reject(Rejection::MissingWorkingFolder(folder));
        }
        self.start_script(OperationKind::Upload)
    }

    /// Download has no folder precondition; the script creates it.
    pub fn start_download(&mut self) -> Result<(), Rejection> {
        self.ensure_idle()?;
        self.start_script(OperationKind::Download)
    }

    fn start_script(&mut self, kind: OperationKind) -> Result<(), Rejection> {
        self.operation.try_begin(kind)?;

        let script = match kind {
            OperationKind::Upload => self.config.upload_script_path(),
            _ => self.config.download_script_path(),
        };
        self.log(&format!("Starting {}...", kind));
        self.progress_text = format!("{} in progress...", kind);
        self.progress = 0.0;
        worker::spawn_script(kind, script, self.config.working_dir.clone(), self.tx.clone());
        Ok(())
    }

    /// Apply all pending worker messages. Returns how many were handled.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(msg) = self.rx.try_recv() {
            self.apply(msg);
            handled += 1;
        }
        handled
    }

    fn apply(&mut self, msg: WorkerMsg) {
        match msg {
            WorkerMsg::Log(line) => self.log(&line),
            WorkerMsg::Progress(value) => self.progress = value,
            WorkerMsg::ProgressText(text) => self.progress_text = text,
            WorkerMsg::Status(item, value) => self.status.set(item, value),
            WorkerMsg::RefreshStatus => self.refresh_status(),
            WorkerMsg::Finished { kind, success } => {
                tracing::info!(%kind, success, "operation finished");
                self.operation.finish(kind, success);
            }
        }
    }
}
