//! Background jobs.
//!
//! Each job runs on its own thread and reports back exclusively through a
//! [`WorkerMsg`] channel. The UI thread drains that channel; workers never
//! touch display state directly.

use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Context, Result};

use crate::config::AppConfig;
use crate::credential::Credential;
use crate::operation::OperationKind;
use crate::progress::parse_percent;
use crate::rclone::{Rclone, MANUAL_INSTALL_URL};
use crate::utils::create_dir_if_not_exists;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusItem {
    Rclone,
    Remote,
    WorkingFolder,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorkerMsg {
    Log(String),
    Progress(f32),
    ProgressText(String),
    Status(StatusItem, bool),
    /// Ask the UI to run a fresh status probe
    RefreshStatus,
    Finished { kind: OperationKind, success: bool },
}

/// Everything a job needs, cloned out of the UI state before spawning.
#[derive(Debug, Clone)]
pub struct JobContext {
    pub rclone: Rclone,
    pub working_dir: PathBuf,
    pub working_folder: String,
    pub connectivity_timeout: Duration,
}

impl JobContext {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            rclone: Rclone::from_config(config),
            working_dir: config.working_dir.clone(),
            working_folder: config.transfer.working_folder.clone(),
            connectivity_timeout: Duration::from_secs(config.rclone.connectivity_timeout_secs),
        }
    }

    pub fn working_folder_path(&self) -> PathBuf {
        self.working_dir.join(&self.working_folder)
    }
}

/// Sender wrapper; a closed receiver just means the window went away.
#[derive(Clone)]
struct Reporter {
    tx: Sender<WorkerMsg>,
}

impl Reporter {
    fn send(&self, msg: WorkerMsg) {
        let _ = self.tx.send(msg);
    }

    fn log(&self, line: impl Into<String>) {
        self.send(WorkerMsg::Log(line.into()));
    }

    fn progress(&self, value: f32) {
        self.send(WorkerMsg::Progress(value));
    }

    fn text(&self, text: impl Into<String>) {
        self.send(WorkerMsg::ProgressText(text.into()));
    }

    fn finished(&self, kind: OperationKind, success: bool) {
        self.send(WorkerMsg::Finished { kind, success });
    }
}

// ---------------------------------------------------------------- status

/// Check the three status items. Each result is sent as soon as it is known.
pub fn spawn_status_probe(ctx: JobContext, tx: Sender<WorkerMsg>) -> JoinHandle<()> {
    thread::spawn(move || probe_status(&ctx, &tx))
}

pub fn probe_status(ctx: &JobContext, tx: &Sender<WorkerMsg>) {
    let _ = tx.send(WorkerMsg::Status(StatusItem::Rclone, ctx.rclone.is_installed()));
    let _ = tx.send(WorkerMsg::Status(StatusItem::Remote, ctx.rclone.remote_configured()));
    let _ = tx.send(WorkerMsg::Status(
        StatusItem::WorkingFolder,
        ctx.working_folder_path().is_dir(),
    ));
}

// ----------------------------------------------------------------- setup

pub fn spawn_setup(ctx: JobContext, credential: Credential, tx: Sender<WorkerMsg>) -> JoinHandle<()> {
    thread::spawn(move || run_setup(&ctx, &credential, tx))
}

/// Install-if-needed, write rclone.conf, soft connectivity check, create the
/// local and remote folders. Always ends with a `Finished` message.
pub fn run_setup(ctx: &JobContext, credential: &Credential, tx: Sender<WorkerMsg>) {
    let reporter = Reporter { tx };
    reporter.progress(0.0);

    let success = match setup_steps(ctx, credential, &reporter) {
        Ok(done) => done,
        Err(e) => {
            tracing::error!(error = ?e, "setup failed");
            reporter.log(format!("setup error: {:#}", e));
            reporter.text("setup error");
            false
        }
    };

    reporter.finished(OperationKind::Setup, success);
}

/// `Ok(false)` means the run ended early on a handled failure.
fn setup_steps(ctx: &JobContext, credential: &Credential, reporter: &Reporter) -> Result<bool> {
    let rclone = &ctx.rclone;

    reporter.log("Checking rclone installation...");
    if rclone.is_installed() {
        reporter.log("✓ rclone is already installed");
    } else {
        reporter.log("❌ rclone is not installed");
        reporter.log("Installing rclone...");
        let installed = match rclone.install() {
            Ok(()) => rclone.is_installed(),
            Err(e) => {
                tracing::error!(error = %e, "rclone install failed");
                false
            }
        };
        if !installed {
            reporter.log("❌ Automatic rclone installation failed");
            reporter.log(format!("Install manually: {}", MANUAL_INSTALL_URL));
            reporter.text("install failed");
            return Ok(false);
        }
        reporter.log("✓ rclone installed");
    }

    reporter.progress(40.0);
    reporter.log(format!("✓ Service account key accepted ({})", credential.method()));

    reporter.log("Writing rclone config...");
    let config_file = rclone
        .write_config(credential.path())
        .context("writing rclone config")?;
    reporter.log(format!("✓ rclone config written to {}", config_file.display()));
    reporter.progress(70.0);

    reporter.log("Testing Google Drive connection...");
    match rclone.check_connectivity(ctx.connectivity_timeout) {
        Ok(()) => reporter.log("✓ Google Drive access confirmed"),
        Err(e) => {
            tracing::warn!(error = %e, "connectivity check failed");
            reporter.log("⚠️ Could not confirm Google Drive access");
            reporter.log(
                "Make sure the service account email is added as an editor on the Google Drive folder",
            );
        }
    }
    reporter.progress(85.0);

    let folder = ctx.working_folder_path();
    reporter.log(format!("Preparing {} folder...", ctx.working_folder));
    if folder.is_dir() {
        reporter.log(format!("✓ {} folder already exists", ctx.working_folder));
    } else {
        create_dir_if_not_exists(&folder)
            .with_context(|| format!("creating {}", folder.display()))?;
        reporter.log(format!("✓ {} folder created", ctx.working_folder));
    }

    if let Err(e) = rclone.mkdir(&ctx.working_folder) {
        tracing::debug!(error = %e, "remote mkdir failed, ignoring");
    }
    reporter.log("✓ Google Drive folder checked");

    reporter.progress(100.0);
    reporter.log("🎉 Setup complete!");
    reporter.text("setup complete");
    reporter.send(WorkerMsg::RefreshStatus);
    Ok(true)
}

// --------------------------------------------------------------- scripts

pub fn spawn_script(
    kind: OperationKind,
    script: PathBuf,
    working_dir: PathBuf,
    tx: Sender<WorkerMsg>,
) -> JoinHandle<()> {
    thread::spawn(move || run_script(kind, &script, &working_dir, tx))
}

/// Run a transfer script, relaying its output. Always ends with a
/// `Finished` message.
pub fn run_script(kind: OperationKind, script: &Path, working_dir: &Path, tx: Sender<WorkerMsg>) {
    let reporter = Reporter { tx };

    let success = match stream_script(script, working_dir, &reporter) {
        Ok(Some(0)) => {
            reporter.log(format!("{} complete", kind));
            reporter.text(format!("{} complete", kind));
            reporter.progress(100.0);
            if kind == OperationKind::Download {
                reporter.send(WorkerMsg::RefreshStatus);
            }
            true
        }
        Ok(code) => {
            tracing::warn!(%kind, ?code, "script failed");
            reporter.log(format!("{} failed (exit code {})", kind, describe_code(code)));
            reporter.text(format!("{} failed", kind));
            false
        }
        Err(e) => {
            tracing::error!(%kind, error = ?e, "script error");
            reporter.log(format!("{} error: {:#}", kind, e));
            reporter.text(format!("{} error", kind));
            false
        }
    };

    reporter.finished(kind, success);
}

fn describe_code(code: Option<i32>) -> String {
    code.map(|c| c.to_string())
        .unwrap_or_else(|| "none".to_string())
}

/// Returns the exit code, `None` if the process was killed by a signal.
fn stream_script(script: &Path, working_dir: &Path, reporter: &Reporter) -> Result<Option<i32>> {
    let mut child = script_command(script)
        .current_dir(working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("starting {}", script.display()))?;
    tracing::info!(script = %script.display(), pid = child.id(), "script started");

    let stderr_relay = child.stderr.take().map(|stderr| {
        let reporter = reporter.clone();
        thread::spawn(move || relay_lines(stderr, &reporter))
    });

    let stdout_result = match child.stdout.take() {
        Some(stdout) => relay_lines(stdout, reporter).context("reading script output"),
        None => Ok(()),
    };
    if stdout_result.is_err() {
        // Never report failure while the script is still running.
        reap(&mut child);
    }

    let stderr_result = match stderr_relay.map(JoinHandle::join) {
        Some(Ok(result)) => result.context("reading script error output"),
        Some(Err(_)) => Err(anyhow::anyhow!("stderr reader panicked")),
        None => Ok(()),
    };

    if let Err(e) = stdout_result.and(stderr_result) {
        reap(&mut child);
        return Err(e);
    }

    let status = child.wait().context("waiting for script")?;
    Ok(status.code())
}

fn reap(child: &mut Child) {
    if let Err(e) = child.kill() {
        tracing::debug!(error = %e, "script already exited");
    }
    let _ = child.wait();
}

fn relay_lines(stream: impl Read, reporter: &Reporter) -> io::Result<()> {
    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(());
        }
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        reporter.log(line);
        if let Some(percent) = parse_percent(line) {
            reporter.progress(percent);
        }
    }
}

/// Pick an interpreter from the script's extension.
pub fn script_command(script: &Path) -> Command {
    let ext = script
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("bat") | Some("cmd") => {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C").arg(script);
            cmd
        }
        Some("sh") => {
            let mut cmd = Command::new("sh");
            cmd.arg(script);
            cmd
        }
        _ => Command::new(script),
    }
}
