//! Thin wrapper around the `rclone` executable.
//!
//! Only exit codes matter: zero is success, anything else (including a
//! missing binary) is a failure the caller maps to status text.

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::config::AppConfig;

pub const MANUAL_INSTALL_URL: &str = "https://rclone.org/downloads/";

const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, thiserror::Error)]
pub enum RcloneError {
    #[error("{} not found", .0.display())]
    NotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("`{command}` exited with {code:?}: {stderr}")]
    Failed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("`{command}` did not finish within {}s", .timeout.as_secs())]
    Timeout { command: String, timeout: Duration },
}

#[derive(Debug, Clone)]
pub struct Rclone {
    binary: PathBuf,
    config_file: PathBuf,
    remote_name: String,
    /// Program and arguments of the installer
    installer: Vec<String>,
}

impl Rclone {
    pub fn new(binary: impl Into<PathBuf>, config_file: impl Into<PathBuf>, remote_name: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            config_file: config_file.into(),
            remote_name: remote_name.into(),
            installer: default_install_command(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let rclone = Self::new(
            &config.rclone.binary,
            config.rclone_config_file(),
            &config.rclone.remote_name,
        );
        match &config.rclone.install_command {
            Some(installer) => rclone.with_installer(installer.clone()),
            None => rclone,
        }
    }

    pub fn with_installer(mut self, installer: Vec<String>) -> Self {
        self.installer = installer;
        self
    }

    pub fn remote_name(&self) -> &str {
        &self.remote_name
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    /// `<remote>:` or `<remote>:<path>`
    pub fn remote_path(&self, path: &str) -> String {
        format!("{}:{}", self.remote_name, path)
    }

    /// `rclone version` exits successfully.
    pub fn is_installed(&self) -> bool {
        match self.run(["version"]) {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(error = %e, "rclone not usable");
                false
            }
        }
    }

    pub fn list_remotes(&self) -> Result<Vec<String>, RcloneError> {
        let output = self.run_with_config(["listremotes"])?;
        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_owned)
            .collect())
    }

    /// True when `listremotes` names our remote. Any failure counts as not
    /// configured.
    pub fn remote_configured(&self) -> bool {
        let wanted = self.remote_path("");
        self.list_remotes()
            .map(|remotes| remotes.iter().any(|r| *r == wanted))
            .unwrap_or(false)
    }

    /// List the remote root, giving up after `timeout`.
    pub fn check_connectivity(&self, timeout: Duration) -> Result<(), RcloneError> {
        let mut cmd = self.command();
        cmd.arg("lsf")
            .arg(self.remote_path(""))
            .arg("--config")
            .arg(&self.config_file)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let command = self.describe(&["lsf", self.remote_path("").as_str()]);
        let mut child = cmd.spawn().map_err(|e| self.spawn_error(e))?;
        let deadline = Instant::now() + timeout;

        loop {
            if let Some(status) = child.try_wait()? {
                return if status.success() {
                    Ok(())
                } else {
                    Err(RcloneError::Failed {
                        command,
                        code: status.code(),
                        stderr: String::new(),
                    })
                };
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                return Err(RcloneError::Timeout { command, timeout });
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    pub fn mkdir(&self, folder: &str) -> Result<(), RcloneError> {
        self.run_with_config(["mkdir", self.remote_path(folder).as_str()])
            .map(|_| ())
    }

    /// Run the installer. A zero exit does not prove rclone is usable;
    /// callers re-check with [`Rclone::is_installed`].
    pub fn install(&self) -> Result<(), RcloneError> {
        let Some((program, args)) = self.installer.split_first() else {
            return Err(RcloneError::Failed {
                command: String::new(),
                code: None,
                stderr: "no install command configured".to_string(),
            });
        };
        let mut cmd = Command::new(program);
        cmd.args(args);
        tracing::info!(command = ?cmd, "installing rclone");
        let output = cmd.stdin(Stdio::null()).output()?;
        if output.status.success() {
            Ok(())
        } else {
            Err(RcloneError::Failed {
                command: format!("{:?}", cmd),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }

    /// Create the config directory and overwrite rclone.conf with a single
    /// Drive remote pointing at `credential_path`.
    pub fn write_config(&self, credential_path: &Path) -> Result<PathBuf, RcloneError> {
        if let Some(dir) = self.config_file.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&self.config_file, render_config(&self.remote_name, credential_path))?;
        tracing::info!(path = %self.config_file.display(), "wrote rclone config");
        Ok(self.config_file.clone())
    }

    fn command(&self) -> Command {
        Command::new(&self.binary)
    }

    fn run<I, S>(&self, args: I) -> Result<Output, RcloneError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<S> = args.into_iter().collect();
        let output = self
            .command()
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| self.spawn_error(e))?;

        if output.status.success() {
            Ok(output)
        } else {
            let parts: Vec<String> = args
                .iter()
                .map(|a| a.as_ref().to_string_lossy().into_owned())
                .collect();
            let parts: Vec<&str> = parts.iter().map(String::as_str).collect();
            Err(RcloneError::Failed {
                command: self.describe(&parts),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }

    fn run_with_config<'a, I>(&self, args: I) -> Result<Output, RcloneError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let config = self.config_file.to_string_lossy().into_owned();
        let mut full: Vec<String> = args.into_iter().map(str::to_owned).collect();
        full.push("--config".to_string());
        full.push(config);
        self.run(full)
    }

    fn describe(&self, args: &[&str]) -> String {
        let mut s = self.binary.display().to_string();
        for a in args {
            s.push(' ');
            s.push_str(a);
        }
        s
    }

    fn spawn_error(&self, e: io::Error) -> RcloneError {
        if e.kind() == io::ErrorKind::NotFound {
            RcloneError::NotFound(self.binary.clone())
        } else {
            RcloneError::Io(e)
        }
    }
}

pub fn render_config(remote_name: &str, credential_path: &Path) -> String {
    format!(
        "[{}]\ntype = drive\nservice_account_file = {}\n",
        remote_name,
        credential_path.display()
    )
}

#[cfg(target_os = "windows")]
pub fn default_install_command() -> Vec<String> {
    vec![
        "powershell".to_string(),
        "-Command".to_string(),
        "iwr https://rclone.org/install.ps1 -useb | iex".to_string(),
    ]
}

/// The script is downloaded first so a failed download fails the command
/// instead of feeding `bash` an empty script.
#[cfg(not(target_os = "windows"))]
pub fn default_install_command() -> Vec<String> {
    vec![
        "sh".to_string(),
        "-c".to_string(),
        concat!(
            "t=$(mktemp) && curl -fsSL -o \"$t\" https://rclone.org/install.sh && sudo bash \"$t\"; ",
            "s=$?; rm -f \"$t\"; exit $s"
        )
        .to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn config_format() {
        let text = render_config("googledrive", Path::new("/keys/sa.json"));
        assert_eq!(
            text,
            "[googledrive]\ntype = drive\nservice_account_file = /keys/sa.json\n"
        );
    }

    #[test]
    fn write_config_creates_dir_and_overwrites() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("nested").join("rclone.conf");
        let rclone = Rclone::new("rclone", &file, "googledrive");

        rclone.write_config(Path::new("/first.json")).unwrap();
        rclone.write_config(Path::new("/second.json")).unwrap();

        let content = fs::read_to_string(&file).unwrap();
        assert!(content.contains("service_account_file = /second.json"));
        assert!(!content.contains("first"));
    }

    #[test]
    fn missing_binary_is_not_installed() {
        let rclone = Rclone::new("/definitely/not/rclone", "/tmp/none.conf", "googledrive");
        assert!(!rclone.is_installed());
        assert!(!rclone.remote_configured());
        assert!(matches!(rclone.mkdir("x"), Err(RcloneError::NotFound(_))));
        assert!(matches!(
            rclone.check_connectivity(Duration::from_secs(1)),
            Err(RcloneError::NotFound(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn install_reports_installer_exit_code() {
        let rclone = Rclone::new("rclone", "/tmp/none.conf", "googledrive")
            .with_installer(vec!["sh".to_string(), "-c".to_string(), "exit 7".to_string()]);
        assert!(matches!(rclone.install(), Err(RcloneError::Failed { code: Some(7), .. })));

        let rclone = rclone.with_installer(Vec::new());
        assert!(rclone.install().is_err());
    }

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn default_installer_does_not_pipe_into_bash() {
        let installer = default_install_command();
        assert_eq!(installer[0], "sh");
        assert!(!installer[2].contains("| sudo bash"));
        assert!(installer[2].contains("curl -fsSL -o"));
    }

    #[test]
    fn remote_path_format() {
        let rclone = Rclone::new("rclone", "/tmp/rclone.conf", "googledrive");
        assert_eq!(rclone.remote_path(""), "googledrive:");
        assert_eq!(rclone.remote_path("yuniserver"), "googledrive:yuniserver");
    }
}
