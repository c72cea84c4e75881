use serde::{Serialize, Deserialize};
use std::path::{Path, PathBuf};
use anyhow::Result;

/// File name of the optional settings file in the working directory
pub const CONFIG_FILE_NAME: &str = "yuniserver.json";

/// Main application configuration
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct AppConfig {
    /// Directory the scripts run in and the working folder lives in
    pub working_dir: PathBuf,
    pub rclone: RcloneConfig,
    pub transfer: TransferConfig,
    pub logging: LoggingConfig,
}

/// rclone invocation settings
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct RcloneConfig {
    /// Executable name or path
    pub binary: PathBuf,
    /// Name of the Google Drive remote
    pub remote_name: String,
    /// Directory holding rclone.conf (defaults to ~/.config/rclone)
    pub config_dir: Option<PathBuf>,
    /// Upper bound for the connectivity check
    pub connectivity_timeout_secs: u64,
    /// Installer program and arguments (defaults to the upstream script)
    pub install_command: Option<Vec<String>>,
}

/// Local folder and delegated transfer scripts
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct TransferConfig {
    pub working_folder: String,
    pub upload_script: PathBuf,
    pub download_script: PathBuf,
    /// Where pasted service-account keys are written
    pub temp_credential_file: PathBuf,
}

/// Logging configuration
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log file path (optional, logs to console if None)
    pub file_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            working_dir: PathBuf::from("."),
            rclone: RcloneConfig::default(),
            transfer: TransferConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for RcloneConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("rclone"),
            remote_name: "googledrive".to_string(),
            config_dir: None,
            connectivity_timeout_secs: 30,
            install_command: None,
        }
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        let (upload, download) = if cfg!(windows) {
            ("upload.bat", "download.bat")
        } else {
            ("upload.sh", "download.sh")
        };
        Self {
            working_folder: "yuniserver".to_string(),
            upload_script: PathBuf::from(upload),
            download_script: PathBuf::from(download),
            temp_credential_file: PathBuf::from("temp-service-account.json"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_path: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load `yuniserver.json` from `base_dir` if present, apply environment
    /// overrides and validate. `working_dir` always ends up as `base_dir`
    /// unless the file sets an absolute path.
    pub fn load(base_dir: &Path) -> Result<Self> {
        let path = base_dir.join(CONFIG_FILE_NAME);
        let mut config = if path.exists() {
            Self::load_from_file(&path)?
        } else {
            Self::default()
        };
        if config.working_dir.is_relative() {
            config.working_dir = base_dir.join(&config.working_dir);
        }

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(std::env::vars());
    }

    pub fn apply_overrides<I, K, V>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (key, value) in vars {
            let value: String = value.into();
            match key.as_ref() {
                "YUNI_RCLONE" => self.rclone.binary = PathBuf::from(value),
                "YUNI_REMOTE" => self.rclone.remote_name = value,
                "YUNI_RCLONE_CONFIG_DIR" => self.rclone.config_dir = Some(PathBuf::from(value)),
                "YUNI_LOG_LEVEL" => self.logging.level = value,
                "YUNI_LOG_FILE" => self.logging.file_path = Some(PathBuf::from(value)),
                _ => {}
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let remote = &self.rclone.remote_name;
        if remote.is_empty() || remote.contains(':') || remote.chars().any(char::is_whitespace) {
            return Err(anyhow::anyhow!("Invalid remote name: {:?}", remote));
        }

        if self.transfer.working_folder.trim().is_empty() {
            return Err(anyhow::anyhow!("Working folder name must not be empty"));
        }

        if self.rclone.connectivity_timeout_secs == 0 {
            return Err(anyhow::anyhow!("Connectivity timeout must be at least one second"));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(anyhow::anyhow!("Invalid log level: {}", self.logging.level));
        }

        Ok(())
    }

    pub fn working_folder_path(&self) -> PathBuf {
        self.working_dir.join(&self.transfer.working_folder)
    }

    pub fn upload_script_path(&self) -> PathBuf {
        self.working_dir.join(&self.transfer.upload_script)
    }

    pub fn download_script_path(&self) -> PathBuf {
        self.working_dir.join(&self.transfer.download_script)
    }

    pub fn temp_credential_path(&self) -> PathBuf {
        self.working_dir.join(&self.transfer.temp_credential_file)
    }

    /// Directory holding rclone.conf
    pub fn rclone_config_dir(&self) -> PathBuf {
        match &self.rclone.config_dir {
            Some(dir) => dir.clone(),
            None => dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config")
                .join("rclone"),
        }
    }

    pub fn rclone_config_file(&self) -> PathBuf {
        self.rclone_config_dir().join("rclone.conf")
    }
}

/// The launcher scripts live one level above the `windows` folder this tool
/// ships in, so starting from there moves up to the parent.
pub fn resolve_base_dir(cwd: &Path) -> PathBuf {
    match (cwd.file_name(), cwd.parent()) {
        (Some(name), Some(parent)) if name == "windows" => parent.to_path_buf(),
        _ => cwd.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.rclone.remote_name, "googledrive");
        assert_eq!(config.transfer.working_folder, "yuniserver");
        assert_eq!(config.rclone.connectivity_timeout_secs, 30);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_file_operations() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);

        let mut config = AppConfig::default();
        config.rclone.remote_name = "backup".to_string();
        config.save_to_file(&config_path).unwrap();

        let loaded = AppConfig::load(dir.path()).unwrap();
        assert_eq!(loaded.rclone.remote_name, "backup");
        assert_eq!(loaded.working_folder_path(), dir.path().join(".").join("yuniserver"));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), r#"{"rclone": {"remote_name": "gd"}}"#).unwrap();

        let loaded = AppConfig::load(dir.path()).unwrap();
        assert_eq!(loaded.rclone.remote_name, "gd");
        assert_eq!(loaded.rclone.binary, PathBuf::from("rclone"));
        assert_eq!(loaded.transfer.working_folder, "yuniserver");
    }

    #[test]
    fn test_overrides() {
        let mut config = AppConfig::default();
        config.apply_overrides([
            ("YUNI_REMOTE", "drive2"),
            ("YUNI_LOG_LEVEL", "debug"),
            ("YUNI_RCLONE_CONFIG_DIR", "/tmp/rc"),
            ("UNRELATED", "x"),
        ]);

        assert_eq!(config.rclone.remote_name, "drive2");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.rclone_config_file(), PathBuf::from("/tmp/rc/rclone.conf"));
    }

    #[test]
    fn test_validation_errors() {
        let mut config = AppConfig::default();
        config.rclone.remote_name = "google drive:".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.rclone.connectivity_timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_resolve_base_dir() {
        assert_eq!(resolve_base_dir(Path::new("/opt/yuni/windows")), PathBuf::from("/opt/yuni"));
        assert_eq!(resolve_base_dir(Path::new("/opt/yuni")), PathBuf::from("/opt/yuni"));
    }
}
