//! Google service-account credentials.
//!
//! A credential is accepted only if it parses as a JSON object whose `type`
//! field is `"service_account"`. Pasted credentials are written to a fixed
//! file so that rclone can reference them by path.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;

pub const SERVICE_ACCOUNT_TYPE: &str = "service_account";

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("Please select a valid credential file")]
    FileNotFound(PathBuf),

    #[error("Please paste the JSON key")]
    Empty,

    #[error("Not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Not a Google service account key (expected \"type\": \"service_account\")")]
    NotServiceAccount,

    #[error("Cannot access credential file: {0}")]
    Io(#[from] io::Error),
}

/// Where a validated credential came from, and the file rclone should read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    File(PathBuf),
    Text(PathBuf),
}

impl Credential {
    /// Validate an existing key file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CredentialError> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() || !path.is_file() {
            return Err(CredentialError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        validate_service_account(&content)?;

        Ok(Credential::File(std::path::absolute(path)?))
    }

    /// Validate pasted JSON and persist it to `temp_path`, overwriting any
    /// previous content.
    pub fn from_text(text: &str, temp_path: impl AsRef<Path>) -> Result<Self, CredentialError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(CredentialError::Empty);
        }

        validate_service_account(text)?;

        let temp_path = temp_path.as_ref();
        if let Some(parent) = temp_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(temp_path, text)?;
        tracing::debug!(path = %temp_path.display(), "wrote pasted credential");

        Ok(Credential::Text(std::path::absolute(temp_path)?))
    }

    pub fn path(&self) -> &Path {
        match self {
            Credential::File(p) | Credential::Text(p) => p,
        }
    }

    pub fn method(&self) -> &'static str {
        match self {
            Credential::File(_) => "file",
            Credential::Text(_) => "text",
        }
    }
}

/// Parse `json` and check that it describes a service account.
pub fn validate_service_account(json: &str) -> Result<Value, CredentialError> {
    let value: Value = serde_json::from_str(json)?;

    match value.get("type").and_then(Value::as_str) {
        Some(SERVICE_ACCOUNT_TYPE) if value.is_object() => Ok(value),
        _ => Err(CredentialError::NotServiceAccount),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_minimal_service_account() {
        let value = validate_service_account(r#"{"type":"service_account"}"#).unwrap();
        assert_eq!(value["type"], "service_account");
    }

    #[test]
    fn rejects_arrays_and_scalars() {
        for input in [r#"["service_account"]"#, "42", r#""service_account""#, "null"] {
            assert!(matches!(
                validate_service_account(input),
                Err(CredentialError::NotServiceAccount)
            ));
        }
    }

    #[test]
    fn rejects_non_string_type() {
        let err = validate_service_account(r#"{"type": 1}"#).unwrap_err();
        assert!(matches!(err, CredentialError::NotServiceAccount));
    }

    #[test]
    fn method_labels() {
        assert_eq!(Credential::File(PathBuf::from("/a")).method(), "file");
        assert_eq!(Credential::Text(PathBuf::from("/b")).method(), "text");
    }
}
