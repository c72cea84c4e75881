use chrono::{DateTime, Local};
use std::fs;
use std::path::Path;
use anyhow::Result;

pub const LOG_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn create_dir_if_not_exists(path: &Path) -> Result<()> {
	if !path.exists() {
		fs::create_dir_all(path)?;
	}
	Ok(())
}

/// `[2024-05-01 13:37:00] message`
pub fn timestamped(at: DateTime<Local>, message: &str) -> String {
	format!("[{}] {}", at.format(LOG_TIMESTAMP_FORMAT), message)
}

/// Status label text for a probe result; `None` means still checking.
pub fn status_glyph(value: Option<bool>, ok: &str, not_ok: &str) -> String {
	match value {
		None => "checking...".to_string(),
		Some(true) => format!("✓ {}", ok),
		Some(false) => format!("❌ {}", not_ok),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;

	#[test]
	fn timestamp_format() {
		let at = Local.with_ymd_and_hms(2024, 5, 1, 13, 37, 0).unwrap();
		assert_eq!(timestamped(at, "hello"), "[2024-05-01 13:37:00] hello");
	}

	#[test]
	fn glyphs() {
		assert_eq!(status_glyph(None, "installed", "missing"), "checking...");
		assert_eq!(status_glyph(Some(true), "installed", "missing"), "✓ installed");
		assert_eq!(status_glyph(Some(false), "installed", "missing"), "❌ missing");
	}

	#[test]
	fn create_dir_twice() {
		let dir = tempfile::tempdir().unwrap();
		let nested = dir.path().join("a").join("b");
		create_dir_if_not_exists(&nested).unwrap();
		create_dir_if_not_exists(&nested).unwrap();
		assert!(nested.is_dir());
	}
}
