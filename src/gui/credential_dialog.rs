//! Modal form for the Google service-account key.

use std::path::PathBuf;

use eframe::egui;

use crate::credential::{Credential, CredentialError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    File,
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogOutcome {
    Pending,
    Confirmed(Credential),
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct CredentialDialog {
    pub mode: InputMode,
    pub file_path: String,
    pub json_text: String,
    error: Option<String>,
    temp_path: PathBuf,
}

impl CredentialDialog {
    /// `temp_path` receives pasted keys.
    pub fn new(temp_path: impl Into<PathBuf>) -> Self {
        Self {
            mode: InputMode::File,
            file_path: String::new(),
            json_text: String::new(),
            error: None,
            temp_path: temp_path.into(),
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Validate the active input. On failure the message stays on the form
    /// and the dialog remains open.
    pub fn confirm(&mut self) -> Result<Credential, CredentialError> {
        let result = match self.mode {
            InputMode::File => Credential::from_file(self.file_path.trim()),
            InputMode::Text => Credential::from_text(&self.json_text, &self.temp_path),
        };

        match &result {
            Ok(_) => self.error = None,
            Err(e) => {
                tracing::warn!(mode = ?self.mode, error = %e, "credential rejected");
                self.error = Some(e.to_string());
            }
        }
        result
    }

    pub fn show(&mut self, ctx: &egui::Context) -> DialogOutcome {
        let mut outcome = DialogOutcome::Pending;

        egui::Window::new("Google Service Account")
            .collapsible(false)
            .resizable(false)
            .default_width(480.0)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.heading("Service account JSON key");
                ui.label("A service account key created in the Google Cloud Console is required.");
                ui.add_space(8.0);

                ui.horizontal(|ui| {
                    ui.radio_value(&mut self.mode, InputMode::File, "Choose file");
                    ui.radio_value(&mut self.mode, InputMode::Text, "Paste JSON");
                });

                ui.add_space(4.0);
                match self.mode {
                    InputMode::File => {
                        ui.horizontal(|ui| {
                            ui.add(egui::TextEdit::singleline(&mut self.file_path).desired_width(340.0));
                            if ui.button("Browse...").clicked() {
                                if let Some(path) = rfd::FileDialog::new()
                                    .set_title("Select service account JSON")
                                    .add_filter("JSON", &["json"])
                                    .add_filter("All files", &["*"])
                                    .pick_file()
                                {
                                    self.file_path = path.display().to_string();
                                }
                            }
                        });
                    }
                    InputMode::Text => {
                        egui::ScrollArea::vertical().max_height(200.0).show(ui, |ui| {
                            ui.add(
                                egui::TextEdit::multiline(&mut self.json_text)
                                    .code_editor()
                                    .desired_rows(10)
                                    .desired_width(f32::INFINITY),
                            );
                        });
                    }
                }

                if let Some(error) = &self.error {
                    ui.add_space(4.0);
                    ui.colored_label(egui::Color32::from_rgb(220, 53, 69), error);
                }

                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("OK").clicked() {
                        if let Ok(credential) = self.confirm() {
                            outcome = DialogOutcome::Confirmed(credential);
                        }
                    }
                    if ui.button("Cancel").clicked() {
                        outcome = DialogOutcome::Cancelled;
                    }
                });
            });

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn error_is_kept_until_fixed() {
        let dir = tempdir().unwrap();
        let mut dialog = CredentialDialog::new(dir.path().join("temp.json"));
        dialog.mode = InputMode::Text;
        dialog.json_text = "{not json".to_string();

        assert!(matches!(dialog.confirm(), Err(CredentialError::InvalidJson(_))));
        assert!(dialog.error().unwrap().starts_with("Not valid JSON"));

        dialog.json_text = r#"{"type": "service_account"}"#.to_string();
        assert!(dialog.confirm().is_ok());
        assert!(dialog.error().is_none());
    }

    #[test]
    fn empty_file_path_rejected() {
        let dir = tempdir().unwrap();
        let mut dialog = CredentialDialog::new(dir.path().join("temp.json"));
        assert!(matches!(dialog.confirm(), Err(CredentialError::FileNotFound(_))));
    }
}
