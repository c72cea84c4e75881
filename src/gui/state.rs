use std::time::Duration;

use eframe::egui;

use crate::config::AppConfig;
use crate::gui::credential_dialog::DialogOutcome;
use crate::panel::{ControlPanel, SetupFlow};
use crate::utils::status_glyph;

const REPAINT_INTERVAL: Duration = Duration::from_millis(100);

pub struct AppState {
    pub panel: ControlPanel,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let mut panel = ControlPanel::new(config);
        panel.refresh_status();
        Self { panel }
    }
}

impl eframe::App for AppState {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.panel.pump();

        let modal_open = !matches!(self.panel.setup_flow(), SetupFlow::None)
            || !self.panel.notifications.is_empty();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_enabled_ui(!modal_open, |ui| {
                ui.vertical_centered(|ui| ui.heading("YuniServer"));
                ui.add_space(10.0);

                self.render_status(ui);
                ui.add_space(6.0);
                self.render_actions(ui);
                ui.add_space(6.0);
                self.render_progress(ui);
                ui.add_space(6.0);
                self.render_log(ui);
            });
        });

        self.render_setup_flow(ctx);
        self.panel.notifications.show(ctx);

        if self.panel.is_busy() || self.panel.status().is_pending() {
            ctx.request_repaint_after(REPAINT_INTERVAL);
        }
    }
}

impl AppState {
    fn render_status(&self, ui: &mut egui::Ui) {
        let status = self.panel.status();
        let folder = &self.panel.config().transfer.working_folder;
        ui.group(|ui| {
            ui.label(egui::RichText::new("Status").strong());
            egui::Grid::new("status_grid").num_columns(2).spacing([10.0, 4.0]).show(ui, |ui| {
                ui.label("rclone:");
                ui.label(status_glyph(status.rclone, "installed", "not installed"));
                ui.end_row();

                ui.label("Google Drive:");
                ui.label(status_glyph(status.remote, "connected", "not connected"));
                ui.end_row();

                ui.label(format!("{} folder:", folder));
                ui.label(status_glyph(status.working_folder, "present", "missing"));
                ui.end_row();
            });
        });
    }

    fn render_actions(&mut self, ui: &mut egui::Ui) {
        let busy = self.panel.is_busy();
        ui.horizontal(|ui| {
            // Rejections surface as notices; the result needs no handling here.
            if ui.add_enabled(!busy, egui::Button::new("Setup")).clicked() {
                let _ = self.panel.request_setup();
            }
            if ui.add_enabled(!busy, egui::Button::new("Upload")).clicked() {
                let _ = self.panel.start_upload();
            }
            if ui.add_enabled(!busy, egui::Button::new("Download")).clicked() {
                let _ = self.panel.start_download();
            }
            if ui.button("Refresh status").clicked() {
                self.panel.refresh_status();
            }
        });
    }

    fn render_progress(&self, ui: &mut egui::Ui) {
        ui.group(|ui| {
            ui.label(egui::RichText::new("Progress").strong());
            let fraction = (self.panel.progress() / 100.0).clamp(0.0, 1.0);
            ui.add(egui::ProgressBar::new(fraction).show_percentage());
            ui.label(self.panel.progress_text());
        });
    }

    fn render_log(&self, ui: &mut egui::Ui) {
        ui.group(|ui| {
            ui.label(egui::RichText::new("Log").strong());
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    for line in self.panel.log_lines() {
                        ui.monospace(line);
                    }
                });
        });
    }

    fn render_setup_flow(&mut self, ctx: &egui::Context) {
        match self.panel.setup_flow_mut() {
            SetupFlow::None => {}
            SetupFlow::ConfirmReconfigure => {
                let mut answer = None;
                egui::Window::new("Confirm")
                    .collapsible(false)
                    .resizable(false)
                    .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
                    .show(ctx, |ui| {
                        ui.label("Google Drive is already configured. Configure it again?");
                        ui.horizontal(|ui| {
                            if ui.button("Yes").clicked() {
                                answer = Some(true);
                            }
                            if ui.button("No").clicked() {
                                answer = Some(false);
                            }
                        });
                    });
                if let Some(proceed) = answer {
                    self.panel.confirm_reconfigure(proceed);
                }
            }
            SetupFlow::Credential(dialog) => match dialog.show(ctx) {
                DialogOutcome::Pending => {}
                DialogOutcome::Cancelled => self.panel.cancel_credential(),
                DialogOutcome::Confirmed(credential) => {
                    let _ = self.panel.submit_credential(credential);
                }
            },
        }
    }
}
