pub mod credential_dialog;
pub mod notifications;
pub mod state;

pub use credential_dialog::{CredentialDialog, DialogOutcome, InputMode};
pub use notifications::{Notification, NotificationLevel, NotificationManager};
pub use state::AppState;

use eframe::egui;

use crate::config::AppConfig;

pub fn run_app(config: AppConfig) -> Result<(), eframe::Error> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([600.0, 500.0])
            .with_min_inner_size([480.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "YuniServer",
        options,
        Box::new(|_cc| {
            Box::new(AppState::new(config))
        }),
    )
}
