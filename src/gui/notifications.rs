use chrono::{DateTime, Local};
use std::collections::VecDeque;

use crate::utils::LOG_TIMESTAMP_FORMAT;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

impl NotificationLevel {
    pub fn color(&self) -> egui::Color32 {
        match self {
            Self::Info => egui::Color32::from_rgb(54, 162, 235),    // Blue
            Self::Warning => egui::Color32::from_rgb(255, 193, 7),  // Amber
            Self::Error => egui::Color32::from_rgb(220, 53, 69),    // Red
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Info => "ℹ",
            Self::Warning => "⚠",
            Self::Error => "✗",
        }
    }
}

/// A message that blocks the main window until acknowledged.
#[derive(Debug, Clone)]
pub struct Notification {
    pub id: String,
    pub level: NotificationLevel,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Local>,
}

impl Notification {
    pub fn new(level: NotificationLevel, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            level,
            title: title.into(),
            message: message.into(),
            timestamp: Local::now(),
        }
    }

    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Info, title, message)
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Warning, title, message)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, title, message)
    }
}

/// FIFO of pending notices; only the front one is shown.
#[derive(Debug)]
pub struct NotificationManager {
    pending: VecDeque<Notification>,
    max_pending: usize,
}

impl Default for NotificationManager {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationManager {
    pub fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            max_pending: 20,
        }
    }

    pub fn push(&mut self, notification: Notification) {
        if self.pending.len() >= self.max_pending {
            self.pending.pop_front();
        }
        self.pending.push_back(notification);
    }

    pub fn current(&self) -> Option<&Notification> {
        self.pending.front()
    }

    pub fn dismiss(&mut self, id: &str) {
        self.pending.retain(|n| n.id != id);
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Modal window for the front notice, centred over the main window.
    pub fn show(&mut self, ctx: &egui::Context) {
        let Some(current) = self.current().cloned() else {
            return;
        };

        let mut dismissed = false;
        egui::Window::new(format!("{} {}", current.level.icon(), current.title))
            .id(egui::Id::new(("notification", &current.id)))
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.colored_label(current.level.color(), &current.message);
                ui.small(current.timestamp.format(LOG_TIMESTAMP_FORMAT).to_string());
                ui.add_space(8.0);
                ui.vertical_centered(|ui| {
                    if ui.button("OK").clicked() {
                        dismissed = true;
                    }
                });
            });

        if dismissed {
            self.dismiss(&current.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_and_dismiss() {
        let mut manager = NotificationManager::new();
        manager.push(Notification::warning("Busy", "one"));
        manager.push(Notification::info("Cancelled", "two"));

        let first = manager.current().unwrap().clone();
        assert_eq!(first.message, "one");
        manager.dismiss(&first.id);
        assert_eq!(manager.current().unwrap().message, "two");
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn bounded_queue() {
        let mut manager = NotificationManager::new();
        for i in 0..25 {
            manager.push(Notification::error("E", i.to_string()));
        }
        assert_eq!(manager.len(), 20);
        assert_eq!(manager.current().unwrap().message, "5");
    }

    #[test]
    fn timestamp_is_taken_at_creation() {
        let before = Local::now();
        let notice = Notification::info("Done", "ok");
        assert!(notice.timestamp >= before && notice.timestamp <= Local::now());
        assert_eq!(notice.timestamp.format(LOG_TIMESTAMP_FORMAT).to_string().len(), 19);
    }
}
