//! # yuniserver - Google Drive sync panel
//!
//! A small desktop front-end around the `rclone` command-line tool. It
//! configures a Google Drive remote from a service-account key, then hands
//! the actual transfers of the local `yuniserver` folder to the
//! `upload`/`download` scripts that ship next to it, relaying their output.
//!
//! ## Architecture
//!
//! - [`credential`] - service-account key validation
//! - [`rclone`] - invocations of the external tool and `rclone.conf`
//! - [`worker`] - background jobs talking to the UI over a channel
//! - [`panel`] - toolkit-independent control panel state
//! - [`operation`] - the single running-operation state machine
//! - [`progress`] - percentage scraping from transfer output
//! - [`gui`] - egui front-end
//! - [`config`] / [`logging`] - settings file and tracing setup

pub mod config;
pub mod credential;
pub mod gui;
pub mod logging;
pub mod operation;
pub mod panel;
pub mod progress;
pub mod rclone;
pub mod utils;
pub mod worker;

pub use config::AppConfig;
pub use credential::{validate_service_account, Credential, CredentialError};
pub use operation::{OperationKind, OperationState, Rejection};
pub use panel::{ControlPanel, SetupFlow, ToolStatus};
pub use progress::parse_percent;
pub use rclone::{Rclone, RcloneError};
pub use worker::{StatusItem, WorkerMsg};
