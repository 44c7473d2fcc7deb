//! Prefix-command self-bot: routing, handlers and persistent settings.

pub mod commands;
pub mod config;
pub mod error;
pub mod health;
pub mod router;
pub mod state;
pub mod tasks;

pub use error::{AppError, AppResult};
pub use router::{CommandRegistry, Router};
pub use state::{AppState, Timings};
