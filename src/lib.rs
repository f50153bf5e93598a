pub mod api;
pub mod app;
pub mod chart;
pub mod clock;
pub mod config;
pub mod errors;
pub mod gate;
pub mod handlers;
pub mod history;
pub mod manifest;
pub mod models;
pub mod record;
pub mod state;
pub mod storage;
pub mod submission;
pub mod theme;
pub mod ui;

#[cfg(test)]
mod testing;

pub use api::{HealthApi, HttpHealthApi};
pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use storage::load_preferences;
