use crate::errors::AppError;
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tracing::error;

/// Locally persisted settings. Records themselves live only in the remote API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
}

pub async fn load_preferences(path: &Path) -> Preferences {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(preferences) => preferences,
            Err(err) => {
                error!("failed to parse preferences file: {err}");
                Preferences::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Preferences::default(),
        Err(err) => {
            error!("failed to read preferences file: {err}");
            Preferences::default()
        }
    }
}

pub async fn persist_preferences(path: &Path, preferences: &Preferences) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(preferences).map_err(AppError::internal)?;
    fs::write(path, payload).await.map_err(AppError::internal)?;
    Ok(())
}
