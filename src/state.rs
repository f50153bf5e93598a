use crate::api::HealthApi;
use crate::history::{HistoryAggregator, RecordFeed, SortOrder};
use crate::storage::Preferences;
use crate::submission::{GlucoseSubmission, VitalsSubmission};
use crate::theme::ThemeState;
use std::{path::PathBuf, sync::Arc};

/// One instance of every view, shared by all requests.
#[derive(Clone)]
pub struct AppState {
    pub vitals: Arc<VitalsSubmission>,
    pub glucose: Arc<GlucoseSubmission>,
    /// Most recent first; refreshed after each recorded glucose.
    pub glucose_history: Arc<HistoryAggregator>,
    /// Oldest first, filtered by date range.
    pub history: Arc<HistoryAggregator>,
    pub theme: Arc<ThemeState>,
}

impl AppState {
    /// Spawns the glucose time ticker, so this must run inside a tokio runtime.
    pub fn new(api: Arc<dyn HealthApi>, data_path: PathBuf, preferences: Preferences) -> Self {
        let glucose_history = Arc::new(HistoryAggregator::new(
            Arc::clone(&api),
            RecordFeed::Glucose,
            SortOrder::Descending,
        ));
        let history = Arc::new(HistoryAggregator::new(
            Arc::clone(&api),
            RecordFeed::Vitals,
            SortOrder::Ascending,
        ));

        Self {
            vitals: Arc::new(VitalsSubmission::new(Arc::clone(&api))),
            glucose: Arc::new(GlucoseSubmission::new(api, Some(Arc::clone(&glucose_history)))),
            glucose_history,
            history,
            theme: Arc::new(ThemeState::new(data_path, preferences.theme)),
        }
    }
}
