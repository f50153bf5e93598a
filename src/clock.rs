//! Time-of-day field that follows the clock until the user takes it over.

use chrono::{Local, NaiveDateTime, NaiveTime};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub const TICK_PERIOD: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeMode {
    /// Value tracks the current local time.
    Auto,
    /// Value was focused or edited by the user and stays put.
    Manual,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeField {
    value: String,
    mode: TimeMode,
}

impl TimeField {
    pub fn new(now: NaiveTime) -> Self {
        Self {
            value: format_clock(now),
            mode: TimeMode::Auto,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn mode(&self) -> TimeMode {
        self.mode
    }

    pub fn is_manual(&self) -> bool {
        self.mode == TimeMode::Manual
    }

    /// Returns whether the value changed.
    pub fn tick(&mut self, now: NaiveTime) -> bool {
        if self.mode == TimeMode::Manual {
            return false;
        }
        let next = format_clock(now);
        if next == self.value {
            return false;
        }
        self.value = next;
        true
    }

    pub fn focus(&mut self) {
        self.mode = TimeMode::Manual;
    }

    pub fn edit(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.mode = TimeMode::Manual;
    }

    pub fn reset(&mut self, now: NaiveTime) {
        self.value = format_clock(now);
        self.mode = TimeMode::Auto;
    }
}

pub fn format_clock(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

pub fn local_now() -> NaiveTime {
    Local::now().time()
}

/// Source of the current local date and time, swappable in tests.
pub type Now = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

pub fn system_now() -> Now {
    Arc::new(|| Local::now().naive_local())
}

/// Refreshes a shared [`TimeField`] once per [`TICK_PERIOD`]. The task is
/// aborted when the ticker drops.
#[derive(Debug)]
pub struct Ticker {
    handle: JoinHandle<()>,
}

impl Ticker {
    /// Must be called from within a tokio runtime.
    pub fn spawn(field: Arc<Mutex<TimeField>>) -> Self {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK_PERIOD);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                field.lock().await.tick(local_now());
            }
        });
        Self { handle }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
