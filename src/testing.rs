//! In-memory [`HealthApi`] for unit tests.

use crate::api::HealthApi;
use crate::errors::ApiError;
use crate::models::{DateRange, GlucosePayload, Record, VitalsPayload};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Notify;

#[derive(Debug, Default)]
pub struct FakeApi {
    submit_calls: AtomicUsize,
    list_calls: AtomicUsize,
    glucose: Mutex<Vec<GlucosePayload>>,
    vitals: Mutex<Vec<VitalsPayload>>,
    ranges: Mutex<Vec<DateRange>>,
    submit_results: Mutex<VecDeque<Result<(), ApiError>>>,
    list_results: Mutex<VecDeque<Result<Vec<Record>, ApiError>>>,
    hold: AtomicBool,
    /// Notified when a held call has reached the fake.
    pub entered: Notify,
    /// Notify once to let a held call finish.
    pub release: Notify,
}

impl FakeApi {
    /// Every call waits on [`FakeApi::release`] before answering.
    pub fn holding() -> Self {
        let api = Self::default();
        api.hold.store(true, Ordering::SeqCst);
        api
    }

    pub fn push_submit(&self, result: Result<(), ApiError>) {
        self.submit_results.lock().unwrap().push_back(result);
    }

    pub fn push_list(&self, result: Result<Vec<Record>, ApiError>) {
        self.list_results.lock().unwrap().push_back(result);
    }

    pub fn submit_calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn glucose_payloads(&self) -> Vec<GlucosePayload> {
        self.glucose.lock().unwrap().clone()
    }

    pub fn vitals_payloads(&self) -> Vec<VitalsPayload> {
        self.vitals.lock().unwrap().clone()
    }

    pub fn ranges(&self) -> Vec<DateRange> {
        self.ranges.lock().unwrap().clone()
    }

    async fn wait_if_held(&self) {
        if self.hold.load(Ordering::SeqCst) {
            self.entered.notify_one();
            self.release.notified().await;
        }
    }

    fn next_submit(&self) -> Result<(), ApiError> {
        self.submit_results.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }

    fn next_list(&self) -> Result<Vec<Record>, ApiError> {
        self.list_results.lock().unwrap().pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }
}

#[async_trait]
impl HealthApi for FakeApi {
    async fn submit_vitals(&self, payload: &VitalsPayload) -> Result<(), ApiError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        self.vitals.lock().unwrap().push(payload.clone());
        self.wait_if_held().await;
        self.next_submit()
    }

    async fn submit_glucose(&self, payload: &GlucosePayload) -> Result<(), ApiError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        self.glucose.lock().unwrap().push(payload.clone());
        self.wait_if_held().await;
        self.next_submit()
    }

    async fn list_glucose(&self) -> Result<Vec<Record>, ApiError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.wait_if_held().await;
        self.next_list()
    }

    async fn list_vitals(&self, range: &DateRange) -> Result<Vec<Record>, ApiError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.ranges.lock().unwrap().push(*range);
        self.wait_if_held().await;
        self.next_list()
    }
}

pub fn record(date: &str, time: &str, glucose: f64) -> Record {
    Record {
        glucose: Some(glucose),
        date: Some(date.to_string()).filter(|d| !d.is_empty()),
        time: Some(time.to_string()).filter(|t| !t.is_empty()),
        ..Record::default()
    }
}

pub fn rejected(status: u16, body: &str) -> ApiError {
    ApiError::Rejected {
        status,
        body: body.to_string(),
    }
}
