//! Form submission for the glucose and vitals views.
//!
//! Each flow validates locally, sends exactly one request per accepted
//! submit, and keeps the typed fields on any failure. A submit that arrives
//! while the previous one is in flight is dropped.

use crate::api::HealthApi;
use crate::clock::{Now, Ticker, TimeField, format_clock, local_now, system_now};
use crate::errors::{ApiError, SubmitError};
use crate::gate::OperationGate;
use crate::history::HistoryAggregator;
use crate::models::{
    GlucoseFormView, GlucoseInput, GlucosePayload, StatusMessage, VitalsInput, VitalsPayload,
    VitalsView,
};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub const GLUCOSE_REQUIRED: &str = "⚠️ Informe a glicemia e o horário.";
pub const GLUCOSE_NOT_NUMBER: &str = "⚠️ Glicemia deve ser um número.";
pub const GLUCOSE_SAVED: &str = "✅ Glicemia registrada com sucesso!";
pub const GLUCOSE_FAILED: &str = "❌ Erro ao enviar os dados.";

pub const VITALS_NOT_NUMBER: &str = "⚠️ Valores devem ser numéricos.";
pub const VITALS_SAVED: &str = "✅ Dados enviados com sucesso!";
pub const VITALS_REJECTED: &str = "⚠️ Erro ao enviar os dados.";
pub const VITALS_UNREACHABLE: &str = "❌ Erro de conexão com o servidor.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmitOutcome {
    Accepted,
    /// Another submit of the same form was still in flight.
    Ignored,
}

pub struct GlucoseSubmission {
    api: Arc<dyn HealthApi>,
    gate: OperationGate,
    glucose: Mutex<String>,
    time: Arc<Mutex<TimeField>>,
    status: Mutex<Option<StatusMessage>>,
    refresh: Option<Arc<HistoryAggregator>>,
    _ticker: Ticker,
}

impl GlucoseSubmission {
    /// Starts the per-minute time ticker, so this needs a tokio runtime.
    /// `refresh` is re-fetched after every successful submit.
    pub fn new(api: Arc<dyn HealthApi>, refresh: Option<Arc<HistoryAggregator>>) -> Self {
        let time = Arc::new(Mutex::new(TimeField::new(local_now())));
        Self {
            api,
            gate: OperationGate::new(),
            glucose: Mutex::new(String::new()),
            _ticker: Ticker::spawn(Arc::clone(&time)),
            time,
            status: Mutex::new(None),
            refresh,
        }
    }

    pub async fn focus_time(&self) {
        self.time.lock().await.focus();
    }

    pub async fn edit_time(&self, value: impl Into<String>) {
        self.time.lock().await.edit(value);
    }

    pub async fn view(&self) -> GlucoseFormView {
        let time = self.time.lock().await.clone();
        GlucoseFormView {
            glucose: self.glucose.lock().await.clone(),
            time: time.value().to_string(),
            manual_time: time.is_manual(),
            submitting: self.gate.is_in_flight(),
            status: self.status.lock().await.clone(),
        }
    }

    pub async fn submit(&self, input: GlucoseInput) -> Result<SubmitOutcome, SubmitError> {
        let Some(permit) = self.gate.try_begin() else {
            debug!("glucose submit already in flight, ignoring");
            return Ok(SubmitOutcome::Ignored);
        };

        *self.glucose.lock().await = input.glucose.clone();
        let time = {
            let mut field = self.time.lock().await;
            let baseline = input.rendered_time.unwrap_or_else(|| field.value().to_string());
            if let Some(typed) = input.time.filter(|typed| *typed != baseline) {
                field.edit(typed);
            }
            field.value().trim().to_string()
        };

        let glucose_text = input.glucose.trim();
        if glucose_text.is_empty() || time.is_empty() {
            return Err(self.reject(GLUCOSE_REQUIRED).await);
        }
        let Some(glucose) = parse_number(glucose_text) else {
            return Err(self.reject(GLUCOSE_NOT_NUMBER).await);
        };

        *self.status.lock().await = None;
        let payload = GlucosePayload { glucose, time };
        if let Err(err) = self.api.submit_glucose(&payload).await {
            warn!("glucose submit failed: {err}");
            *self.status.lock().await = Some(StatusMessage::error(err.display_message(GLUCOSE_FAILED)));
            return Err(err.into());
        }

        info!(glucose, time = %payload.time, "glucose recorded");
        self.glucose.lock().await.clear();
        self.time.lock().await.reset(local_now());
        *self.status.lock().await = Some(StatusMessage::success(GLUCOSE_SAVED));
        drop(permit);

        if let Some(history) = &self.refresh {
            if let Err(err) = history.refresh().await {
                debug!("refresh after submit failed: {err}");
            }
        }
        Ok(SubmitOutcome::Accepted)
    }

    async fn reject(&self, message: &'static str) -> SubmitError {
        *self.status.lock().await = Some(StatusMessage::warning(message));
        SubmitError::Validation(message)
    }
}

pub struct VitalsSubmission {
    api: Arc<dyn HealthApi>,
    now: Now,
    gate: OperationGate,
    /// Blank `date` / `time` follow the clock until the user types them.
    form: Mutex<VitalsInput>,
    status: Mutex<Option<StatusMessage>>,
}

impl VitalsSubmission {
    pub fn new(api: Arc<dyn HealthApi>) -> Self {
        Self::with_clock(api, system_now())
    }

    pub fn with_clock(api: Arc<dyn HealthApi>, now: Now) -> Self {
        Self {
            api,
            now,
            gate: OperationGate::new(),
            form: Mutex::new(VitalsInput::default()),
            status: Mutex::new(None),
        }
    }

    /// Date and time default to the current local day and minute.
    pub async fn view(&self) -> VitalsView {
        let mut form = self.form.lock().await.clone();
        fill_defaults(&mut form, (self.now)());
        VitalsView {
            form,
            submitting: self.gate.is_in_flight(),
            status: self.status.lock().await.clone(),
        }
    }

    pub async fn submit(&self, input: VitalsInput) -> Result<SubmitOutcome, SubmitError> {
        let Some(_permit) = self.gate.try_begin() else {
            debug!("vitals submit already in flight, ignoring");
            return Ok(SubmitOutcome::Ignored);
        };

        let mut input = input;
        fill_defaults(&mut input, (self.now)());
        *self.form.lock().await = input.clone();
        let Ok(payload) = vitals_payload(&input) else {
            *self.status.lock().await = Some(StatusMessage::warning(VITALS_NOT_NUMBER));
            return Err(SubmitError::Validation(VITALS_NOT_NUMBER));
        };

        *self.status.lock().await = None;
        if let Err(err) = self.api.submit_vitals(&payload).await {
            warn!("vitals submit failed: {err}");
            let message = match &err {
                ApiError::Transport(_) => StatusMessage::error(VITALS_UNREACHABLE),
                other => StatusMessage::warning(other.display_message(VITALS_REJECTED)),
            };
            *self.status.lock().await = Some(message);
            return Err(err.into());
        }

        info!(date = %payload.date, time = %payload.time, "vitals recorded");
        *self.form.lock().await = VitalsInput::default();
        *self.status.lock().await = Some(StatusMessage::success(VITALS_SAVED));
        Ok(SubmitOutcome::Accepted)
    }
}

fn fill_defaults(form: &mut VitalsInput, now: NaiveDateTime) {
    if form.date.trim().is_empty() {
        form.date = now.date().format("%Y-%m-%d").to_string();
    }
    if form.time.trim().is_empty() {
        form.time = format_clock(now.time());
    }
}

/// Empty metrics become `null`; any other non-numeric text is an error.
pub fn vitals_payload(input: &VitalsInput) -> Result<VitalsPayload, SubmitError> {
    Ok(VitalsPayload {
        pressure_sys: optional_number(&input.systolic)?,
        pressure_dia: optional_number(&input.diastolic)?,
        pressure_pulse: optional_number(&input.pulse)?,
        glucose: optional_number(&input.glucose)?,
        date: input.date.trim().to_string(),
        time: input.time.trim().to_string(),
    })
}

fn optional_number(text: &str) -> Result<Option<f64>, SubmitError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    parse_number(text)
        .map(Some)
        .ok_or(SubmitError::Validation(VITALS_NOT_NUMBER))
}

fn parse_number(text: &str) -> Option<f64> {
    text.replace(',', ".").parse::<f64>().ok().filter(|v| v.is_finite())
}
