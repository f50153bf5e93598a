use crate::chart::{build_chart, build_table};
use crate::errors::{ApiError, AppError, SubmitError};
use crate::history::{FETCH_FAILED, FetchOutcome, HistorySnapshot};
use crate::manifest::web_manifest;
use crate::models::{
    DateRange, DayGroupView, GlucoseFormView, GlucoseInput, GlucoseListView, GlucosePageView,
    HistoryView, ListEntry, RangeQuery, TimeInput, VitalsInput, VitalsView,
};
use crate::record::{display_time, format_day, format_measure, render_key};
use crate::state::AppState;
use crate::submission::SubmitOutcome;
use crate::theme::{Theme, system_preference};
use crate::ui::{
    GLUCOSE_PATH, HISTORY_PATH, VITALS_PATH, render_glucose_page, render_history_page,
    render_vitals_page,
};
use axum::{
    extract::{Query, State},
    http::{HeaderMap, HeaderName, Uri, header},
    response::{Html, IntoResponse, Redirect},
    Form, Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Serialize)]
pub struct SubmitResponse<V> {
    pub outcome: SubmitOutcome,
    pub view: V,
}

#[derive(Debug, Serialize)]
pub struct ThemeResponse {
    pub theme: Theme,
}

#[derive(Debug, Default, Deserialize)]
pub struct ThemeRequest {
    #[serde(default)]
    pub theme: Option<Theme>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ThemeForm {
    #[serde(default)]
    pub next: Option<String>,
}

// Pages

pub async fn vitals_page(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let theme = request_theme(&state, &headers).await;
    page(render_vitals_page(&state.vitals.view().await, theme))
}

pub async fn glucose_page(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let theme = request_theme(&state, &headers).await;
    page(render_glucose_page(&glucose_page_view(&state).await, theme))
}

pub async fn history_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<RangeQuery>,
) -> Result<impl IntoResponse, AppError> {
    let range = parse_range(&query)?;
    if let Err(err) = state.history.apply_range(range).await {
        debug!("history page rendered with fetch error: {err}");
    }

    let theme = request_theme(&state, &headers).await;
    let view = history_view(&state.history.snapshot().await, theme);
    Ok(page(render_history_page(&view, theme)))
}

pub async fn manifest() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/manifest+json")],
        Json(web_manifest()),
    )
}

// Form posts, each answered with a redirect back to its page.

pub async fn vitals_submit(State(state): State<AppState>, Form(input): Form<VitalsInput>) -> Redirect {
    if let Err(err) = state.vitals.submit(input).await {
        debug!("vitals form not recorded: {err}");
    }
    Redirect::to(VITALS_PATH)
}

pub async fn glucose_submit(State(state): State<AppState>, Form(input): Form<GlucoseInput>) -> Redirect {
    if let Err(err) = state.glucose.submit(input).await {
        debug!("glucose form not recorded: {err}");
    }
    Redirect::to(GLUCOSE_PATH)
}

pub async fn glucose_more(State(state): State<AppState>) -> Redirect {
    if let Err(err) = state.glucose_history.load_more().await {
        debug!("glucose list not loaded: {err}");
    }
    Redirect::to(GLUCOSE_PATH)
}

pub async fn glucose_time(State(state): State<AppState>, Form(input): Form<TimeInput>) -> Redirect {
    override_time(&state, input).await;
    Redirect::to(GLUCOSE_PATH)
}

pub async fn history_refresh(
    State(state): State<AppState>,
    Form(query): Form<RangeQuery>,
) -> Result<Redirect, AppError> {
    let range = parse_range(&query)?;
    if let Err(err) = refresh_history(&state, range).await {
        debug!("history refresh failed: {err}");
    }
    Ok(Redirect::to(&history_location(&range)))
}

pub async fn theme_toggle(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<ThemeForm>,
) -> Result<Redirect, AppError> {
    state.theme.toggle(system_preference(&headers)).await?;
    Ok(Redirect::to(safe_next(form.next.as_deref())))
}

// JSON API

pub async fn get_vitals(State(state): State<AppState>) -> Json<VitalsView> {
    Json(state.vitals.view().await)
}

pub async fn post_vitals(
    State(state): State<AppState>,
    Json(input): Json<VitalsInput>,
) -> Result<Json<SubmitResponse<VitalsView>>, AppError> {
    let outcome = state.vitals.submit(input).await.map_err(submit_error)?;
    Ok(Json(SubmitResponse {
        outcome,
        view: state.vitals.view().await,
    }))
}

pub async fn get_glucose(State(state): State<AppState>) -> Json<GlucosePageView> {
    Json(glucose_page_view(&state).await)
}

pub async fn post_glucose(
    State(state): State<AppState>,
    Json(input): Json<GlucoseInput>,
) -> Result<Json<SubmitResponse<GlucosePageView>>, AppError> {
    let outcome = state.glucose.submit(input).await.map_err(submit_error)?;
    Ok(Json(SubmitResponse {
        outcome,
        view: glucose_page_view(&state).await,
    }))
}

pub async fn post_glucose_more(State(state): State<AppState>) -> Result<Json<GlucoseListView>, AppError> {
    state
        .glucose_history
        .load_more()
        .await
        .map_err(|err| AppError::bad_gateway(err.display_message(FETCH_FAILED)))?;
    Ok(Json(glucose_list_view(&state.glucose_history.snapshot().await)))
}

pub async fn post_glucose_time(
    State(state): State<AppState>,
    Json(input): Json<TimeInput>,
) -> Json<GlucoseFormView> {
    override_time(&state, input).await;
    Json(state.glucose.view().await)
}

pub async fn get_history(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<RangeQuery>,
) -> Result<Json<HistoryView>, AppError> {
    let range = parse_range(&query)?;
    state
        .history
        .apply_range(range)
        .await
        .map_err(|err| AppError::bad_gateway(err.display_message(FETCH_FAILED)))?;

    let theme = request_theme(&state, &headers).await;
    Ok(Json(history_view(&state.history.snapshot().await, theme)))
}

pub async fn get_theme(State(state): State<AppState>, headers: HeaderMap) -> Json<ThemeResponse> {
    Json(ThemeResponse {
        theme: request_theme(&state, &headers).await,
    })
}

/// Sets the given theme, or toggles when none is named.
pub async fn post_theme(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ThemeRequest>,
) -> Result<Json<ThemeResponse>, AppError> {
    let theme = match request.theme {
        Some(theme) => state.theme.set(theme).await?,
        None => state.theme.toggle(system_preference(&headers)).await?,
    };
    Ok(Json(ThemeResponse { theme }))
}

/// Asks the browser to send its color-scheme hint on later requests.
fn page(html: String) -> impl IntoResponse {
    (
        [
            (HeaderName::from_static("accept-ch"), "Sec-CH-Prefers-Color-Scheme"),
            (header::VARY, "Sec-CH-Prefers-Color-Scheme"),
        ],
        Html(html),
    )
}

async fn request_theme(state: &AppState, headers: &HeaderMap) -> Theme {
    state.theme.resolve(system_preference(headers)).await
}

/// A posted time is an edit; an empty post is a focus.
async fn override_time(state: &AppState, input: TimeInput) {
    match input.time {
        Some(time) => state.glucose.edit_time(time).await,
        None => state.glucose.focus_time().await,
    }
}

/// Applies the range and refetches even when it did not change.
async fn refresh_history(state: &AppState, range: DateRange) -> Result<FetchOutcome, ApiError> {
    match state.history.apply_range(range).await? {
        FetchOutcome::Ignored => state.history.refresh().await,
        replaced => Ok(replaced),
    }
}

fn parse_range(query: &RangeQuery) -> Result<DateRange, AppError> {
    Ok(DateRange::parse(
        query.start_date.as_deref(),
        query.end_date.as_deref(),
    )?)
}

fn submit_error(err: SubmitError) -> AppError {
    match err {
        SubmitError::Validation(message) => AppError::unprocessable(message),
        SubmitError::Api(err) => AppError::bad_gateway(err.to_string()),
    }
}

fn history_location(range: &DateRange) -> String {
    let query: Vec<String> = range
        .query_pairs()
        .into_iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect();
    if query.is_empty() {
        HISTORY_PATH.to_string()
    } else {
        format!("{HISTORY_PATH}?{}", query.join("&"))
    }
}

/// Only same-origin absolute paths are followed. Browsers read `/\` like
/// `//`, so any backslash is refused.
fn safe_next(next: Option<&str>) -> &str {
    let local = |path: &str| {
        path.starts_with('/')
            && !path.starts_with("//")
            && !path.contains('\\')
            && path
                .parse::<Uri>()
                .is_ok_and(|uri| uri.scheme().is_none() && uri.authority().is_none())
    };
    match next {
        Some(path) if local(path) => path,
        _ => VITALS_PATH,
    }
}

async fn glucose_page_view(state: &AppState) -> GlucosePageView {
    GlucosePageView {
        form: state.glucose.view().await,
        list: glucose_list_view(&state.glucose_history.snapshot().await),
    }
}

pub fn glucose_list_view(snapshot: &HistorySnapshot) -> GlucoseListView {
    let groups = snapshot
        .groups()
        .into_iter()
        .map(|group| {
            let entries = group
                .items
                .iter()
                .enumerate()
                .map(|(index, record)| ListEntry {
                    key: render_key(record, index),
                    time: display_time(record).to_string(),
                    glucose: format_measure(record.glucose),
                })
                .collect();
            DayGroupView {
                label: format_day(&group.date),
                date: group.date,
                entries,
            }
        })
        .collect();

    GlucoseListView {
        groups,
        visible_count: snapshot.visible().len(),
        total: snapshot.records.len(),
        loading: snapshot.loading,
        error: snapshot.error.clone(),
        load_more_label: snapshot.load_more_label(),
    }
}

pub fn history_view(snapshot: &HistorySnapshot, theme: Theme) -> HistoryView {
    HistoryView {
        start_date: snapshot.range.start_text(),
        end_date: snapshot.range.end_text(),
        loading: snapshot.loading,
        error: snapshot.error.clone(),
        chart: build_chart(&snapshot.records, theme),
        rows: build_table(&snapshot.records),
    }
}
