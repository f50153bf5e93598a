use crate::chart::{ChartData, TableRow};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One measurement as returned by the remote records API.
///
/// Glucose-only and combined vitals records share this shape; whatever a
/// variant does not carry is simply `None`. Values are read leniently (see
/// [`Record::from_value`]) and never mutated after a fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub glucose: Option<f64>,
    pub systolic: Option<f64>,
    pub diastolic: Option<f64>,
    pub pulse: Option<f64>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub created_at: Option<String>,
}

impl Record {
    /// Reads a record out of arbitrary JSON. Never fails: anything that is
    /// not an object yields an empty record, and fields of the wrong shape
    /// read as absent.
    pub fn from_value(value: &Value) -> Self {
        let Some(fields) = value.as_object() else {
            return Self::default();
        };

        Self {
            id: identifier(fields.get("id")).or_else(|| identifier(fields.get("_id"))),
            glucose: number(fields, &["glucose"]),
            systolic: number(fields, &["systolic", "pressureSys"]),
            diastolic: number(fields, &["diastolic", "pressureDia"]),
            pulse: number(fields, &["pulse", "pressurePulse"]),
            date: text(fields, "date"),
            time: text(fields, "time"),
            created_at: text(fields, "createdAt"),
        }
    }
}

fn number(fields: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| match fields.get(*key)? {
        Value::Number(value) => value.as_f64(),
        Value::String(value) => value.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    })
}

fn text(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::String(value) if !value.is_empty() => Some(value.clone()),
        _ => None,
    }
}

fn identifier(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(value) if !value.is_empty() => Some(value.clone()),
        Value::Number(value) => Some(value.to_string()),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlucosePayload {
    pub glucose: f64,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalsPayload {
    pub pressure_sys: Option<f64>,
    pub pressure_dia: Option<f64>,
    pub pressure_pulse: Option<f64>,
    pub glucose: Option<f64>,
    pub date: String,
    pub time: String,
}

/// Inclusive calendar bounds for the vitals list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// Parses the `YYYY-MM-DD` bounds of a date filter. Blank bounds are open.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self, chrono::ParseError> {
        Ok(Self {
            start: parse_bound(start)?,
            end: parse_bound(end)?,
        })
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(2);
        if let Some(start) = self.start {
            pairs.push(("startDate", date_key(start)));
        }
        if let Some(end) = self.end {
            pairs.push(("endDate", date_key(end)));
        }
        pairs
    }

    pub fn start_text(&self) -> String {
        self.start.map(date_key).unwrap_or_default()
    }

    pub fn end_text(&self) -> String {
        self.end.map(date_key).unwrap_or_default()
    }
}

fn parse_bound(value: Option<&str>) -> Result<Option<NaiveDate>, chrono::ParseError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => NaiveDate::parse_from_str(text, "%Y-%m-%d").map(Some),
    }
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// A contiguous run of records sharing one derived calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct DayGroup {
    pub date: String,
    pub items: Vec<Record>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Success,
    Warning,
    Error,
}

impl StatusKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

impl StatusMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GlucoseInput {
    #[serde(default)]
    pub glucose: String,
    #[serde(default)]
    pub time: Option<String>,
    /// Time value the page last showed; a posted `time` equal to it was not edited.
    #[serde(default, rename = "renderedTime")]
    pub rendered_time: Option<String>,
}

/// Vitals form fields as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VitalsInput {
    #[serde(default)]
    pub systolic: String,
    #[serde(default)]
    pub diastolic: String,
    #[serde(default)]
    pub pulse: String,
    #[serde(default)]
    pub glucose: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimeInput {
    #[serde(default)]
    pub time: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeQuery {
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlucoseFormView {
    pub glucose: String,
    pub time: String,
    pub manual_time: bool,
    pub submitting: bool,
    pub status: Option<StatusMessage>,
}

#[derive(Debug, Serialize)]
pub struct VitalsView {
    pub form: VitalsInput,
    pub submitting: bool,
    pub status: Option<StatusMessage>,
}

#[derive(Debug, Serialize)]
pub struct ListEntry {
    pub key: String,
    pub time: String,
    pub glucose: String,
}

#[derive(Debug, Serialize)]
pub struct DayGroupView {
    pub date: String,
    pub label: String,
    pub entries: Vec<ListEntry>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlucoseListView {
    pub groups: Vec<DayGroupView>,
    pub visible_count: usize,
    pub total: usize,
    pub loading: bool,
    pub error: Option<String>,
    pub load_more_label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct GlucosePageView {
    pub form: GlucoseFormView,
    pub list: GlucoseListView,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryView {
    pub start_date: String,
    pub end_date: String,
    pub loading: bool,
    pub error: Option<String>,
    pub chart: ChartData,
    pub rows: Vec<TableRow>,
}
