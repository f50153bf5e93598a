use crate::models::Record;
use crate::record::{day_key, display_time, format_day, format_measure, render_key};
use crate::theme::Theme;
use serde::Serialize;

#[derive(Debug, Clone, Copy)]
struct SeriesDef {
    key: &'static str,
    name: &'static str,
    color: &'static str,
    value: fn(&Record) -> Option<f64>,
}

const SERIES: [SeriesDef; 4] = [
    SeriesDef {
        key: "systolic",
        name: "Sistólica",
        color: "#ea4335",
        value: |r| r.systolic,
    },
    SeriesDef {
        key: "diastolic",
        name: "Diastólica",
        color: "#1a73e8",
        value: |r| r.diastolic,
    },
    SeriesDef {
        key: "glucose",
        name: "Glicemia",
        color: "#34a853",
        value: |r| r.glucose,
    },
    SeriesDef {
        key: "pulse",
        name: "Pulso",
        color: "#fbbc04",
        value: |r| r.pulse,
    },
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub key: &'static str,
    pub name: &'static str,
    pub color: &'static str,
    /// One slot per label; `None` leaves a gap in the line.
    pub points: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartPalette {
    pub grid: &'static str,
    pub axis: &'static str,
    pub tooltip_background: &'static str,
}

impl ChartPalette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                grid: "#555",
                axis: "#fff",
                tooltip_background: "#222",
            },
            Theme::Light => Self {
                grid: "#ccc",
                axis: "#333",
                tooltip_background: "#fff",
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub series: Vec<ChartSeries>,
    pub palette: ChartPalette,
}

/// Expects records already in ascending order.
pub fn build_chart(records: &[Record], theme: Theme) -> ChartData {
    ChartData {
        labels: records.iter().map(|r| day_key(r).to_string()).collect(),
        series: SERIES
            .iter()
            .map(|def| ChartSeries {
                key: def.key,
                name: def.name,
                color: def.color,
                points: records.iter().map(def.value).collect(),
            })
            .collect(),
        palette: ChartPalette::for_theme(theme),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub key: String,
    pub date: String,
    pub time: String,
    pub systolic: String,
    pub diastolic: String,
    pub pulse: String,
    pub glucose: String,
}

pub fn build_table(records: &[Record]) -> Vec<TableRow> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| TableRow {
            key: render_key(record, index),
            date: format_day(day_key(record)),
            time: display_time(record).to_string(),
            systolic: format_measure(record.systolic),
            diastolic: format_measure(record.diastolic),
            pulse: format_measure(record.pulse),
            glucose: format_measure(record.glucose),
        })
        .collect()
}
