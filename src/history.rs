//! Record snapshots per view: fetch, order, window and group by day.
//!
//! A view holds one snapshot, replaced wholesale by every successful fetch.
//! Ordering and windowing are pure functions over that snapshot; grouping
//! runs on the already windowed slice, so a day cut by the window boundary
//! shows up as two groups until the window grows past it.

use crate::api::HealthApi;
use crate::errors::ApiError;
use crate::gate::OperationGate;
use crate::models::{DateRange, DayGroup, Record};
use crate::record::{day_key, timestamp};
use serde::Serialize;
use std::cmp::Ordering;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Window growth per "load more", and the window after every fetch.
pub const PAGE_SIZE: usize = 10;

pub const FETCH_FAILED: &str = "❌ Erro ao consultar registros.";

pub const LABEL_LOADING: &str = "Carregando registros...";
pub const LABEL_MORE: &str = "Mostrar mais 10 registros";
pub const LABEL_FIRST: &str = "Consultar últimos registros";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Oldest first, for charting.
    Ascending,
    /// Most recent first, for the incremental list.
    Descending,
}

/// Which remote list a view reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFeed {
    Glucose,
    Vitals,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchOutcome {
    Replaced,
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMoreOutcome {
    /// Nothing was loaded yet, so the initial fetch ran.
    Fetched,
    /// A fetch was already in flight.
    Ignored,
    Expanded { visible: usize },
}

/// Stable sort on the synthesized date + time. Records without a usable
/// date keep their relative order and trail the dated ones either way.
pub fn sort_records(records: &[Record], order: SortOrder) -> Vec<Record> {
    let mut keyed: Vec<_> = records.iter().map(|r| (timestamp(r), r.clone())).collect();
    keyed.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => match order {
            SortOrder::Ascending => a.cmp(b),
            SortOrder::Descending => b.cmp(a),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    keyed.into_iter().map(|(_, record)| record).collect()
}

pub fn paginate(sorted: &[Record], visible: usize) -> &[Record] {
    &sorted[..visible.min(sorted.len())]
}

pub fn group_by_day(records: &[Record]) -> Vec<DayGroup> {
    let mut groups: Vec<DayGroup> = Vec::new();
    for record in records {
        let key = day_key(record);
        match groups.last_mut() {
            Some(last) if last.date == key => last.items.push(record.clone()),
            _ => groups.push(DayGroup {
                date: key.to_string(),
                items: vec![record.clone()],
            }),
        }
    }
    groups
}

/// Point-in-time copy of a view's state.
#[derive(Debug, Clone)]
pub struct HistorySnapshot {
    /// Full snapshot, already ordered.
    pub records: Vec<Record>,
    pub visible_count: usize,
    pub error: Option<String>,
    pub range: DateRange,
    pub loading: bool,
}

impl HistorySnapshot {
    pub fn visible(&self) -> &[Record] {
        paginate(&self.records, self.visible_count)
    }

    pub fn groups(&self) -> Vec<DayGroup> {
        group_by_day(self.visible())
    }

    pub fn load_more_label(&self) -> &'static str {
        if self.loading {
            LABEL_LOADING
        } else if self.records.is_empty() {
            LABEL_FIRST
        } else {
            LABEL_MORE
        }
    }
}

#[derive(Debug, Default)]
struct ViewState {
    records: Vec<Record>,
    visible: usize,
    error: Option<String>,
    range: DateRange,
    /// Range of the last successful fetch.
    fetched: Option<DateRange>,
}

pub struct HistoryAggregator {
    api: Arc<dyn HealthApi>,
    feed: RecordFeed,
    order: SortOrder,
    gate: OperationGate,
    state: Mutex<ViewState>,
}

impl HistoryAggregator {
    pub fn new(api: Arc<dyn HealthApi>, feed: RecordFeed, order: SortOrder) -> Self {
        Self {
            api,
            feed,
            order,
            gate: OperationGate::new(),
            state: Mutex::new(ViewState {
                visible: PAGE_SIZE,
                ..ViewState::default()
            }),
        }
    }

    /// One list request. Success replaces the snapshot and resets the
    /// window; failure keeps the previous snapshot and records the error.
    pub async fn fetch(&self, range: DateRange) -> Result<FetchOutcome, ApiError> {
        let Some(_permit) = self.gate.try_begin() else {
            debug!(feed = ?self.feed, "fetch already in flight, ignoring");
            return Ok(FetchOutcome::Ignored);
        };

        self.state.lock().await.error = None;

        let result = match self.feed {
            RecordFeed::Glucose => self.api.list_glucose().await,
            RecordFeed::Vitals => self.api.list_vitals(&range).await,
        };

        let mut state = self.state.lock().await;
        match result {
            Ok(records) => {
                info!(feed = ?self.feed, count = records.len(), "snapshot replaced");
                state.records = sort_records(&records, self.order);
                state.visible = PAGE_SIZE;
                state.error = None;
                state.fetched = Some(range);
                Ok(FetchOutcome::Replaced)
            }
            Err(err) => {
                warn!(feed = ?self.feed, "fetch failed: {err}");
                state.error = Some(err.display_message(FETCH_FAILED));
                Err(err)
            }
        }
    }

    /// Fetches with the current range.
    pub async fn refresh(&self) -> Result<FetchOutcome, ApiError> {
        let range = self.state.lock().await.range;
        self.fetch(range).await
    }

    /// Stores the filter and fetches unless the snapshot already reflects it.
    pub async fn apply_range(&self, range: DateRange) -> Result<FetchOutcome, ApiError> {
        let fetched = {
            let mut state = self.state.lock().await;
            state.range = range;
            state.fetched
        };
        if fetched == Some(range) {
            return Ok(FetchOutcome::Ignored);
        }
        self.fetch(range).await
    }

    pub async fn load_more(&self) -> Result<LoadMoreOutcome, ApiError> {
        let range = {
            let mut state = self.state.lock().await;
            if !state.records.is_empty() {
                state.visible += PAGE_SIZE;
                return Ok(LoadMoreOutcome::Expanded {
                    visible: state.visible,
                });
            }
            state.range
        };

        match self.fetch(range).await? {
            FetchOutcome::Replaced => Ok(LoadMoreOutcome::Fetched),
            FetchOutcome::Ignored => Ok(LoadMoreOutcome::Ignored),
        }
    }

    pub async fn snapshot(&self) -> HistorySnapshot {
        let state = self.state.lock().await;
        HistorySnapshot {
            records: state.records.clone(),
            visible_count: state.visible,
            error: state.error.clone(),
            range: state.range,
            loading: self.gate.is_in_flight(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::UNKNOWN_DATE;
    use crate::testing::{FakeApi, record, rejected};

    fn dates(records: &[Record]) -> Vec<String> {
        records
            .iter()
            .map(|r| format!("{}/{}", r.date.clone().unwrap_or_default(), r.time.clone().unwrap_or_default()))
            .collect()
    }

    fn three_days() -> Vec<Record> {
        vec![
            record("2025-06-11", "08:15", 98.0),
            record("2025-06-12", "08:30", 90.0),
            record("2025-06-10", "08:00", 95.0),
        ]
    }

    fn many(count: usize) -> Vec<Record> {
        (0..count)
            .map(|i| record(&format!("2025-06-{:02}", i % 28 + 1), &format!("{:02}:00", i % 24), i as f64))
            .collect()
    }

    #[test]
    fn ascending_and_descending_orders() {
        let ascending = sort_records(&three_days(), SortOrder::Ascending);
        assert_eq!(
            dates(&ascending),
            vec!["2025-06-10/08:00", "2025-06-11/08:15", "2025-06-12/08:30"]
        );

        let descending = sort_records(&three_days(), SortOrder::Descending);
        assert_eq!(
            dates(&descending),
            vec!["2025-06-12/08:30", "2025-06-11/08:15", "2025-06-10/08:00"]
        );
    }

    #[test]
    fn undated_records_trail_in_original_order() {
        let mut records = three_days();
        records.insert(0, record("", "", 1.0));
        records.insert(2, record("not-a-date", "", 2.0));

        let sorted = sort_records(&records, SortOrder::Descending);
        assert_eq!(sorted[3].glucose, Some(1.0));
        assert_eq!(sorted[4].glucose, Some(2.0));

        let groups = group_by_day(&sorted);
        assert_eq!(groups[3].date, UNKNOWN_DATE);
        assert_eq!(groups[4].date, "not-a-date");
    }

    #[test]
    fn groups_consecutive_days() {
        let records = vec![
            record("2025-06-10", "08:00", 1.0),
            record("2025-06-10", "20:00", 2.0),
            record("2025-06-11", "08:00", 3.0),
        ];
        let groups = group_by_day(&records);
        let sizes: Vec<_> = groups.iter().map(|g| g.items.len()).collect();
        assert_eq!(sizes, vec![2, 1]);
        assert_eq!(groups[0].date, "2025-06-10");
    }

    #[test]
    fn day_split_by_window_shows_twice() {
        let records = vec![
            record("2025-06-10", "08:00", 1.0),
            record("2025-06-11", "08:00", 2.0),
            record("2025-06-10", "09:00", 3.0),
        ];
        assert_eq!(group_by_day(&records).len(), 3);
    }

    #[test]
    fn paginate_clamps_to_length() {
        let records = many(5);
        assert_eq!(paginate(&records, 10).len(), 5);
        assert_eq!(paginate(&records, 2).len(), 2);
    }

    #[tokio::test]
    async fn load_more_grows_window_by_page() {
        let api = Arc::new(FakeApi::default());
        api.push_list(Ok(many(25)));
        let aggregator = HistoryAggregator::new(api.clone(), RecordFeed::Glucose, SortOrder::Descending);

        assert_eq!(aggregator.load_more().await.unwrap(), LoadMoreOutcome::Fetched);
        assert_eq!(aggregator.snapshot().await.visible().len(), 10);

        assert_eq!(
            aggregator.load_more().await.unwrap(),
            LoadMoreOutcome::Expanded { visible: 20 }
        );
        assert_eq!(aggregator.snapshot().await.visible().len(), 20);
        assert_eq!(api.list_calls(), 1);
    }

    #[tokio::test]
    async fn failed_fetch_keeps_snapshot_then_success_clears_error() {
        let api = Arc::new(FakeApi::default());
        api.push_list(Ok(three_days()));
        api.push_list(Err(rejected(500, "")));
        api.push_list(Ok(many(2)));
        let aggregator = HistoryAggregator::new(api.clone(), RecordFeed::Glucose, SortOrder::Descending);

        aggregator.fetch(DateRange::default()).await.unwrap();
        assert!(aggregator.fetch(DateRange::default()).await.is_err());

        let snapshot = aggregator.snapshot().await;
        assert_eq!(snapshot.records.len(), 3);
        assert_eq!(snapshot.error.as_deref(), Some(FETCH_FAILED));

        aggregator.fetch(DateRange::default()).await.unwrap();
        let snapshot = aggregator.snapshot().await;
        assert_eq!(snapshot.records.len(), 2);
        assert_eq!(snapshot.error, None);
    }

    #[tokio::test]
    async fn first_fetch_failure_leaves_empty_snapshot() {
        let api = Arc::new(FakeApi::default());
        api.push_list(Err(ApiError::UnexpectedFormat));
        let aggregator = HistoryAggregator::new(api, RecordFeed::Glucose, SortOrder::Descending);

        assert!(aggregator.load_more().await.is_err());
        let snapshot = aggregator.snapshot().await;
        assert!(snapshot.records.is_empty());
        assert_eq!(snapshot.error.as_deref(), Some("Formato inesperado recebido da API."));
        assert_eq!(snapshot.load_more_label(), LABEL_FIRST);
    }

    #[tokio::test]
    async fn fetch_resets_window() {
        let api = Arc::new(FakeApi::default());
        api.push_list(Ok(many(25)));
        api.push_list(Ok(many(25)));
        let aggregator = HistoryAggregator::new(api, RecordFeed::Glucose, SortOrder::Descending);

        aggregator.load_more().await.unwrap();
        aggregator.load_more().await.unwrap();
        aggregator.refresh().await.unwrap();
        assert_eq!(aggregator.snapshot().await.visible_count, PAGE_SIZE);
    }

    #[tokio::test]
    async fn concurrent_fetch_is_ignored() {
        let api = Arc::new(FakeApi::holding());
        let aggregator = Arc::new(HistoryAggregator::new(
            api.clone(),
            RecordFeed::Glucose,
            SortOrder::Descending,
        ));

        let first = tokio::spawn({
            let aggregator = Arc::clone(&aggregator);
            async move { aggregator.fetch(DateRange::default()).await }
        });
        api.entered.notified().await;

        assert!(aggregator.snapshot().await.loading);
        assert_eq!(
            aggregator.fetch(DateRange::default()).await.unwrap(),
            FetchOutcome::Ignored
        );

        api.release.notify_one();
        assert_eq!(first.await.unwrap().unwrap(), FetchOutcome::Replaced);
        assert_eq!(api.list_calls(), 1);
    }

    #[tokio::test]
    async fn range_change_refetches_only_when_different() {
        let api = Arc::new(FakeApi::default());
        let aggregator = HistoryAggregator::new(api.clone(), RecordFeed::Vitals, SortOrder::Ascending);
        let june = DateRange::parse(Some("2025-06-10"), Some("2025-06-12")).unwrap();

        assert_eq!(aggregator.apply_range(june).await.unwrap(), FetchOutcome::Replaced);
        assert_eq!(aggregator.apply_range(june).await.unwrap(), FetchOutcome::Ignored);
        assert_eq!(
            aggregator.apply_range(DateRange::default()).await.unwrap(),
            FetchOutcome::Replaced
        );

        assert_eq!(api.ranges(), vec![june, DateRange::default()]);
    }

    #[tokio::test]
    async fn failed_range_fetch_is_retried_on_next_apply() {
        let api = Arc::new(FakeApi::default());
        api.push_list(Err(rejected(503, "fora do ar")));
        let aggregator = HistoryAggregator::new(api.clone(), RecordFeed::Vitals, SortOrder::Ascending);

        assert!(aggregator.apply_range(DateRange::default()).await.is_err());
        assert_eq!(aggregator.snapshot().await.error.as_deref(), Some("fora do ar"));
        assert_eq!(
            aggregator.apply_range(DateRange::default()).await.unwrap(),
            FetchOutcome::Replaced
        );
        assert_eq!(api.list_calls(), 2);
    }
}
