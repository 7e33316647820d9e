//! Dashboard view-model.
//!
//! Owns the raw occurrence collection and the selected [`TimeFilter`], and
//! republishes a [`DashboardSnapshot`] whenever either changes. Changing
//! the filter only triggers a fetch when the held data cannot cover the new
//! window.
//!
//! Fetches are tagged with a monotonically increasing id; a completion
//! whose id is not the most recent one is discarded, so a slow response
//! never overwrites newer data. Selecting a filter while a fetch is in
//! flight invalidates that fetch too.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use sentinel_dashboard_models::{CustomRange, DashboardSnapshot, LabelOptions, TimeFilter};
use sentinel_occurrence_models::OccurrenceRecord;
use sentinel_source::{OccurrenceBatch, OccurrenceSource, SourceError};

use crate::sample::sample_occurrences;
use crate::{DashboardError, compute_snapshot, window};

/// Behaviour knobs for [`DashboardViewModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewModelOptions {
    /// Filter selected before any user interaction.
    pub initial_filter: TimeFilter,
    /// Window requested by [`DashboardViewModel::refresh`].
    pub fetch_window: TimeFilter,
    /// Locale and offset for bucket labels.
    pub labels: LabelOptions,
    /// Substitute the sample dataset when a fetch fails.
    pub fallback_to_sample: bool,
}

impl Default for ViewModelOptions {
    fn default() -> Self {
        Self {
            initial_filter: TimeFilter::default(),
            fetch_window: TimeFilter::All,
            labels: LabelOptions::default(),
            fallback_to_sample: true,
        }
    }
}

/// Lifecycle of the raw collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Ready,
    /// The last fetch failed. `fallback` is set when the sample dataset was
    /// substituted.
    Error { message: String, fallback: bool },
}

/// Handle for an in-flight fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub id: u64,
    pub window: TimeFilter,
}

/// What happened to a completed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The batch replaced the raw collection.
    Applied,
    /// The fetch failed and sample data was substituted.
    FellBack,
    /// A newer fetch was issued meanwhile; the result was discarded.
    Stale,
}

pub struct DashboardViewModel {
    source: Arc<dyn OccurrenceSource>,
    options: ViewModelOptions,
    state: LoadState,
    /// State to restore when an in-flight fetch is cancelled.
    settled: LoadState,
    filter: TimeFilter,
    raw: Vec<OccurrenceRecord>,
    held: Option<(TimeFilter, DateTime<Utc>)>,
    notice: Option<String>,
    snapshot: Option<DashboardSnapshot>,
    last_request_id: u64,
}

impl DashboardViewModel {
    #[must_use]
    pub fn new(source: Arc<dyn OccurrenceSource>, options: ViewModelOptions) -> Self {
        Self {
            source,
            filter: options.initial_filter,
            options,
            state: LoadState::Idle,
            settled: LoadState::Idle,
            raw: Vec::new(),
            held: None,
            notice: None,
            snapshot: None,
            last_request_id: 0,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &LoadState {
        &self.state
    }

    #[must_use]
    pub const fn filter(&self) -> &TimeFilter {
        &self.filter
    }

    #[must_use]
    pub fn raw(&self) -> &[OccurrenceRecord] {
        &self.raw
    }

    /// The most recent snapshot, or `None` before the first computation.
    #[must_use]
    pub const fn snapshot(&self) -> Option<&DashboardSnapshot> {
        self.snapshot.as_ref()
    }

    /// Upstream notice attached to the last applied batch, if any.
    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Registers a new fetch for `window` and enters [`LoadState::Loading`].
    ///
    /// Any fetch issued earlier becomes stale.
    pub fn begin_fetch(&mut self, window: TimeFilter) -> FetchTicket {
        self.last_request_id += 1;
        let previous = std::mem::replace(&mut self.state, LoadState::Loading);
        if previous != LoadState::Loading {
            self.settled = previous;
        }
        log::info!(
            "Fetch #{} for window {window} via {}",
            self.last_request_id,
            self.source.name()
        );
        FetchTicket {
            id: self.last_request_id,
            window,
        }
    }

    /// Applies the result of a fetch started with [`Self::begin_fetch`].
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Source`] if the fetch failed and sample
    /// fallback is disabled. The state is [`LoadState::Error`] in that case.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<OccurrenceBatch, SourceError>,
        now: DateTime<Utc>,
    ) -> Result<FetchOutcome, DashboardError> {
        if ticket.id != self.last_request_id {
            log::warn!(
                "Discarding stale fetch #{} (latest is #{})",
                ticket.id,
                self.last_request_id
            );
            return Ok(FetchOutcome::Stale);
        }

        match result {
            Ok(batch) => {
                log::info!(
                    "Loaded {} occurrence(s) for window {}",
                    batch.occurrences.len(),
                    ticket.window
                );
                self.raw = batch.occurrences;
                self.notice = batch.message;
                self.held = Some((ticket.window, now));
                self.state = LoadState::Ready;
                self.recompute(now);
                Ok(FetchOutcome::Applied)
            }
            Err(e) if self.options.fallback_to_sample => {
                log::warn!("Fetch #{} failed, showing sample data: {e}", ticket.id);
                self.raw = sample_occurrences(now);
                self.notice = None;
                self.held = Some((TimeFilter::All, now));
                self.state = LoadState::Error {
                    message: e.to_string(),
                    fallback: true,
                };
                self.recompute(now);
                Ok(FetchOutcome::FellBack)
            }
            Err(e) => {
                log::error!("Fetch #{} failed: {e}", ticket.id);
                self.state = LoadState::Error {
                    message: e.to_string(),
                    fallback: false,
                };
                Err(e.into())
            }
        }
    }

    /// Fetches `window` from the source and applies the result.
    ///
    /// # Errors
    ///
    /// See [`Self::complete_fetch`].
    pub async fn fetch(
        &mut self,
        window: TimeFilter,
        now: DateTime<Utc>,
    ) -> Result<FetchOutcome, DashboardError> {
        let ticket = self.begin_fetch(window);
        let result = self.source.fetch(&ticket.window).await;
        self.complete_fetch(ticket, result, now)
    }

    /// Refetches the configured broad window. Never retries on its own.
    ///
    /// # Errors
    ///
    /// See [`Self::complete_fetch`].
    pub async fn refresh(&mut self, now: DateTime<Utc>) -> Result<FetchOutcome, DashboardError> {
        self.fetch(self.options.fetch_window, now).await
    }

    /// Selects `filter` and recomputes over the held data.
    ///
    /// A fetch still in flight is cancelled: its completion will be
    /// [`FetchOutcome::Stale`]. Returns the window that must be fetched when
    /// the held data does not cover `filter`, or `None` when no fetch is
    /// needed.
    pub fn set_filter(&mut self, filter: TimeFilter, now: DateTime<Utc>) -> Option<TimeFilter> {
        if self.state == LoadState::Loading {
            self.last_request_id += 1;
            self.state = self.settled.clone();
            log::debug!(
                "Filter changed to {filter}, cancelled fetch #{}",
                self.last_request_id - 1
            );
        }
        self.filter = filter;
        self.recompute(now);

        let (held, fetched_at) = self.held?;
        if window::covers(&held, fetched_at, &filter, now) {
            None
        } else {
            log::debug!("Held window {held} does not cover {filter}");
            Some(filter)
        }
    }

    /// Selects a custom range of whole local days.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::InvalidRange`] if `end` is before `start`;
    /// the current selection is left untouched.
    pub fn select_dates(
        &mut self,
        start: NaiveDate,
        end: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Option<TimeFilter>, DashboardError> {
        let range = CustomRange::from_dates(start, end, self.options.labels.offset)?;
        Ok(self.set_filter(TimeFilter::Custom(range), now))
    }

    /// Selects `filter` and fetches its window if the held data does not
    /// cover it.
    ///
    /// # Errors
    ///
    /// See [`Self::complete_fetch`].
    pub async fn apply_filter(
        &mut self,
        filter: TimeFilter,
        now: DateTime<Utc>,
    ) -> Result<(), DashboardError> {
        if let Some(window) = self.set_filter(filter, now) {
            self.fetch(window, now).await?;
        }
        Ok(())
    }

    fn recompute(&mut self, now: DateTime<Utc>) {
        self.snapshot = Some(compute_snapshot(
            &self.raw,
            &self.filter,
            now,
            &self.options.labels,
        ));
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    struct FakeSource {
        responses: Mutex<VecDeque<Result<OccurrenceBatch, SourceError>>>,
        requests: Mutex<Vec<TimeFilter>>,
    }

    impl FakeSource {
        fn with(responses: Vec<Result<OccurrenceBatch, SourceError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::default(),
            })
        }

        fn requests(&self) -> Vec<TimeFilter> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl OccurrenceSource for FakeSource {
        fn name(&self) -> &str {
            "fake"
        }

        async fn fetch(&self, window: &TimeFilter) -> Result<OccurrenceBatch, SourceError> {
            self.requests.lock().unwrap().push(*window);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(OccurrenceBatch::default()))
        }
    }

    fn now() -> DateTime<Utc> {
        "2024-11-10T12:00:00Z".parse().unwrap()
    }

    fn batch(titles: &[&str]) -> OccurrenceBatch {
        OccurrenceBatch::new(
            titles
                .iter()
                .map(|t| OccurrenceRecord::new(*t, "FURTO", "ABERTO", "2024-11-10T11:00:00Z"))
                .collect(),
        )
    }

    fn outage() -> SourceError {
        SourceError::Status {
            status: 503,
            body: "unavailable".to_string(),
        }
    }

    #[tokio::test]
    async fn refresh_loads_broad_window() {
        let source = FakeSource::with(vec![Ok(batch(&["a", "b"]))]);
        let mut vm = DashboardViewModel::new(source.clone(), ViewModelOptions::default());
        assert_eq!(vm.state(), &LoadState::Idle);
        assert!(vm.snapshot().is_none());

        let outcome = vm.refresh(now()).await.unwrap();

        assert_eq!(outcome, FetchOutcome::Applied);
        assert_eq!(vm.state(), &LoadState::Ready);
        assert_eq!(source.requests(), vec![TimeFilter::All]);
        let snapshot = vm.snapshot().unwrap();
        assert_eq!(snapshot.filter, TimeFilter::Last30Days);
        assert_eq!(snapshot.statistics.total, 2);
    }

    #[tokio::test]
    async fn failure_falls_back_to_sample_data() {
        let source = FakeSource::with(vec![Err(outage())]);
        let mut vm = DashboardViewModel::new(source, ViewModelOptions::default());

        let outcome = vm.refresh(now()).await.unwrap();

        assert_eq!(outcome, FetchOutcome::FellBack);
        assert!(matches!(
            vm.state(),
            LoadState::Error { fallback: true, message } if message.contains("503")
        ));
        assert_eq!(vm.raw().len(), 8);
        assert_eq!(vm.snapshot().unwrap().statistics.total, 7);
    }

    #[tokio::test]
    async fn failure_without_fallback_surfaces_error() {
        let source = FakeSource::with(vec![Err(outage())]);
        let options = ViewModelOptions {
            fallback_to_sample: false,
            ..ViewModelOptions::default()
        };
        let mut vm = DashboardViewModel::new(source, options);

        let err = vm.refresh(now()).await.unwrap_err();

        assert!(matches!(err, DashboardError::Source(_)));
        assert!(matches!(vm.state(), LoadState::Error { fallback: false, .. }));
        assert!(vm.raw().is_empty());
    }

    #[tokio::test]
    async fn manual_retry_after_failure_recovers() {
        let source = FakeSource::with(vec![Err(outage()), Ok(batch(&["a"]))]);
        let mut vm = DashboardViewModel::new(source.clone(), ViewModelOptions::default());

        vm.refresh(now()).await.unwrap();
        vm.refresh(now()).await.unwrap();

        assert_eq!(vm.state(), &LoadState::Ready);
        assert_eq!(vm.raw().len(), 1);
        assert_eq!(source.requests().len(), 2);
    }

    #[tokio::test]
    async fn filter_changes_do_not_refetch_when_covered() {
        let source = FakeSource::with(vec![Ok(batch(&["a"]))]);
        let mut vm = DashboardViewModel::new(source.clone(), ViewModelOptions::default());
        vm.refresh(now()).await.unwrap();

        for filter in [TimeFilter::LastHour, TimeFilter::Last90Days, TimeFilter::All] {
            vm.apply_filter(filter, now()).await.unwrap();
            assert_eq!(vm.snapshot().unwrap().filter, filter);
        }
        assert!(
            vm.select_dates(
                NaiveDate::from_ymd_opt(2024, 11, 5).unwrap(),
                NaiveDate::from_ymd_opt(2024, 11, 9).unwrap(),
                now()
            )
            .unwrap()
            .is_none()
        );
        assert_eq!(source.requests().len(), 1);
    }

    #[tokio::test]
    async fn narrow_fetch_window_refetches_wider_filters() {
        let source = FakeSource::with(vec![Ok(batch(&["recent"])), Ok(batch(&["a", "b", "c"]))]);
        let options = ViewModelOptions {
            fetch_window: TimeFilter::Last7Days,
            ..ViewModelOptions::default()
        };
        let mut vm = DashboardViewModel::new(source.clone(), options);
        vm.refresh(now()).await.unwrap();

        assert_eq!(vm.set_filter(TimeFilter::LastDay, now()), None);
        vm.apply_filter(TimeFilter::Last90Days, now()).await.unwrap();

        assert_eq!(
            source.requests(),
            vec![TimeFilter::Last7Days, TimeFilter::Last90Days]
        );
        assert_eq!(vm.snapshot().unwrap().statistics.total, 3);
    }

    #[test]
    fn stale_completions_are_discarded() {
        let source = FakeSource::with(Vec::new());
        let mut vm = DashboardViewModel::new(source, ViewModelOptions::default());

        let first = vm.begin_fetch(TimeFilter::All);
        let second = vm.begin_fetch(TimeFilter::All);
        assert!(second.id > first.id);

        assert_eq!(
            vm.complete_fetch(second, Ok(batch(&["new"])), now()).unwrap(),
            FetchOutcome::Applied
        );
        assert_eq!(
            vm.complete_fetch(first, Ok(batch(&["old", "older"])), now())
                .unwrap(),
            FetchOutcome::Stale
        );
        assert_eq!(vm.raw().len(), 1);
        assert_eq!(vm.raw()[0].title, "new");
        assert_eq!(vm.state(), &LoadState::Ready);
    }

    #[test]
    fn stale_failure_does_not_clobber_state() {
        let source = FakeSource::with(Vec::new());
        let mut vm = DashboardViewModel::new(source, ViewModelOptions::default());

        let first = vm.begin_fetch(TimeFilter::All);
        let _second = vm.begin_fetch(TimeFilter::All);

        assert_eq!(
            vm.complete_fetch(first, Err(outage()), now()).unwrap(),
            FetchOutcome::Stale
        );
        assert_eq!(vm.state(), &LoadState::Loading);
        assert!(vm.raw().is_empty());
    }

    #[test]
    fn filter_change_cancels_in_flight_fetch() {
        let source = FakeSource::with(Vec::new());
        let mut vm = DashboardViewModel::new(source, ViewModelOptions::default());
        let initial = vm.begin_fetch(TimeFilter::All);
        vm.complete_fetch(initial, Ok(batch(&["a", "b", "c"])), now())
            .unwrap();

        let custom = vm
            .select_dates(
                NaiveDate::from_ymd_opt(2024, 11, 8).unwrap(),
                NaiveDate::from_ymd_opt(2024, 11, 8).unwrap(),
                now(),
            )
            .unwrap()
            .unwrap_or(*vm.filter());
        let pending = vm.begin_fetch(custom);
        assert_eq!(vm.state(), &LoadState::Loading);

        assert_eq!(vm.set_filter(TimeFilter::Last7Days, now()), None);
        assert_eq!(vm.state(), &LoadState::Ready);
        assert_eq!(vm.snapshot().unwrap().statistics.total, 3);

        assert_eq!(
            vm.complete_fetch(pending, Ok(batch(&["late"])), now())
                .unwrap(),
            FetchOutcome::Stale
        );
        assert_eq!(vm.raw().len(), 3);
        assert_eq!(vm.snapshot().unwrap().filter, TimeFilter::Last7Days);
        assert_eq!(vm.snapshot().unwrap().statistics.total, 3);
    }

    #[test]
    fn cancelled_fetch_restores_fallback_state() {
        let source = FakeSource::with(Vec::new());
        let mut vm = DashboardViewModel::new(source, ViewModelOptions::default());
        let failed = vm.begin_fetch(TimeFilter::All);
        vm.complete_fetch(failed, Err(outage()), now()).unwrap();

        let retry = vm.begin_fetch(TimeFilter::All);
        vm.set_filter(TimeFilter::LastDay, now());

        assert!(matches!(vm.state(), LoadState::Error { fallback: true, .. }));
        assert_eq!(
            vm.complete_fetch(retry, Ok(batch(&["late"])), now()).unwrap(),
            FetchOutcome::Stale
        );
        assert_eq!(vm.raw().len(), 8);
    }

    #[test]
    fn reversed_dates_are_rejected() {
        let source = FakeSource::with(Vec::new());
        let mut vm = DashboardViewModel::new(source, ViewModelOptions::default());

        let err = vm
            .select_dates(
                NaiveDate::from_ymd_opt(2024, 11, 9).unwrap(),
                NaiveDate::from_ymd_opt(2024, 11, 5).unwrap(),
                now(),
            )
            .unwrap_err();

        assert!(matches!(err, DashboardError::InvalidRange(_)));
        assert_eq!(vm.filter(), &TimeFilter::Last30Days);
    }

    #[test]
    fn upstream_notice_is_kept() {
        let source = FakeSource::with(Vec::new());
        let mut vm = DashboardViewModel::new(source, ViewModelOptions::default());
        let ticket = vm.begin_fetch(TimeFilter::All);
        let mut fallback_batch = batch(&["a"]);
        fallback_batch.fallback = true;
        fallback_batch.message = Some("Dados de exemplo".to_string());

        vm.complete_fetch(ticket, Ok(fallback_batch), now()).unwrap();

        assert_eq!(vm.notice(), Some("Dados de exemplo"));
    }
}
