use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;

use crate::config::DashboardConfig;
use crate::data::aggregate::{
    self, DailyPoint, Heatmap, Kpis, RankedEntity, Slice,
};
use crate::data::cache::DatasetCache;
use crate::data::date_range::{filter_by_date, DateRange, DateRangeState};
use crate::data::export::export_csv;
use crate::data::filter::{FilterState, FilteredView, Resolution};
use crate::data::model::{Dataset, Dimension, Measure};
use crate::error::InvalidRangeError;

// ---------------------------------------------------------------------------
// Notices: recoverable conditions shown without blocking the dashboard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    InvalidRange(InvalidRangeError),
    SelectionReset(Dimension),
    EmptyResult,
}

impl Notice {
    pub fn message(&self) -> String {
        match self {
            Notice::InvalidRange(err) => format!("{err}. Showing the previous range."),
            Notice::SelectionReset(dim) => {
                format!("{dim} selection no longer matched the filters above it and was reset.")
            }
            Notice::EmptyResult => "No data for the current selection.".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Derived tables for one render pass
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct Aggregates {
    pub kpis: Kpis,
    pub time_series: Vec<DailyPoint>,
    pub ranking: Vec<RankedEntity>,
    pub breakdown: Vec<Slice>,
    pub sales_by_state: Vec<Slice>,
    pub profit_by_sub_category: Vec<Slice>,
    pub heatmap: Heatmap,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Parsed files, shared across reloads.
    pub cache: DatasetCache,

    /// Loaded dataset (None until user loads a file).
    pub dataset: Option<Arc<Dataset>>,

    /// Where `dataset` came from.
    pub source: Option<PathBuf>,

    /// Per-dimension selections.
    pub filters: FilterState,

    /// Requested order-date interval.
    pub dates: DateRangeState,

    /// Option lists from the last cascade pass.
    pub resolution: Resolution,

    /// Bounds of the categorical subset, before the date filter.
    pub date_bounds: Option<DateRange>,

    /// Range actually applied.
    pub applied_range: Option<DateRange>,

    /// Indices of records passing every filter (cached).
    pub visible_indices: Vec<usize>,

    pub aggregates: Aggregates,

    pub entity: Dimension,
    pub rank_measure: Measure,
    pub breakdown_dimension: Dimension,
    pub breakdown_measure: Measure,
    pub top_n: usize,

    /// Non-blocking warnings from the last recompute.
    pub notices: Vec<Notice>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DashboardConfig::default())
    }
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            filters: FilterState::new(config.dimensions.iter().copied()),
            entity: config.entity,
            rank_measure: config.rank_measure,
            breakdown_dimension: config.breakdown_dimension,
            breakdown_measure: config.breakdown_measure,
            top_n: config.top_n,
            config,
            cache: DatasetCache::new(),
            dataset: None,
            source: None,
            dates: DateRangeState::default(),
            resolution: Resolution::default(),
            date_bounds: None,
            applied_range: None,
            visible_indices: Vec::new(),
            aggregates: Aggregates::default(),
            notices: Vec::new(),
            status_message: None,
        }
    }

    /// Load `path` through the cache. Failures leave the previous dataset
    /// in place and are reported in `status_message`.
    pub fn open(&mut self, path: &Path) {
        match self.cache.get_or_load(path) {
            Ok(dataset) => {
                log::info!("Loaded {} records from {}", dataset.len(), path.display());
                if dataset.is_empty() {
                    log::warn!("{} has a header but no rows", path.display());
                }
                self.source = Some(path.to_path_buf());
                self.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load file: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Re-read the current file if it changed on disk.
    pub fn reload(&mut self) {
        if let Some(path) = self.source.clone() {
            self.open(&path);
        }
    }

    /// Drop the cached copy and parse the current file again.
    pub fn force_reload(&mut self) {
        if let Some(path) = self.source.clone() {
            self.cache.invalidate(&path);
            self.open(&path);
        }
    }

    /// Empty the dataset cache so every file is parsed again on next open.
    pub fn clear_cache(&mut self) {
        let dropped = self.cache.clear();
        log::info!("Cleared {dropped} cached dataset(s)");
        self.status_message = Some(format!("Cleared {dropped} cached dataset(s)"));
    }

    /// Ingest a newly loaded dataset and reset every filter.
    pub fn set_dataset(&mut self, dataset: Arc<Dataset>) {
        self.filters = FilterState::new(self.config.dimensions.iter().copied());
        self.dates.reset();
        self.dataset = Some(dataset);
        self.status_message = None;
        self.refilter();
    }

    /// Re-run cascade → date filter → aggregation from scratch.
    pub fn refilter(&mut self) {
        self.notices.clear();
        let Some(ds) = self.dataset.clone() else {
            return;
        };
        let records = &ds.records;

        self.resolution = self.filters.resolve(records);
        self.notices.extend(
            self.resolution
                .resets
                .iter()
                .map(|d| Notice::SelectionReset(*d)),
        );

        self.date_bounds = DateRange::bounds(records, &self.resolution.indices);
        let (range, invalid) = self.dates.effective(self.date_bounds);
        if let Some(err) = invalid {
            self.notices.push(Notice::InvalidRange(err));
        }
        self.applied_range = range;
        self.visible_indices = match range {
            Some(range) => filter_by_date(records, &self.resolution.indices, range),
            None => self.resolution.indices.clone(),
        };

        if self.visible_indices.is_empty() {
            self.notices.push(Notice::EmptyResult);
        }

        let view = FilteredView::new(records, &self.visible_indices);
        self.aggregates = Aggregates {
            kpis: aggregate::kpis(view),
            time_series: aggregate::time_series(view),
            ranking: aggregate::entity_ranking(view, self.entity, self.rank_measure, self.top_n),
            breakdown: aggregate::category_breakdown(
                view,
                self.breakdown_dimension,
                self.breakdown_measure,
            ),
            sales_by_state: aggregate::ranked_breakdown(view, Dimension::State, Measure::Sales),
            profit_by_sub_category: aggregate::ranked_breakdown(
                view,
                Dimension::SubCategory,
                Measure::Profit,
            ),
            heatmap: aggregate::order_heatmap(view),
        };
        log::debug!(
            "recomputed: {} of {} records visible",
            self.visible_indices.len(),
            records.len()
        );
    }

    /// Toggle a single value in a dimension's filter.
    pub fn toggle_filter_value(&mut self, dimension: Dimension, value: &str) {
        let options = self.resolution.options_for(dimension).to_vec();
        self.filters.toggle(dimension, value, &options);
        self.refilter();
    }

    /// Select all values in a dimension.
    pub fn select_all(&mut self, dimension: Dimension) {
        self.filters.select_all(dimension);
        self.refilter();
    }

    /// Deselect all values in a dimension.
    pub fn select_none(&mut self, dimension: Dimension) {
        self.filters.select_none(dimension);
        self.refilter();
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.dates.reset();
        self.refilter();
    }

    pub fn set_date_from(&mut self, from: NaiveDate) {
        self.dates.from = Some(from);
        self.refilter();
    }

    pub fn set_date_to(&mut self, to: NaiveDate) {
        self.dates.to = Some(to);
        self.refilter();
    }

    pub fn set_ranking(&mut self, entity: Dimension, measure: Measure, top_n: usize) {
        self.entity = entity;
        self.rank_measure = measure;
        self.top_n = top_n;
        self.refilter();
    }

    pub fn set_breakdown(&mut self, dimension: Dimension, measure: Measure) {
        self.breakdown_dimension = dimension;
        self.breakdown_measure = measure;
        self.refilter();
    }

    /// Write the visible records to `path` as CSV. The outcome is reported
    /// in `status_message`; `None` when no file was written.
    pub fn export_visible(&mut self, path: &Path) -> Option<usize> {
        let ds = self.dataset.as_ref()?;
        match export_csv(FilteredView::new(&ds.records, &self.visible_indices), path) {
            Ok(rows) => {
                self.status_message = Some(format!("Exported {rows} rows"));
                Some(rows)
            }
            Err(e) => {
                log::error!("Export failed: {e}");
                self.status_message = Some(format!("Export failed: {e}"));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use tempfile::TempDir;

    use super::*;
    use crate::data::filter::Selection;
    use crate::data::model::fixtures::{date, sample};

    fn loaded() -> AppState {
        let mut state = AppState::default();
        state.set_dataset(Arc::new(Dataset::from_records(sample())));
        state
    }

    #[test]
    fn dataset_starts_unfiltered() {
        let state = loaded();
        assert_eq!(state.visible_indices.len(), 6);
        assert_eq!(state.aggregates.kpis.total_sales, 460.0);
        assert!(state.notices.is_empty());
        assert_eq!(
            state.applied_range,
            Some(DateRange::new(date(2023, 1, 1), date(2023, 3, 5)).unwrap())
        );
    }

    #[test]
    fn default_dates_follow_the_cascaded_subset() {
        let mut state = loaded();
        state.toggle_filter_value(Dimension::Region, "East");
        state.toggle_filter_value(Dimension::Region, "Central");
        assert_eq!(state.visible_indices, vec![1, 4]);

        let west = DateRange::new(date(2023, 1, 2), date(2023, 2, 4)).unwrap();
        assert_eq!(state.date_bounds, Some(west));
        assert_eq!(state.applied_range, Some(west));
        assert!(state.notices.is_empty());
    }

    #[test]
    fn empty_subset_drops_date_bounds() {
        let mut state = loaded();
        state.set_date_from(date(2023, 1, 2));
        state.select_none(Dimension::Region);

        assert_eq!(state.date_bounds, None);
        assert_eq!(state.applied_range, None);
        assert!(state.visible_indices.is_empty());
        assert_eq!(state.notices, vec![Notice::EmptyResult]);
        assert_eq!(state.aggregates.kpis.total_sales, 0.0);
        assert!(state.aggregates.heatmap.is_empty());

        // Widening again applies the kept start date against the new bounds.
        state.select_all(Dimension::Region);
        assert_eq!(
            state.applied_range,
            Some(DateRange::new(date(2023, 1, 2), date(2023, 3, 5)).unwrap())
        );
        assert_eq!(state.visible_indices, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn clearing_the_cache_reports_dropped_entries() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("orders.csv");
        std::fs::write(
            &path,
            "Order Date,Region,State,Category,Sub-Category,Customer Name,Sales,Profit,Quantity
             2023-01-01,East,Ohio,Technology,Phones,Ann,10,1,1
",
        )
        .unwrap();

        let mut state = AppState::default();
        state.open(&path);
        assert_eq!(state.visible_indices.len(), 1);
        state.clear_cache();
        assert_eq!(state.status_message.as_deref(), Some("Cleared 1 cached dataset(s)"));
        // The loaded dataset stays on screen.
        assert_eq!(state.visible_indices.len(), 1);
    }

    #[test]
    fn toggling_region_recomputes_aggregates() {
        let mut state = loaded();
        state.toggle_filter_value(Dimension::Region, "West");
        state.toggle_filter_value(Dimension::Region, "Central");
        assert_eq!(state.visible_indices, vec![0, 2, 3]);
        assert_eq!(state.aggregates.kpis.total_sales, 180.0);
        assert_eq!(state.aggregates.breakdown.len(), 3);
    }

    #[test]
    fn inverted_dates_keep_previous_view_and_warn() {
        let mut state = loaded();
        state.set_date_to(date(2023, 1, 2));
        let before = state.visible_indices.clone();
        assert_eq!(before, vec![0, 1, 2]);

        state.set_date_from(date(2023, 2, 1));
        assert_eq!(state.visible_indices, before);
        assert!(matches!(state.notices.as_slice(), [Notice::InvalidRange(_)]));
    }

    #[test]
    fn stale_selection_surfaces_notice() {
        let mut state = loaded();
        state.filters.set(
            Dimension::State,
            Selection::Values(BTreeSet::from(["Oregon".to_string()])),
        );
        state.refilter();
        state.filters.set(
            Dimension::Region,
            Selection::Values(BTreeSet::from(["East".to_string()])),
        );
        state.refilter();
        assert!(state.notices.contains(&Notice::SelectionReset(Dimension::State)));
        assert_eq!(state.visible_indices, vec![0, 2, 3]);
    }

    #[test]
    fn empty_selection_is_a_notice_not_an_error() {
        let mut state = loaded();
        state.select_none(Dimension::Category);
        assert!(state.visible_indices.is_empty());
        assert_eq!(state.notices, vec![Notice::EmptyResult]);
        assert!(state.aggregates.time_series.is_empty());
    }

    #[test]
    fn failed_open_keeps_current_dataset() {
        let dir = TempDir::new().unwrap();
        let mut state = loaded();
        state.open(&dir.path().join("missing.csv"));
        assert!(state.status_message.as_deref().unwrap().starts_with("Error"));
        assert_eq!(state.visible_indices.len(), 6);
    }

    #[test]
    fn export_writes_visible_rows() {
        let dir = TempDir::new().unwrap();
        let mut state = loaded();
        state.toggle_filter_value(Dimension::Category, "Technology");
        let rows = state.export_visible(&dir.path().join("out.csv"));
        assert_eq!(rows, Some(3));
        assert_eq!(state.status_message.as_deref(), Some("Exported 3 rows"));

        let failed = state.export_visible(&dir.path().join("no-such-dir").join("out.csv"));
        assert_eq!(failed, None);
        assert!(state.status_message.as_deref().unwrap().starts_with("Export failed"));
    }
}
