use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::DataSource;
use crate::data::aggregate::{Category, Entity, Granularity};
use crate::data::cache::{Aggregate, AggregateCache, Query};
use crate::data::duration::{format_duration, format_duration_legacy};
use crate::data::filter::{filtered_indices, FilterState, YearRange};
use crate::data::loader::{self, LoadCache};
use crate::data::model::History;

/// Rows shown in each top-played table.
pub const DEFAULT_TOP_N: usize = 5;
/// Rows shown in the most-skipped table.
pub const TOP_SKIPPED_N: usize = 50;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded history (None until a source loads successfully).
    pub history: Option<Arc<History>>,

    /// Where the current history came from, for the status bar.
    pub source_label: Option<String>,

    /// Year range and artist selection.
    pub filters: FilterState,

    /// Indices of plays passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// Bucket size of the played-time chart.
    pub granularity: Granularity,

    /// Rows per top-played table.
    pub top_n: usize,

    /// Render durations with the older zero-stripping formatter.
    pub legacy_durations: bool,

    /// Text typed into the artist search box.
    pub artist_query: String,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    load_cache: LoadCache,
    aggregates: AggregateCache,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            history: None,
            source_label: None,
            filters: FilterState::default(),
            visible_indices: Vec::new(),
            granularity: Granularity::Month,
            top_n: DEFAULT_TOP_N,
            legacy_durations: false,
            artist_query: String::new(),
            status_message: None,
            load_cache: LoadCache::default(),
            aggregates: AggregateCache::default(),
        }
    }
}

impl AppState {
    /// Load from `source`, surfacing failures in the status line.
    ///
    /// A failed load keeps whatever history was already shown.
    pub fn load(&mut self, source: &DataSource) {
        match loader::load_source(source, &mut self.load_cache) {
            Ok(history) => {
                log::info!(
                    "Loaded {} plays from {} (dropped columns {:?}, {} sources cached)",
                    history.len(),
                    source.describe(),
                    history.dropped_columns,
                    self.load_cache.len()
                );
                if history.is_empty() {
                    log::warn!("{} contains no plays", source.describe());
                }
                self.set_history(history, source.describe());
            }
            Err(e) => {
                log::error!("Failed to load {}: {e:#}", source.describe());
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Forget cached sources and load `source` again from scratch.
    pub fn reload(&mut self, source: &DataSource) {
        self.load_cache.clear();
        self.load(source);
    }

    /// Install a newly loaded history and reset filters.
    pub fn set_history(&mut self, history: Arc<History>, source_label: String) {
        let replaced = self
            .history
            .as_ref()
            .map_or(true, |current| current.id != history.id);
        if replaced {
            self.aggregates.invalidate();
            self.filters = FilterState::default();
        }
        self.visible_indices = filtered_indices(&history, &self.filters);
        self.history = Some(history);
        self.source_label = Some(source_label);
        self.status_message = None;
    }

    /// Recompute `visible_indices` after a filter change.
    pub fn refilter(&mut self) {
        if let Some(history) = &self.history {
            let before = self.visible_indices.len();
            self.visible_indices = filtered_indices(history, &self.filters);
            if before != self.visible_indices.len() {
                log::info!(
                    "Filters now match {} of {} plays",
                    self.visible_indices.len(),
                    history.len()
                );
            }
            let (hits, misses) = self.aggregates.stats();
            log::debug!(
                "{} cached aggregates ({hits} hits, {misses} misses)",
                self.aggregates.len()
            );
        }
    }

    pub fn set_year_range(&mut self, years: Option<YearRange>) {
        if self.filters.years != years {
            self.filters.years = years;
            self.refilter();
        }
    }

    /// Add or remove one artist from the selection.
    pub fn toggle_artist(&mut self, artist: &str) {
        if !self.filters.artists.remove(artist) {
            self.filters.artists.insert(artist.to_string());
        }
        self.refilter();
    }

    pub fn clear_artists(&mut self) {
        if !self.filters.artists.is_empty() {
            self.filters.artists.clear();
            self.refilter();
        }
    }

    /// Run `query` over the visible plays, reusing a cached result when the
    /// history and filters are unchanged.
    pub fn table(&mut self, query: Query) -> Option<Arc<Aggregate>> {
        let history = self.history.as_ref()?;
        let indices = &self.visible_indices;
        Some(
            self.aggregates
                .get_or_compute(query, history.id, &self.filters, || {
                    query.run(indices.iter().map(|&i| &history.events[i]))
                }),
        )
    }

    /// Every table on the dashboard, with its display title.
    pub fn dashboard_queries(&self) -> Vec<(String, Query)> {
        let mut queries = vec![("Overview".to_string(), Query::Overview)];
        queries.extend(
            Category::ALL
                .iter()
                .map(|&c| (c.label().to_string(), Query::Counts(c))),
        );
        queries.push((
            format!("Played time by {}", self.granularity.label().to_lowercase()),
            Query::PlayedTime(self.granularity),
        ));
        queries.push(("Played time by hour".to_string(), Query::ByHour));
        queries.extend(
            Entity::ALL
                .iter()
                .map(|&e| (format!("Top {}", e.label().to_lowercase()), Query::Top(e, self.top_n))),
        );
        queries.push(("Most skipped".to_string(), Query::TopSkipped(TOP_SKIPPED_N)));
        queries.push(("Artist summary".to_string(), Query::ArtistSummary));
        queries
    }

    /// Write every dashboard table for the current filters as JSON.
    pub fn export_tables(&mut self, path: &Path) -> Result<()> {
        let mut tables: BTreeMap<String, Aggregate> = BTreeMap::new();
        for (title, query) in self.dashboard_queries() {
            if let Some(table) = self.table(query) {
                tables.insert(title, Aggregate::clone(&table));
            }
        }
        let file = std::fs::File::create(path)
            .with_context(|| format!("creating {}", path.display()))?;
        serde_json::to_writer_pretty(file, &tables)
            .with_context(|| format!("writing {}", path.display()))?;
        log::info!("Exported {} tables to {}", tables.len(), path.display());
        Ok(())
    }

    /// Render a millisecond count with the active duration formatter.
    pub fn format_ms(&self, ms: u64) -> String {
        if self.legacy_durations {
            format_duration_legacy(ms)
        } else {
            format_duration(ms)
        }
    }
}
