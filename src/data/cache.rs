use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use super::aggregate::{
    self, ArtistSummaryRow, Category, CountRow, Entity, Granularity, HourRow, Overview, PeriodRow,
    SkipRow, TopRow,
};
use super::filter::FilterState;
use super::model::PlayEvent;

// ---------------------------------------------------------------------------
// Query – one aggregate request
// ---------------------------------------------------------------------------

/// An aggregate request, including its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Query {
    Counts(Category),
    PlayedTime(Granularity),
    ByHour,
    Top(Entity, usize),
    TopSkipped(usize),
    ArtistSummary,
    Overview,
}

/// Result of running a [`Query`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "rows", rename_all = "snake_case")]
pub enum Aggregate {
    Counts(Vec<CountRow>),
    PlayedTime(Vec<PeriodRow>),
    ByHour(Vec<HourRow>),
    Top(Vec<TopRow>),
    TopSkipped(Vec<SkipRow>),
    ArtistSummary(Vec<ArtistSummaryRow>),
    Overview(Overview),
}

impl Query {
    pub fn run<'a, I>(self, events: I) -> Aggregate
    where
        I: IntoIterator<Item = &'a PlayEvent>,
    {
        match self {
            Query::Counts(category) => Aggregate::Counts(aggregate::count_by(events, category)),
            Query::PlayedTime(g) => Aggregate::PlayedTime(aggregate::played_time(events, g)),
            Query::ByHour => Aggregate::ByHour(aggregate::played_by_hour(events)),
            Query::Top(entity, n) => Aggregate::Top(aggregate::top_played(events, entity, n)),
            Query::TopSkipped(n) => Aggregate::TopSkipped(aggregate::top_skipped(events, n)),
            Query::ArtistSummary => Aggregate::ArtistSummary(aggregate::artist_summary(events)),
            Query::Overview => Aggregate::Overview(aggregate::overview(events)),
        }
    }
}

// ---------------------------------------------------------------------------
// AggregateCache
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    query: Query,
    history_id: u64,
    filters: FilterState,
}

/// Memoized aggregates keyed by (query, history identity, filters).
///
/// Entries never expire on their own; call [`AggregateCache::invalidate`]
/// when the underlying history is replaced.
#[derive(Debug, Default)]
pub struct AggregateCache {
    entries: HashMap<CacheKey, Arc<Aggregate>>,
    hits: u64,
    misses: u64,
}

impl AggregateCache {
    pub fn get_or_compute<F>(
        &mut self,
        query: Query,
        history_id: u64,
        filters: &FilterState,
        compute: F,
    ) -> Arc<Aggregate>
    where
        F: FnOnce() -> Aggregate,
    {
        let key = CacheKey {
            query,
            history_id,
            filters: filters.clone(),
        };
        if let Some(hit) = self.entries.get(&key) {
            self.hits += 1;
            log::debug!("aggregate cache hit: {query:?} on {history_id:016x}");
            return Arc::clone(hit);
        }
        self.misses += 1;
        log::debug!("aggregate cache miss: {query:?} on {history_id:016x}");
        let value = Arc::new(compute());
        self.entries.insert(key, Arc::clone(&value));
        value
    }

    pub fn invalidate(&mut self) {
        log::debug!(
            "invalidating {} cached aggregates ({} hits, {} misses)",
            self.entries.len(),
            self.hits,
            self.misses
        );
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// (hits, misses) since creation.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}
