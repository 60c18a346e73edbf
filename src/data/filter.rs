use std::collections::BTreeSet;

use chrono::{DateTime, TimeZone};
use chrono_tz::Tz;

use super::model::{History, PlayEvent, TARGET_TZ};

// ---------------------------------------------------------------------------
// Year range
// ---------------------------------------------------------------------------

/// Inclusive range of calendar years in the target zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    /// Build a range; reversed arguments are swapped.
    pub fn new(start: i32, end: i32) -> Self {
        YearRange {
            start: start.min(end),
            end: start.max(end),
        }
    }

    /// Inclusive instant boundaries of the range.
    ///
    /// The start is Jan 1 00:00:00 of `start`. The end is Dec 31 23:59:59 of
    /// `end`, except for a single-year range, where it is widened to
    /// Dec 30 00:00:00 of the *following* year. The widened bound matches
    /// the behavior of the dashboard when its slider collapses to one year.
    pub fn bounds(&self) -> Option<(DateTime<Tz>, DateTime<Tz>)> {
        let lower = local_instant(self.start, 1, 1, 0, 0, 0)?;
        let upper = if self.start == self.end {
            local_instant(self.end.checked_add(1)?, 12, 30, 0, 0, 0)?
        } else {
            local_instant(self.end, 12, 31, 23, 59, 59)?
        };
        Some((lower, upper))
    }
}

fn local_instant(
    year: i32,
    month: u32,
    day: u32,
    h: u32,
    m: u32,
    s: u32,
) -> Option<DateTime<Tz>> {
    TARGET_TZ
        .with_ymd_and_hms(year, month, day, h, m, s)
        .earliest()
}

// ---------------------------------------------------------------------------
// Filter predicate: year range plus artist selection
// ---------------------------------------------------------------------------

/// Active filters.  The default filters nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FilterState {
    /// `None` → every year.
    pub years: Option<YearRange>,
    /// Empty → every artist (including plays with no artist metadata).
    pub artists: BTreeSet<String>,
}

impl FilterState {
    /// Whether a play passes both filters.
    pub fn matches(&self, event: &PlayEvent, bounds: Option<(DateTime<Tz>, DateTime<Tz>)>) -> bool {
        if self.years.is_some() {
            let Some((lower, upper)) = bounds else {
                return false;
            };
            let ts = event.local_ts();
            if ts < lower || ts > upper {
                return false;
            }
        }
        artist_matches(&self.artists, event)
    }
}

/// Exact-string artist membership; an empty selection lets everything through.
pub fn artist_matches(selected: &BTreeSet<String>, event: &PlayEvent) -> bool {
    if selected.is_empty() {
        return true;
    }
    event.artist().is_some_and(|a| selected.contains(a))
}

/// Return indices of plays that pass all active filters, in load order.
pub fn filtered_indices(history: &History, filters: &FilterState) -> Vec<usize> {
    let bounds = filters.years.and_then(|r| r.bounds());
    history
        .events
        .iter()
        .enumerate()
        .filter(|(_, ev)| filters.matches(ev, bounds))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::fixtures::play;

    fn history(events: Vec<PlayEvent>) -> History {
        History::new(1, events, vec![])
    }

    fn by_year(years: YearRange) -> FilterState {
        FilterState {
            years: Some(years),
            ..Default::default()
        }
    }

    #[test]
    fn default_filter_keeps_everything() {
        let h = history(vec![
            play("2020-05-01T12:00:00Z", Some("A"), 1),
            play("2021-05-01T12:00:00Z", None, 1),
        ]);
        assert_eq!(filtered_indices(&h, &FilterState::default()), vec![0, 1]);
    }

    #[test]
    fn multi_year_range_is_inclusive_in_target_zone() {
        let h = history(vec![
            // 2019-12-31 23:30 local: outside.
            play("2020-01-01T07:30:00Z", Some("A"), 1),
            // 2020-01-01 00:00 local: first included instant.
            play("2020-01-01T08:00:00Z", Some("A"), 1),
            // 2021-12-31 23:59:59 local: last included instant.
            play("2022-01-01T07:59:59Z", Some("A"), 1),
            // 2022-01-01 00:00 local: outside.
            play("2022-01-01T08:00:00Z", Some("A"), 1),
        ]);
        let idx = filtered_indices(&h, &by_year(YearRange::new(2020, 2021)));
        assert_eq!(idx, vec![1, 2]);
    }

    #[test]
    fn single_year_range_widens_to_dec_30_of_next_year() {
        let h = history(vec![
            play("2020-06-01T12:00:00Z", Some("A"), 1),
            // 2021-07-01 local: a year later, still kept by the widened bound.
            play("2021-07-01T12:00:00Z", Some("A"), 1),
            // 2021-12-30 00:00:00 local (PST, UTC-8): boundary, kept.
            play("2021-12-30T08:00:00Z", Some("A"), 1),
            // 2021-12-30 12:00 local: past the bound.
            play("2021-12-30T20:00:00Z", Some("A"), 1),
            // 2019-12-31 local: before the range.
            play("2020-01-01T07:00:00Z", Some("A"), 1),
        ]);
        let idx = filtered_indices(&h, &by_year(YearRange::new(2020, 2020)));
        assert_eq!(idx, vec![0, 1, 2]);
    }

    #[test]
    fn reversed_range_is_normalized() {
        assert_eq!(YearRange::new(2022, 2019), YearRange::new(2019, 2022));
    }

    #[test]
    fn empty_artist_set_is_identity() {
        assert!(artist_matches(&BTreeSet::new(), &play("2020-01-01T00:00:00Z", None, 1)));
    }

    #[test]
    fn artist_filter_is_exact_match() {
        let h = history(vec![
            play("2020-05-01T12:00:00Z", Some("Band"), 1),
            play("2020-05-01T12:00:00Z", Some("band"), 1),
            play("2020-05-01T12:00:00Z", Some("Other"), 1),
            play("2020-05-01T12:00:00Z", None, 1),
        ]);
        let filters = FilterState {
            artists: ["Band".to_string()].into(),
            ..Default::default()
        };
        assert_eq!(filtered_indices(&h, &filters), vec![0]);
    }

    #[test]
    fn selecting_every_artist_is_identity() {
        let h = history(vec![
            play("2020-05-01T12:00:00Z", Some("A"), 1),
            play("2020-06-01T12:00:00Z", Some("B"), 2),
            play("2021-05-01T12:00:00Z", Some("C"), 3),
            play("2021-05-02T12:00:00Z", Some("A"), 4),
        ]);
        let filters = FilterState {
            artists: h.artists.clone(),
            ..Default::default()
        };
        assert_eq!(
            filtered_indices(&h, &filters),
            filtered_indices(&h, &FilterState::default())
        );
    }

    #[test]
    fn unmatched_artist_yields_empty_selection() {
        let h = history(vec![play("2020-05-01T12:00:00Z", Some("A"), 1)]);
        let filters = FilterState {
            artists: ["Nobody".to_string()].into(),
            ..Default::default()
        };
        assert!(filtered_indices(&h, &filters).is_empty());
    }
}
