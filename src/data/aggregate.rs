//! Tables derived from a set of plays. Play-time sums saturate at
//! `u64::MAX` instead of overflowing.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use super::model::PlayEvent;

// ---------------------------------------------------------------------------
// Category counts (reason / platform / device)
// ---------------------------------------------------------------------------

/// Categorical column a count table is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    ReasonStart,
    ReasonEnd,
    Platform,
    Device,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::ReasonStart,
        Category::ReasonEnd,
        Category::Platform,
        Category::Device,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::ReasonStart => "Reason started",
            Category::ReasonEnd => "Reason ended",
            Category::Platform => "Platform",
            Category::Device => "Device",
        }
    }

    fn value(self, event: &PlayEvent) -> Option<&str> {
        match self {
            Category::ReasonStart => event.reason_start(),
            Category::ReasonEnd => event.reason_end(),
            Category::Platform => Some(event.platform()),
            Category::Device => Some(event.device().label()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountRow {
    pub key: String,
    pub count: usize,
}

/// One row per distinct value of `category` with its play count.
///
/// Plays with no value for the category are left out. Rows come back in key
/// order.
pub fn count_by<'a, I>(events: I, category: Category) -> Vec<CountRow>
where
    I: IntoIterator<Item = &'a PlayEvent>,
{
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for ev in events {
        if let Some(value) = category.value(ev) {
            *counts.entry(value).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .map(|(key, count)| CountRow {
            key: key.to_string(),
            count,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Played time by calendar period
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Granularity {
    Year,
    Month,
    Day,
}

impl Granularity {
    pub const ALL: [Granularity; 3] = [Granularity::Year, Granularity::Month, Granularity::Day];

    pub fn label(self) -> &'static str {
        match self {
            Granularity::Year => "Year",
            Granularity::Month => "Month",
            Granularity::Day => "Day",
        }
    }
}

/// Calendar bucket; finer fields are `None` above their granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PeriodKey {
    pub year: i32,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

impl PeriodKey {
    fn of(event: &PlayEvent, granularity: Granularity) -> Self {
        let (month, day) = match granularity {
            Granularity::Year => (None, None),
            Granularity::Month => (Some(event.month()), None),
            Granularity::Day => (Some(event.month()), Some(event.day())),
        };
        PeriodKey {
            year: event.year(),
            month,
            day,
        }
    }
}

/// Hyphen-joined fields without zero padding, e.g. `2021-7-4`.
impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.year)?;
        if let Some(m) = self.month {
            write!(f, "-{m}")?;
        }
        if let Some(d) = self.day {
            write!(f, "-{d}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodRow {
    pub key: PeriodKey,
    pub label: String,
    pub ms_played: u64,
}

/// Summed play time per period, ordered chronologically by the key tuple
/// rather than by the label text.
pub fn played_time<'a, I>(events: I, granularity: Granularity) -> Vec<PeriodRow>
where
    I: IntoIterator<Item = &'a PlayEvent>,
{
    let mut sums: BTreeMap<PeriodKey, u64> = BTreeMap::new();
    for ev in events {
        let sum = sums.entry(PeriodKey::of(ev, granularity)).or_default();
        *sum = sum.saturating_add(ev.ms_played());
    }
    sums.into_iter()
        .map(|(key, ms_played)| PeriodRow {
            label: key.to_string(),
            key,
            ms_played,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HourRow {
    pub hour: u32,
    pub ms_played: u64,
}

/// Summed play time per local hour of day, hours with no plays omitted.
pub fn played_by_hour<'a, I>(events: I) -> Vec<HourRow>
where
    I: IntoIterator<Item = &'a PlayEvent>,
{
    let mut sums: BTreeMap<u32, u64> = BTreeMap::new();
    for ev in events {
        let sum = sums.entry(ev.hour()).or_default();
        *sum = sum.saturating_add(ev.ms_played());
    }
    sums.into_iter()
        .map(|(hour, ms_played)| HourRow { hour, ms_played })
        .collect()
}

// ---------------------------------------------------------------------------
// Top-N maxima
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Artist,
    Album,
    Track,
}

impl Entity {
    pub const ALL: [Entity; 3] = [Entity::Artist, Entity::Album, Entity::Track];

    pub fn label(self) -> &'static str {
        match self {
            Entity::Artist => "Artists",
            Entity::Album => "Albums",
            Entity::Track => "Tracks",
        }
    }

    /// Grouping key. Albums and tracks are qualified by artist so that
    /// same-named works by different artists stay apart.
    fn key<'a>(self, event: &'a PlayEvent) -> Option<(&'a str, Option<&'a str>)> {
        match self {
            Entity::Artist => Some((event.artist()?, None)),
            Entity::Album => Some((event.album()?, Some(event.artist()?))),
            Entity::Track => Some((event.track()?, Some(event.artist()?))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopRow {
    pub name: String,
    /// Qualifying artist for albums and tracks.
    pub artist: Option<String>,
    pub ms_played: u64,
}

/// Sort grouped measures descending; equal measures keep ascending key order.
fn rank_desc<K: Ord, V: Ord + Copy>(groups: BTreeMap<K, V>, n: usize) -> Vec<(K, V)> {
    let mut ranked: Vec<(K, V)> = groups.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(n);
    ranked
}

/// The `n` entities with the most summed play time.
pub fn top_played<'a, I>(events: I, entity: Entity, n: usize) -> Vec<TopRow>
where
    I: IntoIterator<Item = &'a PlayEvent>,
{
    let mut sums: BTreeMap<(&str, Option<&str>), u64> = BTreeMap::new();
    for ev in events {
        if let Some(key) = entity.key(ev) {
            let sum = sums.entry(key).or_default();
            *sum = sum.saturating_add(ev.ms_played());
        }
    }
    rank_desc(sums, n)
        .into_iter()
        .map(|((name, artist), ms_played)| TopRow {
            name: name.to_string(),
            artist: artist.map(str::to_string),
            ms_played,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Skips and per-artist summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkipRow {
    pub track: String,
    pub artist: String,
    pub skips: usize,
}

/// The `n` (track, artist) pairs skipped most often.
pub fn top_skipped<'a, I>(events: I, n: usize) -> Vec<SkipRow>
where
    I: IntoIterator<Item = &'a PlayEvent>,
{
    let mut counts: BTreeMap<(&str, &str), usize> = BTreeMap::new();
    for ev in events.into_iter().filter(|ev| ev.skipped()) {
        if let (Some(track), Some(artist)) = (ev.track(), ev.artist()) {
            *counts.entry((track, artist)).or_default() += 1;
        }
    }
    rank_desc(counts, n)
        .into_iter()
        .map(|((track, artist), skips)| SkipRow {
            track: track.to_string(),
            artist: artist.to_string(),
            skips,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistSummaryRow {
    pub artist: String,
    pub distinct_tracks: usize,
    pub distinct_albums: usize,
    pub ms_played: u64,
}

#[derive(Default)]
struct ArtistAccumulator<'a> {
    tracks: BTreeSet<&'a str>,
    albums: BTreeSet<&'a str>,
    ms_played: u64,
}

/// Distinct tracks, distinct albums and summed play time per artist,
/// reduced in one pass so the three measures always share a key.
/// Ordered by play time descending, then artist name.
pub fn artist_summary<'a, I>(events: I) -> Vec<ArtistSummaryRow>
where
    I: IntoIterator<Item = &'a PlayEvent>,
{
    let mut groups: BTreeMap<&str, ArtistAccumulator<'_>> = BTreeMap::new();
    for ev in events {
        let Some(artist) = ev.artist() else {
            continue;
        };
        let acc = groups.entry(artist).or_default();
        acc.tracks.extend(ev.track());
        acc.albums.extend(ev.album());
        acc.ms_played = acc.ms_played.saturating_add(ev.ms_played());
    }

    let mut rows: Vec<ArtistSummaryRow> = groups
        .into_iter()
        .map(|(artist, acc)| ArtistSummaryRow {
            artist: artist.to_string(),
            distinct_tracks: acc.tracks.len(),
            distinct_albums: acc.albums.len(),
            ms_played: acc.ms_played,
        })
        .collect();
    rows.sort_by(|a, b| b.ms_played.cmp(&a.ms_played));
    rows
}

// ---------------------------------------------------------------------------
// Overview
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Overview {
    pub plays: usize,
    pub ms_played: u64,
}

pub fn overview<'a, I>(events: I) -> Overview
where
    I: IntoIterator<Item = &'a PlayEvent>,
{
    events.into_iter().fold(Overview::default(), |acc, ev| Overview {
        plays: acc.plays + 1,
        ms_played: acc.ms_played.saturating_add(ev.ms_played()),
    })
}
