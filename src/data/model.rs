use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Datelike, Timelike, Utc};
use chrono_tz::Tz;

/// Zone every timestamp is localized into before calendar fields are derived.
pub const TARGET_TZ: Tz = chrono_tz::America::Los_Angeles;

// ---------------------------------------------------------------------------
// DeviceClass – coarse platform bucket
// ---------------------------------------------------------------------------

/// Binary device classification derived from the platform string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DeviceClass {
    Mobile,
    DesktopLaptop,
}

impl DeviceClass {
    /// `Mobile` when the platform names a mobile OS, otherwise `DesktopLaptop`.
    /// There is no "unknown" bucket: empty platforms are desktop too.
    pub fn classify(platform: &str) -> Self {
        if platform.contains("iOS") || platform.to_ascii_lowercase().contains("android") {
            DeviceClass::Mobile
        } else {
            DeviceClass::DesktopLaptop
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DeviceClass::Mobile => "Mobile",
            DeviceClass::DesktopLaptop => "Desktop/Laptop",
        }
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// PlayEvent – one row of the export
// ---------------------------------------------------------------------------

/// Source columns of one play, as they come out of the export.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPlay {
    pub ts: DateTime<Utc>,
    pub platform: String,
    pub ms_played: u64,
    pub track: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub reason_start: Option<String>,
    pub reason_end: Option<String>,
    pub skipped: bool,
}

/// A single play with its derived calendar fields and device class.
///
/// Derived fields are computed once in [`PlayEvent::from_raw`] and only
/// exposed through getters, so they cannot drift from `ts` / `platform`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayEvent {
    raw: RawPlay,
    local: DateTime<Tz>,
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    device: DeviceClass,
}

impl PlayEvent {
    pub fn from_raw(raw: RawPlay) -> Self {
        let local = raw.ts.with_timezone(&TARGET_TZ);
        let device = DeviceClass::classify(&raw.platform);
        PlayEvent {
            year: local.year(),
            month: local.month(),
            day: local.day(),
            hour: local.hour(),
            local,
            device,
            raw,
        }
    }

    pub fn local_ts(&self) -> DateTime<Tz> {
        self.local
    }
    pub fn year(&self) -> i32 {
        self.year
    }
    pub fn month(&self) -> u32 {
        self.month
    }
    pub fn day(&self) -> u32 {
        self.day
    }
    pub fn hour(&self) -> u32 {
        self.hour
    }
    pub fn device(&self) -> DeviceClass {
        self.device
    }
    pub fn platform(&self) -> &str {
        &self.raw.platform
    }
    pub fn ms_played(&self) -> u64 {
        self.raw.ms_played
    }
    pub fn track(&self) -> Option<&str> {
        self.raw.track.as_deref()
    }
    pub fn artist(&self) -> Option<&str> {
        self.raw.artist.as_deref()
    }
    pub fn album(&self) -> Option<&str> {
        self.raw.album.as_deref()
    }
    pub fn reason_start(&self) -> Option<&str> {
        self.raw.reason_start.as_deref()
    }
    pub fn reason_end(&self) -> Option<&str> {
        self.raw.reason_end.as_deref()
    }
    pub fn skipped(&self) -> bool {
        self.raw.skipped
    }
}

// ---------------------------------------------------------------------------
// History – the complete loaded export
// ---------------------------------------------------------------------------

/// The immutable event set plus indices used by the filter widgets.
#[derive(Debug, Clone)]
pub struct History {
    /// Fingerprint of the source bytes; identifies the table in caches.
    pub id: u64,
    pub events: Vec<PlayEvent>,
    /// Privacy/irrelevant columns that were present in the source and skipped.
    pub dropped_columns: Vec<String>,
    /// Sorted distinct artist names.
    pub artists: BTreeSet<String>,
    /// Inclusive (first, last) localized year, `None` for an empty export.
    pub year_span: Option<(i32, i32)>,
}

impl History {
    pub fn new(id: u64, events: Vec<PlayEvent>, dropped_columns: Vec<String>) -> Self {
        let artists = events
            .iter()
            .filter_map(|e| e.artist().map(str::to_string))
            .collect();
        let year_span = events
            .iter()
            .map(PlayEvent::year)
            .fold(None::<(i32, i32)>, |span, y| {
                Some(match span {
                    None => (y, y),
                    Some((lo, hi)) => (lo.min(y), hi.max(y)),
                })
            });
        History {
            id,
            events,
            dropped_columns,
            artists,
            year_span,
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn calendar_fields_follow_target_zone() {
        // 2021-07-05 03:30 UTC is 2021-07-04 20:30 in Los Angeles (PDT).
        let ev = play("2021-07-05T03:30:00Z", Some("A"), 10);
        assert_eq!((ev.year(), ev.month(), ev.day(), ev.hour()), (2021, 7, 4, 20));
    }

    #[test]
    fn new_year_rolls_back_in_target_zone() {
        let ev = play("2022-01-01T05:00:00Z", Some("A"), 10);
        assert_eq!(ev.year(), 2021);
        assert_eq!(ev.month(), 12);
        assert_eq!(ev.day(), 31);
    }

    #[test]
    fn device_classification() {
        assert_eq!(
            DeviceClass::classify("Android OS 9 API 28 (samsung, SM-G960U)"),
            DeviceClass::Mobile
        );
        assert_eq!(DeviceClass::classify("iOS 14.4 (iPhone12,1)"), DeviceClass::Mobile);
        assert_eq!(DeviceClass::classify("android"), DeviceClass::Mobile);
        assert_eq!(
            DeviceClass::classify("Windows 10 (10.0.19042; x64)"),
            DeviceClass::DesktopLaptop
        );
        assert_eq!(DeviceClass::classify(""), DeviceClass::DesktopLaptop);
        assert_eq!(DeviceClass::DesktopLaptop.to_string(), "Desktop/Laptop");
    }

    #[test]
    fn history_indexes_artists_and_years() {
        let mut raw = raw_at(2019, 6, 1);
        raw.artist = None;
        let events = vec![
            PlayEvent::from_raw(raw_at(2021, 3, 1)),
            PlayEvent::from_raw(raw),
            PlayEvent::from_raw(raw_at(2020, 3, 1)),
        ];
        let history = History::new(7, events, vec![]);
        assert_eq!(history.year_span, Some((2019, 2021)));
        assert_eq!(history.artists.len(), 1);
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn empty_history_has_no_year_span() {
        let history = History::new(0, Vec::new(), vec![]);
        assert!(history.is_empty());
        assert_eq!(history.year_span, None);
    }
}
