use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeSet, HashMap};
use std::hash::{Hash, Hasher};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::Array;
use arrow::util::display::array_value_to_string;
use bytes::Bytes;
use chrono::{DateTime, NaiveDateTime, Utc};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{History, PlayEvent, RawPlay};
use crate::config::{DataSource, RemoteSource};
use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

const COL_TS: &str = "ts";
const COL_PLATFORM: &str = "platform";
const COL_MS_PLAYED: &str = "ms_played";
const COL_REASON_START: &str = "reason_start";
const COL_REASON_END: &str = "reason_end";
const COL_SKIPPED: &str = "skipped";
const COL_TRACK: &str = "master_metadata_track_name";
const COL_ARTIST: &str = "master_metadata_album_artist_name";
const COL_ALBUM: &str = "master_metadata_album_album_name";

// Positions within `REQUIRED_COLUMNS` / `RowText::cells`.
const I_TS: usize = 0;
const I_PLATFORM: usize = 1;
const I_MS_PLAYED: usize = 2;
const I_REASON_START: usize = 3;
const I_REASON_END: usize = 4;
const I_SKIPPED: usize = 5;
const I_TRACK: usize = 6;
const I_ARTIST: usize = 7;
const I_ALBUM: usize = 8;

/// Columns every export must carry, in [`RowText`] order.
const REQUIRED_COLUMNS: [&str; 9] = [
    COL_TS,
    COL_PLATFORM,
    COL_MS_PLAYED,
    COL_REASON_START,
    COL_REASON_END,
    COL_SKIPPED,
    COL_TRACK,
    COL_ARTIST,
    COL_ALBUM,
];

/// Privacy-sensitive or unused columns; never materialized.
pub const DROPPED_COLUMNS: [&str; 11] = [
    "username",
    "conn_country",
    "ip_addr_decrypted",
    "user_agent_decrypted",
    "Unnamed: 0",
    "episode_name",
    "episode_show_name",
    "spotify_episode_uri",
    "offline",
    "offline_timestamp",
    "incognito_mode",
];

/// Supported export encodings, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Csv,
    Json,
    Parquet,
}

impl Format {
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "csv" => Ok(Format::Csv),
            "json" => Ok(Format::Json),
            "parquet" | "pq" => Ok(Format::Parquet),
            other => Err(LoadError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Parsed rows before the history is assembled.
#[derive(Debug, Default)]
pub struct Parsed {
    pub events: Vec<PlayEvent>,
    pub dropped_columns: Vec<String>,
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Memoizes loaded histories by source content.
///
/// Loading the same bytes twice, from any source, returns the same `Arc`.
#[derive(Debug, Default)]
pub struct LoadCache {
    entries: HashMap<u64, Arc<History>>,
}

impl LoadCache {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Return the cached history for these bytes, or parse and remember it.
    pub fn get_or_parse(&mut self, bytes: Bytes, format: Format) -> Result<Arc<History>> {
        let id = fingerprint(&bytes);
        if let Some(history) = self.entries.get(&id) {
            log::info!("Reusing cached history {id:016x} ({} plays)", history.len());
            return Ok(Arc::clone(history));
        }
        let parsed = parse_bytes(bytes, format)?;
        let history = Arc::new(History::new(id, parsed.events, parsed.dropped_columns));
        self.entries.insert(id, Arc::clone(&history));
        Ok(history)
    }
}

/// Load a history from the configured source.
pub fn load_source(source: &DataSource, cache: &mut LoadCache) -> Result<Arc<History>> {
    match source {
        DataSource::Local(path) => load_file(path, cache),
        DataSource::Remote(remote) => load_remote(remote, cache),
    }
}

/// Load a history from a local file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – the raw export table
/// * `.json`    – extended-history export: `[{ "ts": ..., "ms_played": ..., ... }, ...]`
/// * `.parquet` – the same columns written by a dataframe library
pub fn load_file(path: &Path, cache: &mut LoadCache) -> Result<Arc<History>> {
    let format = Format::from_path(path)?;
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    cache
        .get_or_parse(Bytes::from(bytes), format)
        .with_context(|| format!("loading {}", path.display()))
}

/// Fetch the export from the remote store with basic auth.
pub fn load_remote(remote: &RemoteSource, cache: &mut LoadCache) -> Result<Arc<History>> {
    let format = Format::from_path(Path::new(&remote.path))?;
    let url = remote.url();

    let response = reqwest::blocking::Client::new()
        .get(&url)
        .basic_auth(&remote.user, Some(&remote.token))
        .send()
        .with_context(|| format!("requesting {url}"))?;

    let status = response.status();
    if !status.is_success() {
        return Err(LoadError::Remote {
            status: status.as_u16(),
            url,
        }
        .into());
    }

    let bytes = response
        .bytes()
        .with_context(|| format!("reading body of {url}"))?;
    cache
        .get_or_parse(bytes, format)
        .with_context(|| format!("loading {url}"))
}

/// Parse a complete export held in memory.
pub fn parse_bytes(bytes: Bytes, format: Format) -> Result<Parsed> {
    match format {
        Format::Csv => parse_csv(&bytes[..]),
        Format::Json => parse_json(&bytes[..]),
        Format::Parquet => parse_parquet(bytes),
    }
}

fn fingerprint(bytes: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    bytes.hash(&mut hasher);
    hasher.finish()
}

/// Drop-list entries present among `columns`, in drop-list order.
fn dropped_present<'a>(columns: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let present: Vec<&str> = columns.into_iter().collect();
    DROPPED_COLUMNS
        .iter()
        .filter(|c| present.contains(c))
        .map(|c| c.to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Row interpretation shared by every format
// ---------------------------------------------------------------------------

/// Text of the required cells of one row; `None` marks a null cell.
struct RowText<'a> {
    row: usize,
    cells: [Option<&'a str>; 9],
}

impl RowText<'_> {
    fn cell(&self, idx: usize) -> Option<&str> {
        self.cells[idx].filter(|s| !s.is_empty())
    }

    fn text(&self, idx: usize) -> Option<String> {
        self.cell(idx).map(str::to_string)
    }

    fn bad_value(&self, idx: usize, value: &str) -> LoadError {
        LoadError::BadValue {
            row: self.row,
            column: REQUIRED_COLUMNS[idx].to_string(),
            value: value.to_string(),
        }
    }

    fn into_play(self) -> Result<RawPlay, LoadError> {
        let ts_text = self.cell(I_TS).unwrap_or("");
        let ts = parse_timestamp(ts_text).ok_or_else(|| LoadError::BadTimestamp {
            row: self.row,
            value: ts_text.to_string(),
        })?;

        let ms_text = self.cell(I_MS_PLAYED).unwrap_or("");
        let ms_played = parse_ms(ms_text).ok_or_else(|| self.bad_value(I_MS_PLAYED, ms_text))?;

        let skipped = match self.cell(I_SKIPPED) {
            None => false,
            Some(text) => parse_flag(text).ok_or_else(|| self.bad_value(I_SKIPPED, text))?,
        };

        Ok(RawPlay {
            ts,
            platform: self.text(I_PLATFORM).unwrap_or_default(),
            ms_played,
            track: self.text(I_TRACK),
            artist: self.text(I_ARTIST),
            album: self.text(I_ALBUM),
            reason_start: self.text(I_REASON_START),
            reason_end: self.text(I_REASON_END),
            skipped,
        })
    }
}

/// Parse an export timestamp as UTC.
///
/// Accepts RFC 3339 (`2021-07-04T12:34:56Z`), an explicit offset with a
/// space separator (`2021-07-04 12:34:56+00:00`), and naive values which
/// are taken to be UTC.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn parse_ms(text: &str) -> Option<u64> {
    let text = text.trim();
    if let Ok(ms) = text.parse::<u64>() {
        return Some(ms);
    }
    // Dataframe round-trips turn integer columns with nulls into floats.
    let f = text.parse::<f64>().ok()?;
    (f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64).then_some(f as u64)
}

fn parse_flag(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "1.0" => Some(true),
        "false" | "0" | "0.0" => Some(false),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Parse a CSV export with a header row.
pub fn parse_csv<R: Read>(input: R) -> Result<Parsed> {
    let mut reader = csv::Reader::from_reader(input);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut indices = [0usize; 9];
    for (slot, column) in indices.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| LoadError::MissingColumn {
                column: column.to_string(),
            })?;
    }

    let mut events = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let row = RowText {
            row: row_no,
            cells: indices.map(|i| record.get(i)),
        };
        events.push(PlayEvent::from_raw(row.into_play()?));
    }

    Ok(Parsed {
        events,
        dropped_columns: dropped_present(headers.iter().map(String::as_str)),
    })
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Parse a records-oriented JSON export:
///
/// ```json
/// [
///   {
///     "ts": "2021-07-04T19:02:11Z",
///     "platform": "iOS 14.6 (iPhone12,1)",
///     "ms_played": 215000,
///     "master_metadata_track_name": "Song",
///     "skipped": null,
///     ...
///   }
/// ]
/// ```
pub fn parse_json<R: Read>(input: R) -> Result<Parsed> {
    let root: JsonValue = serde_json::from_reader(input).context("parsing JSON")?;
    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut events = Vec::with_capacity(records.len());
    // Records may omit optional keys, so the column set is their union.
    let mut keys: BTreeSet<&str> = BTreeSet::new();

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        keys.extend(obj.keys().map(String::as_str));

        let mut texts: [Option<String>; 9] = Default::default();
        for (slot, column) in texts.iter_mut().zip(REQUIRED_COLUMNS) {
            let value = obj.get(column).ok_or_else(|| LoadError::MissingColumn {
                column: column.to_string(),
            })?;
            *slot = json_to_text(value);
        }

        let row = RowText {
            row: i,
            cells: texts.each_ref().map(|t| t.as_deref()),
        };
        events.push(PlayEvent::from_raw(row.into_play()?));
    }

    Ok(Parsed {
        events,
        dropped_columns: dropped_present(keys),
    })
}

fn json_to_text(val: &JsonValue) -> Option<String> {
    match val {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Bool(b) => Some(b.to_string()),
        JsonValue::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Parse a Parquet export carrying the CSV column names.
///
/// Cells are rendered through Arrow's display formatter and then go through
/// the same text rules as CSV, so int/float/bool/timestamp columns written
/// by Pandas or Polars are all accepted.
fn parse_parquet(bytes: Bytes) -> Result<Parsed> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(bytes)
        .context("reading parquet metadata")?;
    let schema = Arc::clone(builder.schema());

    // Checked against the file schema so that a file without row groups
    // still fails on a missing column.
    let mut indices = [0usize; 9];
    for (slot, column) in indices.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = schema.index_of(column).map_err(|_| LoadError::MissingColumn {
            column: column.to_string(),
        })?;
    }
    let dropped = dropped_present(schema.fields().iter().map(|f| f.name().as_str()));
    let reader = builder.build().context("building parquet reader")?;

    let mut events = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let columns: Vec<_> = indices.iter().map(|&i| Arc::clone(batch.column(i))).collect();

        for row in 0..batch.num_rows() {
            let row_no = events.len();
            let mut texts: [Option<String>; 9] = Default::default();
            for (slot, col) in texts.iter_mut().zip(&columns) {
                if !col.is_null(row) {
                    let text = array_value_to_string(&**col, row)
                        .with_context(|| format!("Row {row_no}: formatting parquet cell"))?;
                    *slot = Some(text);
                }
            }
            let text_row = RowText {
                row: row_no,
                cells: texts.each_ref().map(|t| t.as_deref()),
            };
            events.push(PlayEvent::from_raw(text_row.into_play()?));
        }
    }

    Ok(Parsed {
        events,
        dropped_columns: dropped,
    })
}

#[cfg(test)]
mod tests {
    use arrow::array::{
        ArrayRef, BooleanArray, Float64Array, StringArray, TimestampMillisecondArray,
    };
    use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;

    const HEADER: &str = "Unnamed: 0,ts,username,platform,ms_played,conn_country,\
ip_addr_decrypted,user_agent_decrypted,master_metadata_track_name,\
master_metadata_album_artist_name,master_metadata_album_album_name,\
reason_start,reason_end,skipped,offline,incognito_mode";

    fn csv_with(rows: &[&str]) -> String {
        let mut text = String::from(HEADER);
        for row in rows {
            text.push('\n');
            text.push_str(row);
        }
        text
    }

    #[test]
    fn csv_rows_are_parsed_and_localized() {
        let text = csv_with(&[
            "0,2021-07-05T03:30:00Z,me,\"iOS 14.6 (iPhone12,1)\",215000,US,1.2.3.4,ua,Song,Band,Record,clickrow,trackdone,False,False,False",
            "1,2021-07-05 04:00:00,me,Windows 10,1000.0,US,1.2.3.4,ua,,,,trackdone,fwdbtn,True,False,False",
        ]);
        let parsed = parse_csv(text.as_bytes()).unwrap();
        assert_eq!(parsed.events.len(), 2);

        let first = &parsed.events[0];
        assert_eq!((first.year(), first.month(), first.day(), first.hour()), (2021, 7, 4, 20));
        assert_eq!(first.ms_played(), 215_000);
        assert_eq!(first.artist(), Some("Band"));
        assert_eq!(first.device().label(), "Mobile");
        assert!(!first.skipped());

        let second = &parsed.events[1];
        assert_eq!(second.track(), None);
        assert_eq!(second.ms_played(), 1_000);
        assert!(second.skipped());
        assert_eq!(second.device().label(), "Desktop/Laptop");
    }

    #[test]
    fn dropped_columns_are_reported() {
        let parsed = parse_csv(csv_with(&[]).as_bytes()).unwrap();
        assert!(parsed.events.is_empty());
        for col in ["Unnamed: 0", "username", "conn_country", "offline", "incognito_mode"] {
            assert!(parsed.dropped_columns.iter().any(|c| c == col), "{col}");
        }
        assert!(!parsed.dropped_columns.iter().any(|c| c == "platform"));
    }

    #[test]
    fn missing_column_is_fatal() {
        let text = "ts,platform,ms_played\n2021-01-01T00:00:00Z,x,1";
        let err = parse_csv(text.as_bytes()).unwrap_err();
        let load = err.downcast_ref::<LoadError>().expect("typed error");
        assert!(matches!(load, LoadError::MissingColumn { column } if column == "reason_start"));
    }

    #[test]
    fn unparsable_timestamp_is_fatal() {
        let text = csv_with(&[
            "0,yesterday,me,Windows 10,1,US,ip,ua,Song,Band,Record,clickrow,trackdone,False,False,False",
        ]);
        let err = parse_csv(text.as_bytes()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LoadError>(),
            Some(LoadError::BadTimestamp { row: 0, .. })
        ));
    }

    #[test]
    fn negative_ms_played_is_rejected() {
        let text = csv_with(&[
            "0,2021-01-01T00:00:00Z,me,Windows 10,-5,US,ip,ua,Song,Band,Record,clickrow,trackdone,False,False,False",
        ]);
        let err = parse_csv(text.as_bytes()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LoadError>(),
            Some(LoadError::BadValue { column, .. }) if column == "ms_played"
        ));
    }

    #[test]
    fn json_export_is_parsed() {
        let text = r#"[
            {"ts": "2020-12-31T23:59:59Z", "username": "me", "platform": "Android OS 10",
             "ms_played": 42, "master_metadata_track_name": null,
             "master_metadata_album_artist_name": null, "master_metadata_album_album_name": null,
             "reason_start": "appload", "reason_end": null, "skipped": null,
             "episode_name": "Pod"}
        ]"#;
        let parsed = parse_json(text.as_bytes()).unwrap();
        assert_eq!(parsed.events.len(), 1);
        let ev = &parsed.events[0];
        assert_eq!(ev.year(), 2020);
        assert_eq!(ev.artist(), None);
        assert_eq!(ev.reason_end(), None);
        assert!(!ev.skipped());
        assert_eq!(parsed.dropped_columns, vec!["username", "episode_name"]);
    }

    #[test]
    fn json_record_without_required_key_is_fatal() {
        let text = r#"[{"ts": "2020-12-31T23:59:59Z"}]"#;
        let err = parse_json(text.as_bytes()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LoadError>(),
            Some(LoadError::MissingColumn { .. })
        ));
    }

    #[test]
    fn timestamp_variants() {
        let expected = parse_timestamp("2021-07-04T12:00:00Z").unwrap();
        assert_eq!(parse_timestamp("2021-07-04 12:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2021-07-04 12:00:00+00:00"), Some(expected));
        assert_eq!(parse_timestamp("2021-07-04T05:00:00-07:00"), Some(expected));
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(Format::from_path(Path::new("a/raw.CSV")).unwrap(), Format::Csv);
        assert_eq!(Format::from_path(Path::new("end.json")).unwrap(), Format::Json);
        assert_eq!(Format::from_path(Path::new("x.pq")).unwrap(), Format::Parquet);
        assert!(matches!(
            Format::from_path(Path::new("x.xlsx")),
            Err(LoadError::UnsupportedFormat(ext)) if ext == "xlsx"
        ));
    }

    #[test]
    fn cache_returns_same_history_for_same_content() {
        let text = csv_with(&[
            "0,2021-07-05T03:30:00Z,me,Windows 10,1,US,ip,ua,Song,Band,Record,clickrow,trackdone,False,False,False",
        ]);
        let mut cache = LoadCache::default();
        let a = cache.get_or_parse(Bytes::from(text.clone()), Format::Csv).unwrap();
        let b = cache.get_or_parse(Bytes::from(text), Format::Csv).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);

        let other = csv_with(&[]);
        let c = cache.get_or_parse(Bytes::from(other), Format::Csv).unwrap();
        assert_ne!(a.id, c.id);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn json_dropped_columns_cover_every_record() {
        let text = r#"[
            {"ts": "2020-01-01T12:00:00Z", "platform": "Linux", "ms_played": 1,
             "master_metadata_track_name": "T", "master_metadata_album_artist_name": "A",
             "master_metadata_album_album_name": "B", "reason_start": "clickrow",
             "reason_end": "trackdone", "skipped": false},
            {"ts": "2020-01-02T12:00:00Z", "platform": "Linux", "ms_played": 2,
             "master_metadata_track_name": "T", "master_metadata_album_artist_name": "A",
             "master_metadata_album_album_name": "B", "reason_start": "clickrow",
             "reason_end": "trackdone", "skipped": false, "offline": true}
        ]"#;
        let parsed = parse_json(text.as_bytes()).unwrap();
        assert_eq!(parsed.dropped_columns, vec!["offline"]);
    }

    #[test]
    fn largest_ms_played_loads_and_totals_saturate() {
        let text = csv_with(&[
            "0,2021-07-05T03:30:00Z,me,Windows 10,18446744073709551615,US,ip,ua,Song,Band,Record,clickrow,trackdone,False,False,False",
            "1,2021-07-05T03:40:00Z,me,Windows 10,1,US,ip,ua,Song,Band,Record,clickrow,trackdone,False,False,False",
        ]);
        let parsed = parse_csv(text.as_bytes()).unwrap();
        assert_eq!(parsed.events[0].ms_played(), u64::MAX);
        let totals = crate::data::aggregate::overview(&parsed.events);
        assert_eq!(totals.plays, 2);
        assert_eq!(totals.ms_played, u64::MAX);
    }

    fn parquet_bytes(batch: &RecordBatch) -> Bytes {
        let mut buf = Vec::new();
        let mut writer = ArrowWriter::try_new(&mut buf, batch.schema(), None).unwrap();
        writer.write(batch).unwrap();
        writer.close().unwrap();
        Bytes::from(buf)
    }

    #[test]
    fn parquet_export_is_parsed() {
        let text = |name: &str| Field::new(name, DataType::Utf8, true);
        let schema = Arc::new(Schema::new(vec![
            Field::new(
                COL_TS,
                DataType::Timestamp(TimeUnit::Millisecond, Some("+00:00".into())),
                false,
            ),
            text("username"),
            text(COL_PLATFORM),
            Field::new(COL_MS_PLAYED, DataType::Float64, false),
            text(COL_TRACK),
            text(COL_ARTIST),
            text(COL_ALBUM),
            text(COL_REASON_START),
            text(COL_REASON_END),
            Field::new(COL_SKIPPED, DataType::Boolean, true),
        ]));
        // 2021-07-05T03:30:00Z and 2022-01-01T05:00:00Z
        let ts = TimestampMillisecondArray::from(vec![1_625_455_800_000, 1_641_013_200_000])
            .with_timezone("+00:00");
        let columns: Vec<ArrayRef> = vec![
            Arc::new(ts),
            Arc::new(StringArray::from(vec![Some("me"), Some("me")])),
            Arc::new(StringArray::from(vec![Some("iOS 14.6"), Some("Windows 10")])),
            Arc::new(Float64Array::from(vec![1234.0, 5.0])),
            Arc::new(StringArray::from(vec![Some("Song"), None])),
            Arc::new(StringArray::from(vec![Some("Band"), None])),
            Arc::new(StringArray::from(vec![Some("Record"), None])),
            Arc::new(StringArray::from(vec![Some("clickrow"), Some("appload")])),
            Arc::new(StringArray::from(vec![Some("trackdone"), None])),
            Arc::new(BooleanArray::from(vec![Some(true), None])),
        ];
        let batch = RecordBatch::try_new(schema, columns).unwrap();

        let parsed = parse_bytes(parquet_bytes(&batch), Format::Parquet).unwrap();
        assert_eq!(parsed.events.len(), 2);
        assert_eq!(parsed.dropped_columns, vec!["username"]);

        let first = &parsed.events[0];
        assert_eq!((first.year(), first.month(), first.day(), first.hour()), (2021, 7, 4, 20));
        assert_eq!(first.ms_played(), 1234);
        assert_eq!(first.artist(), Some("Band"));
        assert_eq!(first.device().label(), "Mobile");
        assert!(first.skipped());

        let second = &parsed.events[1];
        assert_eq!(second.year(), 2021);
        assert_eq!((second.track(), second.artist(), second.album()), (None, None, None));
        assert_eq!(second.reason_end(), None);
        assert!(!second.skipped());
    }

    #[test]
    fn parquet_without_rows_still_needs_columns() {
        let schema = Arc::new(Schema::new(vec![Field::new("foo", DataType::Utf8, true)]));
        let batch = RecordBatch::new_empty(schema);
        let err = parse_bytes(parquet_bytes(&batch), Format::Parquet).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LoadError>(),
            Some(LoadError::MissingColumn { column }) if column == "ts"
        ));
    }
}
