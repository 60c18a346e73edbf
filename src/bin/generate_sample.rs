use anyhow::{Context, Result};
use chrono::{Duration, TimeZone, Utc};
use serde::Serialize;

/// One row of the export, including the privacy columns the dashboard drops.
#[derive(Debug, Serialize)]
struct ExportRow {
    ts: String,
    username: &'static str,
    platform: &'static str,
    ms_played: u64,
    conn_country: &'static str,
    ip_addr_decrypted: &'static str,
    user_agent_decrypted: &'static str,
    master_metadata_track_name: Option<String>,
    master_metadata_album_artist_name: Option<&'static str>,
    master_metadata_album_album_name: Option<String>,
    spotify_track_uri: Option<String>,
    episode_name: Option<&'static str>,
    episode_show_name: Option<&'static str>,
    spotify_episode_uri: Option<&'static str>,
    reason_start: &'static str,
    reason_end: &'static str,
    shuffle: bool,
    skipped: bool,
    offline: bool,
    offline_timestamp: i64,
    incognito_mode: bool,
}

/// Linear congruential generator; reproducible output for a fixed seed.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next() % n
    }

    fn pick<T: Copy>(&mut self, items: &[T]) -> T {
        items[self.below(items.len() as u64) as usize]
    }

    fn chance(&mut self, percent: u64) -> bool {
        self.below(100) < percent
    }
}

const ARTISTS: [&str; 8] = [
    "The Night Owls",
    "Marisol Vega",
    "Copper Lanterns",
    "DJ Parallax",
    "Hollow Pines",
    "Aster & Finch",
    "Kiyoshi Mori",
    "Velvet Static",
];
const PLATFORMS: [&str; 5] = [
    "Android OS 11 API 30 (Google, Pixel 5)",
    "iOS 15.4 (iPhone13,2)",
    "OS X 12.3.1 [arm 2]",
    "Windows 10 (10.0.19044; x64)",
    "web_player linux ;chrome 101.0",
];
const REASONS_START: [&str; 5] = ["trackdone", "clickrow", "fwdbtn", "backbtn", "playbtn"];
const REASONS_END: [&str; 5] = ["trackdone", "fwdbtn", "endplay", "logout", "backbtn"];

fn main() -> Result<()> {
    let mut rng = Lcg(42);
    let start = Utc
        .with_ymd_and_hms(2019, 1, 1, 0, 0, 0)
        .single()
        .context("invalid start date")?;
    let span_secs = 4 * 365 * 24 * 3600;

    let mut rows = Vec::new();
    for _ in 0..5_000 {
        let ts = start + Duration::seconds(rng.below(span_secs) as i64);
        let podcast = rng.chance(4);
        let skipped = !podcast && rng.chance(15);

        let (track, artist, album, uri) = if podcast {
            (None, None, None, None)
        } else {
            let artist = rng.pick(&ARTISTS);
            let album_no = rng.below(3) + 1;
            let track_no = rng.below(10) + 1;
            (
                Some(format!("Song {track_no} ({album_no})")),
                Some(artist),
                Some(format!("{artist} Vol. {album_no}")),
                Some(format!("spotify:track:{:022x}", rng.next())),
            )
        };

        rows.push(ExportRow {
            ts: ts.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            username: "sample-user",
            platform: rng.pick(&PLATFORMS),
            ms_played: if skipped {
                rng.below(30_000)
            } else {
                60_000 + rng.below(240_000)
            },
            conn_country: "US",
            ip_addr_decrypted: "203.0.113.7",
            user_agent_decrypted: "unknown",
            master_metadata_track_name: track,
            master_metadata_album_artist_name: artist,
            master_metadata_album_album_name: album,
            spotify_track_uri: uri,
            episode_name: podcast.then_some("Episode 12"),
            episode_show_name: podcast.then_some("Weekly Signal"),
            spotify_episode_uri: podcast.then_some("spotify:episode:0000000000000000000001"),
            reason_start: rng.pick(&REASONS_START),
            reason_end: if skipped { "fwdbtn" } else { rng.pick(&REASONS_END) },
            shuffle: rng.chance(50),
            skipped,
            offline: false,
            offline_timestamp: ts.timestamp(),
            incognito_mode: false,
        });
    }
    rows.sort_by(|a, b| a.ts.cmp(&b.ts));

    let csv_path = "raw.csv";
    let mut writer = csv::Writer::from_path(csv_path).context("creating raw.csv")?;
    for row in &rows {
        writer.serialize(row).context("writing CSV row")?;
    }
    writer.flush().context("flushing raw.csv")?;

    let json_path = "raw.json";
    let file = std::fs::File::create(json_path).context("creating raw.json")?;
    serde_json::to_writer(file, &rows).context("writing raw.json")?;

    println!("Wrote {} plays to {csv_path} and {json_path}", rows.len());
    Ok(())
}
