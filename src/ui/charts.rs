use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, Legend, Plot};

use crate::color::ColorMap;
use crate::data::aggregate::{Category, CountRow, Entity};
use crate::data::cache::{Aggregate, Query};
use crate::data::model::PlayEvent;
use crate::state::{AppState, TOP_SKIPPED_N};

const CHART_HEIGHT: f32 = 220.0;
const MS_PER_HOUR: f64 = 3_600_000.0;

// ---------------------------------------------------------------------------
// Dashboard (central panel)
// ---------------------------------------------------------------------------

/// Render every chart and table for the visible plays.
pub fn dashboard(ui: &mut Ui, state: &mut AppState) {
    if state.history.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a streaming history to begin  (File → Open…)");
        });
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            overview(ui, state);
            ui.separator();

            ui.columns(2, |cols| {
                for (i, category) in Category::ALL.into_iter().enumerate() {
                    count_chart(&mut cols[i % 2], state, category);
                }
            });
            ui.separator();

            played_time_chart(ui, state);
            hourly_chart(ui, state);
            ui.separator();

            for entity in Entity::ALL {
                top_table(ui, state, entity);
            }
            skipped_table(ui, state);
            artist_summary_table(ui, state);
            ui.separator();

            plays_table(ui, state);
        });
}

fn overview(ui: &mut Ui, state: &mut AppState) {
    if let Some(Aggregate::Overview(o)) = state.table(Query::Overview).as_deref() {
        ui.horizontal(|ui: &mut Ui| {
            ui.heading(state.format_ms(o.ms_played));
            ui.label(RichText::new(format!("across {} plays", o.plays)).weak());
        });
    }
}

// ---------------------------------------------------------------------------
// Bar charts
// ---------------------------------------------------------------------------

fn count_chart(ui: &mut Ui, state: &mut AppState, category: Category) {
    let Some(table) = state.table(Query::Counts(category)) else {
        return;
    };
    let Aggregate::Counts(rows) = table.as_ref() else {
        return;
    };

    ui.strong(category.label());
    let colors = ColorMap::new(rows.iter().map(|r| r.key.as_str()));
    Plot::new(("count_chart", category.label()))
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .show_x(false)
        .allow_scroll(false)
        .y_axis_label("plays")
        .show(ui, |plot_ui| {
            for chart in count_bars(rows, &colors) {
                plot_ui.bar_chart(chart);
            }
        });
}

/// One single-bar chart per category so each value gets a legend entry.
fn count_bars(rows: &[CountRow], colors: &ColorMap) -> Vec<BarChart> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            let color = colors.color_for(&row.key);
            let bar = Bar::new(i as f64, row.count as f64)
                .name(&row.key)
                .fill(color)
                .width(0.7);
            BarChart::new(vec![bar]).name(&row.key).color(color)
        })
        .collect()
}

fn played_time_chart(ui: &mut Ui, state: &mut AppState) {
    let granularity = state.granularity;
    let Some(table) = state.table(Query::PlayedTime(granularity)) else {
        return;
    };
    let Aggregate::PlayedTime(rows) = table.as_ref() else {
        return;
    };

    ui.strong(format!("Hours played by {}", granularity.label().to_lowercase()));
    let bars: Vec<Bar> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            Bar::new(i as f64, row.ms_played as f64 / MS_PER_HOUR)
                .name(&row.label)
                .width(0.9)
        })
        .collect();
    Plot::new("played_time_chart")
        .height(CHART_HEIGHT)
        .allow_scroll(false)
        .y_axis_label("hours")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(Color32::LIGHT_GREEN));
        });
}

fn hourly_chart(ui: &mut Ui, state: &mut AppState) {
    let Some(table) = state.table(Query::ByHour) else {
        return;
    };
    let Aggregate::ByHour(rows) = table.as_ref() else {
        return;
    };

    ui.strong("Hours played by hour of day");
    let bars: Vec<Bar> = rows
        .iter()
        .map(|row| {
            Bar::new(row.hour as f64, row.ms_played as f64 / MS_PER_HOUR)
                .name(format!("{:02}:00", row.hour))
                .width(0.8)
        })
        .collect();
    Plot::new("hourly_chart")
        .height(CHART_HEIGHT)
        .allow_scroll(false)
        .x_axis_label("hour")
        .y_axis_label("hours")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(Color32::LIGHT_BLUE));
        });
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

fn top_table(ui: &mut Ui, state: &mut AppState, entity: Entity) {
    let n = state.top_n;
    let Some(table) = state.table(Query::Top(entity, n)) else {
        return;
    };
    let Aggregate::Top(rows) = table.as_ref() else {
        return;
    };

    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            let mut cells = vec![r.name.clone()];
            if entity != Entity::Artist {
                cells.push(r.artist.clone().unwrap_or_default());
            }
            cells.push(state.format_ms(r.ms_played));
            cells
        })
        .collect();
    let headers: &[&str] = match entity {
        Entity::Artist => &["Artist", "Played"],
        Entity::Album => &["Album", "Artist", "Played"],
        Entity::Track => &["Track", "Artist", "Played"],
    };
    text_table(ui, &format!("Top {}", entity.label().to_lowercase()), headers, &body);
}

fn skipped_table(ui: &mut Ui, state: &mut AppState) {
    let Some(table) = state.table(Query::TopSkipped(TOP_SKIPPED_N)) else {
        return;
    };
    let Aggregate::TopSkipped(rows) = table.as_ref() else {
        return;
    };
    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|r| vec![r.track.clone(), r.artist.clone(), r.skips.to_string()])
        .collect();
    text_table(ui, "Most skipped", &["Track", "Artist", "Skips"], &body);
}

fn artist_summary_table(ui: &mut Ui, state: &mut AppState) {
    let Some(table) = state.table(Query::ArtistSummary) else {
        return;
    };
    let Aggregate::ArtistSummary(rows) = table.as_ref() else {
        return;
    };
    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            vec![
                r.artist.clone(),
                r.distinct_tracks.to_string(),
                r.distinct_albums.to_string(),
                state.format_ms(r.ms_played),
            ]
        })
        .collect();
    text_table(
        ui,
        "Artist summary",
        &["Artist", "Tracks", "Albums", "Played"],
        &body,
    );
}

/// Collapsible striped table of pre-rendered cells.
fn text_table(ui: &mut Ui, title: &str, headers: &[&str], rows: &[Vec<String>]) {
    egui::CollapsingHeader::new(RichText::new(format!("{title}  ({})", rows.len())).strong())
        .id_salt(title)
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            if rows.is_empty() {
                ui.label(RichText::new("No plays match the current filters.").weak());
                return;
            }
            ui.push_id(title, |ui: &mut Ui| {
                let mut builder = TableBuilder::new(ui)
                    .striped(true)
                    .max_scroll_height(320.0)
                    .column(Column::remainder().at_least(160.0));
                for _ in 1..headers.len() {
                    builder = builder.column(Column::auto().at_least(80.0));
                }
                builder
                    .header(20.0, |mut header| {
                        for h in headers {
                            header.col(|ui: &mut Ui| {
                                ui.strong(*h);
                            });
                        }
                    })
                    .body(|mut body| {
                        for row in rows {
                            body.row(18.0, |mut table_row| {
                                for cell in row {
                                    table_row.col(|ui: &mut Ui| {
                                        ui.label(cell);
                                    });
                                }
                            });
                        }
                    });
            });
        });
}

// ---------------------------------------------------------------------------
// Raw plays
// ---------------------------------------------------------------------------

const PLAY_COLUMNS: [&str; 14] = [
    "Time",
    "Year",
    "Month",
    "Day",
    "Hour",
    "Platform",
    "Device",
    "Artist",
    "Album",
    "Track",
    "ms played",
    "Reason started",
    "Reason ended",
    "Skipped",
];

/// Display cells of one play; years are printed without digit grouping.
fn play_cells(ev: &PlayEvent) -> [String; PLAY_COLUMNS.len()] {
    let text = |v: Option<&str>| v.unwrap_or_default().to_string();
    [
        ev.local_ts().format("%Y-%m-%d %H:%M:%S %Z").to_string(),
        ev.year().to_string(),
        ev.month().to_string(),
        ev.day().to_string(),
        ev.hour().to_string(),
        ev.platform().to_string(),
        ev.device().to_string(),
        text(ev.artist()),
        text(ev.album()),
        text(ev.track()),
        ev.ms_played().to_string(),
        text(ev.reason_start()),
        text(ev.reason_end()),
        ev.skipped().to_string(),
    ]
}

/// Every visible play, one virtualized row each.
fn plays_table(ui: &mut Ui, state: &AppState) {
    let Some(history) = state.history.as_deref() else {
        return;
    };
    let indices = &state.visible_indices;

    egui::CollapsingHeader::new(RichText::new(format!("Plays  ({})", indices.len())).strong())
        .id_salt("plays")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            if indices.is_empty() {
                ui.label(RichText::new("No plays match the current filters.").weak());
                return;
            }
            ui.push_id("plays", |ui: &mut Ui| {
                let mut builder = TableBuilder::new(ui)
                    .striped(true)
                    .max_scroll_height(400.0)
                    .column(Column::auto().at_least(150.0));
                for _ in 1..PLAY_COLUMNS.len() {
                    builder = builder.column(Column::auto().at_least(40.0).resizable(true));
                }
                builder
                    .header(20.0, |mut header| {
                        for h in PLAY_COLUMNS {
                            header.col(|ui: &mut Ui| {
                                ui.strong(h);
                            });
                        }
                    })
                    .body(|body| {
                        body.rows(18.0, indices.len(), |mut table_row| {
                            let ev = &history.events[indices[table_row.index()]];
                            for cell in play_cells(ev) {
                                table_row.col(|ui: &mut Ui| {
                                    ui.label(cell);
                                });
                            }
                        });
                    });
            });
        });
}
