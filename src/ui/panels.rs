use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::config::DataSource;
use crate::data::aggregate::Granularity;
use crate::data::filter::YearRange;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let Some(history) = state.history.clone() else {
        ui.label("No history loaded.");
        return;
    };

    // ---- Year range ----
    if let Some((first, last)) = history.year_span {
        ui.strong("Years");
        let mut range = state.filters.years.unwrap_or(YearRange::new(first, last));
        ui.add(egui::Slider::new(&mut range.start, first..=last).text("from"));
        ui.add(egui::Slider::new(&mut range.end, first..=last).text("to"));
        let range = YearRange::new(range.start, range.end);

        let everything = range == YearRange::new(first, last);
        state.set_year_range((!everything).then_some(range));

        if range.start == range.end {
            ui.label(
                RichText::new(format!("Single year: includes plays up to Dec 30, {}", range.end + 1))
                    .small()
                    .weak(),
            );
        }
        ui.separator();
    }

    // ---- Played-time granularity ----
    ui.strong("Played time by");
    ui.horizontal(|ui: &mut Ui| {
        for g in Granularity::ALL {
            ui.selectable_value(&mut state.granularity, g, g.label());
        }
    });
    ui.add(egui::Slider::new(&mut state.top_n, 1..=25).text("top N"));
    ui.separator();

    // ---- Artist selection ----
    let n_selected = state.filters.artists.len();
    let n_total = history.artists.len();
    ui.horizontal(|ui: &mut Ui| {
        ui.strong(format!("Artists  ({n_selected}/{n_total})"));
        if ui.small_button("Clear").clicked() {
            state.clear_artists();
        }
    });
    ui.add(egui::TextEdit::singleline(&mut state.artist_query).hint_text("search…"));

    let needle = state.artist_query.to_lowercase();
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for artist in history
                .artists
                .iter()
                .filter(|a| needle.is_empty() || a.to_lowercase().contains(&needle))
            {
                let mut checked = state.filters.artists.contains(artist);
                if ui.checkbox(&mut checked, artist.as_str()).changed() {
                    state.toggle_artist(artist);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState, source: &mut Option<DataSource>) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state, source);
                ui.close_menu();
            }
            if ui
                .add_enabled(source.is_some(), egui::Button::new("Reload"))
                .clicked()
            {
                if let Some(src) = source.as_ref() {
                    state.reload(src);
                }
                ui.close_menu();
            }
            if ui
                .add_enabled(state.history.is_some(), egui::Button::new("Export tables…"))
                .clicked()
            {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(history) = &state.history {
            ui.label(format!(
                "{} plays loaded, {} visible",
                history.len(),
                state.visible_indices.len()
            ));
            if let Some(label) = &state.source_label {
                ui.label(RichText::new(label).weak());
            }
        }

        ui.separator();

        if ui
            .selectable_label(state.legacy_durations, "Legacy durations")
            .clicked()
        {
            state.legacy_durations = !state.legacy_durations;
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState, source: &mut Option<DataSource>) {
    let file = rfd::FileDialog::new()
        .set_title("Open streaming history")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        let picked = DataSource::Local(path);
        state.load(&picked);
        if state.status_message.is_none() {
            *source = Some(picked);
        }
    }
}

fn export_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export dashboard tables")
        .add_filter("JSON", &["json"])
        .set_file_name("dashboard.json")
        .save_file();

    if let Some(path) = file {
        if let Err(e) = state.export_tables(&path) {
            log::error!("Export failed: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
