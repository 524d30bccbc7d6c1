use dioxus::logger::tracing::{error, info, warn};
use dioxus::prelude::*;
use trackview_shared::labels::LabelToggles;

use crate::api::{self, LoadState};
use crate::components::chart_view::ChartView;
use crate::components::toggle_panel::TogglePanel;
use crate::coords;

const CONFIG_MISSING_MESSAGE: &str =
    "No track file list is configured. Set TRACKS_DIR on the server to a directory of track files.";
const NO_FILES_MESSAGE: &str = "No track files found.";

#[component]
pub fn Viewer() -> Element {
    // Query-string toggles apply before the first chart is drawn.
    let toggles = use_signal(|| {
        let toggles = LabelToggles::from_query(&coords::page_query());
        if toggles != LabelToggles::default() {
            info!(?toggles, "Initial toggles from page URL");
        }
        toggles
    });

    let tracks = use_resource(|| async {
        let state = api::load_tracks().await;
        match &state {
            LoadState::Loaded(tracks) => info!(charts = tracks.len(), "Loaded track data"),
            LoadState::Failed(e) => error!("{e}"),
            LoadState::ConfigMissing => warn!("Track file list is not configured"),
            LoadState::NoFiles => info!("No track files to show"),
        }
        state
    });

    let body = match &*tracks.read() {
        None => rsx! { div { class: "status", "Loading track data..." } },
        Some(LoadState::ConfigMissing) => rsx! { div { class: "status error", "{CONFIG_MISSING_MESSAGE}" } },
        Some(LoadState::NoFiles) => rsx! { div { class: "status", "{NO_FILES_MESSAGE}" } },
        Some(LoadState::Failed(message)) => rsx! { div { class: "status error", "{message}" } },
        Some(LoadState::Loaded(loaded)) => rsx! {
            div { class: "charts",
                for (i, track) in loaded.iter().enumerate() {
                    ChartView {
                        key: "{track.file_name}",
                        track: track.clone(),
                        chart_index: i,
                        toggles,
                    }
                }
            }
        },
    };

    rsx! {
        div { class: "app",
            div { class: "header",
                h1 { "Trajectory Viewer" }
                TogglePanel { toggles }
            }
            {body}
        }
    }
}
