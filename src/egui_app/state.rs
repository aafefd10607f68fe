//! Shared state types for the egui UI.

use std::collections::HashMap;

use egui::Color32;

/// UI-only state next to the workflow record: status bar and plot cache.
#[derive(Default)]
pub struct UiState {
    pub status: StatusBarState,
    /// Name of the most recently picked file, shown under the upload prompt.
    pub picked_file: Option<String>,
    pub plots: PlotCache,
}

/// Status badge + text shown in the footer.
#[derive(Clone, Debug, PartialEq)]
pub struct StatusBarState {
    pub text: String,
    pub badge_label: String,
    pub badge_color: Color32,
}

impl Default for StatusBarState {
    fn default() -> Self {
        let (badge_label, badge_color) = status_badge(StatusTone::Idle);
        Self {
            text: "Upload a CSV dataset to get started".into(),
            badge_label,
            badge_color,
        }
    }
}

/// Tone of the current status message.
#[derive(Clone, Copy, Debug)]
pub enum StatusTone {
    Idle,
    Busy,
    Info,
    Error,
}

pub(crate) fn status_badge(tone: StatusTone) -> (String, Color32) {
    match tone {
        StatusTone::Idle => ("Idle".into(), Color32::from_rgb(42, 42, 42)),
        StatusTone::Busy => ("Working".into(), Color32::from_rgb(31, 139, 255)),
        StatusTone::Info => ("Info".into(), Color32::from_rgb(64, 140, 112)),
        StatusTone::Error => ("Error".into(), Color32::from_rgb(192, 57, 43)),
    }
}

/// Fetched plot images keyed by their raw (unresolved) URL.
#[derive(Default)]
pub struct PlotCache {
    pub images: HashMap<String, PlotImageState>,
}

impl PlotCache {
    pub fn clear(&mut self) {
        self.images.clear();
    }
}

/// Lifecycle of one plot image.
pub enum PlotImageState {
    Loading,
    Failed(String),
    Ready(egui::ColorImage),
}
