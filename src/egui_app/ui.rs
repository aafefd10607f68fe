//! egui renderer for the guided analysis workflow.

use std::collections::HashMap;

use eframe::egui::{
    self, Color32, Grid, ProgressBar, RichText, ScrollArea, Spinner, TextureHandle,
    TextureOptions, Ui, Vec2,
};

use crate::config::AppConfig;
use crate::egui_app::controller::WorkflowController;
use crate::egui_app::state::PlotImageState;
use crate::report::{
    AiInsightsSection, FeatureTypesSection, MissingValuesBody, MissingValuesSection, PlotsSection,
    Section, TopFeaturesSection,
};
use crate::workflow::{AnalysisMode, DatasetSummary, WorkflowStep};

/// Smallest window the layout still works in.
pub const MIN_VIEWPORT_SIZE: Vec2 = Vec2::new(760.0, 520.0);

/// Pipeline stages shown as hints while an analysis runs; the backend offers
/// no progress channel.
const PIPELINE_HINTS: [&str; 6] = [
    "Saving dataset...",
    "Handling missing values...",
    "Separating categorical and numerical columns...",
    "Analyzing correlations between features and target...",
    "Generating easy-to-understand insights and visualizations...",
    "Done! Insights ready",
];

/// Renders the egui UI using the shared controller state.
pub struct EguiApp {
    controller: WorkflowController,
    textures: HashMap<String, TextureHandle>,
    visuals_set: bool,
}

impl EguiApp {
    /// Create the app with a backend client built from the configuration.
    pub fn new(config: &AppConfig) -> Result<Self, String> {
        let controller = WorkflowController::new(config)
            .map_err(|err| format!("Failed to set up backend client: {err}"))?;
        Ok(Self {
            controller,
            textures: HashMap::new(),
            visuals_set: false,
        })
    }

    fn apply_visuals(&mut self, ctx: &egui::Context) {
        if self.visuals_set {
            return;
        }
        ctx.set_visuals(egui::Visuals::dark());
        self.visuals_set = true;
    }

    fn render_step_indicator(&mut self, ctx: &egui::Context) {
        let current = self.controller.state().step();
        egui::TopBottomPanel::top("step_indicator").show(ctx, |ui| {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                for step in [
                    WorkflowStep::Upload,
                    WorkflowStep::SelectTarget,
                    WorkflowStep::SelectMode,
                ] {
                    let done = current.ordinal() > step.ordinal();
                    let active = current == step;
                    let marker = if done {
                        "✔".to_string()
                    } else {
                        step.ordinal().to_string()
                    };
                    let color = if active || done {
                        Color32::from_rgb(122, 132, 255)
                    } else {
                        Color32::GRAY
                    };
                    ui.label(RichText::new(format!("{marker} {}", step.title())).color(color));
                    if step != WorkflowStep::SelectMode {
                        ui.label(RichText::new("→").weak());
                    }
                }
            });
            ui.add_space(6.0);
        });
    }

    fn render_status(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            let status = &self.controller.ui.status;
            ui.horizontal(|ui| {
                ui.add_space(8.0);
                ui.painter().circle_filled(
                    ui.cursor().min + egui::vec2(9.0, 11.0),
                    6.0,
                    status.badge_color,
                );
                ui.add_space(18.0);
                ui.label(RichText::new(&status.badge_label).strong());
                ui.separator();
                ui.label(&status.text);
            });
        });
    }

    fn render_upload(&mut self, ui: &mut Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(40.0);
            ui.heading("Upload Your Dataset");
            ui.label(RichText::new("CSV only. Your data stays on the backend you configure.").weak());
            ui.add_space(16.0);
            if ui.button("Choose CSV file...").clicked() {
                self.controller.pick_file_via_dialog();
            }
            if let Some(name) = self.controller.ui.picked_file.clone() {
                ui.add_space(8.0);
                ui.label(RichText::new(format!("Selected: {name}")).weak());
            }
            self.render_error(ui);
        });
    }

    fn render_target_select(&mut self, ui: &mut Ui) {
        let Some(dataset) = self.controller.state().dataset().cloned() else {
            return;
        };
        ui.heading("Choose Target Variable");
        ui.label(RichText::new("Pick the column to analyze or predict against.").weak());
        ui.add_space(8.0);
        ui.horizontal(|ui| {
            ui.label(format!("Rows: {}", stat_text(dataset.row_count)));
            ui.separator();
            ui.label(format!("Columns: {}", dataset.column_count()));
        });
        ui.add_space(8.0);

        let mut chosen = None;
        ScrollArea::vertical()
            .id_salt("target_columns")
            .max_height(180.0)
            .show(ui, |ui| {
                for column in &dataset.columns {
                    if ui.selectable_label(false, column).clicked() {
                        chosen = Some(column.clone());
                    }
                }
            });
        if let Some(column) = chosen {
            self.controller.choose_target(&column);
        }

        ui.add_space(12.0);
        ui.label(RichText::new("Preview").strong());
        render_preview(ui, &dataset);
    }

    fn render_mode_select(&mut self, ui: &mut Ui) {
        ui.heading("Choose What You Want To Do");
        ui.label(RichText::new("Pick one to start the analysis pipeline.").weak());
        ui.add_space(16.0);
        let mut chosen = None;
        ui.horizontal(|ui| {
            for mode in AnalysisMode::ALL {
                ui.vertical(|ui| {
                    if ui.button(RichText::new(mode.label()).heading()).clicked() {
                        chosen = Some(mode);
                    }
                    ui.label(RichText::new(mode.description()).weak());
                });
                ui.add_space(24.0);
            }
        });
        if let Some(mode) = chosen {
            self.controller.choose_mode(mode);
        }
        self.render_error(ui);
    }

    fn render_busy(&mut self, ui: &mut Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(30.0);
            ui.heading("Analyzing Dataset");
            ui.label(RichText::new("This may take a moment depending on file size.").weak());
            ui.add_space(12.0);
            ui.add(Spinner::new().size(32.0));
            ui.add_space(12.0);
            for hint in PIPELINE_HINTS {
                ui.label(RichText::new(hint).weak());
            }
        });
    }

    fn render_results(&mut self, ctx: &egui::Context, ui: &mut Ui) {
        let Some(report) = self.controller.state().report().cloned() else {
            return;
        };
        ScrollArea::vertical().id_salt("report_sections").show(ui, |ui| {
            if report.sections.is_empty() {
                ui.label("The analysis finished but produced no renderable sections.");
            }
            for section in &report.sections {
                match section {
                    Section::MissingValues(section) => render_missing_values(ui, section),
                    Section::AiInsights(section) => render_ai_insights(ui, section),
                    Section::FeatureTypes(section) => render_feature_types(ui, section),
                    Section::Plots(section) => self.render_plots(ctx, ui, section),
                    Section::TopFeatures(section) => render_top_features(ui, section),
                }
                ui.add_space(12.0);
                ui.separator();
                ui.add_space(12.0);
            }
            if ui.button("Analyze another dataset").clicked() {
                self.controller.restart();
                self.textures.clear();
            }
        });
    }

    fn render_plots(&mut self, ctx: &egui::Context, ui: &mut Ui, section: &PlotsSection) {
        ui.heading("Correlation & Feature Plots");
        if let Some(heatmap) = &section.heatmap {
            ui.label(RichText::new("Numeric Correlation Heatmap").strong());
            self.render_plot_image(ctx, ui, heatmap);
            if let Some(resolved) = self.controller.resolve_image_url(heatmap) {
                if ui.small_button("Open in browser").clicked() {
                    if let Err(err) = open::that(&resolved) {
                        tracing::warn!("Failed to open {resolved}: {err}");
                    }
                }
            }
        }
        for plot in section.numeric.iter().chain(&section.categorical) {
            ui.add_space(8.0);
            ui.label(RichText::new(&plot.caption).strong());
            self.render_plot_image(ctx, ui, &plot.url);
        }
    }

    fn render_plot_image(&mut self, ctx: &egui::Context, ui: &mut Ui, url: &str) {
        match self.controller.ui.plots.images.get(url) {
            Some(PlotImageState::Ready(image)) => {
                let texture = self
                    .textures
                    .entry(url.to_string())
                    .or_insert_with(|| ctx.load_texture(url, image.clone(), TextureOptions::LINEAR));
                ui.add(
                    egui::Image::new(&*texture)
                        .max_width(ui.available_width().min(720.0))
                        .max_height(420.0),
                );
            }
            Some(PlotImageState::Loading) => {
                ui.add(Spinner::new());
            }
            Some(PlotImageState::Failed(err)) => {
                ui.label(RichText::new(format!("Plot unavailable: {err}")).weak());
            }
            None => {
                ui.label(RichText::new("Plot unavailable").weak());
            }
        }
    }

    fn render_error(&mut self, ui: &mut Ui) {
        if let Some(error) = self.controller.state().last_error() {
            ui.add_space(8.0);
            ui.label(RichText::new(error).color(Color32::from_rgb(220, 80, 70)));
        }
    }
}

impl eframe::App for EguiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.controller.poll_background_jobs();
        self.apply_visuals(ctx);
        self.render_step_indicator(ctx);
        self.render_status(ctx);
        egui::CentralPanel::default().show(ctx, |ui| {
            let busy = self.controller.state().is_busy();
            match self.controller.state().step() {
                WorkflowStep::Upload if busy => self.render_busy(ui),
                WorkflowStep::Upload => self.render_upload(ui),
                WorkflowStep::SelectTarget => self.render_target_select(ui),
                WorkflowStep::SelectMode if busy => self.render_busy(ui),
                WorkflowStep::SelectMode => self.render_mode_select(ui),
                WorkflowStep::ViewResult => self.render_results(ctx, ui),
            }
        });
        // Keep polling while background work may still deliver messages.
        if self.controller.state().is_busy() || waiting_for_plots(&self.controller) {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }
}

fn waiting_for_plots(controller: &WorkflowController) -> bool {
    controller
        .ui
        .plots
        .images
        .values()
        .any(|state| matches!(state, PlotImageState::Loading))
}

fn stat_text(value: Option<u64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn render_preview(ui: &mut Ui, dataset: &DatasetSummary) {
    let preview = &dataset.preview;
    if preview.is_empty() {
        ui.label(RichText::new("Preview unavailable.").weak());
        return;
    }
    ScrollArea::horizontal().id_salt("preview_table").show(ui, |ui| {
        Grid::new("preview_grid").striped(true).show(ui, |ui| {
            if !preview.header.is_empty() {
                for cell in &preview.header {
                    ui.label(RichText::new(cell).strong());
                }
                ui.end_row();
            }
            for row in &preview.rows {
                for cell in row {
                    ui.label(cell);
                }
                ui.end_row();
            }
        });
    });
}

fn render_missing_values(ui: &mut Ui, section: &MissingValuesSection) {
    ui.heading("Missing Values");
    match &section.body {
        MissingValuesBody::Table(rows) => {
            Grid::new("missing_values_grid").striped(true).show(ui, |ui| {
                ui.label(RichText::new("Column").strong());
                ui.label(RichText::new("Missing").strong());
                ui.end_row();
                for (key, value) in rows {
                    ui.label(key);
                    ui.label(value);
                    ui.end_row();
                }
            });
        }
        MissingValuesBody::Raw(dump) => {
            ui.label(RichText::new(dump).monospace());
        }
    }
    if let Some(message) = &section.message {
        ui.add_space(4.0);
        ui.label(RichText::new(message).weak());
    }
}

fn render_ai_insights(ui: &mut Ui, section: &AiInsightsSection) {
    ui.heading("AI Insights");
    for bullet in &section.bullets {
        ui.label(format!("• {bullet}"));
    }
    if let Some(model) = &section.model {
        ui.add_space(4.0);
        ui.label(RichText::new(format!("Generated by {model}")).weak().small());
    }
}

fn render_feature_types(ui: &mut Ui, section: &FeatureTypesSection) {
    ui.heading("Feature Types");
    ui.label(format!(
        "{} numeric · {} categorical",
        section.numeric.len(),
        section.categorical.len()
    ));
    ui.add_space(4.0);
    ui.label(RichText::new("Numeric").strong());
    ui.horizontal_wrapped(|ui| {
        for column in &section.numeric {
            ui.label(RichText::new(column).weak());
        }
    });
    ui.label(RichText::new("Categorical").strong());
    ui.horizontal_wrapped(|ui| {
        for column in &section.categorical {
            ui.label(RichText::new(column).weak());
        }
    });
}

fn render_top_features(ui: &mut Ui, section: &TopFeaturesSection) {
    ui.heading("Top Related Features");
    for (index, bar) in section.bars.iter().enumerate() {
        ui.horizontal(|ui| {
            ui.label(format!("{}. {}", index + 1, bar.name));
            ui.label(RichText::new(&bar.display_value).weak());
        });
        ui.add(ProgressBar::new(f32::from(bar.percent) / 100.0).desired_width(320.0));
        ui.add_space(6.0);
    }
}
