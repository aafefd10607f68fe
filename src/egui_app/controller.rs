//! Maintains workflow state and bridges core logic to the egui UI.
//!
//! Every user action lands here, turns into a [`WorkflowEvent`], and goes
//! through the state machine; background jobs report their outcomes back via
//! [`poll_background_jobs`](WorkflowController::poll_background_jobs).

use std::path::Path;
use std::sync::Arc;
use std::sync::mpsc::TryRecvError;

use rfd::FileDialog;

use crate::backend::{ApiError, BackendClient};
use crate::config::AppConfig;
use crate::egui_app::jobs::{JobMessage, JobRuntime};
use crate::egui_app::state::{PlotImageState, StatusTone, UiState, status_badge};
use crate::report::Report;
use crate::workflow::{AnalysisMode, DatasetSummary, WorkflowEvent, WorkflowState};

/// Owns the single [`WorkflowState`] and all backend interaction.
pub struct WorkflowController {
    pub ui: UiState,
    state: WorkflowState,
    client: Arc<BackendClient>,
    jobs: JobRuntime,
}

impl WorkflowController {
    pub fn new(config: &AppConfig) -> Result<Self, ApiError> {
        Ok(Self {
            ui: UiState::default(),
            state: WorkflowState::new(),
            client: Arc::new(BackendClient::new(&config.backend)?),
            jobs: JobRuntime::new(),
        })
    }

    /// Read-only view of the workflow record.
    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    /// Resolve a plot URL for opening in the system browser.
    pub fn resolve_image_url(&self, raw: &str) -> Option<String> {
        self.client.resolve_image_url(raw)
    }

    /// Let the user pick a CSV through the native file dialog.
    pub fn pick_file_via_dialog(&mut self) {
        let Some(path) = FileDialog::new()
            .add_filter("CSV", &["csv"])
            .pick_file()
        else {
            return;
        };
        self.upload_file(&path);
    }

    /// Validate and submit a dataset file.
    ///
    /// Non-CSV names are rejected locally with a visible message and no state
    /// change; each attempt is independent, so the user can simply re-pick.
    pub fn upload_file(&mut self, path: &Path) {
        if self.state.is_busy() {
            return;
        }
        if !is_csv(path) {
            self.set_status("Please choose a .csv file", StatusTone::Error);
            return;
        }
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("dataset.csv")
            .to_string();
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) => {
                self.set_status(
                    format!("Failed to read {}: {err}", path.display()),
                    StatusTone::Error,
                );
                return;
            }
        };
        if !self.apply(WorkflowEvent::UploadStarted) {
            return;
        }
        self.ui.picked_file = Some(file_name.clone());
        self.set_status(format!("Uploading {file_name}..."), StatusTone::Busy);
        self.jobs
            .spawn_upload(self.client.clone(), file_name, bytes);
    }

    /// Record the chosen target column and advance to mode selection.
    pub fn choose_target(&mut self, column: &str) {
        if self.apply(WorkflowEvent::TargetChosen(column.to_string())) {
            self.set_status(
                format!("Target '{column}' selected; pick an analysis mode"),
                StatusTone::Info,
            );
        }
    }

    /// Start an analysis run, gated to one in-flight request.
    pub fn choose_mode(&mut self, mode: AnalysisMode) {
        if self.state.is_busy() {
            return;
        }
        let request = self.state.dataset().map(|dataset| dataset.filename.clone());
        let target = self.state.selected_target().map(str::to_string);
        let (Some(filename), Some(target)) = (request, target) else {
            self.set_status("Select a target column first", StatusTone::Error);
            return;
        };
        if !self.apply(WorkflowEvent::AnalysisStarted(mode)) {
            return;
        }
        self.set_status(format!("Running {}...", mode.label()), StatusTone::Busy);
        self.jobs
            .spawn_analysis(self.client.clone(), filename, target, mode);
    }

    /// Throw away the session and return to the upload step.
    pub fn restart(&mut self) {
        if self.apply(WorkflowEvent::Restarted) {
            self.ui.picked_file = None;
            self.ui.plots.clear();
            self.ui.status = Default::default();
        }
    }

    /// Drain finished background work and fold it into the state machine.
    pub fn poll_background_jobs(&mut self) {
        loop {
            let message = match self.jobs.try_recv() {
                Ok(message) => message,
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            };
            match message {
                JobMessage::UploadFinished(result) => self.handle_upload_finished(result),
                JobMessage::AnalysisFinished(result) => self.handle_analysis_finished(result),
                JobMessage::PlotFetched { url, result } => {
                    let entry = match result {
                        Ok(image) => PlotImageState::Ready(image),
                        Err(err) => {
                            tracing::warn!("Plot fetch failed for {url}: {err}");
                            PlotImageState::Failed(err)
                        }
                    };
                    self.ui.plots.images.insert(url, entry);
                }
            }
        }
    }

    fn handle_upload_finished(&mut self, result: Result<DatasetSummary, ApiError>) {
        match result {
            Ok(summary) => {
                let count = summary.columns.len();
                if self.apply(WorkflowEvent::UploadSucceeded(summary)) {
                    self.set_status(
                        format!("Dataset uploaded; choose one of {count} target columns"),
                        StatusTone::Info,
                    );
                }
            }
            Err(err) => {
                let message = format!("Upload failed: {err}");
                if self.apply(WorkflowEvent::UploadFailed(message.clone())) {
                    self.set_status(message, StatusTone::Error);
                }
            }
        }
    }

    fn handle_analysis_finished(&mut self, result: Result<Report, ApiError>) {
        match result {
            Ok(report) => {
                let urls: Vec<String> = report
                    .plot_urls()
                    .into_iter()
                    .map(str::to_string)
                    .collect();
                if self.apply(WorkflowEvent::AnalysisSucceeded(report)) {
                    self.set_status("Analysis complete", StatusTone::Info);
                    self.queue_plot_fetches(urls);
                }
            }
            Err(err) => {
                let message = format!("Processing failed: {err}");
                if self.apply(WorkflowEvent::AnalysisFailed(message.clone())) {
                    self.set_status(message, StatusTone::Error);
                }
            }
        }
    }

    fn queue_plot_fetches(&mut self, urls: Vec<String>) {
        let fresh: Vec<String> = urls
            .into_iter()
            .filter(|url| !self.ui.plots.images.contains_key(url))
            .collect();
        for url in &fresh {
            self.ui
                .plots
                .images
                .insert(url.clone(), PlotImageState::Loading);
        }
        self.jobs.spawn_plot_fetches(self.client.clone(), fresh);
    }

    fn apply(&mut self, event: WorkflowEvent) -> bool {
        let accepted = self.state.apply(event);
        if !accepted {
            tracing::warn!("Rejected workflow event in step {:?}", self.state.step());
        }
        accepted
    }

    fn set_status(&mut self, text: impl Into<String>, tone: StatusTone) {
        let (label, color) = status_badge(tone);
        self.ui.status.text = text.into();
        self.ui.status.badge_label = label;
        self.ui.status.badge_color = color;
    }
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendSettings;
    use crate::workflow::WorkflowStep;
    use std::io::Write;
    use tempfile::tempdir;

    /// Controller pointed at a port that refuses connections.
    fn controller() -> WorkflowController {
        let config = AppConfig {
            backend: BackendSettings {
                base_url: "http://127.0.0.1:1".into(),
                read_timeout_secs: 2,
                max_body_bytes: 1024,
            },
        };
        WorkflowController::new(&config).unwrap()
    }

    fn wait_until_idle(controller: &mut WorkflowController) {
        for _ in 0..400 {
            controller.poll_background_jobs();
            if !controller.state().is_busy() {
                return;
            }
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        panic!("controller never settled");
    }

    #[test]
    fn non_csv_files_are_rejected_without_a_request() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.txt");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"a,b\n")
            .unwrap();

        let mut controller = controller();
        controller.upload_file(&path);
        assert_eq!(controller.state().step(), WorkflowStep::Upload);
        assert!(!controller.state().is_busy());
        assert!(controller.ui.status.text.contains(".csv"));
    }

    #[test]
    fn csv_extension_check_ignores_case() {
        assert!(is_csv(Path::new("DATA.CSV")));
        assert!(is_csv(Path::new("data.Csv")));
        assert!(!is_csv(Path::new("data.tsv")));
        assert!(!is_csv(Path::new("csv")));
    }

    #[test]
    fn failed_upload_returns_to_upload_step_with_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"a,b\n1,2\n")
            .unwrap();

        let mut controller = controller();
        controller.upload_file(&path);
        assert!(controller.state().is_busy());
        wait_until_idle(&mut controller);
        assert_eq!(controller.state().step(), WorkflowStep::Upload);
        let error = controller.state().last_error().unwrap();
        assert!(error.starts_with("Upload failed:"), "got: {error}");
    }

    #[test]
    fn mode_without_target_fails_locally() {
        let mut controller = controller();
        controller.choose_mode(AnalysisMode::BusinessInsights);
        assert_eq!(controller.state().step(), WorkflowStep::Upload);
        assert!(!controller.state().is_busy());
        assert!(controller.ui.status.text.contains("target"));
    }
}
