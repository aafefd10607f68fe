//! The step state machine that owns all mutable workflow state.
//!
//! Components report outcomes as [`WorkflowEvent`]s; `apply` is the only code
//! that mutates a [`WorkflowState`]. Transitions run strictly forward
//! (Upload → SelectTarget → SelectMode → ViewResult); the only way back is an
//! explicit restart, which re-initializes the whole state.

use crate::report::Report;
use crate::workflow::{AnalysisMode, DatasetSummary};

/// One stage of the guided workflow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkflowStep {
    Upload,
    SelectTarget,
    SelectMode,
    ViewResult,
}

impl WorkflowStep {
    /// 1-based position used by the step indicator.
    pub fn ordinal(self) -> usize {
        match self {
            WorkflowStep::Upload => 1,
            WorkflowStep::SelectTarget => 2,
            WorkflowStep::SelectMode => 3,
            WorkflowStep::ViewResult => 4,
        }
    }

    /// Short title shown in the step indicator.
    pub fn title(self) -> &'static str {
        match self {
            WorkflowStep::Upload => "Upload",
            WorkflowStep::SelectTarget => "Target",
            WorkflowStep::SelectMode => "Mode",
            WorkflowStep::ViewResult => "Results",
        }
    }
}

/// Outcome reported by a workflow component.
#[derive(Debug)]
pub enum WorkflowEvent {
    UploadStarted,
    UploadSucceeded(DatasetSummary),
    UploadFailed(String),
    TargetChosen(String),
    AnalysisStarted(AnalysisMode),
    AnalysisSucceeded(Report),
    AnalysisFailed(String),
    Restarted,
}

/// The single mutable workflow record for a session.
#[derive(Debug, Default)]
pub struct WorkflowState {
    step: WorkflowStep,
    dataset: Option<DatasetSummary>,
    selected_target: Option<String>,
    selected_mode: Option<AnalysisMode>,
    report: Option<Report>,
    busy: bool,
    last_error: Option<String>,
}

impl Default for WorkflowStep {
    fn default() -> Self {
        WorkflowStep::Upload
    }
}

impl WorkflowState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> WorkflowStep {
        self.step
    }

    pub fn dataset(&self) -> Option<&DatasetSummary> {
        self.dataset.as_ref()
    }

    pub fn selected_target(&self) -> Option<&str> {
        self.selected_target.as_deref()
    }

    pub fn selected_mode(&self) -> Option<AnalysisMode> {
        self.selected_mode
    }

    pub fn report(&self) -> Option<&Report> {
        self.report.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Display-only failure text from the most recent attempt.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Apply an event, returning whether the transition was accepted.
    ///
    /// Rejected events leave the state untouched; callers decide whether a
    /// rejection is worth logging. A new attempt clears `last_error`; failures
    /// set it and roll back to the pre-call step by simply not advancing.
    pub fn apply(&mut self, event: WorkflowEvent) -> bool {
        match event {
            WorkflowEvent::UploadStarted => {
                if self.step != WorkflowStep::Upload || self.busy {
                    return false;
                }
                self.last_error = None;
                self.busy = true;
                true
            }
            WorkflowEvent::UploadSucceeded(dataset) => {
                if self.step != WorkflowStep::Upload || !self.busy {
                    return false;
                }
                self.dataset = Some(dataset);
                self.busy = false;
                self.step = WorkflowStep::SelectTarget;
                true
            }
            WorkflowEvent::UploadFailed(message) => {
                if self.step != WorkflowStep::Upload || !self.busy {
                    return false;
                }
                self.busy = false;
                self.last_error = Some(message);
                true
            }
            WorkflowEvent::TargetChosen(target) => {
                if self.step != WorkflowStep::SelectTarget || self.busy {
                    return false;
                }
                let known = self
                    .dataset
                    .as_ref()
                    .is_some_and(|d| d.columns.iter().any(|c| c == &target));
                if !known {
                    return false;
                }
                self.last_error = None;
                self.selected_target = Some(target);
                self.step = WorkflowStep::SelectMode;
                true
            }
            WorkflowEvent::AnalysisStarted(mode) => {
                if self.step != WorkflowStep::SelectMode
                    || self.busy
                    || self.selected_target.is_none()
                {
                    return false;
                }
                self.last_error = None;
                self.report = None;
                self.selected_mode = Some(mode);
                self.busy = true;
                true
            }
            WorkflowEvent::AnalysisSucceeded(report) => {
                if self.step != WorkflowStep::SelectMode || !self.busy {
                    return false;
                }
                self.report = Some(report);
                self.busy = false;
                self.step = WorkflowStep::ViewResult;
                true
            }
            WorkflowEvent::AnalysisFailed(message) => {
                if self.step != WorkflowStep::SelectMode || !self.busy {
                    return false;
                }
                self.busy = false;
                self.last_error = Some(message);
                true
            }
            WorkflowEvent::Restarted => {
                // Cancellation is unsupported; an in-flight call keeps its state.
                if self.busy {
                    return false;
                }
                *self = Self::default();
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::PreviewTable;
    use crate::report::Report;

    fn summary(columns: &[&str]) -> DatasetSummary {
        DatasetSummary::from_upload_json(
            serde_json::json!({
                "filename": "f.csv",
                "columns": columns,
            })
            .to_string()
            .as_bytes(),
        )
        .unwrap()
    }

    fn empty_report() -> Report {
        Report::default()
    }

    #[test]
    fn happy_path_walks_forward() {
        let mut state = WorkflowState::new();
        assert!(state.apply(WorkflowEvent::UploadStarted));
        assert!(state.is_busy());
        assert!(state.apply(WorkflowEvent::UploadSucceeded(summary(&["age", "income"]))));
        assert_eq!(state.step(), WorkflowStep::SelectTarget);
        assert!(!state.is_busy());
        assert!(state.apply(WorkflowEvent::TargetChosen("income".into())));
        assert_eq!(state.step(), WorkflowStep::SelectMode);
        assert!(state.apply(WorkflowEvent::AnalysisStarted(AnalysisMode::BusinessInsights)));
        assert!(state.is_busy());
        assert!(state.apply(WorkflowEvent::AnalysisSucceeded(empty_report())));
        assert_eq!(state.step(), WorkflowStep::ViewResult);
        assert!(state.report().is_some());
    }

    #[test]
    fn upload_failure_stays_on_upload_with_error() {
        let mut state = WorkflowState::new();
        assert!(state.apply(WorkflowEvent::UploadStarted));
        assert!(state.apply(WorkflowEvent::UploadFailed("boom".into())));
        assert_eq!(state.step(), WorkflowStep::Upload);
        assert!(!state.is_busy());
        assert_eq!(state.last_error(), Some("boom"));
        // Retry clears the previous error.
        assert!(state.apply(WorkflowEvent::UploadStarted));
        assert_eq!(state.last_error(), None);
    }

    #[test]
    fn duplicate_submission_is_rejected_while_busy() {
        let mut state = WorkflowState::new();
        assert!(state.apply(WorkflowEvent::UploadStarted));
        assert!(!state.apply(WorkflowEvent::UploadStarted));
    }

    #[test]
    fn analysis_requires_a_selected_target() {
        let mut state = WorkflowState::new();
        assert!(state.apply(WorkflowEvent::UploadStarted));
        assert!(state.apply(WorkflowEvent::UploadSucceeded(summary(&["a"]))));
        // Still on SelectTarget; the dispatcher must not start.
        assert!(!state.apply(WorkflowEvent::AnalysisStarted(AnalysisMode::ModelTrainer)));
        assert_eq!(state.step(), WorkflowStep::SelectTarget);
        assert!(!state.is_busy());
    }

    #[test]
    fn unknown_target_column_is_rejected() {
        let mut state = WorkflowState::new();
        assert!(state.apply(WorkflowEvent::UploadStarted));
        assert!(state.apply(WorkflowEvent::UploadSucceeded(summary(&["a", "b"]))));
        assert!(!state.apply(WorkflowEvent::TargetChosen("missing".into())));
        assert_eq!(state.step(), WorkflowStep::SelectTarget);
    }

    #[test]
    fn analysis_failure_rolls_back_to_mode_step() {
        let mut state = WorkflowState::new();
        assert!(state.apply(WorkflowEvent::UploadStarted));
        assert!(state.apply(WorkflowEvent::UploadSucceeded(summary(&["a"]))));
        assert!(state.apply(WorkflowEvent::TargetChosen("a".into())));
        assert!(state.apply(WorkflowEvent::AnalysisStarted(AnalysisMode::BusinessInsights)));
        assert!(state.apply(WorkflowEvent::AnalysisFailed("target not found".into())));
        assert_eq!(state.step(), WorkflowStep::SelectMode);
        assert!(!state.is_busy());
        assert_eq!(state.last_error(), Some("target not found"));
    }

    #[test]
    fn restart_reinitializes_everything() {
        let mut state = WorkflowState::new();
        assert!(state.apply(WorkflowEvent::UploadStarted));
        assert!(state.apply(WorkflowEvent::UploadSucceeded(summary(&["a"]))));
        assert!(state.apply(WorkflowEvent::Restarted));
        assert_eq!(state.step(), WorkflowStep::Upload);
        assert!(state.dataset().is_none());
        assert!(state.selected_target().is_none());
    }

    #[test]
    fn restart_is_rejected_while_busy() {
        let mut state = WorkflowState::new();
        assert!(state.apply(WorkflowEvent::UploadStarted));
        assert!(!state.apply(WorkflowEvent::Restarted));
        assert!(state.is_busy());
    }

    #[test]
    fn preview_survives_into_dataset() {
        let body = serde_json::json!({
            "filename": "f.csv",
            "columns": ["a"],
            "preview": "<table><thead><tr><th>a</th></tr></thead><tbody><tr><td>1</td></tr></tbody></table>",
        });
        let summary = DatasetSummary::from_upload_json(body.to_string().as_bytes()).unwrap();
        assert_eq!(summary.preview, PreviewTable {
            header: vec!["a".into()],
            rows: vec![vec!["1".into()]],
        });
    }
}
