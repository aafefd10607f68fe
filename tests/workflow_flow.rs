//! End-to-end workflow tests against a scripted fake backend.

mod support;

use std::io::Write;
use std::time::Duration;

use serde_json::Value;
use support::{CannedResponse, FakeBackend};
use tablescope::config::{AppConfig, BackendSettings};
use tablescope::egui_app::controller::WorkflowController;
use tablescope::egui_app::state::PlotImageState;
use tablescope::workflow::{AnalysisMode, WorkflowStep};

fn controller_for(backend: &FakeBackend) -> WorkflowController {
    let config = AppConfig {
        backend: BackendSettings {
            base_url: backend.base_url.clone(),
            read_timeout_secs: 5,
            max_body_bytes: 1024 * 1024,
        },
    };
    WorkflowController::new(&config).unwrap()
}

fn csv_file(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("data.csv");
    std::fs::File::create(&path)
        .unwrap()
        .write_all(b"age,income\n34,52000\n41,61000\n")
        .unwrap();
    path
}

fn wait_for(controller: &mut WorkflowController, pred: impl Fn(&WorkflowController) -> bool) {
    for _ in 0..500 {
        controller.poll_background_jobs();
        if pred(controller) {
            return;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    panic!("condition never became true");
}

fn tiny_png() -> Vec<u8> {
    let mut png = Vec::new();
    let rgba = image::RgbaImage::from_pixel(2, 2, image::Rgba([200, 100, 50, 255]));
    image::DynamicImage::ImageRgba8(rgba)
        .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
        .unwrap();
    png
}

const UPLOAD_BODY: &str = r#"{
    "filename": "ab12__data.csv",
    "columns": ["age", "income"],
    "shape": [2, 2],
    "preview": "<table><tr><th>age</th><th>income</th></tr><tr><td>34</td><td>52000</td></tr></table>"
}"#;

const PROCESS_BODY: &str = r#"{
    "steps": [
        {"step": "missing_detected", "details": {"age": 0, "income": 1}},
        {"step": "separate_types", "numeric_cols": ["age", "income"], "categorical_cols": []}
    ],
    "ai_insights": ["Income correlates strongly with age."],
    "ai_model": "gemini-1.5-flash",
    "numeric_analysis": {"corr_heatmap": "/static/graphs/heat.png"},
    "insights": [{"top_features": [{"age": 0.83}]}]
}"#;

#[test]
fn upload_to_report_walks_every_step() {
    let backend = FakeBackend::start(vec![
        CannedResponse::json(UPLOAD_BODY),
        CannedResponse::json(PROCESS_BODY),
        CannedResponse::png(tiny_png()),
    ]);
    let mut controller = controller_for(&backend);
    let dir = tempfile::tempdir().unwrap();

    controller.upload_file(&csv_file(&dir));
    wait_for(&mut controller, |c| {
        c.state().step() == WorkflowStep::SelectTarget
    });
    let dataset = controller.state().dataset().unwrap();
    assert_eq!(dataset.columns, vec!["age", "income"]);
    assert_eq!(dataset.row_count, Some(2));
    assert_eq!(dataset.preview.header, vec!["age", "income"]);
    assert!(backend.next_request().starts_with("POST /upload HTTP/1.1"));

    controller.choose_target("income");
    assert_eq!(controller.state().step(), WorkflowStep::SelectMode);

    controller.choose_mode(AnalysisMode::BusinessInsights);
    assert!(controller.state().is_busy());
    wait_for(&mut controller, |c| {
        c.state().step() == WorkflowStep::ViewResult
    });
    let report = controller.state().report().unwrap();
    assert_eq!(report.sections.len(), 5);

    let process_request = backend.next_request();
    assert!(process_request.starts_with("POST /process HTTP/1.1"));
    let body = process_request.split("\r\n\r\n").nth(1).unwrap();
    let parsed: Value = serde_json::from_str(body).unwrap();
    assert_eq!(
        parsed,
        serde_json::json!({
            "filename": "ab12__data.csv",
            "target": "income",
            "mode": "business_insights",
        })
    );

    wait_for(&mut controller, |c| {
        matches!(
            c.ui.plots.images.get("/static/graphs/heat.png"),
            Some(PlotImageState::Ready(_))
        )
    });
    assert!(backend
        .next_request()
        .starts_with("GET /static/graphs/heat.png HTTP/1.1"));

    controller.restart();
    assert_eq!(controller.state().step(), WorkflowStep::Upload);
    assert!(controller.state().dataset().is_none());
    assert!(controller.ui.plots.images.is_empty());
}

#[test]
fn backend_rejection_keeps_the_mode_step_with_a_message() {
    let backend = FakeBackend::start(vec![
        CannedResponse::json(UPLOAD_BODY),
        CannedResponse::error("422 Unprocessable Entity", r#"{"detail": "target not found"}"#),
    ]);
    let mut controller = controller_for(&backend);
    let dir = tempfile::tempdir().unwrap();

    controller.upload_file(&csv_file(&dir));
    wait_for(&mut controller, |c| {
        c.state().step() == WorkflowStep::SelectTarget
    });
    controller.choose_target("age");
    controller.choose_mode(AnalysisMode::ModelTrainer);
    wait_for(&mut controller, |c| !c.state().is_busy());

    assert_eq!(controller.state().step(), WorkflowStep::SelectMode);
    assert_eq!(controller.state().selected_target(), Some("age"));
    let error = controller.state().last_error().unwrap();
    assert_eq!(error, "Processing failed: target not found");

    // A second attempt is allowed right away.
    controller.choose_mode(AnalysisMode::BusinessInsights);
    assert!(controller.state().is_busy());
}

#[test]
fn target_outside_the_column_list_is_rejected() {
    let backend = FakeBackend::start(vec![CannedResponse::json(UPLOAD_BODY)]);
    let mut controller = controller_for(&backend);
    let dir = tempfile::tempdir().unwrap();

    controller.upload_file(&csv_file(&dir));
    wait_for(&mut controller, |c| {
        c.state().step() == WorkflowStep::SelectTarget
    });
    controller.choose_target("salary");
    assert_eq!(controller.state().step(), WorkflowStep::SelectTarget);
    assert_eq!(controller.state().selected_target(), None);
}
