//! Background job plumbing.
//!
//! Network work runs on plain threads and reports back over an mpsc channel
//! that the controller drains once per frame. The UI thread never blocks on
//! the backend.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

use crate::backend::{ApiError, BackendClient};
use crate::report::{self, Report};
use crate::workflow::{AnalysisMode, DatasetSummary};

/// Completed background work delivered to the controller.
pub(crate) enum JobMessage {
    UploadFinished(Result<DatasetSummary, ApiError>),
    AnalysisFinished(Result<Report, ApiError>),
    PlotFetched {
        url: String,
        result: Result<egui::ColorImage, String>,
    },
}

/// Channel endpoints shared with worker threads.
pub(crate) struct JobRuntime {
    tx: Sender<JobMessage>,
    rx: Receiver<JobMessage>,
}

impl JobRuntime {
    pub(crate) fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    pub(crate) fn try_recv(&self) -> Result<JobMessage, TryRecvError> {
        self.rx.try_recv()
    }

    pub(crate) fn spawn_upload(
        &self,
        client: Arc<BackendClient>,
        file_name: String,
        bytes: Vec<u8>,
    ) {
        let tx = self.tx.clone();
        thread::spawn(move || {
            let result = client.upload_dataset(&file_name, &bytes);
            let _ = tx.send(JobMessage::UploadFinished(result));
        });
    }

    pub(crate) fn spawn_analysis(
        &self,
        client: Arc<BackendClient>,
        filename: String,
        target: String,
        mode: AnalysisMode,
    ) {
        let tx = self.tx.clone();
        thread::spawn(move || {
            let result = client
                .run_analysis(&filename, &target, mode)
                .map(|payload| report::interpret(&payload));
            let _ = tx.send(JobMessage::AnalysisFinished(result));
        });
    }

    /// Fetch and decode plot images sequentially on one worker thread.
    pub(crate) fn spawn_plot_fetches(&self, client: Arc<BackendClient>, urls: Vec<String>) {
        if urls.is_empty() {
            return;
        }
        let tx = self.tx.clone();
        thread::spawn(move || {
            for url in urls {
                let result = client
                    .fetch_plot(&url)
                    .map_err(|err| err.to_string())
                    .and_then(|bytes| decode_plot(&bytes));
                if tx.send(JobMessage::PlotFetched { url, result }).is_err() {
                    break;
                }
            }
        });
    }
}

fn decode_plot(bytes: &[u8]) -> Result<egui::ColorImage, String> {
    let image = image::load_from_memory(bytes)
        .map_err(|err| format!("Could not decode image: {err}"))?
        .to_rgba8();
    let size = [image.width() as usize, image.height() as usize];
    Ok(egui::ColorImage::from_rgba_unmultiplied(
        size,
        image.as_raw(),
    ))
}
