//! egui UI: controller, shared state, background jobs, and the renderer.

pub mod controller;
pub(crate) mod jobs;
pub mod state;
pub mod ui;
