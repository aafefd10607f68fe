//! Tablescope: a desktop client for guided dataset analysis.
//!
//! The crate wraps a simple backend workflow: upload a CSV, pick the target
//! column, pick an analysis mode, and render the returned report. The
//! [`workflow`] module holds the step state machine, [`report`] turns the
//! backend's loose JSON into typed sections, and [`egui_app`] renders it all.

pub mod app_dirs;
pub mod backend;
pub mod config;
pub mod egui_app;
mod http;
pub mod logging;
pub mod preview;
pub mod report;
pub mod workflow;
