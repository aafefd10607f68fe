//! HTTP client for the analysis backend.

mod client;
mod multipart;

pub use client::{ApiError, BackendClient};
