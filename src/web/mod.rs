//! Async client for the scheduler's Ajax HTTP API: session login, project
//! creation, archive upload and flow scheduling. The graph core never calls
//! this module; it only has to produce archive paths and names the API can
//! pass through unchanged.

mod client;

pub use client::{AjaxClient, WebError};
