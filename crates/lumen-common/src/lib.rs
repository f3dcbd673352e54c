//! Common utilities for the Lumen layer renderer.
//!
//! This crate provides shared infrastructure used by every engine component:
//! - **Sources** - classify content references (data URI, remote URL, local path)
//! - **Fetching** - blocking retrieval of external content with typed errors
//! - **Warnings** - deduplicated diagnostics routed through `tracing`

pub mod net;
pub mod source;
pub mod warning;

pub use net::{FetchError, FetchOptions, fetch_bytes, fetch_text};
pub use source::{SourceKind, classify_source};
