//! Engage upstream access for scholar.
//!
//! - [`client`] - reqwest client for the report comment service
//! - [`envelope`] - request and response wire types
//! - [`render`] - cursor-based marksheet render parser
//! - [`pacing`] - cancellable wait between upstream calls
//!
//! Engage answers an unknown pupil with HTTP 200 and an empty `d` array; the
//! client turns that into [`EngageError::NotFound`].

pub mod api;
pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod pacing;
pub mod render;

pub use api::EngageApi;
pub use client::EngageClient;
pub use config::{EngageConfig, DEFAULT_BASE_URL};
pub use envelope::RenderQuery;
pub use error::{EngageError, EngageResult, RenderError};
pub use pacing::{Pacer, DEFAULT_PACING_INTERVAL};
pub use render::{
    current_year_from_render, mark_from_render, marks_from_render, name_from_render, ParsedMark,
    RenderScanner,
};
