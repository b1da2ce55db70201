// Library root
// -----------
// This crate exposes the analysis client and its helpers as a library; the
// binary (`main.rs`) only parses arguments and wires up logging.
//
// Module responsibilities:
// - `api`: HTTP interactions with the analysis backend (health, analysis,
//   multimodal upload, model listing) and the fallback switch.
// - `normalize`: the pure mapping from any payload to `AnalysisResult`.
// - `fallback`: static per-domain analyses and query truncation.
// - `progress`: the event sink the client reports through.
// - `cli` / `ui`: argument dispatch, demonstration run and interactive menu.
pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod fallback;
pub mod normalize;
pub mod progress;
pub mod ui;

pub use api::{AnalysisClient, HealthReport, InstallReport};
pub use config::ClientConfig;
pub use domain::Domain;
pub use normalize::{format_response, AnalysisResult, Source};
