//! Core pipeline logic.
//!
//! This module contains:
//! - Extractor: transcript → structured event, with a deterministic fallback
//! - Pipeline: stages, error taxonomy, outcome type
//! - Orchestrator: end-to-end sequencing of one voice note

pub mod extractor;
pub mod orchestrator;
pub mod pipeline;

// Re-export commonly used types
pub use extractor::{build_system_prompt, EventExtractor, Extraction, ExtractionSource};
pub use orchestrator::Orchestrator;
pub use pipeline::{PipelineError, PipelineOutcome, Stage};
