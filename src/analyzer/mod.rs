// Analyzer module: needs profile, scoring and the recommendation narrative.

pub mod needs;
pub mod scoring;
pub mod summary;

// Re-export the main Analyzer implementation for ease of use.
pub use scoring::{Analyzer, AnalyzerImpl};
