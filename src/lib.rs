//! Log error triage: flag error-like lines in application logs, classify each
//! one through an untrusted judgment source, and normalize the result onto a
//! closed, versioned remediation taxonomy.

pub mod builtin;
pub mod cli;
pub mod config;
pub mod detector;
pub mod error;
pub mod gemini;
pub mod matching;
pub mod normalizer;
pub mod orchestrator;
pub mod report;
pub mod source;
pub mod taxonomy;
pub mod types;

pub use detector::Detector;
pub use normalizer::{degraded, normalize};
pub use orchestrator::{BatchConfig, Orchestrator};
pub use report::Report;
pub use taxonomy::TaxonomyRegistry;
pub use types::{CandidateError, Classification, NormalizedRecord, RawJudgment, Severity};
