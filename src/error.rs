use std::path::PathBuf;

/// Problems found while building a [`crate::taxonomy::TaxonomyRegistry`].
///
/// These only surface at startup. Once a registry exists every lookup
/// against it degrades to a fallback instead of failing.
#[derive(Debug, thiserror::Error)]
pub enum TaxonomyError {
    #[error("taxonomy declares no severities")]
    NoSeverities,

    #[error("severity label {0:?} must be non-empty uppercase")]
    SeverityNotUppercase(String),

    #[error("severity label {0:?} is declared more than once")]
    DuplicateSeverity(String),

    #[error("severity label {0:?} is reserved")]
    ReservedSeverity(String),

    #[error("default severity {0:?} is not a declared severity")]
    UnknownDefaultSeverity(String),

    #[error("taxonomy declares no categories")]
    NoCategories,

    #[error("category name must be non-empty")]
    EmptyCategoryName,

    #[error("category {0:?} is declared more than once")]
    DuplicateCategory(String),

    #[error("category {0:?} has no subcategories")]
    EmptyCategory(String),

    #[error("subcategory {subcategory:?} is declared more than once in category {category:?}")]
    DuplicateSubcategory { category: String, subcategory: String },

    #[error("subcategory name in category {0:?} must be non-empty")]
    EmptySubcategoryName(String),

    #[error("fallback category {0:?} is not declared")]
    MissingFallbackCategory(String),

    #[error("fallback subcategory {subcategory:?} is not declared in category {category:?}")]
    MissingFallbackSubcategory { category: String, subcategory: String },

    #[error("failed to read taxonomy file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid taxonomy file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum DetectorError {
    #[error("invalid signal pattern {pattern:?}: {source}")]
    InvalidSignal {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("signal set is empty")]
    NoSignals,
}

/// Failure of the judgment-producing call for a single candidate.
///
/// The orchestrator turns every one of these into a degraded record; they
/// never abort a run.
#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    #[error("GEMINI_API_KEY is not set")]
    MissingApiKey,

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("upstream returned error: status={status} body={body}")]
    Upstream {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("response carried no candidate text")]
    EmptyResponse,

    #[error("classification timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("{0}")]
    Other(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("log source not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read log source {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}
