use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Label used for records whose classification could not be obtained at all.
pub const UNKNOWN_SEVERITY: &str = "UNKNOWN";

/// A severity as it appears on a record.
///
/// `Level` always holds a label declared by the registry that produced the
/// record. `Unknown` sits outside the taxonomy and ranks after every level.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Severity {
    Level(String),
    Unknown,
}

impl Severity {
    pub fn as_str(&self) -> &str {
        match self {
            Severity::Level(label) => label,
            Severity::Unknown => UNKNOWN_SEVERITY,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Severity::Unknown)
    }
}

impl From<String> for Severity {
    fn from(label: String) -> Self {
        if label == UNKNOWN_SEVERITY {
            Severity::Unknown
        } else {
            Severity::Level(label)
        }
    }
}

impl From<Severity> for String {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Level(label) => label,
            Severity::Unknown => UNKNOWN_SEVERITY.to_string(),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A log line flagged by the detector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateError {
    /// 1-based position of the line in the input stream.
    pub line_number: usize,
    pub content: String,
    pub timestamp: Option<String>,
}

impl CandidateError {
    pub fn new(line_number: usize, content: String, timestamp: Option<String>) -> Self {
        Self {
            line_number,
            content,
            timestamp,
        }
    }
}

/// Untrusted classification payload for one candidate.
///
/// Every field is optional and none of them is assumed to name anything in
/// the taxonomy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawJudgment {
    pub severity: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub description: Option<String>,
    pub impact: Option<String>,
    pub suggested_action: Option<String>,
}

impl RawJudgment {
    /// Parses free-form text that purports to be a JSON classification.
    ///
    /// Markdown code fences are stripped. If the remainder is not a JSON
    /// object the outermost `{...}` span is tried. Text that still does not
    /// parse yields an empty judgment, which the normalizer resolves entirely
    /// through fallbacks.
    pub fn from_text(text: &str) -> Self {
        let body = strip_code_fences(text);

        let parsed = serde_json::from_str::<Value>(body)
            .ok()
            .filter(Value::is_object)
            .or_else(|| {
                let start = body.find('{')?;
                let end = body.rfind('}')?;
                if end <= start {
                    return None;
                }
                serde_json::from_str::<Value>(&body[start..=end]).ok()
            });

        match parsed {
            Some(value) => Self::from_value(&value),
            None => Self::default(),
        }
    }

    pub fn from_value(value: &Value) -> Self {
        let field = |keys: &[&str]| keys.iter().find_map(|k| value.get(*k).and_then(text_of));

        Self {
            severity: field(&["severity"]),
            category: field(&["category"]),
            subcategory: field(&["subcategory", "subCategory"]),
            description: field(&["description"]),
            impact: field(&["impact"]),
            suggested_action: field(&["suggestedAction", "suggested_action"]),
        }
    }
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn strip_code_fences(text: &str) -> &str {
    let mut body = text.trim();
    if let Some(rest) = body.strip_prefix("```") {
        body = rest.strip_prefix("json").unwrap_or(rest);
        body = body.trim_end();
        body = body.strip_suffix("```").unwrap_or(body);
    }
    body.trim()
}

/// Taxonomy-conformant classification attached to a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub severity: Severity,
    pub category: String,
    pub subcategory: String,
    pub description: String,
    pub impact: String,
    pub suggested_action: String,
    pub reference_link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_example: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    #[serde(flatten)]
    pub candidate: CandidateError,
    pub analysis: Classification,
}
