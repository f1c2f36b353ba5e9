use std::iter::Enumerate;

use regex::{Regex, RegexSet, RegexSetBuilder};
use serde_json::Value;

use crate::error::DetectorError;
use crate::types::CandidateError;

/// Patterns that mark a line as a candidate error. Matched case-insensitively.
pub const DEFAULT_SIGNALS: &[&str] = &[
    r"error",
    r"timeout",
    r"exception",
    r"fail(ed|ure)?",
    r"critical",
    r"fatal",
];

const TIMESTAMP_PATTERN: &str = r"\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}";

pub struct Detector {
    signals: RegexSet,
    timestamp: Regex,
}

impl Detector {
    pub fn new<I, S>(patterns: I) -> Result<Self, DetectorError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns: Vec<String> = patterns.into_iter().map(|p| p.as_ref().to_string()).collect();
        if patterns.is_empty() {
            return Err(DetectorError::NoSignals);
        }
        // Compile one at a time first so the error names the bad pattern.
        for pattern in &patterns {
            Regex::new(pattern).map_err(|source| DetectorError::InvalidSignal {
                pattern: pattern.clone(),
                source,
            })?;
        }
        let signals = RegexSetBuilder::new(&patterns)
            .case_insensitive(true)
            .build()
            .map_err(|source| DetectorError::InvalidSignal {
                pattern: patterns.join(" | "),
                source,
            })?;
        let timestamp = Regex::new(TIMESTAMP_PATTERN).map_err(|source| {
            DetectorError::InvalidSignal {
                pattern: TIMESTAMP_PATTERN.to_string(),
                source,
            }
        })?;
        Ok(Self { signals, timestamp })
    }

    pub fn is_candidate(&self, line: &str) -> bool {
        self.signals.is_match(line)
    }

    /// Structured timestamps win over scraped ones. The substring scan only
    /// runs when the line is not a JSON document at all.
    pub fn extract_timestamp(&self, line: &str) -> Option<String> {
        match serde_json::from_str::<Value>(line) {
            Ok(parsed) => parsed
                .pointer("/meta/timestamp")
                .and_then(timestamp_text)
                .or_else(|| parsed.get("timestamp").and_then(timestamp_text)),
            Err(_) => self.timestamp.find(line).map(|m| m.as_str().to_string()),
        }
    }

    /// Lazily yields a candidate for every matching line, numbering lines
    /// from 1 in read order whether or not they match.
    pub fn detect<I>(&self, lines: I) -> Detections<'_, I::IntoIter>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        Detections {
            detector: self,
            lines: lines.into_iter().enumerate(),
        }
    }
}

impl Default for Detector {
    fn default() -> Self {
        Self::new(DEFAULT_SIGNALS).expect("default signals are valid")
    }
}

fn timestamp_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[derive(Clone)]
pub struct Detections<'a, I> {
    detector: &'a Detector,
    lines: Enumerate<I>,
}

impl<I> Iterator for Detections<'_, I>
where
    I: Iterator,
    I::Item: AsRef<str>,
{
    type Item = CandidateError;

    fn next(&mut self) -> Option<CandidateError> {
        for (idx, line) in self.lines.by_ref() {
            let line = line.as_ref();
            if self.detector.is_candidate(line) {
                return Some(CandidateError::new(
                    idx + 1,
                    line.to_string(),
                    self.detector.extract_timestamp(line),
                ));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_signal_lines_case_insensitively() {
        let detector = Detector::default();
        assert!(detector.is_candidate("ERROR: disk full"));
        assert!(detector.is_candidate("request Timeout after 30s"));
        assert!(detector.is_candidate("NullPointerException at Foo"));
        assert!(detector.is_candidate("job FAILED"));
        assert!(detector.is_candidate("Fatal: out of memory"));
        assert!(detector.is_candidate("critical section entered"));
        assert!(!detector.is_candidate("GET /health 200 OK"));
        assert!(!detector.is_candidate("warning: deprecated flag"));
    }

    #[test]
    fn line_numbers_follow_input_order() {
        let detector = Detector::default();
        let lines = ["ok", "error one", "ok", "ok", "timeout two"];
        let found: Vec<_> = detector.detect(lines).collect();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].line_number, 2);
        assert_eq!(found[0].content, "error one");
        assert_eq!(found[1].line_number, 5);
    }

    #[test]
    fn scenario_line_with_iso_timestamp() {
        let detector = Detector::default();
        let line = "2024-10-31T14:23:45 CRITICAL: database connection error";
        let found: Vec<_> = detector.detect([line]).collect();
        assert_eq!(
            found,
            vec![CandidateError::new(1, line.to_string(), Some("2024-10-31T14:23:45".to_string()))]
        );
    }

    #[test]
    fn structured_timestamp_is_preferred() {
        let detector = Detector::default();
        let line = r#"{"level":"error","msg":"failed at 2020-01-01T00:00:00","meta":{"timestamp":"2024-05-05T10:00:00Z"}}"#;
        assert_eq!(detector.extract_timestamp(line).as_deref(), Some("2024-05-05T10:00:00Z"));

        let line = r#"{"level":"error","timestamp":"2024-06-06T06:06:06Z"}"#;
        assert_eq!(detector.extract_timestamp(line).as_deref(), Some("2024-06-06T06:06:06Z"));
    }

    #[test]
    fn structured_line_without_timestamp_does_not_scrape() {
        let detector = Detector::default();
        let line = r#"{"msg":"error at 2020-01-01T00:00:00"}"#;
        assert_eq!(detector.extract_timestamp(line), None);
    }

    #[test]
    fn no_timestamp_anywhere() {
        let detector = Detector::default();
        assert_eq!(detector.extract_timestamp("error: something broke"), None);
    }

    #[test]
    fn detections_are_restartable() {
        let detector = Detector::default();
        let lines = vec!["error a", "fine", "fatal b"];
        let detections = detector.detect(lines.iter());
        let first: Vec<_> = detections.clone().collect();
        let second: Vec<_> = detections.collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn custom_signals_replace_defaults() {
        let detector = Detector::new(["panicked", r"\bOOM\b"]).unwrap();
        assert!(detector.is_candidate("thread 'main' PANICKED at src/main.rs"));
        assert!(detector.is_candidate("killed: oom"));
        assert!(!detector.is_candidate("error: this is no longer a signal"));
    }

    #[test]
    fn invalid_or_empty_signals_are_rejected() {
        assert!(matches!(
            Detector::new(["(unclosed"]),
            Err(DetectorError::InvalidSignal { .. })
        ));
        assert!(matches!(
            Detector::new(Vec::<String>::new()),
            Err(DetectorError::NoSignals)
        ));
    }

    #[test]
    fn empty_input_yields_nothing() {
        let detector = Detector::default();
        assert_eq!(detector.detect(Vec::<String>::new()).count(), 0);
    }
}
