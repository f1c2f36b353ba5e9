use tracing::debug;

use crate::taxonomy::{Resolution, TaxonomyRegistry};
use crate::types::{CandidateError, Classification, NormalizedRecord, RawJudgment, Severity};

/// Maps an untrusted judgment onto the taxonomy. Never fails.
///
/// Severity, category and subcategory are resolved independently, except
/// that subcategories are only searched within the resolved category. The
/// resolved subcategory's suggestion and link always replace whatever
/// `suggested_action` the judgment carried.
pub fn normalize(
    candidate: CandidateError,
    raw: &RawJudgment,
    registry: &TaxonomyRegistry,
) -> NormalizedRecord {
    let severity = registry.resolve_severity(raw.severity.as_deref());
    let category = registry.resolve_category(raw.category.as_deref());
    let subcategory = registry.resolve_subcategory(category.entry, raw.subcategory.as_deref());

    if category.via != Resolution::Exact || subcategory.via != Resolution::Exact {
        debug!(
            line = candidate.line_number,
            raw_category = raw.category.as_deref().unwrap_or(""),
            raw_subcategory = raw.subcategory.as_deref().unwrap_or(""),
            category = category.entry.name(),
            category_via = ?category.via,
            subcategory = %subcategory.entry.name,
            subcategory_via = ?subcategory.via,
            "judgment labels did not match exactly"
        );
    }

    let fallback = registry.fallback();
    let analysis = Classification {
        severity,
        category: category.entry.name().to_string(),
        subcategory: subcategory.entry.name.clone(),
        description: text_or(raw.description.as_deref(), &fallback.description),
        impact: text_or(raw.impact.as_deref(), &fallback.impact),
        suggested_action: subcategory.entry.suggestion.clone(),
        reference_link: registry.reference_link(subcategory.entry).to_string(),
        code_example: subcategory.entry.code_example.clone(),
    };

    NormalizedRecord {
        candidate,
        analysis,
    }
}

/// Record for a candidate whose judgment could not be obtained at all.
pub fn degraded(candidate: CandidateError, registry: &TaxonomyRegistry) -> NormalizedRecord {
    let (category, subcategory) = registry.fallback_category_and_subcategory();
    let fallback = registry.fallback();

    NormalizedRecord {
        candidate,
        analysis: Classification {
            severity: Severity::Unknown,
            category: category.name().to_string(),
            subcategory: subcategory.name.clone(),
            description: fallback.failure_description.clone(),
            impact: fallback.failure_impact.clone(),
            suggested_action: subcategory.suggestion.clone(),
            reference_link: registry.reference_link(subcategory).to_string(),
            code_example: subcategory.code_example.clone(),
        },
    }
}

fn text_or(value: Option<&str>, default: &str) -> String {
    match value {
        Some(text) if !text.trim().is_empty() => text.to_string(),
        _ => default.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> TaxonomyRegistry {
        TaxonomyRegistry::builtin().unwrap()
    }

    fn candidate() -> CandidateError {
        CandidateError::new(
            1,
            "2024-10-31T14:23:45 CRITICAL: database connection error".to_string(),
            Some("2024-10-31T14:23:45".to_string()),
        )
    }

    fn judgment(severity: &str, category: &str, subcategory: &str) -> RawJudgment {
        RawJudgment {
            severity: Some(severity.to_string()),
            category: Some(category.to_string()),
            subcategory: Some(subcategory.to_string()),
            ..RawJudgment::default()
        }
    }

    #[test]
    fn unmatched_subcategory_uses_categorys_first_entry() {
        let registry = registry();
        let record = normalize(
            candidate(),
            &judgment("critical", "Migration", "nonexistent-garbage"),
            &registry,
        );

        let migration = &registry.categories()[3];
        let first = &migration.subcategories()[0];
        assert_eq!(record.analysis.severity, Severity::Level("CRITICAL".into()));
        assert_eq!(record.analysis.category, "Migration");
        assert_eq!(record.analysis.subcategory, first.name);
        assert_eq!(record.analysis.suggested_action, first.suggestion);
        assert_eq!(record.candidate, candidate());
    }

    #[test]
    fn exact_labels_reproduce_the_taxonomy_path() {
        let registry = registry();
        for category in registry.categories() {
            for sub in category.subcategories() {
                let record = normalize(
                    candidate(),
                    &judgment("HIGH", category.name(), &sub.name),
                    &registry,
                );
                assert_eq!(record.analysis.category, category.name());
                assert_eq!(record.analysis.subcategory, sub.name);
                assert_eq!(record.analysis.suggested_action, sub.suggestion);
                assert_eq!(record.analysis.reference_link, registry.reference_link(sub));
                assert_eq!(record.analysis.code_example, sub.code_example);
            }
        }
    }

    #[test]
    fn taxonomy_suggestion_overrides_free_text() {
        let registry = registry();
        let mut raw = judgment("HIGH", "Routing", "Routing Error");
        raw.suggested_action = Some("just reboot it".to_string());

        let record = normalize(candidate(), &raw, &registry);
        assert_ne!(record.analysis.suggested_action, "just reboot it");
        assert!(record.analysis.suggested_action.contains("HTTP verb"));
    }

    #[test]
    fn fuzzy_category_and_subcategory() {
        let registry = registry();
        let record = normalize(
            candidate(),
            &judgment("medium", "performance problems", "memory"),
            &registry,
        );
        assert_eq!(record.analysis.category, "Performance");
        assert_eq!(record.analysis.subcategory, "High Memory Usage");
    }

    #[test]
    fn empty_judgment_resolves_through_fallbacks() {
        let registry = registry();
        let record = normalize(candidate(), &RawJudgment::default(), &registry);

        assert_eq!(record.analysis.severity, Severity::Level("MEDIUM".into()));
        assert_eq!(record.analysis.category, "Unknown");
        assert_eq!(record.analysis.subcategory, "Unknown Error");
        assert_eq!(record.analysis.description, "No description available");
        assert_eq!(record.analysis.impact, "Unknown impact");
    }

    #[test]
    fn blank_text_fields_get_placeholders() {
        let registry = registry();
        let raw = RawJudgment {
            description: Some("   ".to_string()),
            impact: Some("checkout is down".to_string()),
            ..RawJudgment::default()
        };
        let record = normalize(candidate(), &raw, &registry);
        assert_eq!(record.analysis.description, "No description available");
        assert_eq!(record.analysis.impact, "checkout is down");
    }

    #[test]
    fn malformed_judgments_always_land_on_valid_paths() {
        let registry = registry();
        let labels = [
            "", " ", "CRITICAL", "crit", "unknown", "UNKNOWN", "Syntax", "tax", "x", "Error",
            "Unknown Error", "🔥", "routing/templating", "nil",
        ];
        for s in labels {
            for c in labels {
                for sub in labels {
                    let record = normalize(candidate(), &judgment(s, c, sub), &registry);
                    let a = &record.analysis;
                    assert!(!a.severity.is_unknown());
                    assert!(
                        registry.contains_path(&a.severity, &a.category, &a.subcategory),
                        "{s:?}/{c:?}/{sub:?} -> {a:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn normalization_is_deterministic() {
        let registry = registry();
        let raw = judgment("bad", "net", "garbage");
        let a = serde_json::to_string(&normalize(candidate(), &raw, &registry)).unwrap();
        let b = serde_json::to_string(&normalize(candidate(), &raw, &registry)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn degraded_record_is_unknown_and_on_fallback_path() {
        let registry = registry();
        let record = degraded(candidate(), &registry);
        let a = &record.analysis;

        assert_eq!(a.severity, Severity::Unknown);
        assert_eq!(a.category, "Unknown");
        assert_eq!(a.subcategory, "Unknown Error");
        assert_eq!(a.description, "AI analysis failed");
        assert_eq!(a.impact, "Unable to determine");
        assert!(registry.contains_path(&a.severity, &a.category, &a.subcategory));
    }
}
