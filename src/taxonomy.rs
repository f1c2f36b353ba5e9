//! Closed, versioned catalog of severities, categories and subcategories.
//!
//! Categories are stored as an arena in declared order. Each category owns
//! its subcategories, also in declared order. Lowercased name indexes serve
//! exact lookups; fuzzy lookups walk the declared order so the first
//! satisfying entry wins regardless of hashing.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::builtin;
use crate::error::TaxonomyError;
use crate::matching::{clean_label, contains_match, MatchKind};
use crate::types::{Severity, UNKNOWN_SEVERITY};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonomyDefinition {
    #[serde(default = "default_version")]
    pub version: String,
    pub severities: Vec<String>,
    pub default_severity: String,
    pub categories: Vec<CategoryDefinition>,
    #[serde(default)]
    pub fallback: FallbackDefinition,
}

fn default_version() -> String {
    "unversioned".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDefinition {
    #[serde(alias = "category")]
    pub name: String,
    pub subcategories: Vec<SubcategoryDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubcategoryDefinition {
    #[serde(alias = "subcategory")]
    pub name: String,
    pub suggestion: String,
    #[serde(default)]
    pub reference_link: Option<String>,
    #[serde(default)]
    pub code_example: Option<String>,
}

/// The universal fallback target plus the placeholder texts used when a
/// judgment leaves a field empty or could not be obtained at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FallbackDefinition {
    pub category: String,
    pub subcategory: String,
    pub reference_link: String,
    pub description: String,
    pub impact: String,
    pub failure_description: String,
    pub failure_impact: String,
}

impl Default for FallbackDefinition {
    fn default() -> Self {
        Self {
            category: builtin::FALLBACK_CATEGORY.to_string(),
            subcategory: builtin::FALLBACK_SUBCATEGORY.to_string(),
            reference_link: builtin::FALLBACK_LINK.to_string(),
            description: "No description available".to_string(),
            impact: "Unknown impact".to_string(),
            failure_description: "AI analysis failed".to_string(),
            failure_impact: "Unable to determine".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subcategory {
    pub name: String,
    pub suggestion: String,
    pub reference_link: Option<String>,
    pub code_example: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Category {
    name: String,
    subcategories: Vec<Subcategory>,
    index: HashMap<String, usize>,
}

impl Category {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn subcategories(&self) -> &[Subcategory] {
        &self.subcategories
    }

    /// First-declared subcategory, used when nothing else matches.
    pub fn default_subcategory(&self) -> &Subcategory {
        &self.subcategories[0]
    }
}

/// How a label was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Exact,
    Fuzzy,
    Fallback,
}

impl From<MatchKind> for Resolution {
    fn from(kind: MatchKind) -> Self {
        match kind {
            MatchKind::Exact => Resolution::Exact,
            MatchKind::Contains => Resolution::Fuzzy,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Resolved<'a, T> {
    pub entry: &'a T,
    pub via: Resolution,
}

#[derive(Debug, Clone)]
pub struct Fallback {
    category: usize,
    subcategory: usize,
    pub reference_link: String,
    pub description: String,
    pub impact: String,
    pub failure_description: String,
    pub failure_impact: String,
}

#[derive(Debug, Clone)]
pub struct TaxonomyRegistry {
    version: String,
    severities: Vec<String>,
    default_severity: usize,
    categories: Vec<Category>,
    category_index: HashMap<String, usize>,
    fallback: Fallback,
}

impl TaxonomyRegistry {
    pub fn new(definition: TaxonomyDefinition) -> Result<Self, TaxonomyError> {
        let TaxonomyDefinition {
            version,
            severities,
            default_severity,
            categories: category_defs,
            fallback,
        } = definition;

        if severities.is_empty() {
            return Err(TaxonomyError::NoSeverities);
        }
        for (i, label) in severities.iter().enumerate() {
            let well_formed = !label.is_empty()
                && label.trim() == label.as_str()
                && *label == label.to_uppercase();
            if !well_formed {
                return Err(TaxonomyError::SeverityNotUppercase(label.clone()));
            }
            if label == UNKNOWN_SEVERITY {
                return Err(TaxonomyError::ReservedSeverity(label.clone()));
            }
            if severities[..i].contains(label) {
                return Err(TaxonomyError::DuplicateSeverity(label.clone()));
            }
        }
        let default_severity = severities
            .iter()
            .position(|s| *s == default_severity)
            .ok_or(TaxonomyError::UnknownDefaultSeverity(default_severity))?;

        if category_defs.is_empty() {
            return Err(TaxonomyError::NoCategories);
        }

        let mut categories = Vec::with_capacity(category_defs.len());
        let mut category_index = HashMap::new();
        for def in category_defs {
            if def.name.trim().is_empty() {
                return Err(TaxonomyError::EmptyCategoryName);
            }
            if def.subcategories.is_empty() {
                return Err(TaxonomyError::EmptyCategory(def.name));
            }
            if category_index.contains_key(&def.name.to_lowercase()) {
                return Err(TaxonomyError::DuplicateCategory(def.name));
            }

            let mut subcategories = Vec::with_capacity(def.subcategories.len());
            let mut index = HashMap::new();
            for sub in def.subcategories {
                if sub.name.trim().is_empty() {
                    return Err(TaxonomyError::EmptySubcategoryName(def.name));
                }
                let key = sub.name.to_lowercase();
                if index.contains_key(&key) {
                    return Err(TaxonomyError::DuplicateSubcategory {
                        category: def.name,
                        subcategory: sub.name,
                    });
                }
                index.insert(key, subcategories.len());
                subcategories.push(Subcategory {
                    name: sub.name,
                    suggestion: sub.suggestion,
                    reference_link: sub.reference_link.filter(|l| !l.trim().is_empty()),
                    code_example: sub.code_example,
                });
            }

            category_index.insert(def.name.to_lowercase(), categories.len());
            categories.push(Category {
                name: def.name,
                subcategories,
                index,
            });
        }

        let fallback_category = *category_index
            .get(&fallback.category.to_lowercase())
            .ok_or_else(|| TaxonomyError::MissingFallbackCategory(fallback.category.clone()))?;
        let fallback_subcategory = *categories[fallback_category]
            .index
            .get(&fallback.subcategory.to_lowercase())
            .ok_or_else(|| TaxonomyError::MissingFallbackSubcategory {
                category: fallback.category.clone(),
                subcategory: fallback.subcategory.clone(),
            })?;

        Ok(Self {
            version,
            severities,
            default_severity,
            categories,
            category_index,
            fallback: Fallback {
                category: fallback_category,
                subcategory: fallback_subcategory,
                reference_link: fallback.reference_link,
                description: fallback.description,
                impact: fallback.impact,
                failure_description: fallback.failure_description,
                failure_impact: fallback.failure_impact,
            },
        })
    }

    pub fn builtin() -> Result<Self, TaxonomyError> {
        Self::new(builtin::definition())
    }

    /// Loads a JSON taxonomy shaped like [`TaxonomyDefinition`].
    pub fn from_file(path: &Path) -> Result<Self, TaxonomyError> {
        let raw = std::fs::read_to_string(path).map_err(|source| TaxonomyError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let definition: TaxonomyDefinition =
            serde_json::from_str(&raw).map_err(|source| TaxonomyError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Self::new(definition)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Severity labels, most severe first.
    pub fn severities(&self) -> &[String] {
        &self.severities
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn fallback(&self) -> &Fallback {
        &self.fallback
    }

    /// Position in severity order. `Unknown` and any label this registry
    /// does not declare rank after every declared level.
    pub fn rank(&self, severity: &Severity) -> usize {
        match severity {
            Severity::Level(label) => self
                .severities
                .iter()
                .position(|s| s == label)
                .unwrap_or(self.severities.len()),
            Severity::Unknown => self.severities.len() + 1,
        }
    }

    pub fn fallback_severity(&self) -> Severity {
        Severity::Level(self.severities[self.default_severity].clone())
    }

    pub fn fallback_category_and_subcategory(&self) -> (&Category, &Subcategory) {
        let category = &self.categories[self.fallback.category];
        (category, &category.subcategories[self.fallback.subcategory])
    }

    /// Uppercases the label and accepts it only on an exact match.
    pub fn resolve_severity(&self, label: Option<&str>) -> Severity {
        let Some(label) = clean_label(label) else {
            return self.fallback_severity();
        };
        let upper = label.to_uppercase();
        match self.severities.iter().find(|s| **s == upper) {
            Some(s) => Severity::Level(s.clone()),
            None => self.fallback_severity(),
        }
    }

    pub fn resolve_category(&self, label: Option<&str>) -> Resolved<'_, Category> {
        let found = clean_label(label).and_then(|label| {
            if let Some(&i) = self.category_index.get(&label.to_lowercase()) {
                return Some((i, Resolution::Exact));
            }
            contains_match(label, self.categories.iter().map(|c| c.name.as_str()))
                .map(|m| (m.index, m.kind.into()))
        });

        match found {
            Some((i, via)) => Resolved {
                entry: &self.categories[i],
                via,
            },
            None => Resolved {
                entry: &self.categories[self.fallback.category],
                via: Resolution::Fallback,
            },
        }
    }

    /// Resolves within `category` only. The fallback is the category's own
    /// first subcategory, not the global one.
    pub fn resolve_subcategory<'a>(
        &self,
        category: &'a Category,
        label: Option<&str>,
    ) -> Resolved<'a, Subcategory> {
        let found = clean_label(label).and_then(|label| {
            if let Some(&i) = category.index.get(&label.to_lowercase()) {
                return Some((i, Resolution::Exact));
            }
            contains_match(label, category.subcategories.iter().map(|s| s.name.as_str()))
                .map(|m| (m.index, m.kind.into()))
        });

        match found {
            Some((i, via)) => Resolved {
                entry: &category.subcategories[i],
                via,
            },
            None => Resolved {
                entry: category.default_subcategory(),
                via: Resolution::Fallback,
            },
        }
    }

    pub fn reference_link<'a>(&'a self, subcategory: &'a Subcategory) -> &'a str {
        subcategory
            .reference_link
            .as_deref()
            .unwrap_or(&self.fallback.reference_link)
    }

    /// Whether the triple is a valid path in this taxonomy.
    pub fn contains_path(&self, severity: &Severity, category: &str, subcategory: &str) -> bool {
        let severity_ok = match severity {
            Severity::Level(label) => self.severities.contains(label),
            Severity::Unknown => true,
        };
        severity_ok
            && self.categories.iter().any(|c| {
                c.name == category && c.subcategories.iter().any(|s| s.name == subcategory)
            })
    }
}
