use serde::{Deserialize, Serialize};

/// How to treat students whose `internship_category` predates the category field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegacyCategoryPolicy {
    /// Proceed as if the student had declared a self-found internship.
    TreatAsSelfFound,
    /// Block category-dependent transitions until an admin categorizes the student.
    #[default]
    RequireCategorization,
}

impl LegacyCategoryPolicy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "self_found" | "treat_as_self_found" => Some(Self::TreatAsSelfFound),
            "require_categorization" | "manual" => Some(Self::RequireCategorization),
            _ => None,
        }
    }
}

/// Program-level knobs for the internship core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InternshipConfig {
    pub legacy_category: LegacyCategoryPolicy,
    pub max_marks: u16,
}

impl Default for InternshipConfig {
    fn default() -> Self {
        Self {
            legacy_category: LegacyCategoryPolicy::default(),
            max_marks: 100,
        }
    }
}
