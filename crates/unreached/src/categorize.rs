use serde::{Deserialize, Serialize};

/// Label given to unused files that match no rule
pub const FALLBACK_CATEGORY: &str = "other";

/// One entry of the category policy: a file whose lower-cased relative path
/// contains any of `keywords` gets `label`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub label: String,
    pub keywords: Vec<String>,
}

impl CategoryRule {
    pub fn new(label: &str, keywords: &[&str]) -> Self {
        Self {
            label: label.to_string(),
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    /// Built-in policy, evaluated top to bottom
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("examples", &["example"]),
            Self::new("tests", &["test"]),
            Self::new("backups", &["backup"]),
            Self::new("fixes", &["fix"]),
            Self::new("utilities", &["util", "helper"]),
            Self::new("components", &["component"]),
            Self::new("styles", &["style"]),
            Self::new("api", &["api"]),
            Self::new("constants", &["constant"]),
        ]
    }

    fn matches(&self, lowered_path: &str) -> bool {
        self.keywords.iter().any(|k| lowered_path.contains(k.to_lowercase().as_str()))
    }
}

/// Assigns categories to unused files using an ordered rule list
#[derive(Debug, Clone)]
pub struct Categorizer {
    rules: Vec<CategoryRule>,
}

impl Categorizer {
    pub fn new(rules: Vec<CategoryRule>) -> Self {
        Self { rules }
    }

    /// Label of the first rule matching `path`, or `other`
    pub fn categorize(&self, path: &str) -> &str {
        let lowered = path.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&lowered))
            .map(|rule| rule.label.as_str())
            .unwrap_or(FALLBACK_CATEGORY)
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }
}

impl Default for Categorizer {
    fn default() -> Self {
        Self::new(CategoryRule::defaults())
    }
}
