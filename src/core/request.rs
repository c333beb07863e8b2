/// Search requests and the databases they target

use crate::core::Category;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

/// Which plocate database a search runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseKind {
    System,
    Media,
}

impl DatabaseKind {
    pub fn name(&self) -> &str {
        match self {
            DatabaseKind::System => "system",
            DatabaseKind::Media => "media",
        }
    }
}

impl std::fmt::Display for DatabaseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for DatabaseKind {
    type Err = crate::error::LocateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "system" => Ok(DatabaseKind::System),
            "media" => Ok(DatabaseKind::Media),
            other => Err(crate::error::LocateError::Config(format!(
                "Unknown database: {}",
                other
            ))),
        }
    }
}

/// Everything the user picked before hitting search
///
/// Handed to a session by value, so it can't change under a running search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub pattern: String,
    pub case_sensitive: bool,
    pub use_regex: bool,
    pub category: Option<Category>,
    /// Regex applied to each returned path
    pub filter: Option<String>,
    pub targets: BTreeSet<DatabaseKind>,
}

impl SearchRequest {
    /// Case-sensitive literal search of the system database
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            case_sensitive: true,
            use_regex: false,
            category: None,
            filter: None,
            targets: BTreeSet::from([DatabaseKind::System]),
        }
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn regex(mut self, use_regex: bool) -> Self {
        self.use_regex = use_regex;
        self
    }

    pub fn category(mut self, category: Option<Category>) -> Self {
        self.category = category;
        self
    }

    pub fn filter(mut self, filter: Option<String>) -> Self {
        self.filter = filter.filter(|f| !f.trim().is_empty());
        self
    }

    pub fn targets<I: IntoIterator<Item = DatabaseKind>>(mut self, targets: I) -> Self {
        self.targets = targets.into_iter().collect();
        self
    }
}
