//! Query parameters driving a list view.

use crate::error::AppError;
use crate::models::ALL;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Ordering applied after filtering. Every key sorts descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Most recently updated first
    Recent,
    Stars,
    Forks,
    Issues,
}

impl FromStr for SortKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "recent" => Ok(SortKey::Recent),
            "stars" => Ok(SortKey::Stars),
            "forks" => Ok(SortKey::Forks),
            "issues" => Ok(SortKey::Issues),
            other => Err(AppError::field("sort", format!("unknown sort key `{other}`"))),
        }
    }
}

/// The current combination of search, filters and sort for one view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuerySpec {
    pub search_text: String,
    pub category_filter: String,
    pub status_filter: String,
    /// `None` when the view keeps input order.
    pub sort_key: Option<SortKey>,
    /// Exact difficulty match (hackathon filter panel)
    pub difficulty: Option<String>,
    /// Case-insensitive substring of the prize text
    pub prize: Option<String>,
    /// Case-insensitive substring of the location
    pub location: Option<String>,
}

impl Default for QuerySpec {
    fn default() -> Self {
        Self {
            search_text: String::new(),
            category_filter: ALL.to_string(),
            status_filter: ALL.to_string(),
            sort_key: None,
            difficulty: None,
            prize: None,
            location: None,
        }
    }
}

impl QuerySpec {
    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search_text = text.into();
        self
    }

    pub fn category(mut self, filter: impl Into<String>) -> Self {
        self.category_filter = filter.into();
        self
    }

    pub fn status(mut self, filter: impl Into<String>) -> Self {
        self.status_filter = filter.into();
        self
    }

    pub fn sort(mut self, key: SortKey) -> Self {
        self.sort_key = Some(key);
        self
    }

    /// The normalized search needle, or `None` when no text filter applies.
    pub fn needle(&self) -> Option<String> {
        normalized(&self.search_text)
    }
}

/// Trims and lower-cases; blank input means "no filter".
pub(crate) fn normalized(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_search_is_no_filter() {
        assert_eq!(QuerySpec::default().search("   \t").needle(), None);
        assert_eq!(QuerySpec::default().search("  Tech ").needle().as_deref(), Some("tech"));
    }

    #[test]
    fn sort_key_parses_known_values_only() {
        assert_eq!("stars".parse::<SortKey>().unwrap(), SortKey::Stars);
        assert_eq!("issues".parse::<SortKey>().unwrap(), SortKey::Issues);
        assert!("popularity".parse::<SortKey>().is_err());
    }

    #[test]
    fn default_disables_every_control() {
        let q = QuerySpec::default();
        assert_eq!(q.category_filter, "all");
        assert_eq!(q.status_filter, "all");
        assert!(q.sort_key.is_none());
    }
}
