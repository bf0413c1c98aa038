//! # Domain Models
//!
//! The listable entities of Eventra. Every record kind tolerates missing or
//! mistyped fields: text falls back to `None`, sequences to empty, counters
//! to zero. Unknown fields are kept in `extra` so records round-trip.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The filter value that disables a category/status control.
pub const ALL: &str = "all";

/// A community event (conference, workshop, meetup).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Event {
    pub id: Value,
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// e.g. "conference", "workshop"
    #[serde(rename = "type", deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// "upcoming" or "past"
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(deserialize_with = "lenient::strings")]
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A hackathon listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Hackathon {
    pub id: Value,
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// "upcoming", "live" or "completed"
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub prize: Option<String>,
    #[serde(deserialize_with = "lenient::strings")]
    pub tech_stack: Vec<String>,
    #[serde(deserialize_with = "lenient::flag")]
    pub featured: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An open-source project showcased on the projects page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    pub id: Value,
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(deserialize_with = "lenient::strings")]
    pub tech_stack: Vec<String>,
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    #[serde(deserialize_with = "lenient::count")]
    pub stars: u64,
    #[serde(deserialize_with = "lenient::count")]
    pub forks: u64,
    #[serde(deserialize_with = "lenient::count")]
    pub open_issues: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A GitHub contributor enriched with profile details and a derived role.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contributor {
    #[serde(deserialize_with = "lenient::text_or_empty")]
    pub login: String,
    #[serde(deserialize_with = "lenient::text")]
    pub avatar_url: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub html_url: Option<String>,
    #[serde(deserialize_with = "lenient::count")]
    pub contributions: u64,
    #[serde(deserialize_with = "lenient::count")]
    pub followers: u64,
    #[serde(deserialize_with = "lenient::count")]
    pub public_repos: u64,
    #[serde(deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub bio: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub company: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub location: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub role: Option<String>,
}

/// The uniform view the filter engine needs over any record kind.
///
/// Accessors default to "absent" so each kind only declares the fields it
/// actually carries.
pub trait Listing {
    fn title(&self) -> Option<&str>;
    fn description(&self) -> Option<&str>;
    fn location(&self) -> Option<&str> {
        None
    }
    fn author(&self) -> Option<&str> {
        None
    }
    /// Category, or `type` for events.
    fn category(&self) -> Option<&str> {
        None
    }
    fn status(&self) -> Option<&str> {
        None
    }
    /// Tags or tech stack.
    fn tags(&self) -> &[String] {
        &[]
    }
    fn last_updated(&self) -> Option<&str> {
        None
    }
    fn stars(&self) -> u64 {
        0
    }
    fn forks(&self) -> u64 {
        0
    }
    fn open_issues(&self) -> u64 {
        0
    }
    fn difficulty(&self) -> Option<&str> {
        None
    }
    fn prize(&self) -> Option<&str> {
        None
    }

    /// Whether the record passes the category control.
    fn matches_category(&self, filter: &str) -> bool {
        filter == ALL || self.category() == Some(filter)
    }

    /// Whether the record passes the status control.
    fn matches_status(&self, filter: &str) -> bool {
        filter == ALL || self.status() == Some(filter)
    }
}

impl Listing for Event {
    fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }
    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
    fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }
    fn category(&self) -> Option<&str> {
        self.kind.as_deref()
    }
    fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }
    fn tags(&self) -> &[String] {
        &self.tags
    }

    /// The events page has one control for both lifecycle and event type:
    /// "upcoming"/"past" select by status, anything else selects by type.
    fn matches_category(&self, filter: &str) -> bool {
        filter == ALL
            || (filter == "upcoming" && self.status() == Some("upcoming"))
            || (filter == "past" && self.status() == Some("past"))
            || self.kind.as_deref() == Some(filter)
    }
}

impl Listing for Hackathon {
    fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }
    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
    fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }
    fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }
    fn tags(&self) -> &[String] {
        &self.tech_stack
    }
    fn difficulty(&self) -> Option<&str> {
        self.difficulty.as_deref()
    }
    fn prize(&self) -> Option<&str> {
        self.prize.as_deref()
    }
}

impl Listing for Project {
    fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }
    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
    fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }
    fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }
    fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }
    fn tags(&self) -> &[String] {
        &self.tech_stack
    }
    fn last_updated(&self) -> Option<&str> {
        self.last_updated.as_deref()
    }
    fn stars(&self) -> u64 {
        self.stars
    }
    fn forks(&self) -> u64 {
        self.forks
    }
    fn open_issues(&self) -> u64 {
        self.open_issues
    }
}

/// Serde helpers that never fail on a wrong JSON type.
pub(crate) mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }

    pub fn text_or_empty<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(text(d)?.unwrap_or_default())
    }

    pub fn strings<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        })
    }

    pub fn count<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Number(n) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| *f > 0.0).map(|f| f as u64))
                .unwrap_or(0),
            Value::String(s) => s.trim().parse().unwrap_or(0),
            _ => 0,
        })
    }

    pub fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        Ok(matches!(Value::deserialize(d)?, Value::Bool(true)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn project_tolerates_missing_and_mistyped_fields() {
        let project: Project = serde_json::from_value(json!({
            "id": 7,
            "title": "Eventra",
            "techStack": null,
            "stars": "12",
            "forks": null,
            "homepage": "https://example.org"
        }))
        .unwrap();

        assert_eq!(project.title.as_deref(), Some("Eventra"));
        assert!(project.description.is_none());
        assert!(project.tech_stack.is_empty());
        assert_eq!(project.stars, 12);
        assert_eq!(project.forks, 0);
        assert_eq!(project.open_issues, 0);
        assert_eq!(project.extra["homepage"], "https://example.org");
    }

    #[test]
    fn event_type_field_is_renamed() {
        let event: Event = serde_json::from_value(json!({
            "id": "e1",
            "type": "workshop",
            "tags": ["rust", 3, "async"]
        }))
        .unwrap();
        assert_eq!(event.kind.as_deref(), Some("workshop"));
        assert_eq!(event.tags, vec!["rust", "async"]);

        let back = serde_json::to_value(&event).unwrap();
        assert_eq!(back["type"], "workshop");
        assert!(back.get("title").is_none());
    }

    #[test]
    fn event_category_control_checks_status_or_type() {
        let event = Event {
            kind: Some("conference".into()),
            status: Some("upcoming".into()),
            ..Default::default()
        };
        assert!(event.matches_category("all"));
        assert!(event.matches_category("upcoming"));
        assert!(event.matches_category("conference"));
        assert!(!event.matches_category("past"));
        assert!(!event.matches_category("workshop"));
    }

    #[test]
    fn category_match_is_case_sensitive() {
        let project = Project { category: Some("Web".into()), ..Default::default() };
        assert!(project.matches_category("Web"));
        assert!(!project.matches_category("web"));
    }
}
