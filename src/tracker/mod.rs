//! Issue tracker seam - issue types, queries and sources.
//!
//! The dashboard never talks HTTP itself. It asks an [`IssueSource`] for the
//! issues matching an [`IssueQuery`]; the bundled [`FixtureSource`] serves
//! them from a JSON file in the tracker's search-response shape, and
//! [`CachedSource`] puts a [`Cache`] in front of any source.

mod cache;

pub use cache::{Cache, CacheEntry, CachedSource, MemoryCache};

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Open sub-tasks assigned to the current user in open sprints.
pub const DEFAULT_QUERY: &str = "type in subTaskIssueTypes() \
and assignee = currentUser() \
and status != Done and status != \"Don't Need\" \
and sprint in openSprints() \
ORDER BY project, parent, updated DESC";

pub const DEFAULT_MAX_RESULTS: usize = 50;

pub fn default_fields() -> Vec<String> {
    vec!["summary".into(), "status".into(), "parent".into()]
}

// =============================================================================
// Issue shape
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueStatus {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentFields {
    pub summary: String,
    #[serde(default)]
    pub status: Option<IssueStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentIssue {
    pub key: String,
    pub fields: ParentFields,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueFields {
    pub summary: String,
    #[serde(default)]
    pub status: Option<IssueStatus>,
    #[serde(default)]
    pub parent: Option<ParentIssue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub id: String,
    pub key: String,
    pub fields: IssueFields,
}

impl Issue {
    pub fn status_name(&self) -> &str {
        self.fields
            .status
            .as_ref()
            .map(|s| s.name.as_str())
            .unwrap_or("")
    }
}

/// Either a bare array or a search response `{ "issues": [...] }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum IssuePayload {
    List(Vec<Issue>),
    Search { issues: Vec<Issue> },
}

/// Parse issues from JSON.
pub fn parse_issues(json: &str) -> Result<Vec<Issue>> {
    let payload: IssuePayload = serde_json::from_str(json)?;
    Ok(match payload {
        IssuePayload::List(issues) | IssuePayload::Search { issues } => issues,
    })
}

// =============================================================================
// Queries and sources
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueQuery {
    pub jql: String,
    pub max_results: usize,
    pub fields: Vec<String>,
}

impl IssueQuery {
    pub fn new(jql: impl Into<String>) -> Self {
        Self {
            jql: jql.into(),
            max_results: DEFAULT_MAX_RESULTS,
            fields: default_fields(),
        }
    }

    /// Cache key for this query's results.
    pub fn cache_key(&self) -> String {
        format!("issues:{}:{}", self.max_results, self.jql)
    }
}

impl Default for IssueQuery {
    fn default() -> Self {
        Self::new(DEFAULT_QUERY)
    }
}

/// Anything that can answer an issue search. Called from worker threads.
pub trait IssueSource: Send + Sync {
    fn search(&self, query: &IssueQuery) -> Result<Vec<Issue>>;

    /// Forget anything remembered about `query`, so the next search is fresh.
    fn invalidate(&self, _query: &IssueQuery) {}
}

/// Serves a fixed list of issues.
#[derive(Debug, Clone, Default)]
pub struct FixtureSource {
    issues: Vec<Issue>,
}

impl FixtureSource {
    pub fn new(issues: Vec<Issue>) -> Self {
        Self { issues }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|err| {
            Error::Tracker(format!("cannot read fixture {}: {err}", path.display()))
        })?;
        Ok(Self::new(parse_issues(&json)?))
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

impl IssueSource for FixtureSource {
    fn search(&self, query: &IssueQuery) -> Result<Vec<Issue>> {
        tracing::debug!(jql = %query.jql, max_results = query.max_results, "fixture search");
        Ok(self.issues.iter().take(query.max_results).cloned().collect())
    }
}

#[cfg(test)]
pub(crate) fn sample_issue(key: &str, summary: &str, status: &str) -> Issue {
    Issue {
        id: key.trim_start_matches(|c: char| !c.is_ascii_digit()).to_string(),
        key: key.to_string(),
        fields: IssueFields {
            summary: summary.to_string(),
            status: Some(IssueStatus { name: status.to_string() }),
            parent: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SEARCH_JSON: &str = r#"{
        "issues": [
            {
                "id": "10001",
                "key": "FLOW-2",
                "fields": {
                    "summary": "Wire status bar",
                    "status": { "name": "In Progress" },
                    "parent": {
                        "key": "FLOW-1",
                        "fields": { "summary": "Dashboard", "status": { "name": "Open" } }
                    }
                }
            },
            { "id": "10002", "key": "FLOW-3", "fields": { "summary": "No status" } }
        ]
    }"#;

    #[test]
    fn test_parse_search_response() {
        let issues = parse_issues(SEARCH_JSON).unwrap();
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].status_name(), "In Progress");
        assert_eq!(issues[0].fields.parent.as_ref().unwrap().key, "FLOW-1");
        assert_eq!(issues[1].status_name(), "");
    }

    #[test]
    fn test_parse_bare_array() {
        let json = r#"[{ "id": "1", "key": "A-1", "fields": { "summary": "x" } }]"#;
        assert_eq!(parse_issues(json).unwrap()[0].key, "A-1");
        assert!(matches!(parse_issues("{"), Err(Error::Json(_))));
    }

    #[test]
    fn test_fixture_from_path_respects_max_results() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SEARCH_JSON.as_bytes()).unwrap();

        let source = FixtureSource::from_path(file.path()).unwrap();
        assert_eq!(source.len(), 2);

        let mut query = IssueQuery::default();
        query.max_results = 1;
        let issues = source.search(&query).unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].key, "FLOW-2");
    }

    #[test]
    fn test_missing_fixture() {
        let err = FixtureSource::from_path("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, Error::Tracker(_)));
    }

    #[test]
    fn test_default_query() {
        let query = IssueQuery::default();
        assert!(query.jql.starts_with("type in subTaskIssueTypes()"));
        assert_eq!(query.fields, vec!["summary", "status", "parent"]);
        assert!(query.cache_key().starts_with("issues:50:"));
    }
}
