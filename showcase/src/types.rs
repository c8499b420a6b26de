use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProjectId {
    Number(i64),
    Text(String),
}

/// The canonical project shape served to clients. Every field is always
/// present in the serialized form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    pub id: ProjectId,
    pub title: String,
    pub description: String,
    pub github_url: String,
    pub stars: u64,
    pub language: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SourceTag {
    Remote,
    Local,
}

impl SourceTag {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SourceTag::Remote => "remote",
            SourceTag::Local => "local",
        }
    }
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved project listing along with the source that produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct Listing {
    pub projects: Arc<Vec<ProjectRecord>>,
    pub source: SourceTag,
}

impl Listing {
    pub fn new(projects: Vec<ProjectRecord>, source: SourceTag) -> Self {
        Listing {
            projects: Arc::new(projects),
            source,
        }
    }
}
