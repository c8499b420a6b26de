//! The local fallback source serves a hand-curated JSON file of projects when
//! the GitHub API is unavailable or has nothing pinned to show.
use crate::normalize::{normalize, repo_name_from_url};
use crate::pinned::PinnedRepoSet;
use crate::resolver::{ProjectSource, SourceError};
use crate::types::{ProjectRecord, SourceTag};
use async_trait::async_trait;
use serde_json::Value;
use std::io;
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum FallbackError {
    #[error("could not read {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("{0} does not contain a JSON array")]
    NotArray(PathBuf),
}

pub struct LocalProjects {
    path: PathBuf,
    pinned: PinnedRepoSet,
}

impl LocalProjects {
    pub fn new(path: impl AsRef<Path>, pinned: PinnedRepoSet) -> Self {
        LocalProjects {
            path: path.as_ref().to_path_buf(),
            pinned,
        }
    }

    /// Reads and normalizes the file, keeping entries whose URL names a pinned
    /// repository. If nothing matches, every entry is returned: the file is
    /// curated by hand, so its contents are shown as written.
    pub async fn read(&self, pinned: &PinnedRepoSet) -> Result<Vec<ProjectRecord>, FallbackError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| FallbackError::Io {
                path: self.path.clone(),
                source,
            })?;

        let value: Value = serde_json::from_slice(&bytes).map_err(|source| FallbackError::Json {
            path: self.path.clone(),
            source,
        })?;

        let Value::Array(entries) = value else {
            return Err(FallbackError::NotArray(self.path.clone()));
        };

        let all: Vec<ProjectRecord> = entries.iter().map(normalize).collect();
        let matching: Vec<ProjectRecord> = all
            .iter()
            .filter(|project| {
                pinned.is_empty()
                    || repo_name_from_url(&project.github_url)
                        .is_some_and(|name| pinned.matches(&name))
            })
            .cloned()
            .collect();

        if matching.is_empty() && !all.is_empty() {
            tracing::info!(
                path = %self.path.display(),
                count = all.len(),
                "no local projects matched the pinned set, serving all of them"
            );
            return Ok(all);
        }

        Ok(matching)
    }
}

#[async_trait]
impl ProjectSource for LocalProjects {
    fn tag(&self) -> SourceTag {
        SourceTag::Local
    }

    async fn fetch(&self) -> Result<Vec<ProjectRecord>, SourceError> {
        self.read(&self.pinned)
            .await
            .map_err(|err| SourceError::Unavailable(err.to_string()))
    }
}
