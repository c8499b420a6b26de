use crate::metrics_defs::{RESOLVE_EXHAUSTED, SOURCE_FAILURE};
use crate::types::{Listing, ProjectRecord, SourceTag};
use async_trait::async_trait;
use shared::counter;
use std::fmt;
use std::sync::Arc;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    #[error("source unavailable: {0}")]
    Unavailable(String),
    #[error("source returned no matching projects")]
    EmptyResult,
}

/// Every source failed. Carries each attempt's cause for server-side logs.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("all project sources exhausted: {}", DisplayFailures(.0))]
pub struct ResolveError(pub Vec<(SourceTag, SourceError)>);

struct DisplayFailures<'a>(&'a [(SourceTag, SourceError)]);

impl fmt::Display for DisplayFailures<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("no sources configured");
        }
        for (i, (tag, err)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{tag}: {err}")?;
        }
        Ok(())
    }
}

/// One place a project listing can come from.
#[async_trait]
pub trait ProjectSource: Send + Sync {
    fn tag(&self) -> SourceTag;

    async fn fetch(&self) -> Result<Vec<ProjectRecord>, SourceError>;
}

/// Tries each source once, in order, and returns the first non-empty listing.
pub async fn resolve_first(sources: &[Arc<dyn ProjectSource>]) -> Result<Listing, ResolveError> {
    let mut failures = Vec::with_capacity(sources.len());

    for source in sources {
        let tag = source.tag();
        let outcome = match source.fetch().await {
            Ok(projects) if projects.is_empty() => Err(SourceError::EmptyResult),
            other => other,
        };

        match outcome {
            Ok(projects) => {
                tracing::debug!(source = %tag, count = projects.len(), "resolved project listing");
                return Ok(Listing::new(projects, tag));
            }
            Err(err) => {
                tracing::warn!(source = %tag, error = %err, "project source failed, trying next");
                counter!(SOURCE_FAILURE, "source" => tag.as_str()).increment(1);
                failures.push((tag, err));
            }
        }
    }

    counter!(RESOLVE_EXHAUSTED).increment(1);
    Err(ResolveError(failures))
}

/// The ordered source chain: remote first, then the local fallback file.
#[derive(Clone)]
pub struct Resolver {
    sources: Arc<[Arc<dyn ProjectSource>]>,
}

impl Resolver {
    pub fn new(sources: Vec<Arc<dyn ProjectSource>>) -> Self {
        Resolver {
            sources: sources.into(),
        }
    }

    pub async fn resolve(&self) -> Result<Listing, ResolveError> {
        resolve_first(&self.sources).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::types::ProjectId;
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub fn project(name: &str) -> ProjectRecord {
        ProjectRecord {
            id: ProjectId::Text(name.into()),
            title: name.into(),
            description: "desc".into(),
            github_url: format!("https://github.com/someone/{name}"),
            stars: 0,
            language: None,
            created_at: None,
        }
    }

    /// Source returning a fixed outcome and counting its invocations.
    pub struct StubSource {
        tag: SourceTag,
        outcome: Result<Vec<ProjectRecord>, SourceError>,
        calls: AtomicUsize,
    }

    impl StubSource {
        pub fn new(tag: SourceTag, outcome: Result<Vec<ProjectRecord>, SourceError>) -> Arc<Self> {
            Arc::new(StubSource {
                tag,
                outcome,
                calls: AtomicUsize::new(0),
            })
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ProjectSource for StubSource {
        fn tag(&self) -> SourceTag {
            self.tag
        }

        async fn fetch(&self) -> Result<Vec<ProjectRecord>, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone()
        }
    }

    #[tokio::test]
    async fn test_remote_success_skips_local() {
        let remote = StubSource::new(SourceTag::Remote, Ok(vec![project("a")]));
        let local = StubSource::new(SourceTag::Local, Ok(vec![project("b")]));
        let resolver = Resolver::new(vec![remote.clone(), local.clone()]);

        let listing = resolver.resolve().await.unwrap();
        assert_eq!(listing.source, SourceTag::Remote);
        assert_eq!(*listing.projects, vec![project("a")]);
        assert_eq!(remote.calls(), 1);
        assert_eq!(local.calls(), 0);
    }

    #[tokio::test]
    async fn test_remote_failure_falls_back_once() {
        for remote_outcome in [
            Err(SourceError::Unavailable("timeout".into())),
            Ok(vec![]),
        ] {
            let remote = StubSource::new(SourceTag::Remote, remote_outcome);
            let local = StubSource::new(SourceTag::Local, Ok(vec![project("b")]));
            let resolver = Resolver::new(vec![remote.clone(), local.clone()]);

            let listing = resolver.resolve().await.unwrap();
            assert_eq!(listing.source, SourceTag::Local);
            assert_eq!(remote.calls(), 1);
            assert_eq!(local.calls(), 1);
        }
    }

    #[tokio::test]
    async fn test_all_sources_exhausted() {
        let remote = StubSource::new(
            SourceTag::Remote,
            Err(SourceError::Unavailable("HTTP 502".into())),
        );
        let local = StubSource::new(SourceTag::Local, Ok(vec![]));
        let resolver = Resolver::new(vec![remote.clone(), local.clone()]);

        let err = resolver.resolve().await.unwrap_err();
        assert_eq!(
            err,
            ResolveError(vec![
                (SourceTag::Remote, SourceError::Unavailable("HTTP 502".into())),
                (SourceTag::Local, SourceError::EmptyResult),
            ])
        );
        assert_eq!(local.calls(), 1);
        assert_eq!(
            err.to_string(),
            "all project sources exhausted: remote: source unavailable: HTTP 502; \
             local: source returned no matching projects"
        );
    }

    #[tokio::test]
    async fn test_no_sources() {
        let err = Resolver::new(vec![]).resolve().await.unwrap_err();
        assert!(err.0.is_empty());
    }
}
