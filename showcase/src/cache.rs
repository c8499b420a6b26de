// Time-bounded memo of the last successful listing. Requests within the TTL
// window are answered without touching GitHub or the filesystem.
use crate::metrics_defs::{CACHE_HIT, CACHE_MISS};
use crate::resolver::{ResolveError, Resolver};
use crate::types::Listing;
use moka::sync::Cache;
use shared::counter;
use std::time::Duration;

pub const DEFAULT_TTL: Duration = Duration::from_secs(600);

#[derive(Clone)]
pub struct ListingCache {
    resolver: Resolver,
    // Single-entry cache keyed by unit.
    entry: Cache<(), Listing>,
}

impl ListingCache {
    pub fn new(resolver: Resolver, ttl: Duration) -> Self {
        let entry = Cache::builder().time_to_live(ttl).build();

        ListingCache { resolver, entry }
    }

    /// Concurrent misses are not coalesced; each resolves on its own and the
    /// last insert wins.
    pub async fn get(&self) -> Result<Listing, ResolveError> {
        if let Some(listing) = self.entry.get(&()) {
            counter!(CACHE_HIT).increment(1);
            return Ok(listing);
        }
        counter!(CACHE_MISS).increment(1);

        let listing = self.resolver.resolve().await?;
        self.entry.insert((), listing.clone());
        Ok(listing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::tests::{StubSource, project};
    use crate::resolver::{ProjectSource, SourceError};
    use crate::types::SourceTag;
    use std::sync::Arc;

    fn cache_over(source: Arc<StubSource>, ttl: Duration) -> ListingCache {
        let sources: Vec<Arc<dyn ProjectSource>> = vec![source];
        ListingCache::new(Resolver::new(sources), ttl)
    }

    #[tokio::test]
    async fn test_hit_within_ttl() {
        let source = StubSource::new(SourceTag::Remote, Ok(vec![project("a"), project("b")]));
        let cache = cache_over(source.clone(), DEFAULT_TTL);

        let first = cache.get().await.unwrap();
        let second = cache.get().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(*second.projects, vec![project("a"), project("b")]);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_expiry_triggers_one_resolution() {
        let source = StubSource::new(SourceTag::Local, Ok(vec![project("a")]));
        let cache = cache_over(source.clone(), Duration::from_millis(100));

        cache.get().await.unwrap();
        tokio::time::sleep(Duration::from_millis(250)).await;
        cache.get().await.unwrap();
        cache.get().await.unwrap();

        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let source = StubSource::new(
            SourceTag::Remote,
            Err(SourceError::Unavailable("down".into())),
        );
        let cache = cache_over(source.clone(), DEFAULT_TTL);

        assert!(cache.get().await.is_err());
        assert!(cache.get().await.is_err());
        assert_eq!(source.calls(), 2);
    }
}
