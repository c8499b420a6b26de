pub mod api;
pub mod cache;
pub mod config;
pub mod fallback;
pub mod github;
pub mod metrics_defs;
pub mod normalize;
pub mod pinned;
pub mod resolver;
pub mod types;

#[cfg(test)]
mod testutils;

use crate::cache::ListingCache;
use crate::config::{Config, ValidationError};
use crate::fallback::LocalProjects;
use crate::github::{GitHubError, GitHubRepos};
use crate::resolver::{ProjectSource, Resolver};
use shared::admin_service::AdminService;
use shared::http::run_http_service;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum ShowcaseError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ValidationError),
    #[error("could not set up GitHub client: {0}")]
    GitHub(#[from] GitHubError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Wires GitHub first and the fallback file second behind the TTL cache.
pub fn build_cache(config: &Config) -> Result<ListingCache, ShowcaseError> {
    let pinned = config.pinned();

    tracing::info!(
        username = %config.github.username,
        pinned = ?pinned.names(),
        authenticated = config.github.token.is_some(),
        fallback = %config.fallback.path.display(),
        ttl_secs = config.cache.ttl_secs,
        "configuring project sources"
    );

    let remote = GitHubRepos::new(&config.github, pinned.clone())?;
    let local = LocalProjects::new(&config.fallback.path, pinned);
    let sources: Vec<Arc<dyn ProjectSource>> = vec![Arc::new(remote), Arc::new(local)];

    Ok(ListingCache::new(
        Resolver::new(sources),
        Duration::from_secs(config.cache.ttl_secs),
    ))
}

/// Runs the public API and the admin listener until either fails.
pub async fn run(config: Config) -> Result<(), ShowcaseError> {
    config.validate()?;
    let cache = build_cache(&config)?;

    let ready = Arc::new(AtomicBool::new(false));
    let ready_probe = ready.clone();
    let admin = AdminService::<_, ShowcaseError>::new(move || ready_probe.load(Ordering::Relaxed));

    let api_task = api::serve(&config.listener, cache, ready);
    let admin_task = run_http_service(
        &config.admin_listener.host,
        config.admin_listener.port,
        admin,
    );

    tokio::try_join!(api_task, admin_task)?;
    Ok(())
}
