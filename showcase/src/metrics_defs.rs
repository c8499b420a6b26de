//! Metrics definitions for the project listing service.

use shared::metrics_defs::{MetricDef, MetricType};

pub const CACHE_HIT: MetricDef = MetricDef {
    name: "listing_cache.hit",
    metric_type: MetricType::Counter,
    description: "Number of listing requests served from the in-process cache",
};

pub const CACHE_MISS: MetricDef = MetricDef {
    name: "listing_cache.miss",
    metric_type: MetricType::Counter,
    description: "Number of listing requests that required a fresh resolution",
};

pub const SOURCE_FAILURE: MetricDef = MetricDef {
    name: "listing.source.failure",
    metric_type: MetricType::Counter,
    description: "Number of failed or empty source attempts, tagged by source",
};

pub const RESOLVE_EXHAUSTED: MetricDef = MetricDef {
    name: "listing.resolve.exhausted",
    metric_type: MetricType::Counter,
    description: "Number of resolutions where every source failed",
};

pub const GITHUB_REQUEST_DURATION: MetricDef = MetricDef {
    name: "github.repos.duration",
    metric_type: MetricType::Histogram,
    description: "Time to fetch the repository list from GitHub in seconds",
};

pub const GITHUB_REPOS_RETURNED: MetricDef = MetricDef {
    name: "github.repos.rows",
    metric_type: MetricType::Histogram,
    description: "Number of repositories returned by GitHub before pin filtering",
};

pub const ALL_METRICS: &[MetricDef] = &[
    CACHE_HIT,
    CACHE_MISS,
    SOURCE_FAILURE,
    RESOLVE_EXHAUSTED,
    GITHUB_REQUEST_DURATION,
    GITHUB_REPOS_RETURNED,
];
