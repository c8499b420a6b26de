//! Maps raw project entries, either repository objects from the hosting API
//! or hand-written entries from the fallback file, onto [`ProjectRecord`].
//!
//! Both shapes go through the same lookup table: each canonical field lists
//! the source keys it may be read from, in priority order.

use crate::types::{ProjectId, ProjectRecord};
use serde_json::{Map, Value};

pub const UNTITLED: &str = "Untitled Project";
pub const NO_DESCRIPTION: &str = "No description provided on GitHub.";
pub const NO_URL: &str = "#";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Field {
    Id,
    Title,
    Name,
    Description,
    GithubUrl,
    Stars,
    Language,
    Technologies,
    CreatedAt,
}

const FIELD_KEYS: &[(Field, &[&str])] = &[
    (Field::Id, &["id"]),
    (Field::Title, &["title"]),
    (Field::Name, &["name"]),
    (Field::Description, &["description"]),
    (Field::GithubUrl, &["githubUrl", "github_url", "html_url"]),
    (Field::Stars, &["stars", "stargazers_count", "stargazersCount"]),
    (Field::Language, &["language"]),
    (Field::Technologies, &["technologies"]),
    (Field::CreatedAt, &["createdAt", "created_at"]),
];

fn keys(field: Field) -> &'static [&'static str] {
    FIELD_KEYS
        .iter()
        .find(|(f, _)| *f == field)
        .map(|(_, keys)| *keys)
        .unwrap_or(&[])
}

/// First non-null value among the field's alternative keys.
fn lookup(raw: &Map<String, Value>, field: Field) -> Option<&Value> {
    keys(field)
        .iter()
        .filter_map(|key| raw.get(*key))
        .find(|value| !value.is_null())
}

fn lookup_str(raw: &Map<String, Value>, field: Field) -> Option<&str> {
    keys(field)
        .iter()
        .filter_map(|key| raw.get(*key))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
}

fn stars(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        _ => 0,
    }
}

fn source_id(value: Option<&Value>) -> Option<ProjectId> {
    match value? {
        Value::Number(n) => n.as_i64().map(ProjectId::Number),
        Value::String(s) if !s.trim().is_empty() => Some(ProjectId::Text(s.trim().to_string())),
        _ => None,
    }
}

fn readable_name(name: &str) -> String {
    name.replace(['-', '_'], " ")
}

/// Repository name for pin matching: the last non-empty path segment of the
/// URL, lower-cased.
pub fn repo_name_from_url(url: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() || url == NO_URL {
        return None;
    }
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .map(str::to_lowercase)
}

/// Never fails. Anything missing is filled with its default.
pub fn normalize(raw: &Value) -> ProjectRecord {
    let empty = Map::new();
    let raw = raw.as_object().unwrap_or(&empty);

    let title = lookup_str(raw, Field::Title)
        .map(str::to_string)
        .or_else(|| lookup_str(raw, Field::Name).map(readable_name))
        .unwrap_or_else(|| UNTITLED.to_string());

    let github_url = lookup_str(raw, Field::GithubUrl).unwrap_or(NO_URL).to_string();

    let id = source_id(lookup(raw, Field::Id))
        .or_else(|| (github_url != NO_URL).then(|| ProjectId::Text(github_url.clone())))
        .unwrap_or_else(|| ProjectId::Text(title.clone()));

    let language = lookup_str(raw, Field::Language)
        .map(str::to_string)
        .or_else(|| {
            lookup(raw, Field::Technologies)
                .and_then(Value::as_array)
                .and_then(|techs| techs.iter().filter_map(Value::as_str).next())
                .map(str::to_string)
        });

    ProjectRecord {
        id,
        title,
        description: lookup_str(raw, Field::Description)
            .unwrap_or(NO_DESCRIPTION)
            .to_string(),
        github_url,
        stars: stars(lookup(raw, Field::Stars)),
        language,
        created_at: lookup_str(raw, Field::CreatedAt).map(str::to_string),
    }
}
