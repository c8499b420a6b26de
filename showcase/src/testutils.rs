use axum::Router;
use serde_json::{Value, json};
use std::path::PathBuf;
use tokio::net::TcpListener;
use url::Url;

/// Serves `app` on an ephemeral local port and returns its base URL.
pub async fn spawn_router(app: Router) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Url::parse(&format!("http://127.0.0.1:{port}/")).unwrap()
}

pub fn github_repo(id: i64, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "html_url": format!("https://github.com/someone/{name}"),
        "description": format!("{name} description"),
        "stargazers_count": id,
        "language": "Rust",
        "created_at": "2024-01-01T00:00:00Z",
    })
}

/// Writes `contents` to a projects file inside a fresh temp dir.
pub fn write_fallback(contents: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("projects.json");
    std::fs::write(&path, contents).unwrap();
    (dir, path)
}
