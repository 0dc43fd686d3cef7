//! Static file serving module
//!
//! Resolves files under the configured root and serves them with validators
//! (`ETag`, `Last-Modified`), cache headers and conditional request handling.

use crate::config::Config;
use crate::http::{self, cache, mime, response, CacheHeaders, CachePolicy, ResponseHead};
use crate::logger;
use chrono::{DateTime, Utc};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::http::request::Parts;
use hyper::{Method, Response};
use std::path::{Path, PathBuf};
use tokio::fs;

/// A file loaded from disk
#[derive(Debug)]
pub struct StaticFile {
    pub path: PathBuf,
    pub content: Bytes,
    pub modified: Option<DateTime<Utc>>,
}

/// Serve a GET or HEAD request from the static root
pub async fn serve(parts: &Parts, config: &Config) -> Response<Full<Bytes>> {
    let file = load_from_directory(
        &config.static_files.root,
        parts.uri.path(),
        &config.static_files.index_files,
    )
    .await;

    let mut head = ResponseHead::new();
    let mut cache_headers = CacheHeaders::new(parts, &mut head);

    let Some(file) = file else {
        // The client may have asserted that the resource exists
        if cache_headers.validate(false) {
            return head.into_empty_response();
        }
        return http::build_404_response();
    };

    match config.cache.policy() {
        CachePolicy::NoCache => {
            cache_headers.no_cache();
        }
        policy => {
            let etag = cache::generate_etag(&file.content);
            if let Err(e) = cache_headers.etag(
                Some(&etag),
                config.cache.weak_etags,
                config.cache.weak_comparison,
            ) {
                logger::log_error(&format!("Cannot use ETag {etag:?}: {e}"));
            }
            cache_headers.last_modified(file.modified);
            cache_headers.apply_policy(policy);

            if cache_headers.validate(true) {
                return head.into_empty_response();
            }
        }
    }

    let content_type = mime::content_type_for(&file.path);
    response::build_content_response(head, file.content, content_type, parts.method == Method::HEAD)
}

/// Load a file under `root`, trying index files for directories
///
/// Returns `None` for missing files and for paths escaping the root.
pub async fn load_from_directory(
    root: &str,
    request_path: &str,
    index_files: &[String],
) -> Option<StaticFile> {
    let relative = sanitize_path(request_path)?;

    let root_canonical = match fs::canonicalize(root).await {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Static directory not found or inaccessible '{root}': {e}"
            ));
            return None;
        }
    };

    let mut file_path = root_canonical.join(&relative);
    if fs::metadata(&file_path).await.ok()?.is_dir() {
        file_path = find_index_file(&file_path, index_files).await?;
    }

    // File not found is common (404), no need to log at warning level
    let canonical = fs::canonicalize(&file_path).await.ok()?;
    if !canonical.starts_with(&root_canonical) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {request_path} -> {}",
            canonical.display()
        ));
        return None;
    }

    load_file(canonical).await
}

/// Read a file and its modification time
pub async fn load_file(path: PathBuf) -> Option<StaticFile> {
    let content = match fs::read(&path).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_error(&format!("Failed to read file '{}': {e}", path.display()));
            return None;
        }
    };

    let modified = fs::metadata(&path)
        .await
        .and_then(|m| m.modified())
        .ok()
        .map(DateTime::<Utc>::from);

    Some(StaticFile {
        path,
        content: Bytes::from(content),
        modified,
    })
}

async fn find_index_file(dir: &Path, index_files: &[String]) -> Option<PathBuf> {
    for index in index_files {
        let candidate = dir.join(index);
        if fs::metadata(&candidate).await.is_ok_and(|m| m.is_file()) {
            return Some(candidate);
        }
    }
    None
}

/// Relative path for a request path; `None` if it contains `..`
fn sanitize_path(request_path: &str) -> Option<PathBuf> {
    let mut relative = PathBuf::new();
    for segment in request_path.split('/') {
        match segment {
            "" | "." => {}
            ".." => return None,
            s if s.contains('\\') => return None,
            s => relative.push(s),
        }
    }
    Some(relative)
}
