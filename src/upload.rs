//! Uploaded-file persistence. Files land under `<upload_dir>/<subdir>/` and
//! are referenced by their public `/uploads/...` URL path; the directory is
//! served statically. Bodies are buffered in memory before the write — the
//! size cap is enforced upfront by the handlers.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;

pub const PROPOSALS_SUBDIR: &str = "proposals";
pub const ROOMS_SUBDIR: &str = "rooms";

/// Where a stored file ended up.
pub struct SavedFile {
    /// Public URL path, e.g. `/uploads/proposals/1700000000000-acara.pdf`.
    pub url: String,
    /// The client's original filename.
    pub original_name: String,
}

/// Strips anything outside [a-zA-Z0-9.-] and collapses underscore runs.
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_was_underscore = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
            out.push(c);
            last_was_underscore = false;
        } else if !last_was_underscore {
            out.push('_');
            last_was_underscore = true;
        }
    }
    if out.is_empty() {
        out.push_str("file");
    }
    out
}

pub async fn save(
    upload_dir: &str,
    subdir: &str,
    original_name: &str,
    bytes: &[u8],
) -> anyhow::Result<SavedFile> {
    let dir = Path::new(upload_dir).join(subdir);
    tokio::fs::create_dir_all(&dir)
        .await
        .with_context(|| format!("failed to create upload directory {}", dir.display()))?;

    let filename = format!(
        "{}-{}",
        Utc::now().timestamp_millis(),
        sanitize_filename(original_name)
    );
    let path = dir.join(&filename);
    tokio::fs::write(&path, bytes)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;

    tracing::debug!(path = %path.display(), size = bytes.len(), "stored upload");
    Ok(SavedFile {
        url: format!("/uploads/{subdir}/{filename}"),
        original_name: original_name.to_string(),
    })
}

/// Best-effort removal of a previously stored file, e.g. a replaced room
/// image. A missing file is not an error.
pub async fn remove(upload_dir: &str, url_path: &str) {
    let Some(relative) = url_path.strip_prefix("/uploads/") else {
        return;
    };
    // Refuse anything that could escape the upload directory.
    if relative.split('/').any(|seg| seg == "..") {
        tracing::warn!(url_path, "refusing to remove suspicious upload path");
        return;
    }
    let path: PathBuf = Path::new(upload_dir).join(relative);
    if let Err(e) = tokio::fs::remove_file(&path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %path.display(), "failed to remove upload: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_and_collapses() {
        assert_eq!(
            sanitize_filename("proposal acara (final).pdf"),
            "proposal_acara_final_.pdf"
        );
        assert_eq!(sanitize_filename("a  b///c.pdf"), "a_b_c.pdf");
        assert_eq!(sanitize_filename("laporan-2026.v2.pdf"), "laporan-2026.v2.pdf");
    }

    #[test]
    fn sanitize_never_returns_empty() {
        assert_eq!(sanitize_filename(""), "file");
    }

    #[test]
    fn sanitize_defuses_path_traversal() {
        assert_eq!(sanitize_filename("../../etc/passwd"), ".._.._etc_passwd");
    }

    #[tokio::test]
    async fn save_and_remove_round_trip() {
        let dir = std::env::temp_dir().join(format!("roomserve-test-{}", uuid::Uuid::new_v4()));
        let dir = dir.to_str().unwrap().to_string();

        let saved = save(&dir, PROPOSALS_SUBDIR, "acara.pdf", b"%PDF-1.4")
            .await
            .unwrap();
        assert!(saved.url.starts_with("/uploads/proposals/"));
        assert!(saved.url.ends_with("-acara.pdf"));
        assert_eq!(saved.original_name, "acara.pdf");

        let on_disk = std::path::Path::new(&dir)
            .join(saved.url.strip_prefix("/uploads/").unwrap());
        assert!(on_disk.exists());

        remove(&dir, &saved.url).await;
        assert!(!on_disk.exists());

        tokio::fs::remove_dir_all(&dir).await.ok();
    }
}
