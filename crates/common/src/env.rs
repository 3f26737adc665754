//! Environment/runtime helpers
//!
//! Sanity checks run once at startup, before the listener is bound.

use std::path::Path;

use tracing::{info, warn};

/// Returns `true` when `static_dir` exists and is a directory.
///
/// A missing directory is not fatal: the API keeps working and the static
/// fallback simply answers 404.
pub async fn check_static_dir(static_dir: &Path) -> bool {
    match tokio::fs::metadata(static_dir).await {
        Ok(meta) if meta.is_dir() => {
            info!(static_dir = %static_dir.display(), "serving static assets");
            true
        }
        Ok(_) => {
            warn!(static_dir = %static_dir.display(), "static path is not a directory; static assets will 404");
            false
        }
        Err(_) => {
            warn!(static_dir = %static_dir.display(), "static assets directory not found; static assets will 404");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_dir_is_reported() {
        assert!(!check_static_dir(Path::new("/definitely/not/here")).await);
    }

    #[tokio::test]
    async fn existing_dir_is_accepted() {
        assert!(check_static_dir(&std::env::temp_dir()).await);
    }
}
