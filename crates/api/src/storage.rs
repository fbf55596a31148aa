//! Local storage for uploaded floor plans.
//!
//! Files land under `UPLOAD_DIR/project_{pid}/unit_{uid}_{millis}.{ext}`.
//! Bytes are written to a hidden temporary file in the same directory and
//! renamed into place, so a reader never observes a partial upload.

use std::path::{Path, PathBuf};

use fitout_core::types::DbId;
use tokio::io::AsyncWriteExt;

use crate::error::AppError;

/// Accepted floor-plan file extensions (lowercase).
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "png", "jpg", "jpeg"];

/// Lowercased extension of `filename`, if it is an accepted floor-plan type.
pub fn floor_plan_extension(filename: &str) -> Result<String, AppError> {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(AppError::BadRequest(format!(
            "Unsupported floor plan format '.{ext}'. Supported: .pdf, .png, .jpg, .jpeg"
        )))
    }
}

/// MIME type for an accepted extension.
pub fn content_type_for(ext: &str) -> &'static str {
    match ext {
        "pdf" => "application/pdf",
        "png" => "image/png",
        _ => "image/jpeg",
    }
}

/// Write `data` atomically and return the final path.
pub async fn store_floor_plan(
    root: &Path,
    project_id: DbId,
    unit_id: DbId,
    ext: &str,
    data: &[u8],
) -> std::io::Result<PathBuf> {
    let dir = root.join(format!("project_{project_id}"));
    tokio::fs::create_dir_all(&dir).await?;

    let stored_name = format!(
        "unit_{unit_id}_{}.{ext}",
        chrono::Utc::now().timestamp_millis()
    );
    let final_path = dir.join(&stored_name);
    let temp_path = dir.join(format!(".{stored_name}.{}.tmp", uuid::Uuid::new_v4()));

    let written = async {
        let mut file = tokio::fs::File::create(&temp_path).await?;
        file.write_all(data).await?;
        file.sync_all().await?;
        tokio::fs::rename(&temp_path, &final_path).await?;
        Ok::<(), std::io::Error>(())
    }
    .await;

    if let Err(e) = written {
        remove_quietly(&temp_path).await;
        return Err(e);
    }
    Ok(final_path)
}

/// Delete a stored file, logging rather than failing when it cannot be removed.
pub async fn remove_quietly(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove stored file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_is_lowercased() {
        assert_eq!(floor_plan_extension("Plan.PDF").unwrap(), "pdf");
        assert_eq!(floor_plan_extension("plan.final.jpeg").unwrap(), "jpeg");
    }

    #[test]
    fn test_unsupported_extension_rejected() {
        assert!(floor_plan_extension("plan.dwg").is_err());
        assert!(floor_plan_extension("no-extension").is_err());
    }

    #[test]
    fn test_content_types() {
        assert_eq!(content_type_for("pdf"), "application/pdf");
        assert_eq!(content_type_for("jpg"), "image/jpeg");
    }

    #[tokio::test]
    async fn test_store_writes_final_file_only() {
        let root = tempfile::tempdir().unwrap();
        let path = store_floor_plan(root.path(), 3, 9, "png", b"png-bytes")
            .await
            .unwrap();

        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"png-bytes");
        assert!(path.starts_with(root.path().join("project_3")));

        let mut entries = tokio::fs::read_dir(root.path().join("project_3")).await.unwrap();
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
        assert_eq!(names.len(), 1);
        assert!(names[0].starts_with("unit_9_"));
    }

    #[tokio::test]
    async fn test_remove_quietly_ignores_missing() {
        let root = tempfile::tempdir().unwrap();
        remove_quietly(&root.path().join("missing.pdf")).await;
    }
}
