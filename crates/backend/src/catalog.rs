use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use trackview_shared::models::TrackDocument;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackFile {
    pub file_name: String,
    pub size: u64,
    /// RFC 3339, when the filesystem reports one.
    pub modified: Option<String>,
}

/// The directory of generated track files. Read on every call, so files
/// dropped in while the server runs show up on the next page load.
pub struct TrackCatalog {
    dir: PathBuf,
}

impl TrackCatalog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        TrackCatalog { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Sorted `*.json` file names. `None` when the directory does not exist,
    /// which the viewer reports as a configuration problem.
    pub async fn file_names(&self) -> Result<Option<Vec<String>>, String> {
        Ok(self
            .list()
            .await?
            .map(|files| files.into_iter().map(|f| f.file_name).collect()))
    }

    pub async fn list(&self) -> Result<Option<Vec<TrackFile>>, String> {
        if !tokio::fs::metadata(&self.dir).await.is_ok_and(|m| m.is_dir()) {
            tracing::warn!(dir = %self.dir.display(), "Tracks directory not found");
            return Ok(None);
        }
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|e| format!("Failed to read {}: {}", self.dir.display(), e))?;

        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| format!("Failed to read {}: {}", self.dir.display(), e))?
        {
            let Ok(file_name) = entry.file_name().into_string() else {
                continue;
            };
            if !file_name.ends_with(".json") {
                continue;
            }
            let metadata = entry
                .metadata()
                .await
                .map_err(|e| format!("Failed to stat {}: {}", file_name, e))?;
            if !metadata.is_file() {
                continue;
            }
            let modified = metadata
                .modified()
                .ok()
                .map(|t| DateTime::<Utc>::from(t).to_rfc3339());
            files.push(TrackFile {
                file_name,
                size: metadata.len(),
                modified,
            });
        }
        files.sort_by(|a, b| a.file_name.cmp(&b.file_name));

        tracing::debug!(files = files.len(), dir = %self.dir.display(), "Listed track files");
        Ok(Some(files))
    }

    pub async fn read_document(&self, file_name: &str) -> Result<TrackDocument, String> {
        validate_file_name(file_name)?;
        let path = self.dir.join(file_name);
        let data = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| format!("Failed to read {}: {}", file_name, e))?;
        let doc = TrackDocument::from_json(&data)
            .map_err(|e| format!("Failed to parse {}: {}", file_name, e))?;
        tracing::info!(
            file = file_name,
            trajectories = doc.full.len() + doc.sub.len(),
            points = doc.point_count(),
            "Parsed track document"
        );
        Ok(doc)
    }
}

/// Plain `*.json` names only; anything that could leave the tracks
/// directory is refused.
pub fn validate_file_name(file_name: &str) -> Result<(), String> {
    if file_name.is_empty()
        || file_name.contains('/')
        || file_name.contains('\\')
        || file_name.contains("..")
        || !file_name.ends_with(".json")
    {
        return Err(format!("Invalid track file name: {file_name}"));
    }
    Ok(())
}
