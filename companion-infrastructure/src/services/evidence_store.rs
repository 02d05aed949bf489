use std::path::PathBuf;

use anyhow::Result;
use async_trait::async_trait;
use tokio::fs;

use companion_domain::{CapturedImage, EvidenceName, EvidenceStore};

/// Saves screenshots as `<root>/<event_id>/<item>_<user>_<millis>.png`.
pub struct FileEvidenceStore {
    root: PathBuf,
}

impl FileEvidenceStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, name: &EvidenceName<'_>) -> PathBuf {
        let event_dir: String = name
            .event_id
            .chars()
            .filter(|ch| ch.is_ascii_alphanumeric() || *ch == '-' || *ch == '_')
            .collect();
        let event_dir = if event_dir.is_empty() { "unknown".to_string() } else { event_dir };
        let file_name = format!(
            "{}_{}_{}.png",
            alphanumeric(name.item),
            alphanumeric(name.user),
            name.taken_at_millis
        );
        self.root.join(event_dir).join(file_name)
    }
}

fn alphanumeric(value: &str) -> String {
    value.chars().filter(|ch| ch.is_ascii_alphanumeric()).collect()
}

#[async_trait]
impl EvidenceStore for FileEvidenceStore {
    async fn save(&self, name: &EvidenceName<'_>, image: &CapturedImage) -> Result<PathBuf> {
        let path = self.path_for(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, &image.png).await?;
        Ok(path)
    }
}
