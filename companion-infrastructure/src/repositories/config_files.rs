use std::path::Path;

use async_trait::async_trait;
use tokio::fs;
use tracing::{info, warn};

use companion_domain::{Ruleset, RulesetRepository};

/// Loads classification tables from YAML; a missing file means built-ins.
pub struct ConfigFileRepository;

impl ConfigFileRepository {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConfigFileRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RulesetRepository for ConfigFileRepository {
    async fn load_ruleset(&self, path: &str) -> anyhow::Result<Ruleset> {
        if path.trim().is_empty() || !Path::new(path).exists() {
            warn!(path, "ruleset file not found, using built-in tables");
            return Ok(Ruleset::default());
        }
        let content = fs::read_to_string(path).await?;
        let ruleset: Ruleset = serde_yaml::from_str(&content)?;
        let ruleset = ruleset.normalized();
        info!(
            path,
            raids = ruleset.raid_bosses.len(),
            bosses = ruleset.bosses.len(),
            rare_items = ruleset.rare_items.len(),
            "ruleset loaded"
        );
        Ok(ruleset)
    }
}

#[cfg(test)]
mod tests {
    use companion_domain::DEFAULT_VALUE_THRESHOLD;

    use super::*;

    #[tokio::test]
    async fn missing_file_yields_defaults() {
        let ruleset = ConfigFileRepository::new()
            .load_ruleset("/nonexistent/ruleset.yaml")
            .await
            .expect("defaults");
        assert_eq!(ruleset, Ruleset::default());
    }

    #[tokio::test]
    async fn partial_file_overrides_only_named_tables() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("ruleset.yaml");
        std::fs::write(&path, "bosses:\n  - Scurrius\n  - ' '\nvalue_threshold: 0\n").expect("write");

        let ruleset = ConfigFileRepository::new()
            .load_ruleset(&path.to_string_lossy())
            .await
            .expect("load");

        assert_eq!(ruleset.bosses, vec!["Scurrius".to_string()]);
        assert_eq!(ruleset.raid_bosses, Ruleset::default().raid_bosses);
        assert_eq!(ruleset.value_threshold, DEFAULT_VALUE_THRESHOLD);
    }
}
