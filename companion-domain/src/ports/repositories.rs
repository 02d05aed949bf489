use async_trait::async_trait;

use crate::entities::Ruleset;

/// Persistent string/bool settings keyed by name (credentials live here).
#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn get_string(&self, key: &str) -> Option<String>;
    async fn set_string(&self, key: &str, value: &str) -> anyhow::Result<()>;
    async fn get_bool(&self, key: &str) -> Option<bool>;
    async fn set_bool(&self, key: &str, value: bool) -> anyhow::Result<()>;
    async fn remove(&self, key: &str) -> anyhow::Result<()>;
}

#[async_trait]
pub trait RulesetRepository: Send + Sync {
    async fn load_ruleset(&self, path: &str) -> anyhow::Result<Ruleset>;
}
