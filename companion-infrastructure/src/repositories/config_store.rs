use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;
use toml::{Table, Value};

use companion_domain::ConfigStore;

/// `ConfigStore` over a flat TOML table, rewritten on every change.
pub struct TomlConfigStore {
    path: PathBuf,
    table: Mutex<Table>,
}

impl TomlConfigStore {
    pub async fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let table = if path.exists() {
            let content = fs::read_to_string(&path).await?;
            content.parse::<Table>()?
        } else {
            Table::new()
        };
        Ok(Self {
            path,
            table: Mutex::new(table),
        })
    }

    async fn persist(&self, table: &Table) -> anyhow::Result<()> {
        if let Some(parent) = Path::new(&self.path).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        let content = toml::to_string(table)?;
        fs::write(&self.path, content).await?;
        Ok(())
    }

    async fn set(&self, key: &str, value: Value) -> anyhow::Result<()> {
        let mut table = self.table.lock().await;
        table.insert(key.to_string(), value);
        self.persist(&table).await
    }
}

#[async_trait]
impl ConfigStore for TomlConfigStore {
    async fn get_string(&self, key: &str) -> Option<String> {
        let table = self.table.lock().await;
        table.get(key).and_then(Value::as_str).map(ToString::to_string)
    }

    async fn set_string(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.set(key, Value::String(value.to_string())).await
    }

    async fn get_bool(&self, key: &str) -> Option<bool> {
        let table = self.table.lock().await;
        table.get(key).and_then(Value::as_bool)
    }

    async fn set_bool(&self, key: &str, value: bool) -> anyhow::Result<()> {
        self.set(key, Value::Boolean(value)).await
    }

    async fn remove(&self, key: &str) -> anyhow::Result<()> {
        let mut table = self.table.lock().await;
        if table.remove(key).is_some() {
            self.persist(&table).await?;
        }
        Ok(())
    }
}
