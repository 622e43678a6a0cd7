use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{AccessKeyStore, CatalogProvider, Generation, GenerationLog};
use crate::catalog::{AppType, AppVersion, Configuration, DeviceModel, IosVersion};
use crate::session::AccessKey;

/// In-process stand-in for the hosted tables, used offline and in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub devices: RwLock<Vec<DeviceModel>>,
    pub ios_versions: RwLock<Vec<IosVersion>>,
    pub app_versions: RwLock<Vec<AppVersion>>,
    pub configurations: RwLock<Vec<Configuration>>,
    pub access_keys: RwLock<Vec<AccessKey>>,
    pub generations: RwLock<Vec<Generation>>,
}

impl MemoryStore {
    pub fn new(
        devices: Vec<DeviceModel>,
        ios_versions: Vec<IosVersion>,
        app_versions: Vec<AppVersion>,
        configurations: Vec<Configuration>,
    ) -> Self {
        Self {
            devices: RwLock::new(devices),
            ios_versions: RwLock::new(ios_versions),
            app_versions: RwLock::new(app_versions),
            configurations: RwLock::new(configurations),
            ..Self::default()
        }
    }

    pub fn with_access_keys(mut self, keys: Vec<AccessKey>) -> Self {
        self.access_keys = RwLock::new(keys);
        self
    }
}

#[async_trait]
impl CatalogProvider for MemoryStore {
    async fn device_models(&self) -> Result<Vec<DeviceModel>> {
        Ok(self.devices.read().await.clone())
    }

    async fn ios_versions(&self) -> Result<Vec<IosVersion>> {
        Ok(self.ios_versions.read().await.clone())
    }

    async fn app_versions(&self, app_type: AppType) -> Result<Vec<AppVersion>> {
        Ok(self
            .app_versions
            .read()
            .await
            .iter()
            .filter(|v| v.app_type == app_type)
            .cloned()
            .collect())
    }

    async fn configuration(&self, key: &str) -> Result<Option<Configuration>> {
        Ok(self
            .configurations
            .read()
            .await
            .iter()
            .find(|c| c.config_key == key)
            .cloned())
    }
}

#[async_trait]
impl GenerationLog for MemoryStore {
    async fn record(&self, generation: Generation) -> Result<()> {
        self.generations.write().await.push(generation);
        Ok(())
    }

    async fn history(&self, access_key: &str, limit: usize) -> Result<Vec<Generation>> {
        let mut rows: Vec<Generation> = self
            .generations
            .read()
            .await
            .iter()
            .filter(|g| g.access_key == access_key)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(limit);

        Ok(rows)
    }
}

#[async_trait]
impl AccessKeyStore for MemoryStore {
    async fn find_access_key(&self, key: &str) -> Result<Option<AccessKey>> {
        Ok(self
            .access_keys
            .read()
            .await
            .iter()
            .find(|k| k.access_key == key)
            .cloned())
    }

    async fn touch_access_key(&self, key: &str, at: DateTime<Utc>) -> Result<()> {
        if let Some(record) = self
            .access_keys
            .write()
            .await
            .iter_mut()
            .find(|k| k.access_key == key)
        {
            record.last_login = Some(at);
        }

        Ok(())
    }
}
