use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::{AppType, AppVersion, Configuration, DeviceModel, IosVersion};
use crate::session::AccessKey;

pub mod memory;
pub mod supabase;

pub use memory::MemoryStore;
pub use supabase::SupabaseClient;

/// Read side of the catalog tables. Rows come back as stored, inactive ones
/// included; eligibility is decided at generation time.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    async fn device_models(&self) -> Result<Vec<DeviceModel>>;
    async fn ios_versions(&self) -> Result<Vec<IosVersion>>;
    async fn app_versions(&self, app_type: AppType) -> Result<Vec<AppVersion>>;
    async fn configuration(&self, key: &str) -> Result<Option<Configuration>>;
}

/// A row of the `user_generations` audit table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Generation {
    pub access_key: String,
    pub user_name: String,
    pub generated_data: Value,
    pub platform: String,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait GenerationLog: Send + Sync {
    async fn record(&self, generation: Generation) -> Result<()>;

    /// Newest first.
    async fn history(&self, access_key: &str, limit: usize) -> Result<Vec<Generation>>;
}

#[async_trait]
pub trait AccessKeyStore: Send + Sync {
    async fn find_access_key(&self, key: &str) -> Result<Option<AccessKey>>;
    async fn touch_access_key(&self, key: &str, at: DateTime<Utc>) -> Result<()>;
}
