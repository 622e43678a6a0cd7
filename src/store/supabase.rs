use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dotenv::var;
use log::{debug, error};
use reqwest::{
    header::{self, HeaderMap, HeaderValue},
    Client,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;

use super::{AccessKeyStore, CatalogProvider, Generation, GenerationLog};
use crate::catalog::{AppType, AppVersion, Configuration, DeviceModel, IosVersion};
use crate::session::AccessKey;

static DEVICE_MODELS: &str = "device_models";
static IOS_VERSIONS: &str = "ios_versions";
static APP_VERSIONS: &str = "app_versions";
static CONFIGURATIONS: &str = "configurations";
static USER_GENERATIONS: &str = "user_generations";
static ACCESS_KEYS: &str = "access_keys";

/// PostgREST client for the hosted Supabase tables.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    client: Client,
    base_url: String,
}

fn create_client_headers(api_key: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert("apikey", HeaderValue::from_str(api_key)?);
    headers.insert(
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {api_key}"))?,
    );

    Ok(headers)
}

impl SupabaseClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let client = Client::builder()
            .default_headers(create_client_headers(api_key)?)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Reads `SUPABASE_URL` and `SUPABASE_ANON_KEY`.
    pub fn from_env() -> Result<Self> {
        let url = var("SUPABASE_URL").context("SUPABASE_URL is not set")?;
        let key = var("SUPABASE_ANON_KEY").context("SUPABASE_ANON_KEY is not set")?;

        Self::new(&url, &key)
    }

    pub fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let response = self
            .client
            .get(self.table_url(table))
            .query(&[("select", "*")])
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Error fetching {table}: {body}");
            bail!("{table} request failed with {status}");
        }

        let rows: Vec<T> = response
            .json()
            .await
            .with_context(|| format!("Failed to decode {table} rows"))?;
        debug!("{table}: fetched {} rows", rows.len());

        Ok(rows)
    }

    async fn insert<T: Serialize + Sync>(&self, table: &str, row: &T) -> Result<()> {
        let response = self
            .client
            .post(self.table_url(table))
            .header("Prefer", "return=minimal")
            .json(row)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Error creating {table} row: {body}");
            bail!("{table} request failed with {status}");
        }

        Ok(())
    }

    async fn update(
        &self,
        table: &str,
        filter: (&str, String),
        patch: serde_json::Value,
    ) -> Result<()> {
        self.client
            .patch(self.table_url(table))
            .query(&[filter])
            .header("Prefer", "return=minimal")
            .json(&patch)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}

#[async_trait]
impl CatalogProvider for SupabaseClient {
    async fn device_models(&self) -> Result<Vec<DeviceModel>> {
        self.select(DEVICE_MODELS, &[("order", "created_date.desc".into())]).await
    }

    async fn ios_versions(&self) -> Result<Vec<IosVersion>> {
        self.select(IOS_VERSIONS, &[("order", "id.asc".into())]).await
    }

    async fn app_versions(&self, app_type: AppType) -> Result<Vec<AppVersion>> {
        self.select(
            APP_VERSIONS,
            &[
                ("app_type", format!("eq.{app_type}")),
                ("order", "id.asc".into()),
            ],
        )
        .await
    }

    async fn configuration(&self, key: &str) -> Result<Option<Configuration>> {
        let rows: Vec<Configuration> = self
            .select(CONFIGURATIONS, &[("config_key", format!("eq.{key}"))])
            .await?;

        Ok(rows.into_iter().next())
    }
}

#[async_trait]
impl GenerationLog for SupabaseClient {
    async fn record(&self, generation: Generation) -> Result<()> {
        self.insert(USER_GENERATIONS, &generation).await
    }

    async fn history(&self, access_key: &str, limit: usize) -> Result<Vec<Generation>> {
        self.select(
            USER_GENERATIONS,
            &[
                ("access_key", format!("eq.{access_key}")),
                ("order", "created_at.desc".into()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }
}

#[async_trait]
impl AccessKeyStore for SupabaseClient {
    async fn find_access_key(&self, key: &str) -> Result<Option<AccessKey>> {
        let rows: Vec<AccessKey> = self
            .select(ACCESS_KEYS, &[("access_key", format!("eq.{key}"))])
            .await?;

        Ok(rows.into_iter().next())
    }

    async fn touch_access_key(&self, key: &str, at: DateTime<Utc>) -> Result<()> {
        self.update(
            ACCESS_KEYS,
            ("access_key", format!("eq.{key}")),
            json!({ "last_login": at }),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_urls_ignore_trailing_slash() {
        let client = SupabaseClient::new("https://abc.supabase.co/", "anon").unwrap();
        assert_eq!(
            client.table_url(APP_VERSIONS),
            "https://abc.supabase.co/rest/v1/app_versions"
        );
    }

    #[test]
    fn invalid_key_is_rejected() {
        assert!(SupabaseClient::new("https://abc.supabase.co", "bad\nkey").is_err());
    }
}
