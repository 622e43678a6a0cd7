use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::AccessKeyStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyType {
    User,
    Admin,
}

/// A row of the `access_keys` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessKey {
    pub access_key: String,
    pub user_name: String,

    #[serde(rename = "type")]
    pub key_type: KeyType,

    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub is_active: bool,

    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
}

impl AccessKey {
    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), AuthError> {
        if !self.is_active {
            return Err(AuthError::Deactivated);
        }

        match self.expires_at {
            Some(expires_at) if now > expires_at => Err(AuthError::Expired),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("access key header missing")]
    MissingKey,

    #[error("invalid access key")]
    InvalidKey,

    #[error("access key is deactivated")]
    Deactivated,

    #[error("access key has expired")]
    Expired,

    #[error("access key lookup failed: {0}")]
    Backend(String),
}

/// The authenticated caller. Generation itself never looks at this; it only
/// scopes history and audit records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_key: String,
    pub user_name: String,
    pub key_type: KeyType,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.key_type == KeyType::Admin
    }

    /// Looks the key up, checks it is active and unexpired, then stamps `last_login`.
    pub async fn authenticate<S>(
        store: &S,
        key: &str,
        now: DateTime<Utc>,
    ) -> Result<Self, AuthError>
    where
        S: AccessKeyStore + ?Sized,
    {
        let key = key.trim();
        if key.is_empty() {
            return Err(AuthError::MissingKey);
        }

        let record = store
            .find_access_key(key)
            .await
            .map_err(|e| AuthError::Backend(e.to_string()))?
            .ok_or(AuthError::InvalidKey)?;
        record.validate(now)?;

        if let Err(err) = store.touch_access_key(key, now).await {
            warn!("Failed to update last login for {}: {err:#}", record.user_name);
        }
        info!("Authenticated {} ({:?})", record.user_name, record.key_type);

        Ok(Self {
            access_key: record.access_key,
            user_name: record.user_name,
            key_type: record.key_type,
        })
    }
}
