use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use futures::try_join;
use log::{debug, warn};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{Axis, SynthError, SynthResult};
use crate::store::CatalogProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppType {
    Instagram,
    Facebook,
}

impl fmt::Display for AppType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            AppType::Instagram => "instagram",
            AppType::Facebook => "facebook",
        };
        write!(f, "{}", value)
    }
}

impl FromStr for AppType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "instagram" => Ok(AppType::Instagram),
            "facebook" => Ok(AppType::Facebook),
            other => Err(format!("unknown app type `{other}`")),
        }
    }
}

/// Treats an explicit JSON `null` the same as a missing field.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// FBRV columns have been stored both as text and as integers.
fn digits_field<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a string or integer, got {other}"
        ))),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceModel {
    pub model_name: String,

    #[serde(default)]
    pub min_ios_version: Option<String>,

    #[serde(default)]
    pub max_ios_version: Option<String>,

    #[serde(default, deserialize_with = "nullable")]
    pub screen_scaling: Vec<String>,

    #[serde(default, deserialize_with = "nullable")]
    pub is_active: bool,
}

impl DeviceModel {
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            min_ios_version: None,
            max_ios_version: None,
            screen_scaling: Vec::new(),
            is_active: true,
        }
    }

    /// Whether `version` falls inside this device's inclusive iOS range.
    /// Blank or absent bounds are open. A version or bound that is not
    /// dotted numeric never fits.
    pub fn supports(&self, version: &str) -> bool {
        let within = |bound: Option<&str>, outside: Ordering| -> bool {
            let Some(bound) = bound.map(str::trim).filter(|b| !b.is_empty()) else {
                return true;
            };
            match compare_versions(version, bound) {
                Some(ordering) => ordering != outside,
                None => {
                    warn!(
                        "{}: cannot compare iOS version `{version}` with bound `{bound}`",
                        self.model_name
                    );
                    false
                }
            }
        };

        within(self.min_ios_version.as_deref(), Ordering::Less)
            && within(self.max_ios_version.as_deref(), Ordering::Greater)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IosVersion {
    pub version: String,
    pub build_number: String,
    pub webkit_version: String,

    #[serde(default)]
    pub usage_percentage: Option<f64>,

    #[serde(default, deserialize_with = "nullable")]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppVersion {
    pub app_type: AppType,
    pub version: String,
    pub build_number: String,

    #[serde(default, deserialize_with = "digits_field")]
    pub fbrv: Option<String>,

    #[serde(default)]
    pub usage_percentage: Option<f64>,

    #[serde(default, deserialize_with = "nullable")]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub config_key: String,
    pub config_value: Value,

    #[serde(default)]
    pub description: Option<String>,
}

/// Locale distribution, kept in key order so seeded draws are stable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocaleWeights(BTreeMap<String, f64>);

impl LocaleWeights {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Parses a `languages` configuration row. The value is either a JSON
    /// object or a string holding one; percentages may be numbers or numeric strings.
    pub fn from_config(config: &Configuration) -> SynthResult<Self> {
        let parsed;
        let value = match &config.config_value {
            Value::String(raw) => {
                parsed = serde_json::from_str::<Value>(raw)
                    .map_err(|_| SynthError::MissingCatalogData(Axis::Locale))?;
                &parsed
            }
            other => other,
        };

        let Value::Object(map) = value else {
            return Err(SynthError::MissingCatalogData(Axis::Locale));
        };

        let mut weights = BTreeMap::new();
        for (locale, weight) in map {
            let weight = match weight {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            }
            .ok_or(SynthError::MissingCatalogData(Axis::Locale))?;
            weights.insert(locale.clone(), weight);
        }

        Ok(Self(weights))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, f64)> {
        self.0.iter().map(|(k, v)| (k, *v))
    }
}

/// Everything one batch of generations reads, fetched once.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogSnapshot {
    pub app_type: AppType,
    pub devices: Vec<DeviceModel>,
    pub ios_versions: Vec<IosVersion>,
    pub app_versions: Vec<AppVersion>,
    pub locales: Option<LocaleWeights>,
}

impl CatalogSnapshot {
    pub async fn fetch<P>(provider: &P, app_type: AppType, locale_key: &str) -> anyhow::Result<Self>
    where
        P: CatalogProvider + ?Sized,
    {
        let (devices, ios_versions, app_versions, locale_config) = try_join!(
            provider.device_models(),
            provider.ios_versions(),
            provider.app_versions(app_type),
            provider.configuration(locale_key),
        )?;

        let locales = match locale_config {
            Some(config) => match LocaleWeights::from_config(&config) {
                Ok(weights) => Some(weights),
                Err(err) => {
                    warn!("Ignoring `{locale_key}` configuration: {err}");
                    None
                }
            },
            None => None,
        };

        debug!(
            "snapshot for {app_type}: {} devices, {} ios versions, {} app versions",
            devices.len(),
            ios_versions.len(),
            app_versions.len()
        );

        Ok(Self {
            app_type,
            devices,
            ios_versions,
            app_versions,
            locales,
        })
    }
}

fn version_components(version: &str) -> Option<Vec<u64>> {
    version
        .trim()
        .split('.')
        .map(|part| part.trim().parse().ok())
        .collect()
}

/// Component-wise numeric comparison; missing components count as zero.
/// `None` when either side has a non-numeric component.
pub fn compare_versions(a: &str, b: &str) -> Option<Ordering> {
    let (a, b) = (version_components(a)?, version_components(b)?);

    for i in 0..a.len().max(b.len()) {
        let left = a.get(i).copied().unwrap_or(0);
        let right = b.get(i).copied().unwrap_or(0);
        match left.cmp(&right) {
            Ordering::Equal => continue,
            unequal => return Some(unequal),
        }
    }

    Some(Ordering::Equal)
}
