//! Shared catalog fixtures.

#![allow(dead_code)]

use serde_json::{json, Value};
use ua_forge::catalog::LocaleWeights;
use ua_forge::session::{AccessKey, KeyType};
use ua_forge::{
    AppType, AppVersion, CatalogSnapshot, Configuration, DeviceModel, IosVersion, SynthConfig,
};

pub fn ios(version: &str, build: &str, weight: f64) -> IosVersion {
    IosVersion {
        version: version.into(),
        build_number: build.into(),
        webkit_version: "605.1.15".into(),
        usage_percentage: Some(weight),
        is_active: true,
    }
}

pub fn app(app_type: AppType, version: &str, fbrv: Option<&str>, weight: f64) -> AppVersion {
    AppVersion {
        app_type,
        version: version.into(),
        build_number: "123456789".into(),
        fbrv: fbrv.map(String::from),
        usage_percentage: Some(weight),
        is_active: true,
    }
}

pub fn languages(value: Value) -> Configuration {
    Configuration {
        config_key: "languages".into(),
        config_value: value,
        description: Some("Language distribution percentages".into()),
    }
}

/// One record per axis: iPhone 12, iOS 17.2.1, Instagram 324.0, en_US.
pub fn snapshot(fbrv: Option<&str>) -> CatalogSnapshot {
    CatalogSnapshot {
        app_type: AppType::Instagram,
        devices: vec![DeviceModel::new("iPhone 12")],
        ios_versions: vec![ios("17.2.1", "21C62", 100.0)],
        app_versions: vec![app(AppType::Instagram, "324.0", fbrv, 100.0)],
        locales: Some(LocaleWeights::new([("en_US", 100.0)])),
    }
}

/// A config with every branch probability pinned.
pub fn config(legacy: f64, experimental: f64, iabmv: f64) -> SynthConfig {
    SynthConfig {
        legacy_probability: legacy,
        experimental_probability: experimental,
        iabmv_probability: iabmv,
        ..SynthConfig::default()
    }
}

pub fn access_key(key: &str, key_type: KeyType) -> AccessKey {
    AccessKey {
        access_key: key.into(),
        user_name: format!("{key}-owner"),
        key_type,
        expires_at: None,
        is_active: true,
        last_login: None,
    }
}

pub fn languages_json() -> Value {
    json!({"en_US": 90, "es_US": 10})
}

/// Splits the bracketed app-info segment into its `KEY/value` tokens.
pub fn app_info_tokens(user_agent: &str) -> Vec<String> {
    let start = user_agent.find('[').expect("app info segment");
    let end = user_agent.rfind(']').expect("closing bracket");
    user_agent[start + 1..end].split(';').map(String::from).collect()
}
