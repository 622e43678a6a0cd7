use std::ops::RangeInclusive;
use std::str::FromStr;

use dotenv::var;

use crate::error::{SynthError, SynthResult};

pub const FBRV_DIGITS: usize = 9;

/// Observed FBRV range in live traffic, used when a catalog row has no FBRV.
pub const DEFAULT_FBRV_RANGE: RangeInclusive<u64> = 700_000_000..=700_999_999;

/// Tunables for one synthesizer. Probabilities are in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthConfig {
    pub legacy_probability: f64,
    pub experimental_probability: f64,
    pub iabmv_probability: f64,
    pub fbrv_fallback: RangeInclusive<u64>,
    pub default_scales: Vec<String>,
    /// FBSS carried by every legacy-grammar UA.
    pub legacy_scale: String,
    pub locale_key: String,
    pub max_batch: usize,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            legacy_probability: 0.5,
            experimental_probability: 0.1,
            iabmv_probability: 0.9,
            fbrv_fallback: DEFAULT_FBRV_RANGE,
            default_scales: vec!["1.00".into(), "2.00".into(), "3.00".into()],
            legacy_scale: "2".into(),
            locale_key: "languages".into(),
            max_batch: 100,
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> SynthResult<T> {
    match var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| SynthError::InvalidConfig(format!("{key}={raw} is not valid"))),
        Err(_) => Ok(default),
    }
}

impl SynthConfig {
    /// Reads `UA_*` variables (after `.env`), falling back to defaults.
    pub fn from_env() -> SynthResult<Self> {
        let defaults = Self::default();

        let default_scales = match var("UA_DEFAULT_SCALES") {
            Ok(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            Err(_) => defaults.default_scales,
        };

        let config = Self {
            legacy_probability: env_or("UA_LEGACY_PROBABILITY", defaults.legacy_probability)?,
            experimental_probability: env_or(
                "UA_EXPERIMENTAL_PROBABILITY",
                defaults.experimental_probability,
            )?,
            iabmv_probability: env_or("UA_IABMV_PROBABILITY", defaults.iabmv_probability)?,
            fbrv_fallback: env_or("UA_FBRV_MIN", *defaults.fbrv_fallback.start())?
                ..=env_or("UA_FBRV_MAX", *defaults.fbrv_fallback.end())?,
            default_scales,
            legacy_scale: env_or("UA_LEGACY_SCALE", defaults.legacy_scale)?,
            locale_key: env_or("UA_LOCALE_KEY", defaults.locale_key)?,
            max_batch: env_or("UA_MAX_BATCH", defaults.max_batch)?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> SynthResult<()> {
        for (name, p) in [
            ("legacy_probability", self.legacy_probability),
            ("experimental_probability", self.experimental_probability),
            ("iabmv_probability", self.iabmv_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(SynthError::InvalidConfig(format!(
                    "{name} must be within [0, 1], got {p}"
                )));
            }
        }

        let max_fbrv = 10u64.pow(FBRV_DIGITS as u32) - 1;
        if self.fbrv_fallback.is_empty() || *self.fbrv_fallback.end() > max_fbrv {
            return Err(SynthError::InvalidConfig(format!(
                "fbrv fallback range {:?} must be non-empty and fit in {FBRV_DIGITS} digits",
                self.fbrv_fallback
            )));
        }

        if self.legacy_scale.trim().is_empty() {
            return Err(SynthError::InvalidConfig("legacy_scale must not be empty".into()));
        }

        if self.max_batch == 0 {
            return Err(SynthError::InvalidConfig("max_batch must be positive".into()));
        }

        Ok(())
    }
}
