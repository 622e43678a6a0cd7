use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::catalog::{AppType, AppVersion, CatalogSnapshot, DeviceModel, IosVersion};
use crate::config::SynthConfig;
use crate::error::{Axis, SynthError, SynthResult};
use crate::fields::{pick_locale, pick_scale, scale_token, FbrvPrefix};
use crate::grammar::{self, Body, ExtendedTail, Grammar, PrefixFields};
use crate::selector::SelectionAxis;

/// One synthesized UA together with the catalog values it was built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedUserAgent {
    pub user_agent: String,
    pub grammar: Grammar,
    pub app_type: AppType,
    pub device: String,
    pub ios_version: String,
    pub app_version: String,
    pub locale: String,
    pub scale: String,
    pub fbrv: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Synthesizer {
    config: SynthConfig,
}

impl Synthesizer {
    pub fn new(config: SynthConfig) -> SynthResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SynthConfig {
        &self.config
    }

    /// Synthesizes one UA. Draw order is fixed, so a seeded `rng` and an
    /// unchanged snapshot always give the same string.
    pub fn generate<R>(
        &self,
        snapshot: &CatalogSnapshot,
        rng: &mut R,
    ) -> SynthResult<GeneratedUserAgent>
    where
        R: Rng + ?Sized,
    {
        let device = select_device(&snapshot.devices, rng)?;
        let ios = select_ios_version(&snapshot.ios_versions, device, rng)?;
        let app = select_app_version(&snapshot.app_versions, snapshot.app_type, rng)?;
        let fbrv_prefix = FbrvPrefix::parse(app.fbrv.as_deref())?;
        let locale = pick_locale(snapshot.locales.as_ref(), rng)?;
        let drawn_scale = pick_scale(device, &self.config.default_scales, rng)?;

        let (body, scale) = match Grammar::choose(self.config.legacy_probability, rng) {
            Grammar::Legacy => (Body::Legacy, scale_token(&self.config.legacy_scale)),
            Grammar::Extended => (
                Body::Extended(self.extended_tail(&fbrv_prefix, rng)),
                drawn_scale,
            ),
        };

        let fields = PrefixFields {
            ios_version: &ios.version,
            ios_build: &ios.build_number,
            webkit_version: &ios.webkit_version,
            app_version: &app.version,
            app_build: &app.build_number,
            device: &device.model_name,
            scale: &scale,
            locale: &locale,
        };
        let user_agent = grammar::assemble(&fields, &body);
        debug!("generated {} UA: {user_agent}", body.grammar());

        Ok(GeneratedUserAgent {
            user_agent,
            grammar: body.grammar(),
            app_type: snapshot.app_type,
            device: device.model_name.clone(),
            ios_version: ios.version.clone(),
            app_version: app.version.clone(),
            locale,
            scale,
            fbrv: body.fbrv().map(String::from),
        })
    }

    /// The experimental and IABMV markers are independent draws. FBRV is only
    /// completed when the experimental marker is absent.
    fn extended_tail<R>(&self, fbrv: &FbrvPrefix, rng: &mut R) -> ExtendedTail
    where
        R: Rng + ?Sized,
    {
        let experimental = rng.gen_bool(self.config.experimental_probability);
        let fbrv = (!experimental).then(|| fbrv.complete(&self.config.fbrv_fallback, rng));
        let iabmv = rng.gen_bool(self.config.iabmv_probability);

        match fbrv {
            Some(fbrv) => ExtendedTail::Revision { fbrv, iabmv },
            None => ExtendedTail::Experimental { iabmv },
        }
    }

    /// Synthesizes `count` UAs from one snapshot, each with its own rng
    /// (`seed + index` when seeded). Stops at the first failure.
    pub fn generate_batch(
        &self,
        snapshot: &CatalogSnapshot,
        count: usize,
        seed: Option<u64>,
    ) -> SynthResult<Vec<GeneratedUserAgent>> {
        (0..count)
            .map(|i| {
                let mut rng = match seed {
                    Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(i as u64)),
                    None => StdRng::from_entropy(),
                };
                self.generate(snapshot, &mut rng)
            })
            .collect()
    }
}

fn select_device<'a, R>(devices: &'a [DeviceModel], rng: &mut R) -> SynthResult<&'a DeviceModel>
where
    R: Rng + ?Sized,
{
    let active: Vec<&DeviceModel> = devices.iter().filter(|d| d.is_active).collect();
    if active.is_empty() {
        return Err(SynthError::MissingCatalogData(Axis::Device));
    }

    SelectionAxis::uniform(Axis::Device, active).select(rng).copied()
}

fn select_ios_version<'a, R>(
    versions: &'a [IosVersion],
    device: &DeviceModel,
    rng: &mut R,
) -> SynthResult<&'a IosVersion>
where
    R: Rng + ?Sized,
{
    let active: Vec<&IosVersion> = versions.iter().filter(|v| v.is_active).collect();
    if active.is_empty() {
        return Err(SynthError::MissingCatalogData(Axis::OsVersion));
    }

    let compatible = active.into_iter().filter(|v| device.supports(&v.version));
    SelectionAxis::weighted(Axis::OsVersion, compatible, |v| {
        v.usage_percentage.unwrap_or(0.0)
    })
    .select(rng)
    .copied()
}

fn select_app_version<'a, R>(
    versions: &'a [AppVersion],
    app_type: AppType,
    rng: &mut R,
) -> SynthResult<&'a AppVersion>
where
    R: Rng + ?Sized,
{
    let active: Vec<&AppVersion> = versions
        .iter()
        .filter(|v| v.is_active && v.app_type == app_type)
        .collect();
    if active.is_empty() {
        return Err(SynthError::MissingCatalogData(Axis::AppVersion));
    }

    SelectionAxis::weighted(Axis::AppVersion, active, |v| v.usage_percentage.unwrap_or(0.0))
        .select(rng)
        .copied()
}
