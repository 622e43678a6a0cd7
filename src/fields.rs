use std::ops::RangeInclusive;

use rand::Rng;

use crate::catalog::{DeviceModel, LocaleWeights};
use crate::config::FBRV_DIGITS;
use crate::error::{Axis, SynthError, SynthResult};
use crate::selector::SelectionAxis;

/// `"2.00"` is how scales are stored; the UA carries `"2"`.
pub fn scale_token(scale: &str) -> String {
    let scale = scale.trim();
    scale.strip_suffix(".00").unwrap_or(scale).to_string()
}

/// Picks FBSS from the device's own scales, or from `defaults` when it lists none.
pub fn pick_scale<R>(device: &DeviceModel, defaults: &[String], rng: &mut R) -> SynthResult<String>
where
    R: Rng + ?Sized,
{
    let scales = if device.screen_scaling.is_empty() {
        defaults
    } else {
        &device.screen_scaling
    };

    let axis = SelectionAxis::uniform(Axis::Scale, scales.iter());
    axis.select(rng).map(|scale| scale_token(scale))
}

pub fn pick_locale<R>(locales: Option<&LocaleWeights>, rng: &mut R) -> SynthResult<String>
where
    R: Rng + ?Sized,
{
    let locales = locales
        .filter(|l| !l.is_empty())
        .ok_or(SynthError::MissingCatalogData(Axis::Locale))?;

    let mut axis = SelectionAxis::new(Axis::Locale);
    for (locale, weight) in locales.iter() {
        axis.push(locale, weight);
    }

    axis.select(rng).map(|locale| locale.to_string())
}

/// A validated FBRV catalog value: nothing, a partial prefix, or a full token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FbrvPrefix {
    Absent,
    Partial(String),
    Complete(String),
}

impl FbrvPrefix {
    /// Rejects anything that is not at most nine ASCII digits rather than coercing it.
    pub fn parse(raw: Option<&str>) -> SynthResult<Self> {
        let Some(raw) = raw.filter(|s| !s.is_empty()) else {
            return Ok(FbrvPrefix::Absent);
        };

        if !raw.bytes().all(|b| b.is_ascii_digit()) || raw.len() > FBRV_DIGITS {
            return Err(SynthError::MissingCatalogData(Axis::Fbrv));
        }

        if raw.len() == FBRV_DIGITS {
            Ok(FbrvPrefix::Complete(raw.to_string()))
        } else {
            Ok(FbrvPrefix::Partial(raw.to_string()))
        }
    }

    /// Produces the nine-digit token. Partial prefixes are kept verbatim and
    /// padded with random digits; absent values draw from `fallback`.
    pub fn complete<R>(&self, fallback: &RangeInclusive<u64>, rng: &mut R) -> String
    where
        R: Rng + ?Sized,
    {
        match self {
            FbrvPrefix::Absent => {
                format!("{:0width$}", rng.gen_range(fallback.clone()), width = FBRV_DIGITS)
            }
            FbrvPrefix::Partial(prefix) => {
                let remaining = FBRV_DIGITS - prefix.len();
                let suffix = rng.gen_range(0..10u64.pow(remaining as u32));
                format!("{prefix}{suffix:0remaining$}")
            }
            FbrvPrefix::Complete(fbrv) => fbrv.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn scale_suffix_is_stripped() {
        assert_eq!(scale_token("3.00"), "3");
        assert_eq!(scale_token(" 2.00 "), "2");
        assert_eq!(scale_token("2.61"), "2.61");
    }

    #[test]
    fn device_scales_take_precedence_over_defaults() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut device = DeviceModel::new("iPhone15,2");
        device.screen_scaling = vec!["3.00".into()];
        let defaults = vec!["1.00".to_string()];

        for _ in 0..50 {
            assert_eq!(pick_scale(&device, &defaults, &mut rng), Ok("3".to_string()));
        }

        device.screen_scaling.clear();
        assert_eq!(pick_scale(&device, &defaults, &mut rng), Ok("1".to_string()));
        assert_eq!(
            pick_scale(&device, &[], &mut rng),
            Err(SynthError::EmptyCandidateSet(Axis::Scale))
        );
    }

    #[test]
    fn absent_fbrv_draws_from_fallback_range() {
        let mut rng = StdRng::seed_from_u64(5);
        let range = 700_000_000..=700_999_999;

        for _ in 0..1_000 {
            let fbrv: u64 = FbrvPrefix::Absent.complete(&range, &mut rng).parse().unwrap();
            assert!(range.contains(&fbrv));
        }
    }

    #[test]
    fn small_fallback_range_is_zero_padded() {
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(FbrvPrefix::Absent.complete(&(42..=42), &mut rng), "000000042");
    }

    #[test]
    fn parse_classifies_by_length() {
        assert_eq!(FbrvPrefix::parse(None), Ok(FbrvPrefix::Absent));
        assert_eq!(FbrvPrefix::parse(Some("")), Ok(FbrvPrefix::Absent));
        assert_eq!(
            FbrvPrefix::parse(Some("7001234")),
            Ok(FbrvPrefix::Partial("7001234".into()))
        );
        assert_eq!(
            FbrvPrefix::parse(Some("123456789")),
            Ok(FbrvPrefix::Complete("123456789".into()))
        );
    }

    #[test]
    fn malformed_fbrv_is_missing_data() {
        for raw in ["70012a4", "1234567890", " 7001234", "-700"] {
            assert_eq!(
                FbrvPrefix::parse(Some(raw)),
                Err(SynthError::MissingCatalogData(Axis::Fbrv)),
                "{raw}"
            );
        }
    }
}
