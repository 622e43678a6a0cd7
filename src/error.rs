use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A selection axis, or catalog field, a generation can fail on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Device,
    OsVersion,
    AppVersion,
    Locale,
    Scale,
    Fbrv,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Axis::Device => "device",
            Axis::OsVersion => "os version",
            Axis::AppVersion => "app version",
            Axis::Locale => "locale",
            Axis::Scale => "scale",
            Axis::Fbrv => "fbrv",
        };
        write!(f, "{}", value)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SynthError {
    /// Records exist on the axis but none is eligible (all weights zero or undefined).
    #[error("no eligible candidates on the {0} axis")]
    EmptyCandidateSet(Axis),

    /// The axis has no usable catalog data at all.
    #[error("catalog data missing for the {0} axis")]
    MissingCatalogData(Axis),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SynthError {
    pub fn axis(&self) -> Option<Axis> {
        match self {
            SynthError::EmptyCandidateSet(axis) | SynthError::MissingCatalogData(axis) => {
                Some(*axis)
            }
            SynthError::InvalidConfig(_) => None,
        }
    }
}

pub type SynthResult<T> = Result<T, SynthError>;
