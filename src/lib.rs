pub mod catalog;
pub mod config;
pub mod error;
pub mod fields;
pub mod grammar;
pub mod routes;
pub mod selector;
pub mod session;
pub mod store;
pub mod synth;

pub use catalog::{AppType, AppVersion, CatalogSnapshot, Configuration, DeviceModel, IosVersion};
pub use config::SynthConfig;
pub use error::{Axis, SynthError, SynthResult};
pub use synth::{GeneratedUserAgent, Synthesizer};
