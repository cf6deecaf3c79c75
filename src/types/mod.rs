//! Core types: magnitude-frequency distributions, seismic sources, configuration.

pub mod mfd;
pub mod region;
pub mod source;
pub mod config;

pub use mfd::{GutenbergRichterMfd, IncrementalMfd, Mfd};
pub use region::{Location, TectonicRegionType};
pub use source::{
    AreaSource, FaultSource, FocalMechanism, MfdForFocalMechanism, PointSource, SeismicSource,
    SubductionFaultSource,
};
pub use config::{ConfigError, SamplerConfig};
