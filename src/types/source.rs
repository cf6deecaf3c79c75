//! Seismic source representations.
//!
//! Area and point sources own one MFD per focal mechanism; fault and
//! subduction sources own exactly one MFD. Sources are treated as values:
//! mutation always produces a new source.

use serde::{Deserialize, Serialize};

use crate::types::mfd::Mfd;
use crate::types::region::{Location, TectonicRegionType};

/// Nodal plane orientation (degrees).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FocalMechanism {
    pub strike: f64,
    pub dip: f64,
    pub rake: f64,
}

/// An MFD paired with the focal mechanism its ruptures use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MfdForFocalMechanism {
    pub mfd: Mfd,
    pub focal_mechanism: FocalMechanism,
}

/// Depth to top of rupture as a function of magnitude: `(magnitude, depth_km)`.
pub type RuptureTopDepths = Vec<(f64, f64)>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaSource {
    pub id: String,
    pub name: String,
    pub tectonic_region: TectonicRegionType,
    /// Polygon outline.
    pub region: Vec<Location>,
    pub mfds: Vec<MfdForFocalMechanism>,
    #[serde(default)]
    pub rupture_top_depths: RuptureTopDepths,
    pub average_hypo_depth: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointSource {
    pub id: String,
    pub name: String,
    pub tectonic_region: TectonicRegionType,
    pub location: Location,
    pub mfds: Vec<MfdForFocalMechanism>,
    #[serde(default)]
    pub rupture_top_depths: RuptureTopDepths,
    pub average_hypo_depth: f64,
}

/// Simple fault: surface trace extruded down-dip between two depths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaultSource {
    pub id: String,
    pub name: String,
    pub tectonic_region: TectonicRegionType,
    pub mfd: Mfd,
    pub trace: Vec<Location>,
    pub dip: f64,
    pub rake: f64,
    pub seismogenic_depth_lower: f64,
    pub seismogenic_depth_upper: f64,
    pub floating_rupture: bool,
}

/// Complex fault described by a top and a bottom trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubductionFaultSource {
    pub id: String,
    pub name: String,
    pub tectonic_region: TectonicRegionType,
    pub top_trace: Vec<Location>,
    pub bottom_trace: Vec<Location>,
    pub rake: f64,
    pub mfd: Mfd,
    pub floating_rupture: bool,
}

/// Any of the supported source typologies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SeismicSource {
    Area(AreaSource),
    Point(PointSource),
    Fault(FaultSource),
    SubductionFault(SubductionFaultSource),
}

impl SeismicSource {
    pub fn id(&self) -> &str {
        match self {
            SeismicSource::Area(s) => &s.id,
            SeismicSource::Point(s) => &s.id,
            SeismicSource::Fault(s) => &s.id,
            SeismicSource::SubductionFault(s) => &s.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            SeismicSource::Area(s) => &s.name,
            SeismicSource::Point(s) => &s.name,
            SeismicSource::Fault(s) => &s.name,
            SeismicSource::SubductionFault(s) => &s.name,
        }
    }

    pub fn tectonic_region(&self) -> TectonicRegionType {
        match self {
            SeismicSource::Area(s) => s.tectonic_region,
            SeismicSource::Point(s) => s.tectonic_region,
            SeismicSource::Fault(s) => s.tectonic_region,
            SeismicSource::SubductionFault(s) => s.tectonic_region,
        }
    }

    /// Every MFD carried by the source, in storage order.
    pub fn mfds(&self) -> Vec<&Mfd> {
        match self {
            SeismicSource::Area(s) => s.mfds.iter().map(|m| &m.mfd).collect(),
            SeismicSource::Point(s) => s.mfds.iter().map(|m| &m.mfd).collect(),
            SeismicSource::Fault(s) => vec![&s.mfd],
            SeismicSource::SubductionFault(s) => vec![&s.mfd],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::mfd::IncrementalMfd;

    #[test]
    fn test_source_json_tagging() {
        let json = r#"{
            "type": "fault",
            "id": "f1",
            "name": "Fault One",
            "tectonic_region": "ACTIVE_SHALLOW",
            "mfd": {"type": "incremental", "min_mag": 6.0, "delta": 0.1, "rates": [0.01]},
            "trace": [{"latitude": 45.0, "longitude": 10.0}, {"latitude": 45.1, "longitude": 10.2}],
            "dip": 60.0,
            "rake": 90.0,
            "seismogenic_depth_lower": 15.0,
            "seismogenic_depth_upper": 0.0,
            "floating_rupture": true
        }"#;
        let source: SeismicSource = serde_json::from_str(json).unwrap();
        assert!(matches!(source, SeismicSource::Fault(_)));
        assert_eq!(source.name(), "Fault One");
        assert_eq!(source.tectonic_region(), TectonicRegionType::ActiveShallow);
        assert_eq!(
            source.mfds(),
            vec![&Mfd::Incremental(IncrementalMfd::new(6.0, 0.1, vec![0.01]))]
        );
    }
}
