//! Tectonic region types and geographic locations.

use std::str::FromStr;

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Crustal setting used to pick region-appropriate ground-motion models.
#[derive(
    Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TectonicRegionType {
    #[display("ACTIVE_SHALLOW")]
    ActiveShallow,
    #[display("STABLE_SHALLOW")]
    StableShallow,
    #[display("SUBDUCTION_INTERFACE")]
    SubductionInterface,
    #[display("SUBDUCTION_SLAB")]
    SubductionSlab,
    #[display("VOLCANIC")]
    Volcanic,
}

impl TectonicRegionType {
    pub const ALL: [TectonicRegionType; 5] = [
        TectonicRegionType::ActiveShallow,
        TectonicRegionType::StableShallow,
        TectonicRegionType::SubductionInterface,
        TectonicRegionType::SubductionSlab,
        TectonicRegionType::Volcanic,
    ];

    /// Human readable label, as used in source-model files.
    pub fn label(&self) -> &'static str {
        match self {
            TectonicRegionType::ActiveShallow => "Active Shallow Crust",
            TectonicRegionType::StableShallow => "Stable Shallow Crust",
            TectonicRegionType::SubductionInterface => "Subduction Interface",
            TectonicRegionType::SubductionSlab => "Subduction IntraSlab",
            TectonicRegionType::Volcanic => "Volcanic",
        }
    }
}

impl FromStr for TectonicRegionType {
    type Err = String;

    /// Accepts either the identifier (`ACTIVE_SHALLOW`) or the label
    /// (`Active Shallow Crust`), ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        TectonicRegionType::ALL
            .iter()
            .copied()
            .find(|trt| trt.to_string().eq_ignore_ascii_case(s) || trt.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown tectonic region type: {}", s))
    }
}

/// Geographic location (degrees, depth in km).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub depth: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64, depth: f64) -> Self {
        Self {
            latitude,
            longitude,
            depth,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_identifier_and_label() {
        assert_eq!(
            "active_shallow".parse::<TectonicRegionType>().unwrap(),
            TectonicRegionType::ActiveShallow
        );
        assert_eq!(
            "Subduction IntraSlab".parse::<TectonicRegionType>().unwrap(),
            TectonicRegionType::SubductionSlab
        );
        assert!("Mantle".parse::<TectonicRegionType>().is_err());
    }

    #[test]
    fn test_display_matches_serde_name() {
        let json = serde_json::to_string(&TectonicRegionType::StableShallow).unwrap();
        assert_eq!(json, format!("\"{}\"", TectonicRegionType::StableShallow));
    }
}
