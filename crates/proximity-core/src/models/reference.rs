//! Spatial reference identifiers and click coordinates.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Well-known ID of a spatial reference system (WKID / EPSG code)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceId(pub u32);

/// Broad classification of a reference system, enough to pick units and
/// buffering strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferenceKind {
    /// Longitude/latitude in degrees
    Geographic,
    /// Spherical Web Mercator in metres
    WebMercator,
    /// Any other projected system with metre units
    Projected,
}

impl ReferenceId {
    /// WGS 84 (EPSG:4326)
    pub const WGS84: ReferenceId = ReferenceId(4326);

    /// Web Mercator (EPSG:3857)
    pub const WEB_MERCATOR: ReferenceId = ReferenceId(3857);

    /// Web Mercator under its legacy Esri WKID
    pub const WEB_MERCATOR_AUXILIARY: ReferenceId = ReferenceId(102100);

    pub fn new(wkid: u32) -> Self {
        Self(wkid)
    }

    pub fn wkid(&self) -> u32 {
        self.0
    }

    /// Classify this reference, `None` when the system is not supported
    pub fn kind(&self) -> Option<ReferenceKind> {
        match self.0 {
            4326 => Some(ReferenceKind::Geographic),
            3857 | 102100 | 102113 | 900913 => Some(ReferenceKind::WebMercator),
            // UTM zones on WGS 84, north and south
            32601..=32660 | 32701..=32760 => Some(ReferenceKind::Projected),
            _ => None,
        }
    }

    /// Human readable name for logs and notices
    pub fn name(&self) -> &'static str {
        match self.0 {
            4326 => "WGS 84",
            3857 => "WGS 84 / Pseudo-Mercator",
            102100 => "WGS 1984 Web Mercator (auxiliary sphere)",
            102113 => "WGS 1984 Web Mercator",
            900913 => "Google Maps Global Mercator",
            32601..=32660 => "WGS 84 / UTM north",
            32701..=32760 => "WGS 84 / UTM south",
            _ => "unknown",
        }
    }

    /// Two references describe the same coordinate space
    pub fn equivalent(&self, other: &ReferenceId) -> bool {
        self == other
            || (self.kind() == Some(ReferenceKind::WebMercator)
                && other.kind() == Some(ReferenceKind::WebMercator))
    }
}

impl fmt::Display for ReferenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ReferenceId {
    fn from(wkid: u32) -> Self {
        Self(wkid)
    }
}

/// A clicked location in a given reference system
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    x: f64,
    y: f64,
    reference: ReferenceId,
}

impl Coordinate {
    pub fn new(x: f64, y: f64, reference: ReferenceId) -> Self {
        Self { x, y, reference }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn reference(&self) -> ReferenceId {
        self.reference
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_kinds() {
        assert_eq!(ReferenceId::WGS84.kind(), Some(ReferenceKind::Geographic));
        assert_eq!(ReferenceId(102100).kind(), Some(ReferenceKind::WebMercator));
        assert_eq!(ReferenceId(3857).kind(), Some(ReferenceKind::WebMercator));
        assert_eq!(ReferenceId(32633).kind(), Some(ReferenceKind::Projected));
        assert_eq!(ReferenceId(32748).kind(), Some(ReferenceKind::Projected));
        assert_eq!(ReferenceId(2193).kind(), None);
    }

    #[test]
    fn test_web_mercator_aliases_are_equivalent() {
        assert!(ReferenceId(102100).equivalent(&ReferenceId(3857)));
        assert!(ReferenceId(900913).equivalent(&ReferenceId(102113)));
        assert!(!ReferenceId(4326).equivalent(&ReferenceId(3857)));
        assert!(ReferenceId(2193).equivalent(&ReferenceId(2193)));
    }

    #[test]
    fn test_reference_serializes_as_number() {
        let json = serde_json::to_string(&ReferenceId(102100)).unwrap();
        assert_eq!(json, "102100");
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn equivalence_is_symmetric(a in any::<u32>(), b in any::<u32>()) {
                let (a, b) = (ReferenceId(a), ReferenceId(b));
                prop_assert_eq!(a.equivalent(&b), b.equivalent(&a));
            }

            #[test]
            fn every_reference_is_equivalent_to_itself(wkid in any::<u32>()) {
                prop_assert!(ReferenceId(wkid).equivalent(&ReferenceId(wkid)));
            }
        }
    }
}
