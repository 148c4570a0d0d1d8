//! Reprojection of search areas between reference systems.
//!
//! WGS 84 and spherical Web Mercator are handled by built-in tables. Other
//! pairs are delegated to PROJ when the `proj` feature is enabled.

use async_trait::async_trait;
use proximity_core::error::{ProximityError, Result};
use proximity_core::models::{ReferenceId, ReferenceKind, SearchArea};
use std::sync::Arc;
use tokio::sync::OnceCell;

#[cfg(feature = "proj")]
use proj::Proj;

/// WGS 84 semi-major axis used by spherical Web Mercator
const SPHERE_RADIUS: f64 = 6_378_137.0;

/// Latitude at which Web Mercator becomes a square
const MAX_MERCATOR_LATITUDE: f64 = 85.051_128_78;

/// Source of projection tables, loaded once per process
#[async_trait]
pub trait TableLoader: Send + Sync {
    async fn load(&self) -> Result<ProjectionTables>;
}

/// Loader for the tables compiled into this crate
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinTables;

#[async_trait]
impl TableLoader for BuiltinTables {
    async fn load(&self) -> Result<ProjectionTables> {
        Ok(ProjectionTables::builtin())
    }
}

/// Parameters needed to move coordinates between reference systems
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionTables {
    sphere_radius: f64,
    max_latitude: f64,
}

impl ProjectionTables {
    pub fn builtin() -> Self {
        Self { sphere_radius: SPHERE_RADIUS, max_latitude: MAX_MERCATOR_LATITUDE }
    }

    /// Whether a pair of references can be converted with these tables
    pub fn supports(&self, from: ReferenceId, to: ReferenceId) -> bool {
        if from.equivalent(&to) {
            return true;
        }
        match (from.kind(), to.kind()) {
            (Some(ReferenceKind::Geographic), Some(ReferenceKind::WebMercator))
            | (Some(ReferenceKind::WebMercator), Some(ReferenceKind::Geographic)) => true,
            (Some(_), Some(_)) => cfg!(feature = "proj"),
            _ => false,
        }
    }

    fn to_mercator(&self, lon: f64, lat: f64) -> (f64, f64) {
        let lat = lat.clamp(-self.max_latitude, self.max_latitude);
        let x = self.sphere_radius * lon.to_radians();
        let y = self.sphere_radius
            * (std::f64::consts::FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
        (x, y)
    }

    fn to_geographic(&self, x: f64, y: f64) -> (f64, f64) {
        let lon = (x / self.sphere_radius).to_degrees();
        let lat = (2.0 * (y / self.sphere_radius).exp().atan() - std::f64::consts::FRAC_PI_2)
            .to_degrees();
        (lon, lat)
    }
}

impl Default for ProjectionTables {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Lazily loaded projection tables shared by every query
///
/// The loader runs at most once even when several layers ask at the same
/// time. A failed load is not cached and the next caller retries.
pub struct ProjectionSupport {
    loader: Arc<dyn TableLoader>,
    tables: OnceCell<ProjectionTables>,
}

impl ProjectionSupport {
    pub fn new() -> Self {
        Self::with_loader(Arc::new(BuiltinTables))
    }

    pub fn with_loader(loader: Arc<dyn TableLoader>) -> Self {
        Self { loader, tables: OnceCell::new() }
    }

    /// Get the tables, loading them on first use
    pub async fn load(&self) -> Result<&ProjectionTables> {
        self.tables
            .get_or_try_init(|| async {
                tracing::debug!("Loading projection tables");
                let tables = self.loader.load().await?;
                tracing::info!("Projection tables loaded");
                Ok(tables)
            })
            .await
    }

    pub fn is_loaded(&self) -> bool {
        self.tables.initialized()
    }
}

impl Default for ProjectionSupport {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ProjectionSupport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectionSupport").field("loaded", &self.is_loaded()).finish()
    }
}

enum Conversion {
    Retag,
    ToMercator,
    ToGeographic,
    #[cfg(feature = "proj")]
    External(Proj),
}

impl Conversion {
    fn select(from: ReferenceId, to: ReferenceId) -> Result<Self> {
        if from.equivalent(&to) {
            return Ok(Conversion::Retag);
        }
        match (from.kind(), to.kind()) {
            (Some(ReferenceKind::Geographic), Some(ReferenceKind::WebMercator)) => {
                Ok(Conversion::ToMercator)
            }
            (Some(ReferenceKind::WebMercator), Some(ReferenceKind::Geographic)) => {
                Ok(Conversion::ToGeographic)
            }
            #[cfg(feature = "proj")]
            (Some(_), Some(_)) => {
                let from_code = proj_code(from);
                let to_code = proj_code(to);
                let proj = Proj::new_known_crs(&from_code, &to_code, None).map_err(|e| {
                    ProximityError::Projection {
                        from: from.wkid(),
                        to: to.wkid(),
                        reason: format!("Failed to create projection: {}", e),
                    }
                })?;
                Ok(Conversion::External(proj))
            }
            _ => Err(ProximityError::Projection {
                from: from.wkid(),
                to: to.wkid(),
                reason: "no transformation available for this pair".to_string(),
            }),
        }
    }

    fn apply(&self, tables: &ProjectionTables, x: f64, y: f64) -> std::result::Result<(f64, f64), String> {
        match self {
            Conversion::Retag => Ok((x, y)),
            Conversion::ToMercator => Ok(tables.to_mercator(x, y)),
            Conversion::ToGeographic => Ok(tables.to_geographic(x, y)),
            #[cfg(feature = "proj")]
            Conversion::External(proj) => proj.convert((x, y)).map_err(|e| e.to_string()),
        }
    }
}

/// PROJ only knows Web Mercator under its EPSG code
#[cfg(feature = "proj")]
fn proj_code(reference: ReferenceId) -> String {
    match reference.kind() {
        Some(ReferenceKind::WebMercator) => "EPSG:3857".to_string(),
        _ => format!("EPSG:{}", reference.wkid()),
    }
}

/// Express a search area in the target reference system
///
/// An area already in the target reference is returned unchanged, so
/// normalizing twice gives the same result as normalizing once.
pub fn normalize(
    area: &SearchArea,
    target: ReferenceId,
    tables: &ProjectionTables,
) -> Result<SearchArea> {
    let from = area.reference();
    if from == target {
        return Ok(area.clone());
    }

    let conversion = Conversion::select(from, target)?;

    let mut rings = Vec::with_capacity(area.rings().len());
    for ring in area.rings() {
        let mut converted = Vec::with_capacity(ring.len());
        for vertex in ring {
            let (x, y) = conversion.apply(tables, vertex[0], vertex[1]).map_err(|reason| {
                ProximityError::Projection { from: from.wkid(), to: target.wkid(), reason }
            })?;
            if !x.is_finite() || !y.is_finite() {
                return Err(ProximityError::Projection {
                    from: from.wkid(),
                    to: target.wkid(),
                    reason: format!("vertex ({}, {}) has no finite image", vertex[0], vertex[1]),
                });
            }
            converted.push([x, y]);
        }
        rings.push(converted);
    }

    tracing::trace!(from = from.wkid(), to = target.wkid(), "Normalized search area");

    Ok(SearchArea::new(rings, target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::build_search_area;
    use proptest::prelude::*;
    use proximity_core::models::Coordinate;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn mercator_area() -> SearchArea {
        build_search_area(&Coordinate::new(0.0, 0.0, ReferenceId(102100)), 100.0).unwrap()
    }

    #[test]
    fn test_same_reference_is_unchanged() {
        let area = mercator_area();
        let tables = ProjectionTables::builtin();
        let normalized = normalize(&area, ReferenceId(102100), &tables).unwrap();
        assert_eq!(normalized, area);
    }

    #[test]
    fn test_web_mercator_aliases_retag() {
        let area = mercator_area();
        let tables = ProjectionTables::builtin();
        let normalized = normalize(&area, ReferenceId::WEB_MERCATOR, &tables).unwrap();

        assert_eq!(normalized.reference(), ReferenceId::WEB_MERCATOR);
        assert_eq!(normalized.rings(), area.rings());
    }

    #[test]
    fn test_mercator_to_wgs84() {
        let tables = ProjectionTables::builtin();
        let normalized = normalize(&mercator_area(), ReferenceId::WGS84, &tables).unwrap();

        assert_eq!(normalized.reference(), ReferenceId::WGS84);
        // 100 m east of the origin is roughly 0.000898 degrees
        let first = normalized.rings()[0][0];
        assert!((first[0] - 0.000_898_3).abs() < 1e-6, "lon {}", first[0]);
        assert!(first[1].abs() < 1e-9);
    }

    #[test]
    fn test_round_trip_stays_close() {
        let tables = ProjectionTables::builtin();
        let area = build_search_area(
            &Coordinate::new(12_830_000.0, -950_000.0, ReferenceId::WEB_MERCATOR),
            500.0,
        )
        .unwrap();

        let there = normalize(&area, ReferenceId::WGS84, &tables).unwrap();
        let back = normalize(&there, ReferenceId::WEB_MERCATOR, &tables).unwrap();

        for (a, b) in area.rings()[0].iter().zip(&back.rings()[0]) {
            assert!((a[0] - b[0]).abs() < 1e-6);
            assert!((a[1] - b[1]).abs() < 1e-6);
        }
    }

    #[test]
    fn test_polar_latitudes_are_clamped() {
        let tables = ProjectionTables::builtin();
        let area = SearchArea::new(vec![vec![[0.0, 90.0], [1.0, 89.0], [0.0, 90.0]]], ReferenceId::WGS84);
        let normalized = normalize(&area, ReferenceId::WEB_MERCATOR, &tables).unwrap();

        let top = normalized.rings()[0][0][1];
        assert!(top.is_finite());
        assert!((top - 20_037_508.34).abs() < 1.0, "y {}", top);
    }

    #[cfg(not(feature = "proj"))]
    #[test]
    fn test_unsupported_pair_fails() {
        let tables = ProjectionTables::builtin();
        let area = SearchArea::new(vec![vec![[500_000.0, 9_000_000.0]]], ReferenceId(32748));

        assert!(!tables.supports(ReferenceId(32748), ReferenceId::WGS84));
        let result = normalize(&area, ReferenceId::WGS84, &tables);
        assert!(matches!(result, Err(ProximityError::Projection { from: 32748, to: 4326, .. })));
    }

    #[test]
    fn test_unknown_reference_fails() {
        let tables = ProjectionTables::builtin();
        let area = SearchArea::new(vec![vec![[0.0, 0.0]]], ReferenceId(2193));
        assert!(normalize(&area, ReferenceId::WGS84, &tables).is_err());
    }

    struct CountingLoader {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TableLoader for CountingLoader {
        async fn load(&self) -> Result<ProjectionTables> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok(ProjectionTables::builtin())
        }
    }

    struct FailingOnceLoader {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TableLoader for FailingOnceLoader {
        async fn load(&self) -> Result<ProjectionTables> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                return Err(ProximityError::Io(std::io::Error::other("tables unavailable")));
            }
            Ok(ProjectionTables::builtin())
        }
    }

    #[tokio::test]
    async fn test_concurrent_loads_run_loader_once() {
        let loader = Arc::new(CountingLoader { calls: AtomicUsize::new(0) });
        let support = ProjectionSupport::with_loader(loader.clone());
        assert!(!support.is_loaded());

        let (a, b, c) = tokio::join!(support.load(), support.load(), support.load());
        assert!(a.is_ok() && b.is_ok() && c.is_ok());

        support.load().await.unwrap();
        assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
        assert!(support.is_loaded());
    }

    #[tokio::test]
    async fn test_failed_load_is_retried() {
        let loader = Arc::new(FailingOnceLoader { calls: AtomicUsize::new(0) });
        let support = ProjectionSupport::with_loader(loader.clone());

        assert!(support.load().await.is_err());
        assert!(!support.is_loaded());
        assert!(support.load().await.is_ok());
        assert_eq!(loader.calls.load(Ordering::SeqCst), 2);
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(
            lon in -179.0f64..179.0,
            lat in -80.0f64..80.0,
            radius in 1.0f64..50_000.0,
        ) {
            let tables = ProjectionTables::builtin();
            let area = build_search_area(&Coordinate::new(lon, lat, ReferenceId::WGS84), radius).unwrap();

            let once = normalize(&area, ReferenceId(102100), &tables).unwrap();
            let twice = normalize(&once, ReferenceId(102100), &tables).unwrap();

            prop_assert_eq!(once.reference(), ReferenceId(102100));
            prop_assert_eq!(&once, &twice);
        }

        #[test]
        fn prop_buffer_keeps_reference_and_closes_ring(
            x in -1.0e7f64..1.0e7,
            y in -1.0e7f64..1.0e7,
            radius in 0.5f64..100_000.0,
        ) {
            let point = Coordinate::new(x, y, ReferenceId(102100));
            let area = build_search_area(&point, radius).unwrap();
            let ring = &area.rings()[0];

            prop_assert_eq!(area.reference(), point.reference());
            prop_assert_eq!(ring.first(), ring.last());
        }
    }
}
