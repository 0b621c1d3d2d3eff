//! Render-agnostic preparation of the order-location map: one validated
//! marker plus the service-zone overlays.

use crate::geo::{Coordinates, CoordinateError, ZonePolygon, collect_zone_polygons};
use crate::models::ServiceArea;

#[derive(Debug, Clone, PartialEq)]
pub struct ZoneOverlay {
    pub name: String,
    pub polygon: ZonePolygon,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapView {
    pub marker: Coordinates,
    pub zones: Vec<ZoneOverlay>,
    pub in_service_zone: bool,
}

impl MapView {
    /// Validate the marker and parse the zone overlays. Invalid coordinates
    /// abort map construction (the caller renders a warning instead); a zone
    /// that fails to parse is skipped, never the whole map.
    pub fn prepare(
        latitude: f64,
        longitude: f64,
        zones: &[ServiceArea],
    ) -> Result<Self, CoordinateError> {
        let marker = Coordinates::validated(latitude, longitude)?;
        let zones: Vec<ZoneOverlay> = collect_zone_polygons(
            zones
                .iter()
                .map(|z| (z.name.clone(), z.geo_json_polygon.as_str())),
        )
        .into_iter()
        .map(|(name, polygon)| ZoneOverlay { name, polygon })
        .collect();
        let in_service_zone = zones.iter().any(|zone| zone.polygon.contains(&marker));
        Ok(Self {
            marker,
            zones,
            in_service_zone,
        })
    }
}
