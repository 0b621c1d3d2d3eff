//! Coordinate validation and service-zone polygon handling.

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CoordinateError {
    #[error("coordinate is not a finite number")]
    NotFinite,

    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),

    #[error("latitude and longitude must be provided together")]
    Unpaired,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn validated(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(CoordinateError::NotFinite);
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// A coordinate pair is stored as two nullable columns; both must be
    /// present or both absent.
    pub fn from_optional(
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Result<Option<Self>, CoordinateError> {
        match (latitude, longitude) {
            (Some(lat), Some(lon)) => Self::validated(lat, lon).map(Some),
            (None, None) => Ok(None),
            _ => Err(CoordinateError::Unpaired),
        }
    }
}

#[derive(Debug, Error)]
pub enum ZoneParseError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported geometry type '{0}'")]
    UnsupportedGeometry(String),

    #[error("polygon has no exterior ring")]
    EmptyPolygon,
}

#[derive(Debug, Deserialize)]
struct RawGeometry {
    #[serde(rename = "type")]
    kind: String,
    // GeoJSON positions are [longitude, latitude], possibly with altitude.
    coordinates: Vec<Vec<Vec<f64>>>,
}

/// A parsed service-zone polygon: exterior ring plus any holes.
#[derive(Debug, Clone, PartialEq)]
pub struct ZonePolygon {
    rings: Vec<Vec<(f64, f64)>>,
}

impl ZonePolygon {
    pub fn parse(geo_json: &str) -> Result<Self, ZoneParseError> {
        let raw: RawGeometry = serde_json::from_str(geo_json)?;
        if raw.kind != "Polygon" {
            return Err(ZoneParseError::UnsupportedGeometry(raw.kind));
        }
        let mut rings = Vec::with_capacity(raw.coordinates.len());
        for ring in raw.coordinates {
            let mut points = Vec::with_capacity(ring.len());
            for position in ring {
                if position.len() < 2 {
                    return Err(ZoneParseError::EmptyPolygon);
                }
                points.push((position[0], position[1]));
            }
            rings.push(points);
        }
        if rings.first().map(Vec::len).unwrap_or(0) < 3 {
            return Err(ZoneParseError::EmptyPolygon);
        }
        Ok(Self { rings })
    }

    /// Ray-casting containment test; holes subtract from the exterior.
    pub fn contains(&self, point: &Coordinates) -> bool {
        let mut inside = false;
        for ring in &self.rings {
            if ring_contains(ring, point.longitude, point.latitude) {
                inside = !inside;
            }
        }
        inside
    }
}

fn ring_contains(ring: &[(f64, f64)], x: f64, y: f64) -> bool {
    let mut inside = false;
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = ring[i];
        let (xj, yj) = ring[j];
        if ((yi > y) != (yj > y)) && (x < (xj - xi) * (y - yi) / (yj - yi) + xi) {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Parse a batch of zone polygons, skipping (and logging) any zone whose
/// GeoJSON string does not parse. A bad zone never takes down the batch.
pub fn collect_zone_polygons<'a, I>(zones: I) -> Vec<(String, ZonePolygon)>
where
    I: IntoIterator<Item = (String, &'a str)>,
{
    let mut polygons = Vec::new();
    for (name, geo_json) in zones {
        match ZonePolygon::parse(geo_json) {
            Ok(polygon) => polygons.push((name, polygon)),
            Err(err) => {
                tracing::warn!(zone = %name, error = %err, "skipping unparseable service zone");
            }
        }
    }
    polygons
}

/// Whether the point falls inside any of the given zone polygon strings.
/// Unparseable zones are skipped.
pub fn point_in_any_zone<'a, I>(point: &Coordinates, zones: I) -> bool
where
    I: IntoIterator<Item = (String, &'a str)>,
{
    collect_zone_polygons(zones)
        .iter()
        .any(|(_, polygon)| polygon.contains(point))
}
