use uuid::Uuid;

use storefront_admin_api::client::map::MapView;
use storefront_admin_api::geo::{
    CoordinateError, Coordinates, ZonePolygon, collect_zone_polygons, point_in_any_zone,
};
use storefront_admin_api::models::ServiceArea;

const SQUARE: &str =
    r#"{"type":"Polygon","coordinates":[[[38.0,8.0],[39.0,8.0],[39.0,9.0],[38.0,9.0],[38.0,8.0]]]}"#;
const FAR_SQUARE: &str =
    r#"{"type":"Polygon","coordinates":[[[0.0,0.0],[1.0,0.0],[1.0,1.0],[0.0,1.0],[0.0,0.0]]]}"#;

fn zone(name: &str, polygon: &str) -> ServiceArea {
    ServiceArea {
        id: Uuid::new_v4(),
        name: name.to_string(),
        geo_json_polygon: polygon.to_string(),
    }
}

#[test]
fn out_of_range_latitude_is_rejected() {
    assert_eq!(
        Coordinates::validated(91.0, 38.5),
        Err(CoordinateError::LatitudeOutOfRange(91.0))
    );
    assert_eq!(
        Coordinates::validated(8.5, 181.0),
        Err(CoordinateError::LongitudeOutOfRange(181.0))
    );
    assert_eq!(
        Coordinates::validated(f64::NAN, 38.5),
        Err(CoordinateError::NotFinite)
    );
    assert!(Coordinates::validated(-90.0, 180.0).is_ok());
}

#[test]
fn coordinates_must_come_in_pairs() {
    assert_eq!(
        Coordinates::from_optional(Some(8.5), None),
        Err(CoordinateError::Unpaired)
    );
    assert_eq!(Coordinates::from_optional(None, None), Ok(None));
    let coords = Coordinates::from_optional(Some(8.5), Some(38.5))
        .expect("valid pair")
        .expect("present");
    assert_eq!(coords.latitude, 8.5);
}

#[test]
fn polygon_containment_uses_lon_lat_order() {
    let polygon = ZonePolygon::parse(SQUARE).expect("square parses");
    assert!(polygon.contains(&Coordinates::validated(8.5, 38.5).unwrap()));
    assert!(!polygon.contains(&Coordinates::validated(38.5, 8.5).unwrap()));
}

#[test]
fn holes_subtract_from_the_exterior() {
    let with_hole = r#"{
        "type": "Polygon",
        "coordinates": [
            [[0.0,0.0],[10.0,0.0],[10.0,10.0],[0.0,10.0],[0.0,0.0]],
            [[4.0,4.0],[6.0,4.0],[6.0,6.0],[4.0,6.0],[4.0,4.0]]
        ]
    }"#;
    let polygon = ZonePolygon::parse(with_hole).expect("polygon with hole parses");
    assert!(polygon.contains(&Coordinates::validated(2.0, 2.0).unwrap()));
    assert!(!polygon.contains(&Coordinates::validated(5.0, 5.0).unwrap()));
}

#[test]
fn malformed_geometry_is_a_parse_error() {
    assert!(ZonePolygon::parse("not json at all").is_err());
    assert!(ZonePolygon::parse(r#"{"type":"Point","coordinates":[1.0,2.0]}"#).is_err());
    assert!(ZonePolygon::parse(r#"{"type":"Polygon","coordinates":[]}"#).is_err());
}

// One bad zone among N valid ones: exactly N polygons survive and nothing
// aborts.
#[test]
fn bad_zone_is_skipped_not_fatal() {
    let zones = vec![
        ("Downtown".to_string(), SQUARE),
        ("Broken".to_string(), "{{{"),
        ("Faraway".to_string(), FAR_SQUARE),
    ];
    let polygons = collect_zone_polygons(zones.clone());
    assert_eq!(polygons.len(), 2);
    assert!(polygons.iter().all(|(name, _)| name != "Broken"));

    let inside = Coordinates::validated(8.5, 38.5).unwrap();
    assert!(point_in_any_zone(&inside, zones));
}

#[test]
fn map_view_rejects_invalid_marker() {
    let zones = vec![zone("Downtown", SQUARE)];
    let err = MapView::prepare(91.0, 38.5, &zones).unwrap_err();
    assert_eq!(err, CoordinateError::LatitudeOutOfRange(91.0));
}

#[test]
fn map_view_renders_all_parseable_zones() {
    let zones = vec![
        zone("Downtown", SQUARE),
        zone("Broken", "oops"),
        zone("Faraway", FAR_SQUARE),
    ];
    let view = MapView::prepare(8.5, 38.5, &zones).expect("valid marker");
    assert_eq!(view.zones.len(), 2);
    assert!(view.in_service_zone);

    let view = MapView::prepare(-8.5, -38.5, &zones).expect("valid marker");
    assert!(!view.in_service_zone);
}
