//! Upload a zipped shapefile built in memory, split it and export the
//! result, going through the public API only.

#[path = "../src/fixtures.rs"]
#[allow(dead_code)]
mod fixtures;

use geojson::GeoJson;

use shp_segments::status::Level;
use shp_segments::style::PALETTE;
use shp_segments::{Error, MapSession, output};

#[test]
fn zipped_lines_become_colored_segments() {
    let mut session = MapSession::default();
    let loaded = session
        .upload_bytes("roads.zip", &fixtures::roads_zip())
        .unwrap();
    assert_eq!(loaded, 2);

    let created = session.split_lines_by_vertices().unwrap();
    assert_eq!(created, 5);
    assert_eq!(session.upload_message().unwrap().level, Level::Success);

    let json = serde_json::to_string(&output::to_geojson(
        session.graphics(),
        session.extent(),
    ))
    .unwrap();
    let GeoJson::FeatureCollection(fc) = json.parse::<GeoJson>().unwrap() else {
        panic!("expected a FeatureCollection");
    };

    assert_eq!(fc.features.len(), 5);
    assert!(fc.bbox.is_some(), "extent should be written as bbox");
    for (i, feature) in fc.features.iter().enumerate() {
        let stroke = feature.property("stroke").and_then(|v| v.as_str());
        assert_eq!(stroke, Some(PALETTE[i % PALETTE.len()].hex().as_str()));
        let geometry = feature.geometry.as_ref().unwrap();
        let geojson::Value::LineString(coords) = &geometry.value else {
            panic!("segment {i} is not a LineString");
        };
        assert_eq!(coords.len(), 2);
    }
}

#[test]
fn points_only_archive_cannot_be_split() {
    let mut session = MapSession::default();
    session
        .upload_bytes("wells.zip", &fixtures::wells_zip())
        .unwrap();

    let err = session.split_lines_by_vertices().unwrap_err();
    assert!(matches!(err, Error::NoSegments));
    assert_eq!(session.graphics_count(), 2, "layer is left untouched");

    let status = session.upload_message().unwrap();
    assert_eq!(status.level, Level::Error);
    assert!(status.message.starts_with("Error splitting lines:"));
}
