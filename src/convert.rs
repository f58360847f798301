use geo::Coord;
use geojson::{Feature, FeatureCollection, Value};
use serde_json::json;

use crate::graphic::{Attributes, Graphic, MapGeometry};

fn coord(position: &[f64]) -> Option<Coord<f64>> {
    match position {
        [x, y, ..] => Some(Coord { x: *x, y: *y }),
        _ => None,
    }
}

fn path(positions: &[Vec<f64>]) -> Vec<Coord<f64>> {
    positions.iter().filter_map(|p| coord(p)).collect()
}

/// Convert decoded features into map graphics, one graphic per feature.
///
/// Lines become polylines tagged with `ORIGINAL_GEOM_TYPE` and `LINE_COUNT`;
/// every other geometry keeps its original attributes untouched.
pub fn convert_features(collection: &FeatureCollection) -> Vec<Graphic> {
    collection.features.iter().map(convert_feature).collect()
}

fn convert_feature(feature: &Feature) -> Graphic {
    let mut attributes: Attributes = feature.properties.clone().unwrap_or_default();

    let Some(geometry) = &feature.geometry else {
        return Graphic::new(
            MapGeometry::Unsupported {
                kind: "None".to_string(),
            },
            attributes,
        );
    };

    match &geometry.value {
        Value::LineString(line) => {
            attributes.insert("ORIGINAL_GEOM_TYPE".into(), json!("LineString"));
            attributes.insert("LINE_COUNT".into(), json!(1));
            Graphic::new(
                MapGeometry::Polyline {
                    paths: vec![path(line)],
                },
                attributes,
            )
        }
        Value::MultiLineString(lines) => {
            attributes.insert("ORIGINAL_GEOM_TYPE".into(), json!("MultiLineString"));
            attributes.insert("LINE_COUNT".into(), json!(lines.len()));
            Graphic::new(
                MapGeometry::Polyline {
                    paths: lines.iter().map(|l| path(l)).collect(),
                },
                attributes,
            )
        }
        other => Graphic::new(passthrough_geometry(other), attributes),
    }
}

fn passthrough_geometry(value: &Value) -> MapGeometry {
    match value {
        Value::Point(p) => match coord(p) {
            Some(c) => MapGeometry::Point(c),
            None => MapGeometry::Unsupported {
                kind: "Point".to_string(),
            },
        },
        Value::MultiPoint(points) => MapGeometry::Multipoint(path(points)),
        Value::Polygon(rings) => MapGeometry::Polygon {
            rings: rings.iter().map(|r| path(r)).collect(),
        },
        Value::MultiPolygon(polygons) => MapGeometry::Polygon {
            rings: polygons.iter().flatten().map(|r| path(r)).collect(),
        },
        Value::GeometryCollection(_) => MapGeometry::Unsupported {
            kind: "GeometryCollection".to_string(),
        },
        Value::LineString(line) => MapGeometry::Polyline {
            paths: vec![path(line)],
        },
        Value::MultiLineString(lines) => MapGeometry::Polyline {
            paths: lines.iter().map(|l| path(l)).collect(),
        },
    }
}
