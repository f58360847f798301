use geo::{Coord, Rect};
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, Value};
use serde_json::json;

use crate::graphic::{Graphic, MapGeometry};

/// Convert the visible graphics of a layer to a GeoJSON FeatureCollection.
/// `extent` becomes the collection's `bbox`.
pub fn to_geojson(graphics: &[Graphic], extent: Option<Rect<f64>>) -> GeoJson {
    let features: Vec<Feature> = graphics
        .iter()
        .filter(|g| g.visible)
        .map(graphic_to_feature)
        .collect();

    GeoJson::FeatureCollection(FeatureCollection {
        bbox: extent.map(|r| vec![r.min().x, r.min().y, r.max().x, r.max().y]),
        features,
        foreign_members: None,
    })
}

fn position(c: &Coord<f64>) -> Vec<f64> {
    vec![c.x, c.y]
}

fn positions(coords: &[Coord<f64>]) -> Vec<Vec<f64>> {
    coords.iter().map(position).collect()
}

fn geometry_value(geometry: &MapGeometry) -> Option<Value> {
    let value = match geometry {
        MapGeometry::Point(c) => Value::Point(position(c)),
        MapGeometry::Multipoint(points) => Value::MultiPoint(positions(points)),
        MapGeometry::Polyline { paths } => match paths.as_slice() {
            [single] => Value::LineString(positions(single)),
            _ => Value::MultiLineString(paths.iter().map(|p| positions(p)).collect()),
        },
        MapGeometry::Polygon { rings } => {
            Value::Polygon(rings.iter().map(|r| positions(r)).collect())
        }
        MapGeometry::Unsupported { .. } => return None,
    };
    Some(value)
}

fn graphic_to_feature(graphic: &Graphic) -> Feature {
    let mut properties = graphic.attributes.clone();
    if let Some(symbol) = &graphic.symbol {
        properties.insert("stroke".into(), json!(symbol.color.hex()));
        properties.insert("stroke-opacity".into(), json!(symbol.color.a));
        properties.insert("stroke-width".into(), json!(symbol.width));
    }

    Feature {
        bbox: None,
        geometry: geometry_value(&graphic.geometry).map(Geometry::new),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}
