use std::collections::{BTreeMap, HashMap};
use std::io::{Cursor, Read};

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde_json::Value as JsonValue;
use shapefile::dbase::{self, FieldValue};
use shapefile::{PolygonRing, Shape, ShapeReader};
use tracing::{debug, info, warn};
use zip::ZipArchive;

use crate::error::{Error, Result};

/// One shapefile found inside an archive, decoded to GeoJSON features.
#[derive(Debug, Clone)]
pub struct DecodedLayer {
    /// File stem of the `.shp` entry, without directories.
    pub name: String,
    /// Contents of the matching `.prj` file, if the archive had one.
    pub projection: Option<String>,
    pub collection: FeatureCollection,
}

#[derive(Default)]
struct Sidecars {
    shp: Option<Vec<u8>>,
    dbf: Option<Vec<u8>>,
    prj: Option<String>,
}

/// Decode every shapefile in a zip archive.
///
/// Entries are grouped by path stem, so `roads.shp`, `roads.dbf` and
/// `roads.prj` form one layer. A `.shp` without a `.dbf` yields features
/// with empty properties. Layers come back sorted by stem.
pub fn decode_zip(bytes: &[u8]) -> Result<Vec<DecodedLayer>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut groups: BTreeMap<String, Sidecars> = BTreeMap::new();

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() {
            continue;
        }
        let path = entry.name().to_string();
        if path.starts_with("__MACOSX/") {
            continue;
        }
        let Some((stem, ext)) = path.rsplit_once('.') else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if !matches!(ext.as_str(), "shp" | "dbf" | "prj") {
            continue;
        }

        let mut buf = Vec::new();
        entry.read_to_end(&mut buf)?;
        debug!(entry = %path, bytes = buf.len(), "read archive entry");

        let slot = groups.entry(stem.to_string()).or_default();
        match ext.as_str() {
            "shp" => slot.shp = Some(buf),
            "dbf" => slot.dbf = Some(buf),
            _ => slot.prj = Some(String::from_utf8_lossy(&buf).trim().to_string()),
        }
    }

    let mut layers = Vec::new();
    for (stem, files) in groups {
        let Some(shp) = files.shp else {
            continue;
        };
        let name = stem.rsplit('/').next().unwrap_or(&stem).to_string();
        let features = read_features(shp, files.dbf)?;
        info!(layer = %name, features = features.len(), "decoded shapefile");
        layers.push(DecodedLayer {
            name,
            projection: files.prj,
            collection: FeatureCollection {
                bbox: None,
                features,
                foreign_members: None,
            },
        });
    }

    if layers.is_empty() {
        return Err(Error::MissingShp);
    }
    Ok(layers)
}

fn read_features(shp: Vec<u8>, dbf: Option<Vec<u8>>) -> Result<Vec<Feature>> {
    let shape_reader = ShapeReader::new(Cursor::new(shp))?;

    let pairs: Vec<(Shape, JsonObject)> = match dbf {
        Some(dbf) => {
            let table = dbase::Reader::new(Cursor::new(dbf))?;
            let mut reader = shapefile::Reader::new(shape_reader, table);
            let mut pairs = Vec::new();
            for result in reader.iter_shapes_and_records() {
                let (shape, record) = result?;
                pairs.push((shape, record_properties(record)));
            }
            pairs
        }
        None => shape_reader
            .read()?
            .into_iter()
            .map(|shape| (shape, JsonObject::new()))
            .collect(),
    };

    let mut features = Vec::with_capacity(pairs.len());
    for (index, (shape, properties)) in pairs.into_iter().enumerate() {
        if matches!(shape, Shape::Multipatch(_)) {
            warn!(record = index, "multipatch shapes are not supported, skipping");
            continue;
        }
        features.push(Feature {
            bbox: None,
            geometry: shape_to_value(&shape).map(Geometry::new),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        });
    }
    Ok(features)
}

trait Position {
    fn position(&self) -> Vec<f64>;
}

impl Position for shapefile::Point {
    fn position(&self) -> Vec<f64> {
        vec![self.x, self.y]
    }
}

impl Position for shapefile::PointM {
    fn position(&self) -> Vec<f64> {
        vec![self.x, self.y]
    }
}

impl Position for shapefile::PointZ {
    fn position(&self) -> Vec<f64> {
        vec![self.x, self.y]
    }
}

fn positions<P: Position>(points: &[P]) -> Vec<Vec<f64>> {
    points.iter().map(Position::position).collect()
}

fn multipoint_value<P: Position>(points: &[P]) -> Value {
    match points {
        [single] => Value::Point(single.position()),
        _ => Value::MultiPoint(positions(points)),
    }
}

fn polyline_value<P: Position>(parts: &[Vec<P>]) -> Value {
    match parts {
        [single] => Value::LineString(positions(single)),
        _ => Value::MultiLineString(parts.iter().map(|p| positions(p)).collect()),
    }
}

/// Group rings into polygons: every outer ring opens a new polygon and the
/// inner rings after it become its holes.
fn polygon_value<P: Position>(rings: &[PolygonRing<P>]) -> Value {
    let mut polygons: Vec<Vec<Vec<Vec<f64>>>> = Vec::new();
    for ring in rings {
        match ring {
            PolygonRing::Outer(points) => polygons.push(vec![positions(points)]),
            PolygonRing::Inner(points) => match polygons.last_mut() {
                Some(polygon) => polygon.push(positions(points)),
                None => polygons.push(vec![positions(points)]),
            },
        }
    }

    if polygons.len() == 1 {
        Value::Polygon(polygons.remove(0))
    } else {
        Value::MultiPolygon(polygons)
    }
}

fn shape_to_value(shape: &Shape) -> Option<Value> {
    let value = match shape {
        Shape::NullShape | Shape::Multipatch(_) => return None,
        Shape::Point(p) => Value::Point(p.position()),
        Shape::PointM(p) => Value::Point(p.position()),
        Shape::PointZ(p) => Value::Point(p.position()),
        Shape::Multipoint(m) => multipoint_value(m.points()),
        Shape::MultipointM(m) => multipoint_value(m.points()),
        Shape::MultipointZ(m) => multipoint_value(m.points()),
        Shape::Polyline(l) => polyline_value(l.parts()),
        Shape::PolylineM(l) => polyline_value(l.parts()),
        Shape::PolylineZ(l) => polyline_value(l.parts()),
        Shape::Polygon(p) => polygon_value(p.rings()),
        Shape::PolygonM(p) => polygon_value(p.rings()),
        Shape::PolygonZ(p) => polygon_value(p.rings()),
    };
    Some(value)
}

fn record_properties(record: dbase::Record) -> JsonObject {
    let fields: HashMap<String, FieldValue> = record.into();
    fields
        .into_iter()
        .map(|(name, value)| (name, field_to_json(value)))
        .collect()
}

fn number(value: f64) -> JsonValue {
    if value.fract() == 0.0 && value.abs() < 9.0e15 {
        JsonValue::from(value as i64)
    } else {
        serde_json::Number::from_f64(value).map_or(JsonValue::Null, JsonValue::Number)
    }
}

fn field_to_json(value: FieldValue) -> JsonValue {
    match value {
        FieldValue::Character(Some(s)) => JsonValue::String(s.trim_end().to_string()),
        FieldValue::Memo(s) => JsonValue::String(s.trim_end().to_string()),
        FieldValue::Numeric(Some(n)) => number(n),
        FieldValue::Float(Some(f)) => number(f64::from(f)),
        FieldValue::Double(d) | FieldValue::Currency(d) => number(d),
        FieldValue::Integer(i) => JsonValue::from(i),
        FieldValue::Logical(Some(b)) => JsonValue::Bool(b),
        FieldValue::Date(Some(d)) => {
            JsonValue::String(format!("{:04}-{:02}-{:02}", d.year(), d.month(), d.day()))
        }
        FieldValue::Character(None)
        | FieldValue::Numeric(None)
        | FieldValue::Float(None)
        | FieldValue::Logical(None)
        | FieldValue::Date(None) => JsonValue::Null,
        other => JsonValue::String(format!("{other:?}")),
    }
}
