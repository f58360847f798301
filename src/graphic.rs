use geo::Coord;
use serde_json::{Map, Value};

use crate::style::LineSymbol;

/// Flat attribute table carried by every graphic.
pub type Attributes = Map<String, Value>;

/// Map-native geometry, shaped the way a map layer stores it: lines as
/// paths, polygons as a flat list of rings.
#[derive(Debug, Clone, PartialEq)]
pub enum MapGeometry {
    Point(Coord<f64>),
    Multipoint(Vec<Coord<f64>>),
    Polyline { paths: Vec<Vec<Coord<f64>>> },
    Polygon { rings: Vec<Vec<Coord<f64>>> },
    /// Anything the layer cannot draw. `kind` names the source geometry type.
    Unsupported { kind: String },
}

impl MapGeometry {
    pub fn type_name(&self) -> &str {
        match self {
            Self::Point(_) => "point",
            Self::Multipoint(_) => "multipoint",
            Self::Polyline { .. } => "polyline",
            Self::Polygon { .. } => "polygon",
            Self::Unsupported { .. } => "unknown",
        }
    }

    /// Every vertex of the geometry, in storage order.
    pub fn vertices(&self) -> Vec<Coord<f64>> {
        match self {
            Self::Point(c) => vec![*c],
            Self::Multipoint(points) => points.clone(),
            Self::Polyline { paths } => paths.iter().flatten().copied().collect(),
            Self::Polygon { rings } => rings.iter().flatten().copied().collect(),
            Self::Unsupported { .. } => Vec::new(),
        }
    }
}

/// A renderable feature: geometry, attributes, an optional line symbol and
/// a visibility flag.
#[derive(Debug, Clone, PartialEq)]
pub struct Graphic {
    pub geometry: MapGeometry,
    pub attributes: Attributes,
    pub symbol: Option<LineSymbol>,
    pub visible: bool,
}

impl Graphic {
    pub fn new(geometry: MapGeometry, attributes: Attributes) -> Self {
        Self {
            geometry,
            attributes,
            symbol: None,
            visible: true,
        }
    }

    /// Source feature id: `OBJECTID`, then `FID`. Zero and null count as
    /// missing.
    pub fn source_fid(&self) -> Option<Value> {
        ["OBJECTID", "FID"]
            .iter()
            .filter_map(|key| self.attributes.get(*key))
            .find(|v| is_truthy(v))
            .cloned()
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
