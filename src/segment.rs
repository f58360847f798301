use geo::{Coord, Distance, Euclidean, Point};
use rayon::prelude::*;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::graphic::{Attributes, Graphic, MapGeometry};

/// Planar distance between two vertices, in source coordinate units.
/// Ignores map projection.
pub fn calculate_segment_length(start: Coord<f64>, end: Coord<f64>) -> f64 {
    Euclidean::distance(Point::from(start), Point::from(end))
}

fn segment_graphic(start: Coord<f64>, end: Coord<f64>, attributes: Attributes) -> Graphic {
    Graphic::new(
        MapGeometry::Polyline {
            paths: vec![vec![start, end]],
        },
        attributes,
    )
}

/// One segment per consecutive vertex pair of every path.
pub fn split_polyline_by_vertices(graphic: &Graphic) -> Vec<Graphic> {
    let MapGeometry::Polyline { paths } = &graphic.geometry else {
        return Vec::new();
    };
    let fid = graphic.source_fid();
    let total_paths = paths.len();
    let mut segments = Vec::new();

    for (path_index, path) in paths.iter().enumerate() {
        for (vertex_index, pair) in path.windows(2).enumerate() {
            let (start, end) = (pair[0], pair[1]);
            let mut attributes = graphic.attributes.clone();
            attributes.insert("SEGMENT_ID".into(), json!(segments.len() + 1));
            attributes.insert("PATH_INDEX".into(), json!(path_index));
            attributes.insert("VERTEX_START".into(), json!(vertex_index));
            attributes.insert("VERTEX_END".into(), json!(vertex_index + 1));
            attributes.insert(
                "ORIGINAL_FID".into(),
                fid.clone().unwrap_or_else(|| json!(path_index)),
            );
            attributes.insert(
                "SEGMENT_LENGTH".into(),
                json!(calculate_segment_length(start, end)),
            );
            attributes.insert("TOTAL_PATHS".into(), json!(total_paths));
            attributes.insert(
                "IS_MULTILINE".into(),
                json!(if total_paths > 1 { "YES" } else { "NO" }),
            );
            segments.push(segment_graphic(start, end, attributes));
        }
    }
    segments
}

/// One segment per consecutive vertex pair of every ring. Ring 0 is the
/// exterior. The last vertex is not joined back to the first.
pub fn split_polygon_rings_by_vertices(graphic: &Graphic) -> Vec<Graphic> {
    let MapGeometry::Polygon { rings } = &graphic.geometry else {
        return Vec::new();
    };
    let fid = graphic.source_fid().unwrap_or_else(|| json!(0));
    let mut segments = Vec::new();

    for (ring_index, ring) in rings.iter().enumerate() {
        let ring_type = if ring_index == 0 { "EXTERIOR" } else { "INTERIOR" };
        for (vertex_index, pair) in ring.windows(2).enumerate() {
            let (start, end) = (pair[0], pair[1]);
            let mut attributes = graphic.attributes.clone();
            attributes.insert("SEGMENT_ID".into(), json!(segments.len() + 1));
            attributes.insert("RING_INDEX".into(), json!(ring_index));
            attributes.insert("RING_TYPE".into(), Value::from(ring_type));
            attributes.insert("VERTEX_START".into(), json!(vertex_index));
            attributes.insert("VERTEX_END".into(), json!(vertex_index + 1));
            attributes.insert("ORIGINAL_FID".into(), fid.clone());
            attributes.insert(
                "SEGMENT_LENGTH".into(),
                json!(calculate_segment_length(start, end)),
            );
            segments.push(segment_graphic(start, end, attributes));
        }
    }
    segments
}

/// Split every line and polygon ring into two-vertex segments.
///
/// Points and unsupported geometries are skipped with a warning. Fails if
/// `graphics` is empty or if nothing could be split.
pub fn split_line_by_vertices(graphics: &[Graphic]) -> Result<Vec<Graphic>> {
    if graphics.is_empty() {
        return Err(Error::NoInput);
    }

    // Work per graphic in parallel; collect keeps input order.
    let per_graphic: Vec<Vec<Graphic>> = graphics
        .par_iter()
        .enumerate()
        .map(|(i, graphic)| match &graphic.geometry {
            MapGeometry::Polyline { .. } => split_polyline_by_vertices(graphic),
            MapGeometry::Polygon { .. } => split_polygon_rings_by_vertices(graphic),
            MapGeometry::Point(_) | MapGeometry::Multipoint(_) => {
                warn!(graphic = i, "point geometry cannot be split into line segments, skipping");
                Vec::new()
            }
            MapGeometry::Unsupported { kind } => {
                warn!(graphic = i, kind = %kind, "unsupported geometry type, skipping");
                Vec::new()
            }
        })
        .collect();

    let segments: Vec<Graphic> = per_graphic.into_iter().flatten().collect();
    if segments.is_empty() {
        return Err(Error::NoSegments);
    }

    debug!(
        segments = segments.len(),
        features = graphics.len(),
        "split features into segments"
    );
    Ok(segments)
}
