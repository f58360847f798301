//! Builders for small in-memory shapefile archives used by the tests.

use std::io::{Cursor, Write};

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

pub enum TestShape {
    Null,
    Point(f64, f64),
    Polyline(Vec<Vec<(f64, f64)>>),
    Polygon(Vec<Vec<(f64, f64)>>),
}

impl TestShape {
    fn type_code(&self) -> i32 {
        match self {
            Self::Null => 0,
            Self::Point(..) => 1,
            Self::Polyline(_) => 3,
            Self::Polygon(_) => 5,
        }
    }

    fn content(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend(self.type_code().to_le_bytes());
        match self {
            Self::Null => {}
            Self::Point(x, y) => {
                out.extend(x.to_le_bytes());
                out.extend(y.to_le_bytes());
            }
            Self::Polyline(parts) | Self::Polygon(parts) => {
                let points: Vec<(f64, f64)> = parts.iter().flatten().copied().collect();
                let (min_x, min_y, max_x, max_y) = bounds(&points);
                for v in [min_x, min_y, max_x, max_y] {
                    out.extend(v.to_le_bytes());
                }
                out.extend((parts.len() as i32).to_le_bytes());
                out.extend((points.len() as i32).to_le_bytes());
                let mut start = 0i32;
                for part in parts {
                    out.extend(start.to_le_bytes());
                    start += part.len() as i32;
                }
                for (x, y) in points {
                    out.extend(x.to_le_bytes());
                    out.extend(y.to_le_bytes());
                }
            }
        }
        out
    }
}

fn bounds(points: &[(f64, f64)]) -> (f64, f64, f64, f64) {
    points.iter().fold(
        (f64::MAX, f64::MAX, f64::MIN, f64::MIN),
        |(a, b, c, d), &(x, y)| (a.min(x), b.min(y), c.max(x), d.max(y)),
    )
}

/// Encode shapes as the bytes of a `.shp` file.
pub fn shp_bytes(shapes: &[TestShape]) -> Vec<u8> {
    let records: Vec<Vec<u8>> = shapes.iter().map(TestShape::content).collect();
    let body_len: usize = records.iter().map(|r| 8 + r.len()).sum();
    let file_len = 100 + body_len;

    let shape_type = shapes
        .iter()
        .map(TestShape::type_code)
        .find(|&c| c != 0)
        .unwrap_or(0);
    let all_points: Vec<(f64, f64)> = shapes
        .iter()
        .flat_map(|s| match s {
            TestShape::Null => Vec::new(),
            TestShape::Point(x, y) => vec![(*x, *y)],
            TestShape::Polyline(parts) | TestShape::Polygon(parts) => {
                parts.iter().flatten().copied().collect()
            }
        })
        .collect();
    let (min_x, min_y, max_x, max_y) = if all_points.is_empty() {
        (0.0, 0.0, 0.0, 0.0)
    } else {
        bounds(&all_points)
    };

    let mut out = Vec::with_capacity(file_len);
    out.extend(9994i32.to_be_bytes());
    for _ in 0..5 {
        out.extend(0i32.to_be_bytes());
    }
    out.extend(((file_len / 2) as i32).to_be_bytes());
    out.extend(1000i32.to_le_bytes());
    out.extend(shape_type.to_le_bytes());
    for v in [min_x, min_y, max_x, max_y, 0.0, 0.0, 0.0, 0.0] {
        out.extend(v.to_le_bytes());
    }

    for (i, content) in records.iter().enumerate() {
        out.extend((i as i32 + 1).to_be_bytes());
        out.extend(((content.len() / 2) as i32).to_be_bytes());
        out.extend(content);
    }
    out
}

/// A dBase column: name, type (`C` or `N`) and width.
pub struct Column {
    pub name: &'static str,
    pub kind: u8,
    pub width: u8,
}

/// Encode rows as the bytes of a `.dbf` table.
pub fn dbf_bytes(columns: &[Column], rows: &[Vec<&str>]) -> Vec<u8> {
    let header_len = 32 + 32 * columns.len() + 1;
    let record_len = 1 + columns.iter().map(|c| c.width as usize).sum::<usize>();

    let mut out = vec![0x03, 124, 1, 1];
    out.extend((rows.len() as u32).to_le_bytes());
    out.extend((header_len as u16).to_le_bytes());
    out.extend((record_len as u16).to_le_bytes());
    out.extend([0u8; 20]);

    for column in columns {
        let mut name = [0u8; 11];
        name[..column.name.len()].copy_from_slice(column.name.as_bytes());
        out.extend(name);
        out.push(column.kind);
        out.extend([0u8; 4]);
        out.push(column.width);
        out.push(0);
        out.extend([0u8; 14]);
    }
    out.push(0x0D);

    for row in rows {
        out.push(b' ');
        for (column, value) in columns.iter().zip(row) {
            let width = column.width as usize;
            let cell = if column.kind == b'N' {
                format!("{value:>width$}")
            } else {
                format!("{value:<width$}")
            };
            out.extend(&cell.as_bytes()[..width]);
        }
    }
    out.push(0x1A);
    out
}

/// Zip named byte blobs into an archive.
pub fn zip_bytes(entries: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in entries {
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// A zipped `roads` shapefile holding a three-vertex line and a two-part
/// line, with `OBJECTID` and `NAME` columns.
pub fn roads_zip() -> Vec<u8> {
    let shapes = [
        TestShape::Polyline(vec![vec![(0.0, 0.0), (3.0, 4.0), (6.0, 8.0)]]),
        TestShape::Polyline(vec![
            vec![(10.0, 10.0), (11.0, 10.0)],
            vec![(20.0, 20.0), (20.0, 21.0), (20.0, 22.0)],
        ]),
    ];
    let columns = [
        Column { name: "OBJECTID", kind: b'N', width: 6 },
        Column { name: "NAME", kind: b'C', width: 12 },
    ];
    let rows = [vec!["1", "Main St"], vec!["2", "Ring Rd"]];
    zip_bytes(&[
        ("roads.shp", shp_bytes(&shapes)),
        ("roads.dbf", dbf_bytes(&columns, &rows)),
        ("roads.prj", b"GEOGCS[\"GCS_WGS_1984\"]".to_vec()),
    ])
}

/// A zipped `wells` shapefile holding only points and no attribute table.
pub fn wells_zip() -> Vec<u8> {
    let shapes = [TestShape::Point(1.0, 2.0), TestShape::Point(3.0, 4.0)];
    zip_bytes(&[("data/wells.shp", shp_bytes(&shapes))])
}

/// A zipped `parcels` shapefile holding one square with a square hole.
pub fn parcels_zip() -> Vec<u8> {
    let shapes = [TestShape::Polygon(vec![
        // clockwise exterior
        vec![(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0), (0.0, 0.0)],
        // counter-clockwise hole
        vec![(2.0, 2.0), (4.0, 2.0), (4.0, 4.0), (2.0, 4.0), (2.0, 2.0)],
    ])];
    let columns = [Column { name: "FID", kind: b'N', width: 4 }];
    zip_bytes(&[
        ("parcels.shp", shp_bytes(&shapes)),
        ("parcels.dbf", dbf_bytes(&columns, &[vec!["9"]])),
    ])
}
