use std::path::Path;

use geo::{BoundingRect, MultiPoint, Point, Rect};
use serde::Serialize;
use tracing::debug;

use crate::config::UploadLimits;
use crate::error::{Error, Result};
use crate::graphic::Graphic;
use crate::status::Status;
use crate::upload::UploadService;

/// Summary row for one graphic in the layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphicInfo {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub geometry_type: String,
    pub visible: bool,
}

/// The uploaded-shapefile layer and the operations a user can run on it.
///
/// The layer is an ordered list of graphics. Uploads append to it,
/// splitting replaces it and clearing empties it. After every change the
/// extent of the new graphics is kept as the area the view should show.
#[derive(Debug)]
pub struct MapSession {
    service: UploadService,
    graphics: Vec<Graphic>,
    extent: Option<Rect<f64>>,
    message: Option<Status>,
    pub is_uploading: bool,
    pub is_processing: bool,
}

impl MapSession {
    pub fn new(limits: UploadLimits) -> Self {
        Self {
            service: UploadService::new(limits),
            graphics: Vec::new(),
            extent: None,
            message: None,
            is_uploading: false,
            is_processing: false,
        }
    }

    pub fn service(&self) -> &UploadService {
        &self.service
    }

    pub fn service_mut(&mut self) -> &mut UploadService {
        &mut self.service
    }

    pub fn graphics(&self) -> &[Graphic] {
        &self.graphics
    }

    /// Area the view was last moved to.
    pub fn extent(&self) -> Option<Rect<f64>> {
        self.extent
    }

    /// Message currently shown to the user. The session's own messages win
    /// over the service feed until the service publishes again.
    pub fn upload_message(&self) -> Option<&Status> {
        self.message.as_ref()
    }

    fn show(&mut self, status: Status) {
        debug!(level = ?status.level, message = %status, "status");
        self.message = Some(status);
    }

    fn sync_message(&mut self) {
        if let Some(status) = self.service.upload_status.current() {
            self.message = Some(status.clone());
        }
    }

    /// Read, validate and load a zipped shapefile from disk.
    pub fn upload_file(&mut self, path: &Path) -> Result<usize> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let size = match std::fs::metadata(path) {
            Ok(metadata) => metadata.len(),
            Err(err) => return Err(self.upload_failed(&file_name, err.into())),
        };

        if !self.service.validate_file_size(size) {
            let err = Error::FileTooLarge {
                size,
                limit_mb: self.service.limits().max_file_size_mb(),
            };
            self.show(Status::error(err.to_string()));
            return Err(err);
        }
        if !self.service.validate_shapefile_format(&file_name) {
            self.show(Status::error(
                "Invalid file format. Please upload a .zip file containing a shapefile.",
            ));
            return Err(Error::InvalidFormat);
        }

        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) => return Err(self.upload_failed(&file_name, err.into())),
        };
        self.upload_bytes(&file_name, &bytes)
    }

    fn upload_failed(&mut self, file_name: &str, err: Error) -> Error {
        self.show(Status::error(format!("Error uploading {file_name}: {err}")));
        err
    }

    /// Load an already-read archive. Returns how many graphics were added.
    pub fn upload_bytes(&mut self, file_name: &str, bytes: &[u8]) -> Result<usize> {
        self.is_uploading = true;
        self.show(Status::info("Uploading shapefile..."));

        let result = self.service.process_shapefile(file_name, bytes);
        self.sync_message();
        self.is_uploading = false;

        let graphics = match result {
            Ok(graphics) => graphics,
            Err(err) => return Err(self.upload_failed(file_name, err)),
        };

        if graphics.is_empty() {
            self.show(Status::warning(format!(
                "No valid features found in {file_name}"
            )));
            return Ok(0);
        }

        let added = graphics.len();
        self.extent = zoom_to_graphics(&graphics);
        self.graphics.extend(graphics);
        self.show(Status::success(format!(
            "Successfully uploaded {file_name}\nAdded {added} features to the map."
        )));
        Ok(added)
    }

    /// Replace the layer with styled segments of its lines and rings.
    pub fn split_lines_by_vertices(&mut self) -> Result<usize> {
        self.split_lines(true)
    }

    /// Replace the layer with segments, colored only when `apply_styling`.
    pub fn split_lines(&mut self, apply_styling: bool) -> Result<usize> {
        if self.graphics.is_empty() {
            let err = Error::EmptyLayer;
            self.show(Status::warning(err.to_string()));
            return Err(err);
        }

        self.is_processing = true;
        let result = self
            .service
            .split_line_by_vertices_with_styling(&self.graphics, apply_styling);
        self.sync_message();
        self.is_processing = false;

        let segments = match result {
            Ok(segments) => segments,
            Err(err) => {
                self.show(Status::error(format!("Error splitting lines: {err}")));
                return Err(err);
            }
        };

        let created = segments.len();
        self.extent = zoom_to_graphics(&segments);
        self.graphics = segments;
        let detail = if apply_styling {
            " with unique colors for easy identification"
        } else {
            ""
        };
        self.show(Status::success(format!(
            "Lines successfully split!\nCreated {created} line segments{detail}."
        )));
        Ok(created)
    }

    pub fn clear_shapefile_graphics(&mut self) {
        self.graphics.clear();
        self.extent = None;
        self.show(Status::notice("All shapefile graphics removed"));
    }

    pub fn graphics_info(&self) -> Vec<GraphicInfo> {
        self.graphics
            .iter()
            .enumerate()
            .map(|(index, graphic)| GraphicInfo {
                id: format!("graphic-{index}"),
                title: graphic_title(graphic, index),
                geometry_type: graphic.geometry.type_name().to_string(),
                visible: graphic.visible,
            })
            .collect()
    }

    /// Flip visibility of `graphic-{n}`. Unknown ids are ignored.
    pub fn toggle_graphic_visibility(&mut self, graphic_id: &str) {
        let index = graphic_id
            .strip_prefix("graphic-")
            .and_then(|n| n.parse::<usize>().ok());
        if let Some(graphic) = index.and_then(|i| self.graphics.get_mut(i)) {
            graphic.visible = !graphic.visible;
        }
    }

    pub fn graphics_count(&self) -> usize {
        self.graphics.len()
    }
}

impl Default for MapSession {
    fn default() -> Self {
        Self::new(UploadLimits::default())
    }
}

fn graphic_title(graphic: &Graphic, index: usize) -> String {
    ["name", "NAME"]
        .iter()
        .filter_map(|key| graphic.attributes.get(*key))
        .find_map(|v| match v {
            serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .unwrap_or_else(|| format!("Feature {}", index + 1))
}

/// Bounding rectangle of every vertex in `graphics`, or `None` when they
/// have no vertices.
pub fn zoom_to_graphics(graphics: &[Graphic]) -> Option<Rect<f64>> {
    let points: Vec<Point<f64>> = graphics
        .iter()
        .flat_map(|g| g.geometry.vertices())
        .map(Point::from)
        .collect();
    MultiPoint::new(points).bounding_rect()
}
