use tracing::{error, info};

use crate::config::UploadLimits;
use crate::convert::convert_features;
use crate::decode::{DecodedLayer, decode_zip};
use crate::error::{Error, Result};
use crate::graphic::Graphic;
use crate::segment;
use crate::status::{Status, StatusFeed};
use crate::style::style_segments;

/// Turns uploaded archives into graphics and graphics into segments,
/// publishing progress on its status feed.
#[derive(Debug, Default)]
pub struct UploadService {
    limits: UploadLimits,
    pub upload_status: StatusFeed,
    /// Spatial reference text of the most recently decoded layer with a `.prj`.
    projection: Option<String>,
}

impl UploadService {
    pub fn new(limits: UploadLimits) -> Self {
        Self {
            limits,
            upload_status: StatusFeed::new(),
            projection: None,
        }
    }

    pub fn limits(&self) -> &UploadLimits {
        &self.limits
    }

    pub fn get_supported_formats(&self) -> &[String] {
        self.limits.get_supported_formats()
    }

    pub fn get_max_file_size(&self) -> u64 {
        self.limits.get_max_file_size()
    }

    pub fn projection(&self) -> Option<&str> {
        self.projection.as_deref()
    }

    pub fn validate_file_size(&self, size: u64) -> bool {
        size <= self.limits.max_file_size
    }

    /// Extension check only; the bytes are not inspected.
    pub fn validate_shapefile_format(&self, file_name: &str) -> bool {
        let name = file_name.to_lowercase();
        self.limits
            .supported_formats
            .iter()
            .any(|ext| name.ends_with(ext.as_str()))
    }

    /// Decode a zipped shapefile and convert its features to graphics.
    pub fn process_shapefile(&mut self, file_name: &str, bytes: &[u8]) -> Result<Vec<Graphic>> {
        self.upload_status
            .publish(Status::info(format!("Processing {file_name}...")));

        if file_name.is_empty() {
            let err = Error::NoFile;
            self.upload_status.publish(Status::warning(err.to_string()));
            return Err(err);
        }

        if !file_name.to_lowercase().contains(".zip") {
            let err = Error::InvalidFormat;
            self.upload_status.publish(Status::error(err.to_string()));
            return Err(err);
        }

        let layers = match decode_zip(bytes) {
            Ok(layers) => layers,
            Err(err) => {
                self.upload_status.publish(Status::error(err.to_string()));
                return Err(err);
            }
        };

        Ok(self.convert_layers(&layers))
    }

    fn convert_layers(&mut self, layers: &[DecodedLayer]) -> Vec<Graphic> {
        let mut graphics = Vec::new();
        for layer in layers {
            if layer.projection.is_some() {
                self.projection.clone_from(&layer.projection);
            }
            let converted = convert_features(&layer.collection);
            info!(layer = %layer.name, graphics = converted.len(), "converted layer");
            graphics.extend(converted);
        }
        graphics
    }

    /// Split lines and polygon rings into two-vertex segments.
    pub fn split_line_by_vertices(&mut self, graphics: &[Graphic]) -> Result<Vec<Graphic>> {
        self.upload_status
            .publish(Status::info("Splitting lines by vertices..."));

        match segment::split_line_by_vertices(graphics) {
            Ok(segments) => {
                self.upload_status.publish(Status::success(format!(
                    "Successfully split lines!\nCreated {} line segments from {} original features.",
                    segments.len(),
                    graphics.len()
                )));
                Ok(segments)
            }
            Err(err) => {
                error!(%err, "error splitting lines by vertices");
                let status = match err {
                    Error::NoSegments => Status::warning(err.to_string()),
                    _ => Status::error(err.to_string()),
                };
                self.upload_status.publish(status);
                self.upload_status.publish(Status::error(format!(
                    "Error splitting lines by vertices: {err}"
                )));
                Err(err)
            }
        }
    }

    /// Like [`Self::split_line_by_vertices`], then color each segment from
    /// the palette when `apply_styling` is set.
    pub fn split_line_by_vertices_with_styling(
        &mut self,
        graphics: &[Graphic],
        apply_styling: bool,
    ) -> Result<Vec<Graphic>> {
        let mut segments = self.split_line_by_vertices(graphics)?;
        if !apply_styling {
            return Ok(segments);
        }

        style_segments(&mut segments);
        self.upload_status.publish(Status::success(format!(
            "Successfully styled {} line segments!\nEach segment has a unique color for easy identification.",
            segments.len()
        )));
        Ok(segments)
    }
}
