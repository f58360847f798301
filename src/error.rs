use std::io;

/// Everything that can go wrong between receiving a file and handing back
/// graphics or segments.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("No file provided.")]
    NoFile,

    #[error("Invalid file type. Please provide a .zip file.")]
    InvalidFormat,

    #[error("File size exceeds maximum limit of {limit_mb}MB")]
    FileTooLarge { size: u64, limit_mb: u64 },

    #[error("Error reading file: {0}")]
    Io(#[from] io::Error),

    #[error("failed to read zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("failed to decode shapefile: {0}")]
    Shapefile(#[from] shapefile::Error),

    #[error("failed to decode attribute table: {0}")]
    Dbase(#[from] shapefile::dbase::Error),

    #[error("no .shp file found in the archive")]
    MissingShp,

    #[error("No shapefile data provided for splitting.")]
    NoInput,

    #[error("No line geometry found in the shapefile that can be split into segments.")]
    NoSegments,

    #[error("No graphics available to split. Please upload a shapefile first.")]
    EmptyLayer,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
