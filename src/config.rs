/// Size and format limits applied to uploaded files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadLimits {
    /// Largest accepted file, in bytes.
    pub max_file_size: u64,
    /// Accepted filename suffixes, lowercase with leading dot.
    pub supported_formats: Vec<String>,
}

impl UploadLimits {
    pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

    pub fn with_max_size_mb(mb: u64) -> Self {
        Self {
            max_file_size: mb * 1024 * 1024,
            ..Self::default()
        }
    }

    pub fn get_supported_formats(&self) -> &[String] {
        &self.supported_formats
    }

    pub fn get_max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// The limit in whole megabytes, as shown to users.
    pub fn max_file_size_mb(&self) -> u64 {
        self.max_file_size / (1024 * 1024)
    }
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_file_size: Self::DEFAULT_MAX_FILE_SIZE,
            supported_formats: vec![".zip".to_string()],
        }
    }
}
