//! Resolution bounds and dataset locations.
//!
//! The supported resolution range is fixed at compile time. Everything that can vary
//! between deployments (currently only the dataset directory) lives in [`StoreConfig`].

use std::path::{Path, PathBuf};

/// Coarsest H3 resolution with data. Resolution 4 cells cover roughly 1,770 km².
pub const MIN_RESOLUTION: u8 = 4;

/// Finest H3 resolution with data. Resolution 5 cells cover roughly 250 km².
pub const MAX_RESOLUTION: u8 = 5;

/// Resolution used by [`Geocoder::geocode`](crate::Geocoder::geocode) when none is requested.
pub const DEFAULT_RESOLUTION: u8 = MAX_RESOLUTION;

/// Every resolution loaded into memory on first access, coarsest first.
pub const SUPPORTED_RESOLUTIONS: [u8; 2] = [MIN_RESOLUTION, MAX_RESOLUTION];

/// Default directory holding the dataset files.
pub const DATA_DIR_NAME: &str = "data";

/// Dataset file name prefix: `reverse_geo_{resolution}.{json,bin}`.
pub const DATA_FILE_PREFIX: &str = "reverse_geo_";

/// Clamps a requested resolution into `MIN_RESOLUTION..=MAX_RESOLUTION`.
///
/// ```
/// use lakhua::config::clamp_resolution;
///
/// assert_eq!(clamp_resolution(0), 4);
/// assert_eq!(clamp_resolution(5), 5);
/// assert_eq!(clamp_resolution(99), 5);
/// ```
pub fn clamp_resolution(resolution: i64) -> u8 {
    resolution.clamp(MIN_RESOLUTION as i64, MAX_RESOLUTION as i64) as u8
}

/// On-disk encodings a resolution store can be read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    /// `reverse_geo_{R}.json`: object mapping cell ids to location objects.
    Json,
    /// `reverse_geo_{R}.bin`: bincode output of `build-database`.
    Compact,
}

impl DataFormat {
    /// File extension for this format, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            DataFormat::Json => "json",
            DataFormat::Compact => "bin",
        }
    }
}

/// Where the [`StoreCache`](crate::StoreCache) finds its datasets.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory containing the `reverse_geo_*` files.
    pub data_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(DATA_DIR_NAME)
    }
}

impl StoreConfig {
    /// Creates a config reading datasets from `data_dir`.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    /// Path of the dataset file for `resolution` in the given format.
    ///
    /// ```
    /// use lakhua::config::{DataFormat, StoreConfig};
    ///
    /// let config = StoreConfig::new("/srv/lakhua");
    /// assert_eq!(
    ///     config.data_file_path(5, DataFormat::Json),
    ///     std::path::Path::new("/srv/lakhua/reverse_geo_5.json")
    /// );
    /// ```
    pub fn data_file_path(&self, resolution: u8, format: DataFormat) -> PathBuf {
        self.data_dir.join(format!(
            "{}{}.{}",
            DATA_FILE_PREFIX,
            resolution,
            format.extension()
        ))
    }
}
