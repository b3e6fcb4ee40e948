//! Reading and writing dataset files.
//!
//! Each resolution has its own file in the data directory. A JSON file maps cell ids to
//! location objects; `build-database` compiles it into a bincode file that loads faster.
//! When both exist the compact file wins.
//!
//! Absence and corruption are deliberately handled apart. A missing file means the
//! dataset has no coverage at that resolution and reads as `Ok(None)`. A file that is
//! present but unreadable or malformed is an error.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::{DataFormat, StoreConfig, SUPPORTED_RESOLUTIONS};
use crate::error::{Error, Result};
use crate::types::{CompactStore, ResolutionStore};

fn read_bytes(path: &Path) -> Result<Option<Vec<u8>>> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(Error::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Parses a JSON dataset. `Ok(None)` if the file does not exist.
pub fn read_json(path: &Path) -> Result<Option<ResolutionStore>> {
    let Some(bytes) = read_bytes(path)? else {
        return Ok(None);
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|source| Error::Json {
            path: path.to_path_buf(),
            source,
        })
}

/// Decodes a compact dataset. `Ok(None)` if the file does not exist.
pub fn read_compact(path: &Path) -> Result<Option<ResolutionStore>> {
    let Some(bytes) = read_bytes(path)? else {
        return Ok(None);
    };
    let (compact, _): (CompactStore, _) =
        bincode::decode_from_slice(&bytes, bincode::config::standard()).map_err(|source| {
            Error::Decode {
                path: path.to_path_buf(),
                source,
            }
        })?;
    Ok(Some(compact.into_store()))
}

/// Writes `store` in the compact format. Returns the number of bytes written.
pub fn write_compact(resolution: u8, store: &ResolutionStore, path: &Path) -> Result<usize> {
    let compact = CompactStore::from_store(resolution, store);
    let encoded =
        bincode::encode_to_vec(&compact, bincode::config::standard()).map_err(|source| {
            Error::Encode {
                path: path.to_path_buf(),
                source,
            }
        })?;
    std::fs::write(path, &encoded).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(encoded.len())
}

/// Loads the store for `resolution`, preferring the compact file over JSON.
///
/// Returns an empty store when neither file exists.
pub fn load_resolution(config: &StoreConfig, resolution: u8) -> Result<ResolutionStore> {
    let compact = config.data_file_path(resolution, DataFormat::Compact);
    if let Some(store) = read_compact(&compact)? {
        debug!(
            "Loaded r{} from {} ({} cells)",
            resolution,
            compact.display(),
            store.len()
        );
        return Ok(store);
    }

    let json = config.data_file_path(resolution, DataFormat::Json);
    match read_json(&json)? {
        Some(store) => {
            debug!(
                "Loaded r{} from {} ({} cells)",
                resolution,
                json.display(),
                store.len()
            );
            Ok(store)
        }
        None => {
            debug!("No dataset for r{} in {}", resolution, config.data_dir.display());
            Ok(ResolutionStore::default())
        }
    }
}

/// One compiled resolution, as reported by [`compile_dir`].
#[derive(Debug, Clone)]
pub struct CompiledDataset {
    /// Resolution compiled.
    pub resolution: u8,
    /// File written.
    pub path: PathBuf,
    /// Number of cells written.
    pub cells: usize,
    /// Encoded size in bytes.
    pub bytes: usize,
}

/// Compiles every supported resolution's JSON dataset into its compact sibling.
///
/// Resolutions without a JSON file are skipped.
pub fn compile_dir(config: &StoreConfig) -> Result<Vec<CompiledDataset>> {
    let mut compiled = Vec::new();
    for resolution in SUPPORTED_RESOLUTIONS {
        let source = config.data_file_path(resolution, DataFormat::Json);
        let Some(store) = read_json(&source)? else {
            info!("Skipping r{}: {} not found", resolution, source.display());
            continue;
        };

        let path = config.data_file_path(resolution, DataFormat::Compact);
        let bytes = write_compact(resolution, &store, &path)?;
        info!(
            "Compiled r{}: {} cells, {} bytes -> {}",
            resolution,
            store.len(),
            bytes,
            path.display()
        );
        compiled.push(CompiledDataset {
            resolution,
            path,
            cells: store.len(),
            bytes,
        });
    }
    Ok(compiled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LocationDetails;

    fn sample_store() -> ResolutionStore {
        let mut store = ResolutionStore::default();
        store.insert(
            "8560145bfffffff".to_string(),
            LocationDetails::new("New Delhi", "Delhi")
                .with_district("Central Delhi")
                .with_pincode("110001"),
        );
        store
    }

    #[test]
    fn test_missing_files_are_empty() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::new(dir.path());
        assert!(read_json(&config.data_file_path(5, DataFormat::Json))
            .unwrap()
            .is_none());
        assert!(load_resolution(&config, 5).unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::new(dir.path());
        std::fs::write(config.data_file_path(5, DataFormat::Json), b"{not json").unwrap();
        assert!(matches!(
            load_resolution(&config, 5),
            Err(Error::Json { .. })
        ));
    }

    #[test]
    fn test_corrupt_compact_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::new(dir.path());
        std::fs::write(config.data_file_path(4, DataFormat::Compact), [0xff; 3]).unwrap();
        assert!(matches!(
            load_resolution(&config, 4),
            Err(Error::Decode { .. })
        ));
    }

    #[test]
    fn test_unreadable_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::new(dir.path());
        std::fs::create_dir(config.data_file_path(5, DataFormat::Json)).unwrap();
        assert!(matches!(
            load_resolution(&config, 5),
            Err(Error::Io { .. })
        ));
    }

    #[test]
    fn test_compile_prefers_compact() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::new(dir.path());
        let json = serde_json::to_vec(&sample_store()).unwrap();
        std::fs::write(config.data_file_path(5, DataFormat::Json), json).unwrap();

        let compiled = compile_dir(&config).unwrap();
        assert_eq!(compiled.len(), 1);
        assert_eq!(compiled[0].resolution, 5);
        assert_eq!(compiled[0].cells, 1);

        // Compact file is authoritative once present.
        std::fs::write(config.data_file_path(5, DataFormat::Json), b"{}").unwrap();
        assert_eq!(load_resolution(&config, 5).unwrap(), sample_store());
    }
}
