//! Hierarchical cell primitives.
//!
//! The engine only needs four operations from a spatial index: validate a cell id, read
//! its resolution, derive its ancestor at a coarser resolution, and convert a coordinate
//! to a cell. [`SpatialIndex`] captures those so tests or alternative grids can stand in
//! for [`H3Index`].

use std::str::FromStr;

use h3o::{CellIndex, LatLng, Resolution};

/// Cell operations consumed by [`Geocoder`](crate::Geocoder).
///
/// Cell ids are opaque strings. Implementations must be deterministic: the same input
/// always yields the same parent or cell.
pub trait SpatialIndex: Send + Sync {
    /// Whether `cell` is a well-formed cell id.
    fn is_valid_cell(&self, cell: &str) -> bool;

    /// Native resolution of `cell`, or `None` if it is not valid.
    fn resolution(&self, cell: &str) -> Option<u8>;

    /// Ancestor of `cell` at `resolution`. `None` if `cell` is invalid or `resolution` is
    /// finer than the cell itself.
    fn cell_to_parent(&self, cell: &str, resolution: u8) -> Option<String>;

    /// Cell containing the coordinate at `resolution`. `None` for non-finite input or an
    /// unknown resolution.
    fn coordinate_to_cell(&self, lat: f64, lon: f64, resolution: u8) -> Option<String>;
}

/// [`SpatialIndex`] over Uber's H3 grid, backed by `h3o`.
///
/// Cell ids are the lowercase hexadecimal form, e.g. `8560145bfffffff`.
#[derive(Debug, Clone, Copy, Default)]
pub struct H3Index;

impl H3Index {
    fn parse(cell: &str) -> Option<CellIndex> {
        CellIndex::from_str(cell).ok()
    }
}

impl SpatialIndex for H3Index {
    fn is_valid_cell(&self, cell: &str) -> bool {
        Self::parse(cell).is_some()
    }

    fn resolution(&self, cell: &str) -> Option<u8> {
        Self::parse(cell).map(|index| u8::from(index.resolution()))
    }

    fn cell_to_parent(&self, cell: &str, resolution: u8) -> Option<String> {
        let resolution = Resolution::try_from(resolution).ok()?;
        Self::parse(cell)?
            .parent(resolution)
            .map(|parent| parent.to_string())
    }

    fn coordinate_to_cell(&self, lat: f64, lon: f64, resolution: u8) -> Option<String> {
        let resolution = Resolution::try_from(resolution).ok()?;
        let coord = LatLng::new(lat, lon).ok()?;
        Some(coord.to_cell(resolution).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NEW_DELHI_R5: &str = "8560145bfffffff";

    #[test]
    fn test_valid_cell() {
        let index = H3Index;
        assert!(index.is_valid_cell(NEW_DELHI_R5));
        assert_eq!(index.resolution(NEW_DELHI_R5), Some(5));
    }

    #[test]
    fn test_invalid_cells() {
        let index = H3Index;
        for cell in ["", "invalid", "invalid_h3_index", "zzzz", "0", "ffffffffffffffff"] {
            assert!(!index.is_valid_cell(cell), "{cell} should be rejected");
            assert_eq!(index.resolution(cell), None);
            assert_eq!(index.cell_to_parent(cell, 4), None);
        }
    }

    #[test]
    fn test_parent_is_coarser_ancestor() {
        let index = H3Index;
        let parent = index.cell_to_parent(NEW_DELHI_R5, 4).unwrap();
        assert_eq!(index.resolution(&parent), Some(4));
        assert_eq!(index.cell_to_parent(NEW_DELHI_R5, 5).as_deref(), Some(NEW_DELHI_R5));
        assert_eq!(index.cell_to_parent(&parent, 5), None);
    }

    #[test]
    fn test_coordinate_to_cell() {
        let index = H3Index;
        let cell = index.coordinate_to_cell(28.6139, 77.2090, 5).unwrap();
        assert_eq!(index.resolution(&cell), Some(5));
        assert_eq!(index.coordinate_to_cell(f64::NAN, 77.0, 5), None);
        assert_eq!(index.coordinate_to_cell(28.6, 77.2, 16), None);
    }
}
