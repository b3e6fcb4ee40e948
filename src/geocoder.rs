use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use crate::config::{clamp_resolution, MIN_RESOLUTION};
use crate::error::Result;
use crate::index::{H3Index, SpatialIndex};
use crate::store::StoreCache;
use crate::types::{GeocodeOptions, GeocodeResult};

/// Resolves coordinates and cell ids against a [`StoreCache`].
///
/// A lookup starts at the cell's own resolution (clamped into the supported range) and,
/// with fallback enabled, walks up one parent at a time until the coarsest supported
/// resolution. The first store that contains the key wins.
pub struct Geocoder<I = H3Index> {
    stores: Arc<StoreCache>,
    index: I,
}

impl Geocoder<H3Index> {
    /// Creates a geocoder over the H3 grid.
    pub fn new(stores: Arc<StoreCache>) -> Self {
        Self::with_index(stores, H3Index)
    }
}

impl<I: SpatialIndex> Geocoder<I> {
    /// Creates a geocoder using a custom cell index.
    pub fn with_index(stores: Arc<StoreCache>, index: I) -> Self {
        Self { stores, index }
    }

    /// The cache this geocoder reads from.
    pub fn store_cache(&self) -> &Arc<StoreCache> {
        &self.stores
    }

    /// Looks up a cell id, falling back to its ancestors when `options.fallback` is set.
    ///
    /// Invalid cell ids yield `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Only a dataset that exists but cannot be loaded produces an error.
    pub fn geocode_cell(
        &self,
        cell: &str,
        options: &GeocodeOptions,
    ) -> Result<Option<GeocodeResult>> {
        let native = match self.index.resolution(cell) {
            Some(native) if self.index.is_valid_cell(cell) => native,
            _ => {
                if options.debug {
                    debug!("Invalid cell id {:?}", cell);
                }
                return Ok(None);
            }
        };

        let started = Instant::now();
        let start = clamp_resolution(native.into());
        let end = if options.fallback { MIN_RESOLUTION } else { start };

        for resolution in (end..=start).rev() {
            let candidate = if resolution == native {
                cell.to_string()
            } else {
                match self.index.cell_to_parent(cell, resolution) {
                    Some(parent) => parent,
                    // Cell is coarser than the clamped start; it has no ancestor here.
                    None => continue,
                }
            };

            let store = self.stores.get(resolution)?;
            let lookup_started = Instant::now();
            let hit = store.get(&candidate);
            if options.debug {
                debug!(
                    "Lookup {} in r{} took {:.3}ms",
                    candidate,
                    resolution,
                    lookup_started.elapsed().as_secs_f64() * 1000.0
                );
            }

            if let Some(details) = hit {
                if options.debug {
                    debug!(
                        "Match found in {:.3}ms",
                        started.elapsed().as_secs_f64() * 1000.0
                    );
                }
                return Ok(Some(GeocodeResult {
                    details: details.clone(),
                    matched_cell: candidate,
                    matched_resolution: resolution,
                }));
            }
        }

        if options.debug {
            debug!(
                "No match for {} in {:.3}ms",
                cell,
                started.elapsed().as_secs_f64() * 1000.0
            );
        }
        Ok(None)
    }

    /// Looks up a coordinate in decimal degrees.
    ///
    /// The point is converted to a cell at `options.resolution()` and resolved with
    /// [`geocode_cell`](Self::geocode_cell). Non-finite or out-of-range coordinates yield
    /// `Ok(None)`.
    pub fn geocode(
        &self,
        latitude: f64,
        longitude: f64,
        options: &GeocodeOptions,
    ) -> Result<Option<GeocodeResult>> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Ok(None);
        }
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            if options.debug {
                debug!("Coordinate ({}, {}) out of range", latitude, longitude);
            }
            return Ok(None);
        }

        let Some(cell) = self
            .index
            .coordinate_to_cell(latitude, longitude, options.resolution())
        else {
            return Ok(None);
        };
        self.geocode_cell(&cell, options)
    }

    /// Looks up many coordinates with the same options, preserving order.
    pub fn geocode_batch(
        &self,
        points: &[(f64, f64)],
        options: &GeocodeOptions,
    ) -> Result<Vec<Option<GeocodeResult>>> {
        points
            .iter()
            .map(|&(latitude, longitude)| self.geocode(latitude, longitude, options))
            .collect()
    }
}
