//! Offline reverse geocoding for India over the H3 cell hierarchy.
//!
//! `lakhua` turns a latitude/longitude pair or an H3 cell id into the city, state,
//! district and postal code that cover it. Lookups are hash-map reads against datasets
//! loaded once into memory; nothing touches the network.
//!
//! # Features
//!
//! - **Two entry points** - [`Geocoder::geocode`] for coordinates, [`Geocoder::geocode_cell`] for H3 cells
//! - **Parent fallback** - A miss at resolution 5 retries the resolution 4 ancestor
//! - **Load once** - All resolutions are read on first use and shared afterwards
//! - **Thread-Safe** - Both services are `Send + Sync`; share them behind an `Arc`
//! - **Offline** - Datasets are plain files next to your binary
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use lakhua::{GeocodeOptions, Geocoder, StoreCache, StoreConfig};
//!
//! # fn main() -> lakhua::Result<()> {
//! let stores = Arc::new(StoreCache::new(StoreConfig::new("data")));
//! let geocoder = Geocoder::new(Arc::clone(&stores));
//!
//! if let Some(place) = geocoder.geocode(28.6139, 77.2090, &GeocodeOptions::default())? {
//!     println!("{}, {}", place.city, place.state);
//!     println!("matched {} at r{}", place.matched_cell, place.matched_resolution);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Lookup Algorithm
//!
//! 1. Convert the coordinate to an H3 cell at the requested resolution (default 5)
//! 2. Clamp the cell's resolution into the supported range `4..=5`
//! 3. Look the cell up in that resolution's store
//! 4. On a miss, derive the parent one resolution coarser and look again
//! 5. Return the first hit, or `None` once resolution 4 has been tried
//!
//! With [`GeocodeOptions::fallback`] disabled only step 3 runs. The result reports which
//! cell and resolution actually matched.
//!
//! # Input Handling
//!
//! Invalid input is not an error. An unparseable cell id, a non-finite coordinate, or a
//! latitude outside `[-90, 90]` all produce `Ok(None)`, the same as a point with no
//! coverage. The only `Err` is [`Error`]: a dataset file that exists but cannot be read.
//!
//! # Datasets
//!
//! One file per resolution in the data directory:
//!
//! - `reverse_geo_{R}.json` - `{"<cell>": {"city": .., "state": .., "district": .., "pincode": ..}}`
//! - `reverse_geo_{R}.bin` - compact form produced by the `build-database` binary
//!
//! A resolution with no file reads as an empty store.
//!
//! # Testing
//!
//! [`StoreCache::set_test_override`] swaps in in-memory stores without touching disk:
//!
//! ```
//! use std::collections::HashMap;
//! use std::sync::Arc;
//! use lakhua::{GeocodeOptions, Geocoder, LocationDetails, ResolutionStore, StoreCache};
//!
//! let stores = Arc::new(StoreCache::default());
//! let mut r5 = ResolutionStore::default();
//! r5.insert("8560145bfffffff".into(), LocationDetails::new("New Delhi", "Delhi"));
//! stores.set_test_override(Some(HashMap::from([(5, r5)])));
//!
//! let geocoder = Geocoder::new(stores);
//! let place = geocoder
//!     .geocode_cell("8560145bfffffff", &GeocodeOptions::default())
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(place.city, "New Delhi");
//! assert_eq!(place.matched_resolution, 5);
//! ```
//!
//! # Modules
//!
//! - [`config`] - Resolution bounds and dataset paths
//! - [`types`] - Records, results and options
//! - [`index`] - The H3 primitives behind the fallback walk
//! - [`dataset`] - Dataset file formats

#![warn(missing_docs)]

pub mod config;
pub mod dataset;
mod error;
mod geocoder;
pub mod index;
mod store;
pub mod types;

pub use config::StoreConfig;
pub use error::{Error, Result};
pub use geocoder::Geocoder;
pub use index::{H3Index, SpatialIndex};
pub use store::StoreCache;
pub use types::{GeocodeOptions, GeocodeResult, LocationDetails, ResolutionStore};
