//! Core data structures for lookups.
//!
//! - [`LocationDetails`] - The administrative record attached to a cell
//! - [`ResolutionStore`] - All records for one resolution, keyed by cell id
//! - [`GeocodeResult`] - A record plus the cell and resolution that produced it
//! - [`GeocodeOptions`] - Per-call lookup settings
//! - [`CompactStore`] - Binary dataset layout written by `build-database`

#![warn(missing_docs)]

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_RESOLUTION;

/// Administrative location attached to an H3 cell.
///
/// Records are parsed once from the dataset and never mutated afterwards.
///
/// # Examples
///
/// ```
/// use lakhua::LocationDetails;
///
/// let details: LocationDetails =
///     serde_json::from_str(r#"{"city": "Pune", "state": "Maharashtra"}"#).unwrap();
/// assert_eq!(details.city, "Pune");
/// assert!(details.pincode.is_none());
/// ```
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode,
)]
pub struct LocationDetails {
    /// City or town name (e.g., "New Delhi", "Mumbai")
    pub city: String,
    /// State or union territory (e.g., "Delhi", "Maharashtra")
    pub state: String,
    /// District, when the dataset has one (e.g., "Central Delhi")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    /// Six-digit postal index number, when known (e.g., "110001")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pincode: Option<String>,
}

impl LocationDetails {
    /// Creates a record with only the required fields set.
    pub fn new(city: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            state: state.into(),
            district: None,
            pincode: None,
        }
    }

    /// Sets the district.
    pub fn with_district(mut self, district: impl Into<String>) -> Self {
        self.district = Some(district.into());
        self
    }

    /// Sets the postal code.
    pub fn with_pincode(mut self, pincode: impl Into<String>) -> Self {
        self.pincode = Some(pincode.into());
        self
    }
}

/// Mapping from H3 cell id to its record, for a single resolution.
///
/// Uses `FxHashMap` (from `rustc-hash`) since keys are short trusted strings.
pub type ResolutionStore = rustc_hash::FxHashMap<String, LocationDetails>;

/// A successful lookup.
///
/// `matched_cell` and `matched_resolution` record which level of the hierarchy produced
/// the hit. They differ from the queried cell whenever fallback to a parent occurred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeocodeResult {
    /// The matched record.
    #[serde(flatten)]
    pub details: LocationDetails,
    /// Cell id that was found in the store
    #[serde(rename = "matched_h3")]
    pub matched_cell: String,
    /// Resolution of `matched_cell`
    pub matched_resolution: u8,
}

impl std::ops::Deref for GeocodeResult {
    type Target = LocationDetails;

    fn deref(&self) -> &Self::Target {
        &self.details
    }
}

/// Settings for a single lookup.
///
/// Absent fields take their defaults when deserialized, so `{}` is a valid options
/// object. Out-of-range resolutions are clamped rather than rejected.
///
/// # Examples
///
/// ```
/// use lakhua::GeocodeOptions;
///
/// let options = GeocodeOptions::default();
/// assert_eq!(options.resolution(), 5);
/// assert!(options.fallback);
/// assert!(!options.debug);
///
/// let options = GeocodeOptions::default().with_resolution(99).with_fallback(false);
/// assert_eq!(options.resolution(), 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodeOptions {
    /// Resolution for coordinate conversion. `None` means [`DEFAULT_RESOLUTION`].
    pub resolution: Option<i64>,
    /// Retry at coarser resolutions after a miss.
    pub fallback: bool,
    /// Emit timing diagnostics at `debug` level. Never changes results.
    pub debug: bool,
}

impl Default for GeocodeOptions {
    fn default() -> Self {
        Self {
            resolution: None,
            fallback: true,
            debug: false,
        }
    }
}

impl GeocodeOptions {
    /// Sets the requested resolution.
    pub fn with_resolution(mut self, resolution: i64) -> Self {
        self.resolution = Some(resolution);
        self
    }

    /// Enables or disables parent fallback.
    pub fn with_fallback(mut self, fallback: bool) -> Self {
        self.fallback = fallback;
        self
    }

    /// Enables or disables timing diagnostics.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Effective resolution after defaulting and clamping.
    pub fn resolution(&self) -> u8 {
        self.resolution
            .map_or(DEFAULT_RESOLUTION, crate::config::clamp_resolution)
    }
}

/// Binary dataset layout for one resolution.
///
/// Entries are sorted by cell id so that compiling the same JSON twice yields identical
/// bytes.
#[derive(Debug, bincode::Encode, bincode::Decode)]
pub struct CompactStore {
    /// Resolution the entries belong to.
    pub resolution: u8,
    /// `(cell id, record)` pairs.
    pub entries: Vec<(String, LocationDetails)>,
}

impl CompactStore {
    /// Builds the sorted layout from an in-memory store.
    pub fn from_store(resolution: u8, store: &ResolutionStore) -> Self {
        let mut entries: Vec<_> = store
            .iter()
            .map(|(cell, details)| (cell.clone(), details.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Self {
            resolution,
            entries,
        }
    }

    /// Converts back into a lookup store.
    pub fn into_store(self) -> ResolutionStore {
        self.entries.into_iter().collect()
    }
}
