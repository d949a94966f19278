#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Hail footprint geometry and spatial analysis.
//!
//! Converts yearly `GeoJSON` hail footprints into explicit polygon rings,
//! answers point-in-polygon questions (directly or through an R-tree
//! envelope index), and counts nearby footprints within fixed buffer rings
//! around a location.

pub mod buffer;
pub mod footprint;
pub mod index;
pub mod kernel;

pub use buffer::analyze_buffers;
pub use footprint::{Footprint, FootprintCollection, FootprintGeometry, PolygonRings};
pub use index::FootprintIndex;
pub use kernel::{
    EARTH_RADIUS_METERS, contains_location, coord, haversine_distance_meters, point_in_ring,
    ring_centroid,
};

use thiserror::Error;

/// Errors that can occur while reading footprint data.
#[derive(Debug, Error)]
pub enum FootprintError {
    /// `GeoJSON` parsing failed.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// The document parsed but does not have the expected shape.
    #[error("Conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}
