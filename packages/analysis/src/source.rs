//! Where yearly footprint collections come from.
//!
//! The pipeline asks a [`FootprintSource`] for one year at a time. A failed
//! load is recorded against that year and never aborts the run.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use hail_trigger_spatial::{FootprintCollection, FootprintError};
use thiserror::Error;

/// Errors that can occur while loading one year of footprint data.
#[derive(Debug, Error)]
pub enum DataLoadError {
    /// The year's file could not be read.
    #[error("Failed to load {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The year's data was read but is not a usable feature collection.
    #[error("Failed to parse footprints for {year}: {source}")]
    Parse {
        year: i32,
        #[source]
        source: FootprintError,
    },

    /// The source has nothing for the year.
    #[error("No footprint data for {year}")]
    Missing { year: i32 },
}

/// Provides the footprint collection for a year.
pub trait FootprintSource {
    /// Loads the footprints recorded in `year`.
    ///
    /// # Errors
    ///
    /// Returns [`DataLoadError`] if the year's data is missing or unusable.
    fn load(&self, year: i32) -> Result<FootprintCollection, DataLoadError>;
}

/// In-memory collections keyed by year; absent years are
/// [`DataLoadError::Missing`].
impl FootprintSource for BTreeMap<i32, FootprintCollection> {
    fn load(&self, year: i32) -> Result<FootprintCollection, DataLoadError> {
        self.get(&year)
            .cloned()
            .ok_or(DataLoadError::Missing { year })
    }
}

impl<F> FootprintSource for F
where
    F: Fn(i32) -> Result<FootprintCollection, DataLoadError>,
{
    fn load(&self, year: i32) -> Result<FootprintCollection, DataLoadError> {
        self(year)
    }
}

/// Reads `hail_{year}.geojson` files from a directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `year`'s footprints.
    #[must_use]
    pub fn path_for(&self, year: i32) -> PathBuf {
        self.dir.join(format!("hail_{year}.geojson"))
    }
}

impl FootprintSource for DirectorySource {
    fn load(&self, year: i32) -> Result<FootprintCollection, DataLoadError> {
        let path = self.path_for(year);
        log::debug!("Reading footprints from {}", path.display());

        let contents = std::fs::read_to_string(&path)
            .map_err(|source| DataLoadError::Io { path, source })?;

        FootprintCollection::from_geojson_str(&contents)
            .map_err(|source| DataLoadError::Parse { year, source })
    }
}
