//! Analysis configuration.
//!
//! The default profile (Pecan Lodge in Dallas with six regional benchmarks)
//! is embedded at compile time. Alternative profiles use the same TOML
//! schema and go through the same validation.

use hail_trigger_models::{BufferDistance, Location, NamedLocation};
use serde::{Deserialize, Serialize};

use crate::AnalysisError;

/// Embedded default profile.
const DEFAULT_PROFILE: &str = include_str!("../config/dallas.toml");

/// Tolerance for the combination weights summing to one.
const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Consecutive years of footprint data to analyze.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationWindow {
    pub first_year: i32,
    pub year_count: u16,
}

/// Blend weights of the combined estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombinationWeights {
    /// Weight of the spatial ring's annual probability.
    pub spatial: f64,
    /// Weight of the regional benchmark aggregate.
    pub regional: f64,
    /// Weight of the conservative Bayesian estimate.
    pub original: f64,
}

impl CombinationWeights {
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.spatial + self.regional + self.original
    }
}

/// Percentile bootstrap parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BootstrapSettings {
    pub iterations: usize,
    pub confidence: f64,
}

/// Full analysis configuration, deserialized from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Fixed payout when the target is hit in a year.
    pub payout_per_trigger: f64,
    /// Buffer ring radii in meters.
    pub buffer_distances: Vec<u32>,
    /// Ring (in meters) whose annual probability feeds the combined estimate.
    pub spatial_ring: u32,
    /// The insured location.
    pub target: NamedLocation,
    pub window: ObservationWindow,
    pub weights: CombinationWeights,
    pub bootstrap: BootstrapSettings,
    /// Regional benchmark locations.
    pub benchmarks: Vec<NamedLocation>,
}

impl AnalysisConfig {
    /// Returns the embedded default profile.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML fails to parse or validate. Since it is a
    /// compile-time constant, a failure indicates a development error and is
    /// caught by the test suite.
    #[must_use]
    pub fn default_profile() -> Self {
        Self::from_toml_str(DEFAULT_PROFILE)
            .unwrap_or_else(|e| panic!("Failed to load default analysis profile: {e}"))
    }

    /// Parses and validates a TOML profile.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError`] if the TOML is malformed or the resulting
    /// configuration is invalid.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, AnalysisError> {
        let config: Self = toml::de::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Years of the observation window in ascending order.
    pub fn years(&self) -> impl Iterator<Item = i32> + use<> {
        let first = self.window.first_year;
        first..first + i32::from(self.window.year_count)
    }

    #[must_use]
    pub fn buffer_distances(&self) -> Vec<BufferDistance> {
        self.buffer_distances
            .iter()
            .copied()
            .map(BufferDistance::from_meters)
            .collect()
    }

    #[must_use]
    pub const fn spatial_ring(&self) -> BufferDistance {
        BufferDistance::from_meters(self.spatial_ring)
    }

    /// Checks every invariant the analysis relies on.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidConfig`] describing the first
    /// violated constraint.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if !self.payout_per_trigger.is_finite() || self.payout_per_trigger < 0.0 {
            return Err(invalid(format!(
                "payout_per_trigger must be a non-negative number, got {}",
                self.payout_per_trigger
            )));
        }

        if self.window.year_count == 0 {
            return Err(invalid("window.year_count must be at least 1"));
        }
        if self
            .window
            .first_year
            .checked_add(i32::from(self.window.year_count))
            .is_none()
        {
            return Err(invalid("observation window overflows the year range"));
        }

        if self.buffer_distances.is_empty() {
            return Err(invalid("buffer_distances must not be empty"));
        }
        if self.buffer_distances.contains(&0) {
            return Err(invalid("buffer distances must be positive"));
        }
        let mut sorted = self.buffer_distances.clone();
        sorted.sort_unstable();
        sorted.dedup();
        if sorted.len() != self.buffer_distances.len() {
            return Err(invalid("buffer_distances must not contain duplicates"));
        }
        if !self.buffer_distances.contains(&self.spatial_ring) {
            return Err(invalid(format!(
                "spatial_ring {} is not one of the buffer distances",
                self.spatial_ring
            )));
        }

        validate_location(&self.target)?;
        if self.benchmarks.is_empty() {
            return Err(invalid("at least one benchmark location is required"));
        }
        for benchmark in &self.benchmarks {
            validate_location(benchmark)?;
        }

        let weights = [
            ("spatial", self.weights.spatial),
            ("regional", self.weights.regional),
            ("original", self.weights.original),
        ];
        for (name, weight) in weights {
            if !weight.is_finite() || weight < 0.0 {
                return Err(invalid(format!(
                    "weights.{name} must be a non-negative number, got {weight}"
                )));
            }
        }
        if (self.weights.sum() - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(invalid(format!(
                "weights must sum to 1, got {}",
                self.weights.sum()
            )));
        }

        if self.bootstrap.iterations == 0 {
            return Err(invalid("bootstrap.iterations must be at least 1"));
        }
        if !(self.bootstrap.confidence > 0.0 && self.bootstrap.confidence < 1.0) {
            return Err(invalid(format!(
                "bootstrap.confidence must be strictly between 0 and 1, got {}",
                self.bootstrap.confidence
            )));
        }

        Ok(())
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self::default_profile()
    }
}

fn validate_location(named: &NamedLocation) -> Result<(), AnalysisError> {
    let Location {
        longitude,
        latitude,
    } = named.location;

    if !(-180.0..=180.0).contains(&longitude) || !(-90.0..=90.0).contains(&latitude) {
        return Err(invalid(format!(
            "location '{}' has out-of-range coordinates {}",
            named.name, named.location
        )));
    }

    Ok(())
}

fn invalid(message: impl Into<String>) -> AnalysisError {
    AnalysisError::InvalidConfig {
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profile_matches_dallas_constants() {
        let config = AnalysisConfig::default_profile();

        assert_eq!(config.target.name, "Pecan Lodge");
        assert!((config.target.location.longitude - -96.7824).abs() < 1e-12);
        assert!((config.target.location.latitude - 32.7969).abs() < 1e-12);
        assert!((config.payout_per_trigger - 10_000.0).abs() < f64::EPSILON);
        assert_eq!(config.years().collect::<Vec<_>>(), (2011..=2020).collect::<Vec<_>>());
        assert_eq!(config.buffer_distances, [1000, 2000, 5000]);
        assert_eq!(config.spatial_ring().to_string(), "2000m");
        assert_eq!(config.benchmarks.len(), 6);
        assert_eq!(config.bootstrap.iterations, 1000);
        assert!((config.bootstrap.confidence - 0.95).abs() < f64::EPSILON);
        assert!((config.weights.spatial - 0.4).abs() < f64::EPSILON);
        assert!((config.weights.regional - 0.4).abs() < f64::EPSILON);
        assert!((config.weights.original - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn benchmark_names_are_unique() {
        let config = AnalysisConfig::default_profile();
        let mut names: Vec<&str> = config.benchmarks.iter().map(|b| b.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), config.benchmarks.len());
    }

    #[test]
    fn benchmarks_are_near_the_target() {
        let config = AnalysisConfig::default_profile();
        for benchmark in &config.benchmarks {
            let d_lng = (benchmark.location.longitude - config.target.location.longitude).abs();
            let d_lat = (benchmark.location.latitude - config.target.location.latitude).abs();
            assert!(
                d_lng < 0.2 && d_lat < 0.2,
                "{} is not in the Dallas area",
                benchmark.name
            );
        }
    }

    #[test]
    fn roundtrips_through_toml() {
        let config = AnalysisConfig::default_profile();
        let rendered = toml::to_string(&config).unwrap();
        assert_eq!(AnalysisConfig::from_toml_str(&rendered).unwrap(), config);
    }

    #[test]
    fn rejects_spatial_ring_outside_buffers() {
        let mut config = AnalysisConfig::default_profile();
        config.spatial_ring = 3000;
        assert!(matches!(
            config.validate(),
            Err(AnalysisError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn rejects_unbalanced_weights() {
        let mut config = AnalysisConfig::default_profile();
        config.weights.original = 0.5;
        assert!(config.validate().is_err());

        let mut config = AnalysisConfig::default_profile();
        config.weights.spatial = -0.1;
        config.weights.regional = 0.9;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_degenerate_settings() {
        let mut config = AnalysisConfig::default_profile();
        config.window.year_count = 0;
        assert!(config.validate().is_err());

        let mut config = AnalysisConfig::default_profile();
        config.benchmarks.clear();
        assert!(config.validate().is_err());

        let mut config = AnalysisConfig::default_profile();
        config.bootstrap.confidence = 1.0;
        assert!(config.validate().is_err());

        let mut config = AnalysisConfig::default_profile();
        config.buffer_distances = vec![1000, 2000, 2000];
        assert!(config.validate().is_err());

        let mut config = AnalysisConfig::default_profile();
        config.target.location.latitude = 132.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(matches!(
            AnalysisConfig::from_toml_str("payout_per_trigger = \"lots\""),
            Err(AnalysisError::Toml(_))
        ));
    }
}
