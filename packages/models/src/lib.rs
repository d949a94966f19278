#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Hail trigger analysis data model.
//!
//! These types describe the inputs that are configuration constants (target
//! and benchmark locations, buffer ring distances) and every structure the
//! analysis returns to a rendering client: per-year outcomes, the basic
//! Bayesian summary, buffer zone summaries, the regional comparison and the
//! combined estimate. All result types serialize as camelCase JSON.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A WGS84 point in longitude/latitude order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Latitude in decimal degrees.
    pub latitude: f64,
}

impl Location {
    #[must_use]
    pub const fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.latitude, self.longitude)
    }
}

/// A location with a human-readable name (the insured site or a regional
/// benchmark).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedLocation {
    /// Display name (e.g. "Deep Ellum").
    pub name: String,
    /// Coordinates of the site.
    #[serde(flatten)]
    pub location: Location,
}

/// Radius of a circular buffer ring around a location, in meters.
///
/// Serialized as its label (`"2000m"`), which is also the key used in every
/// per-ring map of the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct BufferDistance(u32);

impl BufferDistance {
    #[must_use]
    pub const fn from_meters(meters: u32) -> Self {
        Self(meters)
    }

    #[must_use]
    pub const fn meters(self) -> u32 {
        self.0
    }

    /// Area of the ring's disc in square kilometers.
    #[must_use]
    pub fn area_km2(self) -> f64 {
        let radius_km = f64::from(self.0) / 1000.0;
        std::f64::consts::PI * radius_km.powi(2)
    }
}

impl fmt::Display for BufferDistance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}m", self.0)
    }
}

impl FromStr for BufferDistance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_suffix('m')
            .unwrap_or(s)
            .parse::<u32>()
            .map(Self)
            .map_err(|e| format!("Invalid buffer distance '{s}': {e}"))
    }
}

impl From<BufferDistance> for String {
    fn from(value: BufferDistance) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for BufferDistance {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A quotient that may be undefined because its denominator was zero.
///
/// Used instead of letting `NaN`/`inf` leak into results or silently
/// substituting zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "camelCase")]
pub enum Ratio {
    /// The quotient is a finite number.
    Defined(f64),
    /// The denominator was zero.
    Undefined,
}

impl Ratio {
    /// Divides `numerator` by `denominator`, yielding [`Ratio::Undefined`]
    /// when the result is not finite.
    #[must_use]
    pub fn divide(numerator: f64, denominator: f64) -> Self {
        let quotient = numerator / denominator;
        if quotient.is_finite() {
            Self::Defined(quotient)
        } else {
            Self::Undefined
        }
    }

    /// Percentage change of `value` relative to `baseline`.
    #[must_use]
    pub fn percent_change(value: f64, baseline: f64) -> Self {
        Self::divide(value - baseline, baseline).map(|ratio| ratio * 100.0)
    }

    /// Applies `f` to a defined value; an undefined ratio stays undefined.
    #[must_use]
    pub fn map(self, f: impl FnOnce(f64) -> f64) -> Self {
        match self {
            Self::Defined(value) => Self::Defined(f(value)),
            Self::Undefined => Self::Undefined,
        }
    }

    #[must_use]
    pub const fn value(self) -> Option<f64> {
        match self {
            Self::Defined(value) => Some(value),
            Self::Undefined => None,
        }
    }
}

impl fmt::Display for Ratio {
    /// Formats a defined value with the caller's precision, or `undefined`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Defined(value) => fmt::Display::fmt(value, f),
            Self::Undefined => f.write_str("undefined"),
        }
    }
}

/// A two-sided interval `(low, high)`, serialized as a two-element array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct ConfidenceInterval {
    pub low: f64,
    pub high: f64,
}

impl From<(f64, f64)> for ConfidenceInterval {
    fn from((low, high): (f64, f64)) -> Self {
        Self { low, high }
    }
}

impl From<ConfidenceInterval> for (f64, f64) {
    fn from(value: ConfidenceInterval) -> Self {
        (value.low, value.high)
    }
}

/// Event statistics for one buffer ring around one location in one year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferResult {
    /// Footprints whose centroid lies within the ring.
    pub event_count: u32,
    /// Events per square kilometer of the ring's disc.
    pub density: f64,
    /// Inverse-distance weighted share of events (1.0 with any event, else 0).
    pub weighted_probability: f64,
}

/// Buffer ring statistics for the target aggregated across the window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferZoneSummary {
    /// Events summed across all window years.
    pub total_events: u32,
    /// Mean events per km² per year.
    pub annual_probability: f64,
    /// `annual_probability` times the payout per trigger.
    pub expected_payout: f64,
    /// Bootstrap percentile interval of the mean yearly event count.
    pub confidence_interval: ConfidenceInterval,
}

/// Buffer ring event totals for a benchmark location across years with data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RingTotals {
    pub total_events: u32,
    pub years: u32,
    /// `total_events / years`; undefined when no year had data.
    pub annual_rate: Ratio,
}

/// Trigger statistics for one regional benchmark location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkLocationResult {
    /// Benchmark name.
    pub name: String,
    /// Benchmark coordinates.
    pub coords: Location,
    /// Years in which a footprint contained the benchmark.
    pub triggers: u32,
    /// Years whose footprint data loaded successfully.
    pub years_with_data: u32,
    /// `triggers / years_with_data`.
    pub annual_trigger_rate: Ratio,
    /// `triggers / sqrt(years_with_data)`, a simple precision proxy.
    pub confidence: Ratio,
    /// Per-ring event totals.
    pub buffer_results: BTreeMap<BufferDistance, RingTotals>,
}

/// Confidence-weighted blend of the benchmark trigger rates.
///
/// Every field is undefined when any benchmark's rate is undefined, which
/// happens when no window year had data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionalAggregate {
    pub weighted_probability: Ratio,
    pub expected_payout: Ratio,
    /// Heuristic weight of the regional data (`Σ confidence · 10`).
    pub effective_sample_size: Ratio,
}

/// Regional benchmarking output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionalComparison {
    pub locations: Vec<BenchmarkLocationResult>,
    pub aggregate_estimate: RegionalAggregate,
}

/// Beta-Binomial posterior for the target's trigger rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BayesianEstimate {
    /// Posterior alpha (`triggers + 0.5`).
    pub alpha: f64,
    /// Posterior beta (`non-triggers + 0.5`).
    pub beta: f64,
    /// Posterior mean `alpha / (alpha + beta)`.
    pub bayesian_mean: f64,
    /// Posterior mean with the 5% haircut applied.
    pub conservative_estimate: f64,
    /// `conservative_estimate` times the payout per trigger.
    pub expected_payout: f64,
}

/// Final blended trigger probability and payout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedEstimate {
    /// Weighted blend of the spatial, regional and Bayesian estimates. Not
    /// clamped to `[0, 1]`; undefined when the regional estimate is.
    pub probability: Ratio,
    pub expected_payout: Ratio,
    pub methodology: String,
    /// Percentage change of `probability` over the conservative estimate.
    pub improvement_vs_basic: Ratio,
}

/// Outcome of processing a single year of the observation window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyOutcome {
    pub year: i32,
    /// Whether a footprint contained the target.
    pub triggered: bool,
    /// Payout for the year (the full payout when triggered, else zero).
    pub payout: f64,
    /// Number of features in the year's collection.
    pub polygon_count: usize,
    /// Load failure message; set only when the year's data was unusable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Indices of the features whose footprint contains the target.
    pub hit_polygons: Vec<usize>,
    /// Per-ring buffer analysis around the target.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buffer_analysis: Option<BTreeMap<BufferDistance, BufferResult>>,
}

impl YearlyOutcome {
    /// Outcome for a year whose data could not be loaded.
    #[must_use]
    pub fn failed(year: i32, error: impl Into<String>) -> Self {
        Self {
            year,
            triggered: false,
            payout: 0.0,
            polygon_count: 0,
            error: Some(error.into()),
            hit_polygons: vec![],
            buffer_analysis: None,
        }
    }
}

/// Trigger statistics for the target over the full window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    /// Window length, including years that failed to load.
    pub total_years: u32,
    pub triggered_years: u32,
    /// `triggered_years / total_years`.
    pub trigger_probability: f64,
    #[serde(flatten)]
    pub bayesian: BayesianEstimate,
    pub triggered_years_list: Vec<i32>,
}

/// Spatial and regional enhancements plus the combined estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedAnalysis {
    pub buffer_zone_results: BTreeMap<BufferDistance, BufferZoneSummary>,
    pub regional_comparison: RegionalComparison,
    pub combined_estimate: CombinedEstimate,
}

/// Complete result of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HailAnalysis {
    pub target: NamedLocation,
    pub payout_per_trigger: f64,
    /// One entry per window year, in year order.
    pub yearly_results: Vec<YearlyOutcome>,
    pub summary: AnalysisSummary,
    pub enhanced_analysis: EnhancedAnalysis,
}
