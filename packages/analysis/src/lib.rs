#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Annual hail trigger probability and expected payout for a fixed location.
//!
//! Ten years of footprints at a single point make a small sample, so the
//! point-in-polygon trigger history is blended with nearby-event density in
//! buffer rings around the target and with trigger rates at regional
//! benchmark sites. The analysis is a pure function of the yearly footprint
//! collections and an [`AnalysisConfig`]; see [`pipeline::analyze`].

pub mod bayes;
pub mod bootstrap;
pub mod combine;
pub mod config;
pub mod pipeline;
pub mod regional;
pub mod source;

pub use config::AnalysisConfig;
pub use pipeline::analyze;
pub use source::{DataLoadError, DirectorySource, FootprintSource};

use thiserror::Error;

/// Errors that abort an analysis run.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The configuration violates a constraint.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what went wrong.
        message: String,
    },

    /// TOML parsing failed.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// The bootstrap was given unusable input.
    #[error("Bootstrap error: {message}")]
    Bootstrap {
        /// Description of what went wrong.
        message: String,
    },

    /// More triggered years than observed years.
    #[error("Trigger count {triggers} exceeds the {total_years} observed years")]
    TriggersExceedYears {
        /// Triggered years.
        triggers: u32,
        /// Observed years.
        total_years: u32,
    },
}
