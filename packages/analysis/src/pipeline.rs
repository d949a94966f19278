//! Yearly pipeline driver.
//!
//! Loads and analyzes each window year in order, recording load failures
//! against their year, and only then runs the aggregate stages: the basic
//! Bayesian summary, buffer zone summaries with bootstrap intervals, the
//! regional comparison and the combined estimate. Any failure in those
//! aggregate stages fails the whole run. A window in which no year loaded
//! still completes, with undefined regional and combined estimates.

use std::collections::BTreeMap;

use hail_trigger_models::{
    AnalysisSummary, BufferDistance, BufferZoneSummary, EnhancedAnalysis, HailAnalysis,
    YearlyOutcome,
};
use hail_trigger_spatial::{FootprintCollection, FootprintIndex, analyze_buffers};
use rand::Rng;

use crate::AnalysisError;
use crate::bayes::BetaBinomialModel;
use crate::bootstrap;
use crate::combine::{ComponentEstimates, combine};
use crate::config::{AnalysisConfig, BootstrapSettings};
use crate::regional;
use crate::source::FootprintSource;

/// A window year whose footprints loaded successfully.
#[derive(Debug, Clone)]
pub struct LoadedYear {
    pub year: i32,
    pub footprints: FootprintCollection,
}

/// Runs the full analysis for `config` against `source`.
///
/// `rng` drives the bootstrap resampling; pass a seeded generator for
/// reproducible intervals.
///
/// # Errors
///
/// Returns [`AnalysisError`] if the configuration is invalid or an
/// aggregate stage fails. Year load failures are not errors; they appear in
/// that year's outcome.
pub fn analyze<S, R>(
    source: &S,
    config: &AnalysisConfig,
    rng: &mut R,
) -> Result<HailAnalysis, AnalysisError>
where
    S: FootprintSource + ?Sized,
    R: Rng + ?Sized,
{
    config.validate()?;

    let distances = config.buffer_distances();
    let payout = config.payout_per_trigger;

    let mut yearly_results = Vec::new();
    let mut loaded = Vec::new();

    for year in config.years() {
        match source.load(year) {
            Ok(footprints) => {
                let outcome = process_year(year, &footprints, config, &distances);
                log::info!(
                    "{year}: {} ({} polygons)",
                    if outcome.triggered {
                        "TRIGGERED"
                    } else {
                        "No trigger"
                    },
                    outcome.polygon_count
                );
                yearly_results.push(outcome);
                loaded.push(LoadedYear { year, footprints });
            }
            Err(e) => {
                log::warn!("Error processing {year}: {e}");
                yearly_results.push(YearlyOutcome::failed(year, e.to_string()));
            }
        }
    }

    let summary = summarize(&yearly_results, payout)?;
    log::info!(
        "{} of {} years triggered; conservative rate {:.4}",
        summary.triggered_years,
        summary.total_years,
        summary.bayesian.conservative_estimate
    );

    let buffer_zone_results =
        summarize_buffer_zones(&yearly_results, &distances, &config.bootstrap, payout, rng)?;

    let regional_comparison = regional::compare(&config.benchmarks, &loaded, &distances, payout);

    let spatial_ring = config.spatial_ring();
    let spatial = buffer_zone_results
        .get(&spatial_ring)
        .map(|zone| zone.annual_probability)
        .ok_or_else(|| AnalysisError::InvalidConfig {
            message: format!("spatial ring {spatial_ring} was not analyzed"),
        })?;

    let combined_estimate = combine(
        ComponentEstimates {
            spatial,
            regional: regional_comparison.aggregate_estimate.weighted_probability,
            original: summary.bayesian.conservative_estimate,
        },
        &config.weights,
        payout,
    );

    Ok(HailAnalysis {
        target: config.target.clone(),
        payout_per_trigger: payout,
        yearly_results,
        summary,
        enhanced_analysis: EnhancedAnalysis {
            buffer_zone_results,
            regional_comparison,
            combined_estimate,
        },
    })
}

fn process_year(
    year: i32,
    footprints: &FootprintCollection,
    config: &AnalysisConfig,
    distances: &[BufferDistance],
) -> YearlyOutcome {
    let target = config.target.location;
    let index = FootprintIndex::new(footprints);

    let hit_polygons = index.hits(target);
    let triggered = !hit_polygons.is_empty();

    YearlyOutcome {
        year,
        triggered,
        payout: if triggered {
            config.payout_per_trigger
        } else {
            0.0
        },
        polygon_count: footprints.len(),
        error: None,
        hit_polygons,
        buffer_analysis: Some(analyze_buffers(target, footprints, distances)),
    }
}

fn summarize(outcomes: &[YearlyOutcome], payout: f64) -> Result<AnalysisSummary, AnalysisError> {
    let total_years = u32::try_from(outcomes.len()).unwrap_or(u32::MAX);
    let triggered_years_list: Vec<i32> = outcomes
        .iter()
        .filter(|o| o.triggered)
        .map(|o| o.year)
        .collect();
    let triggered_years = u32::try_from(triggered_years_list.len()).unwrap_or(u32::MAX);

    if total_years == 0 {
        return Err(AnalysisError::InvalidConfig {
            message: "the observation window is empty".to_string(),
        });
    }

    let bayesian = BetaBinomialModel::new(triggered_years, total_years)?.estimate(payout);

    Ok(AnalysisSummary {
        total_years,
        triggered_years,
        trigger_probability: f64::from(triggered_years) / f64::from(total_years),
        bayesian,
        triggered_years_list,
    })
}

/// Target buffer ring statistics across every window year. Years that
/// failed to load contribute zero events.
fn summarize_buffer_zones<R: Rng + ?Sized>(
    outcomes: &[YearlyOutcome],
    distances: &[BufferDistance],
    settings: &BootstrapSettings,
    payout: f64,
    rng: &mut R,
) -> Result<BTreeMap<BufferDistance, BufferZoneSummary>, AnalysisError> {
    let years = f64::from(u32::try_from(outcomes.len()).unwrap_or(u32::MAX));

    distances
        .iter()
        .map(|&distance| {
            let events: Vec<u32> = outcomes
                .iter()
                .map(|outcome| {
                    outcome
                        .buffer_analysis
                        .as_ref()
                        .and_then(|rings| rings.get(&distance))
                        .map_or(0, |ring| ring.event_count)
                })
                .collect();
            let total_events: u32 = events.iter().sum();
            let annual_probability = f64::from(total_events) / (years * distance.area_km2());

            let confidence_interval = bootstrap::confidence_interval(
                &events,
                settings.confidence,
                settings.iterations,
                rng,
            )?;
            log::debug!(
                "{distance}: {total_events} events, annual probability {annual_probability:.4}"
            );

            Ok((
                distance,
                BufferZoneSummary {
                    total_events,
                    annual_probability,
                    expected_payout: annual_probability * payout,
                    confidence_interval,
                },
            ))
        })
        .collect()
}
