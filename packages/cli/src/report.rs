//! Plain-text rendering of an analysis result.

use std::fmt;

use hail_trigger_models::{HailAnalysis, Ratio};

/// Writes the yearly table, the basic Bayesian summary, and the enhanced
/// spatial, regional and combined sections.
///
/// # Errors
///
/// Returns [`fmt::Error`] if writing to `out` fails.
pub fn render<W: fmt::Write>(out: &mut W, analysis: &HailAnalysis) -> fmt::Result {
    let summary = &analysis.summary;
    let enhanced = &analysis.enhanced_analysis;

    writeln!(
        out,
        "Hail trigger analysis for {} {}",
        analysis.target.name, analysis.target.location
    )?;
    writeln!(out)?;

    writeln!(out, "Year  Trigger  Polygons  Hits  Payout")?;
    for outcome in &analysis.yearly_results {
        if let Some(error) = &outcome.error {
            writeln!(out, "{}  ERROR    {error}", outcome.year)?;
            continue;
        }
        writeln!(
            out,
            "{}  {:<7}  {:>8}  {:>4}  ${:.0}",
            outcome.year,
            if outcome.triggered { "YES" } else { "no" },
            outcome.polygon_count,
            outcome.hit_polygons.len(),
            outcome.payout
        )?;
    }
    writeln!(out)?;

    let triggered_in = if summary.triggered_years_list.is_empty() {
        "none".to_string()
    } else {
        summary
            .triggered_years_list
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    };

    writeln!(out, "Basic analysis")?;
    writeln!(out, "  Total years:        {}", summary.total_years)?;
    writeln!(out, "  Triggered years:    {}", summary.triggered_years)?;
    writeln!(
        out,
        "  Trigger rate:       {:.1}%",
        summary.trigger_probability * 100.0
    )?;
    writeln!(out, "  Triggered in:       {triggered_in}")?;
    writeln!(
        out,
        "  Bayesian estimate:  {:.1}%",
        summary.bayesian.bayesian_mean * 100.0
    )?;
    writeln!(
        out,
        "  Conservative rate:  {:.1}%",
        summary.bayesian.conservative_estimate * 100.0
    )?;
    writeln!(
        out,
        "  Expected payout:    ${:.0}",
        summary.bayesian.expected_payout
    )?;
    writeln!(out)?;

    writeln!(out, "Buffer zones")?;
    for (distance, zone) in &enhanced.buffer_zone_results {
        writeln!(
            out,
            "  {:>6}  events {:>3}  rate {:.2}%  CI [{:.2}, {:.2}]  payout ${:.0}",
            distance.to_string(),
            zone.total_events,
            zone.annual_probability * 100.0,
            zone.confidence_interval.low,
            zone.confidence_interval.high,
            zone.expected_payout
        )?;
    }
    writeln!(out)?;

    let regional = &enhanced.regional_comparison;
    writeln!(out, "Regional benchmarks")?;
    for location in &regional.locations {
        writeln!(
            out,
            "  {:<22} rate {} | confidence {:.2}",
            location.name,
            percent(location.annual_trigger_rate, 1),
            location.confidence
        )?;
    }
    let aggregate = &regional.aggregate_estimate;
    writeln!(
        out,
        "  Weighted probability:  {}",
        percent(aggregate.weighted_probability, 2)
    )?;
    writeln!(
        out,
        "  Expected payout:       {}",
        dollars(aggregate.expected_payout)
    )?;
    writeln!(
        out,
        "  Effective sample size: {:.1}",
        aggregate.effective_sample_size
    )?;
    writeln!(out)?;

    let combined = &enhanced.combined_estimate;
    writeln!(out, "Combined estimate ({})", combined.methodology)?;
    writeln!(out, "  Probability:     {}", percent(combined.probability, 2))?;
    writeln!(out, "  Expected payout: {}", dollars(combined.expected_payout))?;
    match combined.improvement_vs_basic {
        Ratio::Defined(change) => writeln!(out, "  Improvement:     {change:.1}%")?,
        Ratio::Undefined => writeln!(out, "  Improvement:     undefined")?,
    }

    Ok(())
}

fn percent(ratio: Ratio, precision: usize) -> String {
    match ratio {
        Ratio::Defined(value) => format!("{:.precision$}%", value * 100.0),
        Ratio::Undefined => "undefined".to_string(),
    }
}

fn dollars(ratio: Ratio) -> String {
    match ratio {
        Ratio::Defined(value) => format!("${value:.0}"),
        Ratio::Undefined => "undefined".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use hail_trigger_models::{
        AnalysisSummary, BayesianEstimate, BufferDistance, BufferZoneSummary, CombinedEstimate,
        ConfidenceInterval, EnhancedAnalysis, Location, NamedLocation, RegionalAggregate,
        RegionalComparison, YearlyOutcome,
    };

    use super::*;

    fn sample(improvement: Ratio) -> HailAnalysis {
        let mut zones = BTreeMap::new();
        zones.insert(
            BufferDistance::from_meters(2000),
            BufferZoneSummary {
                total_events: 3,
                annual_probability: 0.0239,
                expected_payout: 239.0,
                confidence_interval: ConfidenceInterval {
                    low: 0.0,
                    high: 0.6,
                },
            },
        );

        HailAnalysis {
            target: NamedLocation {
                name: "Pecan Lodge".to_string(),
                location: Location::new(-96.7824, 32.7969),
            },
            payout_per_trigger: 10_000.0,
            yearly_results: vec![
                YearlyOutcome {
                    year: 2011,
                    triggered: true,
                    payout: 10_000.0,
                    polygon_count: 12,
                    error: None,
                    hit_polygons: vec![4],
                    buffer_analysis: None,
                },
                YearlyOutcome::failed(2012, "Failed to load hail_2012.geojson"),
            ],
            summary: AnalysisSummary {
                total_years: 2,
                triggered_years: 1,
                trigger_probability: 0.5,
                bayesian: BayesianEstimate {
                    alpha: 1.5,
                    beta: 1.5,
                    bayesian_mean: 0.5,
                    conservative_estimate: 0.475,
                    expected_payout: 4750.0,
                },
                triggered_years_list: vec![2011],
            },
            enhanced_analysis: EnhancedAnalysis {
                buffer_zone_results: zones,
                regional_comparison: RegionalComparison {
                    locations: vec![],
                    aggregate_estimate: RegionalAggregate {
                        weighted_probability: Ratio::Defined(0.1),
                        expected_payout: Ratio::Defined(1000.0),
                        effective_sample_size: Ratio::Defined(3.2),
                    },
                },
                combined_estimate: CombinedEstimate {
                    probability: Ratio::Defined(0.1451),
                    expected_payout: Ratio::Defined(1451.0),
                    methodology: "Spatial Expansion + Regional Benchmarking + Bayesian"
                        .to_string(),
                    improvement_vs_basic: improvement,
                },
            },
        }
    }

    fn rendered(analysis: &HailAnalysis) -> String {
        let mut text = String::new();
        render(&mut text, analysis).unwrap();
        text
    }

    #[test]
    fn renders_all_sections() {
        let text = rendered(&sample(Ratio::Defined(-12.34)));
        assert!(text.contains("Pecan Lodge"));
        assert!(text.contains("2011  YES"));
        assert!(text.contains("2012  ERROR    Failed to load hail_2012.geojson"));
        assert!(text.contains("Trigger rate:       50.0%"));
        assert!(text.contains("Expected payout:    $4750"));
        assert!(text.contains("2000m"));
        assert!(text.contains("Effective sample size: 3.2"));
        assert!(text.contains("Weighted probability:  10.00%"));
        assert!(text.contains("Probability:     14.51%"));
        assert!(text.contains("Improvement:     -12.3%"));
    }

    #[test]
    fn undefined_improvement() {
        let text = rendered(&sample(Ratio::Undefined));
        assert!(text.contains("Improvement:     undefined"));
    }

    #[test]
    fn undefined_regional_estimates() {
        let mut analysis = sample(Ratio::Undefined);
        let enhanced = &mut analysis.enhanced_analysis;
        enhanced.regional_comparison.aggregate_estimate = RegionalAggregate {
            weighted_probability: Ratio::Undefined,
            expected_payout: Ratio::Undefined,
            effective_sample_size: Ratio::Undefined,
        };
        enhanced.combined_estimate.probability = Ratio::Undefined;
        enhanced.combined_estimate.expected_payout = Ratio::Undefined;

        let text = rendered(&analysis);
        assert!(text.contains("Weighted probability:  undefined"));
        assert!(text.contains("Effective sample size: undefined"));
        assert!(text.contains("Probability:     undefined"));
        assert!(text.contains("Expected payout: undefined"));
    }
}
