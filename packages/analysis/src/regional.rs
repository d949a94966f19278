//! Regional benchmarking.
//!
//! Ten years at a single point is a small sample, so nearby benchmark sites
//! are scored the same way and blended by a confidence proxy. Only years
//! whose data loaded contribute here; with none, every rate is undefined.

use std::collections::BTreeMap;

use hail_trigger_models::{
    BenchmarkLocationResult, BufferDistance, NamedLocation, Ratio, RegionalAggregate,
    RegionalComparison, RingTotals,
};
use hail_trigger_spatial::{FootprintIndex, analyze_buffers};

use crate::pipeline::LoadedYear;

/// Added to each location's confidence so zero-confidence sites keep some
/// weight in the blend.
pub const CONFIDENCE_FLOOR: f64 = 0.1;

/// Scale applied to the summed confidence to report an effective sample
/// size.
pub const EFFECTIVE_SAMPLE_SCALE: f64 = 10.0;

struct Tally {
    triggers: u32,
    ring_events: BTreeMap<BufferDistance, u32>,
}

/// Scores every benchmark against the loaded years and blends the results.
#[must_use]
pub fn compare(
    benchmarks: &[NamedLocation],
    years: &[LoadedYear],
    distances: &[BufferDistance],
    payout_per_trigger: f64,
) -> RegionalComparison {
    if years.is_empty() {
        log::warn!("No year has footprint data; regional rates are undefined");
    }
    let year_count = u32::try_from(years.len()).unwrap_or(u32::MAX);

    let mut tallies: Vec<Tally> = benchmarks
        .iter()
        .map(|_| Tally {
            triggers: 0,
            ring_events: distances.iter().map(|&distance| (distance, 0)).collect(),
        })
        .collect();

    for year in years {
        let index = FootprintIndex::new(&year.footprints);

        for (benchmark, tally) in benchmarks.iter().zip(&mut tallies) {
            if index.contains(benchmark.location) {
                log::debug!("{}: {} hit", year.year, benchmark.name);
                tally.triggers += 1;
            }

            for (distance, result) in
                analyze_buffers(benchmark.location, &year.footprints, distances)
            {
                *tally.ring_events.entry(distance).or_default() += result.event_count;
            }
        }
    }

    let locations: Vec<BenchmarkLocationResult> = benchmarks
        .iter()
        .zip(tallies)
        .map(|(benchmark, tally)| score(benchmark, tally, year_count))
        .collect();

    let aggregate_estimate = aggregate(&locations, payout_per_trigger);
    log::info!(
        "Regional aggregate over {} benchmarks: {:.4} (effective sample size {:.1})",
        locations.len(),
        aggregate_estimate.weighted_probability,
        aggregate_estimate.effective_sample_size
    );

    RegionalComparison {
        locations,
        aggregate_estimate,
    }
}

fn score(benchmark: &NamedLocation, tally: Tally, years: u32) -> BenchmarkLocationResult {
    let years_f = f64::from(years);
    let triggers = f64::from(tally.triggers);

    let buffer_results = tally
        .ring_events
        .into_iter()
        .map(|(distance, total_events)| {
            (
                distance,
                RingTotals {
                    total_events,
                    years,
                    annual_rate: Ratio::divide(f64::from(total_events), years_f),
                },
            )
        })
        .collect();

    BenchmarkLocationResult {
        name: benchmark.name.clone(),
        coords: benchmark.location,
        triggers: tally.triggers,
        years_with_data: years,
        annual_trigger_rate: Ratio::divide(triggers, years_f),
        confidence: Ratio::divide(triggers, years_f.sqrt()),
        buffer_results,
    }
}

/// Confidence-weighted mean of the benchmark trigger rates.
///
/// Every weight is at least [`CONFIDENCE_FLOOR`], so the result is a convex
/// combination of the individual rates. An undefined rate or confidence at
/// any location makes the whole aggregate undefined.
#[must_use]
pub fn aggregate(locations: &[BenchmarkLocationResult], payout_per_trigger: f64) -> RegionalAggregate {
    let scored: Option<Vec<(f64, f64)>> = locations
        .iter()
        .map(|location| {
            Some((
                location.annual_trigger_rate.value()?,
                location.confidence.value()?,
            ))
        })
        .collect();

    let Some(scored) = scored else {
        return RegionalAggregate {
            weighted_probability: Ratio::Undefined,
            expected_payout: Ratio::Undefined,
            effective_sample_size: Ratio::Undefined,
        };
    };

    let (weighted_sum, total_weight) =
        scored
            .iter()
            .fold((0.0, 0.0), |(sum, total), &(rate, confidence)| {
                let weight = confidence + CONFIDENCE_FLOOR;
                (sum + rate * weight, total + weight)
            });
    let weighted_probability = Ratio::divide(weighted_sum, total_weight);

    RegionalAggregate {
        weighted_probability,
        expected_payout: weighted_probability.map(|p| p * payout_per_trigger),
        effective_sample_size: Ratio::Defined(
            scored
                .iter()
                .map(|&(_, confidence)| confidence * EFFECTIVE_SAMPLE_SCALE)
                .sum(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use geo::LineString;
    use hail_trigger_models::Location;
    use hail_trigger_spatial::{Footprint, FootprintCollection, FootprintGeometry, PolygonRings};

    use super::*;

    fn square_around(location: Location, half: f64) -> Footprint {
        let (x, y) = (location.longitude, location.latitude);
        Footprint::new(FootprintGeometry::Polygon(PolygonRings::new(
            LineString::from(vec![
                (x - half, y - half),
                (x + half, y - half),
                (x + half, y + half),
                (x - half, y + half),
                (x - half, y - half),
            ]),
        )))
    }

    fn site(name: &str, longitude: f64, latitude: f64) -> NamedLocation {
        NamedLocation {
            name: name.to_string(),
            location: Location::new(longitude, latitude),
        }
    }

    fn rings() -> Vec<BufferDistance> {
        vec![
            BufferDistance::from_meters(1000),
            BufferDistance::from_meters(5000),
        ]
    }

    fn defined(ratio: Ratio) -> f64 {
        ratio.value().unwrap()
    }

    #[test]
    fn no_years_leaves_rates_undefined() {
        let comparison = compare(&[site("a", 0.0, 0.0)], &[], &rings(), 10_000.0);

        let [only] = comparison.locations.as_slice() else {
            panic!("expected one location");
        };
        assert_eq!(only.triggers, 0);
        assert_eq!(only.years_with_data, 0);
        assert_eq!(only.annual_trigger_rate, Ratio::Undefined);
        assert_eq!(only.confidence, Ratio::Undefined);
        let one_km = only.buffer_results[&BufferDistance::from_meters(1000)];
        assert_eq!(one_km.total_events, 0);
        assert_eq!(one_km.annual_rate, Ratio::Undefined);

        let aggregate = comparison.aggregate_estimate;
        assert_eq!(aggregate.weighted_probability, Ratio::Undefined);
        assert_eq!(aggregate.expected_payout, Ratio::Undefined);
        assert_eq!(aggregate.effective_sample_size, Ratio::Undefined);
    }

    #[test]
    fn scores_each_benchmark() {
        let a = site("a", -96.80, 32.78);
        let b = site("b", -96.50, 32.50);
        let years: Vec<LoadedYear> = (0..4)
            .map(|i| LoadedYear {
                year: 2011 + i,
                footprints: if i < 2 {
                    FootprintCollection::new(vec![square_around(a.location, 0.005)])
                } else {
                    FootprintCollection::default()
                },
            })
            .collect();

        let comparison = compare(&[a, b], &years, &rings(), 10_000.0);
        let [hit, miss] = comparison.locations.as_slice() else {
            panic!("expected two locations");
        };

        assert_eq!(hit.triggers, 2);
        assert_eq!(hit.years_with_data, 4);
        assert!((defined(hit.annual_trigger_rate) - 0.5).abs() < 1e-12);
        assert!((defined(hit.confidence) - 1.0).abs() < 1e-12);
        let one_km = hit.buffer_results[&BufferDistance::from_meters(1000)];
        assert_eq!(one_km.total_events, 2);
        assert_eq!(one_km.years, 4);
        assert!((defined(one_km.annual_rate) - 0.5).abs() < 1e-12);

        assert_eq!(miss.triggers, 0);
        assert!(defined(miss.annual_trigger_rate).abs() < f64::EPSILON);
        assert!(defined(miss.confidence).abs() < f64::EPSILON);
        assert_eq!(
            miss.buffer_results[&BufferDistance::from_meters(5000)].total_events,
            0
        );

        // (0.5 * 1.1 + 0 * 0.1) / 1.2
        let aggregate = comparison.aggregate_estimate;
        assert!((defined(aggregate.weighted_probability) - 0.55 / 1.2).abs() < 1e-12);
        assert!((defined(aggregate.expected_payout) - 0.55 / 1.2 * 10_000.0).abs() < 1e-9);
        assert!((defined(aggregate.effective_sample_size) - 10.0).abs() < 1e-12);
    }

    #[test]
    fn aggregate_is_a_convex_combination() {
        let rates = [0.0, 0.1, 0.3, 0.2, 0.6, 0.0];
        let locations: Vec<BenchmarkLocationResult> = rates
            .iter()
            .enumerate()
            .map(|(i, &rate)| BenchmarkLocationResult {
                name: format!("site {i}"),
                coords: Location::new(0.0, 0.0),
                triggers: 0,
                years_with_data: 10,
                annual_trigger_rate: Ratio::Defined(rate),
                confidence: Ratio::Defined(rate * 10.0 / 10_f64.sqrt()),
                buffer_results: BTreeMap::new(),
            })
            .collect();

        let weighted = defined(aggregate(&locations, 10_000.0).weighted_probability);
        let min = rates.iter().copied().fold(f64::INFINITY, f64::min);
        let max = rates.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        assert!(weighted >= min);
        assert!(weighted <= max);
    }

    #[test]
    fn zero_confidence_sites_still_count() {
        let locations: Vec<BenchmarkLocationResult> = [0.0, 0.0]
            .iter()
            .map(|&rate| BenchmarkLocationResult {
                name: String::new(),
                coords: Location::new(0.0, 0.0),
                triggers: 0,
                years_with_data: 10,
                annual_trigger_rate: Ratio::Defined(rate),
                confidence: Ratio::Defined(0.0),
                buffer_results: BTreeMap::new(),
            })
            .collect();

        let aggregate = aggregate(&locations, 10_000.0);
        assert!(defined(aggregate.weighted_probability).abs() < f64::EPSILON);
        assert!(defined(aggregate.effective_sample_size).abs() < f64::EPSILON);
    }

    #[test]
    fn one_undefined_site_makes_the_aggregate_undefined() {
        let location = |rate: Ratio| BenchmarkLocationResult {
            name: String::new(),
            coords: Location::new(0.0, 0.0),
            triggers: 0,
            years_with_data: 0,
            annual_trigger_rate: rate,
            confidence: rate,
            buffer_results: BTreeMap::new(),
        };

        let aggregate = aggregate(
            &[location(Ratio::Defined(0.2)), location(Ratio::Undefined)],
            10_000.0,
        );
        assert_eq!(aggregate.weighted_probability, Ratio::Undefined);
        assert_eq!(aggregate.expected_payout, Ratio::Undefined);
    }
}
