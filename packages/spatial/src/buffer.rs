//! Buffer ring density analysis.
//!
//! Counts footprints whose representative centroid falls within each ring
//! radius of a location. Each counted footprint contributes an
//! inverse-distance weight of `1 / (distance + 100)`; the ring's weighted
//! probability is the weighted event sum over the total weight, which is 1.0
//! whenever the ring holds any event and 0 otherwise.

use std::collections::BTreeMap;

use hail_trigger_models::{BufferDistance, BufferResult, Location};

use crate::footprint::FootprintCollection;
use crate::kernel::{coord, haversine_distance_meters, ring_centroid};

/// Offset added to every distance before inverting it, in meters.
pub const DISTANCE_WEIGHT_OFFSET_METERS: f64 = 100.0;

/// Runs the buffer analysis for every ring distance.
#[must_use]
pub fn analyze_buffers(
    location: Location,
    collection: &FootprintCollection,
    distances: &[BufferDistance],
) -> BTreeMap<BufferDistance, BufferResult> {
    let origin = coord(location);

    let centroid_distances: Vec<f64> = collection
        .geometries()
        .filter_map(|(_, geometry)| geometry.representative_ring())
        .filter_map(ring_centroid)
        .map(|centroid| haversine_distance_meters(origin, centroid))
        .collect();

    distances
        .iter()
        .map(|&distance| {
            let result = ring_result(distance, &centroid_distances);
            log::trace!(
                "{distance} ring: {} events, density {:.4}/km²",
                result.event_count,
                result.density
            );
            (distance, result)
        })
        .collect()
}

fn ring_result(distance: BufferDistance, centroid_distances: &[f64]) -> BufferResult {
    let radius = f64::from(distance.meters());

    let mut event_count = 0_u32;
    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;

    for &d in centroid_distances.iter().filter(|&&d| d <= radius) {
        event_count += 1;

        let weight = 1.0 / (d + DISTANCE_WEIGHT_OFFSET_METERS);
        weighted_sum += weight;
        total_weight += weight;
    }

    let weighted_probability = if total_weight > 0.0 {
        weighted_sum / total_weight
    } else {
        0.0
    };

    BufferResult {
        event_count,
        density: f64::from(event_count) / distance.area_km2(),
        weighted_probability,
    }
}
