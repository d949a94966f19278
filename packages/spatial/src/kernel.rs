//! Geometry primitives used by every stage of the analysis.
//!
//! Containment is a plain ray-casting parity test against a polygon's outer
//! ring; holes are never subtracted. Centroids are the arithmetic mean of
//! the ring's vertices rather than an area-weighted centroid, so a closed
//! ring counts its repeated first vertex twice.

use geo::{Coord, LineString};
use hail_trigger_models::Location;

use crate::footprint::FootprintCollection;

/// Mean Earth radius used by the haversine distance.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Converts a [`Location`] into a `geo` coordinate (`x` = longitude).
#[must_use]
pub const fn coord(location: Location) -> Coord<f64> {
    Coord {
        x: location.longitude,
        y: location.latitude,
    }
}

/// Ray-casting point-in-polygon test.
///
/// The ring does not need to be explicitly closed: the edge from the last
/// vertex back to the first is always tested. Rings with fewer than three
/// vertices contain nothing.
#[must_use]
pub fn point_in_ring(point: Coord<f64>, ring: &LineString<f64>) -> bool {
    let coords = &ring.0;
    let Some(&last) = coords.last() else {
        return false;
    };
    if coords.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut previous = last;

    for &current in coords {
        if (current.y > point.y) != (previous.y > point.y) {
            let x_intersect = (previous.x - current.x) * (point.y - current.y)
                / (previous.y - current.y)
                + current.x;
            if point.x < x_intersect {
                inside = !inside;
            }
        }
        previous = current;
    }

    inside
}

/// Arithmetic mean of the ring's vertices. `None` for an empty ring.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn ring_centroid(ring: &LineString<f64>) -> Option<Coord<f64>> {
    if ring.0.is_empty() {
        return None;
    }

    let n = ring.0.len() as f64;
    let sum = ring
        .0
        .iter()
        .fold(Coord { x: 0.0, y: 0.0 }, |acc, c| Coord {
            x: acc.x + c.x,
            y: acc.y + c.y,
        });

    Some(Coord {
        x: sum.x / n,
        y: sum.y / n,
    })
}

/// Great-circle distance in meters between two lon/lat coordinates.
#[must_use]
pub fn haversine_distance_meters(a: Coord<f64>, b: Coord<f64>) -> f64 {
    let d_lat = (b.y - a.y).to_radians();
    let d_lng = (b.x - a.x).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.y.to_radians().cos() * b.y.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Whether any footprint in the collection contains the location.
///
/// `Polygon` footprints are tested against their outer ring; `MultiPolygon`
/// footprints against the outer ring of each member. Footprints without a
/// usable geometry are skipped.
#[must_use]
pub fn contains_location(location: Location, collection: &FootprintCollection) -> bool {
    let point = coord(location);

    collection
        .geometries()
        .any(|(_, geometry)| geometry.outer_rings().any(|ring| point_in_ring(point, ring)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(min: f64, max: f64) -> LineString<f64> {
        LineString::from(vec![(min, min), (max, min), (max, max), (min, max), (min, min)])
    }

    #[test]
    fn inside_convex_polygon() {
        let ring = square(0.0, 2.0);
        assert!(point_in_ring(Coord { x: 1.0, y: 1.0 }, &ring));
        assert!(point_in_ring(Coord { x: 0.1, y: 1.9 }, &ring));
    }

    #[test]
    fn outside_convex_polygon() {
        let ring = square(0.0, 2.0);
        assert!(!point_in_ring(Coord { x: 3.0, y: 1.0 }, &ring));
        assert!(!point_in_ring(Coord { x: -1.0, y: 1.0 }, &ring));
        assert!(!point_in_ring(Coord { x: 1.0, y: 5.0 }, &ring));
    }

    #[test]
    fn unclosed_ring_is_implicitly_closed() {
        let ring = LineString::from(vec![(0.0, 0.0), (4.0, 0.0), (0.0, 4.0)]);
        assert!(point_in_ring(Coord { x: 1.0, y: 1.0 }, &ring));
        assert!(!point_in_ring(Coord { x: 3.0, y: 3.0 }, &ring));
    }

    #[test]
    fn concave_polygon() {
        // U shape opening upwards.
        let ring = LineString::from(vec![
            (0.0, 0.0),
            (3.0, 0.0),
            (3.0, 3.0),
            (2.0, 3.0),
            (2.0, 1.0),
            (1.0, 1.0),
            (1.0, 3.0),
            (0.0, 3.0),
        ]);
        assert!(point_in_ring(Coord { x: 0.5, y: 2.0 }, &ring));
        assert!(!point_in_ring(Coord { x: 1.5, y: 2.0 }, &ring));
        assert!(point_in_ring(Coord { x: 1.5, y: 0.5 }, &ring));
    }

    #[test]
    fn degenerate_rings_contain_nothing() {
        let point = Coord { x: 0.0, y: 0.0 };
        assert!(!point_in_ring(point, &LineString::new(vec![])));
        assert!(!point_in_ring(point, &LineString::from(vec![(-1.0, -1.0)])));
        assert!(!point_in_ring(
            point,
            &LineString::from(vec![(-1.0, -1.0), (1.0, 1.0)])
        ));
    }

    #[test]
    fn centroid_is_vertex_mean() {
        // The closing vertex is counted again.
        let centroid = ring_centroid(&square(0.0, 2.0)).unwrap();
        assert!((centroid.x - 0.8).abs() < 1e-12);
        assert!((centroid.y - 0.8).abs() < 1e-12);

        let open = LineString::from(vec![(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)]);
        let centroid = ring_centroid(&open).unwrap();
        assert!((centroid.x - 1.0).abs() < 1e-12);
        assert!((centroid.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn centroid_of_empty_ring() {
        assert!(ring_centroid(&LineString::new(vec![])).is_none());
    }

    #[test]
    fn distance_to_self_is_zero() {
        for &(x, y) in &[(-96.7824, 32.7969), (0.0, 0.0), (179.9, -89.0)] {
            let p = Coord { x, y };
            assert!(haversine_distance_meters(p, p).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Coord {
            x: -96.7824,
            y: 32.7969,
        };
        let b = Coord {
            x: -96.8517,
            y: 32.8474,
        };
        let ab = haversine_distance_meters(a, b);
        let ba = haversine_distance_meters(b, a);
        assert!((ab - ba).abs() < 1e-9);
        assert!(ab > 8000.0 && ab < 9000.0, "unexpected distance {ab}");
    }

    #[test]
    fn one_degree_of_latitude() {
        let d = haversine_distance_meters(Coord { x: 0.0, y: 0.0 }, Coord { x: 0.0, y: 1.0 });
        let expected = EARTH_RADIUS_METERS * std::f64::consts::PI / 180.0;
        assert!((d - expected).abs() < 1e-6);
    }
}
