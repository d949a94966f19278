//! R-tree over one year's footprint rings.
//!
//! The analysis asks the same collection about the target and every
//! benchmark location, so outer ring envelopes are bulk-loaded once and each
//! query only ray-casts the rings whose envelope covers the point. A point
//! outside a ring's envelope can never be inside the ring, so results match
//! [`crate::kernel::contains_location`] exactly.

use geo::{BoundingRect, LineString};
use hail_trigger_models::Location;
use rstar::{AABB, RTree, RTreeObject};

use crate::footprint::FootprintCollection;
use crate::kernel::{coord, point_in_ring};

/// An outer ring stored in the R-tree with the index of its feature.
struct RingEntry<'a> {
    feature: usize,
    envelope: AABB<[f64; 2]>,
    ring: &'a LineString<f64>,
}

impl RTreeObject for RingEntry<'_> {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Spatial index over the outer rings of a [`FootprintCollection`].
pub struct FootprintIndex<'a> {
    rings: RTree<RingEntry<'a>>,
}

impl<'a> FootprintIndex<'a> {
    /// Builds the index. Rings with fewer than three vertices are left out
    /// since they can never contain a point.
    #[must_use]
    pub fn new(collection: &'a FootprintCollection) -> Self {
        let entries: Vec<RingEntry<'a>> = collection
            .geometries()
            .flat_map(|(feature, geometry)| {
                geometry
                    .outer_rings()
                    .filter(|ring| ring.0.len() >= 3)
                    .filter_map(move |ring| {
                        ring.bounding_rect().map(|rect| RingEntry {
                            feature,
                            envelope: AABB::from_corners(
                                [rect.min().x, rect.min().y],
                                [rect.max().x, rect.max().y],
                            ),
                            ring,
                        })
                    })
            })
            .collect();

        Self {
            rings: RTree::bulk_load(entries),
        }
    }

    /// Number of indexed rings.
    #[must_use]
    pub fn size(&self) -> usize {
        self.rings.size()
    }

    /// Indices of the features containing the location, ascending and
    /// without duplicates.
    #[must_use]
    pub fn hits(&self, location: Location) -> Vec<usize> {
        let point = coord(location);
        let query_env = AABB::from_point([point.x, point.y]);

        let mut hits: Vec<usize> = self
            .rings
            .locate_in_envelope_intersecting(&query_env)
            .filter(|entry| point_in_ring(point, entry.ring))
            .map(|entry| entry.feature)
            .collect();
        hits.sort_unstable();
        hits.dedup();
        hits
    }

    /// Whether any feature contains the location.
    #[must_use]
    pub fn contains(&self, location: Location) -> bool {
        let point = coord(location);
        let query_env = AABB::from_point([point.x, point.y]);

        self.rings
            .locate_in_envelope_intersecting(&query_env)
            .any(|entry| point_in_ring(point, entry.ring))
    }
}
