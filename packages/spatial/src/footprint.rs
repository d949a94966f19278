//! Hail footprint geometry for a single year.
//!
//! Footprints are converted from `GeoJSON` at the boundary into an explicit
//! `Polygon`/`MultiPolygon` union over raw rings. Rings are kept exactly as
//! they appear in the source (no implicit closing or winding fixes) because
//! vertex-mean centroids depend on the literal vertex list.

use geo::{Coord, LineString};
use geojson::{GeoJson, PolygonType, Value};

use crate::FootprintError;

/// Rings of one polygon: the outer ring followed by optional holes.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonRings {
    pub exterior: LineString<f64>,
    /// Interior rings. Carried through but never used for containment.
    pub holes: Vec<LineString<f64>>,
}

impl PolygonRings {
    #[must_use]
    pub const fn new(exterior: LineString<f64>) -> Self {
        Self {
            exterior,
            holes: vec![],
        }
    }
}

/// A footprint's geometry.
#[derive(Debug, Clone, PartialEq)]
pub enum FootprintGeometry {
    Polygon(PolygonRings),
    MultiPolygon(Vec<PolygonRings>),
}

impl FootprintGeometry {
    /// The rings tested for containment: the outer ring of a `Polygon`, or
    /// the outer ring of every `MultiPolygon` member.
    pub fn outer_rings(&self) -> impl Iterator<Item = &LineString<f64>> {
        let polygons: &[PolygonRings] = match self {
            Self::Polygon(polygon) => std::slice::from_ref(polygon),
            Self::MultiPolygon(polygons) => polygons,
        };
        polygons.iter().map(|p| &p.exterior)
    }

    /// The ring whose vertex mean locates the footprint: the outer ring of a
    /// `Polygon`, or the outer ring of a `MultiPolygon`'s first member.
    #[must_use]
    pub fn representative_ring(&self) -> Option<&LineString<f64>> {
        match self {
            Self::Polygon(polygon) => Some(&polygon.exterior),
            Self::MultiPolygon(polygons) => polygons.first().map(|p| &p.exterior),
        }
    }
}

/// One feature of a yearly collection.
///
/// `geometry` is `None` when the feature had no geometry, a non-polygonal
/// geometry, or malformed coordinates. Such features still count towards
/// the year's polygon count.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Footprint {
    pub geometry: Option<FootprintGeometry>,
}

impl Footprint {
    #[must_use]
    pub const fn new(geometry: FootprintGeometry) -> Self {
        Self {
            geometry: Some(geometry),
        }
    }
}

/// All hail footprints recorded for one year, in source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FootprintCollection {
    pub features: Vec<Footprint>,
}

impl FootprintCollection {
    #[must_use]
    pub const fn new(features: Vec<Footprint>) -> Self {
        Self { features }
    }

    /// Parses a `GeoJSON` `FeatureCollection`.
    ///
    /// # Errors
    ///
    /// Returns [`FootprintError`] if the document is not valid `GeoJSON` or
    /// its root is not a `FeatureCollection`. Individual features with
    /// missing or malformed geometry are kept without a geometry.
    pub fn from_geojson_str(geojson_str: &str) -> Result<Self, FootprintError> {
        let geojson: GeoJson = geojson_str.parse()?;

        let GeoJson::FeatureCollection(collection) = geojson else {
            return Err(FootprintError::Conversion {
                message: "Expected a GeoJSON FeatureCollection".to_string(),
            });
        };

        let features = collection
            .features
            .iter()
            .enumerate()
            .map(|(index, feature)| {
                let geometry = feature
                    .geometry
                    .as_ref()
                    .and_then(|geometry| convert_geometry(&geometry.value));
                if geometry.is_none() {
                    log::debug!("Feature {index} has no usable polygon geometry");
                }
                Footprint { geometry }
            })
            .collect();

        Ok(Self { features })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Usable geometries with their feature index.
    pub fn geometries(&self) -> impl Iterator<Item = (usize, &FootprintGeometry)> {
        self.features
            .iter()
            .enumerate()
            .filter_map(|(i, f)| f.geometry.as_ref().map(|g| (i, g)))
    }
}

/// Converts a `GeoJSON` geometry value into a footprint geometry.
/// Handles both `Polygon` and `MultiPolygon` geometry types.
fn convert_geometry(value: &Value) -> Option<FootprintGeometry> {
    match value {
        Value::Polygon(rings) => convert_polygon(rings).map(FootprintGeometry::Polygon),
        Value::MultiPolygon(polygons) => polygons
            .iter()
            .map(convert_polygon)
            .collect::<Option<Vec<_>>>()
            .map(FootprintGeometry::MultiPolygon),
        _ => None,
    }
}

fn convert_polygon(rings: &PolygonType) -> Option<PolygonRings> {
    let mut rings = rings.iter().map(|ring| {
        ring.iter()
            .map(|position| match position.as_slice() {
                [x, y, ..] => Some(Coord { x: *x, y: *y }),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()
            .map(LineString::new)
    });

    let exterior = rings.next()??;
    let holes = rings.collect::<Option<Vec<_>>>()?;

    Some(PolygonRings { exterior, holes })
}
