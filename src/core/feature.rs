//! Feature-Datenmodell: Geometrien, Attribute und IDs.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::geometry::{Aabb, Coordinate};

/// Eindeutige Feature-ID innerhalb eines Layers.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct FeatureId(pub u64);

/// Nicht-Geometrie-Attributwert eines Features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    Text(String),
    Integer(i64),
    Real(f64),
    Boolean(bool),
}

/// Geometrie eines Features: offene Linie oder Polygon mit Löchern.
///
/// Ringe werden OHNE dupliziertem Schlusspunkt gespeichert; das
/// Schlusssegment ist implizit und wird von `segments()` mitgeliefert.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureGeometry {
    /// Offener Linienzug, mindestens 2 Punkte.
    Line(Vec<Coordinate>),
    /// Polygon mit Außenring und optionalen Loch-Ringen, je mindestens 3 Punkte.
    Polygon {
        exterior: Vec<Coordinate>,
        holes: Vec<Vec<Coordinate>>,
    },
}

impl FeatureGeometry {
    /// Bounding-Box über alle Vertices; `None` bei leerer Geometrie.
    pub fn bounding_box(&self) -> Option<Aabb> {
        Aabb::from_points(&self.vertices())
    }

    /// Alle Vertices (Außenring zuerst, dann Löcher).
    pub fn vertices(&self) -> Vec<Coordinate> {
        match self {
            FeatureGeometry::Line(points) => points.clone(),
            FeatureGeometry::Polygon { exterior, holes } => {
                let mut all = exterior.clone();
                for hole in holes {
                    all.extend_from_slice(hole);
                }
                all
            }
        }
    }

    /// Alle Segmente, bei Ringen inklusive implizitem Schlusssegment.
    pub fn segments(&self) -> Vec<(Coordinate, Coordinate)> {
        match self {
            FeatureGeometry::Line(points) => open_segments(points),
            FeatureGeometry::Polygon { exterior, holes } => {
                let mut segments = ring_segments(exterior);
                for hole in holes {
                    segments.extend(ring_segments(hole));
                }
                segments
            }
        }
    }

    /// Boundary-Ringe eines Polygons (Außenring zuerst); leer für Linien.
    pub fn boundary_rings(&self) -> Vec<&[Coordinate]> {
        match self {
            FeatureGeometry::Line(_) => Vec::new(),
            FeatureGeometry::Polygon { exterior, holes } => {
                let mut rings: Vec<&[Coordinate]> = vec![exterior.as_slice()];
                rings.extend(holes.iter().map(|h| h.as_slice()));
                rings
            }
        }
    }
}

/// Segmente eines offenen Linienzugs (ohne Schlusssegment).
pub fn open_segments(points: &[Coordinate]) -> Vec<(Coordinate, Coordinate)> {
    points.windows(2).map(|w| (w[0], w[1])).collect()
}

/// Segmente eines Rings inklusive Schlusssegment `letzter → erster`.
pub fn ring_segments(ring: &[Coordinate]) -> Vec<(Coordinate, Coordinate)> {
    if ring.len() < 2 {
        return Vec::new();
    }
    let mut segments = open_segments(ring);
    // Schlusssegment nur wenn der Ring nicht schon explizit geschlossen ist
    if ring[ring.len() - 1] != ring[0] {
        segments.push((ring[ring.len() - 1], ring[0]));
    }
    segments
}

/// Vektor-Feature: Geometrie plus beliebige Nicht-Geometrie-Attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: FeatureId,
    pub geometry: FeatureGeometry,
    /// Attribut-Map in stabiler Einfüge-Reihenfolge (Schema-Ordnung).
    pub attributes: IndexMap<String, AttributeValue>,
}

impl Feature {
    /// Erstellt ein Feature ohne Attribute.
    pub fn new(id: FeatureId, geometry: FeatureGeometry) -> Self {
        Self {
            id,
            geometry,
            attributes: IndexMap::new(),
        }
    }

    /// Builder-Variante: Attribut anhängen.
    pub fn with_attribute(mut self, key: &str, value: AttributeValue) -> Self {
        self.attributes.insert(key.to_string(), value);
        self
    }
}
