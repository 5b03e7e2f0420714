//! Spatial-Index (KD-Tree) für schnelle Vertex-Abfragen über alle Features.

use kiddo::{KdTree, SquaredEuclidean};

use super::feature::{Feature, FeatureId};
use super::geometry::Coordinate;

/// Ergebnis einer Distanzabfrage gegen den Spatial-Index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexMatch {
    /// Feature, zu dem der Vertex gehört
    pub feature_id: FeatureId,
    /// Index des Vertex innerhalb der Feature-Geometrie
    pub vertex_index: usize,
    /// Welt-Position des Vertex
    pub position: Coordinate,
    /// Euklidische Distanz zum Suchpunkt
    pub distance: f64,
}

/// Read-only Spatial-Index über allen Vertices eines Feature-Bestands.
#[derive(Debug, Clone)]
pub struct VertexIndex {
    tree: KdTree<f64, 2>,
    entries: Vec<(FeatureId, usize, Coordinate)>,
}

impl VertexIndex {
    /// Erstellt einen leeren Spatial-Index.
    pub fn empty() -> Self {
        Self {
            tree: (&Vec::<[f64; 2]>::new()).into(),
            entries: Vec::new(),
        }
    }

    /// Baut einen neuen Index aus den übergebenen Features.
    pub fn from_features<'a>(features: impl Iterator<Item = &'a Feature>) -> Self {
        let mut entries = Vec::new();
        for feature in features {
            for (vertex_index, position) in feature.geometry.vertices().into_iter().enumerate() {
                entries.push((feature.id, vertex_index, position));
            }
        }

        let points: Vec<[f64; 2]> = entries.iter().map(|(_, _, p)| [p.x, p.y]).collect();
        let tree: KdTree<f64, 2> = (&points).into();

        Self { tree, entries }
    }

    /// Gibt die Anzahl indexierter Vertices zurück.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Gibt `true` zurück, wenn keine Vertices im Index liegen.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Findet den nächsten Vertex zur gegebenen Weltposition.
    pub fn nearest(&self, query: Coordinate) -> Option<VertexMatch> {
        if self.is_empty() {
            return None;
        }

        let result = self.tree.nearest_one::<SquaredEuclidean>(&[query.x, query.y]);
        let (feature_id, vertex_index, position) = *self.entries.get(result.item as usize)?;

        Some(VertexMatch {
            feature_id,
            vertex_index,
            position,
            distance: result.distance.sqrt(),
        })
    }

    /// Findet alle Vertices innerhalb eines Radius, sortiert nach Distanz.
    pub fn within_radius(&self, query: Coordinate, radius: f64) -> Vec<VertexMatch> {
        if self.is_empty() || radius.is_sign_negative() {
            return Vec::new();
        }

        let mut results = self
            .tree
            .within::<SquaredEuclidean>(&[query.x, query.y], radius * radius)
            .into_iter()
            .filter_map(|entry| {
                let (feature_id, vertex_index, position) = *self.entries.get(entry.item as usize)?;
                Some(VertexMatch {
                    feature_id,
                    vertex_index,
                    position,
                    distance: entry.distance.sqrt(),
                })
            })
            .collect::<Vec<_>>();

        results.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::feature::FeatureGeometry;

    fn sample_features() -> Vec<Feature> {
        vec![
            Feature::new(
                FeatureId(1),
                FeatureGeometry::Line(vec![
                    Coordinate::new(0.0, 0.0),
                    Coordinate::new(10.0, 0.0),
                ]),
            ),
            Feature::new(
                FeatureId(2),
                FeatureGeometry::Line(vec![
                    Coordinate::new(4.0, 3.0),
                    Coordinate::new(4.0, 8.0),
                ]),
            ),
        ]
    }

    #[test]
    fn nearest_liefert_erwarteten_vertex() {
        let features = sample_features();
        let index = VertexIndex::from_features(features.iter());
        let nearest = index
            .nearest(Coordinate::new(3.9, 2.9))
            .expect("Treffer erwartet");

        assert_eq!(nearest.feature_id, FeatureId(2));
        assert_eq!(nearest.vertex_index, 0);
        assert!(nearest.distance < 0.2);
    }

    #[test]
    fn radius_abfrage_liefert_sortierte_treffer() {
        let features = sample_features();
        let index = VertexIndex::from_features(features.iter());
        let matches = index.within_radius(Coordinate::new(0.0, 0.0), 6.0);

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].feature_id, FeatureId(1));
        assert!(matches[0].distance <= matches[1].distance);
    }

    #[test]
    fn leerer_index_hat_keine_eintraege() {
        let index = VertexIndex::empty();

        assert!(index.is_empty());
        assert_eq!(index.len(), 0);
        assert!(index.nearest(Coordinate::new(0.0, 0.0)).is_none());
    }
}
