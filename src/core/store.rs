//! Feature-Store: Kandidaten-Geometrie-Quelle mit BBox-Abfrage und Revisionszähler.

use std::collections::HashMap;

use indexmap::IndexMap;

use super::feature::{Feature, FeatureId};
use super::geometry::Aabb;
use super::spatial::VertexIndex;
use crate::error::EditError;

/// Quelle für Kandidaten-Geometrien (Snap-Suche, Referenzsegment-Auswahl).
///
/// Der Host kann einen eigenen (ggf. I/O-behafteten) Store anbinden;
/// `FeatureStore` ist die In-Memory-Referenzimplementierung.
pub trait FeatureSource {
    /// Alle Features, deren Bounding-Box das Fenster schneidet (Grobfilter).
    /// Exakte Distanzen berechnet der Aufrufer.
    fn query_bbox(&self, window: &Aabb) -> Result<Vec<&Feature>, EditError>;

    /// Monoton wachsender Mutationszähler. Jede Geometrie-Änderung erhöht ihn;
    /// Caches (Snap-Memo) dürfen Ergebnisse nur bei gleicher Revision wiederverwenden.
    fn revision(&self) -> u64;
}

/// In-Memory-Feature-Store mit persistentem Vertex-Index.
#[derive(Debug, Clone)]
pub struct FeatureStore {
    features: IndexMap<FeatureId, Feature>,
    bboxes: HashMap<FeatureId, Aabb>,
    vertex_index: VertexIndex,
    revision: u64,
    next_id: u64,
}

impl Default for FeatureStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureStore {
    /// Erstellt einen leeren Store.
    pub fn new() -> Self {
        Self {
            features: IndexMap::new(),
            bboxes: HashMap::new(),
            vertex_index: VertexIndex::empty(),
            revision: 0,
            next_id: 1,
        }
    }

    /// Vergibt die nächste freie Feature-ID.
    pub fn allocate_id(&mut self) -> FeatureId {
        let id = FeatureId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Fügt ein Feature ein (ersetzt ein vorhandenes mit gleicher ID).
    pub fn insert(&mut self, feature: Feature) {
        if feature.id.0 >= self.next_id {
            self.next_id = feature.id.0 + 1;
        }
        if let Some(bbox) = feature.geometry.bounding_box() {
            self.bboxes.insert(feature.id, bbox);
        } else {
            self.bboxes.remove(&feature.id);
        }
        self.features.insert(feature.id, feature);
        self.touch();
    }

    /// Entfernt ein Feature.
    pub fn remove(&mut self, id: FeatureId) -> Option<Feature> {
        let removed = self.features.shift_remove(&id);
        if removed.is_some() {
            self.bboxes.remove(&id);
            self.touch();
        }
        removed
    }

    /// Gibt ein Feature per ID zurück.
    pub fn get(&self, id: FeatureId) -> Option<&Feature> {
        self.features.get(&id)
    }

    /// Iterator über alle Features in Einfüge-Reihenfolge.
    pub fn features(&self) -> impl Iterator<Item = &Feature> {
        self.features.values()
    }

    /// Anzahl der Features im Store.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Gibt `true` zurück, wenn der Store leer ist.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Persistenter Vertex-Index (Snap-Fast-Path).
    pub fn vertex_index(&self) -> &VertexIndex {
        &self.vertex_index
    }

    /// Wendet ein Split-Ergebnis an: Originale raus, Teile rein.
    pub fn apply_split(&mut self, result: &crate::split::SplitResult) {
        for original in &result.split_features {
            self.features.shift_remove(&original.id);
            self.bboxes.remove(&original.id);
        }
        for part in &result.new_features {
            if part.id.0 >= self.next_id {
                self.next_id = part.id.0 + 1;
            }
            if let Some(bbox) = part.geometry.bounding_box() {
                self.bboxes.insert(part.id, bbox);
            }
            self.features.insert(part.id, part.clone());
        }
        self.touch();
        log::info!(
            "Split angewendet: {} Originale ersetzt durch {} Teile",
            result.split_features.len(),
            result.new_features.len()
        );
    }

    /// Revision erhöhen und Index neu aufbauen (nach jeder Mutation).
    fn touch(&mut self) {
        self.revision += 1;
        self.vertex_index = VertexIndex::from_features(self.features.values());
        log::debug!(
            "FeatureStore mutiert: revision={}, features={}",
            self.revision,
            self.features.len()
        );
    }
}

impl FeatureSource for FeatureStore {
    fn query_bbox(&self, window: &Aabb) -> Result<Vec<&Feature>, EditError> {
        Ok(self
            .features
            .values()
            .filter(|f| {
                self.bboxes
                    .get(&f.id)
                    .map(|bbox| bbox.intersects(window))
                    .unwrap_or(false)
            })
            .collect())
    }

    fn revision(&self) -> u64 {
        self.revision
    }
}
