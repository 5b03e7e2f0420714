//! EditSession: Zustand einer laufenden Zeichenoperation.
//!
//! Die Session besitzt die Shape, den Constraint-Modus, die Referenzauswahl
//! und das Snap-Memo exklusiv. Der Host ruft pro Cursor-Event `preview_point`
//! und bei Klick `commit_vertex` auf; alles läuft auf dem UI-Thread.

use crate::core::{
    Aabb, Coordinate, CrsId, FeatureGeometry, FeatureId, FeatureSource, Reprojector,
};
use crate::error::EditError;
use crate::shared::EditorOptions;

use super::constraint::{orthogonal_point, parallel_point, ConstraintMode};
use super::reference::ReferenceSegmentSelector;
use super::shape::{EditableShape, ShapeKind};
use super::snap::{best_snap, SnapMemo, SnapOptions, SnapPolicy, EDITING_SHAPE_ID};

/// Laufende Zeichensession für eine Linie oder einen Ring.
#[derive(Debug, Clone)]
pub struct EditSession {
    shape: EditableShape,
    mode: ConstraintMode,
    selector: ReferenceSegmentSelector,
    memo: SnapMemo,
    options: SnapOptions,
}

impl EditSession {
    /// Startet eine neue Session mit den persistierten Editor-Optionen.
    pub fn new(kind: ShapeKind, options: &EditorOptions, layer_crs: CrsId, map_crs: CrsId) -> Self {
        Self {
            shape: EditableShape::new(kind),
            mode: ConstraintMode::default(),
            selector: ReferenceSegmentSelector::new(layer_crs, map_crs),
            memo: SnapMemo::new(),
            options: SnapOptions::from_editor(options, SnapPolicy::VertexAndEdge),
        }
    }

    pub fn shape(&self) -> &EditableShape {
        &self.shape
    }

    pub fn mode(&self) -> ConstraintMode {
        self.mode
    }

    pub fn selector(&self) -> &ReferenceSegmentSelector {
        &self.selector
    }

    pub fn options(&self) -> &SnapOptions {
        &self.options
    }

    /// Wechselt den Constraint-Modus. Ein Wechsel verwirft das
    /// Referenzsegment; es muss für Parallel neu selektiert werden.
    pub fn set_mode(&mut self, mode: ConstraintMode) {
        if mode != self.mode {
            log::debug!("Constraint-Modus: {:?} → {:?}", self.mode, mode);
            self.selector.clear();
            self.mode = mode;
        }
    }

    /// Übernimmt die Kante unter dem Cursor als Referenzsegment.
    pub fn select_reference_at<S: FeatureSource + ?Sized>(
        &mut self,
        cursor: Coordinate,
        source: &S,
        reprojector: &dyn Reprojector,
    ) -> Result<bool, EditError> {
        self.selector
            .select_at(cursor, self.options.radius, source, reprojector)
    }

    /// Korrigierter Vorschau-Punkt für die aktuelle Cursor-Position.
    ///
    /// Snap-Modi laufen über das Memo; Orthogonal und Parallel sind reine
    /// Geometrie ohne Feature-Abfrage.
    pub fn preview_point<S: FeatureSource + ?Sized>(
        &mut self,
        cursor: Coordinate,
        source: &S,
    ) -> Result<Coordinate, EditError> {
        match self.mode {
            ConstraintMode::Free => Ok(cursor),
            ConstraintMode::SnapVertex => self.snapped(cursor, SnapPolicy::Vertex, source),
            ConstraintMode::SnapEdge => self.snapped(cursor, SnapPolicy::Edge, source),
            ConstraintMode::Orthogonal => Ok(orthogonal_point(cursor, &self.shape)),
            ConstraintMode::Parallel => Ok(parallel_point(
                cursor,
                &self.shape,
                self.selector.active_segment(),
            )),
        }
    }

    /// Snap-Abfrage mit optionaler Einbeziehung der eigenen Shape.
    ///
    /// Mit `include_editing_shape` wird das Memo umgangen: die Shape mutiert
    /// mit jedem Vertex, ihre Revision steckt nicht im Memo-Schlüssel.
    fn snapped<S: FeatureSource + ?Sized>(
        &mut self,
        cursor: Coordinate,
        policy: SnapPolicy,
        source: &S,
    ) -> Result<Coordinate, EditError> {
        let own_geometry = if self.options.include_editing_shape {
            self.shape.as_feature_geometry()
        } else {
            None
        };

        let target = match &own_geometry {
            Some(geometry) => {
                let window = Aabb::around(cursor, self.options.radius);
                let features = source.query_bbox(&window)?;
                let mut candidates: Vec<(FeatureId, &FeatureGeometry)> =
                    features.iter().map(|f| (f.id, &f.geometry)).collect();
                candidates.push((EDITING_SHAPE_ID, geometry));
                best_snap(cursor, self.options.radius, policy, &candidates)
            }
            None => self.memo.query(cursor, self.options.radius, policy, source)?,
        };

        Ok(target.map(|t| t.coordinate).unwrap_or(cursor))
    }

    /// Berechnet den korrigierten Punkt und hängt ihn als Vertex an.
    pub fn commit_vertex<S: FeatureSource + ?Sized>(
        &mut self,
        cursor: Coordinate,
        source: &S,
    ) -> Result<Coordinate, EditError> {
        let point = self.preview_point(cursor, source)?;
        self.shape.push_vertex(point);
        Ok(point)
    }

    /// Entfernt den zuletzt gesetzten Vertex.
    pub fn undo_last_vertex(&mut self) -> Option<Coordinate> {
        self.shape.pop_vertex()
    }

    /// Schließt die Session ab und liefert die fertige Geometrie.
    ///
    /// `None`, wenn die Shape noch unvollständig ist; die Session bleibt dann
    /// unverändert und der Host kann weiterzeichnen.
    pub fn finish(&mut self) -> Option<FeatureGeometry> {
        let geometry = self.shape.as_feature_geometry()?;
        log::info!(
            "Session abgeschlossen: {:?} mit {} Vertices",
            self.shape.kind(),
            self.shape.vertex_count()
        );
        self.reset();
        Some(geometry)
    }

    /// Bricht die Session ab und verwirft alle Vertices.
    pub fn cancel(&mut self) {
        log::debug!("Session abgebrochen ({} Vertices)", self.shape.vertex_count());
        self.reset();
    }

    fn reset(&mut self) {
        self.shape.clear();
        self.mode = ConstraintMode::default();
        self.selector.clear();
        self.memo.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Feature, FeatureStore, IdentityReprojection};

    const LAYER: CrsId = CrsId(25832);
    const MAP: CrsId = CrsId(3857);

    fn store_with_square() -> FeatureStore {
        let mut store = FeatureStore::new();
        store.insert(Feature::new(
            FeatureId(1),
            FeatureGeometry::Polygon {
                exterior: vec![
                    Coordinate::new(0.0, 0.0),
                    Coordinate::new(10.0, 0.0),
                    Coordinate::new(10.0, 10.0),
                    Coordinate::new(0.0, 10.0),
                ],
                holes: vec![],
            },
        ));
        store
    }

    fn session() -> EditSession {
        EditSession::new(ShapeKind::Open, &EditorOptions::default(), LAYER, MAP)
    }

    #[test]
    fn commit_im_snap_vertex_modus_rastet_ein() {
        let store = store_with_square();
        let mut session = session();
        session.set_mode(ConstraintMode::SnapVertex);

        let point = session
            .commit_vertex(Coordinate::new(9.5, 0.4), &store)
            .unwrap();
        assert_eq!(point, Coordinate::new(10.0, 0.0));
        assert_eq!(session.shape().vertex_count(), 1);
    }

    #[test]
    fn moduswechsel_verwirft_das_referenzsegment() {
        let store = store_with_square();
        let mut session = session();
        session.set_mode(ConstraintMode::Parallel);
        session
            .select_reference_at(Coordinate::new(5.0, 0.5), &store, &IdentityReprojection)
            .unwrap();
        assert!(session.selector().active_segment().is_some());

        session.set_mode(ConstraintMode::Orthogonal);
        assert!(session.selector().active_segment().is_none());
    }

    #[test]
    fn parallel_ohne_referenz_liefert_den_cursor() {
        let store = store_with_square();
        let mut session = session();
        session
            .commit_vertex(Coordinate::new(20.0, 20.0), &store)
            .unwrap();
        session.set_mode(ConstraintMode::Parallel);

        let cursor = Coordinate::new(25.0, 22.0);
        assert_eq!(session.preview_point(cursor, &store).unwrap(), cursor);
    }

    #[test]
    fn eigene_shape_ist_nur_mit_option_snap_ziel() {
        let store = FeatureStore::new();
        let mut options = EditorOptions::default();
        options.include_editing_shape = true;
        let mut session = EditSession::new(ShapeKind::Open, &options, LAYER, MAP);

        session.commit_vertex(Coordinate::new(0.0, 0.0), &store).unwrap();
        session.commit_vertex(Coordinate::new(10.0, 0.0), &store).unwrap();

        session.set_mode(ConstraintMode::SnapVertex);
        let point = session
            .preview_point(Coordinate::new(0.3, 0.4), &store)
            .unwrap();
        assert_eq!(point, Coordinate::new(0.0, 0.0));

        // Ohne die Option bleibt der Cursor unangetastet
        let mut plain = EditSession::new(ShapeKind::Open, &EditorOptions::default(), LAYER, MAP);
        plain.commit_vertex(Coordinate::new(0.0, 0.0), &store).unwrap();
        plain.commit_vertex(Coordinate::new(10.0, 0.0), &store).unwrap();
        plain.set_mode(ConstraintMode::SnapVertex);
        let cursor = Coordinate::new(0.3, 0.4);
        assert_eq!(plain.preview_point(cursor, &store).unwrap(), cursor);
    }

    #[test]
    fn finish_liefert_erst_ab_gueltiger_geometrie() {
        let store = store_with_square();
        let mut session = EditSession::new(ShapeKind::Ring, &EditorOptions::default(), LAYER, MAP);
        session.commit_vertex(Coordinate::new(20.0, 20.0), &store).unwrap();
        session.commit_vertex(Coordinate::new(30.0, 20.0), &store).unwrap();
        assert!(session.finish().is_none());
        assert_eq!(session.shape().vertex_count(), 2);

        session.commit_vertex(Coordinate::new(30.0, 30.0), &store).unwrap();
        let geometry = session.finish().expect("Ring erwartet");
        assert!(matches!(geometry, FeatureGeometry::Polygon { .. }));
        assert_eq!(session.shape().vertex_count(), 0);
    }

    #[test]
    fn undo_entfernt_den_letzten_vertex() {
        let store = store_with_square();
        let mut session = session();
        session.commit_vertex(Coordinate::new(20.0, 20.0), &store).unwrap();
        session.commit_vertex(Coordinate::new(21.0, 20.0), &store).unwrap();
        assert_eq!(session.undo_last_vertex(), Some(Coordinate::new(21.0, 20.0)));
        assert_eq!(session.shape().vertex_count(), 1);
    }
}
