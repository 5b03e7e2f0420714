//! Referenzsegment-Auswahl mit identitätsbasiertem Reprojektions-Cache.
//!
//! Das Referenzsegment wird im Layer-Frame gespeichert. Lesezugriffe in einem
//! anderen Frame laufen über einen Cache, der auf der Selektions-Identität
//! basiert: erst eine NEUE Selektion invalidiert, wiederholte Reads desselben
//! Segments nie.

use crate::core::{Coordinate, CrsId, FeatureSource, Reprojector, Segment};
use crate::error::EditError;

use super::snap::{find_closest_snap, SnapPolicy};

/// Zustand der Referenzsegment-Auswahl.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectorState {
    /// Kein Referenzsegment aktiv
    None,
    /// Segment gefunden, aber noch nicht übernommen (transient während einer Abfrage)
    Candidate(Segment),
    /// Segment übernommen; `selection_id` ist die Identität für den Cache
    Active {
        segment: Segment,
        selection_id: u64,
    },
}

#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    selection_id: u64,
    to: CrsId,
    segment: Segment,
}

/// Stateful, idempotente Auswahl des Segments unter dem Cursor.
///
/// Ein Mouse-Release innerhalb des Snap-Radius einer Kante übernimmt diese als
/// Referenz für den Parallel-Constraint und das visuelle Feedback.
#[derive(Debug, Clone)]
pub struct ReferenceSegmentSelector {
    state: SelectorState,
    next_selection_id: u64,
    cache: Option<CacheEntry>,
    /// Orientierungswinkel im Map-CRS, bei jeder Aktivierung neu berechnet
    map_angle: Option<f64>,
    layer_crs: CrsId,
    map_crs: CrsId,
}

impl ReferenceSegmentSelector {
    /// Erstellt eine leere Auswahl für das gegebene Frame-Paar.
    pub fn new(layer_crs: CrsId, map_crs: CrsId) -> Self {
        Self {
            state: SelectorState::None,
            next_selection_id: 1,
            cache: None,
            map_angle: None,
            layer_crs,
            map_crs,
        }
    }

    pub fn state(&self) -> &SelectorState {
        &self.state
    }

    /// Aktives Segment im Layer-Frame.
    pub fn active_segment(&self) -> Option<&Segment> {
        match &self.state {
            SelectorState::Active { segment, .. } => Some(segment),
            _ => None,
        }
    }

    /// Orientierungswinkel des aktiven Segments im Map-CRS (Render-Feedback).
    pub fn map_angle(&self) -> Option<f64> {
        self.map_angle
    }

    /// Sucht die nächstgelegene Kante (EDGE-Policy, alle Layer) und übernimmt
    /// sie als Referenz. Kein Treffer lässt den Zustand unverändert.
    ///
    /// Gibt `true` zurück, wenn ein Segment aktiv ist.
    pub fn select_at<S: FeatureSource + ?Sized>(
        &mut self,
        cursor: Coordinate,
        radius: f64,
        source: &S,
        reprojector: &dyn Reprojector,
    ) -> Result<bool, EditError> {
        let Some(target) = find_closest_snap(cursor, radius, SnapPolicy::Edge, source)? else {
            return Ok(matches!(self.state, SelectorState::Active { .. }));
        };
        let Some(segment) = target.segment else {
            return Ok(matches!(self.state, SelectorState::Active { .. }));
        };

        // Vorherigen Zustand merken, bevor der transiente Kandidat ihn ersetzt
        let previous = self.state;
        self.state = SelectorState::Candidate(segment);
        self.activate(previous, segment, reprojector)?;
        Ok(true)
    }

    /// Übernimmt den Kandidaten als aktives Segment.
    ///
    /// Idempotent: dasselbe Segment erneut zu selektieren behält die
    /// Selektions-Identität (und damit den Cache).
    fn activate(
        &mut self,
        previous: SelectorState,
        segment: Segment,
        reprojector: &dyn Reprojector,
    ) -> Result<(), EditError> {
        if let SelectorState::Active {
            segment: current,
            selection_id,
        } = previous
        {
            if current == segment {
                self.state = SelectorState::Active {
                    segment,
                    selection_id,
                };
                return Ok(());
            }
        }

        let selection_id = self.next_selection_id;
        self.next_selection_id += 1;
        self.state = SelectorState::Active {
            segment,
            selection_id,
        };
        // Neue Selektion: letzte Reprojektion ist ungültig
        self.cache = None;

        let map_segment = self.segment_in(self.map_crs, reprojector)?;
        self.map_angle = map_segment.map(|s| s.direction_angle());
        log::debug!(
            "Referenzsegment aktiviert: id={}, Winkel={:?}",
            selection_id,
            self.map_angle
        );
        Ok(())
    }

    /// Aktives Segment in den Ziel-Frame reprojiziert.
    ///
    /// Wiederholte Reads derselben Selektion mit demselben Ziel-CRS liefern
    /// bit-identische Koordinaten aus dem Cache, ohne den Reprojector erneut
    /// aufzurufen.
    pub fn segment_in(
        &mut self,
        target: CrsId,
        reprojector: &dyn Reprojector,
    ) -> Result<Option<Segment>, EditError> {
        let SelectorState::Active {
            segment,
            selection_id,
        } = self.state
        else {
            return Ok(None);
        };

        if let Some(entry) = &self.cache {
            if entry.selection_id == selection_id && entry.to == target {
                return Ok(Some(entry.segment));
            }
        }

        let reprojected = reprojector.reproject_segment(&segment, self.layer_crs, target)?;
        self.cache = Some(CacheEntry {
            selection_id,
            to: target,
            segment: reprojected,
        });
        Ok(Some(reprojected))
    }

    /// Explizites Löschen (Modus-Wechsel, Session-Ende).
    pub fn clear(&mut self) {
        if !matches!(self.state, SelectorState::None) {
            log::debug!("Referenzsegment gelöscht");
        }
        self.state = SelectorState::None;
        self.cache = None;
        self.map_angle = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        Feature, FeatureGeometry, FeatureId, FeatureStore, IdentityReprojection,
    };
    use std::cell::Cell;

    const LAYER: CrsId = CrsId(25832);
    const MAP: CrsId = CrsId(3857);

    /// Zählt Reprojector-Aufrufe, um Cache-Treffer nachzuweisen.
    struct CountingReprojection {
        calls: Cell<usize>,
    }

    impl CountingReprojection {
        fn new() -> Self {
            Self { calls: Cell::new(0) }
        }
    }

    impl Reprojector for CountingReprojection {
        fn reproject_point(
            &self,
            point: Coordinate,
            _from: CrsId,
            _to: CrsId,
        ) -> Result<Coordinate, EditError> {
            self.calls.set(self.calls.get() + 1);
            Ok(point * 2.0)
        }
    }

    fn store_with_two_lines() -> FeatureStore {
        let mut store = FeatureStore::new();
        store.insert(Feature::new(
            FeatureId(1),
            FeatureGeometry::Line(vec![
                Coordinate::new(0.0, 0.0),
                Coordinate::new(10.0, 0.0),
            ]),
        ));
        store.insert(Feature::new(
            FeatureId(2),
            FeatureGeometry::Line(vec![
                Coordinate::new(0.0, 20.0),
                Coordinate::new(10.0, 20.0),
            ]),
        ));
        store
    }

    #[test]
    fn klick_neben_kante_aktiviert_das_segment() {
        let store = store_with_two_lines();
        let mut selector = ReferenceSegmentSelector::new(LAYER, MAP);

        let hit = selector
            .select_at(Coordinate::new(5.0, 0.5), 2.0, &store, &IdentityReprojection)
            .unwrap();
        assert!(hit);

        let segment = selector.active_segment().expect("aktives Segment erwartet");
        assert_eq!(segment.p0, Coordinate::new(0.0, 0.0));
        assert_eq!(segment.p1, Coordinate::new(10.0, 0.0));
        assert!(selector.map_angle().is_some());
    }

    #[test]
    fn fehlschlag_laesst_den_zustand_unveraendert() {
        let store = store_with_two_lines();
        let mut selector = ReferenceSegmentSelector::new(LAYER, MAP);

        let hit = selector
            .select_at(Coordinate::new(500.0, 500.0), 2.0, &store, &IdentityReprojection)
            .unwrap();
        assert!(!hit);
        assert_eq!(*selector.state(), SelectorState::None);
    }

    #[test]
    fn wiederholte_reads_treffen_den_cache() {
        let store = store_with_two_lines();
        let reproj = CountingReprojection::new();
        let mut selector = ReferenceSegmentSelector::new(LAYER, MAP);

        selector
            .select_at(Coordinate::new(5.0, 0.5), 2.0, &store, &reproj)
            .unwrap();
        // Aktivierung reprojiziert einmal für den Map-Winkel (2 Punkte)
        let calls_after_activate = reproj.calls.get();
        assert_eq!(calls_after_activate, 2);

        let first = selector.segment_in(MAP, &reproj).unwrap().unwrap();
        let second = selector.segment_in(MAP, &reproj).unwrap().unwrap();

        // Bit-identisch und ohne weitere Reprojector-Aufrufe
        assert_eq!(first.p0.x.to_bits(), second.p0.x.to_bits());
        assert_eq!(first.p1.y.to_bits(), second.p1.y.to_bits());
        assert_eq!(reproj.calls.get(), calls_after_activate);
    }

    #[test]
    fn neue_selektion_invalidiert_den_cache() {
        let store = store_with_two_lines();
        let reproj = CountingReprojection::new();
        let mut selector = ReferenceSegmentSelector::new(LAYER, MAP);

        selector
            .select_at(Coordinate::new(5.0, 0.5), 2.0, &store, &reproj)
            .unwrap();
        selector.segment_in(MAP, &reproj).unwrap();
        let calls_first = reproj.calls.get();

        // Anderes Segment selektieren → Cache muss neu gefüllt werden
        selector
            .select_at(Coordinate::new(5.0, 19.5), 2.0, &store, &reproj)
            .unwrap();
        selector.segment_in(MAP, &reproj).unwrap();
        assert!(reproj.calls.get() > calls_first);

        let segment = selector.active_segment().unwrap();
        assert_eq!(segment.p0.y, 20.0);
    }

    #[test]
    fn gleiche_selektion_bleibt_idempotent() {
        let store = store_with_two_lines();
        let reproj = CountingReprojection::new();
        let mut selector = ReferenceSegmentSelector::new(LAYER, MAP);

        selector
            .select_at(Coordinate::new(5.0, 0.5), 2.0, &store, &reproj)
            .unwrap();
        selector.segment_in(MAP, &reproj).unwrap();
        let SelectorState::Active { selection_id, .. } = *selector.state() else {
            panic!("Active erwartet");
        };
        let calls_before = reproj.calls.get();

        // Gleiches Segment erneut: Identität (und Cache) bleiben erhalten
        selector
            .select_at(Coordinate::new(4.0, -0.5), 2.0, &store, &reproj)
            .unwrap();
        let SelectorState::Active {
            selection_id: second_id,
            ..
        } = *selector.state()
        else {
            panic!("Active erwartet");
        };
        assert_eq!(selection_id, second_id);

        // Der nächste Read kommt weiterhin aus dem Cache
        selector.segment_in(MAP, &reproj).unwrap();
        assert_eq!(reproj.calls.get(), calls_before);
    }

    #[test]
    fn clear_setzt_alles_zurueck() {
        let store = store_with_two_lines();
        let mut selector = ReferenceSegmentSelector::new(LAYER, MAP);
        selector
            .select_at(Coordinate::new(5.0, 0.5), 2.0, &store, &IdentityReprojection)
            .unwrap();

        selector.clear();
        assert_eq!(*selector.state(), SelectorState::None);
        assert!(selector.active_segment().is_none());
        assert!(selector.map_angle().is_none());
    }
}
