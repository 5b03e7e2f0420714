//! Snap-Suche: nächster Vertex-/Edge-Treffer unter einer konfigurierbaren Policy.

use serde::{Deserialize, Serialize};

use crate::core::{
    Aabb, Coordinate, Feature, FeatureGeometry, FeatureId, FeatureSource, Segment, COORD_EPSILON,
};
use crate::error::EditError;
use crate::shared::options::{INCLUDE_EDITING_SHAPE, SNAP_RADIUS};

/// Pseudo-ID für die gerade gezeichnete Shape als Snap-Kandidat.
pub const EDITING_SHAPE_ID: FeatureId = FeatureId(u64::MAX);

/// Snap-Policy: worauf der Cursor einrasten darf.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SnapPolicy {
    /// Kein Snapping
    None,
    /// Nur auf Vertices
    Vertex,
    /// Nur auf Kanten (geklemmte Projektion)
    Edge,
    /// Vertices und Kanten; bei Gleichstand gewinnt der Vertex
    VertexAndEdge,
    /// Auf das nächste Gitterkreuz (braucht keine Feature-Abfrage)
    Grid { spacing: f64 },
}

impl SnapPolicy {
    /// Hashbarer Memo-Schlüssel (Diskriminante + Gitterweite als Bits).
    pub(crate) fn memo_key(&self) -> (u8, u64) {
        match self {
            SnapPolicy::None => (0, 0),
            SnapPolicy::Vertex => (1, 0),
            SnapPolicy::Edge => (2, 0),
            SnapPolicy::VertexAndEdge => (3, 0),
            SnapPolicy::Grid { spacing } => (4, spacing.to_bits()),
        }
    }
}

/// Herkunft eines Snap-Treffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapKind {
    Vertex,
    Edge,
    Grid,
}

/// Ergebnis der Snap-Suche.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapTarget {
    /// Eingerastete Koordinate (gleicher Frame wie der Cursor)
    pub coordinate: Coordinate,
    /// Vertex-, Edge- oder Grid-Treffer
    pub kind: SnapKind,
    /// Exakte euklidische Distanz zum Cursor
    pub distance: f64,
    /// Getroffenes Feature (None bei Grid)
    pub feature: Option<FeatureId>,
    /// Getroffenes Kanten-Segment (nur bei Edge-Treffern)
    pub segment: Option<Segment>,
}

/// Vom Host konsumierte Snap-Konfiguration (read-only für den Kern).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapOptions {
    pub policy: SnapPolicy,
    /// Suchradius in Welteinheiten
    pub radius: f64,
    /// Dürfen Vertices/Kanten der gerade gezeichneten Shape Snap-Ziele sein?
    pub include_editing_shape: bool,
}

impl Default for SnapOptions {
    fn default() -> Self {
        Self {
            policy: SnapPolicy::VertexAndEdge,
            radius: SNAP_RADIUS,
            include_editing_shape: INCLUDE_EDITING_SHAPE,
        }
    }
}

impl SnapOptions {
    /// Baut Snap-Optionen aus den persistierten Editor-Optionen plus der
    /// vom Host gewählten Policy.
    pub fn from_editor(options: &crate::shared::EditorOptions, policy: SnapPolicy) -> Self {
        Self {
            policy,
            radius: options.snap_radius,
            include_editing_shape: options.include_editing_shape,
        }
    }
}

/// Findet den nächsten Snap-Treffer zur Cursor-Position.
///
/// Grobfilter: BBox-Abfrage mit dem Quadrat der Seitenlänge `2 * radius`
/// um den Punkt; danach exakte Distanzen. Kein Treffer im Radius → `Ok(None)`,
/// der Aufrufer fällt auf den rohen Cursor-Punkt zurück.
pub fn find_closest_snap<S: FeatureSource + ?Sized>(
    point: Coordinate,
    radius: f64,
    policy: SnapPolicy,
    source: &S,
) -> Result<Option<SnapTarget>, EditError> {
    match policy {
        SnapPolicy::None => Ok(None),
        SnapPolicy::Grid { spacing } => Ok(grid_target(point, radius, spacing)),
        _ => {
            let window = Aabb::around(point, radius);
            let features = source.query_bbox(&window)?;
            let candidates: Vec<(FeatureId, &FeatureGeometry)> =
                features.iter().map(|f: &&Feature| (f.id, &f.geometry)).collect();
            Ok(best_snap(point, radius, policy, &candidates))
        }
    }
}

/// Kern der Snap-Suche über einer bereits vorgefilterten Kandidatenliste.
pub(crate) fn best_snap(
    point: Coordinate,
    radius: f64,
    policy: SnapPolicy,
    candidates: &[(FeatureId, &FeatureGeometry)],
) -> Option<SnapTarget> {
    match policy {
        SnapPolicy::None => None,
        SnapPolicy::Grid { spacing } => grid_target(point, radius, spacing),
        SnapPolicy::Vertex => best_vertex(point, radius, candidates),
        SnapPolicy::Edge => best_edge(point, radius, candidates),
        SnapPolicy::VertexAndEdge => {
            let vertex = best_vertex(point, radius, candidates);
            let edge = best_edge(point, radius, candidates);
            match (vertex, edge) {
                (Some(v), Some(e)) => {
                    // Gleichstand (Eckfall: Kante endet im Vertex) → Vertex gewinnt
                    if v.distance <= e.distance + COORD_EPSILON {
                        Some(v)
                    } else {
                        Some(e)
                    }
                }
                (v, e) => v.or(e),
            }
        }
    }
}

fn best_vertex(
    point: Coordinate,
    radius: f64,
    candidates: &[(FeatureId, &FeatureGeometry)],
) -> Option<SnapTarget> {
    let mut best: Option<SnapTarget> = None;
    for (feature_id, geometry) in candidates {
        for vertex in geometry.vertices() {
            let distance = vertex.distance(point);
            if distance > radius {
                continue;
            }
            if best.as_ref().map(|b| distance < b.distance).unwrap_or(true) {
                best = Some(SnapTarget {
                    coordinate: vertex,
                    kind: SnapKind::Vertex,
                    distance,
                    feature: Some(*feature_id),
                    segment: None,
                });
            }
        }
    }
    best
}

fn best_edge(
    point: Coordinate,
    radius: f64,
    candidates: &[(FeatureId, &FeatureGeometry)],
) -> Option<SnapTarget> {
    let mut best: Option<SnapTarget> = None;
    for (feature_id, geometry) in candidates {
        for (p0, p1) in geometry.segments() {
            // Defekte Eingabedaten (Doppelpunkte) überspringen statt abbrechen
            let Ok(segment) = Segment::new(p0, p1) else {
                continue;
            };
            let closest = segment.closest_point(point);
            let distance = closest.distance(point);
            if distance > radius {
                continue;
            }
            if best.as_ref().map(|b| distance < b.distance).unwrap_or(true) {
                best = Some(SnapTarget {
                    coordinate: closest,
                    kind: SnapKind::Edge,
                    distance,
                    feature: Some(*feature_id),
                    segment: Some(segment),
                });
            }
        }
    }
    best
}

fn grid_target(point: Coordinate, radius: f64, spacing: f64) -> Option<SnapTarget> {
    if spacing <= 0.0 {
        return None;
    }
    let snapped = Coordinate::new(
        (point.x / spacing).round() * spacing,
        (point.y / spacing).round() * spacing,
    );
    let distance = snapped.distance(point);
    if distance > radius {
        return None;
    }
    Some(SnapTarget {
        coordinate: snapped,
        kind: SnapKind::Grid,
        distance,
        feature: None,
        segment: None,
    })
}

// ── Snap-Memo ───────────────────────────────────────────────────────

/// Rundungsraster für den Memo-Schlüssel (Cursor steht "auf derselben Stelle").
const MEMO_POINT_GRID: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SnapMemoKey {
    revision: u64,
    point: (i64, i64),
    policy: (u8, u64),
    radius_bits: u64,
}

/// Memo der letzten Snap-Abfrage (Größe 1).
///
/// Spart die Neuberechnung, solange sich der Cursor zwischen zwei Events nicht
/// bewegt hat. Der Schlüssel enthält die Store-Revision, damit nach einer
/// Mutation nie ein veralteter Treffer ausgeliefert wird.
#[derive(Debug, Clone, Default)]
pub struct SnapMemo {
    entry: Option<(SnapMemoKey, Option<SnapTarget>)>,
}

impl SnapMemo {
    /// Erstellt ein leeres Memo.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snap-Abfrage mit Memoisierung.
    pub fn query<S: FeatureSource + ?Sized>(
        &mut self,
        point: Coordinate,
        radius: f64,
        policy: SnapPolicy,
        source: &S,
    ) -> Result<Option<SnapTarget>, EditError> {
        let key = SnapMemoKey {
            revision: source.revision(),
            point: (
                (point.x / MEMO_POINT_GRID).round() as i64,
                (point.y / MEMO_POINT_GRID).round() as i64,
            ),
            policy: policy.memo_key(),
            radius_bits: radius.to_bits(),
        };

        if let Some((cached_key, cached)) = &self.entry {
            if *cached_key == key {
                return Ok(*cached);
            }
        }

        let result = find_closest_snap(point, radius, policy, source)?;
        self.entry = Some((key, result));
        Ok(result)
    }

    /// Verwirft den Memo-Inhalt.
    pub fn clear(&mut self) {
        self.entry = None;
    }
}
