//! Constraint-Provider: korrigierter Punkt aus Cursor, Shape und Referenzsegment.
//!
//! Bewusst als Enum mit zentralem `compute_point`-Match statt dynamischem
//! Provider-Lookup: die Modus-Auswahl ist explizit, aller Zustand wird als
//! Parameter gereicht. Alle Provider arbeiten in genau einem Frame; der
//! Aufrufer transformiert Pixel ↔ Welt vor bzw. nach dem Aufruf.

use crate::core::{Coordinate, FeatureSource, Segment};
use crate::error::EditError;

use super::shape::EditableShape;
use super::snap::{find_closest_snap, SnapOptions, SnapPolicy};

/// Aktiver Zeichen-Constraint der Session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConstraintMode {
    /// Kein Constraint, Cursor unverändert
    #[default]
    Free,
    /// Auf den nächsten Vertex einrasten
    SnapVertex,
    /// Auf die nächste Kante einrasten
    SnapEdge,
    /// Orthogonal zum letzten Vertex (horizontal oder vertikal)
    Orthogonal,
    /// Parallel zum Referenzsegment durch den letzten Vertex
    Parallel,
}

/// Berechnet den korrigierten Punkt für eine Cursor-Position.
///
/// "Kein Ergebnis"-Fälle (kein Snap-Treffer, kein Referenzsegment, leere
/// Shape) fallen auf den rohen Cursor zurück — das ist Normalbetrieb,
/// kein Fehler. Fehler kommen nur aus der Feature-Quelle.
pub fn compute_point<S: FeatureSource + ?Sized>(
    mode: ConstraintMode,
    cursor: Coordinate,
    shape: &EditableShape,
    reference: Option<&Segment>,
    source: &S,
    options: &SnapOptions,
) -> Result<Coordinate, EditError> {
    match mode {
        ConstraintMode::Free => Ok(cursor),
        ConstraintMode::SnapVertex => {
            let target = find_closest_snap(cursor, options.radius, SnapPolicy::Vertex, source)?;
            Ok(target.map(|t| t.coordinate).unwrap_or(cursor))
        }
        ConstraintMode::SnapEdge => {
            let target = find_closest_snap(cursor, options.radius, SnapPolicy::Edge, source)?;
            Ok(target.map(|t| t.coordinate).unwrap_or(cursor))
        }
        ConstraintMode::Orthogonal => Ok(orthogonal_point(cursor, shape)),
        ConstraintMode::Parallel => Ok(parallel_point(cursor, shape, reference)),
    }
}

/// Orthogonal-Constraint: verlängert vom letzten Vertex aus eine vertikale
/// oder horizontale Linie, je nachdem welcher Kandidat dem Cursor näher liegt.
/// Bei Gleichstand gewinnt der vertikale Kandidat (zuerst berechnet).
pub fn orthogonal_point(cursor: Coordinate, shape: &EditableShape) -> Coordinate {
    let Some(last) = shape.last_vertex() else {
        return cursor;
    };
    let vertical = Coordinate::new(last.x, cursor.y);
    let horizontal = Coordinate::new(cursor.x, last.y);
    if vertical.distance_squared(cursor) <= horizontal.distance_squared(cursor) {
        vertical
    } else {
        horizontal
    }
}

/// Parallel-Constraint als zweistufige Projektion:
/// 1. Cursor auf die unendliche Gerade durch das Referenzsegment projizieren,
/// 2. den letzten Shape-Vertex auf die Normale `cursor → projiziert` projizieren.
///
/// Das ist absichtlich NICHT der cursor-nächste Punkt auf der Parallelen,
/// sondern der Punkt entlang der vom Cursor definierten Normalenrichtung —
/// beobachtbares Editierverhalten, das exakt so erhalten bleibt.
pub fn parallel_point(
    cursor: Coordinate,
    shape: &EditableShape,
    reference: Option<&Segment>,
) -> Coordinate {
    let (Some(reference), Some(last)) = (reference, shape.last_vertex()) else {
        return cursor;
    };
    let projected = reference.project_onto_line(cursor);
    // Cursor liegt bereits auf der Referenzgeraden: Normale undefiniert
    let Ok(normal) = Segment::new(cursor, projected) else {
        return cursor;
    };
    normal.project_onto_line(last)
}
