//! Geometrie-Primitive: Koordinaten, Segmente, Bounding-Boxen und Schnitt-Tests.

use glam::DVec2;

use crate::error::EditError;

/// Welt-Koordinate. Alle Operationen arbeiten in genau einem Frame;
/// Map/Layer-Umrechnung läuft ausschließlich über den `Reprojector`.
pub type Coordinate = DVec2;

/// Toleranz für Koordinaten-Vergleiche (Welteinheiten).
pub const COORD_EPSILON: f64 = 1e-9;

// ── Segment ─────────────────────────────────────────────────────────

/// Gerichtetes Segment zwischen zwei Koordinaten.
///
/// Invariante: `p0 != p1` — degenerierte Segmente werden im Konstruktor
/// abgewiesen, nachgelagerte Projektionen dürfen sich darauf verlassen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub p0: Coordinate,
    pub p1: Coordinate,
}

impl Segment {
    /// Erstellt ein Segment; lehnt `p0 == p1` (innerhalb `COORD_EPSILON`) ab.
    pub fn new(p0: Coordinate, p1: Coordinate) -> Result<Self, EditError> {
        if p0.distance_squared(p1) < COORD_EPSILON * COORD_EPSILON {
            return Err(EditError::DegenerateSegment { x: p0.x, y: p0.y });
        }
        Ok(Self { p0, p1 })
    }

    /// Länge des Segments.
    pub fn length(&self) -> f64 {
        self.p0.distance(self.p1)
    }

    /// Richtungswinkel in Radiant (atan2, mathematisch positiv).
    pub fn direction_angle(&self) -> f64 {
        let d = self.p1 - self.p0;
        d.y.atan2(d.x)
    }

    /// Parameter t der Projektion von `point` auf die unendliche Trägergerade.
    /// t=0 entspricht `p0`, t=1 entspricht `p1`; Werte außerhalb [0,1] liegen
    /// jenseits der Segment-Enden.
    pub fn project_parameter(&self, point: Coordinate) -> f64 {
        let d = self.p1 - self.p0;
        (point - self.p0).dot(d) / d.length_squared()
    }

    /// Projektion auf die unendliche Trägergerade (nicht geklemmt).
    pub fn project_onto_line(&self, point: Coordinate) -> Coordinate {
        self.p0 + (self.p1 - self.p0) * self.project_parameter(point)
    }

    /// Nächster Punkt auf dem Segment (Projektion, auf [0,1] geklemmt).
    pub fn closest_point(&self, point: Coordinate) -> Coordinate {
        let t = self.project_parameter(point).clamp(0.0, 1.0);
        self.p0 + (self.p1 - self.p0) * t
    }

    /// Distanz von `point` zum Segment (nicht zur unendlichen Geraden).
    pub fn distance_to_point(&self, point: Coordinate) -> f64 {
        self.closest_point(point).distance(point)
    }
}

// ── Bounding-Box ────────────────────────────────────────────────────

/// Achsenparallele Bounding-Box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Coordinate,
    pub max: Coordinate,
}

impl Aabb {
    /// Kleinste Box um alle Punkte; `None` bei leerer Eingabe.
    pub fn from_points(points: &[Coordinate]) -> Option<Self> {
        let first = *points.first()?;
        let mut min = first;
        let mut max = first;
        for p in &points[1..] {
            min = min.min(*p);
            max = max.max(*p);
        }
        Some(Self { min, max })
    }

    /// Quadratische Box mit Seitenlänge `2 * half_extent` um `center`.
    pub fn around(center: Coordinate, half_extent: f64) -> Self {
        let half = Coordinate::splat(half_extent);
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Box um `margin` in alle Richtungen vergrößert.
    pub fn expand(&self, margin: f64) -> Self {
        let m = Coordinate::splat(margin);
        Self {
            min: self.min - m,
            max: self.max + m,
        }
    }

    /// Vereinigung mit einer weiteren Box.
    pub fn union(&self, other: &Aabb) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Überschneiden sich die Boxen (Berührung zählt als Schnitt)?
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Liegt der Punkt in der Box (Rand inklusive)?
    pub fn contains(&self, point: Coordinate) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }
}

// ── Segment/Segment-Schnitt ─────────────────────────────────────────

/// Ergebnis eines Segment/Segment-Schnitt-Tests (parametrische Form).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegmentCrossing {
    /// Schnittpunkt mit Parametern auf beiden Segmenten (t auf a, u auf b).
    Point { t: f64, u: f64, point: Coordinate },
    /// Kollineare Überlappung; Parameterintervall auf dem ersten Segment.
    Collinear { t0: f64, t1: f64 },
}

/// Schnitt zweier Segmente `a0→a1` und `b0→b1`.
///
/// Endpunkt-Berührungen zählen als Schnitt (Toleranz `COORD_EPSILON`),
/// parallele, nicht kollineare Segmente liefern `None`.
pub fn segment_crossing(
    a0: Coordinate,
    a1: Coordinate,
    b0: Coordinate,
    b1: Coordinate,
) -> Option<SegmentCrossing> {
    let d1 = a1 - a0;
    let d2 = b1 - b0;
    let delta = b0 - a0;
    let cross = d1.perp_dot(d2);

    if cross.abs() < 1e-12 {
        // Parallel: kollinear nur wenn b0 auf der Trägergeraden von a liegt.
        let len = d1.length();
        if len < COORD_EPSILON || delta.perp_dot(d1).abs() > COORD_EPSILON * len {
            return None;
        }
        let len_sq = d1.length_squared();
        let mut t0 = delta.dot(d1) / len_sq;
        let mut t1 = (b1 - a0).dot(d1) / len_sq;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        let lo = t0.max(0.0);
        let hi = t1.min(1.0);
        if lo > hi + COORD_EPSILON {
            return None;
        }
        return Some(SegmentCrossing::Collinear { t0: lo, t1: hi });
    }

    let t = delta.perp_dot(d2) / cross;
    let u = delta.perp_dot(d1) / cross;
    let eps_t = COORD_EPSILON / d1.length().max(COORD_EPSILON);
    let eps_u = COORD_EPSILON / d2.length().max(COORD_EPSILON);
    if t < -eps_t || t > 1.0 + eps_t || u < -eps_u || u > 1.0 + eps_u {
        return None;
    }
    let t = t.clamp(0.0, 1.0);
    let u = u.clamp(0.0, 1.0);
    Some(SegmentCrossing::Point {
        t,
        u,
        point: a0 + d1 * t,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn segment_konstruktor_lehnt_degenerierte_segmente_ab() {
        let p = Coordinate::new(1.0, 2.0);
        assert!(Segment::new(p, p).is_err());
        assert!(Segment::new(p, p + Coordinate::new(1e-12, 0.0)).is_err());
        assert!(Segment::new(p, p + Coordinate::new(1.0, 0.0)).is_ok());
    }

    #[test]
    fn projektion_auf_traegergerade_ist_nicht_geklemmt() {
        let seg = Segment::new(Coordinate::new(0.0, 0.0), Coordinate::new(10.0, 0.0)).unwrap();
        let projected = seg.project_onto_line(Coordinate::new(15.0, 3.0));
        assert_relative_eq!(projected.x, 15.0);
        assert_relative_eq!(projected.y, 0.0);

        let clamped = seg.closest_point(Coordinate::new(15.0, 3.0));
        assert_relative_eq!(clamped.x, 10.0);
        assert_relative_eq!(clamped.y, 0.0);
    }

    #[test]
    fn distanz_zum_segment_nutzt_geklemmte_projektion() {
        let seg = Segment::new(Coordinate::new(0.0, 0.0), Coordinate::new(10.0, 0.0)).unwrap();
        assert_relative_eq!(seg.distance_to_point(Coordinate::new(5.0, 4.0)), 4.0);
        assert_relative_eq!(
            seg.distance_to_point(Coordinate::new(13.0, 4.0)),
            5.0 // Hypotenuse zu p1, nicht zur Geraden
        );
    }

    #[test]
    fn richtungswinkel_folgt_atan2() {
        let seg = Segment::new(Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 1.0)).unwrap();
        assert_relative_eq!(seg.direction_angle(), std::f64::consts::FRAC_PI_4);
    }

    #[test]
    fn aabb_schnitt_und_enthalten() {
        let a = Aabb::around(Coordinate::new(0.0, 0.0), 2.0);
        let b = Aabb::around(Coordinate::new(3.0, 0.0), 1.5);
        let c = Aabb::around(Coordinate::new(10.0, 10.0), 1.0);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert!(a.contains(Coordinate::new(2.0, 2.0)));
        assert!(!a.contains(Coordinate::new(2.1, 0.0)));
    }

    #[test]
    fn kreuzende_segmente_liefern_schnittpunkt() {
        let crossing = segment_crossing(
            Coordinate::new(0.0, 0.0),
            Coordinate::new(10.0, 10.0),
            Coordinate::new(0.0, 10.0),
            Coordinate::new(10.0, 0.0),
        );
        let Some(SegmentCrossing::Point { t, u, point }) = crossing else {
            panic!("Schnittpunkt erwartet");
        };
        assert_relative_eq!(t, 0.5);
        assert_relative_eq!(u, 0.5);
        assert_relative_eq!(point.x, 5.0);
        assert_relative_eq!(point.y, 5.0);
    }

    #[test]
    fn parallele_segmente_ohne_ueberlappung_liefern_none() {
        assert!(segment_crossing(
            Coordinate::new(0.0, 0.0),
            Coordinate::new(10.0, 0.0),
            Coordinate::new(0.0, 5.0),
            Coordinate::new(10.0, 5.0),
        )
        .is_none());

        // Kollinear, aber disjunkt
        assert!(segment_crossing(
            Coordinate::new(0.0, 0.0),
            Coordinate::new(1.0, 0.0),
            Coordinate::new(5.0, 0.0),
            Coordinate::new(6.0, 0.0),
        )
        .is_none());
    }

    #[test]
    fn kollineare_ueberlappung_liefert_parameterintervall() {
        let crossing = segment_crossing(
            Coordinate::new(0.0, 0.0),
            Coordinate::new(10.0, 0.0),
            Coordinate::new(4.0, 0.0),
            Coordinate::new(14.0, 0.0),
        );
        let Some(SegmentCrossing::Collinear { t0, t1 }) = crossing else {
            panic!("Kollineare Überlappung erwartet");
        };
        assert_relative_eq!(t0, 0.4);
        assert_relative_eq!(t1, 1.0);
    }

    #[test]
    fn endpunkt_beruehrung_zaehlt_als_schnitt() {
        let crossing = segment_crossing(
            Coordinate::new(0.0, 0.0),
            Coordinate::new(10.0, 0.0),
            Coordinate::new(5.0, 0.0),
            Coordinate::new(5.0, 8.0),
        );
        assert!(matches!(crossing, Some(SegmentCrossing::Point { .. })));
    }
}
