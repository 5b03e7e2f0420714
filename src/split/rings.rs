//! Ring-Hilfsfunktionen: Fläche, Punkt-in-Polygon, innerer Punkt.

use crate::core::Coordinate;
use crate::error::EditError;

/// Signierte Fläche (Shoelace). Positiv für CCW-Ringe.
pub(crate) fn signed_area(ring: &[Coordinate]) -> f64 {
    let mut sum = 0.0;
    for (index, p) in ring.iter().enumerate() {
        let q = ring[(index + 1) % ring.len()];
        sum += p.x * q.y - q.x * p.y;
    }
    sum / 2.0
}

/// Even-Odd-Test: liegt `point` im Ring (Rand zählt nicht deterministisch).
pub(crate) fn point_in_ring(point: Coordinate, ring: &[Coordinate]) -> bool {
    let mut inside = false;
    for (index, p) in ring.iter().enumerate() {
        let q = ring[(index + 1) % ring.len()];
        if (p.y > point.y) != (q.y > point.y) {
            let x = p.x + (point.y - p.y) / (q.y - p.y) * (q.x - p.x);
            if point.x < x {
                inside = !inside;
            }
        }
    }
    inside
}

/// Liegt `point` im Material des Polygons (im Exterior, in keinem Loch)?
pub(crate) fn point_in_polygon_material(
    point: Coordinate,
    exterior: &[Coordinate],
    holes: &[Vec<Coordinate>],
) -> bool {
    point_in_ring(point, exterior) && holes.iter().all(|hole| !point_in_ring(point, hole))
}

/// Schnitt-x-Werte einer horizontalen Scanline mit allen Ring-Kanten.
fn ring_crossings(ring: &[Coordinate], scan_y: f64) -> Vec<f64> {
    let mut xs = Vec::new();
    for (index, p) in ring.iter().enumerate() {
        let q = ring[(index + 1) % ring.len()];
        if (p.y > scan_y) != (q.y > scan_y) {
            xs.push(p.x + (scan_y - p.y) / (q.y - p.y) * (q.x - p.x));
        }
    }
    xs
}

/// Punkt, der sowohl im Ring als auch im Material des Originals liegt.
///
/// Scanline-Kandidaten zwischen benachbarten Vertex-y-Werten, breiteste
/// Lücke zuerst. Die Loch-Kanten zerlegen jede Scanline mit, damit der
/// Kandidat nie in einem vom Ring komplett umschlossenen Loch landet.
/// `None`, wenn der Ring kein Material des Originals enthält.
pub(crate) fn material_sample(
    ring: &[Coordinate],
    exterior: &[Coordinate],
    holes: &[Vec<Coordinate>],
) -> Option<Coordinate> {
    if ring.len() < 3 {
        return None;
    }
    let mut ys: Vec<f64> = ring.iter().map(|p| p.y).collect();
    ys.sort_by(f64::total_cmp);
    ys.dedup_by(|a, b| (*a - *b).abs() < 1e-12);
    if ys.len() < 2 {
        return None;
    }

    let mut scanlines: Vec<(f64, f64)> = ys
        .windows(2)
        .map(|pair| (pair[1] - pair[0], (pair[0] + pair[1]) / 2.0))
        .collect();
    scanlines.sort_by(|a, b| b.0.total_cmp(&a.0));

    for (_, scan_y) in scanlines {
        let mut xs = ring_crossings(ring, scan_y);
        for hole in holes {
            xs.extend(ring_crossings(hole, scan_y));
        }
        xs.sort_by(f64::total_cmp);

        // Zwischen zwei Schnitt-x-Werten ist der Material-Status konstant
        let mut best: Option<(f64, Coordinate)> = None;
        for pair in xs.windows(2) {
            let width = pair[1] - pair[0];
            if width <= 0.0 {
                continue;
            }
            let candidate = Coordinate::new((pair[0] + pair[1]) / 2.0, scan_y);
            if !point_in_ring(candidate, ring) {
                continue;
            }
            if !point_in_polygon_material(candidate, exterior, holes) {
                continue;
            }
            if best.as_ref().map(|(w, _)| width > *w).unwrap_or(true) {
                best = Some((width, candidate));
            }
        }
        if let Some((_, point)) = best {
            return Some(point);
        }
    }
    None
}

/// Garantiert innerer Punkt eines einfachen Rings.
///
/// Scanline auf halber Höhe zwischen zwei benachbarten unterschiedlichen
/// Vertex-y-Werten; Mitte der breitesten Überdeckungsspanne. Robust gegen
/// Scanlines, die exakt durch Vertices laufen.
pub(crate) fn interior_point(ring: &[Coordinate]) -> Result<Coordinate, EditError> {
    if ring.len() < 3 {
        return Err(EditError::InvariantViolation(
            "Ring mit weniger als 3 Vertices".into(),
        ));
    }

    let mut ys: Vec<f64> = ring.iter().map(|p| p.y).collect();
    ys.sort_by(f64::total_cmp);
    ys.dedup_by(|a, b| (*a - *b).abs() < 1e-12);
    if ys.len() < 2 {
        return Err(EditError::InvariantViolation(
            "Ring ohne vertikale Ausdehnung".into(),
        ));
    }

    // Scanline zwischen den beiden y-Werten mit der größten Lücke
    let mut scan_y = (ys[0] + ys[1]) / 2.0;
    let mut best_gap = ys[1] - ys[0];
    for pair in ys.windows(2) {
        let gap = pair[1] - pair[0];
        if gap > best_gap {
            best_gap = gap;
            scan_y = (pair[0] + pair[1]) / 2.0;
        }
    }

    // Schnitt-x-Werte der Scanline mit allen Kanten
    let mut xs: Vec<f64> = Vec::new();
    for (index, p) in ring.iter().enumerate() {
        let q = ring[(index + 1) % ring.len()];
        if (p.y > scan_y) != (q.y > scan_y) {
            xs.push(p.x + (scan_y - p.y) / (q.y - p.y) * (q.x - p.x));
        }
    }
    xs.sort_by(f64::total_cmp);
    if xs.len() < 2 {
        return Err(EditError::InvariantViolation(
            "Scanline schneidet den Ring nicht".into(),
        ));
    }

    // Breiteste Innen-Spanne (gerade Indizes beginnen Innenintervalle)
    let mut best: Option<(f64, Coordinate)> = None;
    for pair in xs.chunks_exact(2) {
        let width = pair[1] - pair[0];
        if best.as_ref().map(|(w, _)| width > *w).unwrap_or(true) {
            best = Some((width, Coordinate::new((pair[0] + pair[1]) / 2.0, scan_y)));
        }
    }
    best.map(|(_, p)| p).ok_or_else(|| {
        EditError::InvariantViolation("Scanline ohne Innenintervall".into())
    })
}
