//! Split-Engine: Features entlang einer gezeichneten Schnittlinie teilen.
//!
//! Polygone laufen über Noding + Polygonisierung des Arrangements aus
//! Feature-Rand und Schnittlinie; Linien werden an den inneren
//! Schnittparametern in Teilstücke zerlegt. Tangentiale Berührungen, die
//! keine zwei Teile erzeugen, lassen das Feature unverändert.

mod noding;
mod polygonize;
mod rings;

use crate::core::{
    open_segments, ring_segments, segment_crossing, Aabb, Coordinate, CrsId, Feature,
    FeatureGeometry, FeatureId, SegmentCrossing, COORD_EPSILON,
};
use crate::error::EditError;

use polygonize::{extract_components, ComponentFaces};
use rings::{interior_point, material_sample, point_in_polygon_material, point_in_ring, signed_area};

/// Eingabe einer Split-Operation: Kandidaten-Features plus Schnittlinie.
///
/// Alle Koordinaten liegen bereits im selben Frame; `crs` dokumentiert ihn.
#[derive(Debug, Clone)]
pub struct SplitRequest {
    pub features: Vec<Feature>,
    /// Vertices der Schnittlinie (ohne dupliziertem Schlusspunkt bei Ringen)
    pub split_line: Vec<Coordinate>,
    /// Geschlossener Schnittring statt offener Linie
    pub closed: bool,
    pub crs: CrsId,
}

/// Ergebnis einer Split-Operation.
///
/// `split_features` sind die ersetzten Originale (unverändert), pro Original
/// stehen seine Teile in `new_features`. Nicht getroffene Features tauchen
/// in keinem der beiden Vektoren auf.
#[derive(Debug, Clone, Default)]
pub struct SplitResult {
    pub split_features: Vec<Feature>,
    pub new_features: Vec<Feature>,
}

/// Teilt alle getroffenen Features der Anfrage entlang der Schnittlinie.
///
/// Deterministisch: gleiche Eingabe liefert dieselben Teile in derselben
/// Reihenfolge. Neue IDs werden fortlaufend nach der höchsten Eingabe-ID
/// vergeben.
pub fn split(request: &SplitRequest) -> Result<SplitResult, EditError> {
    let split_segments = validated_split_segments(request)?;
    let split_bbox = Aabb::from_points(&request.split_line).ok_or_else(|| {
        EditError::InvariantViolation("Schnittlinie ohne Vertices".into())
    })?;

    let mut next_id = request
        .features
        .iter()
        .map(|f| f.id.0 + 1)
        .max()
        .unwrap_or(1);
    let mut result = SplitResult::default();

    for feature in &request.features {
        let Some(bbox) = feature.geometry.bounding_box() else {
            continue;
        };
        if !bbox.expand(COORD_EPSILON).intersects(&split_bbox) {
            continue;
        }

        let parts = match &feature.geometry {
            FeatureGeometry::Polygon { exterior, holes } => {
                split_polygon(exterior, holes, &split_segments, request.closed)?
            }
            FeatureGeometry::Line(points) => split_polyline(points, &split_segments),
        };

        let Some(parts) = parts else {
            continue;
        };
        log::info!(
            "Feature {:?} geteilt: {} Teile (CRS {:?})",
            feature.id,
            parts.len(),
            request.crs
        );
        result.split_features.push(feature.clone());
        for geometry in parts {
            let mut part = Feature::new(FeatureId(next_id), geometry);
            next_id += 1;
            part.attributes = feature.attributes.clone();
            result.new_features.push(part);
        }
    }
    Ok(result)
}

/// Prüft die Schnittlinie und liefert ihre Segmente (bei Ringen inklusive
/// Schlusssegment).
fn validated_split_segments(
    request: &SplitRequest,
) -> Result<Vec<(Coordinate, Coordinate)>, EditError> {
    let minimum = if request.closed { 3 } else { 2 };
    if request.split_line.len() < minimum {
        return Err(EditError::InvariantViolation(format!(
            "Schnittlinie braucht mindestens {} Vertices, hat {}",
            minimum,
            request.split_line.len()
        )));
    }
    let segments = if request.closed {
        ring_segments(&request.split_line)
    } else {
        open_segments(&request.split_line)
    };
    for (p0, p1) in &segments {
        if p0.distance_squared(*p1) < COORD_EPSILON * COORD_EPSILON {
            return Err(EditError::DegenerateSegment { x: p0.x, y: p0.y });
        }
    }
    Ok(segments)
}

// ── Polygon-Split ───────────────────────────────────────────────────

/// Teilt ein Polygon; `None` wenn die Schnittlinie keine zwei Teile erzeugt.
fn split_polygon(
    exterior: &[Coordinate],
    holes: &[Vec<Coordinate>],
    split_segments: &[(Coordinate, Coordinate)],
    closed_split: bool,
) -> Result<Option<Vec<FeatureGeometry>>, EditError> {
    let mut boundary = ring_segments(exterior);
    for hole in holes {
        boundary.extend(ring_segments(hole));
    }

    // Grobtest: ohne Rand-Schnitt kann nur ein geschlossener Ring im
    // Material noch teilen (Insel-Fall)
    let touches = split_segments.iter().any(|(s0, s1)| {
        boundary
            .iter()
            .any(|(b0, b1)| segment_crossing(*b0, *b1, *s0, *s1).is_some())
    });
    if !touches {
        let inside = closed_split
            && point_in_polygon_material(split_segments[0].0, exterior, holes);
        if !inside {
            return Ok(None);
        }
    }

    let mut segments = boundary;
    segments.extend_from_slice(split_segments);
    let arrangement = noding::node_segments(&segments);
    let components = extract_components(&arrangement)?;

    // Teile: Flächen, die Material des Originals enthalten. Der Sample-Punkt
    // muss den Original-Löchern ausweichen — eine Fläche kann ein unberührtes
    // Loch komplett umschließen, ohne selbst Loch zu sein.
    let mut parts: Vec<(usize, Vec<Coordinate>)> = Vec::new();
    for (index, component) in components.iter().enumerate() {
        for face in &component.faces {
            if material_sample(face, exterior, holes).is_some() {
                parts.push((index, face.clone()));
            }
        }
    }
    if parts.len() < 2 {
        return Ok(None);
    }

    let geometries = attach_holes(&parts, &components)?;
    Ok(Some(geometries))
}

/// Hängt Komponenten-Außenkonturen als Löcher an die umschließenden Teile.
///
/// Kandidaten sind alle ANDEREN Komponenten: unberührte Original-Löcher und
/// Insel-Konturen geschlossener Schnittringe. Zugeordnet wird über
/// Flächenvergleich plus Punkt-im-Ring-Test.
fn attach_holes(
    parts: &[(usize, Vec<Coordinate>)],
    components: &[ComponentFaces],
) -> Result<Vec<FeatureGeometry>, EditError> {
    let mut geometries = Vec::with_capacity(parts.len());
    for (component_index, ring) in parts {
        let part_area = signed_area(ring);
        let mut part_holes: Vec<Vec<Coordinate>> = Vec::new();
        for (other_index, other) in components.iter().enumerate() {
            if other_index == *component_index {
                continue;
            }
            let outline = &other.outline;
            if signed_area(outline).abs() >= part_area {
                continue;
            }
            if point_in_ring(interior_point(outline)?, ring) {
                part_holes.push(outline.clone());
            }
        }
        geometries.push(FeatureGeometry::Polygon {
            exterior: ring.clone(),
            holes: part_holes,
        });
    }
    Ok(geometries)
}

// ── Linien-Split ────────────────────────────────────────────────────

/// Teilt einen offenen Linienzug an den inneren Schnittparametern.
/// `None` wenn weniger als zwei Teile entstehen.
fn split_polyline(
    points: &[Coordinate],
    split_segments: &[(Coordinate, Coordinate)],
) -> Option<Vec<FeatureGeometry>> {
    let segments = open_segments(points);
    if segments.is_empty() {
        return None;
    }

    // Schnittstellen als (Segmentindex, Parameter), Endpunkte des gesamten
    // Linienzugs zählen nicht als Schnitt
    let mut cuts: Vec<(usize, f64)> = Vec::new();
    let last = segments.len() - 1;
    for (index, (p0, p1)) in segments.iter().enumerate() {
        let length = p0.distance(*p1);
        let eps = COORD_EPSILON / length.max(COORD_EPSILON);
        for (s0, s1) in split_segments {
            let params: Vec<f64> = match segment_crossing(*p0, *p1, *s0, *s1) {
                Some(SegmentCrossing::Point { t, .. }) => vec![t],
                Some(SegmentCrossing::Collinear { t0, t1 }) => vec![t0, t1],
                None => continue,
            };
            for t in params {
                if index == 0 && t < eps {
                    continue;
                }
                if index == last && t > 1.0 - eps {
                    continue;
                }
                cuts.push((index, t));
            }
        }
    }
    if cuts.is_empty() {
        return None;
    }
    cuts.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)));

    // Teilstücke aufsammeln; der Schnittpunkt gehört zu beiden Nachbarn
    let mut parts: Vec<Vec<Coordinate>> = Vec::new();
    let mut current: Vec<Coordinate> = vec![points[0]];
    let mut cut_iter = cuts.into_iter().peekable();
    for (index, (p0, p1)) in segments.iter().enumerate() {
        while let Some((cut_index, t)) = cut_iter.peek().copied() {
            if cut_index != index {
                break;
            }
            cut_iter.next();
            let point = *p0 + (*p1 - *p0) * t;
            // Quasi-identische Schnittpunkte nicht doppelt schneiden
            if current
                .last()
                .map(|prev| prev.distance_squared(point) < COORD_EPSILON * COORD_EPSILON)
                .unwrap_or(false)
            {
                continue;
            }
            current.push(point);
            parts.push(std::mem::replace(&mut current, vec![point]));
        }
        if current
            .last()
            .map(|prev| prev.distance_squared(*p1) >= COORD_EPSILON * COORD_EPSILON)
            .unwrap_or(true)
        {
            current.push(*p1);
        }
    }
    if current.len() >= 2 {
        parts.push(current);
    }

    parts.retain(|part| part.len() >= 2);
    if parts.len() < 2 {
        return None;
    }
    Some(parts.into_iter().map(FeatureGeometry::Line).collect())
}
