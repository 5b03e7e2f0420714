//! Noding: Segmentmenge an allen paarweisen Schnittpunkten unterteilen.
//!
//! Ergebnis ist ein planares Arrangement aus ungerichteten Kanten zwischen
//! quantisierten Knoten. Die Quantisierung fasst numerisch identische
//! Schnittpunkte aus verschiedenen Segmentpaaren zu einem Knoten zusammen.

use std::collections::{BTreeSet, HashMap};

use crate::core::{segment_crossing, Coordinate, SegmentCrossing};

/// Raster für die Knoten-Quantisierung (Welteinheiten).
pub(crate) const SNAP_GRID: f64 = 1e-9;

/// Quantisierter Knoten, hashbar und total geordnet.
pub(crate) type NodeKey = (i64, i64);

pub(crate) fn quantize(point: Coordinate) -> NodeKey {
    (
        (point.x / SNAP_GRID).round() as i64,
        (point.y / SNAP_GRID).round() as i64,
    )
}

/// Planares Arrangement: ungerichtete Kantenmenge plus Knoten-Koordinaten.
///
/// Kanten sind als geordnete Schlüsselpaare abgelegt, Duplikate (etwa durch
/// kollineare Überlappung von Ring- und Schnittlinien-Segmenten) kollabieren
/// dadurch automatisch.
#[derive(Debug, Default)]
pub(crate) struct Arrangement {
    pub edges: BTreeSet<(NodeKey, NodeKey)>,
    pub coords: HashMap<NodeKey, Coordinate>,
}

impl Arrangement {
    fn insert_edge(&mut self, a: Coordinate, b: Coordinate) {
        let ka = quantize(a);
        let kb = quantize(b);
        if ka == kb {
            return;
        }
        self.coords.entry(ka).or_insert(a);
        self.coords.entry(kb).or_insert(b);
        let edge = if ka < kb { (ka, kb) } else { (kb, ka) };
        self.edges.insert(edge);
    }
}

/// Parameter t auf das Segment `p0→p1` für einen Punkt auf dessen Gerade.
fn line_parameter(p0: Coordinate, p1: Coordinate, point: Coordinate) -> f64 {
    let d = p1 - p0;
    (point - p0).dot(d) / d.length_squared()
}

/// Unterteilt alle Segmente an ihren paarweisen Schnittpunkten.
///
/// O(n²) über alle Paare; für die Segmentzahlen einer Editier-Operation
/// (Feature-Rand plus Schnittlinie) völlig ausreichend.
pub(crate) fn node_segments(segments: &[(Coordinate, Coordinate)]) -> Arrangement {
    // Pro Segment die Schnittparameter sammeln, 0 und 1 sind immer dabei
    let mut cuts: Vec<Vec<f64>> = segments.iter().map(|_| vec![0.0, 1.0]).collect();

    for i in 0..segments.len() {
        for j in (i + 1)..segments.len() {
            let (a0, a1) = segments[i];
            let (b0, b1) = segments[j];
            match segment_crossing(a0, a1, b0, b1) {
                Some(SegmentCrossing::Point { t, u, .. }) => {
                    cuts[i].push(t);
                    cuts[j].push(u);
                }
                Some(SegmentCrossing::Collinear { t0, t1 }) => {
                    cuts[i].push(t0);
                    cuts[i].push(t1);
                    // Überlappungs-Endpunkte auf das zweite Segment umparametrisieren
                    let q0 = a0 + (a1 - a0) * t0;
                    let q1 = a0 + (a1 - a0) * t1;
                    cuts[j].push(line_parameter(b0, b1, q0).clamp(0.0, 1.0));
                    cuts[j].push(line_parameter(b0, b1, q1).clamp(0.0, 1.0));
                }
                None => {}
            }
        }
    }

    let mut arrangement = Arrangement::default();
    for (index, (p0, p1)) in segments.iter().enumerate() {
        let params = &mut cuts[index];
        params.sort_by(f64::total_cmp);
        let length = p0.distance(*p1);
        let mut previous = *p0;
        let mut previous_t = 0.0;
        for &t in params.iter() {
            // Doppelte bzw. quasi-identische Parameter überspringen
            if (t - previous_t) * length < SNAP_GRID {
                continue;
            }
            let point = *p0 + (*p1 - *p0) * t;
            arrangement.insert_edge(previous, point);
            previous = point;
            previous_t = t;
        }
    }
    arrangement
}
