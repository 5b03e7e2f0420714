//! Fehler-Taxonomie des Editing-Kerns.
//!
//! Drei Klassen: Vertragsverletzungen (degenerierte Segmente, Invarianten),
//! Upstream-Fehler (Feature-Quelle, Reprojektion) und — bewusst KEINE Fehler —
//! "kein Ergebnis"-Zustände, die als `Option`/Pass-Through modelliert werden.

use thiserror::Error;

use crate::core::crs::CrsId;

/// Fehler des Editing-Kerns. Rein deterministisch, keine Retries.
#[derive(Debug, Error)]
pub enum EditError {
    /// Segment-Konstruktion mit `p0 == p1` (Vertragsverletzung des Aufrufers).
    #[error("degeneriertes Segment: p0 == p1 bei ({x:.6}, {y:.6})")]
    DegenerateSegment { x: f64, y: f64 },

    /// Interne Geometrie-Invariante verletzt (z.B. unklassifizierbarer Ring).
    /// Bricht die laufende Operation ab, wird nie verschluckt.
    #[error("Geometrie-Invariante verletzt: {0}")]
    InvariantViolation(String),

    /// Abfrage der Feature-Quelle fehlgeschlagen (I/O des Hosts).
    #[error("Feature-Quelle fehlgeschlagen")]
    Source(#[source] anyhow::Error),

    /// CRS-Reprojektion fehlgeschlagen.
    #[error("Reprojektion {from:?} -> {to:?} fehlgeschlagen")]
    Reprojection {
        from: CrsId,
        to: CrsId,
        #[source]
        source: anyhow::Error,
    },
}
