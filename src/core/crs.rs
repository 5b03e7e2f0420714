//! CRS-Reprojektion als austauschbarer Dienst (Map- vs. Layer-Frame).
//!
//! Der Kern rechnet immer in genau einem Frame; jede Umrechnung läuft explizit
//! über einen `Reprojector`. Echte geodätische Transformationen liefert der
//! Host, hier gibt es nur die Identität und affine Abbildungen für Tests.

use std::collections::HashMap;

use anyhow::anyhow;
use glam::DMat2;
use serde::{Deserialize, Serialize};

use super::geometry::{Coordinate, Segment};
use crate::error::EditError;

/// Kennung eines Koordinatenreferenzsystems (EPSG-artiger Code).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CrsId(pub u32);

/// Reprojektions-Dienst zwischen zwei Frames.
pub trait Reprojector {
    /// Rechnet einen Punkt von `from` nach `to` um.
    fn reproject_point(
        &self,
        point: Coordinate,
        from: CrsId,
        to: CrsId,
    ) -> Result<Coordinate, EditError>;

    /// Rechnet ein Segment punktweise um; ein dabei degeneriertes Segment
    /// ist eine Invariantenverletzung der Transformation.
    fn reproject_segment(
        &self,
        segment: &Segment,
        from: CrsId,
        to: CrsId,
    ) -> Result<Segment, EditError> {
        let p0 = self.reproject_point(segment.p0, from, to)?;
        let p1 = self.reproject_point(segment.p1, from, to)?;
        Segment::new(p0, p1)
    }
}

/// Identitäts-Reprojektion: Map- und Layer-Frame sind deckungsgleich.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityReprojection;

impl Reprojector for IdentityReprojection {
    fn reproject_point(
        &self,
        point: Coordinate,
        _from: CrsId,
        _to: CrsId,
    ) -> Result<Coordinate, EditError> {
        Ok(point)
    }
}

/// Affine Reprojektion pro CRS-Paar: `p' = linear * p + translation`.
#[derive(Debug, Clone, Default)]
pub struct AffineReprojection {
    transforms: HashMap<(CrsId, CrsId), (DMat2, Coordinate)>,
}

impl AffineReprojection {
    /// Erstellt einen Dienst ohne registrierte Transformationen.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registriert die Transformation `from → to` samt Inverser für `to → from`.
    pub fn register(&mut self, from: CrsId, to: CrsId, linear: DMat2, translation: Coordinate) {
        self.transforms.insert((from, to), (linear, translation));
        let inverse = linear.inverse();
        self.transforms
            .insert((to, from), (inverse, -(inverse * translation)));
    }
}

impl Reprojector for AffineReprojection {
    fn reproject_point(
        &self,
        point: Coordinate,
        from: CrsId,
        to: CrsId,
    ) -> Result<Coordinate, EditError> {
        if from == to {
            return Ok(point);
        }
        let (linear, translation) =
            self.transforms
                .get(&(from, to))
                .ok_or_else(|| EditError::Reprojection {
                    from,
                    to,
                    source: anyhow!("keine Transformation registriert"),
                })?;
        Ok(*linear * point + *translation)
    }
}
