//! EditableShape: die gerade gezeichnete Geometrie, exklusiv im Besitz der Session.

use crate::core::{Coordinate, FeatureGeometry};

/// Offener Linienzug oder implizit geschlossener Ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Open,
    Ring,
}

/// Geordnete, veränderliche Vertex-Folge der aktiven Zeichensession.
///
/// Vertices werden ausschließlich über die Session-API angehängt/entfernt;
/// die Struktur selbst bietet deshalb nur `pub(crate)`-Mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct EditableShape {
    kind: ShapeKind,
    vertices: Vec<Coordinate>,
}

impl EditableShape {
    /// Erstellt eine leere Shape.
    pub fn new(kind: ShapeKind) -> Self {
        Self {
            kind,
            vertices: Vec::new(),
        }
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    pub fn vertices(&self) -> &[Coordinate] {
        &self.vertices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Letzter committeter Vertex (Anker für Orthogonal/Parallel).
    pub fn last_vertex(&self) -> Option<Coordinate> {
        self.vertices.last().copied()
    }

    pub(crate) fn push_vertex(&mut self, vertex: Coordinate) {
        self.vertices.push(vertex);
    }

    pub(crate) fn pop_vertex(&mut self) -> Option<Coordinate> {
        self.vertices.pop()
    }

    pub(crate) fn clear(&mut self) {
        self.vertices.clear();
    }

    /// Fertige Geometrie der Shape; `None` wenn noch zu wenige Vertices
    /// gesetzt sind (Linie < 2, Ring < 3).
    pub fn as_feature_geometry(&self) -> Option<FeatureGeometry> {
        match self.kind {
            ShapeKind::Open => {
                if self.vertices.len() < 2 {
                    return None;
                }
                Some(FeatureGeometry::Line(self.vertices.clone()))
            }
            ShapeKind::Ring => {
                if self.vertices.len() < 3 {
                    return None;
                }
                Some(FeatureGeometry::Polygon {
                    exterior: self.vertices.clone(),
                    holes: vec![],
                })
            }
        }
    }
}
