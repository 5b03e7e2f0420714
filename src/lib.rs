//! Geometrie-Kern für interaktives Vektor-Editing.
//! Snapping, Zeichen-Constraints (orthogonal/parallel) und Feature-Split
//! als Library exportiert; die Host-Anwendung liefert Mouse-Events und Rendering.

pub mod app;
pub mod core;
pub mod error;
pub mod shared;
pub mod split;

pub use app::{
    compute_point, find_closest_snap, ConstraintMode, EditSession, EditableShape,
    ReferenceSegmentSelector, SelectorState, ShapeKind, SnapKind, SnapMemo, SnapOptions,
    SnapPolicy, SnapTarget,
};
pub use core::{
    AffineReprojection, AttributeValue, Coordinate, CrsId, Feature, FeatureGeometry, FeatureId,
    FeatureSource, FeatureStore, IdentityReprojection, Reprojector, Segment,
};
pub use core::{Aabb, VertexIndex, VertexMatch};
pub use error::EditError;
pub use shared::EditorOptions;
pub use split::{split, SplitRequest, SplitResult};
