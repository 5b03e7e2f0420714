//! Applikationsschicht: Snap-Suche, Constraints, Referenzauswahl, Session.

pub mod constraint;
pub mod reference;
pub mod session;
pub mod shape;
pub mod snap;

pub use constraint::{compute_point, ConstraintMode};
pub use reference::{ReferenceSegmentSelector, SelectorState};
pub use session::EditSession;
pub use shape::{EditableShape, ShapeKind};
pub use snap::{
    find_closest_snap, SnapKind, SnapMemo, SnapOptions, SnapPolicy, SnapTarget, EDITING_SHAPE_ID,
};
