//! Geteilte Typen für layer-übergreifende Verträge.

pub mod options;

pub use options::EditorOptions;
pub use options::{GRID_SIZE, INCLUDE_EDITING_SHAPE, SNAP_RADIUS};
