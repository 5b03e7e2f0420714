//! Core-Domänentypen: Geometrie-Primitive, Features, Store, CRS, Spatial-Index.

pub mod crs;
pub mod feature;
pub mod geometry;
pub mod spatial;
pub mod store;

pub use crs::{AffineReprojection, CrsId, IdentityReprojection, Reprojector};
pub use feature::{
    open_segments, ring_segments, AttributeValue, Feature, FeatureGeometry, FeatureId,
};
pub use geometry::{
    segment_crossing, Aabb, Coordinate, Segment, SegmentCrossing, COORD_EPSILON,
};
pub use spatial::{VertexIndex, VertexMatch};
pub use store::{FeatureSource, FeatureStore};
