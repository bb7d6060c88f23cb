//! Mesh Builder: the fixed bowtie mesh as a flat interleaved buffer.
//!
//! # Invariants
//! - Buffer length is always a whole number of vertex records (6 floats).
//! - A built `Geometry` is never mutated or resized.

mod mesh;

pub use mesh::{EAST, FLOATS_PER_VERTEX, Geometry, GeometryBuilder, NORTH, SOUTH, Vertex, WEST};
