use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

/// Scalars per vertex record: position xyz followed by normal xyz.
pub const FLOATS_PER_VERTEX: usize = 6;

pub const WEST: Vec2 = Vec2::new(-1.0, 0.0);
pub const EAST: Vec2 = Vec2::new(1.0, 0.0);
pub const NORTH: Vec2 = Vec2::new(0.0, 1.0);
pub const SOUTH: Vec2 = Vec2::new(0.0, -1.0);

/// One interleaved vertex record, laid out exactly as uploaded to the GPU.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Accumulates flat-shaded triangles in the XY plane.
#[derive(Debug, Default)]
pub struct GeometryBuilder {
    vertices: Vec<Vertex>,
}

impl GeometryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one triangle with a shared face normal, keeping the given winding.
    ///
    /// The normal is `normalize((p2 - p1) x (p3 - p1))` with all points at z = 0.
    /// Collinear points have no face normal; they get the zero vector.
    pub fn triangle(mut self, p1: Vec2, p2: Vec2, p3: Vec2) -> Self {
        let (a, b, c) = (p1.extend(0.0), p2.extend(0.0), p3.extend(0.0));
        let normal = match (b - a).cross(c - a).try_normalize() {
            Some(n) => n,
            None => {
                tracing::warn!("degenerate triangle {p1} {p2} {p3}, using zero normal");
                Vec3::ZERO
            }
        };
        for p in [a, b, c] {
            self.vertices.push(Vertex {
                position: p.to_array(),
                normal: normal.to_array(),
            });
        }
        self
    }

    pub fn build(self) -> Geometry {
        Geometry {
            vertices: self.vertices,
        }
    }
}

/// Immutable interleaved vertex buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    vertices: Vec<Vertex>,
}

impl Geometry {
    /// Two triangles sharing the west-east edge: one pointing north, one south.
    pub fn bowtie() -> Self {
        GeometryBuilder::new()
            .triangle(WEST, EAST, NORTH)
            .triangle(WEST, SOUTH, EAST)
            .build()
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Flat view: position0, normal0, position1, normal1, ...
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Total number of scalars in the buffer.
    pub fn count(&self) -> usize {
        self.vertices.len() * FLOATS_PER_VERTEX
    }

    pub fn vertex_count(&self) -> usize {
        self.count() / FLOATS_PER_VERTEX
    }
}
