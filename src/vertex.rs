//! Vertex records and the strided-array descriptor that reads them.
//!
//! The array-reader itself is treated as an external collaborator — its
//! only contract is "produces one vertex record per index" — so this stays
//! deliberately thin: a descriptor of where each attribute lives in a caller
//! buffer, and a reader that walks it.

use nalgebra::{Vector2, Vector3, Vector4};

/// Which primitive a [`Vertex`] belongs to, passed to the vertex shader as
/// `VERTEX_TYPE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    Triangle,
    Line,
    Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    Triangles,
    Lines,
    Points,
}

impl PrimitiveType {
    /// Vertex records consumed per primitive: 3/2/1.
    #[inline]
    pub fn vertices_per_primitive(self) -> usize {
        match self {
            PrimitiveType::Triangles => 3,
            PrimitiveType::Lines => 2,
            PrimitiveType::Points => 1,
        }
    }

    #[inline]
    pub fn kind(self) -> PrimitiveKind {
        match self {
            PrimitiveType::Triangles => PrimitiveKind::Triangle,
            PrimitiveType::Lines => PrimitiveKind::Line,
            PrimitiveType::Points => PrimitiveKind::Point,
        }
    }
}

/// One vertex record, already unpacked from the caller's strided array.
#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    pub kind: PrimitiveKind,
    pub position: Vector4<f32>,
    pub color: Vector4<f32>,
    pub normal: Vector3<f32>,
    pub tcoord: Vector2<f32>,
}

impl Vertex {
    pub fn default_for(kind: PrimitiveKind) -> Vertex {
        Vertex {
            kind,
            position: Vector4::new(0.0, 0.0, 0.0, 1.0),
            color: Vector4::new(0.0, 0.0, 0.0, 1.0),
            normal: Vector3::new(0.0, 0.0, 0.0),
            tcoord: Vector2::new(0.0, 0.0),
        }
    }
}

/// Per-attribute location within a caller-owned interleaved vertex buffer.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttributeLayout {
    pub enabled: bool,
    /// Components per value: 2-4 for position, 3-4 for color. Unused for
    /// normal (always 3) and tcoord (always 2).
    pub components: u8,
    pub offset: usize,
    pub stride: usize,
}

/// Describes where each of position/color/normal/tcoord live in a strided
/// `f32` array, per the external vertex-array-layout interface.
#[derive(Debug, Clone, Copy, Default)]
pub struct VertexArrayDescriptor {
    pub position: AttributeLayout,
    pub color: AttributeLayout,
    pub normal: AttributeLayout,
    pub tcoord: AttributeLayout,
}

impl VertexArrayDescriptor {
    /// Reads one vertex record at `index` out of `buffer`, a flat `f32`
    /// array where `buffer[layout.offset + index*layout.stride + component]`
    /// addresses one scalar. Disabled attributes keep the vertex default.
    pub fn read(&self, buffer: &[f32], index: usize, kind: PrimitiveKind) -> Vertex {
        let mut vertex = Vertex::default_for(kind);

        if self.position.enabled {
            let n = self.position.components.max(2) as usize;
            let base = self.position.offset + index * self.position.stride;
            for i in 0..n.min(4) {
                if let Some(&v) = buffer.get(base + i) {
                    vertex.position[i] = v;
                }
            }
        }

        if self.color.enabled {
            let n = self.color.components.max(3) as usize;
            let base = self.color.offset + index * self.color.stride;
            for i in 0..n.min(4) {
                if let Some(&v) = buffer.get(base + i) {
                    vertex.color[i] = v;
                }
            }
        }

        if self.normal.enabled {
            let base = self.normal.offset + index * self.normal.stride;
            for i in 0..3 {
                if let Some(&v) = buffer.get(base + i) {
                    vertex.normal[i] = v;
                }
            }
        }

        if self.tcoord.enabled {
            let base = self.tcoord.offset + index * self.tcoord.stride;
            for i in 0..2 {
                if let Some(&v) = buffer.get(base + i) {
                    vertex.tcoord[i] = v;
                }
            }
        }

        vertex
    }
}
