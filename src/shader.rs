//! Shader Pass: assembles the enabled-attribute blob and invokes the
//! user-supplied vertex/fragment callbacks.
//!
//! The wire shape is a tagged, ordered byte blob plus a parallel descriptor
//! array of attribute-kind tags, matching the external shader-attribute
//! interface. Rather than literally serialize to bytes, each attribute is
//! kept as a typed `AttributeValue` in canonical order — callbacks get an
//! `AttributeView` over the enabled subset instead of re-parsing a blob.

use nalgebra::{Vector2, Vector3, Vector4};

use crate::vertex::PrimitiveKind;

/// Attribute-kind tags, numbered per the external interface's canonical
/// vertex-then-fragment order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    VertexType,
    VertexPosition,
    VertexColor,
    VertexNormals,
    VertexTextureCoordinates,
    PrimitiveColor,
    TextureColor,
    FragmentColor,
    BaryLinear,
    BaryPerspective,
    FragmentPosition,
    FragmentDepth,
}

#[derive(Debug, Clone, Copy)]
pub enum AttributeValue {
    Kind(PrimitiveKind),
    Vec4(Vector4<f32>),
    Vec3(Vector3<f32>),
    Vec2(Vector2<f32>),
    Scalar(f32),
    Pixel(u32, u32),
}

/// Which vertex attributes are passed to the vertex shader.
#[derive(Debug, Clone, Copy, Default)]
pub struct VertexAttributeSet {
    pub vertex_type: bool,
    pub position: bool,
    pub color: bool,
    pub normals: bool,
    pub tcoords: bool,
}

/// Which fragment attributes are passed to the fragment shader.
#[derive(Debug, Clone, Copy, Default)]
pub struct FragmentAttributeSet {
    pub primitive_color: bool,
    pub texture_color: bool,
    pub fragment_color: bool,
    pub bary_linear: bool,
    pub bary_perspective: bool,
    pub fragment_position: bool,
    pub fragment_depth: bool,
}

/// The enabled-attribute subset, built in canonical order. Empty when no
/// attribute is enabled, matching "blob is null and count is 0".
#[derive(Debug, Clone, Default)]
pub struct AttributeBlob {
    entries: Vec<(AttributeKind, AttributeValue)>,
}

impl AttributeBlob {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, kind: AttributeKind) -> Option<AttributeValue> {
        self.entries.iter().find(|(k, _)| *k == kind).map(|(_, v)| *v)
    }

    pub fn descriptor(&self) -> impl Iterator<Item = AttributeKind> + '_ {
        self.entries.iter().map(|(k, _)| *k)
    }
}

pub struct VertexInputs {
    pub kind: PrimitiveKind,
    pub position: Vector4<f32>,
    pub color: Vector4<f32>,
    pub normal: Vector3<f32>,
    pub tcoord: Vector2<f32>,
}

pub fn build_vertex_blob(enabled: VertexAttributeSet, inputs: &VertexInputs) -> AttributeBlob {
    let mut entries = Vec::new();
    if enabled.vertex_type {
        entries.push((AttributeKind::VertexType, AttributeValue::Kind(inputs.kind)));
    }
    if enabled.position {
        entries.push((AttributeKind::VertexPosition, AttributeValue::Vec4(inputs.position)));
    }
    if enabled.color {
        entries.push((AttributeKind::VertexColor, AttributeValue::Vec4(inputs.color)));
    }
    if enabled.normals {
        entries.push((AttributeKind::VertexNormals, AttributeValue::Vec3(inputs.normal)));
    }
    if enabled.tcoords {
        entries.push((AttributeKind::VertexTextureCoordinates, AttributeValue::Vec2(inputs.tcoord)));
    }
    AttributeBlob { entries }
}

pub struct FragmentInputs {
    pub primitive_color: Vector4<f32>,
    pub texture_color: Vector4<f32>,
    pub fragment_color: Vector4<f32>,
    pub bary_linear: Vector3<f32>,
    pub bary_perspective: Vector3<f32>,
    pub fragment_position: (i32, i32),
    pub fragment_depth: f32,
}

pub fn build_fragment_blob(enabled: FragmentAttributeSet, inputs: &FragmentInputs) -> AttributeBlob {
    let mut entries = Vec::new();
    if enabled.primitive_color {
        entries.push((AttributeKind::PrimitiveColor, AttributeValue::Vec4(inputs.primitive_color)));
    }
    if enabled.texture_color {
        entries.push((AttributeKind::TextureColor, AttributeValue::Vec4(inputs.texture_color)));
    }
    if enabled.fragment_color {
        entries.push((AttributeKind::FragmentColor, AttributeValue::Vec4(inputs.fragment_color)));
    }
    if enabled.bary_linear {
        entries.push((AttributeKind::BaryLinear, AttributeValue::Vec3(inputs.bary_linear)));
    }
    if enabled.bary_perspective {
        entries.push((AttributeKind::BaryPerspective, AttributeValue::Vec3(inputs.bary_perspective)));
    }
    if enabled.fragment_position {
        let (x, y) = inputs.fragment_position;
        entries.push((AttributeKind::FragmentPosition, AttributeValue::Pixel(x as u32, y as u32)));
    }
    if enabled.fragment_depth {
        entries.push((AttributeKind::FragmentDepth, AttributeValue::Scalar(inputs.fragment_depth)));
    }
    AttributeBlob { entries }
}

/// `fn(attributes) -> clip-space position`. With no vertex shader bound the
/// pass returns the input position unchanged.
pub type VertexShader = dyn Fn(&AttributeBlob) -> Vector4<f32>;

/// `fn(attributes, &mut discard) -> color`. With no fragment shader bound
/// the pass returns the incoming color unchanged and never discards.
pub type FragmentShader = dyn Fn(&AttributeBlob, &mut bool) -> Vector4<f32>;

pub fn run_vertex_shader(shader: Option<&VertexShader>, blob: &AttributeBlob, fallback: Vector4<f32>) -> Vector4<f32> {
    match shader {
        Some(shader) => shader(blob),
        None => fallback,
    }
}

pub fn run_fragment_shader(
    shader: Option<&FragmentShader>,
    blob: &AttributeBlob,
    fallback: Vector4<f32>,
) -> (Vector4<f32>, bool) {
    match shader {
        Some(shader) => {
            let mut discard = false;
            let color = shader(blob, &mut discard);
            (color, discard)
        }
        None => (fallback, false),
    }
}
