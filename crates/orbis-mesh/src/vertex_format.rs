//! Vertex layout shared by every globe render pipeline.
//!
//! | Location | Offset | Format    | Field    |
//! |----------|--------|-----------|----------|
//! | 0        | 0      | Float32x3 | position |
//! | 1        | 12     | Float32x3 | normal   |
//! | 2        | 24     | Float32x2 | uv       |

use std::mem;

use bytemuck::{Pod, Zeroable};
use wgpu::{VertexAttribute, VertexBufferLayout, VertexFormat, VertexStepMode};

/// Interleaved globe vertex.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct GlobeVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

pub const GLOBE_VERTEX_ATTRIBUTES: [VertexAttribute; 3] = [
    VertexAttribute {
        format: VertexFormat::Float32x3,
        offset: 0,
        shader_location: 0,
    },
    VertexAttribute {
        format: VertexFormat::Float32x3,
        offset: 12,
        shader_location: 1,
    },
    VertexAttribute {
        format: VertexFormat::Float32x2,
        offset: 24,
        shader_location: 2,
    },
];

pub const GLOBE_VERTEX_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
    array_stride: mem::size_of::<GlobeVertex>() as u64,
    step_mode: VertexStepMode::Vertex,
    attributes: &GLOBE_VERTEX_ATTRIBUTES,
};

const _: () = assert!(
    mem::size_of::<GlobeVertex>() == 32,
    "GlobeVertex size changed, update GLOBE_VERTEX_LAYOUT"
);
const _: () = assert!(GLOBE_VERTEX_ATTRIBUTES[1].offset == mem::offset_of!(GlobeVertex, normal) as u64);
const _: () = assert!(GLOBE_VERTEX_ATTRIBUTES[2].offset == mem::offset_of!(GlobeVertex, uv) as u64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_stride_matches_struct() {
        assert_eq!(GLOBE_VERTEX_LAYOUT.array_stride, 32);
        assert_eq!(GLOBE_VERTEX_LAYOUT.attributes.len(), 3);
    }

    #[test]
    fn test_vertex_casts_to_bytes() {
        let v = [GlobeVertex {
            position: [1.0, 2.0, 3.0],
            normal: [0.0, 1.0, 0.0],
            uv: [0.5, 0.25],
        }];
        let bytes: &[u8] = bytemuck::cast_slice(&v);
        assert_eq!(bytes.len(), 32);
        assert_eq!(&bytes[24..28], &0.5f32.to_ne_bytes());
    }
}
