//! Country data validation errors.

/// Ways a country's render data can violate its index invariants.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeshError {
    /// The flat `[lon, lat, ...]` array has an odd length.
    #[error("{country}: vertex array has odd length {len}")]
    OddVertexArray { country: String, len: usize },

    /// The triangle index list is not a multiple of three.
    #[error("{country}: triangle index count {len} is not a multiple of 3")]
    RaggedTriangles { country: String, len: usize },

    /// A triangle or polygon index points past the vertex list.
    #[error("{country}: index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        country: String,
        index: u32,
        vertex_count: usize,
    },

    /// A coordinate is NaN or infinite.
    #[error("{country}: non-finite coordinate at position {position}")]
    NonFiniteCoordinate { country: String, position: usize },
}
