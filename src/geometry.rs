use std::fmt::Debug;

/// Vertex data ready to be copied into a vertex buffer.
pub trait Geometry: Debug {
    fn contents(&self) -> &[u8];

    /// Number of vertices in [Geometry::contents].
    fn length(&self) -> u32;
}
