//! Vertex types for outline drawing

use bytemuck::{Pod, Zeroable};

/// Simple 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    /// Size of one vertex in a packed buffer (bytes)
    pub const STRIDE: usize = std::mem::size_of::<Vertex>();

    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }
}

/// Colors for engine overlays
pub mod colors {
    /// Collider outlines (magenta, mostly transparent)
    pub const DEBUG_COLLIDER: [f32; 4] = [1.0, 0.0, 1.0, 50.0 / 255.0];
}
