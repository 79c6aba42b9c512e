//! Outline generation for collider overlays
//!
//! Every outline is a closed loop: the renderer connects the last vertex back
//! to the first.

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::Vertex;
use crate::consts::CIRCLE_OUTLINE_SEGMENTS;
use crate::sim::Shape;

/// Generate a closed loop approximating a circle
pub fn circle_outline(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let segments = segments.max(3);
    (0..segments)
        .map(|i| {
            let theta = (i as f32 / segments as f32) * 2.0 * PI;
            Vertex::new(
                center.x + radius * theta.cos(),
                center.y + radius * theta.sin(),
                color,
            )
        })
        .collect()
}

/// Generate the four corners of an axis-aligned box, clockwise from top-left
pub fn rect_outline(min: Vec2, max: Vec2, color: [f32; 4]) -> Vec<Vertex> {
    vec![
        Vertex::new(min.x, min.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(max.x, max.y, color),
        Vertex::new(min.x, max.y, color),
    ]
}

/// Outline for a world-space collider
pub fn collider_outline(shape: &Shape, color: [f32; 4]) -> Vec<Vertex> {
    match *shape {
        Shape::Circle { center, radius } => circle_outline(
            center.as_vec2(),
            radius.max(0) as f32,
            color,
            CIRCLE_OUTLINE_SEGMENTS,
        ),
        Shape::Rect { .. } => {
            let (min, max) = shape.bounds();
            rect_outline(min.as_vec2(), max.as_vec2(), color)
        }
    }
}
