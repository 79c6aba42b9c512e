//! Collision shapes and overlap tests
//!
//! Colliders are stored relative to their owning entity. Before testing, the
//! room translates both shapes into world space; `overlaps` itself only ever
//! sees world coordinates. Touching boundaries count as a hit everywhere.
//!
//! All overlap arithmetic is widened to `i64`, so shapes anywhere in the `i32`
//! plane compare without overflow. Translation saturates at the plane's edge.

use glam::{DVec2, IVec2};
use serde::{Deserialize, Serialize};

/// Collider attached to an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shape {
    Circle { center: IVec2, radius: i32 },
    /// Axis-aligned rectangle described by its center and full extents
    Rect {
        center: IVec2,
        width: i32,
        height: i32,
    },
}

impl Shape {
    pub fn circle(center: IVec2, radius: i32) -> Self {
        Shape::Circle { center, radius }
    }

    pub fn rect(center: IVec2, width: i32, height: i32) -> Self {
        Shape::Rect {
            center,
            width,
            height,
        }
    }

    pub fn center(&self) -> IVec2 {
        match *self {
            Shape::Circle { center, .. } | Shape::Rect { center, .. } => center,
        }
    }

    pub fn set_center(&mut self, new_center: IVec2) {
        match self {
            Shape::Circle { center, .. } | Shape::Rect { center, .. } => *center = new_center,
        }
    }

    /// Same shape with its center shifted by `offset` (saturating)
    pub fn translated(&self, offset: IVec2) -> Self {
        let mut shape = *self;
        shape.set_center(self.center().saturating_add(offset));
        shape
    }

    /// World-space collider for an owner at `pos` (position truncated toward zero)
    pub fn at(&self, pos: DVec2) -> Self {
        self.translated(pos.as_ivec2())
    }

    /// Closed bounds `(min, max)` of the shape, clamped to the `i32` plane
    pub fn bounds(&self) -> (IVec2, IVec2) {
        let b = Bounds::of(self);
        (
            IVec2::new(narrow(b.left), narrow(b.top)),
            IVec2::new(narrow(b.right), narrow(b.bottom)),
        )
    }
}

#[inline]
fn narrow(v: i64) -> i32 {
    v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Closed integer interval box
#[derive(Debug, Clone, Copy)]
struct Bounds {
    left: i64,
    right: i64,
    top: i64,
    bottom: i64,
}

impl Bounds {
    fn of(shape: &Shape) -> Self {
        let (center, half_w, half_h, w, h) = match *shape {
            Shape::Rect {
                center,
                width,
                height,
            } => {
                let (w, h) = (width.max(0) as i64, height.max(0) as i64);
                (center, w / 2, h / 2, w, h)
            }
            Shape::Circle { center, radius } => {
                let r = radius.max(0) as i64;
                (center, r, r, 2 * r, 2 * r)
            }
        };
        let left = center.x as i64 - half_w;
        let top = center.y as i64 - half_h;
        Self {
            left,
            right: left + w,
            top,
            bottom: top + h,
        }
    }

    /// Nearest point inside the box to `p` (p itself when already inside)
    fn clamp(&self, p: (i64, i64)) -> (i64, i64) {
        (p.0.clamp(self.left, self.right), p.1.clamp(self.top, self.bottom))
    }

    fn intersects(&self, other: &Bounds) -> bool {
        self.right >= other.left
            && self.left <= other.right
            && self.bottom >= other.top
            && self.top <= other.bottom
    }
}

#[inline]
fn widen(p: IVec2) -> (i64, i64) {
    (p.x as i64, p.y as i64)
}

/// Squared distance; exact for any two points in the `i32` plane
#[inline]
fn dist_sq(a: (i64, i64), b: (i64, i64)) -> i128 {
    let dx = (a.0 - b.0) as i128;
    let dy = (a.1 - b.1) as i128;
    dx * dx + dy * dy
}

fn circle_rect(center: IVec2, radius: i32, rect: &Shape) -> bool {
    let r = radius.max(0) as i128;
    let center = widen(center);
    let closest = Bounds::of(rect).clamp(center);
    dist_sq(center, closest) <= r * r
}

/// Check whether two world-space shapes overlap
///
/// Symmetric in outcome: `overlaps(a, b) == overlaps(b, a)`.
pub fn overlaps(a: &Shape, b: &Shape) -> bool {
    match (*a, *b) {
        (
            Shape::Circle { center, radius },
            Shape::Circle {
                center: other_center,
                radius: other_radius,
            },
        ) => {
            let reach = radius.max(0) as i128 + other_radius.max(0) as i128;
            dist_sq(widen(center), widen(other_center)) <= reach * reach
        }
        (Shape::Circle { center, radius }, rect @ Shape::Rect { .. })
        | (rect @ Shape::Rect { .. }, Shape::Circle { center, radius }) => {
            circle_rect(center, radius, &rect)
        }
        (Shape::Rect { .. }, Shape::Rect { .. }) => Bounds::of(a).intersects(&Bounds::of(b)),
    }
}

impl Shape {
    /// Method form of [`overlaps`]
    #[inline]
    pub fn collides_with(&self, other: &Shape) -> bool {
        overlaps(self, other)
    }
}
