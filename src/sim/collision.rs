//! Overlap tests between hitboxes
//!
//! Everything here is axis-aligned or circular: the player is a circle, hazards are
//! circles or axis-aligned rectangles. Positions are hitbox centres.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Collision shape, centred on its owner's position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Hitbox {
    Circle { radius: f32 },
    Rect { half_extents: Vec2 },
}

impl Hitbox {
    /// Half-size of the shape's bounding box
    pub fn half_extents(&self) -> Vec2 {
        match *self {
            Hitbox::Circle { radius } => Vec2::splat(radius),
            Hitbox::Rect { half_extents } => half_extents,
        }
    }
}

/// Signed distance from `p` to a circle (negative inside)
#[inline]
pub fn sd_circle(p: Vec2, center: Vec2, radius: f32) -> f32 {
    (p - center).length() - radius
}

/// Closest point to `p` on (or in) an axis-aligned rectangle
#[inline]
pub fn closest_point_on_rect(p: Vec2, center: Vec2, half_extents: Vec2) -> Vec2 {
    p.clamp(center - half_extents, center + half_extents)
}

#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    sd_circle(a, b, ra + rb) < 0.0
}

#[inline]
pub fn circle_rect_overlap(c: Vec2, radius: f32, rect_center: Vec2, half_extents: Vec2) -> bool {
    let closest = closest_point_on_rect(c, rect_center, half_extents);
    (c - closest).length_squared() < radius * radius
}

#[inline]
pub fn rects_overlap(a: Vec2, ha: Vec2, b: Vec2, hb: Vec2) -> bool {
    let d = (a - b).abs();
    d.x < ha.x + hb.x && d.y < ha.y + hb.y
}

/// Whether two positioned hitboxes overlap (touching edges do not count)
pub fn overlaps(a_pos: Vec2, a: Hitbox, b_pos: Vec2, b: Hitbox) -> bool {
    match (a, b) {
        (Hitbox::Circle { radius: ra }, Hitbox::Circle { radius: rb }) => {
            circles_overlap(a_pos, ra, b_pos, rb)
        }
        (Hitbox::Circle { radius }, Hitbox::Rect { half_extents }) => {
            circle_rect_overlap(a_pos, radius, b_pos, half_extents)
        }
        (Hitbox::Rect { half_extents }, Hitbox::Circle { radius }) => {
            circle_rect_overlap(b_pos, radius, a_pos, half_extents)
        }
        (Hitbox::Rect { half_extents: ha }, Hitbox::Rect { half_extents: hb }) => {
            rects_overlap(a_pos, ha, b_pos, hb)
        }
    }
}

/// The playfield rectangle, from the origin to (width, height)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width, self.height) * 0.5
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= 0.0 && p.x <= self.width && p.y >= 0.0 && p.y <= self.height
    }

    /// Clamp a centre so a hitbox of `half_extents` stays inside
    pub fn clamp_inside(&self, p: Vec2, half_extents: Vec2) -> Vec2 {
        let min = half_extents;
        let max = (Vec2::new(self.width, self.height) - half_extents).max(min);
        p.clamp(min, max)
    }

    /// True once no part of the hitbox is inside the playfield
    pub fn is_fully_outside(&self, p: Vec2, hitbox: Hitbox) -> bool {
        let h = hitbox.half_extents();
        p.x + h.x <= 0.0 || p.x - h.x >= self.width || p.y + h.y <= 0.0 || p.y - h.y >= self.height
    }
}
