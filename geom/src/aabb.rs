use super::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[repr(C)]
pub struct AABB {
    pub ll: Vec2,
    pub ur: Vec2,
}

impl AABB {
    /// Create a new `AABB`.
    pub const fn new_ll_ur(ll: Vec2, ur: Vec2) -> Self {
        AABB { ll, ur }
    }

    /// Create a new `AABB` from two arbitrary corners.
    #[inline]
    pub fn new(a: Vec2, b: Vec2) -> Self {
        AABB {
            ll: a.min(b),
            ur: a.max(b),
        }
    }

    /// Smallest `AABB` containing every point, None if there are no points
    pub fn from_points(points: impl IntoIterator<Item = Vec2>) -> Option<Self> {
        let mut it = points.into_iter();
        let first = it.next()?;
        let mut aabb = AABB::new(first, first);
        for p in it {
            aabb.ll = aabb.ll.min(p);
            aabb.ur = aabb.ur.max(p);
        }
        Some(aabb)
    }

    #[inline]
    pub fn w(&self) -> f32 {
        self.ur.x - self.ll.x
    }

    #[inline]
    pub fn h(&self) -> f32 {
        self.ur.y - self.ll.y
    }

    #[inline]
    pub fn union(self, other: AABB) -> AABB {
        AABB {
            ll: self.ll.min(other.ll),
            ur: self.ur.max(other.ur),
        }
    }

    #[inline]
    pub fn area(&self) -> f32 {
        self.w() * self.h()
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.ll * 0.5 + self.ur * 0.5
    }

    #[inline]
    pub fn diagonal(&self) -> f32 {
        (self.ur - self.ll).mag()
    }

    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        self.ll.x <= p.x && p.x <= self.ur.x && self.ll.y <= p.y && p.y <= self.ur.y
    }

    #[inline]
    pub fn intersects(&self, other: &AABB) -> bool {
        self.ll.x <= other.ur.x
            && other.ll.x <= self.ur.x
            && self.ll.y <= other.ur.y
            && other.ll.y <= self.ur.y
    }

    /// Corners in counter-clockwise order starting from ll
    pub fn corners(&self) -> [Vec2; 4] {
        [
            self.ll,
            Vec2::new(self.ur.x, self.ll.y),
            self.ur,
            Vec2::new(self.ll.x, self.ur.y),
        ]
    }
}
