use crate::{Vec2, AABB};
use serde::{Deserialize, Serialize};

/// A closed ring of points, the last point is implicitly connected to the first
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Polygon(pub Vec<Vec2>);

impl Polygon {
    pub fn contains(&self, p: Vec2) -> bool {
        let nvert = self.0.len();
        if nvert < 3 {
            return false;
        }

        let mut j = nvert - 1;
        let mut c = false;

        for i in 0..nvert {
            let verti = self.0[i];
            let vertj = self.0[j];
            let off = vertj - verti;

            let vip = p - verti;
            let vjp = p - vertj;

            if ((vip.y < 0.0) != (vjp.y < 0.0))
                && (vip.x * off.y.abs() < off.x * vip.y * off.y.signum())
            {
                c = !c;
            }
            j = i;
        }
        c
    }

    /// Shoelace formula, positive when the ring is counter-clockwise
    pub fn signed_area(&self) -> f32 {
        let n = self.0.len();
        if n < 3 {
            return 0.0;
        }
        let mut s = 0.0;
        for i in 0..n {
            let a = self.0[i];
            let b = self.0[(i + 1) % n];
            s += a.cross(b);
        }
        s * 0.5
    }

    pub fn area(&self) -> f32 {
        self.signed_area().abs()
    }

    pub fn is_clockwise(&self) -> bool {
        self.signed_area() < 0.0
    }

    pub fn make_clockwise(&mut self) {
        if !self.is_clockwise() {
            self.0.reverse();
        }
    }

    pub fn bbox(&self) -> Option<AABB> {
        AABB::from_points(self.0.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vec2> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Vec2] {
        self.0.as_slice()
    }
}
