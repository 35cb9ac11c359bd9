use super::Vec3;
use crate::AABB;
use serde::{Deserialize, Serialize};

/// Cubic bezier defined by its endpoints and the offsets to the inner control points
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Spline3 {
    pub from: Vec3,
    pub to: Vec3,
    pub from_derivative: Vec3,
    pub to_derivative: Vec3,
}

impl Default for Spline3 {
    fn default() -> Self {
        Self {
            from: Vec3::ZERO,
            to: Vec3::ZERO,
            from_derivative: Vec3::ZERO,
            to_derivative: Vec3::ZERO,
        }
    }
}

// 5 point Gauss-Legendre abscissas and weights on [-1, 1]
const GAUSS_X: [f32; 5] = [
    0.0,
    -0.538_469_3,
    0.538_469_3,
    -0.906_179_85,
    0.906_179_85,
];
const GAUSS_W: [f32; 5] = [
    0.568_888_9,
    0.478_628_67,
    0.478_628_67,
    0.236_926_88,
    0.236_926_88,
];
const LENGTH_SUBDIVISIONS: usize = 8;

impl Spline3 {
    /// Builds a spline from the four classic control points a, b, c, d
    pub fn from_points(a: Vec3, b: Vec3, c: Vec3, d: Vec3) -> Self {
        Self {
            from: a,
            to: d,
            from_derivative: b - a,
            to_derivative: d - c,
        }
    }

    /// The four classic control points a, b, c, d
    pub fn control_points(&self) -> [Vec3; 4] {
        [
            self.from,
            self.from + self.from_derivative,
            self.to - self.to_derivative,
            self.to,
        ]
    }

    #[inline]
    pub fn get(&self, t: f32) -> Vec3 {
        (1.0 - t).powi(3) * self.from
            + 3.0 * t * (1.0 - t).powi(2) * (self.from + self.from_derivative)
            + 3.0 * t.powi(2) * (1.0 - t) * (self.to - self.to_derivative)
            + t.powi(3) * self.to
    }

    #[inline]
    pub fn derivative(&self, t: f32) -> Vec3 {
        -3.0 * (t - 1.0).powi(2) * self.from
            + 3.0 * (t - 1.0) * (3.0 * t - 1.0) * (self.from + self.from_derivative)
            + 3.0 * t * (2.0 - 3.0 * t) * (self.to - self.to_derivative)
            + 3.0 * t.powi(2) * self.to
    }

    /// Same curve travelled in the opposite direction
    pub fn reverse(&self) -> Spline3 {
        Spline3 {
            from: self.to,
            to: self.from,
            from_derivative: -self.to_derivative,
            to_derivative: -self.from_derivative,
        }
    }

    #[allow(non_snake_case)]
    pub fn split_at(&self, t: f32) -> (Spline3, Spline3) {
        // https://upload.wikimedia.org/wikipedia/commons/1/11/Bezier_rec.png
        let mid = self.get(t);
        let H = (self.to - self.to_derivative) * t + (self.from + self.from_derivative) * (1.0 - t);

        let L2 = self.from + self.from_derivative * t;
        let L3 = L2 + (H - L2) * t;

        let from_spline = Spline3 {
            from: self.from,
            to: mid,
            from_derivative: L2 - self.from,
            to_derivative: mid - L3,
        };

        let R3 = self.to - self.to_derivative * (1.0 - t);
        let R2 = R3 + (H - R3) * (1.0 - t);

        let to_spline = Spline3 {
            from: mid,
            to: self.to,
            from_derivative: R2 - mid,
            to_derivative: self.to - R3,
        };

        (from_spline, to_spline)
    }

    /// Sub curve between t0 and t1, with t0 <= t1
    pub fn cut(&self, t0: f32, t1: f32) -> Spline3 {
        let t0 = t0.clamp(0.0, 1.0);
        let t1 = t1.clamp(0.0, 1.0);
        if t1 <= 0.0 {
            return self.split_at(0.0).0;
        }
        let (head, _) = self.split_at(t1);
        if t0 <= 0.0 {
            return head;
        }
        head.split_at(t0 / t1).1
    }

    /// Bounding box of the control points, which contains the curve
    pub fn wide_bbox(&self) -> AABB {
        let [a, b, c, d] = self.control_points();
        let mi = a.min(b).min(c).min(d);
        let ma = a.max(b).max(c).max(d);
        AABB::new_ll_ur(mi.xy(), ma.xy())
    }

    /// Rectified length between t0 and t1
    pub fn arc_length(&self, t0: f32, t1: f32) -> f32 {
        if t1 <= t0 {
            return 0.0;
        }
        let step = (t1 - t0) / LENGTH_SUBDIVISIONS as f32;
        let mut total = 0.0;
        for i in 0..LENGTH_SUBDIVISIONS {
            let a = t0 + step * i as f32;
            let half = step * 0.5;
            let mid = a + half;
            let mut s = 0.0;
            for (x, w) in GAUSS_X.iter().zip(GAUSS_W.iter()) {
                s += w * self.derivative(mid + half * x).mag();
            }
            total += s * half;
        }
        total
    }

    pub fn length(&self) -> f32 {
        self.arc_length(0.0, 1.0)
    }

    pub fn points(&self, n: usize) -> impl Iterator<Item = Vec3> + '_ {
        let n = n.max(2);
        (0..n).map(move |i| {
            let c = i as f32 / (n - 1) as f32;

            self.get(c)
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::{vec3, Spline3};

    #[test]
    fn test_straight_length() {
        let s = Spline3::from_points(
            vec3(0.0, 0.0, 0.0),
            vec3(1.0, 0.0, 0.0),
            vec3(2.0, 0.0, 0.0),
            vec3(3.0, 0.0, 0.0),
        );
        assert!((s.length() - 3.0).abs() < 1e-4);
        assert!((s.arc_length(0.0, 0.5) - 1.5).abs() < 1e-4);
    }

    #[test]
    fn test_cut_endpoints() {
        let s = Spline3::from_points(
            vec3(0.0, 0.0, 0.0),
            vec3(0.0, 5.0, 0.0),
            vec3(5.0, 5.0, 0.0),
            vec3(5.0, 0.0, 0.0),
        );
        let c = s.cut(0.25, 0.75);
        assert!(c.from.approx_eq(s.get(0.25)));
        assert!(c.to.approx_eq(s.get(0.75)));
        assert!(c.get(0.5).approx_eq(s.get(0.5)));
    }
}
