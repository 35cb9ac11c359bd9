use crate::{Radians, Spline3, Vec2, Vec3, AABB};
use serde::{Deserialize, Serialize};

/// Below this length a trajectory carries no usable direction
pub const DEGENERATE_LENGTH: f32 = 1e-4;

const TRAVEL_ITERATIONS: usize = 24;
const TRAVEL_TOLERANCE: f32 = 1e-5;

/// A straight segment, or an infinite line through start and end when `is_section` is false
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StraightTrajectory {
    pub start: Vec3,
    pub end: Vec3,
    #[serde(default = "yes")]
    pub is_section: bool,
}

fn yes() -> bool {
    true
}

impl StraightTrajectory {
    pub fn new(start: Vec3, end: Vec3) -> Self {
        Self {
            start,
            end,
            is_section: true,
        }
    }

    pub fn infinite(start: Vec3, end: Vec3) -> Self {
        Self {
            start,
            end,
            is_section: false,
        }
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }
}

/// Cubic bezier with its arc length computed once
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "Spline3", into = "Spline3")]
pub struct BezierTrajectory {
    spline: Spline3,
    length: f32,
}

impl From<Spline3> for BezierTrajectory {
    fn from(spline: Spline3) -> Self {
        Self {
            length: spline.length(),
            spline,
        }
    }
}

impl From<BezierTrajectory> for Spline3 {
    fn from(b: BezierTrajectory) -> Self {
        b.spline
    }
}

impl BezierTrajectory {
    pub fn new(a: Vec3, b: Vec3, c: Vec3, d: Vec3) -> Self {
        Spline3::from_points(a, b, c, d).into()
    }

    #[inline]
    pub fn spline(&self) -> &Spline3 {
        &self.spline
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.length
    }

    fn travel(&self, start_t: f32, distance: f32) -> f32 {
        if self.length < DEGENERATE_LENGTH {
            return start_t.clamp(0.0, 1.0);
        }
        let target = self.spline.arc_length(0.0, start_t.clamp(0.0, 1.0)) + distance;
        if target <= 0.0 {
            return 0.0;
        }
        if target >= self.length {
            return 1.0;
        }

        let mut lo = 0.0;
        let mut hi = 1.0;
        let mut t = target / self.length;
        for _ in 0..TRAVEL_ITERATIONS {
            let f = self.spline.arc_length(0.0, t) - target;
            if f.abs() < TRAVEL_TOLERANCE {
                break;
            }
            if f > 0.0 {
                hi = t;
            } else {
                lo = t;
            }
            let speed = self.spline.derivative(t).mag();
            let newton = t - f / speed;
            t = if speed > f32::EPSILON && newton > lo && newton < hi {
                newton
            } else {
                (lo + hi) * 0.5
            };
        }
        t.clamp(0.0, 1.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Trajectory {
    Straight(StraightTrajectory),
    Bezier(BezierTrajectory),
}

impl From<StraightTrajectory> for Trajectory {
    fn from(s: StraightTrajectory) -> Self {
        Trajectory::Straight(s)
    }
}

impl From<BezierTrajectory> for Trajectory {
    fn from(b: BezierTrajectory) -> Self {
        Trajectory::Bezier(b)
    }
}

impl Trajectory {
    pub fn straight(start: Vec3, end: Vec3) -> Self {
        Trajectory::Straight(StraightTrajectory::new(start, end))
    }

    pub fn bezier(a: Vec3, b: Vec3, c: Vec3, d: Vec3) -> Self {
        Trajectory::Bezier(BezierTrajectory::new(a, b, c, d))
    }

    pub fn start(&self) -> Vec3 {
        match self {
            Trajectory::Straight(s) => s.start,
            Trajectory::Bezier(b) => b.spline.from,
        }
    }

    pub fn end(&self) -> Vec3 {
        match self {
            Trajectory::Straight(s) => s.end,
            Trajectory::Bezier(b) => b.spline.to,
        }
    }

    pub fn position(&self, t: f32) -> Vec3 {
        match self {
            Trajectory::Straight(s) => s.start.lerp(s.end, t),
            Trajectory::Bezier(b) => b.spline.get(t),
        }
    }

    /// Unit direction of travel at t, zero for degenerate trajectories
    pub fn tangent(&self, t: f32) -> Vec3 {
        let d = match self {
            Trajectory::Straight(s) => s.end - s.start,
            Trajectory::Bezier(b) => {
                let d = b.spline.derivative(t.clamp(0.0, 1.0));
                if d.mag2() > f32::EPSILON {
                    d
                } else {
                    // cusp at an endpoint when a control point coincides with it
                    b.spline.to - b.spline.from
                }
            }
        };
        d.try_normalize().unwrap_or(Vec3::ZERO)
    }

    /// Direction of travel at t projected on the ground plane
    pub fn tangent_flat(&self, t: f32) -> Vec2 {
        self.tangent(t).xy().try_normalize().unwrap_or(Vec2::X)
    }

    pub fn start_direction(&self) -> Vec2 {
        self.tangent_flat(0.0)
    }

    pub fn end_direction(&self) -> Vec2 {
        self.tangent_flat(1.0)
    }

    /// Unsigned angle between the start and end directions
    pub fn delta_angle(&self) -> Radians {
        Radians(self.start_direction().angle(self.end_direction()).abs())
    }

    pub fn length(&self) -> f32 {
        match self {
            Trajectory::Straight(s) => s.length(),
            Trajectory::Bezier(b) => b.length,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.length() < DEGENERATE_LENGTH
    }

    pub fn is_section(&self) -> bool {
        match self {
            Trajectory::Straight(s) => s.is_section,
            Trajectory::Bezier(_) => true,
        }
    }

    /// Parameter reached after travelling `distance` along the curve from `start_t`.
    /// Negative distances travel backwards. The result is clamped to [0; 1].
    pub fn travel(&self, start_t: f32, distance: f32) -> f32 {
        match self {
            Trajectory::Straight(s) => {
                let l = s.length();
                if l < DEGENERATE_LENGTH {
                    return start_t.clamp(0.0, 1.0);
                }
                (start_t + distance / l).clamp(0.0, 1.0)
            }
            Trajectory::Bezier(b) => b.travel(start_t, distance),
        }
    }

    /// Arc length between t0 and t1
    pub fn length_between(&self, t0: f32, t1: f32) -> f32 {
        let (t0, t1) = if t0 <= t1 { (t0, t1) } else { (t1, t0) };
        match self {
            Trajectory::Straight(s) => s.length() * (t1 - t0),
            Trajectory::Bezier(b) => b.spline.arc_length(t0.max(0.0), t1.min(1.0)),
        }
    }

    /// Part of the trajectory between t0 and t1, inverted when t0 > t1
    pub fn cut(&self, t0: f32, t1: f32) -> Trajectory {
        if t0 > t1 {
            return self.cut(t1, t0).invert();
        }
        match self {
            Trajectory::Straight(s) => Trajectory::Straight(StraightTrajectory {
                start: s.start.lerp(s.end, t0),
                end: s.start.lerp(s.end, t1),
                is_section: true,
            }),
            Trajectory::Bezier(b) => Trajectory::Bezier(b.spline.cut(t0, t1).into()),
        }
    }

    pub fn split(&self, t: f32) -> (Trajectory, Trajectory) {
        (self.cut(0.0, t), self.cut(t, 1.0))
    }

    pub fn invert(&self) -> Trajectory {
        match self {
            Trajectory::Straight(s) => Trajectory::Straight(StraightTrajectory {
                start: s.end,
                end: s.start,
                is_section: s.is_section,
            }),
            Trajectory::Bezier(b) => Trajectory::Bezier(BezierTrajectory {
                spline: b.spline.reverse(),
                length: b.length,
            }),
        }
    }

    /// Parallel trajectory moved to the left of the travel direction by an amount
    /// linearly interpolated from `start_offset` to `end_offset`
    pub fn shift(&self, start_offset: f32, end_offset: f32) -> Trajectory {
        match self {
            Trajectory::Straight(s) => {
                let left = (s.end - s.start)
                    .xy()
                    .try_normalize()
                    .unwrap_or(Vec2::ZERO)
                    .perp_left();
                Trajectory::Straight(StraightTrajectory {
                    start: s.start + (left * start_offset).z0(),
                    end: s.end + (left * end_offset).z0(),
                    is_section: s.is_section,
                })
            }
            Trajectory::Bezier(b) => {
                let sp = &b.spline;
                let from = sp.from + (self.start_direction().perp_left() * start_offset).z0();
                let to = sp.to + (self.end_direction().perp_left() * end_offset).z0();
                let old_chord = sp.from.distance(sp.to);
                let k = if old_chord > DEGENERATE_LENGTH {
                    from.distance(to) / old_chord
                } else {
                    1.0
                };
                Trajectory::Bezier(
                    Spline3 {
                        from,
                        to,
                        from_derivative: sp.from_derivative * k,
                        to_derivative: sp.to_derivative * k,
                    }
                    .into(),
                )
            }
        }
    }

    /// Same trajectory with every point moved vertically to z
    pub fn flatten_at(&self, z: f32) -> Trajectory {
        match self {
            Trajectory::Straight(s) => Trajectory::Straight(StraightTrajectory {
                start: s.start.xy().z(z),
                end: s.end.xy().z(z),
                is_section: s.is_section,
            }),
            Trajectory::Bezier(b) => Trajectory::Bezier(
                Spline3 {
                    from: b.spline.from.xy().z(z),
                    to: b.spline.to.xy().z(z),
                    from_derivative: b.spline.from_derivative.xy().z0(),
                    to_derivative: b.spline.to_derivative.xy().z0(),
                }
                .into(),
            ),
        }
    }

    /// A box that contains the whole trajectory on the ground plane
    pub fn bbox(&self) -> AABB {
        match self {
            Trajectory::Straight(s) => AABB::new(s.start.xy(), s.end.xy()),
            Trajectory::Bezier(b) => b.spline.wide_bbox(),
        }
    }

    /// Parameter of the point closest to p on the ground plane.
    /// Infinite straight lines may return a value outside of [0; 1].
    pub fn closest_t(&self, p: Vec2) -> f32 {
        match self {
            Trajectory::Straight(s) => {
                let a = s.start.xy();
                let d = s.end.xy() - a;
                let l2 = d.mag2();
                if l2 < DEGENERATE_LENGTH * DEGENERATE_LENGTH {
                    return 0.0;
                }
                let t = (p - a).dot(d) / l2;
                if s.is_section {
                    t.clamp(0.0, 1.0)
                } else {
                    t
                }
            }
            Trajectory::Bezier(b) => {
                const SAMPLES: usize = 16;
                let dist = |t: f32| b.spline.get(t).xy().distance2(p);
                let mut best = 0.0;
                let mut best_d = f32::INFINITY;
                for i in 0..=SAMPLES {
                    let t = i as f32 / SAMPLES as f32;
                    let d = dist(t);
                    if d < best_d {
                        best_d = d;
                        best = t;
                    }
                }
                // ternary search around the best sample
                let step = 1.0 / SAMPLES as f32;
                let mut lo = (best - step).max(0.0);
                let mut hi = (best + step).min(1.0);
                for _ in 0..20 {
                    let m1 = lo + (hi - lo) / 3.0;
                    let m2 = hi - (hi - lo) / 3.0;
                    if dist(m1) < dist(m2) {
                        hi = m2;
                    } else {
                        lo = m1;
                    }
                }
                (lo + hi) * 0.5
            }
        }
    }

    /// Points sampled evenly in t, endpoints included
    pub fn points(&self, n: usize) -> impl Iterator<Item = Vec3> + '_ {
        let n = n.max(2);
        (0..n).map(move |i| self.position(i as f32 / (n - 1) as f32))
    }
}

#[cfg(test)]
mod tests {
    use crate::{vec3, Trajectory};
    use quickcheck::{Arbitrary, Gen, TestResult};

    #[derive(Debug, Copy, Clone)]
    struct F3201(f32);

    impl Arbitrary for F3201 {
        fn arbitrary(g: &mut Gen) -> Self {
            let v = <u32 as Arbitrary>::arbitrary(g);
            F3201(v as f32 / u32::MAX as f32)
        }
    }

    fn curve() -> Trajectory {
        Trajectory::bezier(
            vec3(0.0, 0.0, 0.0),
            vec3(10.0, 0.0, 0.0),
            vec3(20.0, 10.0, 0.0),
            vec3(20.0, 20.0, 0.0),
        )
    }

    #[test]
    fn test_straight_basics() {
        let s = Trajectory::straight(vec3(0.0, 0.0, 0.0), vec3(10.0, 0.0, 0.0));
        assert_eq!(s.length(), 10.0);
        assert!((s.travel(0.0, 2.5) - 0.25).abs() < 1e-6);
        assert_eq!(s.travel(0.5, -20.0), 0.0);
        assert_eq!(s.travel(0.5, 20.0), 1.0);

        let left = s.shift(1.0, 1.0);
        assert!(left.start().approx_eq(vec3(0.0, 1.0, 0.0)));
        assert!(left.end().approx_eq(vec3(10.0, 1.0, 0.0)));

        let c = s.cut(0.8, 0.2);
        assert!(c.start().approx_eq(vec3(8.0, 0.0, 0.0)));
        assert!(c.end().approx_eq(vec3(2.0, 0.0, 0.0)));
    }

    #[test]
    fn test_invert_endpoints() {
        let c = curve();
        let i = c.invert();
        assert!(i.position(0.0).approx_eq(c.position(1.0)));
        assert!(i.position(1.0).approx_eq(c.position(0.0)));
        assert!((i.length() - c.length()).abs() < 1e-3);
    }

    #[test]
    fn test_bezier_shift_is_parallel() {
        let c = curve();
        let s = c.shift(2.0, 2.0);
        assert!((s.start().distance(c.start()) - 2.0).abs() < 1e-4);
        assert!((s.end().distance(c.end()) - 2.0).abs() < 1e-4);
        // shifting left of a curve turning left gives a shorter curve
        assert!(s.length() < c.length());
    }

    #[test]
    fn test_degenerate() {
        let p = vec3(3.0, 3.0, 0.0);
        let s = Trajectory::straight(p, p);
        assert!(s.is_degenerate());
        assert_eq!(s.travel(0.3, 5.0), 0.3);
        let b = Trajectory::bezier(p, p, p, p);
        assert!(b.is_degenerate());
    }

    #[test]
    fn quickcheck_cut_length() {
        let mut q = quickcheck::QuickCheck::new().tests(200);
        q.quickcheck(
            (|a: F3201, b: F3201| -> TestResult {
                let (a, b) = if a.0 <= b.0 { (a.0, b.0) } else { (b.0, a.0) };
                let c = curve();
                let cut = c.cut(a, b).length();
                let expected = c.length_between(a, b);
                TestResult::from_bool((cut - expected).abs() < 1e-2 * c.length())
            }) as fn(F3201, F3201) -> TestResult,
        );
    }

    #[test]
    fn quickcheck_travel_inverts_length() {
        let mut q = quickcheck::QuickCheck::new().tests(200);
        q.quickcheck(
            (|a: F3201, b: F3201| -> TestResult {
                let c = curve();
                let l = c.length();
                let (d1, d2) = if a.0 <= b.0 {
                    (a.0 * l, b.0 * l)
                } else {
                    (b.0 * l, a.0 * l)
                };
                let t1 = c.travel(0.0, d1);
                let t2 = c.travel(0.0, d2);
                if t1 > t2 + 1e-6 {
                    return TestResult::failed();
                }
                TestResult::from_bool((c.length_between(0.0, t1) - d1).abs() < 1e-2)
            }) as fn(F3201, F3201) -> TestResult,
        );
    }
}
