use crate::{Spline3, StraightTrajectory, Trajectory, Vec2};
use ordered_float::OrderedFloat;

const PARALLEL_EPSILON: f32 = 1e-6;
const T_EPSILON: f32 = 1e-4;
const LINE_SAMPLES: usize = 32;
const BISECT_ITERATIONS: usize = 24;
const SUBDIVIDE_MAX_DEPTH: u32 = 18;
const SUBDIVIDE_SIZE: f32 = 5e-3;

/// Parameters at which two trajectories cross on the ground plane.
/// `first_t` is along the first trajectory, `second_t` along the second one.
/// Infinite straight lines report extrapolated values outside of [0; 1].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Intersection {
    pub first_t: f32,
    pub second_t: f32,
}

impl Intersection {
    pub fn new(first_t: f32, second_t: f32) -> Self {
        Self { first_t, second_t }
    }

    pub fn swap(self) -> Self {
        Self {
            first_t: self.second_t,
            second_t: self.first_t,
        }
    }

    /// Both parameters lie within the [0; 1] range
    pub fn is_inside(&self) -> bool {
        in_unit(self.first_t) && in_unit(self.second_t)
    }

    /// Every crossing between a and b, sorted by `first_t`
    pub fn calculate(a: &Trajectory, b: &Trajectory) -> Vec<Intersection> {
        let mut v = match (a, b) {
            (Trajectory::Straight(a), Trajectory::Straight(b)) => {
                straight_straight(a, b).into_iter().collect()
            }
            (Trajectory::Straight(a), Trajectory::Bezier(b)) => line_bezier(a, b.spline()),
            (Trajectory::Bezier(a), Trajectory::Straight(b)) => line_bezier(b, a.spline())
                .into_iter()
                .map(Intersection::swap)
                .collect(),
            (Trajectory::Bezier(a), Trajectory::Bezier(b)) => bezier_bezier(a.spline(), b.spline()),
        };
        v.sort_by_key(|x| OrderedFloat(x.first_t));
        v
    }

    /// The crossing whose parameters are closest to the [0; 1] ranges, if any
    pub fn calculate_single(a: &Trajectory, b: &Trajectory) -> Option<Intersection> {
        if let (Trajectory::Straight(a), Trajectory::Straight(b)) = (a, b) {
            return straight_straight(a, b);
        }
        Self::calculate(a, b)
            .into_iter()
            .min_by_key(|x| OrderedFloat(x.out_of_range()))
    }

    fn out_of_range(&self) -> f32 {
        let d = |t: f32| (-t).max(t - 1.0).max(0.0);
        d(self.first_t) + d(self.second_t)
    }
}

#[inline]
fn in_unit(t: f32) -> bool {
    (-T_EPSILON..=1.0 + T_EPSILON).contains(&t)
}

fn straight_straight(a: &StraightTrajectory, b: &StraightTrajectory) -> Option<Intersection> {
    let p = a.start.xy();
    let r = a.end.xy() - p;
    let q = b.start.xy();
    let s = b.end.xy() - q;

    let denom = r.cross(s);
    if denom.abs() < PARALLEL_EPSILON * r.mag().max(1.0) * s.mag().max(1.0) {
        return None;
    }
    let qp = q - p;
    let t = qp.cross(s) / denom;
    let u = qp.cross(r) / denom;

    if (a.is_section && !in_unit(t)) || (b.is_section && !in_unit(u)) {
        return None;
    }
    Some(Intersection::new(t, u))
}

/// Crossings of a straight trajectory with a bezier, found by sampling the side of the
/// bezier relative to the line and bisecting each sign change
fn line_bezier(line: &StraightTrajectory, b: &Spline3) -> Vec<Intersection> {
    let p = line.start.xy();
    let r = line.end.xy() - p;
    let r2 = r.mag2();
    if r2 < PARALLEL_EPSILON {
        return vec![];
    }
    let side = |u: f32| r.cross(b.get(u).xy() - p);

    let mut hits: Vec<f32> = vec![];
    let mut prev_u = 0.0;
    let mut prev = side(0.0);
    if prev == 0.0 {
        hits.push(0.0);
    }
    for i in 1..=LINE_SAMPLES {
        let u = i as f32 / LINE_SAMPLES as f32;
        let cur = side(u);
        if cur == 0.0 {
            hits.push(u);
        } else if prev != 0.0 && (prev < 0.0) != (cur < 0.0) {
            let (mut lo, mut hi) = (prev_u, u);
            let lo_neg = prev < 0.0;
            for _ in 0..BISECT_ITERATIONS {
                let mid = (lo + hi) * 0.5;
                if (side(mid) < 0.0) == lo_neg {
                    lo = mid;
                } else {
                    hi = mid;
                }
            }
            hits.push((lo + hi) * 0.5);
        }
        prev = cur;
        prev_u = u;
    }

    hits.into_iter()
        .filter_map(|u| {
            let t = (b.get(u).xy() - p).dot(r) / r2;
            if line.is_section && !in_unit(t) {
                return None;
            }
            Some(Intersection::new(t, u))
        })
        .collect()
}

fn bezier_bezier(a: &Spline3, b: &Spline3) -> Vec<Intersection> {
    let mut out = vec![];
    subdivide(a, (0.0, 1.0), b, (0.0, 1.0), 0, &mut out);
    out.sort_by_key(|x| OrderedFloat(x.first_t));
    out.dedup_by(|x, y| {
        (x.first_t - y.first_t).abs() < 1e-3 && (x.second_t - y.second_t).abs() < 1e-3
    });
    out
}

fn subdivide(
    a: &Spline3,
    ra: (f32, f32),
    b: &Spline3,
    rb: (f32, f32),
    depth: u32,
    out: &mut Vec<Intersection>,
) {
    let ba = a.wide_bbox();
    let bb = b.wide_bbox();
    if !ba.intersects(&bb) {
        return;
    }

    let small = ba.diagonal() < SUBDIVIDE_SIZE && bb.diagonal() < SUBDIVIDE_SIZE;
    if small || depth >= SUBDIVIDE_MAX_DEPTH {
        // close enough to straight: intersect the chords
        let ca = StraightTrajectory::infinite(a.from, a.to);
        let cb = StraightTrajectory::infinite(b.from, b.to);
        let near = |t: f32| (-0.05..=1.05).contains(&t);
        let hit = straight_straight(&ca, &cb)
            .filter(|i| near(i.first_t) && near(i.second_t))
            .or_else(|| {
                (ca.start.xy().distance(cb.start.xy()) < SUBDIVIDE_SIZE)
                    .then_some(Intersection::new(0.0, 0.0))
            });
        if let Some(i) = hit {
            let lerp = |r: (f32, f32), t: f32| r.0 + (r.1 - r.0) * t.clamp(0.0, 1.0);
            out.push(Intersection::new(lerp(ra, i.first_t), lerp(rb, i.second_t)));
        }
        return;
    }

    let (a1, a2) = a.split_at(0.5);
    let (b1, b2) = b.split_at(0.5);
    let ma = (ra.0 + ra.1) * 0.5;
    let mb = (rb.0 + rb.1) * 0.5;
    subdivide(&a1, (ra.0, ma), &b1, (rb.0, mb), depth + 1, out);
    subdivide(&a1, (ra.0, ma), &b2, (mb, rb.1), depth + 1, out);
    subdivide(&a2, (ma, ra.1), &b1, (rb.0, mb), depth + 1, out);
    subdivide(&a2, (ma, ra.1), &b2, (mb, rb.1), depth + 1, out);
}

/// Signed side of p relative to the trajectory's direction at t, positive on the left
pub fn side_of(traj: &Trajectory, t: f32, p: Vec2) -> f32 {
    traj.tangent_flat(t).cross(p - traj.position(t).xy())
}

#[cfg(test)]
mod tests {
    use super::Intersection;
    use crate::{vec3, StraightTrajectory, Trajectory};

    #[test]
    fn test_straight_cross() {
        let a = Trajectory::straight(vec3(0.0, 0.0, 0.0), vec3(10.0, 0.0, 0.0));
        let b = Trajectory::straight(vec3(5.0, -5.0, 0.0), vec3(5.0, 5.0, 0.0));
        let i = Intersection::calculate(&a, &b);
        assert_eq!(i.len(), 1);
        assert!((i[0].first_t - 0.5).abs() < 1e-6);
        assert!((i[0].second_t - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_infinite_line_extrapolates() {
        let a = Trajectory::Straight(StraightTrajectory::infinite(
            vec3(0.0, 0.0, 0.0),
            vec3(1.0, 0.0, 0.0),
        ));
        let b = Trajectory::straight(vec3(5.0, -5.0, 0.0), vec3(5.0, 5.0, 0.0));
        let i = Intersection::calculate_single(&a, &b).unwrap();
        assert!((i.first_t - 5.0).abs() < 1e-5);
        assert!(!i.is_inside());

        let section = Trajectory::straight(vec3(0.0, 0.0, 0.0), vec3(1.0, 0.0, 0.0));
        assert!(Intersection::calculate_single(&section, &b).is_none());
    }

    #[test]
    fn test_parallel() {
        let a = Trajectory::straight(vec3(0.0, 0.0, 0.0), vec3(10.0, 0.0, 0.0));
        let b = Trajectory::straight(vec3(0.0, 1.0, 0.0), vec3(10.0, 1.0, 0.0));
        assert!(Intersection::calculate(&a, &b).is_empty());
    }

    #[test]
    fn test_line_bezier() {
        let arc = Trajectory::bezier(
            vec3(0.0, 0.0, 0.0),
            vec3(0.0, 10.0, 0.0),
            vec3(10.0, 10.0, 0.0),
            vec3(10.0, 0.0, 0.0),
        );
        let line = Trajectory::Straight(StraightTrajectory::infinite(
            vec3(-5.0, 3.0, 0.0),
            vec3(15.0, 3.0, 0.0),
        ));
        let hits = Intersection::calculate(&line, &arc);
        assert_eq!(hits.len(), 2);
        for h in &hits {
            assert!((arc.position(h.second_t).y - 3.0).abs() < 1e-3);
            assert!(line.position(h.first_t).approx_eq(arc.position(h.second_t)));
        }
        assert!(hits[0].first_t < hits[1].first_t);

        let swapped = Intersection::calculate(&arc, &line);
        assert_eq!(swapped.len(), 2);
    }

    #[test]
    fn test_bezier_bezier() {
        let a = Trajectory::bezier(
            vec3(0.0, 0.0, 0.0),
            vec3(3.0, 3.0, 0.0),
            vec3(7.0, 3.0, 0.0),
            vec3(10.0, 0.0, 0.0),
        );
        let b = Trajectory::bezier(
            vec3(5.0, -5.0, 0.0),
            vec3(5.0, 0.0, 0.0),
            vec3(5.0, 5.0, 0.0),
            vec3(5.0, 10.0, 0.0),
        );
        let hits = Intersection::calculate(&a, &b);
        assert_eq!(hits.len(), 1);
        let h = hits[0];
        assert!(a.position(h.first_t).xy().distance(b.position(h.second_t).xy()) < 1e-2);
    }
}
