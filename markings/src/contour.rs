use geom::{Intersection, Polygon, StraightTrajectory, Trajectory, Vec2, Vec3, AABB};
use itertools::Itertools;

const BEZIER_RING_SAMPLES: usize = 8;
const JOIN_EPSILON: f32 = 1e-3;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PartKind {
    /// Original edge, with its index in the edge list the contour was built from
    Edge(usize),
    /// Corner rounding inserted between two edges
    Rounding,
    /// Straight filler joining two offset edges that do not meet
    Connector,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ContourPart {
    pub trajectory: Trajectory,
    pub kind: PartKind,
}

/// Closed ring of trajectories, the end of each part is the start of the next one
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Contour {
    parts: Vec<ContourPart>,
}

impl Contour {
    pub fn new(edges: impl IntoIterator<Item = Trajectory>) -> Self {
        Self {
            parts: edges
                .into_iter()
                .enumerate()
                .map(|(i, trajectory)| ContourPart {
                    trajectory,
                    kind: PartKind::Edge(i),
                })
                .collect(),
        }
    }

    /// Closed polygon from its corners
    pub fn from_points(points: &[Vec3]) -> Self {
        Self::new(
            points
                .iter()
                .chain(points.first())
                .tuple_windows()
                .map(|(&a, &b)| Trajectory::straight(a, b)),
        )
    }

    pub fn parts(&self) -> &[ContourPart] {
        &self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn trajectories(&self) -> impl Iterator<Item = &Trajectory> {
        self.parts.iter().map(|p| &p.trajectory)
    }

    /// Original edge with the given index, wrapping around
    pub fn edge(&self, index: usize) -> Option<&Trajectory> {
        let n = self.edge_count();
        if n == 0 {
            return None;
        }
        let index = index % n;
        self.parts
            .iter()
            .find(|p| p.kind == PartKind::Edge(index))
            .map(|p| &p.trajectory)
    }

    pub fn edge_count(&self) -> usize {
        self.parts
            .iter()
            .filter(|p| matches!(p.kind, PartKind::Edge(_)))
            .count()
    }

    pub fn is_closed(&self) -> bool {
        let (Some(first), Some(last)) = (self.parts.first(), self.parts.last()) else {
            return false;
        };
        self.parts
            .windows(2)
            .all(|w| w[0].trajectory.end().is_close(w[1].trajectory.start(), JOIN_EPSILON))
            && last.trajectory.end().is_close(first.trajectory.start(), JOIN_EPSILON)
    }

    /// Sampled outline, without repeating the first point
    pub fn ring(&self) -> Vec<Vec2> {
        let mut ring = Vec::with_capacity(self.parts.len() * 2);
        for p in &self.parts {
            match p.trajectory {
                Trajectory::Straight(_) => ring.push(p.trajectory.start().xy()),
                Trajectory::Bezier(_) => {
                    for i in 0..BEZIER_RING_SAMPLES {
                        let t = i as f32 / BEZIER_RING_SAMPLES as f32;
                        ring.push(p.trajectory.position(t).xy());
                    }
                }
            }
        }
        ring
    }

    pub fn polygon(&self) -> Polygon {
        Polygon(self.ring())
    }

    pub fn signed_area(&self) -> f32 {
        self.polygon().signed_area()
    }

    pub fn area(&self) -> f32 {
        self.signed_area().abs()
    }

    pub fn is_clockwise(&self) -> bool {
        self.signed_area() < 0.0
    }

    /// Too few parts or no area to fill
    pub fn is_degenerate(&self) -> bool {
        self.parts.len() < 2 || self.area() < 1e-4
    }

    pub fn contains(&self, p: Vec2) -> bool {
        self.polygon().contains(p)
    }

    pub fn bbox(&self) -> Option<AABB> {
        self.parts
            .iter()
            .map(|p| p.trajectory.bbox())
            .reduce(AABB::union)
    }

    /// Mean height of the part starts
    pub fn height(&self) -> f32 {
        if self.parts.is_empty() {
            return 0.0;
        }
        self.parts
            .iter()
            .map(|p| p.trajectory.start().z)
            .sum::<f32>()
            / self.parts.len() as f32
    }

    /// Contour moved inwards by `distance`. Neighbouring parts are trimmed or extended so
    /// they still meet, gaps that cannot be closed get a straight connector.
    pub fn offset(&self, distance: f32) -> Contour {
        if distance.abs() < 1e-6 || self.parts.len() < 2 {
            return self.clone();
        }
        let inward = if self.is_clockwise() { -distance } else { distance };
        let shifted: Vec<ContourPart> = self
            .parts
            .iter()
            .map(|p| ContourPart {
                trajectory: p.trajectory.shift(inward, inward),
                kind: p.kind,
            })
            .collect();

        let n = shifted.len();
        let mut starts = vec![0.0f32; n];
        let mut ends = vec![1.0f32; n];
        let mut connect = vec![false; n];

        for i in 0..n {
            let j = (i + 1) % n;
            let a = &shifted[i].trajectory;
            let b = &shifted[j].trajectory;
            if a.end().is_close(b.start(), JOIN_EPSILON) {
                continue;
            }
            let both_straight = matches!(
                (a, b),
                (Trajectory::Straight(_), Trajectory::Straight(_))
            );
            let hit = Intersection::calculate_single(&extended(a), &extended(b))
                .filter(|h| h.first_t > starts[i] && h.second_t < ends[j])
                .filter(|h| both_straight || h.is_inside());
            match hit {
                Some(h) => {
                    ends[i] = h.first_t;
                    starts[j] = h.second_t;
                }
                None => connect[i] = true,
            }
        }

        let mut parts = Vec::with_capacity(n);
        for (i, p) in shifted.iter().enumerate() {
            if ends[i] - starts[i] > 1e-4 {
                parts.push(ContourPart {
                    trajectory: p.trajectory.cut(starts[i], ends[i]),
                    kind: p.kind,
                });
            }
            if connect[i] {
                let j = (i + 1) % n;
                let from = p.trajectory.position(ends[i]);
                let to = shifted[j].trajectory.position(starts[j]);
                parts.push(ContourPart {
                    trajectory: Trajectory::straight(from, to),
                    kind: PartKind::Connector,
                });
            }
        }

        let c = Contour { parts };
        // an offset larger than the contour brings parts closer than distance to the original
        let min_dist = distance.abs() * 0.9;
        let too_close = c.ring().into_iter().any(|p| {
            self.trajectories()
                .any(|o| o.position(o.closest_t(p)).xy().distance(p) < min_dist)
        });
        if too_close || c.is_degenerate() || c.is_clockwise() != self.is_clockwise() {
            log::debug!("contour vanished when offset by {}", distance);
            return Contour::default();
        }
        c
    }

    /// Replaces every corner sharper than `min_angle` (radians) with a circular-like bezier
    /// of the given radius, when both neighbouring parts are long enough
    pub fn round_corners(&self, radius: f32, min_angle: f32) -> Contour {
        let n = self.parts.len();
        if radius <= 0.0 || n < 2 {
            return self.clone();
        }

        let mut start_trim = vec![0.0f32; n];
        let mut end_trim = vec![0.0f32; n];
        let mut corners: Vec<Option<(Vec2, Vec2, f32)>> = vec![None; n];

        for i in 0..n {
            let j = (i + 1) % n;
            let a = &self.parts[i].trajectory;
            let b = &self.parts[j].trajectory;
            let din = a.end_direction();
            let dout = b.start_direction();
            let theta = din.angle(dout).abs();
            if theta < min_angle {
                continue;
            }
            let d = radius * (theta * 0.5).tan();
            let free_a = a.length() * 0.5;
            let free_b = b.length() * 0.5;
            if d > free_a || d > free_b || !d.is_finite() {
                continue;
            }
            end_trim[i] = d;
            start_trim[j] = d;
            let handle = 4.0 / 3.0 * (theta * 0.25).tan() * radius;
            corners[i] = Some((din, dout, handle));
        }

        let cut: Vec<Trajectory> = self
            .parts
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let t = &p.trajectory;
                let t0 = t.travel(0.0, start_trim[i]);
                let t1 = t.travel(1.0, -end_trim[i]);
                t.cut(t0, t1)
            })
            .collect();

        let mut parts = Vec::with_capacity(n * 2);
        for i in 0..n {
            parts.push(ContourPart {
                trajectory: cut[i],
                kind: self.parts[i].kind,
            });
            if let Some((din, dout, handle)) = corners[i] {
                let a = cut[i].end();
                let b = cut[(i + 1) % n].start();
                parts.push(ContourPart {
                    trajectory: Trajectory::bezier(
                        a,
                        a + (din * handle).z0(),
                        b - (dout * handle).z0(),
                        b,
                    ),
                    kind: PartKind::Rounding,
                });
            }
        }
        Contour { parts }
    }
}

/// Straight trajectories become infinite lines so neighbours can be extended to meet
fn extended(t: &Trajectory) -> Trajectory {
    match t {
        Trajectory::Straight(s) => Trajectory::Straight(StraightTrajectory::infinite(s.start, s.end)),
        Trajectory::Bezier(_) => *t,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geom::vec3;

    fn square() -> Contour {
        Contour::from_points(&[
            vec3(0.0, 0.0, 0.0),
            vec3(10.0, 0.0, 0.0),
            vec3(10.0, 10.0, 0.0),
            vec3(0.0, 10.0, 0.0),
        ])
    }

    #[test]
    fn test_square_basics() {
        let c = square();
        assert!(c.is_closed());
        assert!((c.area() - 100.0).abs() < 1e-3);
        assert!(!c.is_clockwise());
        assert!(c.contains(Vec2::new(5.0, 5.0)));
        assert_eq!(c.edge_count(), 4);
        assert!(c.edge(5).is_some());
    }

    #[test]
    fn test_offset_inwards() {
        let c = square().offset(1.0);
        assert!(c.is_closed());
        assert!((c.area() - 64.0).abs() < 1e-2);

        assert!(square().offset(6.0).is_empty());
    }

    #[test]
    fn test_round_corners() {
        let c = square().round_corners(2.0, 0.01);
        assert_eq!(c.len(), 8);
        assert!(c.is_closed());
        assert_eq!(c.edge_count(), 4);
        // a quarter circle of radius 2 removes about (4 - pi) per corner
        let expected = 100.0 - 4.0 * (4.0 - std::f32::consts::PI);
        assert!((c.area() - expected).abs() < 0.3);
    }

    #[test]
    fn test_radius_too_large_keeps_corners() {
        let c = square().round_corners(50.0, 0.01);
        assert_eq!(c.len(), 4);
    }
}
