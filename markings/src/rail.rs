use crate::contour::Contour;
use crate::style_helper::MAX_ITEMS;
use geom::{Trajectory, Vec2, Vec3, AABB};

/// Guide along which the repeated items of a filler are laid out
#[derive(Clone, Debug, PartialEq)]
pub struct RailLine {
    parts: Vec<Trajectory>,
}

fn control_points(t: &Trajectory) -> [Vec3; 4] {
    match t {
        Trajectory::Straight(s) => {
            let d = (s.end - s.start) / 3.0;
            [s.start, s.start + d, s.end - d, s.end]
        }
        Trajectory::Bezier(b) => b.spline().control_points(),
    }
}

impl RailLine {
    pub fn new(parts: Vec<Trajectory>) -> Self {
        Self { parts }
    }

    /// Straight rail along `direction` through the centre of the box, covering all of it
    pub fn fixed(bbox: AABB, direction: Vec2, z: f32) -> Self {
        let c = bbox.center();
        let h = bbox.diagonal() * 0.5 + 1.0;
        let d = direction.try_normalize().unwrap_or(Vec2::X);
        Self::new(vec![Trajectory::straight((c - d * h).z(z), (c + d * h).z(z))])
    }

    /// Middle line between two edges of the contour, extended along its end
    /// tangents so it covers the box. None when an edge is missing or both edges meet.
    pub fn follow(contour: &Contour, left: usize, right: usize, bbox: AABB, z: f32) -> Option<Self> {
        let a = contour.edge(left)?.flatten_at(z);
        let b = contour.edge(right)?.flatten_at(z).invert();
        let pa = control_points(&a);
        let pb = control_points(&b);
        let mid = |i: usize| (pa[i] + pb[i]) * 0.5;
        let middle = Trajectory::bezier(mid(0), mid(1), mid(2), mid(3));
        if middle.is_degenerate() {
            log::debug!("rails {} and {} have the same middle", left, right);
            return None;
        }
        let ext = bbox.diagonal();
        let s = middle.start();
        let e = middle.end();
        Some(Self::new(vec![
            Trajectory::straight(s - (middle.start_direction() * ext).z0(), s),
            middle,
            Trajectory::straight(e, e + (middle.end_direction() * ext).z0()),
        ]))
    }

    pub fn parts(&self) -> &[Trajectory] {
        &self.parts
    }

    pub fn length(&self) -> f32 {
        self.parts.iter().map(Trajectory::length).sum()
    }

    /// Position and flat direction at distance d from the start
    pub fn at(&self, mut d: f32) -> Option<(Vec3, Vec2)> {
        for p in &self.parts {
            let l = p.length();
            if d <= l {
                let t = p.travel(0.0, d.max(0.0));
                return Some((p.position(t), p.tangent_flat(t)));
            }
            d -= l;
        }
        let last = self.parts.last()?;
        Some((last.end(), last.end_direction()))
    }

    /// Items every `step`, symmetric around the middle of the rail
    pub fn items(&self, step: f32) -> Vec<(Vec3, Vec2)> {
        let l = self.length();
        if step <= 0.0 || l <= 0.0 {
            return vec![];
        }
        let half = l * 0.5;
        let n = (half / step).floor();
        if n.is_nan() || 2.0 * n + 1.0 > MAX_ITEMS as f32 {
            log::warn!("step {} too small for a {} long rail", step, l);
            return vec![];
        }
        let n = n as usize;
        (0..=2 * n)
            .filter_map(|k| self.at(half + (k as f32 - n as f32) * step))
            .collect()
    }

    /// Items every `step` from the start of the rail
    pub fn items_from_start(&self, step: f32) -> Vec<(Vec3, Vec2)> {
        let l = self.length();
        if step <= 0.0 || l <= 0.0 {
            return vec![];
        }
        let n = (l / step).floor();
        if n.is_nan() || n + 1.0 > MAX_ITEMS as f32 {
            log::warn!("step {} too small for a {} long rail", step, l);
            return vec![];
        }
        let n = n as usize;
        (0..=n).filter_map(|k| self.at(k as f32 * step)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geom::{vec2, vec3};

    #[test]
    fn test_fixed_rail_items() {
        let bbox = AABB::new(vec2(0.0, 0.0), vec2(10.0, 10.0));
        let rail = RailLine::fixed(bbox, Vec2::Y, 0.0);
        let items = rail.items(1.0);
        assert_eq!(items.len() % 2, 1);
        let (mid, dir) = items[items.len() / 2];
        assert!(mid.xy().is_close(vec2(5.0, 5.0), 1e-4));
        assert!(dir.is_close(Vec2::Y, 1e-4));
    }

    #[test]
    fn test_follow_rails() {
        let c = Contour::from_points(&[
            vec3(0.0, 0.0, 0.0),
            vec3(10.0, 0.0, 0.0),
            vec3(10.0, 4.0, 0.0),
            vec3(0.0, 4.0, 0.0),
        ]);
        let bbox = c.bbox().unwrap();
        let rail = RailLine::follow(&c, 0, 2, bbox, 0.0).unwrap();
        assert_eq!(rail.parts().len(), 3);
        let middle = &rail.parts()[1];
        assert!(middle.start().xy().is_close(vec2(0.0, 2.0), 1e-4));
        assert!(middle.end().xy().is_close(vec2(10.0, 2.0), 1e-4));
        assert!(rail.length() > 10.0);

        // an edge against itself has no middle
        assert!(RailLine::follow(&c, 1, 1, bbox, 0.0).is_none());
    }

    #[test]
    fn test_tiny_step_lays_nothing() {
        let bbox = AABB::new(vec2(0.0, 0.0), vec2(10.0, 10.0));
        let rail = RailLine::fixed(bbox, Vec2::Y, 0.0);
        assert!(rail.items(1e-44).is_empty());
        assert!(rail.items_from_start(1e-44).is_empty());
        assert_eq!(rail.items_from_start(1.0).len(), rail.length().floor() as usize + 1);
    }
}
