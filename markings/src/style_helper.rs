//! Arc length layout of dashes and solid parts along a trajectory, and their clipping
//! against the borders of a line.

use crate::{MarkingLod, MarkingsConfig};
use geom::{side_of, Intersection, Trajectory, Vec2};
use serde::{Deserialize, Serialize};

const MAX_SOLID_DEPTH: u32 = 16;

/// Upper bound of dashes, objects or segments laid along a single marking
pub const MAX_ITEMS: usize = 4096;

/// Converts an item count computed in floats, clamping it to [0; MAX_ITEMS]
pub fn capped_count(n: f32) -> usize {
    if n.is_nan() || n <= 0.0 {
        return 0;
    }
    if n > MAX_ITEMS as f32 {
        log::debug!("{} items clamped to {}", n, MAX_ITEMS);
        return MAX_ITEMS;
    }
    n as usize
}

/// A sub range [start; end] of a trajectory's parameter
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PartT {
    pub start: f32,
    pub end: f32,
}

impl PartT {
    pub fn new(start: f32, end: f32) -> Self {
        Self { start, end }
    }

    pub fn mid(&self) -> f32 {
        (self.start + self.end) * 0.5
    }
}

/// Distances (from, to) along a length `l` of `dash` long dashes separated by `space`,
/// centred so both ends keep the same leftover
pub fn dash_distances(l: f32, dash: f32, space: f32) -> Vec<(f32, f32)> {
    if dash <= 0.0 || l < dash {
        return vec![];
    }
    let space = space.max(0.0);
    let period = dash + space;
    let count = capped_count(((l + space) / period).floor());
    if count == 0 {
        return vec![];
    }
    let covered = count as f32 * dash + (count - 1) as f32 * space;
    let start = (l - covered) * 0.5;
    (0..count)
        .map(|i| {
            let s = start + i as f32 * period;
            (s, s + dash)
        })
        .collect()
}

/// Converts increasing arc length ranges to parameter ranges
pub fn distances_to_parts(traj: &Trajectory, ranges: &[(f32, f32)]) -> Vec<PartT> {
    let mut t = 0.0;
    let mut d = 0.0;
    let mut parts = Vec::with_capacity(ranges.len());
    for &(a, b) in ranges {
        let ta = traj.travel(t, a - d);
        let tb = traj.travel(ta, b - a);
        parts.push(PartT::new(ta, tb));
        t = tb;
        d = b;
    }
    parts
}

/// Dash layout along the whole trajectory
pub fn calculate_dashed(traj: &Trajectory, dash: f32, space: f32) -> Vec<PartT> {
    if traj.is_degenerate() {
        log::debug!("skipping dashes on a degenerate trajectory");
        return vec![];
    }
    distances_to_parts(traj, &dash_distances(traj.length(), dash, space))
}

/// Splits the trajectory into parts that are straight enough to be drawn as quads
pub fn calculate_solid(traj: &Trajectory, lod: MarkingLod, config: &MarkingsConfig) -> Vec<PartT> {
    if traj.is_degenerate() {
        return vec![];
    }
    let mut parts = vec![];
    let max_depth = config.solid_max_depth.min(MAX_SOLID_DEPTH);
    split_solid(traj, 0.0, 1.0, 0, max_depth, lod, config, &mut parts);
    parts
}

#[allow(clippy::too_many_arguments)]
fn split_solid(
    traj: &Trajectory,
    t0: f32,
    t1: f32,
    depth: u32,
    max_depth: u32,
    lod: MarkingLod,
    config: &MarkingsConfig,
    out: &mut Vec<PartT>,
) {
    let sub = traj.cut(t0, t1);
    let len = sub.length();
    let too_curved = sub.delta_angle().0 > config.solid_max_angle(lod) && len > config.solid_min_length;
    let too_long = len > config.solid_max_length;
    if depth < max_depth && (too_curved || too_long) {
        let mid = (t0 + t1) * 0.5;
        split_solid(traj, t0, mid, depth + 1, max_depth, lod, config, out);
        split_solid(traj, mid, t1, depth + 1, max_depth, lod, config, out);
        return;
    }
    out.push(PartT::new(t0, t1));
}

/// Far away thin or short items are not worth drawing
pub fn check_dashed_lod(lod: MarkingLod, width: f32, length: f32, config: &MarkingsConfig) -> bool {
    match lod {
        MarkingLod::Lod0 => true,
        MarkingLod::Lod1 => width >= config.lod_min_width && length >= config.lod_min_length,
    }
}

/// Trajectories a line must stay within. The side of each border containing
/// `reference` is the inside.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Borders {
    pub reference: Vec2,
    pub lines: Vec<Trajectory>,
}

impl Borders {
    pub fn new(reference: Vec2, lines: Vec<Trajectory>) -> Self {
        Self { reference, lines }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn inside_of(&self, border: &Trajectory, p: Vec2) -> bool {
        let r = side_of(border, border.closest_t(self.reference), self.reference);
        let s = side_of(border, border.closest_t(p), p);
        r * s >= 0.0
    }

    pub fn is_inside(&self, p: Vec2) -> bool {
        self.lines.iter().all(|b| self.inside_of(b, p))
    }
}

/// The three lines covered by a quad of this width along traj: left edge, centre and right edge
fn quad_lines(traj: &Trajectory, width: f32) -> [Trajectory; 3] {
    let h = width * 0.5;
    [traj.shift(h, h), *traj, traj.shift(-h, -h)]
}

fn part_inside(lines: &[Trajectory; 3], borders: &Borders, t: f32) -> bool {
    lines.iter().all(|l| borders.is_inside(l.position(t).xy()))
}

/// Clips a part of width `width` against the borders.
/// Parts fully inside are kept, fully outside are dropped and crossing ones are truncated
/// to their longest inside range. Remainders shorter than `min_part_length` are dropped.
pub fn check_borders(
    traj: &Trajectory,
    part: PartT,
    width: f32,
    borders: &Borders,
    config: &MarkingsConfig,
) -> Option<PartT> {
    if borders.is_empty() {
        return Some(part);
    }
    let lines = quad_lines(traj, width);

    let mut cuts = vec![part.start, part.end];
    for l in &lines {
        for b in &borders.lines {
            for i in Intersection::calculate(l, b) {
                if i.first_t > part.start && i.first_t < part.end {
                    cuts.push(i.first_t);
                }
            }
        }
    }

    if cuts.len() == 2 {
        return if part_inside(&lines, borders, part.mid()) {
            Some(part)
        } else {
            None
        };
    }

    cuts.sort_by(|a, b| a.total_cmp(b));
    let best = cuts
        .windows(2)
        .map(|w| PartT::new(w[0], w[1]))
        .filter(|p| p.end - p.start > 1e-6 && part_inside(&lines, borders, p.mid()))
        .max_by(|a, b| {
            traj.length_between(a.start, a.end)
                .total_cmp(&traj.length_between(b.start, b.end))
        })?;

    if traj.length_between(best.start, best.end) < config.min_part_length {
        return None;
    }
    Some(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geom::{vec2, vec3, StraightTrajectory};

    fn line10() -> Trajectory {
        Trajectory::straight(vec3(0.0, 0.0, 0.0), vec3(10.0, 0.0, 0.0))
    }

    #[test]
    fn test_dashed_centred() {
        let parts = calculate_dashed(&line10(), 3.0, 1.5);
        assert_eq!(parts.len(), 2);
        assert!((parts[0].start - 0.125).abs() < 1e-5);
        assert!((parts[0].end - 0.425).abs() < 1e-5);
        assert!((parts[1].start - 0.575).abs() < 1e-5);
        assert!((1.0 - parts[1].end - parts[0].start).abs() < 1e-5);
    }

    #[test]
    fn test_dashed_too_short() {
        assert!(calculate_dashed(&line10(), 12.0, 1.0).is_empty());
        assert_eq!(calculate_dashed(&line10(), 10.0, 1.0).len(), 1);
        assert!(calculate_dashed(&line10(), 0.0, 1.0).is_empty());
        let p = vec3(1.0, 1.0, 0.0);
        assert!(calculate_dashed(&Trajectory::straight(p, p), 1.0, 1.0).is_empty());
    }

    #[test]
    fn test_tiny_dash_is_capped() {
        let d = dash_distances(10.0, 1e-30, 0.0);
        assert_eq!(d.len(), MAX_ITEMS);
        assert!(d.iter().all(|&(s, e)| (0.0..=10.0).contains(&s) && e >= s));
        assert_eq!(dash_distances(10.0, 1e-44, 1e-44).len(), MAX_ITEMS);

        assert_eq!(capped_count(f32::NAN), 0);
        assert_eq!(capped_count(-3.0), 0);
        assert_eq!(capped_count(f32::INFINITY), MAX_ITEMS);
        assert_eq!(capped_count(12.0), 12);
    }

    #[test]
    fn test_solid_splits_long_and_curved() {
        let config = MarkingsConfig::default();
        let long = Trajectory::straight(vec3(0.0, 0.0, 0.0), vec3(120.0, 0.0, 0.0));
        assert_eq!(calculate_solid(&long, MarkingLod::Lod0, &config).len(), 4);

        let curve = Trajectory::bezier(
            vec3(0.0, 0.0, 0.0),
            vec3(10.0, 0.0, 0.0),
            vec3(20.0, 10.0, 0.0),
            vec3(20.0, 20.0, 0.0),
        );
        let fine = calculate_solid(&curve, MarkingLod::Lod0, &config);
        let coarse = calculate_solid(&curve, MarkingLod::Lod1, &config);
        assert!(fine.len() > coarse.len());
        assert!(coarse.len() > 1);
        assert_eq!(fine.first().unwrap().start, 0.0);
        assert_eq!(fine.last().unwrap().end, 1.0);
        for w in fine.windows(2) {
            assert_eq!(w[0].end, w[1].start);
        }
    }

    #[test]
    fn test_lod_threshold() {
        let config = MarkingsConfig::default();
        assert!(check_dashed_lod(MarkingLod::Lod0, 0.01, 0.01, &config));
        assert!(!check_dashed_lod(MarkingLod::Lod1, 0.1, 3.0, &config));
        assert!(!check_dashed_lod(MarkingLod::Lod1, 0.2, 0.5, &config));
        assert!(check_dashed_lod(MarkingLod::Lod1, 0.2, 3.0, &config));
    }

    #[test]
    fn test_check_borders() {
        let config = MarkingsConfig::default();
        let traj = line10();
        // border crossing the line at x = 6, inside is towards x = 0
        let borders = Borders::new(
            vec2(0.0, 0.0),
            vec![Trajectory::Straight(StraightTrajectory::infinite(
                vec3(6.0, -5.0, 0.0),
                vec3(6.0, 5.0, 0.0),
            ))],
        );

        let inside = PartT::new(0.1, 0.3);
        assert_eq!(check_borders(&traj, inside, 0.2, &borders, &config), Some(inside));

        let outside = PartT::new(0.7, 0.9);
        assert_eq!(check_borders(&traj, outside, 0.2, &borders, &config), None);

        let crossing = check_borders(&traj, PartT::new(0.5, 0.7), 0.2, &borders, &config).unwrap();
        assert!((crossing.start - 0.5).abs() < 1e-5);
        assert!((crossing.end - 0.6).abs() < 1e-4);

        // only 0.01 would remain inside
        assert_eq!(check_borders(&traj, PartT::new(0.599, 0.7), 0.2, &borders, &config), None);
    }
}
