//! Spans of a straight line lying inside a contour.

use crate::contour::Contour;
use geom::{Intersection, Trajectory, Vec2};

/// Distance under which a contour vertex counts as lying on the line
const ON_LINE: f32 = 1e-3;
const T_EPS: f32 = 1e-3;

/// Parameter range (start, end) of a line
pub type Span = (f32, f32);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ClipMode {
    /// The whole width of an item stays inside the contour
    Inside,
    /// Items cover the contour up to its edges, overlapping them a bit
    Cover,
}

struct Line {
    origin: Vec2,
    dir: Vec2,
    len2: f32,
}

impl Line {
    fn new(traj: &Trajectory) -> Option<Self> {
        let origin = traj.start().xy();
        let d = traj.end().xy() - origin;
        let len2 = d.mag2();
        Some(Self {
            origin,
            dir: d.try_normalize()?,
            len2,
        })
    }

    fn signed_distance(&self, p: Vec2) -> f32 {
        self.dir.cross(p - self.origin)
    }

    fn project(&self, p: Vec2) -> f32 {
        (p - self.origin).dot(self.dir) / self.len2.sqrt()
    }

    fn on_line(&self, p: Vec2) -> bool {
        self.signed_distance(p).abs() < ON_LINE
    }
}

/// Sorted parameters along `line` where it crosses the contour boundary.
/// A vertex on the line counts once when the contour crosses the line there,
/// and not at all when it only touches it. Edges lying on the line are folded
/// into their end vertices: the run counts as one crossing when the contour
/// leaves it on the other side, placed at the end next to the inside.
pub fn crossings(line: &Trajectory, contour: &Contour) -> Vec<f32> {
    let Some(l) = Line::new(line) else {
        return vec![];
    };
    let parts = contour.parts();
    let n = parts.len();
    let collinear = |j: usize| {
        let t = &parts[j].trajectory;
        l.on_line(t.start().xy()) && l.on_line(t.end().xy()) && l.on_line(t.position(0.5).xy())
    };
    if (0..n).all(collinear) {
        return vec![];
    }
    let mut hits = vec![];

    for (j, part) in parts.iter().enumerate() {
        if collinear(j) {
            continue;
        }
        let part = &part.trajectory;
        let start_on = l.on_line(part.start().xy());
        let end_on = l.on_line(part.end().xy());

        for i in Intersection::calculate(line, part) {
            if (i.second_t < T_EPS && start_on) || (i.second_t > 1.0 - T_EPS && end_on) {
                continue;
            }
            hits.push(i.first_t);
        }

        if !start_on {
            continue;
        }
        // previous part leaving the line, skipping the ones lying on it
        let mut k = (j + n - 1) % n;
        while collinear(k) {
            k = (k + n - 1) % n;
        }
        let before = l.signed_distance(parts[k].trajectory.position(0.5).xy());
        let after = l.signed_distance(part.position(0.5).xy());
        if before * after >= 0.0 {
            continue;
        }
        let here = l.project(part.start().xy());
        let run_start = (k + 1) % n;
        if run_start == j {
            hits.push(here);
            continue;
        }
        let other = l.project(parts[run_start].trajectory.start().xy());
        let (lo, hi) = if other < here { (other, here) } else { (here, other) };
        let step = 4.0 * ON_LINE / l.len2.sqrt();
        let inside_after = contour.contains(line.position(hi + step).xy());
        hits.push(if inside_after { hi } else { lo });
    }

    hits.sort_by(|a, b| a.total_cmp(b));
    hits
}

/// (enter, exit) pairs of the crossings
pub fn spans(line: &Trajectory, contour: &Contour) -> Vec<Span> {
    let hits = crossings(line, contour);
    if hits.len() % 2 == 1 {
        log::debug!("odd number of crossings ({}), dropping the last one", hits.len());
    }
    hits.chunks_exact(2)
        .map(|c| (c[0], c[1]))
        .filter(|(a, b)| b > a)
        .collect()
}

/// Parts covered by both span lists
pub fn intersect(a: &[Span], b: &[Span]) -> Vec<Span> {
    let mut out = vec![];
    for &(a0, a1) in a {
        for &(b0, b1) in b {
            let s = a0.max(b0);
            let e = a1.min(b1);
            if e > s {
                out.push((s, e));
            }
        }
    }
    out.sort_by(|x, y| x.0.total_cmp(&y.0));
    out
}

/// Parts covered by any span
pub fn union(mut spans: Vec<Span>) -> Vec<Span> {
    spans.sort_by(|x, y| x.0.total_cmp(&y.0));
    let mut out: Vec<Span> = Vec::with_capacity(spans.len());
    for s in spans {
        match out.last_mut() {
            Some(last) if s.0 <= last.1 => last.1 = last.1.max(s.1),
            _ => out.push(s),
        }
    }
    out
}

/// Visible spans of a band of the given width centred on `line`
pub fn band_spans(line: &Trajectory, width: f32, contour: &Contour, mode: ClipMode) -> Vec<Span> {
    let h = width * 0.5;
    let centre = spans(line, contour);
    let left = spans(&line.shift(h, h), contour);
    let right = spans(&line.shift(-h, -h), contour);
    match mode {
        ClipMode::Inside => intersect(&intersect(&centre, &left), &right),
        ClipMode::Cover => union(centre.into_iter().chain(left).chain(right).collect()),
    }
}
