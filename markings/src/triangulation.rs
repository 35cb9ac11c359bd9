//! Contour to triangle mesh, for the fillers that are drawn as solid surfaces.

use crate::contour::Contour;
use crate::style_helper::calculate_solid;
use crate::{MarkingLod, MarkingsConfig};
use geom::{Polygon, Vec2, Vec3};

const DEDUP_DIST: f32 = 1e-3;
/// How many segments at the end of an edge are checked against the start of the next one
const INTERSECT_LOOKUP: usize = 4;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Triangulation {
    /// Clockwise outline
    pub points: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl Triangulation {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// One polyline per contour part, split like a solid line would be at this lod
fn edge_polylines(contour: &Contour, lod: MarkingLod, config: &MarkingsConfig) -> Vec<Vec<Vec3>> {
    contour
        .trajectories()
        .map(|traj| {
            let parts = calculate_solid(traj, lod, config);
            let Some(first) = parts.first() else {
                return vec![traj.start(), traj.end()];
            };
            let mut line = Vec::with_capacity(parts.len() + 1);
            line.push(traj.position(first.start));
            line.extend(parts.iter().map(|p| traj.position(p.end)));
            line
        })
        .collect()
}

fn segment_intersection(a0: Vec2, a1: Vec2, b0: Vec2, b1: Vec2) -> Option<f32> {
    let da = a1 - a0;
    let db = b1 - b0;
    let denom = da.cross(db);
    if denom.abs() < 1e-8 {
        return None;
    }
    let diff = b0 - a0;
    let t = diff.cross(db) / denom;
    let u = diff.cross(da) / denom;
    // shared end points are not crossings
    let e = 1e-4;
    if t > e && t < 1.0 - e && u > e && u < 1.0 - e {
        Some(t)
    } else {
        None
    }
}

/// Neighbouring edges of a sampled contour may overlap around their shared vertex.
/// Both are trimmed at their crossing so the outline stays simple.
pub fn find_intersects(lines: &mut Vec<Vec<Vec3>>) {
    let n = lines.len();
    if n < 2 {
        return;
    }
    for i in 0..n {
        let j = (i + 1) % n;
        let (la, lb) = (lines[i].len(), lines[j].len());
        if la < 2 || lb < 2 {
            continue;
        }
        let hit = 'search: {
            for ka in (la.saturating_sub(INTERSECT_LOOKUP + 1)..la - 1).rev() {
                for kb in 0..(lb - 1).min(INTERSECT_LOOKUP) {
                    let a = &lines[i];
                    let b = &lines[j];
                    if let Some(t) = segment_intersection(a[ka].xy(), a[ka + 1].xy(), b[kb].xy(), b[kb + 1].xy()) {
                        break 'search Some((ka, kb, a[ka].lerp(a[ka + 1], t)));
                    }
                }
            }
            None
        };
        if let Some((ka, kb, x)) = hit {
            lines[i].truncate(ka + 1);
            lines[i].push(x);
            lines[j].drain(..=kb);
            lines[j].insert(0, x);
        }
    }
    lines.retain(|l| l.len() > 1);
}

/// Outline of the lines, without points closer than `DEDUP_DIST` to the previous one
fn ring(lines: &[Vec<Vec3>]) -> Vec<Vec3> {
    let mut ring: Vec<Vec3> = vec![];
    for p in lines.iter().flatten() {
        if ring.last().map_or(true, |l| !l.is_close(*p, DEDUP_DIST)) {
            ring.push(*p);
        }
    }
    while ring.len() > 1 && ring[0].is_close(ring[ring.len() - 1], DEDUP_DIST) {
        ring.pop();
    }
    ring
}

/// Triangle fan of the contour's inside. None when the outline is not a simple polygon.
pub fn triangulate(contour: &Contour, lod: MarkingLod, config: &MarkingsConfig) -> Option<Triangulation> {
    let mut lines = edge_polylines(contour, lod, config);
    find_intersects(&mut lines);
    let mut points = ring(&lines);
    if points.len() < 3 {
        return None;
    }

    let poly = Polygon(points.iter().map(|p| p.xy()).collect());
    if poly.area() < 1e-4 {
        return None;
    }
    if !poly.is_clockwise() {
        points.reverse();
    }

    let coords: Vec<f64> = points.iter().flat_map(|p| [p.x as f64, p.y as f64]).collect();
    let indices = match earcutr::earcut(&coords, &[], 2) {
        Ok(x) => x,
        Err(e) => {
            log::debug!("could not triangulate contour: {:?}", e);
            return None;
        }
    };
    if indices.len() / 3 != points.len() - 2 {
        log::debug!(
            "contour with {} points gave {} triangles",
            points.len(),
            indices.len() / 3
        );
        return None;
    }

    Some(Triangulation {
        points,
        indices: indices.into_iter().map(|i| i as u32).collect(),
    })
}
