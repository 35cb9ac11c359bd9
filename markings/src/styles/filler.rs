//! Fillers made of repeated stripes clipped to the contour.

use super::{default_color, CalcContext, FillerGeometry};
use crate::clip::{band_spans, ClipMode};
use crate::contour::Contour;
use crate::property::{style_properties, ChevronFrom};
use crate::rail::RailLine;
use crate::style_data::push_dashes;
use crate::style_helper::check_dashed_lod;
use crate::{Capabilities, DashData, MarkingLod, MarkingsConfig, MaterialType, StyleData, StyleType};
use geom::{Color, Degrees, StraightTrajectory, Trajectory, Vec2, Vec3};

/// Contour the pattern is clipped to, moved inwards by `offset`
fn clip_contour(geometry: &FillerGeometry, offset: f32) -> Option<Contour> {
    let c = if offset > 0.0 {
        geometry.contour.offset(offset)
    } else {
        geometry.contour.clone()
    };
    if c.is_degenerate() {
        log::debug!("filler contour is degenerate");
        return None;
    }
    Some(c)
}

/// Clipped quads of a `width` wide band through `p` along `dir`.
/// With `half_line` only the part ahead of `p` is kept.
#[allow(clippy::too_many_arguments)]
fn band_dashes(
    contour: &Contour,
    p: Vec3,
    dir: Vec2,
    reach: f32,
    half_line: bool,
    width: f32,
    mode: ClipMode,
    color: Color,
    lod: MarkingLod,
    config: &MarkingsConfig,
    out: &mut Vec<DashData>,
) {
    let start = if half_line { p } else { p - (dir * reach).z0() };
    let line = Trajectory::Straight(StraightTrajectory::infinite(start, p + (dir * reach).z0()));
    let line_len = line.length();
    for (t0, t1) in band_spans(&line, width, contour, mode) {
        let t0 = if half_line { t0.max(0.0) } else { t0 };
        if t1 <= t0 {
            continue;
        }
        let length = (t1 - t0) * line_len;
        if length < config.min_part_length || !check_dashed_lod(lod, width, length, config) {
            continue;
        }
        out.push(DashData::between(
            line.position(t0),
            line.position(t1),
            width,
            color,
            MaterialType::Rectangle,
        ));
    }
}

/// Rail of a filler: between two edges when following rails, else straight across
/// the contour, perpendicular to `item_dir`
fn rail_for(
    contour: &Contour,
    rails: Option<(usize, usize)>,
    item_dir: Vec2,
    z: f32,
) -> Option<(RailLine, bool)> {
    let bbox = contour.bbox()?;
    if let Some((left, right)) = rails {
        if let Some(rail) = RailLine::follow(contour, left, right, bbox, z) {
            return Some((rail, true));
        }
    }
    Some((RailLine::fixed(bbox, item_dir.perp_left(), z), false))
}

#[allow(clippy::too_many_arguments)]
fn periodic(
    geometry: &FillerGeometry,
    clip: &Contour,
    rails: Option<(usize, usize)>,
    angle: f32,
    width: f32,
    period: f32,
    mode: ClipMode,
    color: Color,
    lod: MarkingLod,
    config: &MarkingsConfig,
    out: &mut Vec<DashData>,
) {
    let rotation = Degrees(angle).to_radians();
    let fixed_dir = rotation.vec2();
    let Some((rail, following)) = rail_for(&geometry.contour, rails, fixed_dir, geometry.height) else {
        return;
    };
    let Some(bbox) = clip.bbox() else {
        return;
    };
    let reach = bbox.diagonal() + 1.0;
    for (p, tangent) in rail.items(period) {
        let dir = if following {
            tangent.perpendicular().rotated_by_angle(rotation)
        } else {
            tangent.perpendicular()
        };
        band_dashes(clip, p, dir, reach, false, width, mode, color, lod, config, out);
    }
}

fn wrap(lod: MarkingLod, dashes: Vec<DashData>) -> Vec<StyleData> {
    let mut out = vec![];
    push_dashes(&mut out, lod, dashes);
    out
}

#[derive(Clone, Debug, PartialEq)]
pub struct StripeFiller {
    pub color: Color,
    pub width: f32,
    /// Distance between stripes, as a multiple of their width
    pub step: f32,
    /// Stripe direction in degrees, relative to the rail when following rails
    pub angle: f32,
    pub offset: f32,
    pub follow_rails: bool,
    pub left_rail: u32,
    pub right_rail: u32,
}

impl Default for StripeFiller {
    fn default() -> Self {
        Self {
            color: default_color(),
            width: 0.5,
            step: 3.0,
            angle: 45.0,
            offset: 0.0,
            follow_rails: false,
            left_rail: 0,
            right_rail: 2,
        }
    }
}

style_properties!(StripeFiller, StyleType::FillerStripe,
    Capabilities::COLOR | Capabilities::WIDTH | Capabilities::PERIODIC | Capabilities::ROTATE
        | Capabilities::OFFSET | Capabilities::RAILS, {
    Color => color,
    Width => width,
    Step => step,
    Angle => angle,
    Offset => offset,
    FollowRails => follow_rails,
    LeftRail => left_rail,
    RightRail => right_rail,
});

impl StripeFiller {
    pub fn calculate(&self, geometry: &FillerGeometry, lod: MarkingLod, ctx: &CalcContext<'_>) -> Vec<StyleData> {
        if self.width <= 0.0 {
            return vec![];
        }
        let clip = common::unwrap_ret!(clip_contour(geometry, self.offset), vec![]);
        let rails = self
            .follow_rails
            .then_some((self.left_rail as usize, self.right_rail as usize));
        let mut dashes = vec![];
        periodic(
            geometry,
            &clip,
            rails,
            self.angle,
            self.width,
            self.width * self.step.max(1.0),
            ClipMode::Inside,
            self.color,
            lod,
            ctx.config,
            &mut dashes,
        );
        wrap(lod, dashes)
    }
}

/// Two perpendicular stripe families
#[derive(Clone, Debug, PartialEq)]
pub struct GridFiller {
    pub color: Color,
    pub width: f32,
    pub step: f32,
    pub angle: f32,
    pub offset: f32,
}

impl Default for GridFiller {
    fn default() -> Self {
        Self {
            color: default_color(),
            width: 0.3,
            step: 4.0,
            angle: 0.0,
            offset: 0.0,
        }
    }
}

style_properties!(GridFiller, StyleType::FillerGrid,
    Capabilities::COLOR | Capabilities::WIDTH | Capabilities::PERIODIC | Capabilities::ROTATE
        | Capabilities::OFFSET, {
    Color => color,
    Width => width,
    Step => step,
    Angle => angle,
    Offset => offset,
});

impl GridFiller {
    pub fn calculate(&self, geometry: &FillerGeometry, lod: MarkingLod, ctx: &CalcContext<'_>) -> Vec<StyleData> {
        if self.width <= 0.0 {
            return vec![];
        }
        let clip = common::unwrap_ret!(clip_contour(geometry, self.offset), vec![]);
        let mut dashes = vec![];
        for angle in [self.angle, self.angle + 90.0] {
            periodic(
                geometry,
                &clip,
                None,
                angle,
                self.width,
                self.width * self.step.max(1.0),
                ClipMode::Inside,
                self.color,
                lod,
                ctx.config,
                &mut dashes,
            );
        }
        wrap(lod, dashes)
    }
}

/// Plain paint covering the whole contour
#[derive(Clone, Debug, PartialEq)]
pub struct SolidFiller {
    pub color: Color,
    pub offset: f32,
    pub follow_rails: bool,
    pub left_rail: u32,
    pub right_rail: u32,
}

impl Default for SolidFiller {
    fn default() -> Self {
        Self {
            color: default_color(),
            offset: 0.0,
            follow_rails: false,
            left_rail: 0,
            right_rail: 2,
        }
    }
}

style_properties!(SolidFiller, StyleType::FillerSolid,
    Capabilities::COLOR | Capabilities::OFFSET | Capabilities::RAILS, {
    Color => color,
    Offset => offset,
    FollowRails => follow_rails,
    LeftRail => left_rail,
    RightRail => right_rail,
});

impl SolidFiller {
    pub fn calculate(&self, geometry: &FillerGeometry, lod: MarkingLod, ctx: &CalcContext<'_>) -> Vec<StyleData> {
        let clip = common::unwrap_ret!(clip_contour(geometry, self.offset), vec![]);
        // stripes run along the first edge
        let first = common::unwrap_ret!(geometry.contour.parts().first(), vec![]);
        let angle = first.trajectory.start_direction().angle_cossin().to_degrees().0;
        let rails = self
            .follow_rails
            .then_some((self.left_rail as usize, self.right_rail as usize));
        let width = ctx.config.solid_filler_width;
        let mut dashes = vec![];
        periodic(
            geometry,
            &clip,
            rails,
            if self.follow_rails { 0.0 } else { angle },
            width,
            width,
            ClipMode::Cover,
            self.color,
            lod,
            ctx.config,
            &mut dashes,
        );
        wrap(lod, dashes)
    }
}

/// Nested V shapes
#[derive(Clone, Debug, PartialEq)]
pub struct ChevronFiller {
    pub color: Color,
    pub width: f32,
    pub step: f32,
    /// Angle between both arms, in degrees
    pub angle_between: f32,
    pub starting_from: ChevronFrom,
    /// Index of the vertex or edge the chevrons start from
    pub output: u32,
    pub invert: bool,
    pub offset: f32,
}

impl Default for ChevronFiller {
    fn default() -> Self {
        Self {
            color: default_color(),
            width: 0.5,
            step: 3.0,
            angle_between: 90.0,
            starting_from: ChevronFrom::Vertex,
            output: 0,
            invert: false,
            offset: 0.0,
        }
    }
}

style_properties!(ChevronFiller, StyleType::FillerChevron,
    Capabilities::COLOR | Capabilities::WIDTH | Capabilities::PERIODIC | Capabilities::CHEVRON
        | Capabilities::INVERT | Capabilities::OFFSET, {
    Color => color,
    Width => width,
    Step => step,
    AngleBetween => angle_between,
    StartingFrom => starting_from,
    Output => output,
    Invert => invert,
    Offset => offset,
});

impl ChevronFiller {
    /// Apex of the first chevron and the direction the pattern goes into the contour.
    /// `Vertex` starts at vertex `output`, between its two edges. `Edge` starts at the
    /// middle of edge `output`, going perpendicular to it.
    pub fn anchor(&self, contour: &Contour) -> Option<(Vec3, Vec2)> {
        let n = contour.edge_count();
        if n < 2 {
            return None;
        }
        let i = self.output as usize % n;
        let edge = contour.edge(i)?;
        let inward_normal = |t: &Trajectory, at: f32| {
            let left = t.tangent_flat(at).perp_left();
            if contour.is_clockwise() {
                -left
            } else {
                left
            }
        };
        let (apex, dir) = match self.starting_from {
            ChevronFrom::Vertex => {
                let prev = contour.edge(i + n - 1)?;
                let bisector = edge.start_direction() - prev.end_direction();
                let dir = bisector
                    .try_normalize()
                    .unwrap_or_else(|| inward_normal(edge, 0.0));
                (edge.start(), dir)
            }
            ChevronFrom::Edge => (edge.position(0.5), inward_normal(edge, 0.5)),
        };
        let ahead = apex.xy() + dir * 0.01;
        let dir = if contour.contains(ahead) { dir } else { -dir };
        Some((apex, dir))
    }

    pub fn calculate(&self, geometry: &FillerGeometry, lod: MarkingLod, ctx: &CalcContext<'_>) -> Vec<StyleData> {
        if self.width <= 0.0 || self.angle_between <= 0.0 || self.angle_between >= 180.0 {
            return vec![];
        }
        let clip = common::unwrap_ret!(clip_contour(geometry, self.offset), vec![]);
        let (apex, dir) = common::unwrap_ret!(self.anchor(&geometry.contour), vec![]);
        let bbox = common::unwrap_ret!(clip.bbox(), vec![]);
        let reach = bbox.diagonal() + 1.0;
        let apex = apex.xy().z(geometry.height);

        let axis = RailLine::new(vec![Trajectory::straight(apex, apex + (dir * reach).z0())]);
        let half = Degrees(self.angle_between * 0.5).to_radians();
        let back = if self.invert { dir } else { -dir };
        let arms = [back.rotated_by_angle(half), back.rotated_by_angle(-half)];

        let mut dashes = vec![];
        for (p, _) in axis.items_from_start(self.width * self.step.max(1.0)) {
            for arm in arms {
                band_dashes(
                    &clip,
                    p,
                    arm,
                    reach,
                    true,
                    self.width,
                    ClipMode::Inside,
                    self.color,
                    lod,
                    ctx.config,
                    &mut dashes,
                );
            }
        }
        wrap(lod, dashes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::styles::FillerStyle;
    use crate::{StaticCatalog, TextCache};
    use geom::vec3;

    fn square() -> FillerGeometry {
        FillerGeometry::new(Contour::from_points(&[
            vec3(0.0, 0.0, 0.0),
            vec3(10.0, 0.0, 0.0),
            vec3(10.0, 10.0, 0.0),
            vec3(0.0, 10.0, 0.0),
        ]))
    }

    fn run(style: impl Into<FillerStyle>, geometry: &FillerGeometry) -> Vec<StyleData> {
        let config = MarkingsConfig::default();
        let texts = TextCache::default();
        let prefabs = StaticCatalog::default();
        let ctx = CalcContext {
            config: &config,
            texts: &texts,
            prefabs: &prefabs,
        };
        style.into().calculate(geometry, MarkingLod::Lod0, &ctx)
    }

    #[test]
    fn test_stripes_inside_square() {
        let s = StripeFiller {
            angle: 0.0,
            width: 0.5,
            step: 2.0,
            ..Default::default()
        };
        let g = square();
        let data = run(s, &g);
        let dashes = data[0].dashes();
        assert_eq!(dashes.len(), 9);
        for d in dashes {
            assert!((d.length - 10.0).abs() < 1e-3);
            assert!(g.contour.contains(d.position.xy()));
        }
    }

    #[test]
    fn test_grid_has_both_directions() {
        let s = GridFiller {
            width: 0.5,
            step: 2.0,
            ..Default::default()
        };
        let data = run(s, &square());
        assert_eq!(data[0].count(), 18);
    }

    #[test]
    fn test_solid_filler_degenerate() {
        let flat = FillerGeometry::new(Contour::from_points(&[
            vec3(0.0, 0.0, 0.0),
            vec3(5.0, 0.0, 0.0),
            vec3(10.0, 0.0, 0.0),
        ]));
        assert!(run(SolidFiller::default(), &flat).is_empty());

        let data = run(SolidFiller::default(), &square());
        assert_eq!(data.len(), 1);
        assert!(data[0].count() >= 20);
    }

    #[test]
    fn test_chevron_anchor() {
        let g = square();
        let mut c = ChevronFiller::default();
        let (apex, dir) = c.anchor(&g.contour).unwrap();
        assert_eq!(apex, vec3(0.0, 0.0, 0.0));
        assert!(dir.is_close(Vec2::new(1.0, 1.0).normalize(), 1e-4));

        c.starting_from = ChevronFrom::Edge;
        c.output = 1;
        let (apex, dir) = c.anchor(&g.contour).unwrap();
        assert!(apex.is_close(vec3(10.0, 5.0, 0.0), 1e-4));
        assert!(dir.is_close(-Vec2::X, 1e-4));

        let data = run(c, &g);
        assert!(!data.is_empty());
        for d in data[0].dashes() {
            assert!(g.contour.contains(d.position.xy()));
        }
    }
}
