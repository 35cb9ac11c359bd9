use super::{default_color, CalcContext, LineGeometry};
use crate::property::{style_properties, Alignment};
use crate::style_data::push_dashes;
use crate::style_helper::{
    calculate_dashed, calculate_solid, check_borders, check_dashed_lod, dash_distances,
    distances_to_parts, Borders, PartT,
};
use crate::{Capabilities, DashData, MarkingLod, MarkingsConfig, MaterialType, StyleData, StyleType};
use geom::{Color, Trajectory};

pub(crate) fn part_dash(traj: &Trajectory, part: PartT, width: f32, color: Color, material: MaterialType) -> DashData {
    DashData::between(
        traj.position(part.start),
        traj.position(part.end),
        width,
        color,
        material,
    )
}

fn clipped_dashes(
    traj: &Trajectory,
    parts: impl IntoIterator<Item = PartT>,
    width: f32,
    color: Color,
    borders: &Borders,
    config: &MarkingsConfig,
) -> Vec<DashData> {
    parts
        .into_iter()
        .filter_map(|p| check_borders(traj, p, width, borders, config))
        .map(|p| part_dash(traj, p, width, color, MaterialType::Rectangle))
        .collect()
}

/// Dashes of a single dashed pass
#[allow(clippy::too_many_arguments)]
pub(crate) fn dashed_pass(
    traj: &Trajectory,
    borders: &Borders,
    width: f32,
    dash: f32,
    space: f32,
    color: Color,
    lod: MarkingLod,
    config: &MarkingsConfig,
) -> Vec<DashData> {
    if !check_dashed_lod(lod, width, dash, config) {
        return vec![];
    }
    clipped_dashes(traj, calculate_dashed(traj, dash, space), width, color, borders, config)
}

/// Continuous quads of a single solid pass
pub(crate) fn solid_pass(
    traj: &Trajectory,
    borders: &Borders,
    width: f32,
    color: Color,
    lod: MarkingLod,
    config: &MarkingsConfig,
) -> Vec<DashData> {
    if !check_dashed_lod(lod, width, traj.length(), config) {
        return vec![];
    }
    clipped_dashes(traj, calculate_solid(traj, lod, config), width, color, borders, config)
}

/// Lateral offsets of both lines of a double line
pub fn double_offsets(alignment: Alignment, offset: f32) -> (f32, f32) {
    match alignment {
        Alignment::Centre => (-offset * 0.5, offset * 0.5),
        Alignment::Left => (0.0, offset),
        Alignment::Right => (0.0, -offset),
    }
}

fn second(color: Color, second_color: Color, use_second: bool) -> Color {
    if use_second {
        second_color
    } else {
        color
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DashedLine {
    pub color: Color,
    pub width: f32,
    pub dash_length: f32,
    pub space_length: f32,
}

impl Default for DashedLine {
    fn default() -> Self {
        Self {
            color: default_color(),
            width: 0.15,
            dash_length: 1.5,
            space_length: 1.5,
        }
    }
}

style_properties!(DashedLine, StyleType::LineDashed,
    Capabilities::COLOR | Capabilities::WIDTH | Capabilities::DASHED, {
    Color => color,
    Width => width,
    DashLength => dash_length,
    SpaceLength => space_length,
});

impl DashedLine {
    pub fn calculate(&self, geometry: &LineGeometry, lod: MarkingLod, ctx: &CalcContext<'_>) -> Vec<StyleData> {
        let traj = geometry.flat();
        let mut out = vec![];
        push_dashes(
            &mut out,
            lod,
            dashed_pass(
                &traj,
                &geometry.borders,
                self.width,
                self.dash_length,
                self.space_length,
                self.color,
                lod,
                ctx.config,
            ),
        );
        out
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DoubleDashedLine {
    pub color: Color,
    pub second_color: Color,
    pub use_second_color: bool,
    pub width: f32,
    pub dash_length: f32,
    pub space_length: f32,
    pub offset: f32,
    pub alignment: Alignment,
}

impl Default for DoubleDashedLine {
    fn default() -> Self {
        Self {
            color: default_color(),
            second_color: default_color(),
            use_second_color: false,
            width: 0.15,
            dash_length: 1.5,
            space_length: 1.5,
            offset: 0.3,
            alignment: Alignment::Centre,
        }
    }
}

style_properties!(DoubleDashedLine, StyleType::LineDoubleDashed,
    Capabilities::COLOR | Capabilities::SECOND_COLOR | Capabilities::WIDTH | Capabilities::DASHED
        | Capabilities::OFFSET | Capabilities::ALIGNMENT, {
    Color => color,
    SecondColor => second_color,
    UseSecondColor => use_second_color,
    Width => width,
    DashLength => dash_length,
    SpaceLength => space_length,
    Offset => offset,
    Alignment => alignment,
});

impl DoubleDashedLine {
    pub fn calculate(&self, geometry: &LineGeometry, lod: MarkingLod, ctx: &CalcContext<'_>) -> Vec<StyleData> {
        let traj = geometry.flat();
        let (a, b) = double_offsets(self.alignment, self.offset);
        let colors = [self.color, second(self.color, self.second_color, self.use_second_color)];
        let mut dashes = vec![];
        for (off, color) in [a, b].into_iter().zip(colors) {
            dashes.extend(dashed_pass(
                &traj.shift(off, off),
                &geometry.borders,
                self.width,
                self.dash_length,
                self.space_length,
                color,
                lod,
                ctx.config,
            ));
        }
        let mut out = vec![];
        push_dashes(&mut out, lod, dashes);
        out
    }
}

/// Double dashed line where both sides have their own dash length
#[derive(Clone, Debug, PartialEq)]
pub struct DoubleDashedAsymLine {
    pub color: Color,
    pub second_color: Color,
    pub use_second_color: bool,
    pub width: f32,
    pub dash_length: f32,
    pub dash_length_b: f32,
    pub space_length: f32,
    pub offset: f32,
    pub invert: bool,
}

impl Default for DoubleDashedAsymLine {
    fn default() -> Self {
        Self {
            color: default_color(),
            second_color: default_color(),
            use_second_color: false,
            width: 0.15,
            dash_length: 1.5,
            dash_length_b: 3.0,
            space_length: 1.5,
            offset: 0.3,
            invert: false,
        }
    }
}

style_properties!(DoubleDashedAsymLine, StyleType::LineDoubleDashedAsym,
    Capabilities::COLOR | Capabilities::SECOND_COLOR | Capabilities::WIDTH | Capabilities::DASHED
        | Capabilities::ASYM | Capabilities::OFFSET | Capabilities::INVERT, {
    Color => color,
    SecondColor => second_color,
    UseSecondColor => use_second_color,
    Width => width,
    DashLength => dash_length,
    DashLengthB => dash_length_b,
    SpaceLength => space_length,
    Offset => offset,
    Invert => invert,
});

impl DoubleDashedAsymLine {
    /// Parts of both sides. B dashes are centred on A dashes, sharing their period.
    pub fn parts(&self, traj: &Trajectory) -> (Vec<PartT>, Vec<PartT>) {
        if traj.is_degenerate() {
            return (vec![], vec![]);
        }
        let l = traj.length();
        let a = dash_distances(l, self.dash_length, self.space_length);
        let half_b = self.dash_length_b.max(0.0) * 0.5;
        let b: Vec<(f32, f32)> = a
            .iter()
            .map(|&(s, e)| {
                let c = (s + e) * 0.5;
                ((c - half_b).max(0.0), (c + half_b).min(l))
            })
            .filter(|(s, e)| e > s)
            .collect();
        (distances_to_parts(traj, &a), distances_to_parts(traj, &b))
    }

    pub fn calculate(&self, geometry: &LineGeometry, lod: MarkingLod, ctx: &CalcContext<'_>) -> Vec<StyleData> {
        let traj = geometry.flat();
        let (parts_a, parts_b) = self.parts(&traj);
        let mut off_a = self.offset * 0.5;
        if self.invert {
            off_a = -off_a;
        }
        let second = second(self.color, self.second_color, self.use_second_color);

        let mut dashes = vec![];
        for (off, parts, dash, color) in [
            (off_a, parts_a, self.dash_length, self.color),
            (-off_a, parts_b, self.dash_length_b, second),
        ] {
            if !check_dashed_lod(lod, self.width, dash, ctx.config) {
                continue;
            }
            let shifted = traj.shift(off, off);
            dashes.extend(clipped_dashes(
                &shifted,
                parts,
                self.width,
                color,
                &geometry.borders,
                ctx.config,
            ));
        }
        let mut out = vec![];
        push_dashes(&mut out, lod, dashes);
        out
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SolidLine {
    pub color: Color,
    pub width: f32,
}

impl Default for SolidLine {
    fn default() -> Self {
        Self {
            color: default_color(),
            width: 0.15,
        }
    }
}

style_properties!(SolidLine, StyleType::LineSolid, Capabilities::COLOR | Capabilities::WIDTH, {
    Color => color,
    Width => width,
});

impl SolidLine {
    pub fn calculate(&self, geometry: &LineGeometry, lod: MarkingLod, ctx: &CalcContext<'_>) -> Vec<StyleData> {
        let traj = geometry.flat();
        let mut out = vec![];
        push_dashes(
            &mut out,
            lod,
            solid_pass(&traj, &geometry.borders, self.width, self.color, lod, ctx.config),
        );
        out
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DoubleSolidLine {
    pub color: Color,
    pub second_color: Color,
    pub use_second_color: bool,
    pub width: f32,
    pub offset: f32,
    pub alignment: Alignment,
}

impl Default for DoubleSolidLine {
    fn default() -> Self {
        Self {
            color: default_color(),
            second_color: default_color(),
            use_second_color: false,
            width: 0.15,
            offset: 0.3,
            alignment: Alignment::Centre,
        }
    }
}

style_properties!(DoubleSolidLine, StyleType::LineDoubleSolid,
    Capabilities::COLOR | Capabilities::SECOND_COLOR | Capabilities::WIDTH | Capabilities::OFFSET
        | Capabilities::ALIGNMENT, {
    Color => color,
    SecondColor => second_color,
    UseSecondColor => use_second_color,
    Width => width,
    Offset => offset,
    Alignment => alignment,
});

impl DoubleSolidLine {
    pub fn calculate(&self, geometry: &LineGeometry, lod: MarkingLod, ctx: &CalcContext<'_>) -> Vec<StyleData> {
        let traj = geometry.flat();
        let (a, b) = double_offsets(self.alignment, self.offset);
        let colors = [self.color, second(self.color, self.second_color, self.use_second_color)];
        let mut dashes = vec![];
        for (off, color) in [a, b].into_iter().zip(colors) {
            dashes.extend(solid_pass(
                &traj.shift(off, off),
                &geometry.borders,
                self.width,
                color,
                lod,
                ctx.config,
            ));
        }
        let mut out = vec![];
        push_dashes(&mut out, lod, dashes);
        out
    }
}

/// A solid line next to a dashed one
#[derive(Clone, Debug, PartialEq)]
pub struct SolidAndDashedLine {
    pub color: Color,
    pub second_color: Color,
    pub use_second_color: bool,
    pub width: f32,
    pub dash_length: f32,
    pub space_length: f32,
    pub offset: f32,
    pub center_solid: bool,
    pub invert: bool,
}

impl Default for SolidAndDashedLine {
    fn default() -> Self {
        Self {
            color: default_color(),
            second_color: default_color(),
            use_second_color: false,
            width: 0.15,
            dash_length: 1.5,
            space_length: 1.5,
            offset: 0.3,
            center_solid: false,
            invert: false,
        }
    }
}

style_properties!(SolidAndDashedLine, StyleType::LineSolidAndDashed,
    Capabilities::COLOR | Capabilities::SECOND_COLOR | Capabilities::WIDTH | Capabilities::DASHED
        | Capabilities::OFFSET | Capabilities::CENTER_SOLID | Capabilities::INVERT, {
    Color => color,
    SecondColor => second_color,
    UseSecondColor => use_second_color,
    Width => width,
    DashLength => dash_length,
    SpaceLength => space_length,
    Offset => offset,
    CenterSolid => center_solid,
    Invert => invert,
});

impl SolidAndDashedLine {
    /// Lateral offsets of (solid, dashed)
    pub fn offsets(&self) -> (f32, f32) {
        let sign = if self.invert { -1.0 } else { 1.0 };
        if self.center_solid {
            (0.0, self.offset * sign)
        } else {
            (-self.offset * 0.5 * sign, self.offset * 0.5 * sign)
        }
    }

    pub fn calculate(&self, geometry: &LineGeometry, lod: MarkingLod, ctx: &CalcContext<'_>) -> Vec<StyleData> {
        let traj = geometry.flat();
        let (solid_off, dashed_off) = self.offsets();
        let mut dashes = solid_pass(
            &traj.shift(solid_off, solid_off),
            &geometry.borders,
            self.width,
            self.color,
            lod,
            ctx.config,
        );
        dashes.extend(dashed_pass(
            &traj.shift(dashed_off, dashed_off),
            &geometry.borders,
            self.width,
            self.dash_length,
            self.space_length,
            second(self.color, self.second_color, self.use_second_color),
            lod,
            ctx.config,
        ));
        let mut out = vec![];
        push_dashes(&mut out, lod, dashes);
        out
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StopSolidLine {
    pub color: Color,
    pub width: f32,
}

impl Default for StopSolidLine {
    fn default() -> Self {
        Self {
            color: default_color(),
            width: 0.3,
        }
    }
}

style_properties!(StopSolidLine, StyleType::StopLineSolid, Capabilities::COLOR | Capabilities::WIDTH, {
    Color => color,
    Width => width,
});

impl StopSolidLine {
    pub fn calculate(&self, geometry: &LineGeometry, lod: MarkingLod, ctx: &CalcContext<'_>) -> Vec<StyleData> {
        let mut out = vec![];
        push_dashes(
            &mut out,
            lod,
            solid_pass(&geometry.flat(), &geometry.borders, self.width, self.color, lod, ctx.config),
        );
        out
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StopDashedLine {
    pub color: Color,
    pub width: f32,
    pub dash_length: f32,
    pub space_length: f32,
}

impl Default for StopDashedLine {
    fn default() -> Self {
        Self {
            color: default_color(),
            width: 0.3,
            dash_length: 1.0,
            space_length: 1.0,
        }
    }
}

style_properties!(StopDashedLine, StyleType::StopLineDashed,
    Capabilities::COLOR | Capabilities::WIDTH | Capabilities::DASHED, {
    Color => color,
    Width => width,
    DashLength => dash_length,
    SpaceLength => space_length,
});

impl StopDashedLine {
    pub fn calculate(&self, geometry: &LineGeometry, lod: MarkingLod, ctx: &CalcContext<'_>) -> Vec<StyleData> {
        let mut out = vec![];
        push_dashes(
            &mut out,
            lod,
            dashed_pass(
                &geometry.flat(),
                &geometry.borders,
                self.width,
                self.dash_length,
                self.space_length,
                self.color,
                lod,
                ctx.config,
            ),
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FixedAdvanceRenderer, StaticCatalog, TextCache};
    use geom::vec3;

    fn with_ctx(f: impl FnOnce(&CalcContext<'_>)) {
        let config = MarkingsConfig::default();
        let texts = TextCache::new(FixedAdvanceRenderer::default());
        let prefabs = StaticCatalog::default();
        f(&CalcContext {
            config: &config,
            texts: &texts,
            prefabs: &prefabs,
        })
    }

    fn line10() -> LineGeometry {
        LineGeometry::new(Trajectory::straight(vec3(0.0, 0.0, 0.0), vec3(10.0, 0.0, 0.0)))
    }

    #[test]
    fn test_dashed_scenario() {
        with_ctx(|ctx| {
            let style = DashedLine {
                dash_length: 3.0,
                space_length: 1.5,
                ..Default::default()
            };
            let data = style.calculate(&line10(), MarkingLod::Lod0, ctx);
            assert_eq!(data.len(), 1);
            let dashes = data[0].dashes();
            assert_eq!(dashes.len(), 2);
            assert!((dashes[0].position.x - 2.75).abs() < 1e-4);
            assert!((dashes[1].position.x - 7.25).abs() < 1e-4);
            assert!((dashes[0].length - 3.0).abs() < 1e-4);
        });
    }

    #[test]
    fn test_tiny_dash_is_capped() {
        with_ctx(|ctx| {
            let style = DashedLine {
                dash_length: 1e-30,
                space_length: 0.0,
                ..Default::default()
            };
            let data = style.calculate(&line10(), MarkingLod::Lod0, ctx);
            let n: usize = data.iter().map(StyleData::count).sum();
            assert!(n > 0 && n <= crate::style_helper::MAX_ITEMS, "{}", n);
        });
    }

    #[test]
    fn test_double_alignment() {
        assert_eq!(double_offsets(Alignment::Centre, 1.0), (-0.5, 0.5));
        assert_eq!(double_offsets(Alignment::Left, 1.0), (0.0, 1.0));
        assert_eq!(double_offsets(Alignment::Right, 1.0), (0.0, -1.0));

        with_ctx(|ctx| {
            let style = DoubleSolidLine {
                alignment: Alignment::Left,
                offset: 2.0,
                ..Default::default()
            };
            let data = style.calculate(&line10(), MarkingLod::Lod0, ctx);
            let ys: Vec<f32> = data[0].dashes().iter().map(|d| d.position.y).collect();
            assert_eq!(ys.len(), 2);
            assert!(ys[0].abs() < 1e-5);
            assert!((ys[1] - 2.0).abs() < 1e-5);
        });
    }

    #[test]
    fn test_solid_and_dashed_offsets() {
        let mut s = SolidAndDashedLine {
            offset: 1.0,
            ..Default::default()
        };
        assert_eq!(s.offsets(), (-0.5, 0.5));
        s.invert = true;
        assert_eq!(s.offsets(), (0.5, -0.5));
        s.center_solid = true;
        assert_eq!(s.offsets(), (0.0, -1.0));
    }

    #[test]
    fn test_asym_shares_period() {
        let traj = Trajectory::straight(vec3(0.0, 0.0, 0.0), vec3(10.0, 0.0, 0.0));
        let s = DoubleDashedAsymLine {
            dash_length: 2.0,
            dash_length_b: 1.0,
            space_length: 1.0,
            ..Default::default()
        };
        let (a, b) = s.parts(&traj);
        assert_eq!(a.len(), b.len());
        for (a, b) in a.iter().zip(&b) {
            assert!((a.mid() - b.mid()).abs() < 1e-5);
            assert!((b.end - b.start - 0.1).abs() < 1e-5);
        }
    }

    #[test]
    fn test_lod1_drops_thin_lines() {
        with_ctx(|ctx| {
            let style = SolidLine {
                width: 0.05,
                ..Default::default()
            };
            assert!(style.calculate(&line10(), MarkingLod::Lod1, ctx).is_empty());
            assert_eq!(style.calculate(&line10(), MarkingLod::Lod0, ctx).len(), 1);
        });
    }
}
