use super::line::solid_pass;
use super::{default_color, CalcContext, LineGeometry};
use crate::property::style_properties;
use crate::style_data::push_dashes;
use crate::style_helper::{calculate_dashed, check_borders, check_dashed_lod};
use crate::{Capabilities, DashData, MarkingLod, MaterialType, StyleData, StyleType};
use geom::Color;

/// Stripes across the road. The crosswalk is drawn on the left of its line,
/// starting `offset_before` away from it. `offset_after` keeps the same kind of
/// gap past the far end of the stripes, it moves what comes after the crosswalk.
#[derive(Clone, Debug, PartialEq)]
pub struct ZebraCrosswalk {
    pub color: Color,
    pub second_color: Color,
    pub use_second_color: bool,
    /// Crossing width, the length of the stripes
    pub width: f32,
    pub dash_length: f32,
    pub space_length: f32,
    pub offset_before: f32,
    pub offset_after: f32,
    /// Stripes follow the line direction instead of the straight crossing direction
    pub parallel: bool,
}

impl Default for ZebraCrosswalk {
    fn default() -> Self {
        Self {
            color: default_color(),
            second_color: default_color(),
            use_second_color: false,
            width: 2.0,
            dash_length: 0.4,
            space_length: 0.6,
            offset_before: 0.25,
            offset_after: 0.25,
            parallel: true,
        }
    }
}

style_properties!(ZebraCrosswalk, StyleType::CrosswalkZebra,
    Capabilities::COLOR | Capabilities::SECOND_COLOR | Capabilities::WIDTH | Capabilities::DASHED
        | Capabilities::OFFSETS | Capabilities::CROSSWALK, {
    Color => color,
    SecondColor => second_color,
    UseSecondColor => use_second_color,
    Width => width,
    DashLength => dash_length,
    SpaceLength => space_length,
    OffsetBefore => offset_before,
    OffsetAfter => offset_after,
    Parallel => parallel,
});

impl ZebraCrosswalk {
    /// Total depth of the crosswalk, from its line
    pub fn total_width(&self) -> f32 {
        self.offset_before + self.width + self.offset_after
    }

    /// Lateral range (near, far) of the stripes, from the line
    pub fn stripe_range(&self) -> (f32, f32) {
        (self.offset_before, self.total_width() - self.offset_after)
    }

    pub fn calculate(&self, geometry: &LineGeometry, lod: MarkingLod, ctx: &CalcContext<'_>) -> Vec<StyleData> {
        if self.width <= 0.0 || !check_dashed_lod(lod, self.dash_length, self.width, ctx.config) {
            return vec![];
        }
        let (near, far) = self.stripe_range();
        let centre_off = (near + far) * 0.5;
        let traj = geometry.flat().shift(centre_off, centre_off);
        let chord = (traj.end() - traj.start()).xy().angle_cossin();

        let dashes = calculate_dashed(&traj, self.dash_length, self.space_length)
            .into_iter()
            .filter_map(|p| check_borders(&traj, p, self.width, &geometry.borders, ctx.config))
            .enumerate()
            .map(|(i, p)| {
                let color = if self.use_second_color && i % 2 == 1 {
                    self.second_color
                } else {
                    self.color
                };
                let mut d = DashData::between(
                    traj.position(p.start),
                    traj.position(p.end),
                    self.width,
                    color,
                    MaterialType::Rectangle,
                );
                if !self.parallel {
                    d.angle = chord;
                }
                d
            })
            .collect();
        let mut out = vec![];
        push_dashes(&mut out, lod, dashes);
        out
    }
}

/// Crosswalk drawn as its two border lines
#[derive(Clone, Debug, PartialEq)]
pub struct DoubleSolidCrosswalk {
    pub color: Color,
    pub second_color: Color,
    pub use_second_color: bool,
    pub width: f32,
    pub line_width: f32,
    pub offset_before: f32,
    pub offset_after: f32,
}

impl Default for DoubleSolidCrosswalk {
    fn default() -> Self {
        Self {
            color: default_color(),
            second_color: default_color(),
            use_second_color: false,
            width: 2.0,
            line_width: 0.15,
            offset_before: 0.25,
            offset_after: 0.25,
        }
    }
}

style_properties!(DoubleSolidCrosswalk, StyleType::CrosswalkDoubleSolid,
    Capabilities::COLOR | Capabilities::SECOND_COLOR | Capabilities::WIDTH | Capabilities::OFFSETS
        | Capabilities::CROSSWALK_BORDER, {
    Color => color,
    SecondColor => second_color,
    UseSecondColor => use_second_color,
    Width => width,
    LineWidth => line_width,
    OffsetBefore => offset_before,
    OffsetAfter => offset_after,
});

impl DoubleSolidCrosswalk {
    pub fn total_width(&self) -> f32 {
        self.offset_before + self.width + self.offset_after
    }

    /// Lateral offsets of both border lines
    pub fn offsets(&self) -> (f32, f32) {
        let half = self.line_width * 0.5;
        (self.offset_before + half, self.total_width() - self.offset_after - half)
    }

    pub fn calculate(&self, geometry: &LineGeometry, lod: MarkingLod, ctx: &CalcContext<'_>) -> Vec<StyleData> {
        if self.width < self.line_width {
            return vec![];
        }
        let traj = geometry.flat();
        let (a, b) = self.offsets();
        let second = if self.use_second_color {
            self.second_color
        } else {
            self.color
        };
        let mut dashes = solid_pass(
            &traj.shift(a, a),
            &geometry.borders,
            self.line_width,
            self.color,
            lod,
            ctx.config,
        );
        dashes.extend(solid_pass(
            &traj.shift(b, b),
            &geometry.borders,
            self.line_width,
            second,
            lod,
            ctx.config,
        ));
        let mut out = vec![];
        push_dashes(&mut out, lod, dashes);
        out
    }
}
