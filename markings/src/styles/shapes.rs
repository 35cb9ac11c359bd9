use super::line::part_dash;
use super::{default_color, CalcContext, LineGeometry};
use crate::property::{style_properties, ZigZagSide};
use crate::style_data::push_dashes;
use crate::style_helper::{calculate_dashed, capped_count, check_borders, check_dashed_lod};
use crate::text_cache::TextKey;
use crate::{Capabilities, DashData, MarkingLod, MaterialType, StyleData, StyleType};
use geom::{Color, Degrees, Radians, Trajectory, Vec3};
use itertools::Itertools;

/// Row of triangles, the "give way" marking
#[derive(Clone, Debug, PartialEq)]
pub struct SharkTeethLine {
    pub color: Color,
    pub base: f32,
    pub height: f32,
    pub space: f32,
    /// Slant of the teeth, in degrees
    pub angle: f32,
    pub invert: bool,
}

impl Default for SharkTeethLine {
    fn default() -> Self {
        Self {
            color: default_color(),
            base: 0.5,
            height: 0.6,
            space: 0.3,
            angle: 0.0,
            invert: false,
        }
    }
}

style_properties!(SharkTeethLine, StyleType::LineSharkTeeth,
    Capabilities::COLOR | Capabilities::SHARK_TEETH | Capabilities::ROTATE | Capabilities::INVERT, {
    Color => color,
    Base => base,
    Height => height,
    Space => space,
    Angle => angle,
    Invert => invert,
});

impl SharkTeethLine {
    /// Length taken by one tooth along the line, so slanted teeth keep their base
    pub fn tooth_length(&self) -> f32 {
        let angle = Degrees(self.angle).to_radians();
        self.base / angle.cos().abs().max(0.1)
    }

    pub fn calculate(&self, geometry: &LineGeometry, lod: MarkingLod, ctx: &CalcContext<'_>) -> Vec<StyleData> {
        let length = self.tooth_length();
        if self.height <= 0.0 || !check_dashed_lod(lod, self.height, length, ctx.config) {
            return vec![];
        }
        let shift = if self.invert {
            -self.height * 0.5
        } else {
            self.height * 0.5
        };
        let traj = geometry.flat().shift(shift, shift);
        let mut rotation = Degrees(self.angle).to_radians();
        if self.invert {
            rotation = rotation + Radians::PI;
        }

        let dashes = calculate_dashed(&traj, length, self.space)
            .into_iter()
            .filter_map(|p| check_borders(&traj, p, self.height, &geometry.borders, ctx.config))
            .map(|p| {
                let mut d = part_dash(&traj, p, self.height, self.color, MaterialType::Triangle);
                d.angle = (d.angle + rotation).normalized();
                d
            })
            .collect();
        let mut out = vec![];
        push_dashes(&mut out, lod, dashes);
        out
    }
}

/// Triangle wave along the line
#[derive(Clone, Debug, PartialEq)]
pub struct ZigZagLine {
    pub color: Color,
    pub width: f32,
    /// Length of one period
    pub step: f32,
    /// Distance of the apexes to the line
    pub offset: f32,
    pub side: ZigZagSide,
    pub start_from_line: bool,
}

impl Default for ZigZagLine {
    fn default() -> Self {
        Self {
            color: default_color(),
            width: 0.15,
            step: 2.0,
            offset: 1.0,
            side: ZigZagSide::Left,
            start_from_line: true,
        }
    }
}

style_properties!(ZigZagLine, StyleType::LineZigZag,
    Capabilities::COLOR | Capabilities::WIDTH | Capabilities::PERIODIC | Capabilities::OFFSET
        | Capabilities::ZIGZAG, {
    Color => color,
    Width => width,
    Step => step,
    Offset => offset,
    Side => side,
    StartFromLine => start_from_line,
});

impl ZigZagLine {
    /// Vertices of the wave
    pub fn points(&self, traj: &Trajectory) -> Vec<Vec3> {
        if traj.is_degenerate() || self.step <= 0.0 {
            return vec![];
        }
        let l = traj.length();
        // half steps, so the vertex count stays within the cap
        let n = capped_count((2.0 * l / self.step).floor()) / 2;
        if n == 0 {
            return vec![];
        }
        let start = (l - n as f32 * self.step) * 0.5;
        let half = self.step * 0.5;
        let amplitude = match self.side {
            ZigZagSide::Left => self.offset,
            ZigZagSide::Right => -self.offset,
        };
        let apex_parity = if self.start_from_line { 1 } else { 0 };

        let mut points = Vec::with_capacity(2 * n + 3);
        if !self.start_from_line {
            points.push(traj.start());
        }
        let mut t = 0.0;
        let mut d = 0.0;
        for k in 0..=2 * n {
            let target = start + k as f32 * half;
            t = traj.travel(t, target - d);
            d = target;
            let mut p = traj.position(t);
            if k % 2 == apex_parity {
                p += (traj.tangent_flat(t).perp_left() * amplitude).z0();
            }
            points.push(p);
        }
        if !self.start_from_line {
            points.push(traj.end());
        }
        points
    }

    pub fn calculate(&self, geometry: &LineGeometry, lod: MarkingLod, ctx: &CalcContext<'_>) -> Vec<StyleData> {
        if !check_dashed_lod(lod, self.width, self.step, ctx.config) {
            return vec![];
        }
        let points = self.points(&geometry.flat());
        let dashes = points
            .iter()
            .tuple_windows()
            .map(|(&a, &b)| DashData::between(a, b, self.width, self.color, MaterialType::Rectangle))
            .collect();
        let mut out = vec![];
        push_dashes(&mut out, lod, dashes);
        out
    }
}

/// Text painted on the road
#[derive(Clone, Debug, PartialEq)]
pub struct TextLine {
    pub color: Color,
    pub text: String,
    pub font: String,
    pub spacing: f32,
    pub scale: f32,
    /// Rotation relative to the line, in degrees
    pub angle: f32,
    /// Position along the line, from -0.5 (start) to 0.5 (end)
    pub shift: f32,
}

impl Default for TextLine {
    fn default() -> Self {
        Self {
            color: default_color(),
            text: "Text".to_string(),
            font: "Arial".to_string(),
            spacing: 0.0,
            scale: 1.0,
            angle: 0.0,
            shift: 0.0,
        }
    }
}

style_properties!(TextLine, StyleType::LineText,
    Capabilities::COLOR | Capabilities::TEXT | Capabilities::SCALE | Capabilities::ROTATE
        | Capabilities::SHIFT, {
    Color => color,
    Text => text,
    Font => font,
    Spacing => spacing,
    Scale => scale,
    Angle => angle,
    Shift => shift,
});

impl TextLine {
    pub fn calculate(&self, geometry: &LineGeometry, lod: MarkingLod, ctx: &CalcContext<'_>) -> Vec<StyleData> {
        if self.text.trim().is_empty() || self.scale <= 0.0 {
            return vec![];
        }
        let traj = geometry.flat();
        if traj.is_degenerate() {
            return vec![];
        }

        let handle = ctx
            .texts
            .acquire(TextKey::new(&self.font, &self.text, self.scale, self.spacing));
        let extent = handle.extent();
        let k = self.scale * ctx.config.text_pixel_scale;
        let length = extent.width as f32 * k;
        let width = extent.height as f32 * k;
        if !check_dashed_lod(lod, width, length, ctx.config) {
            return vec![];
        }

        let t = (0.5 + self.shift).clamp(0.0, 1.0);
        let angle = traj.tangent_flat(t).angle_cossin() + Degrees(self.angle).to_radians();
        let dash = DashData {
            position: traj.position(t),
            angle: angle.normalized(),
            length,
            width,
            color: self.color,
            material: MaterialType::Text(handle),
        };
        let mut out = vec![];
        push_dashes(&mut out, lod, vec![dash]);
        out
    }
}
