//! Objects repeated along a line: props, trees, decals and network segments.

use super::{CalcContext, LineGeometry};
use crate::property::{style_properties, ColorOption, DistributionType, FixedEndType};
use crate::style_data::push_dashes;
use crate::style_helper::{capped_count, check_dashed_lod, MAX_ITEMS};
use crate::{
    Capabilities, DashData, MarkingLod, MaterialType, NetworkSegmentInstance, ObjectInstance,
    PrefabInfo, StyleData, StyleType,
};
use common::rand::{rand_range, randu3};
use geom::{Color, Degrees, Trajectory, Vec3};

/// How many objects are placed and where
#[derive(Clone, Debug, PartialEq)]
pub struct Distribution {
    /// Distance between objects, None uses the prefab length
    pub step: Option<f32>,
    /// Chance in percent that an object is kept
    pub probability: u32,
    pub kind: DistributionType,
    pub fixed_end: FixedEndType,
    pub min_count: Option<u32>,
    pub max_count: Option<u32>,
    /// Length left empty at the start of the line
    pub offset_before: f32,
    /// Length left empty at the end of the line
    pub offset_after: f32,
}

impl Default for Distribution {
    fn default() -> Self {
        Self {
            step: None,
            probability: 100,
            kind: DistributionType::FixedSpaceFreeEnd,
            fixed_end: FixedEndType::Both,
            min_count: None,
            max_count: None,
            offset_before: 0.0,
            offset_after: 0.0,
        }
    }
}

impl Distribution {
    pub fn count(&self, length: f32, step: f32) -> usize {
        let ratio = length / step;
        let raw = match self.kind {
            DistributionType::FixedSpaceFreeEnd | DistributionType::FixedSpaceFixedEnd => {
                capped_count(ratio.floor()) + 1
            }
            DistributionType::DynamicSpaceFreeEnd => capped_count(ratio.round()).max(1),
            DistributionType::DynamicSpaceFixedEnd => (capped_count(ratio.round()) + 1).max(2),
        };
        let mut count = raw;
        if let Some(min) = self.min_count {
            count = count.max(min as usize);
        }
        if let Some(max) = self.max_count {
            count = count.min(max as usize);
        }
        if count > MAX_ITEMS {
            log::debug!("{} objects clamped to {}", count, MAX_ITEMS);
            count = MAX_ITEMS;
        }
        count
    }

    /// Distances of the objects from the start of a span of the given length
    pub fn distances(&self, length: f32, step: f32) -> Vec<f32> {
        if length < 0.0 || step <= 0.0 || !length.is_finite() {
            return vec![];
        }
        let count = self.count(length, step);
        if count == 0 {
            return vec![];
        }
        let fitted = if count > 1 && (count - 1) as f32 * step > length {
            length / (count - 1) as f32
        } else {
            step
        };

        match self.kind {
            DistributionType::FixedSpaceFreeEnd => {
                let start = (length - (count - 1) as f32 * fitted) * 0.5;
                (0..count).map(|i| start + i as f32 * fitted).collect()
            }
            DistributionType::FixedSpaceFixedEnd => match self.fixed_end {
                FixedEndType::Start => (0..count).map(|i| i as f32 * fitted).collect(),
                FixedEndType::End => (0..count).rev().map(|i| length - i as f32 * fitted).collect(),
                FixedEndType::Both => {
                    let mut v: Vec<f32> = (0..count).map(|i| i as f32 * fitted).collect();
                    let cap = self.max_count.map_or(MAX_ITEMS, |max| (max as usize).min(MAX_ITEMS));
                    let room = v.len() < cap;
                    if let Some(&last) = v.last() {
                        if length - last > 1e-3 && room {
                            v.push(length);
                        }
                    }
                    v
                }
            },
            DistributionType::DynamicSpaceFreeEnd => {
                let s = length / count as f32;
                (0..count).map(|i| (i as f32 + 0.5) * s).collect()
            }
            DistributionType::DynamicSpaceFixedEnd => {
                if count == 1 {
                    return vec![length * 0.5];
                }
                let s = length / (count - 1) as f32;
                (0..count).map(|i| i as f32 * s).collect()
            }
        }
    }

    /// Parameters along the trajectory where objects go, with the index used to seed their jitter
    pub fn place(&self, traj: &Trajectory, step: f32, seed: u32) -> Vec<(u32, f32)> {
        if traj.is_degenerate() {
            return vec![];
        }
        let usable = traj.length() - self.offset_before - self.offset_after;
        if usable < 0.0 {
            log::debug!("offsets are longer than the line");
            return vec![];
        }
        let mut t = 0.0;
        let mut d = 0.0;
        let mut placed = vec![];
        for (i, dist) in self.distances(usable, step).into_iter().enumerate() {
            let target = dist + self.offset_before;
            t = traj.travel(t, target - d);
            d = target;
            let i = i as u32;
            if randu3(seed, i, 7) * 100.0 >= self.probability as f32 {
                continue;
            }
            placed.push((i, t));
        }
        placed
    }
}

/// Random variations within [min; max] ranges. Angles are in degrees.
#[derive(Clone, Debug, PartialEq)]
pub struct Jitter {
    pub shift_min: f32,
    pub shift_max: f32,
    pub angle_min: f32,
    pub angle_max: f32,
    pub scale_min: f32,
    pub scale_max: f32,
    pub elevation_min: f32,
    pub elevation_max: f32,
}

impl Default for Jitter {
    fn default() -> Self {
        Self {
            shift_min: 0.0,
            shift_max: 0.0,
            angle_min: 0.0,
            angle_max: 0.0,
            scale_min: 1.0,
            scale_max: 1.0,
            elevation_min: 0.0,
            elevation_max: 0.0,
        }
    }
}

/// Lean of the objects, in degrees
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Tilt {
    pub tilt_min: f32,
    pub tilt_max: f32,
    pub slope_min: f32,
    pub slope_max: f32,
}

/// Same line, same objects
fn seed_of(traj: &Trajectory) -> u32 {
    let s = traj.start();
    common::hash_u64((s.x.to_bits(), s.y.to_bits(), s.z.to_bits())) as u32
}

/// One jittered object on the line
struct Placement {
    position: Vec3,
    angle: f32,
    scale: f32,
}

fn jittered(traj: &Trajectory, t: f32, jitter: &Jitter, seed: u32, i: u32) -> Placement {
    let dir = traj.tangent_flat(t);
    let shift = rand_range(seed, i, 0, jitter.shift_min, jitter.shift_max);
    let elevation = rand_range(seed, i, 3, jitter.elevation_min, jitter.elevation_max);
    let position = traj.position(t) + (dir.perp_left() * shift).z(elevation);
    let angle = dir.angle_cossin().0
        + Degrees(rand_range(seed, i, 1, jitter.angle_min, jitter.angle_max))
            .to_radians()
            .0;
    Placement {
        position,
        angle,
        scale: rand_range(seed, i, 2, jitter.scale_min, jitter.scale_max),
    }
}

fn objects(
    traj: &Trajectory,
    info: &PrefabInfo,
    prefab: &str,
    distribution: &Distribution,
    jitter: &Jitter,
    tilt: &Tilt,
    color: impl Fn(u32, u32) -> Color,
) -> Vec<ObjectInstance> {
    let step = distribution.step.unwrap_or(info.length);
    let seed = seed_of(traj);
    distribution
        .place(traj, step, seed)
        .into_iter()
        .map(|(i, t)| {
            let p = jittered(traj, t, jitter, seed, i);
            ObjectInstance {
                prefab: prefab.to_string(),
                position: p.position,
                angle: geom::Radians(p.angle).normalized(),
                tilt: Degrees(rand_range(seed, i, 4, tilt.tilt_min, tilt.tilt_max)).to_radians(),
                slope: Degrees(rand_range(seed, i, 5, tilt.slope_min, tilt.slope_max)).to_radians(),
                scale: p.scale,
                color: color(seed, i),
            }
        })
        .collect()
}

fn lookup<'a>(ctx: &'a CalcContext<'_>, prefab: &str) -> Option<&'a PrefabInfo> {
    if prefab.is_empty() {
        return None;
    }
    let info = ctx.prefabs.prefab(prefab);
    if info.is_none() {
        log::debug!("unknown prefab {}", prefab);
    }
    info
}

#[derive(Clone, Debug, PartialEq)]
pub struct PropLine {
    pub prefab: String,
    pub color_option: ColorOption,
    pub color: Color,
    pub distribution: Distribution,
    pub jitter: Jitter,
    pub tilt: Tilt,
}

impl Default for PropLine {
    fn default() -> Self {
        Self {
            prefab: String::new(),
            color_option: ColorOption::Default,
            color: Color::WHITE,
            distribution: Distribution::default(),
            jitter: Jitter::default(),
            tilt: Tilt::default(),
        }
    }
}

style_properties!(PropLine, StyleType::LineProp,
    Capabilities::COLOR | Capabilities::COLOR_OPTION | Capabilities::PREFAB | Capabilities::DISTRIBUTION
        | Capabilities::OFFSETS | Capabilities::JITTER | Capabilities::TILT, {
    Color => color,
    ColorOption => color_option,
    Prefab => prefab,
    ObjectStep => distribution.step,
    Probability => distribution.probability,
    Distribution => distribution.kind,
    FixedEnd => distribution.fixed_end,
    MinCount => distribution.min_count,
    MaxCount => distribution.max_count,
    OffsetBefore => distribution.offset_before,
    OffsetAfter => distribution.offset_after,
    ShiftMin => jitter.shift_min,
    ShiftMax => jitter.shift_max,
    AngleMin => jitter.angle_min,
    AngleMax => jitter.angle_max,
    ScaleMin => jitter.scale_min,
    ScaleMax => jitter.scale_max,
    ElevationMin => jitter.elevation_min,
    ElevationMax => jitter.elevation_max,
    TiltMin => tilt.tilt_min,
    TiltMax => tilt.tilt_max,
    SlopeMin => tilt.slope_min,
    SlopeMax => tilt.slope_max,
});

impl PropLine {
    pub fn calculate(&self, geometry: &LineGeometry, lod: MarkingLod, ctx: &CalcContext<'_>) -> Vec<StyleData> {
        if lod != MarkingLod::Lod0 {
            return vec![];
        }
        let info = common::unwrap_ret!(lookup(ctx, &self.prefab), vec![]);
        let color = |seed: u32, i: u32| match self.color_option {
            ColorOption::Default => info.default_color,
            ColorOption::Custom => self.color,
            ColorOption::Random => {
                if info.variations.is_empty() {
                    return info.default_color;
                }
                let n = info.variations.len();
                info.variations[((randu3(seed, i, 6) * n as f32) as usize).min(n - 1)]
            }
        };
        let props = objects(
            &geometry.flat(),
            info,
            &self.prefab,
            &self.distribution,
            &self.jitter,
            &self.tilt,
            color,
        );
        if props.is_empty() {
            return vec![];
        }
        vec![StyleData::Props { lod, props }]
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TreeLine {
    pub prefab: String,
    pub distribution: Distribution,
    pub jitter: Jitter,
    pub tilt: Tilt,
}

style_properties!(TreeLine, StyleType::LineTree,
    Capabilities::PREFAB | Capabilities::DISTRIBUTION | Capabilities::OFFSETS | Capabilities::JITTER
        | Capabilities::TILT, {
    Prefab => prefab,
    ObjectStep => distribution.step,
    Probability => distribution.probability,
    Distribution => distribution.kind,
    FixedEnd => distribution.fixed_end,
    MinCount => distribution.min_count,
    MaxCount => distribution.max_count,
    OffsetBefore => distribution.offset_before,
    OffsetAfter => distribution.offset_after,
    ShiftMin => jitter.shift_min,
    ShiftMax => jitter.shift_max,
    AngleMin => jitter.angle_min,
    AngleMax => jitter.angle_max,
    ScaleMin => jitter.scale_min,
    ScaleMax => jitter.scale_max,
    ElevationMin => jitter.elevation_min,
    ElevationMax => jitter.elevation_max,
    TiltMin => tilt.tilt_min,
    TiltMax => tilt.tilt_max,
    SlopeMin => tilt.slope_min,
    SlopeMax => tilt.slope_max,
});

impl TreeLine {
    pub fn calculate(&self, geometry: &LineGeometry, lod: MarkingLod, ctx: &CalcContext<'_>) -> Vec<StyleData> {
        if lod != MarkingLod::Lod0 {
            return vec![];
        }
        let info = common::unwrap_ret!(lookup(ctx, &self.prefab), vec![]);
        let trees = objects(
            &geometry.flat(),
            info,
            &self.prefab,
            &self.distribution,
            &self.jitter,
            &self.tilt,
            |_, _| Color::WHITE,
        );
        if trees.is_empty() {
            return vec![];
        }
        vec![StyleData::Trees { lod, trees }]
    }
}

/// Flat textured prefabs laid along the line
#[derive(Clone, Debug, PartialEq)]
pub struct DecalLine {
    pub prefab: String,
    pub color: Color,
    pub distribution: Distribution,
    pub jitter: Jitter,
}

impl Default for DecalLine {
    fn default() -> Self {
        Self {
            prefab: String::new(),
            color: Color::WHITE,
            distribution: Distribution::default(),
            jitter: Jitter::default(),
        }
    }
}

style_properties!(DecalLine, StyleType::LineDecal,
    Capabilities::COLOR | Capabilities::PREFAB | Capabilities::DISTRIBUTION | Capabilities::OFFSETS
        | Capabilities::JITTER, {
    Color => color,
    Prefab => prefab,
    ObjectStep => distribution.step,
    Probability => distribution.probability,
    Distribution => distribution.kind,
    FixedEnd => distribution.fixed_end,
    MinCount => distribution.min_count,
    MaxCount => distribution.max_count,
    OffsetBefore => distribution.offset_before,
    OffsetAfter => distribution.offset_after,
    ShiftMin => jitter.shift_min,
    ShiftMax => jitter.shift_max,
    AngleMin => jitter.angle_min,
    AngleMax => jitter.angle_max,
    ScaleMin => jitter.scale_min,
    ScaleMax => jitter.scale_max,
    ElevationMin => jitter.elevation_min,
    ElevationMax => jitter.elevation_max,
});

impl DecalLine {
    pub fn calculate(&self, geometry: &LineGeometry, lod: MarkingLod, ctx: &CalcContext<'_>) -> Vec<StyleData> {
        let info = common::unwrap_ret!(lookup(ctx, &self.prefab), vec![]);
        let traj = geometry.flat();
        let step = self.distribution.step.unwrap_or(info.length);
        let seed = seed_of(&traj);
        let dashes = self
            .distribution
            .place(&traj, step, seed)
            .into_iter()
            .map(|(i, t)| {
                let p = jittered(&traj, t, &self.jitter, seed, i);
                DashData {
                    position: p.position,
                    angle: geom::Radians(p.angle).normalized(),
                    length: info.length * p.scale,
                    width: info.width * p.scale,
                    color: self.color,
                    material: MaterialType::Decal(self.prefab.clone()),
                }
            })
            .filter(|d| check_dashed_lod(lod, d.width, d.length, ctx.config))
            .collect();
        let mut out = vec![];
        push_dashes(&mut out, lod, dashes);
        out
    }
}

/// Road-like prefab drawn along the line, cut in segments
#[derive(Clone, Debug, PartialEq)]
pub struct NetworkLine {
    pub prefab: String,
    /// Lateral offset from the line
    pub offset: f32,
    pub elevation: f32,
    pub scale: f32,
    /// Preferred segment length, 0 uses the prefab's
    pub repeat_distance: f32,
    pub offset_before: f32,
    pub offset_after: f32,
    pub invert: bool,
}

impl Default for NetworkLine {
    fn default() -> Self {
        Self {
            prefab: String::new(),
            offset: 0.0,
            elevation: 0.0,
            scale: 1.0,
            repeat_distance: 64.0,
            offset_before: 0.0,
            offset_after: 0.0,
            invert: false,
        }
    }
}

style_properties!(NetworkLine, StyleType::LineNetwork,
    Capabilities::PREFAB | Capabilities::OFFSET | Capabilities::ELEVATION | Capabilities::SCALE
        | Capabilities::NETWORK | Capabilities::OFFSETS | Capabilities::INVERT, {
    Prefab => prefab,
    Offset => offset,
    Elevation => elevation,
    Scale => scale,
    RepeatDistance => repeat_distance,
    OffsetBefore => offset_before,
    OffsetAfter => offset_after,
    Invert => invert,
});

impl NetworkLine {
    pub fn calculate(&self, geometry: &LineGeometry, lod: MarkingLod, ctx: &CalcContext<'_>) -> Vec<StyleData> {
        if lod != MarkingLod::Lod0 || self.prefab.is_empty() {
            return vec![];
        }
        let info = common::unwrap_retlog!(
            ctx.prefabs.network(&self.prefab),
            vec![],
            "unknown network prefab {}",
            self.prefab
        );
        let mut traj = geometry.flat();
        if traj.is_degenerate() {
            return vec![];
        }
        let l = traj.length();
        if l - self.offset_before - self.offset_after <= 0.0 {
            return vec![];
        }
        let t0 = traj.travel(0.0, self.offset_before);
        let t1 = traj.travel(1.0, -self.offset_after);
        traj = traj.cut(t0, t1).shift(self.offset, self.offset);
        if self.invert {
            traj = traj.invert();
        }

        let repeat = if self.repeat_distance > 0.0 {
            self.repeat_distance
        } else {
            info.segment_length
        };
        let count = capped_count((traj.length() / repeat).round()).max(1);
        let seg = traj.length() / count as f32;

        let mut segments = Vec::with_capacity(count);
        let mut t = 0.0;
        for _ in 0..count {
            let next = traj.travel(t, seg);
            let up = Vec3::Z * self.elevation;
            segments.push(NetworkSegmentInstance {
                prefab: self.prefab.clone(),
                start: traj.position(t) + up,
                end: traj.position(next) + up,
                start_dir: traj.tangent_flat(t),
                end_dir: traj.tangent_flat(next),
                width: info.width * self.scale,
                elevation: self.elevation,
                scale: self.scale,
            });
            t = next;
        }
        vec![StyleData::Network { lod, segments }]
    }
}
