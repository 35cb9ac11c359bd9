use crate::error::ConfigError;
use crate::MarkingLod;
use geom::Degrees;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Numeric policy of the marking generation.
/// Every field has a default so partial json files are accepted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkingsConfig {
    /// Dashes thinner than this are not generated at LOD1
    pub lod_min_width: f32,
    /// Dashes shorter than this are not generated at LOD1
    pub lod_min_length: f32,

    /// Maximum direction change of a solid part, in degrees
    pub solid_max_angle_lod0: f32,
    pub solid_max_angle_lod1: f32,
    pub solid_min_length: f32,
    pub solid_max_length: f32,
    pub solid_max_depth: u32,

    /// Clipped parts shorter than this are dropped
    pub min_part_length: f32,

    pub dash_batch_size: usize,
    /// Granularity used to round dash sizes into batch keys
    pub batch_size_rounding: f32,

    /// Width of the stripes covering a solid filler
    pub solid_filler_width: f32,

    pub curb_lip: f32,
    pub min_corner_angle: f32,

    /// World size of one text pixel at scale 1
    pub text_pixel_scale: f32,
}

impl Default for MarkingsConfig {
    fn default() -> Self {
        Self {
            lod_min_width: 0.15,
            lod_min_length: 1.0,
            solid_max_angle_lod0: 5.0,
            solid_max_angle_lod1: 20.0,
            solid_min_length: 1.0,
            solid_max_length: 50.0,
            solid_max_depth: 8,
            min_part_length: 0.05,
            dash_batch_size: 16,
            batch_size_rounding: 0.05,
            solid_filler_width: 0.5,
            curb_lip: 0.05,
            min_corner_angle: 1.0,
            text_pixel_scale: 0.01,
        }
    }
}

impl MarkingsConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    pub fn solid_max_angle(&self, lod: MarkingLod) -> f32 {
        let deg = match lod {
            MarkingLod::Lod0 => self.solid_max_angle_lod0,
            MarkingLod::Lod1 => self.solid_max_angle_lod1,
        };
        Degrees(deg).to_radians().0
    }
}
