use crate::text_cache::TextureHandle;
use crate::{LodType, MarkingLod};
use geom::{Color, Radians, Vec2, Vec3};

/// How a dash quad is textured
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MaterialType {
    Rectangle,
    Triangle,
    /// Shared text texture, released when the last dash using it is dropped
    Text(TextureHandle),
    /// Flat textured prefab
    Decal(String),
}

/// One quad laid on the ground, `angle` is the direction of its length
#[derive(Clone, Debug, PartialEq)]
pub struct DashData {
    pub position: Vec3,
    pub angle: Radians,
    pub length: f32,
    pub width: f32,
    pub color: Color,
    pub material: MaterialType,
}

impl DashData {
    /// Quad spanning from start to end
    pub fn between(start: Vec3, end: Vec3, width: f32, color: Color, material: MaterialType) -> Self {
        let d = (end - start).xy();
        Self {
            position: (start + end) * 0.5,
            angle: d.angle_cossin(),
            length: d.mag(),
            width,
            color,
            material,
        }
    }

    pub fn direction(&self) -> Vec2 {
        self.angle.vec2()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MeshMaterial {
    Pavement,
    Grass,
    Gravel,
    Ruined,
    Cliff,
    Curb,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MeshData {
    pub lod: MarkingLod,
    pub vertices: Vec<Vec3>,
    pub indices: Vec<u32>,
    /// Height of the mesh top above the contour
    pub elevation: f32,
    pub material: MeshMaterial,
}

impl MeshData {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// One road-like segment of a network prefab
#[derive(Clone, Debug, PartialEq)]
pub struct NetworkSegmentInstance {
    pub prefab: String,
    pub start: Vec3,
    pub end: Vec3,
    pub start_dir: Vec2,
    pub end_dir: Vec2,
    pub width: f32,
    pub elevation: f32,
    pub scale: f32,
}

/// A prop or tree placed on the marking
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectInstance {
    pub prefab: String,
    pub position: Vec3,
    pub angle: Radians,
    pub tilt: Radians,
    pub slope: Radians,
    pub scale: f32,
    pub color: Color,
}

/// Generated render primitive, always tagged with the LOD it was generated for
#[derive(Clone, Debug, PartialEq)]
pub enum StyleData {
    Dashes {
        lod: MarkingLod,
        dashes: Vec<DashData>,
    },
    Mesh(MeshData),
    Network {
        lod: MarkingLod,
        segments: Vec<NetworkSegmentInstance>,
    },
    Props {
        lod: MarkingLod,
        props: Vec<ObjectInstance>,
    },
    Trees {
        lod: MarkingLod,
        trees: Vec<ObjectInstance>,
    },
}

impl StyleData {
    pub fn lod(&self) -> MarkingLod {
        match self {
            StyleData::Dashes { lod, .. }
            | StyleData::Network { lod, .. }
            | StyleData::Props { lod, .. }
            | StyleData::Trees { lod, .. } => *lod,
            StyleData::Mesh(m) => m.lod,
        }
    }

    pub fn lod_type(&self) -> LodType {
        match self {
            StyleData::Dashes { .. } => LodType::Dash,
            StyleData::Mesh(_) => LodType::Mesh,
            StyleData::Network { .. } => LodType::Network,
            StyleData::Props { .. } => LodType::Prop,
            StyleData::Trees { .. } => LodType::Tree,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            StyleData::Dashes { dashes, .. } => dashes.is_empty(),
            StyleData::Mesh(m) => m.indices.is_empty(),
            StyleData::Network { segments, .. } => segments.is_empty(),
            StyleData::Props { props, .. } => props.is_empty(),
            StyleData::Trees { trees, .. } => trees.is_empty(),
        }
    }

    /// Number of dashes, segments or objects, or triangles for meshes
    pub fn count(&self) -> usize {
        match self {
            StyleData::Dashes { dashes, .. } => dashes.len(),
            StyleData::Mesh(m) => m.triangle_count(),
            StyleData::Network { segments, .. } => segments.len(),
            StyleData::Props { props, .. } => props.len(),
            StyleData::Trees { trees, .. } => trees.len(),
        }
    }

    pub fn dashes(&self) -> &[DashData] {
        match self {
            StyleData::Dashes { dashes, .. } => dashes,
            _ => &[],
        }
    }
}

/// Wraps dashes into a primitive, skipping empty lists
pub(crate) fn push_dashes(out: &mut Vec<StyleData>, lod: MarkingLod, dashes: Vec<DashData>) {
    if dashes.is_empty() {
        return;
    }
    out.push(StyleData::Dashes { lod, dashes });
}
