use serde::{Deserialize, Serialize};

/// Rendering distance tier, Lod0 is the closest and most detailed
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MarkingLod {
    Lod0,
    Lod1,
}

impl MarkingLod {
    pub const ALL: [MarkingLod; 2] = [MarkingLod::Lod0, MarkingLod::Lod1];
}

/// Which renderer consumes a primitive
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LodType {
    Dash,
    Mesh,
    Network,
    Prop,
    Tree,
}
