//! Procedural generation of road intersection markings: lines, crosswalks and filled areas
//! are turned into dash quads, meshes and object instances ready to be batched for rendering.

#![allow(clippy::too_many_arguments)]

pub mod batch;
pub mod capability;
pub mod clip;
pub mod config;
pub mod contour;
pub mod error;
pub mod lod;
pub mod marking;
pub mod prefab;
pub mod property;
pub mod rail;
pub mod style_data;
pub mod style_helper;
pub mod style_type;
pub mod styles;
pub mod text_cache;
pub mod triangulation;
pub mod xml;

#[cfg(test)]
mod tests;

pub use batch::{batch, Batches, DashBatch};
pub use capability::Capabilities;
pub use config::MarkingsConfig;
pub use contour::Contour;
pub use error::{ConfigError, PropertyError, StyleError};
pub use lod::{LodType, MarkingLod};
pub use marking::{FillerID, LineID, MarkingChange, MarkingID, MarkingSubscriber, Markings};
pub use prefab::{NetworkInfo, PrefabCatalog, PrefabInfo, StaticCatalog};
pub use property::{PropertyKind, PropertyName, PropertyValue, StyleProperties};
pub use style_data::{
    DashData, MaterialType, MeshData, MeshMaterial, NetworkSegmentInstance, ObjectInstance, StyleData,
};
pub use style_type::{StyleGroup, StyleType};
pub use styles::{CalcContext, FillerGeometry, FillerStyle, LineGeometry, LineStyle, Style};
pub use text_cache::{FixedAdvanceRenderer, TextCache, TextKey, TextRenderer};
