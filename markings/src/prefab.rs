use common::FastMap;
use geom::Color;
use serde::{Deserialize, Serialize};

/// Size and colors of a prop, tree or decal prefab
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrefabInfo {
    pub length: f32,
    pub width: f32,
    #[serde(default)]
    pub default_color: Color,
    #[serde(default)]
    pub variations: Vec<Color>,
}

/// Road-like prefab drawn along a line
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NetworkInfo {
    pub width: f32,
    /// Preferred segment length when the style does not give one
    pub segment_length: f32,
}

/// Lookup of prefab dimensions, the game owns the actual assets
pub trait PrefabCatalog {
    fn prefab(&self, name: &str) -> Option<&PrefabInfo>;
    fn network(&self, name: &str) -> Option<&NetworkInfo>;
}

/// In memory catalog, deserialized from scene files
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticCatalog {
    pub prefabs: FastMap<String, PrefabInfo>,
    pub networks: FastMap<String, NetworkInfo>,
}

impl StaticCatalog {
    pub fn with_prefab(mut self, name: &str, info: PrefabInfo) -> Self {
        self.prefabs.insert(name.to_string(), info);
        self
    }

    pub fn with_network(mut self, name: &str, info: NetworkInfo) -> Self {
        self.networks.insert(name.to_string(), info);
        self
    }
}

impl PrefabCatalog for StaticCatalog {
    fn prefab(&self, name: &str) -> Option<&PrefabInfo> {
        self.prefabs.get(name)
    }

    fn network(&self, name: &str) -> Option<&NetworkInfo> {
        self.networks.get(name)
    }
}
