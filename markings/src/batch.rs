//! Groups generated primitives into instance batches for the renderer.

use crate::{DashData, LodType, MarkingLod, MarkingsConfig, MaterialType, StyleData};
use std::collections::BTreeMap;

/// Dashes drawn with one instanced call: same lod, material and (rounded) size
#[derive(Clone, Debug, PartialEq)]
pub struct DashBatch {
    pub lod: MarkingLod,
    pub material: MaterialType,
    pub dashes: Vec<DashData>,
}

#[derive(Clone, Debug, Default)]
pub struct Batches {
    /// Ordered by (lod, material, length, width)
    pub dashes: Vec<DashBatch>,
    /// Every other primitive, in input order for each (type, lod)
    pub others: BTreeMap<(LodType, MarkingLod), Vec<StyleData>>,
}

impl Batches {
    pub fn dash_count(&self) -> usize {
        self.dashes.iter().map(|b| b.dashes.len()).sum()
    }

    pub fn of_lod(&self, lod: MarkingLod) -> impl Iterator<Item = &DashBatch> {
        self.dashes.iter().filter(move |b| b.lod == lod)
    }
}

type DashKey = (MarkingLod, MaterialType, i32, i32);

fn round_size(v: f32, rounding: f32) -> i32 {
    if rounding <= 0.0 {
        return (v * 1000.0).round() as i32;
    }
    (v / rounding).round() as i32
}

pub fn batch<'a>(data: impl IntoIterator<Item = &'a StyleData>, config: &MarkingsConfig) -> Batches {
    let mut dashes: BTreeMap<DashKey, Vec<DashData>> = BTreeMap::new();
    let mut others: BTreeMap<(LodType, MarkingLod), Vec<StyleData>> = BTreeMap::new();

    for d in data {
        match d {
            StyleData::Dashes { lod, dashes: ds } => {
                for dash in ds {
                    let key = (
                        *lod,
                        dash.material.clone(),
                        round_size(dash.length, config.batch_size_rounding),
                        round_size(dash.width, config.batch_size_rounding),
                    );
                    dashes.entry(key).or_default().push(dash.clone());
                }
            }
            _ => {
                if d.is_empty() {
                    continue;
                }
                others.entry((d.lod_type(), d.lod())).or_default().push(d.clone());
            }
        }
    }

    let size = config.dash_batch_size.max(1);
    let mut out = Vec::new();
    for ((lod, material, _, _), ds) in dashes {
        for chunk in ds.chunks(size) {
            out.push(DashBatch {
                lod,
                material: material.clone(),
                dashes: chunk.to_vec(),
            });
        }
    }

    Batches { dashes: out, others }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geom::{vec3, Color};

    fn dash(x: f32, length: f32, material: MaterialType) -> DashData {
        DashData::between(
            vec3(x, 0.0, 0.0),
            vec3(x + length, 0.0, 0.0),
            0.15,
            Color::WHITE,
            material,
        )
    }

    #[test]
    fn test_chunks_and_keys() {
        let config = MarkingsConfig::default();
        let mut many: Vec<DashData> = (0..40).map(|i| dash(i as f32 * 3.0, 1.5, MaterialType::Rectangle)).collect();
        many.push(dash(0.0, 2.0, MaterialType::Rectangle));
        many.push(dash(0.0, 1.5, MaterialType::Triangle));
        let data = vec![
            StyleData::Dashes {
                lod: MarkingLod::Lod0,
                dashes: many,
            },
            StyleData::Dashes {
                lod: MarkingLod::Lod1,
                dashes: vec![dash(0.0, 1.5, MaterialType::Rectangle)],
            },
        ];
        let b = batch(&data, &config);
        assert_eq!(b.dash_count(), 43);
        // 40 same size dashes in 3 chunks of 16, then the longer one, then the triangle
        let sizes: Vec<usize> = b.of_lod(MarkingLod::Lod0).map(|b| b.dashes.len()).collect();
        assert_eq!(sizes, vec![16, 16, 8, 1, 1]);
        assert_eq!(b.dashes.last().map(|b| b.lod), Some(MarkingLod::Lod1));
        for batch in &b.dashes {
            assert!(batch.dashes.iter().all(|d| d.material == batch.material));
        }
    }

    #[test]
    fn test_others_keep_order() {
        let config = MarkingsConfig::default();
        let mesh = |e: f32| {
            StyleData::Mesh(crate::MeshData {
                lod: MarkingLod::Lod0,
                vertices: vec![vec3(0.0, 0.0, 0.0), vec3(1.0, 0.0, 0.0), vec3(0.0, 1.0, 0.0)],
                indices: vec![0, 1, 2],
                elevation: e,
                material: crate::MeshMaterial::Grass,
            })
        };
        let data = vec![mesh(1.0), mesh(2.0)];
        let b = batch(&data, &config);
        let meshes = &b.others[&(LodType::Mesh, MarkingLod::Lod0)];
        assert_eq!(meshes, &data);
        assert!(b.dashes.is_empty());
    }
}
