#![allow(dead_code)]
#![cfg(test)]

use crate::{
    CalcContext, FillerGeometry, FillerID, FillerStyle, LineGeometry, LineID, LineStyle, MarkingID,
    Markings, MarkingsConfig, NetworkInfo, PrefabInfo, StaticCatalog, StyleData, TextCache,
};
use common::logger::MyLog;
use geom::{vec3, Trajectory, Vec3};
use quickcheck::{Arbitrary, Gen};

mod scenarios;
mod test_layout;
mod test_triangulation;

/// Float in [0; 1]
#[derive(Debug, Copy, Clone)]
pub(crate) struct F3201(pub f32);

impl Arbitrary for F3201 {
    fn arbitrary(g: &mut Gen) -> Self {
        let v = <u32 as Arbitrary>::arbitrary(g);
        F3201(v as f32 / u32::MAX as f32)
    }
}

pub(crate) struct TestCtx {
    pub config: MarkingsConfig,
    pub texts: TextCache,
    pub prefabs: StaticCatalog,
    pub markings: Markings,
}

impl TestCtx {
    pub(crate) fn new() -> Self {
        MyLog::init();

        let prefabs = StaticCatalog::default()
            .with_prefab(
                "bollard",
                PrefabInfo {
                    length: 0.3,
                    width: 0.3,
                    default_color: geom::Color::WHITE,
                    variations: vec![],
                },
            )
            .with_network(
                "fence",
                NetworkInfo {
                    width: 0.2,
                    segment_length: 2.0,
                },
            );

        Self {
            config: MarkingsConfig::default(),
            texts: TextCache::default(),
            prefabs,
            markings: Markings::new(),
        }
    }

    pub(crate) fn ctx(&self) -> CalcContext<'_> {
        CalcContext {
            config: &self.config,
            texts: &self.texts,
            prefabs: &self.prefabs,
        }
    }

    pub(crate) fn update(&mut self) -> Vec<MarkingID> {
        let ctx = CalcContext {
            config: &self.config,
            texts: &self.texts,
            prefabs: &self.prefabs,
        };
        self.markings.update(&ctx)
    }

    pub(crate) fn straight(&mut self, style: impl Into<LineStyle>, from: Vec3, to: Vec3) -> LineID {
        self.markings
            .add_line(style.into(), LineGeometry::new(Trajectory::straight(from, to)))
    }

    pub(crate) fn filler(&mut self, style: impl Into<FillerStyle>, points: &[Vec3]) -> FillerID {
        self.markings.add_filler(
            style.into(),
            FillerGeometry::new(crate::Contour::from_points(points)),
        )
    }

    pub(crate) fn data(&self, id: impl Into<MarkingID>) -> &[StyleData] {
        self.markings.data(id).unwrap_or_default()
    }
}

pub(crate) fn square(size: f32) -> Vec<Vec3> {
    vec![
        vec3(0.0, 0.0, 0.0),
        vec3(size, 0.0, 0.0),
        vec3(size, size, 0.0),
        vec3(0.0, size, 0.0),
    ]
}
