//! Fillers drawn as raised surfaces: a top cap over the contour and a wall down to the road.

use super::{CalcContext, FillerGeometry};
use crate::contour::Contour;
use crate::property::style_properties;
use crate::triangulation::{triangulate, Triangulation};
use crate::{Capabilities, MarkingLod, MeshData, MeshMaterial, StyleData, StyleType};
use geom::{Degrees, Vec3};
use itertools::Itertools;

/// Top cap at `top`, with a wall down to `base` when the cap is above it
fn build_mesh(tri: &Triangulation, base: f32, top: f32) -> (Vec<Vec3>, Vec<u32>) {
    let mut vertices: Vec<Vec3> = tri.points.iter().map(|p| p.xy().z(top)).collect();
    let mut indices = tri.indices.clone();
    if top - base <= 1e-4 {
        return (vertices, indices);
    }
    for (a, b) in tri.points.iter().chain(tri.points.first()).tuple_windows() {
        let (a, b) = (a.xy(), b.xy());
        let k = vertices.len() as u32;
        vertices.extend([a.z(top), b.z(top), b.z(base), a.z(base)]);
        indices.extend([k, k + 1, k + 2, k, k + 2, k + 3]);
    }
    (vertices, indices)
}

fn mesh(
    contour: &Contour,
    base: f32,
    top: f32,
    elevation: f32,
    material: MeshMaterial,
    lod: MarkingLod,
    ctx: &CalcContext<'_>,
) -> Option<StyleData> {
    let tri = triangulate(contour, lod, ctx.config)?;
    let (vertices, indices) = build_mesh(&tri, base, top);
    Some(StyleData::Mesh(MeshData {
        lod,
        vertices,
        indices,
        elevation,
        material,
    }))
}

/// Shared calculation of every triangulated filler. With a curb, the outer ring is
/// drawn as curb and the inset inner contour gets the filler material slightly above it.
fn calculate_surface(
    geometry: &FillerGeometry,
    elevation: f32,
    corner_radius: f32,
    curb_size: Option<f32>,
    material: MeshMaterial,
    lod: MarkingLod,
    ctx: &CalcContext<'_>,
) -> Vec<StyleData> {
    if geometry.contour.is_degenerate() {
        log::debug!("triangulated filler on a degenerate contour");
        return vec![];
    }
    let min_angle = Degrees(ctx.config.min_corner_angle).to_radians().0;
    let contour = geometry.contour.round_corners(corner_radius, min_angle);
    let base = geometry.height;
    let top = base + elevation.max(0.0);

    let mut out = vec![];
    match curb_size.filter(|&c| c > 0.0) {
        Some(curb) => {
            out.extend(mesh(&contour, base, top, elevation, MeshMaterial::Curb, lod, ctx));
            let inner = contour.offset(curb);
            if inner.is_degenerate() {
                log::debug!("curb of {} leaves no inner surface", curb);
            } else {
                let lip = top + ctx.config.curb_lip;
                out.extend(mesh(&inner, lip, lip, elevation, material, lod, ctx));
            }
        }
        None => out.extend(mesh(&contour, base, top, elevation, material, lod, ctx)),
    }
    out
}

macro_rules! surface_filler {
    ($(#[$m: meta])* $name: ident, $ty: ident, $material: ident, $elevation: expr) => {
        $(#[$m])*
        #[derive(Clone, Debug, PartialEq)]
        pub struct $name {
            pub elevation: f32,
            pub corner_radius: f32,
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    elevation: $elevation,
                    corner_radius: 0.0,
                }
            }
        }

        style_properties!($name, StyleType::$ty,
            Capabilities::ELEVATION | Capabilities::CORNER_RADIUS, {
            Elevation => elevation,
            CornerRadius => corner_radius,
        });

        impl $name {
            pub fn calculate(&self, geometry: &FillerGeometry, lod: MarkingLod, ctx: &CalcContext<'_>) -> Vec<StyleData> {
                calculate_surface(geometry, self.elevation, self.corner_radius, None, MeshMaterial::$material, lod, ctx)
            }
        }
    };
    ($(#[$m: meta])* $name: ident, $ty: ident, $material: ident, $elevation: expr, curb) => {
        $(#[$m])*
        #[derive(Clone, Debug, PartialEq)]
        pub struct $name {
            pub elevation: f32,
            pub corner_radius: f32,
            /// Width of the curb ring around the surface, no curb when zero
            pub curb_size: f32,
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    elevation: $elevation,
                    corner_radius: 0.0,
                    curb_size: 0.0,
                }
            }
        }

        style_properties!($name, StyleType::$ty,
            Capabilities::ELEVATION | Capabilities::CORNER_RADIUS | Capabilities::CURB, {
            Elevation => elevation,
            CornerRadius => corner_radius,
            CurbSize => curb_size,
        });

        impl $name {
            pub fn calculate(&self, geometry: &FillerGeometry, lod: MarkingLod, ctx: &CalcContext<'_>) -> Vec<StyleData> {
                calculate_surface(
                    geometry,
                    self.elevation,
                    self.corner_radius,
                    Some(self.curb_size),
                    MeshMaterial::$material,
                    lod,
                    ctx,
                )
            }
        }
    };
}

surface_filler!(
    /// Raised sidewalk-like island
    PavementFiller, FillerPavement, Pavement, 0.15
);
surface_filler!(GrassFiller, FillerGrass, Grass, 0.15, curb);
surface_filler!(GravelFiller, FillerGravel, Gravel, 0.15, curb);
surface_filler!(RuinedFiller, FillerRuined, Ruined, 0.15, curb);
surface_filler!(
    /// Steep rocky island
    CliffFiller, FillerCliff, Cliff, 2.0, curb
);
