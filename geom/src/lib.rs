mod aabb;
mod angle;
mod color;
mod intersection;
mod polygon;
mod spline3;
mod trajectory;
mod v2;
mod v3;

pub use aabb::*;
pub use angle::*;
pub use color::*;
pub use intersection::*;
pub use polygon::*;
pub use spline3::*;
pub use trajectory::*;
pub use v2::*;
pub use v3::*;

#[inline]
pub fn lerp(src: f32, dst: f32, c: f32) -> f32 {
    src + (dst - src) * c
}
