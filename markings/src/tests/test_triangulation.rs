use crate::triangulation::triangulate;
use crate::{Contour, MarkingLod, MarkingsConfig};
use geom::{vec3, Polygon, Vec3};
use super::F3201;
use quickcheck::TestResult;

fn triangle_area(a: Vec3, b: Vec3, c: Vec3) -> f32 {
    ((b - a).xy().cross((c - a).xy()) * 0.5).abs()
}

#[test]
fn quickcheck_convex_polygons() {
    let mut q = quickcheck::QuickCheck::new().tests(200);
    q.quickcheck(
        (|angles: Vec<F3201>, radius: F3201| -> TestResult {
            let mut angles: Vec<f32> = angles
                .into_iter()
                .take(24)
                .map(|a| a.0 * std::f32::consts::TAU)
                .collect();
            angles.sort_by(|a, b| a.total_cmp(b));
            angles.dedup_by(|a, b| (*a - *b).abs() < 0.05);
            if angles.len() < 3 {
                return TestResult::discard();
            }
            if let (Some(first), Some(last)) = (angles.first(), angles.last()) {
                if first + std::f32::consts::TAU - last < 0.05 {
                    return TestResult::discard();
                }
            }

            let r = 1.0 + radius.0 * 20.0;
            let points: Vec<Vec3> = angles
                .iter()
                .map(|a| vec3(a.cos() * r, a.sin() * r, 0.0))
                .collect();
            let poly = Polygon(points.iter().map(|p| p.xy()).collect());
            let area = poly.area();
            if area < 0.01 {
                return TestResult::discard();
            }

            let contour = Contour::from_points(&points);
            let Some(t) = triangulate(&contour, MarkingLod::Lod0, &MarkingsConfig::default()) else {
                return TestResult::error("convex polygon was not triangulated");
            };
            if t.triangle_count() != points.len() - 2 {
                return TestResult::error(format!(
                    "{} triangles for {} points",
                    t.triangle_count(),
                    points.len()
                ));
            }
            let sum: f32 = t
                .indices
                .chunks(3)
                .map(|tri| {
                    triangle_area(
                        t.points[tri[0] as usize],
                        t.points[tri[1] as usize],
                        t.points[tri[2] as usize],
                    )
                })
                .sum();
            TestResult::from_bool((sum - area).abs() < 1e-3 * area.max(1.0))
        }) as fn(Vec<F3201>, F3201) -> TestResult,
    );
}
