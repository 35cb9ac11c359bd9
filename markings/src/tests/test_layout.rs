use crate::style_helper::{calculate_dashed, dash_distances};
use geom::{vec3, Trajectory};
use super::F3201;
use quickcheck::TestResult;

#[test]
fn quickcheck_dash_layout() {
    let mut q = quickcheck::QuickCheck::new().tests(500);
    q.quickcheck(
        (|l: F3201, dash: F3201, space: F3201| -> TestResult {
            let l = l.0 * 200.0;
            let dash = 0.1 + dash.0 * 10.0;
            let space = space.0 * 10.0;
            let ds = dash_distances(l, dash, space);

            let expected = if l < dash {
                0
            } else {
                ((l + space) / (dash + space)).floor() as usize
            };
            if ds.len() != expected {
                return TestResult::error(format!("{} dashes instead of {}", ds.len(), expected));
            }
            let (Some(first), Some(last)) = (ds.first(), ds.last()) else {
                return TestResult::passed();
            };

            // same leftover at both ends
            if (first.0 - (l - last.1)).abs() > 1e-3 {
                return TestResult::failed();
            }
            if first.0 < -1e-4 || last.1 > l + 1e-3 {
                return TestResult::failed();
            }
            for w in ds.windows(2) {
                if ((w[1].0 - w[0].1) - space).abs() > 1e-3 {
                    return TestResult::failed();
                }
            }
            TestResult::from_bool(ds.iter().all(|(a, b)| ((b - a) - dash).abs() < 1e-3))
        }) as fn(F3201, F3201, F3201) -> TestResult,
    );
}

fn curve() -> Trajectory {
    Trajectory::bezier(
        vec3(0.0, 0.0, 0.0),
        vec3(15.0, 0.0, 0.0),
        vec3(30.0, 10.0, 0.0),
        vec3(30.0, 30.0, 0.0),
    )
}

#[test]
fn quickcheck_dashes_follow_curves() {
    let mut q = quickcheck::QuickCheck::new().tests(100);
    q.quickcheck(
        (|dash: F3201, space: F3201| -> TestResult {
            let curve = curve();
            let dash = 0.5 + dash.0 * 5.0;
            let space = space.0 * 5.0;
            let parts = calculate_dashed(&curve, dash, space);
            for p in &parts {
                if p.start > p.end || p.start < 0.0 || p.end > 1.0 {
                    return TestResult::failed();
                }
                if (curve.length_between(p.start, p.end) - dash).abs() > 0.05 {
                    return TestResult::failed();
                }
            }
            TestResult::from_bool(parts.windows(2).all(|w| w[0].end <= w[1].start + 1e-5))
        }) as fn(F3201, F3201) -> TestResult,
    );
}
