use super::{square, TestCtx};
use crate::capability::copy_properties;
use crate::marking::ChangeKind;
use crate::property::{PropertyName, PropertyValue, StyleProperties};
use crate::styles::{DashedLine, SolidFiller, SolidLine, StripeFiller, TextLine, ZigZagLine};
use crate::xml::{from_xml_str, to_xml_string, XmlContext};
use crate::{batch, Contour, DashData, LineStyle, MarkingID, MarkingLod, Style, StyleData, StyleType};
use geom::{vec3, Color, Vec2};

fn dashes_of(data: &[StyleData], lod: MarkingLod) -> Vec<&DashData> {
    data.iter()
        .filter(|d| d.lod() == lod)
        .flat_map(|d| d.dashes().iter())
        .collect()
}

#[test]
fn test_dashed_line_from_xml() {
    let mut test = TestCtx::new();
    let s = format!(r#"<S T="{}" DL="3" SL="1.5"/>"#, StyleType::LineDashed as u16);
    let Style::Line(style) = from_xml_str(&s, XmlContext::default()).unwrap() else {
        panic!("not a line style")
    };
    let id = test.straight(style, vec3(0.0, 0.0, 0.0), vec3(10.0, 0.0, 0.0));
    assert!(test.markings.data(id).is_none());

    assert_eq!(test.update(), vec![MarkingID::from(id)]);
    let dashes = dashes_of(test.data(id), MarkingLod::Lod0);
    assert_eq!(dashes.len(), 2);
    for (d, x) in dashes.iter().zip([2.75, 7.25]) {
        assert!((d.position.x - x).abs() < 1e-4, "{:?}", d.position);
        assert!((d.length - 3.0).abs() < 1e-4);
        assert_eq!(d.color, DashedLine::default().color);
    }

    // nothing changed, nothing to do
    assert!(test.update().is_empty());
}

#[test]
fn test_color_change_touches_one_marking() {
    let mut test = TestCtx::new();
    let a = test.straight(SolidLine::default(), vec3(0.0, 0.0, 0.0), vec3(10.0, 0.0, 0.0));
    let b = test.straight(DashedLine::default(), vec3(0.0, 5.0, 0.0), vec3(10.0, 5.0, 0.0));
    test.update();

    let mut sub = test.markings.subscribers.subscribe();
    let changed = test
        .markings
        .set_property(a, PropertyName::Color, PropertyValue::Color(Color::RED))
        .unwrap();
    assert!(changed);

    let changes = sub.take_changes();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].id, MarkingID::from(a));
    assert_eq!(changes[0].kind, ChangeKind::Style);

    assert!(test.markings.data(a).is_none());
    assert!(test.markings.data(b).is_some());
    assert_eq!(test.update(), vec![MarkingID::from(a)]);
    assert!(dashes_of(test.data(a), MarkingLod::Lod0)
        .iter()
        .all(|d| d.color == Color::RED));

    // same value again is a no-op
    let changed = test
        .markings
        .set_property(a, PropertyName::Color, PropertyValue::Color(Color::RED))
        .unwrap();
    assert!(!changed);
    assert!(sub.take_changes().is_empty());
}

#[test]
fn test_degenerate_filler_renders_nothing() {
    let mut test = TestCtx::new();
    let f = test.filler(
        SolidFiller::default(),
        &[
            vec3(0.0, 0.0, 0.0),
            vec3(5.0, 0.0, 0.0),
            vec3(10.0, 0.0, 0.0),
        ],
    );
    test.update();
    assert_eq!(test.data(f).iter().map(StyleData::count).sum::<usize>(), 0);
}

#[test]
fn test_zigzag_through_registry() {
    let mut test = TestCtx::new();
    let id = test.straight(
        ZigZagLine {
            step: 2.0,
            start_from_line: true,
            ..Default::default()
        },
        vec3(0.0, 0.0, 0.0),
        vec3(9.0, 0.0, 0.0),
    );
    test.update();
    assert_eq!(dashes_of(test.data(id), MarkingLod::Lod0).len(), 8);
}

#[test]
fn test_text_textures_are_shared_and_released() {
    let mut test = TestCtx::new();
    let text = TextLine {
        text: "BUS".to_string(),
        ..Default::default()
    };
    let a = test.straight(text.clone(), vec3(0.0, 0.0, 0.0), vec3(10.0, 0.0, 0.0));
    let b = test.straight(text, vec3(0.0, 5.0, 0.0), vec3(10.0, 5.0, 0.0));
    test.update();
    assert_eq!(test.texts.len(), 1);

    assert!(test.markings.remove(a));
    assert_eq!(test.texts.len(), 1);
    assert!(test.markings.remove(b));
    assert!(test.texts.is_empty());
    assert!(!test.markings.remove(b));
}

/// Perturbs every exposed value so a copy can be told apart from a default
fn perturb(style: &mut dyn StyleProperties) {
    for &name in style.property_names() {
        let Some(v) = style.get_property(name) else {
            continue;
        };
        let next = match v {
            PropertyValue::Float(f) => PropertyValue::Float(f + 0.25),
            PropertyValue::OptFloat(_) => PropertyValue::OptFloat(Some(1.25)),
            PropertyValue::Int(i) => PropertyValue::Int(i + 1),
            PropertyValue::OptInt(_) => PropertyValue::OptInt(Some(3)),
            PropertyValue::Bool(b) => PropertyValue::Bool(!b),
            PropertyValue::Color(_) => PropertyValue::Color(Color::from_rgba8(1, 2, 3, 4)),
            PropertyValue::Text(t) => PropertyValue::Text(format!("{}x", t)),
            PropertyValue::Enum(e) => PropertyValue::Enum(if e == 0 { 1 } else { 0 }),
        };
        let _ = style.set_property(name, next);
    }
}

#[test]
fn test_copy_only_shared_capabilities() {
    for &a in StyleType::ALL {
        for &b in StyleType::ALL {
            let mut src = Style::default_for(a);
            perturb(src.as_properties_mut());
            let src = src.as_properties();

            let before = Style::default_for(b);
            let mut dst = before.clone();
            let copied = copy_properties(src, dst.as_properties_mut());
            let dst = dst.as_properties();

            let shared = src.capabilities() & dst.capabilities();
            let mut expected = 0;
            for &name in dst.property_names() {
                let from_src = shared.contains(name.capability()) && src.property_names().contains(&name);
                let want = if from_src {
                    expected += 1;
                    src.get_property(name)
                } else {
                    before.as_properties().get_property(name)
                };
                assert_eq!(dst.get_property(name), want, "{:?} -> {:?}: {:?}", a, b, name);
            }
            assert_eq!(copied, expected, "{:?} -> {:?}", a, b);
            assert_eq!(dst.style_type(), b);
        }
    }
}

fn inside_or_on(contour: &Contour, p: Vec2) -> bool {
    contour.contains(p)
        || contour.trajectories().any(|t| {
            let closest = t.position(t.closest_t(p)).xy();
            closest.distance(p) < 2e-3
        })
}

#[test]
fn test_stripes_stay_inside_concave_area() {
    let mut test = TestCtx::new();
    // U shape, the stripes cross the notch
    let points = [
        vec3(0.0, 0.0, 0.0),
        vec3(12.0, 0.0, 0.0),
        vec3(12.0, 10.0, 0.0),
        vec3(8.0, 10.0, 0.0),
        vec3(8.0, 4.0, 0.0),
        vec3(4.0, 4.0, 0.0),
        vec3(4.0, 10.0, 0.0),
        vec3(0.0, 10.0, 0.0),
    ];
    let f = test.filler(
        StripeFiller {
            angle: 30.0,
            width: 0.4,
            step: 2.0,
            ..Default::default()
        },
        &points,
    );
    test.update();
    let contour = Contour::from_points(&points);
    let dashes = dashes_of(test.data(f), MarkingLod::Lod0);
    assert!(!dashes.is_empty());

    for d in dashes {
        let dir = d.angle.vec2();
        let perp = dir.perpendicular();
        let c = d.position.xy();
        for (sl, sw) in [(1.0, 1.0), (1.0, -1.0), (-1.0, 1.0), (-1.0, -1.0)] {
            let corner = c + dir * (sl * d.length * 0.5) + perp * (sw * d.width * 0.5);
            assert!(inside_or_on(&contour, corner), "{:?} sticks out", corner);
        }
    }
}

#[test]
fn test_full_scene_batches() {
    let mut test = TestCtx::new();
    for i in 0..5 {
        let y = i as f32 * 4.0;
        test.straight(DashedLine::default(), vec3(0.0, y, 0.0), vec3(30.0, y, 0.0));
    }
    test.straight(SolidLine::default(), vec3(0.0, -4.0, 0.0), vec3(30.0, -4.0, 0.0));
    test.filler(StripeFiller::default(), &square(10.0));
    test.filler(crate::styles::GrassFiller::default(), &square(5.0));
    assert_eq!(test.update().len(), 8);

    let total: usize = test
        .markings
        .all_data()
        .filter_map(|d| match d {
            StyleData::Dashes { dashes, .. } => Some(dashes.len()),
            _ => None,
        })
        .sum();
    let batches = batch(test.markings.all_data(), &test.config);
    assert_eq!(batches.dash_count(), total);
    assert!(batches
        .dashes
        .iter()
        .all(|b| !b.dashes.is_empty() && b.dashes.len() <= test.config.dash_batch_size));
    assert!(batches.others.keys().any(|(t, _)| *t == crate::LodType::Mesh));
}

#[test]
fn test_style_round_trips_onto_registry() {
    let mut test = TestCtx::new();
    let id = test.straight(
        DashedLine {
            width: 0.3,
            ..Default::default()
        },
        vec3(0.0, 0.0, 0.0),
        vec3(10.0, 0.0, 0.0),
    );
    let saved = to_xml_string(test.markings.style(id.into()).unwrap()).unwrap();
    let other = test.straight(SolidLine::default(), vec3(0.0, 3.0, 0.0), vec3(10.0, 3.0, 0.0));

    let loaded = from_xml_str(&saved, XmlContext::default()).unwrap();
    test.markings.set_style(other, loaded).unwrap();
    let Some(line) = test.markings.line(other) else {
        panic!("line vanished")
    };
    let LineStyle::Dashed(d) = &line.style else {
        panic!("style type was not restored")
    };
    assert_eq!(d.width, 0.3);

    let solid = Style::from(crate::FillerStyle::from(SolidFiller::default()));
    assert!(test.markings.set_style(other, solid).is_err());
}
