//! Style persistence as a single xml element: `<S T="256" C="888888E0" W="0.15" .../>`.
//! The type is stored as its numeric code, every exposed property under its short key.

use crate::error::StyleError;
use crate::property::{
    Alignment, FixedEndType, PropertyName, PropertyType, PropertyValue, StyleProperties, ZigZagSide,
};
use crate::styles::{FillerStyle, LineStyle, Style};
use crate::{StyleGroup, StyleType};
use xmltree::{Element, EmitterConfig};

pub const STYLE_ELEMENT: &str = "S";
pub const TYPE_ATTRIBUTE: &str = "T";

/// How a stored style is brought back
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct XmlContext {
    /// The line the style is loaded onto runs the other way
    pub invert: bool,
    /// The whole map is mirrored
    pub map_invert: bool,
    /// The style is pasted onto a marking of another type
    pub type_changed: bool,
}

impl XmlContext {
    pub fn inverted(&self) -> bool {
        self.invert ^ self.map_invert
    }
}

pub fn write_style(style: &dyn StyleProperties) -> Element {
    let mut el = Element::new(STYLE_ELEMENT);
    el.attributes.insert(
        TYPE_ATTRIBUTE.to_string(),
        (style.style_type() as u16).to_string(),
    );
    for (name, _, value) in style.properties() {
        el.attributes.insert(name.key().to_string(), value.to_xml());
    }
    el
}

fn read_type(el: &Element) -> Result<StyleType, StyleError> {
    if el.name != STYLE_ELEMENT {
        return Err(StyleError::WrongElement {
            expected: STYLE_ELEMENT,
            got: el.name.clone(),
        });
    }
    let raw = el.attributes.get(TYPE_ATTRIBUTE).ok_or(StyleError::MissingType)?;
    raw.trim()
        .parse::<u16>()
        .ok()
        .and_then(|v| StyleType::try_from(v).ok())
        .ok_or_else(|| StyleError::UnknownType(raw.clone()))
}

/// Reads a style. Missing properties keep their default, malformed ones too with a warning.
pub fn read_style(el: &Element, ctx: XmlContext) -> Result<Style, StyleError> {
    let t = read_type(el)?;
    let mut style = Style::default_for(t);
    let props = style.as_properties_mut();

    for &name in props.property_names() {
        let Some(raw) = el.attributes.get(name.key()) else {
            continue;
        };
        let Some(kind) = props.get_property(name).map(|v| v.kind()) else {
            continue;
        };
        let Some(value) = PropertyValue::from_xml(kind, raw) else {
            log::warn!("malformed {:?} value {:?} for {:?}, keeping default", name, raw, t);
            continue;
        };
        if let Err(e) = props.set_property(name, value) {
            log::warn!("invalid {:?} value {:?} for {:?}: {}", name, raw, t, e);
        }
    }

    if ctx.inverted() && t.group() != StyleGroup::Filler {
        invert_properties(props, ctx.type_changed);
    }
    Ok(style)
}

pub fn read_line_style(el: &Element, ctx: XmlContext) -> Result<LineStyle, StyleError> {
    match read_style(el, ctx)? {
        Style::Line(l) => Ok(l),
        Style::Filler(f) => Err(StyleError::WrongFamily(f.style_type(), "line")),
    }
}

pub fn read_filler_style(el: &Element, ctx: XmlContext) -> Result<FillerStyle, StyleError> {
    match read_style(el, ctx)? {
        Style::Filler(f) => Ok(f),
        Style::Line(l) => Err(StyleError::WrongFamily(l.style_type(), "filler")),
    }
}

fn get<T: PropertyType>(props: &dyn StyleProperties, name: PropertyName) -> Option<T> {
    props.get_property(name).and_then(|v| T::from_value(&v))
}

fn set<T: PropertyType>(props: &mut dyn StyleProperties, name: PropertyName, v: T) {
    if let Err(e) = props.set_property(name, v.into_value()) {
        log::warn!("could not invert {:?}: {}", name, e);
    }
}

fn map<T: PropertyType>(props: &mut dyn StyleProperties, name: PropertyName, f: impl FnOnce(T) -> T) {
    if let Some(v) = get::<T>(props, name) {
        set(props, name, f(v));
    }
}

/// Mirrors a (min, max) range around zero
fn mirror_range(props: &mut dyn StyleProperties, min: PropertyName, max: PropertyName) {
    if let (Some(lo), Some(hi)) = (get::<f32>(props, min), get::<f32>(props, max)) {
        set(props, min, -hi);
        set(props, max, -lo);
    }
}

/// Left becomes right: the style looks the same on a trajectory running the other way
fn invert_properties(props: &mut dyn StyleProperties, type_changed: bool) {
    map(props, PropertyName::Alignment, Alignment::inverted);
    map(props, PropertyName::Side, ZigZagSide::inverted);
    map(props, PropertyName::FixedEnd, FixedEndType::inverted);
    map(props, PropertyName::Shift, |v: f32| -v);
    map(props, PropertyName::Angle, |v: f32| -v);
    mirror_range(props, PropertyName::ShiftMin, PropertyName::ShiftMax);
    mirror_range(props, PropertyName::AngleMin, PropertyName::AngleMax);

    if let (Some(before), Some(after)) = (
        get::<f32>(props, PropertyName::OffsetBefore),
        get::<f32>(props, PropertyName::OffsetAfter),
    ) {
        set(props, PropertyName::OffsetBefore, after);
        set(props, PropertyName::OffsetAfter, before);
    }

    if !type_changed {
        map(props, PropertyName::Invert, |v: bool| !v);
    }
}

pub fn to_xml_string(style: &dyn StyleProperties) -> Result<String, StyleError> {
    let mut buf = Vec::new();
    let config = EmitterConfig::new().write_document_declaration(false);
    write_style(style).write_with_config(&mut buf, config)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

pub fn from_xml_str(s: &str, ctx: XmlContext) -> Result<Style, StyleError> {
    let el = Element::parse(s.as_bytes())?;
    read_style(&el, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::styles::{DashedLine, DoubleSolidLine, PropLine, ZigZagLine};
    use geom::Color;

    #[test]
    fn test_every_style_round_trips() {
        for &t in StyleType::ALL {
            let style = Style::default_for(t);
            let s = to_xml_string(style.as_properties()).unwrap();
            let back = from_xml_str(&s, XmlContext::default()).unwrap();
            assert_eq!(style, back, "{}", s);
        }
    }

    #[test]
    fn test_changed_values_round_trip() {
        let line = DashedLine {
            color: Color::from_rgba8(10, 20, 30, 255),
            width: 0.2,
            dash_length: 2.5,
            space_length: 0.7,
        };
        let s = to_xml_string(&line).unwrap();
        assert!(s.contains(r#"C="0A141EFF""#), "{}", s);
        let back = from_xml_str(&s, XmlContext::default()).unwrap();
        assert_eq!(back, Style::Line(line.into()));
    }

    #[test]
    fn test_missing_and_malformed_fall_back() {
        let s = format!(r#"<S T="{}" W="wide" DL="3"/>"#, StyleType::LineDashed as u16);
        let Style::Line(LineStyle::Dashed(d)) = from_xml_str(&s, XmlContext::default()).unwrap() else {
            panic!("not a dashed line")
        };
        let def = DashedLine::default();
        assert_eq!(d.width, def.width);
        assert_eq!(d.dash_length, 3.0);
        assert_eq!(d.space_length, def.space_length);
    }

    #[test]
    fn test_bad_documents() {
        assert!(matches!(
            from_xml_str(r#"<S W="1"/>"#, XmlContext::default()),
            Err(StyleError::MissingType)
        ));
        assert!(matches!(
            from_xml_str(r#"<S T="12"/>"#, XmlContext::default()),
            Err(StyleError::UnknownType(_))
        ));
        assert!(matches!(
            from_xml_str(r#"<X T="256"/>"#, XmlContext::default()),
            Err(StyleError::WrongElement { .. })
        ));
        assert!(from_xml_str("<S", XmlContext::default()).is_err());

        let el = write_style(&DashedLine::default());
        assert!(matches!(
            read_filler_style(&el, XmlContext::default()),
            Err(StyleError::WrongFamily(StyleType::LineDashed, _))
        ));
    }

    #[test]
    fn test_invert() {
        let double = DoubleSolidLine {
            alignment: Alignment::Left,
            ..Default::default()
        };
        let ctx = XmlContext {
            invert: true,
            ..Default::default()
        };
        let el = write_style(&double);
        let Ok(LineStyle::DoubleSolid(d)) = read_line_style(&el, ctx) else {
            panic!("not a double solid line")
        };
        assert_eq!(d.alignment, Alignment::Right);

        // both inversions cancel out
        let both = XmlContext {
            invert: true,
            map_invert: true,
            type_changed: false,
        };
        let Ok(LineStyle::DoubleSolid(d)) = read_line_style(&el, both) else {
            panic!("not a double solid line")
        };
        assert_eq!(d.alignment, Alignment::Left);

        let zigzag = write_style(&ZigZagLine::default());
        let Ok(LineStyle::ZigZag(z)) = read_line_style(&zigzag, ctx) else {
            panic!("not a zigzag")
        };
        assert_eq!(z.side, ZigZagSide::default().inverted());

        let mut prop = PropLine::default();
        prop.jitter.shift_min = -1.0;
        prop.jitter.shift_max = 3.0;
        prop.distribution.offset_before = 2.0;
        let Ok(LineStyle::Prop(p)) = read_line_style(&write_style(&prop), ctx) else {
            panic!("not a prop line")
        };
        assert_eq!((p.jitter.shift_min, p.jitter.shift_max), (-3.0, 1.0));
        assert_eq!(p.distribution.offset_before, prop.distribution.offset_after);
        assert_eq!(p.distribution.offset_after, 2.0);
    }

    #[test]
    fn test_invert_flag_kept_on_type_change() {
        let asym = Style::default_for(StyleType::LineDoubleDashedAsym);
        let el = write_style(asym.as_properties());
        let flipped = read_style(
            &el,
            XmlContext {
                invert: true,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(
            flipped.as_properties().get_property(PropertyName::Invert),
            Some(PropertyValue::Bool(true))
        );
        let pasted = read_style(
            &el,
            XmlContext {
                invert: true,
                map_invert: false,
                type_changed: true,
            },
        )
        .unwrap();
        assert_eq!(
            pasted.as_properties().get_property(PropertyName::Invert),
            Some(PropertyValue::Bool(false))
        );
    }
}
