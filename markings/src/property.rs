//! Typed style properties: names, values, and the accessors every style implements.

use crate::error::PropertyError;
use crate::{Capabilities, StyleType};
use geom::Color;

macro_rules! property_names {
    ($($name: ident = $key: literal => $cap: ident),* $(,)?) => {
        /// Every property a style can expose, in display order
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum PropertyName {
            $($name),*
        }

        impl PropertyName {
            pub const ALL: &'static [PropertyName] = &[$(PropertyName::$name),*];

            /// Short attribute name used in xml
            pub fn key(self) -> &'static str {
                match self {
                    $(PropertyName::$name => $key),*
                }
            }

            pub fn capability(self) -> Capabilities {
                match self {
                    $(PropertyName::$name => Capabilities::$cap),*
                }
            }
        }
    };
}

property_names! {
    Color          = "C"   => COLOR,
    SecondColor    = "SC"  => SECOND_COLOR,
    UseSecondColor = "USC" => SECOND_COLOR,
    ColorOption    = "CO"  => COLOR_OPTION,
    Width          = "W"   => WIDTH,
    DashLength     = "DL"  => DASHED,
    SpaceLength    = "SL"  => DASHED,
    DashLengthB    = "DLB" => ASYM,
    Offset         = "O"   => OFFSET,
    Alignment      = "A"   => ALIGNMENT,
    CenterSolid    = "CS"  => CENTER_SOLID,
    Invert         = "I"   => INVERT,
    Base           = "B"   => SHARK_TEETH,
    Height         = "H"   => SHARK_TEETH,
    Space          = "S"   => SHARK_TEETH,
    Angle          = "AN"  => ROTATE,
    Step           = "ST"  => PERIODIC,
    Side           = "SD"  => ZIGZAG,
    StartFromLine  = "SFL" => ZIGZAG,
    Text           = "TXT" => TEXT,
    Font           = "F"   => TEXT,
    Spacing        = "SPC" => TEXT,
    Scale          = "SCL" => SCALE,
    Shift          = "SH"  => SHIFT,
    Prefab         = "P"   => PREFAB,
    ObjectStep     = "OS"  => DISTRIBUTION,
    Probability    = "PR"  => DISTRIBUTION,
    Distribution   = "DT"  => DISTRIBUTION,
    FixedEnd       = "FE"  => DISTRIBUTION,
    MinCount       = "MNC" => DISTRIBUTION,
    MaxCount       = "MXC" => DISTRIBUTION,
    OffsetBefore   = "OB"  => OFFSETS,
    OffsetAfter    = "OA"  => OFFSETS,
    ShiftMin       = "SHN" => JITTER,
    ShiftMax       = "SHX" => JITTER,
    AngleMin       = "ANN" => JITTER,
    AngleMax       = "ANX" => JITTER,
    ScaleMin       = "SCN" => JITTER,
    ScaleMax       = "SCX" => JITTER,
    ElevationMin   = "ELN" => JITTER,
    ElevationMax   = "ELX" => JITTER,
    TiltMin        = "TLN" => TILT,
    TiltMax        = "TLX" => TILT,
    SlopeMin       = "SLN" => TILT,
    SlopeMax       = "SLX" => TILT,
    RepeatDistance = "RD"  => NETWORK,
    Elevation      = "E"   => ELEVATION,
    LineWidth      = "LW"  => CROSSWALK_BORDER,
    Parallel       = "PL"  => CROSSWALK,
    FollowRails    = "FR"  => RAILS,
    LeftRail       = "LR"  => RAILS,
    RightRail      = "RR"  => RAILS,
    AngleBetween   = "AB"  => CHEVRON,
    StartingFrom   = "SF"  => CHEVRON,
    Output         = "OUT" => CHEVRON,
    CornerRadius   = "CR"  => CORNER_RADIUS,
    CurbSize       = "CB"  => CURB,
}

impl PropertyName {
    /// Stable position used to lay out properties consistently across styles
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_key(key: &str) -> Option<PropertyName> {
        Self::ALL.iter().copied().find(|p| p.key() == key)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PropertyKind {
    Float,
    OptFloat,
    Int,
    OptInt,
    Bool,
    Color,
    Text,
    Enum,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PropertyValue {
    Float(f32),
    /// None means "automatic"
    OptFloat(Option<f32>),
    Int(u32),
    OptInt(Option<u32>),
    Bool(bool),
    Color(Color),
    Text(String),
    Enum(u8),
}

impl PropertyValue {
    pub fn kind(&self) -> PropertyKind {
        match self {
            PropertyValue::Float(_) => PropertyKind::Float,
            PropertyValue::OptFloat(_) => PropertyKind::OptFloat,
            PropertyValue::Int(_) => PropertyKind::Int,
            PropertyValue::OptInt(_) => PropertyKind::OptInt,
            PropertyValue::Bool(_) => PropertyKind::Bool,
            PropertyValue::Color(_) => PropertyKind::Color,
            PropertyValue::Text(_) => PropertyKind::Text,
            PropertyValue::Enum(_) => PropertyKind::Enum,
        }
    }

    pub fn to_xml(&self) -> String {
        match self {
            PropertyValue::Float(v) => v.to_string(),
            PropertyValue::OptFloat(v) => v.map(|v| v.to_string()).unwrap_or_default(),
            PropertyValue::Int(v) => v.to_string(),
            PropertyValue::OptInt(v) => v.map(|v| v.to_string()).unwrap_or_default(),
            PropertyValue::Bool(v) => if *v { "1" } else { "0" }.to_string(),
            PropertyValue::Color(c) => format!("{:08X}", c.to_u32()),
            PropertyValue::Text(s) => s.clone(),
            PropertyValue::Enum(v) => v.to_string(),
        }
    }

    pub fn from_xml(kind: PropertyKind, s: &str) -> Option<PropertyValue> {
        let s = s.trim_matches(|c: char| c.is_whitespace() && kind != PropertyKind::Text);
        Some(match kind {
            PropertyKind::Float => PropertyValue::Float(parse_finite(s)?),
            PropertyKind::OptFloat if s.is_empty() => PropertyValue::OptFloat(None),
            PropertyKind::OptFloat => PropertyValue::OptFloat(Some(parse_finite(s)?)),
            PropertyKind::Int => PropertyValue::Int(s.parse().ok()?),
            PropertyKind::OptInt if s.is_empty() => PropertyValue::OptInt(None),
            PropertyKind::OptInt => PropertyValue::OptInt(Some(s.parse().ok()?)),
            PropertyKind::Bool => PropertyValue::Bool(match s {
                "1" | "true" | "True" => true,
                "0" | "false" | "False" => false,
                _ => return None,
            }),
            PropertyKind::Color => PropertyValue::Color(Color::from_u32(u32::from_str_radix(s, 16).ok()?)),
            PropertyKind::Text => PropertyValue::Text(s.to_string()),
            PropertyKind::Enum => PropertyValue::Enum(s.parse().ok()?),
        })
    }
}

fn parse_finite(s: &str) -> Option<f32> {
    s.parse::<f32>().ok().filter(|v| v.is_finite())
}

/// Rust types that can be stored in a property
pub trait PropertyType: Sized {
    const KIND: PropertyKind;
    fn into_value(self) -> PropertyValue;
    fn from_value(v: &PropertyValue) -> Option<Self>;
}

macro_rules! simple_property_type {
    ($t: ty, $kind: ident) => {
        impl PropertyType for $t {
            const KIND: PropertyKind = PropertyKind::$kind;

            fn into_value(self) -> PropertyValue {
                PropertyValue::$kind(self)
            }

            fn from_value(v: &PropertyValue) -> Option<Self> {
                match v {
                    PropertyValue::$kind(x) => Some(x.clone()),
                    _ => None,
                }
            }
        }
    };
}

simple_property_type!(f32, Float);
simple_property_type!(Option<f32>, OptFloat);
simple_property_type!(u32, Int);
simple_property_type!(Option<u32>, OptInt);
simple_property_type!(bool, Bool);
simple_property_type!(String, Text);

impl PropertyType for Color {
    const KIND: PropertyKind = PropertyKind::Color;

    fn into_value(self) -> PropertyValue {
        PropertyValue::Color(self)
    }

    /// Colors are stored with 8 bits per channel so they survive persistence unchanged
    fn from_value(v: &PropertyValue) -> Option<Self> {
        match v {
            PropertyValue::Color(c) => Some(Color::from_u32(c.to_u32())),
            _ => None,
        }
    }
}

/// Declares a fieldless enum usable as a property
macro_rules! property_enum {
    ($(#[$m: meta])* pub enum $name: ident { $first: ident = $fv: literal $(, $var: ident = $v: literal)* $(,)? }) => {
        $(#[$m])*
        #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            #[default]
            $first = $fv,
            $($var = $v),*
        }

        impl $crate::property::PropertyType for $name {
            const KIND: $crate::property::PropertyKind = $crate::property::PropertyKind::Enum;

            fn into_value(self) -> $crate::property::PropertyValue {
                $crate::property::PropertyValue::Enum(self as u8)
            }

            fn from_value(v: &$crate::property::PropertyValue) -> Option<Self> {
                match v {
                    $crate::property::PropertyValue::Enum(x) => match *x {
                        $fv => Some($name::$first),
                        $($v => Some($name::$var),)*
                        _ => None,
                    },
                    _ => None,
                }
            }
        }
    };
}

property_enum! {
    /// Where a double line sits relative to its trajectory
    pub enum Alignment { Centre = 0, Left = 1, Right = 2 }
}

impl Alignment {
    pub fn inverted(self) -> Self {
        match self {
            Alignment::Centre => Alignment::Centre,
            Alignment::Left => Alignment::Right,
            Alignment::Right => Alignment::Left,
        }
    }
}

property_enum! {
    /// Color of distributed props
    pub enum ColorOption { Default = 0, Custom = 1, Random = 2 }
}

property_enum! {
    pub enum DistributionType {
        FixedSpaceFreeEnd = 0,
        FixedSpaceFixedEnd = 1,
        DynamicSpaceFreeEnd = 2,
        DynamicSpaceFixedEnd = 3,
    }
}

property_enum! {
    /// Which ends are pinned by fixed end distributions
    pub enum FixedEndType { Both = 0, Start = 1, End = 2 }
}

impl FixedEndType {
    pub fn inverted(self) -> Self {
        match self {
            FixedEndType::Both => FixedEndType::Both,
            FixedEndType::Start => FixedEndType::End,
            FixedEndType::End => FixedEndType::Start,
        }
    }
}

property_enum! {
    /// Side of the apexes of a zigzag
    pub enum ZigZagSide { Left = 0, Right = 1 }
}

impl ZigZagSide {
    pub fn inverted(self) -> Self {
        match self {
            ZigZagSide::Left => ZigZagSide::Right,
            ZigZagSide::Right => ZigZagSide::Left,
        }
    }
}

property_enum! {
    /// Anchor of a chevron pattern
    pub enum ChevronFrom { Vertex = 0, Edge = 1 }
}

/// Property accessors of a style
pub trait StyleProperties {
    fn style_type(&self) -> StyleType;
    fn capabilities(&self) -> Capabilities;
    /// Exposed properties, in display order
    fn property_names(&self) -> &'static [PropertyName];
    fn get_property(&self, name: PropertyName) -> Option<PropertyValue>;
    fn set_property(&mut self, name: PropertyName, value: PropertyValue) -> Result<(), PropertyError>;

    /// (name, kind, value) of every exposed property
    fn properties(&self) -> Vec<(PropertyName, PropertyKind, PropertyValue)> {
        self.property_names()
            .iter()
            .filter_map(|&n| self.get_property(n).map(|v| (n, v.kind(), v)))
            .collect()
    }

    fn property_indices(&self) -> Vec<usize> {
        self.property_names().iter().map(|n| n.index()).collect()
    }
}

pub(crate) fn convert<T: PropertyType>(
    name: PropertyName,
    _current: &T,
    value: &PropertyValue,
) -> Result<T, PropertyError> {
    T::from_value(value).ok_or(PropertyError::WrongKind {
        name,
        expected: T::KIND,
        got: value.kind(),
    })
}

/// Implements `StyleProperties` by mapping property names to (possibly nested) struct fields
macro_rules! style_properties {
    ($style: ty, $ty: expr, $caps: expr, { $($prop: ident => $($field: ident).+),* $(,)? }) => {
        impl $crate::property::StyleProperties for $style {
            fn style_type(&self) -> $crate::StyleType {
                $ty
            }

            fn capabilities(&self) -> $crate::Capabilities {
                $caps
            }

            fn property_names(&self) -> &'static [$crate::property::PropertyName] {
                &[$($crate::property::PropertyName::$prop),*]
            }

            fn get_property(
                &self,
                name: $crate::property::PropertyName,
            ) -> Option<$crate::property::PropertyValue> {
                #[allow(unreachable_patterns)]
                match name {
                    $($crate::property::PropertyName::$prop => {
                        Some($crate::property::PropertyType::into_value(self.$($field).+.clone()))
                    })*
                    _ => None,
                }
            }

            fn set_property(
                &mut self,
                name: $crate::property::PropertyName,
                value: $crate::property::PropertyValue,
            ) -> Result<(), $crate::error::PropertyError> {
                #[allow(unreachable_patterns)]
                match name {
                    $($crate::property::PropertyName::$prop => {
                        self.$($field).+ = $crate::property::convert(name, &self.$($field).+, &value)?;
                        Ok(())
                    })*
                    _ => Err($crate::error::PropertyError::NotExposed { name, style: $ty }),
                }
            }
        }
    };
}
pub(crate) use style_properties;

#[cfg(test)]
mod tests {
    use super::*;
    use common::FastSet;

    #[test]
    fn test_keys_unique() {
        let mut keys = FastSet::default();
        for p in PropertyName::ALL {
            assert!(keys.insert(p.key()), "duplicate key {}", p.key());
            assert_ne!(p.key(), crate::xml::TYPE_ATTRIBUTE);
            assert_eq!(PropertyName::from_key(p.key()), Some(*p));
        }
    }

    #[test]
    fn test_xml_values() {
        let c = PropertyValue::Color(Color::from_rgba8(1, 2, 3, 4));
        assert_eq!(c.to_xml(), "01020304");
        assert_eq!(PropertyValue::from_xml(PropertyKind::Color, "01020304"), Some(c));
        assert_eq!(
            PropertyValue::from_xml(PropertyKind::OptFloat, ""),
            Some(PropertyValue::OptFloat(None))
        );
        assert_eq!(PropertyValue::from_xml(PropertyKind::Float, "abc"), None);
        assert_eq!(PropertyValue::from_xml(PropertyKind::Float, "NaN"), None);
        assert_eq!(
            PropertyValue::from_xml(PropertyKind::Float, "0.1"),
            Some(PropertyValue::Float(0.1))
        );
    }

    #[test]
    fn test_enum_values() {
        assert_eq!(Alignment::Left.into_value(), PropertyValue::Enum(1));
        assert_eq!(Alignment::from_value(&PropertyValue::Enum(2)), Some(Alignment::Right));
        assert_eq!(Alignment::from_value(&PropertyValue::Enum(3)), None);
        assert_eq!(ZigZagSide::from_value(&PropertyValue::Int(0)), None);
        assert_eq!(
            DistributionType::from_value(&PropertyValue::Enum(3)),
            Some(DistributionType::DynamicSpaceFixedEnd)
        );
        assert_eq!(ChevronFrom::default(), ChevronFrom::Vertex);
        assert_eq!(<FixedEndType as PropertyType>::KIND, PropertyKind::Enum);
    }
}
