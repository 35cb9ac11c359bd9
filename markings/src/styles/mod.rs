//! Every style, as tagged variants over the line and filler policies.

use crate::contour::Contour;
use crate::error::PropertyError;
use crate::prefab::PrefabCatalog;
use crate::property::{PropertyName, PropertyValue, StyleProperties};
use crate::style_helper::Borders;
use crate::text_cache::TextCache;
use crate::{Capabilities, MarkingLod, MarkingsConfig, StyleData, StyleGroup, StyleType};
use derive_more::{From, TryInto};
use geom::{Color, Trajectory};

mod crosswalk;
mod filler;
mod line;
mod objects;
mod shapes;
mod triangulated;

pub use crosswalk::*;
pub use filler::*;
pub use line::*;
pub use objects::*;
pub use shapes::*;
pub use triangulated::*;

/// Color of freshly created styles
pub fn default_color() -> Color {
    Color::from_rgba8(136, 136, 136, 224)
}

/// Services a calculation may need. Nothing else of the world is visible to styles.
#[derive(Copy, Clone)]
pub struct CalcContext<'a> {
    pub config: &'a MarkingsConfig,
    pub texts: &'a TextCache,
    pub prefabs: &'a dyn PrefabCatalog,
}

/// What a line style is drawn along
#[derive(Clone, Debug, PartialEq)]
pub struct LineGeometry {
    pub trajectory: Trajectory,
    pub borders: Borders,
    /// Height of the road surface the marking lies on
    pub height: f32,
}

impl LineGeometry {
    pub fn new(trajectory: Trajectory) -> Self {
        Self {
            height: trajectory.start().z,
            trajectory,
            borders: Borders::default(),
        }
    }

    pub fn with_borders(mut self, borders: Borders) -> Self {
        self.borders = borders;
        self
    }

    /// The trajectory laid flat on the road surface
    pub fn flat(&self) -> Trajectory {
        self.trajectory.flatten_at(self.height)
    }
}

/// What a filler style fills
#[derive(Clone, Debug, PartialEq)]
pub struct FillerGeometry {
    pub contour: Contour,
    pub height: f32,
}

impl FillerGeometry {
    pub fn new(contour: Contour) -> Self {
        Self {
            height: contour.height(),
            contour,
        }
    }
}

macro_rules! style_enum {
    ($(#[$m: meta])* $name: ident, $geom: ty, { $($variant: ident($style: ty) = $ty: ident),* $(,)? }) => {
        $(#[$m])*
        #[derive(Clone, Debug, PartialEq, From, TryInto)]
        pub enum $name {
            $($variant($style)),*
        }

        impl $name {
            /// Freshly created style of this type, None if the type is not of this family
            pub fn default_for(t: StyleType) -> Option<Self> {
                match t {
                    $(StyleType::$ty => Some(<$style>::default().into()),)*
                    #[allow(unreachable_patterns)]
                    _ => None,
                }
            }

            pub fn calculate(&self, geometry: &$geom, lod: MarkingLod, ctx: &CalcContext<'_>) -> Vec<StyleData> {
                match self {
                    $($name::$variant(s) => s.calculate(geometry, lod, ctx)),*
                }
            }

            pub fn as_properties(&self) -> &dyn StyleProperties {
                match self {
                    $($name::$variant(s) => s),*
                }
            }

            pub fn as_properties_mut(&mut self) -> &mut dyn StyleProperties {
                match self {
                    $($name::$variant(s) => s),*
                }
            }
        }

        impl StyleProperties for $name {
            fn style_type(&self) -> StyleType {
                self.as_properties().style_type()
            }

            fn capabilities(&self) -> Capabilities {
                self.as_properties().capabilities()
            }

            fn property_names(&self) -> &'static [PropertyName] {
                self.as_properties().property_names()
            }

            fn get_property(&self, name: PropertyName) -> Option<PropertyValue> {
                self.as_properties().get_property(name)
            }

            fn set_property(&mut self, name: PropertyName, value: PropertyValue) -> Result<(), PropertyError> {
                self.as_properties_mut().set_property(name, value)
            }
        }
    };
}

style_enum! {
    /// Styles drawn along a trajectory: regular lines, stop lines and crosswalks
    LineStyle, LineGeometry, {
        Dashed(DashedLine) = LineDashed,
        DoubleDashed(DoubleDashedLine) = LineDoubleDashed,
        DoubleDashedAsym(DoubleDashedAsymLine) = LineDoubleDashedAsym,
        Solid(SolidLine) = LineSolid,
        DoubleSolid(DoubleSolidLine) = LineDoubleSolid,
        SolidAndDashed(SolidAndDashedLine) = LineSolidAndDashed,
        SharkTeeth(SharkTeethLine) = LineSharkTeeth,
        ZigZag(ZigZagLine) = LineZigZag,
        Text(TextLine) = LineText,
        Prop(PropLine) = LineProp,
        Tree(TreeLine) = LineTree,
        Decal(DecalLine) = LineDecal,
        Network(NetworkLine) = LineNetwork,
        StopSolid(StopSolidLine) = StopLineSolid,
        StopDashed(StopDashedLine) = StopLineDashed,
        Zebra(ZebraCrosswalk) = CrosswalkZebra,
        DoubleSolidCrosswalk(DoubleSolidCrosswalk) = CrosswalkDoubleSolid,
    }
}

style_enum! {
    /// Styles filling a closed contour
    FillerStyle, FillerGeometry, {
        Stripe(StripeFiller) = FillerStripe,
        Grid(GridFiller) = FillerGrid,
        Solid(SolidFiller) = FillerSolid,
        Chevron(ChevronFiller) = FillerChevron,
        Pavement(PavementFiller) = FillerPavement,
        Grass(GrassFiller) = FillerGrass,
        Gravel(GravelFiller) = FillerGravel,
        Ruined(RuinedFiller) = FillerRuined,
        Cliff(CliffFiller) = FillerCliff,
    }
}

#[derive(Clone, Debug, PartialEq, From)]
pub enum Style {
    Line(LineStyle),
    Filler(FillerStyle),
}

impl Style {
    pub fn default_for(t: StyleType) -> Self {
        let style = match t.group() {
            StyleGroup::Filler => FillerStyle::default_for(t).map(Style::Filler),
            _ => LineStyle::default_for(t).map(Style::Line),
        };
        // Unwrap ok: every style type belongs to exactly one family
        style.unwrap()
    }

    pub fn as_properties(&self) -> &dyn StyleProperties {
        match self {
            Style::Line(l) => l,
            Style::Filler(f) => f,
        }
    }

    pub fn as_properties_mut(&mut self) -> &mut dyn StyleProperties {
        match self {
            Style::Line(l) => l,
            Style::Filler(f) => f,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::copy_properties;

    #[test]
    fn test_every_type_has_a_default() {
        for &t in StyleType::ALL {
            let s = Style::default_for(t);
            assert_eq!(s.as_properties().style_type(), t);
            for &name in s.as_properties().property_names() {
                assert!(
                    s.as_properties().capabilities().contains(name.capability()),
                    "{:?} exposes {:?} without its capability",
                    t,
                    name
                );
            }
        }
    }

    #[test]
    fn test_set_wrong_kind() {
        let mut s = LineStyle::default_for(StyleType::LineDashed).unwrap();
        assert!(s.set_property(PropertyName::Width, PropertyValue::Float(0.3)).is_ok());
        assert_eq!(s.get_property(PropertyName::Width), Some(PropertyValue::Float(0.3)));
        assert!(matches!(
            s.set_property(PropertyName::Width, PropertyValue::Bool(true)),
            Err(PropertyError::WrongKind { .. })
        ));
        assert!(matches!(
            s.set_property(PropertyName::Prefab, PropertyValue::Text("a".into())),
            Err(PropertyError::NotExposed { .. })
        ));
    }

    #[test]
    fn test_copy_between_unrelated_styles() {
        for &a in StyleType::ALL {
            for &b in StyleType::ALL {
                let src = Style::default_for(a);
                let mut dst = Style::default_for(b);
                copy_properties(src.as_properties(), dst.as_properties_mut());
            }
        }
    }
}
