use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StyleGroup {
    Regular,
    StopLine,
    Crosswalk,
    Filler,
}

macro_rules! style_types {
    ($($name: ident = $v: literal),* $(,)?) => {
        /// Discriminant of every style, persisted as a number in xml.
        /// The high byte is the style group.
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[repr(u16)]
        pub enum StyleType {
            $($name = $v),*
        }

        impl StyleType {
            pub const ALL: &'static [StyleType] = &[$(StyleType::$name),*];
        }

        impl TryFrom<u16> for StyleType {
            type Error = u16;

            fn try_from(v: u16) -> Result<Self, Self::Error> {
                match v {
                    $($v => Ok(StyleType::$name),)*
                    _ => Err(v),
                }
            }
        }
    };
}

style_types! {
    LineDashed = 0x100,
    LineDoubleDashed = 0x101,
    LineDoubleDashedAsym = 0x102,
    LineSolid = 0x103,
    LineDoubleSolid = 0x104,
    LineSolidAndDashed = 0x105,
    LineSharkTeeth = 0x106,
    LineZigZag = 0x107,
    LineText = 0x108,
    LineProp = 0x109,
    LineTree = 0x10A,
    LineDecal = 0x10B,
    LineNetwork = 0x10C,

    StopLineSolid = 0x200,
    StopLineDashed = 0x201,

    CrosswalkZebra = 0x400,
    CrosswalkDoubleSolid = 0x401,

    FillerStripe = 0x800,
    FillerGrid = 0x801,
    FillerSolid = 0x802,
    FillerChevron = 0x803,
    FillerPavement = 0x804,
    FillerGrass = 0x805,
    FillerGravel = 0x806,
    FillerRuined = 0x807,
    FillerCliff = 0x808,
}

impl StyleType {
    pub fn group(self) -> StyleGroup {
        match self as u16 & 0xFF00 {
            0x100 => StyleGroup::Regular,
            0x200 => StyleGroup::StopLine,
            0x400 => StyleGroup::Crosswalk,
            _ => StyleGroup::Filler,
        }
    }

    pub fn is_filler(self) -> bool {
        self.group() == StyleGroup::Filler
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_from() {
        for &t in StyleType::ALL {
            assert_eq!(StyleType::try_from(t as u16), Ok(t));
        }
        assert_eq!(StyleType::try_from(0x300), Err(0x300));
        assert_eq!(StyleType::LineZigZag.group(), StyleGroup::Regular);
        assert!(StyleType::FillerCliff.is_filler());
        assert_eq!(StyleType::CrosswalkZebra.group(), StyleGroup::Crosswalk);
    }
}
