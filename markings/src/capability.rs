use crate::property::StyleProperties;

bitflags::bitflags! {
    /// Groups of properties a style exposes. Two styles sharing a capability
    /// expose the same properties for it, with the same meaning.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct Capabilities: u32 {
        const COLOR         = 1 << 0;
        const SECOND_COLOR  = 1 << 1;
        const COLOR_OPTION  = 1 << 2;
        const WIDTH         = 1 << 3;
        const DASHED        = 1 << 4;
        const ASYM          = 1 << 5;
        const OFFSET        = 1 << 6;
        const ALIGNMENT     = 1 << 7;
        const CENTER_SOLID  = 1 << 8;
        const INVERT        = 1 << 9;
        const SHARK_TEETH   = 1 << 10;
        const ROTATE        = 1 << 11;
        const PERIODIC      = 1 << 12;
        const ZIGZAG        = 1 << 13;
        const TEXT          = 1 << 14;
        const SCALE         = 1 << 15;
        const SHIFT         = 1 << 16;
        const PREFAB        = 1 << 17;
        const DISTRIBUTION  = 1 << 18;
        const OFFSETS       = 1 << 19;
        const JITTER        = 1 << 20;
        const TILT          = 1 << 21;
        const NETWORK       = 1 << 22;
        const ELEVATION     = 1 << 23;
        const CROSSWALK     = 1 << 24;
        const RAILS         = 1 << 25;
        const CHEVRON       = 1 << 26;
        const CORNER_RADIUS = 1 << 27;
        const CURB          = 1 << 28;
        const CROSSWALK_BORDER = 1 << 29;
    }
}

/// Copies every property whose capability both styles have, leaving the rest of the
/// target untouched. Returns the number of copied properties.
pub fn copy_properties(source: &dyn StyleProperties, target: &mut dyn StyleProperties) -> usize {
    let shared = source.capabilities() & target.capabilities();
    let mut copied = 0;
    for &name in source.property_names() {
        if !shared.contains(name.capability()) || !target.property_names().contains(&name) {
            continue;
        }
        let Some(value) = source.get_property(name) else {
            continue;
        };
        match target.set_property(name, value) {
            Ok(()) => copied += 1,
            Err(e) => log::warn!("could not copy {:?}: {}", name, e),
        }
    }
    copied
}
