use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn a(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: a as f32 / 255.0,
        }
    }

    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    /// Packs the color as 0xRRGGBBAA
    pub fn to_u32(self) -> u32 {
        u32::from_be_bytes(self.to_rgba8())
    }

    pub fn from_u32(v: u32) -> Self {
        let [r, g, b, a] = v.to_be_bytes();
        Self::from_rgba8(r, g, b, a)
    }

    pub fn lerp(self, other: Color, c: f32) -> Self {
        Self {
            r: self.r + (other.r - self.r) * c,
            g: self.g + (other.g - self.g) * c,
            b: self.b + (other.b - self.b) * c,
            a: self.a + (other.a - self.a) * c,
        }
    }

    pub const TRANSPARENT: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };

    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };

    pub const RED: Color = Color {
        r: 1.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };

    pub const YELLOW: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 0.0,
        a: 1.0,
    };
}

impl From<Color> for [f32; 4] {
    fn from(x: Color) -> [f32; 4] {
        [x.r, x.g, x.b, x.a]
    }
}

#[cfg(test)]
mod tests {
    use super::Color;

    #[test]
    fn test_u32_roundtrip() {
        let c = Color::from_rgba8(12, 200, 7, 128);
        assert_eq!(Color::from_u32(c.to_u32()), c);
        assert_eq!(Color::WHITE.to_u32(), 0xFFFFFFFF);
    }
}
