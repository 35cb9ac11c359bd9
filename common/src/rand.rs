//! Stateless pseudo random numbers. The same inputs always give the same output,
//! which keeps generated geometry reproducible.

// A single iteration of Bob Jenkins' One-At-A-Time hashing algorithm.
fn hash(mut x: u32) -> u32 {
    x = x.wrapping_add(x << 10u32);
    x ^= x >> 6u32;
    x = x.wrapping_add(x << 3u32);
    x ^= x >> 11u32;
    x = x.wrapping_add(x << 15u32);
    x
}

fn hash3(x: u32, y: u32, z: u32) -> u32 {
    hash(x ^ hash(y) ^ hash(z.wrapping_mul(0x9E37_79B9)))
}

// Float in [0; 1) built from the low 23 bits.
fn float_construct(mut m: u32) -> f32 {
    const IEEE_MANTISSA: u32 = 0x007FFFFFu32;
    const IEEE_ONE: u32 = 0x3F800000u32;

    m &= IEEE_MANTISSA;
    m |= IEEE_ONE;

    f32::from_bits(m) - 1.0
}

/// Pseudo-random value in [0; 1) from integer inputs
pub fn randu3(x: u32, y: u32, z: u32) -> f32 {
    float_construct(hash3(x, y, z))
}

/// Pseudo-random value in [min; max], returns min when the range is empty
pub fn rand_range(seed: u32, index: u32, channel: u32, min: f32, max: f32) -> f32 {
    if max <= min {
        return min;
    }
    min + (max - min) * randu3(seed, index, channel)
}
