//! Typed-view element kinds.
//!
//! Elements are stored in native byte order. Stores coerce an `f64` the way typed arrays do:
//! integral kinds wrap modulo their width, the clamped kind saturates with round-half-even, and
//! NaN stores 0 in every integral kind.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Int8,
    Uint8,
    Uint8Clamped,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Float32,
    Float64,
}

impl ElementKind {
    pub const ALL: [ElementKind; 9] = [
        ElementKind::Int8,
        ElementKind::Uint8,
        ElementKind::Uint8Clamped,
        ElementKind::Int16,
        ElementKind::Uint16,
        ElementKind::Int32,
        ElementKind::Uint32,
        ElementKind::Float32,
        ElementKind::Float64,
    ];

    /// Bytes per element.
    #[inline]
    pub fn size(self) -> usize {
        match self {
            ElementKind::Int8 | ElementKind::Uint8 | ElementKind::Uint8Clamped => 1,
            ElementKind::Int16 | ElementKind::Uint16 => 2,
            ElementKind::Int32 | ElementKind::Uint32 | ElementKind::Float32 => 4,
            ElementKind::Float64 => 8,
        }
    }

    /// Global constructor name.
    pub fn name(self) -> &'static str {
        match self {
            ElementKind::Int8 => "Int8Array",
            ElementKind::Uint8 => "Uint8Array",
            ElementKind::Uint8Clamped => "Uint8ClampedArray",
            ElementKind::Int16 => "Int16Array",
            ElementKind::Uint16 => "Uint16Array",
            ElementKind::Int32 => "Int32Array",
            ElementKind::Uint32 => "Uint32Array",
            ElementKind::Float32 => "Float32Array",
            ElementKind::Float64 => "Float64Array",
        }
    }

    /// Reads the element starting at `at`.
    pub fn load(self, bytes: &[u8], at: usize) -> f64 {
        match self {
            ElementKind::Int8 => bytes[at] as i8 as f64,
            ElementKind::Uint8 | ElementKind::Uint8Clamped => bytes[at] as f64,
            ElementKind::Int16 => i16::from_ne_bytes(take(bytes, at)) as f64,
            ElementKind::Uint16 => u16::from_ne_bytes(take(bytes, at)) as f64,
            ElementKind::Int32 => i32::from_ne_bytes(take(bytes, at)) as f64,
            ElementKind::Uint32 => u32::from_ne_bytes(take(bytes, at)) as f64,
            ElementKind::Float32 => f32::from_ne_bytes(take(bytes, at)) as f64,
            ElementKind::Float64 => f64::from_ne_bytes(take(bytes, at)),
        }
    }

    /// Coerces `value` to this kind and writes it starting at `at`.
    pub fn store(self, bytes: &mut [u8], at: usize, value: f64) {
        match self {
            ElementKind::Int8 | ElementKind::Uint8 => bytes[at] = to_int32(value) as u8,
            ElementKind::Uint8Clamped => bytes[at] = clamp_u8(value),
            ElementKind::Int16 | ElementKind::Uint16 => {
                put(bytes, at, (to_int32(value) as u16).to_ne_bytes())
            }
            ElementKind::Int32 | ElementKind::Uint32 => {
                put(bytes, at, to_uint32(value).to_ne_bytes())
            }
            ElementKind::Float32 => put(bytes, at, (value as f32).to_ne_bytes()),
            ElementKind::Float64 => put(bytes, at, value.to_ne_bytes()),
        }
    }
}

#[inline]
fn take<const N: usize>(bytes: &[u8], at: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[at..at + N]);
    out
}

#[inline]
fn put<const N: usize>(bytes: &mut [u8], at: usize, value: [u8; N]) {
    bytes[at..at + N].copy_from_slice(&value);
}

/// Wraps to an unsigned 32-bit integer; non-finite values become 0.
pub fn to_uint32(value: f64) -> u32 {
    if !value.is_finite() {
        return 0;
    }
    value.trunc().rem_euclid(4_294_967_296.0) as u32
}

/// Wraps to a signed 32-bit integer; non-finite values become 0.
pub fn to_int32(value: f64) -> i32 {
    to_uint32(value) as i32
}

fn clamp_u8(value: f64) -> u8 {
    if value.is_nan() || value <= 0.0 {
        return 0;
    }
    if value >= 255.0 {
        return 255;
    }
    value.round_ties_even() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_stores_wrap() {
        let mut bytes = [0u8; 8];
        ElementKind::Int8.store(&mut bytes, 0, 200.0);
        assert_eq!(ElementKind::Int8.load(&bytes, 0), -56.0);
        ElementKind::Uint16.store(&mut bytes, 0, -1.0);
        assert_eq!(ElementKind::Uint16.load(&bytes, 0), 65535.0);
        ElementKind::Int32.store(&mut bytes, 0, 4_294_967_297.5);
        assert_eq!(ElementKind::Int32.load(&bytes, 0), 1.0);
        ElementKind::Uint32.store(&mut bytes, 4, -2.0);
        assert_eq!(ElementKind::Uint32.load(&bytes, 4), 4_294_967_294.0);
    }

    #[test]
    fn nan_stores_zero_in_integral_kinds() {
        for kind in ElementKind::ALL {
            if matches!(kind, ElementKind::Float32 | ElementKind::Float64) {
                continue;
            }
            let mut bytes = [0xffu8; 8];
            kind.store(&mut bytes, 0, f64::NAN);
            assert_eq!(kind.load(&bytes, 0), 0.0, "{kind:?}");
        }
    }

    #[test]
    fn clamped_rounds_half_to_even() {
        let mut bytes = [0u8; 1];
        let clamped = |bytes: &mut [u8; 1], v: f64| {
            ElementKind::Uint8Clamped.store(bytes, 0, v);
            bytes[0]
        };
        assert_eq!(clamped(&mut bytes, 1.5), 2);
        assert_eq!(clamped(&mut bytes, 2.5), 2);
        assert_eq!(clamped(&mut bytes, 300.0), 255);
        assert_eq!(clamped(&mut bytes, -4.0), 0);
        assert_eq!(clamped(&mut bytes, f64::INFINITY), 255);
    }

    #[test]
    fn floats_pass_through() {
        let mut bytes = [0u8; 8];
        ElementKind::Float64.store(&mut bytes, 0, 0.1);
        assert_eq!(ElementKind::Float64.load(&bytes, 0), 0.1);
        ElementKind::Float32.store(&mut bytes, 0, 0.5);
        assert_eq!(ElementKind::Float32.load(&bytes, 0), 0.5);
        ElementKind::Float32.store(&mut bytes, 0, f64::NAN);
        assert!(ElementKind::Float32.load(&bytes, 0).is_nan());
    }
}
