//! Per-width "unset" markers
//!
//! The scheduler reserves one bit pattern per integer width to mean
//! "explicitly unset". It is distinct from zero, and clearing a field
//! restores it rather than zeroing the field.

use std::fmt;

/// Unset marker for 8-bit fields
pub const NO_VAL8: u8 = 0xfe;
/// Unset marker for 16-bit fields
pub const NO_VAL16: u16 = 0xfffe;
/// Unset marker for 32-bit fields
pub const NO_VAL: u32 = 0xffff_fffe;
/// Unset marker for 64-bit fields
pub const NO_VAL64: u64 = 0xffff_ffff_ffff_fffe;

/// Integer width of a scalar record field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Width {
    W8,
    W16,
    W32,
    W64,
}

impl Width {
    /// All widths, narrowest first
    pub const ALL: [Width; 4] = [Width::W8, Width::W16, Width::W32, Width::W64];

    /// Number of bits
    pub fn bits(self) -> u32 {
        match self {
            Width::W8 => 8,
            Width::W16 => 16,
            Width::W32 => 32,
            Width::W64 => 64,
        }
    }

    /// The reserved "unset" pattern, widened to `u64`
    pub fn unset(self) -> u64 {
        match self {
            Width::W8 => NO_VAL8 as u64,
            Width::W16 => NO_VAL16 as u64,
            Width::W32 => NO_VAL as u64,
            Width::W64 => NO_VAL64,
        }
    }

    /// Whether `value` is this width's unset pattern
    pub fn is_unset(
        self,
        value: u64,
    ) -> bool {
        self.truncate(value) == self.unset()
    }

    /// Keep only the low `bits()` bits of `value`
    pub fn truncate(
        self,
        value: u64,
    ) -> u64 {
        match self {
            Width::W64 => value,
            _ => value & ((1u64 << self.bits()) - 1),
        }
    }
}

impl fmt::Display for Width {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "u{}", self.bits())
    }
}

/// `unset(width)`
pub fn unset(width: Width) -> u64 {
    width.unset()
}

/// `is_unset(width, value)`
pub fn is_unset(
    width: Width,
    value: u64,
) -> bool {
    width.is_unset(value)
}
