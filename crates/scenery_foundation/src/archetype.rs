//! Archetype bitmasks.
//!
//! An archetype is the set of component types an entity currently holds,
//! encoded as one bit per registered type.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum number of component types a single store can register.
pub const MAX_COMPONENT_TYPES: usize = 64;

/// A set of component types, one bit per registered type.
#[derive(Copy, Clone, Default, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Archetype(u64);

impl Archetype {
    /// The archetype of an entity with no components.
    pub const EMPTY: Self = Self(0);

    /// Creates an archetype from raw bits.
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Creates an archetype containing a single bit.
    ///
    /// Bits at or above [`MAX_COMPONENT_TYPES`] yield the empty archetype.
    #[must_use]
    pub const fn single(bit: u32) -> Self {
        match 1u64.checked_shl(bit) {
            Some(bits) => Self(bits),
            None => Self::EMPTY,
        }
    }

    /// Returns the raw bits.
    #[must_use]
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Returns a copy with `bit` set.
    #[must_use]
    pub const fn with(self, bit: u32) -> Self {
        Self(self.0 | Self::single(bit).0)
    }

    /// Returns a copy with `bit` cleared.
    #[must_use]
    pub const fn without(self, bit: u32) -> Self {
        Self(self.0 & !Self::single(bit).0)
    }

    /// Returns true if `bit` is set.
    #[must_use]
    pub const fn has(self, bit: u32) -> bool {
        self.0 & Self::single(bit).0 != 0
    }

    /// Returns true if every bit of `other` is set in `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns true if `self` and `other` share any bit.
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Returns the union of both sets.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Returns true if no bit is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of component types in the set.
    #[must_use]
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Iterates over the set bits in ascending order.
    pub fn iter(self) -> impl Iterator<Item = u32> {
        let mut rest = self.0;
        std::iter::from_fn(move || {
            if rest == 0 {
                return None;
            }
            let bit = rest.trailing_zeros();
            rest &= rest - 1;
            Some(bit)
        })
    }
}

impl fmt::Debug for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Archetype({:#b})", self.0)
    }
}
