//! Stable external identifiers.
//!
//! Scene files refer to entities by [`AssetId`], which survives save/load
//! cycles where runtime [`Entity`](crate::Entity) handles do not.

use std::fmt;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A 64-bit identifier that is stable across sessions. Zero is invalid.
#[derive(Copy, Clone, Default, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AssetId(u64);

impl AssetId {
    /// The invalid id.
    pub const INVALID: Self = Self(0);

    /// Wraps a raw value.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Returns true unless this is [`AssetId::INVALID`].
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Debug for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetId({:016x})", self.0)
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl From<u64> for AssetId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

/// Generates fresh, valid asset ids.
///
/// Seeded generators produce the same sequence every run.
#[derive(Debug, Clone)]
pub struct AssetIdGenerator {
    rng: ChaCha8Rng,
}

impl AssetIdGenerator {
    /// Creates a generator with a deterministic seed.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Creates a generator seeded from the thread-local RNG.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::seeded(rand::random())
    }

    /// Creates a generator from an optional seed.
    #[must_use]
    pub fn new(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::seeded)
    }

    /// Returns the next valid id.
    pub fn next_id(&mut self) -> AssetId {
        loop {
            let raw: u64 = self.rng.r#gen();
            if raw != 0 {
                return AssetId(raw);
            }
        }
    }
}
