//! Configuration for a component store.

use std::num::NonZeroUsize;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tunables for a component store.
///
/// Registration is an explicit startup phase by default; turning on
/// `implicit_registration` lets `add_component` register unknown types on
/// first use instead of failing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StoreConfig {
    /// Maximum number of live entities, if bounded.
    pub max_entities: Option<usize>,

    /// Reuse indices of destroyed entities (with a bumped generation).
    pub recycle_entities: bool,

    /// Register component types on first `add_component`.
    pub implicit_registration: bool,

    /// Number of worker threads for async queries. `None` uses the
    /// available parallelism.
    pub async_workers: Option<NonZeroUsize>,

    /// Seed for asset id generation. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl StoreConfig {
    /// Creates a configuration for editor sessions.
    ///
    /// Editors create many short-lived preview scenes and inspect arbitrary
    /// component types, so ids are recycled and registration is implicit.
    #[must_use]
    pub fn editor() -> Self {
        Self {
            recycle_entities: true,
            implicit_registration: true,
            ..Self::default()
        }
    }

    /// Creates a configuration whose asset ids and async partitioning are
    /// reproducible.
    #[must_use]
    pub fn deterministic(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            async_workers: NonZeroUsize::new(1),
            ..Self::default()
        }
    }

    /// Builder method to bound the number of live entities.
    #[must_use]
    pub fn with_max_entities(mut self, limit: usize) -> Self {
        self.max_entities = Some(limit);
        self
    }

    /// Builder method to set index recycling.
    #[must_use]
    pub fn with_recycle_entities(mut self, recycle: bool) -> Self {
        self.recycle_entities = recycle;
        self
    }

    /// Builder method to set implicit registration.
    #[must_use]
    pub fn with_implicit_registration(mut self, implicit: bool) -> Self {
        self.implicit_registration = implicit;
        self
    }

    /// Builder method to set the async worker count. Zero means default.
    #[must_use]
    pub fn with_async_workers(mut self, workers: usize) -> Self {
        self.async_workers = NonZeroUsize::new(workers);
        self
    }

    /// Builder method to set the asset id seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Resolves the async worker count.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.async_workers
            .or_else(|| std::thread::available_parallelism().ok())
            .map_or(1, NonZeroUsize::get)
    }
}
