//! Scenery - Archetype-indexed entity/component store
//!
//! This crate re-exports all layers of the Scenery system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 2: scenery_storage    - Registry, columns, queries, transitions, scene driver
//! Layer 1: scenery_transfer   - Serializer protocol, field transfer, document backend
//! Layer 0: scenery_foundation - Core types (Entity, Archetype, AssetId, Error, StoreConfig)
//! ```

pub use scenery_foundation as foundation;
pub use scenery_storage as storage;
pub use scenery_transfer as transfer;
