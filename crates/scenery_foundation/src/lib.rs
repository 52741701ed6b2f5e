//! Core handles, masks, and errors for Scenery.
//!
//! This crate provides:
//! - [`Entity`] - Generational entity handles
//! - [`Archetype`] - 64-bit component-set masks
//! - [`AssetId`] - Stable external identifiers used by scene files
//! - [`StoreConfig`] - Tunables for a component store
//! - [`Error`] - Rich error types with context

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod archetype;
pub mod asset;
pub mod config;
pub mod entity;
pub mod error;

pub use archetype::{Archetype, MAX_COMPONENT_TYPES};
pub use asset::{AssetId, AssetIdGenerator};
pub use config::StoreConfig;
pub use entity::Entity;
pub use error::{Error, ErrorCategory, ErrorContext, ErrorKind};

/// Result type alias using the Scenery error type.
pub type Result<T> = std::result::Result<T, Error>;
