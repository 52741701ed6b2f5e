//! Visitor-based serialization for Scenery.
//!
//! Types describe their persistent shape once, in a [`Transfer`] impl, and
//! any [`Serializer`] backend drives that description in either direction:
//!
//! - [`Direction::Read`] reads values out of objects (saving)
//! - [`Direction::Write`] writes values into objects (loading)
//! - [`Direction::ReadWrite`] does both (inspection)
//!
//! [`Document`] is the in-memory reference backend; it can be encoded as
//! `MessagePack`.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod document;
pub mod field;
pub mod serializer;

pub use document::{Document, DocumentReader, DocumentWriter, Node};
pub use field::Field;
pub use scenery_foundation::{Error, ErrorKind, Result};
pub use serializer::{Direction, Scalar, Serializer, SerializerExt, Transfer};

/// Implements [`Transfer`] for a struct by transferring each listed field
/// under its own name.
///
/// ```
/// use scenery_transfer::impl_transfer;
///
/// #[derive(Default)]
/// struct Health {
///     current: f32,
///     max: f32,
/// }
///
/// impl_transfer!(Health { current, max });
/// ```
#[macro_export]
macro_rules! impl_transfer {
    ($ty:ty { $($field:ident),* $(,)? }) => {
        impl $crate::Transfer for $ty {
            fn transfer<S: $crate::Serializer + ?Sized>(
                &mut self,
                serializer: &mut S,
            ) -> $crate::Result<()> {
                use $crate::SerializerExt as _;
                $( serializer.field(&mut self.$field, stringify!($field))?; )*
                Ok(())
            }
        }
    };
}
