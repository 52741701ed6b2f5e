//! Component type registration.
//!
//! Each registered type gets the next free archetype bit, a column, and a
//! [`ComponentInfo`] record. Tokens are handed out in registration order and
//! never change for the lifetime of the registry.

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::fmt;

use scenery_foundation::{Error, ErrorKind, Result, MAX_COMPONENT_TYPES};

use crate::column::{ComponentColumn, ErasedColumn};
use crate::component::{Component, ComponentKind};
use crate::driver::TransferHooks;

/// Registration-time token for a component type; equal to its archetype bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentType(u32);

impl ComponentType {
    pub(crate) const fn from_bit(bit: u32) -> Self {
        Self(bit)
    }

    /// The archetype bit of this type.
    #[must_use]
    pub const fn bit(self) -> u32 {
        self.0
    }

    /// Position of this type in registration order.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Metadata about a registered component type.
#[derive(Debug, Clone)]
pub struct ComponentInfo {
    /// Token and archetype bit.
    pub ty: ComponentType,
    /// Stable name.
    pub name: &'static str,
    /// Rust type name, for diagnostics.
    pub type_name: &'static str,
    /// Duplication behavior.
    pub kind: ComponentKind,
    /// Size of one value in bytes.
    pub size: usize,
    pub(crate) transfer: Option<TransferHooks>,
}

impl ComponentInfo {
    /// Returns true if the type takes part in scene serialization.
    #[must_use]
    pub fn is_transferable(&self) -> bool {
        self.transfer.is_some()
    }
}

/// Maps component types to tokens and owns one column per type.
pub struct TypeRegistry {
    by_type: HashMap<TypeId, ComponentType>,
    by_name: HashMap<&'static str, ComponentType>,
    infos: Vec<ComponentInfo>,
    columns: Vec<Option<Box<dyn ErasedColumn>>>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("infos", &self.infos)
            .finish_non_exhaustive()
    }
}

impl TypeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            by_type: HashMap::new(),
            by_name: HashMap::new(),
            infos: Vec::new(),
            columns: Vec::new(),
        }
    }

    /// Registers `T`, assigning it the next archetype bit.
    pub fn register<T: Component>(&mut self) -> Result<ComponentType> {
        self.register_with::<T>(None)
    }

    pub(crate) fn register_with<T: Component>(&mut self, transfer: Option<TransferHooks>) -> Result<ComponentType> {
        if self.by_type.contains_key(&TypeId::of::<T>()) || self.by_name.contains_key(T::NAME) {
            return Err(Error::new(ErrorKind::ComponentAlreadyRegistered(T::NAME)));
        }
        if self.infos.len() >= MAX_COMPONENT_TYPES {
            return Err(Error::new(ErrorKind::TooManyComponentTypes {
                limit: MAX_COMPONENT_TYPES,
            }));
        }
        let bit = u32::try_from(self.infos.len())
            .map_err(|_| Error::new(ErrorKind::Internal("component bit overflow".into())))?;
        let ty = ComponentType(bit);

        self.by_type.insert(TypeId::of::<T>(), ty);
        self.by_name.insert(T::NAME, ty);
        self.infos.push(ComponentInfo {
            ty,
            name: T::NAME,
            type_name: type_name::<T>(),
            kind: T::KIND,
            size: size_of::<T>(),
            transfer,
        });
        self.columns.push(Some(Box::new(ComponentColumn::<T>::new())));
        Ok(ty)
    }

    /// Returns the token of `T`, if registered.
    #[must_use]
    pub fn lookup<T: Component>(&self) -> Option<ComponentType> {
        self.by_type.get(&TypeId::of::<T>()).copied()
    }

    /// Returns the token of `T`, or a `ComponentNotRegistered` error.
    pub fn require<T: Component>(&self) -> Result<ComponentType> {
        self.lookup::<T>().ok_or_else(|| Error::not_registered(T::NAME))
    }

    /// Returns the token registered under `name`.
    #[must_use]
    pub fn lookup_name(&self, name: &str) -> Option<ComponentType> {
        self.by_name.get(name).copied()
    }

    /// Returns metadata for a token.
    #[must_use]
    pub fn info(&self, ty: ComponentType) -> Option<&ComponentInfo> {
        self.infos.get(ty.index())
    }

    /// All registered types in bit order.
    #[must_use]
    pub fn infos(&self) -> &[ComponentInfo] {
        &self.infos
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.infos.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    /// Typed access to the column of `T`.
    #[must_use]
    pub fn column<T: Component>(&self) -> Option<&ComponentColumn<T>> {
        let ty = self.lookup::<T>()?;
        self.columns
            .get(ty.index())?
            .as_ref()?
            .as_any()
            .downcast_ref()
    }

    /// Typed mutable access to the column of `T`.
    pub fn column_mut<T: Component>(&mut self) -> Option<&mut ComponentColumn<T>> {
        let ty = self.lookup::<T>()?;
        self.columns
            .get_mut(ty.index())?
            .as_mut()?
            .as_any_mut()
            .downcast_mut()
    }

    /// Type-erased mutable access to the column for a token.
    pub(crate) fn erased_mut(&mut self, ty: ComponentType) -> Option<&mut Box<dyn ErasedColumn>> {
        self.columns.get_mut(ty.index())?.as_mut()
    }

    /// Takes the column of `T` out of the registry.
    ///
    /// Queries hold extracted columns as owned values so that several
    /// columns can be borrowed mutably at once. The column must be handed
    /// back with [`restore`](Self::restore).
    pub fn extract<T: Component>(&mut self) -> Result<(ComponentType, Box<ComponentColumn<T>>)> {
        let ty = self.require::<T>()?;
        let erased = self
            .columns
            .get_mut(ty.index())
            .and_then(Option::take)
            .ok_or_else(|| Error::new(ErrorKind::DuplicateQueryType(T::NAME)))?;
        let column = erased
            .into_any()
            .downcast::<ComponentColumn<T>>()
            .map_err(|_| Error::new(ErrorKind::Internal(format!("column type mismatch for {}", T::NAME))))?;
        Ok((ty, column))
    }

    /// Returns an extracted column to the registry.
    pub fn restore<T: Component>(&mut self, ty: ComponentType, column: Box<ComponentColumn<T>>) {
        if let Some(slot) = self.columns.get_mut(ty.index()) {
            *slot = Some(column);
        }
    }

    /// Drops retired values in every column.
    pub(crate) fn clear_retired(&mut self) {
        for column in self.columns.iter_mut().flatten() {
            column.clear_retired();
        }
    }
}
