//! Store-wide singletons.

use std::any::{Any, TypeId};
use std::collections::HashMap;

use scenery_foundation::{Error, ErrorKind, Result};
use scenery_transfer::{Serializer, SerializerExt, Transfer};

use crate::component::Singleton;

type TransferFn = fn(&mut SingletonRegistry, &mut dyn Serializer) -> Result<()>;

#[derive(Clone, Copy)]
struct SingletonHooks {
    type_id: TypeId,
    name: &'static str,
    transfer: TransferFn,
}

/// At most one value per singleton type.
#[derive(Default)]
pub struct SingletonRegistry {
    values: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
    declared: Vec<SingletonHooks>,
}

impl std::fmt::Debug for SingletonRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingletonRegistry")
            .field("len", &self.values.len())
            .field("declared", &self.declared.iter().map(|h| h.name).collect::<Vec<_>>())
            .finish()
    }
}

impl SingletonRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a singleton. Fails if one of this type exists.
    pub fn add<T: Singleton>(&mut self, value: T) -> Result<()> {
        let type_id = TypeId::of::<T>();
        if self.values.contains_key(&type_id) {
            return Err(Error::new(ErrorKind::SingletonExists(T::NAME)));
        }
        self.values.insert(type_id, Box::new(value));
        Ok(())
    }

    /// Adds or replaces a singleton, returning the previous value.
    pub fn insert<T: Singleton>(&mut self, value: T) -> Option<T> {
        self.values
            .insert(TypeId::of::<T>(), Box::new(value))
            .and_then(|previous| previous.downcast().ok())
            .map(|previous| *previous)
    }

    /// Returns the singleton of type `T`.
    #[must_use]
    pub fn get<T: Singleton>(&self) -> Option<&T> {
        self.values.get(&TypeId::of::<T>())?.downcast_ref()
    }

    /// Returns the singleton of type `T` mutably.
    pub fn get_mut<T: Singleton>(&mut self) -> Option<&mut T> {
        self.values.get_mut(&TypeId::of::<T>())?.downcast_mut()
    }

    /// Removes and returns the singleton of type `T`.
    pub fn remove<T: Singleton>(&mut self) -> Option<T> {
        let boxed = self.values.remove(&TypeId::of::<T>())?;
        boxed.downcast().ok().map(|value| *value)
    }

    /// Returns true if a singleton of type `T` exists.
    #[must_use]
    pub fn contains<T: Singleton>(&self) -> bool {
        self.values.contains_key(&TypeId::of::<T>())
    }

    /// Number of singletons present.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no singleton is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Declares `T` as part of scene serialization.
    ///
    /// Returns false if it was already declared.
    pub fn declare<T: Singleton + Transfer + Default>(&mut self) -> bool {
        let type_id = TypeId::of::<T>();
        if self.declared.iter().any(|hooks| hooks.type_id == type_id) {
            return false;
        }
        self.declared.push(SingletonHooks {
            type_id,
            name: T::NAME,
            transfer: transfer_singleton::<T>,
        });
        true
    }

    /// Names of declared singleton types, in declaration order.
    pub fn declared(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.declared.iter().map(|hooks| hooks.name)
    }

    /// Transfers every declared singleton, in declaration order.
    pub fn transfer(&mut self, serializer: &mut dyn Serializer) -> Result<()> {
        let declared = self.declared.clone();
        for hooks in declared {
            (hooks.transfer)(self, serializer)?;
        }
        Ok(())
    }
}

/// Saving writes the singleton only if present. Loading does nothing when
/// the input has no entry for the singleton; otherwise it builds a default
/// value, fills it from the input, and replaces any existing instance.
fn transfer_singleton<T: Singleton + Transfer + Default>(
    registry: &mut SingletonRegistry,
    serializer: &mut dyn Serializer,
) -> Result<()> {
    if serializer.direction().reads() {
        return match registry.get_mut::<T>() {
            Some(value) => serializer.object(value, T::NAME),
            None => Ok(()),
        };
    }
    if !serializer.contains(T::NAME) {
        return Ok(());
    }
    let mut value = T::default();
    serializer.object(&mut value, T::NAME)?;
    registry.insert(value);
    Ok(())
}
