//! Typed queries over component columns.
//!
//! ```text
//! store.for_each::<(&Position, &mut Velocity)>(|entity, (pos, vel)| {
//!     // use pos and vel
//! })?;
//!
//! 1. Compute the search mask from the registered bits of Position and Velocity
//! 2. Take both columns out of the registry
//! 3. For each bucket whose archetype is a superset of the mask, bind and call
//! 4. Put the columns back
//! ```
//!
//! Taking columns out of the registry gives the query owned values, so the
//! borrow checker can see that `&Position` and `&mut Velocity` never alias.

use scenery_foundation::{Archetype, Entity, Error, ErrorKind, Result};

use crate::column::ComponentColumn;
use crate::component::Component;
use crate::registry::{ComponentType, TypeRegistry};

/// Where a query looks for component values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// Only values currently attached.
    Live,
    /// Attached values, then values removed earlier this frame.
    WithRetired,
    /// Values removed earlier this frame, then attached values.
    RetiredFirst,
}

/// Something a query can bind per entity.
///
/// Implemented for `&T` (shared read), `&mut T` (exclusive write), and tuples
/// of queries up to eight elements.
pub trait Query {
    /// The value handed to the callback for one entity.
    type Item<'a>;

    /// Columns held while the query runs.
    type Columns;

    /// Diagnostic name.
    fn name() -> &'static str;

    /// The search mask. Fails on unregistered or repeated component types.
    fn archetype(registry: &TypeRegistry) -> Result<Archetype>;

    /// Takes the needed columns out of the registry.
    ///
    /// Call [`archetype`](Self::archetype) first; extraction assumes the
    /// types are registered and distinct.
    fn extract(registry: &mut TypeRegistry) -> Result<Self::Columns>;

    /// Puts extracted columns back.
    fn restore(columns: Self::Columns, registry: &mut TypeRegistry);

    /// Binds the item for one entity.
    fn fetch(columns: &mut Self::Columns, entity: Entity, lookup: Lookup) -> Option<Self::Item<'_>>;

    /// Binds items for many entities at once, as disjoint borrows.
    fn fetch_many<'a>(columns: &'a mut Self::Columns, entities: &[Entity]) -> Vec<Option<Self::Item<'a>>>;
}

/// Columns taken out of a registry for the duration of one query.
///
/// The columns go back into the registry when this is dropped, including
/// while unwinding from a panicking callback.
pub struct QueryColumns<'r, Q: Query> {
    registry: &'r mut TypeRegistry,
    columns: Option<Q::Columns>,
}

impl<'r, Q: Query> QueryColumns<'r, Q> {
    /// Validates `Q` and takes its columns out of `registry`.
    pub fn extract(registry: &'r mut TypeRegistry) -> Result<Self> {
        Q::archetype(registry)?;
        let columns = Q::extract(registry)?;
        Ok(Self {
            registry,
            columns: Some(columns),
        })
    }

    /// Binds the item for one entity.
    pub fn fetch(&mut self, entity: Entity, lookup: Lookup) -> Option<Q::Item<'_>> {
        Q::fetch(self.columns.as_mut()?, entity, lookup)
    }

    /// Binds items for many entities at once, as disjoint borrows.
    pub fn fetch_many(&mut self, entities: &[Entity]) -> Vec<Option<Q::Item<'_>>> {
        match self.columns.as_mut() {
            Some(columns) => Q::fetch_many(columns, entities),
            None => Vec::new(),
        }
    }
}

impl<Q: Query> Drop for QueryColumns<'_, Q> {
    fn drop(&mut self) {
        if let Some(columns) = self.columns.take() {
            Q::restore(columns, self.registry);
        }
    }
}

impl<T: Component> Query for &T {
    type Item<'a> = &'a T;
    type Columns = (ComponentType, Box<ComponentColumn<T>>);

    fn name() -> &'static str {
        T::NAME
    }

    fn archetype(registry: &TypeRegistry) -> Result<Archetype> {
        Ok(Archetype::single(registry.require::<T>()?.bit()))
    }

    fn extract(registry: &mut TypeRegistry) -> Result<Self::Columns> {
        registry.extract::<T>()
    }

    fn restore(columns: Self::Columns, registry: &mut TypeRegistry) {
        registry.restore(columns.0, columns.1);
    }

    fn fetch(columns: &mut Self::Columns, entity: Entity, lookup: Lookup) -> Option<Self::Item<'_>> {
        match lookup {
            Lookup::Live => columns.1.get(entity),
            Lookup::WithRetired => columns.1.get_or_retired(entity),
            Lookup::RetiredFirst => columns.1.get_retired_or_live(entity),
        }
    }

    fn fetch_many<'a>(columns: &'a mut Self::Columns, entities: &[Entity]) -> Vec<Option<Self::Item<'a>>> {
        let column: &'a ComponentColumn<T> = &columns.1;
        entities.iter().map(|entity| column.get(*entity)).collect()
    }
}

impl<T: Component> Query for &mut T {
    type Item<'a> = &'a mut T;
    type Columns = (ComponentType, Box<ComponentColumn<T>>);

    fn name() -> &'static str {
        T::NAME
    }

    fn archetype(registry: &TypeRegistry) -> Result<Archetype> {
        Ok(Archetype::single(registry.require::<T>()?.bit()))
    }

    fn extract(registry: &mut TypeRegistry) -> Result<Self::Columns> {
        registry.extract::<T>()
    }

    fn restore(columns: Self::Columns, registry: &mut TypeRegistry) {
        registry.restore(columns.0, columns.1);
    }

    fn fetch(columns: &mut Self::Columns, entity: Entity, lookup: Lookup) -> Option<Self::Item<'_>> {
        match lookup {
            Lookup::Live => columns.1.get_mut(entity),
            Lookup::WithRetired => columns.1.get_mut_or_retired(entity),
            Lookup::RetiredFirst => columns.1.get_mut_retired_or_live(entity),
        }
    }

    fn fetch_many<'a>(columns: &'a mut Self::Columns, entities: &[Entity]) -> Vec<Option<Self::Item<'a>>> {
        columns.1.get_many_mut(entities)
    }
}

/// Implement `Query` for tuples of queries.
///
/// This lets you write `store.for_each::<(&A, &mut B)>(|e, (a, b)| { ... })`
/// and get `(Entity, (&A, &mut B))` per matching entity.
macro_rules! impl_query_tuple {
    ($($Q:ident),+) => {
        impl<$($Q: Query),+> Query for ($($Q,)+) {
            type Item<'a> = ($($Q::Item<'a>,)+);
            type Columns = ($($Q::Columns,)+);

            fn name() -> &'static str {
                std::any::type_name::<Self>()
            }

            fn archetype(registry: &TypeRegistry) -> Result<Archetype> {
                let mut mask = Archetype::EMPTY;
                $(
                    let part = $Q::archetype(registry)?;
                    if mask.intersects(part) {
                        return Err(Error::new(ErrorKind::DuplicateQueryType($Q::name())));
                    }
                    mask = mask.union(part);
                )+
                Ok(mask)
            }

            #[allow(non_snake_case)]
            fn extract(registry: &mut TypeRegistry) -> Result<Self::Columns> {
                Ok(($($Q::extract(registry)?,)+))
            }

            #[allow(non_snake_case)]
            fn restore(columns: Self::Columns, registry: &mut TypeRegistry) {
                let ($($Q,)+) = columns;
                $($Q::restore($Q, registry);)+
            }

            #[allow(non_snake_case)]
            fn fetch(columns: &mut Self::Columns, entity: Entity, lookup: Lookup) -> Option<Self::Item<'_>> {
                let ($($Q,)+) = columns;
                Some(($($Q::fetch($Q, entity, lookup)?,)+))
            }

            #[allow(non_snake_case)]
            fn fetch_many<'a>(columns: &'a mut Self::Columns, entities: &[Entity]) -> Vec<Option<Self::Item<'a>>> {
                let ($($Q,)+) = columns;
                let ($(mut $Q,)+) = ($($Q::fetch_many($Q, entities).into_iter(),)+);
                // Every iterator advances on every row so the columns stay aligned
                (0..entities.len())
                    .map(|_| {
                        let ($($Q,)+) = ($($Q.next().flatten(),)+);
                        Some(($($Q?,)+))
                    })
                    .collect()
            }
        }
    };
}

impl_query_tuple!(A);
impl_query_tuple!(A, B);
impl_query_tuple!(A, B, C);
impl_query_tuple!(A, B, C, D);
impl_query_tuple!(A, B, C, D, E);
impl_query_tuple!(A, B, C, D, E, F);
impl_query_tuple!(A, B, C, D, E, F, G);
impl_query_tuple!(A, B, C, D, E, F, G, H);
