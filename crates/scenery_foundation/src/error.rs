//! Error types for Scenery.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.

use std::fmt;

use thiserror::Error;

use crate::entity::Entity;

/// The main error type for Scenery operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Prepends a scope frame, creating the context if needed.
    ///
    /// Called while unwinding out of nested scopes, so the outermost frame
    /// ends up first.
    #[must_use]
    pub fn within(mut self, frame: impl Into<String>) -> Self {
        self.context
            .get_or_insert_with(ErrorContext::new)
            .path
            .insert(0, frame.into());
        self
    }

    /// Records the entity being processed, unless one is already recorded.
    #[must_use]
    pub fn for_entity(mut self, entity: Entity) -> Self {
        let context = self.context.get_or_insert_with(ErrorContext::new);
        context.entity.get_or_insert(entity);
        self
    }

    /// Returns the category of this error.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    /// Creates an entity not found error.
    #[must_use]
    pub fn entity_not_found(entity: Entity) -> Self {
        Self::new(ErrorKind::EntityNotFound(entity))
    }

    /// Creates a stale entity reference error.
    #[must_use]
    pub fn stale_entity(entity: Entity) -> Self {
        Self::new(ErrorKind::StaleEntity(entity))
    }

    /// Creates an unregistered component type error.
    #[must_use]
    pub fn not_registered(component: &'static str) -> Self {
        Self::new(ErrorKind::ComponentNotRegistered(component))
    }

    /// Creates a missing component error.
    #[must_use]
    pub fn component_not_found(entity: Entity, component: &'static str) -> Self {
        Self::new(ErrorKind::ComponentNotFound { entity, component })
    }

    /// Creates a type mismatch error for a serialized field.
    #[must_use]
    pub fn type_mismatch(field: impl Into<String>, expected: &'static str, found: &'static str) -> Self {
        Self::new(ErrorKind::TypeMismatch {
            field: field.into(),
            expected,
            found,
        })
    }

    /// Creates an out of range error for a serialized field.
    #[must_use]
    pub fn out_of_range(field: impl Into<String>, value: impl fmt::Display) -> Self {
        Self::new(ErrorKind::OutOfRange {
            field: field.into(),
            value: value.to_string(),
        })
    }

    /// Creates a serialization error.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SerializationError(message.into()))
    }
}

/// Broad classification of errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The caller broke an API precondition.
    Contract,
    /// Serialized data was malformed or out of range.
    Data,
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// Component type was used before registration.
    #[error("component type not registered: {0}")]
    ComponentNotRegistered(&'static str),

    /// Component type was registered twice.
    #[error("component type already registered: {0}")]
    ComponentAlreadyRegistered(&'static str),

    /// All archetype bits are taken.
    #[error("too many component types (limit {limit})")]
    TooManyComponentTypes {
        /// Maximum number of component types.
        limit: usize,
    },

    /// Entity was not found in the store.
    #[error("entity not found: {0:?}")]
    EntityNotFound(Entity),

    /// Entity handle is stale (generation mismatch).
    #[error("stale entity reference: {0:?}")]
    StaleEntity(Entity),

    /// Component not present on entity.
    #[error("component not found: {component} on entity {entity:?}")]
    ComponentNotFound {
        /// The entity that was queried.
        entity: Entity,
        /// The component name that was not found.
        component: &'static str,
    },

    /// Component already present on entity.
    #[error("duplicate component: {component} already on entity {entity:?}")]
    DuplicateComponent {
        /// The entity that already holds the component.
        entity: Entity,
        /// The component name.
        component: &'static str,
    },

    /// A query named the same component type more than once.
    #[error("component type appears twice in query: {0}")]
    DuplicateQueryType(&'static str),

    /// Singleton of this type already exists.
    #[error("singleton already exists: {0}")]
    SingletonExists(&'static str),

    /// The configured entity limit was reached.
    #[error("entity capacity exceeded (limit {limit})")]
    CapacityExceeded {
        /// The configured limit.
        limit: usize,
    },

    /// A required object or array scope is absent from the input.
    #[error("missing scope: {0}")]
    MissingScope(String),

    /// Scope push/pop calls were unbalanced or of the wrong kind.
    #[error("scope mismatch: expected {expected}, found {found}")]
    ScopeMismatch {
        /// Expected scope kind.
        expected: &'static str,
        /// Actual scope kind.
        found: &'static str,
    },

    /// Serialized value had the wrong type.
    #[error("type mismatch in field '{field}': expected {expected}, found {found}")]
    TypeMismatch {
        /// The field name.
        field: String,
        /// The expected type.
        expected: &'static str,
        /// The type encountered.
        found: &'static str,
    },

    /// Serialized value does not fit the target type.
    #[error("value out of range in field '{field}': {value}")]
    OutOfRange {
        /// The field name.
        field: String,
        /// The offending value.
        value: String,
    },

    /// Encoding or decoding failed.
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

impl ErrorKind {
    /// Returns the category of this error kind.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingScope(_)
            | Self::ScopeMismatch { .. }
            | Self::TypeMismatch { .. }
            | Self::OutOfRange { .. }
            | Self::SerializationError(_) => ErrorCategory::Data,
            _ => ErrorCategory::Contract,
        }
    }
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Scope path, outermost first.
    pub path: Vec<String>,
    /// Entity being processed, if any.
    pub entity: Option<Entity>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a scope frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.path.push(frame.into());
        self
    }

    /// Sets the entity.
    #[must_use]
    pub fn with_entity(mut self, entity: Entity) -> Self {
        self.entity = Some(entity);
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.path.is_empty() {
            write!(f, "at {}", self.path.join("/"))?;
        }
        if let Some(entity) = self.entity {
            if !self.path.is_empty() {
                write!(f, " ")?;
            }
            write!(f, "(entity {entity})")?;
        }
        Ok(())
    }
}
