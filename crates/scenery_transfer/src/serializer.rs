//! The serializer contract.

use scenery_foundation::Result;

use crate::field::Field;

/// Which way values flow through a [`Serializer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Values are read out of objects into the backend (saving).
    Read,
    /// Values are written from the backend into objects (loading).
    Write,
    /// Values flow both ways (inspectors, editors).
    ReadWrite,
}

impl Direction {
    /// Returns true if values are read out of objects.
    #[must_use]
    pub const fn reads(self) -> bool {
        matches!(self, Self::Read | Self::ReadWrite)
    }

    /// Returns true if values are written into objects.
    #[must_use]
    pub const fn writes(self) -> bool {
        matches!(self, Self::Write | Self::ReadWrite)
    }
}

/// A primitive slot handed to a backend.
///
/// When saving, the backend reads the referenced value. When loading, it
/// overwrites it, and leaves it untouched if the input has no such field.
#[derive(Debug)]
pub enum Scalar<'a> {
    /// Boolean.
    Bool(&'a mut bool),
    /// Signed integer.
    Int(&'a mut i64),
    /// Unsigned integer.
    UInt(&'a mut u64),
    /// Floating point.
    Float(&'a mut f64),
    /// UTF-8 text.
    Text(&'a mut String),
}

impl Scalar<'_> {
    /// Name of the slot's type, for error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::UInt(_) => "uint",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
        }
    }
}

/// A serialization backend.
///
/// Backends are stateful cursors over a tree of named objects, arrays, and
/// scalars. An empty `name` refers to the current array element itself.
///
/// The trait is object safe; the component store drives every backend
/// through `&mut dyn Serializer`.
pub trait Serializer {
    /// The direction values flow.
    fn direction(&self) -> Direction;

    /// Enters the named object scope.
    ///
    /// Returns `Ok(false)` when loading and the input has no such object, in
    /// which case no scope was entered and `pop_object` must not be called.
    fn push_object(&mut self, name: &str) -> Result<bool>;

    /// Leaves the current object scope.
    fn pop_object(&mut self) -> Result<()>;

    /// Enters the named array scope. Same return contract as `push_object`.
    fn push_array(&mut self, name: &str) -> Result<bool>;

    /// Leaves the current array scope.
    fn pop_array(&mut self) -> Result<()>;

    /// Enters the next element of the current array.
    ///
    /// Saving always appends a new element and returns `Ok(true)`. Loading
    /// returns `Ok(false)` once the elements are exhausted.
    fn begin_element(&mut self) -> Result<bool>;

    /// Leaves the current element.
    fn end_element(&mut self) -> Result<()>;

    /// Returns true if the current object has an entry called `name`.
    fn contains(&self, name: &str) -> bool;

    /// Transfers one primitive value.
    fn scalar(&mut self, name: &str, value: Scalar<'_>) -> Result<()>;
}

/// A type that describes its persistent shape to a [`Serializer`].
///
/// A single impl serves saving and loading; implementations that need
/// asymmetric behavior branch on [`Serializer::direction`].
pub trait Transfer {
    /// Walks this value's fields through `serializer`.
    fn transfer<S: Serializer + ?Sized>(&mut self, serializer: &mut S) -> Result<()>;
}

/// Convenience methods available on every serializer.
pub trait SerializerExt: Serializer {
    /// Transfers a field value.
    fn field<F: Field + ?Sized>(&mut self, value: &mut F, name: &str) -> Result<()> {
        value.transfer_field(self, name)
    }

    /// Transfers a nested object. Absent objects are skipped when loading.
    fn object<T: Transfer + ?Sized>(&mut self, value: &mut T, name: &str) -> Result<()> {
        if !self.push_object(name)? {
            return Ok(());
        }
        value.transfer(self).map_err(|e| e.within(name))?;
        self.pop_object()
    }

    /// Transfers a list of nested objects.
    ///
    /// Loading replaces the contents of `values`.
    fn vector<T: Transfer + Default>(&mut self, values: &mut Vec<T>, name: &str) -> Result<()> {
        if !self.push_array(name)? {
            return Ok(());
        }
        if self.direction().reads() {
            for (i, value) in values.iter_mut().enumerate() {
                self.begin_element()?;
                value
                    .transfer(self)
                    .map_err(|e| e.within(format!("{name}[{i}]")))?;
                self.end_element()?;
            }
        } else {
            values.clear();
            while self.begin_element()? {
                let mut value = T::default();
                value
                    .transfer(self)
                    .map_err(|e| e.within(format!("{name}[{}]", values.len())))?;
                self.end_element()?;
                values.push(value);
            }
        }
        self.pop_array()
    }
}

impl<S: Serializer + ?Sized> SerializerExt for S {}
