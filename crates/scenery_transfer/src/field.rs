//! Field-level transfer for primitives and simple containers.

use scenery_foundation::{AssetId, Error, Result};

use crate::serializer::{Scalar, Serializer};

/// A value that can be transferred as a single named field.
///
/// Primitives map to [`Scalar`] slots. Narrower numeric types are widened
/// for the backend and range-checked on the way back in.
pub trait Field {
    /// Transfers this value under `name`.
    fn transfer_field<S: Serializer + ?Sized>(&mut self, serializer: &mut S, name: &str) -> Result<()>;
}

impl Field for bool {
    fn transfer_field<S: Serializer + ?Sized>(&mut self, serializer: &mut S, name: &str) -> Result<()> {
        serializer.scalar(name, Scalar::Bool(self))
    }
}

impl Field for i64 {
    fn transfer_field<S: Serializer + ?Sized>(&mut self, serializer: &mut S, name: &str) -> Result<()> {
        serializer.scalar(name, Scalar::Int(self))
    }
}

impl Field for u64 {
    fn transfer_field<S: Serializer + ?Sized>(&mut self, serializer: &mut S, name: &str) -> Result<()> {
        serializer.scalar(name, Scalar::UInt(self))
    }
}

impl Field for f64 {
    fn transfer_field<S: Serializer + ?Sized>(&mut self, serializer: &mut S, name: &str) -> Result<()> {
        serializer.scalar(name, Scalar::Float(self))
    }
}

impl Field for String {
    fn transfer_field<S: Serializer + ?Sized>(&mut self, serializer: &mut S, name: &str) -> Result<()> {
        serializer.scalar(name, Scalar::Text(self))
    }
}

macro_rules! impl_narrow_field {
    ($($ty:ty => $wide:ty, $variant:ident;)*) => {$(
        impl Field for $ty {
            fn transfer_field<S: Serializer + ?Sized>(
                &mut self,
                serializer: &mut S,
                name: &str,
            ) -> Result<()> {
                let mut wide = <$wide>::try_from(*self).map_err(|_| Error::out_of_range(name, *self))?;
                serializer.scalar(name, Scalar::$variant(&mut wide))?;
                if serializer.direction().writes() {
                    *self = <$ty>::try_from(wide).map_err(|_| Error::out_of_range(name, wide))?;
                }
                Ok(())
            }
        }
    )*};
}

impl_narrow_field! {
    i8 => i64, Int;
    i16 => i64, Int;
    i32 => i64, Int;
    u8 => u64, UInt;
    u16 => u64, UInt;
    u32 => u64, UInt;
    usize => u64, UInt;
}

impl Field for f32 {
    #[allow(clippy::cast_possible_truncation)]
    fn transfer_field<S: Serializer + ?Sized>(&mut self, serializer: &mut S, name: &str) -> Result<()> {
        let mut wide = f64::from(*self);
        serializer.scalar(name, Scalar::Float(&mut wide))?;
        if serializer.direction().writes() {
            if wide.is_finite() && wide.abs() > f64::from(f32::MAX) {
                return Err(Error::out_of_range(name, wide));
            }
            *self = wide as f32;
        }
        Ok(())
    }
}

impl Field for AssetId {
    fn transfer_field<S: Serializer + ?Sized>(&mut self, serializer: &mut S, name: &str) -> Result<()> {
        let mut raw = self.raw();
        serializer.scalar(name, Scalar::UInt(&mut raw))?;
        if serializer.direction().writes() {
            *self = AssetId::new(raw);
        }
        Ok(())
    }
}

/// Fixed-size arrays (vectors, quaternions, colors) transfer as arrays of
/// elements. Missing trailing elements keep their current values.
impl<T: Field, const N: usize> Field for [T; N] {
    fn transfer_field<S: Serializer + ?Sized>(&mut self, serializer: &mut S, name: &str) -> Result<()> {
        if !serializer.push_array(name)? {
            return Ok(());
        }
        for (i, item) in self.iter_mut().enumerate() {
            if !serializer.begin_element()? {
                break;
            }
            item.transfer_field(serializer, "")
                .map_err(|e| e.within(format!("{name}[{i}]")))?;
            serializer.end_element()?;
        }
        serializer.pop_array()
    }
}

impl<T: Field + Default> Field for Vec<T> {
    fn transfer_field<S: Serializer + ?Sized>(&mut self, serializer: &mut S, name: &str) -> Result<()> {
        if !serializer.push_array(name)? {
            return Ok(());
        }
        if serializer.direction().reads() {
            for (i, item) in self.iter_mut().enumerate() {
                serializer.begin_element()?;
                item.transfer_field(serializer, "")
                    .map_err(|e| e.within(format!("{name}[{i}]")))?;
                serializer.end_element()?;
            }
        } else {
            self.clear();
            while serializer.begin_element()? {
                let mut item = T::default();
                item.transfer_field(serializer, "")
                    .map_err(|e| e.within(format!("{name}[{}]", self.len())))?;
                serializer.end_element()?;
                self.push(item);
            }
        }
        serializer.pop_array()
    }
}

impl<T: Field + Default> Field for Option<T> {
    fn transfer_field<S: Serializer + ?Sized>(&mut self, serializer: &mut S, name: &str) -> Result<()> {
        if serializer.direction().reads() {
            match self {
                Some(value) => value.transfer_field(serializer, name),
                None => Ok(()),
            }
        } else {
            if !serializer.contains(name) {
                *self = None;
                return Ok(());
            }
            let mut value = T::default();
            value.transfer_field(serializer, name)?;
            *self = Some(value);
            Ok(())
        }
    }
}
