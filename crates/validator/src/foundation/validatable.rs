//! Value conversions used by the engine
//!
//! - [`AsValidatable`] views a stored value as the input type of a leaf rule.
//! - [`Presence`] answers "is there a value at all" for required-style rules.
//! - [`Nested`] reaches the object a nested [`ObjectValidator`] validates.
//! - [`Elements`] iterates the items of a collection property.
//!
//! [`ObjectValidator`]: crate::engine::ObjectValidator

use std::borrow::Borrow;
use std::collections::{BTreeSet, HashSet, VecDeque};
use std::sync::Arc;

use crate::foundation::ValidationError;

// ============================================================================
// AS VALIDATABLE
// ============================================================================

/// Views `Self` as the input `T` of a leaf validator.
///
/// `Ok(None)` means the value is absent (`None`, JSON `null`); general rules
/// skip absent values and leave them to presence rules. `Err` is a shape
/// mismatch and is reported as a failure.
pub trait AsValidatable<T: ?Sized> {
    type Output<'a>: Borrow<T>
    where
        Self: 'a;

    fn as_validatable(&self) -> Result<Option<Self::Output<'_>>, ValidationError>;
}

macro_rules! identity_validatable {
    ($($ty:ty),+ $(,)?) => {$(
        impl AsValidatable<$ty> for $ty {
            type Output<'a> = &'a $ty;

            #[inline]
            fn as_validatable(&self) -> Result<Option<Self::Output<'_>>, ValidationError> {
                Ok(Some(self))
            }
        }
    )+};
}

identity_validatable!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char, str,
);

impl AsValidatable<str> for String {
    type Output<'a> = &'a str;

    fn as_validatable(&self) -> Result<Option<Self::Output<'_>>, ValidationError> {
        Ok(Some(self.as_str()))
    }
}

impl AsValidatable<str> for Box<str> {
    type Output<'a> = &'a str;

    fn as_validatable(&self) -> Result<Option<Self::Output<'_>>, ValidationError> {
        Ok(Some(&**self))
    }
}

impl AsValidatable<str> for Arc<str> {
    type Output<'a> = &'a str;

    fn as_validatable(&self) -> Result<Option<Self::Output<'_>>, ValidationError> {
        Ok(Some(&**self))
    }
}

impl<T> AsValidatable<[T]> for [T] {
    type Output<'a>
        = &'a [T]
    where
        Self: 'a;

    fn as_validatable(&self) -> Result<Option<Self::Output<'_>>, ValidationError> {
        Ok(Some(self))
    }
}

impl<T> AsValidatable<[T]> for Vec<T> {
    type Output<'a>
        = &'a [T]
    where
        Self: 'a;

    fn as_validatable(&self) -> Result<Option<Self::Output<'_>>, ValidationError> {
        Ok(Some(self.as_slice()))
    }
}

impl<I: ?Sized, T: AsValidatable<I>> AsValidatable<I> for Option<T> {
    type Output<'a>
        = T::Output<'a>
    where
        Self: 'a;

    fn as_validatable(&self) -> Result<Option<Self::Output<'_>>, ValidationError> {
        match self {
            Some(value) => value.as_validatable(),
            None => Ok(None),
        }
    }
}

impl<I: ?Sized, T: AsValidatable<I> + ?Sized> AsValidatable<I> for &T {
    type Output<'a>
        = T::Output<'a>
    where
        Self: 'a;

    fn as_validatable(&self) -> Result<Option<Self::Output<'_>>, ValidationError> {
        (**self).as_validatable()
    }
}

// JSON values are viewed by shape; a wrong shape is a type mismatch.

impl AsValidatable<str> for serde_json::Value {
    type Output<'a> = &'a str;

    fn as_validatable(&self) -> Result<Option<Self::Output<'_>>, ValidationError> {
        match self {
            Self::Null => Ok(None),
            Self::String(s) => Ok(Some(s.as_str())),
            _ => Err(ValidationError::type_mismatch("string")),
        }
    }
}

impl AsValidatable<i64> for serde_json::Value {
    type Output<'a> = i64;

    fn as_validatable(&self) -> Result<Option<Self::Output<'_>>, ValidationError> {
        match self {
            Self::Null => Ok(None),
            Self::Number(n) => n
                .as_i64()
                .map(Some)
                .ok_or_else(|| ValidationError::type_mismatch("integer")),
            _ => Err(ValidationError::type_mismatch("integer")),
        }
    }
}

impl AsValidatable<f64> for serde_json::Value {
    type Output<'a> = f64;

    fn as_validatable(&self) -> Result<Option<Self::Output<'_>>, ValidationError> {
        match self {
            Self::Null => Ok(None),
            Self::Number(n) => n
                .as_f64()
                .map(Some)
                .ok_or_else(|| ValidationError::type_mismatch("number")),
            _ => Err(ValidationError::type_mismatch("number")),
        }
    }
}

impl AsValidatable<bool> for serde_json::Value {
    type Output<'a> = bool;

    fn as_validatable(&self) -> Result<Option<Self::Output<'_>>, ValidationError> {
        match self {
            Self::Null => Ok(None),
            Self::Bool(b) => Ok(Some(*b)),
            _ => Err(ValidationError::type_mismatch("boolean")),
        }
    }
}

impl AsValidatable<[serde_json::Value]> for serde_json::Value {
    type Output<'a> = &'a [serde_json::Value];

    fn as_validatable(&self) -> Result<Option<Self::Output<'_>>, ValidationError> {
        match self {
            Self::Null => Ok(None),
            Self::Array(items) => Ok(Some(items.as_slice())),
            _ => Err(ValidationError::type_mismatch("array")),
        }
    }
}

// ============================================================================
// PRESENCE
// ============================================================================

/// Presence semantics for required-style rules.
pub trait Presence {
    /// `false` for a missing value. Blank strings are missing.
    fn is_present(&self) -> bool {
        true
    }

    /// The textual content, for string-like values.
    fn as_text(&self) -> Option<&str> {
        None
    }
}

macro_rules! always_present {
    ($($ty:ty),+ $(,)?) => {$( impl Presence for $ty {} )+};
}

always_present!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char);

impl Presence for str {
    fn is_present(&self) -> bool {
        !self.trim().is_empty()
    }

    fn as_text(&self) -> Option<&str> {
        Some(self)
    }
}

impl Presence for String {
    fn is_present(&self) -> bool {
        self.as_str().is_present()
    }

    fn as_text(&self) -> Option<&str> {
        Some(self.as_str())
    }
}

impl<T> Presence for [T] {}
impl<T> Presence for Vec<T> {}

impl<T: Presence> Presence for Option<T> {
    fn is_present(&self) -> bool {
        self.as_ref().is_some_and(Presence::is_present)
    }

    fn as_text(&self) -> Option<&str> {
        self.as_ref().and_then(Presence::as_text)
    }
}

impl<T: Presence + ?Sized> Presence for &T {
    fn is_present(&self) -> bool {
        (**self).is_present()
    }

    fn as_text(&self) -> Option<&str> {
        (**self).as_text()
    }
}

impl<T: Presence + ?Sized> Presence for Box<T> {
    fn is_present(&self) -> bool {
        (**self).is_present()
    }

    fn as_text(&self) -> Option<&str> {
        (**self).as_text()
    }
}

impl Presence for serde_json::Value {
    fn is_present(&self) -> bool {
        match self {
            Self::Null => false,
            Self::String(s) => s.is_present(),
            _ => true,
        }
    }

    fn as_text(&self) -> Option<&str> {
        self.as_str()
    }
}

// ============================================================================
// NESTED
// ============================================================================

/// Reaches the `N` a nested object validator runs against.
///
/// `None` (a missing nested object) is left to presence rules.
pub trait Nested<N: ?Sized> {
    fn nested(&self) -> Option<&N>;
}

impl<N: ?Sized> Nested<N> for N {
    #[inline]
    fn nested(&self) -> Option<&N> {
        Some(self)
    }
}

impl<N> Nested<N> for Option<N> {
    fn nested(&self) -> Option<&N> {
        self.as_ref()
    }
}

impl<N: ?Sized> Nested<N> for Box<N> {
    fn nested(&self) -> Option<&N> {
        Some(self)
    }
}

impl<N: ?Sized> Nested<N> for Arc<N> {
    fn nested(&self) -> Option<&N> {
        Some(self)
    }
}

// ============================================================================
// ELEMENTS
// ============================================================================

/// A collection whose items can be validated one by one.
pub trait Elements {
    type Item;

    fn elements(&self) -> impl Iterator<Item = &Self::Item>;
}

impl<T> Elements for [T] {
    type Item = T;

    fn elements(&self) -> impl Iterator<Item = &T> {
        self.iter()
    }
}

impl<T> Elements for Vec<T> {
    type Item = T;

    fn elements(&self) -> impl Iterator<Item = &T> {
        self.iter()
    }
}

impl<T> Elements for VecDeque<T> {
    type Item = T;

    fn elements(&self) -> impl Iterator<Item = &T> {
        self.iter()
    }
}

impl<T> Elements for BTreeSet<T> {
    type Item = T;

    fn elements(&self) -> impl Iterator<Item = &T> {
        self.iter()
    }
}

impl<T, S> Elements for HashSet<T, S> {
    type Item = T;

    fn elements(&self) -> impl Iterator<Item = &T> {
        self.iter()
    }
}

impl<C: Elements> Elements for Option<C> {
    type Item = C::Item;

    fn elements(&self) -> impl Iterator<Item = &C::Item> {
        self.iter().flat_map(|inner| inner.elements())
    }
}

impl Elements for serde_json::Value {
    type Item = Self;

    fn elements(&self) -> impl Iterator<Item = &Self> {
        self.as_array().into_iter().flatten()
    }
}
