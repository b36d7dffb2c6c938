//! Collection size validators

use std::fmt;
use std::marker::PhantomData;

use crate::foundation::{Validate, ValidationError};

/// At least `min` elements.
pub struct MinSize<T> {
    pub min: usize,
    _element: PhantomData<fn(&T)>,
}

impl<T> MinSize<T> {
    #[must_use]
    pub fn new(min: usize) -> Self {
        Self {
            min,
            _element: PhantomData,
        }
    }
}

impl<T> Validate for MinSize<T> {
    type Input = [T];

    fn validate(&self, input: &[T]) -> Result<(), ValidationError> {
        if input.len() >= self.min {
            Ok(())
        } else {
            Err(ValidationError::new(
                "min_size",
                "The field {name} must contain at least {min} elements.",
            )
            .with_param("min", self.min.to_string())
            .with_param("actual", input.len().to_string()))
        }
    }
}

/// At most `max` elements.
pub struct MaxSize<T> {
    pub max: usize,
    _element: PhantomData<fn(&T)>,
}

impl<T> MaxSize<T> {
    #[must_use]
    pub fn new(max: usize) -> Self {
        Self {
            max,
            _element: PhantomData,
        }
    }
}

impl<T> Validate for MaxSize<T> {
    type Input = [T];

    fn validate(&self, input: &[T]) -> Result<(), ValidationError> {
        if input.len() <= self.max {
            Ok(())
        } else {
            Err(ValidationError::new(
                "max_size",
                "The field {name} must contain at most {max} elements.",
            )
            .with_param("max", self.max.to_string())
            .with_param("actual", input.len().to_string()))
        }
    }
}

// Manual impls: derives would bound `T`.
macro_rules! size_impls {
    ($($name:ident . $field:ident),+) => {$(
        impl<T> Clone for $name<T> {
            fn clone(&self) -> Self {
                Self::new(self.$field)
            }
        }

        impl<T> fmt::Debug for $name<T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($name)).field(stringify!($field), &self.$field).finish()
            }
        }
    )+};
}

size_impls!(MinSize.min, MaxSize.max);
