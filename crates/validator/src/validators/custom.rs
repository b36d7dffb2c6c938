//! Closure-backed leaves
//!
//! [`Satisfies`] turns a predicate into a reusable leaf with its own code and
//! message, for use in composites. Inside a builder, `must` and `must_with`
//! are usually simpler.

use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::foundation::{Validate, ValidationError};

/// A leaf that accepts values for which `predicate` returns `true`.
///
/// # Examples
///
/// ```rust,ignore
/// let even = Satisfies::new("even", "The field {name} must be even.", |n: &i64| n % 2 == 0);
/// assert!(even.validate(&4).is_ok());
/// ```
pub struct Satisfies<T: ?Sized> {
    code: Cow<'static, str>,
    message: Cow<'static, str>,
    predicate: Arc<dyn Fn(&T) -> bool + Send + Sync>,
    _input: PhantomData<fn(&T)>,
}

impl<T: ?Sized> Satisfies<T> {
    pub fn new<F>(code: impl Into<Cow<'static, str>>, message: impl Into<Cow<'static, str>>, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self {
            code: code.into(),
            message: message.into(),
            predicate: Arc::new(predicate),
            _input: PhantomData,
        }
    }
}

impl<T: ?Sized> Validate for Satisfies<T> {
    type Input = T;

    fn validate(&self, input: &T) -> Result<(), ValidationError> {
        if (self.predicate)(input) {
            Ok(())
        } else {
            Err(ValidationError::new(self.code.clone(), self.message.clone()))
        }
    }
}

impl<T: ?Sized> Clone for Satisfies<T> {
    fn clone(&self) -> Self {
        Self {
            code: self.code.clone(),
            message: self.message.clone(),
            predicate: Arc::clone(&self.predicate),
            _input: PhantomData,
        }
    }
}

impl<T: ?Sized> fmt::Debug for Satisfies<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Satisfies").field("code", &self.code).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicate_decides() {
        let even = Satisfies::new("even", "{name} must be even.", |n: &i64| n % 2 == 0);
        assert!(even.validate(&4).is_ok());
        let error = even.clone().validate(&3).unwrap_err();
        assert_eq!(error.code, "even");
    }

    #[test]
    fn unsized_inputs() {
        let upper = Satisfies::<str>::new("upper", "upper", |s| s.chars().all(char::is_uppercase));
        assert!(upper.validate("AB").is_ok());
        assert!(upper.validate("Ab").is_err());
    }
}
