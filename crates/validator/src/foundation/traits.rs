//! Core traits for the validation system
//!
//! - [`Validate`]: stateless leaf predicate over one input type.
//! - [`ContextualValidator`]: leaf that also reads the [`ValidationContext`].
//! - [`Validator`]: the evaluation surface of engine validators
//!   (`is_valid`, `get_failures`, `validate`, each with a rule-set overload).

use std::borrow::Borrow;

use crate::engine::{Failures, Rule, RuleSets};
use crate::foundation::validatable::AsValidatable;
use crate::foundation::{Error, ValidationContext, ValidationError, ValidationErrors};

// ============================================================================
// LEAF VALIDATOR TRAIT
// ============================================================================

/// The contract every leaf validator implements.
///
/// # Examples
///
/// ```rust,ignore
/// use vigil_validator::foundation::{Validate, ValidationError};
///
/// struct Even;
///
/// impl Validate for Even {
///     type Input = i64;
///
///     fn validate(&self, input: &i64) -> Result<(), ValidationError> {
///         if input % 2 == 0 {
///             Ok(())
///         } else {
///             Err(ValidationError::new("even", "The field {name} must be even."))
///         }
///     }
/// }
/// ```
pub trait Validate {
    /// Use `?Sized` inputs (`str`, `[T]`) where possible.
    type Input: ?Sized;

    fn validate(&self, input: &Self::Input) -> Result<(), ValidationError>;

    /// Validates any value viewable as `Self::Input`; absent values pass.
    fn validate_any<S>(&self, value: &S) -> Result<(), ValidationError>
    where
        Self: Sized,
        S: AsValidatable<Self::Input> + ?Sized,
    {
        match value.as_validatable()? {
            Some(output) => self.validate(output.borrow()),
            None => Ok(()),
        }
    }
}

impl<V: Validate + ?Sized> Validate for &V {
    type Input = V::Input;

    fn validate(&self, input: &Self::Input) -> Result<(), ValidationError> {
        (**self).validate(input)
    }
}

impl<V: Validate + ?Sized> Validate for Box<V> {
    type Input = V::Input;

    fn validate(&self, input: &Self::Input) -> Result<(), ValidationError> {
        (**self).validate(input)
    }
}

// ============================================================================
// CONTEXTUAL VALIDATOR
// ============================================================================

/// A leaf validator that needs the ambient context: the owning instance,
/// the item bag or a resolved service.
pub trait ContextualValidator {
    type Input: ?Sized;

    fn validate_with_context(
        &self,
        input: &Self::Input,
        ctx: &ValidationContext<'_>,
    ) -> Result<(), ValidationError>;
}

// ============================================================================
// EVALUATION SURFACE
// ============================================================================

/// Public evaluation entry points shared by value, object, collection and
/// combinator validators.
///
/// Implemented for every [`Rule`]. `get_failures*` aggregate every failure
/// of the active nodes; `validate*` stop at the first failure and return it
/// as [`Error::Validation`].
pub trait Validator<T: ?Sized>: Rule<T> {
    fn get_failures_with(&self, value: &T, ctx: &ValidationContext<'_>) -> Option<ValidationErrors> {
        let mut failures = Failures::collect_all();
        let _ = self.evaluate(value, ctx, &mut failures);
        failures.into_report()
    }

    /// All failures, or `None` when the value is valid.
    fn get_failures(&self, value: &T) -> Option<ValidationErrors> {
        self.get_failures_with(value, &ValidationContext::new())
    }

    fn get_failures_for<R>(&self, value: &T, rule_sets: R) -> Option<ValidationErrors>
    where
        Self: Sized,
        R: Into<RuleSets>,
    {
        self.get_failures_with(value, &ValidationContext::for_rule_sets(rule_sets))
    }

    fn is_valid_with(&self, value: &T, ctx: &ValidationContext<'_>) -> bool {
        let mut failures = Failures::first_only();
        let _ = self.evaluate(value, ctx, &mut failures);
        failures.is_empty()
    }

    fn is_valid(&self, value: &T) -> bool {
        self.is_valid_with(value, &ValidationContext::new())
    }

    fn is_valid_for<R>(&self, value: &T, rule_sets: R) -> bool
    where
        Self: Sized,
        R: Into<RuleSets>,
    {
        self.is_valid_with(value, &ValidationContext::for_rule_sets(rule_sets))
    }

    fn validate_with(&self, value: &T, ctx: &ValidationContext<'_>) -> Result<(), Error> {
        let mut failures = Failures::first_only();
        let _ = self.evaluate(value, ctx, &mut failures);
        match failures.into_first() {
            Some(first) => Err(Error::Validation(Box::new(first))),
            None => Ok(()),
        }
    }

    /// Stops at the first failure and returns it.
    fn validate(&self, value: &T) -> Result<(), Error> {
        self.validate_with(value, &ValidationContext::new())
    }

    fn validate_for<R>(&self, value: &T, rule_sets: R) -> Result<(), Error>
    where
        Self: Sized,
        R: Into<RuleSets>,
    {
        self.validate_with(value, &ValidationContext::for_rule_sets(rule_sets))
    }
}

impl<T: ?Sized, R: Rule<T> + ?Sized> Validator<T> for R {}
