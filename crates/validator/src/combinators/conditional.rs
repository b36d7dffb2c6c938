//! CONDITIONAL combinator - picks a branch from a predicate on the value
//!
//! The `then` branch runs when the condition holds, `otherwise` when it
//! does not. A missing `otherwise` means the false case passes. Both
//! branches start in `All` mode and keep whatever mode `configure` sets.

use std::fmt;
use std::ops::ControlFlow;
use std::sync::Arc;

use crate::engine::node::Predicate;
use crate::engine::{Failures, Rule, RuleSets, ValueValidator};
use crate::foundation::{ServiceResolver, ValidationContext};

/// Branching node over one value.
///
/// # Examples
///
/// ```rust,ignore
/// use vigil_validator::prelude::*;
///
/// let login = ConditionalValidator::<str>::new(|s| s.contains('@'))
///     .then(|r| { r.email(); })
///     .otherwise(|r| { r.user_name(); });
/// assert!(login.is_valid("a@b.com"));
/// assert!(!login.is_valid("bad__name"));
/// ```
pub struct ConditionalValidator<P: ?Sized + 'static> {
    condition: Predicate<P>,
    then: ValueValidator<P>,
    otherwise: Option<ValueValidator<P>>,
}

impl<P: ?Sized + 'static> ConditionalValidator<P> {
    pub fn new<F>(condition: F) -> Self
    where
        F: Fn(&P) -> bool + Send + Sync + 'static,
    {
        Self {
            condition: Arc::new(condition),
            then: ValueValidator::new(),
            otherwise: None,
        }
    }

    /// Rules for values matching the condition.
    #[must_use = "builder methods must be chained or built"]
    pub fn then<F>(mut self, configure: F) -> Self
    where
        F: FnOnce(&mut ValueValidator<P>),
    {
        configure(&mut self.then);
        self
    }

    /// Rules for values that do not match.
    #[must_use = "builder methods must be chained or built"]
    pub fn otherwise<F>(mut self, configure: F) -> Self
    where
        F: FnOnce(&mut ValueValidator<P>),
    {
        let mut otherwise = ValueValidator::new();
        configure(&mut otherwise);
        self.otherwise = Some(otherwise);
        self
    }

    pub fn has_otherwise(&self) -> bool {
        self.otherwise.is_some()
    }
}

impl<P: ?Sized + 'static> Rule<P> for ConditionalValidator<P> {
    fn evaluate(&self, value: &P, ctx: &ValidationContext<'_>, failures: &mut Failures) -> ControlFlow<()> {
        if (self.condition)(value) {
            self.then.evaluate(value, ctx, failures)
        } else if let Some(otherwise) = &self.otherwise {
            otherwise.evaluate(value, ctx, failures)
        } else {
            ControlFlow::Continue(())
        }
    }

    fn bind_resolver(&mut self, resolver: &Arc<dyn ServiceResolver>) {
        self.then.bind_resolver(resolver);
        if let Some(otherwise) = self.otherwise.as_mut() {
            otherwise.bind_resolver(resolver);
        }
    }

    fn inherit_rule_sets(&mut self, rule_sets: &RuleSets) {
        self.then.inherit_rule_sets(rule_sets);
        if let Some(otherwise) = self.otherwise.as_mut() {
            otherwise.inherit_rule_sets(rule_sets);
        }
    }

    fn clone_rule(&self) -> Box<dyn Rule<P>> {
        Box::new(self.clone())
    }
}

impl<P: ?Sized + 'static> Clone for ConditionalValidator<P> {
    fn clone(&self) -> Self {
        Self {
            condition: Arc::clone(&self.condition),
            then: self.then.clone(),
            otherwise: self.otherwise.clone(),
        }
    }
}

impl<P: ?Sized + 'static> fmt::Debug for ConditionalValidator<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionalValidator")
            .field("then", &self.then)
            .field("otherwise", &self.otherwise)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinators::composite::ValidationMode;
    use crate::engine::RuleBuilder;
    use crate::foundation::Validator;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn login() -> ConditionalValidator<str> {
        ConditionalValidator::new(|s: &str| s.contains('@'))
            .then(|r| {
                r.email();
            })
            .otherwise(|r| {
                r.user_name();
            })
    }

    #[rstest]
    #[case("a@b.com", true)]
    #[case("a@b", false)]
    #[case("good_name", true)]
    #[case("bad__name", false)]
    fn branches(#[case] input: &str, #[case] ok: bool) {
        assert_eq!(login().is_valid(input), ok);
    }

    #[test]
    fn missing_otherwise_passes() {
        let v = ConditionalValidator::<str>::new(|s| s.len() > 3).then(|r| {
            r.contains("x");
        });
        assert!(!v.has_otherwise());
        assert!(v.is_valid("ab"));
        assert!(!v.is_valid("abcd"));
    }

    #[rstest]
    #[case::then_branch("ab", 1)]
    #[case::otherwise_branch("a_", 1)]
    fn branches_keep_their_configured_mode(#[case] input: &str, #[case] expected: usize) {
        let v = ConditionalValidator::<str>::new(|s| !s.contains('_'))
            .then(|r| {
                r.min_length(5).contains("@").use_mode(ValidationMode::FailFast);
            })
            .otherwise(|r| {
                r.min_length(5).contains("@").use_mode(ValidationMode::FailFast);
            });
        assert_eq!(v.get_failures(input).map(|e| e.len()), Some(expected));
    }

    #[test]
    fn branches_collect_all_by_default() {
        let v = ConditionalValidator::<str>::new(|_| true).then(|r| {
            r.min_length(5).contains("@");
        });
        assert_eq!(v.get_failures("ab").map(|e| e.len()), Some(2));
    }

    #[test]
    fn nests_in_value_validator() {
        let mut v = ValueValidator::<str>::new();
        v.required().conditional(login());
        assert!(v.is_valid("good_name"));
        assert_eq!(v.get_failures("a@b").unwrap().first().unwrap().code, "email");
    }
}
