//! Validator nodes
//!
//! Every evaluable unit of a validator tree implements [`Rule`]. Leaves are
//! adapted through [`LeafRule`] / [`ContextualRule`]; presence checks and
//! closures have their own nodes. Nodes are stored in a [`RuleEntry`] that
//! adds the rule-set tag and the message override.

use std::borrow::Borrow;
use std::fmt;
use std::marker::PhantomData;
use std::ops::ControlFlow;
use std::sync::Arc;

use tracing::trace;

use crate::engine::rule_set::{self, RuleSets};
use crate::foundation::message::{self, ErrorMessage};
use crate::foundation::{
    AsValidatable, ContextualValidator, Presence, ServiceResolver, Validate, ValidationContext,
    ValidationError, ValidationErrors,
};

// ============================================================================
// FAILURE SINK
// ============================================================================

/// Collects failures during one evaluation.
///
/// A first-only sink breaks evaluation after the first failure; it backs the
/// `validate` and `is_valid` entry points.
#[derive(Debug, Default)]
pub struct Failures {
    errors: Vec<ValidationError>,
    first_only: bool,
}

impl Failures {
    pub fn collect_all() -> Self {
        Self::default()
    }

    pub fn first_only() -> Self {
        Self {
            errors: Vec::new(),
            first_only: true,
        }
    }

    /// Records a failure; `Break` tells the caller to stop.
    pub fn push(&mut self, error: ValidationError) -> ControlFlow<()> {
        self.errors.push(error);
        if self.first_only {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }

    /// Records every failure of `other`, in order.
    pub fn append(&mut self, other: Self) -> ControlFlow<()> {
        for error in other.errors {
            self.push(error)?;
        }
        ControlFlow::Continue(())
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn stops_at_first(&self) -> bool {
        self.first_only
    }

    /// Failures recorded since `start`.
    pub(crate) fn since_mut(&mut self, start: usize) -> &mut [ValidationError] {
        &mut self.errors[start..]
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.errors.truncate(len);
    }

    /// `None` when nothing failed.
    pub fn into_report(self) -> Option<ValidationErrors> {
        if self.errors.is_empty() {
            None
        } else {
            Some(self.errors.into())
        }
    }

    pub fn into_first(self) -> Option<ValidationError> {
        self.errors.into_iter().next()
    }
}

// ============================================================================
// RULE
// ============================================================================

/// An evaluable node for values of type `P`.
pub trait Rule<P: ?Sized>: Send + Sync {
    fn evaluate(&self, value: &P, ctx: &ValidationContext<'_>, failures: &mut Failures) -> ControlFlow<()>;

    /// Propagates a dependency resolver into nested validators.
    fn bind_resolver(&mut self, _resolver: &Arc<dyn ServiceResolver>) {}

    /// Offers a fixed rule-set list to nested validators (first write wins).
    fn inherit_rule_sets(&mut self, _rule_sets: &RuleSets) {}

    /// Deep copy for rebinding under a new owner.
    fn clone_rule(&self) -> Box<dyn Rule<P>>;

    /// Concrete access for containers that keep configuring a node after
    /// attaching it.
    fn as_any_mut(&mut self) -> Option<&mut dyn std::any::Any> {
        None
    }
}

impl<P: ?Sized + 'static> Clone for Box<dyn Rule<P>> {
    fn clone(&self) -> Self {
        self.clone_rule()
    }
}

// ============================================================================
// RULE ENTRY
// ============================================================================

/// A node plus its rule-set tag and message override.
pub(crate) struct RuleEntry<P: ?Sized> {
    rule: Box<dyn Rule<P>>,
    rule_sets: Option<RuleSets>,
    message: Option<ErrorMessage>,
    custom_message: bool,
}

impl<P: ?Sized + 'static> RuleEntry<P> {
    pub(crate) fn new(rule: Box<dyn Rule<P>>, rule_sets: Option<RuleSets>) -> Self {
        Self {
            rule,
            rule_sets,
            message: None,
            custom_message: false,
        }
    }

    pub(crate) fn rule_sets(&self) -> Option<&RuleSets> {
        self.rule_sets.as_ref()
    }

    pub(crate) fn is_active(&self, selector: Option<&RuleSets>) -> bool {
        rule_set::is_active(self.rule_sets.as_ref(), selector)
    }

    /// Sets a user message; it replaces any earlier one.
    pub(crate) fn set_message(&mut self, message: ErrorMessage) {
        self.message = Some(message);
        self.custom_message = true;
    }

    /// Sets a fallback message unless a custom one is already bound.
    pub(crate) fn set_default_message(&mut self, message: &ErrorMessage) {
        if !self.custom_message {
            self.message = Some(message.clone());
        }
    }

    #[cfg(test)]
    pub(crate) fn has_custom_message(&self) -> bool {
        self.custom_message
    }

    pub(crate) fn rule_mut(&mut self) -> &mut dyn Rule<P> {
        self.rule.as_mut()
    }

    pub(crate) fn evaluate(&self, value: &P, ctx: &ValidationContext<'_>, failures: &mut Failures) -> ControlFlow<()> {
        let start = failures.len();
        let flow = self.rule.evaluate(value, ctx, failures);
        if let Some(message) = &self.message {
            let name = ctx.message_name();
            for error in failures.since_mut(start) {
                message::apply_override(error, message, name, ctx.messages());
            }
        }
        flow
    }
}

impl<P: ?Sized + 'static> Clone for RuleEntry<P> {
    fn clone(&self) -> Self {
        Self {
            rule: self.rule.clone_rule(),
            rule_sets: self.rule_sets.clone(),
            message: self.message.clone(),
            custom_message: self.custom_message,
        }
    }
}

impl<P: ?Sized> fmt::Debug for RuleEntry<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleEntry")
            .field("rule_sets", &self.rule_sets)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

/// Evaluates active entries in order; used by "all"-style containers.
pub(crate) fn skip_inactive<'e, P: ?Sized + 'static>(
    entries: impl IntoIterator<Item = &'e RuleEntry<P>>,
    selector: Option<&'e RuleSets>,
) -> impl Iterator<Item = &'e RuleEntry<P>> {
    entries.into_iter().filter(move |entry| {
        let active = entry.is_active(selector);
        if !active {
            trace!(rule_sets = ?entry.rule_sets(), "rule skipped by rule-set selection");
        }
        active
    })
}

// ============================================================================
// LEAF ADAPTERS
// ============================================================================

fn reject(mut error: ValidationError, attempted: Option<String>, ctx: &ValidationContext<'_>, failures: &mut Failures) -> ControlFlow<()> {
    if error.attempted_value.is_none() {
        error.attempted_value = attempted;
    }
    message::localize(&mut error, ctx.message_name(), ctx.messages());
    failures.push(error)
}

/// Adapts a [`Validate`] leaf to any value viewable as its input.
pub struct LeafRule<V, P: ?Sized> {
    validator: V,
    _value: PhantomData<fn(&P)>,
}

impl<V, P: ?Sized> LeafRule<V, P> {
    pub fn new(validator: V) -> Self {
        Self {
            validator,
            _value: PhantomData,
        }
    }
}

impl<V, P> Rule<P> for LeafRule<V, P>
where
    V: Validate + Clone + Send + Sync + 'static,
    V::Input: fmt::Debug,
    P: AsValidatable<V::Input> + ?Sized + 'static,
{
    fn evaluate(&self, value: &P, ctx: &ValidationContext<'_>, failures: &mut Failures) -> ControlFlow<()> {
        match value.as_validatable() {
            Err(error) => reject(error, None, ctx, failures),
            Ok(None) => ControlFlow::Continue(()),
            Ok(Some(view)) => {
                let input: &V::Input = view.borrow();
                match self.validator.validate(input) {
                    Ok(()) => ControlFlow::Continue(()),
                    Err(error) => reject(error, Some(format!("{input:?}")), ctx, failures),
                }
            }
        }
    }

    fn clone_rule(&self) -> Box<dyn Rule<P>> {
        Box::new(Self::new(self.validator.clone()))
    }
}

/// Adapts a [`ContextualValidator`] leaf.
pub struct ContextualRule<V, P: ?Sized> {
    validator: V,
    _value: PhantomData<fn(&P)>,
}

impl<V, P: ?Sized> ContextualRule<V, P> {
    pub fn new(validator: V) -> Self {
        Self {
            validator,
            _value: PhantomData,
        }
    }
}

impl<V, P> Rule<P> for ContextualRule<V, P>
where
    V: ContextualValidator + Clone + Send + Sync + 'static,
    V::Input: fmt::Debug,
    P: AsValidatable<V::Input> + ?Sized + 'static,
{
    fn evaluate(&self, value: &P, ctx: &ValidationContext<'_>, failures: &mut Failures) -> ControlFlow<()> {
        match value.as_validatable() {
            Err(error) => reject(error, None, ctx, failures),
            Ok(None) => ControlFlow::Continue(()),
            Ok(Some(view)) => {
                let input: &V::Input = view.borrow();
                match self.validator.validate_with_context(input, ctx) {
                    Ok(()) => ControlFlow::Continue(()),
                    Err(error) => reject(error, Some(format!("{input:?}")), ctx, failures),
                }
            }
        }
    }

    fn clone_rule(&self) -> Box<dyn Rule<P>> {
        Box::new(Self::new(self.validator.clone()))
    }
}

/// Presence check: fails for `None`, JSON `null` and blank strings.
pub struct PresenceRule<P: ?Sized> {
    _value: PhantomData<fn(&P)>,
}

impl<P: ?Sized> PresenceRule<P> {
    pub fn new() -> Self {
        Self { _value: PhantomData }
    }
}

impl<P: ?Sized> Default for PresenceRule<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Presence + ?Sized + 'static> Rule<P> for PresenceRule<P> {
    fn evaluate(&self, value: &P, ctx: &ValidationContext<'_>, failures: &mut Failures) -> ControlFlow<()> {
        if value.is_present() {
            ControlFlow::Continue(())
        } else {
            reject(ValidationError::required(), None, ctx, failures)
        }
    }

    fn clone_rule(&self) -> Box<dyn Rule<P>> {
        Box::new(Self::new())
    }
}

pub(crate) type Predicate<P> = Arc<dyn Fn(&P) -> bool + Send + Sync>;
pub(crate) type ContextPredicate<P> = Arc<dyn Fn(&P, &ValidationContext<'_>) -> bool + Send + Sync>;

/// A closure rule: `must(|v| ...)`.
pub struct PredicateRule<P: ?Sized> {
    predicate: ContextPredicate<P>,
}

impl<P: ?Sized> PredicateRule<P> {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&P, &ValidationContext<'_>) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
        }
    }
}

impl<P: ?Sized + 'static> Rule<P> for PredicateRule<P> {
    fn evaluate(&self, value: &P, ctx: &ValidationContext<'_>, failures: &mut Failures) -> ControlFlow<()> {
        if (self.predicate)(value, ctx) {
            ControlFlow::Continue(())
        } else {
            reject(
                ValidationError::new("predicate", "The specified condition was not met for '{name}'."),
                None,
                ctx,
                failures,
            )
        }
    }

    fn clone_rule(&self) -> Box<dyn Rule<P>> {
        Box::new(Self {
            predicate: Arc::clone(&self.predicate),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::{MinLength, NotEmpty};

    fn run<P: ?Sized>(rule: &dyn Rule<P>, value: &P) -> Vec<ValidationError> {
        let mut failures = Failures::collect_all();
        let _ = rule.evaluate(value, &ValidationContext::new(), &mut failures);
        failures.into_report().map(ValidationErrors::into_vec).unwrap_or_default()
    }

    #[test]
    fn leaf_records_attempted_value_and_renders_name() {
        let rule: LeafRule<MinLength, str> = LeafRule::new(MinLength::new(3));
        let errors = run(&rule, "ab");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].attempted_value.as_deref(), Some("\"ab\""));
        assert!(errors[0].message.contains("Value"));
    }

    #[test]
    fn leaf_skips_absent_values() {
        let rule: LeafRule<NotEmpty, Option<String>> = LeafRule::new(NotEmpty);
        assert!(run(&rule, &None).is_empty());
        assert_eq!(run(&rule, &Some(String::new())).len(), 1);
    }

    #[test]
    fn presence_rejects_missing() {
        let rule = PresenceRule::<Option<String>>::new();
        assert_eq!(run(&rule, &None)[0].code, "required");
        assert!(run(&rule, &Some("x".into())).is_empty());
    }

    #[test]
    fn first_only_sink_breaks() {
        let mut failures = Failures::first_only();
        assert!(failures.push(ValidationError::required()).is_break());
        let mut all = Failures::collect_all();
        assert!(all.push(ValidationError::required()).is_continue());
        assert_eq!(all.len(), 1);
    }

    #[test]
    fn custom_message_is_not_overwritten_by_default() {
        let mut entry: RuleEntry<str> = RuleEntry::new(Box::new(LeafRule::<NotEmpty, str>::new(NotEmpty)), None);
        entry.set_message("custom".into());
        entry.set_default_message(&"fallback".into());
        assert!(entry.has_custom_message());

        let mut failures = Failures::collect_all();
        let _ = entry.evaluate("", &ValidationContext::new(), &mut failures);
        assert_eq!(failures.into_first().map(|e| e.message.into_owned()), Some("custom".to_string()));
    }
}
