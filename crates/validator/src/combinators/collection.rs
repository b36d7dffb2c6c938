//! COLLECTION combinators - one element validator over every item
//!
//! Element failures are prefixed with the element's position, `[i]`. The
//! position is the original one even when a filter skips earlier elements.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::ops::ControlFlow;
use std::sync::Arc;

use tracing::trace;

use crate::combinators::property::{PropertyRule, PropertyValidator};
use crate::engine::node::Predicate;
use crate::engine::{Failures, ObjectValidator, Rule, RuleBuilder, RuleSets, ValueValidator, path};
use crate::foundation::{Elements, Error, ServiceResolver, ValidationContext};

const ALTERNATIVE: &str = "child_rules or each_rules";

// ============================================================================
// COLLECTION VALIDATOR
// ============================================================================

/// Applies one element validator to each item of a collection of `E`.
///
/// # Examples
///
/// ```rust,ignore
/// use vigil_validator::prelude::*;
///
/// let mut hobbies = CollectionValidator::<Option<String>>::new();
/// hobbies.each_rules(|r| { r.required().min_length(2); })?;
/// let errors = hobbies.get_failures(&vec![Some("Furion".into()), None]).unwrap();
/// assert_eq!(errors.first().and_then(|e| e.member()), Some("[1]"));
/// ```
pub struct CollectionValidator<E: 'static> {
    element: Option<Box<dyn Rule<E>>>,
    filter: Option<Predicate<E>>,
    resolver: Option<Arc<dyn ServiceResolver>>,
    inherited_rule_sets: Option<RuleSets>,
}

impl<E: 'static> Default for CollectionValidator<E> {
    fn default() -> Self {
        Self {
            element: None,
            filter: None,
            resolver: None,
            inherited_rule_sets: None,
        }
    }
}

impl<E: 'static> CollectionValidator<E> {
    pub fn new() -> Self {
        Self::default()
    }

    fn attach(&mut self, mut element: Box<dyn Rule<E>>) -> Result<&mut Self, Error> {
        if self.element.is_some() {
            return Err(Error::NestedValidatorAlreadySet {
                site: "collection elements".into(),
                alternative: ALTERNATIVE,
            });
        }
        if let Some(sets) = &self.inherited_rule_sets {
            element.inherit_rule_sets(sets);
        }
        if let Some(resolver) = &self.resolver {
            element.bind_resolver(resolver);
        }
        self.element = Some(element);
        Ok(self)
    }

    /// Validates every element with an object validator.
    pub fn set_validator(&mut self, validator: ObjectValidator<E>) -> Result<&mut Self, Error> {
        self.attach(Box::new(validator))
    }

    /// Validates every element with a value validator.
    pub fn set_value_validator(&mut self, validator: ValueValidator<E>) -> Result<&mut Self, Error> {
        self.attach(Box::new(validator))
    }

    /// Object rules for each element, declared in place.
    pub fn child_rules<F>(&mut self, configure: F) -> Result<&mut Self, Error>
    where
        F: FnOnce(&mut ObjectValidator<E>),
    {
        let mut validator = ObjectValidator::new();
        configure(&mut validator);
        self.set_validator(validator)
    }

    /// Value rules for each element, declared in place.
    pub fn each_rules<F>(&mut self, configure: F) -> Result<&mut Self, Error>
    where
        F: FnOnce(&mut ValueValidator<E>),
    {
        let mut validator = ValueValidator::new();
        configure(&mut validator);
        self.set_value_validator(validator)
    }

    /// Only elements matching `filter` are validated; others count as valid.
    pub fn filter<F>(&mut self, filter: F) -> &mut Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(filter));
        self
    }

    pub fn has_element_validator(&self) -> bool {
        self.element.is_some()
    }

    pub fn bind_resolver(&mut self, resolver: &Arc<dyn ServiceResolver>) -> &mut Self {
        self.resolver = Some(Arc::clone(resolver));
        if let Some(element) = self.element.as_mut() {
            element.bind_resolver(resolver);
        }
        self
    }

    pub fn inherit_rule_sets(&mut self, rule_sets: &RuleSets) -> bool {
        if self.inherited_rule_sets.is_some() {
            return false;
        }
        self.inherited_rule_sets = Some(rule_sets.clone());
        if let Some(element) = self.element.as_mut() {
            element.inherit_rule_sets(rule_sets);
        }
        true
    }

    fn evaluate_items<'v>(
        &self,
        items: impl Iterator<Item = &'v E>,
        ctx: &ValidationContext<'_>,
        failures: &mut Failures,
    ) -> ControlFlow<()> {
        let Some(element) = &self.element else {
            return ControlFlow::Continue(());
        };
        let scope = ctx.scope();
        for (index, item) in items.enumerate() {
            if self.filter.as_ref().is_some_and(|keep| !keep(item)) {
                trace!(index, "collection element skipped by filter");
                continue;
            }
            let start = failures.len();
            let flow = element.evaluate(item, &scope, failures);
            path::prefix_index(failures.since_mut(start), index);
            flow?;
        }
        ControlFlow::Continue(())
    }
}

impl<C, E> Rule<C> for CollectionValidator<E>
where
    C: Elements<Item = E> + ?Sized + 'static,
    E: 'static,
{
    fn evaluate(&self, value: &C, ctx: &ValidationContext<'_>, failures: &mut Failures) -> ControlFlow<()> {
        self.evaluate_items(value.elements(), ctx, failures)
    }

    fn bind_resolver(&mut self, resolver: &Arc<dyn ServiceResolver>) {
        CollectionValidator::bind_resolver(self, resolver);
    }

    fn inherit_rule_sets(&mut self, rule_sets: &RuleSets) {
        CollectionValidator::inherit_rule_sets(self, rule_sets);
    }

    fn clone_rule(&self) -> Box<dyn Rule<C>> {
        Box::new(self.clone())
    }

    fn as_any_mut(&mut self) -> Option<&mut dyn Any> {
        Some(self)
    }
}

impl<E: 'static> Clone for CollectionValidator<E> {
    fn clone(&self) -> Self {
        Self {
            element: self.element.as_ref().map(|e| e.clone_rule()),
            filter: self.filter.clone(),
            resolver: self.resolver.clone(),
            inherited_rule_sets: self.inherited_rule_sets.clone(),
        }
    }
}

impl<E: 'static> fmt::Debug for CollectionValidator<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionValidator")
            .field("element", &self.element.is_some())
            .field("filter", &self.filter.is_some())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// COLLECTION PROPERTY VALIDATOR
// ============================================================================

/// A collection-typed property: rules for the collection `C` itself plus
/// one validator for its elements.
///
/// The element pass is the nested segment of the property's value rules, so
/// guards, the pre-processor and the mode of the property cover it.
pub struct CollectionPropertyValidator<T: 'static, C: 'static, E: 'static> {
    property: PropertyValidator<T, C>,
    _element: PhantomData<fn(&E)>,
}

impl<T, C, E> CollectionPropertyValidator<T, C, E>
where
    T: 'static,
    C: Elements<Item = E> + 'static,
    E: 'static,
{
    pub(crate) fn new(mut property: PropertyValidator<T, C>) -> Self {
        property
            .value_rules()
            .install_nested(Box::new(CollectionValidator::<E>::new()));
        Self {
            property,
            _element: PhantomData,
        }
    }

    /// The property-level settings (names, annotations).
    pub fn property(&mut self) -> &mut PropertyValidator<T, C> {
        &mut self.property
    }

    pub fn member_name(&self) -> &str {
        self.property.member_name()
    }

    fn element_rules(&mut self) -> Result<&mut CollectionValidator<E>, Error> {
        let site = format!("property '{}'", self.property.member_name());
        let sets = self.property.rule_sets().cloned();
        let elements = self
            .property
            .value_rules()
            .nested_rule_mut()
            .and_then(|rule| rule.as_any_mut())
            .and_then(|any| any.downcast_mut::<CollectionValidator<E>>())
            .ok_or(Error::NestedValidatorAlreadySet {
                site: site.into(),
                alternative: ALTERNATIVE,
            })?;
        if let Some(sets) = &sets {
            elements.inherit_rule_sets(sets);
        }
        Ok(elements)
    }

    pub fn set_validator(&mut self, validator: ObjectValidator<E>) -> Result<&mut Self, Error> {
        self.element_rules()?.set_validator(validator)?;
        Ok(self)
    }

    pub fn set_value_validator(&mut self, validator: ValueValidator<E>) -> Result<&mut Self, Error> {
        self.element_rules()?.set_value_validator(validator)?;
        Ok(self)
    }

    pub fn child_rules<F>(&mut self, configure: F) -> Result<&mut Self, Error>
    where
        F: FnOnce(&mut ObjectValidator<E>),
    {
        self.element_rules()?.child_rules(configure)?;
        Ok(self)
    }

    pub fn each_rules<F>(&mut self, configure: F) -> Result<&mut Self, Error>
    where
        F: FnOnce(&mut ValueValidator<E>),
    {
        self.element_rules()?.each_rules(configure)?;
        Ok(self)
    }

    /// Restricts element validation to matching elements.
    pub fn filter<F>(&mut self, filter: F) -> &mut Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        if let Ok(elements) = self.element_rules() {
            elements.filter(filter);
        }
        self
    }
}

impl<T, C, E> RuleBuilder<C> for CollectionPropertyValidator<T, C, E>
where
    T: 'static,
    C: Elements<Item = E> + 'static,
    E: 'static,
{
    fn value_rules(&mut self) -> &mut ValueValidator<C> {
        self.property.value_rules()
    }
}

impl<T, C, E> PropertyRule<T> for CollectionPropertyValidator<T, C, E>
where
    T: 'static,
    C: Elements<Item = E> + 'static,
    E: 'static,
{
    fn member_name(&self) -> &str {
        self.property.member_name()
    }

    fn rule_sets(&self) -> Option<&RuleSets> {
        self.property.rule_sets()
    }

    fn set_rule_sets(&mut self, rule_sets: Option<RuleSets>) {
        self.property.set_rule_sets(rule_sets);
    }

    fn evaluate(&self, instance: &T, ctx: &ValidationContext<'_>, failures: &mut Failures) -> ControlFlow<()> {
        PropertyRule::evaluate(&self.property, instance, ctx, failures)
    }

    fn bind_resolver(&mut self, resolver: &Arc<dyn ServiceResolver>) {
        self.property.bind_resolver(resolver);
    }

    fn clone_property(&self) -> Box<dyn PropertyRule<T>> {
        Box::new(Self {
            property: self.property.clone(),
            _element: PhantomData,
        })
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::Validator;
    use pretty_assertions::assert_eq;

    fn hobbies() -> CollectionValidator<Option<String>> {
        let mut v = CollectionValidator::new();
        v.each_rules(|r| {
            r.required().min_length(2);
        })
        .unwrap();
        v
    }

    #[test]
    fn element_failures_carry_index() {
        let items = vec![Some("Furion".to_string()), None];
        let mut errors = hobbies().get_failures(&items).unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.first().and_then(|e| e.member()), Some("[1]"));
        errors.repair(Some("Hobbies"));
        assert_eq!(errors.first().and_then(|e| e.member()), Some("Hobbies[1]"));
    }

    #[test]
    fn filter_keeps_original_positions() {
        let mut v = hobbies();
        v.filter(|item| item.as_deref() != Some("skip"));
        let items = vec![Some("skip".to_string()), Some("x".to_string())];
        let errors = v.get_failures(&items).unwrap();
        assert_eq!(errors.first().and_then(|e| e.member()), Some("[1]"));
        assert!(v.is_valid(&vec![Some("skip".to_string())]));
    }

    #[test]
    fn only_one_element_validator() {
        let mut v = hobbies();
        let err = v.set_value_validator(ValueValidator::new()).unwrap_err();
        assert!(matches!(err, Error::NestedValidatorAlreadySet { alternative: ALTERNATIVE, .. }));
        assert!(v.has_element_validator());
        assert!(!v.is_valid(&vec![None]));
    }

    #[test]
    fn collections_without_element_validator_pass() {
        let v = CollectionValidator::<String>::new();
        assert!(v.is_valid(&vec![String::new()]));
    }

    #[test]
    fn fail_fast_stops_at_first_element() {
        let errors = hobbies().validate(&vec![None, None]).unwrap_err();
        assert_eq!(errors.as_validation().and_then(|e| e.member()), Some("[0]"));
    }
}
