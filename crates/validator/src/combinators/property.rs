//! PROPERTY combinator - one member of an owning object
//!
//! A [`PropertyValidator`] extracts a value with its accessor, runs the
//! member-level annotation pass, then its value rules, and finally prefixes
//! every failure with the member name.

use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;
use std::ops::ControlFlow;
use std::sync::Arc;

use crate::annotation::AnnotationRequest;
use crate::engine::{Failures, ObjectValidator, Rule, RuleBuilder, RuleSets, ValueValidator, path};
use crate::foundation::{Error, Nested, ServiceResolver, ValidationContext, ValidationError};

/// Extracts a property value from its owner.
pub type Accessor<T, P> = Arc<dyn Fn(&T) -> &P + Send + Sync>;

// ============================================================================
// ERASED PROPERTY
// ============================================================================

/// Object-facing view of a property validator with its value type erased.
pub(crate) trait PropertyRule<T>: Send + Sync {
    fn member_name(&self) -> &str;

    fn rule_sets(&self) -> Option<&RuleSets>;

    fn set_rule_sets(&mut self, rule_sets: Option<RuleSets>);

    fn evaluate(&self, instance: &T, ctx: &ValidationContext<'_>, failures: &mut Failures) -> ControlFlow<()>;

    fn bind_resolver(&mut self, resolver: &Arc<dyn ServiceResolver>);

    fn clone_property(&self) -> Box<dyn PropertyRule<T>>;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

// ============================================================================
// NESTED OBJECT ADAPTER
// ============================================================================

/// Runs an object validator against the `N` inside a `P`.
pub(crate) struct NestedObject<N: 'static, P: ?Sized> {
    validator: ObjectValidator<N>,
    _value: PhantomData<fn(&P)>,
}

impl<N: 'static, P: ?Sized> NestedObject<N, P> {
    pub(crate) fn new(validator: ObjectValidator<N>) -> Self {
        Self {
            validator,
            _value: PhantomData,
        }
    }
}

impl<N: 'static, P: Nested<N> + ?Sized + 'static> Rule<P> for NestedObject<N, P> {
    fn evaluate(&self, value: &P, ctx: &ValidationContext<'_>, failures: &mut Failures) -> ControlFlow<()> {
        match value.nested() {
            Some(nested) => self.validator.evaluate(nested, ctx, failures),
            None => ControlFlow::Continue(()),
        }
    }

    fn bind_resolver(&mut self, resolver: &Arc<dyn ServiceResolver>) {
        self.validator.bind_resolver(resolver);
    }

    fn inherit_rule_sets(&mut self, rule_sets: &RuleSets) {
        self.validator.inherit_rule_sets(rule_sets);
    }

    fn clone_rule(&self) -> Box<dyn Rule<P>> {
        Box::new(Self::new(self.validator.clone()))
    }
}

// ============================================================================
// PROPERTY VALIDATOR
// ============================================================================

/// Rules for the property `P` of an owner `T`.
///
/// Obtained from [`ObjectValidator::rule_for`]; add rules through
/// [`RuleBuilder`].
pub struct PropertyValidator<T: 'static, P: 'static> {
    name: Cow<'static, str>,
    member_override: Option<Cow<'static, str>>,
    display_name: Option<Cow<'static, str>>,
    accessor: Accessor<T, P>,
    rules: ValueValidator<P>,
    rule_sets: Option<RuleSets>,
    annotations: bool,
}

impl<T: 'static, P: 'static> PropertyValidator<T, P> {
    pub fn new<F>(name: impl Into<Cow<'static, str>>, accessor: F) -> Self
    where
        F: Fn(&T) -> &P + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            member_override: None,
            display_name: None,
            accessor: Arc::new(accessor),
            rules: ValueValidator::new(),
            rule_sets: None,
            annotations: true,
        }
    }

    /// Reports failures under `member` instead of the registered name.
    pub fn with_name(&mut self, member: impl Into<Cow<'static, str>>) -> &mut Self {
        self.member_override = Some(member.into());
        self
    }

    /// Name substituted for `{name}` in messages.
    pub fn with_display_name(&mut self, display: impl Into<Cow<'static, str>>) -> &mut Self {
        self.display_name = Some(display.into());
        self
    }

    /// Turns off the annotation pass for this property only.
    pub fn skip_annotations(&mut self) -> &mut Self {
        self.annotations = false;
        self
    }

    /// The member name failures are reported under.
    pub fn member_name(&self) -> &str {
        self.member_override.as_deref().unwrap_or(&self.name)
    }

    pub fn rule_sets(&self) -> Option<&RuleSets> {
        self.rule_sets.as_ref()
    }

    pub(crate) fn set_rule_sets(&mut self, rule_sets: Option<RuleSets>) {
        self.rule_sets = rule_sets;
    }

    pub fn rules(&self) -> &ValueValidator<P> {
        &self.rules
    }

    fn site(&self) -> Cow<'static, str> {
        format!("property '{}'", self.member_name()).into()
    }

    /// Validates the property with `validator`.
    ///
    /// Fails if a nested validator is already attached.
    pub fn set_validator<N: 'static>(&mut self, validator: ObjectValidator<N>) -> Result<&mut Self, Error>
    where
        P: Nested<N>,
    {
        let site = self.site();
        let mut nested: Box<dyn Rule<P>> = Box::new(NestedObject::<N, P>::new(validator));
        if let Some(sets) = &self.rule_sets {
            nested.inherit_rule_sets(sets);
        }
        self.rules.attach_nested(nested, move || site, "child_rules")?;
        Ok(self)
    }

    /// Declares nested rules in place.
    pub fn child_rules<N: 'static, F>(&mut self, configure: F) -> Result<&mut Self, Error>
    where
        P: Nested<N>,
        F: FnOnce(&mut ObjectValidator<N>),
    {
        let mut nested = ObjectValidator::new();
        configure(&mut nested);
        self.set_validator(nested)
    }

    pub(crate) fn bind_resolver(&mut self, resolver: &Arc<dyn ServiceResolver>) {
        self.rules.bind_resolver(resolver);
    }

    fn annotation_pass(&self, value: &P, ctx: &ValidationContext<'_>, failures: &mut Failures) -> ControlFlow<()> {
        if !self.annotations || !ctx.annotations_enabled() {
            return ControlFlow::Continue(());
        }
        let Some(bridge) = ctx.annotations() else {
            return ControlFlow::Continue(());
        };
        let member = self.member_name();
        let request = AnnotationRequest {
            display_name: Some(ctx.message_name()),
            member_name: Some(member),
            resolver: ctx.resolver(),
            rule_sets: ctx.rule_sets(),
            validate_all_properties: true,
            skip_members: &[],
        };
        match bridge.validate_annotations(value as &dyn Any, &request) {
            Ok(None) => ControlFlow::Continue(()),
            Ok(Some(errors)) => {
                for mut error in errors {
                    error.members.retain(|m| m != member);
                    failures.push(error)?;
                }
                ControlFlow::Continue(())
            }
            Err(error) => failures.push(ValidationError::from(error)),
        }
    }

    fn evaluate_property(&self, instance: &T, ctx: &ValidationContext<'_>, failures: &mut Failures) -> ControlFlow<()> {
        let value = (self.accessor)(instance);
        let member = self.member_name();
        let scope = ctx
            .child()
            .with_member(member, self.display_name.as_deref().map(Cow::Borrowed));

        let start = failures.len();
        let flow = self.run_stages(value, &scope, failures);
        path::prefix(failures.since_mut(start), member);
        flow
    }

    fn run_stages(&self, value: &P, ctx: &ValidationContext<'_>, failures: &mut Failures) -> ControlFlow<()> {
        self.annotation_pass(value, ctx, failures)?;
        self.rules.evaluate(value, ctx, failures)
    }
}

impl<T: 'static, P: 'static> RuleBuilder<P> for PropertyValidator<T, P> {
    fn value_rules(&mut self) -> &mut ValueValidator<P> {
        &mut self.rules
    }
}

impl<T: 'static, P: 'static> PropertyRule<T> for PropertyValidator<T, P> {
    fn member_name(&self) -> &str {
        PropertyValidator::member_name(self)
    }

    fn rule_sets(&self) -> Option<&RuleSets> {
        self.rule_sets.as_ref()
    }

    fn set_rule_sets(&mut self, rule_sets: Option<RuleSets>) {
        PropertyValidator::set_rule_sets(self, rule_sets);
    }

    fn evaluate(&self, instance: &T, ctx: &ValidationContext<'_>, failures: &mut Failures) -> ControlFlow<()> {
        self.evaluate_property(instance, ctx, failures)
    }

    fn bind_resolver(&mut self, resolver: &Arc<dyn ServiceResolver>) {
        PropertyValidator::bind_resolver(self, resolver);
    }

    fn clone_property(&self) -> Box<dyn PropertyRule<T>> {
        Box::new(self.clone())
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl<T: 'static, P: 'static> Clone for PropertyValidator<T, P> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            member_override: self.member_override.clone(),
            display_name: self.display_name.clone(),
            accessor: Arc::clone(&self.accessor),
            rules: self.rules.clone(),
            rule_sets: self.rule_sets.clone(),
            annotations: self.annotations,
        }
    }
}

impl<T: 'static, P: 'static> fmt::Debug for PropertyValidator<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyValidator")
            .field("member", &self.member_name())
            .field("display_name", &self.display_name)
            .field("rule_sets", &self.rule_sets)
            .field("rules", &self.rules)
            .finish_non_exhaustive()
    }
}
