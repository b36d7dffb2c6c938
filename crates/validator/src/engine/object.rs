//! Object validator
//!
//! Orchestrates the rules for one type: an object-level annotation pass, the
//! property rules declared with [`rule_for`](ObjectValidator::rule_for) and
//! [`rule_for_collection`](ObjectValidator::rule_for_collection), and an
//! optional child validator that runs last.

use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::ops::ControlFlow;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::annotation::{AnnotationRequest, AnnotationValidator};
use crate::combinators::collection::CollectionPropertyValidator;
use crate::combinators::composite::{self, ValidationMode};
use crate::combinators::property::{PropertyRule, PropertyValidator};
use crate::engine::node::Predicate;
use crate::engine::rule_set::{self, RuleSetStack, ScopedRules};
use crate::engine::{Failures, Rule, RuleSets};
use crate::foundation::resolver::bind_slot;
use crate::foundation::{Elements, Error, MessageSource, ServiceResolver, ValidationContext, ValidationError};
use crate::options::ValidatorOptions;

/// Rules for values of type `T`.
///
/// # Examples
///
/// ```rust,ignore
/// use vigil_validator::prelude::*;
///
/// struct Person { id: i32, name: String }
///
/// let mut person = ObjectValidator::<Person>::new();
/// person.rule_for("Id", |p: &Person| &p.id).required().in_range(3, 10);
/// person.rule_for("Name", |p: &Person| &p.name).required().length(3, 10);
///
/// assert!(person.is_valid(&Person { id: 3, name: "Furion".into() }));
/// ```
pub struct ObjectValidator<T: 'static> {
    properties: Vec<Box<dyn PropertyRule<T>>>,
    child: Option<Box<ObjectValidator<T>>>,
    stack: RuleSetStack,
    guards: Vec<Predicate<T>>,
    mode: ValidationMode,
    suppress_annotations: bool,
    validate_all_properties: bool,
    annotations: Option<Arc<dyn AnnotationValidator>>,
    messages: Option<Arc<dyn MessageSource>>,
    default_rule_sets: Option<RuleSets>,
    inherited_rule_sets: Option<RuleSets>,
    resolver: Option<Arc<dyn ServiceResolver>>,
}

impl<T: 'static> Default for ObjectValidator<T> {
    fn default() -> Self {
        Self {
            properties: Vec::new(),
            child: None,
            stack: RuleSetStack::default(),
            guards: Vec::new(),
            mode: ValidationMode::All,
            suppress_annotations: false,
            validate_all_properties: true,
            annotations: None,
            messages: None,
            default_rule_sets: None,
            inherited_rule_sets: None,
            resolver: None,
        }
    }
}

impl<T: 'static> ObjectValidator<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validator configured from `options`.
    pub fn with_options(options: &ValidatorOptions) -> Self {
        let mut validator = Self::new();
        validator.apply_options(options);
        validator
    }

    pub fn apply_options(&mut self, options: &ValidatorOptions) -> &mut Self {
        self.mode = options.mode;
        self.suppress_annotations = options.suppress_annotation_validation;
        self.validate_all_properties = options.validate_all_properties;
        self.default_rule_sets.clone_from(&options.default_rule_sets);
        self
    }

    // ------------------------------------------------------------------------
    // Properties
    // ------------------------------------------------------------------------

    fn push_property<X: PropertyRule<T> + 'static>(&mut self, mut property: X) -> &mut X {
        property.set_rule_sets(self.stack.current().cloned());
        if let Some(resolver) = &self.resolver {
            property.bind_resolver(resolver);
        }
        self.properties.push(Box::new(property));
        match self
            .properties
            .last_mut()
            .and_then(|p| p.as_any_mut().downcast_mut::<X>())
        {
            Some(property) => property,
            None => unreachable!("property was pushed above"),
        }
    }

    /// Starts rules for the member `name`, read with `accessor`.
    pub fn rule_for<P, F>(&mut self, name: impl Into<Cow<'static, str>>, accessor: F) -> &mut PropertyValidator<T, P>
    where
        P: 'static,
        F: Fn(&T) -> &P + Send + Sync + 'static,
    {
        self.push_property(PropertyValidator::new(name, accessor))
    }

    /// Starts rules for a collection member and its elements.
    pub fn rule_for_collection<C, E, F>(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        accessor: F,
    ) -> &mut CollectionPropertyValidator<T, C, E>
    where
        C: Elements<Item = E> + 'static,
        E: 'static,
        F: Fn(&T) -> &C + Send + Sync + 'static,
    {
        self.push_property(CollectionPropertyValidator::new(PropertyValidator::new(name, accessor)))
    }

    /// Copies the property rules of `other` into this validator.
    ///
    /// Copies declared inside a [`rule_set`](Self::rule_set) body are tagged
    /// with the enclosing scope; otherwise they keep their own tags.
    pub fn include(&mut self, other: &ObjectValidator<T>) -> &mut Self {
        let scope = self.stack.current().cloned();
        for property in &other.properties {
            let mut copy = property.clone_property();
            if scope.is_some() {
                copy.set_rule_sets(scope.clone());
            }
            if let Some(resolver) = &self.resolver {
                copy.bind_resolver(resolver);
            }
            self.properties.push(copy);
        }
        self
    }

    /// Declares the rules added by `body` under `names`.
    pub fn rule_set<F>(&mut self, names: impl Into<RuleSets>, body: F) -> Result<&mut Self, Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Error>,
    {
        rule_set::scoped(self, names, body)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty() && self.child.is_none()
    }

    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(|p| p.member_name())
    }

    // ------------------------------------------------------------------------
    // Child validator
    // ------------------------------------------------------------------------

    /// Attaches a validator for the same type that runs after the properties.
    pub fn set_validator(&mut self, mut validator: ObjectValidator<T>) -> Result<&mut Self, Error> {
        if self.child.is_some() {
            return Err(Error::NestedValidatorAlreadySet {
                site: format!("object validator for {}", std::any::type_name::<T>()).into(),
                alternative: "include",
            });
        }
        if let Some(sets) = self.stack.current().or(self.inherited_rule_sets.as_ref()) {
            validator.inherit_rule_sets(sets);
        }
        if let Some(resolver) = &self.resolver {
            validator.bind_resolver(resolver);
        }
        self.child = Some(Box::new(validator));
        Ok(self)
    }

    pub fn child_rules<F>(&mut self, configure: F) -> Result<&mut Self, Error>
    where
        F: FnOnce(&mut ObjectValidator<T>),
    {
        let mut child = ObjectValidator::new();
        configure(&mut child);
        self.set_validator(child)
    }

    // ------------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------------

    /// Skips the whole validator, annotation pass included, unless `guard`
    /// holds.
    pub fn when<F>(&mut self, guard: F) -> &mut Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.guards.push(Arc::new(guard));
        self
    }

    pub fn use_mode(&mut self, mode: ValidationMode) -> &mut Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    /// Turns off every annotation pass below this validator.
    pub fn suppress_annotation_validation(&mut self) -> &mut Self {
        self.suppress_annotations = true;
        self
    }

    /// Whether the annotation layer checks every property or stops at the
    /// first invalid one.
    pub fn validate_all_properties(&mut self, all: bool) -> &mut Self {
        self.validate_all_properties = all;
        self
    }

    pub fn with_annotations(&mut self, annotations: Arc<dyn AnnotationValidator>) -> &mut Self {
        self.annotations = Some(annotations);
        self
    }

    pub fn with_messages(&mut self, messages: Arc<dyn MessageSource>) -> &mut Self {
        self.messages = Some(messages);
        self
    }

    /// Receives a fixed rule-set list from a parent. Returns `false` if one
    /// was already inherited.
    pub fn inherit_rule_sets(&mut self, rule_sets: &RuleSets) -> bool {
        if self.inherited_rule_sets.is_some() {
            return false;
        }
        self.inherited_rule_sets = Some(rule_sets.clone());
        if let Some(child) = self.child.as_mut() {
            child.inherit_rule_sets(rule_sets);
        }
        true
    }

    pub fn inherited_rule_sets(&self) -> Option<&RuleSets> {
        self.inherited_rule_sets.as_ref()
    }

    /// Binds `resolver` to this validator and everything attached below it.
    /// Binding the same resolver again does nothing.
    pub fn bind_resolver(&mut self, resolver: &Arc<dyn ServiceResolver>) -> &mut Self {
        if bind_slot(&mut self.resolver, resolver) {
            for property in &mut self.properties {
                property.bind_resolver(resolver);
            }
            if let Some(child) = self.child.as_mut() {
                child.bind_resolver(resolver);
            }
        }
        self
    }

    pub fn resolver(&self) -> Option<&Arc<dyn ServiceResolver>> {
        self.resolver.as_ref()
    }

    // ------------------------------------------------------------------------
    // Evaluation
    // ------------------------------------------------------------------------

    fn annotation_pass(&self, value: &T, ctx: &ValidationContext<'_>, failures: &mut Failures) -> ControlFlow<()> {
        if !ctx.annotations_enabled() {
            return ControlFlow::Continue(());
        }
        let Some(bridge) = ctx.annotations() else {
            return ControlFlow::Continue(());
        };
        let selector = ctx.rule_sets();
        let inline: Vec<&str> = self
            .properties
            .iter()
            .filter(|p| rule_set::is_active(p.rule_sets(), selector))
            .map(|p| p.member_name())
            .collect();
        let request = AnnotationRequest {
            display_name: ctx.display_name(),
            member_name: ctx.member_name(),
            resolver: ctx.resolver(),
            rule_sets: selector,
            validate_all_properties: self.validate_all_properties,
            skip_members: &inline,
        };
        match bridge.validate_annotations(value as &dyn Any, &request) {
            Ok(None) => ControlFlow::Continue(()),
            Ok(Some(errors)) => {
                for error in errors.into_iter().filter(|e| !e.member().is_some_and(|m| request.is_skipped(m))) {
                    failures.push(error)?;
                }
                ControlFlow::Continue(())
            }
            Err(error) => failures.push(ValidationError::from(error)),
        }
    }

    fn run(&self, value: &T, ctx: &ValidationContext<'_>, failures: &mut Failures) -> ControlFlow<()> {
        let selector = ctx.rule_sets();
        let annotated = ctx.annotations_enabled() && ctx.annotations().is_some();
        let properties = self.properties.iter().filter(|property| {
            let active = rule_set::is_active(property.rule_sets(), selector);
            if !active {
                trace!(member = property.member_name(), "property skipped by rule-set selection");
            }
            active
        });
        let steps = annotated
            .then_some(Step::Annotations)
            .into_iter()
            .chain(properties.map(|property| Step::Property(property.as_ref())))
            .chain(self.child.as_deref().map(Step::Child))
            .map(|step| {
                move |sink: &mut Failures| match step {
                    Step::Annotations => self.annotation_pass(value, ctx, sink),
                    Step::Property(property) => property.evaluate(value, ctx, sink),
                    Step::Child(child) => child.evaluate(value, ctx, sink),
                }
            });
        composite::run(self.mode, steps, failures)
    }
}

/// One unit of an object validator's run; all units share its mode.
enum Step<'a, T: 'static> {
    Annotations,
    Property(&'a dyn PropertyRule<T>),
    Child(&'a ObjectValidator<T>),
}

impl<T: 'static> ScopedRules for ObjectValidator<T> {
    fn rule_set_stack(&mut self) -> &mut RuleSetStack {
        &mut self.stack
    }
}

impl<T: 'static> Rule<T> for ObjectValidator<T> {
    fn evaluate(&self, value: &T, ctx: &ValidationContext<'_>, failures: &mut Failures) -> ControlFlow<()> {
        if !self.guards.iter().all(|guard| guard(value)) {
            trace!(target_type = std::any::type_name::<T>(), "object validator skipped by guard");
            return ControlFlow::Continue(());
        }

        let selector = rule_set::resolve(self.inherited_rule_sets.as_ref(), ctx).or_else(|| self.default_rule_sets.clone());
        let scope = ctx
            .scope()
            .with_instance(value as &dyn Any)
            .with_rule_sets(selector)
            .with_resolver(self.resolver.clone())
            .with_annotations(self.annotations.clone())
            .with_messages(self.messages.clone())
            .with_annotations_enabled(ctx.annotations_enabled() && !self.suppress_annotations);

        let start = failures.len();
        let flow = self.run(value, &scope, failures);
        debug!(
            target_type = std::any::type_name::<T>(),
            failures = failures.len() - start,
            "object validation finished"
        );
        flow
    }

    fn bind_resolver(&mut self, resolver: &Arc<dyn ServiceResolver>) {
        ObjectValidator::bind_resolver(self, resolver);
    }

    fn inherit_rule_sets(&mut self, rule_sets: &RuleSets) {
        ObjectValidator::inherit_rule_sets(self, rule_sets);
    }

    fn clone_rule(&self) -> Box<dyn Rule<T>> {
        Box::new(self.clone())
    }
}

impl<T: 'static> Clone for ObjectValidator<T> {
    fn clone(&self) -> Self {
        Self {
            properties: self.properties.iter().map(|p| p.clone_property()).collect(),
            child: self.child.clone(),
            stack: self.stack.clone(),
            guards: self.guards.clone(),
            mode: self.mode,
            suppress_annotations: self.suppress_annotations,
            validate_all_properties: self.validate_all_properties,
            annotations: self.annotations.clone(),
            messages: self.messages.clone(),
            default_rule_sets: self.default_rule_sets.clone(),
            inherited_rule_sets: self.inherited_rule_sets.clone(),
            resolver: self.resolver.clone(),
        }
    }
}

impl<T: 'static> fmt::Debug for ObjectValidator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectValidator")
            .field("type", &std::any::type_name::<T>())
            .field("properties", &self.member_names().collect::<Vec<_>>())
            .field("child", &self.child.is_some())
            .field("mode", &self.mode)
            .field("inherited_rule_sets", &self.inherited_rule_sets)
            .finish_non_exhaustive()
    }
}
