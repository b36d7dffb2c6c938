//! Value validator
//!
//! An ordered rule container for one value. Nodes live in three segments
//! that always run in order: presence checks, general rules, then at most one
//! nested validator. Within a segment, nodes run in declaration order.

use std::borrow::{Borrow, Cow};
use std::fmt;
use std::ops::ControlFlow;
use std::sync::Arc;

use tracing::trace;

use crate::combinators::composite::{self, ValidationMode};
use crate::engine::node::{self, Predicate, RuleEntry};
use crate::engine::rule_set::{self, RuleSetStack, RuleSets, ScopedRules};
use crate::engine::{Failures, Rule};
use crate::foundation::message::ErrorMessage;
use crate::foundation::resolver::bind_slot;
use crate::foundation::{Error, Presence, ServiceResolver, ValidationContext};

type PreProcessor<P> =
    Arc<dyn Fn(&P, &mut dyn FnMut(&P) -> ControlFlow<()>) -> ControlFlow<()> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Presence(usize),
    General(usize),
    Nested,
}

/// Rules for a single value of type `P`.
///
/// Build it with the [`RuleBuilder`](crate::engine::RuleBuilder) methods and
/// evaluate it through [`Validator`](crate::foundation::Validator).
///
/// # Examples
///
/// ```rust,ignore
/// use vigil_validator::prelude::*;
///
/// let mut name = ValueValidator::<str>::new();
/// name.required().length(3, 10);
/// assert!(name.is_valid("Furion"));
/// ```
pub struct ValueValidator<P: ?Sized + 'static> {
    presence: Vec<RuleEntry<P>>,
    general: Vec<RuleEntry<P>>,
    nested: Option<RuleEntry<P>>,
    last: Option<Slot>,
    mode: ValidationMode,
    guards: Vec<Predicate<P>>,
    skip_empty: Option<fn(&P) -> bool>,
    pre_processor: Option<PreProcessor<P>>,
    stack: RuleSetStack,
    inherited_rule_sets: Option<RuleSets>,
    resolver: Option<Arc<dyn ServiceResolver>>,
}

impl<P: ?Sized + 'static> Default for ValueValidator<P> {
    fn default() -> Self {
        Self {
            presence: Vec::new(),
            general: Vec::new(),
            nested: None,
            last: None,
            mode: ValidationMode::All,
            guards: Vec::new(),
            skip_empty: None,
            pre_processor: None,
            stack: RuleSetStack::default(),
            inherited_rule_sets: None,
            resolver: None,
        }
    }
}

impl<P: ?Sized + 'static> ValueValidator<P> {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------------
    // Node insertion
    // ------------------------------------------------------------------------

    fn entry(&self, mut rule: Box<dyn Rule<P>>) -> RuleEntry<P> {
        if let Some(resolver) = &self.resolver {
            rule.bind_resolver(resolver);
        }
        RuleEntry::new(rule, self.stack.current().cloned())
    }

    /// Adds a node to the presence segment.
    pub fn push_presence(&mut self, rule: Box<dyn Rule<P>>) -> &mut Self {
        let entry = self.entry(rule);
        self.presence.push(entry);
        self.last = Some(Slot::Presence(self.presence.len() - 1));
        self
    }

    /// Adds a node to the general segment.
    pub fn push_rule(&mut self, rule: Box<dyn Rule<P>>) -> &mut Self {
        let entry = self.entry(rule);
        self.general.push(entry);
        self.last = Some(Slot::General(self.general.len() - 1));
        self
    }

    /// Fills the nested segment.
    ///
    /// `site` and `alternative` name the attach point and the API to use
    /// instead when a nested node is already present.
    pub fn attach_nested(
        &mut self,
        mut rule: Box<dyn Rule<P>>,
        site: impl FnOnce() -> Cow<'static, str>,
        alternative: &'static str,
    ) -> Result<&mut Self, Error> {
        if self.nested.is_some() {
            return Err(Error::NestedValidatorAlreadySet {
                site: site(),
                alternative,
            });
        }
        if let Some(sets) = self.stack.current().or(self.inherited_rule_sets.as_ref()) {
            rule.inherit_rule_sets(sets);
        }
        self.install_nested(rule);
        self.last = Some(Slot::Nested);
        Ok(self)
    }

    /// Fills an empty nested segment without making it the message target.
    pub(crate) fn install_nested(&mut self, rule: Box<dyn Rule<P>>) -> &mut Self {
        let entry = self.entry(rule);
        self.nested = Some(entry);
        self
    }

    pub(crate) fn nested_rule_mut(&mut self) -> Option<&mut dyn Rule<P>> {
        self.nested.as_mut().map(RuleEntry::rule_mut)
    }

    /// Attaches a nested value validator.
    pub fn set_validator(&mut self, validator: ValueValidator<P>) -> Result<&mut Self, Error> {
        self.attach_nested(Box::new(validator), || "value validator".into(), "child_rules")
    }

    /// Configures a fresh nested value validator in place.
    pub fn child_rules<F>(&mut self, configure: F) -> Result<&mut Self, Error>
    where
        F: FnOnce(&mut ValueValidator<P>),
    {
        let mut nested = ValueValidator::new();
        configure(&mut nested);
        self.set_validator(nested)
    }

    pub fn has_nested(&self) -> bool {
        self.nested.is_some()
    }

    fn last_entry_mut(&mut self) -> Option<&mut RuleEntry<P>> {
        match self.last? {
            Slot::Presence(i) => self.presence.get_mut(i),
            Slot::General(i) => self.general.get_mut(i),
            Slot::Nested => self.nested.as_mut(),
        }
    }

    fn entries(&self) -> impl Iterator<Item = &RuleEntry<P>> {
        self.presence.iter().chain(&self.general).chain(self.nested.as_ref())
    }

    fn entries_mut(&mut self) -> impl Iterator<Item = &mut RuleEntry<P>> {
        self.presence
            .iter_mut()
            .chain(&mut self.general)
            .chain(self.nested.as_mut())
    }

    // ------------------------------------------------------------------------
    // Messages
    // ------------------------------------------------------------------------

    /// Overrides the message of the most recently added node.
    pub fn set_last_message(&mut self, message: ErrorMessage) -> &mut Self {
        if let Some(entry) = self.last_entry_mut() {
            entry.set_message(message);
        }
        self
    }

    /// Sets `message` on every node without a custom message.
    pub fn set_default_message(&mut self, message: &ErrorMessage) -> &mut Self {
        for entry in self.entries_mut() {
            entry.set_default_message(message);
        }
        self
    }

    // ------------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------------

    pub fn set_mode(&mut self, mode: ValidationMode) -> &mut Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    pub fn add_guard(&mut self, guard: Predicate<P>) -> &mut Self {
        self.guards.push(guard);
        self
    }

    /// Skips the whole validator for empty strings.
    pub fn set_allow_empty_strings(&mut self) -> &mut Self
    where
        P: Presence,
    {
        self.skip_empty = Some(|value: &P| value.as_text().is_some_and(str::is_empty));
        self
    }

    /// Validates `transform(value)` instead of the value itself.
    pub fn set_pre_processor<F>(&mut self, transform: F) -> &mut Self
    where
        P: ToOwned,
        F: Fn(&P) -> P::Owned + Send + Sync + 'static,
    {
        self.pre_processor = Some(Arc::new(
            move |value: &P, next: &mut dyn FnMut(&P) -> ControlFlow<()>| {
                let processed = transform(value);
                next(Borrow::<P>::borrow(&processed))
            },
        ));
        self
    }

    /// Declares the rules added by `body` under `names`.
    pub fn rule_set<F>(&mut self, names: impl Into<RuleSets>, body: F) -> Result<&mut Self, Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Error>,
    {
        rule_set::scoped(self, names, body)
    }

    /// Receives a fixed rule-set list from a parent. Returns `false` if one
    /// was already inherited.
    pub fn inherit_rule_sets(&mut self, rule_sets: &RuleSets) -> bool {
        if self.inherited_rule_sets.is_some() {
            return false;
        }
        self.inherited_rule_sets = Some(rule_sets.clone());
        if let Some(nested) = self.nested.as_mut() {
            nested.rule_mut().inherit_rule_sets(rule_sets);
        }
        true
    }

    pub fn inherited_rule_sets(&self) -> Option<&RuleSets> {
        self.inherited_rule_sets.as_ref()
    }

    /// Binds `resolver` here and in every node, transitively.
    pub fn bind_resolver(&mut self, resolver: &Arc<dyn ServiceResolver>) -> &mut Self {
        if bind_slot(&mut self.resolver, resolver) {
            for entry in self.entries_mut() {
                entry.rule_mut().bind_resolver(resolver);
            }
        }
        self
    }

    pub fn len(&self) -> usize {
        self.presence.len() + self.general.len() + usize::from(self.nested.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ------------------------------------------------------------------------
    // Evaluation
    // ------------------------------------------------------------------------

    fn run(&self, value: &P, ctx: &ValidationContext<'_>, failures: &mut Failures) -> ControlFlow<()> {
        let steps = node::skip_inactive(self.entries(), ctx.rule_sets())
            .map(|entry| move |sink: &mut Failures| entry.evaluate(value, ctx, sink));
        composite::run(self.mode, steps, failures)
    }

    fn run_processed(&self, value: &P, ctx: &ValidationContext<'_>, failures: &mut Failures) -> ControlFlow<()> {
        match &self.pre_processor {
            Some(pre) => pre(value, &mut |processed| self.run(processed, ctx, failures)),
            None => self.run(value, ctx, failures),
        }
    }
}

impl<P: ?Sized + 'static> ScopedRules for ValueValidator<P> {
    fn rule_set_stack(&mut self) -> &mut RuleSetStack {
        &mut self.stack
    }
}

impl<P: ?Sized + 'static> Rule<P> for ValueValidator<P> {
    fn evaluate(&self, value: &P, ctx: &ValidationContext<'_>, failures: &mut Failures) -> ControlFlow<()> {
        if !self.guards.iter().all(|guard| guard(value)) {
            trace!("value validator skipped by guard");
            return ControlFlow::Continue(());
        }
        if self.skip_empty.is_some_and(|is_empty| is_empty(value)) {
            trace!("value validator skipped for empty string");
            return ControlFlow::Continue(());
        }

        let selector = rule_set::resolve(self.inherited_rule_sets.as_ref(), ctx);
        if selector.as_ref() == ctx.rule_sets() && self.resolver.is_none() {
            return self.run_processed(value, ctx, failures);
        }
        let scope = ctx
            .scope()
            .with_rule_sets(selector)
            .with_resolver(self.resolver.clone());
        self.run_processed(value, &scope, failures)
    }

    fn bind_resolver(&mut self, resolver: &Arc<dyn ServiceResolver>) {
        ValueValidator::bind_resolver(self, resolver);
    }

    fn inherit_rule_sets(&mut self, rule_sets: &RuleSets) {
        ValueValidator::inherit_rule_sets(self, rule_sets);
    }

    fn clone_rule(&self) -> Box<dyn Rule<P>> {
        Box::new(self.clone())
    }
}

impl<P: ?Sized + 'static> Clone for ValueValidator<P> {
    fn clone(&self) -> Self {
        Self {
            presence: self.presence.clone(),
            general: self.general.clone(),
            nested: self.nested.clone(),
            last: self.last,
            mode: self.mode,
            guards: self.guards.clone(),
            skip_empty: self.skip_empty,
            pre_processor: self.pre_processor.clone(),
            stack: self.stack.clone(),
            inherited_rule_sets: self.inherited_rule_sets.clone(),
            resolver: self.resolver.clone(),
        }
    }
}

impl<P: ?Sized + 'static> fmt::Debug for ValueValidator<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueValidator")
            .field("presence", &self.presence.len())
            .field("general", &self.general.len())
            .field("nested", &self.nested.is_some())
            .field("mode", &self.mode)
            .field("guards", &self.guards.len())
            .field("inherited_rule_sets", &self.inherited_rule_sets)
            .finish_non_exhaustive()
    }
}
