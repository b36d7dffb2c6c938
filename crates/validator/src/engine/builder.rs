//! Fluent rule declaration
//!
//! [`RuleBuilder`] is implemented by everything that owns a
//! [`ValueValidator`]: the value validator itself and the property
//! validators. Each method appends one node and returns `&mut Self`, so a
//! message override can follow the node it applies to.

use std::fmt::{Debug, Display};
use std::sync::Arc;

use regex::Regex;

use crate::combinators::composite::{CompositeValidator, ValidationMode};
use crate::combinators::conditional::ConditionalValidator;
use crate::engine::node::{ContextualRule, LeafRule, PredicateRule, PresenceRule};
use crate::engine::{Rule, ValueValidator};
use crate::foundation::message::ErrorMessage;
use crate::foundation::{AsValidatable, ContextualValidator, Presence, Validate, ValidationContext};
use crate::validators::{
    Alphanumeric, Contains, Email, EndsWith, ExactLength, GreaterThan, InRange, LengthRange, LessThan, MatchesRegex,
    Max, MaxLength, MaxSize, Min, MinLength, MinSize, NotEmpty, StartsWith, UserName,
};

/// Fluent declaration of rules for values of type `P`.
pub trait RuleBuilder<P: ?Sized + 'static> {
    /// The value validator rules are added to.
    fn value_rules(&mut self) -> &mut ValueValidator<P>;

    // ------------------------------------------------------------------------
    // Generic nodes
    // ------------------------------------------------------------------------

    /// Adds a leaf validator.
    fn rule<V>(&mut self, validator: V) -> &mut Self
    where
        V: Validate + Clone + Send + Sync + 'static,
        V::Input: Debug,
        P: AsValidatable<V::Input>,
    {
        self.value_rules().push_rule(Box::new(LeafRule::new(validator)));
        self
    }

    /// Adds a leaf that reads the context.
    fn rule_with_context<V>(&mut self, validator: V) -> &mut Self
    where
        V: ContextualValidator + Clone + Send + Sync + 'static,
        V::Input: Debug,
        P: AsValidatable<V::Input>,
    {
        self.value_rules().push_rule(Box::new(ContextualRule::new(validator)));
        self
    }

    /// Adds any node to the general segment.
    fn add_rule(&mut self, rule: impl Rule<P> + 'static) -> &mut Self {
        self.value_rules().push_rule(Box::new(rule));
        self
    }

    fn composite(&mut self, composite: CompositeValidator<P>) -> &mut Self {
        self.add_rule(composite)
    }

    fn conditional(&mut self, conditional: ConditionalValidator<P>) -> &mut Self {
        self.add_rule(conditional)
    }

    /// `when(condition)` runs `then`, otherwise `otherwise`.
    fn branch<C, T, O>(&mut self, condition: C, then: T, otherwise: O) -> &mut Self
    where
        C: Fn(&P) -> bool + Send + Sync + 'static,
        T: FnOnce(&mut ValueValidator<P>),
        O: FnOnce(&mut ValueValidator<P>),
    {
        self.conditional(ConditionalValidator::new(condition).then(then).otherwise(otherwise))
    }

    fn must<F>(&mut self, predicate: F) -> &mut Self
    where
        F: Fn(&P) -> bool + Send + Sync + 'static,
    {
        self.add_rule(PredicateRule::new(move |value: &P, _: &ValidationContext<'_>| predicate(value)))
    }

    fn must_with<F>(&mut self, predicate: F) -> &mut Self
    where
        F: Fn(&P, &ValidationContext<'_>) -> bool + Send + Sync + 'static,
    {
        self.add_rule(PredicateRule::new(predicate))
    }

    // ------------------------------------------------------------------------
    // Presence
    // ------------------------------------------------------------------------

    /// Fails for `None`, JSON `null` and blank strings. Always runs first.
    fn required(&mut self) -> &mut Self
    where
        P: Presence,
    {
        self.value_rules().push_presence(Box::new(PresenceRule::<P>::new()));
        self
    }

    // ------------------------------------------------------------------------
    // Strings
    // ------------------------------------------------------------------------

    fn not_empty(&mut self) -> &mut Self
    where
        P: AsValidatable<str>,
    {
        self.rule(NotEmpty)
    }

    fn min_length(&mut self, min: usize) -> &mut Self
    where
        P: AsValidatable<str>,
    {
        self.rule(MinLength::new(min))
    }

    fn max_length(&mut self, max: usize) -> &mut Self
    where
        P: AsValidatable<str>,
    {
        self.rule(MaxLength::new(max))
    }

    fn exact_length(&mut self, length: usize) -> &mut Self
    where
        P: AsValidatable<str>,
    {
        self.rule(ExactLength::new(length))
    }

    /// Length within `[min, max]`.
    fn length(&mut self, min: usize, max: usize) -> &mut Self
    where
        P: AsValidatable<str>,
    {
        self.rule(LengthRange::new(min, max))
    }

    fn contains(&mut self, substring: impl Into<String>) -> &mut Self
    where
        P: AsValidatable<str>,
    {
        self.rule(Contains::new(substring))
    }

    fn starts_with(&mut self, prefix: impl Into<String>) -> &mut Self
    where
        P: AsValidatable<str>,
    {
        self.rule(StartsWith::new(prefix))
    }

    fn ends_with(&mut self, suffix: impl Into<String>) -> &mut Self
    where
        P: AsValidatable<str>,
    {
        self.rule(EndsWith::new(suffix))
    }

    fn alphanumeric(&mut self) -> &mut Self
    where
        P: AsValidatable<str>,
    {
        self.rule(Alphanumeric)
    }

    fn matches_regex(&mut self, pattern: Regex) -> &mut Self
    where
        P: AsValidatable<str>,
    {
        self.rule(MatchesRegex::new(pattern))
    }

    fn email(&mut self) -> &mut Self
    where
        P: AsValidatable<str>,
    {
        self.rule(Email)
    }

    fn user_name(&mut self) -> &mut Self
    where
        P: AsValidatable<str>,
    {
        self.rule(UserName)
    }

    // ------------------------------------------------------------------------
    // Ordered values
    // ------------------------------------------------------------------------

    fn min<T>(&mut self, min: T) -> &mut Self
    where
        T: PartialOrd + Display + Debug + Copy + Send + Sync + 'static,
        P: AsValidatable<T>,
    {
        self.rule(Min::new(min))
    }

    fn max<T>(&mut self, max: T) -> &mut Self
    where
        T: PartialOrd + Display + Debug + Copy + Send + Sync + 'static,
        P: AsValidatable<T>,
    {
        self.rule(Max::new(max))
    }

    /// Value within `[min, max]`.
    fn in_range<T>(&mut self, min: T, max: T) -> &mut Self
    where
        T: PartialOrd + Display + Debug + Copy + Send + Sync + 'static,
        P: AsValidatable<T>,
    {
        self.rule(InRange::new(min, max))
    }

    fn greater_than<T>(&mut self, bound: T) -> &mut Self
    where
        T: PartialOrd + Display + Debug + Copy + Send + Sync + 'static,
        P: AsValidatable<T>,
    {
        self.rule(GreaterThan::new(bound))
    }

    fn less_than<T>(&mut self, bound: T) -> &mut Self
    where
        T: PartialOrd + Display + Debug + Copy + Send + Sync + 'static,
        P: AsValidatable<T>,
    {
        self.rule(LessThan::new(bound))
    }

    // ------------------------------------------------------------------------
    // Slices
    // ------------------------------------------------------------------------

    fn min_size<E>(&mut self, min: usize) -> &mut Self
    where
        E: Debug + 'static,
        P: AsValidatable<[E]>,
    {
        self.rule(MinSize::<E>::new(min))
    }

    fn max_size<E>(&mut self, max: usize) -> &mut Self
    where
        E: Debug + 'static,
        P: AsValidatable<[E]>,
    {
        self.rule(MaxSize::<E>::new(max))
    }

    // ------------------------------------------------------------------------
    // Messages and options
    // ------------------------------------------------------------------------

    /// Replaces the message of the last node. `{name}` and the failure's
    /// parameters are substituted.
    fn with_message(&mut self, message: impl Into<ErrorMessage>) -> &mut Self {
        self.value_rules().set_last_message(message.into());
        self
    }

    /// Like [`with_message`](Self::with_message), looked up in the
    /// context's message source.
    fn with_message_key(&mut self, key: &'static str) -> &mut Self {
        self.value_rules().set_last_message(ErrorMessage::resource(key));
        self
    }

    /// Message for every node that has no custom message yet.
    fn with_default_message(&mut self, message: impl Into<ErrorMessage>) -> &mut Self {
        self.value_rules().set_default_message(&message.into());
        self
    }

    /// Only validates values matching `guard`. Guards accumulate.
    fn when<F>(&mut self, guard: F) -> &mut Self
    where
        F: Fn(&P) -> bool + Send + Sync + 'static,
    {
        self.value_rules().add_guard(Arc::new(guard));
        self
    }

    fn unless<F>(&mut self, guard: F) -> &mut Self
    where
        F: Fn(&P) -> bool + Send + Sync + 'static,
    {
        self.value_rules().add_guard(Arc::new(move |value: &P| !guard(value)));
        self
    }

    fn allow_empty_strings(&mut self) -> &mut Self
    where
        P: Presence,
    {
        self.value_rules().set_allow_empty_strings();
        self
    }

    fn pre_process<F>(&mut self, transform: F) -> &mut Self
    where
        P: ToOwned,
        F: Fn(&P) -> P::Owned + Send + Sync + 'static,
    {
        self.value_rules().set_pre_processor(transform);
        self
    }

    fn use_mode(&mut self, mode: ValidationMode) -> &mut Self {
        self.value_rules().set_mode(mode);
        self
    }
}

impl<P: ?Sized + 'static> RuleBuilder<P> for ValueValidator<P> {
    fn value_rules(&mut self) -> &mut ValueValidator<P> {
        self
    }
}
