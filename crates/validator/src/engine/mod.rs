//! Rule engine
//!
//! Validators are trees of [`Rule`] nodes. A [`ValueValidator`] holds the
//! rules for one value, an [`ObjectValidator`] holds property validators for
//! a type, and both report into a shared [`Failures`] sink. Rules declared
//! inside a rule-set scope only run when the caller selects that set.

pub mod builder;
pub mod node;
pub mod object;
pub mod path;
pub mod rule_set;
pub mod value;

pub use builder::RuleBuilder;
pub use node::{ContextualRule, Failures, LeafRule, PredicateRule, PresenceRule, Rule};
pub use object::ObjectValidator;
pub use rule_set::{RuleSetScope, RuleSetStack, RuleSets, ScopedRules, WILDCARD};
pub use value::ValueValidator;
