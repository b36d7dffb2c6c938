//! Rule sets
//!
//! A rule set is a named activation group. Untagged nodes always run; tagged
//! nodes run when the requested selector names one of their sets. The
//! [`WILDCARD`] token works on both sides: a node tagged `"*"` always runs,
//! and a selector containing `"*"` activates every tagged node.
//!
//! At declaration time a [`RuleSetStack`] tracks the innermost scope; the
//! [`RuleSetScope`] guard pops it on every exit path.

use std::borrow::Cow;
use std::fmt;
use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::foundation::{Error, ValidationContext};

/// Selector token matching every rule set.
pub const WILDCARD: &str = "*";

// ============================================================================
// RULE SETS
// ============================================================================

/// An ordered list of rule-set names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSets(SmallVec<[Cow<'static, str>; 2]>);

impl RuleSets {
    pub fn new() -> Self {
        Self::default()
    }

    /// The match-all selector.
    pub fn all() -> Self {
        Self::from(WILDCARD)
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.push(name);
        self
    }

    /// Adds `name` unless it is already listed.
    pub fn push(&mut self, name: impl Into<Cow<'static, str>>) {
        let name = name.into();
        if !self.contains(&name) {
            self.0.push(name);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|n| n == name)
    }

    pub fn is_wildcard(&self) -> bool {
        self.contains(WILDCARD)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(AsRef::as_ref)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Validates a user supplied list: empty lists and blank names are rejected.
    pub fn required(names: impl Into<Self>) -> Result<Self, Error> {
        let sets = names.into();
        if sets.is_empty() || sets.iter().any(|n| n.trim().is_empty()) {
            return Err(Error::EmptyArgument("rule_sets"));
        }
        Ok(sets)
    }
}

impl fmt::Display for RuleSets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, name) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            f.write_str(name)?;
        }
        Ok(())
    }
}

impl From<&'static str> for RuleSets {
    fn from(name: &'static str) -> Self {
        Self::new().with(name)
    }
}

impl From<String> for RuleSets {
    fn from(name: String) -> Self {
        Self::new().with(name)
    }
}

impl<const N: usize> From<[&'static str; N]> for RuleSets {
    fn from(names: [&'static str; N]) -> Self {
        names.into_iter().collect()
    }
}

impl From<&[&'static str]> for RuleSets {
    fn from(names: &[&'static str]) -> Self {
        names.iter().copied().collect()
    }
}

impl From<Vec<String>> for RuleSets {
    fn from(names: Vec<String>) -> Self {
        names.into_iter().collect()
    }
}

impl<S: Into<Cow<'static, str>>> FromIterator<S> for RuleSets {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut sets = Self::new();
        for name in iter {
            sets.push(name);
        }
        sets
    }
}

// ============================================================================
// ACTIVATION
// ============================================================================

/// Whether a node tagged `tag` runs under `selector`.
pub fn is_active(tag: Option<&RuleSets>, selector: Option<&RuleSets>) -> bool {
    let Some(tag) = tag else {
        return true;
    };
    if tag.is_wildcard() {
        return true;
    }
    match selector {
        None => false,
        Some(selector) => selector.is_wildcard() || tag.iter().any(|name| selector.contains(name)),
    }
}

/// The effective selector for a validator evaluated in `ctx`.
///
/// A list inherited at attach time wins, then whatever the context requested,
/// then the ambient default stashed for the request.
pub fn resolve(inherited: Option<&RuleSets>, ctx: &ValidationContext<'_>) -> Option<RuleSets> {
    inherited
        .or_else(|| ctx.rule_sets())
        .or_else(|| ctx.default_rule_sets())
        .cloned()
}

// ============================================================================
// DECLARATION STACK
// ============================================================================

/// Declaration-time stack of rule-set scopes.
#[derive(Debug, Clone, Default)]
pub struct RuleSetStack {
    scopes: Vec<RuleSets>,
}

impl RuleSetStack {
    /// The innermost scope, if any.
    pub fn current(&self) -> Option<&RuleSets> {
        self.scopes.last()
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    fn push(&mut self, sets: RuleSets) {
        self.scopes.push(sets);
    }

    fn truncate(&mut self, depth: usize) {
        self.scopes.truncate(depth);
    }
}

/// Builders that declare rules under rule-set scopes.
pub trait ScopedRules {
    fn rule_set_stack(&mut self) -> &mut RuleSetStack;
}

/// Guard holding a builder inside a rule-set scope.
///
/// Dereferences to the builder; dropping it restores the stack depth.
pub struct RuleSetScope<'a, B: ScopedRules> {
    owner: &'a mut B,
    depth: usize,
}

impl<'a, B: ScopedRules> RuleSetScope<'a, B> {
    pub fn enter(owner: &'a mut B, sets: RuleSets) -> Self {
        let stack = owner.rule_set_stack();
        let depth = stack.depth();
        stack.push(sets);
        Self { owner, depth }
    }
}

impl<B: ScopedRules> Deref for RuleSetScope<'_, B> {
    type Target = B;

    fn deref(&self) -> &B {
        &*self.owner
    }
}

impl<B: ScopedRules> DerefMut for RuleSetScope<'_, B> {
    fn deref_mut(&mut self) -> &mut B {
        &mut *self.owner
    }
}

impl<B: ScopedRules> Drop for RuleSetScope<'_, B> {
    fn drop(&mut self) {
        let depth = self.depth;
        self.owner.rule_set_stack().truncate(depth);
    }
}

/// Runs `body` inside a scope for `names`.
pub fn scoped<B, F>(owner: &mut B, names: impl Into<RuleSets>, body: F) -> Result<&mut B, Error>
where
    B: ScopedRules,
    F: FnOnce(&mut B) -> Result<(), Error>,
{
    let sets = RuleSets::required(names)?;
    {
        let mut scope = RuleSetScope::enter(owner, sets);
        body(&mut scope)?;
    }
    Ok(owner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, None, true)]
    #[case(None, Some(&["x"][..]), true)]
    #[case(Some(&["r"][..]), None, false)]
    #[case(Some(&["r"][..]), Some(&["r"][..]), true)]
    #[case(Some(&["r"][..]), Some(&["*"][..]), true)]
    #[case(Some(&["r"][..]), Some(&["other"][..]), false)]
    #[case(Some(&["a", "b"][..]), Some(&["b"][..]), true)]
    #[case(Some(&["*"][..]), None, true)]
    fn activation(
        #[case] tag: Option<&'static [&'static str]>,
        #[case] selector: Option<&'static [&'static str]>,
        #[case] expected: bool,
    ) {
        let tag = tag.map(RuleSets::from);
        let selector = selector.map(RuleSets::from);
        assert_eq!(is_active(tag.as_ref(), selector.as_ref()), expected);
    }

    #[derive(Default)]
    struct Declarations {
        stack: RuleSetStack,
        seen: Vec<Option<RuleSets>>,
    }

    impl ScopedRules for Declarations {
        fn rule_set_stack(&mut self) -> &mut RuleSetStack {
            &mut self.stack
        }
    }

    impl Declarations {
        fn declare(&mut self) {
            let current = self.stack.current().cloned();
            self.seen.push(current);
        }
    }

    #[test]
    fn nested_scopes_tag_innermost() {
        let mut d = Declarations::default();
        scoped(&mut d, "outer", |d| {
            d.declare();
            scoped(d, "inner", |d| {
                d.declare();
                Ok(())
            })?;
            d.declare();
            Ok(())
        })
        .unwrap();
        d.declare();

        let names: Vec<Option<String>> = d.seen.iter().map(|s| s.as_ref().map(ToString::to_string)).collect();
        assert_eq!(
            names,
            vec![Some("outer".into()), Some("inner".into()), Some("outer".into()), None]
        );
    }

    #[test]
    fn scope_is_popped_when_body_fails() {
        let mut d = Declarations::default();
        let result = scoped(&mut d, "r", |_| Err(Error::EmptyArgument("probe")));
        assert!(result.is_err());
        assert_eq!(d.stack.depth(), 0);
    }

    #[test]
    fn scope_is_popped_when_body_panics() {
        let mut d = Declarations::default();
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = scoped(&mut d, "r", |_| panic!("declaration failed"));
        }));
        assert!(outcome.is_err());
        assert_eq!(d.stack.depth(), 0);
    }

    #[test]
    fn empty_names_are_rejected() {
        let mut d = Declarations::default();
        assert_eq!(
            scoped(&mut d, RuleSets::new(), |_| Ok(())).err(),
            Some(Error::EmptyArgument("rule_sets"))
        );
        assert!(RuleSets::required(" ").is_err());
    }

    #[test]
    fn names_are_deduplicated() {
        let sets: RuleSets = ["a", "b", "a"].into();
        assert_eq!(sets.len(), 2);
        assert_eq!(sets.to_string(), "a,b");
    }
}
