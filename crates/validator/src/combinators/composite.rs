//! COMPOSITE combinator - runs a fixed child list under a mode
//!
//! The same mode runner drives value and object validators, so `FailFast`,
//! `All` and `Any` mean the same thing at every level.

use std::fmt;
use std::ops::ControlFlow;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::engine::{Failures, LeafRule, Rule, RuleSets};
use crate::foundation::{AsValidatable, ServiceResolver, Validate, ValidationContext};

// ============================================================================
// VALIDATION MODE
// ============================================================================

/// How child results combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Stop after the first failing child, reporting one failure.
    FailFast,
    /// Run every child and aggregate all failures.
    #[default]
    All,
    /// Succeed if any child succeeds; otherwise report every failure.
    Any,
}

impl fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::FailFast => "fail_fast",
            Self::All => "all",
            Self::Any => "any",
        })
    }
}

/// Runs `steps` in order under `mode`.
///
/// Each step evaluates one child into the sink it is given.
pub(crate) fn run<I, S>(mode: ValidationMode, steps: I, failures: &mut Failures) -> ControlFlow<()>
where
    I: IntoIterator<Item = S>,
    S: FnOnce(&mut Failures) -> ControlFlow<()>,
{
    match mode {
        ValidationMode::All => {
            for step in steps {
                step(failures)?;
            }
        }
        ValidationMode::FailFast => {
            for step in steps {
                let start = failures.len();
                step(failures)?;
                if failures.len() > start {
                    failures.truncate(start + 1);
                    break;
                }
            }
        }
        ValidationMode::Any => {
            let mut rejected = Vec::new();
            for step in steps {
                let mut local = Failures::collect_all();
                let _ = step(&mut local);
                if local.is_empty() {
                    return ControlFlow::Continue(());
                }
                rejected.push(local);
            }
            for local in rejected {
                failures.append(local)?;
            }
        }
    }
    ControlFlow::Continue(())
}

// ============================================================================
// COMPOSITE VALIDATOR
// ============================================================================

/// A fixed list of child nodes evaluated against one value.
///
/// # Examples
///
/// ```rust,ignore
/// use vigil_validator::prelude::*;
///
/// let code = CompositeValidator::any()
///     .with(ExactLength::new(2))
///     .with(ExactLength::new(3));
/// assert!(code.is_valid("de"));
/// assert!(!code.is_valid("deut"));
/// ```
pub struct CompositeValidator<P: ?Sized + 'static> {
    children: Vec<Box<dyn Rule<P>>>,
    mode: ValidationMode,
}

impl<P: ?Sized + 'static> CompositeValidator<P> {
    pub fn new(mode: ValidationMode) -> Self {
        Self {
            children: Vec::new(),
            mode,
        }
    }

    pub fn all() -> Self {
        Self::new(ValidationMode::All)
    }

    pub fn any() -> Self {
        Self::new(ValidationMode::Any)
    }

    pub fn fail_fast() -> Self {
        Self::new(ValidationMode::FailFast)
    }

    /// Adds a leaf child.
    #[must_use = "builder methods must be chained or built"]
    pub fn with<V>(self, validator: V) -> Self
    where
        V: Validate + Clone + Send + Sync + 'static,
        V::Input: fmt::Debug,
        P: AsValidatable<V::Input>,
    {
        self.with_rule(LeafRule::new(validator))
    }

    /// Adds any node as a child.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_rule(mut self, rule: impl Rule<P> + 'static) -> Self {
        self.children.push(Box::new(rule));
        self
    }

    pub fn push(&mut self, rule: Box<dyn Rule<P>>) -> &mut Self {
        self.children.push(rule);
        self
    }

    /// Changes the mode after construction.
    pub fn use_mode(&mut self, mode: ValidationMode) -> &mut Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl<P: ?Sized + 'static> Clone for CompositeValidator<P> {
    fn clone(&self) -> Self {
        Self {
            children: self.children.iter().map(|c| c.clone_rule()).collect(),
            mode: self.mode,
        }
    }
}

impl<P: ?Sized + 'static> fmt::Debug for CompositeValidator<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeValidator")
            .field("mode", &self.mode)
            .field("children", &self.children.len())
            .finish()
    }
}

impl<P: ?Sized + 'static> Rule<P> for CompositeValidator<P> {
    fn evaluate(&self, value: &P, ctx: &ValidationContext<'_>, failures: &mut Failures) -> ControlFlow<()> {
        let steps = self
            .children
            .iter()
            .map(|child| move |sink: &mut Failures| child.evaluate(value, ctx, sink));
        run(self.mode, steps, failures)
    }

    fn bind_resolver(&mut self, resolver: &Arc<dyn ServiceResolver>) {
        for child in &mut self.children {
            child.bind_resolver(resolver);
        }
    }

    fn inherit_rule_sets(&mut self, rule_sets: &RuleSets) {
        for child in &mut self.children {
            child.inherit_rule_sets(rule_sets);
        }
    }

    fn clone_rule(&self) -> Box<dyn Rule<P>> {
        Box::new(self.clone())
    }
}
