//! Ambient execution context
//!
//! A [`ValidationContext`] is created per evaluation call and narrowed per
//! nesting level. Each level links to its parent; lookups of the item bag,
//! resolver, annotation bridge and message source fall back up the chain.

use std::any::{Any, type_name};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::annotation::AnnotationValidator;
use crate::engine::RuleSets;
use crate::foundation::message::{DEFAULT_DISPLAY_NAME, MessageSource};
use crate::foundation::resolver::ServiceResolver;
use crate::foundation::ValidationError;
use crate::options::ValidatorOptions;

type Item = Box<dyn Any + Send + Sync>;

// ============================================================================
// VALIDATION CONTEXT
// ============================================================================

/// Per-call carrier of target, naming, rule-set selection and shared data.
pub struct ValidationContext<'a> {
    parent: Option<&'a ValidationContext<'a>>,
    instance: Option<&'a dyn Any>,
    display_name: Option<Cow<'a, str>>,
    member_name: Option<Cow<'a, str>>,
    rule_sets: Option<RuleSets>,
    default_rule_sets: Option<RuleSets>,
    items: HashMap<Cow<'static, str>, Item>,
    resolver: Option<Arc<dyn ServiceResolver>>,
    annotations: Option<Arc<dyn AnnotationValidator>>,
    messages: Option<Arc<dyn MessageSource>>,
    annotations_enabled: bool,
}

impl Default for ValidationContext<'_> {
    fn default() -> Self {
        Self {
            parent: None,
            instance: None,
            display_name: None,
            member_name: None,
            rule_sets: None,
            default_rule_sets: None,
            items: HashMap::new(),
            resolver: None,
            annotations: None,
            messages: None,
            annotations_enabled: true,
        }
    }
}

impl<'a> ValidationContext<'a> {
    /// Creates an empty root context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a builder for a root context.
    pub fn builder() -> ValidationContextBuilder {
        ValidationContextBuilder::default()
    }

    /// A root context requesting `rule_sets`.
    pub fn for_rule_sets(rule_sets: impl Into<RuleSets>) -> Self {
        Self::new().with_rule_sets(Some(rule_sets.into()))
    }

    /// Opens a nested level.
    ///
    /// The child inherits the target instance and the resolved rule sets;
    /// names are reset.
    pub fn child(&'a self) -> Self {
        Self {
            parent: Some(self),
            instance: self.instance,
            rule_sets: self.rule_sets.clone(),
            annotations_enabled: self.annotations_enabled,
            ..Self::default()
        }
    }

    /// Opens a level that keeps this level's names, for selector or
    /// resolver overrides on the same member.
    pub fn scope(&'a self) -> Self {
        Self {
            display_name: self.display_name.clone(),
            member_name: self.member_name.clone(),
            ..self.child()
        }
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_instance(mut self, instance: &'a dyn Any) -> Self {
        self.instance = Some(instance);
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_member(mut self, member: impl Into<Cow<'a, str>>, display: Option<Cow<'a, str>>) -> Self {
        self.member_name = Some(member.into());
        self.display_name = display;
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_rule_sets(mut self, rule_sets: Option<RuleSets>) -> Self {
        self.rule_sets = rule_sets.filter(|sets| !sets.is_empty());
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_default_rule_sets(mut self, rule_sets: Option<RuleSets>) -> Self {
        self.default_rule_sets = rule_sets.filter(|sets| !sets.is_empty());
        self
    }

    /// Sets the resolver for this level; `None` keeps the inherited one.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_resolver(mut self, resolver: Option<Arc<dyn ServiceResolver>>) -> Self {
        if resolver.is_some() {
            self.resolver = resolver;
        }
        self
    }

    /// Sets the annotation bridge for this level; `None` keeps the inherited one.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_annotations(mut self, annotations: Option<Arc<dyn AnnotationValidator>>) -> Self {
        if annotations.is_some() {
            self.annotations = annotations;
        }
        self
    }

    /// Sets the message source for this level; `None` keeps the inherited one.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_messages(mut self, messages: Option<Arc<dyn MessageSource>>) -> Self {
        if messages.is_some() {
            self.messages = messages;
        }
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_annotations_enabled(mut self, enabled: bool) -> Self {
        self.annotations_enabled = enabled;
        self
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn parent(&self) -> Option<&ValidationContext<'a>> {
        self.parent
    }

    /// The object currently being validated, downcast to `T`.
    pub fn instance<T: Any>(&self) -> Option<&'a T> {
        self.instance?.downcast_ref::<T>()
    }

    /// Like [`instance`](Self::instance), raising a type mismatch for a wrong type.
    pub fn require_instance<T: Any>(&self) -> Result<&'a T, ValidationError> {
        self.instance::<T>()
            .ok_or_else(|| ValidationError::type_mismatch(type_name::<T>()))
    }

    pub fn member_name(&self) -> Option<&str> {
        self.member_name.as_deref()
    }

    /// The display name, falling back to the member name.
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref().or_else(|| self.member_name())
    }

    /// Name substituted for `{name}` in messages.
    pub fn message_name(&self) -> &str {
        self.display_name().unwrap_or(DEFAULT_DISPLAY_NAME)
    }

    /// The rule sets requested for this level.
    pub fn rule_sets(&self) -> Option<&RuleSets> {
        self.rule_sets.as_ref()
    }

    /// The ambient default selector, searched up the chain.
    pub fn default_rule_sets(&self) -> Option<&RuleSets> {
        self.default_rule_sets
            .as_ref()
            .or_else(|| self.parent.and_then(ValidationContext::default_rule_sets))
    }

    pub fn resolver(&self) -> Option<&Arc<dyn ServiceResolver>> {
        self.resolver
            .as_ref()
            .or_else(|| self.parent.and_then(ValidationContext::resolver))
    }

    /// Resolves a service from the bound resolver.
    pub fn resolve<S: Any + Send + Sync>(&self) -> Option<Arc<S>> {
        self.resolver()?.get::<S>()
    }

    pub fn annotations(&self) -> Option<&Arc<dyn AnnotationValidator>> {
        self.annotations
            .as_ref()
            .or_else(|| self.parent.and_then(ValidationContext::annotations))
    }

    pub fn annotations_enabled(&self) -> bool {
        self.annotations_enabled
    }

    pub fn messages(&self) -> Option<&dyn MessageSource> {
        self.messages
            .as_deref()
            .or_else(|| self.parent.and_then(ValidationContext::messages))
    }

    // ------------------------------------------------------------------------
    // Item bag
    // ------------------------------------------------------------------------

    /// Stores a value on this level.
    pub fn insert<V: Any + Send + Sync>(&mut self, key: impl Into<Cow<'static, str>>, value: V) {
        self.items.insert(key.into(), Box::new(value));
    }

    /// Looks a value up on this level, then on its ancestors.
    pub fn get<V: Any>(&self, key: &str) -> Option<&V> {
        match self.items.get(key) {
            Some(item) => item.downcast_ref::<V>(),
            None => self.parent.and_then(|parent| parent.get::<V>(key)),
        }
    }

    /// Removes a value from this level only.
    pub fn remove(&mut self, key: &str) -> bool {
        self.items.remove(key).is_some()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.items.contains_key(key) || self.parent.is_some_and(|parent| parent.contains(key))
    }

    /// Number of items stored on this level.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl fmt::Debug for ValidationContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationContext")
            .field("member_name", &self.member_name)
            .field("display_name", &self.display_name)
            .field("rule_sets", &self.rule_sets)
            .field("default_rule_sets", &self.default_rule_sets)
            .field("items", &self.items.len())
            .field("has_parent", &self.parent.is_some())
            .finish()
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Builder for root contexts.
#[derive(Default)]
pub struct ValidationContextBuilder {
    items: Vec<(Cow<'static, str>, Item)>,
    rule_sets: Option<RuleSets>,
    default_rule_sets: Option<RuleSets>,
    resolver: Option<Arc<dyn ServiceResolver>>,
    annotations: Option<Arc<dyn AnnotationValidator>>,
    messages: Option<Arc<dyn MessageSource>>,
}

impl ValidationContextBuilder {
    #[must_use = "builder methods must be chained or built"]
    pub fn with<V: Any + Send + Sync>(mut self, key: impl Into<Cow<'static, str>>, value: V) -> Self {
        self.items.push((key.into(), Box::new(value)));
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn rule_sets(mut self, rule_sets: impl Into<RuleSets>) -> Self {
        self.rule_sets = Some(rule_sets.into());
        self
    }

    /// Stashes an ambient default selector used when no explicit one is given.
    #[must_use = "builder methods must be chained or built"]
    pub fn default_rule_sets(mut self, rule_sets: impl Into<RuleSets>) -> Self {
        self.default_rule_sets = Some(rule_sets.into());
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn resolver(mut self, resolver: Arc<dyn ServiceResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn annotations(mut self, annotations: Arc<dyn AnnotationValidator>) -> Self {
        self.annotations = Some(annotations);
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn messages(mut self, messages: Arc<dyn MessageSource>) -> Self {
        self.messages = Some(messages);
        self
    }

    /// Applies the context-level parts of `options`.
    #[must_use = "builder methods must be chained or built"]
    pub fn options(mut self, options: &ValidatorOptions) -> Self {
        if let Some(sets) = &options.default_rule_sets {
            self.default_rule_sets = Some(sets.clone());
        }
        self
    }

    pub fn build<'a>(self) -> ValidationContext<'a> {
        let mut ctx = ValidationContext::new()
            .with_rule_sets(self.rule_sets)
            .with_default_rule_sets(self.default_rule_sets)
            .with_resolver(self.resolver)
            .with_annotations(self.annotations)
            .with_messages(self.messages);
        ctx.items.extend(self.items);
        ctx
    }
}
