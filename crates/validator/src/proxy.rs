//! Erased validators and the annotation proxy
//!
//! [`DynValidator`] lets heterogeneous validators live behind one type,
//! checked against `&dyn Any` at call time. [`ValidatorProxy`] plugs an
//! [`ObjectValidator`] into the annotation layer and caches reports per
//! target instance.

use std::any::{Any, type_name};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::trace;

use crate::annotation::{AnnotationRequest, AnnotationValidator};
use crate::engine::{ObjectValidator, Rule, RuleSets};
use crate::foundation::{Error, ServiceResolver, ValidationContext, ValidationErrors, Validator};

// ============================================================================
// ERASED VALIDATOR
// ============================================================================

/// A validator whose value type is checked at call time.
pub trait DynValidator: Send + Sync {
    /// Name of the accepted value type.
    fn value_type(&self) -> &'static str;

    /// Fails with [`Error::TypeMismatch`] for a value of another type.
    fn validate_dyn(&self, value: &dyn Any, ctx: &ValidationContext<'_>) -> Result<Option<ValidationErrors>, Error>;
}

struct Erased<T, R> {
    rule: R,
    _value: PhantomData<fn(&T)>,
}

impl<T: Any, R: Rule<T>> DynValidator for Erased<T, R> {
    fn value_type(&self) -> &'static str {
        type_name::<T>()
    }

    fn validate_dyn(&self, value: &dyn Any, ctx: &ValidationContext<'_>) -> Result<Option<ValidationErrors>, Error> {
        let typed = value.downcast_ref::<T>().ok_or(Error::TypeMismatch {
            expected: type_name::<T>(),
        })?;
        Ok(self.rule.get_failures_with(typed, ctx))
    }
}

/// Erases the value type of `rule`.
pub fn erase<T: Any, R: Rule<T> + 'static>(rule: R) -> Box<dyn DynValidator> {
    Box::new(Erased {
        rule,
        _value: PhantomData,
    })
}

// ============================================================================
// VALIDATOR PROXY
// ============================================================================

struct CacheEntry<T> {
    target: Weak<T>,
    report: Option<ValidationErrors>,
}

/// An object validator exposed as an annotation bridge.
///
/// Values that are neither `T` nor `Arc<T>` have no annotations as far as
/// the proxy is concerned.
///
/// Reports for `Arc<T>` targets are cached by identity: two distinct
/// instances never share an entry, even if they compare equal. Changing the
/// proxy's rule sets or resolver clears the cache.
pub struct ValidatorProxy<T: 'static> {
    validator: ObjectValidator<T>,
    rule_sets: Option<RuleSets>,
    cache: Mutex<HashMap<usize, CacheEntry<T>>>,
}

impl<T: Send + Sync + 'static> ValidatorProxy<T> {
    pub fn new(validator: ObjectValidator<T>) -> Self {
        Self {
            validator,
            rule_sets: None,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn rule_sets(&self) -> Option<&RuleSets> {
        self.rule_sets.as_ref()
    }

    pub fn set_rule_sets(&mut self, rule_sets: Option<RuleSets>) -> &mut Self {
        self.rule_sets = rule_sets;
        self.cache.get_mut().clear();
        self
    }

    pub fn bind_resolver(&mut self, resolver: &Arc<dyn ServiceResolver>) -> &mut Self {
        self.validator.bind_resolver(resolver);
        self.cache.get_mut().clear();
        self
    }

    pub fn cached(&self) -> usize {
        self.cache.lock().len()
    }

    fn context(&self) -> ValidationContext<'static> {
        ValidationContext::new().with_rule_sets(self.rule_sets.clone())
    }

    /// Validates `target` without caching.
    pub fn validate_value(&self, target: &T) -> Option<ValidationErrors> {
        self.validator.get_failures_with(target, &self.context())
    }

    /// Validates `target`, reusing the report of an earlier call on the same
    /// instance.
    pub fn validate(&self, target: &Arc<T>) -> Option<ValidationErrors> {
        let key = Arc::as_ptr(target) as usize;
        {
            let cache = self.cache.lock();
            if let Some(entry) = cache.get(&key) {
                if entry.target.upgrade().is_some_and(|live| Arc::ptr_eq(&live, target)) {
                    trace!(target_type = type_name::<T>(), "proxy cache hit");
                    return entry.report.clone();
                }
            }
        }

        let report = self.validate_value(target);
        let mut cache = self.cache.lock();
        cache.retain(|_, entry| entry.target.strong_count() > 0);
        cache.insert(
            key,
            CacheEntry {
                target: Arc::downgrade(target),
                report: report.clone(),
            },
        );
        report
    }

    fn validate_request(&self, target: &T, request: &AnnotationRequest<'_>) -> Option<ValidationErrors> {
        let ctx = ValidationContext::new()
            .with_rule_sets(request.rule_sets.cloned().or_else(|| self.rule_sets.clone()))
            .with_resolver(request.resolver.cloned());
        self.validator.get_failures_with(target, &ctx)
    }
}

impl<T: Send + Sync + 'static> AnnotationValidator for ValidatorProxy<T> {
    fn validate_annotations(
        &self,
        instance: &dyn Any,
        request: &AnnotationRequest<'_>,
    ) -> Result<Option<ValidationErrors>, Error> {
        let own_config = request.rule_sets.is_none_or(|sets| Some(sets) == self.rule_sets.as_ref())
            && request.resolver.is_none();
        if let Some(shared) = instance.downcast_ref::<Arc<T>>() {
            return Ok(if own_config {
                self.validate(shared)
            } else {
                self.validate_request(shared, request)
            });
        }
        match instance.downcast_ref::<T>() {
            Some(target) => Ok(self.validate_request(target, request)),
            None => {
                trace!(target_type = type_name::<T>(), member = request.member_name, "proxy ignores foreign value");
                Ok(None)
            }
        }
    }
}

impl<T: 'static> fmt::Debug for ValidatorProxy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorProxy")
            .field("validator", &self.validator)
            .field("rule_sets", &self.rule_sets)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::RuleBuilder;

    #[derive(PartialEq)]
    struct Tag {
        label: String,
    }

    fn tag(label: &str) -> Arc<Tag> {
        Arc::new(Tag { label: label.to_owned() })
    }

    fn proxy() -> ValidatorProxy<Tag> {
        let mut v = ObjectValidator::<Tag>::new();
        v.rule_for("Label", |t: &Tag| &t.label).min_length(3);
        v.rule_set("strict", |v| {
            v.rule_for("Label", |t: &Tag| &t.label).alphanumeric();
            Ok(())
        })
        .unwrap();
        ValidatorProxy::new(v)
    }

    #[test]
    fn caches_by_identity() {
        let proxy = proxy();
        let first = tag("ab");
        let twin = tag("ab");
        assert!(proxy.validate(&first).is_some());
        assert!(proxy.validate(&first).is_some());
        assert_eq!(proxy.cached(), 1);
        assert!(proxy.validate(&twin).is_some());
        assert_eq!(proxy.cached(), 2);
    }

    #[test]
    fn reconfiguring_invalidates() {
        let mut proxy = proxy();
        let target = tag("a-bc");
        assert!(proxy.validate(&target).is_none());
        proxy.set_rule_sets(Some("strict".into()));
        assert_eq!(proxy.cached(), 0);
        assert!(proxy.validate(&target).is_some());
    }

    #[test]
    fn dead_entries_are_pruned() {
        let proxy = proxy();
        drop({
            let short = tag("x");
            proxy.validate(&short)
        });
        let _ = proxy.validate(&tag("long"));
        assert_eq!(proxy.cached(), 1);
    }

    #[test]
    fn bridge_ignores_foreign_types() {
        let proxy = proxy();
        let request = AnnotationRequest {
            display_name: None,
            member_name: None,
            resolver: None,
            rule_sets: None,
            validate_all_properties: true,
            skip_members: &[],
        };
        assert!(proxy.validate_annotations(&42_u32, &request).unwrap().is_none());
        let plain = Tag { label: "ab".into() };
        assert!(proxy.validate_annotations(&plain, &request).unwrap().is_some());
    }

    #[test]
    fn erased_validators_check_type() {
        let erased = erase::<Tag, _>(proxy().validator);
        let ctx = ValidationContext::new();
        assert!(erased.validate_dyn(&Tag { label: "abc".into() }, &ctx).unwrap().is_none());
        assert!(matches!(erased.validate_dyn(&"abc", &ctx), Err(Error::TypeMismatch { .. })));
        assert!(erased.value_type().ends_with("Tag"));
    }
}
