//! Declarative annotation bridge
//!
//! The engine does not define an annotation model. It calls an
//! [`AnnotationValidator`] for whole instances (object level) and for single
//! property values (member level), and merges what it reports into the same
//! failure list as the custom rules.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::engine::RuleSets;
use crate::foundation::{Error, ServiceResolver, ValidationError, ValidationErrors};

/// What the engine passes along with the instance.
#[derive(Clone, Copy)]
pub struct AnnotationRequest<'a> {
    pub display_name: Option<&'a str>,
    pub member_name: Option<&'a str>,
    pub resolver: Option<&'a Arc<dyn ServiceResolver>>,
    pub rule_sets: Option<&'a RuleSets>,
    /// `false` lets the annotation layer stop at the first invalid property.
    pub validate_all_properties: bool,
    /// Members the engine validates itself; reporting them again would
    /// duplicate failures.
    pub skip_members: &'a [&'a str],
}

impl AnnotationRequest<'_> {
    pub fn is_skipped(&self, member: &str) -> bool {
        self.skip_members.contains(&member)
    }
}

impl fmt::Debug for AnnotationRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnnotationRequest")
            .field("display_name", &self.display_name)
            .field("member_name", &self.member_name)
            .field("rule_sets", &self.rule_sets)
            .field("validate_all_properties", &self.validate_all_properties)
            .field("skip_members", &self.skip_members)
            .finish_non_exhaustive()
    }
}

/// Host annotation layer.
///
/// `Ok(None)` means no failures. An `Err` is reported as a failure carrying
/// the error's code.
pub trait AnnotationValidator: Send + Sync {
    fn validate_annotations(
        &self,
        instance: &dyn Any,
        request: &AnnotationRequest<'_>,
    ) -> Result<Option<ValidationErrors>, Error>;
}

impl<F> AnnotationValidator for F
where
    F: Fn(&dyn Any, &AnnotationRequest<'_>) -> Result<Option<ValidationErrors>, Error> + Send + Sync,
{
    fn validate_annotations(
        &self,
        instance: &dyn Any,
        request: &AnnotationRequest<'_>,
    ) -> Result<Option<ValidationErrors>, Error> {
        self(instance, request)
    }
}

// ============================================================================
// TYPED REGISTRY
// ============================================================================

type Check = Arc<dyn Fn(&dyn Any, &AnnotationRequest<'_>) -> Vec<ValidationError> + Send + Sync>;

/// Annotation checks registered per concrete type.
///
/// Instances of unregistered types have no annotations.
///
/// ```rust,ignore
/// let annotations = Annotations::new().register(|user: &User, _| {
///     if user.email.is_empty() {
///         vec![ValidationError::required().with_member("Email")]
///     } else {
///         Vec::new()
///     }
/// });
/// ```
#[derive(Clone, Default)]
pub struct Annotations {
    checks: HashMap<TypeId, Check>,
}

impl Annotations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the checks for `T`, replacing earlier ones.
    #[must_use = "builder methods must be chained or built"]
    pub fn register<T, F>(mut self, check: F) -> Self
    where
        T: Any,
        F: Fn(&T, &AnnotationRequest<'_>) -> Vec<ValidationError> + Send + Sync + 'static,
    {
        let check: Check = Arc::new(move |instance: &dyn Any, request: &AnnotationRequest<'_>| {
            instance
                .downcast_ref::<T>()
                .map(|typed| check(typed, request))
                .unwrap_or_default()
        });
        self.checks.insert(TypeId::of::<T>(), check);
        self
    }

    pub fn covers<T: Any>(&self) -> bool {
        self.checks.contains_key(&TypeId::of::<T>())
    }

    pub fn into_bridge(self) -> Arc<dyn AnnotationValidator> {
        Arc::new(self)
    }
}

impl AnnotationValidator for Annotations {
    fn validate_annotations(
        &self,
        instance: &dyn Any,
        request: &AnnotationRequest<'_>,
    ) -> Result<Option<ValidationErrors>, Error> {
        let Some(check) = self.checks.get(&instance.type_id()) else {
            return Ok(None);
        };
        let mut errors: Vec<ValidationError> = check(instance, request)
            .into_iter()
            .filter(|error| !error.member().is_some_and(|m| request.is_skipped(m)))
            .collect();
        if !request.validate_all_properties {
            errors.truncate(1);
        }
        Ok(ValidationErrors::from(errors).into_result().err())
    }
}

impl fmt::Debug for Annotations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Annotations").field("types", &self.checks.len()).finish()
    }
}
