//! Prelude module for convenient imports.
//!
//! `use vigil_validator::prelude::*;` brings in the builder traits, the
//! validator types and the context.
//!
//! # Examples
//!
//! ```rust,ignore
//! use vigil_validator::prelude::*;
//!
//! let mut name = ValueValidator::<Option<String>>::new();
//! name.required().length(2, 20).with_message("{name} is invalid");
//! assert!(name.is_valid(&Some("Ada".into())));
//! ```

// ============================================================================
// FOUNDATION: Traits, errors, context
// ============================================================================

pub use crate::foundation::{
    AsValidatable, ContextualValidator, Elements, Error, ErrorMessage, MessageSource, Nested, Presence,
    ServiceResolver, Services, Validate, ValidationContext, ValidationContextBuilder, ValidationError,
    ValidationErrors, Validator,
};

// ============================================================================
// ENGINE: Rule trees and rule sets
// ============================================================================

pub use crate::engine::{
    Failures, ObjectValidator, Rule, RuleBuilder, RuleSetScope, RuleSets, ScopedRules, ValueValidator, WILDCARD,
};

// ============================================================================
// COMBINATORS
// ============================================================================

pub use crate::combinators::{
    CollectionPropertyValidator, CollectionValidator, CompositeValidator, ConditionalValidator, PropertyValidator,
    ValidationMode,
};

// ============================================================================
// VALIDATORS: Built-in leaf checks
// ============================================================================

#[allow(clippy::wildcard_imports)]
pub use crate::validators::*;

// ============================================================================
// ANNOTATIONS AND OPTIONS
// ============================================================================

pub use crate::annotation::{AnnotationRequest, AnnotationValidator, Annotations};
pub use crate::options::ValidatorOptions;
pub use crate::proxy::{DynValidator, ValidatorProxy, erase};
