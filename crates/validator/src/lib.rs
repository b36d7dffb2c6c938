//! # vigil-validator
//!
//! A rule-composition engine: declare rules per property of a type, group
//! them into named rule sets, and collect every failure with a member path.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use vigil_validator::prelude::*;
//!
//! struct Customer {
//!     id: u32,
//!     name: Option<String>,
//! }
//!
//! let mut customer = ObjectValidator::<Customer>::new();
//! customer.rule_for("Id", |c: &Customer| &c.id).greater_than(0_u32);
//! customer.rule_for("Name", |c: &Customer| &c.name).required().max_length(50);
//!
//! let errors = customer.get_failures(&Customer { id: 0, name: None }).unwrap();
//! assert_eq!(errors.len(), 2);
//! ```
//!
//! ## Building Blocks
//!
//! - **Values**: [`ValueValidator`](engine::ValueValidator) with the
//!   [`RuleBuilder`](engine::RuleBuilder) methods
//! - **Objects**: [`ObjectValidator`](engine::ObjectValidator),
//!   [`PropertyValidator`](combinators::PropertyValidator),
//!   [`CollectionValidator`](combinators::CollectionValidator)
//! - **Composition**: [`CompositeValidator`](combinators::CompositeValidator),
//!   [`ConditionalValidator`](combinators::ConditionalValidator)
//! - **Rule sets**: [`RuleSets`](engine::RuleSets) selected per call
//! - **Annotations**: [`AnnotationValidator`](annotation::AnnotationValidator)
//!   and [`ValidatorProxy`](proxy::ValidatorProxy)
//!
//! Leaf checks implement [`Validate`](foundation::Validate); the
//! [`validator!`] macro declares new ones.

// ValidationError is returned by value from every leaf check; boxing it
// would add an allocation per failure.
#![allow(clippy::result_large_err)]
// Accessors and pre-processors are stored as boxed closures over borrowed
// values.
#![allow(clippy::type_complexity)]

pub mod annotation;
pub mod combinators;
pub mod engine;
pub mod foundation;
mod macros;
pub mod options;
pub mod prelude;
pub mod proxy;
pub mod validators;
