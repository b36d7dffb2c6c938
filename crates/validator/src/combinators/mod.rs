//! Composite, conditional, property and collection validators
//!
//! These wrap a [`ValueValidator`](crate::engine::ValueValidator) or an
//! [`ObjectValidator`](crate::engine::ObjectValidator) and decide which
//! rules run, against which value, and under which member path.

pub mod collection;
pub mod composite;
pub mod conditional;
pub mod property;

pub use collection::{CollectionPropertyValidator, CollectionValidator};
pub use composite::{CompositeValidator, ValidationMode};
pub use conditional::ConditionalValidator;
pub use property::{Accessor, PropertyValidator};
