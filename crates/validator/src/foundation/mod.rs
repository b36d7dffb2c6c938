//! Core validation types and traits
//!
//! This module contains the building blocks the engine is assembled from:
//!
//! - **Traits**: [`Validate`], [`ContextualValidator`], [`Validator`]
//! - **Errors**: [`ValidationError`], [`ValidationErrors`], [`Error`]
//! - **Conversions**: [`AsValidatable`], [`Presence`], [`Nested`], [`Elements`]
//! - **Context**: [`ValidationContext`] and its builder
//! - **Messages**: [`ErrorMessage`], [`MessageSource`]
//! - **Services**: [`ServiceResolver`], [`Services`]

pub mod context;
pub mod error;
pub mod message;
pub mod resolver;
pub mod traits;
pub mod validatable;

pub use context::{ValidationContext, ValidationContextBuilder};
pub use error::{Error, ValidationError, ValidationErrors};
pub use message::{ErrorMessage, MessageSource};
pub use resolver::{ServiceResolver, Services};
pub use traits::{ContextualValidator, Validate, Validator};
pub use validatable::{AsValidatable, Elements, Nested, Presence};
