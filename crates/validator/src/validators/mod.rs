//! Built-in leaf validators
//!
//! - **Length**: [`NotEmpty`], [`MinLength`], [`MaxLength`], [`ExactLength`], [`LengthRange`]
//! - **Range**: [`Min`], [`Max`], [`InRange`], [`GreaterThan`], [`LessThan`]
//! - **Size**: [`MinSize`], [`MaxSize`]
//! - **Pattern**: [`Contains`], [`StartsWith`], [`EndsWith`], [`Alphanumeric`], [`MatchesRegex`]
//! - **Format**: [`Email`], [`UserName`]
//! - **Custom**: [`Satisfies`]
//!
//! Every leaf implements [`Validate`](crate::foundation::Validate) and can be
//! added to a builder with `rule(..)` or to a composite with `with(..)`.

pub mod custom;
pub mod length;
pub mod pattern;
pub mod range;
pub mod size;

pub use custom::Satisfies;
pub use length::{ExactLength, LengthRange, MaxLength, MinLength, NotEmpty};
pub use pattern::{Alphanumeric, Contains, Email, EndsWith, MatchesRegex, StartsWith, UserName};
pub use range::{GreaterThan, InRange, LessThan, Max, Min};
pub use size::{MaxSize, MinSize};
