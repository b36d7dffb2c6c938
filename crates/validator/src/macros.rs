//! Declaration macro for leaf validators.
//!
//! [`validator!`] expands to a struct, its constructor and a
//! [`Validate`](crate::foundation::Validate) impl. The `check` block returns
//! `Result<(), ValidationError>` directly, so a leaf can compute its error
//! from the same measurements it compared.
//!
//! ```rust,ignore
//! vigil_validator::validator! {
//!     /// Rejects odd numbers.
//!     pub Even for i64;
//!     check(input) {
//!         if input % 2 == 0 { Ok(()) } else { Err(ValidationError::new("even", "{name} must be even.")) }
//!     }
//! }
//! ```

/// Declares a leaf validator.
///
/// # Variants
///
/// - `pub Name for Input; check(input) { .. }`: unit struct.
/// - `pub Name { field: Ty, .. } for Input; check(self, input) { .. }`:
///   fields, `new` taking every field in order.
/// - the same followed by `new(args..) { .. }`: fields with a custom `new`.
/// - `pub Name<T: Bound + ..> { field: T, .. } for T; check(self, input) { .. }`:
///   one generic parameter bounded by plain trait names.
#[macro_export]
macro_rules! validator {
    // Unit leaf.
    (
        $(#[$meta:meta])*
        $vis:vis $name:ident for $input:ty;
        check($inp:ident) $body:block
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
        $vis struct $name;

        impl $crate::foundation::Validate for $name {
            type Input = $input;

            fn validate(&self, $inp: &Self::Input) -> ::std::result::Result<(), $crate::foundation::ValidationError> $body
        }
    };

    // Fields with a custom constructor.
    (
        $(#[$meta:meta])*
        $vis:vis $name:ident { $($field:ident: $fty:ty),+ $(,)? } for $input:ty;
        check($self_:ident, $inp:ident) $body:block
        new($($arg:ident: $aty:ty),* $(,)?) $new_body:block
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        $vis struct $name {
            $(pub $field: $fty,)+
        }

        impl $name {
            #[must_use]
            pub fn new($($arg: $aty),*) -> Self $new_body
        }

        $crate::validator!(@impl $name, $input, $self_, $inp, $body);
    };

    // Fields with the positional constructor.
    (
        $(#[$meta:meta])*
        $vis:vis $name:ident { $($field:ident: $fty:ty),+ $(,)? } for $input:ty;
        check($self_:ident, $inp:ident) $body:block
    ) => {
        $crate::validator! {
            $(#[$meta])*
            $vis $name { $($field: $fty),+ } for $input;
            check($self_, $inp) $body
            new($($field: $fty),+) { Self { $($field),+ } }
        }
    };

    // One bounded generic parameter.
    (
        $(#[$meta:meta])*
        $vis:vis $name:ident<$gen:ident: $bound:ident $(+ $more:ident)*>
            { $($field:ident: $fty:ty),+ $(,)? } for $input:ty;
        check($self_:ident, $inp:ident) $body:block
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        $vis struct $name<$gen> {
            $(pub $field: $fty,)+
        }

        impl<$gen: $bound $(+ $more)*> $name<$gen> {
            #[must_use]
            pub fn new($($field: $fty),+) -> Self {
                Self { $($field),+ }
            }
        }

        impl<$gen: $bound $(+ $more)*> $crate::foundation::Validate for $name<$gen> {
            type Input = $input;

            fn validate(&$self_, $inp: &Self::Input) -> ::std::result::Result<(), $crate::foundation::ValidationError> $body
        }
    };

    (@impl $name:ident, $input:ty, $self_:ident, $inp:ident, $body:block) => {
        impl $crate::foundation::Validate for $name {
            type Input = $input;

            fn validate(&$self_, $inp: &Self::Input) -> ::std::result::Result<(), $crate::foundation::ValidationError> $body
        }
    };
}
