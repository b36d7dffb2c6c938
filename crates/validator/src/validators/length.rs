//! String length validators
//!
//! Length is measured in Unicode scalar values.

use crate::foundation::ValidationError;

fn chars(input: &str) -> usize {
    input.chars().count()
}

crate::validator! {
    /// Rejects the empty string.
    pub NotEmpty for str;
    check(input) {
        if input.is_empty() {
            Err(ValidationError::new("not_empty", "The field {name} must not be empty."))
        } else {
            Ok(())
        }
    }
}

crate::validator! {
    /// At least `min` characters.
    #[derive(Copy, PartialEq, Eq, Hash)]
    pub MinLength { min: usize } for str;
    check(self, input) {
        let actual = chars(input);
        if actual >= self.min { Ok(()) } else { Err(ValidationError::min_length(self.min, actual)) }
    }
}

crate::validator! {
    /// At most `max` characters.
    #[derive(Copy, PartialEq, Eq, Hash)]
    pub MaxLength { max: usize } for str;
    check(self, input) {
        let actual = chars(input);
        if actual <= self.max { Ok(()) } else { Err(ValidationError::max_length(self.max, actual)) }
    }
}

crate::validator! {
    /// Exactly `length` characters.
    #[derive(Copy, PartialEq, Eq, Hash)]
    pub ExactLength { length: usize } for str;
    check(self, input) {
        let actual = chars(input);
        if actual == self.length {
            Ok(())
        } else {
            Err(ValidationError::new(
                "exact_length",
                "The field {name} must be a string with a length of exactly '{length}'.",
            )
            .with_param("length", self.length.to_string())
            .with_param("actual", actual.to_string()))
        }
    }
}

crate::validator! {
    /// Between `min` and `max` characters, inclusive.
    ///
    /// A `min` greater than `max` rejects every input.
    #[derive(Copy, PartialEq, Eq, Hash)]
    pub LengthRange { min: usize, max: usize } for str;
    check(self, input) {
        let actual = chars(input);
        if (self.min..=self.max).contains(&actual) {
            Ok(())
        } else {
            Err(ValidationError::length_range(self.min, self.max, actual))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::Validate;
    use rstest::rstest;

    #[rstest]
    #[case("", false)]
    #[case("ab", false)]
    #[case("abc", true)]
    #[case("äöü", true)]
    fn min_length_counts_chars(#[case] input: &str, #[case] ok: bool) {
        assert_eq!(MinLength::new(3).validate(input).is_ok(), ok);
    }

    #[rstest]
    #[case("ab", true)]
    #[case("Furion", true)]
    #[case("Furion Zhou", false)]
    fn length_range_bounds(#[case] input: &str, #[case] ok: bool) {
        assert_eq!(LengthRange::new(2, 10).validate(input).is_ok(), ok);
    }

    #[test]
    fn length_range_reports_bounds() {
        let error = LengthRange::new(3, 5).validate("a").unwrap_err();
        assert_eq!(error.code, "length");
        assert_eq!(error.param("min"), Some("3"));
        assert_eq!(error.param("max"), Some("5"));
    }

    #[test]
    fn exact_and_empty() {
        assert!(ExactLength::new(2).validate("de").is_ok());
        assert_eq!(ExactLength::new(2).validate("d").unwrap_err().param("actual"), Some("1"));
        assert!(NotEmpty.validate("").is_err());
        assert!(MaxLength::new(1).validate("ab").is_err());
    }
}
