//! Numeric range validators

use std::fmt::Display;

use crate::foundation::ValidationError;

fn bound_error(code: &'static str, template: &'static str, bound: impl Display) -> ValidationError {
    ValidationError::new(code, template).with_param("bound", bound.to_string())
}

crate::validator! {
    /// Value `>= min`.
    #[derive(Copy, PartialEq, Eq, Hash)]
    pub Min<T: PartialOrd + Display + Copy> { min: T } for T;
    check(self, input) {
        if *input >= self.min {
            Ok(())
        } else {
            Err(bound_error("min", "The field {name} must be at least {bound}.", self.min))
        }
    }
}

crate::validator! {
    /// Value `<= max`.
    #[derive(Copy, PartialEq, Eq, Hash)]
    pub Max<T: PartialOrd + Display + Copy> { max: T } for T;
    check(self, input) {
        if *input <= self.max {
            Ok(())
        } else {
            Err(bound_error("max", "The field {name} must be at most {bound}.", self.max))
        }
    }
}

crate::validator! {
    /// Value within `[min, max]`.
    #[derive(Copy, PartialEq, Eq, Hash)]
    pub InRange<T: PartialOrd + Display + Copy> { min: T, max: T } for T;
    check(self, input) {
        if *input >= self.min && *input <= self.max {
            Ok(())
        } else {
            Err(ValidationError::out_of_range(self.min, self.max))
        }
    }
}

crate::validator! {
    /// Value strictly above `bound`.
    #[derive(Copy, PartialEq, Eq, Hash)]
    pub GreaterThan<T: PartialOrd + Display + Copy> { bound: T } for T;
    check(self, input) {
        if *input > self.bound {
            Ok(())
        } else {
            Err(bound_error("greater_than", "The field {name} must be greater than {bound}.", self.bound))
        }
    }
}

crate::validator! {
    /// Value strictly below `bound`.
    #[derive(Copy, PartialEq, Eq, Hash)]
    pub LessThan<T: PartialOrd + Display + Copy> { bound: T } for T;
    check(self, input) {
        if *input < self.bound {
            Ok(())
        } else {
            Err(bound_error("less_than", "The field {name} must be less than {bound}.", self.bound))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::Validate;
    use rstest::rstest;

    #[rstest]
    #[case(0, false)]
    #[case(1, true)]
    #[case(10, true)]
    #[case(11, false)]
    fn in_range_is_inclusive(#[case] input: i64, #[case] ok: bool) {
        assert_eq!(InRange::new(1, 10).validate(&input).is_ok(), ok);
    }

    #[test]
    fn in_range_message_names_bounds() {
        let error = InRange::new(1, 10).validate(&20).unwrap_err();
        assert_eq!(error.code, "range");
        assert_eq!(error.param("min"), Some("1"));
        assert_eq!(error.param("max"), Some("10"));
    }

    #[test]
    fn strict_bounds() {
        assert!(GreaterThan::new(5).validate(&5).is_err());
        assert!(GreaterThan::new(5).validate(&6).is_ok());
        assert!(LessThan::new(0.5).validate(&0.5).is_err());
        assert!(Min::new(2_u8).validate(&2).is_ok());
        assert_eq!(Max::new(2_u8).validate(&3).unwrap_err().param("bound"), Some("2"));
    }
}
