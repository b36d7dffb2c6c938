//! Substring, pattern and format validators

use regex::Regex;

use crate::foundation::ValidationError;

fn pattern_error(code: &'static str, template: &'static str, pattern: &str) -> ValidationError {
    ValidationError::new(code, template).with_param("pattern", pattern.to_owned())
}

crate::validator! {
    /// Contains `substring`.
    pub Contains { substring: String } for str;
    check(self, input) {
        if input.contains(self.substring.as_str()) {
            Ok(())
        } else {
            Err(pattern_error("contains", "The field {name} must contain '{pattern}'.", &self.substring))
        }
    }
    new(substring: impl Into<String>) { Self { substring: substring.into() } }
}

crate::validator! {
    /// Starts with `prefix`.
    pub StartsWith { prefix: String } for str;
    check(self, input) {
        if input.starts_with(self.prefix.as_str()) {
            Ok(())
        } else {
            Err(pattern_error("starts_with", "The field {name} must start with '{pattern}'.", &self.prefix))
        }
    }
    new(prefix: impl Into<String>) { Self { prefix: prefix.into() } }
}

crate::validator! {
    /// Ends with `suffix`.
    pub EndsWith { suffix: String } for str;
    check(self, input) {
        if input.ends_with(self.suffix.as_str()) {
            Ok(())
        } else {
            Err(pattern_error("ends_with", "The field {name} must end with '{pattern}'.", &self.suffix))
        }
    }
    new(suffix: impl Into<String>) { Self { suffix: suffix.into() } }
}

crate::validator! {
    /// Letters and digits only.
    pub Alphanumeric for str;
    check(input) {
        if input.chars().all(char::is_alphanumeric) {
            Ok(())
        } else {
            Err(ValidationError::invalid_format("alphanumeric", "alphanumeric value"))
        }
    }
}

crate::validator! {
    /// Matches a regular expression anywhere in the input.
    pub MatchesRegex { pattern: Regex } for str;
    check(self, input) {
        if self.pattern.is_match(input) {
            Ok(())
        } else {
            Err(pattern_error("matches_regex", "The field {name} must match '{pattern}'.", self.pattern.as_str()))
        }
    }
}

impl MatchesRegex {
    /// Compiles `pattern`.
    pub fn parse(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Self::new)
    }
}

// ============================================================================
// FORMATS
// ============================================================================

fn is_domain_label(label: &str) -> bool {
    !label.is_empty()
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

fn is_email(input: &str) -> bool {
    let Some((local, domain)) = input.split_once('@') else {
        return false;
    };
    let local_ok = !local.is_empty()
        && !local.starts_with('.')
        && !local.ends_with('.')
        && !local.contains("..")
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "!#$%&'*+-/=?^_`{|}~.".contains(c));
    let mut labels = domain.split('.');
    let tld_ok = domain
        .rsplit('.')
        .next()
        .is_some_and(|tld| tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic()));
    local_ok && domain.contains('.') && tld_ok && labels.all(is_domain_label)
}

crate::validator! {
    /// An e-mail address with a dotted domain, e.g. `a@b.com`.
    pub Email for str;
    check(input) {
        if is_email(input) {
            Ok(())
        } else {
            Err(ValidationError::invalid_format("email", "e-mail address"))
        }
    }
}

fn is_user_name(input: &str) -> bool {
    !input.is_empty()
        && !input.starts_with('_')
        && !input.ends_with('_')
        && !input.contains("__")
        && input.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

crate::validator! {
    /// ASCII letters, digits and single inner underscores, e.g. `good_name`.
    pub UserName for str;
    check(input) {
        if is_user_name(input) {
            Ok(())
        } else {
            Err(ValidationError::invalid_format("user_name", "user name"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::Validate;
    use rstest::rstest;

    #[rstest]
    #[case("a@b.com", true)]
    #[case("first.last+tag@mail.example.org", true)]
    #[case("a@b", false)]
    #[case("@b.com", false)]
    #[case("a@-b.com", false)]
    #[case("a@b.c0m", false)]
    #[case("a..b@c.com", false)]
    #[case("plain", false)]
    fn email(#[case] input: &str, #[case] ok: bool) {
        assert_eq!(Email.validate(input).is_ok(), ok);
    }

    #[rstest]
    #[case("good_name", true)]
    #[case("abc123", true)]
    #[case("bad__name", false)]
    #[case("_lead", false)]
    #[case("trail_", false)]
    #[case("sp ace", false)]
    #[case("", false)]
    fn user_name(#[case] input: &str, #[case] ok: bool) {
        assert_eq!(UserName.validate(input).is_ok(), ok);
    }

    #[test]
    fn substrings() {
        assert!(Contains::new("@").validate("a@b").is_ok());
        assert_eq!(Contains::new("x").validate("abc").unwrap_err().param("pattern"), Some("x"));
        assert!(StartsWith::new("ab").validate("abc").is_ok());
        assert!(EndsWith::new("bc").validate("abd").is_err());
        assert!(Alphanumeric.validate("a1").is_ok());
        assert!(Alphanumeric.validate("a-1").is_err());
    }

    #[test]
    fn regex() {
        let digits = MatchesRegex::parse(r"^\d+$").unwrap();
        assert!(digits.validate("123").is_ok());
        assert_eq!(digits.validate("12a").unwrap_err().param("pattern"), Some(r"^\d+$"));
        assert!(MatchesRegex::parse("(").is_err());
    }
}
