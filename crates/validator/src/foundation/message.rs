//! Message templates and localisation
//!
//! Templates use `{name}` for the display name of the validated member and
//! `{key}` for any failure parameter. Unknown placeholders are left as-is.

use std::borrow::Cow;
use std::collections::HashMap;

use tracing::warn;

use crate::foundation::ValidationError;

/// Display name used when no member name is known.
pub const DEFAULT_DISPLAY_NAME: &str = "Value";

/// A user supplied message override for one rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorMessage {
    /// Literal template.
    Literal(Cow<'static, str>),
    /// Key looked up in the context's [`MessageSource`].
    Resource(Cow<'static, str>),
}

impl ErrorMessage {
    pub fn literal(template: impl Into<Cow<'static, str>>) -> Self {
        Self::Literal(template.into())
    }

    pub fn resource(key: impl Into<Cow<'static, str>>) -> Self {
        Self::Resource(key.into())
    }
}

impl From<&'static str> for ErrorMessage {
    fn from(template: &'static str) -> Self {
        Self::Literal(Cow::Borrowed(template))
    }
}

impl From<String> for ErrorMessage {
    fn from(template: String) -> Self {
        Self::Literal(Cow::Owned(template))
    }
}

/// Localised message templates keyed by failure code or resource key.
pub trait MessageSource: Send + Sync {
    fn lookup(&self, key: &str) -> Option<Cow<'_, str>>;
}

impl MessageSource for HashMap<String, String> {
    fn lookup(&self, key: &str) -> Option<Cow<'_, str>> {
        self.get(key).map(|s| Cow::Borrowed(s.as_str()))
    }
}

impl MessageSource for HashMap<&'static str, &'static str> {
    fn lookup(&self, key: &str) -> Option<Cow<'_, str>> {
        self.get(key).map(|s| Cow::Borrowed(*s))
    }
}

/// Substitutes `{name}` and parameter placeholders in `template`.
pub fn render(template: &str, name: &str, params: &[(Cow<'static, str>, Cow<'static, str>)]) -> String {
    let mut out = String::with_capacity(template.len() + name.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };
        let key = &after[..close];
        if key == "name" {
            out.push_str(name);
        } else if let Some((_, value)) = params.iter().find(|(k, _)| k == key) {
            out.push_str(value);
        } else {
            out.push('{');
            out.push_str(key);
            out.push('}');
        }
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    out
}

/// Formats the built-in message of `error`, preferring a localised template
/// registered under its code.
pub(crate) fn localize(error: &mut ValidationError, name: &str, source: Option<&dyn MessageSource>) {
    let template = source.and_then(|s| s.lookup(&error.code));
    let rendered = match template {
        Some(template) => render(&template, name, &error.params),
        None => render(&error.message, name, &error.params),
    };
    error.message = Cow::Owned(rendered);
}

/// Applies a user override to an already formatted failure.
pub(crate) fn apply_override(
    error: &mut ValidationError,
    message: &ErrorMessage,
    name: &str,
    source: Option<&dyn MessageSource>,
) {
    match message {
        ErrorMessage::Literal(template) => {
            error.message = Cow::Owned(render(template, name, &error.params));
        }
        ErrorMessage::Resource(key) => match source.and_then(|s| s.lookup(key)) {
            Some(template) => error.message = Cow::Owned(render(&template, name, &error.params)),
            None => warn!(key = %key, "message resource not found, keeping rule message"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("The field {name} is bad", "The field Id is bad")]
    #[case("{name}: {min}..{max}", "Id: 3..10")]
    #[case("keep {unknown}", "keep {unknown}")]
    #[case("dangling {name", "dangling {name")]
    #[case("no placeholders", "no placeholders")]
    fn renders_templates(#[case] template: &str, #[case] expected: &str) {
        let params = vec![(Cow::Borrowed("min"), Cow::Borrowed("3")), (Cow::Borrowed("max"), Cow::Borrowed("10"))];
        assert_eq!(render(template, "Id", &params), expected);
    }

    #[test]
    fn localize_prefers_source_template() {
        let mut source = HashMap::new();
        source.insert("required".to_string(), "{name} fehlt".to_string());
        let mut error = ValidationError::required();
        localize(&mut error, "Name", Some(&source));
        assert_eq!(error.message, "Name fehlt");
    }

    #[test]
    fn missing_resource_keeps_message() {
        let source: HashMap<String, String> = HashMap::new();
        let mut error = ValidationError::new("x", "original");
        apply_override(&mut error, &ErrorMessage::resource("nope"), "Id", Some(&source));
        assert_eq!(error.message, "original");
    }
}
