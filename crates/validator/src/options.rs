//! Validator configuration
//!
//! Options can be built in code or loaded from JSON:
//!
//! ```json
//! { "mode": "fail_fast", "validate_all_properties": false, "default_rule_sets": ["create"] }
//! ```
//!
//! Missing keys take their defaults.

use serde::{Deserialize, Serialize};

use crate::combinators::composite::ValidationMode;
use crate::engine::RuleSets;

/// Settings applied by [`ObjectValidator::with_options`](crate::engine::ObjectValidator::with_options)
/// and [`ValidationContextBuilder::options`](crate::foundation::ValidationContextBuilder::options).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorOptions {
    /// How property results combine.
    pub mode: ValidationMode,
    /// Disables every annotation pass.
    pub suppress_annotation_validation: bool,
    /// Passed to the annotation layer; `false` lets it stop at the first
    /// invalid property.
    pub validate_all_properties: bool,
    /// Selector used when a call requests no rule sets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_rule_sets: Option<RuleSets>,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            mode: ValidationMode::All,
            suppress_annotation_validation: false,
            validate_all_properties: true,
            default_rule_sets: None,
        }
    }
}

impl ValidatorOptions {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_keys_use_defaults() {
        let options = ValidatorOptions::from_json("{}").unwrap();
        assert_eq!(options, ValidatorOptions::default());
        assert!(options.validate_all_properties);
    }

    #[test]
    fn loads_every_field() {
        let options = ValidatorOptions::from_json(
            r#"{"mode":"any","suppress_annotation_validation":true,"validate_all_properties":false,"default_rule_sets":["create","admin"]}"#,
        )
        .unwrap();
        assert_eq!(options.mode, ValidationMode::Any);
        assert!(options.suppress_annotation_validation);
        assert!(!options.validate_all_properties);
        assert_eq!(options.default_rule_sets, Some(RuleSets::from(["create", "admin"])));
    }

    #[test]
    fn rejects_unknown_modes() {
        assert!(ValidatorOptions::from_json(r#"{"mode":"sometimes"}"#).is_err());
    }

    #[test]
    fn serializes_without_empty_selector() {
        let json = ValidatorOptions::default().to_json().unwrap();
        assert!(!json.contains("default_rule_sets"));
    }
}
