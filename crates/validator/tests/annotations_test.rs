//! Annotation passes merged with custom rules, and validator proxies.

use std::any::Any;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use vigil_validator::prelude::*;

#[derive(Debug)]
struct Signup {
    email: String,
    name: String,
    age: u8,
}

fn signup(email: &str, name: &str, age: u8) -> Signup {
    Signup {
        email: email.to_owned(),
        name: name.to_owned(),
        age,
    }
}

fn annotations() -> Arc<dyn AnnotationValidator> {
    Annotations::new()
        .register(|s: &Signup, _: &AnnotationRequest<'_>| {
            let mut errors = Vec::new();
            if s.email.is_empty() {
                errors.push(ValidationError::required().with_member("Email").with_message("Email is required."));
            }
            if s.name.is_empty() {
                errors.push(ValidationError::required().with_member("Name").with_message("Name is required."));
            }
            errors
        })
        .into_bridge()
}

fn validator() -> ObjectValidator<Signup> {
    let mut v = ObjectValidator::<Signup>::new();
    v.with_annotations(annotations());
    v.rule_for("Name", |s: &Signup| &s.name).min_length(2);
    v.rule_for("Age", |s: &Signup| &s.age).min(18_u8);
    v
}

fn members(errors: &ValidationErrors) -> Vec<&str> {
    errors.iter().filter_map(ValidationError::member).collect()
}

#[test]
fn annotation_failures_come_first_and_skip_declared_members() {
    let errors = validator().get_failures(&signup("", "", 30)).unwrap();
    assert_eq!(members(&errors), vec!["Email", "Name"]);
    assert_eq!(errors.first().map(|e| e.code.as_ref()), Some("required"));
    assert_eq!(errors.errors()[1].code, "min_length");
}

#[test]
fn inactive_properties_leave_their_annotations_in() {
    let mut v = ObjectValidator::<Signup>::new();
    v.with_annotations(annotations());
    v.rule_set("strict", |v| {
        v.rule_for("Name", |s: &Signup| &s.name).min_length(2);
        Ok(())
    })
    .unwrap();
    let sample = signup("", "", 30);
    assert_eq!(members(&v.get_failures(&sample).unwrap()), vec!["Email", "Name"]);
    let strict = v.get_failures_for(&sample, "strict").unwrap();
    let codes: Vec<_> = strict.iter().map(|e| e.code.as_ref()).collect();
    assert_eq!(codes, vec!["required", "min_length"]);
}

#[test]
fn suppression_turns_the_pass_off() {
    let mut v = validator();
    v.suppress_annotation_validation();
    let errors = v.get_failures(&signup("", "", 30)).unwrap();
    assert_eq!(members(&errors), vec!["Name"]);
}

#[test]
fn validate_all_properties_off_stops_at_the_first_annotation() {
    let mut v = ObjectValidator::<Signup>::new();
    v.with_annotations(annotations()).validate_all_properties(false);
    v.rule_for("Age", |s: &Signup| &s.age).min(18_u8);
    let errors = v.get_failures(&signup("", "", 10)).unwrap();
    assert_eq!(members(&errors), vec!["Email", "Age"]);
}

#[test]
fn bridge_can_come_from_the_request_context() {
    let mut v = ObjectValidator::<Signup>::new();
    v.rule_for("Age", |s: &Signup| &s.age).min(18_u8);
    let ctx = ValidationContext::builder().annotations(annotations()).build();
    let errors = v.get_failures_with(&signup("", "ada", 30), &ctx).unwrap();
    assert_eq!(members(&errors), vec!["Email"]);
    assert!(v.is_valid(&signup("", "ada", 30)));
}

#[test]
fn bridge_errors_become_failures() {
    fn failing(value: &dyn Any, _: &AnnotationRequest<'_>) -> Result<Option<ValidationErrors>, Error> {
        if value.is::<Signup>() {
            Err(Error::EmptyArgument("schema"))
        } else {
            Ok(None)
        }
    }

    let mut v = ObjectValidator::<Signup>::new();
    v.with_annotations(Arc::new(failing));
    let errors = v.get_failures(&signup("a@b.com", "ada", 30)).unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.errors()[0].code, "engine_fault");
}

#[test]
fn a_proxy_serves_as_the_annotation_layer() {
    let mut declared = ObjectValidator::<Signup>::new();
    declared.rule_for("Email", |s: &Signup| &s.email).email();
    declared.rule_for("Name", |s: &Signup| &s.name).not_empty();
    let proxy: Arc<dyn AnnotationValidator> = Arc::new(ValidatorProxy::new(declared));

    let mut v = ObjectValidator::<Signup>::new();
    v.with_annotations(proxy);
    v.rule_for("Name", |s: &Signup| &s.name).min_length(2);

    let errors = v.get_failures(&signup("nope", "", 30)).unwrap();
    let codes: Vec<_> = errors.iter().map(|e| e.code.as_ref()).collect();
    assert_eq!(members(&errors), vec!["Email", "Name"]);
    assert_eq!(codes, vec!["email", "min_length"]);
}

#[test]
fn proxies_cache_shared_targets() {
    let mut declared = ObjectValidator::<Signup>::new();
    declared.rule_for("Age", |s: &Signup| &s.age).min(18_u8);
    let proxy = ValidatorProxy::new(declared);

    let target = Arc::new(signup("a@b.com", "ada", 10));
    let first = proxy.validate(&target);
    let second = proxy.validate(&target);
    assert_eq!(first, second);
    assert_eq!(proxy.cached(), 1);
    assert!(proxy.validate_value(&signup("a@b.com", "ada", 30)).is_none());
}

#[test]
fn erased_validators_share_one_collection() {
    let mut signups = ObjectValidator::<Signup>::new();
    signups.rule_for("Age", |s: &Signup| &s.age).min(18_u8);
    let mut names = ValueValidator::<String>::new();
    names.not_empty();

    let erased = [erase::<Signup, _>(signups), erase::<String, _>(names)];
    let ctx = ValidationContext::new();
    let young: &dyn Any = &signup("", "", 3);
    let outcomes: Vec<_> = erased.iter().map(|v| v.validate_dyn(young, &ctx).map(|r| r.is_some())).collect();
    assert!(matches!(outcomes[0], Ok(true)));
    assert!(matches!(outcomes[1], Err(Error::TypeMismatch { .. })));
}
