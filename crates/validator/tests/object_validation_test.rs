//! End-to-end object validation: properties, nesting, collections, paths.

use std::collections::HashMap;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use vigil_validator::prelude::*;

#[derive(Debug, Clone)]
struct Address {
    postcode: String,
    city: Option<String>,
}

#[derive(Debug, Clone)]
struct Order {
    amount: f64,
}

#[derive(Debug, Clone)]
struct Customer {
    id: u32,
    name: Option<String>,
    email: String,
    address: Option<Address>,
    orders: Vec<Order>,
}

fn valid_customer() -> Customer {
    Customer {
        id: 7,
        name: Some("Ada".into()),
        email: "ada@example.com".into(),
        address: Some(Address {
            postcode: "12345".into(),
            city: Some("Berlin".into()),
        }),
        orders: vec![Order { amount: 5.0 }],
    }
}

fn broken_customer() -> Customer {
    Customer {
        id: 0,
        name: None,
        email: "not-an-email".into(),
        address: Some(Address {
            postcode: "12".into(),
            city: Some("Berlin".into()),
        }),
        orders: vec![Order { amount: 5.0 }, Order { amount: 0.0 }],
    }
}

fn customer_validator() -> ObjectValidator<Customer> {
    let mut v = ObjectValidator::<Customer>::new();
    v.rule_for("Id", |c: &Customer| &c.id).greater_than(0_u32);
    v.rule_for("Name", |c: &Customer| &c.name).required().length(2, 20);
    v.rule_for("Email", |c: &Customer| &c.email)
        .email()
        .when(|email: &String| !email.is_empty());
    v.rule_for("Address", |c: &Customer| &c.address)
        .child_rules(|a: &mut ObjectValidator<Address>| {
            a.rule_for("Postcode", |a: &Address| &a.postcode).exact_length(5);
            a.rule_for("City", |a: &Address| &a.city).required();
        })
        .unwrap();
    v.rule_for_collection("Orders", |c: &Customer| &c.orders)
        .child_rules(|o| {
            o.rule_for("Amount", |o: &Order| &o.amount).greater_than(0.0);
        })
        .unwrap();
    v
}

fn members(errors: &ValidationErrors) -> Vec<&str> {
    errors.iter().filter_map(ValidationError::member).collect()
}

#[test]
fn valid_instance_has_no_failures() {
    let v = customer_validator();
    assert!(v.get_failures(&valid_customer()).is_none());
    assert!(v.validate(&valid_customer()).is_ok());
}

#[test]
fn failures_carry_full_member_paths() {
    let errors = customer_validator().get_failures(&broken_customer()).unwrap();
    assert_eq!(
        members(&errors),
        vec!["Id", "Name", "Email", "Address.Postcode", "Orders[1].Amount"]
    );
    assert_eq!(errors.messages()[1], "The Name field is required.");
}

#[test]
fn absent_nested_object_is_skipped() {
    let mut customer = valid_customer();
    customer.address = None;
    assert!(customer_validator().is_valid(&customer));
}

#[test]
fn fail_fast_reports_only_the_first_failure() {
    let mut v = customer_validator();
    v.use_mode(ValidationMode::FailFast);
    let errors = v.get_failures(&broken_customer()).unwrap();
    assert_eq!(members(&errors), vec!["Id"]);
}

#[test]
fn any_mode_passes_when_one_property_passes() {
    let mut v = ObjectValidator::<Customer>::new();
    v.use_mode(ValidationMode::Any);
    v.rule_for("Id", |c: &Customer| &c.id).greater_than(100_u32);
    v.rule_for("Email", |c: &Customer| &c.email).email();
    assert!(v.is_valid(&valid_customer()));

    let errors = v.get_failures(&broken_customer()).unwrap();
    assert_eq!(members(&errors), vec!["Id", "Email"]);
}

#[test]
fn repairing_under_a_parent_prefix_is_idempotent() {
    let mut errors = customer_validator().get_failures(&broken_customer()).unwrap();
    errors.repair(Some("Customer"));
    let once: Vec<String> = members(&errors).into_iter().map(str::to_owned).collect();
    errors.repair(Some("Customer"));
    assert_eq!(members(&errors), once);
    assert_eq!(once[3], "Customer.Address.Postcode");
    assert_eq!(once[4], "Customer.Orders[1].Amount");
}

#[test]
fn validate_surfaces_the_first_failure() {
    let err = customer_validator().validate(&broken_customer()).unwrap_err();
    let failure = err.as_validation().unwrap();
    assert_eq!(failure.member(), Some("Id"));
    assert_eq!(failure.attempted_value.as_deref(), Some("0"));
}

#[test]
fn a_second_nested_validator_is_rejected() {
    let mut v = ObjectValidator::<Customer>::new();
    let address = v.rule_for("Address", |c: &Customer| &c.address);
    address.set_validator(ObjectValidator::<Address>::new()).unwrap();
    let err = address.set_validator(ObjectValidator::<Address>::new()).unwrap_err();
    assert!(matches!(err, Error::NestedValidatorAlreadySet { .. }));
    assert!(err.to_string().contains("Address"));
}

#[test]
fn display_names_and_message_overrides() {
    let mut v = ObjectValidator::<Customer>::new();
    v.rule_for("Name", |c: &Customer| &c.name)
        .with_display_name("Full name")
        .required();
    v.rule_for("Id", |c: &Customer| &c.id)
        .greater_than(0_u32)
        .with_message("{name} must be positive");
    let errors = v.get_failures(&broken_customer()).unwrap();
    assert_eq!(errors.messages(), vec!["The Full name field is required.", "Id must be positive"]);
}

#[test]
fn message_sources_translate_by_code_and_key() {
    let source: HashMap<&'static str, &'static str> = HashMap::from([
        ("required", "{name} fehlt."),
        ("customer.id", "Kundennummer {name} ist ungültig."),
    ]);
    let mut v = ObjectValidator::<Customer>::new();
    v.with_messages(Arc::new(source));
    v.rule_for("Name", |c: &Customer| &c.name).required();
    v.rule_for("Id", |c: &Customer| &c.id)
        .greater_than(0_u32)
        .with_message_key("customer.id");
    let errors = v.get_failures(&broken_customer()).unwrap();
    assert_eq!(errors.messages(), vec!["Name fehlt.", "Kundennummer Id ist ungültig."]);
}

#[test]
fn pre_processing_runs_before_rules() {
    let mut v = ObjectValidator::<Customer>::new();
    v.rule_for("Email", |c: &Customer| &c.email)
        .pre_process(|email: &String| email.trim().to_owned())
        .email();
    let mut customer = valid_customer();
    customer.email = "  ada@example.com  ".into();
    assert!(v.is_valid(&customer));
}

#[test]
fn collection_filters_keep_original_indices() {
    let mut v = ObjectValidator::<Customer>::new();
    v.rule_for_collection("Orders", |c: &Customer| &c.orders)
        .filter(|o: &Order| o.amount < 100.0)
        .child_rules(|o| {
            o.rule_for("Amount", |o: &Order| &o.amount).greater_than(1.0);
        })
        .unwrap();
    let mut customer = valid_customer();
    customer.orders = vec![Order { amount: 500.0 }, Order { amount: 0.5 }];
    let errors = v.get_failures(&customer).unwrap();
    assert_eq!(members(&errors), vec!["Orders[1].Amount"]);
}

#[test]
fn collection_level_rules_run_before_elements() {
    let mut v = ObjectValidator::<Customer>::new();
    v.rule_for_collection("Orders", |c: &Customer| &c.orders)
        .max_size::<Order>(1)
        .child_rules(|o| {
            o.rule_for("Amount", |o: &Order| &o.amount).greater_than(0.0);
        })
        .unwrap();
    let errors = v.get_failures(&broken_customer()).unwrap();
    let codes: Vec<_> = errors.iter().map(|e| e.code.as_ref()).collect();
    assert_eq!(codes, vec!["max_size", "greater_than"]);
    assert_eq!(members(&errors), vec!["Orders", "Orders[1].Amount"]);
}

#[test]
fn context_sees_the_instance_being_validated() {
    let mut v = ObjectValidator::<Customer>::new();
    v.rule_for("Email", |c: &Customer| &c.email).must_with(|email, ctx| {
        ctx.instance::<Customer>()
            .and_then(|c| c.name.as_deref())
            .is_none_or(|name| !email.contains(&name.to_lowercase()))
    });
    assert!(!v.is_valid(&valid_customer()));
    let mut other = valid_customer();
    other.email = "info@example.com".into();
    assert!(v.is_valid(&other));
}

#[test]
fn services_are_resolved_from_the_request() {
    struct Blocklist(Vec<&'static str>);

    let mut v = ObjectValidator::<Customer>::new();
    v.rule_for("Email", |c: &Customer| &c.email).must_with(|email, ctx| {
        ctx.resolve::<Blocklist>()
            .is_none_or(|list| !list.0.iter().any(|domain| email.ends_with(domain)))
    });
    let ctx = ValidationContext::builder()
        .resolver(Services::new().with(Blocklist(vec!["example.com"])).into_resolver())
        .build();
    assert!(v.is_valid(&valid_customer()));
    assert!(!v.is_valid_with(&valid_customer(), &ctx));
}

#[test]
fn options_loaded_from_json_configure_the_validator() {
    let options = ValidatorOptions::from_json(r#"{"mode":"fail_fast","default_rule_sets":["create"]}"#).unwrap();
    let mut v = ObjectValidator::<Customer>::with_options(&options);
    v.rule_for("Id", |c: &Customer| &c.id).greater_than(0_u32);
    v.rule_set("create", |v| {
        v.rule_for("Name", |c: &Customer| &c.name).required();
        Ok(())
    })
    .unwrap();

    let mut customer = valid_customer();
    customer.name = None;
    let errors = v.get_failures(&customer).unwrap();
    assert_eq!(members(&errors), vec!["Name"]);
    assert!(v.is_valid_for(&customer, "update"));
}

#[derive(Debug, Clone, Copy)]
struct WithinQuota;

impl ContextualValidator for WithinQuota {
    type Input = [Order];

    fn validate_with_context(&self, orders: &[Order], ctx: &ValidationContext<'_>) -> Result<(), ValidationError> {
        let quota = ctx.get::<usize>("order_quota").copied().unwrap_or(usize::MAX);
        if orders.len() <= quota {
            Ok(())
        } else {
            Err(ValidationError::new("quota", "{name} exceeds the quota of {quota}.").with_param("quota", quota.to_string()))
        }
    }
}

#[test]
fn contextual_leaves_read_the_item_bag() {
    let mut v = ObjectValidator::<Customer>::new();
    v.rule_for("Orders", |c: &Customer| &c.orders).rule_with_context(WithinQuota);
    let ctx = ValidationContext::builder().with("order_quota", 1_usize).build();

    assert!(v.is_valid(&broken_customer()));
    let errors = v.get_failures_with(&broken_customer(), &ctx).unwrap();
    assert_eq!(errors.messages(), vec!["Orders exceeds the quota of 1."]);
}

// ============================================================================
// MODES ACROSS STEPS
// ============================================================================

#[test]
fn fail_fast_covers_the_child_validator() {
    let mut v = ObjectValidator::<Customer>::new();
    v.use_mode(ValidationMode::FailFast);
    v.rule_for("Id", |c: &Customer| &c.id).greater_than(0_u32);
    v.child_rules(|c| {
        c.rule_for("Name", |c: &Customer| &c.name).required();
    })
    .unwrap();

    let errors = v.get_failures(&broken_customer()).unwrap();
    assert_eq!(members(&errors), vec!["Id"]);

    let mut customer = broken_customer();
    customer.id = 1;
    let errors = v.get_failures(&customer).unwrap();
    assert_eq!(members(&errors), vec!["Name"]);
}

#[test]
fn fail_fast_covers_the_annotation_pass() {
    let bridge = Annotations::new()
        .register(|c: &Customer, _: &AnnotationRequest<'_>| {
            c.name
                .is_none()
                .then(|| ValidationError::required().with_member("Name"))
                .into_iter()
                .collect::<Vec<_>>()
        })
        .into_bridge();
    let mut v = ObjectValidator::<Customer>::new();
    v.with_annotations(bridge).use_mode(ValidationMode::FailFast);
    v.rule_for("Id", |c: &Customer| &c.id).greater_than(0_u32);

    let errors = v.get_failures(&broken_customer()).unwrap();
    assert_eq!(members(&errors), vec!["Name"]);
    assert_eq!(errors.first().map(|e| e.code.as_ref()), Some("required"));
}

#[derive(Debug, Clone)]
struct Basket {
    tags: Vec<Option<String>>,
}

#[test]
fn guards_on_a_collection_skip_its_elements() {
    let mut v = ObjectValidator::<Basket>::new();
    v.rule_for_collection("Tags", |b: &Basket| &b.tags)
        .each_rules(|r| {
            r.required();
        })
        .unwrap()
        .when(|tags: &Vec<Option<String>>| tags.len() > 5);

    assert!(v.get_failures(&Basket { tags: vec![None] }).is_none());
    let crowded = Basket { tags: vec![None; 6] };
    assert_eq!(v.get_failures(&crowded).map(|e| e.len()), Some(6));
}

#[test]
fn pre_processing_a_collection_feeds_its_elements() {
    let mut v = ObjectValidator::<Basket>::new();
    v.rule_for_collection("Tags", |b: &Basket| &b.tags)
        .pre_process(|tags: &Vec<Option<String>>| tags.iter().filter(|t| t.is_some()).cloned().collect())
        .each_rules(|r| {
            r.min_length(2);
        })
        .unwrap();

    assert!(v.is_valid(&Basket { tags: vec![None, Some("ok".into())] }));
    let errors = v.get_failures(&Basket { tags: vec![None, Some("x".into())] }).unwrap();
    assert_eq!(members(&errors), vec!["Tags[0]"]);
}

#[test]
fn fail_fast_on_a_collection_stops_before_elements() {
    let mut v = ObjectValidator::<Basket>::new();
    v.rule_for_collection("Tags", |b: &Basket| &b.tags)
        .min_size::<Option<String>>(3)
        .each_rules(|r| {
            r.required();
        })
        .unwrap()
        .use_mode(ValidationMode::FailFast);

    let errors = v.get_failures(&Basket { tags: vec![None, None] }).unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.first().map(|e| e.code.as_ref()), Some("min_size"));
}
