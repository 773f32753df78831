use proptest::prelude::*;
use serde_json::{Value, json};

use willform_spec::{
    AnswerStore, AnswerValue, Condition, Conditions, FieldKind, FieldSpec, Scalar, SectionSpec,
    contains_placeholder, interpolate, is_section_complete,
};

const KEYS: [&str; 6] = [
    "maritalStatus",
    "guardiansSection",
    "guardianData",
    "partnerData",
    "firstName",
    "wishes",
];

fn key() -> impl Strategy<Value = String> {
    prop::sample::select(KEYS.to_vec()).prop_map(str::to_string)
}

fn scalar_json() -> impl Strategy<Value = Value> {
    prop_oneof![
        "[a-z]{0,6}".prop_map(Value::from),
        any::<i32>().prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
        Just(Value::Null),
    ]
}

fn answer_json() -> impl Strategy<Value = Value> {
    prop_oneof![
        scalar_json(),
        prop::collection::vec("[a-z{}:]{0,8}".prop_map(Value::from), 0..3).prop_map(Value::from),
        prop::collection::vec(
            prop::collection::btree_map("[a-zA-Z]{1,6}", scalar_json(), 0..3),
            0..3
        )
        .prop_map(|records| json!(records)),
    ]
}

fn answers() -> impl Strategy<Value = AnswerStore> {
    prop::collection::btree_map(key(), answer_json(), 0..5).prop_map(|map| {
        AnswerStore::from_value(json!(map)).expect("any object is an answer store")
    })
}

fn condition_json() -> impl Strategy<Value = Value> {
    let operator = prop::sample::select(vec!["eq", "in", "AND", "OR", "neq", "", "and"]);
    let leaf = (key(), operator, scalar_json())
        .prop_map(|(field, operator, value)| json!({"field": field, "operator": operator, "value": value}));
    leaf.prop_recursive(4, 24, 4, |inner| {
        prop_oneof![
            (prop::sample::select(vec!["AND", "OR", "XOR"]), prop::collection::vec(inner.clone(), 0..4))
                .prop_map(|(operator, clauses)| json!({"operator": operator, "clauses": clauses})),
            prop::collection::vec(inner, 0..4).prop_map(Value::from),
            Just(json!({"operator": "AND"})),
            Just(json!("eq")),
        ]
    })
}

fn template() -> impl Strategy<Value = String> {
    let fragment = prop_oneof![
        Just("{{field:".to_string()),
        Just("}}".to_string()),
        Just(":".to_string()),
        Just("{".to_string()),
        Just("fullDetails".to_string()),
        key(),
        "[a-z ,.]{0,6}",
    ];
    prop::collection::vec(fragment, 0..12).prop_map(|parts| parts.concat())
}

proptest! {
    #[test]
    fn evaluation_is_total_and_deterministic(raw in condition_json(), store in answers()) {
        let conditions: Conditions = serde_json::from_value(raw).expect("conditions always parse");
        let first = conditions.evaluate(&store);
        prop_assert_eq!(first, conditions.evaluate(&store));
    }

    #[test]
    fn unknown_operators_are_false(field in key(), value in scalar_json(), store in answers(),
                                   operator in "[a-zA-Z]{1,5}") {
        prop_assume!(!["eq", "in", "AND", "OR"].contains(&operator.as_str()));
        let condition = Condition::from(json!({"field": field, "operator": operator, "value": value}));
        prop_assert!(!condition.evaluate(&store));
    }

    #[test]
    fn output_never_contains_placeholders(template in template(), store in answers()) {
        let out = interpolate(&template, &store);
        prop_assert!(!contains_placeholder(&out));
    }

    #[test]
    fn interpolation_is_idempotent(template in template(), store in answers()) {
        let once = interpolate(&template, &store);
        prop_assert_eq!(interpolate(&once, &store), once);
    }

    #[test]
    fn checkbox_group_always_holds_a_list(
        events in prop::collection::vec(("[abc]", any::<bool>()), 0..20),
        initial in answer_json(),
    ) {
        let mut store = AnswerStore::from_value(json!({"wishes": initial})).expect("store");
        for (option, checked) in events {
            store.toggle_option("wishes", Scalar::from(option), checked);
            prop_assert!(matches!(store.get("wishes"), AnswerValue::List(_)));
        }
    }

    #[test]
    fn inactive_required_field_never_blocks(unrelated in answer_json(), status in "[a-z]{0,6}") {
        prop_assume!(status != "married");
        let section = SectionSpec::new("Partner", vec![
            FieldSpec::new("spouseName", FieldKind::Text, "Spouse")
                .required()
                .with_conditions(Condition::eq("maritalStatus", "married").into()),
        ]);
        let before = AnswerStore::new().with("maritalStatus", status.as_str());
        let mut after = before.clone();
        after.set("firstName", AnswerValue::from(unrelated));
        prop_assert!(is_section_complete(&section, &before));
        prop_assert!(is_section_complete(&section, &after));
    }
}
