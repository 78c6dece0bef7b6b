//! Property tests for the parameter codec.

use netmock::codec::{decode, encode, is_valid_params, params_from_json, params_to_json};
use netmock::{ParamValue, Params};
use proptest::collection::vec;
use proptest::prelude::*;

fn key() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 _.~/&=%+\\[\\]-]{1,8}"
}

fn text() -> impl Strategy<Value = String> {
    "\\PC{0,12}"
}

fn leaf() -> impl Strategy<Value = ParamValue> {
    prop_oneof![
        Just(ParamValue::Null),
        text().prop_map(ParamValue::String),
        vec(text(), 2..5).prop_map(ParamValue::Set),
        vec(text(), 1..5).prop_map(ParamValue::Array),
    ]
}

fn dict<S: Strategy<Value = ParamValue>>(values: S) -> impl Strategy<Value = Params> {
    vec((key(), values), 1..5).prop_map(|entries| entries.into_iter().collect())
}

fn value() -> impl Strategy<Value = ParamValue> {
    prop_oneof![
        3 => leaf(),
        1 => dict(leaf()).prop_map(ParamValue::Dict),
        1 => dict(prop_oneof![leaf(), dict(leaf()).prop_map(ParamValue::Dict)])
            .prop_map(ParamValue::Dict),
    ]
}

/// Like `value`, but also produces the shapes the codec cannot carry: empty
/// and single-element sets, empty arrays and empty dictionaries.
fn any_value() -> impl Strategy<Value = ParamValue> {
    let any_leaf = prop_oneof![
        Just(ParamValue::Null),
        text().prop_map(ParamValue::String),
        vec(text(), 0..4).prop_map(ParamValue::Set),
        vec(text(), 0..4).prop_map(ParamValue::Array),
    ];
    any_leaf.prop_recursive(2, 12, 3, |inner| {
        vec((key(), inner), 0..3)
            .prop_map(|entries| ParamValue::Dict(entries.into_iter().collect()))
    })
}

fn params() -> impl Strategy<Value = Params> {
    vec((key(), value()), 0..6).prop_map(|entries| entries.into_iter().collect())
}

proptest! {
    #[test]
    fn decode_inverts_encode(params in params()) {
        prop_assert!(is_valid_params(&params));
        let encoded = encode(&params);
        let decoded = decode(&encoded);
        prop_assert_eq!(decoded, Ok(params));
    }

    #[test]
    fn validity_agrees_with_round_trip(
        params in vec((key(), any_value()), 0..5)
            .prop_map(|entries| entries.into_iter().collect::<Params>())
    ) {
        let round_trips = decode(&encode(&params)).as_ref() == Ok(&params);
        prop_assert_eq!(is_valid_params(&params), round_trips);
    }

    #[test]
    fn decode_never_panics(input in "\\PC{0,40}") {
        let _ = decode(&input);
    }

    #[test]
    fn json_conversion_keeps_strings_and_arrays(params in params()) {
        let json = params_to_json(&params);
        let back = params_from_json(&json).unwrap();
        prop_assert_eq!(back.len(), params.len());
        for (key, value) in &params {
            let converted = &back[key];
            match value {
                ParamValue::String(s) => prop_assert_eq!(converted.as_str(), Some(s.as_str())),
                ParamValue::Null => prop_assert!(converted.is_null()),
                _ => {}
            }
        }
    }
}
