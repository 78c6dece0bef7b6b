//! Tests for the parameter codec.

use super::*;
use serde_json::json;

fn params<const N: usize>(entries: [(&str, ParamValue); N]) -> Params {
    entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

#[test]
fn test_decode_grammar() {
    assert_eq!(decode("A=a").unwrap(), params([("A", "a".into())]));
    assert_eq!(
        decode("A=a&B=b").unwrap(),
        params([("A", "a".into()), ("B", "b".into())])
    );
    assert_eq!(
        decode("A=a&A=b").unwrap(),
        params([("A", ParamValue::set(["a", "b"]))])
    );
    assert_eq!(
        decode("A[]=a").unwrap(),
        params([("A", ParamValue::array(["a"]))])
    );
    assert_eq!(
        decode("A[]=a&A[]=b").unwrap(),
        params([("A", ParamValue::array(["a", "b"]))])
    );
    assert_eq!(
        decode("A[B]=a&A[C]=b").unwrap(),
        params([(
            "A",
            ParamValue::dict([("B", "a".into()), ("C", "b".into())])
        )])
    );
    assert_eq!(
        decode("A[B]=a&A[B]=b").unwrap(),
        params([("A", ParamValue::dict([("B", ParamValue::set(["a", "b"]))]))])
    );
}

#[test]
fn test_decode_null_is_distinct_from_empty() {
    let decoded = decode("flag&empty=").unwrap();
    assert_eq!(decoded["flag"], ParamValue::Null);
    assert_eq!(decoded["empty"], ParamValue::String(String::new()));
}

#[test]
fn test_decode_percent_and_plus() {
    let decoded = decode("q=hello+world&sym=%26%3D%2B&k%5Bx%5D=1").unwrap();
    assert_eq!(decoded["q"].as_str(), Some("hello world"));
    assert_eq!(decoded["sym"].as_str(), Some("&=+"));
    // Escaped brackets are part of the name, not nesting.
    assert_eq!(decoded["k[x]"].as_str(), Some("1"));
}

#[test]
fn test_decode_failures() {
    assert!(matches!(
        decode("a=%zz"),
        Err(CodecError::MalformedPercent(_))
    ));
    assert!(matches!(decode("a=%4"), Err(CodecError::MalformedPercent(_))));
    assert!(matches!(decode("a=%C3%28"), Err(CodecError::InvalidUtf8(_))));
    assert!(matches!(
        decode("a[b=1"),
        Err(CodecError::MismatchedBrackets(_))
    ));
    assert!(matches!(
        decode("a]=1"),
        Err(CodecError::MismatchedBrackets(_))
    ));
    assert!(matches!(
        decode("a[][b]=1"),
        Err(CodecError::MismatchedBrackets(_))
    ));
    assert!(matches!(decode("=1"), Err(CodecError::EmptyKey(_))));
    assert!(matches!(decode("a=1&a[]=2"), Err(CodecError::Conflict(_))));
    assert!(matches!(decode("a[]"), Err(CodecError::MissingValue(_))));
}

#[test]
fn test_decode_skips_empty_pairs() {
    let decoded = decode("a=1&&b=2&").unwrap();
    assert_eq!(decoded.len(), 2);
    assert!(decode("").unwrap().is_empty());
}

#[test]
fn test_encode_preserves_insertion_order_and_escapes() {
    let p = params([
        ("zeta", "1".into()),
        ("alpha", "a b&c".into()),
        ("flag", ParamValue::Null),
    ]);
    assert_eq!(encode(&p), "zeta=1&alpha=a%20b%26c&flag");
}

#[test]
fn test_encode_nested_shapes() {
    let p = params([
        ("list", ParamValue::array(["x", "y"])),
        (
            "user",
            ParamValue::dict([
                ("name", "Ann".into()),
                ("tags", ParamValue::set(["a", "b"])),
            ]),
        ),
    ]);
    assert_eq!(
        encode(&p),
        "list[]=x&list[]=y&user[name]=Ann&user[tags]=a&user[tags]=b"
    );
}

#[test]
fn test_encode_escapes_brackets_inside_names() {
    let p = params([("a[b]", "1".into())]);
    let encoded = encode(&p);
    assert_eq!(encoded, "a%5Bb%5D=1");
    assert_eq!(decode(&encoded).unwrap(), p);
}

#[test]
fn test_set_equality_ignores_order() {
    assert_eq!(ParamValue::set(["a", "b"]), ParamValue::set(["b", "a"]));
    assert_ne!(ParamValue::set(["a", "b"]), ParamValue::array(["a", "b"]));
    assert_ne!(ParamValue::array(["a", "b"]), ParamValue::array(["b", "a"]));
}

#[test]
fn test_is_valid_params() {
    assert!(is_valid_params(&params([
        ("a", "x".into()),
        ("b", ParamValue::set(["1", "2"])),
        ("c", ParamValue::dict([("d", ParamValue::array(["z"]))])),
    ])));
    assert!(!is_valid_params(&params([("a", ParamValue::set(["1"]))])));
    assert!(!is_valid_params(&params([(
        "a",
        ParamValue::dict([("b", ParamValue::Array(vec![]))])
    )])));
}

#[test]
fn test_empty_nested_dict_is_invalid_and_lost_by_encoding() {
    let p = params([("A", ParamValue::Dict(Params::new())), ("B", "b".into())]);
    assert!(!is_valid_params(&p));
    assert_eq!(encode(&p), "B=b");
    assert_ne!(decode(&encode(&p)).unwrap(), p);
}

#[test]
fn test_json_conversion() {
    let value = json!({
        "name": "widget",
        "count": 3,
        "enabled": true,
        "missing": null,
        "tags": ["x", 1],
        "owner": {"id": "7"}
    });
    let p = params_from_json(&value).unwrap();
    assert_eq!(p["count"].as_str(), Some("3"));
    assert_eq!(p["enabled"].as_str(), Some("true"));
    assert!(p["missing"].is_null());
    assert_eq!(p["tags"], ParamValue::array(["x", "1"]));
    assert_eq!(p["owner"], ParamValue::dict([("id", "7".into())]));

    let back = params_to_json(&p);
    assert_eq!(back["owner"]["id"], json!("7"));
    assert_eq!(back["tags"], json!(["x", "1"]));

    assert!(params_from_json(&json!([1, 2])).is_err());
    assert!(params_from_json(&json!({"a": [[1]]})).is_err());
}

#[test]
fn test_url_with_parameters() {
    let p = params([("q", "rust lang".into()), ("page", "2".into())]);
    let url = url_with_parameters("https://example.com/search", &p).unwrap();
    assert_eq!(url.as_str(), "https://example.com/search?q=rust%20lang&page=2");

    let url = url_with_parameters("https://example.com/search?lang=en", &p).unwrap();
    assert_eq!(url.query(), Some("lang=en&q=rust%20lang&page=2"));

    let url = url_with_parameters("https://example.com/", &Params::new()).unwrap();
    assert_eq!(url.query(), None);

    assert!(url_with_parameters("not a url", &p).is_err());
}
