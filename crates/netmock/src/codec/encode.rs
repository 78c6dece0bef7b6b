//! Parameter structure to URL-encoded string.

use super::types::{ParamValue, Params};
use std::borrow::Cow;

/// Percent-encode one key or value component.
///
/// Everything outside the RFC 3986 unreserved set (`A-Z a-z 0-9 - . _ ~`) is
/// escaped, including literal brackets inside key names.
pub fn encode_component(component: &str) -> Cow<'_, str> {
    urlencoding::encode(component)
}

/// Encode `params` depth-first into `key=value` pairs joined by `&`.
///
/// Dictionary keys are visited in insertion order. A [`ParamValue::Null`]
/// emits the bare key with no `=`. Empty arrays and dictionaries emit nothing.
pub fn encode(params: &Params) -> String {
    let mut pairs = Vec::new();
    for (key, value) in params {
        collect_pairs(&encode_component(key), value, &mut pairs);
    }
    pairs.join("&")
}

fn collect_pairs(prefix: &str, value: &ParamValue, pairs: &mut Vec<String>) {
    match value {
        ParamValue::Null => pairs.push(prefix.to_string()),
        ParamValue::String(s) => pairs.push(format!("{prefix}={}", encode_component(s))),
        ParamValue::Set(values) => {
            for v in values {
                pairs.push(format!("{prefix}={}", encode_component(v)));
            }
        }
        ParamValue::Array(values) => {
            for v in values {
                pairs.push(format!("{prefix}[]={}", encode_component(v)));
            }
        }
        ParamValue::Dict(nested) => {
            for (key, nested_value) in nested {
                let nested_prefix = format!("{prefix}[{}]", encode_component(key));
                collect_pairs(&nested_prefix, nested_value, pairs);
            }
        }
    }
}
