//! Conversions between parameter structures, JSON, and URL query strings.

use super::encode::encode;
use super::types::{CodecError, ParamValue, Params};
use crate::error::MockError;
use serde_json::{Map, Value};
use url::Url;

/// Convert parameters to a JSON object. Sets become arrays.
pub fn params_to_json(params: &Params) -> Value {
    let map: Map<String, Value> = params
        .iter()
        .map(|(key, value)| (key.clone(), value_to_json(value)))
        .collect();
    Value::Object(map)
}

fn value_to_json(value: &ParamValue) -> Value {
    match value {
        ParamValue::Null => Value::Null,
        ParamValue::String(s) => Value::String(s.clone()),
        ParamValue::Set(values) | ParamValue::Array(values) => {
            Value::Array(values.iter().cloned().map(Value::String).collect())
        }
        ParamValue::Dict(nested) => params_to_json(nested),
    }
}

/// Convert a JSON object into parameters.
///
/// Numbers and booleans are rendered with their JSON text. Arrays must hold
/// scalars and become [`ParamValue::Array`]; nested objects become
/// dictionaries.
pub fn params_from_json(value: &Value) -> Result<Params, CodecError> {
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(key, v)| Ok::<_, CodecError>((key.clone(), json_to_value(v)?)))
            .collect(),
        other => Err(CodecError::UnsupportedJson(format!(
            "expected an object, found {other}"
        ))),
    }
}

fn json_to_value(value: &Value) -> Result<ParamValue, CodecError> {
    match value {
        Value::Object(_) => Ok(ParamValue::Dict(params_from_json(value)?)),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                scalar_to_string(item)?.ok_or_else(|| {
                    CodecError::UnsupportedJson(format!("array element {item} is not a string"))
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(ParamValue::Array),
        scalar => Ok(scalar_to_string(scalar)?.map_or(ParamValue::Null, ParamValue::String)),
    }
}

fn scalar_to_string(value: &Value) -> Result<Option<String>, CodecError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(CodecError::UnsupportedJson(format!(
            "nested collection {other} inside an array"
        ))),
    }
}

/// Build a URL whose query carries `params`, appended after any existing query.
pub fn url_with_parameters(base: &str, params: &Params) -> Result<Url, MockError> {
    let mut url = Url::parse(base).map_err(|source| MockError::InvalidUrl {
        url: base.to_string(),
        source,
    })?;
    let encoded = encode(params);
    if !encoded.is_empty() {
        let query = match url.query() {
            Some(existing) if !existing.is_empty() => format!("{existing}&{encoded}"),
            _ => encoded,
        };
        url.set_query(Some(&query));
    }
    Ok(url)
}
