//! URL-encoded string to parameter structure.

use super::types::{CodecError, ParamValue, Params};
use indexmap::map::Entry;

/// Parsed form of a key such as `A[B][C]` or `A[B][]`.
struct KeyPath {
    /// Dictionary path; the first element is the top-level name.
    keys: Vec<String>,
    /// Whether the key ended in `[]`.
    append: bool,
}

/// Decode a URL-encoded parameter string.
///
/// Empty pairs (`a=1&&b=2`) are skipped and `+` decodes to a space. Fails on
/// malformed percent-escapes, bracket mismatches, and keys reused with
/// incompatible shapes (for example `A=a&A[]=b`).
pub fn decode(input: &str) -> Result<Params, CodecError> {
    let mut params = Params::new();
    for pair in input.split('&').filter(|p| !p.is_empty()) {
        let (raw_key, raw_value) = match pair.split_once('=') {
            Some((key, value)) => (key, Some(value)),
            None => (pair, None),
        };
        let path = parse_key(raw_key)?;
        let value = match raw_value {
            Some(v) => Some(decode_component(v)?),
            None => None,
        };
        insert(&mut params, path, value, raw_key)?;
    }
    Ok(params)
}

fn decode_component(raw: &str) -> Result<String, CodecError> {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes.len() > i + 2
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit();
            if !valid {
                return Err(CodecError::MalformedPercent(raw.to_string()));
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .map_err(|_| CodecError::InvalidUtf8(raw.to_string()))
}

fn parse_key(raw: &str) -> Result<KeyPath, CodecError> {
    let mismatched = || CodecError::MismatchedBrackets(raw.to_string());

    let (name, mut rest) = match raw.find('[') {
        Some(index) => (&raw[..index], &raw[index..]),
        None => (raw, ""),
    };
    if name.contains(']') {
        return Err(mismatched());
    }
    if name.is_empty() {
        return Err(CodecError::EmptyKey(raw.to_string()));
    }

    let mut keys = vec![decode_component(name)?];
    let mut append = false;
    while !rest.is_empty() {
        if append {
            // `[]` must be the final segment.
            return Err(mismatched());
        }
        let inner_end = rest.find(']').ok_or_else(mismatched)?;
        if !rest.starts_with('[') {
            return Err(mismatched());
        }
        let segment = &rest[1..inner_end];
        if segment.contains('[') {
            return Err(mismatched());
        }
        if segment.is_empty() {
            append = true;
        } else {
            keys.push(decode_component(segment)?);
        }
        rest = &rest[inner_end + 1..];
    }

    Ok(KeyPath { keys, append })
}

fn insert(
    params: &mut Params,
    path: KeyPath,
    value: Option<String>,
    raw_key: &str,
) -> Result<(), CodecError> {
    let conflict = || CodecError::Conflict(raw_key.to_string());
    let Some((last, parents)) = path.keys.split_last() else {
        return Err(CodecError::EmptyKey(raw_key.to_string()));
    };

    let mut dict = params;
    for key in parents {
        let slot = dict
            .entry(key.clone())
            .or_insert_with(|| ParamValue::Dict(Params::new()));
        dict = match slot {
            ParamValue::Dict(nested) => nested,
            _ => return Err(conflict()),
        };
    }

    if path.append {
        let value = value.ok_or_else(|| CodecError::MissingValue(raw_key.to_string()))?;
        return match dict
            .entry(last.clone())
            .or_insert_with(|| ParamValue::Array(Vec::new()))
        {
            ParamValue::Array(items) => {
                items.push(value);
                Ok(())
            }
            _ => Err(conflict()),
        };
    }

    match dict.entry(last.clone()) {
        Entry::Vacant(entry) => {
            entry.insert(value.map_or(ParamValue::Null, ParamValue::String));
        }
        Entry::Occupied(mut entry) => {
            let value = value.ok_or_else(conflict)?;
            let slot = entry.get_mut();
            match slot {
                ParamValue::Set(items) => items.push(value),
                ParamValue::String(existing) => {
                    let first = std::mem::take(existing);
                    *slot = ParamValue::Set(vec![first, value]);
                }
                _ => return Err(conflict()),
            }
        }
    }
    Ok(())
}
