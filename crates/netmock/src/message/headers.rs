//! Header helpers over [`http::HeaderMap`].

use crate::error::MockError;
use http::header::{HeaderMap, HeaderName, HeaderValue};

/// Semantic header equality: same field count, same fields ignoring case, same
/// values per field.
///
/// Comparing against a missing map always fails, even for an empty `ours`.
pub fn headers_equal(ours: &HeaderMap, theirs: Option<&HeaderMap>) -> bool {
    theirs.is_some_and(|theirs| ours == theirs)
}

/// Parse a `field: value` pair given as text.
pub fn parse_header(field: &str, value: &str) -> Result<(HeaderName, HeaderValue), MockError> {
    let invalid = |reason: String| MockError::InvalidHeader {
        field: field.to_string(),
        reason,
    };
    let name = HeaderName::from_bytes(field.as_bytes()).map_err(|e| invalid(e.to_string()))?;
    let value = HeaderValue::from_str(value).map_err(|e| invalid(e.to_string()))?;
    Ok((name, value))
}

/// Build a header map from text pairs. Later pairs replace earlier ones for the
/// same field.
pub fn header_map<'a, I>(pairs: I) -> Result<HeaderMap, MockError>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut headers = HeaderMap::new();
    for (field, value) in pairs {
        let (name, value) = parse_header(field, value)?;
        headers.insert(name, value);
    }
    Ok(headers)
}

/// Serde representation of a [`HeaderMap`] as a `field: value` mapping.
///
/// Use with `#[serde(with = "crate::message::header_serde")]`. Multiple values
/// for one field are joined with `", "` on output.
pub mod header_serde {
    use super::parse_header;
    use http::HeaderMap;
    use indexmap::IndexMap;
    use serde::de::Error as _;
    use serde::ser::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(headers: &HeaderMap, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map: IndexMap<&str, String> = IndexMap::with_capacity(headers.keys_len());
        for name in headers.keys() {
            let values = headers
                .get_all(name)
                .iter()
                .map(|value| value.to_str().map_err(S::Error::custom))
                .collect::<Result<Vec<_>, _>>()?;
            map.insert(name.as_str(), values.join(", "));
        }
        map.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<HeaderMap, D::Error> {
        let map = IndexMap::<String, String>::deserialize(deserializer)?;
        let mut headers = HeaderMap::with_capacity(map.len());
        for (field, value) in &map {
            let (name, value) = parse_header(field, value).map_err(D::Error::custom)?;
            headers.insert(name, value);
        }
        Ok(headers)
    }
}
