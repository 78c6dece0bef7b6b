//! Parameter structure types.

use indexmap::IndexMap;

/// A parameter dictionary. Iteration follows insertion order, equality does not.
pub type Params = IndexMap<String, ParamValue>;

/// A single parameter value.
#[derive(Debug, Clone)]
pub enum ParamValue {
    /// Key present without `=`; distinct from the empty string.
    Null,
    String(String),
    /// Repeated flat key. Unordered; holds at least two strings when decoded.
    Set(Vec<String>),
    /// `key[]` entries, in order.
    Array(Vec<String>),
    Dict(Params),
}

impl ParamValue {
    pub fn set<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ParamValue::Set(values.into_iter().map(Into::into).collect())
    }

    pub fn array<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ParamValue::Array(values.into_iter().map(Into::into).collect())
    }

    pub fn dict<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, ParamValue)>,
        K: Into<String>,
    {
        ParamValue::Dict(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ParamValue::Null)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::String(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::String(value)
    }
}

impl PartialEq for ParamValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ParamValue::Null, ParamValue::Null) => true,
            (ParamValue::String(a), ParamValue::String(b)) => a == b,
            (ParamValue::Array(a), ParamValue::Array(b)) => a == b,
            (ParamValue::Set(a), ParamValue::Set(b)) => {
                // Multiset comparison: order is irrelevant, multiplicity is not.
                let mut a = a.clone();
                let mut b = b.clone();
                a.sort_unstable();
                b.sort_unstable();
                a == b
            }
            (ParamValue::Dict(a), ParamValue::Dict(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for ParamValue {}

/// Whether `params` only uses the shapes the codec can round-trip: sets of at
/// least two strings, non-empty arrays, and non-empty nested dictionaries of
/// the same. Empty collections encode to nothing and cannot come back.
pub fn is_valid_params(params: &Params) -> bool {
    params.values().all(|value| match value {
        ParamValue::Null | ParamValue::String(_) => true,
        ParamValue::Set(values) => values.len() >= 2,
        ParamValue::Array(values) => !values.is_empty(),
        ParamValue::Dict(nested) => !nested.is_empty() && is_valid_params(nested),
    })
}

/// Errors produced while decoding parameter strings or converting JSON.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("Malformed percent-escape in '{0}'")]
    MalformedPercent(String),
    #[error("Percent-escapes in '{0}' do not decode to UTF-8")]
    InvalidUtf8(String),
    #[error("Mismatched brackets in key '{0}'")]
    MismatchedBrackets(String),
    #[error("Empty parameter name in '{0}'")]
    EmptyKey(String),
    #[error("Key '{0}' is used with incompatible shapes")]
    Conflict(String),
    #[error("Array entry '{0}' has no value")]
    MissingValue(String),
    #[error("JSON value cannot be expressed as parameters: {0}")]
    UnsupportedJson(String),
}
