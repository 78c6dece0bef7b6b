//! URL-encoded parameter codec.
//!
//! Converts between a nested parameter structure ([`Params`]) and the
//! `application/x-www-form-urlencoded` string form used in query strings and
//! form bodies, and between that structure and JSON.
//!
//! Grammar (`{}` dictionary, `[]` array, `<>` multi-value set):
//!
//! ```text
//! A=a              { A: "a" }
//! A=a&A=b          { A: <"a", "b"> }
//! A[]=a&A[]=b      { A: ["a", "b"] }
//! A[B]=a&A[C]=b    { A: { B: "a", C: "b" } }
//! A[B]=a&A[B]=b    { A: { B: <"a", "b"> } }
//! A                { A: null }
//! ```
//!
//! ## Module Structure
//!
//! - `types`: `Params`, `ParamValue`, `CodecError`
//! - `encode`: structure to string
//! - `decode`: string to structure
//! - `json`: structure to and from `serde_json::Value`, URL query helper

mod decode;
mod encode;
mod json;
mod types;

#[cfg(test)]
mod tests;

pub use decode::decode;
pub use encode::{encode, encode_component};
pub use json::{params_from_json, params_to_json, url_with_parameters};
pub use types::{is_valid_params, CodecError, ParamValue, Params};
