//! HTTP message model shared by mock requests, incoming requests and responses.
//!
//! Header maps, names and values are the `http` crate's types.
//!
//! ## Module Structure
//!
//! - `headers`: Semantic header equality, text parsing and serde support
//! - `body`: Request bodies (buffered or stream-backed) and text encodings
//! - `core`: `MockMessage` and the `HttpMessage` accessor trait

mod body;
mod core;
mod headers;


pub use body::{RequestBody, TextEncoding};
pub use self::core::{HttpMessage, MockMessage};
pub use headers::{header_map, header_serde, headers_equal, parse_header};
pub use http::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE, COOKIE, SET_COOKIE,
};

/// Content type applied by JSON body setters when none is set.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";
/// Content type applied by form body setters when none is set.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=utf-8";
