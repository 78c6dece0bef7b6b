//! Mock requests and the incoming requests they are matched against.
//!
//! ## Module Structure
//!
//! - `types`: The `MockRequest` trait and removal policy
//! - `incoming`: `IncomingRequest`, the request issued by code under test
//! - `canonical`: URL canonicalization
//! - `exact`: `ExactRequest`, matched on method, URL, headers and body
//! - `pattern`: `PatternRequest`, matched against a `:name` URL pattern

mod canonical;
mod exact;
mod incoming;
mod pattern;
mod types;


pub use canonical::canonical_url;
pub use exact::{ExactRequest, MatchPolicy};
pub use incoming::{IncomingRequest, RequestId};
pub use pattern::{PathParams, PatternRequest, UrlPattern};
pub use types::{MockRequest, MockRequestRef, RemovalPolicy};

pub(crate) use types::identity;
