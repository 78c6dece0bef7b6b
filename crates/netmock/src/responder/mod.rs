//! Responders replay a canned response or error to a client sink.
//!
//! ## Module Structure
//!
//! - `sink`: The `ClientSink` notification contract
//! - `types`: Response plans, response heads and responder states
//! - `core`: The `Responder` trait, per-dispatch `Delivery` handles and `MockResponder`
//! - `delivery`: Asynchronous, cancellable emission of a plan

mod core;
mod delivery;
mod sink;
mod types;


pub use self::core::{Delivery, MockResponder, Responder, SharedResponder};
pub use sink::ClientSink;
pub use types::{MockResponse, ResponderState, ResponseHead, ResponsePlan};
