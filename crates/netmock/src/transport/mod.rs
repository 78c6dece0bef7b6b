//! The interception registry.
//!
//! A [`MockTransport`] holds the expected mock requests, decides which
//! incoming requests it intercepts, drives the matched responder and keeps the
//! bookkeeping that verification reads.
//!
//! ## Module Structure
//!
//! - `state`: Registry state guarded by the transport lock
//! - `scheduler`: The runtime responders deliver on
//! - `exchange`: Handle to an in-flight exchange
//! - `verify`: Verification report
//! - `core`: `MockTransport` registration, dispatch and lifecycle
//! - `convenience`: One-call JSON expectations

mod convenience;
mod core;
mod exchange;
mod scheduler;
mod state;
mod verify;

#[cfg(test)]
mod tests;

pub use self::core::MockTransport;
pub use exchange::Exchange;
pub use state::ServicedExchange;
pub use verify::VerificationReport;
