//! Test helpers for observing exchanges.
//!
//! - `completion`: `ExchangeVerifier`, a sink that records one exchange and can be waited on
//! - `counting`: `CallCounter` and the `CountingSink` decorator
//! - `wait`: `wait_for_condition`, a poll-with-sleep helper

mod completion;
mod counting;
mod wait;

pub use completion::ExchangeVerifier;
pub use counting::{sink_methods, CallCounter, CountingSink};
pub use wait::{wait_for_condition, wait_for_condition_with_interval};
