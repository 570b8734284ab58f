//! appserver-core: I/O free building blocks of the appserver gateway
//!
//! Typed payloads for every downstream service, the camelCase to snake_case
//! translation of payment-service bookings, ownership rules and query builders.

pub mod authorization;
pub mod errors;
pub mod filters;
pub mod translation;
pub mod types;
pub mod validation;

pub use authorization::*;
pub use errors::*;
pub use filters::*;
pub use translation::*;
pub use types::*;
pub use validation::*;
