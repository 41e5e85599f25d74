//! Pure marketplace rules: no I/O, no authorization.
//!
//! Services fetch rows and hand them to these functions; everything here is
//! deterministic over its inputs.

pub mod distribution;
pub mod eligibility;
pub mod order_flow;
pub mod ratings;
pub mod trending;
