//! Application layer containing the payment lifecycle orchestration.
//!
//! This module defines the `PaymentEngine`, the request shapes it accepts and
//! the validation gate that runs before any state is touched.

pub mod engine;
pub mod requests;
pub mod validation;
