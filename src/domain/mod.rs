//! Domain layer: payment records, money types and the ports the application
//! layer depends on.

pub mod money;
pub mod payment;
pub mod ports;
