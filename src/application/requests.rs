//! Inbound request shapes, one per RPC operation.
//!
//! Fields mirror the wire messages: identifiers are signed and enumerations
//! are raw strings so the validation gate can report them field by field.
//! Missing fields take their zero value, as they would on a protobuf wire.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcessPaymentRequest {
    pub order_id: i32,
    pub user_id: i32,
    pub amount: Decimal,
    pub currency: String,
    pub payment_method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_last_four_digits: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RefundPaymentRequest {
    pub payment_id: i32,
    pub amount: Decimal,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GetPaymentStatusRequest {
    pub payment_id: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GetPaymentRequest {
    pub payment_id: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GetPaymentHistoryRequest {
    pub order_id: i32,
}
