//! Response projection from payment records to the outward wire shape.
//!
//! Optional fields are omitted entirely when unset rather than rendered as
//! empty placeholders.

use crate::domain::payment::{Payment, PaymentId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// ISO-8601, millisecond precision, UTC with a trailing `Z`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub payment_id: PaymentId,
    pub order_id: u32,
    pub user_id: u32,
    pub amount: String,
    pub currency: String,
    pub payment_method: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_last_four_digits: Option<String>,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refunded_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refunded_amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund_reason: Option<String>,
}

impl From<&Payment> for PaymentResponse {
    fn from(payment: &Payment) -> Self {
        let non_empty = |value: &Option<String>| value.clone().filter(|v| !v.is_empty());
        Self {
            payment_id: payment.id,
            order_id: payment.order_id,
            user_id: payment.user_id,
            amount: payment.amount.to_string(),
            currency: payment.currency.to_string(),
            payment_method: payment.method.to_string(),
            status: payment.status.to_string(),
            transaction_id: non_empty(&payment.transaction_id),
            failure_reason: non_empty(&payment.failure_reason),
            card_last_four_digits: non_empty(&payment.card_last_four_digits),
            created_at: format_timestamp(&payment.created_at),
            completed_at: payment.completed_at.as_ref().map(format_timestamp),
            refunded_at: payment.refunded_at.as_ref().map(format_timestamp),
            refunded_amount: payment.refunded_amount.map(|a| a.to_string()),
            refund_reason: non_empty(&payment.refund_reason),
        }
    }
}

impl From<Payment> for PaymentResponse {
    fn from(payment: Payment) -> Self {
        Self::from(&payment)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentHistoryResponse {
    pub payments: Vec<PaymentResponse>,
    pub total_count: usize,
}

impl From<Vec<Payment>> for PaymentHistoryResponse {
    fn from(payments: Vec<Payment>) -> Self {
        let payments: Vec<PaymentResponse> = payments.iter().map(PaymentResponse::from).collect();
        Self {
            total_count: payments.len(),
            payments,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub database: String,
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::{Amount, Currency};
    use crate::domain::payment::{NewPayment, PaymentMethod, SettlementOutcome};
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn payment() -> Payment {
        NewPayment {
            order_id: 1,
            user_id: 2,
            amount: Amount::new(dec!(1499.98)).unwrap(),
            currency: Currency::Usd,
            method: PaymentMethod::CreditCard,
            card_last_four_digits: None,
            created_at: Utc.with_ymd_and_hms(2024, 11, 20, 15, 30, 12).unwrap(),
        }
        .into_payment(1)
    }

    #[test]
    fn test_timestamp_format() {
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
            + chrono::Duration::milliseconds(67);
        assert_eq!(format_timestamp(&at), "2024-01-02T03:04:05.067Z");
    }

    #[test]
    fn test_pending_omits_optional_fields() {
        let json = serde_json::to_value(PaymentResponse::from(payment())).unwrap();
        let object = json.as_object().unwrap();

        assert_eq!(object["amount"], "1499.98");
        assert_eq!(object["status"], "Pending");
        assert_eq!(object["paymentMethod"], "CreditCard");
        assert_eq!(object["createdAt"], "2024-11-20T15:30:12.000Z");
        for absent in [
            "transactionId",
            "failureReason",
            "cardLastFourDigits",
            "completedAt",
            "refundedAt",
            "refundedAmount",
            "refundReason",
        ] {
            assert!(!object.contains_key(absent), "{absent} should be omitted");
        }
    }

    #[test]
    fn test_failed_payment_projection() {
        let mut payment = payment();
        payment
            .settle(
                SettlementOutcome::Failed {
                    transaction_id: "TXN-1-FAIL".to_string(),
                    reason: "Invalid CVV".to_string(),
                },
                payment.created_at,
            )
            .unwrap();

        let response = PaymentResponse::from(&payment);
        assert_eq!(response.status, "Failed");
        assert_eq!(response.failure_reason.as_deref(), Some("Invalid CVV"));
        assert_eq!(response.transaction_id.as_deref(), Some("TXN-1-FAIL"));
        assert_eq!(
            response.completed_at.as_deref(),
            Some("2024-11-20T15:30:12.000Z")
        );
    }

    #[test]
    fn test_history_counts() {
        let history = PaymentHistoryResponse::from(vec![payment(), payment()]);
        assert_eq!(history.total_count, 2);

        let empty = PaymentHistoryResponse::from(Vec::new());
        assert_eq!(empty.total_count, 0);
        assert!(empty.payments.is_empty());
    }
}
