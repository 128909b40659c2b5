//! Validation gate.
//!
//! One pure function per request shape. Each returns the list of field
//! violations; an empty list means the request may proceed.

use super::requests::{
    GetPaymentHistoryRequest, GetPaymentRequest, GetPaymentStatusRequest, ProcessPaymentRequest,
    RefundPaymentRequest,
};
use crate::config::Limits;
use crate::domain::money::{AMOUNT_SCALE, Currency, has_cent_precision};
use crate::domain::payment::PaymentMethod;
use crate::error::{PaymentError, Result};
use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Violations(Vec<Violation>);

impl Violations {
    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(Violation {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> Vec<&'static str> {
        self.0.iter().map(|v| v.field).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.0.iter()
    }

    /// Turns a non-empty set into `InvalidInput` with the messages joined.
    pub fn into_result(self) -> Result<()> {
        if self.0.is_empty() {
            return Ok(());
        }
        let joined = self
            .iter()
            .map(|v| v.message.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        Err(PaymentError::InvalidInput(joined))
    }
}

fn check_positive_id(violations: &mut Violations, field: &'static str, label: &str, id: i32) {
    if id <= 0 {
        violations.push(field, format!("{} must be greater than 0", label));
    }
}

fn check_amount(violations: &mut Violations, label: &str, amount: Decimal, limits: &Limits) {
    if amount <= Decimal::ZERO {
        violations.push("amount", format!("{} must be greater than 0", label));
    } else if amount > limits.max_amount {
        violations.push(
            "amount",
            format!("{} cannot exceed {}", label, limits.max_amount),
        );
    } else if !has_cent_precision(amount) {
        violations.push(
            "amount",
            format!(
                "{} cannot have more than {} decimal places",
                label, AMOUNT_SCALE
            ),
        );
    }
}

/// Treats an empty card-digits string the same as an absent one.
pub fn normalized_card_digits(digits: &Option<String>) -> Option<&str> {
    digits.as_deref().filter(|d| !d.is_empty())
}

pub fn validate_process_payment(request: &ProcessPaymentRequest, limits: &Limits) -> Violations {
    let mut violations = Violations::default();
    check_positive_id(&mut violations, "orderId", "Order ID", request.order_id);
    check_positive_id(&mut violations, "userId", "User ID", request.user_id);
    check_amount(&mut violations, "Amount", request.amount, limits);

    if request.payment_method.is_empty() {
        violations.push("paymentMethod", "Payment method is required");
    } else if request.payment_method.parse::<PaymentMethod>().is_err() {
        violations.push(
            "paymentMethod",
            "Payment method must be: CreditCard, DebitCard, PayPal, or BankTransfer",
        );
    }

    if request.currency.is_empty() {
        violations.push("currency", "Currency is required");
    } else if request.currency.chars().count() != 3 {
        violations.push(
            "currency",
            "Currency must have 3 characters (e.g. USD, EUR)",
        );
    } else if request.currency.parse::<Currency>().is_err() {
        violations.push("currency", "Currency must be USD, EUR, GBP, or CRC");
    }

    if let Some(digits) = normalized_card_digits(&request.card_last_four_digits) {
        if digits.chars().count() != 4 {
            violations.push(
                "cardLastFourDigits",
                "Card last four digits must have exactly 4 digits",
            );
        } else if !digits.chars().all(|c| c.is_ascii_digit()) {
            violations.push(
                "cardLastFourDigits",
                "Card last four digits must contain only numbers",
            );
        }
    }

    violations
}

pub fn validate_refund_payment(request: &RefundPaymentRequest, limits: &Limits) -> Violations {
    let mut violations = Violations::default();
    check_positive_id(&mut violations, "paymentId", "Payment ID", request.payment_id);

    if request.reason.trim().is_empty() {
        violations.push("reason", "Reason is required for a refund");
    } else if request.reason.chars().count() > limits.max_reason_length {
        violations.push(
            "reason",
            format!(
                "Reason cannot exceed {} characters",
                limits.max_reason_length
            ),
        );
    }

    check_amount(&mut violations, "Refund amount", request.amount, limits);
    violations
}

pub fn validate_get_payment_status(request: &GetPaymentStatusRequest) -> Violations {
    let mut violations = Violations::default();
    check_positive_id(&mut violations, "paymentId", "Payment ID", request.payment_id);
    violations
}

pub fn validate_get_payment(request: &GetPaymentRequest) -> Violations {
    let mut violations = Violations::default();
    check_positive_id(&mut violations, "paymentId", "Payment ID", request.payment_id);
    violations
}

pub fn validate_get_payment_history(request: &GetPaymentHistoryRequest) -> Violations {
    let mut violations = Violations::default();
    check_positive_id(&mut violations, "orderId", "Order ID", request.order_id);
    violations
}
