use super::money::{Amount, Currency};
use crate::error::PaymentError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type PaymentId = u32;
pub type OrderId = u32;
pub type UserId = u32;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Hash)]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Completed => "Completed",
            PaymentStatus::Failed => "Failed",
            PaymentStatus::Refunded => "Refunded",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Hash)]
pub enum PaymentMethod {
    CreditCard,
    DebitCard,
    PayPal,
    BankTransfer,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::CreditCard,
        PaymentMethod::DebitCard,
        PaymentMethod::PayPal,
        PaymentMethod::BankTransfer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "CreditCard",
            PaymentMethod::DebitCard => "DebitCard",
            PaymentMethod::PayPal => "PayPal",
            PaymentMethod::BankTransfer => "BankTransfer",
        }
    }

    /// Whether card digits make sense for this method.
    pub fn is_card(&self) -> bool {
        matches!(self, PaymentMethod::CreditCard | PaymentMethod::DebitCard)
    }
}

impl FromStr for PaymentMethod {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaymentMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| {
                PaymentError::InvalidInput(
                    "Payment method must be: CreditCard, DebitCard, PayPal, or BankTransfer"
                        .to_string(),
                )
            })
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal result of a settlement attempt, as decided by a gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettlementOutcome {
    Completed {
        transaction_id: String,
    },
    Failed {
        transaction_id: String,
        reason: String,
    },
}

impl SettlementOutcome {
    pub fn transaction_id(&self) -> &str {
        match self {
            SettlementOutcome::Completed { transaction_id }
            | SettlementOutcome::Failed { transaction_id, .. } => transaction_id,
        }
    }
}

/// A payment that has not been assigned an identifier yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPayment {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub amount: Amount,
    pub currency: Currency,
    pub method: PaymentMethod,
    pub card_last_four_digits: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewPayment {
    /// Attaches the store-assigned identifier, producing a `Pending` record.
    pub fn into_payment(self, id: PaymentId) -> Payment {
        Payment {
            id,
            order_id: self.order_id,
            user_id: self.user_id,
            amount: self.amount,
            currency: self.currency,
            method: self.method,
            status: PaymentStatus::Pending,
            transaction_id: None,
            failure_reason: None,
            card_last_four_digits: self.card_last_four_digits,
            created_at: self.created_at,
            completed_at: None,
            refunded_at: None,
            refunded_amount: None,
            refund_reason: None,
        }
    }
}

/// The authoritative payment record.
///
/// Records are mutated in place by [`Payment::settle`] and [`Payment::refund`];
/// both enforce the one-directional state machine
/// `Pending -> {Completed, Failed}` and `Completed -> Refunded`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Payment {
    pub id: PaymentId,
    pub order_id: OrderId,
    pub user_id: UserId,
    pub amount: Amount,
    pub currency: Currency,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub transaction_id: Option<String>,
    pub failure_reason: Option<String>,
    pub card_last_four_digits: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub refunded_at: Option<DateTime<Utc>>,
    pub refunded_amount: Option<Amount>,
    pub refund_reason: Option<String>,
}

impl Payment {
    fn precondition(&self, operation: &'static str) -> PaymentError {
        PaymentError::PreconditionFailed {
            payment_id: self.id,
            operation,
            status: self.status,
        }
    }

    /// Records the settlement outcome. Only a `Pending` payment can be settled.
    pub fn settle(
        &mut self,
        outcome: SettlementOutcome,
        at: DateTime<Utc>,
    ) -> Result<(), PaymentError> {
        match self.status {
            PaymentStatus::Pending => {}
            PaymentStatus::Completed | PaymentStatus::Failed | PaymentStatus::Refunded => {
                return Err(self.precondition("settle"));
            }
        }

        let (status, transaction_id, failure_reason) = match outcome {
            SettlementOutcome::Completed { transaction_id } => {
                (PaymentStatus::Completed, transaction_id, None)
            }
            SettlementOutcome::Failed {
                transaction_id,
                reason,
            } => (PaymentStatus::Failed, transaction_id, Some(reason)),
        };
        if transaction_id.is_empty() {
            return Err(PaymentError::InternalError(
                "settlement produced an empty transaction reference".into(),
            ));
        }

        self.status = status;
        self.transaction_id = Some(transaction_id);
        self.failure_reason = failure_reason;
        self.completed_at = Some(at.max(self.created_at));
        Ok(())
    }

    /// Refunds a completed payment, fully or partially.
    ///
    /// The amount check runs before the status check, so an over-sized refund
    /// is reported as invalid input whatever state the payment is in.
    pub fn refund(
        &mut self,
        amount: Amount,
        reason: String,
        at: DateTime<Utc>,
    ) -> Result<(), PaymentError> {
        self.ensure_refundable(amount)?;

        let floor = self.completed_at.unwrap_or(self.created_at);
        self.status = PaymentStatus::Refunded;
        self.refunded_at = Some(at.max(floor));
        self.refunded_amount = Some(amount);
        self.refund_reason = Some(reason);
        Ok(())
    }

    /// Checks a refund of `amount` would be accepted, without applying it.
    pub fn ensure_refundable(&self, amount: Amount) -> Result<(), PaymentError> {
        if amount > self.amount {
            return Err(PaymentError::InvalidInput(format!(
                "Refund amount ({}) cannot exceed the original amount ({})",
                amount, self.amount
            )));
        }
        match self.status {
            PaymentStatus::Completed => Ok(()),
            PaymentStatus::Pending | PaymentStatus::Failed | PaymentStatus::Refunded => {
                Err(self.precondition("refund"))
            }
        }
    }
}
