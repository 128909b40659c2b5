use super::money::Amount;
use super::payment::{NewPayment, OrderId, Payment, PaymentId, PaymentStatus, SettlementOutcome};
use crate::error::Result;
use async_trait::async_trait;

/// Durable keyed storage for payment records.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Persists a new record and returns it with its assigned identifier.
    async fn insert(&self, payment: NewPayment) -> Result<Payment>;
    async fn get(&self, payment_id: PaymentId) -> Result<Option<Payment>>;
    /// All records for an order, in no particular order.
    async fn find_by_order(&self, order_id: OrderId) -> Result<Vec<Payment>>;
    /// Replaces a record only if its stored status still equals `expected`.
    ///
    /// The check and the write happen atomically. A mismatch fails with
    /// `PreconditionFailed` carrying the stored status.
    async fn update(&self, payment: Payment, expected: PaymentStatus) -> Result<Payment>;
    async fn count(&self) -> Result<usize>;
    /// Cheap reachability probe for health checks.
    async fn ping(&self) -> Result<()>;
}

/// Decides settlement outcomes. The simulator is one implementation; a real
/// gateway integration would be another.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn settle(&self, payment: &Payment) -> Result<SettlementOutcome>;
    async fn refund(&self, payment: &Payment, amount: Amount) -> Result<()>;
}

pub type PaymentStoreBox = Box<dyn PaymentStore>;
pub type PaymentGatewayBox = Box<dyn PaymentGateway>;
