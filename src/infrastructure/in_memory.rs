use crate::domain::payment::{NewPayment, OrderId, Payment, PaymentId, PaymentStatus};
use crate::domain::ports::PaymentStore;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    payments: BTreeMap<PaymentId, Payment>,
    by_order: HashMap<OrderId, Vec<PaymentId>>,
    last_id: PaymentId,
}

/// A thread-safe in-memory store for payment records.
///
/// Uses `Arc<RwLock<..>>` so clones share the same tables. Every mutation
/// happens under the write lock, which makes `update` a single atomic
/// compare-and-set. Ideal for testing or when persistence is not required.
#[derive(Default, Clone)]
pub struct InMemoryPaymentStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryPaymentStore {
    /// Creates a new, empty in-memory payment store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn insert(&self, payment: NewPayment) -> Result<Payment> {
        let mut tables = self.tables.write().await;
        let id = tables
            .last_id
            .checked_add(1)
            .ok_or_else(|| PaymentError::StorageError("payment id space exhausted".to_string()))?;
        tables.last_id = id;

        let payment = payment.into_payment(id);
        tables.by_order.entry(payment.order_id).or_default().push(id);
        tables.payments.insert(id, payment.clone());
        Ok(payment)
    }

    async fn get(&self, payment_id: PaymentId) -> Result<Option<Payment>> {
        let tables = self.tables.read().await;
        Ok(tables.payments.get(&payment_id).cloned())
    }

    async fn find_by_order(&self, order_id: OrderId) -> Result<Vec<Payment>> {
        let tables = self.tables.read().await;
        Ok(tables
            .by_order
            .get(&order_id)
            .into_iter()
            .flatten()
            .filter_map(|id| tables.payments.get(id).cloned())
            .collect())
    }

    async fn update(&self, payment: Payment, expected: PaymentStatus) -> Result<Payment> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .payments
            .get_mut(&payment.id)
            .ok_or(PaymentError::NotFound(payment.id))?;
        if stored.status != expected {
            return Err(PaymentError::PreconditionFailed {
                payment_id: payment.id,
                operation: "update",
                status: stored.status,
            });
        }
        *stored = payment.clone();
        Ok(payment)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.tables.read().await.payments.len())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::{Amount, Currency};
    use crate::domain::payment::{PaymentMethod, SettlementOutcome};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn draft(order_id: OrderId) -> NewPayment {
        NewPayment {
            order_id,
            user_id: 1,
            amount: Amount::new(dec!(100.0)).unwrap(),
            currency: Currency::Usd,
            method: PaymentMethod::DebitCard,
            card_last_four_digits: Some("8765".to_string()),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() {
        let store = InMemoryPaymentStore::new();
        let first = store.insert(draft(1)).await.unwrap();
        let second = store.insert(draft(1)).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.status, PaymentStatus::Pending);
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_get_and_missing() {
        let store = InMemoryPaymentStore::new();
        let payment = store.insert(draft(1)).await.unwrap();

        assert_eq!(store.get(payment.id).await.unwrap(), Some(payment));
        assert!(store.get(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_by_order() {
        let store = InMemoryPaymentStore::new();
        store.insert(draft(1)).await.unwrap();
        store.insert(draft(2)).await.unwrap();
        store.insert(draft(1)).await.unwrap();

        let order_one = store.find_by_order(1).await.unwrap();
        assert_eq!(order_one.len(), 2);
        assert!(order_one.iter().all(|p| p.order_id == 1));
        assert!(store.find_by_order(3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_compares_status() {
        let store = InMemoryPaymentStore::new();
        let mut payment = store.insert(draft(1)).await.unwrap();
        payment
            .settle(
                SettlementOutcome::Completed {
                    transaction_id: "TXN-OK".to_string(),
                },
                Utc::now(),
            )
            .unwrap();

        let saved = store
            .update(payment.clone(), PaymentStatus::Pending)
            .await
            .unwrap();
        assert_eq!(saved.status, PaymentStatus::Completed);

        // The stored record is no longer Pending, so a stale write is refused.
        let stale = store.update(payment, PaymentStatus::Pending).await;
        assert!(matches!(
            stale,
            Err(PaymentError::PreconditionFailed {
                status: PaymentStatus::Completed,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_update_missing_record() {
        let store = InMemoryPaymentStore::new();
        let payment = draft(1).into_payment(5);
        assert!(matches!(
            store.update(payment, PaymentStatus::Pending).await,
            Err(PaymentError::NotFound(5))
        ));
    }
}
