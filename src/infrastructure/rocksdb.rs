use crate::domain::payment::{NewPayment, OrderId, Payment, PaymentId, PaymentStatus};
use crate::domain::ports::PaymentStore;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, Direction, IteratorMode, Options, WriteBatch};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family for payment records, keyed by payment id.
pub const CF_PAYMENTS: &str = "payments";
/// Column Family indexing payments by order: `order_id ++ payment_id -> ()`.
pub const CF_PAYMENTS_BY_ORDER: &str = "payments_by_order";
/// Column Family for store metadata such as the id sequence.
pub const CF_META: &str = "meta";

const LAST_ID_KEY: &[u8] = b"last_payment_id";

/// A persistent store implementation using RocksDB.
///
/// Records are stored as JSON in their own Column Family, with a secondary
/// index for lookups by order. Writes go through a single mutex so that id
/// allocation and the status compare-and-set in `update` are atomic.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    write_lock: Arc<Mutex<()>>,
}

fn order_key(order_id: OrderId, payment_id: PaymentId) -> [u8; 8] {
    let mut key = [0u8; 8];
    key[..4].copy_from_slice(&order_id.to_be_bytes());
    key[4..].copy_from_slice(&payment_id.to_be_bytes());
    key
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families exist.
    ///
    /// # Arguments
    ///
    /// * `path` - The filesystem path where the database will be stored.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let descriptors = [CF_PAYMENTS, CF_PAYMENTS_BY_ORDER, CF_META]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect::<Vec<_>>();

        let db = DB::open_cf_descriptors(&opts, path, descriptors)?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &'static str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            PaymentError::StorageError(format!("{} column family not found", name))
        })
    }

    fn read_payment(&self, payment_id: PaymentId) -> Result<Option<Payment>> {
        let cf = self.cf(CF_PAYMENTS)?;
        match self.db.get_cf(cf, payment_id.to_be_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn last_id(&self) -> Result<PaymentId> {
        let cf = self.cf(CF_META)?;
        match self.db.get_cf(cf, LAST_ID_KEY)? {
            Some(bytes) => {
                let raw: [u8; 4] = bytes.as_slice().try_into().map_err(|_| {
                    PaymentError::StorageError("corrupt payment id sequence".to_string())
                })?;
                Ok(PaymentId::from_be_bytes(raw))
            }
            None => Ok(0),
        }
    }
}

#[async_trait]
impl PaymentStore for RocksDBStore {
    async fn insert(&self, payment: NewPayment) -> Result<Payment> {
        let _guard = self.write_lock.lock().await;

        let id = self.last_id()?.checked_add(1).ok_or_else(|| {
            PaymentError::StorageError("payment id space exhausted".to_string())
        })?;
        let payment = payment.into_payment(id);
        let value = serde_json::to_vec(&payment)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(self.cf(CF_PAYMENTS)?, id.to_be_bytes(), value);
        batch.put_cf(
            self.cf(CF_PAYMENTS_BY_ORDER)?,
            order_key(payment.order_id, id),
            b"",
        );
        batch.put_cf(self.cf(CF_META)?, LAST_ID_KEY, id.to_be_bytes());
        self.db.write(batch)?;

        Ok(payment)
    }

    async fn get(&self, payment_id: PaymentId) -> Result<Option<Payment>> {
        self.read_payment(payment_id)
    }

    async fn find_by_order(&self, order_id: OrderId) -> Result<Vec<Payment>> {
        let index = self.cf(CF_PAYMENTS_BY_ORDER)?;
        let prefix = order_id.to_be_bytes();

        let mut payments = Vec::new();
        let iter = self
            .db
            .iterator_cf(index, IteratorMode::From(&prefix, Direction::Forward));
        for item in iter {
            let (key, _) = item?;
            if !key.starts_with(&prefix) {
                break;
            }
            let raw: [u8; 4] = key[4..].try_into().map_err(|_| {
                PaymentError::StorageError("corrupt order index key".to_string())
            })?;
            let payment_id = PaymentId::from_be_bytes(raw);
            if let Some(payment) = self.read_payment(payment_id)? {
                payments.push(payment);
            }
        }

        Ok(payments)
    }

    async fn update(&self, payment: Payment, expected: PaymentStatus) -> Result<Payment> {
        let _guard = self.write_lock.lock().await;

        let stored = self
            .read_payment(payment.id)?
            .ok_or(PaymentError::NotFound(payment.id))?;
        if stored.status != expected {
            return Err(PaymentError::PreconditionFailed {
                payment_id: payment.id,
                operation: "update",
                status: stored.status,
            });
        }

        let value = serde_json::to_vec(&payment)?;
        self.db
            .put_cf(self.cf(CF_PAYMENTS)?, payment.id.to_be_bytes(), value)?;
        Ok(payment)
    }

    async fn count(&self) -> Result<usize> {
        let cf = self.cf(CF_PAYMENTS)?;
        let mut count = 0;
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            item?;
            count += 1;
        }
        Ok(count)
    }

    async fn ping(&self) -> Result<()> {
        self.last_id().map(|_| ())
    }
}
