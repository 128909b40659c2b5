use super::requests::{
    GetPaymentHistoryRequest, GetPaymentRequest, GetPaymentStatusRequest, ProcessPaymentRequest,
    RefundPaymentRequest,
};
use super::validation;
use crate::config::Limits;
use crate::domain::money::{Amount, Currency};
use crate::domain::payment::{NewPayment, Payment, PaymentId, PaymentMethod, PaymentStatus};
use crate::domain::ports::{PaymentGatewayBox, PaymentStore, PaymentStoreBox};
use crate::error::{PaymentError, Result};
use chrono::Utc;
use tracing::{debug, info, warn};

/// The payment lifecycle engine.
///
/// `PaymentEngine` validates each request, then drives the payment record
/// through its state machine against the store. It holds no mutable state of
/// its own, so one instance can serve concurrent requests behind an `Arc`.
pub struct PaymentEngine {
    store: PaymentStoreBox,
    gateway: PaymentGatewayBox,
    limits: Limits,
}

fn positive_id(value: i32) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| PaymentError::InvalidInput(format!("Identifier {} must be positive", value)))
}

impl PaymentEngine {
    /// Creates a new `PaymentEngine` with default request limits.
    ///
    /// # Arguments
    ///
    /// * `store` - Durable storage for payment records.
    /// * `gateway` - Decides settlement outcomes and performs refunds.
    pub fn new(store: PaymentStoreBox, gateway: PaymentGatewayBox) -> Self {
        Self {
            store,
            gateway,
            limits: Limits::default(),
        }
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn store(&self) -> &dyn PaymentStore {
        self.store.as_ref()
    }

    /// Creates a payment and settles it within the same call.
    ///
    /// The record is written as `Pending` first, then the gateway decides the
    /// outcome and the terminal record is written back. The returned payment
    /// is always `Completed` or `Failed`.
    pub async fn process_payment(&self, request: ProcessPaymentRequest) -> Result<Payment> {
        info!(
            order_id = request.order_id,
            amount = %request.amount,
            "Processing payment"
        );
        if let Err(e) = validation::validate_process_payment(&request, &self.limits).into_result()
        {
            warn!(error = %e, "Validation failed for ProcessPayment");
            return Err(e);
        }

        let method: PaymentMethod = request.payment_method.parse()?;
        let mut card_last_four_digits =
            validation::normalized_card_digits(&request.card_last_four_digits).map(str::to_owned);
        if card_last_four_digits.is_some() && !method.is_card() {
            debug!(method = %method, "Ignoring card digits for non-card payment method");
            card_last_four_digits = None;
        }

        let draft = NewPayment {
            order_id: positive_id(request.order_id)?,
            user_id: positive_id(request.user_id)?,
            amount: Amount::new(request.amount)?,
            currency: request.currency.parse::<Currency>()?,
            method,
            card_last_four_digits,
            created_at: Utc::now(),
        };

        let mut payment = self.store.insert(draft).await?;
        debug!(payment_id = payment.id, "Pending payment recorded");

        let outcome = self.gateway.settle(&payment).await?;
        payment.settle(outcome, Utc::now())?;

        match payment.status {
            PaymentStatus::Completed => info!(
                payment_id = payment.id,
                order_id = payment.order_id,
                transaction_id = payment.transaction_id.as_deref().unwrap_or_default(),
                "Payment completed"
            ),
            PaymentStatus::Failed => warn!(
                payment_id = payment.id,
                order_id = payment.order_id,
                reason = payment.failure_reason.as_deref().unwrap_or_default(),
                "Payment failed"
            ),
            PaymentStatus::Pending | PaymentStatus::Refunded => {}
        }

        self.store.update(payment, PaymentStatus::Pending).await
    }

    /// Refunds a completed payment.
    ///
    /// Preconditions are checked before the gateway call and checked again by
    /// the store when writing, so of two racing refunds only one succeeds.
    pub async fn refund_payment(&self, request: RefundPaymentRequest) -> Result<Payment> {
        info!(
            payment_id = request.payment_id,
            amount = %request.amount,
            "Processing refund"
        );
        if let Err(e) = validation::validate_refund_payment(&request, &self.limits).into_result() {
            warn!(error = %e, "Validation failed for RefundPayment");
            return Err(e);
        }

        let payment_id = positive_id(request.payment_id)?;
        let amount = Amount::new(request.amount)?;
        let mut payment = self.load(payment_id).await?;

        if let Err(e) = payment.ensure_refundable(amount) {
            warn!(payment_id, status = %payment.status, error = %e, "Refund rejected");
            return Err(e);
        }

        self.gateway.refund(&payment, amount).await?;
        payment.refund(amount, request.reason, Utc::now())?;

        let payment = self
            .store
            .update(payment, PaymentStatus::Completed)
            .await
            .map_err(|e| match e {
                PaymentError::PreconditionFailed { status, .. } => {
                    warn!(payment_id, %status, "Refund lost a concurrent update");
                    PaymentError::PreconditionFailed {
                        payment_id,
                        operation: "refund",
                        status,
                    }
                }
                other => other,
            })?;
        info!(payment_id, amount = %amount, "Refund processed");
        Ok(payment)
    }

    pub async fn get_payment_status(&self, request: GetPaymentStatusRequest) -> Result<Payment> {
        debug!(payment_id = request.payment_id, "Querying payment status");
        validation::validate_get_payment_status(&request).into_result()?;
        self.load(positive_id(request.payment_id)?).await
    }

    pub async fn get_payment(&self, request: GetPaymentRequest) -> Result<Payment> {
        debug!(payment_id = request.payment_id, "Querying payment");
        validation::validate_get_payment(&request).into_result()?;
        self.load(positive_id(request.payment_id)?).await
    }

    /// Returns every payment for an order, newest first.
    ///
    /// Ties on `created_at` are broken by identifier, highest first.
    pub async fn get_payment_history(
        &self,
        request: GetPaymentHistoryRequest,
    ) -> Result<Vec<Payment>> {
        validation::validate_get_payment_history(&request).into_result()?;
        let order_id = positive_id(request.order_id)?;

        let mut payments = self.store.find_by_order(order_id).await?;
        payments.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        info!(order_id, count = payments.len(), "Payment history loaded");
        Ok(payments)
    }

    /// Checks the store is reachable.
    pub async fn health(&self) -> Result<()> {
        self.store.ping().await
    }

    async fn load(&self, payment_id: PaymentId) -> Result<Payment> {
        match self.store.get(payment_id).await? {
            Some(payment) => Ok(payment),
            None => {
                warn!(payment_id, "Payment not found");
                Err(PaymentError::NotFound(payment_id))
            }
        }
    }
}
