use super::response::{HealthResponse, PaymentHistoryResponse, PaymentResponse, format_timestamp};
use super::status::{Code, Status};
use crate::application::engine::PaymentEngine;
use crate::application::requests::{
    GetPaymentHistoryRequest, GetPaymentRequest, GetPaymentStatusRequest, ProcessPaymentRequest,
    RefundPaymentRequest,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

pub const SERVICE_NAME: &str = "payment-service";

/// The RPC surface: five payment operations plus a health probe.
///
/// Transport-agnostic: it takes typed requests and returns typed responses
/// or a [`Status`]. Cloning shares the underlying engine.
#[derive(Clone)]
pub struct PaymentService {
    engine: Arc<PaymentEngine>,
}

impl PaymentService {
    pub fn new(engine: Arc<PaymentEngine>) -> Self {
        Self { engine }
    }

    pub async fn process_payment(
        &self,
        request: ProcessPaymentRequest,
    ) -> Result<PaymentResponse, Status> {
        self.engine
            .process_payment(request)
            .await
            .map(PaymentResponse::from)
            .map_err(|e| Status::from_error(e, "ProcessPayment"))
    }

    pub async fn refund_payment(
        &self,
        request: RefundPaymentRequest,
    ) -> Result<PaymentResponse, Status> {
        self.engine
            .refund_payment(request)
            .await
            .map(PaymentResponse::from)
            .map_err(|e| Status::from_error(e, "RefundPayment"))
    }

    pub async fn get_payment_status(
        &self,
        request: GetPaymentStatusRequest,
    ) -> Result<PaymentResponse, Status> {
        self.engine
            .get_payment_status(request)
            .await
            .map(PaymentResponse::from)
            .map_err(|e| Status::from_error(e, "GetPaymentStatus"))
    }

    pub async fn get_payment(&self, request: GetPaymentRequest) -> Result<PaymentResponse, Status> {
        self.engine
            .get_payment(request)
            .await
            .map(PaymentResponse::from)
            .map_err(|e| Status::from_error(e, "GetPayment"))
    }

    pub async fn get_payment_history(
        &self,
        request: GetPaymentHistoryRequest,
    ) -> Result<PaymentHistoryResponse, Status> {
        self.engine
            .get_payment_history(request)
            .await
            .map(PaymentHistoryResponse::from)
            .map_err(|e| Status::from_error(e, "GetPaymentHistory"))
    }

    pub async fn health(&self) -> Result<HealthResponse, Status> {
        match self.engine.health().await {
            Ok(()) => Ok(HealthResponse {
                status: "Healthy".to_string(),
                service: SERVICE_NAME.to_string(),
                database: "Connected".to_string(),
                timestamp: format_timestamp(&Utc::now()),
            }),
            Err(e) => {
                warn!(error = %e, "Health check failed");
                Err(Status::new(Code::Unavailable, "Service Unhealthy"))
            }
        }
    }

    /// Routes one decoded request to its operation.
    pub async fn dispatch(&self, request: RpcRequest) -> RpcReply {
        let reply = match request {
            RpcRequest::ProcessPayment(r) => self.process_payment(r).await.map(RpcReply::Payment),
            RpcRequest::RefundPayment(r) => self.refund_payment(r).await.map(RpcReply::Payment),
            RpcRequest::GetPaymentStatus(r) => {
                self.get_payment_status(r).await.map(RpcReply::Payment)
            }
            RpcRequest::GetPayment(r) => self.get_payment(r).await.map(RpcReply::Payment),
            RpcRequest::GetPaymentHistory(r) => {
                self.get_payment_history(r).await.map(RpcReply::History)
            }
            RpcRequest::Health => self.health().await.map(RpcReply::Health),
        };
        reply.unwrap_or_else(|error| RpcReply::Error { error })
    }
}

/// A request envelope tagged by operation name, e.g.
/// `{"method": "GetPayment", "paymentId": 1}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method")]
pub enum RpcRequest {
    ProcessPayment(ProcessPaymentRequest),
    RefundPayment(RefundPaymentRequest),
    GetPaymentStatus(GetPaymentStatusRequest),
    GetPayment(GetPaymentRequest),
    GetPaymentHistory(GetPaymentHistoryRequest),
    Health,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RpcReply {
    Payment(PaymentResponse),
    History(PaymentHistoryResponse),
    Health(HealthResponse),
    Error { error: Status },
}

impl RpcReply {
    pub fn is_error(&self) -> bool {
        matches!(self, RpcReply::Error { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SettlementConfig;
    use crate::infrastructure::in_memory::InMemoryPaymentStore;
    use crate::infrastructure::simulator::SettlementSimulator;
    use rust_decimal_macros::dec;

    fn service() -> PaymentService {
        let simulator = SettlementSimulator::new(
            SettlementConfig::default()
                .without_delay()
                .with_failure_probability(0.0),
        );
        let engine = PaymentEngine::new(
            Box::new(InMemoryPaymentStore::new()),
            Box::new(simulator),
        );
        PaymentService::new(Arc::new(engine))
    }

    #[test]
    fn test_request_envelope_decoding() {
        let request: RpcRequest = serde_json::from_str(
            r#"{"method":"ProcessPayment","orderId":1,"userId":2,"amount":"1499.98","currency":"USD","paymentMethod":"CreditCard"}"#,
        )
        .unwrap();
        match request {
            RpcRequest::ProcessPayment(r) => {
                assert_eq!(r.order_id, 1);
                assert_eq!(r.amount, dec!(1499.98));
                assert!(r.card_last_four_digits.is_none());
            }
            other => panic!("unexpected request {other:?}"),
        }

        let health: RpcRequest = serde_json::from_str(r#"{"method":"Health"}"#).unwrap();
        assert_eq!(health, RpcRequest::Health);

        assert!(serde_json::from_str::<RpcRequest>(r#"{"method":"DeletePayment"}"#).is_err());
    }

    #[tokio::test]
    async fn test_scenario_process_then_refund() {
        let service = service();
        let created = service
            .process_payment(ProcessPaymentRequest {
                order_id: 1,
                user_id: 2,
                amount: dec!(300.00),
                currency: "USD".to_string(),
                payment_method: "CreditCard".to_string(),
                card_last_four_digits: Some("4532".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(created.status, "Completed");
        assert_eq!(created.amount, "300.00");
        assert!(created.completed_at.is_some());

        let refunded = service
            .refund_payment(RefundPaymentRequest {
                payment_id: created.payment_id as i32,
                amount: dec!(300.00),
                reason: "Customer requested cancellation".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(refunded.status, "Refunded");
        assert_eq!(refunded.refunded_amount.as_deref(), Some("300.00"));
        assert_eq!(
            refunded.refund_reason.as_deref(),
            Some("Customer requested cancellation")
        );

        let again = service
            .refund_payment(RefundPaymentRequest {
                payment_id: created.payment_id as i32,
                amount: dec!(1.00),
                reason: "again".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(again.code, Code::FailedPrecondition);
        assert!(again.message.contains("Refunded"));
    }

    #[tokio::test]
    async fn test_dispatch_errors_and_health() {
        let service = service();

        let reply = service
            .dispatch(RpcRequest::GetPayment(GetPaymentRequest { payment_id: 0 }))
            .await;
        match reply {
            RpcReply::Error { error } => assert_eq!(error.code, Code::InvalidArgument),
            other => panic!("unexpected reply {other:?}"),
        }

        let reply = service
            .dispatch(RpcRequest::GetPaymentHistory(GetPaymentHistoryRequest {
                order_id: 5,
            }))
            .await;
        match reply {
            RpcReply::History(history) => assert_eq!(history.total_count, 0),
            other => panic!("unexpected reply {other:?}"),
        }

        let reply = service.dispatch(RpcRequest::Health).await;
        assert!(matches!(reply, RpcReply::Health(ref h) if h.status == "Healthy"));
    }
}
