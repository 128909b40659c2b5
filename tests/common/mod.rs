#![allow(dead_code)]

use payment_service::application::engine::PaymentEngine;
use payment_service::application::requests::ProcessPaymentRequest;
use payment_service::config::{DelayRange, SettlementConfig};
use payment_service::domain::ports::PaymentStore;
use payment_service::infrastructure::simulator::SettlementSimulator;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rust_decimal::Decimal;
use std::io::Write;
use tempfile::NamedTempFile;

/// Writes one request per line into a temporary file.
pub fn request_file(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file.flush().unwrap();
    file
}

/// Parses the binary's stdout into one JSON value per reply line.
pub fn replies(stdout: &[u8]) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("reply is not valid JSON"))
        .collect()
}

pub fn process_line(order_id: i32, amount: &str) -> String {
    format!(
        r#"{{"method":"ProcessPayment","orderId":{},"userId":2,"amount":"{}","currency":"USD","paymentMethod":"CreditCard","cardLastFourDigits":"4532"}}"#,
        order_id, amount
    )
}

pub fn refund_line(payment_id: u32, amount: &str, reason: &str) -> String {
    format!(
        r#"{{"method":"RefundPayment","paymentId":{},"amount":"{}","reason":"{}"}}"#,
        payment_id, amount, reason
    )
}

pub fn process_request(order_id: i32, amount: Decimal) -> ProcessPaymentRequest {
    ProcessPaymentRequest {
        order_id,
        user_id: 2,
        amount,
        currency: "USD".to_string(),
        payment_method: "CreditCard".to_string(),
        card_last_four_digits: Some("4532".to_string()),
    }
}

pub fn engine(
    store: impl PaymentStore + 'static,
    failure_probability: f64,
    refund_delay_ms: DelayRange,
    seed: u64,
) -> PaymentEngine {
    let config = SettlementConfig {
        refund_delay_ms,
        ..SettlementConfig::default()
            .without_delay()
            .with_failure_probability(failure_probability)
    };
    let simulator = SettlementSimulator::with_rng(config, StdRng::seed_from_u64(seed));
    PaymentEngine::new(Box::new(store), Box::new(simulator))
}
