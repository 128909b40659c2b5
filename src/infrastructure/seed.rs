use crate::domain::money::{Amount, Currency};
use crate::domain::payment::{NewPayment, PaymentMethod, PaymentStatus, SettlementOutcome};
use crate::domain::ports::PaymentStore;
use crate::error::Result;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::info;

struct Sample {
    order_id: u32,
    user_id: u32,
    amount: Decimal,
    method: PaymentMethod,
    card: Option<&'static str>,
    age: Duration,
    settle_after: Option<Duration>,
    outcome: Option<SettlementOutcome>,
    refund: Option<(Duration, &'static str)>,
}

fn samples() -> Vec<Sample> {
    let completed = |reference: &str| {
        Some(SettlementOutcome::Completed {
            transaction_id: reference.to_string(),
        })
    };
    vec![
        Sample {
            order_id: 1,
            user_id: 2,
            amount: dec!(1499.98),
            method: PaymentMethod::CreditCard,
            card: Some("4532"),
            age: Duration::days(5),
            settle_after: Some(Duration::minutes(2)),
            outcome: completed("TXN-20241120-001-OK"),
            refund: None,
        },
        Sample {
            order_id: 2,
            user_id: 3,
            amount: dec!(989.97),
            method: PaymentMethod::DebitCard,
            card: Some("8765"),
            age: Duration::days(2),
            settle_after: Some(Duration::minutes(1)),
            outcome: completed("TXN-20241123-002-OK"),
            refund: None,
        },
        Sample {
            order_id: 3,
            user_id: 2,
            amount: dec!(449.99),
            method: PaymentMethod::CreditCard,
            card: Some("4532"),
            age: Duration::hours(2),
            settle_after: None,
            outcome: None,
            refund: None,
        },
        Sample {
            order_id: 4,
            user_id: 1,
            amount: dec!(189.99),
            method: PaymentMethod::CreditCard,
            card: Some("9999"),
            age: Duration::days(10),
            settle_after: Some(Duration::minutes(1)),
            outcome: Some(SettlementOutcome::Failed {
                transaction_id: "TXN-20241115-004-FAIL".to_string(),
                reason: "Insufficient funds".to_string(),
            }),
            refund: None,
        },
        Sample {
            order_id: 5,
            user_id: 2,
            amount: dec!(299.99),
            method: PaymentMethod::PayPal,
            card: None,
            age: Duration::days(7),
            settle_after: Some(Duration::minutes(1)),
            outcome: completed("TXN-20241118-005-OK"),
            refund: Some((Duration::days(1), "Customer requested cancellation")),
        },
        Sample {
            order_id: 6,
            user_id: 3,
            amount: dec!(1899.99),
            method: PaymentMethod::BankTransfer,
            card: None,
            age: Duration::days(3),
            settle_after: Some(Duration::hours(24)),
            outcome: completed("TXN-20241122-006-OK"),
            refund: None,
        },
    ]
}

/// Loads sample payments covering every status into an empty store.
///
/// Returns how many records were written; zero when the store already
/// holds data.
pub async fn seed_demo_data(store: &dyn PaymentStore, now: DateTime<Utc>) -> Result<usize> {
    if store.count().await? > 0 {
        info!("Store already contains payments, skipping demo data");
        return Ok(0);
    }

    let samples = samples();
    let total = samples.len();
    for sample in samples {
        let created_at = now - sample.age;
        let mut payment = store
            .insert(NewPayment {
                order_id: sample.order_id,
                user_id: sample.user_id,
                amount: Amount::new(sample.amount)?,
                currency: Currency::Usd,
                method: sample.method,
                card_last_four_digits: sample.card.map(str::to_owned),
                created_at,
            })
            .await?;

        if let (Some(outcome), Some(after)) = (sample.outcome, sample.settle_after) {
            let completed_at = created_at + after;
            payment.settle(outcome, completed_at)?;
            if let Some((after, reason)) = sample.refund {
                payment.refund(payment.amount, reason.to_string(), completed_at + after)?;
            }
            store.update(payment, PaymentStatus::Pending).await?;
        }
    }

    info!(count = total, "Demo payments created");
    Ok(total)
}
