//! # Actor Transactions Demo
//!
//! Runs two TPC-C payments against warehouse 1, district 1:1 and customer 1:1:1:
//!
//! 1. A payment within the customer's credit limit, which commits.
//! 2. A payment that would exceed it, which the customer votes down and the coordinator aborts.
//!
//! Configuration comes from the environment (see [`actor_txn::config`]); set
//! `TXN_STATE_DIR` to keep state across runs.

use actor_txn::clients::ParticipantClient;
use actor_txn::config::CoordinatorConfig;
use actor_txn::lifecycle::{setup_tracing, TxnSystem};
use actor_txn::model::{Customer, CustomerId};
use actor_txn::payment::PaymentRequest;
use tracing::{error, info, Instrument};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Setup tracing once for the entire application
    setup_tracing();

    let config = CoordinatorConfig::from_env()?;
    let settle = config.call_timeout * 2;
    info!(?config, "Starting transaction system");
    let system = TxnSystem::new(config).await?;

    let customer = system.directory.customer(CustomerId::new(1, 1, 1));
    log_customer("before", &customer).await;

    for amount in [5_000, 10_000_000] {
        let request = PaymentRequest {
            w_id: 1,
            d_id: 1,
            c_id: 1,
            amount,
        };
        let span = tracing::info_span!("payment", amount);
        let result = async {
            let receipt = system.payment(request).await?;
            let complete = receipt.transaction.await_completion(settle).await?;
            info!(decision = %receipt.decision, complete, "Payment finished");
            if complete {
                system.retire(receipt.transaction).await?;
            }
            Ok::<_, Box<dyn std::error::Error>>(())
        }
        .instrument(span)
        .await;

        if let Err(e) = result {
            error!(error = %e, "Payment failed");
        }
        log_customer("after", &customer).await;
    }

    system.shutdown().await?;
    info!("Application completed successfully");
    Ok(())
}

async fn log_customer(when: &str, customer: &ParticipantClient<Customer>) {
    match customer.read(&["balance", "ytdPayment", "paymentCnt"]).await {
        Ok(fields) => {
            let val = |name: &str| fields.get(name).map(|field| field.val);
            info!(
                when,
                balance = ?val("balance"),
                ytd_payment = ?val("ytdPayment"),
                payment_cnt = ?val("paymentCnt"),
                "Customer 1:1:1"
            );
        }
        Err(e) => error!(error = %e, "Cannot read customer"),
    }
}
