use crate::clients::{ParticipantDirectory, TransactionClient};
use crate::config::{ConfigError, CoordinatorConfig};
use crate::model::Decision;
use crate::participant::{ParticipantHandle, ParticipantRef};
use crate::payment::{PaymentError, PaymentRequest, PaymentTxn};
use crate::transaction_actor::{self, Transaction, TransactionError};
use actor_runtime::{
    ActorRegistry, FileStateStore, FrameworkError, InMemoryStateStore, StateError, StateStore,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

/// Errors raised while starting a [`TxnSystem`].
#[derive(Debug, Error)]
pub enum SystemError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Cannot open state store: {0}")]
    State(#[from] StateError),
}

/// A payment's decision and the coordinator that reached it.
#[derive(Debug, Clone)]
pub struct PaymentReceipt {
    pub transaction: TransactionClient,
    pub decision: Decision,
}

/// The running system: all registries over one state store.
///
/// # Example
///
/// ```ignore
/// let system = TxnSystem::with_store(CoordinatorConfig::default(), Arc::new(InMemoryStateStore::new()));
/// let txn = system.new_transaction();
/// let decision = txn.transact(participants, operations).await?;
/// system.shutdown().await?;
/// ```
pub struct TxnSystem {
    config: CoordinatorConfig,
    store: Arc<dyn StateStore>,
    /// The participant actors, by kind.
    pub directory: ParticipantDirectory,
    transactions: ActorRegistry<Transaction>,
}

impl TxnSystem {
    /// Validates `config` and builds the system over the store it names.
    pub async fn new(config: CoordinatorConfig) -> Result<Self, SystemError> {
        config.validate()?;
        let store: Arc<dyn StateStore> = match &config.state_dir {
            Some(dir) => {
                info!(state_dir = %dir.display(), "Using file state store");
                Arc::new(FileStateStore::open(dir.clone()).await?)
            }
            None => {
                info!("Using in-memory state store");
                Arc::new(InMemoryStateStore::new())
            }
        };
        Ok(Self::with_store(config, store))
    }

    /// Builds the system over an existing store, ignoring `config.state_dir`.
    pub fn with_store(config: CoordinatorConfig, store: Arc<dyn StateStore>) -> Self {
        let directory = ParticipantDirectory::new(store.clone(), config.mailbox_size);
        let transactions = transaction_actor::registry(store.clone(), config.clone());
        Self {
            config,
            store,
            directory,
            transactions,
        }
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    pub fn store(&self) -> Arc<dyn StateStore> {
        self.store.clone()
    }

    /// A coordinator under a fresh instance name. Use one per business transaction.
    pub fn new_transaction(&self) -> TransactionClient {
        self.transaction(Uuid::new_v4().to_string())
    }

    /// The coordinator instance called `name`, activated on first use.
    pub fn transaction(&self, name: impl Into<String>) -> TransactionClient {
        TransactionClient::new(self.transactions.actor_ref(name.into()))
    }

    /// Stops the coordinator behind `transaction` once its commit phase is complete.
    ///
    /// Returns `false`, leaving the coordinator running, while participants still have to
    /// acknowledge the decision. A retired coordinator's record stays in the store and
    /// [`TxnSystem::transaction`] re-activates it by name.
    pub async fn retire(&self, transaction: TransactionClient) -> Result<bool, TransactionError> {
        if !transaction.is_complete().await? {
            return Ok(false);
        }
        let name = transaction.name().to_string();
        drop(transaction);
        let retired = self
            .transactions
            .passivate(&name)
            .await
            .map_err(|e| TransactionError::ActorCommunication(e.to_string()))?;
        info!(txn = %name, retired, "Coordinator retired");
        Ok(retired)
    }

    /// Number of coordinator instances currently running.
    pub fn active_transactions(&self) -> usize {
        self.transactions.active_count()
    }

    pub fn participant(&self, participant: &ParticipantRef) -> ParticipantHandle {
        self.directory.resolve(participant)
    }

    /// A payment driver bound to a fresh coordinator.
    pub fn payment_txn(&self) -> PaymentTxn {
        PaymentTxn::new(self.directory.clone(), self.new_transaction())
    }

    /// Runs one payment on a fresh coordinator.
    pub async fn payment(&self, request: PaymentRequest) -> Result<PaymentReceipt, PaymentError> {
        let payment = self.payment_txn();
        let decision = payment.start_txn(request).await?;
        Ok(PaymentReceipt {
            transaction: payment.transaction().clone(),
            decision,
        })
    }

    /// Gracefully shuts down the entire system: coordinators first, then participants.
    pub async fn shutdown(self) -> Result<(), FrameworkError> {
        info!("Shutting down system...");
        let transactions = self.transactions.shutdown().await;
        let participants = self.directory.shutdown().await;
        if let Err(e) = transactions.as_ref().and(participants.as_ref()) {
            error!(error = %e, "Shutdown incomplete");
        } else {
            info!("System shutdown complete.");
        }
        transactions.and(participants)
    }
}
