//! # Participant Contract
//!
//! Anything the coordinator can drive through the commit protocol. The coordinator only ever
//! sees a list of [`ParticipantHandle`]s, so participants can be actors of any kind, or test
//! doubles.
//!
//! Both operations must be idempotent per transaction id: the coordinator resends them after
//! crashes and failed commit rounds.

use crate::model::{CustomerId, Decision, DistrictId, Operation, TxnId, WarehouseId};
use crate::participant_actor::ParticipantError;
use async_trait::async_trait;
use std::fmt::{self, Debug, Display};
use std::sync::Arc;

#[async_trait]
pub trait Participant: Send + Sync + Debug {
    /// Name used in logs, e.g. `Customer/1:1:1`.
    fn name(&self) -> String;

    /// Votes on `operation`. `Ok(true)` means the update is durably staged and will be applied
    /// if the decision is commit. A repeated prepare returns the vote already cast.
    async fn prepare(&self, txn_id: &TxnId, operation: &Operation) -> Result<bool, ParticipantError>;

    /// Applies (commit) or discards (abort) the staged update. Finalizing an already finalized
    /// transaction succeeds without doing anything.
    async fn commit(
        &self,
        txn_id: &TxnId,
        decision: Decision,
        operation: &Operation,
    ) -> Result<(), ParticipantError>;
}

/// Shared, type-erased participant as handed to the coordinator.
pub type ParticipantHandle = Arc<dyn Participant>;

/// Address of a participant actor, resolved by a
/// [`ParticipantDirectory`](crate::clients::ParticipantDirectory).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParticipantRef {
    Warehouse(WarehouseId),
    District(DistrictId),
    Customer(CustomerId),
}

impl Display for ParticipantRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParticipantRef::Warehouse(id) => write!(f, "Warehouse/{id}"),
            ParticipantRef::District(id) => write!(f, "District/{id}"),
            ParticipantRef::Customer(id) => write!(f, "Customer/{id}"),
        }
    }
}
