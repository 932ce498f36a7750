//! # Participant Ledger
//!
//! The state machine behind every participant kind: versioned committed fields, at most one
//! staged update, and the bookkeeping that makes `prepare` and `commit` idempotent.
//!
//! The ledger is pure. Every step is planned as a [`LedgerChange`], which the entity persists
//! key by key before applying it, so persisting one step never rewrites other transactions.

use super::error::ParticipantError;
use crate::model::{Decision, FieldMap, Operation, TxnId};
use actor_runtime::{StateError, StateMap};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

const FIELDS: &str = "fields";
const PENDING: &str = "pending";
const VOTE_PREFIX: &str = "vote:";
const FINALIZED_PREFIX: &str = "finalized:";

/// An update staged by a commit vote, invisible until the decision arrives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingUpdate {
    #[serde(rename = "txnId")]
    pub txn_id: TxnId,
    pub operation: Operation,
}

/// Why a participant voted abort.
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    /// Another transaction is staged on this participant.
    Busy(TxnId),
    /// The operation writes a field this participant does not have.
    UnknownField(String),
    /// The field changed since the driver read it.
    StaleRead {
        field: String,
        expected: u64,
        actual: u64,
    },
    /// The kind refused the resulting values.
    Invalid(String),
    /// The transaction was already finalized here without a vote.
    AlreadyFinalized,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Busy(other) => write!(f, "transaction {other} is pending"),
            Rejection::UnknownField(field) => write!(f, "unknown field {field}"),
            Rejection::StaleRead {
                field,
                expected,
                actual,
            } => write!(f, "{field} read at version {expected}, now at {actual}"),
            Rejection::Invalid(reason) => write!(f, "{reason}"),
            Rejection::AlreadyFinalized => write!(f, "already finalized"),
        }
    }
}

/// Result of [`ParticipantLedger::plan_prepare`].
#[derive(Debug, Clone, PartialEq)]
pub enum PrepareOutcome {
    /// A vote was cast before for this transaction; nothing changed.
    Repeated(bool),
    /// The update is staged; vote commit.
    Staged,
    /// Vote abort.
    Rejected(Rejection),
}

impl PrepareOutcome {
    pub fn vote(&self) -> bool {
        match self {
            PrepareOutcome::Repeated(vote) => *vote,
            PrepareOutcome::Staged => true,
            PrepareOutcome::Rejected(_) => false,
        }
    }
}

/// One step of the ledger, planned against the current ledger, persisted, then applied.
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerChange {
    /// First vote of `txn_id`. A commit vote stages `operation`.
    Vote {
        txn_id: TxnId,
        vote: bool,
        staged: Option<Operation>,
    },
    /// The decision for `txn_id` arrived. `fields` holds the new committed fields when a staged
    /// update was applied; `unstage` clears the pending update of `txn_id`.
    Finalize {
        txn_id: TxnId,
        decision: Decision,
        fields: Option<FieldMap>,
        unstage: bool,
    },
}

/// Persisted keys a [`LedgerChange`] writes and removes.
#[derive(Debug, Default, PartialEq)]
pub struct LedgerWrite {
    pub set: StateMap,
    pub remove: Vec<String>,
}

impl LedgerChange {
    /// Only the keys this change touches, never the whole ledger.
    pub fn to_write(&self) -> Result<LedgerWrite, StateError> {
        let mut write = LedgerWrite::default();
        match self {
            LedgerChange::Vote {
                txn_id,
                vote,
                staged,
            } => {
                write.set.insert(vote_key(txn_id), serde_json::to_value(vote)?);
                if let Some(operation) = staged {
                    let pending = PendingUpdate {
                        txn_id: *txn_id,
                        operation: operation.clone(),
                    };
                    write.set.insert(PENDING.to_string(), serde_json::to_value(&pending)?);
                }
            }
            LedgerChange::Finalize {
                txn_id,
                decision,
                fields,
                unstage,
            } => {
                // Fields, pending and the decision land in one write so a crash never leaves
                // an applied update still staged.
                write
                    .set
                    .insert(finalized_key(txn_id), serde_json::to_value(decision)?);
                if let Some(fields) = fields {
                    write.set.insert(FIELDS.to_string(), serde_json::to_value(fields)?);
                }
                if *unstage {
                    write.set.insert(PENDING.to_string(), Value::Null);
                }
                write.remove.push(vote_key(txn_id));
            }
        }
        Ok(write)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParticipantLedger {
    pub fields: FieldMap,
    pub pending: Option<PendingUpdate>,
    /// Votes of transactions not finalized yet.
    pub votes: BTreeMap<TxnId, bool>,
    pub finalized: BTreeMap<TxnId, Decision>,
}

impl ParticipantLedger {
    pub fn new(fields: FieldMap) -> Self {
        Self {
            fields,
            ..Self::default()
        }
    }

    /// Votes on `operation` for `txn_id` without changing the ledger.
    ///
    /// `validate` sees the committed fields and the fields as they would be after the update.
    /// The change is `None` when the vote is already on record or the transaction is finalized.
    pub fn plan_prepare(
        &self,
        txn_id: &TxnId,
        operation: &Operation,
        validate: impl Fn(&FieldMap, &FieldMap) -> Result<(), String>,
    ) -> (PrepareOutcome, Option<LedgerChange>) {
        if self.finalized.contains_key(txn_id) {
            return (PrepareOutcome::Rejected(Rejection::AlreadyFinalized), None);
        }
        if let Some(vote) = self.votes.get(txn_id) {
            return (PrepareOutcome::Repeated(*vote), None);
        }

        let outcome = match self.check(operation, validate) {
            Ok(()) => PrepareOutcome::Staged,
            Err(rejection) => PrepareOutcome::Rejected(rejection),
        };
        let change = LedgerChange::Vote {
            txn_id: *txn_id,
            vote: outcome.vote(),
            staged: outcome.vote().then(|| operation.clone()),
        };
        (outcome, Some(change))
    }

    fn check(
        &self,
        operation: &Operation,
        validate: impl Fn(&FieldMap, &FieldMap) -> Result<(), String>,
    ) -> Result<(), Rejection> {
        if let Some(pending) = &self.pending {
            return Err(Rejection::Busy(pending.txn_id));
        }

        let mut after = self.fields.clone();
        for (name, write) in operation.writes() {
            let field = after
                .get_mut(name)
                .ok_or_else(|| Rejection::UnknownField(name.clone()))?;
            if field.version != write.read_version {
                return Err(Rejection::StaleRead {
                    field: name.clone(),
                    expected: write.read_version,
                    actual: field.version,
                });
            }
            field.val = write.val;
        }

        validate(&self.fields, &after).map_err(Rejection::Invalid)
    }

    /// Plans applying or discarding the staged update of `txn_id`.
    ///
    /// `None` when `txn_id` is already finalized here.
    pub fn plan_commit(
        &self,
        txn_id: &TxnId,
        decision: Decision,
        operation: &Operation,
    ) -> Result<Option<LedgerChange>, ParticipantError> {
        if self.finalized.contains_key(txn_id) {
            return Ok(None);
        }

        // Some(same operation?) when `txn_id` is the staged transaction.
        let staged = self
            .pending
            .as_ref()
            .filter(|pending| pending.txn_id == *txn_id)
            .map(|pending| pending.operation == *operation);

        let fields = match (decision, staged) {
            (Decision::Commit, None) => return Err(ParticipantError::NotPrepared(*txn_id)),
            (Decision::Commit, Some(false)) => {
                return Err(ParticipantError::OperationMismatch(*txn_id))
            }
            (Decision::Commit, Some(true)) => {
                let mut fields = self.fields.clone();
                for (name, write) in operation.writes() {
                    if let Some(field) = fields.get_mut(name) {
                        field.val = write.val;
                        field.version += 1;
                    }
                }
                Some(fields)
            }
            // Abort of an update never staged here: only remember it.
            (Decision::Abort, _) => None,
        };

        Ok(Some(LedgerChange::Finalize {
            txn_id: *txn_id,
            decision,
            fields,
            unstage: staged.is_some(),
        }))
    }

    /// Applies a change planned against this ledger.
    pub fn apply(&mut self, change: LedgerChange) {
        match change {
            LedgerChange::Vote {
                txn_id,
                vote,
                staged,
            } => {
                if let Some(operation) = staged {
                    self.pending = Some(PendingUpdate { txn_id, operation });
                }
                self.votes.insert(txn_id, vote);
            }
            LedgerChange::Finalize {
                txn_id,
                decision,
                fields,
                unstage,
            } => {
                if let Some(fields) = fields {
                    self.fields = fields;
                }
                if unstage {
                    self.pending = None;
                }
                self.votes.remove(&txn_id);
                self.finalized.insert(txn_id, decision);
            }
        }
    }

    /// [`ParticipantLedger::plan_prepare`] followed by [`ParticipantLedger::apply`].
    pub fn prepare(
        &mut self,
        txn_id: &TxnId,
        operation: &Operation,
        validate: impl Fn(&FieldMap, &FieldMap) -> Result<(), String>,
    ) -> PrepareOutcome {
        let (outcome, change) = self.plan_prepare(txn_id, operation, validate);
        if let Some(change) = change {
            self.apply(change);
        }
        outcome
    }

    /// [`ParticipantLedger::plan_commit`] followed by [`ParticipantLedger::apply`]. Returns
    /// whether anything changed.
    pub fn commit(
        &mut self,
        txn_id: &TxnId,
        decision: Decision,
        operation: &Operation,
    ) -> Result<bool, ParticipantError> {
        match self.plan_commit(txn_id, decision, operation)? {
            Some(change) => {
                self.apply(change);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Committed values of the requested fields that exist.
    pub fn read(&self, names: &[String]) -> FieldMap {
        names
            .iter()
            .filter_map(|name| self.fields.get(name).map(|field| (name.clone(), *field)))
            .collect()
    }

    /// The whole ledger as persisted fields, one key per transaction.
    pub fn to_state(&self) -> Result<StateMap, StateError> {
        let mut state = StateMap::from([
            (FIELDS.to_string(), serde_json::to_value(&self.fields)?),
            (PENDING.to_string(), serde_json::to_value(&self.pending)?),
        ]);
        for (txn_id, vote) in &self.votes {
            state.insert(vote_key(txn_id), serde_json::to_value(vote)?);
        }
        for (txn_id, decision) in &self.finalized {
            state.insert(finalized_key(txn_id), serde_json::to_value(decision)?);
        }
        Ok(state)
    }

    /// Rebuilds a ledger from persisted fields. `None` for a participant never persisted.
    pub fn from_state(state: &StateMap) -> Result<Option<Self>, StateError> {
        let Some(fields) = state.get(FIELDS) else {
            return Ok(None);
        };
        let mut ledger = Self {
            fields: decode(FIELDS, fields)?,
            pending: decode(PENDING, state.get(PENDING).unwrap_or(&Value::Null))?,
            ..Self::default()
        };
        for (key, value) in state {
            if let Some(txn_id) = key.strip_prefix(FINALIZED_PREFIX) {
                ledger
                    .finalized
                    .insert(decode_txn(key, txn_id)?, decode(key, value)?);
            } else if let Some(txn_id) = key.strip_prefix(VOTE_PREFIX) {
                ledger.votes.insert(decode_txn(key, txn_id)?, decode(key, value)?);
            }
        }
        // A vote left behind by a crash between finalizing and dropping it.
        let finalized = &ledger.finalized;
        ledger.votes.retain(|txn_id, _| !finalized.contains_key(txn_id));
        Ok(Some(ledger))
    }
}

fn vote_key(txn_id: &TxnId) -> String {
    format!("{VOTE_PREFIX}{txn_id}")
}

fn finalized_key(txn_id: &TxnId) -> String {
    format!("{FINALIZED_PREFIX}{txn_id}")
}

fn decode<V: DeserializeOwned>(key: &str, value: &Value) -> Result<V, StateError> {
    serde_json::from_value(value.clone()).map_err(|e| StateError::Corrupt {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

fn decode_txn(key: &str, txn_id: &str) -> Result<TxnId, StateError> {
    decode(key, &Value::String(txn_id.to_string()))
}
