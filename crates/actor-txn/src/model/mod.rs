//! # Domain Model
//!
//! Plain data shared by the coordinator, the participants and the payment driver. Nothing in
//! here talks to an actor.

mod customer;
mod district;
mod ids;
mod kind;
mod warehouse;

pub use customer::Customer;
pub use district::District;
pub use ids::{CustomerId, DistrictId, TxnId, WarehouseId};
pub use kind::EntityKind;
pub use warehouse::Warehouse;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;

/// Field names used by the payment workflow.
pub mod fields {
    pub const YTD: &str = "ytd";
    pub const BALANCE: &str = "balance";
    pub const YTD_PAYMENT: &str = "ytdPayment";
    pub const PAYMENT_CNT: &str = "paymentCnt";
    pub const CREDIT_LIM: &str = "creditLim";
}

/// Outcome of the commit protocol. Absent until decided, then never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Commit,
    Abort,
}

impl Decision {
    /// The conjunction of all votes: commit only if every participant said yes.
    pub fn from_votes(votes: impl IntoIterator<Item = bool>) -> Self {
        if votes.into_iter().all(|vote| vote) {
            Decision::Commit
        } else {
            Decision::Abort
        }
    }

    pub fn is_commit(self) -> bool {
        matches!(self, Decision::Commit)
    }
}

impl From<bool> for Decision {
    fn from(commit: bool) -> Self {
        if commit {
            Decision::Commit
        } else {
            Decision::Abort
        }
    }
}

impl From<Decision> for bool {
    fn from(decision: Decision) -> Self {
        decision.is_commit()
    }
}

impl Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Decision::Commit => write!(f, "commit"),
            Decision::Abort => write!(f, "abort"),
        }
    }
}

/// A committed field value and the number of commits that have written it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValue {
    pub val: i64,
    pub version: u64,
}

impl FieldValue {
    pub fn new(val: i64) -> Self {
        Self { val, version: 0 }
    }
}

/// All fields of one participant, by name.
pub type FieldMap = BTreeMap<String, FieldValue>;

/// One field of an [`Operation`]: the new absolute value and the version it was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldWrite {
    pub val: i64,
    #[serde(rename = "readVersion")]
    pub read_version: u64,
}

/// The update one participant is asked to apply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Operation(pub BTreeMap<String, FieldWrite>);

impl Operation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a write of `val` to `field`, valid only while the field is still at `read_version`.
    pub fn write(mut self, field: impl Into<String>, val: i64, read_version: u64) -> Self {
        self.0.insert(field.into(), FieldWrite { val, read_version });
        self
    }

    pub fn writes(&self) -> impl Iterator<Item = (&String, &FieldWrite)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_is_the_conjunction_of_votes() {
        assert_eq!(Decision::from_votes([true, true, true]), Decision::Commit);
        assert_eq!(Decision::from_votes([true, false, true]), Decision::Abort);
        assert_eq!(Decision::from_votes([]), Decision::Commit);
    }

    #[test]
    fn decision_persists_as_lowercase() {
        assert_eq!(serde_json::to_value(Decision::Commit).unwrap(), "commit");
        assert_eq!(
            serde_json::from_value::<Decision>(serde_json::json!("abort")).unwrap(),
            Decision::Abort
        );
    }

    #[test]
    fn operation_wire_shape() {
        let op = Operation::new().write(fields::YTD, 10, 3);
        assert_eq!(
            serde_json::to_value(&op).unwrap(),
            serde_json::json!({ "ytd": { "val": 10, "readVersion": 3 } })
        );
    }
}
