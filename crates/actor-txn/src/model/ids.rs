//! Type-safe identifiers.
//!
//! Participant ids render as TPC-C style composite keys (`w`, `w:d`, `w:d:c`), which is also
//! the instance id under which each participant's state is persisted.

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use uuid::Uuid;

/// Identifier of one run of the commit protocol, assigned by the coordinator on activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxnId(pub Uuid);

impl TxnId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TxnId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for TxnId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WarehouseId(pub u32);

impl Display for WarehouseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DistrictId {
    pub warehouse: u32,
    pub district: u32,
}

impl DistrictId {
    pub fn new(warehouse: u32, district: u32) -> Self {
        Self {
            warehouse,
            district,
        }
    }
}

impl Display for DistrictId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.warehouse, self.district)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerId {
    pub warehouse: u32,
    pub district: u32,
    pub customer: u32,
}

impl CustomerId {
    pub fn new(warehouse: u32, district: u32, customer: u32) -> Self {
        Self {
            warehouse,
            district,
            customer,
        }
    }
}

impl Display for CustomerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.warehouse, self.district, self.customer)
    }
}
