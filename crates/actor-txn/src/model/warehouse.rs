use super::fields::YTD;
use super::{EntityKind, FieldMap, FieldValue, WarehouseId};

/// A TPC-C warehouse: tracks its year-to-date payment total.
#[derive(Debug, Clone, Copy)]
pub struct Warehouse;

impl EntityKind for Warehouse {
    const KIND: &'static str = "Warehouse";
    type Id = WarehouseId;

    fn initial_fields() -> FieldMap {
        FieldMap::from([(YTD.to_string(), FieldValue::new(30_000_000))])
    }
}
