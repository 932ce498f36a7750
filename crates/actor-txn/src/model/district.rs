use super::fields::YTD;
use super::{DistrictId, EntityKind, FieldMap, FieldValue};

/// A TPC-C district of a warehouse.
#[derive(Debug, Clone, Copy)]
pub struct District;

impl EntityKind for District {
    const KIND: &'static str = "District";
    type Id = DistrictId;

    fn initial_fields() -> FieldMap {
        FieldMap::from([(YTD.to_string(), FieldValue::new(3_000_000))])
    }
}
