use super::FieldMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// What distinguishes one participant kind from another: its name, how its instances are
/// keyed, what fields a fresh instance starts with, and which updates it refuses.
pub trait EntityKind: Send + Sync + 'static {
    const KIND: &'static str;

    type Id: Eq + Hash + Clone + Copy + Send + Sync + Display + Debug + 'static;

    /// Fields of an instance that has never been written.
    fn initial_fields() -> FieldMap;

    /// Checks the fields an update would leave behind. `Err` carries the reason for refusing.
    fn validate(_before: &FieldMap, _after: &FieldMap) -> Result<(), String> {
        Ok(())
    }
}
