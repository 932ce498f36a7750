//! # Participant Directory
//!
//! The registries of the three participant kinds, and the one place that turns a
//! [`ParticipantRef`] into something the coordinator can call.

use super::ParticipantClient;
use crate::model::{Customer, CustomerId, District, DistrictId, Warehouse, WarehouseId};
use crate::participant::{ParticipantHandle, ParticipantRef};
use crate::participant_actor::{self, CustomerActor, DistrictActor, WarehouseActor};
use actor_runtime::{ActorRegistry, FrameworkError, StateStore};
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct ParticipantDirectory {
    warehouses: ActorRegistry<WarehouseActor>,
    districts: ActorRegistry<DistrictActor>,
    customers: ActorRegistry<CustomerActor>,
}

impl ParticipantDirectory {
    pub fn new(store: Arc<dyn StateStore>, mailbox_size: usize) -> Self {
        Self {
            warehouses: participant_actor::registry::<Warehouse>(store.clone(), mailbox_size),
            districts: participant_actor::registry::<District>(store.clone(), mailbox_size),
            customers: participant_actor::registry::<Customer>(store, mailbox_size),
        }
    }

    pub fn warehouse(&self, id: WarehouseId) -> ParticipantClient<Warehouse> {
        ParticipantClient::new(self.warehouses.actor_ref(id))
    }

    pub fn district(&self, id: DistrictId) -> ParticipantClient<District> {
        ParticipantClient::new(self.districts.actor_ref(id))
    }

    pub fn customer(&self, id: CustomerId) -> ParticipantClient<Customer> {
        ParticipantClient::new(self.customers.actor_ref(id))
    }

    pub fn resolve(&self, participant: &ParticipantRef) -> ParticipantHandle {
        match *participant {
            ParticipantRef::Warehouse(id) => Arc::new(self.warehouse(id)),
            ParticipantRef::District(id) => Arc::new(self.district(id)),
            ParticipantRef::Customer(id) => Arc::new(self.customer(id)),
        }
    }

    /// Number of participant instances currently active, all kinds together.
    pub fn active_count(&self) -> usize {
        self.warehouses.active_count() + self.districts.active_count() + self.customers.active_count()
    }

    /// Stops every participant instance. All kinds are stopped even if one fails.
    pub async fn shutdown(&self) -> Result<(), FrameworkError> {
        let warehouses = self.warehouses.shutdown().await;
        let districts = self.districts.shutdown().await;
        let customers = self.customers.shutdown().await;
        warehouses.and(districts).and(customers)
    }
}
