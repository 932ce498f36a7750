//! # Generic Messages
//!
//! This module defines the generic message types used for communication between
//! an [`ActorRef`](crate::ActorRef) and the [`ResourceActor`](crate::ResourceActor) it points at.

use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by actors.
pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// Internal message type sent to an actor instance.
///
/// Messages are addressed to one instance, so unlike a CRUD store they carry no id.
///
/// - **Get**: Snapshot read of the in-memory instance.
/// - **Action**: Executes an [`ActorEntity::Action`]. `respond_to` is `None` for a
///   fire-and-forget `tell`; the result is then only logged.
/// - **Shutdown**: Ends the instance's loop once everything queued before it is handled.
#[derive(Debug)]
pub enum ResourceRequest<T: ActorEntity> {
    Get {
        respond_to: Response<T>,
    },
    Action {
        action: T::Action,
        respond_to: Option<Response<T::ActionResult>>,
    },
    Shutdown,
}
