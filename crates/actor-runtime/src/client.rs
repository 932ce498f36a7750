//! # Actor References
//!
//! This module defines the handle used to talk to one actor instance.

use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use crate::message::ResourceRequest;
use std::fmt;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

/// ## ActorRef
///
/// A type‑safe, async handle to one [`ResourceActor`](crate::ResourceActor) instance. It forwards
/// requests over a Tokio mpsc channel and receives results via oneshot channels.
///
/// * **Cloneable** – holds only an id and a sender, so cloning is inexpensive.
/// * **Three call styles** – `call` (request/response), `call_async` (send now, await the
///   reply later) and `tell` (fire-and-forget).
/// * **Keeps the instance alive** – the mailbox stays open while any strong reference
///   exists; use [`ActorRef::downgrade`] for references that must not.
pub struct ActorRef<T: ActorEntity> {
    id: T::Id,
    sender: mpsc::Sender<ResourceRequest<T>>,
}

impl<T: ActorEntity> Clone for ActorRef<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            sender: self.sender.clone(),
        }
    }
}

impl<T: ActorEntity> fmt::Debug for ActorRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActorRef({}/{})", T::KIND, self.id)
    }
}

impl<T: ActorEntity> ActorRef<T> {
    pub fn new(id: T::Id, sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self { id, sender }
    }

    pub fn id(&self) -> &T::Id {
        &self.id
    }

    /// Snapshot of the instance as it is right now.
    pub async fn get(&self) -> Result<T, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(ResourceRequest::Get { respond_to })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    /// Request/response invocation.
    pub async fn call(&self, action: T::Action) -> Result<T::ActionResult, FrameworkError> {
        self.call_async(action).await?.wait().await
    }

    /// Enqueues the action and hands back the pending reply without waiting for it.
    ///
    /// Several instances can be called this way and their replies collected afterwards.
    pub async fn call_async(
        &self,
        action: T::Action,
    ) -> Result<PendingReply<T::ActionResult>, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(ResourceRequest::Action {
                action,
                respond_to: Some(respond_to),
            })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        Ok(PendingReply { response })
    }

    /// Fire-and-forget invocation. Only delivery into the mailbox is confirmed.
    pub async fn tell(&self, action: T::Action) -> Result<(), FrameworkError> {
        self.sender
            .send(ResourceRequest::Action {
                action,
                respond_to: None,
            })
            .await
            .map_err(|_| FrameworkError::ActorClosed)
    }

    /// Asks the instance to stop after the messages already queued.
    pub(crate) async fn shutdown(&self) -> Result<(), FrameworkError> {
        self.sender
            .send(ResourceRequest::Shutdown)
            .await
            .map_err(|_| FrameworkError::ActorClosed)
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    pub fn downgrade(&self) -> WeakActorRef<T> {
        WeakActorRef {
            id: self.id.clone(),
            sender: self.sender.downgrade(),
        }
    }
}

/// A reference that does not keep the instance's mailbox open.
pub struct WeakActorRef<T: ActorEntity> {
    id: T::Id,
    sender: mpsc::WeakSender<ResourceRequest<T>>,
}

impl<T: ActorEntity> Clone for WeakActorRef<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            sender: self.sender.clone(),
        }
    }
}

impl<T: ActorEntity> WeakActorRef<T> {
    pub fn upgrade(&self) -> Option<ActorRef<T>> {
        self.sender
            .upgrade()
            .map(|sender| ActorRef::new(self.id.clone(), sender))
    }
}

/// Reply of an action sent with [`ActorRef::call_async`].
#[derive(Debug)]
pub struct PendingReply<R> {
    response: oneshot::Receiver<Result<R, FrameworkError>>,
}

impl<R> PendingReply<R> {
    pub async fn wait(self) -> Result<R, FrameworkError> {
        self.response
            .await
            .map_err(|_| FrameworkError::ActorDropped)?
    }

    /// Like [`PendingReply::wait`], but gives up after `deadline`.
    pub async fn wait_timeout(self, deadline: Duration) -> Result<R, FrameworkError> {
        tokio::time::timeout(deadline, self.wait())
            .await
            .map_err(|_| FrameworkError::Timeout(deadline))?
    }
}
