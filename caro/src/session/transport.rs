//! Outbound delivery seam between the session core and the transport.
//!
//! The core only needs two guarantees: delivery to a named session and
//! fan-out to a named group. [`EventSink`] captures exactly that;
//! [`ChannelHub`] implements it over bounded tokio channels, one per session,
//! which a transport drains into its sockets.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};
use thiserror::Error;
use tokio::sync::mpsc;

use super::models::{RoomId, SessionId};
use crate::net::messages::ServerEvent;

/// Delivery failures. The core logs these and carries on.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("session {0} is not connected")]
    SessionGone(SessionId),

    #[error("outbound queue for session {0} is full")]
    ChannelFull(SessionId),
}

/// Fire-and-forget event delivery. Implementations must not block.
pub trait EventSink: Send + Sync {
    /// Deliver `event` to a single session.
    fn send_to(&self, session: SessionId, event: ServerEvent) -> Result<(), TransportError>;

    /// Subscribe `session` to the broadcast group of `room`.
    fn join_group(&self, room: &RoomId, session: SessionId) -> Result<(), TransportError>;

    /// Deliver `event` to every member of the group of `room`. Delivery is
    /// attempted for all members even if some fail; the first failure is
    /// returned.
    fn broadcast(&self, room: &RoomId, event: ServerEvent) -> Result<(), TransportError>;

    /// Forget the group of `room`.
    fn close_group(&self, room: &RoomId);
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Channel-backed [`EventSink`].
#[derive(Debug, Default)]
pub struct ChannelHub {
    sessions: Mutex<HashMap<SessionId, mpsc::Sender<ServerEvent>>>,
    groups: Mutex<HashMap<RoomId, Vec<SessionId>>>,
}

impl ChannelHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open an outbound queue for `session`, holding up to `capacity`
    /// undelivered events.
    pub fn register(&self, session: SessionId, capacity: usize) -> mpsc::Receiver<ServerEvent> {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        lock(&self.sessions).insert(session, sender);
        receiver
    }

    /// Close the queue of `session` and drop it from every group.
    pub fn unregister(&self, session: SessionId) {
        lock(&self.sessions).remove(&session);
        for members in lock(&self.groups).values_mut() {
            members.retain(|&member| member != session);
        }
    }

    pub fn session_count(&self) -> usize {
        lock(&self.sessions).len()
    }

    pub fn group_members(&self, room: &RoomId) -> Vec<SessionId> {
        lock(&self.groups).get(room).cloned().unwrap_or_default()
    }

    fn deliver(&self, session: SessionId, event: ServerEvent) -> Result<(), TransportError> {
        let sessions = lock(&self.sessions);
        let sender = sessions
            .get(&session)
            .ok_or(TransportError::SessionGone(session))?;
        sender.try_send(event).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => TransportError::ChannelFull(session),
            mpsc::error::TrySendError::Closed(_) => TransportError::SessionGone(session),
        })
    }
}

impl EventSink for ChannelHub {
    fn send_to(&self, session: SessionId, event: ServerEvent) -> Result<(), TransportError> {
        self.deliver(session, event)
    }

    fn join_group(&self, room: &RoomId, session: SessionId) -> Result<(), TransportError> {
        if !lock(&self.sessions).contains_key(&session) {
            return Err(TransportError::SessionGone(session));
        }
        let mut groups = lock(&self.groups);
        let members = groups.entry(room.clone()).or_default();
        if !members.contains(&session) {
            members.push(session);
        }
        Ok(())
    }

    fn broadcast(&self, room: &RoomId, event: ServerEvent) -> Result<(), TransportError> {
        let mut first_error = None;
        for member in self.group_members(room) {
            if let Err(e) = self.deliver(member, event.clone()) {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn close_group(&self, room: &RoomId) {
        lock(&self.groups).remove(room);
    }
}
