//! Shared registry of live rooms and the multiplayer waiting slot.

use rand::Rng;
use std::{
    collections::HashMap,
    ops::{Deref, RangeInclusive},
    sync::Arc,
};
use thiserror::Error;
use tokio::sync::{Mutex, MutexGuard, RwLock};

use super::models::{Players, RoomId, SessionId};
use crate::game::state_machine::GameRoom;

/// Room ids are four-digit decimal strings drawn from this range.
pub const DEFAULT_ROOM_ID_RANGE: RangeInclusive<u32> = 1000..=9999;

/// Random draws tried before falling back to a linear scan for a free id.
const RANDOM_ID_ATTEMPTS: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("no free room id left in {min}..={max}")]
    RoomIdsExhausted { min: u32, max: u32 },
}

/// A live room: fixed seating plus the lock-guarded game.
#[derive(Debug)]
pub struct RoomEntry {
    pub id: RoomId,
    pub players: Players,
    pub game: Mutex<GameRoom>,
}

/// Exclusive access to the waiting slot.
///
/// Disconnect cleanup takes this guard before touching rooms. Pairing holds it
/// from reading the waiting player until `start_game` has been emitted, so a
/// concurrent disconnect of that player runs either before the pairing (and
/// empties the slot) or after both players have joined the started room.
pub struct WaitingSlot<'a> {
    guard: MutexGuard<'a, Option<SessionId>>,
}

impl WaitingSlot<'_> {
    pub fn holder(&self) -> Option<SessionId> {
        *self.guard
    }

    /// Empty the slot, returning whoever was waiting.
    pub fn take(&mut self) -> Option<SessionId> {
        self.guard.take()
    }

    /// Park `session` in the slot, returning any previous occupant.
    pub fn park(&mut self, session: SessionId) -> Option<SessionId> {
        self.guard.replace(session)
    }

    /// Empty the slot if `session` holds it.
    pub fn clear_if(&mut self, session: SessionId) -> bool {
        if *self.guard == Some(session) {
            *self.guard = None;
            true
        } else {
            false
        }
    }
}

/// Rooms by id, plus the single pending multiplayer request.
///
/// Lock order is waiting slot, then room index, then an individual room.
/// Each room has its own lock, so a slow AI reply in one room never holds up
/// another.
#[derive(Debug)]
pub struct SessionRegistry {
    rooms: RwLock<HashMap<RoomId, Arc<RoomEntry>>>,
    waiting: Mutex<Option<SessionId>>,
    id_range: RangeInclusive<u32>,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::with_id_range(DEFAULT_ROOM_ID_RANGE)
    }

    pub fn with_id_range(id_range: RangeInclusive<u32>) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            waiting: Mutex::new(None),
            id_range,
        }
    }

    pub async fn waiting(&self) -> WaitingSlot<'_> {
        WaitingSlot {
            guard: self.waiting.lock().await,
        }
    }

    /// Register a new room under a fresh id that no live room uses.
    pub async fn create_room(
        &self,
        players: Players,
        game: GameRoom,
    ) -> Result<Arc<RoomEntry>, RegistryError> {
        let mut rooms = self.rooms.write().await;
        let id = self.allocate_id(&rooms)?;
        let entry = Arc::new(RoomEntry {
            id: id.clone(),
            players,
            game: Mutex::new(game),
        });
        rooms.insert(id, entry.clone());
        Ok(entry)
    }

    fn allocate_id(&self, rooms: &HashMap<RoomId, Arc<RoomEntry>>) -> Result<RoomId, RegistryError> {
        let (min, max) = (*self.id_range.start(), *self.id_range.end());
        let mut rng = rand::rng();
        let random = (0..RANDOM_ID_ATTEMPTS).map(|_| rng.random_range(min..=max));
        random
            .chain(min..=max)
            .map(|n| RoomId::new(n.to_string()))
            .find(|id| !rooms.contains_key(id))
            .ok_or(RegistryError::RoomIdsExhausted { min, max })
    }

    pub async fn get_room(&self, id: &RoomId) -> Option<Arc<RoomEntry>> {
        self.rooms.read().await.get(id).cloned()
    }

    pub async fn remove_room(&self, id: &RoomId) -> Option<Arc<RoomEntry>> {
        self.rooms.write().await.remove(id)
    }

    /// Remove every room `session` is seated in, finished or not.
    pub async fn remove_rooms_of(&self, session: SessionId) -> Vec<Arc<RoomEntry>> {
        let mut rooms = self.rooms.write().await;
        let ids: Vec<RoomId> = rooms
            .values()
            .filter(|entry| entry.players.contains(session))
            .map(|entry| entry.id.clone())
            .collect();
        ids.iter().filter_map(|id| rooms.remove(id)).collect()
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }

    pub async fn room_ids(&self) -> Vec<RoomId> {
        let mut ids: Vec<RoomId> = self.rooms.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl Deref for WaitingSlot<'_> {
    type Target = Option<SessionId>;

    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solo_game() -> GameRoom {
        GameRoom::solo(crate::bot::AiEngine::seeded(1))
    }

    #[tokio::test]
    async fn test_room_ids_are_four_digit_strings() {
        let registry = SessionRegistry::new();
        let entry = registry
            .create_room(Players::solo(SessionId::new()), solo_game())
            .await
            .unwrap();
        let n: u32 = entry.id.as_str().parse().unwrap();
        assert!(DEFAULT_ROOM_ID_RANGE.contains(&n));
        assert!(registry.get_room(&entry.id).await.is_some());
    }

    #[tokio::test]
    async fn test_room_ids_never_collide_and_exhaust_cleanly() {
        let registry = SessionRegistry::with_id_range(1..=3);
        let mut ids = Vec::new();
        for _ in 0..3 {
            let entry = registry
                .create_room(Players::solo(SessionId::new()), solo_game())
                .await
                .unwrap();
            ids.push(entry.id.clone());
        }
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 3);

        let err = registry
            .create_room(Players::solo(SessionId::new()), solo_game())
            .await
            .unwrap_err();
        assert_eq!(err, RegistryError::RoomIdsExhausted { min: 1, max: 3 });
        assert_eq!(registry.room_count().await, 3);
    }

    #[tokio::test]
    async fn test_freed_id_can_be_reused() {
        let registry = SessionRegistry::with_id_range(7..=7);
        let first = registry
            .create_room(Players::solo(SessionId::new()), solo_game())
            .await
            .unwrap();
        registry.remove_room(&first.id).await.unwrap();
        let second = registry
            .create_room(Players::solo(SessionId::new()), solo_game())
            .await
            .unwrap();
        assert_eq!(second.id, RoomId::new("7"));
    }

    #[tokio::test]
    async fn test_remove_rooms_of_only_touches_that_session() {
        let registry = SessionRegistry::new();
        let (a, b, c) = (SessionId::new(), SessionId::new(), SessionId::new());
        registry
            .create_room(Players::pair(a, b), GameRoom::multiplayer())
            .await
            .unwrap();
        let kept = registry
            .create_room(Players::solo(c), solo_game())
            .await
            .unwrap();

        let removed = registry.remove_rooms_of(b).await;
        assert_eq!(removed.len(), 1);
        assert_eq!(registry.room_ids().await, vec![kept.id.clone()]);
    }

    #[tokio::test]
    async fn test_waiting_slot_operations() {
        let registry = SessionRegistry::new();
        let (a, b) = (SessionId::new(), SessionId::new());
        {
            let mut slot = registry.waiting().await;
            assert_eq!(slot.park(a), None);
            assert!(!slot.clear_if(b));
            assert_eq!(slot.holder(), Some(a));
        }
        let mut slot = registry.waiting().await;
        assert!(slot.clear_if(a));
        assert!(slot.is_none());
        assert_eq!(slot.take(), None);
    }
}
