//! Shared in-memory state: slot and scene boards, per-slot locks and the
//! progress event bus.
//!
//! Board mutexes are synchronous and never held across an `.await`; the
//! per-slot async locks serialize whole operations on one slot.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use promogen_models::{ContentSlot, SceneBoard, SlotBoard, SlotKey, StudioEvent};
use tokio::sync::{broadcast, OwnedMutexGuard};

const EVENT_CAPACITY: usize = 256;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Slot board plus one async lock per slot.
#[derive(Debug, Clone, Default)]
pub struct SlotStore {
    board: Arc<Mutex<SlotBoard>>,
    locks: Arc<Mutex<HashMap<SlotKey, Arc<tokio::sync::Mutex<()>>>>>,
}

impl SlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to one slot.
    pub async fn lock_slot(&self, key: SlotKey) -> OwnedMutexGuard<()> {
        let slot_lock = lock(&self.locks).entry(key).or_default().clone();
        slot_lock.lock_owned().await
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut SlotBoard) -> R) -> R {
        f(&mut lock(&self.board))
    }

    pub fn read<R>(&self, f: impl FnOnce(&SlotBoard) -> R) -> R {
        f(&lock(&self.board))
    }

    pub fn get(&self, key: &SlotKey) -> Option<ContentSlot> {
        self.read(|board| board.get(key).cloned())
    }

    pub fn snapshot(&self) -> SlotBoard {
        self.read(SlotBoard::clone)
    }
}

/// Scene board shared between the story pipeline and manual scene edits.
#[derive(Debug, Clone, Default)]
pub struct SceneStore {
    board: Arc<Mutex<SceneBoard>>,
}

impl SceneStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut SceneBoard) -> R) -> R {
        f(&mut lock(&self.board))
    }

    pub fn read<R>(&self, f: impl FnOnce(&SceneBoard) -> R) -> R {
        f(&lock(&self.board))
    }

    pub fn snapshot(&self) -> SceneBoard {
        self.read(SceneBoard::clone)
    }
}

/// Broadcast channel for [`StudioEvent`]s. Sending never fails the caller.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<StudioEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self { tx }
    }

    pub fn emit(&self, event: StudioEvent) {
        // No subscribers is fine.
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StudioEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
