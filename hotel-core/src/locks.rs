use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// Per-room async mutexes serializing read-decide-write sequences on a room.
#[derive(Clone, Default)]
pub struct RoomLocks {
    inner: Arc<Mutex<HashMap<Uuid, Arc<Mutex<()>>>>>,
}

impl RoomLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, room_id: Uuid) -> OwnedMutexGuard<()> {
        let slot = {
            let mut map = self.inner.lock().await;
            map.entry(room_id).or_default().clone()
        };
        slot.lock_owned().await
    }

    /// Locks every listed room in id order so two callers never wait on each other crosswise.
    pub async fn lock_all(&self, room_ids: &[Uuid]) -> Vec<OwnedMutexGuard<()>> {
        let mut ids = room_ids.to_vec();
        ids.sort();
        ids.dedup();

        let mut guards = Vec::with_capacity(ids.len());
        for id in ids {
            guards.push(self.lock(id).await);
        }
        guards
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_room_is_serialized() {
        let locks = RoomLocks::new();
        let room = Uuid::new_v4();

        let guard = locks.lock(room).await;
        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _g = locks.lock(room).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), contender)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_distinct_rooms_do_not_block() {
        let locks = RoomLocks::new();
        let _a = locks.lock(Uuid::new_v4()).await;
        let b = tokio::time::timeout(Duration::from_millis(100), locks.lock(Uuid::new_v4())).await;
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn test_lock_all_dedups() {
        let locks = RoomLocks::new();
        let room = Uuid::new_v4();
        let guards = locks.lock_all(&[room, room]).await;
        assert_eq!(guards.len(), 1);
    }
}
