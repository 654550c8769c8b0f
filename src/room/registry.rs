//! Room registry: room name to member set, plus fan-out
//!
//! # Locking
//!
//! The room map sits behind a `parking_lot::RwLock`; each room's member list
//! has its own `Mutex`. Joins, leaves and broadcasts on existing rooms only
//! take the map's read lock, so rooms do not serialize against each other.
//! The write lock is taken briefly to create a room or drop an empty one.
//!
//! No lock is held while delivering: `broadcast` snapshots the member handles
//! and then pushes into each member's outbox with `try_send`.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::events::RoomEvent;
use super::id::RoomId;

/// Unique identifier for one client connection
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn_{}", self.0.simple())
    }
}

/// Delivery handle for one room member.
///
/// Holds only the sending half of the member's outbox. Once the session that
/// owns the receiving half is gone, deliveries fail instead of keeping the
/// connection alive.
#[derive(Clone, Debug)]
pub struct MemberHandle {
    id: ConnectionId,
    outbox: mpsc::Sender<RoomEvent>,
}

impl MemberHandle {
    pub fn new(id: ConnectionId, outbox: mpsc::Sender<RoomEvent>) -> Self {
        Self { id, outbox }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    fn deliver(&self, event: RoomEvent) -> Result<(), DeliveryFailure> {
        self.outbox.try_send(event).map_err(|err| match err {
            TrySendError::Full(_) => DeliveryFailure::QueueFull,
            TrySendError::Closed(_) => DeliveryFailure::Disconnected,
        })
    }
}

/// Why a single member did not receive a broadcast
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeliveryFailure {
    /// The member's outbox is full (slow or stalled client)
    QueueFull,
    /// The member's session has already shut down
    Disconnected,
}

/// Outcome of one `broadcast` call
#[derive(Clone, Debug, Default)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub failed: Vec<(ConnectionId, DeliveryFailure)>,
}

impl BroadcastReport {
    /// Number of members targeted by the broadcast
    pub fn recipients(&self) -> usize {
        self.delivered + self.failed.len()
    }
}

/// Point-in-time summary of one room
#[derive(Clone, Debug, Serialize)]
pub struct RoomStats {
    pub room: RoomId,
    pub group: String,
    pub members: usize,
    /// Unix timestamp at which the room was (re)created
    pub created_at: i64,
}

struct Room {
    members: Vec<MemberHandle>,
    created_at: i64,
}

impl Room {
    fn new() -> Self {
        Self {
            members: Vec::new(),
            created_at: chrono::Utc::now().timestamp(),
        }
    }

    fn insert(&mut self, member: MemberHandle) {
        match self.members.iter_mut().find(|m| m.id == member.id) {
            Some(existing) => *existing = member,
            None => self.members.push(member),
        }
    }

    fn remove(&mut self, id: ConnectionId) -> bool {
        let before = self.members.len();
        self.members.retain(|m| m.id != id);
        self.members.len() != before
    }

    fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Concurrent map from room to member set.
///
/// Constructed once at startup and shared as `Arc<RoomRegistry>` with every
/// session. It is the only owner of membership state.
#[derive(Default)]
pub struct RoomRegistry {
    rooms: RwLock<HashMap<RoomId, Arc<Mutex<Room>>>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `member` to `room`, creating the room if needed.
    ///
    /// Joining again with the same connection id replaces the old handle.
    pub fn join(&self, room: &RoomId, member: MemberHandle) {
        let id = member.id;

        // Fast path: the room exists. The read lock stays held while the
        // member is inserted so a concurrent `leave` cannot drop the room
        // out from under us.
        {
            let rooms = self.rooms.read();
            if let Some(entry) = rooms.get(room) {
                let mut guard = entry.lock();
                guard.insert(member);
                info!(room = %room, conn = %id, members = guard.members.len(), "joined room");
                return;
            }
        }

        let mut rooms = self.rooms.write();
        let entry = rooms
            .entry(room.clone())
            .or_insert_with(|| Arc::new(Mutex::new(Room::new())));
        let mut guard = entry.lock();
        guard.insert(member);
        info!(room = %room, conn = %id, members = guard.members.len(), "joined room");
    }

    /// Remove connection `id` from `room`.
    ///
    /// Returns whether anything was removed. Leaving a room you are not in
    /// (or one that does not exist) is a no-op. Empty rooms are dropped.
    pub fn leave(&self, room: &RoomId, id: ConnectionId) -> bool {
        let (removed, now_empty) = {
            let rooms = self.rooms.read();
            let Some(entry) = rooms.get(room) else {
                return false;
            };
            let mut guard = entry.lock();
            let removed = guard.remove(id);
            (removed, guard.is_empty())
        };

        if removed {
            info!(room = %room, conn = %id, "left room");
        }

        if now_empty {
            let mut rooms = self.rooms.write();
            // Someone may have joined between the two locks
            if rooms.get(room).is_some_and(|entry| entry.lock().is_empty()) {
                rooms.remove(room);
                debug!(room = %room, "removed empty room");
            }
        }

        removed
    }

    /// Deliver `event` to every current member of `room`, sender included.
    ///
    /// Each member is tried independently; failures are logged and reported
    /// but never returned as an error. An unknown room is a no-op.
    pub fn broadcast(&self, room: &RoomId, event: RoomEvent) -> BroadcastReport {
        let recipients = self.snapshot(room);
        let mut report = BroadcastReport::default();

        for member in &recipients {
            match member.deliver(event.clone()) {
                Ok(()) => report.delivered += 1,
                Err(failure) => {
                    warn!(room = %room, conn = %member.id, ?failure, "broadcast delivery failed");
                    report.failed.push((member.id, failure));
                }
            }
        }

        debug!(
            room = %room,
            delivered = report.delivered,
            failed = report.failed.len(),
            "broadcast"
        );
        report
    }

    /// Whether connection `id` is currently a member of `room`
    pub fn contains(&self, room: &RoomId, id: ConnectionId) -> bool {
        self.rooms
            .read()
            .get(room)
            .is_some_and(|entry| entry.lock().members.iter().any(|m| m.id == id))
    }

    /// Number of members in `room` (0 if the room does not exist)
    pub fn member_count(&self, room: &RoomId) -> usize {
        self.rooms
            .read()
            .get(room)
            .map_or(0, |entry| entry.lock().members.len())
    }

    /// Number of non-empty rooms
    pub fn room_count(&self) -> usize {
        self.rooms.read().len()
    }

    /// Summary of every room, sorted by name
    pub fn stats(&self) -> Vec<RoomStats> {
        let rooms = self.rooms.read();
        let mut stats: Vec<RoomStats> = rooms
            .iter()
            .map(|(room, entry)| {
                let guard = entry.lock();
                RoomStats {
                    room: room.clone(),
                    group: room.group_key(),
                    members: guard.members.len(),
                    created_at: guard.created_at,
                }
            })
            .collect();
        stats.sort_by(|a, b| a.room.cmp(&b.room));
        stats
    }

    fn snapshot(&self, room: &RoomId) -> Vec<MemberHandle> {
        let rooms = self.rooms.read();
        match rooms.get(room) {
            Some(entry) => entry.lock().members.clone(),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(name: &str) -> RoomId {
        RoomId::parse(name).unwrap()
    }

    fn member(capacity: usize) -> (MemberHandle, mpsc::Receiver<RoomEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (MemberHandle::new(ConnectionId::new(), tx), rx)
    }

    fn chat(text: &str) -> RoomEvent {
        RoomEvent::ChatMessage {
            message: text.to_string(),
        }
    }

    #[test]
    fn test_join_creates_room() {
        let registry = RoomRegistry::new();
        let lobby = room("lobby");
        let (a, _rx) = member(8);
        let id = a.id();

        registry.join(&lobby, a);

        assert_eq!(registry.room_count(), 1);
        assert_eq!(registry.member_count(&lobby), 1);
        assert!(registry.contains(&lobby, id));
    }

    #[test]
    fn test_rejoin_replaces_handle() {
        let registry = RoomRegistry::new();
        let lobby = room("lobby");
        let (a, _rx) = member(8);

        registry.join(&lobby, a.clone());
        registry.join(&lobby, a);

        assert_eq!(registry.member_count(&lobby), 1);
    }

    #[test]
    fn test_leave_non_member_is_noop() {
        let registry = RoomRegistry::new();
        let lobby = room("lobby");
        let (a, _rx) = member(8);
        let a_id = a.id();
        registry.join(&lobby, a);

        assert!(!registry.leave(&lobby, ConnectionId::new()));
        assert!(!registry.leave(&room("nowhere"), a_id));
        assert!(registry.contains(&lobby, a_id));
        assert_eq!(registry.member_count(&lobby), 1);
    }

    #[test]
    fn test_leave_twice_is_noop() {
        let registry = RoomRegistry::new();
        let lobby = room("lobby");
        let (a, _rx) = member(8);
        let id = a.id();
        registry.join(&lobby, a);

        assert!(registry.leave(&lobby, id));
        assert!(!registry.leave(&lobby, id));
    }

    #[test]
    fn test_last_leave_drops_room() {
        let registry = RoomRegistry::new();
        let lobby = room("lobby");
        let (a, _rx_a) = member(8);
        let (b, _rx_b) = member(8);
        let (a_id, b_id) = (a.id(), b.id());
        registry.join(&lobby, a);
        registry.join(&lobby, b);

        registry.leave(&lobby, a_id);
        assert_eq!(registry.room_count(), 1);

        registry.leave(&lobby, b_id);
        assert_eq!(registry.room_count(), 0);
        assert_eq!(registry.member_count(&lobby), 0);
    }

    #[test]
    fn test_broadcast_reaches_all_members_including_sender() {
        let registry = RoomRegistry::new();
        let lobby = room("lobby");
        let (a, mut rx_a) = member(8);
        let (b, mut rx_b) = member(8);
        registry.join(&lobby, a);
        registry.join(&lobby, b);

        let report = registry.broadcast(&lobby, chat("hi"));

        assert_eq!(report.delivered, 2);
        assert!(report.failed.is_empty());
        assert_eq!(rx_a.try_recv().unwrap(), chat("hi"));
        assert_eq!(rx_b.try_recv().unwrap(), chat("hi"));
        assert!(rx_a.try_recv().is_err());
        assert!(rx_b.try_recv().is_err());
    }

    #[test]
    fn test_broadcast_to_empty_room_is_noop() {
        let registry = RoomRegistry::new();
        let report = registry.broadcast(&room("ghost-town"), chat("anyone?"));
        assert_eq!(report.recipients(), 0);
        assert_eq!(registry.room_count(), 0);
    }

    #[test]
    fn test_room_isolation() {
        let registry = RoomRegistry::new();
        let (a, mut rx_a) = member(8);
        let (b, mut rx_b) = member(8);
        registry.join(&room("red"), a);
        registry.join(&room("blue"), b);

        registry.broadcast(&room("red"), chat("only red"));

        assert_eq!(rx_a.try_recv().unwrap(), chat("only red"));
        assert!(rx_b.try_recv().is_err());
    }

    #[test]
    fn test_failed_member_does_not_block_others() {
        let registry = RoomRegistry::new();
        let lobby = room("lobby");
        let (gone, rx_gone) = member(8);
        let (full, _rx_full) = member(1);
        let (ok, mut rx_ok) = member(8);
        let (gone_id, full_id) = (gone.id(), full.id());
        registry.join(&lobby, gone);
        registry.join(&lobby, full.clone());
        registry.join(&lobby, ok);

        drop(rx_gone);
        full.outbox.try_send(chat("filler")).unwrap();

        let report = registry.broadcast(&lobby, chat("still here"));

        assert_eq!(report.delivered, 1);
        assert!(report.failed.contains(&(gone_id, DeliveryFailure::Disconnected)));
        assert!(report.failed.contains(&(full_id, DeliveryFailure::QueueFull)));
        assert_eq!(rx_ok.try_recv().unwrap(), chat("still here"));
    }

    #[test]
    fn test_sequential_broadcasts_keep_order() {
        let registry = RoomRegistry::new();
        let lobby = room("lobby");
        let (a, mut rx_a) = member(16);
        registry.join(&lobby, a);

        for i in 0..10 {
            registry.broadcast(&lobby, chat(&format!("m{i}")));
        }

        for i in 0..10 {
            assert_eq!(rx_a.try_recv().unwrap(), chat(&format!("m{i}")));
        }
    }

    #[test]
    fn test_stats_sorted() {
        let registry = RoomRegistry::new();
        let (a, _rx_a) = member(8);
        let (b, _rx_b) = member(8);
        let (c, _rx_c) = member(8);
        registry.join(&room("zeta"), a);
        registry.join(&room("alpha"), b);
        registry.join(&room("alpha"), c);

        let stats = registry.stats();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].room.as_str(), "alpha");
        assert_eq!(stats[0].group, "chat_alpha");
        assert_eq!(stats[0].members, 2);
        assert_eq!(stats[1].members, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_join_leave_broadcast() {
        let registry = Arc::new(RoomRegistry::new());
        let lobby = room("lobby");

        // A stable member that must see every broadcast
        let (anchor, mut rx_anchor) = member(1024);
        registry.join(&lobby, anchor);

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let registry = registry.clone();
            let lobby = lobby.clone();
            tasks.push(tokio::spawn(async move {
                for _ in 0..50 {
                    let (m, _rx) = member(4);
                    let id = m.id();
                    registry.join(&lobby, m);
                    tokio::task::yield_now().await;
                    registry.leave(&lobby, id);
                }
            }));
        }
        let broadcaster = {
            let registry = registry.clone();
            let lobby = lobby.clone();
            tokio::spawn(async move {
                for i in 0..100 {
                    registry.broadcast(&lobby, chat(&format!("m{i}")));
                    tokio::task::yield_now().await;
                }
            })
        };

        for task in tasks {
            task.await.unwrap();
        }
        broadcaster.await.unwrap();

        assert_eq!(registry.member_count(&lobby), 1);
        for i in 0..100 {
            assert_eq!(rx_anchor.recv().await.unwrap(), chat(&format!("m{i}")));
        }
    }
}
