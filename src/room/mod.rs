//! Room membership and fan-out
//!
//! - `id`: validated room names and their group keys
//! - `events`: wire message and the events delivered to members
//! - `registry`: the concurrent room map with join / leave / broadcast

pub mod events;
pub mod id;
pub mod registry;

pub use events::{ChatMessage, RoomEvent};
pub use id::RoomId;
pub use registry::{
    BroadcastReport, ConnectionId, DeliveryFailure, MemberHandle, RoomRegistry, RoomStats,
};
