//! Timer synchronization with other clients
//!
//! Snapshots of the local timer are published on `sync-timer` while it runs,
//! and snapshots relayed from peers arrive on `update-timer`. The relay itself
//! lives elsewhere; this module only holds the client side of the protocol.

pub mod clock;
pub mod link;
pub mod memory;
pub mod message;
pub mod websocket;

// Re-export main types
pub use clock::{SnapshotClock, SyncMode};
pub use link::SyncLink;
pub use memory::MemoryRelay;
pub use message::{SyncMessage, TimerSnapshot, Topic};
