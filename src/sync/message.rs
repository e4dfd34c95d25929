//! Wire format shared with the relay

use serde::{Deserialize, Serialize};

use crate::{error::SyncError, state::TimerState};

/// Topic a message is published on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Topic {
    /// Client to relay: this client's current state
    #[serde(rename = "sync-timer")]
    SyncTimer,
    /// Relay to client: another client's state
    #[serde(rename = "update-timer")]
    UpdateTimer,
}

impl Topic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::SyncTimer => "sync-timer",
            Topic::UpdateTimer => "update-timer",
        }
    }
}

/// Timer state as carried on the wire.
///
/// `cycles` may be absent: older web clients never send it, and the
/// receiver then keeps its own value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub time: u32,
    pub is_running: bool,
    pub is_break: bool,
    pub current_cycle: u32,
    pub work_time: u32,
    pub break_time: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycles: Option<u32>,
}

impl TimerSnapshot {
    /// Build the full state this snapshot describes
    pub fn into_state(self, local_cycles: u32) -> TimerState {
        TimerState {
            time: self.time,
            is_running: self.is_running,
            is_break: self.is_break,
            current_cycle: self.current_cycle,
            work_time: self.work_time,
            break_time: self.break_time,
            cycles: self.cycles.unwrap_or(local_cycles),
        }
    }
}

impl From<&TimerState> for TimerSnapshot {
    fn from(state: &TimerState) -> Self {
        Self {
            time: state.time,
            is_running: state.is_running,
            is_break: state.is_break,
            current_cycle: state.current_cycle,
            work_time: state.work_time,
            break_time: state.break_time,
            cycles: Some(state.cycles),
        }
    }
}

/// Envelope for every frame exchanged with the relay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncMessage {
    pub event: Topic,
    pub data: TimerSnapshot,
    /// Ordering stamp, only sent when ordered sync is enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seq: Option<u64>,
}

impl SyncMessage {
    pub fn new(event: Topic, state: &TimerState, seq: Option<u64>) -> Self {
        Self {
            event,
            data: TimerSnapshot::from(state),
            seq,
        }
    }

    pub fn sync_timer(state: &TimerState, seq: Option<u64>) -> Self {
        Self::new(Topic::SyncTimer, state, seq)
    }

    pub fn update_timer(state: &TimerState, seq: Option<u64>) -> Self {
        Self::new(Topic::UpdateTimer, state, seq)
    }

    pub fn encode(&self) -> Result<String, SyncError> {
        serde_json::to_string(self).map_err(SyncError::Encode)
    }

    pub fn decode(text: &str) -> Result<Self, SyncError> {
        serde_json::from_str(text).map_err(SyncError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_layout_matches_relay_protocol() {
        let state = TimerState::with_durations(120, 60, 2);
        let text = SyncMessage::sync_timer(&state, None).encode().unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["event"], "sync-timer");
        assert_eq!(value["data"]["workTime"], 120);
        assert_eq!(value["data"]["currentCycle"], 1);
        assert_eq!(value["data"]["cycles"], 2);
        assert!(value.get("seq").is_none());
    }

    #[test]
    fn decodes_frames_without_cycles_or_seq() {
        let text = r#"{"event":"update-timer","data":{"time":42,"isRunning":true,"isBreak":true,"currentCycle":3,"workTime":1500,"breakTime":300}}"#;
        let msg = SyncMessage::decode(text).unwrap();
        assert_eq!(msg.event, Topic::UpdateTimer);
        assert_eq!(msg.seq, None);
        assert_eq!(msg.data.cycles, None);

        let state = msg.data.into_state(6);
        assert_eq!(state.time, 42);
        assert!(state.is_break);
        assert_eq!(state.current_cycle, 3);
        assert_eq!(state.cycles, 6);
    }

    #[test]
    fn rejects_unknown_topics_and_garbage() {
        let unknown = r#"{"event":"chat","data":{"time":1,"isRunning":true,"isBreak":false,"currentCycle":1,"workTime":60,"breakTime":60}}"#;
        assert!(matches!(SyncMessage::decode(unknown), Err(SyncError::Decode(_))));
        assert!(matches!(SyncMessage::decode("not json"), Err(SyncError::Decode(_))));
    }
}
