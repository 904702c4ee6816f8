//! Peer protocol for the lane racer
//!
//! Two application-level messages travel over an already-open peer
//! connection. Uses postcard for compact binary serialization.

use postcard::{from_bytes, to_allocvec};

// ============================================================================
// Wire records
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SegmentWire {
    pub x: f64,
    pub min_lane: u8,
    pub max_lane: u8,
    pub y_offset: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ObstacleWire {
    pub x: f64,
    pub lane: u8,
    pub kind: u8, // Obstacle kind code
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NpcWire {
    pub id: u8,
    pub x: f64,
    pub y: f64,
    pub lane: u8,
    pub speed: f64,
    pub base_speed: f64,
    pub color: [u8; 3],
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UpgradesWire {
    pub engine: u8,
    pub cooling: u8,
    pub turbo: u8,
    pub color: [u8; 3],
}

/// Full record of one rider, replacing the receiver's copy wholesale
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RacerState {
    pub id: u8,
    pub x: f64,
    pub y: f64,
    pub lane: u8,
    pub target_lane: u8,
    pub speed: f64,
    pub heat: f64,
    pub is_jumping: bool,
    pub z: f64,
    pub vz: f64,
    pub is_crashed: bool,
    pub crash_timer: u32,
    pub rotation: f64,
    pub rotation_speed: f64,
    pub total_jump_rotation: f64,
    pub flips_in_current_jump: u32,
    pub combo_multiplier: u32,
    pub score: u32,
    pub trick_bonus: u32,
    pub crash_count: u32,
    pub top_speed: f64,
    pub upgrades: UpgradesWire,
}

// ============================================================================
// Peer Messages
// ============================================================================

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum PeerMsg {
    /// Host to joiner, once per generated stage
    InitTrack {
        stage_index: u32,
        segments: Vec<SegmentWire>,
        obstacles: Vec<ObstacleWire>,
        npcs: Vec<NpcWire>,
    },

    /// Each peer's own rider, every couple of ticks
    SyncState { racer: RacerState },
}

#[derive(Debug, thiserror::Error)]
pub enum ProtoError {
    #[error("serialization failed: {0}")]
    Serialize(postcard::Error),
    #[error("deserialization failed: {0}")]
    Deserialize(postcard::Error),
}

// ============================================================================
// Serialization Helpers
// ============================================================================

impl PeerMsg {
    pub fn to_bytes(&self) -> Result<Vec<u8>, ProtoError> {
        to_allocvec(self).map_err(ProtoError::Serialize)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProtoError> {
        from_bytes(bytes).map_err(ProtoError::Deserialize)
    }

    pub fn name(&self) -> &'static str {
        match self {
            PeerMsg::InitTrack { .. } => "INIT_TRACK",
            PeerMsg::SyncState { .. } => "SYNC_STATE",
        }
    }
}
