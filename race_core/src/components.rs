use glam::DVec3;

use crate::upgrades::Upgrades;

/// Kinematic state shared by riders and NPCs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Racer {
    pub x: f64,           // World position along the track
    pub y: f64,           // Visual lateral position, eased toward the lane center
    pub lane: u8,         // Lane derived from `y`
    pub target_lane: u8,  // Lane the racer is steering into
    pub speed: f64,       // World units per tick, never negative
    pub is_jumping: bool,
    pub z: f64,           // Height above the track
    pub vz: f64,
    pub is_crashed: bool,
    pub crash_timer: u32, // Ticks left until recovery
}

impl Racer {
    pub fn new(x: f64, y: f64, lane: u8) -> Self {
        Self {
            x,
            y,
            lane,
            target_lane: lane,
            speed: 0.0,
            is_jumping: false,
            z: 0.0,
            vz: 0.0,
            is_crashed: false,
            crash_timer: 0,
        }
    }

    pub fn position(&self) -> DVec3 {
        DVec3::new(self.x, self.y, self.z)
    }

    pub fn is_grounded(&self) -> bool {
        !self.is_jumping
    }

    /// Enter the crashed state for `timer` ticks, keeping current speed
    pub fn crash(&mut self, timer: u32) {
        self.is_crashed = true;
        self.crash_timer = timer;
    }

    /// Crash and come to a dead stop
    pub fn knock_down(&mut self, timer: u32) {
        self.crash(timer);
        self.speed = 0.0;
    }

    pub fn launch(&mut self, vz: f64) {
        self.is_jumping = true;
        self.vz = vz;
    }
}

/// Who drives a rider on this peer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Driven by local input slot
    Local { slot: u8 },
    /// Replicated from the other peer
    Remote,
}

/// Player-only state: heat, tricks and scoring
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rider {
    pub id: u8,
    pub control: Control,
    pub heat: f64,
    pub rotation: f64,
    pub rotation_speed: f64,
    pub total_jump_rotation: f64,
    pub flips_in_current_jump: u32,
    pub combo_multiplier: u32,
    pub score: u32,
    /// Landing bonuses banked on top of distance; counted in `score` and the final results
    pub trick_bonus: u32,
    pub crash_count: u32,
    pub top_speed: f64,
    pub upgrades: Upgrades,
}

impl Rider {
    pub fn new(id: u8, control: Control, upgrades: Upgrades) -> Self {
        Self {
            id,
            control,
            heat: 0.0,
            rotation: 0.0,
            rotation_speed: 0.0,
            total_jump_rotation: 0.0,
            flips_in_current_jump: 0,
            combo_multiplier: 1,
            score: 0,
            trick_bonus: 0,
            crash_count: 0,
            top_speed: 0.0,
            upgrades,
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self.control, Control::Local { .. })
    }

    pub fn slot(&self) -> Option<u8> {
        match self.control {
            Control::Local { slot } => Some(slot),
            Control::Remote => None,
        }
    }

    /// Count a crash and break the combo chain
    pub fn register_crash(&mut self) {
        self.crash_count += 1;
        self.combo_multiplier = 1;
    }

    pub fn reset_jump_tracking(&mut self) {
        self.rotation_speed = 0.0;
        self.total_jump_rotation = 0.0;
        self.flips_in_current_jump = 0;
    }
}

/// AI opponent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Npc {
    pub id: u8,
    pub base_speed: f64,
    pub color: [u8; 3],
}

impl Npc {
    pub fn new(id: u8, base_speed: f64, color: [u8; 3]) -> Self {
        Self {
            id,
            base_speed,
            color,
        }
    }
}

/// Logical controls sampled from the input collaborator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Controls {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub gas: bool,
    pub turbo: bool,
}

/// Latest controls for a rider plus lane-press bookkeeping.
///
/// A held up/down press changes lane once; it must be released before it
/// can fire again.
#[derive(Debug, Clone, Copy, Default)]
pub struct RiderIntent {
    pub controls: Controls,
    pub up_consumed: bool,
    pub down_consumed: bool,
}

impl RiderIntent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_controls(controls: Controls) -> Self {
        Self {
            controls,
            ..Self::default()
        }
    }

    /// Replace the sampled controls, re-arming presses that were released
    pub fn update(&mut self, controls: Controls) {
        if !controls.up {
            self.up_consumed = false;
        }
        if !controls.down {
            self.down_consumed = false;
        }
        self.controls = controls;
    }

    pub fn lane_up_pending(&self) -> bool {
        self.controls.up && !self.up_consumed
    }

    pub fn lane_down_pending(&self) -> bool {
        self.controls.down && !self.down_consumed
    }
}

/// Full-record copy of a rider, the unit of replication
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiderSnapshot {
    pub racer: Racer,
    pub rider: Rider,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_knock_down_stops_racer() {
        let mut racer = Racer::new(10.0, 70.0, 0);
        racer.speed = 4.0;
        racer.knock_down(90);
        assert!(racer.is_crashed);
        assert_eq!(racer.crash_timer, 90);
        assert_eq!(racer.speed, 0.0);
    }

    #[test]
    fn test_register_crash_resets_combo() {
        let mut rider = Rider::new(0, Control::Local { slot: 0 }, Upgrades::default());
        rider.combo_multiplier = 4;
        rider.register_crash();
        assert_eq!(rider.crash_count, 1);
        assert_eq!(rider.combo_multiplier, 1);
    }

    #[test]
    fn test_intent_press_rearms_after_release() {
        let mut intent = RiderIntent::new();
        let held = Controls {
            up: true,
            ..Controls::default()
        };
        intent.update(held);
        assert!(intent.lane_up_pending());
        intent.up_consumed = true;
        intent.update(held);
        assert!(!intent.lane_up_pending(), "held press fires once");
        intent.update(Controls::default());
        intent.update(held);
        assert!(intent.lane_up_pending(), "release re-arms the press");
    }
}
