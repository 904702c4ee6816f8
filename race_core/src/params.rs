/// Tuning parameters for the lane racer.
///
/// Every rate below is expressed per simulation tick, and the values were
/// tuned against a ~60 Hz tick.
#[derive(Debug, Clone, Copy)]
pub struct Params;

impl Params {
    // Track geometry
    pub const LANE_COUNT: u8 = 4;
    pub const LANE_HEIGHT: f64 = 20.0;
    pub const TRACK_TOP: f64 = 60.0;
    pub const VIEW_WIDTH: f64 = 256.0;
    pub const CAMERA_LEAD: f64 = 60.0;

    // Propulsion
    pub const MAX_SPEED: f64 = 4.8;
    pub const TURBO_SPEED: f64 = 6.4;
    pub const ACCELERATION: f64 = 0.055;
    pub const FRICTION: f64 = 0.022;
    pub const CRASH_SPEED_DECAY: f64 = 0.94;

    // Heat
    pub const MAX_HEAT: f64 = 100.0;
    pub const HEAT_INC: f64 = 0.22;
    pub const HEAT_COOL: f64 = 0.14;
    pub const OVERHEAT_PENALTY_TIME: u32 = 160;

    // Crash recovery (ticks)
    pub const REAR_END_TIME: u32 = 90;
    pub const BLOCKED_RIDER_TIME: u32 = 90;
    pub const BLOCKED_NPC_TIME: u32 = 110;
    pub const WIPEOUT_TIME: u32 = 75;

    // Aerial
    pub const GRAVITY: f64 = 0.16;
    pub const JUMP_FORCE: f64 = 3.6;
    pub const ROTATION_INPUT: f64 = 0.022;
    pub const ROTATION_HELD_DAMPING: f64 = 0.98;
    pub const ROTATION_FREE_DAMPING: f64 = 0.85;
    pub const ROTATION_SETTLE: f64 = 0.08;
    pub const GROUND_ROTATION_DECAY: f64 = 0.82;
    pub const LANDING_TOLERANCE: f64 = 0.85;
    pub const FLIP_BONUS: u32 = 500;

    // Obstacles
    pub const OBSTACLE_REACH_X: f64 = 10.0;
    pub const OBSTACLE_REACH_Y: f64 = 7.0;
    pub const HURDLE_CLEAR_SPEED: f64 = 2.2;
    pub const GRAVEL_HEAT: f64 = 0.06;
    pub const OIL_KICK: f64 = 0.45;
    pub const OIL_LANE_SHIFT_CHANCE: f64 = 0.05;
    pub const MUD_SINK: f64 = -1.5;

    // Racer proximity box
    pub const COLLIDE_X: f64 = 14.0;
    pub const COLLIDE_Y: f64 = 12.0;
    pub const COLLIDE_Z: f64 = 8.0;

    // Lane easing
    pub const LANE_RESPONSE: f64 = 0.18;
    pub const STORM_LANE_RESPONSE: f64 = 0.12;
    pub const NPC_LANE_RESPONSE: f64 = 0.08;

    // Storm handling
    pub const STORM_GRIP: f64 = 0.75;
    pub const STORM_FRICTION: f64 = 0.6;
    pub const LIGHTNING_CHANCE: f64 = 0.003;

    // NPC policy
    pub const NPC_COUNT: u8 = 4;
    pub const NPC_RECYCLE_BEHIND: f64 = 150.0;
    pub const NPC_RESPAWN_AHEAD: f64 = 150.0;
    pub const NPC_RESPAWN_SPREAD: f64 = 200.0;
    pub const NPC_CATCH_UP_GAP: f64 = 150.0;
    pub const NPC_CATCH_UP_BOOST: f64 = 1.2;
    pub const NPC_EASE_OFF_GAP: f64 = 300.0;
    pub const NPC_EASE_OFF_FACTOR: f64 = 0.7;
    pub const NPC_SPEED_EASING: f64 = 0.05;
    pub const NPC_LANE_CHANGE_PERIOD: u64 = 120;
    pub const NPC_LANE_CHANGE_CHANCE: f64 = 0.4;
    pub const NPC_CRASH_DECAY: f64 = 0.9;
    pub const NPC_RECOVERY_SPEED: f64 = 0.4;
    pub const NPC_RAMP_REACH: f64 = 5.0;

    // Stage
    pub const STAGE_LENGTH: u32 = 5000;
    pub const WORLD_SCALE: f64 = 10.0;

    // Timing
    pub const FIXED_DT: f64 = 1.0 / 60.0; // Seconds per simulation tick
    pub const MAX_FRAME_DT: f64 = 0.25; // Clamp for long frames (tab switches, stalls)
}
