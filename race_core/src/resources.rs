use crate::components::Controls;
use crate::params::Params;

/// Simulation tick counter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Clock {
    pub tick: u64,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self) {
        self.tick += 1;
    }

    pub fn every(&self, period: u64) -> bool {
        period != 0 && self.tick % period == 0
    }
}

/// Random number generator
pub struct GameRng(pub rand::rngs::StdRng);

impl GameRng {
    pub fn new(seed: u64) -> Self {
        use rand::SeedableRng;
        Self(rand::rngs::StdRng::seed_from_u64(seed))
    }

    /// Uniform sample in [0, 1)
    pub fn unit(&mut self) -> f64 {
        use rand::Rng;
        self.0.gen::<f64>()
    }

    pub fn chance(&mut self, p: f64) -> bool {
        self.unit() < p
    }

    /// -1 or +1 with equal odds
    pub fn sign(&mut self) -> i32 {
        if self.unit() > 0.5 {
            1
        } else {
            -1
        }
    }

    /// Uniform integer in [lo, hi]
    pub fn between(&mut self, lo: u8, hi: u8) -> u8 {
        use rand::Rng;
        self.0.gen_range(lo..=hi)
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::new(12345)
    }
}

/// Stage theme; drives weather handling and obstacle bias
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Theme {
    #[default]
    Day,
    Dusk,
    Night,
    Storm,
}

impl Theme {
    /// Stage order, wrapping after the storm
    pub const SEQUENCE: [Theme; 4] = [Theme::Day, Theme::Dusk, Theme::Night, Theme::Storm];

    pub fn for_stage(stage_index: u32) -> Self {
        Self::SEQUENCE[stage_index as usize % Self::SEQUENCE.len()]
    }

    pub fn is_storm(self) -> bool {
        self == Theme::Storm
    }
}

/// Handling modifiers for the current weather
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weather {
    pub grip: f64,
    pub friction_mult: f64,
    pub lane_response: f64,
    pub lightning_chance: f64,
}

impl Weather {
    pub fn for_theme(theme: Theme) -> Self {
        if theme.is_storm() {
            Self {
                grip: Params::STORM_GRIP,
                friction_mult: Params::STORM_FRICTION,
                lane_response: Params::STORM_LANE_RESPONSE,
                lightning_chance: Params::LIGHTNING_CHANCE,
            }
        } else {
            Self {
                grip: 1.0,
                friction_mult: 1.0,
                lane_response: Params::LANE_RESPONSE,
                lightning_chance: 0.0,
            }
        }
    }
}

/// Splash flavors for surface hazards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Mud,
    Water,
}

/// Feedback cue raised during a tick for renderers and audio
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cue {
    Jump { rider: u8 },
    Flip { rider: u8, count: u32 },
    StuckLanding { rider: u8, multiplier: u32, bonus: u32 },
    CleanLanding { rider: u8 },
    Wipeout { rider: u8 },
    Overheat { rider: u8 },
    Bonk { rider: u8 },
    Blocked { rider: u8 },
    Splash { rider: u8, surface: Surface },
    Gravel { rider: u8 },
    HurdleClip { rider: u8 },
    Thunder,
}

/// Events that occurred during this tick
#[derive(Debug, Clone, Default)]
pub struct Events {
    pub cues: Vec<Cue>,
    pub shake: f64, // Strongest screen-shake requested this tick
}

impl Events {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.cues.clear();
        self.shake = 0.0;
    }

    pub fn push(&mut self, cue: Cue) {
        self.cues.push(cue);
    }

    pub fn shake(&mut self, amount: f64) {
        self.shake = self.shake.max(amount);
    }

    pub fn contains(&self, cue: &Cue) -> bool {
        self.cues.contains(cue)
    }
}

/// Control samples waiting to be applied to riders
#[derive(Debug, Clone, Default)]
pub struct InputQueue {
    pub inputs: Vec<(u8, Controls)>, // (slot, controls)
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.inputs.clear();
    }

    pub fn push_input(&mut self, slot: u8, controls: Controls) {
        self.inputs.push((slot, controls));
    }
}

/// Final standing for one rider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RaceResult {
    pub rider_id: u8,
    pub score: u32,
    pub crashes: u32,
}

/// How a race ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RaceOutcome {
    StageComplete { results: Vec<RaceResult> },
}

impl RaceOutcome {
    pub fn results(&self) -> &[RaceResult] {
        match self {
            RaceOutcome::StageComplete { results } => results,
        }
    }

    /// Garage points earned by the first rider
    pub fn reward_points(&self) -> u32 {
        self.results()
            .first()
            .map(|r| (r.score as f64 * 0.15).floor() as u32)
            .unwrap_or(0)
    }
}

/// Converts presentation frame deltas into whole simulation ticks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedTimestep {
    pub step: f64,
    pub max_frame: f64,
    pub accumulator: f64,
}

impl Default for FixedTimestep {
    fn default() -> Self {
        Self::new(Params::FIXED_DT, Params::MAX_FRAME_DT)
    }
}

impl FixedTimestep {
    pub fn new(step: f64, max_frame: f64) -> Self {
        Self {
            step,
            max_frame,
            accumulator: 0.0,
        }
    }

    /// Bank `frame_dt` seconds and return how many ticks are now due
    pub fn advance(&mut self, frame_dt: f64) -> u32 {
        if self.step <= 0.0 {
            return 0;
        }
        let frame_dt = if frame_dt.is_finite() { frame_dt } else { 0.0 };
        self.accumulator += frame_dt.clamp(0.0, self.max_frame);
        let ticks = (self.accumulator / self.step).floor();
        self.accumulator -= ticks * self.step;
        ticks as u32
    }

    /// Fraction of a tick left in the accumulator, for render interpolation
    pub fn alpha(&self) -> f64 {
        if self.step <= 0.0 {
            0.0
        } else {
            self.accumulator / self.step
        }
    }
}
