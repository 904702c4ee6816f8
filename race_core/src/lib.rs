pub mod components;
pub mod config;
pub mod generator;
pub mod params;
pub mod resources;
pub mod systems;
pub mod track;
pub mod upgrades;

pub use components::*;
pub use config::*;
pub use generator::*;
pub use params::*;
pub use resources::*;
pub use track::*;
pub use upgrades::*;

use hecs::{Entity, World};
use systems::*;

/// Starting x for every rider at the beginning of a stage
pub const RIDER_START_X: f64 = 20.0;

/// Everything one race owns: racers, track, tuning and per-tick resources.
///
/// The whole state is thrown away and rebuilt on a new stage or a retry.
pub struct RaceState {
    pub world: World,
    pub track: Track,
    pub config: Config,
    pub stage_index: u32,
    pub theme: Theme,
    pub weather: Weather,
    pub clock: Clock,
    pub rng: GameRng,
    pub events: Events,
    pub input: InputQueue,
    pub timestep: FixedTimestep,
    pub camera_rider: u8,   // Rider the camera and NPC pacing follow
    pub authoritative: bool, // Owns track and NPCs
    pub outcome: Option<RaceOutcome>,
}

impl RaceState {
    pub fn new(stage_index: u32, config: Config, seed: u64) -> Self {
        let theme = Theme::for_stage(stage_index);
        Self {
            world: World::new(),
            track: Track::default(),
            config,
            stage_index,
            theme,
            weather: Weather::for_theme(theme),
            clock: Clock::new(),
            rng: GameRng::new(seed),
            events: Events::new(),
            input: InputQueue::new(),
            timestep: FixedTimestep::default(),
            camera_rider: 0,
            authoritative: true,
            outcome: None,
        }
    }

    /// Generate this stage with the race RNG and install it
    pub fn generate_stage(&mut self) -> StageLayout {
        let layout = generate(
            self.stage_index,
            self.theme,
            self.config.world_length(),
            &self.config,
            &mut self.rng,
        );
        self.install_layout(layout.clone());
        layout
    }

    /// Replace the track and the NPC roster wholesale
    pub fn install_layout(&mut self, layout: StageLayout) {
        let stale: Vec<Entity> = self
            .world
            .query_mut::<&Npc>()
            .into_iter()
            .map(|(e, _)| e)
            .collect();
        for entity in stale {
            let _ = self.world.despawn(entity);
        }

        self.track = layout.track;
        for spawn in layout.npcs {
            create_npc(&mut self.world, spawn);
        }
    }

    pub fn add_rider(&mut self, id: u8, control: Control, upgrades: Upgrades) -> Entity {
        create_rider(&mut self.world, &self.track, &self.config, id, control, upgrades)
    }

    pub fn rider_entity(&self, id: u8) -> Option<Entity> {
        self.world
            .query::<&Rider>()
            .iter()
            .find(|(_e, rider)| rider.id == id)
            .map(|(e, _)| e)
    }

    pub fn rider_snapshot(&self, id: u8) -> Option<RiderSnapshot> {
        let entity = self.rider_entity(id)?;
        let racer = *self.world.get::<&Racer>(entity).ok()?;
        let rider = *self.world.get::<&Rider>(entity).ok()?;
        Some(RiderSnapshot { racer, rider })
    }

    /// All riders ordered by id
    pub fn riders(&self) -> Vec<RiderSnapshot> {
        let mut riders: Vec<RiderSnapshot> = self
            .world
            .query::<(&Racer, &Rider)>()
            .iter()
            .map(|(_e, (racer, rider))| RiderSnapshot {
                racer: *racer,
                rider: *rider,
            })
            .collect();
        riders.sort_by_key(|s| s.rider.id);
        riders
    }

    /// Current NPC roster ordered by id
    pub fn npcs(&self) -> Vec<NpcSpawn> {
        let mut npcs: Vec<NpcSpawn> = self
            .world
            .query::<(&Racer, &Npc)>()
            .iter()
            .map(|(_e, (racer, npc))| NpcSpawn {
                npc: *npc,
                racer: *racer,
            })
            .collect();
        npcs.sort_by_key(|s| s.npc.id);
        npcs
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }
}

/// Run one simulation tick. Returns the outcome on the tick the stage ends.
pub fn step(state: &mut RaceState) -> Option<RaceOutcome> {
    if state.outcome.is_some() {
        return None;
    }

    state.clock.advance();

    // Clear events at start of tick
    state.events.clear();

    // 1. Apply sampled controls
    ingest_inputs(&mut state.world, &mut state.input);

    // 2. Weather
    roll_weather(&state.weather, &mut state.rng, &mut state.events);

    // 3. NPCs, only where the track is owned
    if state.authoritative {
        if let Some(reference) = PaceReference::of_rider(&state.world, state.camera_rider) {
            drive_npcs(
                &mut state.world,
                &state.track,
                &state.config,
                &state.clock,
                &mut state.rng,
                reference,
            );
        }
    }

    // 4. Local riders
    steer_riders(&mut state.world, &state.track, &state.config, &state.weather);
    drive_riders(&mut state.world, &state.config, &state.weather, &mut state.events);
    advance_riders(&mut state.world);
    update_airtime(&mut state.world, &state.config, &mut state.events);
    apply_obstacles(
        &mut state.world,
        &state.track,
        &state.config,
        &mut state.rng,
        &mut state.events,
    );

    // 5. Racer contact
    resolve_collisions(&mut state.world, &mut state.events);

    // 6. Finish line
    let outcome = check_finish(&mut state.world, &state.config);
    if outcome.is_some() {
        state.outcome = outcome.clone();
    }
    outcome
}

/// Feed one presentation frame through the fixed timestep
pub fn run_frame(state: &mut RaceState, frame_dt: f64) -> Option<RaceOutcome> {
    let ticks = state.timestep.advance(frame_dt);
    for _ in 0..ticks {
        if let Some(outcome) = step(state) {
            return Some(outcome);
        }
    }
    None
}

/// Helper to create a rider entity on its starting lane
pub fn create_rider(
    world: &mut World,
    track: &Track,
    config: &Config,
    id: u8,
    control: Control,
    upgrades: Upgrades,
) -> Entity {
    let lane = track
        .layout_at(RIDER_START_X)
        .clamp_lane(id % Params::LANE_COUNT);
    let y = config.lane_center_y(&track.layout_at(RIDER_START_X), lane);
    world.spawn((
        Racer::new(RIDER_START_X, y, lane),
        Rider::new(id, control, upgrades),
        RiderIntent::new(),
    ))
}

/// Helper to create an NPC entity
pub fn create_npc(world: &mut World, spawn: NpcSpawn) -> Entity {
    world.spawn((spawn.racer, spawn.npc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_riders_start_on_their_lane() {
        let mut state = RaceState::new(0, Config::new(), 1);
        state.generate_stage();
        let e = state.add_rider(1, Control::Local { slot: 0 }, Upgrades::default());

        let racer = *state.world.get::<&Racer>(e).unwrap();
        assert_eq!(racer.x, RIDER_START_X);
        assert_eq!(racer.lane, 1);
        assert_eq!(racer.y, state.config.lane_center_y(&TrackSegment::full_width(), 1));
    }

    #[test]
    fn test_install_layout_replaces_npcs() {
        let mut state = RaceState::new(0, Config::new(), 1);
        state.generate_stage();
        state.generate_stage();
        assert_eq!(state.npcs().len(), Params::NPC_COUNT as usize);

        state.install_layout(StageLayout {
            track: Track::default(),
            npcs: Vec::new(),
        });
        assert!(state.npcs().is_empty());
        assert!(state.track.segments.is_empty());
    }

    #[test]
    fn test_step_is_noop_after_finish() {
        let mut state = RaceState::new(0, Config::new(), 1);
        state.add_rider(0, Control::Local { slot: 0 }, Upgrades::default());
        state.outcome = Some(RaceOutcome::StageComplete { results: vec![] });
        assert_eq!(step(&mut state), None);
        assert_eq!(state.clock.tick, 0);
    }

    #[test]
    fn test_non_authoritative_state_leaves_npcs_alone() {
        let mut state = RaceState::new(0, Config::new(), 1);
        state.generate_stage();
        state.add_rider(0, Control::Remote, Upgrades::default());
        state.add_rider(1, Control::Local { slot: 0 }, Upgrades::default());
        state.authoritative = false;
        state.camera_rider = 1;
        let before = state.npcs();

        step(&mut state);

        assert_eq!(state.npcs(), before);
    }
}
