//! Procedural stage generation.
//!
//! Only the authoritative peer runs this. Output depends solely on the
//! arguments and the injected [`GameRng`], so one seed always yields the
//! same stage.

use crate::components::{Npc, Racer};
use crate::config::Config;
use crate::params::Params;
use crate::resources::{GameRng, Theme};
use crate::track::{Obstacle, ObstacleKind, Track, TrackSegment};

const FIRST_SEGMENT_X: f64 = 1000.0;
const SEGMENT_STEP_MIN: f64 = 400.0;
const SEGMENT_STEP_SPREAD: f64 = 400.0;
const TRACK_OVERRUN: f64 = 2000.0;
const Y_OFFSET_STEP: f64 = 10.0;
const Y_OFFSET_LIMIT: f64 = 20.0;

const FIRST_OBSTACLE_X: f64 = 600.0;
const OBSTACLE_SPACING: f64 = 180.0;
const OBSTACLE_SPACING_PER_STAGE: f64 = 15.0;
const OBSTACLE_SPACING_FLOOR: f64 = 40.0;
const OBSTACLE_JITTER: f64 = 400.0;

const NPC_START_X: f64 = 200.0;
const NPC_START_GAP: f64 = 120.0;
const NPC_START_SPEED: f64 = 3.5;
const NPC_SPEED_PER_STAGE: f64 = 0.3;
const NPC_SPEED_JITTER: f64 = 0.5;

pub const NPC_COLORS: [[u8; 3]; 6] = [
    [0x9c, 0x27, 0xb0],
    [0x00, 0xbc, 0xd4],
    [0xff, 0x98, 0x00],
    [0xe9, 0x1e, 0x63],
    [0xff, 0xeb, 0x3b],
    [0x60, 0x7d, 0x8b],
];

/// NPC component plus its starting kinematics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NpcSpawn {
    pub npc: Npc,
    pub racer: Racer,
}

/// Everything the authoritative peer generates for one stage
#[derive(Debug, Clone, PartialEq)]
pub struct StageLayout {
    pub track: Track,
    pub npcs: Vec<NpcSpawn>,
}

/// Build segments, obstacles and the NPC roster for a stage
pub fn generate(
    stage_index: u32,
    theme: Theme,
    world_length: f64,
    config: &Config,
    rng: &mut GameRng,
) -> StageLayout {
    let segments = generate_segments(stage_index, world_length, rng);
    let mut track = Track::new(segments, Vec::new());
    track.obstacles = generate_obstacles(&track, stage_index, theme, world_length, rng);
    let npcs = generate_npcs(&track, stage_index, config, rng);

    log::debug!(
        "Generated stage {} ({:?}): {} segments, {} obstacles, {} npcs",
        stage_index,
        theme,
        track.segments.len(),
        track.obstacles.len(),
        npcs.len()
    );

    StageLayout { track, npcs }
}

fn generate_segments(stage_index: u32, world_length: f64, rng: &mut GameRng) -> Vec<TrackSegment> {
    let mut segments = vec![TrackSegment::full_width()];
    let max_lane = Params::LANE_COUNT - 1;

    // Harder stages deviate from the plain layout more often
    let complexity = 0.3 + stage_index as f64 * 0.1;
    let mut y_offset = 0.0;
    let mut cursor = FIRST_SEGMENT_X;

    while cursor < world_length + TRACK_OVERRUN {
        let roll = rng.unit();
        let step = SEGMENT_STEP_MIN + rng.unit() * SEGMENT_STEP_SPREAD;

        if roll < complexity * 0.5 {
            let lane_count = if stage_index >= 2 { 1 } else { 2 };
            let min_lane = rng.between(0, Params::LANE_COUNT - lane_count);
            segments.push(TrackSegment::new(
                cursor,
                min_lane,
                min_lane + lane_count - 1,
                y_offset,
            ));
        } else if roll < complexity {
            y_offset = (y_offset + Y_OFFSET_STEP * rng.sign() as f64)
                .clamp(-Y_OFFSET_LIMIT, Y_OFFSET_LIMIT);
            segments.push(TrackSegment::new(cursor, 0, max_lane, y_offset));
        } else {
            segments.push(TrackSegment::new(cursor, 0, max_lane, y_offset));
        }

        cursor += step;
    }

    segments
}

fn generate_obstacles(
    track: &Track,
    stage_index: u32,
    theme: Theme,
    world_length: f64,
    rng: &mut GameRng,
) -> Vec<Obstacle> {
    let spacing = (OBSTACLE_SPACING - stage_index as f64 * OBSTACLE_SPACING_PER_STAGE)
        .max(OBSTACLE_SPACING_FLOOR);

    let mut obstacles = Vec::new();
    let mut x = FIRST_OBSTACLE_X;
    while x < world_length {
        let layout = track.layout_at(x);
        let lane = rng.between(layout.min_lane, layout.max_lane);
        let kind = pick_obstacle(theme, rng);
        obstacles.push(Obstacle::new(x, lane, kind));
        x += spacing + rng.unit() * OBSTACLE_JITTER;
    }
    obstacles
}

fn pick_obstacle(theme: Theme, rng: &mut GameRng) -> ObstacleKind {
    match theme {
        Theme::Storm if rng.chance(0.5) => {
            if rng.chance(0.5) {
                ObstacleKind::Water
            } else {
                ObstacleKind::Mud
            }
        }
        Theme::Night if rng.chance(0.6) => ObstacleKind::Hurdle,
        _ => {
            let idx = (rng.unit() * ObstacleKind::ALL.len() as f64) as usize;
            ObstacleKind::ALL[idx.min(ObstacleKind::ALL.len() - 1)]
        }
    }
}

fn generate_npcs(
    track: &Track,
    stage_index: u32,
    config: &Config,
    rng: &mut GameRng,
) -> Vec<NpcSpawn> {
    (0..Params::NPC_COUNT)
        .map(|i| {
            let lane = i % Params::LANE_COUNT;
            let x = NPC_START_X + i as f64 * NPC_START_GAP;
            let y = config.lane_center_y(&track.layout_at(x), lane);

            let mut racer = Racer::new(x, y, lane);
            racer.speed = NPC_START_SPEED;
            let base_speed = NPC_START_SPEED
                + stage_index as f64 * NPC_SPEED_PER_STAGE
                + rng.unit() * NPC_SPEED_JITTER;
            let color = NPC_COLORS[i as usize % NPC_COLORS.len()];

            NpcSpawn {
                npc: Npc::new(i, base_speed, color),
                racer,
            }
        })
        .collect()
}
