use hecs::World;

use crate::components::*;
use crate::config::Config;
use crate::params::Params;
use crate::resources::*;
use crate::systems::lanes::ease_into_lane;
use crate::track::{ObstacleKind, Track};

/// Position and pace of the rider the camera follows
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaceReference {
    pub x: f64,
    pub speed: f64,
}

impl PaceReference {
    /// Look up rider `id`; None when that rider is not in the world
    pub fn of_rider(world: &World, id: u8) -> Option<Self> {
        world
            .query::<(&Racer, &Rider)>()
            .iter()
            .find(|(_e, (_racer, rider))| rider.id == id)
            .map(|(_e, (racer, _rider))| Self {
                x: racer.x,
                speed: racer.speed,
            })
    }
}

/// Authoritative NPC policy: recycling, pacing, lane changes and ramps
pub fn drive_npcs(
    world: &mut World,
    track: &Track,
    config: &Config,
    clock: &Clock,
    rng: &mut GameRng,
    reference: PaceReference,
) {
    let camera_x = config.camera_x(reference.x);

    let mut npcs: Vec<(hecs::Entity, u8)> = world
        .query_mut::<&Npc>()
        .into_iter()
        .map(|(e, npc)| (e, npc.id))
        .collect();
    npcs.sort_by_key(|(_e, id)| *id);

    for (entity, _id) in npcs {
        let Ok((racer, npc)) = world.query_one_mut::<(&mut Racer, &Npc)>(entity) else {
            continue;
        };

        if racer.x < camera_x - Params::NPC_RECYCLE_BEHIND {
            recycle(racer, npc, track, config, camera_x, rng);
        }

        if racer.is_crashed {
            racer.speed *= Params::NPC_CRASH_DECAY;
            racer.crash_timer = racer.crash_timer.saturating_sub(1);
            if racer.crash_timer == 0 {
                racer.is_crashed = false;
                racer.speed = npc.base_speed * Params::NPC_RECOVERY_SPEED;
            }
            continue;
        }

        let gap = racer.x - reference.x;
        let target_speed = if gap < -Params::NPC_CATCH_UP_GAP {
            reference.speed + Params::NPC_CATCH_UP_BOOST
        } else if gap > Params::NPC_EASE_OFF_GAP {
            npc.base_speed * Params::NPC_EASE_OFF_FACTOR
        } else {
            npc.base_speed
        };
        racer.speed += (target_speed - racer.speed) * Params::NPC_SPEED_EASING;
        racer.speed = racer.speed.max(0.0);

        let layout = track.layout_at(racer.x);
        if clock.every(Params::NPC_LANE_CHANGE_PERIOD)
            && !racer.is_jumping
            && rng.chance(Params::NPC_LANE_CHANGE_CHANCE)
        {
            let next = racer.target_lane as i32 + rng.sign();
            if layout.allows(next) {
                racer.target_lane = next as u8;
            }
        }
        ease_into_lane(racer, &layout, config, Params::NPC_LANE_RESPONSE);

        racer.x += racer.speed;

        if racer.is_jumping {
            racer.vz -= config.gravity;
            racer.z += racer.vz;
            if racer.z <= 0.0 {
                racer.z = 0.0;
                racer.vz = 0.0;
                racer.is_jumping = false;
            }
        }

        for obstacle in track.obstacles_near(racer.x, Params::NPC_RAMP_REACH) {
            if racer.is_jumping {
                break;
            }
            if obstacle.lane != racer.lane {
                continue;
            }
            let scale = match obstacle.kind {
                ObstacleKind::BigRamp => 1.4,
                ObstacleKind::Ramp | ObstacleKind::Bump => 1.0,
                _ => continue,
            };
            racer.launch(config.jump_force * scale);
        }
    }
}

/// Teleport an NPC that fell off the back of the view to just past the front
fn recycle(
    racer: &mut Racer,
    npc: &Npc,
    track: &Track,
    config: &Config,
    camera_x: f64,
    rng: &mut GameRng,
) {
    racer.x = camera_x
        + config.view_width
        + Params::NPC_RESPAWN_AHEAD
        + rng.unit() * Params::NPC_RESPAWN_SPREAD;
    racer.is_crashed = false;
    racer.crash_timer = 0;
    racer.speed = npc.base_speed;
    racer.is_jumping = false;
    racer.z = 0.0;
    racer.vz = 0.0;

    let layout = track.layout_at(racer.x);
    racer.target_lane = rng.between(layout.min_lane, layout.max_lane);
    log::trace!("npc {} recycled to x={:.0}", npc.id, racer.x);
}
