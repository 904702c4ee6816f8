use hecs::World;

use crate::components::*;
use crate::config::Config;
use crate::params::Params;
use crate::resources::*;
use crate::track::{ObstacleKind, Track, TrackSegment};

/// Trigger obstacles under grounded, upright riders
pub fn apply_obstacles(
    world: &mut World,
    track: &Track,
    config: &Config,
    rng: &mut GameRng,
    events: &mut Events,
) {
    for (_entity, (racer, rider)) in world.query_mut::<(&mut Racer, &mut Rider)>() {
        if !rider.is_local() {
            continue;
        }
        let layout = track.layout_at(racer.x);

        for obstacle in track.obstacles_near(racer.x, Params::OBSTACLE_REACH_X) {
            if racer.is_jumping || racer.is_crashed {
                break;
            }
            let obstacle_y = config.lane_center_y(&track.layout_at(obstacle.x), obstacle.lane);
            if (racer.y - obstacle_y).abs() >= Params::OBSTACLE_REACH_Y {
                continue;
            }
            hit_obstacle(racer, rider, obstacle.kind, &layout, config, rng, events);
        }
    }
}

fn hit_obstacle(
    racer: &mut Racer,
    rider: &mut Rider,
    kind: ObstacleKind,
    layout: &TrackSegment,
    config: &Config,
    rng: &mut GameRng,
    events: &mut Events,
) {
    let id = rider.id;
    match kind {
        ObstacleKind::Mud => {
            racer.speed *= 0.60;
            racer.z = Params::MUD_SINK;
            events.push(Cue::Splash {
                rider: id,
                surface: Surface::Mud,
            });
        }
        ObstacleKind::Water => {
            racer.speed *= 0.55;
            events.push(Cue::Splash {
                rider: id,
                surface: Surface::Water,
            });
        }
        ObstacleKind::OilSlick => {
            racer.speed *= 0.98;
            rider.rotation_speed += (rng.unit() - 0.5) * Params::OIL_KICK;
            if rng.chance(Params::OIL_LANE_SHIFT_CHANCE) {
                let shifted = racer.target_lane as i32 + rng.sign();
                if layout.allows(shifted) {
                    racer.target_lane = shifted as u8;
                }
            }
        }
        ObstacleKind::Gravel => {
            racer.speed *= 0.9;
            rider.heat = (rider.heat + Params::GRAVEL_HEAT).min(config.max_heat);
            events.push(Cue::Gravel { rider: id });
        }
        ObstacleKind::Hurdle => {
            if racer.speed > Params::HURDLE_CLEAR_SPEED {
                racer.launch(config.jump_force * 0.55);
                events.push(Cue::Jump { rider: id });
            } else {
                racer.speed *= 0.35;
                events.push(Cue::HurdleClip { rider: id });
            }
        }
        ObstacleKind::Bump | ObstacleKind::Ramp | ObstacleKind::BigRamp => {
            let scale = kind.launch_scale().unwrap_or(1.0);
            racer.launch(config.jump_force * scale);
            events.push(Cue::Jump { rider: id });
        }
    }
}
