use hecs::World;

use crate::components::*;
use crate::config::Config;
use crate::params::Params;
use crate::resources::*;

/// Throttle, turbo and heat model, including crash recovery
pub fn drive_riders(world: &mut World, config: &Config, weather: &Weather, events: &mut Events) {
    for (_entity, (racer, rider, intent)) in
        world.query_mut::<(&mut Racer, &mut Rider, &RiderIntent)>()
    {
        if !rider.is_local() {
            continue;
        }
        let controls = intent.controls;
        let engine = rider.upgrades.engine_tier();
        let cooling = rider.upgrades.cooling_tier();
        let turbo = rider.upgrades.turbo_tier();

        if racer.is_crashed {
            racer.speed *= Params::CRASH_SPEED_DECAY;
            racer.crash_timer = racer.crash_timer.saturating_sub(1);
            if racer.crash_timer == 0 {
                racer.is_crashed = false;
                rider.heat = 0.0;
            }
        } else if controls.turbo {
            racer.speed += config.acceleration * 1.5 * engine.accel_mult * weather.grip;
            rider.heat = (rider.heat + config.heat_inc * 1.3 * cooling.heat_mult).min(config.max_heat);
            if rider.heat >= config.max_heat {
                racer.crash(config.overheat_penalty);
                rider.register_crash();
                events.push(Cue::Overheat { rider: rider.id });
                events.shake(12.0);
            }
        } else if controls.gas {
            racer.speed += config.acceleration * engine.accel_mult * weather.grip;
            rider.heat = (rider.heat - config.heat_cool * 0.5).max(0.0);
        } else {
            racer.speed -= config.friction * weather.friction_mult;
            rider.heat = (rider.heat - config.heat_cool).max(0.0);
        }

        let ceiling = if controls.turbo {
            config.turbo_speed * turbo.turbo_mult
        } else {
            config.max_speed * engine.speed_mult
        };
        racer.speed = racer.speed.clamp(0.0, ceiling);
    }
}

/// Move riders forward and refresh their score
pub fn advance_riders(world: &mut World) {
    for (_entity, (racer, rider)) in world.query_mut::<(&mut Racer, &mut Rider)>() {
        if !rider.is_local() {
            continue;
        }
        racer.x += racer.speed;
        rider.top_speed = rider.top_speed.max(racer.speed);
        rider.score = distance_score(racer.x) + rider.trick_bonus;
    }
}

/// Score units covered at world position `x`
pub fn distance_score(x: f64) -> u32 {
    (x.max(0.0) / Params::WORLD_SCALE).floor() as u32
}
