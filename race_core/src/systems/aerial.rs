use std::f64::consts::{PI, TAU};

use hecs::World;

use crate::components::*;
use crate::config::Config;
use crate::params::Params;
use crate::resources::*;

/// Wrap an angle into (-π, π]
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    if wrapped > PI {
        wrapped - TAU
    } else {
        wrapped
    }
}

/// Gravity, flip rotation and landing resolution for airborne riders
pub fn update_airtime(world: &mut World, config: &Config, events: &mut Events) {
    for (_entity, (racer, rider, intent)) in
        world.query_mut::<(&mut Racer, &mut Rider, &RiderIntent)>()
    {
        if !rider.is_local() {
            continue;
        }

        if !racer.is_jumping {
            rider.rotation *= Params::GROUND_ROTATION_DECAY;
            rider.rotation_speed = 0.0;
            racer.z = racer.z.min(0.0);
            continue;
        }

        racer.vz -= config.gravity;
        racer.z += racer.vz;

        spin(rider, intent.controls);

        let flips = (rider.total_jump_rotation / TAU).floor() as u32;
        if flips > rider.flips_in_current_jump {
            rider.flips_in_current_jump = flips;
            events.push(Cue::Flip {
                rider: rider.id,
                count: flips,
            });
        }

        if racer.z <= 0.0 {
            land(racer, rider, events);
        }
    }
}

fn spin(rider: &mut Rider, controls: Controls) {
    let mut rotating = false;
    if controls.left {
        rider.rotation_speed -= Params::ROTATION_INPUT;
        rotating = true;
    }
    if controls.right {
        rider.rotation_speed += Params::ROTATION_INPUT;
        rotating = true;
    }

    if rotating {
        rider.rotation_speed *= Params::ROTATION_HELD_DAMPING;
    } else {
        // Settle toward the nearest upright orientation
        let upright = (rider.rotation / TAU).round() * TAU;
        rider.rotation += (upright - rider.rotation) * Params::ROTATION_SETTLE;
        rider.rotation_speed *= Params::ROTATION_FREE_DAMPING;
    }

    rider.rotation += rider.rotation_speed;
    rider.total_jump_rotation += rider.rotation_speed.abs();
}

fn land(racer: &mut Racer, rider: &mut Rider, events: &mut Events) {
    racer.z = 0.0;
    racer.vz = 0.0;
    racer.is_jumping = false;

    if normalize_angle(rider.rotation).abs() > Params::LANDING_TOLERANCE {
        racer.knock_down(Params::WIPEOUT_TIME);
        rider.register_crash();
        events.push(Cue::Wipeout { rider: rider.id });
        events.shake(18.0);
    } else {
        rider.rotation = 0.0;
        let flips = rider.flips_in_current_jump;
        if flips > 0 {
            rider.combo_multiplier += 1;
            let bonus = flips * Params::FLIP_BONUS * rider.combo_multiplier;
            rider.trick_bonus += bonus;
            rider.score += bonus;
            events.push(Cue::StuckLanding {
                rider: rider.id,
                multiplier: rider.combo_multiplier,
                bonus,
            });
        } else {
            events.push(Cue::CleanLanding { rider: rider.id });
        }
    }

    rider.reset_jump_tracking();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upgrades::Upgrades;

    fn airborne(controls: Controls, vz: f64) -> (World, hecs::Entity) {
        let mut world = World::new();
        let mut racer = Racer::new(100.0, 70.0, 0);
        racer.launch(vz);
        let e = world.spawn((
            racer,
            Rider::new(0, Control::Local { slot: 0 }, Upgrades::default()),
            RiderIntent::with_controls(controls),
        ));
        (world, e)
    }

    fn fly_until_landed(world: &mut World, e: hecs::Entity, events: &mut Events) -> Vec<Cue> {
        let config = Config::new();
        let mut cues = Vec::new();
        for _ in 0..1000 {
            events.clear();
            update_airtime(world, &config, events);
            cues.extend(events.cues.iter().copied());
            if !world.get::<&Racer>(e).unwrap().is_jumping {
                break;
            }
        }
        cues
    }

    #[test]
    fn test_normalize_angle_range() {
        assert!((normalize_angle(TAU) - 0.0).abs() < 1e-12);
        assert!((normalize_angle(PI) - PI).abs() < 1e-12);
        assert!((normalize_angle(-PI) - PI).abs() < 1e-12);
        assert!((normalize_angle(3.0 * TAU + 0.5) - 0.5).abs() < 1e-9);
        assert!((normalize_angle(-TAU - 0.5) + 0.5).abs() < 1e-9);
        for i in -100..100 {
            let a = normalize_angle(i as f64 * 0.37);
            assert!(a > -PI && a <= PI);
        }
    }

    #[test]
    fn test_gravity_integration() {
        let (mut world, e) = airborne(Controls::default(), 3.6);
        let mut events = Events::new();
        update_airtime(&mut world, &Config::new(), &mut events);
        let racer = *world.get::<&Racer>(e).unwrap();
        assert!((racer.vz - 3.44).abs() < 1e-12);
        assert!((racer.z - 3.44).abs() < 1e-12);
        assert!(racer.is_jumping);
    }

    #[test]
    fn test_plain_jump_lands_without_bonus() {
        let (mut world, e) = airborne(Controls::default(), 3.6);
        world.get::<&mut Rider>(e).unwrap().combo_multiplier = 2;
        let mut events = Events::new();

        let cues = fly_until_landed(&mut world, e, &mut events);

        let racer = *world.get::<&Racer>(e).unwrap();
        let rider = *world.get::<&Rider>(e).unwrap();
        assert!(!racer.is_jumping);
        assert_eq!(racer.z, 0.0);
        assert!(!racer.is_crashed);
        assert_eq!(rider.combo_multiplier, 2, "zero flips leave the combo alone");
        assert_eq!(rider.trick_bonus, 0);
        assert!(cues.contains(&Cue::CleanLanding { rider: 0 }));
    }

    #[test]
    fn test_held_spin_counts_flips_once_per_turn() {
        let right = Controls {
            right: true,
            ..Controls::default()
        };
        let (mut world, e) = airborne(right, 3.6 * 1.6);
        let mut events = Events::new();
        let config = Config::new();

        let mut flip_counts = Vec::new();
        while world.get::<&Racer>(e).unwrap().is_jumping {
            let before = *world.get::<&Rider>(e).unwrap();
            events.clear();
            update_airtime(&mut world, &config, &mut events);
            for cue in &events.cues {
                if let Cue::Flip { count, .. } = cue {
                    flip_counts.push(*count);
                }
            }
            if world.get::<&Racer>(e).unwrap().is_jumping {
                let rider = *world.get::<&Rider>(e).unwrap();
                let expected = (rider.total_jump_rotation / TAU).floor() as u32;
                assert_eq!(rider.flips_in_current_jump, expected);
                assert!(rider.flips_in_current_jump <= before.flips_in_current_jump + 1);
            }
        }
        assert!(!flip_counts.is_empty(), "a held spin on a big ramp completes a turn");
        let expected: Vec<u32> = (1..=flip_counts.len() as u32).collect();
        assert_eq!(flip_counts, expected, "one credit per completed turn");
    }

    #[test]
    fn test_clean_flip_landing_awards_combo_bonus() {
        let (mut world, e) = airborne(Controls::default(), 0.1);
        {
            let mut rider = world.get::<&mut Rider>(e).unwrap();
            rider.rotation = TAU * 2.0 + 0.1;
            rider.total_jump_rotation = TAU * 2.0 + 0.1;
            rider.flips_in_current_jump = 2;
            rider.combo_multiplier = 1;
        }
        world.get::<&mut Racer>(e).unwrap().z = 0.05;
        let mut events = Events::new();

        update_airtime(&mut world, &Config::new(), &mut events);

        let racer = *world.get::<&Racer>(e).unwrap();
        let rider = *world.get::<&Rider>(e).unwrap();
        assert!(!racer.is_jumping);
        assert!(!racer.is_crashed);
        assert_eq!(rider.combo_multiplier, 2);
        assert_eq!(rider.trick_bonus, 2 * 500 * 2);
        assert_eq!(rider.rotation, 0.0);
        assert_eq!(rider.flips_in_current_jump, 0);
        assert_eq!(rider.total_jump_rotation, 0.0);
        assert!(events.contains(&Cue::StuckLanding {
            rider: 0,
            multiplier: 2,
            bonus: 2000
        }));
    }

    #[test]
    fn test_crooked_landing_wipes_out_regardless_of_flips() {
        let (mut world, e) = airborne(Controls::default(), 0.1);
        {
            let mut rider = world.get::<&mut Rider>(e).unwrap();
            rider.rotation = TAU * 3.0 + 1.5;
            rider.total_jump_rotation = TAU * 3.0 + 1.5;
            rider.flips_in_current_jump = 3;
            rider.combo_multiplier = 4;
        }
        world.get::<&mut Racer>(e).unwrap().speed = 5.0;
        world.get::<&mut Racer>(e).unwrap().z = 0.05;
        let mut events = Events::new();

        update_airtime(&mut world, &Config::new(), &mut events);

        let racer = *world.get::<&Racer>(e).unwrap();
        let rider = *world.get::<&Rider>(e).unwrap();
        assert!(racer.is_crashed);
        assert_eq!(racer.speed, 0.0);
        assert_eq!(racer.crash_timer, Params::WIPEOUT_TIME);
        assert_eq!(rider.crash_count, 1);
        assert_eq!(rider.combo_multiplier, 1);
        assert_eq!(rider.trick_bonus, 0);
        assert_eq!(rider.flips_in_current_jump, 0);
        assert!(events.contains(&Cue::Wipeout { rider: 0 }));
    }

    #[test]
    fn test_grounded_rider_sheds_rotation() {
        let mut world = World::new();
        let mut rider = Rider::new(0, Control::Local { slot: 0 }, Upgrades::default());
        rider.rotation = 1.0;
        rider.rotation_speed = 0.3;
        let mut racer = Racer::new(0.0, 70.0, 0);
        racer.z = -1.5;
        let e = world.spawn((racer, rider, RiderIntent::new()));

        update_airtime(&mut world, &Config::new(), &mut Events::new());

        let rider = *world.get::<&Rider>(e).unwrap();
        assert!((rider.rotation - 0.82).abs() < 1e-12);
        assert_eq!(rider.rotation_speed, 0.0);
        assert_eq!(world.get::<&Racer>(e).unwrap().z, -1.5, "mud sink persists");
    }
}
