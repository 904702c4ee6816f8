use hecs::World;

use crate::components::*;
use crate::config::Config;
use crate::resources::Weather;
use crate::track::Track;

/// Consume lane presses, clamp to the segment and ease toward the lane center.
/// Only airborne riders hold their lane; a crashed rider can still steer clear.
pub fn steer_riders(world: &mut World, track: &Track, config: &Config, weather: &Weather) {
    for (_entity, (racer, rider, intent)) in
        world.query_mut::<(&mut Racer, &Rider, &mut RiderIntent)>()
    {
        if !rider.is_local() {
            continue;
        }
        let layout = track.layout_at(racer.x);

        if racer.is_grounded() {
            if intent.lane_up_pending() && racer.target_lane > layout.min_lane {
                racer.target_lane -= 1;
                intent.up_consumed = true;
            }
            if intent.lane_down_pending() && racer.target_lane < layout.max_lane {
                racer.target_lane += 1;
                intent.down_consumed = true;
            }
        }

        ease_into_lane(racer, &layout, config, weather.lane_response);
    }
}

/// Clamp the target lane to `layout`, ease `y` toward it and re-derive `lane`
pub fn ease_into_lane(
    racer: &mut Racer,
    layout: &crate::track::TrackSegment,
    config: &Config,
    response: f64,
) {
    racer.target_lane = layout.clamp_lane(racer.target_lane);
    let target_y = config.lane_center_y(layout, racer.target_lane);
    racer.y += (target_y - racer.y) * response;
    racer.lane = config.lane_at_y(layout, racer.y);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::Theme;
    use crate::track::TrackSegment;
    use crate::upgrades::Upgrades;

    fn spawn(world: &mut World, config: &Config, lane: u8, controls: Controls) -> hecs::Entity {
        let y = config.lane_center_y(&TrackSegment::full_width(), lane);
        world.spawn((
            Racer::new(100.0, y, lane),
            Rider::new(0, Control::Local { slot: 0 }, Upgrades::default()),
            RiderIntent::with_controls(controls),
        ))
    }

    #[test]
    fn test_press_moves_target_once() {
        let mut world = World::new();
        let config = Config::new();
        let weather = Weather::for_theme(Theme::Day);
        let track = Track::default();
        let down = Controls {
            down: true,
            ..Controls::default()
        };
        let e = spawn(&mut world, &config, 1, down);

        steer_riders(&mut world, &track, &config, &weather);
        steer_riders(&mut world, &track, &config, &weather);

        let racer = *world.get::<&Racer>(e).unwrap();
        assert_eq!(racer.target_lane, 2, "held press only changes lane once");
        assert!(racer.y > config.lane_center_y(&TrackSegment::full_width(), 1));
    }

    #[test]
    fn test_no_lane_change_while_airborne() {
        let mut world = World::new();
        let config = Config::new();
        let weather = Weather::for_theme(Theme::Day);
        let track = Track::default();
        let up = Controls {
            up: true,
            ..Controls::default()
        };
        let e = spawn(&mut world, &config, 2, up);
        world.get::<&mut Racer>(e).unwrap().launch(3.0);

        steer_riders(&mut world, &track, &config, &weather);
        assert_eq!(world.get::<&Racer>(e).unwrap().target_lane, 2);
        assert!(
            world.get::<&RiderIntent>(e).unwrap().lane_up_pending(),
            "press stays pending until it can apply"
        );
    }

    #[test]
    fn test_crashed_rider_can_still_change_lane() {
        let mut world = World::new();
        let config = Config::new();
        let weather = Weather::for_theme(Theme::Day);
        let track = Track::default();
        let down = Controls {
            down: true,
            ..Controls::default()
        };
        let e = spawn(&mut world, &config, 1, down);
        world.get::<&mut Racer>(e).unwrap().crash(90);

        steer_riders(&mut world, &track, &config, &weather);

        let racer = *world.get::<&Racer>(e).unwrap();
        assert_eq!(racer.target_lane, 2);
        assert!(racer.y > config.lane_center_y(&TrackSegment::full_width(), 1));
    }

    #[test]
    fn test_target_clamped_to_narrow_segment() {
        let mut world = World::new();
        let config = Config::new();
        let weather = Weather::for_theme(Theme::Day);
        let track = Track::new(vec![TrackSegment::new(0.0, 1, 2, 0.0)], vec![]);
        let e = spawn(&mut world, &config, 3, Controls::default());

        steer_riders(&mut world, &track, &config, &weather);
        assert_eq!(world.get::<&Racer>(e).unwrap().target_lane, 2);

        // Press toward a closed lane does nothing
        let down = Controls {
            down: true,
            ..Controls::default()
        };
        world.get::<&mut RiderIntent>(e).unwrap().update(down);
        steer_riders(&mut world, &track, &config, &weather);
        assert_eq!(world.get::<&Racer>(e).unwrap().target_lane, 2);
    }

    #[test]
    fn test_storm_eases_slower() {
        let config = Config::new();
        let layout = TrackSegment::full_width();
        let start_y = config.lane_center_y(&layout, 0);

        let mut day = Racer::new(0.0, start_y, 0);
        day.target_lane = 3;
        let mut storm = day;

        ease_into_lane(&mut day, &layout, &config, Weather::for_theme(Theme::Day).lane_response);
        ease_into_lane(&mut storm, &layout, &config, Weather::for_theme(Theme::Storm).lane_response);

        assert!((day.y - start_y - 60.0 * 0.18).abs() < 1e-9);
        assert!((storm.y - start_y - 60.0 * 0.12).abs() < 1e-9);
    }
}
