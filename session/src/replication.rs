use hecs::{Entity, World};
use proto::{NpcWire, ObstacleWire, PeerMsg, RacerState, SegmentWire, UpgradesWire};
use race_core::*;

use crate::error::SessionError;

/// How an inbound snapshot lands on the local copy of a remote rider.
///
/// Physics never sees this seam; a smoother policy (interpolation,
/// prediction) can replace the default without touching the systems.
pub trait Reconciler {
    fn apply_snapshot(&mut self, world: &mut World, entity: Entity, snapshot: RiderSnapshot);
}

/// Replace the stored record wholesale with whatever arrived last
#[derive(Debug, Clone, Copy, Default)]
pub struct LastWriteWins;

impl Reconciler for LastWriteWins {
    fn apply_snapshot(&mut self, world: &mut World, entity: Entity, snapshot: RiderSnapshot) {
        let Ok((racer, rider)) = world.query_one_mut::<(&mut Racer, &mut Rider)>(entity) else {
            return;
        };
        *racer = snapshot.racer;
        *rider = snapshot.rider;
    }
}

// ============================================================================
// Rider snapshots
// ============================================================================

pub fn racer_state(snapshot: &RiderSnapshot) -> RacerState {
    let RiderSnapshot { racer, rider } = snapshot;
    RacerState {
        id: rider.id,
        x: racer.x,
        y: racer.y,
        lane: racer.lane,
        target_lane: racer.target_lane,
        speed: racer.speed,
        heat: rider.heat,
        is_jumping: racer.is_jumping,
        z: racer.z,
        vz: racer.vz,
        is_crashed: racer.is_crashed,
        crash_timer: racer.crash_timer,
        rotation: rider.rotation,
        rotation_speed: rider.rotation_speed,
        total_jump_rotation: rider.total_jump_rotation,
        flips_in_current_jump: rider.flips_in_current_jump,
        combo_multiplier: rider.combo_multiplier,
        score: rider.score,
        trick_bonus: rider.trick_bonus,
        crash_count: rider.crash_count,
        top_speed: rider.top_speed,
        upgrades: UpgradesWire {
            engine: rider.upgrades.engine,
            cooling: rider.upgrades.cooling,
            turbo: rider.upgrades.turbo,
            color: rider.upgrades.color,
        },
    }
}

/// Rebuild a snapshot from the wire, bound to `control` on this peer
pub fn rider_snapshot(state: &RacerState, control: Control) -> RiderSnapshot {
    let racer = Racer {
        x: state.x,
        y: state.y,
        lane: state.lane.min(Params::LANE_COUNT - 1),
        target_lane: state.target_lane.min(Params::LANE_COUNT - 1),
        speed: state.speed.max(0.0),
        is_jumping: state.is_jumping,
        z: state.z,
        vz: state.vz,
        is_crashed: state.is_crashed,
        crash_timer: state.crash_timer,
    };
    let upgrades = Upgrades {
        engine: state.upgrades.engine,
        cooling: state.upgrades.cooling,
        turbo: state.upgrades.turbo,
        color: state.upgrades.color,
    };
    let mut rider = Rider::new(state.id, control, upgrades);
    rider.heat = state.heat;
    rider.rotation = state.rotation;
    rider.rotation_speed = state.rotation_speed;
    rider.total_jump_rotation = state.total_jump_rotation;
    rider.flips_in_current_jump = state.flips_in_current_jump;
    rider.combo_multiplier = state.combo_multiplier.max(1);
    rider.score = state.score;
    rider.trick_bonus = state.trick_bonus;
    rider.crash_count = state.crash_count;
    rider.top_speed = state.top_speed;
    RiderSnapshot { racer, rider }
}

// ============================================================================
// Track transfer
// ============================================================================

pub fn track_message(stage_index: u32, track: &Track, npcs: &[NpcSpawn]) -> PeerMsg {
    PeerMsg::InitTrack {
        stage_index,
        segments: track
            .segments
            .iter()
            .map(|s| SegmentWire {
                x: s.x,
                min_lane: s.min_lane,
                max_lane: s.max_lane,
                y_offset: s.y_offset,
            })
            .collect(),
        obstacles: track
            .obstacles
            .iter()
            .map(|o| ObstacleWire {
                x: o.x,
                lane: o.lane,
                kind: o.kind.code(),
            })
            .collect(),
        npcs: npcs
            .iter()
            .map(|n| NpcWire {
                id: n.npc.id,
                x: n.racer.x,
                y: n.racer.y,
                lane: n.racer.lane,
                speed: n.racer.speed,
                base_speed: n.npc.base_speed,
                color: n.npc.color,
            })
            .collect(),
    }
}

/// Validate a transferred track and turn it into a stage layout
pub fn adopt_track(
    segments: &[SegmentWire],
    obstacles: &[ObstacleWire],
    npcs: &[NpcWire],
) -> Result<StageLayout, SessionError> {
    let max_lane = Params::LANE_COUNT - 1;
    let corrupt = |reason: String| Err(SessionError::CorruptTrack(reason));

    if segments.is_empty() {
        return corrupt("no segments".into());
    }
    let mut track_segments = Vec::with_capacity(segments.len());
    for (i, s) in segments.iter().enumerate() {
        if !s.x.is_finite() || !s.y_offset.is_finite() {
            return corrupt(format!("segment {i} has a non-finite coordinate"));
        }
        if s.min_lane > s.max_lane || s.max_lane > max_lane {
            return corrupt(format!(
                "segment {i} has lanes {}..={}",
                s.min_lane, s.max_lane
            ));
        }
        if track_segments.last().is_some_and(|prev: &TrackSegment| s.x <= prev.x) {
            return corrupt(format!("segment {i} is out of order"));
        }
        track_segments.push(TrackSegment::new(s.x, s.min_lane, s.max_lane, s.y_offset));
    }

    let mut track_obstacles = Vec::with_capacity(obstacles.len());
    for (i, o) in obstacles.iter().enumerate() {
        let Some(kind) = ObstacleKind::from_code(o.kind) else {
            return corrupt(format!("obstacle {i} has unknown kind {}", o.kind));
        };
        if !o.x.is_finite() || o.lane > max_lane {
            return corrupt(format!("obstacle {i} is off the track"));
        }
        if track_obstacles.last().is_some_and(|prev: &Obstacle| o.x < prev.x) {
            return corrupt(format!("obstacle {i} is out of order"));
        }
        track_obstacles.push(Obstacle::new(o.x, o.lane, kind));
    }

    let mut roster = Vec::with_capacity(npcs.len());
    for n in npcs {
        if !n.x.is_finite() || !n.y.is_finite() || n.lane > max_lane {
            return corrupt(format!("npc {} has an invalid position", n.id));
        }
        let mut racer = Racer::new(n.x, n.y, n.lane);
        racer.speed = n.speed.max(0.0);
        roster.push(NpcSpawn {
            npc: Npc::new(n.id, n.base_speed, n.color),
            racer,
        });
    }

    Ok(StageLayout {
        track: Track::new(track_segments, track_obstacles),
        npcs: roster,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generated() -> (Config, StageLayout) {
        let config = Config::new();
        let layout = generate(1, Theme::Dusk, 20_000.0, &config, &mut GameRng::new(5));
        (config, layout)
    }

    fn unpack(msg: PeerMsg) -> (Vec<SegmentWire>, Vec<ObstacleWire>, Vec<NpcWire>) {
        match msg {
            PeerMsg::InitTrack {
                segments,
                obstacles,
                npcs,
                ..
            } => (segments, obstacles, npcs),
            other => panic!("expected INIT_TRACK, got {}", other.name()),
        }
    }

    #[test]
    fn test_transferred_track_is_adopted_verbatim() {
        let (_config, layout) = generated();
        let (segments, obstacles, npcs) = unpack(track_message(1, &layout.track, &layout.npcs));

        let adopted = adopt_track(&segments, &obstacles, &npcs).unwrap();
        assert_eq!(adopted, layout);
    }

    #[test]
    fn test_empty_track_is_rejected() {
        let err = adopt_track(&[], &[], &[]).unwrap_err();
        assert!(matches!(err, SessionError::CorruptTrack(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_bad_segments_are_rejected() {
        let seg = |x: f64, min_lane: u8, max_lane: u8| SegmentWire {
            x,
            min_lane,
            max_lane,
            y_offset: 0.0,
        };
        assert!(adopt_track(&[seg(0.0, 2, 1)], &[], &[]).is_err());
        assert!(adopt_track(&[seg(0.0, 0, 4)], &[], &[]).is_err());
        assert!(adopt_track(&[seg(0.0, 0, 3), seg(0.0, 0, 3)], &[], &[]).is_err());
        assert!(adopt_track(&[seg(f64::NAN, 0, 3)], &[], &[]).is_err());
    }

    #[test]
    fn test_bad_obstacles_are_rejected() {
        let (_config, layout) = generated();
        let (segments, mut obstacles, npcs) =
            unpack(track_message(1, &layout.track, &layout.npcs));
        obstacles[0].kind = 42;
        assert!(adopt_track(&segments, &obstacles, &npcs).is_err());

        let (segments, mut obstacles, npcs) =
            unpack(track_message(1, &layout.track, &layout.npcs));
        obstacles.swap(0, 1);
        assert!(adopt_track(&segments, &obstacles, &npcs).is_err());
    }

    #[test]
    fn test_snapshot_wire_preserves_the_record() {
        let mut racer = Racer::new(812.0, 95.0, 1);
        racer.speed = 4.2;
        racer.launch(2.5);
        racer.z = 7.0;
        let mut rider = Rider::new(1, Control::Local { slot: 0 }, Upgrades::default());
        rider.heat = 55.5;
        rider.combo_multiplier = 3;
        rider.trick_bonus = 1500;
        rider.score = 1581;
        let snapshot = RiderSnapshot { racer, rider };

        let restored = rider_snapshot(&racer_state(&snapshot), Control::Remote);

        assert_eq!(restored.racer, snapshot.racer);
        assert_eq!(restored.rider.control, Control::Remote);
        assert_eq!(restored.rider.heat, 55.5);
        assert_eq!(restored.rider.combo_multiplier, 3);
        assert_eq!(restored.rider.score, 1581);
    }

    #[test]
    fn test_last_write_wins_replaces_both_components() {
        let mut world = World::new();
        let entity = world.spawn((
            Racer::new(20.0, 70.0, 0),
            Rider::new(1, Control::Remote, Upgrades::default()),
        ));
        let mut racer = Racer::new(500.0, 90.0, 1);
        racer.crash(30);
        let mut rider = Rider::new(1, Control::Remote, Upgrades::default());
        rider.crash_count = 4;

        LastWriteWins.apply_snapshot(&mut world, entity, RiderSnapshot { racer, rider });

        assert_eq!(*world.get::<&Racer>(entity).unwrap(), racer);
        assert_eq!(world.get::<&Rider>(entity).unwrap().crash_count, 4);
    }
}
