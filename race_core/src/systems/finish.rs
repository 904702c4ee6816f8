use hecs::World;

use crate::components::*;
use crate::config::Config;
use crate::resources::*;
use crate::systems::propulsion::distance_score;

/// End the stage once any rider has covered the full distance
pub fn check_finish(world: &mut World, config: &Config) -> Option<RaceOutcome> {
    let finished = world
        .query_mut::<(&Racer, &Rider)>()
        .into_iter()
        .any(|(_e, (racer, _rider))| distance_score(racer.x) >= config.stage_length);
    if !finished {
        return None;
    }

    let mut results: Vec<RaceResult> = world
        .query_mut::<&Rider>()
        .into_iter()
        .map(|(_e, rider)| RaceResult {
            rider_id: rider.id,
            score: rider.score,
            crashes: rider.crash_count,
        })
        .collect();
    results.sort_by_key(|r| r.rider_id);

    log::info!("stage complete: {:?}", results);
    Some(RaceOutcome::StageComplete { results })
}
