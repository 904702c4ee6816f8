use hecs::World;

use crate::components::*;
use crate::resources::*;

/// Apply queued control samples to the riders bound to each input slot
pub fn ingest_inputs(world: &mut World, input: &mut InputQueue) {
    for (slot, controls) in input.inputs.drain(..) {
        for (_entity, (rider, intent)) in world.query_mut::<(&Rider, &mut RiderIntent)>() {
            if rider.slot() == Some(slot) {
                intent.update(controls);
            }
        }
    }
}
