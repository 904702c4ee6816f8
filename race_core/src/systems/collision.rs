use glam::DVec3;
use hecs::{Entity, World};

use crate::components::*;
use crate::params::Params;
use crate::resources::*;

/// Racer data captured before resolution
#[derive(Debug, Clone, Copy)]
struct Contact {
    entity: Entity,
    order: u16,             // Players by id, then NPCs by id
    rider_id: Option<u8>,   // None for NPCs
    is_subject: bool,       // Locally simulated player
    position: DVec3,
    crashed: bool,
}

fn overlaps(a: DVec3, b: DVec3) -> bool {
    let d = (b - a).abs();
    d.x < Params::COLLIDE_X && d.y < Params::COLLIDE_Y && d.z < Params::COLLIDE_Z
}

/// Resolve racer-on-racer contact for locally simulated players.
///
/// Each subject tests every other racer in stable order. The trailing racer
/// of a touching pair is knocked down: when that is the subject it is a
/// rear-end, otherwise the other racer is blocked.
pub fn resolve_collisions(world: &mut World, events: &mut Events) {
    let mut contacts: Vec<Contact> = Vec::new();
    for (entity, (racer, rider)) in world.query_mut::<(&Racer, &Rider)>() {
        contacts.push(Contact {
            entity,
            order: rider.id as u16,
            rider_id: Some(rider.id),
            is_subject: rider.is_local(),
            position: racer.position(),
            crashed: racer.is_crashed,
        });
    }
    for (entity, (racer, npc)) in world.query_mut::<(&Racer, &Npc)>() {
        contacts.push(Contact {
            entity,
            order: 256 + npc.id as u16,
            rider_id: None,
            is_subject: false,
            position: racer.position(),
            crashed: racer.is_crashed,
        });
    }
    contacts.sort_by_key(|c| c.order);

    for i in 0..contacts.len() {
        if !contacts[i].is_subject {
            continue;
        }
        for j in 0..contacts.len() {
            let subject = contacts[i];
            if subject.crashed {
                break;
            }
            let other = contacts[j];
            if i == j || other.crashed || !overlaps(subject.position, other.position) {
                continue;
            }

            let dx = other.position.x - subject.position.x;
            if dx > 0.0 {
                if rear_end(world, &subject, events) {
                    contacts[i].crashed = true;
                }
            } else if block(world, &other, subject.rider_id.unwrap_or_default(), events) {
                contacts[j].crashed = true;
            }
        }
    }
}

fn rear_end(world: &mut World, subject: &Contact, events: &mut Events) -> bool {
    let Ok((racer, rider)) = world.query_one_mut::<(&mut Racer, &mut Rider)>(subject.entity) else {
        return false;
    };
    racer.knock_down(Params::REAR_END_TIME);
    rider.register_crash();
    events.push(Cue::Bonk { rider: rider.id });
    events.shake(12.0);
    true
}

fn block(world: &mut World, other: &Contact, by: u8, events: &mut Events) -> bool {
    let Ok(mut racer) = world.get::<&mut Racer>(other.entity) else {
        return false;
    };
    if other.rider_id.is_some() {
        racer.knock_down(Params::BLOCKED_RIDER_TIME);
        drop(racer);
        if let Ok(mut rider) = world.get::<&mut Rider>(other.entity) {
            rider.register_crash();
        }
    } else {
        racer.knock_down(Params::BLOCKED_NPC_TIME);
    }
    events.push(Cue::Blocked { rider: by });
    events.shake(8.0);
    true
}
