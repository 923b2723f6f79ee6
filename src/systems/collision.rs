//! Narrow-phase box tests between two entities.

use crate::components::entity::Entity;
use crate::traits::Contact;

/// First overlapping box pair of `a` against `b`, scanning both in insertion
/// order. Later pairs are never reported for the same step, so entities with
/// several separate boxes may under-report simultaneous contacts.
pub fn first_contact(a: &Entity, b: &Entity) -> Option<Contact> {
    a.collision().iter().enumerate().find_map(|(our_index, ours)| {
        b.collision()
            .iter()
            .enumerate()
            .find(|(_, theirs)| ours.intersects(theirs))
            .map(|(their_index, theirs)| Contact {
                ours: ours.clone(),
                theirs: theirs.clone(),
                our_index,
                their_index,
            })
    })
}

/// True if any box of `a` overlaps any box of `b`.
pub fn entities_overlap(a: &Entity, b: &Entity) -> bool {
    first_contact(a, b).is_some()
}
