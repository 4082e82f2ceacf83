//! Listener registry.
//!
//! Maps each live event name to an ordered, duplicate-free sequence of
//! registrations. A name is present iff it has at least one listener.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{EmitterError, ListenerError, Result};
use crate::listener::{Listener, ListenerChange, ListenerId};
use crate::name::{Name, Reserved};

/// Where a new registration lands in the fan-out order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Position {
    Back,
    Front,
}

pub(crate) struct Registration {
    id: ListenerId,
    /// Always a `Listener<P>` for the set's payload type.
    listener: Arc<dyn Any + Send + Sync>,
}

struct ListenerSet {
    payload: TypeId,
    payload_name: &'static str,
    /// Creation sequence, orders `names()`.
    seq: u64,
    entries: Vec<Registration>,
}

/// Listeners of one event, as seen at the start of an emit
pub(crate) enum Snapshot<P> {
    Empty,
    Mismatch { expected: &'static str },
    Listeners(Vec<Listener<P>>),
}

/// Payload type the emitter itself sends on a reserved name
fn reserved_payload(name: &Name) -> Option<(TypeId, &'static str)> {
    match name {
        Name::Reserved(Reserved::NewListener | Reserved::RemoveListener) => Some((
            TypeId::of::<ListenerChange>(),
            std::any::type_name::<ListenerChange>(),
        )),
        Name::Reserved(Reserved::Error) => Some((
            TypeId::of::<ListenerError>(),
            std::any::type_name::<ListenerError>(),
        )),
        _ => None,
    }
}

#[derive(Default)]
pub(crate) struct Registry {
    sets: HashMap<Name, ListenerSet>,
    next_seq: u64,
}

impl Registry {
    /// Add `listener` under `name`, returning the resulting listener count
    pub(crate) fn insert<P: 'static>(
        &mut self,
        name: &Name,
        listener: &Listener<P>,
        position: Position,
    ) -> Result<usize> {
        if let Some((payload, expected)) = reserved_payload(name) {
            if payload != TypeId::of::<P>() {
                return Err(EmitterError::PayloadMismatch {
                    name: name.clone(),
                    expected,
                    found: std::any::type_name::<P>(),
                });
            }
        }
        if let Some(set) = self.sets.get(name) {
            if set.payload != TypeId::of::<P>() {
                return Err(EmitterError::PayloadMismatch {
                    name: name.clone(),
                    expected: set.payload_name,
                    found: std::any::type_name::<P>(),
                });
            }
            if set.entries.iter().any(|entry| entry.id == listener.id()) {
                return Err(EmitterError::DuplicateListener {
                    name: name.clone(),
                    listener: listener.id(),
                });
            }
        }

        let seq = self.next_seq;
        let set = self.sets.entry(name.clone()).or_insert_with(|| ListenerSet {
            payload: TypeId::of::<P>(),
            payload_name: std::any::type_name::<P>(),
            seq,
            entries: Vec::new(),
        });
        if set.seq == seq {
            self.next_seq += 1;
        }

        let registration = Registration {
            id: listener.id(),
            listener: Arc::new(listener.clone()),
        };
        match position {
            Position::Back => set.entries.push(registration),
            Position::Front => set.entries.insert(0, registration),
        }
        Ok(set.entries.len())
    }

    /// Remove one registration; prunes the set when it empties
    ///
    /// The registration is handed back so the caller can drop it after
    /// releasing the lock: dropping a listener runs its captures' `Drop`,
    /// which may call back into the emitter.
    pub(crate) fn remove(&mut self, name: &Name, id: ListenerId) -> Option<Registration> {
        let set = self.sets.get_mut(name)?;
        let index = set.entries.iter().position(|entry| entry.id == id)?;
        let removed = set.entries.remove(index);
        if set.entries.is_empty() {
            self.sets.remove(name);
        }
        Some(removed)
    }

    pub(crate) fn contains(&self, name: &Name, id: ListenerId) -> bool {
        self.sets
            .get(name)
            .is_some_and(|set| set.entries.iter().any(|entry| entry.id == id))
    }

    pub(crate) fn count(&self, name: &Name) -> usize {
        self.sets.get(name).map_or(0, |set| set.entries.len())
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Live names, oldest set first
    pub(crate) fn names(&self) -> Vec<Name> {
        let mut names: Vec<(u64, &Name)> =
            self.sets.iter().map(|(name, set)| (set.seq, name)).collect();
        names.sort_unstable_by_key(|(seq, _)| *seq);
        names.into_iter().map(|(_, name)| name.clone()).collect()
    }

    /// Registered ids of one event, in fan-out order
    pub(crate) fn ids(&self, name: &Name) -> Vec<ListenerId> {
        self.sets
            .get(name)
            .map(|set| set.entries.iter().map(|entry| entry.id).collect())
            .unwrap_or_default()
    }

    pub(crate) fn snapshot<P: 'static>(&self, name: &Name) -> Snapshot<P> {
        let Some(set) = self.sets.get(name) else {
            return Snapshot::Empty;
        };
        if set.payload != TypeId::of::<P>() {
            return Snapshot::Mismatch {
                expected: set.payload_name,
            };
        }
        Snapshot::Listeners(
            set.entries
                .iter()
                .filter_map(|entry| entry.listener.downcast_ref::<Listener<P>>().cloned())
                .collect(),
        )
    }
}
