//! Authoritative tower state management utilities.

use std::collections::BTreeMap;
use std::time::Duration;

use lane_defence_core::{Position, TowerClassId, TowerId};

/// State of a single tower stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct Tower {
    /// Identifier allocated by the world for the tower.
    pub(crate) id: TowerId,
    /// Class the tower was built from.
    pub(crate) class: TowerClassId,
    /// Tier index the tower currently occupies.
    pub(crate) tier: u32,
    /// World-space position of the tower.
    pub(crate) position: Position,
    /// Time remaining until the next attack may fire.
    pub(crate) cooldown: Duration,
    /// Clock timestamp until which the rapid-fire buff stays active.
    pub(crate) rapid_fire_until: Duration,
    /// Clock timestamp at which the skill becomes ready again.
    pub(crate) skill_ready_at: Duration,
}

/// Registry that stores towers and manages identifier allocation.
///
/// Entries are keyed by identifier, so iteration always walks towers in
/// ascending id order.
#[derive(Debug)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, Tower>,
    next_tower_id: TowerId,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    /// Inserts a tier-zero tower at the position, allocating its identifier.
    pub(crate) fn place(&mut self, class: TowerClassId, position: Position) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().wrapping_add(1));
        let tower = Tower {
            id,
            class,
            tier: 0,
            position,
            cooldown: Duration::ZERO,
            rapid_fire_until: Duration::ZERO,
            skill_ready_at: Duration::ZERO,
        };
        let _ = self.entries.insert(id, tower);
        id
    }

    /// Removes a tower, returning its final state when it existed.
    pub(crate) fn remove(&mut self, id: TowerId) -> Option<Tower> {
        self.entries.remove(&id)
    }

    pub(crate) fn get(&self, id: TowerId) -> Option<&Tower> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: TowerId) -> Option<&mut Tower> {
        self.entries.get_mut(&id)
    }

    /// Iterates towers in ascending id order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Tower> {
        self.entries.values()
    }

    /// Mutably iterates towers in ascending id order.
    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Tower> {
        self.entries.values_mut()
    }

    /// Forgets every tower and resets the identifier counter.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.next_tower_id = TowerId::new(0);
    }
}
