#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes deterministic attack assignments from world
//! snapshots.
//!
//! Each tower is paired with the nearest live enemy its current tier is
//! allowed to hit: the enemy must sit inside the tier's range and flying
//! enemies only count for air-capable tiers. Comparisons run on squared
//! distances; an exact tie falls to the lower enemy id so replays stay
//! stable.

use lane_defence_core::{AttackAssignment, EnemyId, EnemyView, Position, TowerId, TowerView};

/// Targeting system that reuses scratch buffers to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct Targeting {
    tower_workspace: Vec<TowerWorkspace>,
    enemy_workspace: Vec<EnemyCandidate>,
}

impl Targeting {
    /// Creates a new targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes attack assignments for the provided world snapshot.
    ///
    /// The output buffer is cleared before populating it with the latest
    /// assignments, one per tower that has an eligible enemy, in tower id
    /// order.
    pub fn acquire(
        &mut self,
        towers: &TowerView,
        enemies: &EnemyView,
        out: &mut Vec<AttackAssignment>,
    ) {
        out.clear();

        if towers.is_empty() || enemies.is_empty() {
            return;
        }

        self.prepare_tower_workspace(towers);
        self.prepare_enemy_workspace(enemies);
        if self.enemy_workspace.is_empty() {
            return;
        }

        for tower in &self.tower_workspace {
            let max_distance_squared = tower.range * tower.range;
            let mut best: Option<BestCandidate> = None;

            for candidate in &self.enemy_workspace {
                if candidate.flying && !tower.targets_flying {
                    continue;
                }

                let distance_squared = tower.position.distance_squared(candidate.position);
                if distance_squared > max_distance_squared {
                    continue;
                }

                let current = BestCandidate {
                    distance_squared,
                    enemy: candidate.id,
                };

                match &mut best {
                    Some(existing) => {
                        if current.precedes(existing) {
                            *existing = current;
                        }
                    }
                    None => best = Some(current),
                }
            }

            if let Some(best_candidate) = best {
                out.push(AttackAssignment {
                    tower: tower.id,
                    enemy: best_candidate.enemy,
                });
            }
        }
    }

    fn prepare_tower_workspace(&mut self, towers: &TowerView) {
        self.tower_workspace.clear();
        let (lower, _) = towers.iter().size_hint();
        self.tower_workspace.reserve(lower);

        for snapshot in towers.iter() {
            self.tower_workspace.push(TowerWorkspace {
                id: snapshot.id,
                position: snapshot.position,
                range: snapshot.range,
                targets_flying: snapshot.targets_flying,
            });
        }
    }

    fn prepare_enemy_workspace(&mut self, enemies: &EnemyView) {
        self.enemy_workspace.clear();
        let (lower, _) = enemies.iter().size_hint();
        self.enemy_workspace.reserve(lower);

        for snapshot in enemies.iter() {
            if snapshot.health <= 0.0 {
                continue;
            }

            self.enemy_workspace.push(EnemyCandidate {
                id: snapshot.id,
                position: snapshot.position,
                flying: snapshot.flying,
            });
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct TowerWorkspace {
    id: TowerId,
    position: Position,
    range: f32,
    targets_flying: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct EnemyCandidate {
    id: EnemyId,
    position: Position,
    flying: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct BestCandidate {
    distance_squared: f32,
    enemy: EnemyId,
}

impl BestCandidate {
    fn precedes(&self, other: &Self) -> bool {
        if self.distance_squared != other.distance_squared {
            return self.distance_squared < other.distance_squared;
        }

        self.enemy < other.enemy
    }
}
