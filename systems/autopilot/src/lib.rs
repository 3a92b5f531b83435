#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure match driver that turns world snapshots into build, wave, and skill
//! commands.
//!
//! The driver walks an ordered build plan and requests each step as soon as
//! the bank covers its tier-zero cost. Waves start whenever the field is
//! idle, ready skills trigger while enemies are on the route, and once the
//! plan is exhausted surplus money rotates through tower upgrades. The
//! driver goes quiet after the match ends.

use lane_defence_core::{
    Catalog, Command, Event, PlacementError, Position, TowerClassId, TowerSnapshot, TowerView,
    WaveProgress,
};

/// Single entry of a build plan: which class to place, and where.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BuildStep {
    /// Tower class to construct.
    pub class: TowerClassId,
    /// World-space position for the tower.
    pub at: Position,
}

impl BuildStep {
    /// Creates a new build step descriptor.
    #[must_use]
    pub const fn new(class: TowerClassId, at: Position) -> Self {
        Self { class, at }
    }
}

/// Unattended match driver working through an ordered build plan.
#[derive(Clone, Debug, Default)]
pub struct Autopilot {
    plan: Vec<BuildStep>,
    next_step: usize,
    upgrade_cursor: usize,
    finished: bool,
}

impl Autopilot {
    /// Creates a driver that will request the provided plan in order.
    #[must_use]
    pub fn new(plan: Vec<BuildStep>) -> Self {
        Self {
            plan,
            next_step: 0,
            upgrade_cursor: 0,
            finished: false,
        }
    }

    /// Consumes world events and snapshots to emit the next command batch.
    ///
    /// Placement confirmations and rejections both advance the plan; an
    /// `InsufficientFunds` rejection keeps the step queued so it can retry
    /// once kill rewards come in.
    pub fn drive(
        &mut self,
        events: &[Event],
        money: u32,
        progress: WaveProgress,
        enemies: usize,
        towers: &TowerView,
        catalog: &Catalog,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            match event {
                Event::MatchEnded { .. } => self.finished = true,
                Event::TowerPlaced { class, at, .. } => self.advance_past(*class, *at),
                Event::TowerPlacementRejected { class, at, reason }
                    if *reason != PlacementError::InsufficientFunds =>
                {
                    self.advance_past(*class, *at);
                }
                _ => {}
            }
        }

        if self.finished {
            return;
        }

        if self.next_step < self.plan.len() {
            self.push_next_placement(money, catalog, out);
        } else {
            self.push_round_robin_upgrade(money, towers, catalog, out);
        }

        if progress.started < progress.total && !progress.spawning && enemies == 0 {
            out.push(Command::StartWave);
        }

        if enemies > 0 {
            for snapshot in towers.iter() {
                if let Some(skill) = snapshot.skill {
                    if skill.ready {
                        out.push(Command::ActivateSkill {
                            tower: snapshot.id,
                        });
                    }
                }
            }
        }
    }

    /// Returns true once the driver observed the end of the match.
    #[must_use]
    pub fn finished(&self) -> bool {
        self.finished
    }

    /// Build steps that have not been confirmed or discarded yet.
    #[must_use]
    pub fn remaining_plan(&self) -> &[BuildStep] {
        &self.plan[self.next_step..]
    }

    fn advance_past(&mut self, class: TowerClassId, at: Position) {
        if let Some(step) = self.plan.get(self.next_step) {
            if step.class == class && step.at == at {
                self.next_step += 1;
            }
        }
    }

    fn push_next_placement(&mut self, money: u32, catalog: &Catalog, out: &mut Vec<Command>) {
        while let Some(step) = self.plan.get(self.next_step) {
            let Some(cost) = tier_zero_cost(catalog, step.class) else {
                // A step naming a class the catalog does not carry can never place.
                self.next_step += 1;
                continue;
            };
            if money >= cost {
                out.push(Command::PlaceTower {
                    class: step.class,
                    at: step.at,
                });
            }
            return;
        }
    }

    fn push_round_robin_upgrade(
        &mut self,
        money: u32,
        towers: &TowerView,
        catalog: &Catalog,
        out: &mut Vec<Command>,
    ) {
        let ordered: Vec<&TowerSnapshot> = towers.iter().collect();
        if ordered.is_empty() {
            return;
        }

        for offset in 0..ordered.len() {
            let index = (self.upgrade_cursor + offset) % ordered.len();
            let snapshot = ordered[index];
            let Some(cost) = upgrade_cost(catalog, snapshot.class, snapshot.tier) else {
                continue;
            };
            if money >= cost {
                out.push(Command::UpgradeTower {
                    tower: snapshot.id,
                });
                self.upgrade_cursor = index + 1;
                return;
            }
        }
    }
}

fn tier_zero_cost(catalog: &Catalog, class: TowerClassId) -> Option<u32> {
    Some(catalog.tower(class)?.tier(0)?.cost)
}

fn upgrade_cost(catalog: &Catalog, class: TowerClassId, tier: u32) -> Option<u32> {
    let spec = catalog.tower(class)?;
    let current = spec.tier(tier)?;
    let next = spec.tier(tier + 1)?;
    Some(next.cost.saturating_sub(current.cost))
}
