#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Lane Defence.
//!
//! The world owns every entity of a running match and mutates exclusively
//! through [`apply`]. A [`Command::Tick`] advances the simulation through a
//! fixed phase order: spawning, slow fields, tower combat, projectile
//! flight, enemy motion, purging, and outcome resolution. All other
//! commands resolve immediately. Every mutation is announced through
//! [`Event`] values pushed onto the caller's buffer.

use std::{mem, time::Duration};

use lane_defence_core::{
    AttackAssignment, Catalog, Command, EnemyClass, EnemyClassId, EnemyId, EnemySnapshot, Event,
    MatchOutcome, PlacementError, Position, ProjectileId, RouteError, SaleError, SkillError,
    SkillSpec, SkillStatus, TowerClassId, TowerId, TowerSnapshot, TrapId, UpgradeError, WaveError,
};
use lane_defence_system_targeting::Targeting;

mod combat;
mod content;
mod route;
mod towers;
mod waves;

pub use route::Route;

use combat::Projectile;
use towers::TowerRegistry;
use waves::WaveDirector;

/// Upper bound on the simulated time a single tick may advance.
const MAX_TICK: Duration = Duration::from_millis(50);
/// Cooldown applied when a ready tower finds no valid target.
const RETRY_DELAY: Duration = Duration::from_millis(50);
/// Minimum distance between a tower and any route segment.
const LANE_CLEARANCE: f32 = 34.0;
/// Half the minimum spacing between two towers.
const BUILD_RADIUS: f32 = 26.0;
/// Radius used to resolve which tower a position refers to.
const PICK_RADIUS: f32 = 22.0;
/// Flight speed of every projectile in world units per second.
const PROJECTILE_SPEED: f32 = 420.0;
/// Maximum distance a pierce hit may chain from the impact point.
const PIERCE_RADIUS: f32 = 90.0;
/// Fraction of projectile damage dealt to splashed enemies.
const SPLASH_DAMAGE_FACTOR: f32 = 0.75;
/// Fraction of projectile damage dealt to the pierce victim.
const PIERCE_DAMAGE_FACTOR: f32 = 0.7;
/// Fraction of the current tier cost refunded on sale.
const RESALE_FACTOR: f32 = 0.6;
/// How long a slow persists after the enemy leaves the field.
const SLOW_LINGER: Duration = Duration::from_millis(250);
/// Floor for the rapid-fire attack speed divisor.
const MIN_RAPID_FIRE_DIVISOR: f32 = 1.01;

/// Enemy marching along the route.
///
/// Stats are copied from the catalog at spawn time. Dead enemies keep
/// their slot with zero health until the purge phase at the end of the
/// tick, so indices stay stable while damage settles.
#[derive(Clone, Debug)]
struct Enemy {
    id: EnemyId,
    class: EnemyClassId,
    position: Position,
    /// Index of the waypoint the enemy last reached.
    waypoint: usize,
    health: f32,
    max_health: f32,
    armor: f32,
    speed: f32,
    reward: u32,
    flying: bool,
    boss: bool,
    stun_until: Duration,
    slow_factor: f32,
    slow_until: Duration,
    burn_damage_per_second: f32,
    burn_until: Duration,
}

impl Enemy {
    fn spawn(id: EnemyId, class: EnemyClassId, stats: &EnemyClass, at: Position) -> Self {
        Self {
            id,
            class,
            position: at,
            waypoint: 0,
            health: stats.health,
            max_health: stats.health,
            armor: stats.armor,
            speed: stats.speed,
            reward: stats.reward,
            flying: stats.flying,
            boss: stats.boss,
            stun_until: Duration::ZERO,
            slow_factor: 1.0,
            slow_until: Duration::ZERO,
            burn_damage_per_second: 0.0,
            burn_until: Duration::ZERO,
        }
    }

    fn is_alive(&self) -> bool {
        self.health > 0.0
    }
}

/// Slowing field dropped on the ground by a tower skill.
#[derive(Clone, Copy, Debug)]
struct Trap {
    id: TrapId,
    position: Position,
    radius: f32,
    slow_factor: f32,
    until: Duration,
}

/// Applies a discrete hit to an enemy, reducing it by armor first.
///
/// Every hit deals at least one point of damage regardless of armor.
/// Returns whether the enemy died to this hit.
fn apply_hit(enemy: &mut Enemy, damage: f32, money: &mut u32, out_events: &mut Vec<Event>) -> bool {
    let reduced = (damage - enemy.armor).max(1.0);
    settle_damage(enemy, reduced, money, out_events)
}

/// Subtracts damage from an enemy, crediting its reward exactly once on
/// death. Returns whether the enemy died to this damage.
fn settle_damage(
    enemy: &mut Enemy,
    damage: f32,
    money: &mut u32,
    out_events: &mut Vec<Event>,
) -> bool {
    if !enemy.is_alive() {
        return false;
    }
    enemy.health -= damage;
    if enemy.health > 0.0 {
        return false;
    }
    enemy.health = 0.0;
    *money = money.saturating_add(enemy.reward);
    out_events.push(Event::EnemyKilled {
        enemy: enemy.id,
        reward: enemy.reward,
    });
    true
}

/// Represents the authoritative Lane Defence world state.
#[derive(Debug)]
pub struct World {
    catalog: Catalog,
    route: Route,
    money: u32,
    lives: u32,
    paused: bool,
    outcome: Option<MatchOutcome>,
    clock: Duration,
    towers: TowerRegistry,
    enemies: Vec<Enemy>,
    projectiles: Vec<Projectile>,
    traps: Vec<Trap>,
    waves: WaveDirector,
    next_enemy_id: EnemyId,
    next_projectile_id: ProjectileId,
    next_trap_id: TrapId,
    targeting: Targeting,
    assignments: Vec<AttackAssignment>,
    due_spawns: Vec<EnemyClassId>,
}

impl World {
    /// Creates a new world running the standard campaign.
    #[must_use]
    pub fn new() -> Self {
        Self::assemble(content::standard_catalog(), content::standard_route())
    }

    /// Creates a new world from custom tables and route waypoints.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InsufficientWaypoints`] when fewer than two
    /// waypoints are provided.
    pub fn with_catalog(catalog: Catalog, waypoints: Vec<Position>) -> Result<Self, RouteError> {
        Ok(Self::assemble(catalog, Route::new(waypoints)?))
    }

    fn assemble(catalog: Catalog, route: Route) -> Self {
        let rules = catalog.rules();
        Self {
            money: rules.starting_money,
            lives: rules.starting_lives,
            paused: false,
            outcome: None,
            clock: Duration::ZERO,
            towers: TowerRegistry::new(),
            enemies: Vec::new(),
            projectiles: Vec::new(),
            traps: Vec::new(),
            waves: WaveDirector::new(),
            next_enemy_id: EnemyId::new(0),
            next_projectile_id: ProjectileId::new(0),
            next_trap_id: TrapId::new(0),
            targeting: Targeting::new(),
            assignments: Vec::new(),
            due_spawns: Vec::new(),
            catalog,
            route,
        }
    }

    fn reset_match(&mut self) {
        let rules = self.catalog.rules();
        self.money = rules.starting_money;
        self.lives = rules.starting_lives;
        self.paused = false;
        self.outcome = None;
        self.clock = Duration::ZERO;
        self.towers.clear();
        self.enemies.clear();
        self.projectiles.clear();
        self.traps.clear();
        self.waves.reset();
        self.next_enemy_id = EnemyId::new(0);
        self.next_projectile_id = ProjectileId::new(0);
        self.next_trap_id = TrapId::new(0);
        self.assignments.clear();
        self.due_spawns.clear();
    }

    fn advance(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.clock += dt;
        out_events.push(Event::TimeAdvanced { dt });

        self.spawn_due_enemies(out_events);
        self.update_traps();
        self.resolve_combat(dt, out_events);
        self.advance_projectiles(dt, out_events);
        self.advance_enemies(dt, out_events);
        self.purge_dead();
        self.resolve_outcome(out_events);
    }

    fn spawn_due_enemies(&mut self, out_events: &mut Vec<Event>) {
        let mut due = mem::take(&mut self.due_spawns);
        if let Some(wave) = self.waves.advance(self.clock, &mut due) {
            out_events.push(Event::WaveCleared { wave });
        }
        for class in due.drain(..) {
            self.spawn_enemy(class, out_events);
        }
        self.due_spawns = due;
    }

    fn spawn_enemy(&mut self, class: EnemyClassId, out_events: &mut Vec<Event>) {
        let at = self.route.spawn_point();
        let id = self.next_enemy_id;
        let Some(stats) = self.catalog.enemy(class) else {
            return;
        };
        let enemy = Enemy::spawn(id, class, stats, at);
        self.next_enemy_id = EnemyId::new(id.get().wrapping_add(1));
        self.enemies.push(enemy);
        out_events.push(Event::EnemySpawned {
            enemy: id,
            class,
            at,
        });
    }

    fn update_traps(&mut self) {
        let clock = self.clock;
        self.traps.retain(|trap| trap.until > clock);
        for trap in &self.traps {
            for enemy in &mut self.enemies {
                if enemy.position.distance_squared(trap.position) <= trap.radius * trap.radius {
                    enemy.slow_factor = enemy.slow_factor.min(trap.slow_factor);
                    enemy.slow_until = enemy.slow_until.max(clock + SLOW_LINGER);
                }
            }
        }
    }

    fn advance_enemies(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let clock = self.clock;
        let last = self.route.last_index();
        for enemy in &mut self.enemies {
            if clock < enemy.burn_until && enemy.burn_damage_per_second > 0.0 {
                let burn = enemy.burn_damage_per_second * dt.as_secs_f32();
                let _ = settle_damage(enemy, burn, &mut self.money, out_events);
            }
            if !enemy.is_alive() {
                continue;
            }
            if clock > enemy.slow_until {
                enemy.slow_factor = 1.0;
            }
            if clock < enemy.stun_until {
                continue;
            }
            let next = (enemy.waypoint + 1).min(last);
            let target = self.route.waypoints()[next];
            let step = enemy.speed * enemy.slow_factor * dt.as_secs_f32();
            let (position, arrived) = enemy.position.step_toward(target, step);
            enemy.position = position;
            if arrived {
                enemy.waypoint = next;
                if enemy.waypoint >= last {
                    self.lives = self.lives.saturating_sub(1);
                    enemy.health = 0.0;
                    out_events.push(Event::BaseBreached {
                        enemy: enemy.id,
                        lives_remaining: self.lives,
                    });
                }
            }
        }
    }

    fn purge_dead(&mut self) {
        self.enemies.retain(Enemy::is_alive);
    }

    fn resolve_outcome(&mut self, out_events: &mut Vec<Event>) {
        if self.lives == 0 {
            self.outcome = Some(MatchOutcome::Defeat);
            out_events.push(Event::MatchEnded {
                outcome: MatchOutcome::Defeat,
            });
            return;
        }
        if self.waves.started() >= self.catalog.wave_count()
            && !self.waves.is_spawning()
            && self.enemies.is_empty()
        {
            self.outcome = Some(MatchOutcome::Victory);
            out_events.push(Event::MatchEnded {
                outcome: MatchOutcome::Victory,
            });
        }
    }

    fn place_tower(&mut self, class: TowerClassId, at: Position, out_events: &mut Vec<Event>) {
        let Some(cost) = self
            .catalog
            .tower(class)
            .and_then(|spec| spec.tier(0))
            .map(|tier| tier.cost)
        else {
            out_events.push(Event::TowerPlacementRejected {
                class,
                at,
                reason: PlacementError::UnknownClass,
            });
            return;
        };
        if self.money < cost {
            out_events.push(Event::TowerPlacementRejected {
                class,
                at,
                reason: PlacementError::InsufficientFunds,
            });
            return;
        }
        if !self.is_buildable(at) {
            out_events.push(Event::TowerPlacementRejected {
                class,
                at,
                reason: PlacementError::InvalidPosition,
            });
            return;
        }
        self.money -= cost;
        let tower = self.towers.place(class, at);
        out_events.push(Event::TowerPlaced { tower, class, at });
    }

    fn is_buildable(&self, at: Position) -> bool {
        if self.route.distance_to(at) < LANE_CLEARANCE {
            return false;
        }
        let spacing = BUILD_RADIUS * 2.0;
        self.towers
            .iter()
            .all(|tower| tower.position.distance(at) >= spacing)
    }

    fn upgrade_tower(&mut self, tower: TowerId, out_events: &mut Vec<Event>) {
        let Some((class, tier)) = self.towers.get(tower).map(|state| (state.class, state.tier))
        else {
            out_events.push(Event::TowerUpgradeRejected {
                tower,
                reason: UpgradeError::UnknownTower,
            });
            return;
        };
        let price = self
            .catalog
            .tower(class)
            .and_then(|spec| Some((spec.tier(tier)?, spec.tier(tier + 1)?)))
            .map(|(current, next)| next.cost.saturating_sub(current.cost));
        let Some(cost) = price else {
            out_events.push(Event::TowerUpgradeRejected {
                tower,
                reason: UpgradeError::MaxTier,
            });
            return;
        };
        if self.money < cost {
            out_events.push(Event::TowerUpgradeRejected {
                tower,
                reason: UpgradeError::InsufficientFunds,
            });
            return;
        }
        self.money -= cost;
        if let Some(state) = self.towers.get_mut(tower) {
            state.tier += 1;
            out_events.push(Event::TowerUpgraded {
                tower,
                tier: state.tier,
            });
        }
    }

    fn sell_tower(&mut self, tower: TowerId, out_events: &mut Vec<Event>) {
        let Some(state) = self.towers.remove(tower) else {
            out_events.push(Event::TowerSaleRejected {
                tower,
                reason: SaleError::UnknownTower,
            });
            return;
        };
        let cost = self
            .catalog
            .tower(state.class)
            .and_then(|spec| spec.tier(state.tier))
            .map_or(0, |tier| tier.cost);
        let refund = (cost as f32 * RESALE_FACTOR).floor() as u32;
        self.money = self.money.saturating_add(refund);
        out_events.push(Event::TowerSold { tower, refund });
    }

    fn activate_skill(&mut self, tower: TowerId, out_events: &mut Vec<Event>) {
        let Some((class, tier_index, position, ready_at)) = self
            .towers
            .get(tower)
            .map(|state| (state.class, state.tier, state.position, state.skill_ready_at))
        else {
            out_events.push(Event::SkillRejected {
                tower,
                reason: SkillError::UnknownTower,
            });
            return;
        };
        let tier = self
            .catalog
            .tower(class)
            .and_then(|spec| spec.tier(tier_index))
            .map(|tier| (tier.damage, tier.skill));
        let Some((damage, Some(skill))) = tier else {
            out_events.push(Event::SkillRejected {
                tower,
                reason: SkillError::NoSkill,
            });
            return;
        };
        if self.clock < ready_at {
            out_events.push(Event::SkillRejected {
                tower,
                reason: SkillError::OnCooldown,
            });
            return;
        }

        if let Some(state) = self.towers.get_mut(tower) {
            state.skill_ready_at = self.clock + skill.cooldown();
        }
        out_events.push(Event::SkillActivated {
            tower,
            skill: skill.kind(),
        });

        match skill {
            SkillSpec::Shockwave {
                radius,
                damage_factor,
                stun,
                ..
            } => {
                let burst = damage * damage_factor;
                let radius_squared = radius * radius;
                let stun_until = self.clock + stun;
                for enemy in &mut self.enemies {
                    if !enemy.is_alive() {
                        continue;
                    }
                    if enemy.position.distance_squared(position) > radius_squared {
                        continue;
                    }
                    let _ = apply_hit(enemy, burst, &mut self.money, out_events);
                    if enemy.is_alive() {
                        enemy.stun_until = enemy.stun_until.max(stun_until);
                    }
                }
            }
            SkillSpec::RapidFire { duration, .. } => {
                if let Some(state) = self.towers.get_mut(tower) {
                    state.rapid_fire_until = self.clock + duration;
                }
            }
            SkillSpec::SlowField {
                radius,
                slow_factor,
                duration,
                ..
            } => {
                let id = self.next_trap_id;
                self.next_trap_id = TrapId::new(id.get().wrapping_add(1));
                self.traps.push(Trap {
                    id,
                    position,
                    radius,
                    slow_factor,
                    until: self.clock + duration,
                });
            }
        }
    }

    fn start_wave(&mut self, out_events: &mut Vec<Event>) {
        if self.outcome.is_some() {
            out_events.push(Event::WaveRejected {
                reason: WaveError::MatchOver,
            });
            return;
        }
        match self.waves.start_next(self.clock, &self.catalog) {
            Ok(wave) => out_events.push(Event::WaveStarted { wave }),
            Err(reason) => out_events.push(Event::WaveRejected { reason }),
        }
    }

    fn configure_route(&mut self, waypoints: Vec<Position>, out_events: &mut Vec<Event>) {
        match Route::new(waypoints) {
            Ok(route) => {
                self.route = route;
                let last = self.route.last_index();
                for enemy in &mut self.enemies {
                    enemy.waypoint = enemy.waypoint.min(last);
                }
                out_events.push(Event::RouteChanged {
                    waypoints: self.route.waypoints().len() as u32,
                });
            }
            Err(reason) => out_events.push(Event::RouteRejected { reason }),
        }
    }

    fn tower_snapshots(&self) -> Vec<TowerSnapshot> {
        self.towers
            .iter()
            .filter_map(|tower| {
                let tier = self
                    .catalog
                    .tower(tower.class)
                    .and_then(|spec| spec.tier(tower.tier))?;
                Some(TowerSnapshot {
                    id: tower.id,
                    class: tower.class,
                    tier: tower.tier,
                    position: tower.position,
                    range: tier.range,
                    melee: tier.melee,
                    targets_flying: tier.targets_flying,
                    ready: tower.cooldown.is_zero(),
                    rapid_fire_active: self.clock < tower.rapid_fire_until,
                    skill: tier
                        .skill
                        .map(|skill| skill_status(skill, tower.skill_ready_at, self.clock)),
                })
            })
            .collect()
    }

    fn enemy_snapshots(&self) -> Vec<EnemySnapshot> {
        self.enemies
            .iter()
            .map(|enemy| EnemySnapshot {
                id: enemy.id,
                class: enemy.class,
                position: enemy.position,
                health: enemy.health,
                max_health: enemy.max_health,
                flying: enemy.flying,
                boss: enemy.boss,
                stunned: self.clock < enemy.stun_until,
                slowed: enemy.slow_factor < 1.0 && self.clock < enemy.slow_until,
                burning: self.clock < enemy.burn_until && enemy.burn_damage_per_second > 0.0,
            })
            .collect()
    }
}

fn skill_status(skill: SkillSpec, ready_at: Duration, clock: Duration) -> SkillStatus {
    let remaining = ready_at.saturating_sub(clock);
    let cooldown = skill.cooldown();
    let fraction = if cooldown.is_zero() {
        0.0
    } else {
        (remaining.as_secs_f32() / cooldown.as_secs_f32()).clamp(0.0, 1.0)
    };
    SkillStatus {
        kind: skill.kind(),
        ready: remaining.is_zero(),
        cooldown_remaining: fraction,
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            if world.paused || world.outcome.is_some() {
                return;
            }
            world.advance(dt.min(MAX_TICK), out_events);
        }
        Command::PlaceTower { class, at } => world.place_tower(class, at, out_events),
        Command::UpgradeTower { tower } => world.upgrade_tower(tower, out_events),
        Command::SellTower { tower } => world.sell_tower(tower, out_events),
        Command::ActivateSkill { tower } => world.activate_skill(tower, out_events),
        Command::StartWave => world.start_wave(out_events),
        Command::SetPaused { paused } => {
            if world.paused != paused {
                world.paused = paused;
                out_events.push(Event::PauseChanged { paused });
            }
        }
        Command::ConfigureRoute { waypoints } => world.configure_route(waypoints, out_events),
        Command::Restart => {
            world.reset_match();
            out_events.push(Event::MatchRestarted);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::{Route, World, PICK_RADIUS};
    use lane_defence_core::{
        Catalog, EnemyView, MatchOutcome, MatchStatus, Position, ProjectileSnapshot,
        ProjectileView, TowerId, TowerView, TrapSnapshot, TrapView, WaveProgress,
    };

    /// Money currently available to the player.
    #[must_use]
    pub fn money(world: &World) -> u32 {
        world.money
    }

    /// Lives remaining before defeat.
    #[must_use]
    pub fn lives(world: &World) -> u32 {
        world.lives
    }

    /// Reports whether the simulation clock is frozen.
    #[must_use]
    pub fn paused(world: &World) -> bool {
        world.paused
    }

    /// Terminal outcome of the match, if one was reached.
    #[must_use]
    pub fn outcome(world: &World) -> Option<MatchOutcome> {
        world.outcome
    }

    /// Coarse lifecycle phase of the match.
    #[must_use]
    pub fn status(world: &World) -> MatchStatus {
        match world.outcome {
            Some(outcome) => MatchStatus::Over { outcome },
            None if world.waves.started() == 0 => MatchStatus::Preparing,
            None => MatchStatus::Active,
        }
    }

    /// Elapsed simulated time.
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.clock
    }

    /// Progress of the wave campaign.
    #[must_use]
    pub fn wave_progress(world: &World) -> WaveProgress {
        WaveProgress {
            started: world.waves.started(),
            total: world.catalog.wave_count(),
            spawning: world.waves.is_spawning(),
        }
    }

    /// Gameplay tables backing the match.
    #[must_use]
    pub fn catalog(world: &World) -> &Catalog {
        &world.catalog
    }

    /// Route the enemies march along.
    #[must_use]
    pub fn route(world: &World) -> &Route {
        &world.route
    }

    /// Reports whether a tower may be built at the provided position.
    #[must_use]
    pub fn is_buildable(world: &World, at: Position) -> bool {
        world.is_buildable(at)
    }

    /// Finds the tower whose pick radius covers the position.
    ///
    /// When several towers overlap the position, the most recently placed
    /// one wins.
    #[must_use]
    pub fn tower_at(world: &World, at: Position) -> Option<TowerId> {
        world
            .towers
            .iter()
            .filter(|tower| tower.position.distance(at) <= PICK_RADIUS)
            .last()
            .map(|tower| tower.id)
    }

    /// Captures a read-only view of all towers.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        TowerView::from_snapshots(world.tower_snapshots())
    }

    /// Captures a read-only view of all live enemies.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(world.enemy_snapshots())
    }

    /// Captures a read-only view of all projectiles in flight.
    #[must_use]
    pub fn projectile_view(world: &World) -> ProjectileView {
        let snapshots = world
            .projectiles
            .iter()
            .map(|projectile| ProjectileSnapshot {
                id: projectile.id,
                position: projectile.position,
                target: projectile.target,
            })
            .collect();
        ProjectileView::from_snapshots(snapshots)
    }

    /// Captures a read-only view of all active slow fields.
    #[must_use]
    pub fn trap_view(world: &World) -> TrapView {
        let snapshots = world
            .traps
            .iter()
            .map(|trap| TrapSnapshot {
                id: trap.id,
                position: trap.position,
                radius: trap.radius,
            })
            .collect();
        TrapView::from_snapshots(snapshots)
    }
}
