#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Lane Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.
//!
//! The static gameplay tables ([`Catalog`]) also live here: tower classes and
//! their tiers, enemy classes, scripted waves, and match rules. Catalog data
//! is immutable for the lifetime of a world; entities copy the stats they
//! need at spawn time.

use std::error::Error;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Location of a point in world space measured in world units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    x: f32,
    y: f32,
}

impl Position {
    /// Creates a new world-space position.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate of the position.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical coordinate of the position.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Computes the squared Euclidean distance to another position.
    ///
    /// Squared distances order identically to plain distances and avoid the
    /// square root, so range comparisons prefer this form.
    #[must_use]
    pub fn distance_squared(self, other: Position) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }

    /// Computes the Euclidean distance to another position.
    #[must_use]
    pub fn distance(self, other: Position) -> f32 {
        self.distance_squared(other).sqrt()
    }

    /// Advances toward a target by at most `step` world units.
    ///
    /// Returns the new position together with a flag reporting whether the
    /// target was reached. A step long enough to cover the remaining
    /// distance snaps exactly onto the target so motion never overshoots.
    #[must_use]
    pub fn step_toward(self, target: Position, step: f32) -> (Position, bool) {
        let dx = target.x - self.x;
        let dy = target.y - self.y;
        let distance = (dx * dx + dy * dy).sqrt();
        if distance <= step {
            (target, true)
        } else {
            let scale = step / distance;
            (
                Position::new(self.x + dx * scale, self.y + dy * scale),
                false,
            )
        }
    }

    /// Computes the distance from this point to the segment `start..end`.
    ///
    /// The closest point on the segment is found by projecting onto the
    /// segment direction and clamping into the segment interval, so points
    /// beyond either endpoint measure against that endpoint. A degenerate
    /// zero-length segment measures against its single point.
    #[must_use]
    pub fn distance_to_segment(self, start: Position, end: Position) -> f32 {
        let vx = end.x - start.x;
        let vy = end.y - start.y;
        let wx = self.x - start.x;
        let wy = self.y - start.y;
        let length_squared = vx * vx + vy * vy;
        let t = if length_squared <= f32::EPSILON {
            0.0
        } else {
            ((wx * vx + wy * vy) / length_squared).clamp(0.0, 1.0)
        };
        let closest = Position::new(start.x + t * vx, start.y + t * vy);
        self.distance(closest)
    }
}

/// Unique identifier assigned to a tower instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an enemy instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a slow field on the ground.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrapId(u32);

impl TrapId {
    /// Creates a new trap identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Index of a tower class within the active [`Catalog`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerClassId(u32);

impl TowerClassId {
    /// Creates a new tower class index.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the underlying class index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Index of an enemy class within the active [`Catalog`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyClassId(u32);

impl EnemyClassId {
    /// Creates a new enemy class index.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the underlying class index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Damage-over-time payload carried by a projectile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BurnSpec {
    /// Damage applied per second while the burn is active.
    pub damage_per_second: f32,
    /// How long the burn lasts after being applied.
    pub duration: Duration,
}

/// Optional on-impact effects attached to a ranged tower tier.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PayloadSpec {
    /// Radius of the splash zone around the impact point, if any.
    pub splash_radius: Option<f32>,
    /// Burn applied to the primary target on impact, if any.
    pub burn: Option<BurnSpec>,
    /// Number of pierce charges; impacts chain to at most one extra victim.
    pub pierce: u32,
}

/// Discriminates the closed set of active skills.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillKind {
    /// Area damage burst around the tower that also stuns.
    Shockwave,
    /// Temporary attack-speed buff on the casting tower.
    RapidFire,
    /// Slowing zone dropped at the tower's position.
    SlowField,
}

/// Active skill attached to a tower tier, with kind-specific parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SkillSpec {
    /// Damages and stuns every enemy around the tower.
    Shockwave {
        /// Delay before the skill can trigger again.
        cooldown: Duration,
        /// Radius of the area of effect around the tower.
        radius: f32,
        /// Multiplier applied to the tier's damage for the burst.
        damage_factor: f32,
        /// Duration of the stun applied to every enemy hit.
        stun: Duration,
    },
    /// Temporarily multiplies the tower's attack speed.
    RapidFire {
        /// Delay before the skill can trigger again.
        cooldown: Duration,
        /// How long the buff stays active.
        duration: Duration,
        /// Attack-speed multiplier while the buff is active.
        attack_speed: f32,
    },
    /// Drops a slowing field at the tower's position.
    SlowField {
        /// Delay before the skill can trigger again.
        cooldown: Duration,
        /// Radius of the slowing field.
        radius: f32,
        /// Speed multiplier applied to enemies inside the field.
        slow_factor: f32,
        /// How long the field persists on the ground.
        duration: Duration,
    },
}

impl SkillSpec {
    /// Returns the discriminant identifying this skill.
    #[must_use]
    pub const fn kind(&self) -> SkillKind {
        match self {
            Self::Shockwave { .. } => SkillKind::Shockwave,
            Self::RapidFire { .. } => SkillKind::RapidFire,
            Self::SlowField { .. } => SkillKind::SlowField,
        }
    }

    /// Returns the cooldown the skill imposes after triggering.
    #[must_use]
    pub const fn cooldown(&self) -> Duration {
        match self {
            Self::Shockwave { cooldown, .. }
            | Self::RapidFire { cooldown, .. }
            | Self::SlowField { cooldown, .. } => *cooldown,
        }
    }
}

/// Stats describing one upgrade tier of a tower class.
#[derive(Clone, Debug, PartialEq)]
pub struct TowerTier {
    /// Display title of the tier.
    pub title: String,
    /// Money charged to reach this tier (tier zero charges it on placement).
    pub cost: u32,
    /// Targeting radius measured in world units.
    pub range: f32,
    /// Delay between consecutive attacks.
    pub attack_interval: Duration,
    /// Raw damage per attack before armor reduction.
    pub damage: f32,
    /// Whether attacks strike instantly instead of launching projectiles.
    pub melee: bool,
    /// Whether flying enemies are valid targets.
    pub targets_flying: bool,
    /// Active skill available at this tier, if any.
    pub skill: Option<SkillSpec>,
    /// On-impact effects for projectile attacks, if any.
    pub payload: Option<PayloadSpec>,
}

/// A buildable tower class together with its upgrade path.
#[derive(Clone, Debug, PartialEq)]
pub struct TowerClass {
    /// Stable name used by configuration files and loadout strings.
    pub name: String,
    /// Upgrade tiers in ascending order; placement starts at tier zero.
    pub tiers: Vec<TowerTier>,
}

impl TowerClass {
    /// Retrieves a tier by index, when it exists.
    #[must_use]
    pub fn tier(&self, index: u32) -> Option<&TowerTier> {
        self.tiers.get(index as usize)
    }
}

/// Stats describing one enemy class.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemyClass {
    /// Stable name used by configuration files.
    pub name: String,
    /// Health at spawn.
    pub health: f32,
    /// Flat damage reduction applied to every discrete hit.
    pub armor: f32,
    /// Movement speed in world units per second.
    pub speed: f32,
    /// Money credited when the enemy is killed.
    pub reward: u32,
    /// Whether only air-capable towers can target this enemy.
    pub flying: bool,
    /// Whether the enemy is a boss.
    pub boss: bool,
}

/// One spawn entry within a wave script.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaveEntry {
    /// Enemy class spawned by this entry.
    pub enemy: EnemyClassId,
    /// Total number of enemies the entry spawns.
    pub count: u32,
    /// Delay between consecutive spawns from this entry.
    pub interval: Duration,
}

/// A scripted wave: entries spawn in parallel until drained.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WaveScript {
    /// Spawn entries processed independently each tick.
    pub entries: Vec<WaveEntry>,
}

/// Opening conditions for a match.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MatchRules {
    /// Money available before the first placement.
    pub starting_money: u32,
    /// Breaches the player can absorb before defeat.
    pub starting_lives: u32,
}

/// Immutable gameplay tables backing a match.
///
/// Construction validates cross-references so the simulation can index the
/// tables without further checks: every tower class carries at least one
/// tier and every wave entry names an existing enemy class. The default
/// catalog is empty and trivially valid.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Catalog {
    rules: MatchRules,
    towers: Vec<TowerClass>,
    enemies: Vec<EnemyClass>,
    waves: Vec<WaveScript>,
}

impl Catalog {
    /// Builds a catalog after validating internal references.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::EmptyTowerClass`] when a tower class has no
    /// tiers and [`CatalogError::UnknownEnemyClass`] when a wave entry
    /// references an enemy class index outside the enemy table.
    pub fn new(
        rules: MatchRules,
        towers: Vec<TowerClass>,
        enemies: Vec<EnemyClass>,
        waves: Vec<WaveScript>,
    ) -> Result<Self, CatalogError> {
        for (index, class) in towers.iter().enumerate() {
            if class.tiers.is_empty() {
                return Err(CatalogError::EmptyTowerClass {
                    class: TowerClassId::new(index as u32),
                });
            }
        }
        for (wave_index, wave) in waves.iter().enumerate() {
            for entry in &wave.entries {
                if entry.enemy.get() as usize >= enemies.len() {
                    return Err(CatalogError::UnknownEnemyClass {
                        wave: wave_index as u32,
                        enemy: entry.enemy,
                    });
                }
            }
        }
        Ok(Self {
            rules,
            towers,
            enemies,
            waves,
        })
    }

    /// Opening conditions for matches played with this catalog.
    #[must_use]
    pub const fn rules(&self) -> MatchRules {
        self.rules
    }

    /// All buildable tower classes in id order.
    #[must_use]
    pub fn towers(&self) -> &[TowerClass] {
        &self.towers
    }

    /// All enemy classes in id order.
    #[must_use]
    pub fn enemies(&self) -> &[EnemyClass] {
        &self.enemies
    }

    /// All scripted waves in play order.
    #[must_use]
    pub fn waves(&self) -> &[WaveScript] {
        &self.waves
    }

    /// Retrieves a tower class by id, when it exists.
    #[must_use]
    pub fn tower(&self, id: TowerClassId) -> Option<&TowerClass> {
        self.towers.get(id.get() as usize)
    }

    /// Retrieves an enemy class by id, when it exists.
    #[must_use]
    pub fn enemy(&self, id: EnemyClassId) -> Option<&EnemyClass> {
        self.enemies.get(id.get() as usize)
    }

    /// Retrieves a wave script by zero-based index, when it exists.
    #[must_use]
    pub fn wave(&self, index: u32) -> Option<&WaveScript> {
        self.waves.get(index as usize)
    }

    /// Total number of scripted waves.
    #[must_use]
    pub fn wave_count(&self) -> u32 {
        self.waves.len() as u32
    }

    /// Resolves a tower class id from its stable name.
    #[must_use]
    pub fn tower_by_name(&self, name: &str) -> Option<TowerClassId> {
        self.towers
            .iter()
            .position(|class| class.name == name)
            .map(|index| TowerClassId::new(index as u32))
    }

    /// Resolves an enemy class id from its stable name.
    #[must_use]
    pub fn enemy_by_name(&self, name: &str) -> Option<EnemyClassId> {
        self.enemies
            .iter()
            .position(|class| class.name == name)
            .map(|index| EnemyClassId::new(index as u32))
    }
}

/// Reasons a [`Catalog`] fails validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CatalogError {
    /// A tower class was declared without any tiers.
    EmptyTowerClass {
        /// Index of the offending tower class.
        class: TowerClassId,
    },
    /// A wave entry references an enemy class that does not exist.
    UnknownEnemyClass {
        /// Zero-based index of the offending wave.
        wave: u32,
        /// Enemy class id the entry referenced.
        enemy: EnemyClassId,
    },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTowerClass { class } => {
                write!(formatter, "tower class {} has no tiers", class.get())
            }
            Self::UnknownEnemyClass { wave, enemy } => write!(
                formatter,
                "wave {} references unknown enemy class {}",
                wave,
                enemy.get()
            ),
        }
    }
}

impl Error for CatalogError {}

/// Terminal result of a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchOutcome {
    /// Every wave was cleared with lives remaining.
    Victory,
    /// Lives reached zero.
    Defeat,
}

/// Coarse lifecycle phase of a match, derived from world state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MatchStatus {
    /// No wave has been started yet.
    Preparing,
    /// At least one wave has been started and the match is live.
    Active,
    /// The match reached a terminal outcome.
    Over {
        /// Outcome that ended the match.
        outcome: MatchOutcome,
    },
}

/// Progress of the wave campaign for presentation layers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaveProgress {
    /// Number of waves started so far.
    pub started: u32,
    /// Total number of scripted waves.
    pub total: u32,
    /// Whether a spawn queue is currently active.
    pub spawning: bool,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests placement of a new tower at the provided position.
    PlaceTower {
        /// Tower class to construct.
        class: TowerClassId,
        /// World-space position for the tower.
        at: Position,
    },
    /// Requests an upgrade of an existing tower to its next tier.
    UpgradeTower {
        /// Identifier of the tower to upgrade.
        tower: TowerId,
    },
    /// Requests the sale of an existing tower for a partial refund.
    SellTower {
        /// Identifier of the tower to sell.
        tower: TowerId,
    },
    /// Requests activation of the skill on the tower's current tier.
    ActivateSkill {
        /// Identifier of the tower whose skill should trigger.
        tower: TowerId,
    },
    /// Requests the start of the next scripted wave.
    StartWave,
    /// Freezes or resumes simulation time.
    SetPaused {
        /// Whether ticks should be ignored until resumed.
        paused: bool,
    },
    /// Replaces the enemy route without resetting match state.
    ConfigureRoute {
        /// Ordered waypoints of the replacement route.
        waypoints: Vec<Position>,
    },
    /// Resets the match to its opening state, keeping catalog and route.
    Restart,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick, post-clamp.
        dt: Duration,
    },
    /// Confirms that an enemy entered the route at the spawn point.
    EnemySpawned {
        /// Identifier assigned to the new enemy.
        enemy: EnemyId,
        /// Class the enemy was spawned from.
        class: EnemyClassId,
        /// Spawn position on the route.
        at: Position,
    },
    /// Confirms that an enemy died to damage and its reward was credited.
    EnemyKilled {
        /// Identifier of the enemy that died.
        enemy: EnemyId,
        /// Money credited for the kill.
        reward: u32,
    },
    /// Reports that an enemy reached the base and was consumed.
    BaseBreached {
        /// Identifier of the enemy that breached.
        enemy: EnemyId,
        /// Lives remaining after the breach.
        lives_remaining: u32,
    },
    /// Confirms that a tower was placed and its cost charged.
    TowerPlaced {
        /// Identifier assigned to the tower by the world.
        tower: TowerId,
        /// Class of the placed tower.
        class: TowerClassId,
        /// World-space position of the tower.
        at: Position,
    },
    /// Reports that a tower placement request was rejected.
    TowerPlacementRejected {
        /// Class requested for placement.
        class: TowerClassId,
        /// Position provided in the placement request.
        at: Position,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a tower advanced to its next tier.
    TowerUpgraded {
        /// Identifier of the upgraded tower.
        tower: TowerId,
        /// Tier index the tower now occupies.
        tier: u32,
    },
    /// Reports that a tower upgrade request was rejected.
    TowerUpgradeRejected {
        /// Identifier of the tower targeted by the request.
        tower: TowerId,
        /// Specific reason the upgrade failed.
        reason: UpgradeError,
    },
    /// Confirms that a tower was sold and the refund credited.
    TowerSold {
        /// Identifier of the tower that was removed.
        tower: TowerId,
        /// Money credited for the sale.
        refund: u32,
    },
    /// Reports that a tower sale request was rejected.
    TowerSaleRejected {
        /// Identifier of the tower targeted by the request.
        tower: TowerId,
        /// Specific reason the sale failed.
        reason: SaleError,
    },
    /// Confirms that a tower skill triggered.
    SkillActivated {
        /// Identifier of the casting tower.
        tower: TowerId,
        /// Kind of skill that triggered.
        skill: SkillKind,
    },
    /// Reports that a skill activation request was rejected.
    SkillRejected {
        /// Identifier of the tower targeted by the request.
        tower: TowerId,
        /// Specific reason the activation failed.
        reason: SkillError,
    },
    /// Confirms that the next scripted wave started spawning.
    WaveStarted {
        /// One-based index of the wave that started.
        wave: u32,
    },
    /// Reports that a wave start request was rejected.
    WaveRejected {
        /// Specific reason the wave start failed.
        reason: WaveError,
    },
    /// Announces that the active spawn queue drained completely.
    WaveCleared {
        /// One-based index of the wave whose queue drained.
        wave: u32,
    },
    /// Announces that the paused flag changed.
    PauseChanged {
        /// Whether the simulation is now paused.
        paused: bool,
    },
    /// Confirms that the enemy route was replaced.
    RouteChanged {
        /// Number of waypoints in the replacement route.
        waypoints: u32,
    },
    /// Reports that a route replacement request was rejected.
    RouteRejected {
        /// Specific reason the replacement failed.
        reason: RouteError,
    },
    /// Announces that the match was reset to its opening state.
    MatchRestarted,
    /// Announces that the match reached a terminal outcome.
    MatchEnded {
        /// Outcome that ended the match.
        outcome: MatchOutcome,
    },
}

/// Reasons a tower placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// The requested tower class does not exist in the catalog.
    UnknownClass,
    /// The tier-zero cost exceeds the available money.
    InsufficientFunds,
    /// The position is too close to the route or to another tower.
    InvalidPosition,
}

/// Reasons a tower upgrade request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeError {
    /// No tower with the provided identifier exists.
    UnknownTower,
    /// The tower already sits at its final tier.
    MaxTier,
    /// The upgrade cost exceeds the available money.
    InsufficientFunds,
}

/// Reasons a tower sale request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SaleError {
    /// No tower with the provided identifier exists.
    UnknownTower,
}

/// Reasons a skill activation request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillError {
    /// No tower with the provided identifier exists.
    UnknownTower,
    /// The tower's current tier carries no skill.
    NoSkill,
    /// The skill is still cooling down.
    OnCooldown,
}

/// Reasons a wave start request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WaveError {
    /// The match already reached a terminal outcome.
    MatchOver,
    /// The previous wave is still spawning.
    SpawnInProgress,
    /// Every scripted wave has already been started.
    WavesExhausted,
}

/// Reasons a route replacement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RouteError {
    /// A route needs at least two waypoints.
    InsufficientWaypoints,
}

impl fmt::Display for RouteError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientWaypoints => {
                write!(formatter, "a route needs at least two waypoints")
            }
        }
    }
}

impl Error for RouteError {}

/// Cooldown state of a tower's active skill for presentation layers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SkillStatus {
    /// Kind of skill carried by the tower's current tier.
    pub kind: SkillKind,
    /// Whether the skill can trigger right now.
    pub ready: bool,
    /// Fraction of the cooldown still remaining, in `0.0..=1.0`.
    pub cooldown_remaining: f32,
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Class the tower was built from.
    pub class: TowerClassId,
    /// Tier index the tower currently occupies.
    pub tier: u32,
    /// World-space position of the tower.
    pub position: Position,
    /// Targeting radius of the current tier in world units.
    pub range: f32,
    /// Whether the current tier strikes instantly instead of firing.
    pub melee: bool,
    /// Whether the current tier can target flying enemies.
    pub targets_flying: bool,
    /// Whether the attack cooldown has elapsed.
    pub ready: bool,
    /// Whether a rapid-fire buff is currently active.
    pub rapid_fire_active: bool,
    /// Skill cooldown state for the current tier, if it has a skill.
    pub skill: Option<SkillStatus>,
}

/// Read-only snapshot describing all towers in the world.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Number of snapshots captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view captured no snapshots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Identifier allocated to the enemy by the world.
    pub id: EnemyId,
    /// Class the enemy was spawned from.
    pub class: EnemyClassId,
    /// World-space position of the enemy.
    pub position: Position,
    /// Remaining health.
    pub health: f32,
    /// Health the enemy spawned with.
    pub max_health: f32,
    /// Whether only air-capable towers can target this enemy.
    pub flying: bool,
    /// Whether the enemy is a boss.
    pub boss: bool,
    /// Whether a stun currently prevents movement.
    pub stunned: bool,
    /// Whether a slow currently reduces movement speed.
    pub slowed: bool,
    /// Whether a burn is currently ticking.
    pub burning: bool,
}

/// Read-only snapshot describing all live enemies on the route.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in deterministic order.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Number of snapshots captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view captured no snapshots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Identifier allocated to the projectile by the world.
    pub id: ProjectileId,
    /// Current world-space position.
    pub position: Position,
    /// Enemy the projectile is homing toward.
    pub target: EnemyId,
}

/// Read-only snapshot describing all projectiles in flight.
#[derive(Clone, Debug, Default)]
pub struct ProjectileView {
    snapshots: Vec<ProjectileSnapshot>,
}

impl ProjectileView {
    /// Creates a new projectile view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ProjectileSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured projectile snapshots in deterministic order.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &ProjectileSnapshot> {
        self.snapshots.iter()
    }

    /// Number of snapshots captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view captured no snapshots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ProjectileSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single slow field on the ground.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrapSnapshot {
    /// Identifier allocated to the trap by the world.
    pub id: TrapId,
    /// World-space center of the field.
    pub position: Position,
    /// Radius of the field in world units.
    pub radius: f32,
}

/// Read-only snapshot describing all active slow fields.
#[derive(Clone, Debug, Default)]
pub struct TrapView {
    snapshots: Vec<TrapSnapshot>,
}

impl TrapView {
    /// Creates a new trap view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TrapSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured trap snapshots in deterministic order.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &TrapSnapshot> {
        self.snapshots.iter()
    }

    /// Number of snapshots captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view captured no snapshots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TrapSnapshot> {
        self.snapshots
    }
}

/// Pairing of a tower with the enemy it should attack this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AttackAssignment {
    /// Tower the assignment belongs to.
    pub tower: TowerId,
    /// Enemy selected as the tower's target.
    pub enemy: EnemyId,
}

#[cfg(test)]
mod tests {
    use super::{
        Catalog, CatalogError, EnemyClass, EnemyClassId, EnemyId, MatchOutcome, MatchRules,
        PlacementError, Position, SkillKind, SkillSpec, TowerClass, TowerClassId, TowerId,
        TowerTier, WaveEntry, WaveError, WaveScript,
    };
    use serde::{de::DeserializeOwned, Serialize};
    use std::time::Duration;

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn tower_id_round_trips_through_bincode() {
        assert_round_trip(&TowerId::new(42));
    }

    #[test]
    fn enemy_id_round_trips_through_bincode() {
        assert_round_trip(&EnemyId::new(7));
    }

    #[test]
    fn class_ids_round_trip_through_bincode() {
        assert_round_trip(&TowerClassId::new(1));
        assert_round_trip(&EnemyClassId::new(3));
    }

    #[test]
    fn position_round_trips_through_bincode() {
        assert_round_trip(&Position::new(120.5, -44.25));
    }

    #[test]
    fn rejection_reasons_round_trip_through_bincode() {
        assert_round_trip(&PlacementError::InsufficientFunds);
        assert_round_trip(&WaveError::SpawnInProgress);
        assert_round_trip(&MatchOutcome::Victory);
        assert_round_trip(&SkillKind::Shockwave);
    }

    #[test]
    fn distance_to_segment_projects_onto_interior() {
        let point = Position::new(5.0, 3.0);
        let start = Position::new(0.0, 0.0);
        let end = Position::new(10.0, 0.0);
        assert!((point.distance_to_segment(start, end) - 3.0).abs() < 1e-6);
    }

    #[test]
    fn distance_to_segment_clamps_to_endpoints() {
        let point = Position::new(-4.0, 3.0);
        let start = Position::new(0.0, 0.0);
        let end = Position::new(10.0, 0.0);
        assert!((point.distance_to_segment(start, end) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn distance_to_degenerate_segment_measures_the_point() {
        let point = Position::new(3.0, 4.0);
        let anchor = Position::new(0.0, 0.0);
        assert!((point.distance_to_segment(anchor, anchor) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn step_toward_snaps_onto_close_targets() {
        let start = Position::new(0.0, 0.0);
        let target = Position::new(3.0, 4.0);
        let (position, arrived) = start.step_toward(target, 6.0);
        assert!(arrived);
        assert_eq!(position, target);
    }

    #[test]
    fn step_toward_advances_partially_when_far() {
        let start = Position::new(0.0, 0.0);
        let target = Position::new(10.0, 0.0);
        let (position, arrived) = start.step_toward(target, 4.0);
        assert!(!arrived);
        assert!((position.x() - 4.0).abs() < 1e-6);
        assert!((position.y()).abs() < 1e-6);
    }

    fn minimal_tier() -> TowerTier {
        TowerTier {
            title: String::from("Test"),
            cost: 10,
            range: 50.0,
            attack_interval: Duration::from_millis(500),
            damage: 5.0,
            melee: true,
            targets_flying: false,
            skill: None,
            payload: None,
        }
    }

    fn minimal_enemy() -> EnemyClass {
        EnemyClass {
            name: String::from("runner"),
            health: 10.0,
            armor: 0.0,
            speed: 60.0,
            reward: 5,
            flying: false,
            boss: false,
        }
    }

    #[test]
    fn catalog_rejects_tower_classes_without_tiers() {
        let result = Catalog::new(
            MatchRules {
                starting_money: 100,
                starting_lives: 10,
            },
            vec![TowerClass {
                name: String::from("empty"),
                tiers: Vec::new(),
            }],
            vec![minimal_enemy()],
            Vec::new(),
        );
        assert_eq!(
            result.err(),
            Some(CatalogError::EmptyTowerClass {
                class: TowerClassId::new(0)
            })
        );
    }

    #[test]
    fn catalog_rejects_waves_referencing_unknown_enemies() {
        let result = Catalog::new(
            MatchRules {
                starting_money: 100,
                starting_lives: 10,
            },
            vec![TowerClass {
                name: String::from("basic"),
                tiers: vec![minimal_tier()],
            }],
            vec![minimal_enemy()],
            vec![WaveScript {
                entries: vec![WaveEntry {
                    enemy: EnemyClassId::new(9),
                    count: 1,
                    interval: Duration::from_millis(700),
                }],
            }],
        );
        assert_eq!(
            result.err(),
            Some(CatalogError::UnknownEnemyClass {
                wave: 0,
                enemy: EnemyClassId::new(9)
            })
        );
    }

    #[test]
    fn catalog_resolves_classes_by_name() {
        let catalog = Catalog::new(
            MatchRules {
                starting_money: 100,
                starting_lives: 10,
            },
            vec![TowerClass {
                name: String::from("basic"),
                tiers: vec![minimal_tier()],
            }],
            vec![minimal_enemy()],
            Vec::new(),
        )
        .expect("catalog");
        assert_eq!(catalog.tower_by_name("basic"), Some(TowerClassId::new(0)));
        assert_eq!(catalog.enemy_by_name("runner"), Some(EnemyClassId::new(0)));
        assert_eq!(catalog.tower_by_name("missing"), None);
    }

    #[test]
    fn skill_cooldown_is_shared_across_kinds() {
        let shockwave = SkillSpec::Shockwave {
            cooldown: Duration::from_secs(18),
            radius: 110.0,
            damage_factor: 2.0,
            stun: Duration::from_millis(800),
        };
        assert_eq!(shockwave.cooldown(), Duration::from_secs(18));
        assert_eq!(shockwave.kind(), SkillKind::Shockwave);
    }
}
