//! Campaign configuration files.
//!
//! A campaign file is a TOML document with optional `rules`, `towers`,
//! `enemies` and `waves` sections. Sections that are present replace
//! the corresponding catalog table wholesale; absent sections fall back
//! to the standard campaign. Durations are written in milliseconds and
//! wave entries reference enemies by name.

use std::time::Duration;

use anyhow::{bail, Context as _};
use lane_defence_core::{
    BurnSpec, Catalog, EnemyClass, EnemyClassId, MatchRules, PayloadSpec, SkillSpec, TowerClass,
    TowerTier, WaveEntry, WaveScript,
};
use serde::Deserialize;

/// Burn duration applied when a `burn` table omits `duration_ms`.
const DEFAULT_BURN_MS: u64 = 2_000;

/// Parsed campaign file, prior to catalog validation.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct CampaignFile {
    #[serde(default)]
    rules: Option<RulesConfig>,
    #[serde(default)]
    towers: Option<Vec<TowerConfig>>,
    #[serde(default)]
    enemies: Option<Vec<EnemyConfig>>,
    #[serde(default)]
    waves: Option<Vec<WaveConfig>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RulesConfig {
    starting_money: u32,
    starting_lives: u32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TowerConfig {
    name: String,
    tiers: Vec<TierConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TierConfig {
    title: String,
    cost: u32,
    range: f32,
    attack_interval_ms: u64,
    damage: f32,
    #[serde(default)]
    melee: bool,
    #[serde(default)]
    targets_flying: bool,
    #[serde(default)]
    skill: Option<SkillConfig>,
    #[serde(default)]
    payload: Option<PayloadConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum SkillConfig {
    Shockwave {
        cooldown_ms: u64,
        radius: f32,
        damage_factor: f32,
        stun_ms: u64,
    },
    RapidFire {
        cooldown_ms: u64,
        duration_ms: u64,
        attack_speed: f32,
    },
    SlowField {
        cooldown_ms: u64,
        radius: f32,
        slow_factor: f32,
        duration_ms: u64,
    },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PayloadConfig {
    #[serde(default)]
    splash_radius: Option<f32>,
    #[serde(default)]
    burn: Option<BurnConfig>,
    #[serde(default)]
    pierce: u32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BurnConfig {
    damage_per_second: f32,
    #[serde(default)]
    duration_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EnemyConfig {
    name: String,
    health: f32,
    armor: f32,
    speed: f32,
    reward: u32,
    #[serde(default)]
    flying: bool,
    #[serde(default)]
    boss: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WaveConfig {
    entries: Vec<WaveEntryConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WaveEntryConfig {
    enemy: String,
    count: u32,
    interval_ms: u64,
}

impl CampaignFile {
    /// Parses a campaign file from its TOML text.
    pub(crate) fn parse(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("could not parse campaign file")
    }

    /// Overlays the file's sections onto the base catalog.
    pub(crate) fn into_catalog(self, base: &Catalog) -> anyhow::Result<Catalog> {
        let rules = match self.rules {
            Some(rules) => MatchRules {
                starting_money: rules.starting_money,
                starting_lives: rules.starting_lives,
            },
            None => base.rules(),
        };
        let towers = match self.towers {
            Some(towers) => towers.into_iter().map(TowerConfig::into_class).collect(),
            None => base.towers().to_vec(),
        };
        let enemies = match self.enemies {
            Some(enemies) => enemies.into_iter().map(EnemyConfig::into_class).collect(),
            None => base.enemies().to_vec(),
        };
        let waves = match self.waves {
            Some(waves) => resolve_waves(waves, &enemies)?,
            None => base.waves().to_vec(),
        };

        Catalog::new(rules, towers, enemies, waves).context("campaign file failed validation")
    }
}

impl TowerConfig {
    fn into_class(self) -> TowerClass {
        TowerClass {
            name: self.name,
            tiers: self.tiers.into_iter().map(TierConfig::into_tier).collect(),
        }
    }
}

impl TierConfig {
    fn into_tier(self) -> TowerTier {
        TowerTier {
            title: self.title,
            cost: self.cost,
            range: self.range,
            attack_interval: Duration::from_millis(self.attack_interval_ms),
            damage: self.damage,
            melee: self.melee,
            targets_flying: self.targets_flying,
            skill: self.skill.map(SkillConfig::into_spec),
            payload: self.payload.map(PayloadConfig::into_spec),
        }
    }
}

impl SkillConfig {
    fn into_spec(self) -> SkillSpec {
        match self {
            Self::Shockwave {
                cooldown_ms,
                radius,
                damage_factor,
                stun_ms,
            } => SkillSpec::Shockwave {
                cooldown: Duration::from_millis(cooldown_ms),
                radius,
                damage_factor,
                stun: Duration::from_millis(stun_ms),
            },
            Self::RapidFire {
                cooldown_ms,
                duration_ms,
                attack_speed,
            } => SkillSpec::RapidFire {
                cooldown: Duration::from_millis(cooldown_ms),
                duration: Duration::from_millis(duration_ms),
                attack_speed,
            },
            Self::SlowField {
                cooldown_ms,
                radius,
                slow_factor,
                duration_ms,
            } => SkillSpec::SlowField {
                cooldown: Duration::from_millis(cooldown_ms),
                radius,
                slow_factor,
                duration: Duration::from_millis(duration_ms),
            },
        }
    }
}

impl PayloadConfig {
    fn into_spec(self) -> PayloadSpec {
        PayloadSpec {
            splash_radius: self.splash_radius,
            burn: self.burn.map(|burn| BurnSpec {
                damage_per_second: burn.damage_per_second,
                duration: Duration::from_millis(burn.duration_ms.unwrap_or(DEFAULT_BURN_MS)),
            }),
            pierce: self.pierce,
        }
    }
}

impl EnemyConfig {
    fn into_class(self) -> EnemyClass {
        EnemyClass {
            name: self.name,
            health: self.health,
            armor: self.armor,
            speed: self.speed,
            reward: self.reward,
            flying: self.flying,
            boss: self.boss,
        }
    }
}

fn resolve_waves(waves: Vec<WaveConfig>, enemies: &[EnemyClass]) -> anyhow::Result<Vec<WaveScript>> {
    let mut scripts = Vec::with_capacity(waves.len());
    for (index, wave) in waves.into_iter().enumerate() {
        let mut entries = Vec::with_capacity(wave.entries.len());
        for entry in wave.entries {
            let Some(position) = enemies.iter().position(|class| class.name == entry.enemy) else {
                bail!(
                    "wave {} references unknown enemy class '{}'",
                    index + 1,
                    entry.enemy
                );
            };
            entries.push(WaveEntry {
                enemy: EnemyClassId::new(position as u32),
                count: entry.count,
                interval: Duration::from_millis(entry.interval_ms),
            });
        }
        scripts.push(WaveScript { entries });
    }
    Ok(scripts)
}
