//! Built-in campaign content: two tower classes, four enemy classes, and a
//! six-wave script.

use std::time::Duration;

use lane_defence_core::{
    BurnSpec, Catalog, EnemyClass, EnemyClassId, MatchRules, PayloadSpec, Position, SkillSpec,
    TowerClass, TowerTier, WaveEntry, WaveScript,
};

use crate::route::Route;

const FIELD_WIDTH: f32 = 960.0;
const FIELD_HEIGHT: f32 = 540.0;

/// Builds the standard campaign catalog.
pub(crate) fn standard_catalog() -> Catalog {
    let rules = MatchRules {
        starting_money: 220,
        starting_lives: 20,
    };
    let towers = vec![brawler(), sniper()];
    let enemies = vec![
        EnemyClass {
            name: String::from("grunt"),
            health: 55.0,
            armor: 0.0,
            speed: 65.0,
            reward: 10,
            flying: false,
            boss: false,
        },
        EnemyClass {
            name: String::from("tank"),
            health: 140.0,
            armor: 6.0,
            speed: 45.0,
            reward: 16,
            flying: false,
            boss: false,
        },
        EnemyClass {
            name: String::from("drone"),
            health: 70.0,
            armor: 1.0,
            speed: 75.0,
            reward: 12,
            flying: true,
            boss: false,
        },
        EnemyClass {
            name: String::from("boss"),
            health: 900.0,
            armor: 4.0,
            speed: 42.0,
            reward: 120,
            flying: false,
            boss: true,
        },
    ];
    // The tables above are fixed and reference only the enemy classes they
    // declare, so validation cannot fail.
    Catalog::new(rules, towers, enemies, standard_waves()).expect("standard catalog is valid")
}

/// Builds the standard S-curve route across the playfield.
pub(crate) fn standard_route() -> Route {
    Route::from_vetted(vec![
        Position::new(80.0, FIELD_HEIGHT * 0.25),
        Position::new(FIELD_WIDTH * 0.35, FIELD_HEIGHT * 0.25),
        Position::new(FIELD_WIDTH * 0.35, FIELD_HEIGHT * 0.55),
        Position::new(FIELD_WIDTH * 0.68, FIELD_HEIGHT * 0.55),
        Position::new(FIELD_WIDTH * 0.68, FIELD_HEIGHT * 0.35),
        Position::new(FIELD_WIDTH - 90.0, FIELD_HEIGHT * 0.35),
    ])
}

fn brawler() -> TowerClass {
    TowerClass {
        name: String::from("brawler"),
        tiers: vec![
            TowerTier {
                title: String::from("Brawler"),
                cost: 80,
                range: 85.0,
                attack_interval: Duration::from_millis(850),
                damage: 12.0,
                melee: true,
                targets_flying: false,
                skill: Some(SkillSpec::Shockwave {
                    cooldown: Duration::from_secs(18),
                    radius: 110.0,
                    damage_factor: 2.0,
                    stun: Duration::from_millis(800),
                }),
                payload: None,
            },
            TowerTier {
                title: String::from("Gatling Brawler"),
                cost: 140,
                range: 92.0,
                attack_interval: Duration::from_millis(450),
                damage: 10.0,
                melee: true,
                targets_flying: false,
                skill: Some(SkillSpec::RapidFire {
                    cooldown: Duration::from_secs(22),
                    duration: Duration::from_secs(6),
                    attack_speed: 1.6,
                }),
                payload: None,
            },
            TowerTier {
                title: String::from("Gear Brawler"),
                cost: 240,
                range: 98.0,
                attack_interval: Duration::from_millis(350),
                damage: 14.0,
                melee: true,
                targets_flying: false,
                skill: Some(SkillSpec::RapidFire {
                    cooldown: Duration::from_secs(26),
                    duration: Duration::from_secs(8),
                    attack_speed: 2.0,
                }),
                payload: None,
            },
        ],
    }
}

fn sniper() -> TowerClass {
    TowerClass {
        name: String::from("sniper"),
        tiers: vec![
            TowerTier {
                title: String::from("Sniper"),
                cost: 90,
                range: 260.0,
                attack_interval: Duration::from_millis(1100),
                damage: 14.0,
                melee: false,
                targets_flying: true,
                skill: Some(SkillSpec::SlowField {
                    cooldown: Duration::from_secs(24),
                    radius: 120.0,
                    slow_factor: 0.55,
                    duration: Duration::from_secs(6),
                }),
                payload: None,
            },
            TowerTier {
                title: String::from("Flame Sniper"),
                cost: 160,
                range: 280.0,
                attack_interval: Duration::from_millis(1100),
                damage: 16.0,
                melee: false,
                targets_flying: true,
                skill: None,
                payload: Some(PayloadSpec {
                    splash_radius: Some(70.0),
                    burn: Some(BurnSpec {
                        damage_per_second: 4.0,
                        duration: Duration::from_millis(3500),
                    }),
                    pierce: 0,
                }),
            },
            TowerTier {
                title: String::from("Longshot Sniper"),
                cost: 260,
                range: 340.0,
                attack_interval: Duration::from_secs(1),
                damage: 20.0,
                melee: false,
                targets_flying: true,
                skill: None,
                payload: Some(PayloadSpec {
                    splash_radius: None,
                    burn: None,
                    pierce: 1,
                }),
            },
        ],
    }
}

fn standard_waves() -> Vec<WaveScript> {
    let grunt = EnemyClassId::new(0);
    let tank = EnemyClassId::new(1);
    let drone = EnemyClassId::new(2);
    let boss = EnemyClassId::new(3);
    vec![
        WaveScript {
            entries: vec![entry(grunt, 8, 700)],
        },
        WaveScript {
            entries: vec![entry(grunt, 10, 600)],
        },
        WaveScript {
            entries: vec![entry(tank, 6, 1100)],
        },
        WaveScript {
            entries: vec![entry(drone, 8, 700)],
        },
        WaveScript {
            entries: vec![entry(grunt, 12, 500), entry(tank, 4, 1200)],
        },
        WaveScript {
            entries: vec![entry(boss, 1, 0)],
        },
    ]
}

fn entry(enemy: EnemyClassId, count: u32, interval_ms: u64) -> WaveEntry {
    WaveEntry {
        enemy,
        count,
        interval: Duration::from_millis(interval_ms),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_resolves_every_class_by_name() {
        let catalog = standard_catalog();
        assert!(catalog.tower_by_name("brawler").is_some());
        assert!(catalog.tower_by_name("sniper").is_some());
        for name in ["grunt", "tank", "drone", "boss"] {
            assert!(catalog.enemy_by_name(name).is_some(), "missing enemy {name}");
        }
    }

    #[test]
    fn standard_catalog_opens_with_campaign_rules() {
        let rules = standard_catalog().rules();
        assert_eq!(rules.starting_money, 220);
        assert_eq!(rules.starting_lives, 20);
    }

    #[test]
    fn standard_campaign_scripts_six_waves() {
        let catalog = standard_catalog();
        assert_eq!(catalog.wave_count(), 6);
        let finale = catalog.wave(5).expect("final wave");
        assert_eq!(finale.entries.len(), 1);
        assert_eq!(finale.entries[0].count, 1);
        let boss = catalog
            .enemy(finale.entries[0].enemy)
            .expect("boss class");
        assert!(boss.boss);
    }

    #[test]
    fn tower_classes_carry_three_tiers_each() {
        let catalog = standard_catalog();
        for class in catalog.towers() {
            assert_eq!(class.tiers.len(), 3, "class {}", class.name);
        }
        let brawler = catalog.towers()[0].tier(0).expect("tier");
        assert!(brawler.melee);
        assert!(!brawler.targets_flying);
        let sniper = catalog.towers()[1].tier(0).expect("tier");
        assert!(!sniper.melee);
        assert!(sniper.targets_flying);
    }

    #[test]
    fn standard_route_runs_spawn_to_base() {
        let route = standard_route();
        assert_eq!(route.waypoints().len(), 6);
        assert_eq!(route.spawn_point(), Position::new(80.0, 135.0));
        assert_eq!(route.last_index(), 5);
    }
}
