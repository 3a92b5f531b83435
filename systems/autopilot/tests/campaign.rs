use std::time::Duration;

use lane_defence_core::{
    Catalog, Command, EnemyClass, EnemyClassId, MatchOutcome, MatchRules, Position, TowerClass,
    TowerClassId, TowerTier, WaveEntry, WaveScript,
};
use lane_defence_system_autopilot::{Autopilot, BuildStep};
use lane_defence_world::{self as world, query, World};

const TICK: Duration = Duration::from_millis(50);

/// Pumps the fixed-step loop until the match resolves or the cap runs out.
///
/// Events produced by the driver's own commands are carried into its next
/// call so plan confirmations arrive one tick after the placement.
fn run_match(world: &mut World, autopilot: &mut Autopilot, max_ticks: u32) -> Option<MatchOutcome> {
    let mut pending = Vec::new();
    let mut commands = Vec::new();

    for _ in 0..max_ticks {
        world::apply(world, Command::Tick { dt: TICK }, &mut pending);

        autopilot.drive(
            &pending,
            query::money(world),
            query::wave_progress(world),
            query::enemy_view(world).len(),
            &query::tower_view(world),
            query::catalog(world),
            &mut commands,
        );
        pending.clear();
        for command in commands.drain(..) {
            world::apply(world, command, &mut pending);
        }

        if query::outcome(world).is_some() {
            break;
        }
    }

    query::outcome(world)
}

#[test]
fn unattended_standard_campaign_concludes() {
    let mut world = World::new();
    let catalog = query::catalog(&world);
    let sniper = catalog.tower_by_name("sniper").expect("sniper class");
    let brawler = catalog.tower_by_name("brawler").expect("brawler class");
    let plan = vec![
        BuildStep::new(sniper, Position::new(208.0, 85.0)),
        BuildStep::new(brawler, Position::new(208.0, 185.0)),
        BuildStep::new(sniper, Position::new(390.0, 250.0)),
        BuildStep::new(sniper, Position::new(600.0, 250.0)),
        BuildStep::new(brawler, Position::new(700.0, 240.0)),
    ];
    let mut autopilot = Autopilot::new(plan);

    let outcome = run_match(&mut world, &mut autopilot, 12_000);

    let outcome = outcome.expect("campaign must conclude within the tick cap");
    match outcome {
        MatchOutcome::Victory => assert!(query::lives(&world) > 0),
        MatchOutcome::Defeat => assert_eq!(query::lives(&world), 0),
    }
    assert!(
        query::tower_view(&world).len() >= 2,
        "the opening bank covers at least the first two steps",
    );
}

#[test]
fn empty_plan_concedes_the_standard_campaign() {
    let mut world = World::new();
    let mut autopilot = Autopilot::default();

    let outcome = run_match(&mut world, &mut autopilot, 12_000);

    assert_eq!(outcome, Some(MatchOutcome::Defeat));
    assert_eq!(query::lives(&world), 0);
    assert!(query::tower_view(&world).is_empty());
}

#[test]
fn overwhelming_towers_take_the_match() {
    let catalog = Catalog::new(
        MatchRules {
            starting_money: 40,
            starting_lives: 10,
        },
        vec![TowerClass {
            name: String::from("bastion"),
            tiers: vec![TowerTier {
                title: String::from("Bastion"),
                cost: 30,
                range: 2000.0,
                attack_interval: Duration::from_millis(100),
                damage: 500.0,
                melee: true,
                targets_flying: true,
                skill: None,
                payload: None,
            }],
        }],
        vec![EnemyClass {
            name: String::from("walker"),
            health: 60.0,
            armor: 0.0,
            speed: 50.0,
            reward: 5,
            flying: false,
            boss: false,
        }],
        vec![WaveScript {
            entries: vec![WaveEntry {
                enemy: EnemyClassId::new(0),
                count: 3,
                interval: Duration::from_millis(300),
            }],
        }],
    )
    .expect("catalog");
    let route = vec![Position::new(0.0, 100.0), Position::new(1000.0, 100.0)];
    let mut world = World::with_catalog(catalog, route).expect("world");
    let mut autopilot = Autopilot::new(vec![BuildStep::new(
        TowerClassId::new(0),
        Position::new(500.0, 300.0),
    )]);

    let outcome = run_match(&mut world, &mut autopilot, 2_000);

    assert_eq!(outcome, Some(MatchOutcome::Victory));
    assert_eq!(query::lives(&world), 10);
    assert_eq!(query::money(&world), 40 - 30 + 3 * 5);
}
