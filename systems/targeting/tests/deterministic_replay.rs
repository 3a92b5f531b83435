use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    time::Duration,
};

use lane_defence_core::{
    AttackAssignment, Command, EnemyClassId, EnemyId, Event, Position, TowerClassId, TowerId,
};
use lane_defence_system_targeting::Targeting;
use lane_defence_world::{self as world, query, World};

#[test]
fn deterministic_replay_matches_assignments_across_runs() {
    let script = scripted_commands();
    let script_len = script.len();
    let first = replay(script.clone());
    let second = replay(script);

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(first.fingerprint(), second.fingerprint());
    assert_eq!(first.assignments.len(), script_len);

    // Nothing to target before the first wave tick.
    assert!(first.assignments[0].targets.is_empty());
    assert!(first.assignments[1].targets.is_empty());
    assert!(first.assignments[2].targets.is_empty());

    // The first grunt enters the route inside sniper range but far outside
    // the brawler's short reach.
    assert_eq!(
        first.assignments[3].targets,
        vec![AttackAssignment {
            tower: TowerId::new(0),
            enemy: EnemyId::new(0),
        }]
    );

    // Grunts march through the brawler's reach later in the wave.
    let brawler_engaged = first.assignments.iter().any(|snapshot| {
        snapshot
            .targets
            .iter()
            .any(|assignment| assignment.tower == TowerId::new(1))
    });
    assert!(brawler_engaged, "brawler never acquired a passing grunt");

    let spawned = first
        .events
        .iter()
        .filter(|event| matches!(event, EventRecord::EnemySpawned { .. }))
        .count();
    assert_eq!(spawned, 8, "expected the full first wave to spawn");
    assert!(first
        .events
        .iter()
        .any(|event| matches!(event, EventRecord::WaveCleared { wave: 1 })));
    assert!(first
        .events
        .iter()
        .any(|event| matches!(event, EventRecord::EnemyKilled { .. })));
    assert_eq!(first.lives, 20, "no grunt crosses the route in six seconds");
    assert!(first.money > 50, "kill rewards outweigh the tower spend");
}

fn replay(commands: Vec<Command>) -> ReplayOutcome {
    let mut world = World::new();
    let mut targeting = Targeting::new();
    let mut current = Vec::new();
    let mut assignments = Vec::new();
    let mut events = Vec::new();

    for command in commands {
        let mut generated = Vec::new();
        world::apply(&mut world, command, &mut generated);
        events.extend(generated.into_iter().map(EventRecord::from));

        let towers = query::tower_view(&world);
        let enemies = query::enemy_view(&world);
        targeting.acquire(&towers, &enemies, &mut current);
        assignments.push(AssignmentSnapshot::from(&current));
    }

    ReplayOutcome {
        events,
        assignments,
        money: query::money(&world),
        lives: query::lives(&world),
    }
}

fn scripted_commands() -> Vec<Command> {
    let (sniper, brawler) = standard_classes();
    let mut commands = vec![
        Command::PlaceTower {
            class: sniper,
            at: Position::new(208.0, 85.0),
        },
        Command::PlaceTower {
            class: brawler,
            at: Position::new(208.0, 185.0),
        },
        Command::StartWave,
    ];
    commands.extend((0..120).map(|_| Command::Tick {
        dt: Duration::from_millis(50),
    }));
    commands
}

fn standard_classes() -> (TowerClassId, TowerClassId) {
    let world = World::new();
    let catalog = query::catalog(&world);
    let sniper = catalog.tower_by_name("sniper").expect("sniper class");
    let brawler = catalog.tower_by_name("brawler").expect("brawler class");
    (sniper, brawler)
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ReplayOutcome {
    events: Vec<EventRecord>,
    assignments: Vec<AssignmentSnapshot>,
    money: u32,
    lives: u32,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct AssignmentSnapshot {
    targets: Vec<AttackAssignment>,
}

impl AssignmentSnapshot {
    fn from(targets: &[AttackAssignment]) -> Self {
        Self {
            targets: targets.to_vec(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct QuantizedPosition {
    x_tenths: i32,
    y_tenths: i32,
}

impl From<Position> for QuantizedPosition {
    fn from(position: Position) -> Self {
        Self {
            x_tenths: to_tenths(position.x()),
            y_tenths: to_tenths(position.y()),
        }
    }
}

fn to_tenths(value: f32) -> i32 {
    (value * 10.0).round() as i32
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum EventRecord {
    TimeAdvanced {
        dt: Duration,
    },
    TowerPlaced {
        tower: TowerId,
        class: TowerClassId,
        at: QuantizedPosition,
    },
    WaveStarted {
        wave: u32,
    },
    EnemySpawned {
        enemy: EnemyId,
        class: EnemyClassId,
        at: QuantizedPosition,
    },
    EnemyKilled {
        enemy: EnemyId,
        reward: u32,
    },
    WaveCleared {
        wave: u32,
    },
}

impl From<Event> for EventRecord {
    fn from(event: Event) -> Self {
        match event {
            Event::TimeAdvanced { dt } => Self::TimeAdvanced { dt },
            Event::TowerPlaced { tower, class, at } => Self::TowerPlaced {
                tower,
                class,
                at: QuantizedPosition::from(at),
            },
            Event::WaveStarted { wave } => Self::WaveStarted { wave },
            Event::EnemySpawned { enemy, class, at } => Self::EnemySpawned {
                enemy,
                class,
                at: QuantizedPosition::from(at),
            },
            Event::EnemyKilled { enemy, reward } => Self::EnemyKilled { enemy, reward },
            Event::WaveCleared { wave } => Self::WaveCleared { wave },
            other => panic!("unexpected event during targeting replay: {other:?}"),
        }
    }
}
