#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs unattended Lane Defence matches.
//!
//! The binary assembles a catalog (standard, or overlaid with a campaign
//! file), hands a build plan to the autopilot and pumps the simulation until
//! the match resolves. Every world event is narrated through the logger, so
//! `RUST_LOG=info` turns the run into a play-by-play transcript.

mod config;
mod loadout;

use std::{fs, path::PathBuf, process::ExitCode, time::Duration};

use anyhow::{anyhow, bail, Context as _};
use clap::Parser;
use lane_defence_core::{
    Catalog, Command, EnemyClassId, Event, MatchOutcome, Position, TowerClassId,
};
use lane_defence_system_autopilot::{Autopilot, BuildStep};
use lane_defence_world::{self as world, query, World};
use log::{info, trace, warn};

use crate::{config::CampaignFile, loadout::LoadoutPlan};

/// Command-line arguments accepted by the match runner.
#[derive(Debug, Parser)]
#[command(name = "lane-defence", about = "Headless tower-defence match runner")]
struct Args {
    /// Campaign file overriding parts of the standard catalog.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Encoded build plan to follow instead of the standard loadout.
    #[arg(long, value_name = "PLAN")]
    loadout: Option<String>,

    /// Print the encoded build plan for the active catalog and exit.
    #[arg(long)]
    print_loadout: bool,

    /// Simulated milliseconds advanced per tick.
    #[arg(long, default_value_t = 16)]
    tick_ms: u64,

    /// Simulated seconds after which an unresolved match is abandoned.
    #[arg(long, default_value_t = 600)]
    time_limit_secs: u64,
}

fn main() -> ExitCode {
    env_logger::init();
    match run(Args::parse()) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> anyhow::Result<ExitCode> {
    if args.tick_ms == 0 {
        bail!("--tick-ms must be at least 1");
    }

    let standard = World::new();
    let catalog = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("could not read campaign file {}", path.display()))?;
            CampaignFile::parse(&text)?.into_catalog(query::catalog(&standard))?
        }
        None => query::catalog(&standard).clone(),
    };

    let plan = match &args.loadout {
        Some(encoded) => LoadoutPlan::decode(encoded)
            .context("could not decode the loadout string")?
            .resolve(&catalog)
            .context("loadout does not match the active catalog")?,
        None => standard_plan(&catalog)?,
    };

    if args.print_loadout {
        let encoded = LoadoutPlan::from_steps(&plan, &catalog)
            .context("could not encode the build plan")?
            .encode();
        println!("{encoded}");
        return Ok(ExitCode::SUCCESS);
    }

    let route = query::route(&standard).waypoints().to_vec();
    let mut world = World::with_catalog(catalog, route).context("standard route was rejected")?;
    let mut autopilot = Autopilot::new(plan);

    info!(
        "starting match: {} money, {} lives, {} waves, {} planned towers",
        query::money(&world),
        query::lives(&world),
        query::wave_progress(&world).total,
        autopilot.remaining_plan().len()
    );

    let tick = Duration::from_millis(args.tick_ms);
    let limit = Duration::from_secs(args.time_limit_secs);
    match run_match(&mut world, &mut autopilot, tick, limit) {
        Some(MatchOutcome::Victory) => {
            info!(
                "victory with {} lives and {} money after {:?}",
                query::lives(&world),
                query::money(&world),
                query::clock(&world)
            );
            Ok(ExitCode::SUCCESS)
        }
        Some(MatchOutcome::Defeat) => {
            info!("defeat after {:?}", query::clock(&world));
            Ok(ExitCode::FAILURE)
        }
        None => Err(anyhow!(
            "match did not conclude within {} seconds of simulated time",
            args.time_limit_secs
        )),
    }
}

/// Pumps ticks and driver commands until the match resolves or time runs out.
///
/// Events from each iteration's commands are carried into the next drive
/// call together with that iteration's tick events, so the driver observes
/// every event exactly once.
fn run_match(
    world: &mut World,
    autopilot: &mut Autopilot,
    tick: Duration,
    limit: Duration,
) -> Option<MatchOutcome> {
    let mut inbox: Vec<Event> = Vec::new();
    let mut commands: Vec<Command> = Vec::new();

    while query::clock(world) < limit {
        apply_narrated(world, Command::Tick { dt: tick }, &mut inbox);
        if let Some(outcome) = query::outcome(world) {
            return Some(outcome);
        }

        autopilot.drive(
            &inbox,
            query::money(world),
            query::wave_progress(world),
            query::enemy_view(world).len(),
            &query::tower_view(world),
            query::catalog(world),
            &mut commands,
        );

        inbox.clear();
        for command in commands.drain(..) {
            apply_narrated(world, command, &mut inbox);
        }
    }

    query::outcome(world)
}

/// Applies one command and narrates only the events it appended.
fn apply_narrated(world: &mut World, command: Command, inbox: &mut Vec<Event>) {
    let narrated = inbox.len();
    world::apply(world, command, inbox);
    narrate(query::catalog(world), &inbox[narrated..]);
}

fn narrate(catalog: &Catalog, events: &[Event]) {
    for event in events {
        match event {
            Event::TimeAdvanced { dt } => trace!("clock +{dt:?}"),
            Event::EnemySpawned { enemy, class, at } => info!(
                "{} #{} entered the route at ({:.0}, {:.0})",
                enemy_name(catalog, *class),
                enemy.get(),
                at.x(),
                at.y()
            ),
            Event::EnemyKilled { enemy, reward } => {
                info!("enemy #{} down, +{reward} money", enemy.get());
            }
            Event::BaseBreached {
                enemy,
                lives_remaining,
            } => warn!(
                "enemy #{} breached the base, {lives_remaining} lives left",
                enemy.get()
            ),
            Event::TowerPlaced { tower, class, at } => info!(
                "placed {} #{} at ({:.0}, {:.0})",
                tower_name(catalog, *class),
                tower.get(),
                at.x(),
                at.y()
            ),
            Event::TowerPlacementRejected { class, at, reason } => warn!(
                "could not place {} at ({:.0}, {:.0}): {reason:?}",
                tower_name(catalog, *class),
                at.x(),
                at.y()
            ),
            Event::TowerUpgraded { tower, tier } => {
                info!("tower #{} upgraded to tier {tier}", tower.get());
            }
            Event::TowerUpgradeRejected { tower, reason } => {
                warn!("could not upgrade tower #{}: {reason:?}", tower.get());
            }
            Event::TowerSold { tower, refund } => {
                info!("sold tower #{}, +{refund} money", tower.get());
            }
            Event::TowerSaleRejected { tower, reason } => {
                warn!("could not sell tower #{}: {reason:?}", tower.get());
            }
            Event::SkillActivated { tower, skill } => {
                info!("tower #{} triggered {skill:?}", tower.get());
            }
            Event::SkillRejected { tower, reason } => {
                warn!("tower #{} could not trigger its skill: {reason:?}", tower.get());
            }
            Event::WaveStarted { wave } => info!("wave {wave} incoming"),
            Event::WaveRejected { reason } => {
                warn!("could not start the next wave: {reason:?}");
            }
            Event::WaveCleared { wave } => info!("wave {wave} cleared"),
            Event::PauseChanged { paused } => {
                info!("simulation {}", if *paused { "paused" } else { "resumed" });
            }
            Event::RouteChanged { waypoints } => {
                info!("route replaced with {waypoints} waypoints");
            }
            Event::RouteRejected { reason } => {
                warn!("could not replace the route: {reason:?}");
            }
            Event::MatchRestarted => info!("match restarted"),
            Event::MatchEnded { outcome } => info!("match over: {outcome:?}"),
        }
    }
}

fn enemy_name(catalog: &Catalog, class: EnemyClassId) -> &str {
    catalog.enemy(class).map_or("enemy", |spec| spec.name.as_str())
}

fn tower_name(catalog: &Catalog, class: TowerClassId) -> &str {
    catalog.tower(class).map_or("tower", |spec| spec.name.as_str())
}

/// Standard build plan for the stock catalog: two towers covering the first
/// bends, then snipers along the back half of the route.
fn standard_plan(catalog: &Catalog) -> anyhow::Result<Vec<BuildStep>> {
    let sniper = catalog
        .tower_by_name("sniper")
        .ok_or_else(|| anyhow!("custom campaigns need an explicit --loadout"))?;
    let brawler = catalog
        .tower_by_name("brawler")
        .ok_or_else(|| anyhow!("custom campaigns need an explicit --loadout"))?;
    Ok(vec![
        BuildStep::new(sniper, Position::new(208.0, 85.0)),
        BuildStep::new(brawler, Position::new(208.0, 185.0)),
        BuildStep::new(sniper, Position::new(390.0, 250.0)),
        BuildStep::new(sniper, Position::new(600.0, 250.0)),
        BuildStep::new(brawler, Position::new(700.0, 240.0)),
    ])
}
