use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use dominion::{
    engine::{Engine, EngineConfig},
    scenario::ScenarioLoader,
    web,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Turn-based territorial competition simulator")]
struct Cli {
    /// Path to the scenario YAML file
    #[arg(long, default_value = "scenarios/small_world.yaml")]
    scenario: PathBuf,

    /// Override turn count (uses scenario default when omitted)
    #[arg(long)]
    turns: Option<u64>,

    /// Override snapshot interval in turns (0 disables snapshots)
    #[arg(long)]
    snapshot_interval: Option<u64>,

    /// Directory for snapshot files
    #[arg(long)]
    snapshot_dir: Option<PathBuf>,

    /// Serve the web viewer instead of running headless
    #[arg(long)]
    serve: bool,

    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(long, default_value_t = 8080)]
    port: u16,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let loader = ScenarioLoader::new(".");
    let scenario = loader.load(&cli.scenario)?;
    let turns = scenario.turns(cli.turns);

    let mut config = EngineConfig::from_scenario(&scenario);
    if let Some(interval) = cli.snapshot_interval {
        config.snapshot.interval = interval;
    }
    if let Some(dir) = cli.snapshot_dir {
        config = config.with_snapshot_dir(dir.display().to_string());
    }

    if cli.serve {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        return runtime.block_on(web::run(web::WebServerConfig {
            scenario,
            turns,
            engine: config,
            host: cli.host,
            port: cli.port,
        }));
    }

    let mut engine = Engine::from_scenario(&scenario, config)?;
    engine.run_with_hook(turns, |summary, _| {
        for defeat in &summary.defeated {
            println!("Turn {}: {} has been defeated!", summary.turn, defeat.name);
        }
    })?;

    let world = engine.world();
    println!(
        "Scenario '{}' finished after {} turns ({} simulated days).",
        scenario.name,
        engine.current_turn(),
        world.time_days()
    );
    for civ in world.active_civilizations() {
        println!("  {} holds {} tiles", civ.name(), civ.territory().len());
    }
    Ok(())
}
