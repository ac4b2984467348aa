//! Empire AI - sandbox runner
//!
//! Drives several sandbox empires through the turn planner and prints what
//! each one ended up researching and prioritising.

use std::collections::BTreeSet;
use std::path::PathBuf;

use clap::Parser;
use rayon::prelude::*;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use empire_ai::core::error::Result;
use empire_ai::core::types::{Aggression, EmpireId, TechId};
use empire_ai::core::PlannerConfig;
use empire_ai::game::SandboxEmpire;
use empire_ai::priority::PriorityState;
use empire_ai::research::TechCatalog;
use empire_ai::{TickReport, TurnPlanner};

/// Aggression of empire `i` is `AGGRESSION_CYCLE[i % 3]`
const AGGRESSION_CYCLE: [Aggression; 3] = [Aggression::Typical, Aggression::Aggressive, Aggression::Cautious];

/// Empire AI sandbox runner
#[derive(Parser, Debug)]
#[command(name = "empire-ai")]
#[command(about = "Run sandbox empires through the priority scorer and research planner")]
struct Args {
    /// Planner config (TOML); built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Tech catalog (TOML)
    #[arg(long, default_value = "data/techs.toml")]
    techs: PathBuf,

    /// Turns to play
    #[arg(long, default_value_t = 100)]
    turns: u32,

    /// Number of empires, played in parallel
    #[arg(long, default_value_t = 3)]
    empires: u32,

    /// Seed for sandbox threat noise
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Print JSON instead of a text summary
    #[arg(long)]
    json: bool,
}

struct EmpireRun {
    planner: TurnPlanner,
    game: SandboxEmpire,
    reports: Vec<TickReport>,
}

impl EmpireRun {
    fn play(&mut self, turns: u32) {
        for _ in 0..turns {
            let report = self.planner.run_tick(&mut self.game);
            self.game.advance_turn();
            self.reports.push(report);
        }
    }

    fn summary(&self) -> RunSummary {
        let researched = self
            .game
            .tech_status
            .iter()
            .filter(|(_, status)| status.is_complete())
            .count();
        let fired_rules: BTreeSet<String> = self
            .reports
            .iter()
            .flat_map(|r| r.fired_rules.iter().cloned())
            .collect();

        RunSummary {
            empire: self.planner.empire(),
            aggression: self.game.aggression,
            turns: self.reports.len(),
            techs_researched: researched,
            orders: self.reports.iter().map(|r| r.orders().count()).sum(),
            warnings: self.reports.iter().map(|r| r.warnings.len()).sum(),
            fired_rules,
            priorities: *self.planner.priorities(),
            queue_head: self.planner.queue().techs().take(10).cloned().collect(),
        }
    }
}

#[derive(Serialize)]
struct RunSummary {
    empire: EmpireId,
    aggression: Aggression,
    turns: usize,
    techs_researched: usize,
    orders: usize,
    warnings: usize,
    fired_rules: BTreeSet<String>,
    priorities: PriorityState,
    queue_head: Vec<TechId>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("empire_ai=info")))
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => PlannerConfig::load(path)?,
        None => PlannerConfig::default(),
    };
    let catalog = TechCatalog::load(&args.techs)?;
    tracing::info!(techs = catalog.len(), empires = args.empires, turns = args.turns, "starting run");

    let mut runs = (0..args.empires)
        .map(|i| {
            let empire = EmpireId(i);
            let aggression = AGGRESSION_CYCLE[i as usize % AGGRESSION_CYCLE.len()];
            Ok(EmpireRun {
                planner: TurnPlanner::new(config.clone(), catalog.clone(), empire, aggression)?,
                game: SandboxEmpire::demo(empire, aggression, catalog.clone(), args.seed),
                reports: Vec::new(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    runs.par_iter_mut().for_each(|run| run.play(args.turns));

    let summaries: Vec<RunSummary> = runs.iter().map(EmpireRun::summary).collect();
    if args.json {
        match serde_json::to_string_pretty(&summaries) {
            Ok(json) => println!("{json}"),
            Err(e) => tracing::error!("failed to serialize summaries: {e}"),
        }
        return Ok(());
    }

    for summary in &summaries {
        println!(
            "=== Empire {} ({}) after {} turns ===",
            summary.empire, summary.aggression, summary.turns
        );
        println!(
            "  researched {} techs, {} queue orders, {} warnings",
            summary.techs_researched, summary.orders, summary.warnings
        );
        let rules: Vec<&str> = summary.fired_rules.iter().map(String::as_str).collect();
        println!("  rules fired: {}", if rules.is_empty() { "none".to_string() } else { rules.join(", ") });
        println!("  priorities:");
        for (domain, score) in summary.priorities.iter() {
            println!("    {:<16} {score:>8.1}", domain.to_string());
        }
        let head: Vec<&str> = summary.queue_head.iter().map(TechId::as_str).collect();
        println!("  queue head: {}", head.join(" > "));
        println!();
    }

    Ok(())
}
