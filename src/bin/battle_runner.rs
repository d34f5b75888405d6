//! Headless Battle Runner
//!
//! Runs seeded auto-resolved battles and prints aggregate results as JSON
//! or text. Useful for checking difficulty and loot tuning.

use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::Serialize;

use realm_combat::core::types::TierIndex;
use realm_combat::opponent::names::StaticNames;
use realm_combat::{
    Activity, BattleResolution, Catalog, CombatantSnapshot, Encounter, EngineConfig, LootPity,
    OpponentDescriptor, Outcome, RiskLevel,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ActivityArg {
    Ordinary,
    Lucky,
    SecretRealm,
    Faction,
    Boss,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RiskArg {
    Low,
    Medium,
    High,
    Extreme,
}

impl From<RiskArg> for RiskLevel {
    fn from(arg: RiskArg) -> Self {
        match arg {
            RiskArg::Low => RiskLevel::Low,
            RiskArg::Medium => RiskLevel::Medium,
            RiskArg::High => RiskLevel::High,
            RiskArg::Extreme => RiskLevel::Extreme,
        }
    }
}

/// Headless Battle Runner - seeded auto battles for balance checks
#[derive(Parser, Debug)]
#[command(name = "battle_runner")]
#[command(about = "Run seeded auto-resolved battles and report outcomes")]
struct Args {
    /// Player tier index on the ladder (0 = lowest)
    #[arg(long, default_value_t = 0)]
    tier: usize,

    /// Level inside the tier
    #[arg(long, default_value_t = 1)]
    level: u8,

    #[arg(long, value_enum, default_value = "ordinary")]
    activity: ActivityArg,

    /// Risk level for secret realm runs
    #[arg(long, value_enum, default_value = "low")]
    risk: RiskArg,

    /// Boss id for boss runs
    #[arg(long, default_value = "ashen_wyrm")]
    boss: String,

    /// First seed; battle i uses seed + i
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Number of battles
    #[arg(long, default_value_t = 100)]
    count: u64,

    /// Player snapshot as JSON; a tier-scaled default is used otherwise
    #[arg(long)]
    player: Option<PathBuf>,

    /// Engine tuning overrides as TOML
    #[arg(long)]
    config: Option<PathBuf>,

    /// Catalog TOML replacing the built-in content
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Print every resolution instead of only the summary
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// Aggregate over all runs
#[derive(Serialize)]
struct RunSummary {
    battles: usize,
    victories: usize,
    defeats: usize,
    win_rate: f64,
    mean_rounds: f64,
    round_cap_hits: usize,
    mean_hp_lost: f64,
    mean_loot: f64,
    total_exp: i64,
    total_currency: i64,
    first_seed: u64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("realm_combat=info".parse()?),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };
    config.validate()?;
    let catalog = match &args.catalog {
        Some(path) => Catalog::from_file(path)?,
        None => Catalog::builtin()?,
    };
    let player = match &args.player {
        Some(path) => load_player(path)?,
        None => default_player(&catalog, args.tier, args.level),
    };
    let activity = match args.activity {
        ActivityArg::Ordinary => Activity::Ordinary,
        ActivityArg::Lucky => Activity::Lucky,
        ActivityArg::SecretRealm => Activity::SecretRealm {
            risk: args.risk.into(),
            min_tier: None,
        },
        ActivityArg::Faction => Activity::FactionChallenge,
        ActivityArg::Boss => Activity::ApexBoss {
            boss_id: args.boss.clone(),
        },
    };

    tracing::info!(count = args.count, seed = args.seed, activity = ?activity, "starting runs");

    // Opponents are generated up front; the fights then run in parallel
    let runtime = tokio::runtime::Builder::new_current_thread().build()?;
    let encounter = Encounter::new(&config, &catalog, &StaticNames);
    let prepared: Vec<(ChaCha8Rng, OpponentDescriptor)> = runtime.block_on(async {
        let mut prepared = Vec::with_capacity(args.count as usize);
        for i in 0..args.count {
            let mut rng = ChaCha8Rng::seed_from_u64(args.seed.wrapping_add(i));
            let opponent = encounter.prepare(&player, &activity, &mut rng).await?;
            prepared.push((rng, opponent));
        }
        Ok::<_, realm_combat::CombatError>(prepared)
    })?;

    let resolutions: Vec<BattleResolution> = prepared
        .into_par_iter()
        .map(|(mut rng, opponent)| {
            let mut pity = LootPity::new();
            encounter.auto_resolve(&player, &opponent, &mut pity, &mut rng)
        })
        .collect();

    if args.verbose {
        for resolution in &resolutions {
            eprintln!("{}", resolution.summary);
        }
    }

    let summary = summarize(&resolutions, args.seed);
    match args.format.as_str() {
        "text" => print_text(&summary),
        "json" => println!("{}", serde_json::to_string_pretty(&summary)?),
        other => {
            eprintln!("Unknown format '{}', defaulting to json", other);
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }
    Ok(())
}

fn load_player(path: &Path) -> realm_combat::Result<CombatantSnapshot> {
    Ok(serde_json::from_str(&std::fs::read_to_string(path)?)?)
}

/// Stats for an average combatant of the given tier
fn default_player(catalog: &Catalog, tier: usize, level: u8) -> CombatantSnapshot {
    let tier = catalog.tiers.clamp(TierIndex(tier));
    let growth = 1.6_f64.powi(tier.0 as i32) * (1.0 + 0.1 * (level.max(1) - 1) as f64);
    let perception = catalog.tiers.get(tier).baseline_perception;
    CombatantSnapshot::new("Wanderer", tier, level.max(1)).with_stats(
        40.0 * growth,
        25.0 * growth,
        (400.0 * growth).round() as u32,
        15.0 * growth,
        perception,
    )
}

fn summarize(resolutions: &[BattleResolution], first_seed: u64) -> RunSummary {
    let battles = resolutions.len();
    let n = battles.max(1) as f64;
    let victories = resolutions.iter().filter(|r| r.victory).count();
    let defeats = resolutions
        .iter()
        .filter(|r| r.outcome == Outcome::Defeat)
        .count();
    RunSummary {
        battles,
        victories,
        defeats,
        win_rate: victories as f64 / n,
        mean_rounds: resolutions.iter().map(|r| r.rounds as f64).sum::<f64>() / n,
        round_cap_hits: resolutions.iter().filter(|r| r.hit_round_cap).count(),
        mean_hp_lost: resolutions.iter().map(|r| r.hp_lost as f64).sum::<f64>() / n,
        mean_loot: resolutions
            .iter()
            .map(|r| r.loot.as_ref().map_or(0, Vec::len) as f64)
            .sum::<f64>()
            / n,
        total_exp: resolutions.iter().map(|r| r.exp_change).sum(),
        total_currency: resolutions.iter().map(|r| r.currency_change).sum(),
        first_seed,
    }
}

fn print_text(summary: &RunSummary) {
    println!("Battle Runs");
    println!("===========");
    println!("Battles: {}", summary.battles);
    println!(
        "Victories: {} ({:.1}%)",
        summary.victories,
        summary.win_rate * 100.0
    );
    println!("Defeats: {}", summary.defeats);
    println!("Mean rounds: {:.2}", summary.mean_rounds);
    println!("Round cap hits: {}", summary.round_cap_hits);
    println!("Mean hp lost: {:.1}", summary.mean_hp_lost);
    println!("Mean loot items: {:.2}", summary.mean_loot);
    println!("Exp total: {}", summary.total_exp);
    println!("Currency total: {}", summary.total_currency);
    println!("First seed: {}", summary.first_seed);
}
