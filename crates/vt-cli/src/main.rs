//! villager-trades command-line front end
//!
//! Loads a trade definition file, answers eligibility questions and drives
//! the trade hooks against a ledger file, the way a server would.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use strum::IntoEnumIterator;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vt_core::{
    AcquireOutcome, InstanceTradeLedger, Level, Merchant, Profession, TradeDefinition,
    TradeOptions, TradeRng, TradeService, VanillaOffer, VillagerId, VillagerType,
};
use vt_save::{FileLedger, default_ledger_path};

/// Custom villager trades
#[derive(Parser, Debug)]
#[command(name = "villager-trades")]
#[command(author, version, about = "Inspect and roll custom villager trades", long_about = None)]
struct Args {
    /// Options file (rc style)
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Trade definition file, overrides the options file
    #[arg(short = 't', long = "trades")]
    trades: Option<PathBuf>,

    /// Ledger file
    #[arg(short = 'l', long = "ledger")]
    ledger: Option<PathBuf>,

    /// Seed for reproducible picks
    #[arg(short = 's', long = "seed")]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

/// Villager state shared by the commands that pick trades
#[derive(clap::Args, Debug)]
struct VillagerArgs {
    /// Villager id (entity UUID)
    #[arg(short = 'v', long = "villager")]
    villager: String,

    #[command(flatten)]
    slot: SlotArgs,
}

#[derive(clap::Args, Debug)]
struct SlotArgs {
    /// Profession, e.g. FARMER
    #[arg(short = 'p', long = "profession")]
    profession: Profession,

    /// Villager type, e.g. PLAINS
    #[arg(short = 'y', long = "type", default_value = "PLAINS")]
    villager_type: VillagerType,

    /// Villager level (1..=5)
    #[arg(short = 'L', long = "level", default_value_t = 1)]
    level: Level,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load the definition file and report rejected records
    Check,

    /// List the trades eligible for a profession, type and level
    Eligible(SlotArgs),

    /// Acquire one trade for a villager and record it
    Pick {
        #[command(flatten)]
        villager: VillagerArgs,

        /// The vanilla offer is a filled explorer map
        #[arg(long = "map")]
        map: bool,
    },

    /// Regenerate a villager's offers from scratch
    Reroll {
        #[command(flatten)]
        villager: VillagerArgs,

        /// Offers the villager currently holds
        #[arg(short = 'o', long = "offers", default_value_t = 1)]
        offers: usize,
    },

    /// Forget every trade granted to a villager
    Reset {
        /// Villager id (entity UUID)
        #[arg(short = 'v', long = "villager")]
        villager: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vt_core=info,vt_save=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let options = load_options(&args)?;

    match &args.command {
        Command::Check => run_check(options),
        Command::Eligible(slot) => run_eligible(options, slot),
        Command::Pick { villager, map } => run_pick(&args, options, villager, *map),
        Command::Reroll { villager, offers } => run_reroll(&args, options, villager, *offers),
        Command::Reset { villager } => run_reset(&args, villager),
    }
}

fn load_options(args: &Args) -> Result<TradeOptions> {
    let mut options = match &args.config {
        Some(path) => TradeOptions::load_from_file(path)
            .with_context(|| format!("reading options from {}", path.display()))?,
        None => TradeOptions::default(),
    };
    if let Some(trades) = &args.trades {
        options.trades = trades.clone();
    }
    tracing::debug!(
        trades = %options.trades.display(),
        custom_trades = options.custom_trades,
        "Resolved options"
    );
    Ok(options)
}

fn load_service(options: TradeOptions) -> Result<TradeService> {
    let path = options.trades.clone();
    TradeService::load(options).with_context(|| format!("loading trades from {}", path.display()))
}

fn open_ledger(args: &Args) -> Result<FileLedger> {
    let path = args
        .ledger
        .clone()
        .unwrap_or_else(|| default_ledger_path("default"));
    FileLedger::open(&path).with_context(|| format!("opening ledger {}", path.display()))
}

fn make_rng(args: &Args) -> TradeRng {
    match args.seed {
        Some(seed) => TradeRng::new(seed),
        None => TradeRng::from_entropy(),
    }
}

/// Line telling the user how to replay an entropy-seeded roll
fn replay_hint(args: &Args, rng: &TradeRng) -> Option<String> {
    match args.seed {
        Some(_) => None,
        None => Some(format!("Seed {} (pass --seed {} to replay)", rng.seed(), rng.seed())),
    }
}

fn merchant(args: &VillagerArgs, offer_count: usize) -> Merchant {
    let mut merchant = Merchant::villager(
        args.villager.as_str(),
        args.slot.profession,
        args.slot.villager_type,
        args.slot.level,
    );
    merchant.offer_count = offer_count;
    merchant
}

fn describe(trade: &TradeDefinition) -> String {
    let ingredients: Vec<String> = trade
        .ingredients()
        .iter()
        .map(|i| format!("{} x{}", i.material, i.amount))
        .collect();
    format!(
        "{:<24} {} x{} for {}",
        trade.id(),
        trade.outcome().material,
        trade.outcome().amount,
        ingredients.join(" + ")
    )
}

fn run_check(options: TradeOptions) -> Result<()> {
    let service = load_service(options)?;
    let report = service.report();
    let catalog = service.catalog();

    println!("Loaded {} / {} custom trades", report.loaded, report.total);
    for failure in &report.failures {
        println!(
            "  record {:>3} {:<24} {}",
            failure.index,
            failure.id.as_deref().unwrap_or("<none>"),
            failure.error
        );
    }

    println!();
    println!("{:<16} {:>6}", "Profession", "Trades");
    println!("{:-<23}", "");
    for profession in Profession::trading() {
        let count = catalog.profession_bucket(profession).map_or(0, |b| b.len());
        println!("{:<16} {:>6}", profession, count);
    }

    println!();
    println!("{:<16} {:>6}", "Villager type", "Trades");
    println!("{:-<23}", "");
    for villager_type in VillagerType::iter() {
        let count = catalog.sub_type_bucket(villager_type).map_or(0, |b| b.len());
        println!("{:<16} {:>6}", villager_type, count);
    }

    Ok(())
}

fn run_eligible(options: TradeOptions, slot: &SlotArgs) -> Result<()> {
    let service = load_service(options)?;
    let catalog = service.catalog();

    let mut eligible: Vec<&TradeDefinition> = catalog
        .lookup_eligible(slot.profession, slot.villager_type, slot.level)
        .into_iter()
        .filter_map(|id| catalog.get(id.as_str()))
        .collect();
    eligible.sort_by(|a, b| a.id().cmp(b.id()));

    if eligible.is_empty() {
        println!(
            "No trades for {} {} at level {}",
            slot.villager_type, slot.profession, slot.level
        );
    }
    for trade in eligible {
        println!("{}", describe(trade));
    }
    Ok(())
}

fn run_pick(args: &Args, options: TradeOptions, villager: &VillagerArgs, map: bool) -> Result<()> {
    let service = load_service(options)?;
    let mut ledger = open_ledger(args)?;
    let mut rng = make_rng(args);

    let merchant = merchant(villager, 0);
    let offer = VanillaOffer {
        result_is_filled_map: map,
    };
    match service.acquire_trade(&mut ledger, &merchant, offer, &mut rng) {
        AcquireOutcome::Replace(trade) => println!("{}", describe(trade)),
        AcquireOutcome::KeepVanilla => println!("Keeping the vanilla offer"),
        AcquireOutcome::Cancel => println!("No trade available, offer cancelled"),
    }
    if let Some(hint) = replay_hint(args, &rng) {
        println!("{}", hint);
    }

    ledger.flush().context("writing ledger")?;
    Ok(())
}

fn run_reroll(
    args: &Args,
    options: TradeOptions,
    villager: &VillagerArgs,
    offers: usize,
) -> Result<()> {
    let service = load_service(options)?;
    let mut ledger = open_ledger(args)?;
    let mut rng = make_rng(args);

    let merchant = merchant(villager, offers);
    let result = service.manual_reroll(&mut ledger, &merchant, &mut rng);
    // The ledger is cleared even when the reroll is refused.
    ledger.flush().context("writing ledger")?;

    let rolled = result?;
    println!("Rerolled {} offers for {}", rolled.len(), merchant.id);
    for trade in rolled {
        println!("{}", describe(trade));
    }
    if let Some(hint) = replay_hint(args, &rng) {
        println!("{}", hint);
    }
    Ok(())
}

fn run_reset(args: &Args, villager: &str) -> Result<()> {
    let mut ledger = open_ledger(args)?;
    let villager = VillagerId::new(villager);
    let count = ledger.granted(&villager).len();

    ledger.clear(&villager);
    ledger.flush().context("writing ledger")?;
    println!("Cleared {} granted trades for {}", count, villager);
    Ok(())
}
