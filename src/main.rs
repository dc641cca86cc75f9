use chrono::Local;
use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use duel_elo::constants::*;
use duel_elo::elo::{EloConfig, Rounding};
use duel_elo::pairing::{self, Pairing};
use duel_elo::record::ResultCode;
use duel_elo::stats::{Stats, Summary};
use log::info;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about = "Elo ratings and scores for pairs of players")]
struct Cli {
    /// Directory holding one match log per pairing
    #[arg(long, env = "DUEL_GAMES_DIR", default_value = GAMES_DIR, global = true)]
    games_dir: PathBuf,

    #[arg(long, default_value_t = K_FACTOR, global = true)]
    k_factor: f64,

    #[arg(long, default_value_t = INITIAL_ELO, global = true)]
    initial_elo: f64,

    /// Round ratings after every match, as older versions did
    #[arg(long, global = true)]
    legacy_rounding: bool,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start tracking a new pair of players
    AddPairing { p1: String, p2: String },
    /// Record a result: A (first player by name wins), B, or remis
    Record {
        p1: String,
        p2: String,
        result: ResultCode,
    },
    /// Write the home page and one ratings page per pairing
    Render {
        #[arg(long, env = "DUEL_SITE_DIR", default_value = SITE_DIR)]
        out: PathBuf,
    },
    /// Print the ratings and scores of one pairing as JSON
    Show { p1: String, p2: String },
}

impl Cli {
    fn elo_config(&self) -> Result<EloConfig> {
        let rounding = if self.legacy_rounding {
            Rounding::PerMatch
        } else {
            Rounding::Accumulate
        };
        Ok(EloConfig::new(self.initial_elo, self.k_factor, rounding)?)
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    let config = cli.elo_config()?;
    let today = Local::now().date_naive();

    match &cli.command {
        Command::AddPairing { p1, p2 } => {
            let p = Pairing::new(p1, p2)?;
            pairing::add_pairing(&cli.games_dir, &p)?;
        }
        Command::Record { p1, p2, result } => {
            let p = Pairing::new(p1, p2)?;
            pairing::record_result(&cli.games_dir, &p, *result, Local::now().naive_local())?;
            let history = pairing::load(&cli.games_dir, &p)?;
            let s = Summary::new(&p, &history, &config, today);
            info!("{} {} : {} {}", s.a, s.a_elo, s.b_elo, s.b);
        }
        Command::Render { out } => {
            let stats = Stats::load(&cli.games_dir, &config, today)?;
            stats.save(out)?;
        }
        Command::Show { p1, p2 } => {
            let p = Pairing::new(p1, p2)?;
            let history = pairing::load(&cli.games_dir, &p)?;
            let s = Summary::new(&p, &history, &config, today);
            println!("{}", serde_json::to_string_pretty(&s)?);
        }
    }

    Ok(())
}
