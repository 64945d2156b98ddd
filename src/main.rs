//! Match runner (default binary).
//!
//! Plays one match on a grid layout. Teams are either local random players
//! or remote players that connect over TCP (see the `remote-player` binary).

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing::info;

use gridmatch::adapter::{JsonLinesObserver, RemoteConfig, RemotePlayer};
use gridmatch::core::{GridBoard, DEFAULT_LAYOUT};
use gridmatch::engine::{FinishReason, GameMaster, MatchConfig, RandomPlayer, TracingObserver};

/// Run a gridmatch match
#[derive(Parser, Debug)]
#[command(name = "gridmatch")]
#[command(about = "Turn-based multi-agent grid match", long_about = None)]
#[command(version)]
struct Cli {
    /// Number of rounds (overrides GRIDMATCH_GAME_TIME)
    #[arg(long)]
    game_time: Option<u32>,

    /// Fallback RNG seed (overrides GRIDMATCH_SEED)
    #[arg(long)]
    seed: Option<u32>,

    /// Layout file (overrides GRIDMATCH_LAYOUT); built-in maze if neither is set
    #[arg(long)]
    layout: Option<PathBuf>,

    /// Number of teams
    #[arg(long, default_value = "2")]
    teams: usize,

    /// How many teams are played by remote players; the rest play randomly
    #[arg(long, default_value = "0")]
    remote: usize,

    /// Address to listen on for remote players
    #[arg(long)]
    host: Option<String>,

    #[arg(long)]
    port: Option<u16>,

    /// Per-move budget for remote players in milliseconds
    #[arg(long)]
    move_timeout_ms: Option<u64>,

    /// Write a JSON-lines record of the match to this file
    #[arg(long)]
    record: Option<PathBuf>,
}

fn main() -> Result<()> {
    gridmatch::init_tracing("info");
    let cli = Cli::parse();

    let mut config = MatchConfig::from_env();
    if let Some(game_time) = cli.game_time {
        config.game_time = game_time;
    }
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if let Some(layout) = &cli.layout {
        config.layout_path = Some(layout.display().to_string());
    }

    let mut remote = RemoteConfig::from_env();
    if let Some(host) = cli.host.clone() {
        remote.host = host;
    }
    if let Some(port) = cli.port {
        remote.port = port;
    }
    if let Some(ms) = cli.move_timeout_ms {
        remote.move_timeout = Duration::from_millis(ms);
    }

    let layout_text = match &config.layout_path {
        Some(path) => fs::read_to_string(path).with_context(|| format!("read layout {path}"))?,
        None => DEFAULT_LAYOUT.to_string(),
    };
    let board = GridBoard::from_layout_str(&layout_text, cli.teams).context("build board")?;

    let mut gm = GameMaster::from_config(board, &config);
    gm.register_observer(Box::new(TracingObserver))?;
    if let Some(path) = &cli.record {
        let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
        gm.register_observer(Box::new(JsonLinesObserver::new(BufWriter::new(file))))?;
    }

    let listener = if cli.remote > 0 {
        let listener = remote.bind()?;
        info!(addr = %listener.local_addr()?, players = cli.remote, "waiting for remote players");
        Some(listener)
    } else {
        None
    };

    for team in 0..cli.teams {
        match &listener {
            Some(listener) if team < cli.remote => {
                let player = RemotePlayer::accept(listener, remote.move_timeout)?;
                info!(team, peer = %player.peer(), "remote player joined");
                gm.register_player(Box::new(player))?;
            }
            _ => {
                let seed = config.seed.wrapping_add(team as u32 + 1);
                gm.register_player(Box::new(RandomPlayer::new(seed)))?;
            }
        }
    }

    let reason = gm.play().map_err(|err| {
        let stage = if err.is_setup_error() { "setting up" } else { "playing" };
        anyhow!("{stage} the match failed [{}]: {err}", err.code())
    })?;
    match reason {
        FinishReason::TeamWon(team) => println!("team {team} wins in round {}", gm.next_round()),
        FinishReason::RoundsExhausted => println!("no winner after {} rounds", gm.game_time()),
        FinishReason::Aborted => println!("match aborted"),
    }
    Ok(())
}
