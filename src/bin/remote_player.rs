//! Remote player: connects to a running `gridmatch --remote N` and plays
//! one team with random legal moves.

use anyhow::Result;
use clap::Parser;
use tracing::info;

use gridmatch::adapter::{serve_player, RemoteConfig};
use gridmatch::core::BoardSnapshot;
use gridmatch::engine::{MoveReply, Player, RandomPlayer};
use gridmatch::types::BotIndex;

#[derive(Parser, Debug)]
#[command(name = "remote-player")]
#[command(about = "Play one gridmatch team over TCP", long_about = None)]
struct Cli {
    /// Match host (overrides GRIDMATCH_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Match port (overrides GRIDMATCH_PORT)
    #[arg(long)]
    port: Option<u16>,

    #[arg(long, default_value = "7")]
    seed: u32,

    /// Hang up after this many moves
    #[arg(long)]
    max_moves: Option<u32>,
}

/// Hands moves from `inner` until the budget runs out, then drops out.
struct Budgeted<P> {
    inner: P,
    left: Option<u32>,
}

impl<P: Player> Player for Budgeted<P> {
    fn set_bot_ids(&mut self, ids: &[BotIndex]) {
        info!(?ids, "playing bots");
        self.inner.set_bot_ids(ids);
    }

    fn set_initial(&mut self, board: &BoardSnapshot) {
        self.inner.set_initial(board);
    }

    fn get_move(&mut self, bot: BotIndex, board: &BoardSnapshot) -> MoveReply {
        match self.left {
            Some(0) => MoveReply::Disconnected,
            Some(ref mut n) => {
                *n -= 1;
                self.inner.get_move(bot, board)
            }
            None => self.inner.get_move(bot, board),
        }
    }

    fn finish(&mut self) {
        info!("match over");
        self.inner.finish();
    }
}

fn main() -> Result<()> {
    gridmatch::init_tracing("info");
    let cli = Cli::parse();

    let mut config = RemoteConfig::from_env();
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }

    let player = Budgeted {
        inner: RandomPlayer::new(cli.seed),
        left: cli.max_moves,
    };
    let outcome = serve_player(config.socket_addr()?, player)?;
    println!("{outcome:?}");
    Ok(())
}
