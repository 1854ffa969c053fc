use std::env;
use std::time::Duration;

use anyhow::{bail, Context};
use connect_four_engine::{
    Algorithm, Column, DispatchResult, Dispatcher, DispatcherConfig, Game, GameEndState,
    GameState, RandomBot,
};
use futures::StreamExt;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio_stream::wrappers::UnboundedReceiverStream;

#[allow(unused_imports)]
use log::{debug, error, info, trace, warn};

const MOVE_TIMEOUT: Duration = Duration::from_secs(30);

struct Match {
    game: Game,
    opponent: RandomBot,
}

/// Usage: self-play [GAMES] [SEED]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args: Vec<String> = env::args().collect();
    let games: usize = match args.get(1) {
        Some(arg) => arg.parse().context("GAMES must be a number")?,
        None => 4,
    };
    let seed: u64 = match args.get(2) {
        Some(arg) => arg.parse().context("SEED must be a number")?,
        None => 0,
    };
    if games == 0 {
        bail!("Nothing to play, GAMES is 0");
    }

    let dispatcher = Dispatcher::new(DispatcherConfig::from_env());
    info!(
        "Playing {} games, engine depth {} as {}",
        games,
        dispatcher.config().search_depth,
        dispatcher.config().computer_side
    );

    let (sender, receiver) = mpsc::unbounded_channel();
    let mut results = UnboundedReceiverStream::new(receiver);
    let mut matches: Vec<Match> = (0..games)
        .map(|idx| Match {
            game: Game::new(),
            opponent: RandomBot::seeded(seed.wrapping_add(idx as u64)),
        })
        .collect();

    let mut running = 0;
    for (idx, entry) in matches.iter_mut().enumerate() {
        if opponent_turn(entry)? {
            request_engine_move(&dispatcher, idx, &entry.game, &sender);
            running += 1;
        }
    }

    let mut ticker = tokio::time::interval(Duration::from_millis(50));
    let mut idle_ticks = 0u64;
    while running > 0 {
        tokio::select! {
            message = results.next() => {
                let Some((idx, result)) = message else { break };
                let entry = &mut matches[idx];
                let column = engine_column(&entry.game, &result)?;
                debug!("Game {} engine plays {}", idx, column);
                entry.game.execute_move(column)?;
                if !entry.game.game_ended() && opponent_turn(entry)? {
                    request_engine_move(&dispatcher, idx, &entry.game, &sender);
                } else {
                    running -= 1;
                }
            }
            _ = ticker.tick() => idle_ticks += 1,
        }
    }
    info!("Control loop ticked {} times while engines were thinking", idle_ticks);

    for (idx, entry) in matches.iter().enumerate() {
        let verdict = match entry.game.state() {
            GameState::Finished(GameEndState::Win { side, line }) => {
                format!("{side} wins along {line:?}")
            }
            GameState::Finished(GameEndState::Draw) => "draw".to_string(),
            GameState::PlayerMove(side) => format!("unfinished, {side} to move"),
        };
        println!("Game {idx}: {verdict} after {} moves", entry.game.history().len());
        println!("{}\n", entry.game.board());
    }
    Ok(())
}

/// Random side moves. Returns true when the engine should answer.
fn opponent_turn(entry: &mut Match) -> anyhow::Result<bool> {
    if entry.game.game_ended() {
        return Ok(false);
    }
    let column = entry.opponent.solve(entry.game.board())?;
    entry.game.execute_move(column)?;
    Ok(!entry.game.game_ended())
}

fn request_engine_move(
    dispatcher: &Dispatcher,
    idx: usize,
    game: &Game,
    sender: &UnboundedSender<(usize, DispatchResult)>,
) {
    let pending = dispatcher.dispatch(game.search_task());
    let sender = sender.clone();
    tokio::spawn(async move {
        let result = match tokio::time::timeout(MOVE_TIMEOUT, pending).await {
            Ok(result) => result,
            Err(_) => DispatchResult::Error("engine timed out".to_string()),
        };
        if sender.send((idx, result)).is_err() {
            warn!("Control loop is gone, dropping result for game {}", idx);
        }
    });
}

/// Falls back to the first open column when the engine produced no move.
fn engine_column(game: &Game, result: &DispatchResult) -> anyhow::Result<Column> {
    if let Some(column) = result.column() {
        return Ok(column);
    }
    warn!(
        "Engine gave no move ({}), using fallback",
        result.error().unwrap_or("unexpected payload")
    );
    game.board()
        .legal_moves()
        .first()
        .copied()
        .context("No legal moves left")
}
