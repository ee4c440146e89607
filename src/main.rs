//! Play tic-tac-toe against the computer on the terminal.
#![deny(
    clippy::all,
    clippy::nursery,
    clippy::must_use_candidate,
    // clippy::restriction,
    // clippy::pedantic
)]
// now allow a few rules which are denied by the above statement
#![allow(clippy::redundant_pub_crate)]
#![deny(missing_debug_implementations)]
#![deny(rustdoc::all)]

use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, BufRead, Write};
use tictactoe_rs::{Move, Player, Position, SearchResult, best_move, best_move_parallel};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Side of the game.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Side {
    X,
    O,
}

impl From<Side> for Player {
    fn from(side: Side) -> Self {
        match side {
            Side::X => Self::X,
            Side::O => Self::O,
        }
    }
}

/// Tic-tac-toe against a computer that never loses.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Side played by the computer. X always moves first.
    #[arg(long, value_enum, default_value_t = Side::O)]
    computer: Side,

    /// Search the top-level moves on all cores.
    #[arg(long)]
    parallel: bool,
}

fn print_board(position: &Position) {
    let rows = position.rows();
    for (row_id, row) in rows.iter().enumerate() {
        let symbols: Vec<String> = row
            .iter()
            .map(|cell| match cell {
                None => " ".to_string(),
                Some(player) => player.to_string(),
            })
            .collect();
        println!(" {} ", symbols.join(" | "));
        if row_id + 1 < rows.len() {
            println!("---+---+---");
        }
    }
}

/// Reads the next human move, 1-based. Returns `None` on end of input.
fn read_move(position: &Position, input: &mut impl BufRead) -> Result<Option<Move>> {
    loop {
        {
            print!("Choose your move (row col): ");
            for mv in position.empty_cells() {
                print!("{} {},", mv.row + 1, mv.col + 1);
            }
            println!();
            io::stdout().flush()?;
        }

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        let mv = match line.trim().parse::<Move>() {
            // adapt to index
            Ok(mv) if mv.row > 0 && mv.col > 0 => Move::new(mv.row - 1, mv.col - 1),
            Ok(_) => {
                println!("Rows and columns start at 1.");
                continue;
            }
            Err(e) => {
                println!("{e}");
                continue;
            }
        };

        if position.legal_moves().contains(&mv) {
            return Ok(Some(mv));
        }
        println!("Field {} {} is not available.", mv.row + 1, mv.col + 1);
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let computer = Player::from(cli.computer);
    info!(%computer, parallel = cli.parallel, "starting game");

    let mut position = Position::new();
    let mut stdin = io::stdin().lock();

    println!("Let's play tic-tac-toe against the computer.");
    while !position.is_terminal() {
        println!("----------------");
        print_board(&position);
        println!();

        let current_player = position.player_to_move();

        // Computer player
        let mv = if current_player == computer {
            let SearchResult {
                best_move: choice,
                utility,
            } = if cli.parallel {
                best_move_parallel(&position)
            } else {
                best_move(&position)
            };
            let Some(mv) = choice else {
                break;
            };
            debug!(%mv, utility, "computer move");
            println!("Computer chose {} {}", mv.row + 1, mv.col + 1);
            mv
        }
        // Human player
        else {
            let Some(mv) = read_move(&position, &mut stdin)? else {
                println!("Bye.");
                return Ok(());
            };
            mv
        };

        position = position.apply_move(mv)?;
    }

    println!("----------------");
    print_board(&position);
    match position.winner() {
        Some(player) if player == computer => println!("Computer won!"),
        Some(_) => println!("You won!"),
        None => println!("Gameover: draw"),
    }

    Ok(())
}
