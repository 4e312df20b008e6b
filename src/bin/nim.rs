use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;

use nim_solver::game::{describe_computer_move, parse_move, render, Game, Phase, Player};
use nim_solver::search::WIN;
use nim_solver::{parse_piles, GameState, Solver, SolverConfig};

#[derive(Parser)]
#[command(name = "nim")]
#[command(version, about = "Last-stone-wins Nim against a minimax opponent", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play an interactive game in the terminal
    Play(PlayArgs),

    /// Print the optimal move for a pile configuration
    Solve(SolveArgs),
}

#[derive(Args)]
struct SolverArgs {
    /// Disable the outcome cache
    #[arg(long)]
    no_memo: bool,

    /// Score root moves in parallel
    #[arg(long)]
    parallel: bool,
}

impl SolverArgs {
    fn config(&self) -> SolverConfig {
        SolverConfig {
            memoize: !self.no_memo,
            parallel: self.parallel,
        }
    }
}

#[derive(Args)]
struct PlayArgs {
    /// Initial piles, e.g. "1,3,4,5"
    #[arg(long, default_value = "1,3,4,5", value_parser = parse_piles)]
    piles: GameState,

    /// Let the computer make the first move
    #[arg(long)]
    computer_first: bool,

    #[command(flatten)]
    solver: SolverArgs,
}

#[derive(Args)]
struct SolveArgs {
    /// Pile configuration, e.g. "1,3,4,5"
    #[arg(value_parser = parse_piles)]
    piles: GameState,

    #[command(flatten)]
    solver: SolverArgs,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Play(args) => play(args),
        Commands::Solve(args) => solve(args),
    }
}

fn solve(args: SolveArgs) -> Result<()> {
    let state = args.piles;
    if state.is_terminal() {
        println!("{state} is terminal: the side to move has lost");
        return Ok(());
    }
    let solver = Solver::new(args.solver.config());
    let best = solver.best_move(&state)?;
    let value = solver.value(&state, true)?;
    println!("piles:     {state}");
    println!("best move: {best}");
    println!(
        "value:     {value:+} ({})",
        if value == WIN { "win" } else { "loss" }
    );
    println!("nim-sum:   {}", state.nim_sum());
    info!(
        "{} nodes visited, {} cached positions",
        solver.nodes_visited(),
        solver.cache_size()
    );
    Ok(())
}

fn play(args: PlayArgs) -> Result<()> {
    let first = if args.computer_first {
        Player::Computer
    } else {
        Player::Human
    };
    let mut game = Game::with_first(args.piles, Solver::new(args.solver.config()), first);
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    println!("Take one or more stones from a single pile. Whoever takes the last stone wins.");
    println!("Enter '<pile> <stones>', 'reset' or 'quit'.\n");
    println!("{}", render(game.state()));
    announce_winner(&game);

    loop {
        if game.phase() == Phase::AwaitingComputer {
            let m = game.computer_move().context("computer move failed")?;
            println!("\n{}", describe_computer_move(m));
            println!("{}", render(game.state()));
            announce_winner(&game);
            continue;
        }

        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else { break };
        let line = line?;
        let words: Vec<&str> = line.split_whitespace().collect();

        match words.as_slice() {
            [] => continue,
            ["quit"] | ["q"] => break,
            ["reset"] => {
                game.reset();
                println!("{}", render(game.state()));
                announce_winner(&game);
            }
            _ if game.winner().is_some() => println!("The game is over. Type 'reset' or 'quit'."),
            [pile, count] => match parse_move(pile, count, game.state())
                .and_then(|m| game.human_move(m))
            {
                Ok(_) => {
                    println!("{}", render(game.state()));
                    announce_winner(&game);
                }
                Err(e) if e.is_user_error() => println!("Error: {e}. Try again."),
                Err(e) => return Err(e.into()),
            },
            _ => println!("Expected two numbers: a pile and a stone count."),
        }
    }
    Ok(())
}

fn announce_winner(game: &Game) {
    match game.winner() {
        Some(Player::Human) => println!("\nCongratulations, you won! Type 'reset' to play again."),
        Some(Player::Computer) => println!("\nThe computer won. Type 'reset' to play again."),
        None => {}
    }
}
