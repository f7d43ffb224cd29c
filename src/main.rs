use anyhow::Result;
use clap::{Parser, Subcommand};
use slither::model::{ModelSummary, save_model};
use slither::trainer::policy_rng;
use slither::{Board, Dir, Hyperparams, QTable, State, Trainer};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "slither", version, about = "Snake grid world with a tabular Q-learning agent")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Train the agent, then evaluate it greedily and report
    Train {
        #[arg(long, default_value_t = 10)]
        grid: i32,
        #[arg(long, default_value_t = 20_000)]
        episodes: u32,
        #[arg(long, default_value_t = 0.6)]
        alpha: f32,
        #[arg(long, default_value_t = 0.85)]
        gamma: f32,
        #[arg(long, default_value_t = 0.9)]
        epsilon_start: f32,
        #[arg(long, default_value_t = 0.001)]
        epsilon_end: f32,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Write a flat-text model summary here after training
        #[arg(long)]
        save: Option<PathBuf>,
        /// Print the final report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Step the raw engine and print the board and head vision
    Run {
        #[arg(long, default_value_t = 10)]
        grid: i32,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        #[arg(long, default_value_t = 20)]
        steps: u32,
        /// Print a board snapshot per step as JSON instead of the vision cross
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Train {
            grid,
            episodes,
            alpha,
            gamma,
            epsilon_start,
            epsilon_end,
            seed,
            save,
            json,
        } => {
            let params = Hyperparams {
                grid,
                episodes,
                alpha,
                gamma,
                epsilon_start,
                epsilon_end,
                ..Default::default()
            };
            let mut trainer = Trainer::new(params.clone(), seed);
            let report = trainer.train();
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "trained {} episodes: best length {}, {} states seen, eval lengths {:?}",
                    report.episodes, report.best_length, report.states_seen, report.eval_lengths
                );
            }
            if let Some(path) = save {
                save_model(
                    &path,
                    &ModelSummary {
                        grid,
                        alpha: params.alpha,
                        gamma: params.gamma,
                        epsilon: report.final_epsilon,
                        qsize: report.states_seen,
                    },
                )?;
                println!("model summary written to {}", path.display());
            }
        }
        Command::Run {
            grid,
            seed,
            steps,
            json,
        } => {
            let mut board = Board::new(grid, seed);
            // An empty table makes the greedy policy a random walk, which is
            // enough to exercise the engine.
            let mut table = QTable::new();
            let mut rng = policy_rng(seed);
            for step in 0..steps {
                if board.game_over {
                    break;
                }
                let state = State::from_vision(&board.vision());
                let action = table.choose_action(state.pack(), 0.0, &mut rng);
                board.change_heading(Dir::ALL[action]);
                let outcome = board.step();
                if json {
                    println!("{}", serde_json::to_string(&board.snapshot())?);
                } else {
                    println!("step {step}: {outcome:?}");
                    for line in board.vision_lines() {
                        println!("{line}");
                    }
                    println!();
                }
            }
            println!(
                "finished with snake length {} (game over: {})",
                board.snake.len(),
                board.game_over
            );
        }
    }
    Ok(())
}
