//! Self-play record generation and baseline evaluation for the reversi engine.
//!
//! Generates Othello games with the MCTS player and saves them in
//! MessagePack format for an external training pipeline. Also plays
//! evaluation matches against an alpha-beta minimax baseline.

mod minimax;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use minimax::MinimaxPlayer;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use reversi_core::Game;
use reversi_mcts::{
    Evaluator, MctsConfig, MctsPlayer, RolloutEvaluator, SearchResult, UniformEvaluator,
};
use reversi_othello::{Action, Board, GameResult, Othello, Player};
use reversi_policy::{HeuristicEvaluator, LinearEvaluator, LinearModel};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Instant;
use tracing::{debug, info};

/// Shared evaluator handed to every game.
type DynEvaluator = dyn Evaluator<Othello> + Send + Sync;

/// Othello self-play and evaluation tool.
#[derive(Parser)]
#[command(name = "reversi-selfplay")]
#[command(about = "Generate self-play games and evaluate the MCTS player")]
struct Cli {
    /// Log filter used when RUST_LOG is not set.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate self-play games for training.
    Generate {
        /// Number of games to generate.
        #[arg(short, long, default_value = "10")]
        games: usize,

        /// Output directory for game files.
        #[arg(short, long, default_value = "data/games")]
        output: PathBuf,

        #[command(flatten)]
        search: SearchArgs,
    },

    /// Play the MCTS player against a minimax baseline.
    Evaluate {
        /// Number of games to play.
        #[arg(short, long, default_value = "20")]
        games: usize,

        /// Minimax search depth.
        #[arg(short, long, default_value = "3")]
        depth: usize,

        #[command(flatten)]
        search: SearchArgs,
    },
}

/// Options shared by both subcommands.
#[derive(Args, Clone, Debug)]
struct SearchArgs {
    /// Board dimension (even, 4 to 10).
    #[arg(long, default_value = "8")]
    size: usize,

    /// TOML file with MCTS settings; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of MCTS simulations per move.
    #[arg(short, long)]
    simulations: Option<usize>,

    /// Temperature for move selection (1.0 = proportional to visit counts).
    #[arg(short, long)]
    temperature: Option<f32>,

    /// Move number from which the temperature drops to 0 (greedy).
    #[arg(long)]
    temperature_drop: Option<usize>,

    /// Position evaluator: uniform, rollout, heuristic or linear:<path>.
    #[arg(short, long, default_value = "rollout")]
    evaluator: EvaluatorKind,

    /// Maximum rollout depth for the rollout evaluator.
    #[arg(long, default_value = "200")]
    rollout_depth: usize,

    /// Random seed for reproducibility.
    #[arg(long, default_value = "42")]
    seed: u64,
}

impl SearchArgs {
    /// Start from the config file (or `base`), then apply flag overrides.
    fn mcts_config(&self, base: MctsConfig) -> Result<MctsConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => base,
        };
        if let Some(simulations) = self.simulations {
            config.num_simulations = simulations;
        }
        if let Some(temperature) = self.temperature {
            config.temperature = temperature;
        }
        if let Some(drop) = self.temperature_drop {
            config.temperature_drop_move = drop;
        }
        config.validate()?;
        Ok(config)
    }

    fn game(&self) -> Result<Othello> {
        Othello::new(self.size).with_context(|| format!("Unsupported board size {}", self.size))
    }
}

/// Load MCTS settings from a TOML file. Missing keys keep their defaults.
fn load_config(path: &Path) -> Result<MctsConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config: MctsConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config {}", path.display()))?;
    info!("Loaded MCTS config from {}", path.display());
    Ok(config)
}

/// Which evaluator the search runs with.
#[derive(Clone, Debug, PartialEq, Eq)]
enum EvaluatorKind {
    Uniform,
    Rollout,
    Heuristic,
    Linear(PathBuf),
}

impl FromStr for EvaluatorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uniform" => Ok(Self::Uniform),
            "rollout" => Ok(Self::Rollout),
            "heuristic" => Ok(Self::Heuristic),
            _ => match s.strip_prefix("linear:") {
                Some(path) if !path.is_empty() => Ok(Self::Linear(PathBuf::from(path))),
                _ => Err(format!(
                    "unknown evaluator '{}' (expected uniform, rollout, heuristic or linear:<path>)",
                    s
                )),
            },
        }
    }
}

impl fmt::Display for EvaluatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uniform => write!(f, "uniform"),
            Self::Rollout => write!(f, "rollout"),
            Self::Heuristic => write!(f, "heuristic"),
            Self::Linear(path) => write!(f, "linear:{}", path.display()),
        }
    }
}

impl EvaluatorKind {
    fn build(&self, seed: u64, rollout_depth: usize) -> Result<Box<DynEvaluator>> {
        Ok(match self {
            Self::Uniform => Box::new(UniformEvaluator),
            Self::Rollout => Box::new(RolloutEvaluator::new(seed, rollout_depth)),
            Self::Heuristic => Box::new(HeuristicEvaluator::new()),
            Self::Linear(path) => {
                let model = LinearModel::load(path)?;
                Box::new(LinearEvaluator::new(model)?)
            }
        })
    }
}

/// A single decision in a game trajectory.
#[derive(Serialize, Deserialize, Debug)]
struct GameStep {
    /// Observation planes for the side to move (2 × N² floats).
    observation: Vec<f32>,

    /// Chosen action index (cells, then pass at N²).
    action: u16,

    /// MCTS visit distribution as a sparse map: {action_index: probability}.
    mcts_policy: HashMap<u16, f32>,

    /// Root value estimate for the side to move.
    root_value: f32,
}

/// A complete game trajectory.
#[derive(Serialize, Deserialize, Debug)]
struct GameRecord {
    /// Sequence of decisions, passes included.
    steps: Vec<GameStep>,

    /// Game outcome: +1 (Black wins), -1 (White wins), 0 (tie).
    outcome: f32,

    /// Optional metadata.
    metadata: HashMap<String, serde_json::Value>,
}

/// Evaluation results.
#[derive(Debug, Default, PartialEq, Eq)]
struct EvaluationResult {
    mcts_wins: usize,
    minimax_wins: usize,
    ties: usize,
    total_games: usize,
}

impl EvaluationResult {
    fn record(&mut self, winner: Option<Player>, mcts_side: Player) {
        match winner {
            Some(player) if player == mcts_side => self.mcts_wins += 1,
            Some(_) => self.minimax_wins += 1,
            None => self.ties += 1,
        }
        self.total_games += 1;
    }

    fn win_rate(&self) -> f32 {
        if self.total_games == 0 {
            return 0.0;
        }
        self.mcts_wins as f32 / self.total_games as f32
    }

    fn percent(&self, count: usize) -> f32 {
        if self.total_games == 0 {
            return 0.0;
        }
        count as f32 / self.total_games as f32 * 100.0
    }
}

/// +1 when Black won, -1 when White won, 0 for a tie.
fn black_outcome(result: GameResult) -> f32 {
    match result.winner() {
        Some(Player::Black) => 1.0,
        Some(Player::White) => -1.0,
        None => 0.0,
    }
}

/// Play one self-play game, both sides sharing one player and one tree.
fn generate_game<E: Evaluator<Othello>>(
    game: Othello,
    config: &MctsConfig,
    evaluator: E,
    seed: u64,
) -> Result<GameRecord> {
    let rng = ChaCha8Rng::seed_from_u64(seed);
    let mut player = MctsPlayer::new(game, config.clone(), evaluator, rng)?;

    let mut steps = Vec::new();
    let mut transcript = Vec::new();
    let mut state = game.initial_state();

    while !game.is_terminal(&state) {
        // Observation before the move is made
        let observation = game.observe(&state);
        let (action, result) = player.choose_action_with_result(&state)?;

        steps.push(GameStep {
            observation,
            action: game.action_to_index(action) as u16,
            mcts_policy: sparse_policy(&result, &game),
            root_value: result.root_value,
        });
        transcript.push(action.to_coord(game.size()));

        state = game.apply(&state, action)?;
    }

    let result = state
        .outcome()
        .ok_or_else(|| anyhow!("BUG: finished game has no outcome"))?;

    let mut metadata = HashMap::new();
    metadata.insert("seed".to_string(), serde_json::json!(seed));
    metadata.insert("moves".to_string(), serde_json::json!(steps.len()));
    metadata.insert("size".to_string(), serde_json::json!(game.size()));
    metadata.insert("transcript".to_string(), serde_json::json!(transcript));
    metadata.insert(
        "black_discs".to_string(),
        serde_json::json!(state.count(Player::Black)),
    );
    metadata.insert(
        "white_discs".to_string(),
        serde_json::json!(state.count(Player::White)),
    );

    debug!(seed, moves = steps.len(), ?result, "self-play game finished");

    Ok(GameRecord {
        steps,
        outcome: black_outcome(result),
        metadata,
    })
}

/// Convert the root visit counts to sparse format (non-zero entries only).
fn sparse_policy(result: &SearchResult<Action>, game: &Othello) -> HashMap<u16, f32> {
    let total = result.total_visits();
    if total == 0 {
        return HashMap::new();
    }
    result
        .visit_counts
        .iter()
        .filter(|(_, count)| *count > 0)
        .map(|(action, count)| {
            let prob = *count as f32 / total as f32;
            (game.action_to_index(*action) as u16, prob)
        })
        .collect()
}

/// Write one game as a MessagePack map.
fn write_record(path: &Path, record: &GameRecord) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    // Named fields serialize structs as maps (not arrays)
    rmp_serde::encode::write_named(&mut writer, record)
        .with_context(|| format!("Failed to serialize game to {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("Failed to flush {}", path.display()))?;
    Ok(())
}

/// Play one match game; returns the final board.
fn play_evaluation_game<E: Evaluator<Othello>>(
    game: Othello,
    evaluator: E,
    minimax: &MinimaxPlayer,
    config: &MctsConfig,
    mcts_side: Player,
    seed: u64,
) -> Result<Board> {
    let rng = ChaCha8Rng::seed_from_u64(seed);
    let mut player = MctsPlayer::new(game, config.clone(), evaluator, rng)?;
    player.set_side(mcts_side);

    let mut state = game.initial_state();
    while !game.is_terminal(&state) {
        let action = if state.to_move() == mcts_side {
            player.choose_action(&state)?
        } else {
            minimax
                .best_move(&state)
                .ok_or_else(|| anyhow!("BUG: minimax found no move in a live game"))?
        };
        state = game.apply(&state, action)?;
    }

    Ok(state)
}

/// Run evaluation: MCTS vs minimax, alternating colours.
fn run_evaluation(
    search: &SearchArgs,
    num_games: usize,
    depth: usize,
) -> Result<EvaluationResult> {
    let game = search.game()?;
    let config = search.mcts_config(MctsConfig::for_evaluation(200))?;
    let evaluator = search.evaluator.build(search.seed, search.rollout_depth)?;
    let minimax = MinimaxPlayer::new(depth);

    println!(
        "\nPlaying {} games on {}x{}: MCTS ({} sims, {}) vs Minimax (depth {})",
        num_games,
        search.size,
        search.size,
        config.num_simulations,
        search.evaluator,
        minimax.max_depth()
    );
    println!("================================================");

    let mut result = EvaluationResult::default();
    for i in 0..num_games {
        // Alternate colours for fairness
        let mcts_side = if i % 2 == 0 {
            Player::Black
        } else {
            Player::White
        };
        let game_seed = search.seed.wrapping_add(i as u64 * 1000);

        let board =
            play_evaluation_game(game, &*evaluator, &minimax, &config, mcts_side, game_seed)?;
        let outcome = board
            .outcome()
            .ok_or_else(|| anyhow!("BUG: evaluation game ended early"))?;
        result.record(outcome.winner(), mcts_side);

        debug!(game = i, ?mcts_side, ?outcome, "evaluation game finished");

        if (i + 1) % 10 == 0 || i + 1 == num_games {
            println!(
                "Game {}/{}: MCTS {} - {} Minimax ({} ties)",
                i + 1,
                num_games,
                result.mcts_wins,
                result.minimax_wins,
                result.ties
            );
        }
    }

    Ok(result)
}

/// Run the generate command.
fn cmd_generate(games: usize, output: &Path, search: &SearchArgs) -> Result<()> {
    fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output directory: {}", output.display()))?;

    let game = search.game()?;
    let config = search.mcts_config(MctsConfig::for_selfplay(200))?;
    let evaluator = search.evaluator.build(search.seed, search.rollout_depth)?;

    println!(
        "Generating {} games on {}x{} with {} simulations/move ({})",
        games, search.size, search.size, config.num_simulations, search.evaluator
    );
    println!("Output directory: {}", output.display());
    println!("Seed: {}", search.seed);
    info!(?config, "Self-play configuration");

    let start = Instant::now();

    let game_records: Vec<GameRecord> = (0..games)
        .into_par_iter()
        .map(|i| {
            let game_seed = search.seed.wrapping_add(i as u64 * 1000);
            generate_game(game, &config, &*evaluator, game_seed)
        })
        .collect::<Result<_>>()?;

    // Save each game to a separate MessagePack file
    for (i, record) in game_records.iter().enumerate() {
        let filename = output.join(format!("game_{:06}.msgpack", i));
        write_record(&filename, record)?;
    }

    let elapsed = start.elapsed();
    let total_moves: usize = game_records.iter().map(|g| g.steps.len()).sum();
    let avg_moves = if games == 0 {
        0.0
    } else {
        total_moves as f64 / games as f64
    };

    println!("\nCompleted in {:.2}s", elapsed.as_secs_f64());
    println!("Games generated: {}", games);
    println!("Total moves: {}", total_moves);
    println!("Average game length: {:.1} moves", avg_moves);
    println!("Files saved to: {}", output.display());

    let black_wins = game_records.iter().filter(|g| g.outcome > 0.5).count();
    let white_wins = game_records.iter().filter(|g| g.outcome < -0.5).count();
    let ties = game_records.iter().filter(|g| g.outcome.abs() <= 0.5).count();
    println!(
        "\nOutcomes: Black wins: {}, White wins: {}, Ties: {}",
        black_wins, white_wins, ties
    );

    Ok(())
}

fn cmd_evaluate(games: usize, depth: usize, search: &SearchArgs) -> Result<()> {
    let result = run_evaluation(search, games, depth)?;

    println!("\n================================================");
    println!("FINAL RESULTS");
    println!("================================================");
    println!(
        "MCTS wins:    {} ({:.1}%)",
        result.mcts_wins,
        result.percent(result.mcts_wins)
    );
    println!(
        "Minimax wins: {} ({:.1}%)",
        result.minimax_wins,
        result.percent(result.minimax_wins)
    );
    println!(
        "Ties:         {} ({:.1}%)",
        result.ties,
        result.percent(result.ties)
    );
    println!("------------------------------------------------");
    println!("Win rate: {:.1}%", result.win_rate() * 100.0);

    Ok(())
}

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    match cli.command {
        Commands::Generate {
            games,
            output,
            search,
        } => cmd_generate(games, &output, &search),

        Commands::Evaluate {
            games,
            depth,
            search,
        } => cmd_evaluate(games, depth, &search),
    }
}
