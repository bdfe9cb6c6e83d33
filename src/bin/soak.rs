use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use console_2048::config::{Config, Rules};
use console_2048::engine::{BoardError, Direction};
use console_2048::session::{Game, Phase, Step, BOARD_HEIGHT, BOARD_WIDTH};
use console_2048::sink::Recorder;
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

// Salt separating the input stream from the tile stream of the same seed
const INPUT_SALT: u64 = 0x9E37_79B9_7F4A_7C15;
const CELLS: usize = BOARD_WIDTH * BOARD_HEIGHT;

#[derive(Debug, Parser)]
#[command(name = "soak", about = "Play seeded random-input games and check board invariants every turn")]
struct Args {
    /// Number of games to play
    #[arg(long, default_value_t = 1000)]
    games: u64,

    /// Base seed; game `i` uses `seed + i`
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Stop a game after this many accepted inputs
    #[arg(long, default_value_t = 5000)]
    max_turns: u64,

    /// TOML file with a `[rules]` table
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Use the corrected rules instead of the reference ones
    #[arg(long)]
    corrected: bool,

    /// Suppress the progress bar
    #[arg(short, long)]
    quiet: bool,
}

struct GameReport {
    seed: u64,
    turns: u64,
    highest: u32,
    over: bool,
    violations: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let rules = if args.corrected {
        Rules::corrected()
    } else if let Some(path) = &args.config {
        Config::from_toml(path)
            .with_context(|| format!("loading config {}", path.display()))?
            .rules
    } else {
        Rules::default()
    };
    log::info!("soaking {} games with {rules:?}", args.games);

    let pb = if args.quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(args.games);
        pb.set_style(
            ProgressStyle::with_template("{bar:40} {pos}/{len} games | {elapsed_precise} | eta {eta}")?,
        );
        pb
    };

    let reports = (0..args.games)
        .into_par_iter()
        .map(|i| {
            let report = play(args.seed.wrapping_add(i), rules, args.max_turns);
            pb.inc(1);
            report
        })
        .collect::<Result<Vec<_>, BoardError>>()?;
    pb.finish_and_clear();

    summarize(&reports)
}

fn play(seed: u64, rules: Rules, max_turns: u64) -> Result<GameReport, BoardError> {
    let mut game = Game::seeded(Recorder::default(), seed, rules)?;
    let mut inputs = StdRng::seed_from_u64(seed ^ INPUT_SALT);
    let mut violations = Vec::new();

    while !game.is_over() && game.turns() < max_turns {
        let dir = Direction::ALL[inputs.gen_range(0..4)];
        let before = game.board().rows();
        let sum_before = game.board().tile_sum();
        let count_before = CELLS - game.board().count_empty();
        game.board_mut().sink_mut().clear();

        let Step::Turn(turn) = game.step(Some(dir))? else {
            violations.push(format!("turn {}: playing game did not take a turn", game.turns()));
            break;
        };
        let board = game.board();
        let after = board.rows();
        let spawned_value = turn.spawned.map_or(0, |s| u64::from(s.value));
        let mut check = |ok: bool, what: &str| {
            if !ok {
                violations.push(format!("turn {} ({dir}): {what}", game.turns()));
            }
        };

        check(
            after.iter().flatten().all(|&v| v == 0 || (v >= 2 && v.is_power_of_two())),
            "cell outside 0/powers of two",
        );
        check(board.tile_sum() == sum_before + spawned_value, "tile sum not preserved");
        check(
            CELLS - board.count_empty() <= count_before + usize::from(turn.spawned.is_some()),
            "tile count grew",
        );
        check(turn.changed || (turn.spawned.is_none() && after == before), "unchanged move altered the board");
        if let Some(s) = turn.spawned {
            check(s.value == 2 || s.value == 4, "spawned value not 2 or 4");
            check(after[s.y][s.x] == s.value, "spawned cell does not hold the spawned value");
        }
        let mut replayed = before.clone();
        board.sink().replay(&mut replayed);
        check(replayed == after, "display updates diverge from the board");
        check(
            turn.phase == Phase::Playing || board.count_empty() == 0,
            "game over with empty cells",
        );
    }

    Ok(GameReport {
        seed,
        turns: game.turns(),
        highest: game.board().highest_tile(),
        over: game.is_over(),
        violations,
    })
}

fn summarize(reports: &[GameReport]) -> anyhow::Result<()> {
    let games = reports.len().max(1) as f64;
    let finished = reports.iter().filter(|r| r.over).count();
    let turns: u64 = reports.iter().map(|r| r.turns).sum();
    let mut highest: BTreeMap<u32, usize> = BTreeMap::new();
    for r in reports {
        *highest.entry(r.highest).or_default() += 1;
    }

    println!(
        "games: {} | game over: {} | capped: {} | mean turns: {:.1}",
        reports.len(),
        finished,
        reports.len() - finished,
        turns as f64 / games
    );
    for (tile, count) in &highest {
        println!("  highest {tile:>6}: {count:>6} ({:.1}%)", 100.0 * *count as f64 / games);
    }

    let bad: Vec<&GameReport> = reports.iter().filter(|r| !r.violations.is_empty()).collect();
    if bad.is_empty() {
        return Ok(());
    }
    for r in bad.iter().take(10) {
        println!("seed {}: {}", r.seed, r.violations.join("; "));
    }
    anyhow::bail!("{} of {} games broke an invariant", bad.len(), reports.len())
}
