use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use console_2048::config::{Config, Rules};
use console_2048::session::{Game, Phase, Step};
use console_2048::tui::{LabelGrid, Terminal};

const TICK: Duration = Duration::from_millis(16);
const HELP: &str = "Arrows/WASD to move";

#[derive(Debug, Parser)]
#[command(name = "console-2048", about = "Play 2048 on a 4x4 board in the terminal")]
struct Args {
    /// TOML file with an optional `seed` and a `[rules]` table
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Seed for the tile RNG (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// Use the corrected rules instead of the reference ones
    #[arg(long)]
    corrected: bool,

    /// Write log records to this file (the game screen hides stderr)
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;

    let config = match &args.config {
        Some(path) => Config::from_toml(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };
    let rules = if args.corrected { Rules::corrected() } else { config.rules };
    let seed = args.seed.or(config.seed);
    let mut master = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    info!("starting with {rules:?}, seed {seed:?}");

    let mut term = Terminal::enter().context("entering terminal mode")?;
    run(&mut term, &mut master, rules)
}

fn init_logging(log_file: Option<&Path>) -> anyhow::Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating log file {}", path.display()))?;
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        None => {
            builder.filter_level(log::LevelFilter::Off);
        }
    }
    builder.try_init()?;
    Ok(())
}

fn new_game(master: &mut StdRng, rules: Rules) -> anyhow::Result<Game<LabelGrid, StdRng>> {
    let seed: u64 = master.gen();
    info!("new game, tile seed {seed}");
    Ok(Game::seeded(LabelGrid::default(), seed, rules)?)
}

fn run(term: &mut Terminal, master: &mut StdRng, rules: Rules) -> anyhow::Result<()> {
    let mut game = new_game(master, rules)?;
    let mut status = String::from(HELP);
    let mut redraw = true;

    loop {
        if redraw || game.board_mut().sink_mut().take_dirty() {
            term.render(game.board().sink(), &status)?;
            redraw = false;
        }

        let tick = term.poll_tick(TICK)?;
        if tick.quit {
            break;
        }
        if tick.restart {
            game = new_game(master, rules)?;
            status = String::from(HELP);
            redraw = true;
            continue;
        }

        if let Step::Turn(turn) = game.step(tick.released.direction())? {
            status = match turn.phase {
                Phase::GameOver => format!(
                    "Game over after {} turns, highest tile {}. [N] to play again",
                    game.turns(),
                    game.board().highest_tile()
                ),
                Phase::Playing if turn.changed => format!("Moved {}", turn.direction),
                Phase::Playing => format!("Nothing moves {}", turn.direction),
            };
            redraw = true;
        }
    }
    Ok(())
}
