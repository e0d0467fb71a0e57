// Entry point for the text-mode Minesweeper
// Parses flags, loads configuration and logging, then launches the console UI

use clap::Parser;
use std::error::Error;
use std::path::PathBuf;
use tracing::info;

// Module declarations
mod txs_board;  // Board engine: mines, adjacency, reveal cascade
mod txs_color;  // Glyphs and terminal-aware colors
mod txs_game;   // Game settings and configuration file
mod txs_input;  // Prompt input parsing
mod txs_lang;   // Multi-language string resources
mod txs_log;    // tracing setup
mod txs_square; // Single cell state
mod txs_ui;     // Console rendering and event handling

use txs_game::{Config, GameSettings, load_config};
use txs_lang::Lang;
use txs_ui::run as run_ui;

/// Command-line flags, applied on top of the config file
#[derive(Parser, Debug, Clone)]
#[command(name = "txswpr")]
#[command(version)]
#[command(about = "A text-mode Minesweeper", long_about = None)]
struct CliArgs {
    /// Path to a config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Board height for new games
    #[arg(long, value_name = "ROWS")]
    height: Option<usize>,

    /// Board width for new games
    #[arg(long, value_name = "COLS")]
    width: Option<usize>,

    /// Mine quantity for new games
    #[arg(long, value_name = "COUNT")]
    mines: Option<usize>,

    /// Seed for reproducible mine layouts
    #[arg(long)]
    seed: Option<u64>,

    /// Use ASCII glyphs
    #[arg(long)]
    ascii: bool,

    /// Language code (en, zh)
    #[arg(long, value_name = "CODE")]
    lang: Option<String>,
}

impl CliArgs {
    fn apply(&self, cfg: &mut Config) {
        cfg.game = GameSettings::new(
            self.height.unwrap_or(cfg.game.height),
            self.width.unwrap_or(cfg.game.width),
            self.mines.unwrap_or(cfg.game.mine_count),
        );
        if self.seed.is_some() {
            cfg.seed = self.seed;
        }
        if self.ascii {
            cfg.ascii_icons = true;
        }
        if let Some(lang) = &self.lang {
            cfg.language = lang.clone();
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = CliArgs::parse();

    // Read the config before logging starts so its filter can apply
    let mut cfg = load_config(args.config.as_deref());
    args.apply(&mut cfg);
    match txs_log::init(cfg.log_filter.as_deref()) {
        Ok(path) => info!(log = %path.display(), game = ?cfg.game, seed = ?cfg.seed, "starting"),
        // the terminal is still ours here, so say it once and play on
        Err(e) => eprintln!("txswpr: logging disabled: {e}"),
    }

    let lang = Lang::new(&cfg.language);
    run_ui(&cfg, lang)
}
