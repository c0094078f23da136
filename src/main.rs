//! Tetritui — turn-based falling-block puzzle game in the terminal.

mod app;
mod game;
mod highscore;
mod input;
mod shapes;
mod ui;

use anyhow::Result;
use app::App;
use clap::Parser;
use std::path::PathBuf;

/// Options derived from the CLI that the game session depends on.
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub width: u16,
    pub height: u16,
    pub score_file: PathBuf,
    pub seed: Option<u64>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = GameConfig {
        // A piece grid is 4 wide; anything narrower cannot spawn.
        width: args.width.max(4),
        height: args.height.max(4),
        score_file: args.score_file,
        seed: args.seed,
    };
    App::new(config).run()
}

/// Turn-based falling-block puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "tetritui",
    version,
    about = "Turn-based falling-block puzzle in the terminal. Every move advances the board; clear full rows to score.",
    long_about = "Tetritui is a turn-based terminal rendition of the classic falling-block puzzle.\n\n\
        The board only advances when you act: rotating or shifting the piece also drops it one \
        row, soft drop descends a single row, hard drop sends the piece to the floor. Each locked \
        piece scores a point and full rows are cleared. The high score is kept in a plain text \
        file between sessions.\n\n\
        CONTROLS:\n  A / Left     Move left    D / Right   Move right\n  W / Up       Rotate       S / Down    Soft drop\n  Space/Enter  Hard drop    Q / Esc     Quit   R  Restart (game over)"
)]
pub struct Args {
    /// Board width in columns.
    #[arg(long, default_value = "10", value_name = "COLS")]
    pub width: u16,

    /// Board height in rows.
    #[arg(long, default_value = "20", value_name = "ROWS")]
    pub height: u16,

    /// High score file (holds a single decimal integer).
    #[arg(long, default_value = "highscore.txt", value_name = "FILE")]
    pub score_file: PathBuf,

    /// Seed for the piece sequence (reproducible games).
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,
}
