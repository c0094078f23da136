//! App: terminal init, blocking turn loop, key handling.

use crate::GameConfig;
use crate::game::GameState;
use crate::highscore::ScoreStoreError;
use crate::input::{Command, key_to_command};
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::DefaultTerminal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Playing,
    GameOver,
}

pub struct App {
    config: GameConfig,
    state: GameState,
    screen: Screen,
    /// First high-score write failure seen; reported after the terminal
    /// is restored.
    save_error: Option<ScoreStoreError>,
}

impl App {
    pub fn new(config: GameConfig) -> Self {
        let state = GameState::new(&config);
        Self {
            config,
            state,
            screen: Screen::Playing,
            save_error: None,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            execute,
            terminal::{
                EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
            },
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        let result = self.run_loop(&mut terminal);

        // Restore
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;

        if let Some(err) = self.save_error.take() {
            eprintln!("warning: high score was not saved: {err}");
        }
        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            terminal.draw(|f| crate::ui::draw(f, &self.state, self.screen, f.area()))?;

            // Turn-based: block until the next key arrives. There is no
            // gravity tick; the board only advances on input.
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            let cmd = key_to_command(key);

            match self.screen {
                Screen::Playing => match cmd {
                    Command::Quit => return Ok(()),
                    // Restart only means something on the game-over
                    // screen; during play it is a no-op turn.
                    Command::Restart => self.state.step(Command::Unrecognized),
                    cmd => self.state.step(cmd),
                },
                Screen::GameOver => match cmd {
                    Command::Quit => return Ok(()),
                    Command::Restart => {
                        self.state = GameState::new(&self.config);
                        self.screen = Screen::Playing;
                    }
                    _ => {}
                },
            }

            if let Some(err) = self.state.save_error.take() {
                self.save_error.get_or_insert(err);
            }
            if self.screen == Screen::Playing && self.state.game_over {
                self.screen = Screen::GameOver;
            }
        }
    }
}
