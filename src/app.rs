//! App: terminal init, main loop, frame timing and key handling.

use crate::input::{Action, key_to_action};
use crate::theme::Theme;
use crate::ui::{self, Fade, View};
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::DefaultTerminal;
use stackfall::{GameConfig, GameSession, GameState, HighScoreStore};
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub struct App {
    session: GameSession<Box<dyn HighScoreStore>>,
    theme: Theme,
    paused: bool,
    no_animation: bool,
    frame_interval: Duration,
    /// Wall-clock time of the previous engine tick.
    last_frame: Instant,
    fade: Fade,
}

impl App {
    pub fn new(
        config: &GameConfig,
        store: Box<dyn HighScoreStore>,
        theme: Theme,
        frame_rate: f64,
        no_animation: bool,
    ) -> Result<Self> {
        anyhow::ensure!(
            frame_rate.is_finite() && frame_rate > 0.0,
            "frame rate must be positive, got {frame_rate}"
        );
        Ok(Self {
            session: GameSession::new(config, store),
            theme,
            paused: false,
            no_animation,
            frame_interval: Duration::from_secs_f64(1.0 / frame_rate),
            last_frame: Instant::now(),
            fade: Fade::default(),
        })
    }

    /// Handle one decoded key. Returns false when the user quits.
    fn handle_action(&mut self, action: Action) -> bool {
        match action {
            Action::Quit => return false,
            Action::Pause => {
                if self.session.state() == GameState::Running {
                    self.paused = !self.paused;
                    debug!(paused = self.paused, "pause toggled");
                }
            }
            Action::Restart => {
                self.paused = false;
                self.fade.reset();
                self.session.apply(stackfall::Command::Restart);
            }
            _ if self.paused => {}
            _ => {
                if let Some(command) = action.command() {
                    self.session.apply(command);
                }
            }
        }
        true
    }

    /// Start the game-over fade when this frame's input or gravity ended the game.
    fn after_frame(&mut self, before: GameState) {
        if before == GameState::Running && self.session.state() == GameState::GameOver {
            self.fade.reset();
        }
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let setup = || -> Result<DefaultTerminal> {
            let mut stdout = std::io::stdout();
            execute!(stdout, EnterAlternateScreen)?;
            let mut terminal =
                DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;
            terminal.hide_cursor()?;
            Ok(terminal)
        };
        let mut terminal = match setup() {
            Ok(terminal) => terminal,
            Err(e) => {
                // Leave the shell usable.
                let _ = execute!(std::io::stdout(), LeaveAlternateScreen);
                let _ = disable_raw_mode();
                return Err(e);
            }
        };

        let result = self.run_loop(&mut terminal);

        // Restore
        let _ = terminal.show_cursor();
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;

        info!(score = self.session.score(), "exit");
        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        self.last_frame = Instant::now();
        loop {
            let frame_start = Instant::now();
            let before = self.session.state();
            let view = View {
                theme: &self.theme,
                paused: self.paused,
                no_animation: self.no_animation,
                now: frame_start,
            };
            terminal.draw(|f| ui::draw(f, &self.session, &view, &mut self.fade))?;

            // Wait out the rest of the frame for input.
            let timeout = self.frame_interval.saturating_sub(frame_start.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    if let Event::Key(key) = event::read()? {
                        // Terminal auto-repeat arrives as Press (or Repeat with enhanced flags).
                        if key.kind == KeyEventKind::Release {
                            continue;
                        }
                        if !self.handle_action(key_to_action(key)) {
                            return Ok(());
                        }
                    }
                }
            }

            let now = Instant::now();
            let delta = now.saturating_duration_since(self.last_frame);
            self.last_frame = now;
            if !self.paused {
                if let Some(outcome) = self.session.tick(delta) {
                    if outcome.cleared_rows > 0 {
                        debug!(rows = outcome.cleared_rows, score = self.session.score(), "rows cleared");
                    }
                }
            }
            self.after_frame(before);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackfall::MemoryStore;

    fn app() -> App {
        let config = GameConfig {
            seed: Some(5),
            ..GameConfig::default()
        };
        App::new(&config, Box::new(MemoryStore::default()), Theme::default(), 60.0, true).unwrap()
    }

    #[test]
    fn rejects_nonsense_frame_rate() {
        let config = GameConfig::default();
        assert!(App::new(&config, Box::new(MemoryStore::default()), Theme::default(), 0.0, true).is_err());
    }

    #[test]
    fn pause_blocks_movement_but_not_quit() {
        let mut app = app();
        let x = app.session.player().pos.x;
        assert!(app.handle_action(Action::Pause));
        assert!(app.paused);
        app.handle_action(Action::MoveLeft);
        assert_eq!(app.session.player().pos.x, x);
        app.handle_action(Action::Pause);
        app.handle_action(Action::MoveLeft);
        assert_eq!(app.session.player().pos.x, x - 1);
        assert!(!app.handle_action(Action::Quit));
    }

    fn play_until_over(app: &mut App) {
        let before = app.session.state();
        let mut drops = 0;
        while app.session.state() == GameState::Running {
            app.handle_action(Action::SoftDrop);
            drops += 1;
            assert!(drops < 10_000);
        }
        app.after_frame(before);
    }

    fn render(app: &mut App) {
        use ratatui::{Terminal, backend::TestBackend};
        let mut terminal = Terminal::new(TestBackend::new(60, 24)).unwrap();
        let view = View {
            theme: &app.theme,
            paused: false,
            no_animation: app.no_animation,
            now: Instant::now(),
        };
        terminal
            .draw(|f| ui::draw(f, &app.session, &view, &mut app.fade))
            .unwrap();
    }

    #[test]
    fn soft_drop_game_over_starts_a_fresh_fade() {
        let mut app = app();
        app.no_animation = false;
        play_until_over(&mut app);
        render(&mut app);
        assert!(app.fade.started());

        // Restarting the session directly leaves the old fade in place.
        app.session.apply(stackfall::Command::Restart);
        assert!(app.fade.started());
        play_until_over(&mut app);
        assert!(!app.fade.started());
    }

    #[test]
    fn restart_unpauses() {
        let mut app = app();
        app.handle_action(Action::SoftDrop);
        app.handle_action(Action::Pause);
        app.handle_action(Action::Restart);
        assert!(!app.paused);
        assert_eq!(app.session.player().pos.y, 0);
    }
}
