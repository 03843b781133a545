//! Layout and drawing: playfield, sidebar, pause and game-over overlays.

use crate::theme::Theme;
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Widget, Wrap};
use stackfall::{Canvas, GameSession, GameState, HighScoreStore, Layer, PieceKind};
use std::time::Instant;
use tachyonfx::{Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx};

/// Terminal columns per grid cell; two keeps cells roughly square.
const CELL_WIDTH: u16 = 2;
const SIDEBAR_WIDTH: u16 = 22;
/// Duration of the game-over fade (TachyonFX) in ms.
const GAME_OVER_FADE_MS: u32 = 600;

/// Everything `draw` needs besides the session.
pub struct View<'a> {
    pub theme: &'a Theme,
    pub paused: bool,
    pub no_animation: bool,
    pub now: Instant,
}

/// Game-over fade state carried between frames.
#[derive(Default)]
pub struct Fade {
    effect: Option<Effect>,
    last_process: Option<Instant>,
}

impl Fade {
    pub fn reset(&mut self) {
        self.effect = None;
        self.last_process = None;
    }

    #[cfg(test)]
    pub fn started(&self) -> bool {
        self.effect.is_some()
    }

    fn finished(&self) -> bool {
        self.effect.as_ref().is_some_and(Effect::done)
    }
}

/// Playfield size in terminal cells including the border.
/// Saturates at `u16::MAX`, which no terminal fits.
fn playfield_outer_size(cols: usize, rows: usize) -> (u16, u16) {
    let w = cols
        .saturating_mul(CELL_WIDTH as usize)
        .saturating_add(2);
    let h = rows.saturating_add(2);
    (
        u16::try_from(w).unwrap_or(u16::MAX),
        u16::try_from(h).unwrap_or(u16::MAX),
    )
}

/// Draws engine cells into a ratatui buffer.
struct BoardCanvas<'a> {
    buf: &'a mut Buffer,
    board: Rect,
    theme: &'a Theme,
    /// Grey out locked cells (after the game-over fade).
    dim: bool,
}

impl Canvas for BoardCanvas<'_> {
    fn fill_cell(&mut self, x: usize, y: usize, kind: PieceKind, layer: Layer) {
        let (Ok(x), Ok(y)) = (u16::try_from(x), u16::try_from(y)) else {
            return;
        };
        let (Some(rx), Some(ry)) = (
            x.checked_mul(CELL_WIDTH).and_then(|dx| self.board.x.checked_add(dx)),
            self.board.y.checked_add(y),
        ) else {
            return;
        };
        if rx.saturating_add(CELL_WIDTH) > self.board.right() || ry >= self.board.bottom() {
            return;
        }
        let color = self.theme.piece_color(kind);
        let (symbol, style) = match layer {
            Layer::Locked if self.dim => ("██", Style::default().fg(self.theme.inactive_fg)),
            Layer::Locked | Layer::Active => ("██", Style::default().fg(color)),
            Layer::Ghost => (
                "░░",
                Style::default().fg(color).add_modifier(Modifier::DIM),
            ),
        };
        self.buf
            .set_string(rx, ry, symbol, style.bg(self.theme.bg));
    }
}

/// Draw the whole screen for one frame.
pub fn draw<S: HighScoreStore>(
    frame: &mut Frame,
    session: &GameSession<S>,
    view: &View,
    fade: &mut Fade,
) {
    let area = frame.area();
    let theme = view.theme;
    let grid = session.grid();
    let (pw, ph) = playfield_outer_size(grid.cols(), grid.rows());
    let total_w = pw.saturating_add(SIDEBAR_WIDTH);

    if area.width < total_w || area.height < ph {
        draw_too_small(frame, theme, area, total_w, ph);
        return;
    }

    // Center horizontally, then vertically.
    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_w),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(ph),
            Constraint::Fill(1),
        ])
        .split(horiz[1]);
    let inner = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(pw), Constraint::Length(SIDEBAR_WIDTH)])
        .split(vert[1]);
    let (playfield_area, sidebar_area) = (inner[0], inner[1]);

    let game_over = session.state() == GameState::GameOver;
    let board = draw_playfield(
        frame,
        session,
        theme,
        playfield_area,
        game_over && (view.no_animation || fade.finished()),
    );
    draw_sidebar(frame, session, theme, sidebar_area);

    if game_over {
        if !view.no_animation && !fade.finished() {
            apply_game_over_fade(frame, theme, board, fade, view.now);
        }
        draw_game_over(frame, session, theme, playfield_area);
    } else if view.paused {
        draw_pause_overlay(frame, theme, playfield_area);
    }
}

/// Border, background and engine cells. Returns the inner board rect.
fn draw_playfield<S: HighScoreStore>(
    frame: &mut Frame,
    session: &GameSession<S>,
    theme: &Theme,
    area: Rect,
    dim: bool,
) -> Rect {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(" Stackfall ", Style::default().fg(theme.title)));
    let board = block.inner(area);
    block.render(area, frame.buffer_mut());

    let buf = frame.buffer_mut();
    let empty = Style::default().fg(theme.div_line).bg(theme.bg);
    for y in board.top()..board.bottom() {
        for x in (board.left()..board.right()).step_by(CELL_WIDTH as usize) {
            buf.set_string(x, y, " ·", empty);
        }
    }

    let mut canvas = BoardCanvas {
        buf,
        board,
        theme,
        dim,
    };
    session.draw(&mut canvas);
    board
}

/// Create or advance the fade that greys out the stack after game over.
fn apply_game_over_fade(frame: &mut Frame, theme: &Theme, board: Rect, fade: &mut Fade, now: Instant) {
    let delta = fade
        .last_process
        .map(|t| now.saturating_duration_since(t))
        .unwrap_or(std::time::Duration::ZERO);
    let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
    fade.last_process = Some(now);

    let effect = fade.effect.get_or_insert_with(|| {
        fx::fade_to(
            theme.inactive_fg,
            theme.bg,
            (GAME_OVER_FADE_MS, Interpolation::QuadOut),
        )
        .with_area(board)
    });
    frame.render_effect(effect, board, TfxDuration::from_millis(delta_ms));
}

fn draw_sidebar<S: HighScoreStore>(frame: &mut Frame, session: &GameSession<S>, theme: &Theme, area: Rect) {
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let border_style = Style::default().fg(theme.div_line).bg(theme.bg);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Stats (border + score, best, lines)
            Constraint::Length(1), // gap
            Constraint::Length(9), // Controls
            Constraint::Fill(1),
        ])
        .split(area);

    let stat = |label: &'static str, value: u32| {
        Line::from(vec![
            Span::styled(label, title_style),
            Span::styled(value.to_string(), fg_style),
        ])
    };
    let stats = vec![
        stat("Score: ", session.score()),
        stat("Best:  ", session.high_score().max(session.score())),
        stat("Lines: ", session.lines()),
    ];
    Paragraph::new(Text::from(stats))
        .block(Block::default().borders(Borders::ALL).border_style(border_style))
        .render(chunks[0], frame.buffer_mut());

    let keys = [
        ("←/h", "Left"),
        ("→/l", "Right"),
        ("↑/k", "Rotate"),
        ("↓/j", "Drop"),
        ("R", "Restart"),
        ("P", "Pause"),
        ("Q", "Quit"),
    ];
    let lines: Vec<Line> = keys
        .iter()
        .map(|(k, what)| {
            Line::from(vec![
                Span::styled(format!("{:<5}", k), title_style),
                Span::styled(*what, Style::default().fg(theme.inactive_fg)),
            ])
        })
        .collect();
    Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).border_style(border_style))
        .render(chunks[2], frame.buffer_mut());
}

fn centered_popup(area: Rect, w: u16, h: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(w) / 2,
        y: area.y + area.height.saturating_sub(h) / 2,
        width: w.min(area.width),
        height: h.min(area.height),
    }
}

fn draw_pause_overlay(frame: &mut Frame, theme: &Theme, area: Rect) {
    let popup = centered_popup(area, 22, 5);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Paused ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        )),
        Line::from(""),
        Line::from(Span::styled(" P — Resume ", Style::default().fg(theme.main_fg))),
    ];
    let p = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
    );
    p.render(popup, frame.buffer_mut());
}

fn draw_game_over<S: HighScoreStore>(frame: &mut Frame, session: &GameSession<S>, theme: &Theme, area: Rect) {
    let popup = centered_popup(area, 22, 9);
    let mut lines: Vec<Line> = vec![
        Line::from(""),
        Line::from(Span::styled(
            " GAME OVER ",
            Style::default().fg(Color::White).bg(Color::Red),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(" Score: {} ", session.score()),
            Style::default().fg(theme.main_fg),
        )),
        Line::from(Span::styled(
            format!(" Best: {} ", session.high_score()),
            Style::default().fg(theme.main_fg),
        )),
    ];
    if session.new_record() {
        lines.push(Line::from(Span::styled(
            " New record! ",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
    }
    lines.push(Line::from(Span::styled(
        " R — Restart  Q — Quit ",
        Style::default().fg(theme.main_fg),
    )));
    let p = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
    );
    p.render(popup, frame.buffer_mut());
}

fn draw_too_small(frame: &mut Frame, theme: &Theme, area: Rect, need_w: u16, need_h: u16) {
    let msg = format!(
        "Terminal too small: {}×{} (need {}×{})",
        area.width, area.height, need_w, need_h
    );
    Paragraph::new(Line::from(Span::styled(msg, Style::default().fg(theme.main_fg))))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(area, frame.buffer_mut());
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use stackfall::{Command, GameConfig, MemoryStore};

    fn render(session: &GameSession, w: u16, h: u16) -> Buffer {
        let theme = Theme::default();
        let mut terminal = Terminal::new(TestBackend::new(w, h)).unwrap();
        let mut fade = Fade::default();
        let view = View {
            theme: &theme,
            paused: false,
            no_animation: true,
            now: Instant::now(),
        };
        terminal
            .draw(|f| draw(f, session, &view, &mut fade))
            .unwrap();
        terminal.backend().buffer().clone()
    }

    fn text(buf: &Buffer) -> String {
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    fn session() -> GameSession {
        let config = GameConfig {
            seed: Some(3),
            ..GameConfig::default()
        };
        GameSession::new(&config, MemoryStore::with_value(70))
    }

    #[test]
    fn playfield_shows_piece_ghost_and_stats() {
        let s = session();
        let buf = render(&s, 60, 24);
        let t = text(&buf);
        assert!(t.contains("Stackfall"));
        assert!(t.contains("██"));
        assert!(t.contains("░░"));
        assert!(t.contains("Score: 0"));
        assert!(t.contains("Best:  70"));
    }

    #[test]
    fn tiny_terminal_gets_a_message() {
        let s = session();
        let t = text(&render(&s, 20, 10));
        assert!(t.contains("Terminal too small"));
    }

    #[test]
    fn board_wider_than_any_terminal_is_reported() {
        let config = GameConfig {
            cols: 40_000,
            seed: Some(3),
            ..GameConfig::default()
        }
        .clamped();
        let s = GameSession::new(&config, MemoryStore::default());
        let t = text(&render(&s, 200, 40));
        assert!(t.contains("Terminal too small"));
    }

    #[test]
    fn cells_past_the_board_are_clipped() {
        let theme = Theme::default();
        let mut buf = Buffer::empty(Rect::new(0, 0, 10, 5));
        let before = buf.clone();
        let mut canvas = BoardCanvas {
            buf: &mut buf,
            board: Rect::new(1, 1, 8, 3),
            theme: &theme,
            dim: false,
        };
        canvas.fill_cell(usize::MAX, 0, PieceKind::I, Layer::Active);
        canvas.fill_cell(40_000, 1, PieceKind::I, Layer::Active);
        canvas.fill_cell(0, 70_000, PieceKind::I, Layer::Active);
        canvas.fill_cell(4, 0, PieceKind::I, Layer::Active);
        assert_eq!(buf, before);
    }

    #[test]
    fn restart_clears_the_board_view() {
        let mut s = session();
        for _ in 0..40 {
            s.apply(Command::SoftDrop);
        }
        s.apply(Command::Restart);
        let t = text(&render(&s, 60, 24));
        assert!(t.contains("Score: 0"));
        assert!(!t.contains("GAME OVER"));
    }
}
