//! Layout and drawing: playfield with the falling piece overlaid, score
//! sidebar, game-over popup.

use crate::app::Screen;
use crate::game::{Cell, GameState};
use crate::shapes::ShapeKind;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};

/// Each board cell is rendered this many terminal columns wide.
const CELL_WIDTH: u16 = 2;

const SIDEBAR_WIDTH: u16 = 20;

/// Playfield size in terminal cells (board + border) for given grid dimensions.
fn playfield_pixel_size(width: u16, height: u16) -> (u16, u16) {
    (width * CELL_WIDTH + 2, height + 2)
}

fn kind_color(kind: ShapeKind) -> Color {
    match kind {
        ShapeKind::I => Color::Cyan,
        ShapeKind::O => Color::Yellow,
        ShapeKind::T => Color::Magenta,
        ShapeKind::S => Color::Green,
        ShapeKind::Z => Color::Red,
        ShapeKind::J => Color::Blue,
        ShapeKind::L => Color::LightRed,
    }
}

/// Draw the current screen. The game-over popup sits on top of the final
/// board so the player can see what killed them.
pub fn draw(frame: &mut Frame, state: &GameState, screen: Screen, area: Rect) {
    draw_game(frame, state, area);
    if screen == Screen::GameOver {
        draw_game_over(frame, state, area);
    }
}

fn draw_game(frame: &mut Frame, state: &GameState, area: Rect) {
    let (pw, ph) = playfield_pixel_size(state.board.width() as u16, state.board.height() as u16);
    let total_w = pw + SIDEBAR_WIDTH;

    // Center horizontally
    let horiz_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_w),
            Constraint::Fill(1),
        ])
        .split(area);

    // Center vertically
    let vert_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(ph),
            Constraint::Fill(1),
        ])
        .split(horiz_chunks[1]);

    let active_area = vert_chunks[1];
    let (playfield_area, sidebar_area) = {
        let inner = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(pw), Constraint::Length(SIDEBAR_WIDTH)])
            .split(active_area);
        (inner[0], inner[1])
    };

    draw_playfield(frame, state, playfield_area);
    draw_sidebar(frame, state, sidebar_area);
}

fn draw_playfield(frame: &mut Frame, state: &GameState, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(" tetritui ", Style::default().fg(Color::Yellow)));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());

    // The falling piece is overlaid at draw time; the board value never
    // holds its cells until lock.
    let piece_cells: Vec<(i32, i32)> = state.piece.cells().collect();
    let piece_color = kind_color(state.piece.kind);

    let buf = frame.buffer_mut();
    for y in 0..state.board.height() {
        for x in 0..state.board.width() {
            let color = if piece_cells.contains(&(x as i32, y as i32)) {
                Some(piece_color)
            } else {
                match state.board.cell(x, y) {
                    Some(Cell::Filled(kind)) => Some(kind_color(kind)),
                    _ => None,
                }
            };

            let rx = inner.x + x as u16 * CELL_WIDTH;
            let ry = inner.y + y as u16;
            if rx + CELL_WIDTH > inner.right() || ry >= inner.bottom() {
                continue;
            }
            match color {
                Some(c) => {
                    let style = Style::default().fg(c);
                    buf[(rx, ry)].set_symbol("█").set_style(style);
                    buf[(rx + 1, ry)].set_symbol("█").set_style(style);
                }
                None => {
                    buf[(rx, ry)]
                        .set_symbol("·")
                        .set_style(Style::default().fg(Color::DarkGray));
                    buf[(rx + 1, ry)].set_symbol(" ");
                }
            }
        }
    }
}

fn draw_sidebar(frame: &mut Frame, state: &GameState, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());

    let title_style = Style::default().fg(Color::Yellow);
    let fg_style = Style::default().fg(Color::White);
    let dim_style = Style::default().fg(Color::DarkGray);
    let lines = vec![
        Line::from(vec![
            Span::styled("Score: ", title_style),
            Span::styled(state.score.to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Best:  ", title_style),
            Span::styled(state.high_score.to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Lines: ", title_style),
            Span::styled(state.lines_cleared.to_string(), fg_style),
        ]),
        Line::from(""),
        Line::from(Span::styled("a/d  move", dim_style)),
        Line::from(Span::styled("w    rotate", dim_style)),
        Line::from(Span::styled("s    soft drop", dim_style)),
        Line::from(Span::styled("spc  hard drop", dim_style)),
        Line::from(Span::styled("q    quit", dim_style)),
    ];
    Paragraph::new(lines).render(inner, frame.buffer_mut());
}

fn draw_game_over(frame: &mut Frame, state: &GameState, area: Rect) {
    let popup_w = 28u16;
    let popup_h = 7u16;
    let popup = Rect {
        x: area.x + area.width.saturating_sub(popup_w) / 2,
        y: area.y + area.height.saturating_sub(popup_h) / 2,
        width: popup_w.min(area.width),
        height: popup_h.min(area.height),
    };

    let score_line = if state.score > 0 && state.score == state.high_score {
        Line::from(Span::styled(
            format!("New best: {}", state.score),
            Style::default().fg(Color::Yellow).bold(),
        ))
    } else {
        Line::from(vec![
            Span::styled("Score ", Style::default().fg(Color::Yellow)),
            Span::styled(state.score.to_string(), Style::default().fg(Color::White)),
            Span::styled("  Best ", Style::default().fg(Color::Yellow)),
            Span::styled(
                state.high_score.to_string(),
                Style::default().fg(Color::White),
            ),
        ])
    };

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " GAME OVER ",
            Style::default().fg(Color::Red).bold(),
        )),
        Line::from(""),
        score_line,
        Line::from(Span::styled(
            "R restart   Q quit",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    Clear.render(popup, frame.buffer_mut());
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
        .render(popup, frame.buffer_mut());
}
