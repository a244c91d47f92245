//! Layout and drawing: level select, board, status bar, solved popup.

use crate::app::{MenuState, Screen};
use crate::canvas::{TerminalCanvas, TerminalViewport};
use crate::catalog::{Catalog, PuzzleImage};
use crate::collab::Viewport;
use crate::grid::{MAX_DIFFICULTY, MIN_DIFFICULTY};
use crate::input::{BOARD_HINTS, MENU_HINTS, SOLVED_HINTS, hint_line};
use crate::session::PuzzleSession;
use crate::theme::Theme;
use image::Rgba;
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tachyonfx::{
    CellFilter, Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx, ref_count,
};

/// Border glow when the last piece locks.
const SOLVE_FADE_MS: u32 = 900;
const MENU_LIST_WIDTH: u16 = 30;
const STATUS_HEIGHT: u16 = 1;

/// Everything above the status bar; the camera covers this area.
pub fn board_area(area: Rect) -> Rect {
    Rect {
        height: area.height.saturating_sub(STATUS_HEIGHT),
        ..area
    }
}

fn status_area(area: Rect) -> Rect {
    Rect {
        y: area.y + area.height.saturating_sub(STATUS_HEIGHT),
        height: STATUS_HEIGHT.min(area.height),
        ..area
    }
}

fn to_color(pixel: Rgba<u8>) -> Color {
    Color::Rgb(pixel[0], pixel[1], pixel[2])
}

/// State the board view needs from the app.
pub struct BoardView<'a> {
    pub canvas: &'a TerminalCanvas,
    pub session: Option<&'a PuzzleSession>,
    pub viewport: TerminalViewport,
    pub elapsed: Duration,
}

/// Draw the current screen. On the solved screen the border fades into the
/// title colour (TachyonFX) unless `no_animation`; `solve_effect` and
/// `solve_effect_time` carry that effect across frames.
pub fn draw(
    frame: &mut Frame,
    screen: Screen,
    theme: &Theme,
    catalog: &Catalog,
    menu_state: &MenuState,
    board: &BoardView<'_>,
    solve_effect: &mut Option<Effect>,
    solve_effect_time: &mut Option<Instant>,
    no_animation: bool,
    now: Instant,
) {
    let area = frame.area();
    match screen {
        Screen::Menu => draw_menu(frame, theme, catalog, menu_state, area),
        Screen::Playing => {
            draw_board(frame.buffer_mut(), theme, board, theme.border);
            draw_status(frame, theme, board, area);
        }
        Screen::Solved => {
            let fading = !no_animation && solve_effect.as_ref().is_none_or(|e| !e.done());
            let border = if fading { theme.border } else { theme.title };
            let outline_cells = draw_board(frame.buffer_mut(), theme, board, border);
            draw_status(frame, theme, board, area);
            if fading {
                apply_solve_effect(
                    frame,
                    theme,
                    board.viewport.area,
                    outline_cells,
                    solve_effect,
                    solve_effect_time,
                    now,
                );
            }
            draw_solved_popup(frame, theme, board, area);
        }
    }
}

/// Render pieces and border into `buf` as half blocks. Returns the cells the
/// border passes through.
fn draw_board(
    buf: &mut Buffer,
    theme: &Theme,
    board: &BoardView<'_>,
    border: Color,
) -> HashSet<(u16, u16)> {
    let area = board.viewport.area.intersection(buf.area);
    let outline = board.canvas.outline();
    let mut outline_cells = HashSet::new();

    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            let mut on_border = false;
            let mut shade = |lower: bool| {
                let world = board
                    .viewport
                    .screen_to_world(TerminalViewport::half_cell_center(x, y, lower))
                    .xy();
                if let Some(pixel) = board.canvas.color_at(world) {
                    return to_color(pixel);
                }
                if outline.is_some_and(|o| o.on_stroke(world)) {
                    on_border = true;
                    return border;
                }
                theme.bg
            };
            let top = shade(false);
            let bottom = shade(true);
            if on_border {
                outline_cells.insert((x, y));
            }
            buf[(x, y)]
                .set_symbol("▀")
                .set_style(Style::default().fg(top).bg(bottom));
        }
    }
    outline_cells
}

fn apply_solve_effect(
    frame: &mut Frame,
    theme: &Theme,
    board_rect: Rect,
    outline_cells: HashSet<(u16, u16)>,
    solve_effect: &mut Option<Effect>,
    solve_effect_time: &mut Option<Instant>,
    now: Instant,
) {
    let delta = solve_effect_time
        .map(|t| now.saturating_duration_since(t))
        .unwrap_or(Duration::ZERO);
    let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
    *solve_effect_time = Some(now);

    if solve_effect.is_none() {
        let filter = CellFilter::PositionFn(ref_count(move |pos: Position| {
            outline_cells.contains(&(pos.x, pos.y))
        }));
        let effect = fx::fade_to(theme.title, theme.title, (SOLVE_FADE_MS, Interpolation::Linear))
            .with_filter(filter)
            .with_area(board_rect);
        *solve_effect = Some(effect);
    }

    if let Some(effect) = solve_effect {
        frame.render_effect(effect, board_rect, TfxDuration::from_millis(delta_ms));
    }
}

fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn draw_status(frame: &mut Frame, theme: &Theme, board: &BoardView<'_>, area: Rect) {
    let Some(session) = board.session else {
        return;
    };
    Paragraph::new(status_line(theme, session, board.elapsed))
        .style(Style::default().bg(theme.bg))
        .render(status_area(area), frame.buffer_mut());
}

fn status_line(theme: &Theme, session: &PuzzleSession, elapsed: Duration) -> Line<'static> {
    let dims = session.dimensions();
    let fg = Style::default().fg(theme.main_fg).bg(theme.bg);
    let mut spans = vec![
        Span::styled(
            " jigtui ",
            Style::default()
                .fg(theme.bg)
                .bg(theme.title)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(
                " d{} {}x{}  placed {}/{}  {} ",
                session.config().difficulty(),
                dims.columns,
                dims.rows,
                session.correct_count(),
                session.total_count(),
                format_elapsed(elapsed),
            ),
            fg,
        ),
    ];
    if let Some(piece) = session.dragged_index().and_then(|i| session.pieces().get(i)) {
        spans.push(Span::styled(
            format!(" holding {piece} "),
            Style::default().fg(theme.highlight).bg(theme.bg),
        ));
    }
    spans.push(Span::styled(
        format!(" {} ", hint_line(&BOARD_HINTS)),
        Style::default().fg(theme.inactive_fg).bg(theme.bg),
    ));
    Line::from(spans)
}

fn draw_solved_popup(frame: &mut Frame, theme: &Theme, board: &BoardView<'_>, area: Rect) {
    let popup_w = 34u16;
    let popup_h = 7u16;
    let popup = Rect {
        x: area.x + area.width.saturating_sub(popup_w) / 2,
        y: area.y + area.height.saturating_sub(popup_h) / 2,
        width: popup_w.min(area.width),
        height: popup_h.min(area.height),
    };
    let pieces = board.session.map_or(0, PuzzleSession::total_count);
    let lines = vec![
        Line::from(Span::styled(
            " Puzzle complete! ",
            Style::default()
                .fg(Color::Black)
                .bg(theme.title)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(" {} pieces in {} ", pieces, format_elapsed(board.elapsed)),
            Style::default().fg(theme.main_fg),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(" {} ", hint_line(&SOLVED_HINTS)),
            Style::default().fg(theme.main_fg),
        )),
    ];
    Clear.render(popup, frame.buffer_mut());
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .style(Style::default().bg(theme.bg))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.title).bg(theme.bg)),
        )
        .render(popup, frame.buffer_mut());
}

fn draw_menu(
    frame: &mut Frame,
    theme: &Theme,
    catalog: &Catalog,
    menu_state: &MenuState,
    area: Rect,
) {
    let buf = frame.buffer_mut();
    Block::default()
        .style(Style::default().bg(theme.bg))
        .render(area, buf);

    let list_rect = Rect {
        width: MENU_LIST_WIDTH.min(area.width),
        ..area
    };
    let preview_rect = Rect {
        x: area.x + list_rect.width,
        width: area.width.saturating_sub(list_rect.width),
        ..area
    };

    let title_style = Style::default().fg(theme.title).add_modifier(Modifier::BOLD);
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(" Pick a picture ", title_style)),
        Line::from(""),
    ];
    for (i, image) in catalog.iter().enumerate() {
        let style = if i == menu_state.selected {
            Style::default().fg(theme.bg).bg(theme.highlight)
        } else {
            Style::default().fg(theme.main_fg)
        };
        lines.push(Line::from(Span::styled(
            format!(" {} ({}x{}) ", image.name(), image.width(), image.height()),
            style,
        )));
    }
    lines.push(Line::from(""));
    let left = if menu_state.difficulty > MIN_DIFFICULTY { "◀" } else { " " };
    let right = if menu_state.difficulty < MAX_DIFFICULTY { "▶" } else { " " };
    lines.push(Line::from(vec![
        Span::styled(" Difficulty ", title_style),
        Span::styled(
            format!("{left} {} {right}", menu_state.difficulty),
            Style::default().fg(theme.highlight),
        ),
    ]));
    lines.push(Line::from(""));
    for pair in MENU_HINTS.chunks(2) {
        lines.push(Line::from(Span::styled(
            format!(" {} ", hint_line(pair)),
            Style::default().fg(theme.inactive_fg),
        )));
    }
    if let Some(message) = &menu_state.message {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {message} "),
            Style::default().fg(Color::White).bg(Color::Red),
        )));
    }
    Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border))
                .title(Span::styled(" jigtui ", title_style)),
        )
        .render(list_rect, buf);

    if let Some(image) = catalog.get(menu_state.selected) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border));
        let inner = block.inner(preview_rect);
        block.render(preview_rect, buf);
        draw_thumbnail(buf, image, inner);
    }
}

/// Letterboxed preview of `image` inside `area`, two pixels per cell.
fn draw_thumbnail(buf: &mut Buffer, image: &PuzzleImage, area: Rect) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let aspect = image.width() as f32 / image.height() as f32;
    let avail_w = area.width as f32;
    let avail_h = area.height as f32 * 2.0;
    let (w, h) = if avail_w / avail_h > aspect {
        (avail_h * aspect, avail_h)
    } else {
        (avail_w, avail_w / aspect)
    };
    let cols = (w as u16).max(1).min(area.width);
    let rows = ((h / 2.0) as u16).max(1).min(area.height);
    let x0 = area.x + (area.width - cols) / 2;
    let y0 = area.y + (area.height - rows) / 2;
    let pixel_rows = rows as f32 * 2.0;

    for cy in 0..rows {
        for cx in 0..cols {
            let u = (cx as f32 + 0.5) / cols as f32;
            let top_v = 1.0 - (cy as f32 * 2.0 + 0.5) / pixel_rows;
            let bottom_v = 1.0 - (cy as f32 * 2.0 + 1.5) / pixel_rows;
            let top = to_color(image.sample(u, top_v));
            let bottom = to_color(image.sample(u, bottom_v));
            buf[(x0 + cx, y0 + cy)]
                .set_symbol("▀")
                .set_style(Style::default().fg(top).bg(bottom));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::Renderer;
    use crate::collab::testing::solid_image;
    use crate::geom::Point3;
    use crate::piece::BOARD_DEPTH;

    #[test]
    fn board_area_leaves_room_for_status() {
        let area = Rect::new(0, 0, 80, 24);
        assert_eq!(board_area(area), Rect::new(0, 0, 80, 23));
        assert_eq!(status_area(area), Rect::new(0, 23, 80, 1));
    }

    #[test]
    fn board_draws_pieces_and_border() {
        let mut canvas = TerminalCanvas::new();
        canvas.draw_outline(
            [
                Point3::new(-1.0, 0.5, BOARD_DEPTH),
                Point3::new(1.0, 0.5, BOARD_DEPTH),
                Point3::new(1.0, -0.5, BOARD_DEPTH),
                Point3::new(-1.0, -0.5, BOARD_DEPTH),
            ],
            0.3,
        );
        let image = solid_image("s", 4, 4);
        let handle = canvas.create_piece_visual(
            crate::collab::PieceGeometry {
                width: 0.5,
                height: 0.5,
            },
            crate::grid::uv_rect(crate::grid::GridDimensions { columns: 1, rows: 1 }, 0, 0),
            &image,
        );
        canvas.set_position(handle, Point3::new(0.0, 0.0, -1.0));

        let area = Rect::new(0, 0, 40, 10);
        let mut buf = Buffer::empty(area);
        let theme = Theme::default();
        let view = BoardView {
            canvas: &canvas,
            session: None,
            viewport: TerminalViewport::new(area, 1.0),
            elapsed: Duration::ZERO,
        };
        let outline_cells = draw_board(&mut buf, &theme, &view, theme.border);

        assert!(!outline_cells.is_empty());
        let center = &buf[(20, 5)];
        assert_eq!(center.fg, Color::Rgb(200, 120, 40));
        let corner = &buf[(0, 0)];
        assert_eq!(corner.fg, theme.bg);
    }

    #[test]
    fn status_names_the_held_piece() {
        use crate::collab::PointerSample;
        use crate::collab::testing::{CompletionCounter, FixedViewport, RecordingRenderer};
        use rand::SeedableRng;
        use rand::rngs::StdRng;

        let image = solid_image("wide", 200, 100);
        let viewport = FixedViewport {
            half_width: 2.0,
            half_height: 1.0,
        };
        let mut renderer = RecordingRenderer::default();
        let mut shell = CompletionCounter::default();
        let mut rng = StdRng::seed_from_u64(4);
        let mut session =
            PuzzleSession::start(2, &image, &viewport, &mut rng, &mut renderer).unwrap();
        let theme = Theme::default();
        let text = |session: &PuzzleSession| -> String {
            status_line(&theme, session, Duration::from_secs(61))
                .spans
                .iter()
                .map(|span| span.content.as_ref())
                .collect()
        };

        let idle = text(&session);
        assert!(idle.contains(" d2 4x2  placed 0/8  01:01 "), "{idle}");
        assert!(!idle.contains("holding"));
        assert!(idle.contains(&hint_line(&BOARD_HINTS)));

        let grab = session.pieces()[3].position.xy();
        session.step(PointerSample::press(grab), &mut renderer, &mut shell);
        let held = session.dragged_index().unwrap();
        assert!(text(&session).contains(&format!("holding Piece {held}")));
    }

    #[test]
    fn elapsed_is_minutes_and_seconds() {
        assert_eq!(format_elapsed(Duration::from_secs(125)), "02:05");
    }
}
