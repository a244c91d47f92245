//! App: terminal init, main loop, screens, key and mouse handling.

use crate::GameConfig;
use crate::canvas::{TerminalCanvas, TerminalViewport};
use crate::catalog::Catalog;
use crate::collab::{PointerSample, UiShell};
use crate::input::{Action, TerminalInput, key_to_action};
use crate::interaction::StepOutcome;
use crate::session::PuzzleSession;
use crate::theme::Theme;
use crate::ui::{self, BoardView};
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use rand::SeedableRng;
use rand::rngs::StdRng;
use ratatui::DefaultTerminal;
use ratatui::layout::Rect;
use std::time::{Duration, Instant};
use tachyonfx::Effect;
use tracing::{debug, info, warn};

/// ~60 frames per second; the puzzle steps once per frame.
const FRAME_DURATION: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Menu,
    Playing,
    Solved,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuState {
    /// Index into the catalog.
    pub selected: usize,
    pub difficulty: u32,
    /// Last start failure, shown under the menu.
    pub message: Option<String>,
}

/// The UI-shell half of completion: remembers that "play again" is due.
#[derive(Debug, Default)]
struct PlayAgainPrompt {
    pending: bool,
}

impl PlayAgainPrompt {
    fn take(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }
}

impl UiShell for PlayAgainPrompt {
    fn puzzle_completed(&mut self) {
        self.pending = true;
    }
}

pub struct App {
    config: GameConfig,
    theme: Theme,
    catalog: Catalog,
    canvas: TerminalCanvas,
    input: TerminalInput,
    shell: PlayAgainPrompt,
    session: Option<PuzzleSession>,
    screen: Screen,
    menu_state: MenuState,
    rng: StdRng,
    game_start: Instant,
    /// Frozen play time once solved.
    solved_in: Option<Duration>,
    /// TachyonFX border glow (created when the solved screen first draws).
    solve_effect: Option<Effect>,
    /// Last time we processed the glow (for delta).
    solve_effect_process_time: Option<Instant>,
}

impl App {
    pub fn new(config: GameConfig, theme: Theme, catalog: Catalog) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        let menu_state = MenuState {
            selected: 0,
            difficulty: config.difficulty,
            message: None,
        };
        Self {
            config,
            theme,
            catalog,
            canvas: TerminalCanvas::new(),
            input: TerminalInput::default(),
            shell: PlayAgainPrompt::default(),
            session: None,
            screen: Screen::Menu,
            menu_state,
            rng,
            game_start: Instant::now(),
            solved_in: None,
            solve_effect: None,
            solve_effect_process_time: None,
        }
    }

    fn current_viewport(&self) -> TerminalViewport {
        let (cols, rows) = crossterm::terminal::size().unwrap_or((80, 24));
        TerminalViewport::new(
            ui::board_area(Rect::new(0, 0, cols, rows)),
            self.config.view_size,
        )
    }

    fn selected_image_id(&self) -> Option<String> {
        self.catalog
            .get(self.menu_state.selected)
            .map(|image| image.id().to_string())
    }

    /// Start a game with the catalog image `image_id`, discarding any running one.
    fn start_game(&mut self, image_id: &str) {
        let Some(image) = self.catalog.lookup(image_id).cloned() else {
            warn!(image = image_id, "unknown puzzle image");
            return;
        };
        if let Some(old) = self.session.take() {
            old.restart(&mut self.canvas);
        }
        let viewport = self.current_viewport();
        match PuzzleSession::start(
            self.menu_state.difficulty,
            &image,
            &viewport,
            &mut self.rng,
            &mut self.canvas,
        ) {
            Ok(session) => {
                if session.piece_size().height < 2.0 * viewport.world_per_pixel() {
                    warn!(
                        view_size = self.config.view_size,
                        "pieces are under two half-cells tall; try a smaller --view-size"
                    );
                }
                self.session = Some(session);
                self.screen = Screen::Playing;
                self.game_start = Instant::now();
                self.solved_in = None;
                self.solve_effect = None;
                self.solve_effect_process_time = None;
                self.shell = PlayAgainPrompt::default();
                self.input.reset();
                self.menu_state.message = None;
            }
            Err(err) => {
                warn!(error = %err, image = image_id, "could not start puzzle");
                self.menu_state.message = Some(err.to_string());
                self.screen = Screen::Menu;
            }
        }
    }

    /// Drop the current game and go back to picture selection.
    fn restart_game(&mut self) {
        if let Some(session) = self.session.take() {
            session.restart(&mut self.canvas);
        }
        self.screen = Screen::Menu;
        self.solved_in = None;
        self.solve_effect = None;
        self.solve_effect_process_time = None;
        self.shell = PlayAgainPrompt::default();
        self.input.reset();
    }

    fn elapsed(&self) -> Duration {
        self.solved_in.unwrap_or_else(|| self.game_start.elapsed())
    }

    /// One interaction step with the pointer edges gathered this frame.
    fn step_puzzle(&mut self) {
        let viewport = self.current_viewport();
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let sample = PointerSample::poll(&self.input, &viewport);
        let outcome = session.step(sample, &mut self.canvas, &mut self.shell);
        self.input.end_step();
        if !matches!(outcome, StepOutcome::None | StepOutcome::Dragged(_)) {
            debug!(?outcome, "step");
        }
        let prompted = self.shell.take();
        if prompted || session.is_complete() {
            self.solved_in = Some(self.game_start.elapsed());
            self.screen = Screen::Solved;
        }
    }

    /// Returns false when the app should exit.
    fn handle_action(&mut self, action: Action) -> bool {
        match self.screen {
            Screen::Menu => match action {
                Action::Quit | Action::Back => return false,
                Action::Up | Action::Down if self.catalog.is_empty() => {}
                Action::Up => {
                    let n = self.catalog.len();
                    self.menu_state.selected = (self.menu_state.selected + n - 1) % n;
                }
                Action::Down => {
                    self.menu_state.selected = (self.menu_state.selected + 1) % self.catalog.len();
                }
                Action::Left => {
                    self.menu_state.difficulty = self
                        .menu_state
                        .difficulty
                        .saturating_sub(1)
                        .max(crate::grid::MIN_DIFFICULTY);
                }
                Action::Right => {
                    self.menu_state.difficulty =
                        (self.menu_state.difficulty + 1).min(crate::grid::MAX_DIFFICULTY);
                }
                Action::Confirm => {
                    if let Some(id) = self.selected_image_id() {
                        self.start_game(&id);
                    }
                }
                Action::Restart | Action::None => {}
            },
            Screen::Playing => match action {
                Action::Quit => return false,
                Action::Back => self.restart_game(),
                Action::Restart => {
                    if let Some(id) = self.session.as_ref().map(|s| s.image_id().to_string()) {
                        self.start_game(&id);
                    }
                }
                _ => {}
            },
            Screen::Solved => match action {
                Action::Quit => return false,
                Action::Confirm | Action::Restart | Action::Back => self.restart_game(),
                _ => {}
            },
        }
        true
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            event::{DisableMouseCapture, EnableMouseCapture},
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        if self.config.no_menu {
            if let Some(id) = self.selected_image_id() {
                self.start_game(&id);
            }
        }

        let result = self.run_loop(&mut terminal);

        // Restore
        if let Some(session) = self.session.take() {
            session.restart(&mut self.canvas);
        }
        execute!(std::io::stdout(), DisableMouseCapture, LeaveAlternateScreen)?;
        disable_raw_mode()?;
        info!("bye");

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            let now = Instant::now();
            let board = BoardView {
                canvas: &self.canvas,
                session: self.session.as_ref(),
                viewport: self.current_viewport(),
                elapsed: self.elapsed(),
            };
            terminal.draw(|f| {
                ui::draw(
                    f,
                    self.screen,
                    &self.theme,
                    &self.catalog,
                    &self.menu_state,
                    &board,
                    &mut self.solve_effect,
                    &mut self.solve_effect_process_time,
                    self.config.no_animation,
                    now,
                );
            })?;

            let timeout = FRAME_DURATION.saturating_sub(now.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    match event::read()? {
                        Event::Key(key) if key.kind == KeyEventKind::Press => {
                            if !self.handle_action(key_to_action(key)) {
                                return Ok(());
                            }
                        }
                        Event::Mouse(mouse) if self.screen == Screen::Playing => {
                            self.input.handle_mouse(mouse);
                        }
                        _ => {}
                    }
                }
            }

            if self.screen == Screen::Playing {
                self.step_puzzle();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::builtin_images;
    use crate::piece::target_position;

    fn app() -> App {
        let config = GameConfig {
            difficulty: 3,
            seed: 1,
            view_size: 1.0,
            no_menu: false,
            no_animation: true,
        };
        let catalog = Catalog::from_images(builtin_images()).unwrap();
        App::new(config, Theme::default(), catalog)
    }

    #[test]
    fn menu_selection_wraps_and_difficulty_clamps() {
        let mut app = app();
        assert!(app.handle_action(Action::Up));
        assert_eq!(app.menu_state.selected, app.catalog.len() - 1);
        app.handle_action(Action::Down);
        assert_eq!(app.menu_state.selected, 0);
        for _ in 0..10 {
            app.handle_action(Action::Right);
        }
        assert_eq!(app.menu_state.difficulty, crate::grid::MAX_DIFFICULTY);
        for _ in 0..10 {
            app.handle_action(Action::Left);
        }
        assert_eq!(app.menu_state.difficulty, crate::grid::MIN_DIFFICULTY);
        assert!(!app.handle_action(Action::Quit));
    }

    #[test]
    fn start_and_restart_manage_visuals() {
        let mut app = app();
        app.start_game("builtin:checkers");
        assert_eq!(app.screen, Screen::Playing);
        let total = app.session.as_ref().map(PuzzleSession::total_count).unwrap();
        assert_eq!(total, 9);
        assert_eq!(app.canvas.visual_count(), 9);
        assert!(app.canvas.outline().is_some());

        app.handle_action(Action::Back);
        assert_eq!(app.screen, Screen::Menu);
        assert!(app.session.is_none());
        assert_eq!(app.canvas.visual_count(), 0);
        assert!(app.canvas.outline().is_none());
    }

    #[test]
    fn unknown_image_keeps_menu() {
        let mut app = app();
        app.start_game("missing");
        assert_eq!(app.screen, Screen::Menu);
        assert!(app.session.is_none());
    }

    #[test]
    fn last_lock_switches_to_solved_screen() {
        let mut app = app();
        app.menu_state.difficulty = 2;
        app.start_game("builtin:checkers");
        let session = app.session.as_mut().unwrap();
        assert_eq!(session.total_count(), 4);

        // Highest index first: every piece above it is locked, so it is the topmost hit.
        for index in (0..session.total_count()).rev() {
            let (row, col) = session.dimensions().position_of(index);
            let goal = target_position(session.dimensions(), session.piece_size(), row, col);
            let grab = session.pieces()[index].position.xy();
            session.step(PointerSample::press(grab), &mut app.canvas, &mut app.shell);
            assert_eq!(session.dragged_index(), Some(index));
            session.step(PointerSample::hold(goal), &mut app.canvas, &mut app.shell);
            session.step(PointerSample::release(goal), &mut app.canvas, &mut app.shell);
        }
        assert!(session.is_complete());
        assert_eq!(app.screen, Screen::Playing);

        app.step_puzzle();
        assert_eq!(app.screen, Screen::Solved);
        assert!(app.solved_in.is_some());

        app.handle_action(Action::Confirm);
        assert_eq!(app.screen, Screen::Menu);
        assert_eq!(app.canvas.visual_count(), 0);
    }

    #[test]
    fn play_again_prompt_is_taken_once() {
        let mut shell = PlayAgainPrompt::default();
        assert!(!shell.take());
        shell.puzzle_completed();
        assert!(shell.take());
        assert!(!shell.take());
    }
}
