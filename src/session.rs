//! A single puzzle game: pieces, counters, interaction state.

use crate::catalog::PuzzleImage;
use crate::collab::{Renderer, Viewport};
use crate::geom::Point2;
use crate::grid::{GridDimensions, MAX_DIFFICULTY, MIN_DIFFICULTY, PieceSize, plan_grid};
use crate::interaction::InteractionState;
use crate::piece::{BORDER_LINE_WIDTH, Piece, board_outline, create_pieces};
use crate::scatter::{scatter, scatter_extents};
use rand::Rng;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PuzzleError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Validated game parameters. Immutable once a game starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PuzzleConfig {
    difficulty: u32,
    image_width: u32,
    image_height: u32,
}

impl PuzzleConfig {
    pub fn new(difficulty: u32, image_width: u32, image_height: u32) -> Result<Self, PuzzleError> {
        if !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&difficulty) {
            return Err(PuzzleError::InvalidConfiguration(format!(
                "difficulty {difficulty} outside {MIN_DIFFICULTY}..={MAX_DIFFICULTY}"
            )));
        }
        if image_width == 0 || image_height == 0 {
            return Err(PuzzleError::InvalidConfiguration(format!(
                "image must have a positive size, got {image_width}x{image_height}"
            )));
        }
        Ok(Self {
            difficulty,
            image_width,
            image_height,
        })
    }

    pub const fn difficulty(&self) -> u32 {
        self.difficulty
    }

    pub const fn image_size(&self) -> (u32, u32) {
        (self.image_width, self.image_height)
    }
}

#[derive(Debug)]
pub struct PuzzleSession {
    pub(crate) config: PuzzleConfig,
    pub(crate) image_id: String,
    pub(crate) dimensions: GridDimensions,
    pub(crate) piece_size: PieceSize,
    pub(crate) pieces: Vec<Piece>,
    pub(crate) correct_count: usize,
    pub(crate) total_count: usize,
    pub(crate) state: InteractionState,
    pub(crate) complete: bool,
}

impl PuzzleSession {
    /// Cut `image` into pieces, scatter them over the viewport and draw the
    /// board border. Nothing reaches the renderer if the configuration is invalid.
    pub fn start<R: Rng + ?Sized>(
        difficulty: u32,
        image: &PuzzleImage,
        viewport: &impl Viewport,
        rng: &mut R,
        renderer: &mut impl Renderer,
    ) -> Result<Self, PuzzleError> {
        let config = PuzzleConfig::new(difficulty, image.width(), image.height())?;
        let (width, height) = config.image_size();
        let dimensions = plan_grid(width, height, difficulty)?;
        let piece_size = PieceSize::for_grid(dimensions, width, height);

        let mut pieces = create_pieces(dimensions, piece_size, image, renderer);
        let extents = scatter_extents(viewport.viewport_half_extents(), piece_size);
        scatter(&mut pieces, extents, rng, renderer);
        renderer.draw_outline(board_outline(dimensions, piece_size), BORDER_LINE_WIDTH);

        let total_count = pieces.len();
        info!(
            image = image.id(),
            difficulty,
            columns = dimensions.columns,
            rows = dimensions.rows,
            pieces = total_count,
            "puzzle started"
        );
        Ok(Self {
            config,
            image_id: image.id().to_string(),
            dimensions,
            piece_size,
            pieces,
            correct_count: 0,
            total_count,
            state: InteractionState::Idle,
            complete: false,
        })
    }

    /// Tear the game down: every piece visual is destroyed and the border hidden.
    pub fn restart(self, renderer: &mut impl Renderer) {
        for piece in &self.pieces {
            renderer.destroy(piece.visual);
        }
        renderer.clear_outline();
        info!(
            image = %self.image_id,
            placed = self.correct_count,
            total = self.total_count,
            "puzzle discarded"
        );
    }

    /// Topmost unlocked piece under `point`. Later pieces draw over earlier ones.
    pub fn hit_test(&self, point: Point2) -> Option<usize> {
        self.pieces
            .iter()
            .rev()
            .find(|piece| !piece.locked && piece.contains(point, self.piece_size))
            .map(|piece| piece.index)
    }

    pub const fn config(&self) -> &PuzzleConfig {
        &self.config
    }

    pub fn image_id(&self) -> &str {
        &self.image_id
    }

    pub const fn dimensions(&self) -> GridDimensions {
        self.dimensions
    }

    pub const fn piece_size(&self) -> PieceSize {
        self.piece_size
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub const fn correct_count(&self) -> usize {
        self.correct_count
    }

    pub const fn total_count(&self) -> usize {
        self.total_count
    }

    pub const fn is_complete(&self) -> bool {
        self.complete
    }

    pub const fn dragged_index(&self) -> Option<usize> {
        match self.state {
            InteractionState::Dragging { index, .. } => Some(index),
            InteractionState::Idle => None,
        }
    }
}
