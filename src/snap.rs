//! Snap a released piece into its slot and track completion.

use crate::collab::{Renderer, UiShell, VisualState};
use crate::piece::{BOARD_DEPTH, target_position};
use crate::session::PuzzleSession;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SnapOutcome {
    /// Piece is now fixed in its slot; `completed` when it was the last one.
    Locked { completed: bool },
    /// Too far from its slot; left where it was dropped.
    Missed { distance: f32 },
    /// Piece was already locked; nothing changed.
    AlreadyLocked,
}

impl PuzzleSession {
    /// Lock piece `index` if it lies strictly within half a piece width of
    /// its slot. Fires [`UiShell::puzzle_completed`] on the lock that fills the board.
    pub fn evaluate_snap(
        &mut self,
        index: usize,
        renderer: &mut impl Renderer,
        shell: &mut impl UiShell,
    ) -> SnapOutcome {
        let dimensions = self.dimensions;
        let size = self.piece_size;
        let Some(piece) = self.pieces.get_mut(index) else {
            return SnapOutcome::Missed {
                distance: f32::INFINITY,
            };
        };
        if piece.locked {
            return SnapOutcome::AlreadyLocked;
        }

        let (row, col) = dimensions.position_of(index);
        let target = target_position(dimensions, size, row, col);
        let distance = piece.position.xy().distance(target);
        if distance >= size.width / 2.0 {
            debug!(piece = %piece, distance, "dropped");
            return SnapOutcome::Missed { distance };
        }

        piece.position = target.extend(BOARD_DEPTH);
        piece.locked = true;
        renderer.set_position(piece.visual, piece.position);
        renderer.set_visual_state(piece.visual, VisualState::Locked);
        self.correct_count += 1;
        debug!(
            piece = %piece,
            placed = self.correct_count,
            total = self.total_count,
            "locked"
        );

        let completed = self.correct_count == self.total_count;
        if completed {
            self.complete = true;
            info!(image = %self.image_id, pieces = self.total_count, "puzzle complete");
            shell.puzzle_completed();
        }
        SnapOutcome::Locked { completed }
    }
}
