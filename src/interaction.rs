//! Pointer-driven pick / drag / release, advanced once per frame.

use crate::collab::{PointerSample, Renderer, UiShell, VisualState};
use crate::geom::Point2;
use crate::session::PuzzleSession;
use crate::snap::SnapOutcome;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    /// `grab_offset` is piece position minus pointer position at pick-up and
    /// stays fixed until release.
    Dragging { index: usize, grab_offset: Point2 },
}

/// What a single step did; informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    None,
    PickedUp(usize),
    Dragged(usize),
    /// Released away from its slot.
    Dropped(usize),
    Locked(usize),
    /// Locked the last loose piece.
    Completed(usize),
}

impl PuzzleSession {
    /// Advance the interaction state machine with this frame's pointer sample.
    pub fn step(
        &mut self,
        sample: PointerSample,
        renderer: &mut impl Renderer,
        shell: &mut impl UiShell,
    ) -> StepOutcome {
        let Some(pointer) = sample.world else {
            return StepOutcome::None;
        };
        let mut outcome = StepOutcome::None;

        if sample.pressed && self.state == InteractionState::Idle {
            if let Some(index) = self.hit_test(pointer) {
                let piece = &self.pieces[index];
                let grab_offset = piece.position.xy() - pointer;
                self.state = InteractionState::Dragging { index, grab_offset };
                renderer.set_visual_state(piece.visual, VisualState::Dragged);
                debug!(piece = %piece, "picked up");
                outcome = StepOutcome::PickedUp(index);
            }
        }

        let InteractionState::Dragging { index, grab_offset } = self.state else {
            return outcome;
        };

        if sample.held {
            let piece = &mut self.pieces[index];
            piece.position = (pointer + grab_offset).extend(piece.position.z);
            renderer.set_position(piece.visual, piece.position);
            if outcome == StepOutcome::None {
                outcome = StepOutcome::Dragged(index);
            }
        }

        if sample.released {
            let snap = self.evaluate_snap(index, renderer, shell);
            self.state = InteractionState::Idle;
            outcome = match snap {
                SnapOutcome::Locked { completed: true } => StepOutcome::Completed(index),
                SnapOutcome::Locked { completed: false } | SnapOutcome::AlreadyLocked => {
                    StepOutcome::Locked(index)
                }
                SnapOutcome::Missed { .. } => {
                    renderer.set_visual_state(self.pieces[index].visual, VisualState::Idle);
                    StepOutcome::Dropped(index)
                }
            };
        }

        outcome
    }
}
