//! Seams between the puzzle core and whatever hosts it: rendering, pointer
//! input, viewport mapping and the UI shell.

use crate::catalog::PuzzleImage;
use crate::geom::{Point2, Point3};
use crate::grid::UvRect;

/// Opaque id of a piece visual owned by a [`Renderer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VisualHandle(pub u32);

/// Quad size of a piece visual, centred on its position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PieceGeometry {
    pub width: f32,
    pub height: f32,
}

/// How a piece visual should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisualState {
    /// Loose on the table, can be picked up.
    #[default]
    Idle,
    /// Following the pointer; drawn above everything else.
    Dragged,
    /// Snapped into the board; no longer interactive.
    Locked,
}

pub trait Renderer {
    /// Register a textured quad showing `uv` of `texture`.
    fn create_piece_visual(
        &mut self,
        geometry: PieceGeometry,
        uv: UvRect,
        texture: &PuzzleImage,
    ) -> VisualHandle;
    fn set_position(&mut self, handle: VisualHandle, position: Point3);
    fn set_visual_state(&mut self, handle: VisualHandle, state: VisualState);
    /// Closed outline through `corners`, in order.
    fn draw_outline(&mut self, corners: [Point3; 4], line_width: f32);
    fn clear_outline(&mut self);
    fn destroy(&mut self, handle: VisualHandle);
}

/// Pointer position in host screen units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
}

pub trait InputSource {
    fn current_pointer_position(&self) -> Option<ScreenPoint>;
    fn was_pressed_this_step(&self) -> bool;
    fn is_press_held(&self) -> bool;
    fn was_released_this_step(&self) -> bool;
}

pub trait Viewport {
    fn screen_to_world(&self, point: ScreenPoint) -> Point3;
    /// Half width and half height of the visible world region.
    fn viewport_half_extents(&self) -> (f32, f32);
}

pub trait UiShell {
    /// Every piece is locked; offer to play again.
    fn puzzle_completed(&mut self);
}

/// One frame of pointer input, already mapped to world space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerSample {
    pub world: Option<Point2>,
    pub pressed: bool,
    pub held: bool,
    pub released: bool,
}

impl PointerSample {
    pub fn poll(input: &impl InputSource, viewport: &impl Viewport) -> Self {
        Self {
            world: input
                .current_pointer_position()
                .map(|p| viewport.screen_to_world(p).xy()),
            pressed: input.was_pressed_this_step(),
            held: input.is_press_held(),
            released: input.was_released_this_step(),
        }
    }
}
