//! Terminal-side renderer and camera. Each terminal cell holds two square-ish
//! "pixels" (upper and lower half block); screen points are in those pixel units.

use crate::catalog::PuzzleImage;
use crate::collab::{
    PieceGeometry, Renderer, ScreenPoint, VisualHandle, VisualState, Viewport,
};
use crate::geom::{Point2, Point3};
use crate::grid::UvRect;
use crate::piece::PIECE_DEPTH;
use image::Rgba;
use ratatui::layout::Rect;

#[derive(Debug, Clone)]
pub struct CanvasVisual {
    pub geometry: PieceGeometry,
    pub uv: UvRect,
    pub texture: PuzzleImage,
    pub position: Point3,
    pub state: VisualState,
}

impl CanvasVisual {
    /// Texture colour under `point`, if the quad covers it.
    fn sample(&self, point: Point2) -> Option<Rgba<u8>> {
        let left = self.position.x - self.geometry.width / 2.0;
        let bottom = self.position.y - self.geometry.height / 2.0;
        let s = (point.x - left) / self.geometry.width;
        let t = (point.y - bottom) / self.geometry.height;
        if !(0.0..=1.0).contains(&s) || !(0.0..=1.0).contains(&t) {
            return None;
        }
        let uv = self.uv.lerp(s, t);
        Some(self.texture.sample(uv.x, uv.y))
    }

    const fn layer(&self) -> u8 {
        match self.state {
            VisualState::Locked => 0,
            VisualState::Idle => 1,
            VisualState::Dragged => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outline {
    pub corners: [Point3; 4],
    pub line_width: f32,
}

impl Outline {
    /// True when `point` lies on the stroke (centred on the edges).
    pub fn on_stroke(&self, point: Point2) -> bool {
        let (mut min, mut max) = (self.corners[0].xy(), self.corners[0].xy());
        for c in &self.corners[1..] {
            min = Point2::new(min.x.min(c.x), min.y.min(c.y));
            max = Point2::new(max.x.max(c.x), max.y.max(c.y));
        }
        let half = self.line_width / 2.0;
        let inside_outer = point.x >= min.x - half
            && point.x <= max.x + half
            && point.y >= min.y - half
            && point.y <= max.y + half;
        let inside_inner = point.x > min.x + half
            && point.x < max.x - half
            && point.y > min.y + half
            && point.y < max.y - half;
        inside_outer && !inside_inner
    }
}

/// Slab of piece visuals plus the board border.
#[derive(Debug, Default)]
pub struct TerminalCanvas {
    visuals: Vec<Option<CanvasVisual>>,
    outline: Option<Outline>,
}

impl TerminalCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn outline(&self) -> Option<&Outline> {
        self.outline.as_ref()
    }

    /// Colour of the topmost visual at `point`: dragged over loose over locked,
    /// later visuals over earlier ones within a layer.
    pub fn color_at(&self, point: Point2) -> Option<Rgba<u8>> {
        let mut best: Option<(u8, Rgba<u8>)> = None;
        for visual in self.visuals.iter().flatten() {
            let layer = visual.layer();
            if best.is_some_and(|(l, _)| l > layer) {
                continue;
            }
            if let Some(color) = visual.sample(point) {
                best = Some((layer, color));
            }
        }
        best.map(|(_, color)| color)
    }

    fn get_mut(&mut self, handle: VisualHandle) -> Option<&mut CanvasVisual> {
        self.visuals
            .get_mut(handle.0 as usize)
            .and_then(Option::as_mut)
    }
}

#[cfg(test)]
impl TerminalCanvas {
    pub fn visual_count(&self) -> usize {
        self.visuals.iter().flatten().count()
    }
}

impl Renderer for TerminalCanvas {
    fn create_piece_visual(
        &mut self,
        geometry: PieceGeometry,
        uv: UvRect,
        texture: &PuzzleImage,
    ) -> VisualHandle {
        let visual = CanvasVisual {
            geometry,
            uv,
            texture: texture.clone(),
            position: Point3::new(0.0, 0.0, PIECE_DEPTH),
            state: VisualState::Idle,
        };
        // Reuse a freed slot so restarts don't grow the slab.
        if let Some(slot) = self.visuals.iter().position(Option::is_none) {
            self.visuals[slot] = Some(visual);
            return VisualHandle(slot as u32);
        }
        self.visuals.push(Some(visual));
        VisualHandle((self.visuals.len() - 1) as u32)
    }

    fn set_position(&mut self, handle: VisualHandle, position: Point3) {
        if let Some(visual) = self.get_mut(handle) {
            visual.position = position;
        }
    }

    fn set_visual_state(&mut self, handle: VisualHandle, state: VisualState) {
        if let Some(visual) = self.get_mut(handle) {
            visual.state = state;
        }
    }

    fn draw_outline(&mut self, corners: [Point3; 4], line_width: f32) {
        self.outline = Some(Outline {
            corners,
            line_width,
        });
    }

    fn clear_outline(&mut self) {
        self.outline = None;
    }

    fn destroy(&mut self, handle: VisualHandle) {
        if let Some(slot) = self.visuals.get_mut(handle.0 as usize) {
            *slot = None;
        }
    }
}

/// Orthographic camera over a terminal area, centred on the world origin.
/// `view_size` is the world half-height of the area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerminalViewport {
    pub area: Rect,
    pub view_size: f32,
}

impl TerminalViewport {
    pub const fn new(area: Rect, view_size: f32) -> Self {
        Self { area, view_size }
    }

    /// Centre of the upper (`lower = false`) or lower half of a terminal cell.
    pub fn half_cell_center(column: u16, row: u16, lower: bool) -> ScreenPoint {
        ScreenPoint {
            x: column as f32 + 0.5,
            y: row as f32 * 2.0 + if lower { 1.5 } else { 0.5 },
        }
    }

    /// Where a mouse event in `(column, row)` points: the middle of the cell.
    pub fn cell_center(column: u16, row: u16) -> ScreenPoint {
        ScreenPoint {
            x: column as f32 + 0.5,
            y: row as f32 * 2.0 + 1.0,
        }
    }

    fn pixel_height(&self) -> f32 {
        (self.area.height as f32 * 2.0).max(1.0)
    }

    /// World length covered by one half-cell pixel.
    pub fn world_per_pixel(&self) -> f32 {
        2.0 * self.view_size / self.pixel_height()
    }
}

impl Viewport for TerminalViewport {
    fn screen_to_world(&self, point: ScreenPoint) -> Point3 {
        let scale = self.world_per_pixel();
        let center_x = self.area.x as f32 + self.area.width as f32 / 2.0;
        let center_y = self.area.y as f32 * 2.0 + self.pixel_height() / 2.0;
        Point3::new(
            (point.x - center_x) * scale,
            (center_y - point.y) * scale,
            PIECE_DEPTH,
        )
    }

    fn viewport_half_extents(&self) -> (f32, f32) {
        (
            self.area.width as f32 / 2.0 * self.world_per_pixel(),
            self.view_size,
        )
    }
}
