//! Piece creation: where every piece belongs on the board and which part of
//! the picture it carries.

use crate::catalog::PuzzleImage;
use crate::collab::{PieceGeometry, Renderer, VisualHandle};
use crate::geom::{Point2, Point3};
use crate::grid::{GridDimensions, PieceSize, UvRect, uv_rect};
use std::fmt;

/// Depth of the board plane (border, locked pieces).
pub const BOARD_DEPTH: f32 = 0.0;
/// Loose pieces sit one layer in front of the board.
pub const PIECE_DEPTH: f32 = -1.0;
pub const BORDER_LINE_WIDTH: f32 = 0.1;

#[derive(Debug, Clone, PartialEq)]
pub struct Piece {
    /// Row-major grid index: `row * columns + col`.
    pub index: usize,
    pub row: u32,
    pub col: u32,
    pub uv: UvRect,
    pub position: Point3,
    pub locked: bool,
    pub visual: VisualHandle,
}

impl Piece {
    /// Point-in-rectangle test against the piece quad (edges inclusive).
    pub fn contains(&self, point: Point2, size: PieceSize) -> bool {
        let dx = (point.x - self.position.x).abs();
        let dy = (point.y - self.position.y).abs();
        dx <= size.width / 2.0 && dy <= size.height / 2.0
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Piece {}", self.index)
    }
}

/// Solved position of the piece at `(row, col)`, with the whole board centred on the origin.
pub fn target_position(
    dimensions: GridDimensions,
    size: PieceSize,
    row: u32,
    col: u32,
) -> Point2 {
    let (w, h) = (size.width, size.height);
    Point2::new(
        (-w * dimensions.columns as f32 / 2.0) + (w * col as f32) + (w / 2.0),
        (-h * dimensions.rows as f32 / 2.0) + (h * row as f32) + (h / 2.0),
    )
}

/// Border corners: top-left, top-right, bottom-right, bottom-left.
pub fn board_outline(dimensions: GridDimensions, size: PieceSize) -> [Point3; 4] {
    let half_w = size.width * dimensions.columns as f32 / 2.0;
    let half_h = size.height * dimensions.rows as f32 / 2.0;
    [
        Point3::new(-half_w, half_h, BOARD_DEPTH),
        Point3::new(half_w, half_h, BOARD_DEPTH),
        Point3::new(half_w, -half_h, BOARD_DEPTH),
        Point3::new(-half_w, -half_h, BOARD_DEPTH),
    ]
}

/// Build every piece in its solved position and register its visual.
pub fn create_pieces(
    dimensions: GridDimensions,
    size: PieceSize,
    image: &PuzzleImage,
    renderer: &mut impl Renderer,
) -> Vec<Piece> {
    let geometry = PieceGeometry {
        width: size.width,
        height: size.height,
    };
    let mut pieces = Vec::with_capacity(dimensions.piece_count());
    for row in 0..dimensions.rows {
        for col in 0..dimensions.columns {
            let uv = uv_rect(dimensions, row, col);
            let position = target_position(dimensions, size, row, col).extend(PIECE_DEPTH);
            let visual = renderer.create_piece_visual(geometry, uv, image);
            renderer.set_position(visual, position);
            pieces.push(Piece {
                index: dimensions.index_of(row, col),
                row,
                col,
                uv,
                position,
                locked: false,
                visual,
            });
        }
    }
    pieces
}
