//! Grid planning: how many columns and rows an image is cut into, how big
//! each piece is on the board, and which part of the texture it shows.

use crate::geom::Point2;
use crate::session::PuzzleError;

pub const MIN_DIFFICULTY: u32 = 2;
pub const MAX_DIFFICULTY: u32 = 6;
pub const DEFAULT_DIFFICULTY: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridDimensions {
    pub columns: u32,
    pub rows: u32,
}

impl GridDimensions {
    pub fn piece_count(&self) -> usize {
        self.columns as usize * self.rows as usize
    }

    /// `(row, col)` of a row-major index.
    pub fn position_of(&self, index: usize) -> (u32, u32) {
        let columns = self.columns as usize;
        ((index / columns) as u32, (index % columns) as u32)
    }

    pub fn index_of(&self, row: u32, col: u32) -> usize {
        row as usize * self.columns as usize + col as usize
    }
}

/// Piece extent in board units. The board is one unit tall.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PieceSize {
    pub width: f32,
    pub height: f32,
}

impl PieceSize {
    pub fn for_grid(dimensions: GridDimensions, image_width: u32, image_height: u32) -> Self {
        let height = 1.0 / dimensions.rows as f32;
        let aspect = image_width as f32 / image_height as f32;
        Self {
            width: aspect / dimensions.columns as f32,
            height,
        }
    }
}

/// Texture coordinates of a piece quad, origin at the bottom-left of the image.
/// Order: bottom-left, bottom-right, top-left, top-right.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvRect(pub [Point2; 4]);

impl UvRect {
    pub const fn bottom_left(&self) -> Point2 {
        self.0[0]
    }

    pub const fn top_right(&self) -> Point2 {
        self.0[3]
    }

    /// Interpolate inside the rectangle; `(0, 0)` is bottom-left, `(1, 1)` top-right.
    pub fn lerp(&self, s: f32, t: f32) -> Point2 {
        let min = self.bottom_left();
        let max = self.top_right();
        Point2::new(min.x + (max.x - min.x) * s, min.y + (max.y - min.y) * t)
    }
}

/// Cut the shorter image axis into `difficulty` pieces and the longer one into
/// `difficulty * longer / shorter`, truncated. Square images take the
/// width-is-longer branch.
pub fn plan_grid(width: u32, height: u32, difficulty: u32) -> Result<GridDimensions, PuzzleError> {
    if width == 0 || height == 0 {
        return Err(PuzzleError::InvalidConfiguration(format!(
            "image must have a positive size, got {width}x{height}"
        )));
    }
    if difficulty == 0 {
        return Err(PuzzleError::InvalidConfiguration(
            "difficulty must be at least 1".to_string(),
        ));
    }
    let scaled = |longer: u32, shorter: u32| {
        let divisions = u64::from(difficulty) * u64::from(longer) / u64::from(shorter);
        u32::try_from(divisions).map_err(|_| {
            PuzzleError::InvalidConfiguration(format!(
                "{width}x{height} at difficulty {difficulty} needs too many pieces"
            ))
        })
    };
    if width < height {
        Ok(GridDimensions {
            columns: difficulty,
            rows: scaled(height, width)?,
        })
    } else {
        Ok(GridDimensions {
            columns: scaled(width, height)?,
            rows: difficulty,
        })
    }
}

/// Texture rectangle of the piece at `(row, col)`; winding matches the quad
/// vertices (anti-clockwise from bottom-left).
pub fn uv_rect(dimensions: GridDimensions, row: u32, col: u32) -> UvRect {
    let w = 1.0 / dimensions.columns as f32;
    let h = 1.0 / dimensions.rows as f32;
    let (c, r) = (col as f32, row as f32);
    UvRect([
        Point2::new(w * c, h * r),
        Point2::new(w * (c + 1.0), h * r),
        Point2::new(w * c, h * (r + 1.0)),
        Point2::new(w * (c + 1.0), h * (r + 1.0)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn landscape_image_gets_difficulty_rows() {
        let dims = plan_grid(800, 400, 4).unwrap();
        assert_eq!(dims, GridDimensions { columns: 8, rows: 4 });
        assert_eq!(dims.piece_count(), 32);
    }

    #[test]
    fn portrait_image_gets_difficulty_columns() {
        let dims = plan_grid(300, 500, 3).unwrap();
        assert_eq!(dims, GridDimensions { columns: 3, rows: 5 });
    }

    #[test]
    fn longer_axis_is_truncated() {
        // 4 * 1000 / 300 = 13.33..
        let dims = plan_grid(1000, 300, 4).unwrap();
        assert_eq!(dims, GridDimensions { columns: 13, rows: 4 });
    }

    #[test]
    fn square_image_takes_width_branch() {
        let dims = plan_grid(512, 512, 5).unwrap();
        assert_eq!(dims, GridDimensions { columns: 5, rows: 5 });
        let almost = plan_grid(513, 512, 5).unwrap();
        assert_eq!(almost, GridDimensions { columns: 5, rows: 5 });
    }

    #[test]
    fn zero_sized_image_is_rejected() {
        assert!(matches!(
            plan_grid(0, 100, 4),
            Err(PuzzleError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            plan_grid(100, 0, 4),
            Err(PuzzleError::InvalidConfiguration(_))
        ));
        assert!(plan_grid(100, 100, 0).is_err());
    }

    #[test]
    fn piece_size_keeps_board_one_unit_tall() {
        let dims = plan_grid(800, 400, 4).unwrap();
        let size = PieceSize::for_grid(dims, 800, 400);
        assert_eq!(size.height, 0.25);
        assert_eq!(size.width, 0.25);
        assert!((size.height * dims.rows as f32 - 1.0).abs() < 1e-6);
    }

    #[test]
    fn uv_rect_order_is_bl_br_tl_tr() {
        let dims = GridDimensions { columns: 4, rows: 2 };
        let uv = uv_rect(dims, 1, 2);
        assert_eq!(
            uv.0,
            [
                Point2::new(0.5, 0.5),
                Point2::new(0.75, 0.5),
                Point2::new(0.5, 1.0),
                Point2::new(0.75, 1.0),
            ]
        );
        assert_eq!(uv.lerp(0.5, 0.5), Point2::new(0.625, 0.75));
    }

    #[test]
    fn index_and_position_agree() {
        let dims = GridDimensions { columns: 7, rows: 3 };
        for index in 0..dims.piece_count() {
            let (row, col) = dims.position_of(index);
            assert!(row < dims.rows && col < dims.columns);
            assert_eq!(dims.index_of(row, col), index);
        }
    }

    proptest! {
        #[test]
        fn shorter_axis_has_exactly_difficulty_divisions(
            width in 1u32..5000,
            height in 1u32..5000,
            difficulty in MIN_DIFFICULTY..=MAX_DIFFICULTY,
        ) {
            let dims = plan_grid(width, height, difficulty).unwrap();
            if width < height {
                prop_assert_eq!(dims.columns, difficulty);
                prop_assert!(dims.rows >= difficulty);
            } else {
                prop_assert_eq!(dims.rows, difficulty);
                prop_assert!(dims.columns >= difficulty);
            }
            prop_assert_eq!(dims.piece_count(), (dims.columns * dims.rows) as usize);
        }
    }
}
