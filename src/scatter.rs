//! Random initial placement of loose pieces.

use crate::collab::Renderer;
use crate::geom::Point3;
use crate::grid::PieceSize;
use crate::piece::{PIECE_DEPTH, Piece};
use rand::Rng;

/// Shrink viewport half extents by half a piece so a piece centred anywhere
/// inside stays fully visible. Never negative.
pub fn scatter_extents(viewport_half_extents: (f32, f32), size: PieceSize) -> (f32, f32) {
    let (half_w, half_h) = viewport_half_extents;
    (
        (half_w - size.width / 2.0).max(0.0),
        (half_h - size.height / 2.0).max(0.0),
    )
}

/// Place every piece uniformly at random in `[-x, x] × [-y, y]`, each axis drawn independently.
pub fn scatter<R: Rng + ?Sized>(
    pieces: &mut [Piece],
    extents: (f32, f32),
    rng: &mut R,
    renderer: &mut impl Renderer,
) {
    let (ex, ey) = extents;
    for piece in pieces {
        let x = rng.random_range(-ex..=ex);
        let y = rng.random_range(-ey..=ey);
        piece.position = Point3::new(x, y, PIECE_DEPTH);
        renderer.set_position(piece.visual, piece.position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::testing::{RecordingRenderer, solid_image};
    use crate::grid::plan_grid;
    use crate::piece::create_pieces;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn pieces(renderer: &mut RecordingRenderer) -> (Vec<Piece>, PieceSize) {
        let dims = plan_grid(300, 200, 3).unwrap();
        let size = PieceSize::for_grid(dims, 300, 200);
        let image = solid_image("img", 300, 200);
        (create_pieces(dims, size, &image, renderer), size)
    }

    #[test]
    fn extents_leave_room_for_half_a_piece() {
        let size = PieceSize {
            width: 0.5,
            height: 0.25,
        };
        assert_eq!(scatter_extents((2.0, 1.0), size), (1.75, 0.875));
        assert_eq!(scatter_extents((0.1, 0.1), size), (0.0, 0.0));
    }

    #[test]
    fn scattered_pieces_stay_fully_visible() {
        let mut renderer = RecordingRenderer::default();
        let (mut pieces, size) = pieces(&mut renderer);
        let (half_w, half_h) = (1.6, 1.0);
        let extents = scatter_extents((half_w, half_h), size);
        let mut rng = StdRng::seed_from_u64(7);
        scatter(&mut pieces, extents, &mut rng, &mut renderer);

        for piece in &pieces {
            let p = piece.position;
            assert_eq!(p.z, PIECE_DEPTH);
            assert!(p.x - size.width / 2.0 >= -half_w - 1e-6);
            assert!(p.x + size.width / 2.0 <= half_w + 1e-6);
            assert!(p.y - size.height / 2.0 >= -half_h - 1e-6);
            assert!(p.y + size.height / 2.0 <= half_h + 1e-6);
            assert_eq!(renderer.visual(piece.visual).position, Some(p));
        }
    }

    #[test]
    fn same_seed_same_layout() {
        let mut renderer = RecordingRenderer::default();
        let (mut a, size) = pieces(&mut renderer);
        let mut b = a.clone();
        let extents = scatter_extents((2.0, 1.0), size);
        scatter(&mut a, extents, &mut StdRng::seed_from_u64(42), &mut renderer);
        scatter(&mut b, extents, &mut StdRng::seed_from_u64(42), &mut renderer);
        assert_eq!(a, b);
    }

    #[test]
    fn zero_extents_stack_pieces_at_origin() {
        let mut renderer = RecordingRenderer::default();
        let (mut pieces, _) = pieces(&mut renderer);
        scatter(&mut pieces, (0.0, 0.0), &mut StdRng::seed_from_u64(1), &mut renderer);
        assert!(
            pieces
                .iter()
                .all(|p| p.position.x == 0.0 && p.position.y == 0.0)
        );
    }
}
