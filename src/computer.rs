use rand::seq::SliceRandom;
use rand::Rng;

use crate::board::{Board, Color, PieceType, Square};
use crate::moves::all_legal_moves;

pub fn piece_value(kind: PieceType) -> f64 {
    match kind {
        PieceType::Pawn => 1.0,
        PieceType::Knight | PieceType::Bishop => 3.0,
        PieceType::Rook => 5.0,
        PieceType::Queen => 9.0,
        PieceType::King => 100.0,
    }
}

/// Greedy opponent: the best-scoring capture if there is one, otherwise a random quiet move.
/// A capture scores the captured value minus a tenth of the mover's value.
pub fn choose_move<R: Rng>(board: &Board, color: Color, rng: &mut R) -> Option<(Square, Square)> {
    let (captures, quiet): (Vec<_>, Vec<_>) = all_legal_moves(board, color)
        .into_iter()
        .partition(|&(_, to)| board.get(to).is_some());

    let score = |&(from, to): &(Square, Square)| -> f64 {
        let target = board.get(to).map_or(0.0, |p| piece_value(p.kind));
        let mover = board.get(from).map_or(0.0, |p| piece_value(p.kind));
        target - mover / 10.0
    };

    let mut best: Option<((Square, Square), f64)> = None;
    for mv in captures {
        let s = score(&mv);
        if best.map_or(true, |(_, b)| s > b) {
            best = Some((mv, s));
        }
    }
    match best {
        Some((mv, s)) => {
            log::debug!("Computer captures {:?} -> {:?}, score {}", mv.0, mv.1, s);
            Some(mv)
        }
        None => quiet.choose(rng).copied(),
    }
}
