use std::collections::HashSet;
use crate::board::{on_board, Board, Color, Piece, PieceType, Square, HEIGHT, WIDTH};

fn deltas(from: Square, to: Square) -> (i8, i8) {
    (to.0 as i8 - from.0 as i8, to.1 as i8 - from.1 as i8)
}

/// Every square strictly between `from` and `to` is empty. Only meaningful on a straight or diagonal line.
fn path_clear(board: &Board, from: Square, to: Square) -> bool {
    let (d_row, d_col) = deltas(from, to);
    let vec = [d_row.signum(), d_col.signum()];
    let mut n_row = from.0 as i8 + vec[0];
    let mut n_col = from.1 as i8 + vec[1];
    while (n_row, n_col) != (to.0 as i8, to.1 as i8) {
        if board.squares[n_row as usize][n_col as usize].is_some() {
            return false;
        }
        n_row += vec[0];
        n_col += vec[1];
    }
    true
}

fn pawn_move(board: &Board, pawn: Piece, from: Square, to: Square) -> bool {
    let (d_row, d_col) = deltas(from, to);
    let direction = pawn.color.pawn_direction();
    match (d_row, d_col.abs()) {
        (r, 0) if r == direction => board.get(to).is_none(),
        (r, 0) if r == 2 * direction => {
            let middle = ((from.0 as i8 + direction) as usize, from.1);
            from.0 == pawn.color.pawn_home_row() && board.get(to).is_none() && board.get(middle).is_none()
        }
        (r, 1) if r == direction => board.get(to).is_some_and(|target| target.color != pawn.color),
        _ => false,
    }
}

fn knight_move(from: Square, to: Square) -> bool {
    let (d_row, d_col) = deltas(from, to);
    matches!((d_row.abs(), d_col.abs()), (2, 1) | (1, 2))
}

fn bishop_move(board: &Board, from: Square, to: Square) -> bool {
    let (d_row, d_col) = deltas(from, to);
    d_row != 0 && d_row.abs() == d_col.abs() && path_clear(board, from, to)
}

fn rook_move(board: &Board, from: Square, to: Square) -> bool {
    let (d_row, d_col) = deltas(from, to);
    ((d_row == 0) ^ (d_col == 0)) && path_clear(board, from, to)
}

fn king_move(from: Square, to: Square) -> bool {
    let (d_row, d_col) = deltas(from, to);
    d_row.abs() <= 1 && d_col.abs() <= 1 && (d_row, d_col) != (0, 0)
}

/// Board-level rules without the turn check: occupancy, no self-capture, piece movement and blocking.
pub fn check_movement(board: &Board, from: Square, to: Square) -> Result<Piece, &'static str> {
    if !on_board(from) || !on_board(to) {
        return Err("square is off the board");
    }
    if from == to {
        return Err("piece must leave its square");
    }
    let piece = board.get(from).ok_or("no piece on the origin square")?;
    if board.get(to).is_some_and(|target| target.color == piece.color) {
        return Err("cannot capture own piece");
    }
    let allowed = match piece.kind {
        PieceType::Pawn => pawn_move(board, piece, from, to),
        PieceType::Knight => knight_move(from, to),
        PieceType::Bishop => bishop_move(board, from, to),
        PieceType::Rook => rook_move(board, from, to),
        PieceType::Queen => bishop_move(board, from, to) || rook_move(board, from, to),
        PieceType::King => king_move(from, to),
    };
    if allowed {
        Ok(piece)
    } else {
        Err("piece cannot move that way")
    }
}

/// Full legality for the side to move, with the reason when the move is refused.
pub fn check_move(board: &Board, turn: Color, from: Square, to: Square) -> Result<Piece, &'static str> {
    if on_board(from) && board.get(from).is_some_and(|p| p.color != turn) {
        return Err("piece belongs to the other side");
    }
    check_movement(board, from, to)
}

pub fn is_legal(board: &Board, turn: Color, from: Square, to: Square) -> bool {
    check_move(board, turn, from, to).is_ok()
}

pub fn legal_destinations(board: &Board, turn: Color, from: Square) -> HashSet<Square> {
    (0..HEIGHT)
        .flat_map(|r| (0..WIDTH).map(move |c| (r, c)))
        .filter(|&to| is_legal(board, turn, from, to))
        .collect()
}

/// Legal moves of one side in row-major order of origin, then destination.
pub fn all_legal_moves(board: &Board, turn: Color) -> Vec<(Square, Square)> {
    board.occupied()
        .filter(|(_, piece)| piece.color == turn)
        .flat_map(|(from, _)| {
            (0..HEIGHT)
                .flat_map(|r| (0..WIDTH).map(move |c| (r, c)))
                .filter(move |&to| is_legal(board, turn, from, to))
                .map(move |to| (from, to))
        })
        .collect()
}

#[cfg(test)]
mod test {
    use std::collections::HashSet;
    use crate::board::{new_board, Board, Color, Piece, PieceType, HEIGHT, WIDTH};
    use crate::board::Color::{Black, White};
    use crate::moves::{all_legal_moves, check_movement, is_legal, legal_destinations};

    fn board_one_piece(row: usize, col: usize, color: Color, kind: PieceType) -> Board {
        let mut board = Board::empty();
        board.squares[row][col] = Some(Piece { color, kind });
        board
    }

    const ALL_KINDS: [PieceType; 6] = [
        PieceType::King, PieceType::Queen, PieceType::Rook,
        PieceType::Bishop, PieceType::Knight, PieceType::Pawn,
    ];

    #[test]
    fn test_zero_distance_is_illegal() {
        for kind in ALL_KINDS {
            for color in [White, Black] {
                let board = board_one_piece(3, 3, color, kind);
                assert!(!is_legal(&board, color, (3, 3), (3, 3)), "{:?} {:?}", color, kind);
            }
        }
    }

    #[test]
    fn test_no_self_capture() {
        for kind in ALL_KINDS {
            let mut board = board_one_piece(4, 4, White, kind);
            for &(r, c) in &[(3, 4), (3, 3), (3, 5), (2, 3), (4, 5), (2, 4)] {
                board.squares[r][c] = Some(Piece { color: White, kind: PieceType::Rook });
            }
            for &to in &[(3, 4), (3, 3), (3, 5), (2, 3), (4, 5), (2, 4)] {
                assert!(!is_legal(&board, White, (4, 4), to), "{:?} -> {:?}", kind, to);
            }
        }
    }

    #[test]
    fn test_empty_square_and_wrong_color() {
        let board = new_board();
        assert!(!is_legal(&board, White, (4, 4), (3, 4)));
        assert!(legal_destinations(&board, White, (4, 4)).is_empty());
        assert!(!is_legal(&board, White, (1, 4), (3, 4)));
        assert!(is_legal(&board, Black, (1, 4), (3, 4)));
    }

    #[test]
    fn test_off_board_squares() {
        let board = new_board();
        assert!(!is_legal(&board, White, (6, 4), (8, 4)));
        assert!(!is_legal(&board, White, (9, 9), (5, 4)));
        assert!(!is_legal(&board, White, (6, 4), (usize::MAX, 4)));
        assert_eq!(check_movement(&board, (64, 0), (0, 0)), Err("square is off the board"));
    }

    #[test]
    fn test_sliders_blocked_at_every_distance() {
        for kind in [PieceType::Rook, PieceType::Queen] {
            for distance in 2..8 {
                for blocker in 1..distance {
                    let mut board = board_one_piece(7, 0, White, kind);
                    assert!(is_legal(&board, White, (7, 0), (7 - distance, 0)));
                    board.squares[7 - blocker][0] = Some(Piece { color: Black, kind: PieceType::Pawn });
                    assert!(!is_legal(&board, White, (7, 0), (7 - distance, 0)), "{:?} {} {}", kind, distance, blocker);
                }
            }
        }
        for kind in [PieceType::Bishop, PieceType::Queen] {
            for distance in 2..8 {
                for blocker in 1..distance {
                    let mut board = board_one_piece(0, 0, Black, kind);
                    assert!(is_legal(&board, Black, (0, 0), (distance, distance)));
                    board.squares[blocker][blocker] = Some(Piece { color: White, kind: PieceType::Knight });
                    assert!(!is_legal(&board, Black, (0, 0), (distance, distance)), "{:?} {} {}", kind, distance, blocker);
                }
            }
        }
    }

    #[test]
    fn test_rook_moves() {
        let board = board_one_piece(0, 0, White, PieceType::Rook);
        let moves = legal_destinations(&board, White, (0, 0));
        assert_eq!(moves, HashSet::from([
            (1, 0), (2, 0), (3, 0), (4, 0), (5, 0), (6, 0), (7, 0),
            (0, 1), (0, 2), (0, 3), (0, 4), (0, 5), (0, 6), (0, 7)
        ]));

        let board = new_board();
        assert!(!is_legal(&board, White, (7, 0), (0, 0)));
        assert_eq!(legal_destinations(&board, White, (7, 0)), HashSet::new());

        let mut board = new_board();
        board.squares[6][7] = None;
        let moves = legal_destinations(&board, White, (7, 7));
        assert_eq!(moves, HashSet::from([(6, 7), (5, 7), (4, 7), (3, 7), (2, 7), (1, 7)]));
    }

    #[test]
    fn test_bishop_moves() {
        let board = board_one_piece(3, 3, White, PieceType::Bishop);
        let actual_moves = legal_destinations(&board, White, (3, 3));
        assert_eq!(actual_moves, HashSet::from([
            (4, 4), (5, 5), (6, 6), (7, 7),
            (2, 4), (1, 5), (0, 6),
            (2, 2), (1, 1), (0, 0),
            (4, 2), (5, 1), (6, 0)
        ]));

        let board = new_board();
        assert_eq!(legal_destinations(&board, White, (7, 2)), HashSet::new());
        assert!(!is_legal(&board, White, (7, 2), (6, 2)));
    }

    #[test]
    fn test_queen_moves() {
        let board = board_one_piece(4, 2, White, PieceType::Queen);
        let actual_moves = legal_destinations(&board, White, (4, 2));
        assert_eq!(actual_moves, HashSet::from([
            (5, 2), (6, 2), (7, 2),
            (3, 2), (2, 2), (1, 2), (0, 2),
            (4, 3), (4, 4), (4, 5), (4, 6), (4, 7),
            (4, 1), (4, 0),
            (5, 3), (6, 4), (7, 5),
            (3, 3), (2, 4), (1, 5), (0, 6),
            (3, 1), (2, 0),
            (5, 1), (6, 0)
        ]));
        assert!(!is_legal(&board, White, (4, 2), (2, 3)));

        let mut board = new_board();
        board.squares[6][2] = None;
        board.squares[6][3] = None;
        board.squares[6][4] = None;
        board.squares[3][7] = Some(Piece { color: White, kind: PieceType::Pawn });
        board.squares[4][0] = Some(Piece { color: Black, kind: PieceType::Pawn });
        let actual_moves = legal_destinations(&board, White, (7, 3));
        assert_eq!(actual_moves, HashSet::from([
            (6, 3), (5, 3), (4, 3), (3, 3), (2, 3), (1, 3),
            (6, 4), (5, 5), (4, 6),
            (6, 2), (5, 1), (4, 0)
        ]));
    }

    #[test]
    fn test_knight_ignores_blocking() {
        let board = new_board();
        assert_eq!(legal_destinations(&board, White, (7, 1)), HashSet::from([(5, 0), (5, 2)]));

        let mut board = board_one_piece(4, 4, White, PieceType::Knight);
        for r in 3..=5 {
            for c in 3..=5 {
                if (r, c) != (4, 4) {
                    board.squares[r][c] = Some(Piece { color: White, kind: PieceType::Pawn });
                }
            }
        }
        assert_eq!(legal_destinations(&board, White, (4, 4)), HashSet::from([
            (2, 3), (2, 5), (6, 3), (6, 5),
            (3, 2), (5, 2), (3, 6), (5, 6)
        ]));

        let mut board = board_one_piece(7, 0, White, PieceType::Knight);
        board.squares[5][1] = Some(Piece { color: Black, kind: PieceType::Queen });
        assert_eq!(legal_destinations(&board, White, (7, 0)), HashSet::from([(6, 2), (5, 1)]));
    }

    #[test]
    fn test_king_moves() {
        let board = board_one_piece(0, 0, White, PieceType::King);
        assert_eq!(legal_destinations(&board, White, (0, 0)), HashSet::from([(0, 1), (1, 0), (1, 1)]));

        let board = board_one_piece(3, 3, Black, PieceType::King);
        assert_eq!(legal_destinations(&board, Black, (3, 3)), HashSet::from([
            (2, 2), (2, 3), (2, 4), (3, 2), (3, 4), (4, 2), (4, 3), (4, 4)
        ]));
        assert!(!is_legal(&board, Black, (3, 3), (5, 3)));
    }

    #[test]
    fn test_king_may_step_into_attack() {
        let mut board = board_one_piece(4, 4, White, PieceType::King);
        board.squares[0][3] = Some(Piece { color: Black, kind: PieceType::Rook });
        assert!(is_legal(&board, White, (4, 4), (4, 3)));
    }

    #[test]
    fn test_pawn_moves() {
        let board = new_board();
        assert_eq!(legal_destinations(&board, White, (6, 0)), HashSet::from([(5, 0), (4, 0)]));
        assert_eq!(legal_destinations(&board, Black, (1, 6)), HashSet::from([(2, 6), (3, 6)]));

        let board = board_one_piece(5, 1, White, PieceType::Pawn);
        assert_eq!(legal_destinations(&board, White, (5, 1)), HashSet::from([(4, 1)]));

        let board = board_one_piece(2, 1, Black, PieceType::Pawn);
        assert_eq!(legal_destinations(&board, Black, (2, 1)), HashSet::from([(3, 1)]));

        let mut board = board_one_piece(3, 3, Black, PieceType::Pawn);
        board.squares[4][2] = Some(Piece { color: White, kind: PieceType::Pawn });
        board.squares[4][3] = Some(Piece { color: White, kind: PieceType::Pawn });
        board.squares[4][4] = Some(Piece { color: White, kind: PieceType::Pawn });
        assert_eq!(legal_destinations(&board, Black, (3, 3)), HashSet::from([(4, 2), (4, 4)]));

        let mut board = board_one_piece(6, 4, White, PieceType::Pawn);
        board.squares[5][3] = Some(Piece { color: White, kind: PieceType::Pawn });
        assert!(!is_legal(&board, White, (6, 4), (5, 3)));
        assert!(!is_legal(&board, White, (6, 4), (7, 4)));
    }

    #[test]
    fn test_pawn_double_step_only_from_home_rank() {
        for row in 2..HEIGHT {
            let board = board_one_piece(row, 2, White, PieceType::Pawn);
            assert_eq!(is_legal(&board, White, (row, 2), (row - 2, 2)), row == 6, "white row {}", row);
        }
        for row in 0..HEIGHT - 2 {
            let board = board_one_piece(row, 5, Black, PieceType::Pawn);
            assert_eq!(is_legal(&board, Black, (row, 5), (row + 2, 5)), row == 1, "black row {}", row);
        }
    }

    #[test]
    fn test_pawn_double_step_needs_empty_intermediate() {
        let mut board = new_board();
        board.squares[5][4] = Some(Piece { color: Black, kind: PieceType::Knight });
        assert!(!is_legal(&board, White, (6, 4), (4, 4)));

        let mut board = new_board();
        board.squares[4][4] = Some(Piece { color: Black, kind: PieceType::Knight });
        assert!(!is_legal(&board, White, (6, 4), (4, 4)));
        assert!(is_legal(&board, White, (6, 4), (5, 4)));
    }

    #[test]
    fn test_pawn_cannot_capture_forward() {
        let mut board = board_one_piece(4, 4, White, PieceType::Pawn);
        board.squares[3][4] = Some(Piece { color: Black, kind: PieceType::Pawn });
        assert_eq!(legal_destinations(&board, White, (4, 4)), HashSet::new());
    }

    #[test]
    fn test_turn_is_checked_before_movement() {
        let board = new_board();
        assert!(check_movement(&board, (6, 3), (4, 3)).is_ok());
        assert!(!is_legal(&board, Black, (6, 3), (4, 3)));
    }

    #[test]
    fn test_all_legal_moves_opening() {
        let board = new_board();
        let moves = all_legal_moves(&board, White);
        assert_eq!(moves.len(), 20);
        assert_eq!(moves.first(), Some(&((6, 0), (4, 0))));
        assert!(moves.iter().all(|&(from, to)| is_legal(&board, White, from, to)));
        assert_eq!(all_legal_moves(&Board::empty(), Black), Vec::new());
        assert!(all_legal_moves(&board, Black).iter().all(|&(from, _)| from.0 < 2 && from.1 < WIDTH));
    }
}
