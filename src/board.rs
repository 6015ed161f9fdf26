use serde::{Deserialize, Serialize};

pub const WIDTH: usize = 8;
pub const HEIGHT: usize = 8;

/// (row, col); row 0 is rank 8, col 0 is file a.
pub type Square = (usize, usize);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceType {
    King,
    Queen,
    Rook,
    Bishop,
    Knight,
    Pawn,
}

impl PieceType {
    /// Letter used in move notation, `None` for pawns.
    pub fn notation_letter(&self) -> Option<char> {
        match self {
            PieceType::King => Some('K'),
            PieceType::Queen => Some('Q'),
            PieceType::Rook => Some('R'),
            PieceType::Bishop => Some('B'),
            PieceType::Knight => Some('N'),
            PieceType::Pawn => None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White, Black
}

impl Color {
    pub fn opposite(&self) -> Color {
        if self == &Color::White {
            Color::Black
        } else {
            Color::White
        }
    }

    /// Row delta of a forward pawn step.
    pub fn pawn_direction(&self) -> i8 {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }

    pub fn pawn_home_row(&self) -> usize {
        match self {
            Color::White => 6,
            Color::Black => 1,
        }
    }

    pub fn promotion_row(&self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => HEIGHT - 1,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    #[serde(rename = "type")]
    pub kind: PieceType,
    pub color: Color,
}

impl Piece {
    pub fn new(color: Color, kind: PieceType) -> Self {
        Piece { color, kind }
    }
}

pub fn on_board(square: Square) -> bool {
    square.0 < HEIGHT && square.1 < WIDTH
}

/// Algebraic name of a square, `(6, 4)` is `e2`.
pub fn square_name(square: Square) -> String {
    let file = (b'a' + square.1 as u8) as char;
    let rank = HEIGHT - square.0;
    format!("{}{}", file, rank)
}

/// Row-major 8x8 grid; serializes as a nested array of `null` or `{"type", "color"}` cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    pub squares: [[Option<Piece>; WIDTH]; HEIGHT],
}

impl Board {
    pub fn empty() -> Self {
        Board { squares: [[None; WIDTH]; HEIGHT] }
    }

    /// Piece on a square; off-board squares read as empty.
    pub fn get(&self, square: Square) -> Option<Piece> {
        if on_board(square) {
            self.squares[square.0][square.1]
        } else {
            None
        }
    }

    /// Places or clears a piece; returns false and leaves the board alone for off-board squares.
    pub fn set(&mut self, square: Square, piece: Option<Piece>) -> bool {
        if !on_board(square) {
            return false;
        }
        self.squares[square.0][square.1] = piece;
        true
    }

    pub fn occupied(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        (0..HEIGHT)
            .flat_map(|r| (0..WIDTH).map(move |c| (r, c)))
            .filter_map(|sq| self.get(sq).map(|p| (sq, p)))
    }
}

pub fn to_string(board: &Board) -> String {
    let mut result: String = String::new();
    for row in 0 .. HEIGHT {
        for col in 0 .. WIDTH {
            let icon = match &board.squares[row][col] {
                None => ' ',
                Some(p) => match p.kind {
                    PieceType::King => if p.color == Color::White {'K'} else {'k'},
                    PieceType::Queen => if p.color == Color::White {'Q'} else {'q'},
                    PieceType::Rook => if p.color == Color::White {'R'} else {'r'},
                    PieceType::Bishop => if p.color == Color::White {'B'} else {'b'},
                    PieceType::Knight => if p.color == Color::White {'N'} else {'n'},
                    PieceType::Pawn => if p.color == Color::White {'P'} else {'p'},
                }
            };
            result.push(icon);
        }
        result.push('\n');
    }
    result.pop();
    result
}

fn new_pieces(color: Color) -> [Option<Piece>; WIDTH] {
    [
        Some(Piece::new(color, PieceType::Rook)),
        Some(Piece::new(color, PieceType::Knight)),
        Some(Piece::new(color, PieceType::Bishop)),
        Some(Piece::new(color, PieceType::Queen)),
        Some(Piece::new(color, PieceType::King)),
        Some(Piece::new(color, PieceType::Bishop)),
        Some(Piece::new(color, PieceType::Knight)),
        Some(Piece::new(color, PieceType::Rook))
    ]
}

fn new_pawns(color: Color) -> [Option<Piece>; WIDTH] {
    [Some(Piece::new(color, PieceType::Pawn)); WIDTH]
}

fn new_empty() -> [Option<Piece>; WIDTH] {
    [None; WIDTH]
}

/// Standard setup, black on rows 0-1 and white on rows 6-7.
pub fn new_board() -> Board {
    Board {
        squares: [
            new_pieces(Color::Black),
            new_pawns(Color::Black),
            new_empty(),
            new_empty(),
            new_empty(),
            new_empty(),
            new_pawns(Color::White),
            new_pieces(Color::White)
        ],
    }
}
