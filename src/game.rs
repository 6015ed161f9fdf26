use serde::{Deserialize, Serialize};

use crate::board::{new_board, on_board, square_name, Board, Color, Piece, PieceType, Square};
use crate::error::GameError;
use crate::moves::check_move;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameStatus {
    InProgress,
    Win(Color),
}

/// What a successfully applied move did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub notation: String,
    pub captured: Option<Piece>,
    pub promoted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Snapshot {
    board: Board,
    turn: Color,
    ended: bool,
    winner: Option<Color>,
}

/// The view of a game sent to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicState {
    pub board: Board,
    pub turn: Color,
    pub ended: bool,
    pub winner: Option<Color>,
    pub moves: Vec<String>,
    pub version: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub board: Board,
    pub turn: Color,
    pub ended: bool,
    pub winner: Option<Color>,
    pub move_log: Vec<String>,
    /// Bumped by every apply, undo and reset; never decreases.
    pub version: u64,
    history: Vec<Snapshot>,
}

/// `Ng1-f3`, `e7xd6`: piece letter (none for pawns), origin, `-` or `x`, destination.
pub fn move_notation(piece: Piece, from: Square, to: Square, capture: bool) -> String {
    let mut text = String::new();
    if let Some(letter) = piece.kind.notation_letter() {
        text.push(letter);
    }
    text.push_str(&square_name(from));
    text.push(if capture { 'x' } else { '-' });
    text.push_str(&square_name(to));
    text
}

impl GameState {
    pub fn new_game() -> Self {
        Self::from_position(new_board(), Color::White)
    }

    /// Game starting from an arbitrary position.
    pub fn from_position(board: Board, turn: Color) -> Self {
        GameState {
            board,
            turn,
            ended: false,
            winner: None,
            move_log: Vec::new(),
            version: 0,
            history: Vec::new(),
        }
    }

    /// Fresh standard game that keeps counting versions from the replaced one.
    pub fn reset(&mut self) {
        let version = self.version + 1;
        *self = GameState::new_game();
        self.version = version;
    }

    /// Color that made the last applied move.
    pub fn last_mover(&self) -> Option<Color> {
        if self.history.is_empty() {
            None
        } else if self.ended {
            Some(self.turn)
        } else {
            Some(self.turn.opposite())
        }
    }

    pub fn ply(&self) -> usize {
        self.move_log.len()
    }

    pub fn status(&self) -> GameStatus {
        match (self.ended, self.winner) {
            (true, Some(color)) => GameStatus::Win(color),
            _ => GameStatus::InProgress,
        }
    }

    /// Validates the move for the side to move and applies it.
    pub fn propose_move(&mut self, from: Square, to: Square) -> Result<MoveOutcome, GameError> {
        if self.ended {
            return Err(GameError::GameOver);
        }
        check_move(&self.board, self.turn, from, to)
            .map_err(|reason| GameError::InvalidMove { from, to, reason })?;
        self.apply_move(from, to)
    }

    /// Applies a move the caller has already validated with `is_legal`.
    /// Only refuses when the game is over or the origin square is empty.
    pub fn apply_move(&mut self, from: Square, to: Square) -> Result<MoveOutcome, GameError> {
        if self.ended {
            return Err(GameError::GameOver);
        }
        if !on_board(from) || !on_board(to) {
            return Err(GameError::InvalidMove { from, to, reason: "square is off the board" });
        }
        let mover = self.board.get(from)
            .ok_or(GameError::InvalidMove { from, to, reason: "no piece on the origin square" })?;

        self.history.push(Snapshot {
            board: self.board.clone(),
            turn: self.turn,
            ended: self.ended,
            winner: self.winner,
        });

        let captured = self.board.get(to);
        if captured.is_some_and(|p| p.kind == PieceType::King) {
            self.ended = true;
            self.winner = Some(mover.color);
        }

        self.board.set(from, None);
        let promoted = mover.kind == PieceType::Pawn && to.0 == mover.color.promotion_row();
        let landed = if promoted { Piece::new(mover.color, PieceType::Queen) } else { mover };
        self.board.set(to, Some(landed));

        let notation = move_notation(mover, from, to, captured.is_some());
        self.move_log.push(notation.clone());

        if !self.ended {
            self.turn = self.turn.opposite();
        }
        self.version += 1;
        Ok(MoveOutcome { notation, captured, promoted })
    }

    /// Restores board, turn and result from before the last move and pops the log.
    pub fn undo_move(&mut self) -> Result<String, GameError> {
        let snapshot = self.history.pop().ok_or(GameError::NoHistory)?;
        self.board = snapshot.board;
        self.turn = snapshot.turn;
        self.ended = snapshot.ended;
        self.winner = snapshot.winner;
        self.version += 1;
        self.move_log.pop().ok_or(GameError::NoHistory)
    }

    pub fn public_state(&self) -> PublicState {
        PublicState {
            board: self.board.clone(),
            turn: self.turn,
            ended: self.ended,
            winner: self.winner,
            moves: self.move_log.clone(),
            version: self.version,
        }
    }
}
