use std::collections::HashSet;

use crate::board::{Color, Square};
use crate::error::ErrorKind;
use crate::game::PublicState;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum GameMode {
    /// Two clients, one seat each.
    #[default]
    Online,
    /// One client plays both colors.
    HotSeat,
    /// One client plays white against the computer.
    Computer,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum MsgType {
    Create, Join, Move, Undo, Reset, Possible, Ping
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct JsonMsg {
    pub msg_type: MsgType,
    #[serde(default)]
    pub room_id: u32,
    #[serde(default)]
    pub room_name: Option<String>,
    #[serde(default)]
    pub mode: GameMode,
    #[serde(default)]
    pub make_move: Option<(Square, Square)>,
    /// Game version the client last saw; a mismatch rejects the move as stale.
    #[serde(default)]
    pub version: Option<u64>,
    #[serde(default)]
    pub possible_moves: Option<Square>,
}

impl JsonMsg {
    pub fn new(msg_type: MsgType, room_id: u32) -> Self {
        JsonMsg { msg_type, room_id, room_name: None, mode: GameMode::Online, make_move: None, version: None, possible_moves: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RoomInfo {
    pub room_id: u32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "msg_type")]
pub enum ServerMsg {
    Rooms { rooms: Vec<RoomInfo> },
    /// `color` is `None` when the client holds both seats.
    NewRoom { room_id: u32, color: Option<Color>, mode: GameMode },
    Board { room_id: u32, state: PublicState, last_move: Option<(Square, Square)> },
    Possible { possible_moves: HashSet<Square> },
    GameOver { winner: Color },
    Error { error: ErrorKind, message: String },
}
