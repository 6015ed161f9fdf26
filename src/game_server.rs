use std::collections::{HashMap, HashSet};
use std::net::TcpStream;
use std::sync::mpsc::Receiver;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tungstenite::{Message, WebSocket};

use crate::board::{to_string, Color, Square};
use crate::communication_protocol::{GameMode, JsonMsg, MsgType, RoomInfo, ServerMsg};
use crate::computer::choose_move;
use crate::config::ServerConfig;
use crate::error::GameError;
use crate::game::{GameState, GameStatus};
use crate::moves::legal_destinations;

#[derive(Debug)]
pub enum ChannelMsg {
    NewConnection(u32, WebSocket<TcpStream>),
    Msg(u32, JsonMsg),
    Malformed(u32, String),
    Disconnect(u32),
    ValueMonitor,
}

/// Messages to deliver, addressed by client id.
pub type Outbox = Vec<(u32, ServerMsg)>;

#[derive(Debug, Clone)]
pub struct Room {
    pub name: String,
    pub mode: GameMode,
    pub game: GameState,
    pub white: Option<u32>,
    pub black: Option<u32>,
}

impl Room {
    fn seat(&self, color: Color) -> Option<u32> {
        match color {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }

    fn is_seated(&self, client_id: u32) -> bool {
        self.white == Some(client_id) || self.black == Some(client_id)
    }

    /// Waiting for a second player.
    fn is_open(&self) -> bool {
        self.mode == GameMode::Online && (self.white.is_some() ^ self.black.is_some())
    }

    fn seated_clients(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.white.into_iter().chain(self.black).collect();
        ids.dedup();
        ids
    }
}

/// All rooms and connected clients. Owned by the single game-loop thread, so every request is
/// applied to completion before the next one is looked at.
pub struct GameServer {
    rooms: HashMap<u32, Room>,
    clients: HashSet<u32>,
    max_room_name: usize,
    rng: StdRng,
}

impl GameServer {
    pub fn new(config: &ServerConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    pub fn with_rng(config: &ServerConfig, rng: StdRng) -> Self {
        GameServer {
            rooms: HashMap::new(),
            clients: HashSet::new(),
            max_room_name: config.max_room_name,
            rng,
        }
    }

    pub fn room(&self, room_id: u32) -> Option<&Room> {
        self.rooms.get(&room_id)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    pub fn connect(&mut self, client_id: u32) -> Outbox {
        log::debug!("New client {}", client_id);
        self.clients.insert(client_id);
        vec![(client_id, self.rooms_message())]
    }

    pub fn disconnect(&mut self, client_id: u32) -> Outbox {
        log::debug!("Removing client {}", client_id);
        self.clients.remove(&client_id);
        let ids: Vec<u32> = self.rooms.iter()
            .filter_map(|(&room_id, room)| room.is_seated(client_id).then_some(room_id))
            .collect();
        let mut outbox = Outbox::new();
        for room_id in ids {
            log::info!("Removing room {}", room_id);
            if let Some(room) = self.rooms.remove(&room_id) {
                for other in room.seated_clients().into_iter().filter(|&id| id != client_id) {
                    outbox.push(error_msg(other, &GameError::NoActiveGame(room_id)));
                }
            }
        }
        outbox.extend(self.broadcast_rooms());
        outbox
    }

    pub fn handle(&mut self, client_id: u32, msg: JsonMsg) -> Outbox {
        log::debug!("{} - {:?}", client_id, msg);
        let result = match msg.msg_type {
            MsgType::Create => Ok(self.create(client_id, msg.room_name, msg.mode)),
            MsgType::Join => self.join(client_id, msg.room_id),
            MsgType::Move => match msg.make_move {
                Some((from, to)) => self.make_move(client_id, msg.room_id, from, to, msg.version),
                None => Err(GameError::Malformed("move must be provided".to_string())),
            },
            MsgType::Undo => self.undo(client_id, msg.room_id),
            MsgType::Reset => self.reset(client_id, msg.room_id),
            MsgType::Possible => match msg.possible_moves {
                Some(square) => self.possible(client_id, msg.room_id, square),
                None => Err(GameError::Malformed("square must be provided".to_string())),
            },
            MsgType::Ping => {
                log::debug!("Ping message from: {}", client_id);
                Ok(Outbox::new())
            }
        };
        result.unwrap_or_else(|e| {
            log::warn!("Request from {} rejected: {}", client_id, e);
            vec![error_msg(client_id, &e)]
        })
    }

    pub fn malformed(&mut self, client_id: u32, reason: String) -> Outbox {
        let e = GameError::Malformed(reason);
        log::warn!("Request from {} rejected: {}", client_id, e);
        vec![error_msg(client_id, &e)]
    }

    pub fn monitor(&self) {
        log::info!("Clients: {}", self.clients.len());
        log::info!("Rooms: {}", self.rooms.len());
        for (room_id, room) in &self.rooms {
            log::info!("({} {:?} - ({:?}, {:?}) ply {} version {})", room_id, room.mode, room.white, room.black, room.game.ply(), room.game.version);
        }
    }

    fn create(&mut self, client_id: u32, room_name: Option<String>, mode: GameMode) -> Outbox {
        let room_id = loop {
            let id: u32 = self.rng.gen();
            if !self.rooms.contains_key(&id) {
                break id;
            }
        };
        let name = match room_name {
            Some(name) if name.chars().count() <= self.max_room_name => name,
            _ => "Room".to_string(),
        };
        let (white, black, color) = match mode {
            GameMode::Online => {
                let is_white: bool = self.rng.gen();
                if is_white {
                    (Some(client_id), None, Some(Color::White))
                } else {
                    (None, Some(client_id), Some(Color::Black))
                }
            }
            GameMode::HotSeat => (Some(client_id), Some(client_id), None),
            GameMode::Computer => (Some(client_id), None, Some(Color::White)),
        };
        log::info!("Client {} created room {} ({:?})", client_id, room_id, mode);
        let room = Room { name, mode, game: GameState::new_game(), white, black };
        let board = board_msg(room_id, &room.game, None);
        self.rooms.insert(room_id, room);

        let mut outbox = self.broadcast_rooms();
        outbox.push((client_id, ServerMsg::NewRoom { room_id, color, mode }));
        outbox.push((client_id, board));
        outbox
    }

    fn join(&mut self, client_id: u32, room_id: u32) -> Result<Outbox, GameError> {
        let room = self.rooms.get_mut(&room_id).ok_or(GameError::NoActiveGame(room_id))?;
        if !room.is_open() || room.is_seated(client_id) {
            return Err(GameError::RoomFull(room_id));
        }
        let color = if room.white.is_none() {
            room.white = Some(client_id);
            Color::White
        } else {
            room.black = Some(client_id);
            Color::Black
        };
        log::info!("Client {} joined room {} as {:?}", client_id, room_id, color);
        let mut outbox = vec![(client_id, ServerMsg::NewRoom { room_id, color: Some(color), mode: room.mode })];
        let board = board_msg(room_id, &room.game, None);
        for id in room.seated_clients() {
            outbox.push((id, board.clone()));
        }
        outbox.extend(self.broadcast_rooms());
        Ok(outbox)
    }

    fn make_move(&mut self, client_id: u32, room_id: u32, from: Square, to: Square, version: Option<u64>) -> Result<Outbox, GameError> {
        let room = seated_room(&mut self.rooms, client_id, room_id)?;
        if room.game.ended {
            return Err(GameError::GameOver);
        }
        if room.is_open() {
            return Err(GameError::WaitingForOpponent(room_id));
        }
        let turn = room.game.turn;
        if room.seat(turn) != Some(client_id) {
            return Err(GameError::NotYourTurn(turn));
        }
        if let Some(seen) = version {
            if seen != room.game.version {
                return Err(GameError::StaleState { seen, current: room.game.version });
            }
        }

        let outcome = room.game.propose_move(from, to)?;
        log::info!("Room {}: {}", room_id, outcome.notation);
        log::debug!("\n{}", to_string(&room.game.board));
        let mut outbox = update_msgs(room_id, room, Some((from, to)));

        if room.mode == GameMode::Computer && !room.game.ended && room.game.turn == Color::Black {
            match choose_move(&room.game.board, Color::Black, &mut self.rng) {
                Some((c_from, c_to)) => {
                    let reply = room.game.apply_move(c_from, c_to)?;
                    log::info!("Room {}: computer plays {}", room_id, reply.notation);
                    outbox.extend(update_msgs(room_id, room, Some((c_from, c_to))));
                }
                None => {
                    let e = GameError::ComputerHasNoMove(room_id);
                    log::warn!("{}", e);
                    outbox.push(error_msg(client_id, &e));
                }
            }
        }
        Ok(outbox)
    }

    fn undo(&mut self, client_id: u32, room_id: u32) -> Result<Outbox, GameError> {
        let room = seated_room(&mut self.rooms, client_id, room_id)?;
        if room.mode == GameMode::Online {
            let mover = room.game.last_mover().ok_or(GameError::NoHistory)?;
            if room.seat(mover) != Some(client_id) {
                return Err(GameError::UndoRefused(mover));
            }
        }
        let undone = room.game.undo_move()?;
        log::info!("Room {}: undo {}", room_id, undone);
        if room.mode == GameMode::Computer && room.game.turn == Color::Black {
            let undone = room.game.undo_move()?;
            log::info!("Room {}: undo {}", room_id, undone);
        }
        Ok(update_msgs(room_id, room, None))
    }

    fn reset(&mut self, client_id: u32, room_id: u32) -> Result<Outbox, GameError> {
        let room = seated_room(&mut self.rooms, client_id, room_id)?;
        room.game.reset();
        log::info!("Room {}: reset", room_id);
        Ok(update_msgs(room_id, room, None))
    }

    fn possible(&mut self, client_id: u32, room_id: u32, square: Square) -> Result<Outbox, GameError> {
        let room = seated_room(&mut self.rooms, client_id, room_id)?;
        let game = &room.game;
        let possible_moves = if game.ended {
            HashSet::new()
        } else {
            let color = match (room.seat(game.turn) == Some(client_id), room.white == Some(client_id)) {
                (true, _) => game.turn,
                (false, true) => Color::White,
                (false, false) => Color::Black,
            };
            legal_destinations(&game.board, color, square)
        };
        Ok(vec![(client_id, ServerMsg::Possible { possible_moves })])
    }

    fn rooms_message(&self) -> ServerMsg {
        let mut rooms: Vec<RoomInfo> = self.rooms.iter()
            .filter(|(_, room)| room.is_open())
            .map(|(&room_id, room)| RoomInfo { room_id, name: room.name.clone() })
            .collect();
        rooms.sort_by_key(|r| r.room_id);
        ServerMsg::Rooms { rooms }
    }

    fn broadcast_rooms(&self) -> Outbox {
        log::debug!("Sending rooms to every client");
        let msg = self.rooms_message();
        let mut ids: Vec<u32> = self.clients.iter().copied().collect();
        ids.sort();
        ids.into_iter().map(|id| (id, msg.clone())).collect()
    }
}

fn seated_room(rooms: &mut HashMap<u32, Room>, client_id: u32, room_id: u32) -> Result<&mut Room, GameError> {
    let room = rooms.get_mut(&room_id).ok_or(GameError::NoActiveGame(room_id))?;
    if room.is_seated(client_id) {
        Ok(room)
    } else {
        Err(GameError::NotSeated(room_id))
    }
}

fn board_msg(room_id: u32, game: &GameState, last_move: Option<(Square, Square)>) -> ServerMsg {
    ServerMsg::Board { room_id, state: game.public_state(), last_move }
}

/// Board update for everyone in the room, followed by the result if the game just ended.
fn update_msgs(room_id: u32, room: &Room, last_move: Option<(Square, Square)>) -> Outbox {
    let board = board_msg(room_id, &room.game, last_move);
    let mut outbox: Outbox = room.seated_clients().into_iter().map(|id| (id, board.clone())).collect();
    if let GameStatus::Win(winner) = room.game.status() {
        outbox.extend(room.seated_clients().into_iter().map(|id| (id, ServerMsg::GameOver { winner })));
    }
    outbox
}

fn error_msg(client_id: u32, e: &GameError) -> (u32, ServerMsg) {
    (client_id, ServerMsg::Error { error: e.kind(), message: e.to_string() })
}

fn try_send(ws: &mut WebSocket<TcpStream>, msg: &ServerMsg) {
    let text = match serde_json::to_string(msg) {
        Ok(t) => t,
        Err(e) => {
            log::error!("Cannot serialize message, error: {}", e);
            return;
        }
    };
    match ws.send(Message::Text(text)) {
        Ok(_) => log::debug!("Msg sent"),
        Err(e) => log::error!("Cannot send message, error: {}", e)
    }
}

fn deliver(clients: &mut HashMap<u32, WebSocket<TcpStream>>, outbox: Outbox) {
    for (client_id, msg) in outbox {
        match clients.get_mut(&client_id) {
            Some(ws) => try_send(ws, &msg),
            None => log::warn!("Cannot find client {}", client_id),
        }
    }
}

/// Game loop: owns the server state and the writing half of every websocket.
pub fn handle_game(receiver: Receiver<ChannelMsg>, mut server: GameServer) {
    let mut clients: HashMap<u32, WebSocket<TcpStream>> = HashMap::new();

    loop {
        log::debug!("Waiting for message...");
        let msg = match receiver.recv() {
            Ok(m) => m,
            Err(_) => {
                log::info!("Channel closed, stopping game loop");
                return;
            }
        };
        let outbox = match msg {
            ChannelMsg::NewConnection(client_id, websocket) => {
                clients.insert(client_id, websocket);
                server.connect(client_id)
            }
            ChannelMsg::Msg(client_id, decoded) => server.handle(client_id, decoded),
            ChannelMsg::Malformed(client_id, reason) => server.malformed(client_id, reason),
            ChannelMsg::Disconnect(client_id) => {
                clients.remove(&client_id);
                server.disconnect(client_id)
            }
            ChannelMsg::ValueMonitor => {
                server.monitor();
                Outbox::new()
            }
        };
        deliver(&mut clients, outbox);
    }
}
