pub mod board;
pub mod communication_protocol;
pub mod computer;
pub mod config;
pub mod error;
pub mod game;
pub mod game_server;
pub mod moves;
