use std::net::{TcpListener, TcpStream};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::{current, sleep, spawn};
use std::time::Duration;

use rand::random;
use tungstenite::{accept, Message, WebSocket};
use tungstenite::protocol::Role;

use chess_logic_lib::communication_protocol::JsonMsg;
use chess_logic_lib::config::{ServerConfig, DEFAULT_LOG_LEVEL};
use chess_logic_lib::game_server::{self, ChannelMsg, GameServer};

fn thread_game_monitor(sender: Sender<ChannelMsg>, interval: Duration) {
    loop {
        sleep(interval);
        if sender.send(ChannelMsg::ValueMonitor).is_err() {
            log::error!("Game loop is gone, stopping monitor");
            return;
        }
    }
}

fn thread_client_reader(mut websocket: WebSocket<TcpStream>, client_id: u32, sender: Sender<ChannelMsg>) {
    let thread_id = current().id();
    log::debug!("New client {}", client_id);
    loop {
        let msg = match websocket.read() {
            Ok(m) => m,
            Err(e) => {
                log::error!("Cannot read websocket, error: {}", e);
                log::error!("Sending disconnect to channel and shutting down thread");
                let _ = sender.send(ChannelMsg::Disconnect(client_id));
                return;
            }
        };

        log::debug!("{:?} - Received: {:?}", thread_id, msg);
        let forwarded = match msg {
            Message::Text(m) => match serde_json::from_str::<JsonMsg>(&m) {
                Ok(decoded) => sender.send(ChannelMsg::Msg(client_id, decoded)),
                Err(e) => {
                    log::warn!("Cannot decode {:?}: {}", m, e);
                    sender.send(ChannelMsg::Malformed(client_id, e.to_string()))
                }
            },
            Message::Close(_) => {
                log::debug!("Closing websocket");
                let _ = sender.send(ChannelMsg::Disconnect(client_id));
                return;
            }
            Message::Binary(_) => { log::debug!("binary msg"); Ok(()) }
            Message::Ping(_) => { log::debug!("ping msg"); Ok(()) }
            Message::Pong(_) => { log::debug!("pong msg"); Ok(()) }
            Message::Frame(_) => { log::debug!("frame msg"); Ok(()) }
        };
        if forwarded.is_err() {
            log::error!("Game loop is gone, closing client {}", client_id);
            return;
        }
    }
}

fn main() {
    let logger_env = env_logger::Env::default().filter_or("LOG_LEVEL", DEFAULT_LOG_LEVEL);
    env_logger::Builder::from_env(logger_env).format_timestamp_millis().init();

    let config = ServerConfig::from_env();
    log::info!("Starting with {:?}", config);

    let (sender_origin, receiver): (Sender<ChannelMsg>, Receiver<ChannelMsg>) = channel();

    let monitor_sender = sender_origin.clone();
    let interval = config.monitor_interval;
    spawn(move || thread_game_monitor(monitor_sender, interval));
    let server = GameServer::new(&config);
    spawn(move || game_server::handle_game(receiver, server));

    let listener = TcpListener::bind(&config.bind_address).expect("Cannot create server");
    log::info!("Listening on {}", config.bind_address);
    for stream in listener.incoming() {
        let tcp_stream = match stream {
            Ok(s) => s,
            Err(e) => {
                log::error!("Cannot use tcp stream: {}", e);
                continue
            }
        };
        let tcp_stream_clone = match tcp_stream.try_clone() {
            Ok(s) => s,
            Err(e) => {
                log::error!("Cannot clone tcp stream: {}", e);
                continue
            }
        };
        let websocket = match accept(tcp_stream) {
            Ok(w) => w,
            Err(e) => {
                log::error!("Cannot create websocket: {}", e);
                continue
            }
        };
        let writer = WebSocket::from_raw_socket(tcp_stream_clone, Role::Server, Some(websocket.get_config().clone()));
        let client_id: u32 = random();

        let sender = sender_origin.clone();
        if sender.send(ChannelMsg::NewConnection(client_id, writer)).is_err() {
            log::error!("Game loop is gone, shutting down");
            return;
        }
        spawn(move || thread_client_reader(websocket, client_id, sender));
    }
}
