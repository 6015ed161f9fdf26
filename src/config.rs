use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:9977";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_address: String,
    pub monitor_interval: Duration,
    pub max_room_name: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            monitor_interval: Duration::from_secs(60),
            max_room_name: 100,
        }
    }
}

fn parse_or<T: FromStr + Copy + std::fmt::Debug>(name: &str, raw: Option<String>, default: T) -> T {
    match raw {
        None => default,
        Some(value) => match value.trim().parse() {
            Ok(v) => v,
            Err(_) => {
                log::warn!("Cannot parse {}={:?}, using {:?}", name, value, default);
                default
            }
        }
    }
}

impl ServerConfig {
    /// Reads `CHESS_BIND_ADDRESS`, `CHESS_MONITOR_INTERVAL_SECS` and `CHESS_MAX_ROOM_NAME`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Self {
        let default = ServerConfig::default();
        let bind_address = lookup("CHESS_BIND_ADDRESS")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(default.bind_address);
        let secs = parse_or("CHESS_MONITOR_INTERVAL_SECS", lookup("CHESS_MONITOR_INTERVAL_SECS"), default.monitor_interval.as_secs());
        let max_room_name = parse_or("CHESS_MAX_ROOM_NAME", lookup("CHESS_MAX_ROOM_NAME"), default.max_room_name);
        ServerConfig {
            bind_address,
            monitor_interval: Duration::from_secs(secs.max(1)),
            max_room_name,
        }
    }
}
