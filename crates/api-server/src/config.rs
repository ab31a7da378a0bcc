//! Server configuration read from the environment

use std::net::SocketAddr;
use std::path::PathBuf;

const DEFAULT_DATA_DIR: &str = ".todo-data";
const DEFAULT_REST_PORT: u16 = 8081;
const DEFAULT_SOCKET_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub data_dir: PathBuf,
    pub rest_port: u16,
    pub socket_port: u16,
    /// Keep tasks in memory only
    pub ephemeral: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            rest_port: DEFAULT_REST_PORT,
            socket_port: DEFAULT_SOCKET_PORT,
            ephemeral: false,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            data_dir: lookup("TODO_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            rest_port: port(lookup("TODO_REST_PORT"), defaults.rest_port),
            socket_port: port(lookup("TODO_SOCKET_PORT"), defaults.socket_port),
            ephemeral: flag(lookup("TODO_EPHEMERAL"), defaults.ephemeral),
        }
    }

    pub fn tasks_path(&self) -> PathBuf {
        self.data_dir.join("todos.json")
    }

    // Bind to 0.0.0.0 for localhost/127.0.0.1 compatibility
    pub fn rest_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.rest_port))
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.socket_port))
    }
}

fn flag(raw: Option<String>, default: bool) -> bool {
    match raw {
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        None => default,
    }
}

fn port(raw: Option<String>, default: u16) -> u16 {
    match raw {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid port {:?}, using {}", raw, default);
            default
        }),
        None => default,
    }
}
