use serde::Deserialize;

use diskdrop_core::board::{MIN_COLUMNS, MIN_ROWS};
use diskdrop_core::game::MIN_PLAYERS;

/// Top-level server configuration, loaded from `diskdrop.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub game: GameRulesConfig,
    pub lobby: LobbyConfig,
    pub limits: LimitsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            game: GameRulesConfig::default(),
            lobby: LobbyConfig::default(),
            limits: LimitsConfig::default(),
        }
    }
}

/// Rules every lobby plays by: board size, seats per lobby, opener.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct GameRulesConfig {
    pub columns: u8,
    pub rows: u8,
    pub players: u8,
    pub first_player: u8,
}

impl Default for GameRulesConfig {
    fn default() -> Self {
        Self {
            columns: 7,
            rows: 6,
            players: 2,
            first_player: 1,
        }
    }
}

/// Lobby lifecycle configuration.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct LobbyConfig {
    /// Whether a lobby re-opens for another round after a game ends.
    pub keep_open: bool,
    /// Cap on concurrently open lobbies.
    pub max_lobbies: usize,
}

impl Default for LobbyConfig {
    fn default() -> Self {
        Self {
            keep_open: true,
            max_lobbies: 16,
        }
    }
}

/// Infrastructure limits (connection caps, buffer sizes).
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_connections: usize,
    /// Outbound message buffer per player; slow clients are skipped
    /// once theirs fills.
    pub player_message_buffer: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_connections: 200,
            player_message_buffer: 64,
        }
    }
}

impl ServerConfig {
    /// Validate configuration, exiting on fatal issues.
    pub fn validate(&self) {
        if let Err(msg) = self.check() {
            tracing::error!("{msg}");
            std::process::exit(1);
        }
    }

    /// The validation rules behind `validate`, as a plain result.
    fn check(&self) -> Result<(), String> {
        if self.listen_addr.parse::<std::net::SocketAddr>().is_err() {
            return Err(format!(
                "listen_addr {:?} is not a valid socket address",
                self.listen_addr
            ));
        }

        if self.game.columns < MIN_COLUMNS
            || self.game.rows < MIN_ROWS
            || self.game.columns <= self.game.rows
        {
            return Err(format!(
                "game board dimensions {}x{} are invalid (minimum {MIN_COLUMNS}x{MIN_ROWS}, \
                 columns must exceed rows)",
                self.game.columns, self.game.rows
            ));
        }

        if self.game.players < MIN_PLAYERS {
            return Err(format!(
                "game.players is {} but must be at least {MIN_PLAYERS}",
                self.game.players
            ));
        }

        if self.game.first_player < 1 || self.game.first_player > self.game.players {
            return Err(format!(
                "game.first_player is {} but must be in [1, {}]",
                self.game.first_player, self.game.players
            ));
        }

        if self.lobby.max_lobbies == 0 {
            return Err("lobby.max_lobbies must be > 0".to_string());
        }
        if self.limits.max_connections == 0 {
            return Err("limits.max_connections must be > 0".to_string());
        }
        if self.limits.player_message_buffer == 0 {
            return Err("limits.player_message_buffer must be > 0".to_string());
        }
        Ok(())
    }

    /// Load config from `diskdrop.toml` if it exists, then apply env
    /// var overrides.
    pub fn load() -> Self {
        let mut config = match std::fs::read_to_string("diskdrop.toml") {
            Ok(content) => match toml::from_str::<ServerConfig>(&content) {
                Ok(cfg) => {
                    tracing::info!("Loaded configuration from diskdrop.toml");
                    cfg
                },
                Err(e) => {
                    tracing::warn!("Failed to parse diskdrop.toml: {e}, using defaults");
                    ServerConfig::default()
                },
            },
            Err(_) => {
                tracing::info!("No diskdrop.toml found, using defaults");
                ServerConfig::default()
            },
        };

        if let Ok(addr) = std::env::var("DISKDROP_LISTEN_ADDR")
            && !addr.is_empty()
        {
            config.listen_addr = addr;
        }
        if let Ok(val) = std::env::var("DISKDROP_MAX_CONNECTIONS")
            && let Ok(n) = val.parse::<usize>()
        {
            config.limits.max_connections = n;
        }
        if let Ok(val) = std::env::var("DISKDROP_MAX_LOBBIES")
            && let Ok(n) = val.parse::<usize>()
        {
            config.lobby.max_lobbies = n;
        }
        if let Ok(val) = std::env::var("DISKDROP_PLAYERS_PER_LOBBY")
            && let Ok(n) = val.parse::<u8>()
        {
            config.game.players = n;
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.listen_addr, "0.0.0.0:8080");
        assert_eq!(cfg.game.columns, 7);
        assert_eq!(cfg.game.rows, 6);
        assert_eq!(cfg.game.players, 2);
        assert_eq!(cfg.game.first_player, 1);
        assert!(cfg.lobby.keep_open);
        assert_eq!(cfg.lobby.max_lobbies, 16);
    }

    #[test]
    fn parse_minimal_toml() {
        let toml_str = r#"
listen_addr = "127.0.0.1:9090"

[game]
players = 4
"#;
        let cfg: ServerConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.listen_addr, "127.0.0.1:9090");
        assert_eq!(cfg.game.players, 4);
        // untouched sections keep defaults
        assert_eq!(cfg.game.columns, 7);
        assert_eq!(cfg.limits.max_connections, 200);
    }

    #[test]
    fn parse_full_toml() {
        let toml_str = r#"
listen_addr = "0.0.0.0:3000"

[game]
columns = 9
rows = 7
players = 3
first_player = 2

[lobby]
keep_open = false
max_lobbies = 4

[limits]
max_connections = 50
player_message_buffer = 32
"#;
        let cfg: ServerConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.game.columns, 9);
        assert_eq!(cfg.game.rows, 7);
        assert_eq!(cfg.game.players, 3);
        assert_eq!(cfg.game.first_player, 2);
        assert!(!cfg.lobby.keep_open);
        assert_eq!(cfg.lobby.max_lobbies, 4);
        assert_eq!(cfg.limits.max_connections, 50);
        assert_eq!(cfg.limits.player_message_buffer, 32);
    }

    #[test]
    fn check_accepts_default_config() {
        assert_eq!(ServerConfig::default().check(), Ok(()));
    }

    #[test]
    fn check_rejects_invalid_board_dimensions() {
        let cfg = ServerConfig {
            game: GameRulesConfig {
                columns: 6,
                rows: 6,
                ..GameRulesConfig::default()
            },
            ..ServerConfig::default()
        };
        let msg = cfg.check().unwrap_err();
        assert!(msg.contains("6x6"), "unexpected message: {msg}");
    }

    #[test]
    fn check_rejects_bad_addr_and_limits() {
        let cfg = ServerConfig {
            listen_addr: "not-an-address".to_string(),
            ..ServerConfig::default()
        };
        assert!(cfg.check().unwrap_err().contains("listen_addr"));

        let cfg = ServerConfig {
            limits: LimitsConfig {
                max_connections: 0,
                ..LimitsConfig::default()
            },
            ..ServerConfig::default()
        };
        assert!(cfg.check().unwrap_err().contains("max_connections"));
    }

    #[test]
    fn check_rejects_first_player_outside_seats() {
        let cfg = ServerConfig {
            game: GameRulesConfig {
                first_player: 3,
                ..GameRulesConfig::default()
            },
            ..ServerConfig::default()
        };
        assert!(cfg.check().unwrap_err().contains("first_player"));
    }
}
