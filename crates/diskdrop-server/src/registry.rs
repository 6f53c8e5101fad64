use std::sync::Arc;

use tokio::sync::Mutex;

use diskdrop_core::PlayerId;

use crate::config::{GameRulesConfig, LobbyConfig};
use crate::lobby::{GameLobby, PlayerSender};

/// Hands newly accepted connections to a lobby: first-fit over open
/// lobbies in creation order, creating a new one when all are full and
/// the cap allows. Every lobby plays by the same configured rules.
pub struct LobbyRegistry {
    rules: GameRulesConfig,
    lobby_config: LobbyConfig,
    lobbies: Mutex<Vec<Arc<GameLobby>>>,
    next_lobby_id: Mutex<usize>,
}

impl LobbyRegistry {
    pub fn new(rules: GameRulesConfig, lobby_config: LobbyConfig) -> Self {
        Self {
            rules,
            lobby_config,
            lobbies: Mutex::new(Vec::new()),
            next_lobby_id: Mutex::new(0),
        }
    }

    /// Seat a new connection. Returns the lobby and assigned player id,
    /// or `None` when every lobby is full and the lobby cap is reached.
    pub async fn assign(&self, sender: PlayerSender) -> Option<(Arc<GameLobby>, PlayerId)> {
        let mut lobbies = self.lobbies.lock().await;

        for lobby in lobbies.iter() {
            if !lobby.can_add_players() {
                continue;
            }
            // the snapshot can go stale before the lobby lock is taken,
            // so a refused add just moves on to the next lobby
            if let Ok(player_id) = lobby.add_player(sender.clone()).await {
                return Some((Arc::clone(lobby), player_id));
            }
        }

        if lobbies.len() >= self.lobby_config.max_lobbies {
            tracing::warn!(
                lobbies = lobbies.len(),
                max = self.lobby_config.max_lobbies,
                "no seat available, lobby cap reached"
            );
            return None;
        }

        let id = {
            let mut next = self.next_lobby_id.lock().await;
            let id = *next;
            *next += 1;
            id
        };
        let lobby = Arc::new(GameLobby::new(id, self.rules, self.lobby_config.keep_open));
        tracing::info!(lobby = id, "created lobby");
        match lobby.add_player(sender).await {
            Ok(player_id) => {
                lobbies.push(Arc::clone(&lobby));
                Some((lobby, player_id))
            },
            Err(e) => {
                // a brand-new lobby always has a free seat
                tracing::error!(lobby = id, error = %e, "admission to fresh lobby failed");
                None
            },
        }
    }

    /// Drop lobbies that have closed and emptied out.
    pub async fn sweep(&self) {
        let mut lobbies = self.lobbies.lock().await;
        let before = lobbies.len();
        lobbies.retain(|lobby| lobby.is_open() || !lobby.is_empty());
        let removed = before - lobbies.len();
        if removed > 0 {
            tracing::debug!(removed, remaining = lobbies.len(), "swept closed lobbies");
        }
    }

    pub async fn lobby_count(&self) -> usize {
        self.lobbies.lock().await.len()
    }
}
