use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use tokio::sync::{mpsc, Mutex};

use diskdrop_core::game::{Game, TurnResult};
use diskdrop_core::net::messages::ServerMessage;
use diskdrop_core::{PlayerId, NO_PLAYER};

use crate::config::GameRulesConfig;

/// Per-player outbound channel. The lobby never touches a socket; it
/// hands typed messages to each connection's writer, which owns the
/// encoding.
pub type PlayerSender = mpsc::Sender<ServerMessage>;

/// Why an admission attempt was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinError {
    LobbyClosed,
    LobbyFull,
}

impl std::fmt::Display for JoinError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LobbyClosed => write!(f, "lobby is closed"),
            Self::LobbyFull => write!(f, "lobby is full"),
        }
    }
}

impl std::error::Error for JoinError {}

struct Seat {
    id: PlayerId,
    ready: bool,
    sender: PlayerSender,
}

struct LobbyInner {
    seats: Vec<Seat>,
    num_ready: u8,
    game: Option<Game>,
}

/// One game lobby: admits players, runs the ready phase, owns the
/// engine for the active round, and broadcasts results.
///
/// All state-mutating operations serialize through one mutex; the
/// atomics below are status snapshots written only inside that
/// critical section, so capacity queries never block.
pub struct GameLobby {
    id: usize,
    rules: GameRulesConfig,
    keep_open: bool,
    is_open: AtomicBool,
    is_playing: AtomicBool,
    can_add: AtomicBool,
    player_count: AtomicU8,
    inner: Mutex<LobbyInner>,
}

impl GameLobby {
    pub fn new(id: usize, rules: GameRulesConfig, keep_open: bool) -> Self {
        Self {
            id,
            rules,
            keep_open,
            is_open: AtomicBool::new(true),
            is_playing: AtomicBool::new(false),
            can_add: AtomicBool::new(true),
            player_count: AtomicU8::new(0),
            inner: Mutex::new(LobbyInner {
                seats: Vec::new(),
                num_ready: 0,
                game: None,
            }),
        }
    }

    pub fn lobby_id(&self) -> usize {
        self.id
    }

    pub fn max_players(&self) -> u8 {
        self.rules.players
    }

    // Lock-free status snapshots.

    pub fn is_empty(&self) -> bool {
        self.player_count.load(Ordering::Relaxed) == 0
    }

    pub fn is_full(&self) -> bool {
        self.player_count.load(Ordering::Relaxed) >= self.rules.players
    }

    pub fn num_players(&self) -> u8 {
        self.player_count.load(Ordering::Relaxed)
    }

    pub fn is_open(&self) -> bool {
        self.is_open.load(Ordering::Relaxed)
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing.load(Ordering::Relaxed)
    }

    pub fn can_add_players(&self) -> bool {
        self.can_add.load(Ordering::Relaxed)
    }

    /// Seat a player, assigning the lowest unused id. The new player
    /// is sent a `Connected` message carrying that id.
    pub async fn add_player(&self, sender: PlayerSender) -> Result<PlayerId, JoinError> {
        let mut guard = self.inner.lock().await;
        let inner = &mut *guard;
        if !self.is_open.load(Ordering::Relaxed) {
            return Err(JoinError::LobbyClosed);
        }
        if inner.game.is_some() || inner.seats.len() >= self.rules.players as usize {
            return Err(JoinError::LobbyFull);
        }
        let Some(id) =
            (1..=self.rules.players).find(|id| inner.seats.iter().all(|s| s.id != *id))
        else {
            return Err(JoinError::LobbyFull);
        };

        let seat = Seat {
            id,
            ready: false,
            sender,
        };
        self.send_to(&seat, ServerMessage::Connected { player_id: id });
        inner.seats.push(seat);
        self.publish_status(inner);
        tracing::info!(
            lobby = self.id,
            player_id = id,
            players = inner.seats.len(),
            "player seated"
        );
        Ok(id)
    }

    /// Ready-acknowledgement from a seated player. Valid only while
    /// the lobby is full and no round is running; once every seat has
    /// acknowledged, the round starts.
    pub async fn on_ready(&self, player_id: PlayerId) {
        let mut guard = self.inner.lock().await;
        let inner = &mut *guard;
        if inner.game.is_some() || inner.seats.len() < self.rules.players as usize {
            tracing::debug!(
                lobby = self.id,
                player_id,
                "ready ignored outside the ready phase"
            );
            return;
        }
        let Some(seat) = inner.seats.iter_mut().find(|s| s.id == player_id) else {
            return;
        };
        if seat.ready {
            tracing::debug!(lobby = self.id, player_id, "duplicate ready ignored");
            return;
        }
        seat.ready = true;
        inner.num_ready += 1;
        tracing::debug!(
            lobby = self.id,
            player_id,
            num_ready = inner.num_ready,
            "player ready"
        );
        if inner.num_ready as usize == inner.seats.len() {
            self.start_round(inner);
        }
    }

    /// Turn attempt from a seated player. Rule violations are relayed
    /// only to the originator; successful moves are broadcast, and the
    /// round advances or ends.
    pub async fn on_take_turn(&self, player_id: PlayerId, column: u8) -> TurnResult {
        let mut guard = self.inner.lock().await;
        let inner = &mut *guard;
        let result = match inner.game.as_mut() {
            None => {
                tracing::debug!(lobby = self.id, player_id, "turn attempted with no active round");
                self.send_to_id(
                    inner,
                    player_id,
                    ServerMessage::TurnResult {
                        result: TurnResult::GameFinished,
                        column,
                    },
                );
                return TurnResult::GameFinished;
            },
            Some(game) => game.take_turn(player_id, column),
        };

        if result == TurnResult::Success {
            let Some(game) = inner.game.as_ref() else {
                return result;
            };
            let (move_column, row) = game.last_move();
            let finished = game.is_finished();
            let winner = game.winner().unwrap_or(NO_PLAYER);
            let next_player = game.current_player();

            self.broadcast(
                inner,
                ServerMessage::Update {
                    player_id,
                    column: move_column,
                    row,
                },
            );
            if finished {
                tracing::info!(lobby = self.id, winner, "round over");
                self.broadcast(inner, ServerMessage::GameEnd { winner });
                self.end_round(inner);
            } else {
                self.prompt_player(inner, next_player);
            }
        } else {
            tracing::debug!(lobby = self.id, player_id, column, ?result, "turn rejected");
            self.send_to_id(
                inner,
                player_id,
                ServerMessage::TurnResult { result, column },
            );
        }
        result
    }

    /// Remove a departed player. Aborts the round if one is running;
    /// closes the lobby once the last seat empties.
    pub async fn on_disconnect(&self, player_id: PlayerId) {
        let mut guard = self.inner.lock().await;
        let inner = &mut *guard;
        let Some(pos) = inner.seats.iter().position(|s| s.id == player_id) else {
            return;
        };
        let seat = inner.seats.remove(pos);
        if seat.ready && inner.num_ready > 0 {
            inner.num_ready -= 1;
        }

        if inner.game.is_some() {
            inner.game = None;
            tracing::info!(lobby = self.id, player_id, "player left mid-round, round aborted");
            self.broadcast(inner, ServerMessage::GameEnd { winner: NO_PLAYER });
            self.end_round(inner);
        } else {
            tracing::info!(lobby = self.id, player_id, "player left");
        }

        if inner.seats.is_empty() {
            self.is_open.store(false, Ordering::Relaxed);
            tracing::info!(lobby = self.id, "lobby empty, closing");
        }
        self.publish_status(inner);
    }

    fn start_round(&self, inner: &mut LobbyInner) {
        let game = match Game::new(
            self.rules.players,
            self.rules.first_player,
            self.rules.columns,
            self.rules.rows,
        ) {
            Ok(game) => game,
            Err(e) => {
                // rules are validated at startup, so this is a bug
                tracing::error!(lobby = self.id, error = %e, "game construction failed");
                return;
            },
        };
        for seat in &inner.seats {
            self.send_to(
                seat,
                ServerMessage::GameStart {
                    player_id: seat.id,
                    columns: self.rules.columns,
                    rows: self.rules.rows,
                },
            );
        }
        let first_player = game.current_player();
        inner.game = Some(game);
        self.prompt_player(inner, first_player);
        self.publish_status(inner);
        tracing::info!(
            lobby = self.id,
            players = inner.seats.len(),
            first_player,
            "round started"
        );
    }

    /// Reset after a round: discard the engine, clear readiness, and
    /// either re-open for admission or close, per configuration.
    fn end_round(&self, inner: &mut LobbyInner) {
        inner.game = None;
        inner.num_ready = 0;
        for seat in &mut inner.seats {
            seat.ready = false;
        }
        if !self.keep_open {
            self.is_open.store(false, Ordering::Relaxed);
            tracing::info!(lobby = self.id, "round over, lobby closing");
        }
        self.publish_status(inner);
    }

    /// Refresh the lock-free status snapshot. Must be called with the
    /// critical section held, after any mutation.
    fn publish_status(&self, inner: &LobbyInner) {
        let open = self.is_open.load(Ordering::Relaxed);
        let playing = inner.game.is_some();
        self.player_count
            .store(inner.seats.len() as u8, Ordering::Relaxed);
        self.is_playing.store(playing, Ordering::Relaxed);
        self.can_add.store(
            open && !playing && inner.seats.len() < self.rules.players as usize,
            Ordering::Relaxed,
        );
    }

    fn prompt_player(&self, inner: &LobbyInner, player_id: PlayerId) {
        self.send_to_id(inner, player_id, ServerMessage::TakeTurn);
    }

    fn send_to_id(&self, inner: &LobbyInner, player_id: PlayerId, msg: ServerMessage) {
        if let Some(seat) = inner.seats.iter().find(|s| s.id == player_id) {
            self.send_to(seat, msg);
        }
    }

    fn broadcast(&self, inner: &LobbyInner, msg: ServerMessage) {
        for seat in &inner.seats {
            self.send_to(seat, msg);
        }
    }

    fn send_to(&self, seat: &Seat, msg: ServerMessage) {
        if let Err(e) = seat.sender.try_send(msg) {
            tracing::debug!(
                lobby = self.id,
                player_id = seat.id,
                error = %e,
                "skipping send to slow or disconnected player"
            );
        }
    }
}
