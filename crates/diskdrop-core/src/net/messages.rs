use crate::game::TurnResult;
use crate::PlayerId;

/// Wire message kind discriminator, the first byte of every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageKind {
    // Client -> Server
    ClientError = 0x01,
    Ready = 0x02,
    Turn = 0x03,

    // Server -> Client
    ServerError = 0x10,
    Connected = 0x11,
    GameStart = 0x12,
    GameEnd = 0x13,
    TakeTurn = 0x14,
    TurnResult = 0x15,
    Update = 0x16,
}

impl MessageKind {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(Self::ClientError),
            0x02 => Some(Self::Ready),
            0x03 => Some(Self::Turn),
            0x10 => Some(Self::ServerError),
            0x11 => Some(Self::Connected),
            0x12 => Some(Self::GameStart),
            0x13 => Some(Self::GameEnd),
            0x14 => Some(Self::TakeTurn),
            0x15 => Some(Self::TurnResult),
            0x16 => Some(Self::Update),
            _ => None,
        }
    }

    /// True for kinds a client is allowed to send.
    pub fn is_client_kind(self) -> bool {
        matches!(self, Self::ClientError | Self::Ready | Self::Turn)
    }
}

/// Messages a client sends to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientMessage {
    /// Client-side failure report; treated as a session error.
    Error,
    /// Acknowledges readiness to start the round.
    Ready,
    /// Attempts to drop a disk into `column`.
    Turn { column: u8 },
}

impl ClientMessage {
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::Error => MessageKind::ClientError,
            Self::Ready => MessageKind::Ready,
            Self::Turn { .. } => MessageKind::Turn,
        }
    }
}

/// Messages the server sends to a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerMessage {
    /// The server could not serve this connection (e.g. no seat free).
    Error,
    /// Seat assignment: the client's player id for this lobby.
    Connected { player_id: PlayerId },
    /// The round is starting. Carries the receiver's own id and the
    /// board dimensions.
    GameStart {
        player_id: PlayerId,
        columns: u8,
        rows: u8,
    },
    /// The round is over; `winner` is 0 for a draw or aborted round.
    GameEnd { winner: PlayerId },
    /// Prompts the receiving player to take their turn.
    TakeTurn,
    /// Result of the receiver's own turn attempt.
    TurnResult { result: TurnResult, column: u8 },
    /// A disk landed: `player_id` dropped into `column`, ending at `row`.
    Update {
        player_id: PlayerId,
        column: u8,
        row: u8,
    },
}

impl ServerMessage {
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::Error => MessageKind::ServerError,
            Self::Connected { .. } => MessageKind::Connected,
            Self::GameStart { .. } => MessageKind::GameStart,
            Self::GameEnd { .. } => MessageKind::GameEnd,
            Self::TakeTurn => MessageKind::TakeTurn,
            Self::TurnResult { .. } => MessageKind::TurnResult,
            Self::Update { .. } => MessageKind::Update,
        }
    }
}
