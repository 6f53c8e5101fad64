//! Fixed-frame codec: every message, in either direction, is one kind
//! byte followed by a 16-byte payload. Unused payload bytes are zero.
//! Raw bytes cross this boundary exactly once; everything above it
//! works with the typed message enums.

use crate::game::TurnResult;
use crate::net::messages::{ClientMessage, MessageKind, ServerMessage};

/// Bytes of kind-specific payload per frame.
pub const PAYLOAD_LEN: usize = 16;

/// Total frame length on the wire.
pub const FRAME_LEN: usize = 1 + PAYLOAD_LEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// Frame shorter than `FRAME_LEN`.
    Truncated { len: usize },
    /// Kind byte matches no known message kind.
    UnknownKind(u8),
    /// Kind is valid but not legal for this direction.
    UnexpectedKind(MessageKind),
    /// `TurnResult` payload carried an undefined result code.
    BadResultCode(u8),
}

impl std::fmt::Display for FrameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Truncated { len } => {
                write!(f, "truncated frame: {len} bytes (expected {FRAME_LEN})")
            },
            Self::UnknownKind(byte) => write!(f, "unknown message kind: 0x{byte:02x}"),
            Self::UnexpectedKind(kind) => {
                write!(f, "message kind {kind:?} not valid for this direction")
            },
            Self::BadResultCode(byte) => write!(f, "unknown turn result code: 0x{byte:02x}"),
        }
    }
}

impl std::error::Error for FrameError {}

/// Encode a server-to-client message into a wire frame.
pub fn encode_server(msg: &ServerMessage) -> [u8; FRAME_LEN] {
    let mut frame = [0u8; FRAME_LEN];
    frame[0] = msg.kind() as u8;
    match msg {
        ServerMessage::Error | ServerMessage::TakeTurn => {},
        ServerMessage::Connected { player_id } => {
            frame[1] = *player_id;
        },
        ServerMessage::GameStart {
            player_id,
            columns,
            rows,
        } => {
            frame[1] = *player_id;
            frame[2] = *columns;
            frame[3] = *rows;
        },
        ServerMessage::GameEnd { winner } => {
            frame[1] = *winner;
        },
        ServerMessage::TurnResult { result, column } => {
            frame[1] = *result as u8;
            frame[2] = *column;
        },
        ServerMessage::Update {
            player_id,
            column,
            row,
        } => {
            frame[1] = *player_id;
            frame[2] = *column;
            frame[3] = *row;
        },
    }
    frame
}

/// Encode a client-to-server message into a wire frame.
pub fn encode_client(msg: &ClientMessage) -> [u8; FRAME_LEN] {
    let mut frame = [0u8; FRAME_LEN];
    frame[0] = msg.kind() as u8;
    if let ClientMessage::Turn { column } = msg {
        frame[1] = *column;
    }
    frame
}

/// Decode a frame arriving at the server.
pub fn decode_client(frame: &[u8]) -> Result<ClientMessage, FrameError> {
    let (kind, payload) = split_frame(frame)?;
    match kind {
        MessageKind::ClientError => Ok(ClientMessage::Error),
        MessageKind::Ready => Ok(ClientMessage::Ready),
        MessageKind::Turn => Ok(ClientMessage::Turn { column: payload[0] }),
        other => Err(FrameError::UnexpectedKind(other)),
    }
}

/// Decode a frame arriving at a client.
pub fn decode_server(frame: &[u8]) -> Result<ServerMessage, FrameError> {
    let (kind, payload) = split_frame(frame)?;
    match kind {
        MessageKind::ServerError => Ok(ServerMessage::Error),
        MessageKind::Connected => Ok(ServerMessage::Connected {
            player_id: payload[0],
        }),
        MessageKind::GameStart => Ok(ServerMessage::GameStart {
            player_id: payload[0],
            columns: payload[1],
            rows: payload[2],
        }),
        MessageKind::GameEnd => Ok(ServerMessage::GameEnd { winner: payload[0] }),
        MessageKind::TakeTurn => Ok(ServerMessage::TakeTurn),
        MessageKind::TurnResult => {
            let result =
                TurnResult::from_byte(payload[0]).ok_or(FrameError::BadResultCode(payload[0]))?;
            Ok(ServerMessage::TurnResult {
                result,
                column: payload[1],
            })
        },
        MessageKind::Update => Ok(ServerMessage::Update {
            player_id: payload[0],
            column: payload[1],
            row: payload[2],
        }),
        other => Err(FrameError::UnexpectedKind(other)),
    }
}

fn split_frame(frame: &[u8]) -> Result<(MessageKind, &[u8]), FrameError> {
    if frame.len() < FRAME_LEN {
        return Err(FrameError::Truncated { len: frame.len() });
    }
    let kind = MessageKind::from_byte(frame[0]).ok_or(FrameError::UnknownKind(frame[0]))?;
    Ok((kind, &frame[1..FRAME_LEN]))
}
