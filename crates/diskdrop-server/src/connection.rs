use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc;

use diskdrop_core::net::codec::{self, FRAME_LEN};
use diskdrop_core::net::messages::{ClientMessage, ServerMessage};
use diskdrop_core::PlayerId;

use crate::config::LimitsConfig;
use crate::lobby::GameLobby;
use crate::registry::LobbyRegistry;

/// Drive one client connection: seat it in a lobby, pump decoded
/// frames into the lobby, and mirror the lobby's outbound channel back
/// onto the socket. Returns when the client disconnects or misbehaves.
pub async fn handle_connection(
    stream: TcpStream,
    registry: Arc<LobbyRegistry>,
    limits: LimitsConfig,
) {
    let peer = match stream.peer_addr() {
        Ok(addr) => addr.to_string(),
        Err(_) => "unknown".to_string(),
    };
    tracing::info!(%peer, "client connected");

    let (reader, mut writer) = stream.into_split();
    let (tx, rx) = mpsc::channel::<ServerMessage>(limits.player_message_buffer);

    let Some((lobby, player_id)) = registry.assign(tx).await else {
        tracing::warn!(%peer, "no lobby seat available, refusing client");
        let frame = codec::encode_server(&ServerMessage::Error);
        let _ = writer.write_all(&frame).await;
        let _ = writer.shutdown().await;
        return;
    };

    let writer_task = tokio::spawn(write_loop(writer, rx));
    read_loop(reader, &lobby, player_id, &peer).await;

    lobby.on_disconnect(player_id).await;
    registry.sweep().await;
    writer_task.abort();
    tracing::info!(%peer, player_id, "client disconnected");
}

/// Forward lobby messages to the socket until the channel closes or a
/// write fails.
async fn write_loop(mut writer: OwnedWriteHalf, mut rx: mpsc::Receiver<ServerMessage>) {
    while let Some(msg) = rx.recv().await {
        let frame = codec::encode_server(&msg);
        if let Err(e) = writer.write_all(&frame).await {
            tracing::debug!(error = %e, "write failed, stopping writer");
            break;
        }
    }
}

/// Read fixed-size frames and dispatch them to the lobby until EOF or
/// a protocol violation.
async fn read_loop(mut reader: OwnedReadHalf, lobby: &GameLobby, player_id: PlayerId, peer: &str) {
    let mut frame = [0u8; FRAME_LEN];
    loop {
        if let Err(e) = reader.read_exact(&mut frame).await {
            tracing::debug!(%peer, player_id, error = %e, "read ended");
            return;
        }
        let msg = match codec::decode_client(&frame) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::warn!(%peer, player_id, error = %e, "malformed frame, dropping client");
                return;
            },
        };
        match msg {
            ClientMessage::Ready => lobby.on_ready(player_id).await,
            ClientMessage::Turn { column } => {
                lobby.on_take_turn(player_id, column).await;
            },
            ClientMessage::Error => {
                tracing::warn!(%peer, player_id, "client reported an error, dropping client");
                return;
            },
        }
    }
}
